pub mod u001_stream_chooser;
