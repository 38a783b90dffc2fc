pub mod a001_stream;
