pub mod a001_stream;
pub mod common;
