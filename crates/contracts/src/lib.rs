//! Общие типы обмена между фронтендом выбора потока и сервером админки.

pub mod domain;
pub mod usecases;
