//! Модальное окно выбора потока: параметры поиска и ответы шагов.

pub mod request;
pub mod response;
