//! Источники ориентиров кисти.
//!
//! Модуль отвечает ТОЛЬКО за получение кадров с ориентирами от внешнего
//! трекера. Распознавание жестов, дебаунс и исполнение действий здесь не
//! выполняются: этим занимается GestureController.

mod dry_run;
mod subprocess;
mod r#trait;

pub use self::r#trait::{create_landmark_source, LandmarkSource};
