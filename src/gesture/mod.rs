//! Ядро распознавания: предикаты кадра, дебаунс событий и отображение курсора.
//!
//! Модуль не выполняет ввод-вывод и не читает часы. Источники кадров и
//! исполнение действий живут в `services`.

pub mod cursor;
pub mod debouncer;
pub mod predicates;

pub use debouncer::DebouncerState;
