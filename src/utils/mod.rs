pub mod permissions;

/// Событие лога на пути обработки кадра. Аргументы форматирования не
/// вычисляются, пока уровень выключен фильтром.
#[macro_export]
macro_rules! frame_log {
    ($level:ident, $($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::$level) {
            tracing::event!(tracing::Level::$level, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        $crate::frame_log!(DEBUG, $($arg)*)
    };
}

#[macro_export]
macro_rules! trace_if_enabled {
    ($($arg:tt)*) => {
        $crate::frame_log!(TRACE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    fn expensive(calls: &Cell<u32>) -> u32 {
        calls.set(calls.get() + 1);
        42
    }

    #[test]
    fn test_disabled_level_skips_arguments() {
        let calls = Cell::new(0);
        // Без подписчика все уровни выключены
        crate::trace_if_enabled!("значение {}", expensive(&calls));
        crate::debug_if_enabled!("значение {}", expensive(&calls));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_enabled_level_formats_arguments() {
        let calls = Cell::new(0);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            crate::trace_if_enabled!("значение {}", expensive(&calls));
            crate::frame_log!(INFO, "значение {}", expensive(&calls));
        });
        assert_eq!(calls.get(), 2);
    }
}
