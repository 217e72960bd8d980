use thiserror::Error;

#[derive(Error, Debug)]
pub enum GestureError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Ошибка разбора JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Некорректное наблюдение: {0}")]
    InvalidObservation(String),

    #[error("Ошибка источника ориентиров: {0}")]
    LandmarkSource(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl GestureError {
    pub fn invalid_observation<T>(msg: impl Into<String>) -> Result<T> {
        Err(GestureError::InvalidObservation(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, GestureError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! gesture_error {
    (invalid_observation, $($arg:tt)*) => {
        $crate::error::GestureError::InvalidObservation(format!($($arg)*))
    };
    (landmark_source, $($arg:tt)*) => {
        $crate::error::GestureError::LandmarkSource(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::GestureError::Permission(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::GestureError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::GestureError::Internal(format!($($arg)*))
    };
}
