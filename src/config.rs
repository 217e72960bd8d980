use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::events::GestureLabel;
use crate::gesture::cursor::ScreenGeometry;
use crate::gesture::predicates::Thresholds;
use crate::services::action_map::ActionMap;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub gesture: GestureConfig,
    pub thresholds: Thresholds,
    pub cursor: CursorConfig,
    pub actions: ActionsConfig,
    pub source: SourceConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub device_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GestureConfig {
    pub holding_interval_ms: u64,
    /// Порядок приоритета жестов: первый выполненный побеждает
    pub priority: Vec<GestureLabel>,
    pub start_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CursorConfig {
    pub enabled: bool,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Индекс ориентира, который ведёт курсор (12 - кончик среднего пальца)
    pub landmark: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionsConfig {
    pub scroll_amount: i32,
    #[serde(default)]
    pub overrides: HashMap<GestureLabel, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub command: String,
    pub args: Vec<String>,
    pub wait_ready: bool,
    pub min_confidence: f32,
    pub dry_run_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub bind: String,
    pub execute_actions: bool,
    /// Предел одновременных сессий /predict; самая давняя вытесняется
    pub max_sessions: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_name: "Gesture Bridge Virtual Device".to_string(),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            holding_interval_ms: 800,
            priority: GestureLabel::ALL.to_vec(),
            start_active: false,
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            screen_width: 1920,
            screen_height: 1080,
            landmark: crate::events::hand::landmarks::MIDDLE_FINGER_TIP,
        }
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            scroll_amount: 3,
            overrides: HashMap::new(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            command: "python3".to_string(),
            args: vec!["hand_tracker.py".to_string()],
            wait_ready: true,
            min_confidence: 0.8,
            dry_run_interval_ms: 600,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "127.0.0.1:8000".to_string(),
            execute_actions: true,
            max_sessions: 64,
        }
    }
}

impl GestureConfig {
    pub fn holding_interval(&self) -> Duration {
        Duration::from_millis(self.holding_interval_ms)
    }
}

impl CursorConfig {
    pub fn screen(&self) -> ScreenGeometry {
        ScreenGeometry::new(self.screen_width, self.screen_height)
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("Неверный адрес сервера: {}", self.bind))
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("GESTURE_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "pretty" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация дебаунса
        if self.gesture.holding_interval_ms == 0 {
            anyhow::bail!("holding_interval_ms должно быть больше 0");
        }

        if self.gesture.priority.is_empty() {
            anyhow::bail!("Список приоритетов жестов пуст");
        }

        let mut seen = HashSet::new();
        for label in &self.gesture.priority {
            if !seen.insert(*label) {
                anyhow::bail!("Жест '{}' повторяется в списке приоритетов", label.as_str());
            }
        }

        self.thresholds.validate()?;

        // Валидация курсора
        if self.cursor.screen_width == 0 || self.cursor.screen_height == 0 {
            anyhow::bail!(
                "Размер экрана должен быть больше 0, получено {}x{}",
                self.cursor.screen_width,
                self.cursor.screen_height
            );
        }

        if self.cursor.landmark >= crate::events::hand::landmarks::COUNT {
            anyhow::bail!("Неверный индекс ориентира курсора: {}", self.cursor.landmark);
        }

        // Валидация действий
        ActionMap::from_config(&self.actions)?;

        // Валидация источника
        if self.source.command.trim().is_empty() {
            anyhow::bail!("Не задана команда трекера рук (source.command)");
        }

        if !(0.0..=1.0).contains(&self.source.min_confidence) {
            anyhow::bail!(
                "min_confidence должно быть в диапазоне 0..1, получено {}",
                self.source.min_confidence
            );
        }

        if self.source.dry_run_interval_ms == 0 {
            anyhow::bail!("dry_run_interval_ms должно быть больше 0");
        }

        // Валидация сервера
        if self.server.enabled {
            self.server.socket_addr()?;
        }

        if self.server.max_sessions == 0 {
            anyhow::bail!("max_sessions должно быть больше 0");
        }

        Ok(())
    }
}
