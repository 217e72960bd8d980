use crate::config::Config;
use crate::error::Result;
use crate::events::FrameMessage;

/// Поток кадров с ориентирами
#[async_trait::async_trait]
pub trait LandmarkSource: Send {
    /// Следующий кадр; None - поток завершён
    async fn next_frame(&mut self) -> Result<Option<FrameMessage>>;
}

/// Создать источник ориентиров в зависимости от флага dry_run
pub async fn create_landmark_source(
    config: &Config,
    dry_run: bool,
) -> Result<Box<dyn LandmarkSource>> {
    if dry_run {
        Ok(Box::new(super::dry_run::DryRunLandmarkSource::new(
            config.source.dry_run_interval_ms,
        )))
    } else {
        Ok(Box::new(
            super::subprocess::SubprocessLandmarkSource::spawn(&config.source).await?,
        ))
    }
}
