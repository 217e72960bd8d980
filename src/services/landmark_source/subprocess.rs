use crate::config::SourceConfig;
use crate::error::{GestureError, Result};
use crate::events::FrameMessage;
use crate::gesture_error;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, warn};

use super::LandmarkSource;

const READY_SIGNAL: &str = "READY";

/// Построчное чтение кадров JSON из произвольного потока
pub struct FrameReader<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Дождаться строки READY от трекера
    pub async fn wait_ready(&mut self) -> Result<()> {
        match self.lines.next_line().await? {
            Some(line) if line.trim() == READY_SIGNAL => Ok(()),
            Some(line) => Err(gesture_error!(
                landmark_source,
                "трекер не прислал {}, получено: {}",
                READY_SIGNAL,
                line.trim()
            )),
            None => Err(gesture_error!(
                landmark_source,
                "трекер завершился до сигнала {}",
                READY_SIGNAL
            )),
        }
    }

    /// Следующий корректный кадр; битые строки пропускаются
    pub async fn next_frame(&mut self) -> Result<Option<FrameMessage>> {
        while let Some(line) = self.lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<FrameMessage>(line) {
                Ok(mut frame) => {
                    if let Some(error) = frame.error.as_deref() {
                        warn!("Трекер сообщил об ошибке: {}", error);
                        frame.hands.clear();
                    }
                    return Ok(Some(frame));
                }
                Err(e) => {
                    warn!("Не удалось разобрать кадр трекера: {} (строка: {})", e, line);
                }
            }
        }

        Ok(None)
    }
}

/// Внешний трекер рук, запущенный как подпроцесс.
/// Процесс пишет в stdout по одному кадру JSON на строку.
pub struct SubprocessLandmarkSource {
    child: Child,
    reader: FrameReader<BufReader<ChildStdout>>,
}

impl SubprocessLandmarkSource {
    pub async fn spawn(config: &SourceConfig) -> Result<Self> {
        info!(
            "Запуск трекера рук: {} {}",
            config.command,
            config.args.join(" ")
        );

        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                GestureError::ServiceUnavailable(format!(
                    "Не удалось запустить трекер '{}': {}",
                    config.command, e
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| gesture_error!(landmark_source, "stdout трекера недоступен"))?;

        let mut reader = FrameReader::new(BufReader::new(stdout));

        if config.wait_ready {
            debug!("Ожидание сигнала {} от трекера", READY_SIGNAL);
            reader.wait_ready().await?;
        }

        info!("Трекер рук готов (pid: {:?})", child.id());

        Ok(Self { child, reader })
    }
}

#[async_trait::async_trait]
impl LandmarkSource for SubprocessLandmarkSource {
    async fn next_frame(&mut self) -> Result<Option<FrameMessage>> {
        let frame = self.reader.next_frame().await?;
        if frame.is_none() {
            match self.child.try_wait() {
                Ok(Some(status)) => warn!("Трекер рук завершился: {}", status),
                Ok(None) => warn!("Трекер рук закрыл stdout"),
                Err(e) => warn!("Не удалось получить статус трекера: {}", e),
            }
        }
        Ok(frame)
    }
}

impl Drop for SubprocessLandmarkSource {
    fn drop(&mut self) {
        info!("Остановка трекера рук");
    }
}
