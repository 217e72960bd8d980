//! Дебаунсер дискретных событий жестов.
//!
//! Превращает покадровый поток наблюдений в поток событий, разделённых не
//! менее чем интервалом удержания. Часы не читаются: время приходит вместе
//! с наблюдением, состояние передаётся явно и меняется только при эмиссии.

use std::time::Duration;

use crate::error::{GestureError, Result};
use crate::events::{GestureEvent, GestureStatus, Observation};

/// Состояние одного независимого потока жестов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncerState {
    last_emitted: Option<Duration>,
    holding_interval: Duration,
}

impl DebouncerState {
    pub fn new(holding_interval: Duration) -> Result<Self> {
        if holding_interval.is_zero() {
            return Err(GestureError::Config(anyhow::anyhow!(
                "интервал удержания должен быть больше нуля"
            )));
        }

        Ok(Self {
            last_emitted: None,
            holding_interval,
        })
    }

    /// Время последнего принятого события (None - событий ещё не было)
    pub fn last_emitted(&self) -> Option<Duration> {
        self.last_emitted
    }

    pub fn holding_interval(&self) -> Duration {
        self.holding_interval
    }

    fn in_cooldown(&self, timestamp: Duration) -> bool {
        match self.last_emitted {
            Some(last) => timestamp - last < self.holding_interval,
            None => false,
        }
    }
}

/// Оценить наблюдение: не более одного события за вызов
pub fn evaluate(
    observation: &Observation,
    state: DebouncerState,
) -> Result<(Option<GestureEvent>, DebouncerState)> {
    if observation.candidates.is_empty() {
        return GestureError::invalid_observation("пустой список кандидатов");
    }

    if let Some(last) = state.last_emitted {
        if observation.timestamp < last {
            return GestureError::invalid_observation(format!(
                "время {}мс раньше последнего события {}мс",
                observation.timestamp.as_millis(),
                last.as_millis()
            ));
        }
    }

    if state.in_cooldown(observation.timestamp) {
        return Ok((None, state));
    }

    match observation.satisfied().next() {
        Some(label) => {
            let event = GestureEvent {
                label,
                timestamp: observation.timestamp,
            };
            let next = DebouncerState {
                last_emitted: Some(observation.timestamp),
                ..state
            };
            Ok((Some(event), next))
        }
        None => Ok((None, state)),
    }
}

/// То же, что [`evaluate`], но с причиной отсутствия события
pub fn evaluate_status(
    observation: &Observation,
    state: DebouncerState,
) -> Result<(GestureStatus, DebouncerState)> {
    let (event, next) = evaluate(observation, state)?;

    let status = match event {
        Some(event) => GestureStatus::Action(event.label),
        None if state.in_cooldown(observation.timestamp) => GestureStatus::Cooldown,
        None => GestureStatus::Idle,
    };

    Ok((status, next))
}
