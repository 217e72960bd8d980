use crate::config::Config;
use crate::{debug_if_enabled, trace_if_enabled};
use crate::error::{GestureError, Result};
use crate::events::{FrameMessage, GestureStatus, HandLandmarks, Observation};
use crate::gesture::cursor::map_to_screen;
use crate::gesture::debouncer;
use crate::gesture::DebouncerState;
use crate::gesture::predicates::evaluate_candidates;
use crate::services::action_map::ActionMap;
use crate::services::landmark_source::create_landmark_source;
use crate::services::{ActionExecutor, ActivationFlag};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Состояние одного потока кадров: собственный дебаунсер и собственные часы
#[derive(Debug, Clone, Copy)]
pub struct StreamState {
    pub debouncer: DebouncerState,
    pub started: Instant,
}

impl StreamState {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Переводит кадры с ориентирами в действия ОС
pub struct GestureController {
    config: Arc<Config>,
    executor: Arc<dyn ActionExecutor>,
    actions: ActionMap,
    activation: Arc<ActivationFlag>,
    dry_run: bool,
}

impl GestureController {
    pub fn new(
        config: Arc<Config>,
        executor: Arc<dyn ActionExecutor>,
        activation: Arc<ActivationFlag>,
        dry_run: bool,
    ) -> Result<Self> {
        info!("Инициализация GestureController (dry_run: {})", dry_run);

        let actions = ActionMap::from_config(&config.actions)?;

        Ok(Self {
            config,
            executor,
            actions,
            activation,
            dry_run,
        })
    }

    pub fn activation(&self) -> &Arc<ActivationFlag> {
        &self.activation
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Новый независимый поток с чистым дебаунсером
    pub fn new_stream(&self) -> Result<StreamState> {
        Ok(StreamState {
            debouncer: DebouncerState::new(self.config.gesture.holding_interval())?,
            started: Instant::now(),
        })
    }

    /// Обработать одну кисть: курсор, предикаты, дебаунс, действие.
    /// Состояние потока меняется только при принятом событии.
    pub fn process_hand(
        &self,
        stream: &mut StreamState,
        hand: &HandLandmarks,
        timestamp: Duration,
        execute: bool,
    ) -> Result<GestureStatus> {
        if execute && self.config.cursor.enabled {
            let point = map_to_screen(hand.point(self.config.cursor.landmark), &self.config.cursor.screen());
            if let Err(e) = self.executor.move_cursor(point) {
                warn!("Не удалось переместить курсор: {}", e);
            }
        }

        let candidates = evaluate_candidates(hand, &self.config.thresholds, &self.config.gesture.priority);
        let observation = Observation::new(timestamp, candidates);

        let (status, next) = debouncer::evaluate_status(&observation, stream.debouncer)?;
        stream.debouncer = next;

        match status {
            GestureStatus::Action(label) => {
                let action = self.actions.get(label);
                info!("Жест '{}' -> {} ({}мс)", label, action, timestamp.as_millis());
                if execute {
                    if let Err(e) = self.executor.perform(&action) {
                        error!("Не удалось выполнить действие для жеста '{}': {}", label, e);
                    }
                }
            }
            GestureStatus::Cooldown => {
                debug_if_enabled!("Кадр {}мс в периоде удержания", timestamp.as_millis());
            }
            _ => {}
        }

        Ok(status)
    }

    /// Главный цикл: ждёт активации и обслуживает поток кадров трекера
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!("GestureController запущен");

        loop {
            self.activation.wait_active().await;
            let epoch = self.activation.epoch();

            if let Err(e) = self.run_session(epoch).await {
                error!("Сессия жестов завершилась с ошибкой: {}", e);
                self.activation.deactivate();
            }
        }
    }

    async fn run_session(&self, epoch: u64) -> Result<()> {
        info!("Старт сессии жестов (эпоха {})", epoch);

        let mut source = create_landmark_source(&self.config, self.dry_run).await?;
        let mut stream = self.new_stream()?;
        let mut frames: u64 = 0;

        loop {
            // Остановка проверяется раньше готового кадра
            let frame = tokio::select! {
                biased;
                _ = self.activation.wait_inactive() => {
                    info!("Сессия остановлена после {} кадров", frames);
                    return Ok(());
                }
                frame = source.next_frame() => frame?,
            };

            if !self.activation.is_active() {
                info!("Сессия остановлена после {} кадров", frames);
                return Ok(());
            }

            if self.activation.epoch() != epoch {
                info!("Сессия перезапущена, сбрасываем состояние");
                return Ok(());
            }

            let Some(frame) = frame else {
                warn!("Поток кадров завершён, управление жестами выключается");
                self.activation.deactivate();
                return Ok(());
            };

            frames += 1;
            self.handle_frame(&mut stream, &frame);
        }
    }

    fn handle_frame(&self, stream: &mut StreamState, frame: &FrameMessage) {
        let Some(hand) = frame.best_hand(self.config.source.min_confidence) else {
            trace_if_enabled!("Кадр без уверенно распознанной кисти ({} кистей)", frame.hands.len());
            return;
        };

        match self.process_hand(stream, &hand, stream.elapsed(), true) {
            Ok(_) => {}
            Err(GestureError::InvalidObservation(e)) => warn!("Кадр отклонён: {}", e),
            Err(e) => error!("Ошибка обработки кадра: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::hand::fixtures::neutral_hand;
    use crate::events::hand::landmarks;
    use crate::events::{GestureLabel, Handedness, InputAction, Landmark, MouseButton, ScreenPoint};
    use crate::services::virtual_device::fixtures::RecordingExecutor;

    fn controller(config: Config, active: bool) -> (Arc<GestureController>, Arc<RecordingExecutor>) {
        let recorder = Arc::new(RecordingExecutor::default());
        let controller = GestureController::new(
            Arc::new(config),
            recorder.clone(),
            Arc::new(ActivationFlag::new(active)),
            true,
        )
        .unwrap();
        (Arc::new(controller), recorder)
    }

    fn click_hand() -> HandLandmarks {
        let mut hand = neutral_hand(Handedness::Right);
        hand.landmarks[landmarks::THUMB_TIP] = Landmark::new(0.45, 0.49);
        hand
    }

    #[test]
    fn test_process_hand_emits_and_debounces() {
        let (controller, recorder) = controller(Config::default(), true);
        let mut stream = controller.new_stream().unwrap();
        let hand = click_hand();

        let first = controller.process_hand(&mut stream, &hand, Duration::ZERO, true).unwrap();
        assert_eq!(first, GestureStatus::Action(GestureLabel::Click));

        let second = controller
            .process_hand(&mut stream, &hand, Duration::from_millis(500), true)
            .unwrap();
        assert_eq!(second, GestureStatus::Cooldown);

        let idle = controller
            .process_hand(&mut stream, &neutral_hand(Handedness::Right), Duration::from_millis(900), true)
            .unwrap();
        assert_eq!(idle, GestureStatus::Idle);

        assert_eq!(recorder.actions(), vec![InputAction::Click(MouseButton::Left)]);
        // Курсор двигается на каждом кадре, независимо от дебаунса
        assert_eq!(recorder.cursor().len(), 3);
        assert_eq!(recorder.cursor()[0], ScreenPoint { x: 979, y: 496 });
    }

    #[test]
    fn test_process_hand_without_execution() {
        let (controller, recorder) = controller(Config::default(), true);
        let mut stream = controller.new_stream().unwrap();

        let status = controller
            .process_hand(&mut stream, &click_hand(), Duration::ZERO, false)
            .unwrap();
        assert_eq!(status, GestureStatus::Action(GestureLabel::Click));
        assert!(recorder.actions().is_empty());
        assert!(recorder.cursor().is_empty());
    }

    #[test]
    fn test_independent_streams() {
        let (controller, _) = controller(Config::default(), true);
        let mut a = controller.new_stream().unwrap();
        let mut b = controller.new_stream().unwrap();
        let hand = click_hand();

        let ts = Duration::from_millis(100);
        assert!(controller.process_hand(&mut a, &hand, ts, false).unwrap().action().is_some());
        assert!(controller.process_hand(&mut b, &hand, ts, false).unwrap().action().is_some());
    }

    #[test]
    fn test_priority_from_config() {
        let mut config = Config::default();
        config.gesture.priority = vec![GestureLabel::VolumeDown, GestureLabel::Click];
        let (controller, recorder) = controller(config, true);
        let mut stream = controller.new_stream().unwrap();

        // Щипок и сведённые указательный/средний одновременно
        let mut hand = click_hand();
        hand.landmarks[landmarks::MIDDLE_FINGER_TIP] = Landmark::new(0.47, 0.47);

        let status = controller.process_hand(&mut stream, &hand, Duration::ZERO, true).unwrap();
        assert_eq!(status, GestureStatus::Action(GestureLabel::VolumeDown));
        assert_eq!(recorder.actions().len(), 1);
    }

    #[tokio::test]
    async fn test_run_dry_session_until_stopped() {
        let mut config = Config::default();
        config.gesture.holding_interval_ms = 5;
        config.source.dry_run_interval_ms = 1;
        let (controller, recorder) = controller(config, true);

        let handle = tokio::spawn(controller.clone().run());

        let deadline = Instant::now() + Duration::from_secs(5);
        while recorder.actions().len() < 2 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(controller.activation().deactivate());
        let actions = recorder.actions();
        assert!(actions.len() >= 2);
        assert_eq!(actions[0], InputAction::Click(MouseButton::Left));

        handle.abort();
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn test_no_frames_processed_after_stop() {
        let mut config = Config::default();
        config.gesture.holding_interval_ms = 5;
        config.source.dry_run_interval_ms = 1;
        let (controller, recorder) = controller(config, false);

        let handle = tokio::spawn(controller.clone().run());

        for _ in 0..20 {
            let before = recorder.cursor().len();
            assert!(controller.activation().activate());
            wait_until(|| recorder.cursor().len() > before + 2).await;

            // Кадр источника уже готов к моменту остановки
            assert!(controller.activation().deactivate());
            let stopped_at = recorder.cursor().len();

            tokio::time::sleep(Duration::from_millis(5)).await;
            assert_eq!(recorder.cursor().len(), stopped_at, "кадр обработан после остановки");
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_quick_restart_starts_fresh_stream() {
        let mut config = Config::default();
        config.gesture.holding_interval_ms = 60_000;
        config.source.dry_run_interval_ms = 1;
        let (controller, recorder) = controller(config, true);

        let handle = tokio::spawn(controller.clone().run());

        wait_until(|| recorder.actions().len() == 1).await;
        let cursor_before = recorder.cursor().len();
        wait_until(|| recorder.cursor().len() > cursor_before + 5).await;

        // Старый поток всё ещё в периоде удержания
        assert_eq!(recorder.actions(), vec![InputAction::Click(MouseButton::Left)]);

        assert!(controller.activation().deactivate());
        assert!(controller.activation().activate());
        assert_eq!(controller.activation().epoch(), 2);

        wait_until(|| recorder.actions().len() >= 2).await;
        assert_eq!(
            recorder.actions(),
            vec![InputAction::Click(MouseButton::Left); 2]
        );

        handle.abort();
    }
}
