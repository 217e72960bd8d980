use crate::error::Result;
use crate::events::hand::landmarks;
use crate::events::{FrameMessage, HandMessage, Handedness, Landmark};
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::info;

use super::LandmarkSource;

/// Эмуляция трекера: по кругу отдаёт синтетические позы для всех жестов
pub struct DryRunLandmarkSource {
    poses: Vec<(&'static str, HandMessage)>,
    index: usize,
    interval: Interval,
}

impl DryRunLandmarkSource {
    pub fn new(interval_ms: u64) -> Self {
        info!("Dry-run режим - источник ориентиров работает в режиме эмуляции");

        let mut interval = interval(Duration::from_millis(interval_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            poses: scripted_poses(),
            index: 0,
            interval,
        }
    }
}

#[async_trait::async_trait]
impl LandmarkSource for DryRunLandmarkSource {
    async fn next_frame(&mut self) -> Result<Option<FrameMessage>> {
        self.interval.tick().await;

        let (name, hand) = &self.poses[self.index];
        info!("Dry-run: эмулируем позу '{}'", name);
        self.index = (self.index + 1) % self.poses.len();

        Ok(Some(FrameMessage {
            hands: vec![hand.clone()],
            error: None,
        }))
    }
}

fn pose(handedness: Handedness, overrides: &[(usize, f32, f32)]) -> HandMessage {
    let mut points = vec![Landmark::new(0.5, 0.7); landmarks::COUNT];
    points[landmarks::WRIST] = Landmark::new(0.5, 0.8);
    points[landmarks::THUMB_TIP] = Landmark::new(0.38, 0.52);
    points[landmarks::INDEX_FINGER_TIP] = Landmark::new(0.46, 0.48);
    points[landmarks::MIDDLE_FINGER_TIP] = Landmark::new(0.51, 0.46);
    points[landmarks::RING_FINGER_TIP] = Landmark::new(0.56, 0.47);
    points[landmarks::PINKY_TIP] = Landmark::new(0.58, 0.5);

    for &(index, x, y) in overrides {
        points[index] = Landmark::new(x, y);
    }

    HandMessage {
        handedness,
        score: 1.0,
        landmarks: points,
    }
}

/// Сценарий поз: нейтральная поза между жестами
pub fn scripted_poses() -> Vec<(&'static str, HandMessage)> {
    use landmarks::{MIDDLE_FINGER_TIP as MIDDLE, PINKY_TIP as PINKY, THUMB_TIP as THUMB};

    let gestures = [
        ("click", pose(Handedness::Right, &[(THUMB, 0.45, 0.49)])),
        ("scroll_up", pose(Handedness::Right, &[(THUMB, 0.42, 0.35)])),
        ("scroll_down", pose(Handedness::Right, &[(THUMB, 0.54, 0.62)])),
        ("volume_up", pose(Handedness::Right, &[(MIDDLE, 0.56, 0.42)])),
        ("volume_down", pose(Handedness::Right, &[(MIDDLE, 0.47, 0.47)])),
        ("zoom_in", pose(Handedness::Right, &[(PINKY, 0.4, 0.53)])),
        ("zoom_out", pose(Handedness::Right, &[(MIDDLE, 0.4, 0.5)])),
        ("next_slide", pose(Handedness::Right, &[(THUMB, 0.3, 0.52), (PINKY, 0.62, 0.5)])),
        ("previous_slide", pose(Handedness::Left, &[(THUMB, 0.3, 0.52), (PINKY, 0.62, 0.5)])),
    ];

    let mut poses = Vec::with_capacity(gestures.len() * 2);
    for gesture in gestures {
        poses.push(("neutral", pose(Handedness::Right, &[])));
        poses.push(gesture);
    }
    poses
}
