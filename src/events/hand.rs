use serde::{Deserialize, Serialize};
use std::fmt;

/// Индексы ориентиров кисти (21 точка)
#[allow(dead_code)]
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;

    pub const COUNT: usize = 21;
}

/// Ориентир в нормализованных координатах кадра (0.0..1.0, y вниз)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Евклидово расстояние в плоскости кадра
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Left => write!(f, "Left"),
            Handedness::Right => write!(f, "Right"),
        }
    }
}

/// Одна кисть со всеми ориентирами
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub landmarks: [Landmark; landmarks::COUNT],
    pub handedness: Handedness,
    pub confidence: f32,
}

impl HandLandmarks {
    pub fn point(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    pub fn thumb_tip(&self) -> &Landmark {
        self.point(landmarks::THUMB_TIP)
    }

    pub fn index_tip(&self) -> &Landmark {
        self.point(landmarks::INDEX_FINGER_TIP)
    }

    pub fn middle_tip(&self) -> &Landmark {
        self.point(landmarks::MIDDLE_FINGER_TIP)
    }

    pub fn pinky_tip(&self) -> &Landmark {
        self.point(landmarks::PINKY_TIP)
    }
}

/// Кисть в формате трекера
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandMessage {
    pub handedness: Handedness,
    #[serde(default = "full_confidence")]
    pub score: f32,
    pub landmarks: Vec<Landmark>,
}

fn full_confidence() -> f32 {
    1.0
}

/// Один кадр трекера: строка JSON от подпроцесса или тело загрузки по HTTP
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    #[serde(default)]
    pub hands: Vec<HandMessage>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FrameMessage {
    /// Первая кисть с достаточной уверенностью и полным набором ориентиров
    pub fn best_hand(&self, min_confidence: f32) -> Option<HandLandmarks> {
        self.hands
            .iter()
            .filter(|hand| hand.score >= min_confidence)
            .find_map(|hand| {
                let landmarks: [Landmark; landmarks::COUNT] =
                    hand.landmarks.as_slice().try_into().ok()?;
                Some(HandLandmarks {
                    landmarks,
                    handedness: hand.handedness,
                    confidence: hand.score,
                })
            })
    }
}
