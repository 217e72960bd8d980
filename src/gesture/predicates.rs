//! Геометрические предикаты жестов.
//!
//! Все расстояния заданы в нормализованных координатах кадра (0.0..1.0),
//! ось y направлена вниз. Функции чистые: один кадр - один набор кандидатов.

use serde::{Deserialize, Serialize};

use crate::events::{Candidates, GestureLabel, HandLandmarks, Handedness};

/// Пороговые значения предикатов
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    /// Щипок большой + указательный
    pub click_distance: f32,
    /// Насколько большой палец должен быть выше/ниже указательного и мизинца
    pub vertical_margin: f32,
    /// Допустимое горизонтальное смещение большого пальца при прокрутке
    pub horizontal_alignment: f32,
    /// Указательный и средний разведены
    pub volume_up_spread: f32,
    /// Указательный и средний сведены
    pub volume_down_pinch: f32,
    /// Большой + мизинец
    pub zoom_in_distance: f32,
    /// Большой + средний
    pub zoom_out_distance: f32,
    /// Ладонь раскрыта: большой и мизинец далеко друг от друга
    pub slide_spread: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        // Пиксельные пороги камеры 640x480, приведённые к нормализованным единицам
        Self {
            click_distance: 0.05,
            vertical_margin: 0.06,
            horizontal_alignment: 0.09,
            volume_up_spread: 0.09,
            volume_down_pinch: 0.03,
            zoom_in_distance: 0.06,
            zoom_out_distance: 0.06,
            slide_spread: 0.23,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> anyhow::Result<()> {
        let values = [
            ("click_distance", self.click_distance),
            ("vertical_margin", self.vertical_margin),
            ("horizontal_alignment", self.horizontal_alignment),
            ("volume_up_spread", self.volume_up_spread),
            ("volume_down_pinch", self.volume_down_pinch),
            ("zoom_in_distance", self.zoom_in_distance),
            ("zoom_out_distance", self.zoom_out_distance),
            ("slide_spread", self.slide_spread),
        ];

        for (name, value) in values {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("Порог {} должен быть положительным числом, получено {}", name, value);
            }
        }

        if self.volume_down_pinch >= self.volume_up_spread {
            anyhow::bail!(
                "volume_down_pinch ({}) должен быть меньше volume_up_spread ({})",
                self.volume_down_pinch,
                self.volume_up_spread
            );
        }

        Ok(())
    }
}

/// Проверить один жест на текущем кадре
pub fn is_satisfied(label: GestureLabel, hand: &HandLandmarks, thresholds: &Thresholds) -> bool {
    let thumb = hand.thumb_tip();
    let index = hand.index_tip();
    let middle = hand.middle_tip();
    let pinky = hand.pinky_tip();
    let margin = thresholds.vertical_margin;

    match label {
        GestureLabel::Click => index.distance(thumb) < thresholds.click_distance,
        GestureLabel::ScrollUp => {
            thumb.y < index.y - margin
                && thumb.y < pinky.y - margin
                && (thumb.x - index.x).abs() < thresholds.horizontal_alignment
        }
        GestureLabel::ScrollDown => {
            thumb.y > index.y + margin
                && thumb.y > pinky.y + margin
                && (thumb.x - pinky.x).abs() < thresholds.horizontal_alignment
        }
        GestureLabel::VolumeUp => index.distance(middle) > thresholds.volume_up_spread,
        GestureLabel::VolumeDown => index.distance(middle) < thresholds.volume_down_pinch,
        GestureLabel::ZoomIn => thumb.distance(pinky) < thresholds.zoom_in_distance,
        GestureLabel::ZoomOut => thumb.distance(middle) < thresholds.zoom_out_distance,
        GestureLabel::NextSlide => {
            hand.handedness == Handedness::Right && thumb.distance(pinky) > thresholds.slide_spread
        }
        GestureLabel::PreviousSlide => {
            hand.handedness == Handedness::Left && thumb.distance(pinky) > thresholds.slide_spread
        }
    }
}

/// Кандидаты кадра в порядке приоритета
pub fn evaluate_candidates(
    hand: &HandLandmarks,
    thresholds: &Thresholds,
    priority: &[GestureLabel],
) -> Candidates {
    priority
        .iter()
        .map(|&label| (label, is_satisfied(label, hand, thresholds)))
        .collect()
}
