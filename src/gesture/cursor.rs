use crate::events::{Landmark, ScreenPoint};

/// Размер целевого экрана в пикселях
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
}

impl ScreenGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Линейно перевести нормализованную точку кадра в координаты экрана.
/// Результат всегда внутри экрана.
pub fn map_to_screen(point: &Landmark, screen: &ScreenGeometry) -> ScreenPoint {
    ScreenPoint {
        x: scale_axis(point.x, screen.width),
        y: scale_axis(point.y, screen.height),
    }
}

fn scale_axis(value: f32, size: u32) -> i32 {
    let max = size.saturating_sub(1) as f32;
    let scaled = if value.is_finite() { value * size as f32 } else { 0.0 };
    scaled.clamp(0.0, max) as i32
}
