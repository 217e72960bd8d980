use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::time::Duration;

/// Распознаваемый жест. Порядок вариантов задаёт приоритет по умолчанию.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    Click,
    ScrollUp,
    ScrollDown,
    VolumeUp,
    VolumeDown,
    ZoomIn,
    ZoomOut,
    NextSlide,
    PreviousSlide,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 9] = [
        GestureLabel::Click,
        GestureLabel::ScrollUp,
        GestureLabel::ScrollDown,
        GestureLabel::VolumeUp,
        GestureLabel::VolumeDown,
        GestureLabel::ZoomIn,
        GestureLabel::ZoomOut,
        GestureLabel::NextSlide,
        GestureLabel::PreviousSlide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::Click => "click",
            GestureLabel::ScrollUp => "scroll_up",
            GestureLabel::ScrollDown => "scroll_down",
            GestureLabel::VolumeUp => "volume_up",
            GestureLabel::VolumeDown => "volume_down",
            GestureLabel::ZoomIn => "zoom_in",
            GestureLabel::ZoomOut => "zoom_out",
            GestureLabel::NextSlide => "next_slide",
            GestureLabel::PreviousSlide => "previous_slide",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureLabel::Click => "Click",
            GestureLabel::ScrollUp => "Scroll Up",
            GestureLabel::ScrollDown => "Scroll Down",
            GestureLabel::VolumeUp => "Volume Up",
            GestureLabel::VolumeDown => "Volume Down",
            GestureLabel::ZoomIn => "Zoom In",
            GestureLabel::ZoomOut => "Zoom Out",
            GestureLabel::NextSlide => "Next Slide",
            GestureLabel::PreviousSlide => "Previous Slide",
        };
        write!(f, "{}", name)
    }
}

/// Кандидаты кадра в порядке убывания приоритета
pub type Candidates = SmallVec<[(GestureLabel, bool); 9]>;

/// Наблюдение одного кадра
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Монотонное время с начала потока
    pub timestamp: Duration,
    pub candidates: Candidates,
}

impl Observation {
    pub fn new(timestamp: Duration, candidates: Candidates) -> Self {
        Self {
            timestamp,
            candidates,
        }
    }

    pub fn satisfied(&self) -> impl Iterator<Item = GestureLabel> + '_ {
        self.candidates
            .iter()
            .filter(|(_, satisfied)| *satisfied)
            .map(|(label, _)| *label)
    }
}

/// Принятое событие жеста
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub label: GestureLabel,
    pub timestamp: Duration,
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}ms", self.label, self.timestamp.as_millis())
    }
}

/// Ответ для фронтенда
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "action", rename_all = "snake_case")]
pub enum GestureStatus {
    Action(GestureLabel),
    Cooldown,
    Idle,
    Inactive,
}

impl GestureStatus {
    pub fn action(&self) -> Option<GestureLabel> {
        match self {
            GestureStatus::Action(label) => Some(*label),
            _ => None,
        }
    }
}
