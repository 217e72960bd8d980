use crate::services::keycode_map::KeycodeMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Код клавиши (evdev коды)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match KeycodeMap::get_key_name(self.0) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "KEY_{}", self.0),
        }
    }
}

/// Модификаторы клавиш
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    #[allow(dead_code)]
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.super_key
    }

    pub fn to_vec(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.ctrl { result.push("ctrl"); }
        if self.alt { result.push("alt"); }
        if self.shift { result.push("shift"); }
        if self.super_key { result.push("super"); }
        result
    }

    /// Установить модификатор по имени; false для неизвестного имени
    pub fn set(&mut self, name: &str) -> bool {
        match name {
            "ctrl" => self.ctrl = true,
            "alt" => self.alt = true,
            "shift" => self.shift = true,
            "super" => self.super_key = true,
            _ => return false,
        }
        true
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.to_vec();
        if modifiers.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", modifiers.join("+"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Код кнопки evdev (BTN_LEFT/BTN_RIGHT/BTN_MIDDLE)
    pub fn code(&self) -> u16 {
        match self {
            MouseButton::Left => 0x110,
            MouseButton::Right => 0x111,
            MouseButton::Middle => 0x112,
        }
    }
}

/// Действие ОС, в которое переводится жест
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Click(MouseButton),
    /// Положительное значение - прокрутка вверх
    Scroll(i32),
    Key(KeyCode),
    KeyCombo { modifiers: Modifiers, key: KeyCode },
}

impl fmt::Display for InputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputAction::Click(button) => write!(f, "click({:?})", button),
            InputAction::Scroll(amount) => write!(f, "scroll({})", amount),
            InputAction::Key(key) => write!(f, "{}", key),
            InputAction::KeyCombo { modifiers, key } => write!(f, "{}+{}", modifiers, key),
        }
    }
}

/// Точка на экране в пикселях
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}
