use std::collections::HashMap;
use once_cell::sync::Lazy;

/// Маппинг между именами клавиш и кодами evdev
pub struct KeycodeMap;

// Статическая карта клавиш, доступных для действий жестов
static KEY_NAME_TO_CODE: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Мультимедиа
    map.insert("volumeup", 115);    // KEY_VOLUMEUP
    map.insert("volumedown", 114);  // KEY_VOLUMEDOWN
    map.insert("mute", 113);        // KEY_MUTE
    map.insert("playpause", 164);   // KEY_PLAYPAUSE
    map.insert("nextsong", 163);    // KEY_NEXTSONG
    map.insert("previoussong", 165); // KEY_PREVIOUSSONG

    // Масштаб
    map.insert("equal", 13);        // KEY_EQUAL
    map.insert("minus", 12);        // KEY_MINUS

    // Навигация
    map.insert("up", 103);          // KEY_UP
    map.insert("down", 108);        // KEY_DOWN
    map.insert("left", 105);        // KEY_LEFT
    map.insert("right", 106);       // KEY_RIGHT
    map.insert("pageup", 104);      // KEY_PAGEUP
    map.insert("pagedown", 109);    // KEY_PAGEDOWN
    map.insert("home", 102);        // KEY_HOME
    map.insert("end", 107);         // KEY_END

    // Специальные клавиши
    map.insert("space", 57);        // KEY_SPACE
    map.insert("enter", 28);        // KEY_ENTER
    map.insert("escape", 1);        // KEY_ESC
    map.insert("tab", 15);          // KEY_TAB
    map.insert("f5", 63);           // KEY_F5

    // Модификаторы
    map.insert("ctrl", 29);         // KEY_LEFTCTRL
    map.insert("alt", 56);          // KEY_LEFTALT
    map.insert("shift", 42);        // KEY_LEFTSHIFT
    map.insert("super", 125);       // KEY_LEFTMETA

    map
});

static CODE_TO_KEY_NAME: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    KEY_NAME_TO_CODE.iter().map(|(&name, &code)| (code, name)).collect()
});

impl KeycodeMap {
    /// Получить код клавиши по её имени
    pub fn get_keycode(key_name: &str) -> Result<u16, String> {
        let normalized = key_name.to_lowercase();
        KEY_NAME_TO_CODE.get(normalized.as_str())
            .copied()
            .ok_or_else(|| format!("Unknown key: {}", key_name))
    }

    /// Получить имя клавиши по её коду
    pub fn get_key_name(keycode: u16) -> Option<&'static str> {
        CODE_TO_KEY_NAME.get(&keycode).copied()
    }

    /// Проверить, является ли клавиша модификатором
    pub fn is_modifier(key_name: &str) -> bool {
        let normalized = key_name.to_lowercase();
        matches!(normalized.as_str(), "ctrl" | "alt" | "shift" | "super")
    }
}
