use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::config::ActionsConfig;
use crate::events::{GestureLabel, InputAction, KeyCode, Modifiers, MouseButton};
use crate::services::keycode_map::KeycodeMap;

/// Таблица "жест -> действие ОС"
#[derive(Debug, Clone, PartialEq)]
pub struct ActionMap {
    table: HashMap<GestureLabel, InputAction>,
}

impl ActionMap {
    /// Таблица по умолчанию с переопределениями из конфигурации
    pub fn from_config(config: &ActionsConfig) -> Result<Self> {
        let mut table: HashMap<GestureLabel, InputAction> = GestureLabel::ALL
            .iter()
            .map(|&label| (label, Self::default_action(label, config.scroll_amount)))
            .collect();

        for (label, definition) in &config.overrides {
            let action = parse_action(definition).map_err(|e| {
                anyhow::anyhow!("Неверное действие для жеста '{}': {}", label.as_str(), e)
            })?;
            table.insert(*label, action);
        }

        Ok(Self { table })
    }

    pub fn default_action(label: GestureLabel, scroll_amount: i32) -> InputAction {
        let ctrl = Modifiers::new().with_ctrl(true);
        match label {
            GestureLabel::Click => InputAction::Click(MouseButton::Left),
            GestureLabel::ScrollUp => InputAction::Scroll(scroll_amount),
            GestureLabel::ScrollDown => InputAction::Scroll(-scroll_amount),
            GestureLabel::VolumeUp => InputAction::Key(KeyCode(115)),
            GestureLabel::VolumeDown => InputAction::Key(KeyCode(114)),
            GestureLabel::ZoomIn => InputAction::KeyCombo { modifiers: ctrl, key: KeyCode(13) },
            GestureLabel::ZoomOut => InputAction::KeyCombo { modifiers: ctrl, key: KeyCode(12) },
            GestureLabel::NextSlide => InputAction::Key(KeyCode(106)),
            GestureLabel::PreviousSlide => InputAction::Key(KeyCode(105)),
        }
    }

    pub fn get(&self, label: GestureLabel) -> InputAction {
        self.table
            .get(&label)
            .copied()
            .unwrap_or_else(|| Self::default_action(label, ActionsConfig::default().scroll_amount))
    }
}

/// Разобрать действие из строки конфигурации:
/// `click`, `right_click`, `middle_click`, `scroll:<n>`, `<key>`, `<mod>+...+<key>`
pub fn parse_action(definition: &str) -> Result<InputAction> {
    let definition = definition.trim().to_lowercase();

    match definition.as_str() {
        "" => bail!("пустое действие"),
        "click" => return Ok(InputAction::Click(MouseButton::Left)),
        "right_click" => return Ok(InputAction::Click(MouseButton::Right)),
        "middle_click" => return Ok(InputAction::Click(MouseButton::Middle)),
        _ => {}
    }

    if let Some(amount) = definition.strip_prefix("scroll:") {
        let amount: i32 = amount
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("неверное значение прокрутки: {}", amount))?;
        if amount == 0 {
            bail!("значение прокрутки не может быть 0");
        }
        return Ok(InputAction::Scroll(amount));
    }

    let parts: Vec<&str> = definition.split('+').map(str::trim).collect();
    let (key_name, modifier_names) = match parts.split_last() {
        Some(split) => split,
        None => bail!("пустое действие"),
    };

    if KeycodeMap::is_modifier(key_name) {
        bail!("действие не может заканчиваться модификатором: {}", definition);
    }

    let key = KeycodeMap::get_keycode(key_name).map_err(|e| anyhow::anyhow!(e))?;

    let mut modifiers = Modifiers::new();
    for name in modifier_names {
        if !modifiers.set(name) {
            bail!("неверный модификатор '{}'", name);
        }
    }

    if modifiers.is_empty() {
        Ok(InputAction::Key(KeyCode::new(key)))
    } else {
        Ok(InputAction::KeyCombo {
            modifiers,
            key: KeyCode::new(key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let map = ActionMap::from_config(&ActionsConfig::default()).unwrap();
        assert_eq!(map.get(GestureLabel::Click), InputAction::Click(MouseButton::Left));
        assert_eq!(map.get(GestureLabel::ScrollUp), InputAction::Scroll(3));
        assert_eq!(map.get(GestureLabel::ScrollDown), InputAction::Scroll(-3));
        assert_eq!(map.get(GestureLabel::VolumeUp), InputAction::Key(KeyCode(115)));
        assert_eq!(
            map.get(GestureLabel::ZoomOut),
            InputAction::KeyCombo {
                modifiers: Modifiers::new().with_ctrl(true),
                key: KeyCode(12),
            }
        );
        assert_eq!(map.get(GestureLabel::PreviousSlide), InputAction::Key(KeyCode(105)));
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = ActionsConfig::default();
        config.overrides.insert(GestureLabel::NextSlide, "PageDown".to_string());
        config.overrides.insert(GestureLabel::Click, "right_click".to_string());

        let map = ActionMap::from_config(&config).unwrap();
        assert_eq!(map.get(GestureLabel::NextSlide), InputAction::Key(KeyCode(109)));
        assert_eq!(map.get(GestureLabel::Click), InputAction::Click(MouseButton::Right));
    }

    #[test]
    fn test_parse_action_variants() {
        assert_eq!(parse_action("scroll:-5").unwrap(), InputAction::Scroll(-5));
        assert_eq!(
            parse_action("ctrl + shift + tab").unwrap(),
            InputAction::KeyCombo {
                modifiers: Modifiers::new().with_ctrl(true).with_shift(true),
                key: KeyCode(15),
            }
        );
        assert_eq!(parse_action("f5").unwrap(), InputAction::Key(KeyCode(63)));
    }

    #[test]
    fn test_parse_action_errors() {
        assert!(parse_action("").is_err());
        assert!(parse_action("scroll:0").is_err());
        assert!(parse_action("scroll:abc").is_err());
        assert!(parse_action("ctrl+").is_err());
        assert!(parse_action("ctrl").is_err());
        assert!(parse_action("hyper+left").is_err());
        assert!(parse_action("nosuchkey").is_err());
    }
}
