use crate::debug_if_enabled;
use crate::error::{GestureError, Result};
use crate::events::{InputAction, KeyCode, Modifiers, ScreenPoint};
use crate::gesture::cursor::ScreenGeometry;
use parking_lot::Mutex;
use tracing::{debug, info};

// Типы и коды событий ядра (linux/input-event-codes.h)
const EV_SYN: i32 = 0;
const EV_KEY: i32 = 1;
const EV_REL: i32 = 2;
const EV_ABS: i32 = 3;
const REL_WHEEL: i32 = 8;
const ABS_X: i32 = 0;
const ABS_Y: i32 = 1;

const KEY_LEFTCTRL: u16 = 29;
const KEY_LEFTALT: u16 = 56;
const KEY_LEFTSHIFT: u16 = 42;
const KEY_LEFTMETA: u16 = 125;

/// Исполнитель действий ОС
pub trait ActionExecutor: Send + Sync {
    fn perform(&self, action: &InputAction) -> Result<()>;
    fn move_cursor(&self, point: ScreenPoint) -> Result<()>;
}

/// Виртуальное устройство uinput: клавиатура, кнопки мыши, колесо и абсолютный курсор
pub struct VirtualInput {
    device: Mutex<Option<uinput::Device>>,
    device_name: String,
    dry_run: bool,
}

impl VirtualInput {
    pub fn new(device_name: &str, screen: ScreenGeometry, dry_run: bool) -> Result<Self> {
        info!("Инициализация VirtualInput '{}' (dry_run: {})", device_name, dry_run);

        let device = if dry_run {
            None
        } else {
            Some(Self::create_virtual_device(device_name, screen)?)
        };

        Ok(Self {
            device: Mutex::new(device),
            device_name: device_name.to_string(),
            dry_run,
        })
    }

    fn create_virtual_device(device_name: &str, screen: ScreenGeometry) -> Result<uinput::Device> {
        info!(
            "Создание виртуального устройства uinput '{}' (экран {}x{})",
            device_name, screen.width, screen.height
        );

        let virtual_device = uinput::default()?
            .name(device_name)?
            .event(uinput::event::Keyboard::All)?
            .event(uinput::event::Controller::All)?
            .event(uinput::event::relative::Wheel::Vertical)?
            .event(uinput::event::absolute::Position::X)?
            .min(0)
            .max(screen.width.saturating_sub(1) as i32)
            .event(uinput::event::absolute::Position::Y)?
            .min(0)
            .max(screen.height.saturating_sub(1) as i32)
            .create()
            .map_err(|e| GestureError::Internal(format!("Не удалось создать виртуальное устройство '{}': {}", device_name, e)))?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    fn with_device<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut uinput::Device) -> std::result::Result<(), uinput::Error>,
    {
        let mut guard = self.device.lock();
        let device = guard
            .as_mut()
            .ok_or_else(|| GestureError::Internal("Виртуальное устройство недоступно".to_string()))?;

        f(device)?;
        // Синхронизируем события
        device.write(EV_SYN, 0, 0)?;
        Ok(())
    }

    fn modifier_codes(modifiers: &Modifiers) -> Vec<u16> {
        let mut codes = Vec::new();
        if modifiers.ctrl { codes.push(KEY_LEFTCTRL); }
        if modifiers.alt { codes.push(KEY_LEFTALT); }
        if modifiers.shift { codes.push(KEY_LEFTSHIFT); }
        if modifiers.super_key { codes.push(KEY_LEFTMETA); }
        codes
    }

    fn tap(device: &mut uinput::Device, code: u16) -> std::result::Result<(), uinput::Error> {
        device.write(EV_KEY, code as i32, 1)?;
        device.write(EV_SYN, 0, 0)?;
        device.write(EV_KEY, code as i32, 0)
    }
}

impl ActionExecutor for VirtualInput {
    fn perform(&self, action: &InputAction) -> Result<()> {
        if self.dry_run {
            info!("[DRY RUN] Действие '{}' на устройстве '{}'", action, self.device_name);
            return Ok(());
        }

        debug!("Выполнение действия: {}", action);

        let result = match *action {
            InputAction::Click(button) => self.with_device(|device| Self::tap(device, button.code())),
            InputAction::Scroll(amount) => {
                self.with_device(|device| device.write(EV_REL, REL_WHEEL, amount))
            }
            InputAction::Key(KeyCode(code)) => self.with_device(|device| Self::tap(device, code)),
            InputAction::KeyCombo { modifiers, key } => {
                let modifier_codes = Self::modifier_codes(&modifiers);
                self.with_device(|device| {
                    for code in &modifier_codes {
                        device.write(EV_KEY, *code as i32, 1)?;
                    }
                    Self::tap(device, key.value())?;
                    for code in modifier_codes.iter().rev() {
                        device.write(EV_KEY, *code as i32, 0)?;
                    }
                    Ok(())
                })
            }
        };

        result.map_err(|e| GestureError::Internal(format!("Не удалось выполнить действие {}: {}", action, e)))
    }

    fn move_cursor(&self, point: ScreenPoint) -> Result<()> {
        if self.dry_run {
            debug_if_enabled!("[DRY RUN] Курсор -> ({}, {})", point.x, point.y);
            return Ok(());
        }

        self.with_device(|device| {
            device.write(EV_ABS, ABS_X, point.x)?;
            device.write(EV_ABS, ABS_Y, point.y)
        })
    }
}

impl Drop for VirtualInput {
    fn drop(&mut self) {
        if !self.dry_run {
            info!("Закрытие виртуального устройства '{}'", self.device_name);
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Исполнитель, который только запоминает действия
    #[derive(Default)]
    pub struct RecordingExecutor {
        pub actions: Mutex<Vec<InputAction>>,
        pub cursor: Mutex<Vec<ScreenPoint>>,
    }

    impl RecordingExecutor {
        pub fn actions(&self) -> Vec<InputAction> {
            self.actions.lock().clone()
        }

        pub fn cursor(&self) -> Vec<ScreenPoint> {
            self.cursor.lock().clone()
        }
    }

    impl ActionExecutor for RecordingExecutor {
        fn perform(&self, action: &InputAction) -> Result<()> {
            self.actions.lock().push(*action);
            Ok(())
        }

        fn move_cursor(&self, point: ScreenPoint) -> Result<()> {
            self.cursor.lock().push(point);
            Ok(())
        }
    }
}
