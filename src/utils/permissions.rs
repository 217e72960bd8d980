use crate::error::{GestureError, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{info, warn};

const UINPUT_DEVICE: &str = "/dev/uinput";

/// Проверить права доступа к необходимым ресурсам
pub fn check_permissions() -> Result<()> {
    info!("Проверка прав доступа...");

    // Проверка доступа к /dev/uinput
    check_uinput_access(Path::new(UINPUT_DEVICE))?;

    // Проверка, что не запущен от root (рекомендация безопасности)
    check_not_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_uinput_access(uinput_device: &Path) -> Result<()> {
    if !uinput_device.exists() {
        return Err(GestureError::Permission(format!(
            "{} не существует, загрузите модуль: sudo modprobe uinput",
            uinput_device.display()
        )));
    }

    match fs::metadata(uinput_device) {
        Ok(metadata) => {
            let mode = metadata.permissions().mode();

            // Проверяем права доступа (обычно 660 или 666)
            if mode & 0o006 == 0 && mode & 0o060 == 0 {
                return Err(GestureError::Permission(format!(
                    "Нет прав доступа к {}. Добавьте пользователя в группу 'uinput' или 'input'",
                    uinput_device.display()
                )));
            }

            info!("Доступ к {} подтвержден", uinput_device.display());
            Ok(())
        }
        Err(e) => Err(GestureError::Permission(format!(
            "Не удалось проверить права доступа к {}: {}",
            uinput_device.display(),
            e
        ))),
    }
}

fn check_not_root() {
    // Проверяем переменную окружения USER
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("⚠️  Приложение запущено от имени root!");
            warn!("   Рекомендуется добавить пользователя в группу 'uinput'");
            warn!("   и запускать приложение от имени обычного пользователя");
            for command in get_setup_commands() {
                warn!("   {}", command);
            }
        }
        Ok(user) => {
            info!("Приложение запущено от имени пользователя: {}", user);
        }
        Err(_) => {
            warn!("Не удалось определить пользователя");
        }
    }
}

/// Получить рекомендуемые команды для настройки прав доступа
pub fn get_setup_commands() -> Vec<String> {
    vec![
        "# Добавить пользователя в необходимые группы:".to_string(),
        "sudo usermod -a -G input,uinput $USER".to_string(),
        "# Загрузить модуль uinput:".to_string(),
        "sudo modprobe uinput".to_string(),
        "# Автоматическая загрузка модуля при загрузке системы:".to_string(),
        "echo 'uinput' | sudo tee /etc/modules-load.d/uinput.conf".to_string(),
    ]
}
