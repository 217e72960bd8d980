use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{info, error, warn};
use std::sync::Arc;
mod config;
mod error;
mod events;
mod gesture;
mod services;
mod utils;

use config::Config;
use services::{
    control_server,
    ActivationFlag,
    GestureController,
    VirtualInput,
};

#[derive(Parser, Debug)]
#[command(name = "gesture-bridge")]
#[command(about = "Управление компьютером жестами рук: дебаунс жестов и эмуляция ввода")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "gesture.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий и без трекера)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Сразу активировать управление жестами
    #[arg(long)]
    active: bool,

    /// Не запускать HTTP сервер управления
    #[arg(long)]
    no_server: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let level = args.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    init_tracing(&level, &config.logging.format)?;

    info!("Запуск Gesture Bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    let config = Arc::new(config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    } else {
        // Проверка прав доступа
        utils::permissions::check_permissions()?;
    }

    let server_enabled = config.server.enabled && !args.no_server;
    let start_active = args.active || config.gesture.start_active;
    if !server_enabled && !start_active {
        warn!("HTTP сервер отключён и активация не запрошена - жесты не будут обрабатываться");
    }

    // Инициализация компонентов (единое виртуальное устройство для всех сервисов)
    let virtual_input = Arc::new(VirtualInput::new(
        &config.input.device_name,
        config.cursor.screen(),
        args.dry_run,
    )?);
    let activation = Arc::new(ActivationFlag::new(start_active));
    let controller = Arc::new(GestureController::new(
        config.clone(),
        virtual_input.clone(),
        activation.clone(),
        args.dry_run,
    )?);

    info!("Все компоненты инициализированы");

    // Запуск всех сервисов параллельно
    let controller_handle = tokio::spawn({
        let controller = controller.clone();
        async move {
            if let Err(e) = controller.run().await {
                error!("Ошибка в GestureController: {}", e);
            }
        }
    });

    let server_handle = if server_enabled {
        let addr = config.server.socket_addr()?;
        let controller = controller.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = control_server::serve(controller, addr).await {
                error!("Ошибка в HTTP сервере управления: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Останавливаем сессию, чтобы трекер был завершён до выхода
    activation.deactivate();

    controller_handle.abort();
    if let Some(handle) = &server_handle {
        handle.abort();
    }

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = controller_handle.await;
        if let Some(handle) = server_handle {
            let _ = handle.await;
        }
    }).await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("Gesture Bridge завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }

    Ok(())
}
