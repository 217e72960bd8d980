use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;
use tracing::info;

/// Флаг активации управления жестами.
///
/// Единственное разделяемое изменяемое состояние между циклом кадров и
/// поверхностью управления. Чтение - Acquire, запись - Release. Эпоха
/// увеличивается при каждой активации, чтобы цикл сбрасывал состояние
/// дебаунсера даже при быстром stop/start.
#[derive(Debug, Default)]
pub struct ActivationFlag {
    active: AtomicBool,
    epoch: AtomicU64,
    changed: Notify,
}

impl ActivationFlag {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
            epoch: AtomicU64::new(if active { 1 } else { 0 }),
            changed: Notify::new(),
        }
    }

    /// Включить; false если уже было включено
    pub fn activate(&self) -> bool {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        info!("Управление жестами активировано (эпоха {})", epoch);
        self.changed.notify_waiters();
        true
    }

    /// Выключить; false если не было включено
    pub fn deactivate(&self) -> bool {
        if self
            .active
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        info!("Управление жестами остановлено");
        self.changed.notify_waiters();
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Дождаться активации
    pub async fn wait_active(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            // Регистрируемся до проверки, чтобы не потерять уведомление
            notified.as_mut().enable();

            if self.is_active() {
                return;
            }
            notified.await;
        }
    }

    /// Дождаться деактивации
    pub async fn wait_inactive(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.is_active() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_activate_deactivate_transitions() {
        let flag = ActivationFlag::new(false);
        assert!(!flag.is_active());
        assert_eq!(flag.epoch(), 0);

        assert!(flag.activate());
        assert!(!flag.activate());
        assert!(flag.is_active());
        assert_eq!(flag.epoch(), 1);

        assert!(flag.deactivate());
        assert!(!flag.deactivate());
        assert!(!flag.is_active());

        assert!(flag.activate());
        assert_eq!(flag.epoch(), 2);
    }

    #[test]
    fn test_start_active() {
        let flag = ActivationFlag::new(true);
        assert!(flag.is_active());
        assert_eq!(flag.epoch(), 1);
    }

    #[tokio::test]
    async fn test_wait_active_wakes_on_activation() {
        let flag = Arc::new(ActivationFlag::new(false));
        let waiter = {
            let flag = Arc::clone(&flag);
            tokio::spawn(async move { flag.wait_active().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        flag.activate();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake up")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_inactive_returns_immediately_when_stopped() {
        let flag = ActivationFlag::new(false);
        tokio::time::timeout(Duration::from_millis(100), flag.wait_inactive())
            .await
            .expect("should not block");
    }
}
