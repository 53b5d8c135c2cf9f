//! Notification Dispatcher
//!
//! Hands admitted events to the tokio blocking pool after the inspection
//! result is final. The task is detached: dropping the handle (or the
//! request that scheduled it) does not cancel delivery.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::logic::alert::AlertTier;
use super::types::NotificationEvent;
use super::webhook::Notifier;

const DEFAULT_MAX_HISTORY: usize = 100;

/// One delivery attempt
#[derive(Debug, Clone, Serialize)]
pub struct DispatchRecord {
    pub event_id: Uuid,
    pub shipment_id: String,
    pub tier: AlertTier,
    pub success: bool,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchStats {
    pub notifier: String,
    pub sent: u64,
    pub failed: u64,
    /// Newest last
    pub recent: Vec<DispatchRecord>,
}

pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    sent: AtomicU64,
    failed: AtomicU64,
    history: Mutex<VecDeque<DispatchRecord>>,
    max_history: usize,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_history(notifier, DEFAULT_MAX_HISTORY)
    }

    pub fn with_history(notifier: Arc<dyn Notifier>, max_history: usize) -> Self {
        Self {
            notifier,
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            history: Mutex::new(VecDeque::with_capacity(max_history)),
            max_history,
        }
    }

    /// Deliver on the current thread and record the outcome
    pub fn dispatch_blocking(&self, event: &NotificationEvent) -> Result<String, DispatchError> {
        let result = self.notifier.dispatch(event);

        let detail = match &result {
            Ok(message) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
                message.clone()
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("Notification {} for shipment {} failed: {}", event.event_id, event.shipment_id, e);
                e.to_string()
            }
        };

        let mut history = self.history.lock();
        history.push_back(DispatchRecord {
            event_id: event.event_id,
            shipment_id: event.shipment_id.clone(),
            tier: event.tier,
            success: result.is_ok(),
            detail,
            timestamp: Utc::now(),
        });
        while history.len() > self.max_history {
            history.pop_front();
        }

        result
    }

    /// Fire-and-forget on the blocking pool; requires a tokio runtime
    pub fn spawn(self: &Arc<Self>, event: NotificationEvent) -> DispatchHandle {
        let dispatcher = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || dispatcher.dispatch_blocking(&event));
        DispatchHandle { task }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            notifier: self.notifier.name().to_string(),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            recent: self.history.lock().iter().cloned().collect(),
        }
    }
}

/// Join handle for a scheduled dispatch; dropping it detaches the task
pub struct DispatchHandle {
    task: tokio::task::JoinHandle<Result<String, DispatchError>>,
}

impl DispatchHandle {
    pub async fn wait(self) -> Result<String, DispatchError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(DispatchError::Aborted { message: e.to_string() }),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::ClassCounts;

    /// Succeeds or fails on demand, remembers shipment ids
    struct ScriptedNotifier {
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    impl Notifier for ScriptedNotifier {
        fn name(&self) -> &str {
            "scripted"
        }

        fn dispatch(&self, event: &NotificationEvent) -> Result<String, DispatchError> {
            self.seen.lock().push(event.shipment_id.clone());
            if self.fail {
                Err(DispatchError::Status { status: 503 })
            } else {
                Ok("ok".to_string())
            }
        }
    }

    fn notifier(fail: bool) -> Arc<ScriptedNotifier> {
        Arc::new(ScriptedNotifier { fail, seen: Mutex::new(Vec::new()) })
    }

    fn event(shipment: &str) -> NotificationEvent {
        NotificationEvent::new(shipment, "x.jpg", 0.9, AlertTier::Critical, ClassCounts::new(), "", "v1.0.0")
    }

    #[test]
    fn test_counts_and_history() {
        let ok = NotificationDispatcher::new(notifier(false));
        ok.dispatch_blocking(&event("A")).unwrap();
        ok.dispatch_blocking(&event("B")).unwrap();

        let stats = ok.stats();
        assert_eq!((stats.sent, stats.failed), (2, 0));
        assert_eq!(stats.recent.len(), 2);
        assert_eq!(stats.recent[1].shipment_id, "B");

        let bad = NotificationDispatcher::new(notifier(true));
        assert_eq!(bad.dispatch_blocking(&event("C")), Err(DispatchError::Status { status: 503 }));
        let stats = bad.stats();
        assert_eq!((stats.sent, stats.failed), (0, 1));
        assert!(!stats.recent[0].success);
    }

    #[test]
    fn test_history_is_bounded() {
        let dispatcher = NotificationDispatcher::with_history(notifier(false), 3);
        for i in 0..10 {
            dispatcher.dispatch_blocking(&event(&format!("S{}", i))).unwrap();
        }
        let stats = dispatcher.stats();
        assert_eq!(stats.sent, 10);
        let ids: Vec<_> = stats.recent.iter().map(|r| r.shipment_id.as_str()).collect();
        assert_eq!(ids, vec!["S7", "S8", "S9"]);
    }

    #[tokio::test]
    async fn test_spawn_delivers_once() {
        let scripted = notifier(false);
        let dispatcher = Arc::new(NotificationDispatcher::new(scripted.clone()));

        let result = dispatcher.spawn(event("ASYNC")).wait().await;

        assert_eq!(result, Ok("ok".to_string()));
        assert_eq!(*scripted.seen.lock(), vec!["ASYNC".to_string()]);
    }

    #[tokio::test]
    async fn test_dropped_handle_still_delivers() {
        let scripted = notifier(false);
        let dispatcher = Arc::new(NotificationDispatcher::new(scripted.clone()));

        drop(dispatcher.spawn(event("DETACHED")));

        for _ in 0..100 {
            if dispatcher.stats().sent == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(dispatcher.stats().sent, 1);
        assert_eq!(scripted.seen.lock().len(), 1);
    }
}
