// Duplicate-submit prevention with settlement-tied release

use super::types::{LockConfig, SubmitControl};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Lock over a form's submit controls for the duration of one request
///
/// Engaging disables every control and swaps its label for a busy
/// indicator, synchronously, before any network activity can begin. The
/// primary unlock signal is the settlement of the in-flight request
/// (`supervise`); a safety timer force-releases a lock that is still held
/// after the configured window so a hung request can never disable the UI
/// permanently.
pub struct SubmissionLock {
    lock_id: String,
    shared: Arc<LockShared>,
    safety: Mutex<Option<JoinHandle<()>>>,
}

struct LockShared {
    controls: Vec<Arc<dyn SubmitControl>>,
    snapshots: Vec<String>,
    released: AtomicBool,
}

impl LockShared {
    /// Restore every control to its snapshot. Returns false if the lock
    /// was already released; the restore happens at most once.
    fn restore(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        for (control, original) in self.controls.iter().zip(&self.snapshots) {
            control.set_label(original);
            control.enable();
        }
        true
    }
}

impl SubmissionLock {
    /// Lock the given submit controls
    ///
    /// A form without submit controls yields an already-released lock; the
    /// absence of a target is a no-op, never an error.
    pub fn engage(controls: Vec<Arc<dyn SubmitControl>>, config: &LockConfig) -> Self {
        let lock_id = uuid::Uuid::new_v4().to_string();

        if controls.is_empty() {
            debug!("Submission lock {}: no submit controls found", lock_id);
            return Self {
                lock_id,
                shared: Arc::new(LockShared {
                    controls,
                    snapshots: Vec::new(),
                    released: AtomicBool::new(true),
                }),
                safety: Mutex::new(None),
            };
        }

        let snapshots: Vec<String> = controls.iter().map(|c| c.label()).collect();
        for control in &controls {
            control.disable();
            control.set_label(&config.busy_label);
        }
        debug!(
            "Submission lock {} engaged over {} control(s)",
            lock_id,
            controls.len()
        );

        let shared = Arc::new(LockShared {
            controls,
            snapshots,
            released: AtomicBool::new(false),
        });

        let safety_shared = Arc::clone(&shared);
        let safety_id = lock_id.clone();
        let window = config.safety_release;
        // Anchor the window to engage time, not to the task's first poll
        let release_at = tokio::time::Instant::now() + window;
        let safety = tokio::spawn(async move {
            tokio::time::sleep_until(release_at).await;
            if safety_shared.restore() {
                warn!(
                    "Submission lock {} hit the {}s safety window; controls restored",
                    safety_id,
                    window.as_secs()
                );
            }
        });

        Self {
            lock_id,
            shared,
            safety: Mutex::new(Some(safety)),
        }
    }

    /// Await the in-flight request and release when it settles
    ///
    /// Settlement, success or failure alike, is the unlock signal; the
    /// safety timer stays armed only as a backstop for a future that never
    /// completes.
    pub async fn supervise<F, T>(self, request: F) -> T
    where
        F: Future<Output = T>,
    {
        let output = request.await;
        self.release();
        output
    }

    /// Restore the controls and cancel the safety timer. Idempotent.
    pub fn release(&self) {
        if self.shared.restore() {
            debug!("Submission lock {} released", self.lock_id);
        }
        let handle = self
            .safety
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::SeqCst)
    }

    pub fn lock_id(&self) -> &str {
        &self.lock_id
    }
}
