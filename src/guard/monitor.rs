// Session guard actor: idle deadline scheduling and keep-alive dispatch

use super::scope::AdminScope;
use super::types::{ActivityEvent, ActivityKind, GuardConfig, GuardState, GuardStatus};
use crate::keepalive::KeepAlive;
use crate::prompt::{PromptDecision, WarningPrompt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

enum Command {
    Activity(ActivityEvent),
    Dispose,
}

/// Cloneable handle for feeding activity into a running guard
#[derive(Clone)]
pub struct GuardHandle {
    tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<GuardStatus>,
}

impl GuardHandle {
    /// Record one qualifying activity event
    ///
    /// Cancels the pending idle deadline and replaces it with a fresh one.
    /// A disarmed guard is rearmed by this call.
    pub fn record_activity(&self, kind: ActivityKind) {
        let _ = self.tx.send(Command::Activity(ActivityEvent::now(kind)));
    }

    pub fn status(&self) -> GuardStatus {
        self.status_rx.borrow().clone()
    }

    pub fn state(&self) -> GuardState {
        self.status_rx.borrow().state
    }

    /// Wait until the guard publishes its next status change
    pub async fn changed(&mut self) {
        let _ = self.status_rx.changed().await;
    }
}

/// Idle-timeout guard for one admin page instance
///
/// Owns its activity subscription and a single pending deadline. The guard
/// is advisory UX only: it warns the user ahead of server-side expiry and
/// asks the server to extend the session, but enforcement stays with the
/// server.
pub struct SessionGuard {
    guard_id: String,
    handle: GuardHandle,
    task: JoinHandle<()>,
}

impl SessionGuard {
    /// Arm a new guard with an initial deadline of now + idle threshold
    pub fn spawn(
        config: GuardConfig,
        keep_alive: Arc<dyn KeepAlive>,
        prompt: Arc<dyn WarningPrompt>,
    ) -> Self {
        let guard_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let status = GuardStatus::armed();
        let (status_tx, status_rx) = watch::channel(status.clone());

        info!(
            "Arming session guard {} ({}s idle threshold)",
            guard_id,
            config.idle_threshold.as_secs()
        );

        let actor = GuardActor {
            guard_id: guard_id.clone(),
            config,
            keep_alive,
            prompt,
            rx,
            status_tx,
            status,
        };
        // The initial deadline is anchored to spawn time, not to the
        // actor's first poll
        let initial_deadline = Instant::now() + actor.config.idle_threshold;
        let task = tokio::spawn(actor.run(initial_deadline));

        Self {
            guard_id,
            handle: GuardHandle { tx, status_rx },
            task,
        }
    }

    /// Arm a guard only if the page path falls inside the admin area
    pub fn spawn_scoped(
        scope: &AdminScope,
        path: &str,
        config: GuardConfig,
        keep_alive: Arc<dyn KeepAlive>,
        prompt: Arc<dyn WarningPrompt>,
    ) -> Option<Self> {
        if !scope.contains(path) {
            debug!("Path {} is outside {}, guard not armed", path, scope.prefix());
            return None;
        }
        Some(Self::spawn(config, keep_alive, prompt))
    }

    pub fn guard_id(&self) -> &str {
        &self.guard_id
    }

    pub fn handle(&self) -> GuardHandle {
        self.handle.clone()
    }

    pub fn record_activity(&self, kind: ActivityKind) {
        self.handle.record_activity(kind);
    }

    pub fn status(&self) -> GuardStatus {
        self.handle.status()
    }

    pub fn state(&self) -> GuardState {
        self.handle.state()
    }

    /// Tear the guard down and wait for its actor to exit
    pub async fn dispose(mut self) {
        let _ = self.handle.tx.send(Command::Dispose);
        let _ = (&mut self.task).await;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct GuardActor {
    guard_id: String,
    config: GuardConfig,
    keep_alive: Arc<dyn KeepAlive>,
    prompt: Arc<dyn WarningPrompt>,
    rx: mpsc::UnboundedReceiver<Command>,
    status_tx: watch::Sender<GuardStatus>,
    status: GuardStatus,
}

impl GuardActor {
    async fn run(mut self, initial_deadline: Instant) {
        // The only pending deadline; None while disarmed. Every reset
        // replaces it wholesale, so stale timers cannot accumulate.
        let mut deadline = Some(initial_deadline);

        loop {
            tokio::select! {
                biased;
                cmd = self.rx.recv() => match cmd {
                    Some(Command::Activity(event)) => {
                        deadline = Some(Instant::now() + self.config.idle_threshold);
                        self.note_activity(event);
                    }
                    Some(Command::Dispose) | None => break,
                },
                _ = Self::idle(deadline) => {
                    let outcome = self.warn().await;
                    if outcome.disposed {
                        break;
                    }
                    deadline = outcome.next_deadline;
                }
            }
        }

        debug!("Session guard {} disposed", self.guard_id);
    }

    async fn idle(deadline: Option<Instant>) {
        match deadline {
            Some(at) => sleep_until(at).await,
            None => std::future::pending().await,
        }
    }

    fn note_activity(&mut self, event: ActivityEvent) {
        if self.status.state == GuardState::Disarmed {
            debug!("Guard {} rearmed by {:?}", self.guard_id, event.kind);
        }
        self.status.state = GuardState::Armed;
        self.status.last_activity_at = event.at;
        self.publish();
    }

    async fn warn(&mut self) -> WarnOutcome {
        self.status.state = GuardState::Warning;
        self.status.warnings_shown += 1;
        self.publish();
        info!(
            "Guard {} idle threshold reached, prompting user",
            self.guard_id
        );

        let decision = self.prompt.confirm(&self.config.warning_message).await;

        // Activity that queued up while the prompt was open does not count
        // as a reset; only the user's decision moves the state machine.
        let mut disposed = false;
        while let Ok(cmd) = self.rx.try_recv() {
            if matches!(cmd, Command::Dispose) {
                disposed = true;
            }
        }

        let next_deadline = match decision {
            PromptDecision::Continue => {
                // Rearm first; the keep-alive outcome is never waited on.
                self.status.state = GuardState::Armed;
                self.status.keep_alives_sent += 1;
                self.publish();

                let keep_alive = Arc::clone(&self.keep_alive);
                tokio::spawn(async move {
                    keep_alive.send().await;
                });

                Some(Instant::now() + self.config.idle_threshold)
            }
            PromptDecision::Dismiss => {
                self.status.state = GuardState::Disarmed;
                self.publish();
                warn!(
                    "Guard {} warning dismissed; expiry is left to the server",
                    self.guard_id
                );
                None
            }
        };

        WarnOutcome {
            next_deadline,
            disposed,
        }
    }

    fn publish(&self) {
        let _ = self.status_tx.send(self.status.clone());
    }
}

struct WarnOutcome {
    next_deadline: Option<Instant>,
    disposed: bool,
}
