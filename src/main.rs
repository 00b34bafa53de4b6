use async_trait::async_trait;
use session_guard::config;
use session_guard::guard::{ActivityKind, SessionGuard};
use session_guard::keepalive::HttpKeepAlive;
use session_guard::lock::{SubmissionLock, SubmitControl, TextControl};
use session_guard::notice::{NoticeBoard, NoticeLevel};
use session_guard::prompt::{PromptDecision, WarningPrompt};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{oneshot, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Terminal prompt: the warning question is answered by the next input line
struct TerminalPrompt {
    pending: Mutex<Option<oneshot::Sender<PromptDecision>>>,
}

impl TerminalPrompt {
    fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }

    async fn take_pending(&self) -> Option<oneshot::Sender<PromptDecision>> {
        self.pending.lock().await.take()
    }
}

#[async_trait]
impl WarningPrompt for TerminalPrompt {
    async fn confirm(&self, message: &str) -> PromptDecision {
        let (tx, rx) = oneshot::channel();
        *self.pending.lock().await = Some(tx);
        println!("{} [Y/n]", message);
        rx.await.unwrap_or(PromptDecision::Dismiss)
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_guard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = match config::load_settings_with_fallback() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load settings: {}", e);
            return;
        }
    };

    let page_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/admin/dashboard".to_string());

    let scope = settings.admin_scope();
    let keep_alive = Arc::new(HttpKeepAlive::new(settings.guard.keep_alive_url.clone()));
    let prompt = Arc::new(TerminalPrompt::new());

    let Some(guard) = SessionGuard::spawn_scoped(
        &scope,
        &page_path,
        settings.guard_config(),
        keep_alive,
        prompt.clone(),
    ) else {
        tracing::info!("Page {} is outside the admin area; nothing to guard", page_path);
        return;
    };

    let handle = guard.handle();
    let notices = Arc::new(NoticeBoard::new(settings.notice_delay()));

    tracing::info!(
        "Guard {} armed for {}. Enter = activity, 's' = simulated submit, Ctrl-D = quit.",
        guard.guard_id(),
        page_path
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        // A pending warning swallows the next line as its answer
        if let Some(decision_tx) = prompt.take_pending().await {
            let decision = if line.trim().eq_ignore_ascii_case("n") {
                PromptDecision::Dismiss
            } else {
                PromptDecision::Continue
            };
            let _ = decision_tx.send(decision);
            continue;
        }

        if line.trim() == "s" {
            simulate_submission(&settings, Arc::clone(&notices)).await;
        }

        handle.record_activity(ActivityKind::KeyPress);

        match serde_json::to_string(&handle.status()) {
            Ok(status) => tracing::debug!("Guard status: {}", status),
            Err(e) => tracing::warn!("Failed to serialize guard status: {}", e),
        }
    }

    guard.dispose().await;
    tracing::info!("Guard disposed, exiting");
}

/// Engage a submission lock over a fake upload button and let a simulated
/// request settle it
async fn simulate_submission(settings: &config::Settings, notices: Arc<NoticeBoard>) {
    let button: Arc<dyn SubmitControl> = Arc::new(TextControl::new("Upload Certificates"));
    let lock = SubmissionLock::engage(vec![Arc::clone(&button)], &settings.lock_config());
    tracing::info!("Submit locked: '{}' (enabled: {})", button.label(), button.is_enabled());

    tokio::spawn(async move {
        lock.supervise(async {
            tokio::time::sleep(Duration::from_secs(2)).await;
        })
        .await;
        tracing::info!("Submit released: '{}' (enabled: {})", button.label(), button.is_enabled());
        notices
            .post(NoticeLevel::Success, "Certificates uploaded")
            .await;
    });
}
