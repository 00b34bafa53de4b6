// Auto-dismissing notice board

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Notice severity, mirroring the flash-message categories
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A single posted notice
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: String,
    pub level: NoticeLevel,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

struct Entry {
    notice: Notice,
    timer: JoinHandle<()>,
}

/// Board of transient notices that dismiss themselves after a fixed delay
///
/// Each notice owns exactly one dismissal timer; dismissing early cancels
/// it, so a removed notice can never be dismissed twice.
pub struct NoticeBoard {
    dismiss_after: Duration,
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl NoticeBoard {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            dismiss_after,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Post a notice and arm its auto-dismiss timer
    pub async fn post(&self, level: NoticeLevel, text: impl Into<String>) -> Notice {
        let notice = Notice {
            id: uuid::Uuid::new_v4().to_string(),
            level,
            text: text.into(),
            posted_at: Utc::now(),
        };

        let entries = Arc::clone(&self.entries);
        let id = notice.id.clone();
        let delay = self.dismiss_after;
        // Anchor dismissal to post time, not to the timer's first poll
        let dismiss_at = tokio::time::Instant::now() + delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(dismiss_at).await;
            if entries.write().await.remove(&id).is_some() {
                debug!("Notice {} auto-dismissed after {}s", id, delay.as_secs());
            }
        });

        self.entries.write().await.insert(
            notice.id.clone(),
            Entry {
                notice: notice.clone(),
                timer,
            },
        );
        notice
    }

    /// Dismiss a notice early, canceling its timer
    pub async fn dismiss(&self, id: &str) -> bool {
        match self.entries.write().await.remove(id) {
            Some(entry) => {
                entry.timer.abort();
                debug!("Notice {} dismissed", entry.notice.id);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the currently visible notices, oldest first
    pub async fn active(&self) -> Vec<Notice> {
        let entries = self.entries.read().await;
        let mut notices: Vec<Notice> = entries.values().map(|e| e.notice.clone()).collect();
        notices.sort_by(|a, b| a.posted_at.cmp(&b.posted_at));
        notices
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_auto_dismisses_after_delay() {
        let board = NoticeBoard::default();
        board
            .post(NoticeLevel::Success, "Certificate uploaded")
            .await;
        assert_eq!(board.active().await.len(), 1);

        advance(Duration::from_secs(4)).await;
        settle().await;
        assert!(board.active().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_dismissal_cancels_the_timer() {
        let board = NoticeBoard::default();
        let notice = board.post(NoticeLevel::Error, "Upload failed").await;

        assert!(board.dismiss(&notice.id).await);
        assert!(board.active().await.is_empty());

        // The canceled timer does nothing when its delay elapses
        advance(Duration::from_secs(5)).await;
        settle().await;
        assert!(!board.dismiss(&notice.id).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notices_expire_independently() {
        let board = NoticeBoard::default();
        board.post(NoticeLevel::Info, "first").await;

        advance(Duration::from_secs(2)).await;
        settle().await;
        board.post(NoticeLevel::Info, "second").await;
        assert_eq!(board.active().await.len(), 2);

        advance(Duration::from_secs(2)).await;
        settle().await;
        let remaining = board.active().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "second");
    }
}
