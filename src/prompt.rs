// Warning prompt abstraction

use async_trait::async_trait;

/// User decision on the expiry warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptDecision {
    /// Keep working; the session should be extended
    Continue,
    /// Let the session lapse
    Dismiss,
}

/// Modal suspension point shown when the idle deadline is reached
///
/// While `confirm` is pending the guard does not process activity resets,
/// matching the blocking behavior of a native confirmation dialog. A
/// non-blocking implementation gets the same semantics for free: the guard
/// discards whatever activity queued up while the prompt was open.
#[async_trait]
pub trait WarningPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> PromptDecision;
}

/// Prompt that always answers with a fixed decision
///
/// Useful for headless runs where nobody can answer the prompt.
pub struct StaticPrompt {
    decision: PromptDecision,
}

impl StaticPrompt {
    pub fn new(decision: PromptDecision) -> Self {
        Self { decision }
    }
}

#[async_trait]
impl WarningPrompt for StaticPrompt {
    async fn confirm(&self, _message: &str) -> PromptDecision {
        self.decision
    }
}
