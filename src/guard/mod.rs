// Session guard module
// Tracks user activity, warns ahead of server-side session expiry, and
// extends the session via a best-effort keep-alive signal

pub mod monitor;
pub mod scope;
pub mod types;

pub use monitor::{GuardHandle, SessionGuard};
pub use scope::AdminScope;
pub use types::{ActivityEvent, ActivityKind, GuardConfig, GuardState, GuardStatus};
