// Submission lock module
// Prevents duplicate form submits while a request is in flight

pub mod submit;
pub mod types;

pub use submit::SubmissionLock;
pub use types::{LockConfig, SubmitControl, TextControl};
