//! Server-side session management
//!
//! Every login creates a [`UserSession`](crate::domain::entities::UserSession)
//! bound to the client's IP and device fingerprint. Requests present an opaque
//! session token that is rotated on a time threshold; the service enforces a
//! per-user concurrent-session limit and flags or terminates sessions whose
//! IP or device changes.

mod cleanup;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{SessionCleanupResult, SessionCleanupService};
pub use service::{SessionAnomaly, SessionManagementService, SessionValidation, SESSION_TOKEN_LENGTH};
