//! Central identity and session management for casevault.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;

pub use principal::{capabilities_for, Capabilities, CredentialRecord, Principal, Role};
pub use session::{
    NavIntent, Notifier, NullNotifier, NullRouter, Router, SessionManager, SessionPhase,
    SessionState, INVALID_CREDENTIALS_NOTICE,
};
