use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::store::CredentialStore;

use super::principal::{capabilities_for, Capabilities, Principal};

/// Generic failure notice for any login that does not produce a session.
/// Unknown email, wrong password and storage faults all surface this same
/// wording so callers cannot enumerate accounts from the message.
pub const INVALID_CREDENTIALS_NOTICE: &str = "Invalid email or password";

const BUSY_NOTICE: &str = "Authentication already in progress";

/// Where the calling layer should navigate after an operation completes.
/// The session manager emits intents; it never performs navigation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    ProtectedArea,
    Login,
    AnonymousHome,
}

/// Receives human-readable operation outcomes (toast-style). Operations
/// succeed or fail identically whether or not anything is listening.
pub trait Notifier: Send + Sync {
    fn success(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Receives navigation intents emitted after login/register/logout.
pub trait Router: Send + Sync {
    fn navigate(&self, _to: NavIntent) {}
}

pub struct NullNotifier;
impl Notifier for NullNotifier {}

pub struct NullRouter;
impl Router for NullRouter {}

/// Authentication phase of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Startup state before `initialize` has run.
    Initializing,
    Anonymous,
    Authenticated(Principal),
}

/// Observable session value: the current phase plus a `loading` flag that is
/// true exactly while a login or register call is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub loading: bool,
}

impl SessionState {
    pub fn principal(&self) -> Option<&Principal> {
        match &self.phase {
            SessionPhase::Authenticated(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, SessionPhase::Authenticated(_))
    }
}

/// Owns the current-session state and orchestrates authentication
/// transitions against a [`CredentialStore`]. One instance per browsing
/// context; consumers receive it by injection rather than through any
/// process-global.
///
/// State machine: `Initializing → {Anonymous, Authenticated}`; `login`
/// moves `Anonymous → Authenticated`, `logout` moves back. `register`
/// never starts a session; it redirects the caller to the login surface.
pub struct SessionManager {
    store: CredentialStore,
    state: RwLock<SessionState>,
    notifier: Arc<dyn Notifier>,
    router: Arc<dyn Router>,
    auth_delay: Duration,
}

impl SessionManager {
    /// Default simulated latency for login/register. Stands in for a remote
    /// authentication call; inessential to correctness.
    pub const DEFAULT_AUTH_DELAY: Duration = Duration::from_millis(250);

    pub fn new(store: CredentialStore) -> Self {
        Self::with_collaborators(store, Arc::new(NullNotifier), Arc::new(NullRouter))
    }

    pub fn with_collaborators(
        store: CredentialStore,
        notifier: Arc<dyn Notifier>,
        router: Arc<dyn Router>,
    ) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState { phase: SessionPhase::Initializing, loading: true }),
            notifier,
            router,
            auth_delay: Self::DEFAULT_AUTH_DELAY,
        }
    }

    /// Override the simulated authentication latency. Tests use zero.
    pub fn with_auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay = delay;
        self
    }

    /// Snapshot of the observable session state. After any operation's
    /// completion signal, a snapshot reflects that operation's outcome; the
    /// state is committed before collaborators are signaled.
    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Capability flags for the current session. Anonymous sessions get all
    /// flags false; protected views are expected to redirect before
    /// consulting any flag.
    pub fn current_capabilities(&self) -> Capabilities {
        capabilities_for(self.snapshot().principal().map(|p| p.role))
    }

    /// Restore a remembered session from durable storage. Runs once at
    /// startup; ends in `Authenticated` or `Anonymous` with `loading`
    /// cleared even when the persisted document is corrupt.
    pub fn initialize(&self) {
        let restored = self.store.restore_current_principal();
        let mut st = self.state.write();
        match restored {
            Some(p) => {
                info!("session.restore email={} role={:?}", p.email, p.role);
                st.phase = SessionPhase::Authenticated(p);
            }
            None => {
                debug!("session.restore none");
                st.phase = SessionPhase::Anonymous;
            }
        }
        st.loading = false;
    }

    // Flip the loading flag on, refusing re-entry while another
    // authentication operation is in flight. The flag also starts true,
    // so operations invoked before `initialize` are refused.
    fn begin_auth_op(&self, op: &str) -> bool {
        let mut st = self.state.write();
        if st.loading {
            warn!("session.{} rejected: operation already in flight", op);
            return false;
        }
        st.loading = true;
        true
    }

    fn finish_auth_op(&self, phase: Option<SessionPhase>) {
        let mut st = self.state.write();
        if let Some(p) = phase {
            st.phase = p;
        }
        st.loading = false;
    }

    /// Authenticate by email and password. Outcomes are signaled to the
    /// collaborators and reflected in the snapshot; nothing is returned and
    /// nothing is thrown. On success the principal is remembered in durable
    /// storage and a `ProtectedArea` navigation intent is emitted.
    pub async fn login(&self, email: &str, password: &str) {
        if !self.begin_auth_op("login") {
            self.notifier.error(BUSY_NOTICE);
            return;
        }
        match self.try_login(email, password).await {
            Ok(principal) => {
                info!("session.login ok email={} role={:?}", principal.email, principal.role);
                self.finish_auth_op(Some(SessionPhase::Authenticated(principal)));
                self.notifier.success("Logged in successfully");
                self.router.navigate(NavIntent::ProtectedArea);
            }
            Err(e) => {
                debug!("session.login failed email={} err={}", email, e);
                self.finish_auth_op(None);
                // Storage faults collapse into the same generic notice as a
                // credential mismatch.
                let msg = if e.is_credential_failure() { INVALID_CREDENTIALS_NOTICE } else { e.message() };
                self.notifier.error(msg);
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> AppResult<Principal> {
        let Some(record) = self.store.find_by_email(email) else {
            return Err(AppError::auth("invalid_credentials", "unknown email"));
        };
        // Simulated remote round-trip; a real backend call would sit here
        // under the same contract.
        tokio::time::sleep(self.auth_delay).await;
        if record.credential_secret != password {
            return Err(AppError::auth("invalid_credentials", "secret mismatch"));
        }
        let principal = record.principal();
        self.store
            .persist_current_principal(Some(&principal))
            .map_err(AppError::from)?;
        Ok(principal)
    }

    /// Create a new principal. Never starts a session: on success the
    /// caller is redirected to the login surface. Duplicate emails signal
    /// a conflict notice; the session phase is untouched either way.
    pub async fn register(&self, name: &str, email: &str, password: &str) {
        if !self.begin_auth_op("register") {
            self.notifier.error(BUSY_NOTICE);
            return;
        }
        tokio::time::sleep(self.auth_delay).await;
        let outcome = self.store.register(name, email, password);
        self.finish_auth_op(None);
        match outcome {
            Ok(record) => {
                info!("session.register ok email={} id={}", record.email, record.id);
                self.notifier
                    .success("Account created successfully. Please login to continue.");
                self.router.navigate(NavIntent::Login);
            }
            Err(AppError::Conflict { .. }) => {
                debug!("session.register conflict email={}", email);
                self.notifier.error("User with this email already exists");
            }
            Err(e) => {
                warn!("session.register failed email={} err={}", email, e);
                self.notifier.error("Registration failed. Please try again.");
            }
        }
    }

    /// Clear the in-memory session and the remembered-session document,
    /// then send the caller back to the anonymous landing area.
    pub fn logout(&self) {
        {
            let mut st = self.state.write();
            st.phase = SessionPhase::Anonymous;
        }
        if let Err(e) = self.store.persist_current_principal(None) {
            // Worst case the stale document restores a session next start;
            // the in-memory state is already anonymous.
            warn!("session.logout failed to clear persisted session: {}", e);
        }
        info!("session.logout");
        self.notifier.success("Logged out successfully");
        self.router.navigate(NavIntent::AnonymousHome);
    }
}
