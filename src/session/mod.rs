//! Session credential lifecycle: the (user-agent, cookie) pair that makes
//! portal calls look like a browser that already passed the challenge.
//!
//! The pair is only ever produced together in one solve and published as one
//! immutable snapshot; readers never observe a user-agent from one capture
//! mixed with a cookie from another.

pub mod browser;
pub mod store;

pub use browser::WebDriverSolver;
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// An immutable credential snapshot. Superseded by the next capture, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredentials {
    pub user_agent: String,
    pub cookie: String,
    pub captured_at: DateTime<Utc>,
}

impl SessionCredentials {
    /// The state before the portal has ever been contacted.
    pub fn empty() -> Self {
        Self {
            user_agent: String::new(),
            cookie: String::new(),
            captured_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_agent.is_empty() && self.cookie.is_empty()
    }
}

/// The output of one successful challenge solve.
#[derive(Debug, Clone)]
pub struct SolvedChallenge {
    pub user_agent: String,
    pub cookie: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("browser automation failed: {0}")]
    Browser(#[from] thirtyfour::error::WebDriverError),
    #[error("challenge solve timed out after {0:?}")]
    Timeout(Duration),
    #[error("credential store failed")]
    Store(#[source] anyhow::Error),
}

/// Solves the portal's anti-bot challenge and harvests fresh credentials.
///
/// The production implementation drives a real browser
/// ([`browser::WebDriverSolver`]); tests substitute a stub.
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    async fn solve(&self) -> Result<SolvedChallenge, RefreshError>;
}

/// Owns the active credential snapshot and the refresh critical section.
pub struct SessionManager {
    current: RwLock<Arc<SessionCredentials>>,
    /// Serializes refreshes: concurrent callers hitting a stale session queue
    /// here, and all but the first are satisfied by the cooldown re-check.
    refresh_gate: Mutex<()>,
    solver: Arc<dyn ChallengeSolver>,
    store: Arc<dyn CredentialStore>,
    cooldown: TimeDelta,
}

impl SessionManager {
    pub fn new(
        solver: Arc<dyn ChallengeSolver>,
        store: Arc<dyn CredentialStore>,
        cooldown: Duration,
    ) -> Self {
        Self {
            current: RwLock::new(Arc::new(SessionCredentials::empty())),
            refresh_gate: Mutex::new(()),
            solver,
            store,
            cooldown: TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX),
        }
    }

    /// The active snapshot. Empty credentials before the first refresh.
    pub async fn current(&self) -> Arc<SessionCredentials> {
        self.current.read().await.clone()
    }

    /// Ensure a usable credential pair, launching a browser session only when
    /// the most recent capture is older than the cooldown.
    pub async fn refresh(&self) -> Result<Arc<SessionCredentials>, RefreshError> {
        let _gate = self.refresh_gate.lock().await;
        let now = Utc::now();

        // Re-check under the gate: a caller that raced a completed refresh
        // reuses its result instead of launching another browser.
        let current = self.current.read().await.clone();
        if !current.is_empty() && now - current.captured_at < self.cooldown {
            return Ok(current);
        }

        // Another process may have persisted a fresher capture.
        if let Some(stored) = self.store.latest().await.map_err(RefreshError::Store)? {
            if now - stored.captured_at < self.cooldown {
                let stored = Arc::new(stored);
                *self.current.write().await = stored.clone();
                return Ok(stored);
            }
        }

        let solved = self.solver.solve().await?;
        let credentials = Arc::new(SessionCredentials {
            user_agent: solved.user_agent,
            cookie: solved.cookie,
            captured_at: Utc::now(),
        });

        self.store
            .record(&credentials)
            .await
            .map_err(RefreshError::Store)?;
        *self.current.write().await = credentials.clone();

        info!(captured_at = %credentials.captured_at, "session credentials refreshed");
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSolver {
        solves: AtomicUsize,
    }

    impl CountingSolver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                solves: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.solves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChallengeSolver for CountingSolver {
        async fn solve(&self) -> Result<SolvedChallenge, RefreshError> {
            let n = self.solves.fetch_add(1, Ordering::SeqCst);
            Ok(SolvedChallenge {
                user_agent: format!("agent-{n}"),
                cookie: format!("session={n};"),
            })
        }
    }

    fn manager(solver: Arc<CountingSolver>, cooldown: Duration) -> SessionManager {
        SessionManager::new(solver, Arc::new(MemoryCredentialStore::new()), cooldown)
    }

    #[tokio::test]
    async fn second_refresh_within_cooldown_reuses_the_first_capture() {
        let solver = CountingSolver::new();
        let manager = manager(solver.clone(), Duration::from_secs(60));

        let first = manager.refresh().await.unwrap();
        let second = manager.refresh().await.unwrap();

        assert_eq!(solver.count(), 1);
        assert_eq!(first, second);
        assert_eq!(manager.current().await.user_agent, "agent-0");
    }

    #[tokio::test]
    async fn concurrent_refreshes_launch_one_solve() {
        let solver = CountingSolver::new();
        let manager = Arc::new(manager(solver.clone(), Duration::from_secs(60)));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.refresh().await.unwrap() })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(solver.count(), 1);
    }

    #[tokio::test]
    async fn zero_cooldown_always_solves() {
        let solver = CountingSolver::new();
        let manager = manager(solver.clone(), Duration::ZERO);

        manager.refresh().await.unwrap();
        manager.refresh().await.unwrap();

        assert_eq!(solver.count(), 2);
        assert_eq!(manager.current().await.user_agent, "agent-1");
    }

    #[tokio::test]
    async fn refresh_adopts_a_fresh_capture_from_the_store() {
        let solver = CountingSolver::new();
        let store = Arc::new(MemoryCredentialStore::new());
        let stored = SessionCredentials {
            user_agent: "other-process-agent".to_owned(),
            cookie: "sid=abc;".to_owned(),
            captured_at: Utc::now(),
        };
        store.record(&stored).await.unwrap();

        let manager = SessionManager::new(solver.clone(), store, Duration::from_secs(60));
        let refreshed = manager.refresh().await.unwrap();

        assert_eq!(solver.count(), 0);
        assert_eq!(refreshed.user_agent, "other-process-agent");
    }

    #[tokio::test]
    async fn credentials_start_empty() {
        let solver = CountingSolver::new();
        let manager = manager(solver, Duration::from_secs(60));

        let current = manager.current().await;
        assert!(current.is_empty());
    }
}
