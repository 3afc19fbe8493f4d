//! Shared scaffolding for integration tests: a local stub upstream and a
//! counting challenge solver.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use univer::config::Config;
use univer::session::{
    ChallengeSolver, MemoryCredentialStore, RefreshError, SessionManager, SolvedChallenge,
};

/// Serve a router on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Config pointed at a stub upstream.
pub fn config_for(addr: SocketAddr) -> Config {
    Config {
        base_url: format!("http://{addr}"),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

/// Challenge solver that hands out canned credentials and counts its runs.
pub struct StubSolver {
    solves: AtomicUsize,
}

impl StubSolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            solves: AtomicUsize::new(0),
        })
    }

    pub fn solve_count(&self) -> usize {
        self.solves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChallengeSolver for StubSolver {
    async fn solve(&self) -> Result<SolvedChallenge, RefreshError> {
        self.solves.fetch_add(1, Ordering::SeqCst);
        Ok(SolvedChallenge {
            user_agent: "stub-agent".to_owned(),
            cookie: "session=stub;".to_owned(),
        })
    }
}

/// Challenge solver whose every run fails, for exercising the refresh
/// failure path. Counts its runs like [`StubSolver`].
pub struct FailingSolver {
    solves: AtomicUsize,
}

impl FailingSolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            solves: AtomicUsize::new(0),
        })
    }

    pub fn solve_count(&self) -> usize {
        self.solves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChallengeSolver for FailingSolver {
    async fn solve(&self) -> Result<SolvedChallenge, RefreshError> {
        self.solves.fetch_add(1, Ordering::SeqCst);
        Err(RefreshError::Timeout(Duration::from_secs(90)))
    }
}

/// Session manager over an in-memory store.
pub fn session_with(solver: Arc<dyn ChallengeSolver>, cooldown: Duration) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(
        solver,
        Arc::new(MemoryCredentialStore::new()),
        cooldown,
    ))
}
