//! Append-only persistence of credential captures.
//!
//! Captures are kept as history, not overwritten: the cooldown check needs
//! "most recent", and the log doubles as an audit trail of how often the
//! portal forces re-challenges.

use crate::session::SessionCredentials;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::Mutex;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Append a capture to the log.
    async fn record(&self, credentials: &SessionCredentials) -> Result<()>;
    /// The most recent capture, if any.
    async fn latest(&self) -> Result<Option<SessionCredentials>>;
}

/// In-memory store for tests and single-process setups.
#[derive(Default)]
pub struct MemoryCredentialStore {
    log: Mutex<Vec<SessionCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn record(&self, credentials: &SessionCredentials) -> Result<()> {
        self.log.lock().await.push(credentials.clone());
        Ok(())
    }

    async fn latest(&self) -> Result<Option<SessionCredentials>> {
        Ok(self.log.lock().await.last().cloned())
    }
}

/// Postgres-backed store over the `user_agent` and `cookie` capture tables.
///
/// Both rows of a capture share one timestamp; `latest` only yields a pair
/// whose timestamps match, so rows from different capture cycles can never be
/// combined.
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn record(&self, credentials: &SessionCredentials) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO user_agent (datetime, extra) VALUES ($1, $2)")
            .bind(credentials.captured_at)
            .bind(&credentials.user_agent)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO cookie (datetime, extra) VALUES ($1, $2)")
            .bind(credentials.captured_at)
            .bind(&credentials.cookie)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn latest(&self) -> Result<Option<SessionCredentials>> {
        let user_agent: Option<(DateTime<Utc>, String)> =
            sqlx::query_as("SELECT datetime, extra FROM user_agent ORDER BY datetime DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        let cookie: Option<(DateTime<Utc>, String)> =
            sqlx::query_as("SELECT datetime, extra FROM cookie ORDER BY datetime DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        match (user_agent, cookie) {
            (Some((captured_at, user_agent)), Some((cookie_at, cookie)))
                if captured_at == cookie_at =>
            {
                Ok(Some(SessionCredentials {
                    user_agent,
                    cookie,
                    captured_at,
                }))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_returns_the_most_recent_capture() {
        let store = MemoryCredentialStore::new();
        assert!(store.latest().await.unwrap().is_none());

        for n in 0..3 {
            store
                .record(&SessionCredentials {
                    user_agent: format!("agent-{n}"),
                    cookie: format!("sid={n};"),
                    captured_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.user_agent, "agent-2");
    }
}
