//! Transport client: one pooled HTTP connection context, a bounded
//! challenge-retry loop, and nothing else.
//!
//! Network failures are the caller's problem and propagate immediately; only
//! the "portal answered with a challenge page instead of data" case is
//! recovered here, by refreshing the session and retrying up to a fixed
//! ceiling. Exhausting the ceiling is a result (`Ok(None)`, "could not
//! determine state"), not an error.

use crate::config::Config;
use crate::session::SessionManager;
use crate::univer::errors::UniverError;
use crate::univer::json::{self, Body};
use crate::univer::route::Route;
use reqwest::header;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Total attempts per call, counting the first one.
pub const MAX_ATTEMPTS: u32 = 5;

/// Ceiling on concurrent outbound requests.
const MAX_CONCURRENT_REQUESTS: usize = 20;

/// Idle connections kept alive in the pool.
const MAX_IDLE_CONNECTIONS: usize = 10;

pub struct UniverClient {
    http: reqwest::Client,
    limiter: Arc<Semaphore>,
    base_url: String,
    session: Arc<SessionManager>,
}

impl UniverClient {
    pub fn new(config: &Config, session: Arc<SessionManager>) -> Result<Self, UniverError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .build()?;

        Ok(Self {
            http,
            limiter: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            session,
        })
    }

    /// Close the pool. In-flight requests finish; any later call fails with
    /// [`UniverError::Closed`].
    pub fn shutdown(&self) {
        self.limiter.close();
    }

    /// Eagerly establish session credentials, honoring the cooldown, so the
    /// first data call does not pay for a browser launch.
    pub async fn warm_session(&self) -> Result<(), UniverError> {
        self.session.refresh().await?;
        Ok(())
    }

    pub(crate) fn url_for(&self, route: &Route) -> String {
        format!("{}{}", self.base_url, route.path())
    }

    /// Issue a request, refreshing the session and retrying on challenge
    /// responses. `Ok(None)` means the retry ceiling was exhausted without a
    /// usable payload.
    pub async fn request(&self, route: &Route) -> Result<Option<Value>, UniverError> {
        let url = self.url_for(route);

        for attempt in 1..=MAX_ATTEMPTS {
            {
                let _permit = self
                    .limiter
                    .acquire()
                    .await
                    .map_err(|_| UniverError::Closed)?;

                let credentials = self.session.current().await;
                let response = self
                    .http
                    .request(route.method().clone(), &url)
                    .header(header::USER_AGENT, credentials.user_agent.as_str())
                    .header("cookie", credentials.cookie.as_str())
                    .send()
                    .await?;

                let content_type = response
                    .headers()
                    .get(header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned);
                let text = response.text().await?;

                match json::classify(content_type.as_deref(), &text) {
                    Ok(Body::Json(value)) if !value.is_null() => return Ok(Some(value)),
                    Ok(Body::Json(_)) => {
                        debug!(url = %url, attempt, "portal returned a null payload");
                    }
                    Ok(Body::Challenge(page)) => {
                        debug!(
                            url = %url,
                            attempt,
                            body_len = page.len(),
                            "portal served a challenge page instead of data"
                        );
                    }
                    Err(source) => {
                        return Err(UniverError::MalformedPayload {
                            url,
                            source: source.into(),
                        });
                    }
                }
            }

            // Challenge path: re-establish the session before the next try.
            // A failed refresh burns the attempt like any other failure. The
            // final attempt has no next try, so no refresh after it.
            if attempt < MAX_ATTEMPTS
                && let Err(error) = self.session.refresh().await
            {
                warn!(url = %url, attempt, error = %error, "session refresh failed");
            }
        }

        debug!(url = %url, attempts = MAX_ATTEMPTS, "retry ceiling exhausted, no data");
        Ok(None)
    }
}
