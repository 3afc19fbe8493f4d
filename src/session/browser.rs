//! WebDriver-driven challenge solving.
//!
//! The portal hands data only to clients that executed its landing-page
//! scripts and accepted the consent interstitial, so a real Chrome session is
//! driven once per refresh: load the landing page, let the challenge scripts
//! drop their cookies, click consent, harvest the jar.

use crate::session::{ChallengeSolver, RefreshError, SolvedChallenge};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::time::Duration;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use tracing::{debug, info};

/// The consent interstitial button on the landing page. No stable id or
/// class; the absolute path has been stable for years.
const CONSENT_XPATH: &str = "/html/body/div[6]/div/div/div/div";

/// How long the landing page needs before its challenge scripts have
/// finished dropping cookies.
const PAGE_SETTLE: Duration = Duration::from_secs(5);

/// Pool of current desktop Chrome user-agents. Each solve picks one at
/// random and the harvested cookies are only ever replayed with it.
const CHROME_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 11.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

pub struct WebDriverSolver {
    webdriver_url: String,
    base_url: String,
    timeout: Duration,
}

impl WebDriverSolver {
    pub fn new(webdriver_url: String, base_url: String, timeout: Duration) -> Self {
        Self {
            webdriver_url,
            base_url,
            timeout,
        }
    }

    async fn drive(&self, user_agent: &str) -> Result<String, WebDriverError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg(&format!("--user-agent={user_agent}"))?;
        caps.add_arg("--start-maximized")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_experimental_option("excludeSwitches", ["enable-automation"])?;
        caps.add_experimental_option("useAutomationExtension", false)?;

        let driver = WebDriver::new(&self.webdriver_url, caps).await?;
        let outcome = self.harvest(&driver).await;
        // The browser must come down on both paths or chromedriver leaks
        // sessions until it wedges.
        let quit = driver.quit().await;
        let cookie = outcome?;
        quit?;
        Ok(cookie)
    }

    async fn harvest(&self, driver: &WebDriver) -> Result<String, WebDriverError> {
        driver.goto(&self.base_url).await?;
        tokio::time::sleep(PAGE_SETTLE).await;

        let consent = driver.find(By::XPath(CONSENT_XPATH)).await?;
        consent.click().await?;

        let cookies = driver.get_all_cookies().await?;
        debug!(count = cookies.len(), "harvested cookie jar");
        Ok(cookies
            .iter()
            .map(|cookie| format!("{}={};", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join(" "))
    }
}

#[async_trait]
impl ChallengeSolver for WebDriverSolver {
    async fn solve(&self) -> Result<SolvedChallenge, RefreshError> {
        let user_agent = CHROME_USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(CHROME_USER_AGENTS[0])
            .to_owned();
        info!(user_agent = %user_agent, "solving portal challenge");

        let cookie = tokio::time::timeout(self.timeout, self.drive(&user_agent))
            .await
            .map_err(|_| RefreshError::Timeout(self.timeout))??;

        info!(cookie_len = cookie.len(), "challenge solved");
        Ok(SolvedChallenge { user_agent, cookie })
    }
}
