//! # Remote Sync Module
//!
//! Backs the cookbook up to a GitHub gist and restores it from there. The
//! whole [`CookbookData`] document is stored as a single gist file, so a
//! restore brings back recipes, meal plan and basket together.
//!
//! Transport failures and server errors are retried with exponential
//! backoff; client errors (bad token, unknown gist) fail immediately.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;
use crate::store::CookbookData;

const USER_AGENT: &str = concat!("cookbook/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    raw_url: Option<String>,
}

/// Where the backup content of a gist can be read
#[derive(Debug, Clone, PartialEq)]
pub enum GistContent {
    /// Content returned with the gist itself
    Inline(String),
    /// Content too large for the gist response, to be fetched from this URL
    Raw(String),
}

/// Request body that replaces `filename` in the gist with `json`
pub fn backup_payload(filename: &str, json: &str) -> serde_json::Value {
    json!({
        "files": {
            filename: { "content": json }
        }
    })
}

/// Find the backup file in a gist response body
pub fn gist_file_content(body: &str, filename: &str) -> Result<GistContent> {
    let gist: GistResponse = serde_json::from_str(body).context("Failed to parse gist response")?;
    let file = gist
        .files
        .get(filename)
        .ok_or_else(|| anyhow!("Gist has no file named {}", filename))?;

    match (&file.content, file.truncated, &file.raw_url) {
        (_, true, Some(raw_url)) => Ok(GistContent::Raw(raw_url.clone())),
        (Some(content), false, _) => Ok(GistContent::Inline(content.clone())),
        _ => bail!("Gist file {} has no readable content", filename),
    }
}

/// Delay before retry number `attempt` (starting at 1), doubling up to `max_ms`
pub fn retry_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(16);
    Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Client for the gist holding the backup
pub struct GistClient {
    http: Client,
    config: RemoteConfig,
    gist_id: String,
    token: String,
}

impl GistClient {
    /// Create a client; fails when the gist id or token is missing
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let gist_id = config
            .gist_id
            .clone()
            .ok_or_else(|| anyhow!("No gist id configured"))?;
        let token = config
            .token
            .clone()
            .ok_or_else(|| anyhow!("No GitHub token configured"))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            config: config.clone(),
            gist_id,
            token,
        })
    }

    fn gist_url(&self) -> String {
        format!("{}/gists/{}", self.config.api_base, self.gist_id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(header::ACCEPT, GITHUB_ACCEPT)
    }

    /// Upload the cookbook, replacing the previous backup
    pub async fn backup(&self, data: &CookbookData) -> Result<()> {
        let json = data.to_json()?;
        let payload = backup_payload(&self.config.filename, &json);

        info!(
            gist_id = %self.gist_id,
            filename = %self.config.filename,
            bytes = json.len(),
            "Backing up cookbook"
        );
        self.send(|| self.authorized(self.http.patch(self.gist_url())).json(&payload))
            .await
            .context("Backup to gist failed")?;
        Ok(())
    }

    /// Download the last backup
    pub async fn restore(&self) -> Result<CookbookData> {
        info!(gist_id = %self.gist_id, "Restoring cookbook from gist");

        let body = self
            .send(|| self.authorized(self.http.get(self.gist_url())))
            .await
            .context("Failed to fetch gist")?
            .text()
            .await
            .context("Failed to read gist response")?;

        let json = match gist_file_content(&body, &self.config.filename)? {
            GistContent::Inline(content) => content,
            GistContent::Raw(raw_url) => {
                debug!(raw_url = %raw_url, "Backup is truncated, downloading raw file");
                self.send(|| self.authorized(self.http.get(&raw_url)))
                    .await
                    .context("Failed to fetch raw gist file")?
                    .text()
                    .await
                    .context("Failed to read raw gist file")?
            }
        };

        CookbookData::from_json(&json).context("Backup in gist is not valid cookbook data")
    }

    /// Send a request, retrying transport failures and server errors
    async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = build().send().await;
            let retryable = match &outcome {
                Ok(response) => is_retryable(response.status()),
                Err(e) => e.is_timeout() || e.is_connect(),
            };

            if !retryable || attempt >= self.config.max_retries {
                let response = outcome.context("Request to GitHub failed")?;
                return response
                    .error_for_status()
                    .context("GitHub rejected the request");
            }

            attempt += 1;
            let delay = retry_delay(
                attempt,
                self.config.base_retry_delay_ms,
                self.config.max_retry_delay_ms,
            );
            match &outcome {
                Ok(response) => warn!(status = %response.status(), attempt, delay_ms = delay.as_millis() as u64, "Retrying gist request"),
                Err(e) => warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "Retrying gist request"),
            }
            tokio::time::sleep(delay).await;
        }
    }
}
