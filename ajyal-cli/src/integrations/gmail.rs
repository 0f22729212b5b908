use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
const PAGE_SIZE: usize = 500;
const MAX_RATE_LIMIT_RETRIES: usize = 5;
const ERROR_BODY_MAX_LEN: usize = 200;

/// Thin Gmail REST client scoped to what the batch needs: paged listing of
/// message identifiers for a query, and raw message fetch.
pub struct GmailClient {
    http: Client,
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageList {
    messages: Option<Vec<MessageStub>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageStub {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMessageResponse {
    raw: Option<String>,
}

impl GmailClient {
    pub fn new(access_token: String) -> Self {
        Self {
            http: Client::new(),
            access_token,
        }
    }

    /// Follows `nextPageToken` until the provider reports no further page or
    /// `cap` identifiers have been accumulated, whichever comes first.
    pub async fn list_message_ids(&self, query: &str, cap: usize) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(query, page_token.as_deref()).await?;
            let stubs = page
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(|stub| stub.id);
            let keep_going = accumulate_ids(&mut ids, stubs, cap);

            page_token = page.next_page_token;
            if !keep_going || page_token.is_none() {
                break;
            }
        }

        Ok(ids)
    }

    /// Fetches one message in raw form and decodes it to RFC 822 bytes.
    pub async fn fetch_raw(&self, message_id: &str) -> Result<Vec<u8>> {
        let url = format!("{GMAIL_API_BASE}/users/me/messages/{message_id}");
        let response: RawMessageResponse = self
            .get_json(&url, &[("format", "raw".to_string())])
            .await?;

        let raw = response
            .raw
            .ok_or_else(|| anyhow!("message {message_id} has no raw payload"))?;
        decode_raw(&raw)
    }

    async fn list_page(&self, query: &str, page_token: Option<&str>) -> Result<MessageList> {
        let url = format!("{GMAIL_API_BASE}/users/me/messages");
        let mut params = vec![
            ("q", query.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        self.get_json(&url, &params).await
    }

    /// GET with bearer auth and bounded 429 retries honoring Retry-After.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut backoff_seconds = 1u64;

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            let response = self
                .http
                .get(url)
                .query(params)
                .bearer_auth(&self.access_token)
                .send()
                .await
                .with_context(|| format!("gmail api request: {url}"))?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_RATE_LIMIT_RETRIES {
                    return Err(anyhow!("gmail api request exhausted retries: {url}"));
                }

                let retry_after_seconds = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(backoff_seconds);

                sleep(Duration::from_secs(retry_after_seconds)).await;
                backoff_seconds = (backoff_seconds * 2).min(32);
                continue;
            }

            let status = response.status();
            let body = response
                .text()
                .await
                .context("read gmail api response body")?;
            if !status.is_success() {
                return Err(anyhow!(
                    "gmail api request failed: status={} body={}",
                    status,
                    truncate_body(&body)
                ));
            }

            return serde_json::from_str(&body).context("decode gmail api response");
        }

        Err(anyhow!("gmail api request failed without response"))
    }
}

/// Appends page identifiers up to the ceiling. Returns whether listing
/// should continue to the next page.
fn accumulate_ids(
    ids: &mut Vec<String>,
    page: impl IntoIterator<Item = String>,
    cap: usize,
) -> bool {
    for id in page {
        if ids.len() >= cap {
            return false;
        }
        ids.push(id);
    }
    ids.len() < cap
}

/// Gmail hands back base64url without padding; the original tooling also
/// produced padded values, so trailing `=` is tolerated.
fn decode_raw(data: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .context("base64url decode raw message")
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    // Cut on a character boundary; error bodies are not guaranteed ASCII.
    match trimmed.char_indices().nth(ERROR_BODY_MAX_LEN) {
        Some((index, _)) => format!("{}... [truncated]", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}
