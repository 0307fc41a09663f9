//! HTTP utilities for Heroku Platform API calls

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

/// Media type selecting version 3 of the Platform API
pub const API_ACCEPT: &str = "application/vnd.heroku+json; version=3";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|idx| body.is_char_boundary(*idx))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// One response of a ranged list request
#[derive(Debug, Clone)]
pub struct Page {
    pub body: Value,
    /// Range to request for the following page, if any
    pub next_range: Option<String>,
}

/// HTTP client wrapper for Heroku API calls
#[derive(Clone)]
pub struct HerokuHttpClient {
    client: Client,
}

impl HerokuHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(API_ACCEPT));

        let client = Client::builder()
            .user_agent(format!("hrec/{}", crate::VERSION))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);
        Ok(self.execute(self.client.get(url), token).await?.body)
    }

    /// Make a GET request for one page of a list
    pub async fn get_range(&self, url: &str, token: &str, range: Option<&str>) -> Result<Page> {
        tracing::debug!("GET {} (range: {:?})", url, range);

        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header("Range", range);
        }
        self.execute(request, token).await
    }

    /// Make a POST request with a JSON body
    pub async fn post(&self, url: &str, token: &str, body: &Value) -> Result<Value> {
        tracing::debug!("POST {}", url);
        Ok(self.execute(self.client.post(url).json(body), token).await?.body)
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch(&self, url: &str, token: &str, body: &Value) -> Result<Value> {
        tracing::debug!("PATCH {}", url);
        Ok(self.execute(self.client.patch(url).json(body), token).await?.body)
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("DELETE {}", url);
        Ok(self.execute(self.client.delete(url), token).await?.body)
    }

    async fn execute(&self, request: RequestBuilder, token: &str) -> Result<Page> {
        let request_id = uuid::Uuid::new_v4().to_string();

        let response = request
            .bearer_auth(token)
            .header("Request-Id", request_id.as_str())
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let next_range = if status == StatusCode::PARTIAL_CONTENT {
            response
                .headers()
                .get("Next-Range")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        } else {
            None
        };

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error [{}]: {} - {}",
                request_id,
                status,
                sanitize_for_log(&body)
            );
            return Err(anyhow::anyhow!(
                "API request failed: {} ({})",
                status.as_u16(),
                error_id(&body)
            ));
        }

        // Handle empty response
        if body.is_empty() {
            return Ok(Page {
                body: Value::Null,
                next_range,
            });
        }

        let body = serde_json::from_str(&body).context("Failed to parse response JSON")?;
        Ok(Page { body, next_range })
    }
}

/// Machine readable error id from a Heroku error body
fn error_id(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(String::from))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format a Heroku API error for display
/// Security: Sanitizes error messages to avoid leaking sensitive API details
pub fn format_heroku_error(error: &anyhow::Error) -> String {
    let error_str = format!("{error:#}");

    if error_str.contains("API request failed: 401") {
        return "Authentication failed. Check HEROKU_API_KEY.".to_string();
    }
    if error_str.contains("API request failed: 403") {
        return "Permission denied for this app.".to_string();
    }
    if error_str.contains("API request failed: 404") {
        return "Resource not found.".to_string();
    }
    if error_str.contains("API request failed: 422") {
        return "Request rejected by Heroku. Check the declared plan or url.".to_string();
    }
    if error_str.contains("API request failed: 429") {
        return "Rate limit exceeded. Please try again later.".to_string();
    }

    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(120)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_error_id_extraction() {
        assert_eq!(error_id(r#"{"id":"not_found","message":"Couldn't find that add-on."}"#), "not_found");
        assert_eq!(error_id("<html>"), "unknown");
    }

    #[test]
    fn test_format_known_statuses() {
        let err = anyhow::anyhow!("API request failed: 404 (not_found)");
        assert_eq!(format_heroku_error(&err), "Resource not found.");

        let err = anyhow::anyhow!("API request failed: 429 (rate_limit)");
        assert_eq!(
            format_heroku_error(&err),
            "Rate limit exceeded. Please try again later."
        );
    }
}
