//! Heroku Client
//!
//! Main client for the Heroku Platform API, combining the API token with the
//! HTTP transport. The token is used as given; obtaining it is up to the caller.

use super::http::HerokuHttpClient;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Default Platform API endpoint
pub const DEFAULT_API_URL: &str = "https://api.heroku.com";

/// Main Heroku client
#[derive(Clone)]
pub struct HerokuClient {
    pub http: HerokuHttpClient,
    pub api_url: String,
    token: String,
}

impl HerokuClient {
    /// Create a new Heroku client
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let http = HerokuHttpClient::new()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Make a GET request and decode the response
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.http.get(url, &self.token).await?;
        serde_json::from_value(body).with_context(|| format!("Unexpected response from {url}"))
    }

    /// Make a POST request and decode the response
    pub async fn post<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Result<T> {
        let body = self.http.post(url, &self.token, body).await?;
        serde_json::from_value(body).with_context(|| format!("Unexpected response from {url}"))
    }

    /// Make a PATCH request and decode the response
    pub async fn patch<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Result<T> {
        let body = self.http.patch(url, &self.token, body).await?;
        serde_json::from_value(body).with_context(|| format!("Unexpected response from {url}"))
    }

    /// Make a DELETE request, discarding the response body
    pub async fn delete(&self, url: &str) -> Result<()> {
        self.http.delete(url, &self.token).await?;
        Ok(())
    }

    /// Fetch every element of a list endpoint (auto-paginate)
    pub async fn list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut range: Option<String> = None;

        loop {
            let page = self
                .http
                .get_range(url, &self.token, range.as_deref())
                .await?;

            let items: Vec<T> = match page.body {
                Value::Null => Vec::new(),
                body => serde_json::from_value(body)
                    .with_context(|| format!("Unexpected list response from {url}"))?,
            };
            all_items.extend(items);

            if page.next_range.is_none() {
                break;
            }
            range = page.next_range;
        }

        Ok(all_items)
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build an app-scoped API URL
    pub fn app_url(&self, app: &str, path: &str) -> String {
        format!(
            "{}/apps/{}/{}",
            self.api_url,
            urlencoding::encode(app),
            path
        )
    }

    /// Build the add-on collection URL, or a single add-on's URL
    pub fn addons_url(&self, app: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => self.app_url(app, &format!("addons/{}", urlencoding::encode(id))),
            None => self.app_url(app, "addons"),
        }
    }

    /// Build the log drain collection URL, or a single drain's URL
    pub fn log_drains_url(&self, app: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => self.app_url(app, &format!("log-drains/{}", urlencoding::encode(id))),
            None => self.app_url(app, "log-drains"),
        }
    }
}
