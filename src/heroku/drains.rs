//! Heroku Log Drains
//!
//! Wire types and API calls for log drains attached to an app. Drains cannot
//! be changed once created, so there is no update call.

use super::client::HerokuClient;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

/// Log drain as reported by Heroku
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDrain {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub token: String,
}

/// Body of a log drain create request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogDrainCreateOpts {
    pub url: String,
}

/// Log drain operations of the remote API, scoped to an app
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogDrainApi: Send + Sync {
    async fn log_drain_create(&self, app: &str, opts: &LogDrainCreateOpts) -> Result<LogDrain>;

    async fn log_drain_info(&self, app: &str, id: &str) -> Result<LogDrain>;

    async fn log_drain_delete(&self, app: &str, id: &str) -> Result<()>;

    async fn log_drain_list(&self, app: &str) -> Result<Vec<LogDrain>>;
}

#[async_trait]
impl LogDrainApi for HerokuClient {
    async fn log_drain_create(&self, app: &str, opts: &LogDrainCreateOpts) -> Result<LogDrain> {
        let body = serde_json::to_value(opts)?;
        self.post(&self.log_drains_url(app, None), &body).await
    }

    async fn log_drain_info(&self, app: &str, id: &str) -> Result<LogDrain> {
        self.get(&self.log_drains_url(app, Some(id))).await
    }

    async fn log_drain_delete(&self, app: &str, id: &str) -> Result<()> {
        self.delete(&self.log_drains_url(app, Some(id))).await
    }

    async fn log_drain_list(&self, app: &str) -> Result<Vec<LogDrain>> {
        self.list(&self.log_drains_url(app, None)).await
    }
}
