//! Heroku Add-ons
//!
//! Wire types and API calls for add-ons attached to an app.

use super::client::HerokuClient;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(test)]
use mockall::automock;

/// Plan reference embedded in an add-on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRef {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

/// Add-on as reported by Heroku
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub plan: PlanRef,
    #[serde(default)]
    pub provider_id: String,
    /// Names of the config vars the add-on sets on its app
    #[serde(default)]
    pub config_vars: Vec<String>,
}

/// Body of an add-on create request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddonCreateOpts {
    pub plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<BTreeMap<String, String>>,
}

/// Body of an add-on update request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddonUpdateOpts {
    pub plan: String,
}

/// Add-on operations of the remote API, scoped to an app
///
/// Errors are opaque: not-found, authorization, rate limiting and network
/// failures all surface the same way.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AddonApi: Send + Sync {
    async fn addon_create(&self, app: &str, opts: &AddonCreateOpts) -> Result<Addon>;

    async fn addon_info(&self, app: &str, id: &str) -> Result<Addon>;

    /// Change an add-on; the returned add-on may carry a new id
    async fn addon_update(&self, app: &str, id: &str, opts: &AddonUpdateOpts) -> Result<Addon>;

    async fn addon_delete(&self, app: &str, id: &str) -> Result<()>;

    async fn addon_list(&self, app: &str) -> Result<Vec<Addon>>;
}

#[async_trait]
impl AddonApi for HerokuClient {
    async fn addon_create(&self, app: &str, opts: &AddonCreateOpts) -> Result<Addon> {
        let body = serde_json::to_value(opts)?;
        self.post(&self.addons_url(app, None), &body).await
    }

    async fn addon_info(&self, app: &str, id: &str) -> Result<Addon> {
        self.get(&self.addons_url(app, Some(id))).await
    }

    async fn addon_update(&self, app: &str, id: &str, opts: &AddonUpdateOpts) -> Result<Addon> {
        let body = serde_json::to_value(opts)?;
        self.patch(&self.addons_url(app, Some(id)), &body).await
    }

    async fn addon_delete(&self, app: &str, id: &str) -> Result<()> {
        self.delete(&self.addons_url(app, Some(id))).await
    }

    async fn addon_list(&self, app: &str) -> Result<Vec<Addon>> {
        self.list(&self.addons_url(app, None)).await
    }
}
