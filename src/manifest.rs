//! Manifest
//!
//! Declared desired state, keyed by resource address:
//!
//! ```yaml
//! addons:
//!   db:
//!     app: app1
//!     plan: heroku-postgresql:hobby-dev
//!     config:
//!       version: 16
//! drains:
//!   papertrail:
//!     app: app1
//!     url: syslog+tls://logs.example.com:514
//! ```

use crate::resource::{AddonDeclaration, DrainDeclaration};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub addons: BTreeMap<String, AddonDeclaration>,
    #[serde(default)]
    pub drains: BTreeMap<String, DrainDeclaration>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        for (address, addon) in &self.addons {
            if addon.app.is_empty() || addon.plan.is_empty() {
                anyhow::bail!("addon {address:?} needs both app and plan");
            }
        }
        for (address, drain) in &self.drains {
            if drain.app.is_empty() || drain.url.is_empty() {
                anyhow::bail!("drain {address:?} needs both app and url");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(
            r#"
addons:
  db:
    app: app1
    plan: heroku-postgresql:hobby-dev
    config:
      version: 16
      fork: false
drains:
  logs:
    app: app1
    url: https://logs.example.com/drain
"#,
        )
        .unwrap();

        let db = &manifest.addons["db"];
        assert_eq!(db.plan, "heroku-postgresql:hobby-dev");
        let config = db.config.as_ref().unwrap();
        assert_eq!(config["version"], json!(16));
        assert_eq!(config["fork"], json!(false));
        assert_eq!(manifest.drains["logs"].url, "https://logs.example.com/drain");
    }

    #[test]
    fn test_missing_plan_is_rejected() {
        let err = Manifest::parse("addons:\n  db:\n    app: app1\n    plan: ''\n").unwrap_err();
        assert!(err.to_string().contains("needs both app and plan"));
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::parse("{}").unwrap();
        assert!(manifest.addons.is_empty());
        assert!(manifest.drains.is_empty());
    }
}
