//! Managed records and their declarations
//!
//! A record is the locally tracked view of one remote resource. Its identifier
//! is empty until the resource has been created or adopted, and is cleared again
//! after deletion.

use super::flatten::{self, FlatConfig};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Flat attribute table persisted per managed resource
pub type Attributes = BTreeMap<String, String>;

/// Resource kinds handled by the controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Addon,
    Drain,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Addon => f.write_str("addon"),
            ResourceKind::Drain => f.write_str("drain"),
        }
    }
}

/// Common surface of persisted records
pub trait Managed: Sized {
    /// Remote identifier, empty while unmanaged
    fn id(&self) -> &str;

    fn is_managed(&self) -> bool {
        !self.id().is_empty()
    }

    /// Encode as a flat attribute table (identifier excluded)
    fn to_attributes(&self) -> Attributes;

    /// Decode a record from its identifier and attribute table
    fn from_attributes(id: &str, attrs: &Attributes) -> Result<Self>;
}

fn attr(attrs: &Attributes, key: &str) -> String {
    attrs.get(key).cloned().unwrap_or_default()
}

/// Attribute every stored record of `kind` must carry
fn required_attr(attrs: &Attributes, key: &str, kind: ResourceKind) -> Result<String> {
    match attrs.get(key) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(Error::invalid_configuration(
            key,
            format!("missing from stored {kind}"),
        )),
    }
}

// =============================================================================
// Add-on
// =============================================================================

/// Declared desired state of an add-on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddonDeclaration {
    pub app: String,
    pub plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<BTreeMap<String, Value>>,
}

impl AddonDeclaration {
    pub fn new(app: &str, plan: &str) -> Self {
        Self {
            app: app.to_string(),
            plan: plan.to_string(),
            config: None,
        }
    }

    pub fn with_config<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.config = Some(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Declared configuration coerced and flattened, `None` when absent or empty
    pub fn flat_config(&self) -> Result<Option<FlatConfig>> {
        let Some(declared) = self.config.as_ref() else {
            return Ok(None);
        };
        let flat = flatten::flatten(&flatten::coerce_declared(declared)?);
        Ok((!flat.is_empty()).then_some(flat))
    }
}

/// Tracked state of an add-on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonRecord {
    pub id: String,
    pub app: String,
    pub name: String,
    pub plan: String,
    pub provider_id: String,
    /// User supplied configuration, fixed at creation
    pub config: Option<FlatConfig>,
    /// Config var names exposed by the add-on, as a single name->name map
    pub config_vars: Vec<BTreeMap<String, String>>,
}

impl AddonRecord {
    /// Unmanaged record carrying the declared fields
    pub fn declared(declaration: &AddonDeclaration) -> Result<Self> {
        Ok(Self {
            app: declaration.app.clone(),
            plan: declaration.plan.clone(),
            config: declaration.flat_config()?,
            ..Default::default()
        })
    }
}

impl Managed for AddonRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("app".into(), self.app.clone());
        attrs.insert("plan".into(), self.plan.clone());
        if !self.name.is_empty() {
            attrs.insert("name".into(), self.name.clone());
        }
        attrs.insert("provider_id".into(), self.provider_id.clone());
        if let Some(config) = &self.config {
            config.write_attributes(&mut attrs, "config");
        }
        flatten::write_map_list(&mut attrs, "config_vars", &self.config_vars);
        attrs
    }

    fn from_attributes(id: &str, attrs: &Attributes) -> Result<Self> {
        Ok(Self {
            id: id.to_string(),
            app: required_attr(attrs, "app", ResourceKind::Addon)?,
            name: attr(attrs, "name"),
            plan: required_attr(attrs, "plan", ResourceKind::Addon)?,
            provider_id: attr(attrs, "provider_id"),
            config: FlatConfig::from_attributes(attrs, "config")?,
            config_vars: flatten::read_map_list(attrs, "config_vars")?,
        })
    }
}

// =============================================================================
// Drain
// =============================================================================

/// Declared desired state of a log drain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainDeclaration {
    pub app: String,
    pub url: String,
}

impl DrainDeclaration {
    pub fn new(app: &str, url: &str) -> Self {
        Self {
            app: app.to_string(),
            url: url.to_string(),
        }
    }
}

/// Tracked state of a log drain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainRecord {
    pub id: String,
    pub app: String,
    pub url: String,
    pub token: String,
}

impl DrainRecord {
    pub fn declared(declaration: &DrainDeclaration) -> Self {
        Self {
            app: declaration.app.clone(),
            url: declaration.url.clone(),
            ..Default::default()
        }
    }
}

impl Managed for DrainRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("app".into(), self.app.clone());
        attrs.insert("url".into(), self.url.clone());
        attrs.insert("token".into(), self.token.clone());
        attrs
    }

    fn from_attributes(id: &str, attrs: &Attributes) -> Result<Self> {
        Ok(Self {
            id: id.to_string(),
            app: required_attr(attrs, "app", ResourceKind::Drain)?,
            url: required_attr(attrs, "url", ResourceKind::Drain)?,
            token: attr(attrs, "token"),
        })
    }
}
