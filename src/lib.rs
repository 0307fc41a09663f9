//! hrec - reconcile Heroku add-ons and log drains
//!
//! Drives the Heroku Platform API so that remote add-ons and log drains match
//! a declared manifest, and can adopt resources that already exist remotely.
//!
//! # Module Structure
//!
//! - [`heroku`] - Remote API client (HTTP transport and per-kind API traits)
//! - [`resource`] - Controllers, identity matching, config flattening, gating
//! - [`manifest`] - Declared desired state loaded from YAML
//! - [`state`] - Persisted attribute tables for managed resources
//! - [`apply`] - Drives the controllers over a manifest and a state file
//! - [`config`] - User configuration

pub mod apply;
pub mod config;
pub mod error;
pub mod heroku;
pub mod manifest;
pub mod resource;
pub mod state;

pub use error::{Error, Result};

/// Version injected at compile time via HREC_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("HREC_VERSION") {
    Some(v) => v,
    None => "dev",
};
