//! Heroku API interaction module
//!
//! This module is the remote side of reconciliation: an HTTP transport for the
//! Platform API and one trait per resource kind that the controllers call.
//!
//! # Module Structure
//!
//! - [`http`] - HTTP utilities for REST API calls
//! - [`client`] - Main Heroku client (token, URL helpers, pagination)
//! - [`addons`] - Add-on wire types and [`addons::AddonApi`]
//! - [`drains`] - Log drain wire types and [`drains::LogDrainApi`]
//!
//! # Example
//!
//! ```ignore
//! use hrec::heroku::{addons::AddonApi, client::HerokuClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = HerokuClient::new("https://api.heroku.com", "token")?;
//!     let addons = client.addon_list("my-app").await?;
//!     Ok(())
//! }
//! ```

pub mod addons;
pub mod client;
pub mod drains;
pub mod http;
