//! # recurly-rs
//!
//! A Rust client library for the Recurly v2 (XML) API.
//!
//! ```no_run
//! use recurly::{Adjustment, Client, Config};
//!
//! # async fn run() -> recurly::Result<()> {
//! let client = Client::new(Config::new("my-site", "api-key"))?;
//!
//! let charge = Adjustment::new(1500, "USD").with_description("Setup fee");
//! let created = client.adjustments().create("account-1", &charge).await?;
//! println!("created {:?}", created.uuid);
//! # Ok(())
//! # }
//! ```
//!
//! Webhook payloads are decoded without a client:
//!
//! ```no_run
//! # fn handle(body: &[u8]) -> recurly::Result<()> {
//! let notification = recurly::webhooks::parse(body)?;
//! println!("{} for {:?}", notification.type_name(), notification.account().code);
//! # Ok(())
//! # }
//! ```
//!
//! ## Sentry Integration
//!
//! With the `sentry` feature enabled, errors convert into Sentry breadcrumbs
//! and context maps, see the `sentry_integration` module.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod utils;
pub mod webhooks;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::{Client, Config};
pub use endpoints::RecurlyEndpoint;
pub use entities::*;
pub use error::{Error, Result};
pub use webhooks::Notification;
