//! Autotask REST API access library
//!
//! A read-side client for the Autotask PSA REST API: resolve a logical
//! resource name, compile a filter selector (see the `autotask-query-rs`
//! crate for the expression syntax), and pull enriched records page by
//! page.
//!
//! # Quick Start
//!
//! For convenient imports, use the prelude:
//!
//! ```
//! use autotask_api_rs::prelude::*;
//! ```
//!
//! Typical usage builds an [`AutotaskClient`], a [`MetadataCache`] and a
//! [`FetchEngine`], then fetches:
//!
//! ```no_run
//! use autotask_api_rs::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let client = AutotaskClient::new(
//!     "https://webservices2.autotask.net/ATServicesRest/V1.0",
//!     "INTEGRATION-CODE",
//!     "apiuser@example.com",
//!     "secret",
//! )?;
//! let cache = MetadataCache::new();
//! let engine = FetchEngine::new(&client, &cache);
//!
//! let mut stream = engine
//!     .fetch(
//!         "Tickets",
//!         Selector::Expression("status ne 5 and priority le 2".to_string()),
//!         FetchOptions { resolve_labels: true, ..Default::default() },
//!     )
//!     .await?;
//! while let Some(ticket) = stream.next().await {
//!     println!("{}", ticket?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`AutotaskClient`]: client::AutotaskClient
//! [`MetadataCache`]: metadata::MetadataCache
//! [`FetchEngine`]: fetch::FetchEngine

pub mod client;
pub mod error;
pub mod fetch;
pub mod links;
pub mod metadata;
pub mod models;
pub mod prelude;
pub mod resources;
