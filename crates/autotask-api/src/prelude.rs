//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types from the autotask-api crate,
//! plus the filter types from the query crate, so library consumers can
//! import everything they need with a single use statement.
//!
//! # Example
//!
//! ```
//! use autotask_api_rs::prelude::*;
//!
//! // Now you have access to:
//! // - AutotaskClient, AutotaskClientBuilder (API client)
//! // - Error, ApiError, Result (error handling)
//! // - FetchEngine, Selector, FetchOptions, Verb, RecordStream (fetching)
//! // - MetadataCache, ResourceMetadata, PicklistMeta (metadata cache)
//! // - FilterTree, FilterNode, ComparisonOp, QueryParser (filter compiler)
//! ```

// Client types
pub use crate::client::{AutotaskClient, AutotaskClientBuilder};

// Error types
pub use crate::error::{ApiError, Error, Result};

// Fetch engine types
pub use crate::fetch::{FetchEngine, FetchOptions, RecordStream, Selector, Verb};

// Metadata cache types
pub use crate::metadata::{MetadataCache, PicklistMeta, ResourceMetadata};

// Envelope and registry types
pub use crate::models::{CountEnvelope, PageDetails, QueryEnvelope};
pub use crate::resources::ResourceDescriptor;

// Filter compiler types, re-exported from the query crate
pub use autotask_query_rs::{
    ComparisonOp, FilterNode, FilterTree, FilterValue, GroupOp, QueryError, QueryParser,
};
