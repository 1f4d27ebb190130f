//! Per-resource metadata cache: picklist labels and UDF names.
//!
//! Picklist and user-defined-field definitions are discovered lazily from
//! the entity information endpoints and memoized for the life of the cache.
//! The cache is an explicit object injected into the fetch engine, so a new
//! authentication cycle resets it by constructing (or [`reset`]ting) one
//! rather than by touching hidden process state.
//!
//! [`reset`]: MetadataCache::reset

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::client::AutotaskClient;
use crate::error::Result;
use crate::models::{FieldInfoEnvelope, UdfFieldEnvelope};
use crate::resources::ResourceDescriptor;

/// Picklist metadata for one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PicklistMeta {
    /// Names of the resource's picklist-typed fields.
    pub fields: HashSet<String>,
    /// Per-field map from normalized raw value to human-readable label.
    pub labels: HashMap<String, HashMap<String, String>>,
}

/// Cached metadata for one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMetadata {
    /// Picklist fields and their value labels.
    pub picklists: PicklistMeta,
    /// Lowercased user-defined field identifiers.
    pub udf_names: HashSet<String>,
}

impl ResourceMetadata {
    /// An empty entry, used when the fetch engine degrades on a failed
    /// metadata fetch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether a filter field refers to one of the resource's UDFs.
    /// Matching is case-insensitive.
    pub fn is_udf(&self, field: &str) -> bool {
        self.udf_names.contains(&field.to_ascii_lowercase())
    }
}

/// Lazily-populated, memoizing metadata cache keyed by resource name.
///
/// Population is attempted at most once per resource per cache lifetime;
/// a failed fetch caches nothing, so the next call retries. The entry map
/// is guarded by a mutex and duplicate in-flight population for the same
/// resource resolves as an idempotent overwrite.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: Mutex<HashMap<String, Arc<ResourceMetadata>>>,
}

impl MetadataCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every cached entry. Call this after re-authenticating.
    pub fn reset(&self) {
        self.entries.lock().expect("metadata cache poisoned").clear();
    }

    /// Returns the cached metadata for a resource, fetching and memoizing
    /// it on first access.
    ///
    /// Fails fast with [`crate::Error::NotAuthenticated`] when the client
    /// has no session context. Fetch failures are returned to the caller,
    /// which decides whether to degrade; nothing is cached on failure.
    pub async fn resource_metadata(
        &self,
        client: &AutotaskClient,
        descriptor: &ResourceDescriptor,
    ) -> Result<Arc<ResourceMetadata>> {
        client.ensure_session()?;

        let key = descriptor.name.to_ascii_lowercase();
        if let Some(cached) = self
            .entries
            .lock()
            .expect("metadata cache poisoned")
            .get(&key)
        {
            return Ok(Arc::clone(cached));
        }

        // Fetch without holding the lock. Two tasks racing here both
        // populate the same immutable data; last write wins harmlessly.
        let metadata = Arc::new(fetch_resource_metadata(client, descriptor).await?);
        self.entries
            .lock()
            .expect("metadata cache poisoned")
            .insert(key, Arc::clone(&metadata));
        Ok(metadata)
    }

    /// Returns the picklist metadata for a resource.
    pub async fn picklist_meta(
        &self,
        client: &AutotaskClient,
        descriptor: &ResourceDescriptor,
    ) -> Result<PicklistMeta> {
        Ok(self
            .resource_metadata(client, descriptor)
            .await?
            .picklists
            .clone())
    }

    /// Returns the lowercased UDF names for a resource.
    pub async fn udf_names(
        &self,
        client: &AutotaskClient,
        descriptor: &ResourceDescriptor,
    ) -> Result<HashSet<String>> {
        Ok(self
            .resource_metadata(client, descriptor)
            .await?
            .udf_names
            .clone())
    }

    /// Number of populated entries (test visibility).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("metadata cache poisoned").len()
    }

    /// True when no entry has been populated yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Performs the metadata fetches for one resource.
async fn fetch_resource_metadata(
    client: &AutotaskClient,
    descriptor: &ResourceDescriptor,
) -> Result<ResourceMetadata> {
    let root = descriptor.root_path();

    let envelope: FieldInfoEnvelope = client
        .get(&format!("{root}/entityInformation/fields"))
        .await?;

    let mut picklists = PicklistMeta::default();
    for field in envelope.fields {
        if !field.is_pick_list {
            continue;
        }
        let mut value_labels = HashMap::new();
        for candidate in &field.picklist_values {
            if let Some(key) = candidate.key() {
                value_labels.insert(key, candidate.label.clone());
            }
        }
        picklists.fields.insert(field.name.clone());
        picklists.labels.insert(field.name, value_labels);
    }

    // Base and child resources never carry UDFs in this domain model.
    let udf_names = if descriptor.is_base() || descriptor.is_child() {
        HashSet::new()
    } else {
        let envelope: UdfFieldEnvelope = client
            .get(&format!("{root}/entityInformation/userDefinedFields"))
            .await?;
        envelope
            .fields
            .iter()
            .filter_map(|udf| udf.identifier())
            .map(|name| name.to_ascii_lowercase())
            .collect()
    };

    Ok(ResourceMetadata {
        picklists,
        udf_names,
    })
}
