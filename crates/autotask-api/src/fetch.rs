//! Fetch engine: selector compilation, verb choice, pagination, enrichment.
//!
//! [`FetchEngine`] turns a resource name plus a [`Selector`] into a
//! [`RecordStream`]. Filter selectors compile to the query wire document,
//! get their UDF leaves tagged from cached metadata, and run against the
//! resource's `/query` endpoint as a GET (filter in the `search` query
//! parameter) or a POST (filter in the body), chosen by URL length unless
//! the caller pins a verb. Pages are fetched on demand by following the
//! server's opaque next-page cursor; each record is enriched on its way
//! out (picklist labels, local-time conversion, deep links) per the
//! caller's [`FetchOptions`].

use std::collections::VecDeque;
use std::sync::Arc;

use autotask_query_rs::{ComparisonOp, FilterNode, FilterTree, QueryParser};
use chrono::{DateTime, Local, SecondsFormat};
use serde_json::Value;

use crate::client::AutotaskClient;
use crate::error::{Error, Result};
use crate::links;
use crate::metadata::{MetadataCache, ResourceMetadata};
use crate::models::{CountEnvelope, QueryEnvelope};
use crate::resources::{self, ResourceDescriptor};

/// Full request URLs at or above this length are sent as POST instead of
/// carrying the filter in the `search` query parameter.
pub const GET_LENGTH_THRESHOLD: usize = 2048;

/// How records are selected from a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Every record (compiles to an `id gte 0` filter).
    All,
    /// One record by id; child collections take the parent id here and
    /// optionally a child record id.
    Id {
        /// The record id, or the parent id for child collections.
        id: i64,
        /// The child record id, for child collections.
        child_id: Option<i64>,
    },
    /// A filter expression in the SQL-like syntax, compiled at fetch time.
    Expression(String),
    /// A pre-built filter tree.
    Filter(FilterTree),
    /// A single field/operator/value triplet, for callers that do not want
    /// to build expression strings.
    Simple {
        /// The field to compare.
        field: String,
        /// The operator spelling, as in the expression syntax (`eq`, `like`...).
        op: String,
        /// The value; numeric text compares numerically, anything else as a string.
        value: String,
    },
}

/// The HTTP verb used for query requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Filter in the `search` query parameter.
    Get,
    /// Filter in the request body.
    Post,
}

/// Per-fetch behavior switches.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Replace raw picklist values with their human-readable labels.
    pub resolve_labels: bool,
    /// Rewrite UTC timestamp strings into the local timezone.
    pub local_time: bool,
    /// Stamp records with a web UI deep-link property.
    pub deep_links: bool,
    /// Pin the query verb instead of choosing by URL length.
    pub verb: Option<Verb>,
}

/// Builds the GET query URL with the filter document in the `search`
/// parameter.
pub fn search_url(base_url: &str, query_path: &str, filter_json: &str) -> String {
    let params = serde_urlencoded::to_string([("search", filter_json)])
        .expect("string pairs always urlencode");
    format!(
        "{}/{}?{}",
        base_url.trim_end_matches('/'),
        query_path,
        params
    )
}

/// The fetch engine: borrows a client and a metadata cache, produces
/// record streams.
#[derive(Debug, Clone, Copy)]
pub struct FetchEngine<'a> {
    client: &'a AutotaskClient,
    cache: &'a MetadataCache,
}

impl<'a> FetchEngine<'a> {
    /// Creates an engine over the given client and cache.
    pub fn new(client: &'a AutotaskClient, cache: &'a MetadataCache) -> Self {
        Self { client, cache }
    }

    /// Fetches records from a resource.
    ///
    /// Returns a lazy [`RecordStream`]; no request is sent until the first
    /// record is pulled. Base endpoints and the invoice PDF resource yield
    /// their response envelope verbatim as a single record, with no
    /// pagination or enrichment.
    ///
    /// # Errors
    ///
    /// Fails fast with [`Error::NotAuthenticated`] when no session is
    /// configured, [`Error::UnknownResource`] for unregistered names,
    /// [`Error::Query`] when an expression selector does not compile, and
    /// [`Error::QueryNotSupported`] when a filter selector targets a
    /// resource without a `/query` endpoint.
    pub async fn fetch(
        &self,
        resource: &str,
        selector: Selector,
        options: FetchOptions,
    ) -> Result<RecordStream<'a>> {
        self.client.ensure_session()?;
        let descriptor = resources::lookup(resource)?;

        // Base endpoints and the binary document resource return their
        // envelope verbatim: one page, no enrichment.
        if descriptor.is_base() {
            let url = self.client.endpoint_url(descriptor.root_path());
            return Ok(RecordStream::raw(self.client, url));
        }
        if descriptor.name == "InvoicePDF" {
            let path = match &selector {
                Selector::Id { id, child_id } => descriptor.id_path(*id, *child_id),
                _ => descriptor.root_path().to_string(),
            };
            let url = self.client.endpoint_url(&path);
            return Ok(RecordStream::raw(self.client, url));
        }

        let is_filter_selector = matches!(
            selector,
            Selector::All | Selector::Expression(_) | Selector::Filter(_) | Selector::Simple { .. }
        );
        if is_filter_selector && !descriptor.supports_query {
            return Err(Error::query_not_supported(descriptor.name));
        }

        let metadata = if options.resolve_labels || is_filter_selector {
            self.metadata_or_empty(descriptor).await
        } else {
            Arc::new(ResourceMetadata::empty())
        };

        if let Selector::Id { id, child_id } = selector {
            let url = self.client.endpoint_url(&descriptor.id_path(id, child_id));
            return Ok(RecordStream::paged(
                self.client,
                descriptor.name,
                PageRequest::Get(url),
                None,
                metadata,
                options,
            ));
        }

        let mut tree = selector_filter(selector)?;
        tree.root_mut().mark_udfs(&|field| metadata.is_udf(field));
        let body = tree.to_json()?;

        let get_url = search_url(self.client.base_url(), &descriptor.query_path(), &body);
        let use_post = match options.verb {
            Some(Verb::Get) => false,
            Some(Verb::Post) => true,
            None => get_url.len() >= GET_LENGTH_THRESHOLD,
        };

        let (first, post_body) = if use_post {
            let url = self.client.endpoint_url(&descriptor.query_path());
            (PageRequest::Post(url), Some(body))
        } else {
            (PageRequest::Get(get_url), None)
        };

        Ok(RecordStream::paged(
            self.client,
            descriptor.name,
            first,
            post_body,
            metadata,
            options,
        ))
    }

    /// Counts the records a selector matches, without fetching them.
    ///
    /// Always POSTs the filter document to the `/query/count` endpoint.
    /// An [`Selector::Id`] selector counts records whose `id` equals the
    /// given id.
    pub async fn count(&self, resource: &str, selector: Selector) -> Result<i64> {
        self.client.ensure_session()?;
        let descriptor = resources::lookup(resource)?;
        if !descriptor.supports_query {
            return Err(Error::query_not_supported(descriptor.name));
        }

        let mut tree = match selector {
            Selector::Id { id, .. } => {
                FilterTree::new(FilterNode::comparison("id", ComparisonOp::Eq, id))
            }
            other => selector_filter(other)?,
        };
        let metadata = self.metadata_or_empty(descriptor).await;
        tree.root_mut().mark_udfs(&|field| metadata.is_udf(field));

        let envelope: CountEnvelope = self.client.post(&descriptor.count_path(), &tree).await?;
        Ok(envelope.query_count)
    }

    /// Fetches metadata for enrichment and UDF tagging, degrading to an
    /// empty entry when the metadata endpoints fail. Degraded fetches
    /// still return records, just without labels or UDF markers.
    async fn metadata_or_empty(&self, descriptor: &ResourceDescriptor) -> Arc<ResourceMetadata> {
        match self.cache.resource_metadata(self.client, descriptor).await {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!(
                    "metadata fetch for '{}' failed, continuing without labels or UDF tagging: {e}",
                    descriptor.name
                );
                Arc::new(ResourceMetadata::empty())
            }
        }
    }
}

/// Compiles a filter-style selector into a tree.
fn selector_filter(selector: Selector) -> Result<FilterTree> {
    match selector {
        Selector::All => Ok(FilterTree::new(FilterNode::comparison(
            "id",
            ComparisonOp::Gte,
            0,
        ))),
        Selector::Expression(expr) => Ok(QueryParser::parse(&expr)?),
        Selector::Filter(tree) => Ok(tree),
        Selector::Simple { field, op, value } => {
            let expr = format!("{} {} {}", field, op, quote_simple_value(&value));
            Ok(QueryParser::parse(&expr)?)
        }
        Selector::Id { .. } => unreachable!("id selectors do not compile to filters"),
    }
}

/// Quotes a simple-selector value for the expression syntax. Numeric text
/// stays bare so it compares numerically; everything else is quoted with
/// embedded quotes and backslashes escaped.
fn quote_simple_value(value: &str) -> String {
    if value.parse::<f64>().is_ok() && !value.is_empty() {
        return value.to_string();
    }
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// The next page request a stream will issue.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageRequest {
    Get(String),
    Post(String),
}

/// A lazy, pull-based stream of fetched records.
///
/// Each call to [`next`] yields one enriched record, fetching the next page
/// from the server only when the buffer runs dry. A page-level failure is
/// yielded once as an error and terminates the stream.
///
/// [`next`]: RecordStream::next
#[derive(Debug)]
pub struct RecordStream<'a> {
    client: &'a AutotaskClient,
    options: FetchOptions,
    metadata: Arc<ResourceMetadata>,
    resource: &'static str,
    web_base: String,
    /// Verbatim-envelope mode for base endpoints and document resources.
    raw: bool,
    /// Body re-sent on follow-up pages when the stream runs over POST.
    post_body: Option<String>,
    buffer: VecDeque<Value>,
    next_request: Option<PageRequest>,
}

impl<'a> RecordStream<'a> {
    fn raw(client: &'a AutotaskClient, url: String) -> Self {
        Self {
            client,
            options: FetchOptions::default(),
            metadata: Arc::new(ResourceMetadata::empty()),
            resource: "",
            web_base: String::new(),
            raw: true,
            post_body: None,
            buffer: VecDeque::new(),
            next_request: Some(PageRequest::Get(url)),
        }
    }

    fn paged(
        client: &'a AutotaskClient,
        resource: &'static str,
        first: PageRequest,
        post_body: Option<String>,
        metadata: Arc<ResourceMetadata>,
        options: FetchOptions,
    ) -> Self {
        let web_base = links::derive_web_base(client.base_url());
        Self {
            client,
            options,
            metadata,
            resource,
            web_base,
            raw: false,
            post_body,
            buffer: VecDeque::new(),
            next_request: Some(first),
        }
    }

    /// Pulls the next record, fetching a page if needed.
    ///
    /// Returns `None` once the terminal page has been drained, or after a
    /// page error has been yielded.
    pub async fn next(&mut self) -> Option<Result<Value>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(self.enrich(record)));
            }
            let request = self.next_request.take()?;
            if let Err(e) = self.fetch_page(request).await {
                // Terminate: next_request was already taken.
                self.buffer.clear();
                return Some(Err(e));
            }
        }
    }

    /// Drains the stream into a vector, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await {
            records.push(record?);
        }
        Ok(records)
    }

    async fn fetch_page(&mut self, request: PageRequest) -> Result<()> {
        if self.raw {
            let PageRequest::Get(url) = request else {
                unreachable!("raw streams are GET-only");
            };
            let envelope: Value = self.client.get_url(&url).await?;
            self.buffer.push_back(envelope);
            return Ok(());
        }

        let envelope: QueryEnvelope = match &request {
            PageRequest::Get(url) => {
                log::debug!("fetching page GET {url}");
                self.client.get_url(url).await?
            }
            PageRequest::Post(url) => {
                log::debug!("fetching page POST {url}");
                let body: Value = serde_json::from_str(
                    self.post_body.as_deref().unwrap_or("{}"),
                )?;
                self.client.post_url(url, &body).await?
            }
        };

        // Follow-up pages reuse the verb the stream started with.
        self.next_request = envelope.next_page_url().map(|cursor| {
            if self.post_body.is_some() {
                PageRequest::Post(cursor.to_string())
            } else {
                PageRequest::Get(cursor.to_string())
            }
        });
        self.buffer.extend(envelope.into_records());
        Ok(())
    }

    /// Applies the per-record enrichment passes. All passes are soft: a
    /// value that cannot be enriched is left untouched.
    fn enrich(&self, mut record: Value) -> Value {
        if self.raw {
            return record;
        }
        if self.options.resolve_labels {
            resolve_picklist_labels(&mut record, &self.metadata);
        }
        if self.options.local_time {
            localize_timestamps(&mut record);
        }
        if self.options.deep_links {
            links::stamp(&mut record, self.resource, &self.web_base);
        }
        record
    }
}

/// Replaces raw picklist values with their labels, in place.
///
/// Only fields known to be picklists are touched; null values and values
/// with no label mapping pass through unchanged.
fn resolve_picklist_labels(record: &mut Value, metadata: &ResourceMetadata) {
    let Some(object) = record.as_object_mut() else {
        return;
    };
    for field in &metadata.picklists.fields {
        let Some(labels) = metadata.picklists.labels.get(field) else {
            continue;
        };
        let Some(value) = object.get(field) else {
            continue;
        };
        let Some(key) = crate::models::normalize_picklist_key(value) else {
            continue;
        };
        if let Some(label) = labels.get(&key) {
            object.insert(field.clone(), Value::String(label.clone()));
        }
    }
}

/// Rewrites top-level UTC timestamp strings into the local timezone,
/// in place. Values that do not parse as RFC 3339 UTC timestamps are
/// left untouched.
fn localize_timestamps(record: &mut Value) {
    let Some(object) = record.as_object_mut() else {
        return;
    };
    for value in object.values_mut() {
        let Some(text) = value.as_str() else {
            continue;
        };
        if !text.ends_with('Z') {
            continue;
        }
        if let Ok(utc) = DateTime::parse_from_rfc3339(text) {
            let local = utc.with_timezone(&Local);
            *value = Value::String(local.to_rfc3339_opts(SecondsFormat::Millis, false));
        }
    }
}
