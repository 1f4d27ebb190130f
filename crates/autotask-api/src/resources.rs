//! Resource descriptor registry.
//!
//! Maps logical resource names onto the API's endpoint path templates.
//! Templates use `{parentId}`/`{id}` placeholders (matched case-insensitively)
//! for parent and record ids; query-capable resources get their `/query`
//! variant by truncating the template at its first placeholder.

use crate::error::{Error, Result};

/// A registry entry mapping a logical resource name to its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// The logical resource name, as callers spell it.
    pub name: &'static str,
    /// The endpoint path template, with `{parentId}`/`{id}` placeholders.
    pub path_template: &'static str,
    /// Whether the resource supports the `/query` endpoint.
    pub supports_query: bool,
}

impl ResourceDescriptor {
    /// True for base endpoints (zone/version style): no placeholders,
    /// no query support, a single-page GET contract.
    pub fn is_base(&self) -> bool {
        !self.supports_query && !self.path_template.contains('{')
    }

    /// True for child collections addressed through a parent id.
    pub fn is_child(&self) -> bool {
        self.path_template
            .split('/')
            .filter_map(placeholder_name)
            .any(|name| name == "parentid")
    }

    /// The template root: everything before the first placeholder segment.
    pub fn root_path(&self) -> &'static str {
        match self.path_template.find("/{") {
            Some(idx) => &self.path_template[..idx],
            None => self.path_template,
        }
    }

    /// The `/query` endpoint path for this resource.
    pub fn query_path(&self) -> String {
        format!("{}/query", self.root_path())
    }

    /// The `/query/count` endpoint path for this resource.
    pub fn count_path(&self) -> String {
        format!("{}/query/count", self.root_path())
    }

    /// Substitutes ids into the path template.
    ///
    /// For child collections, `id` fills `{parentId}` and `child_id` fills
    /// the trailing `{id}`; omitting `child_id` addresses the collection
    /// itself (the template is truncated at the unfilled placeholder).
    pub fn id_path(&self, id: i64, child_id: Option<i64>) -> String {
        let is_child = self.is_child();
        let mut segments: Vec<String> = Vec::new();

        for segment in self.path_template.split('/') {
            let Some(name) = placeholder_name(segment) else {
                segments.push(segment.to_string());
                continue;
            };
            let value = if name == "parentid" || !is_child {
                Some(id)
            } else {
                child_id
            };
            match value {
                Some(v) => segments.push(v.to_string()),
                None => break,
            }
        }

        segments.join("/")
    }
}

/// Extracts a lowercased placeholder name from a `{...}` path segment.
fn placeholder_name(segment: &str) -> Option<String> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .map(|s| s.to_ascii_lowercase())
}

/// The endpoint registry, grouped the way the platform groups its paths.
const RESOURCES: &[ResourceDescriptor] = &[
    // Base endpoints: single-page, non-filterable.
    ResourceDescriptor { name: "Version", path_template: "Version", supports_query: false },
    ResourceDescriptor { name: "ZoneInformation", path_template: "ZoneInformation", supports_query: false },
    ResourceDescriptor { name: "ThresholdInformation", path_template: "ThresholdInformation", supports_query: false },
    // Flat entities.
    ResourceDescriptor { name: "Appointments", path_template: "Appointments/{id}", supports_query: true },
    ResourceDescriptor { name: "BillingCodes", path_template: "BillingCodes/{id}", supports_query: true },
    ResourceDescriptor { name: "BillingItems", path_template: "BillingItems/{id}", supports_query: true },
    ResourceDescriptor { name: "Companies", path_template: "Companies/{id}", supports_query: true },
    ResourceDescriptor { name: "ConfigurationItems", path_template: "ConfigurationItems/{id}", supports_query: true },
    ResourceDescriptor { name: "ConfigurationItemTypes", path_template: "ConfigurationItemTypes/{id}", supports_query: true },
    ResourceDescriptor { name: "Contacts", path_template: "Contacts/{id}", supports_query: true },
    ResourceDescriptor { name: "ContactGroups", path_template: "ContactGroups/{id}", supports_query: true },
    ResourceDescriptor { name: "Contracts", path_template: "Contracts/{id}", supports_query: true },
    ResourceDescriptor { name: "ContractServices", path_template: "ContractServices/{id}", supports_query: true },
    ResourceDescriptor { name: "Countries", path_template: "Countries/{id}", supports_query: true },
    ResourceDescriptor { name: "Departments", path_template: "Departments/{id}", supports_query: true },
    ResourceDescriptor { name: "ExpenseItems", path_template: "ExpenseItems/{id}", supports_query: true },
    ResourceDescriptor { name: "ExpenseReports", path_template: "ExpenseReports/{id}", supports_query: true },
    ResourceDescriptor { name: "Invoices", path_template: "Invoices/{id}", supports_query: true },
    ResourceDescriptor { name: "Opportunities", path_template: "Opportunities/{id}", supports_query: true },
    ResourceDescriptor { name: "Products", path_template: "Products/{id}", supports_query: true },
    ResourceDescriptor { name: "Projects", path_template: "Projects/{id}", supports_query: true },
    ResourceDescriptor { name: "PurchaseOrders", path_template: "PurchaseOrders/{id}", supports_query: true },
    ResourceDescriptor { name: "Quotes", path_template: "Quotes/{id}", supports_query: true },
    ResourceDescriptor { name: "Resources", path_template: "Resources/{id}", supports_query: true },
    ResourceDescriptor { name: "Roles", path_template: "Roles/{id}", supports_query: true },
    ResourceDescriptor { name: "ServiceCalls", path_template: "ServiceCalls/{id}", supports_query: true },
    ResourceDescriptor { name: "Services", path_template: "Services/{id}", supports_query: true },
    ResourceDescriptor { name: "Tasks", path_template: "Tasks/{id}", supports_query: true },
    ResourceDescriptor { name: "Tickets", path_template: "Tickets/{id}", supports_query: true },
    ResourceDescriptor { name: "TimeEntries", path_template: "TimeEntries/{id}", supports_query: true },
    // Child collections addressed through their parent.
    ResourceDescriptor { name: "CompanyNotes", path_template: "Companies/{parentId}/Notes/{id}", supports_query: false },
    ResourceDescriptor { name: "CompanyContacts", path_template: "Companies/{parentId}/Contacts/{id}", supports_query: false },
    ResourceDescriptor { name: "ProjectNotes", path_template: "Projects/{parentId}/Notes/{id}", supports_query: false },
    ResourceDescriptor { name: "ProjectPhases", path_template: "Projects/{parentId}/Phases/{id}", supports_query: false },
    ResourceDescriptor { name: "ProjectTasks", path_template: "Projects/{parentId}/Tasks/{id}", supports_query: false },
    ResourceDescriptor { name: "TicketNotes", path_template: "Tickets/{parentId}/Notes/{id}", supports_query: false },
    ResourceDescriptor { name: "TicketAttachments", path_template: "Tickets/{parentId}/Attachments/{id}", supports_query: false },
    ResourceDescriptor { name: "TicketTimeEntries", path_template: "Tickets/{parentId}/TimeEntries/{id}", supports_query: false },
    // Binary document resource, special-cased by the fetch engine.
    ResourceDescriptor { name: "InvoicePDF", path_template: "InvoicePDF/{id}", supports_query: false },
];

/// Looks up a logical resource name (exact, case-sensitive match).
pub fn lookup(name: &str) -> Result<&'static ResourceDescriptor> {
    RESOURCES
        .iter()
        .find(|descriptor| descriptor.name == name)
        .ok_or_else(|| Error::unknown_resource(name))
}
