//! Deep-link builder: stamps records with their web UI detail URL.
//!
//! A pure lookup table keyed by resource name. Records without an
//! identifiable `id`, and resources without a known link mapping, pass
//! through unchanged.

use serde_json::Value;

/// Property name added to stamped records.
pub const LINK_PROPERTY: &str = "deepLink";

/// Fallback web host when none can be derived from the API base URL.
const DEFAULT_WEB_BASE: &str = "https://ww1.autotask.net";

/// Detail-page URL templates by resource name.
const LINK_TEMPLATES: &[(&str, &str)] = &[
    ("Tickets", "/Mvc/ServiceDesk/TicketDetail.mvc?workspace=False&ticketId={id}"),
    ("Companies", "/Mvc/CRM/AccountDetail.mvc?accountId={id}"),
    ("Contacts", "/Mvc/CRM/ContactDetail.mvc?contactId={id}"),
    ("Projects", "/Mvc/Projects/ProjectDetail.mvc?projectId={id}"),
    ("Opportunities", "/Mvc/CRM/OpportunityDetail.mvc?opportunityId={id}"),
    ("Quotes", "/Mvc/CRM/QuoteDetail.mvc?quoteId={id}"),
    ("Tasks", "/Mvc/Projects/TaskDetail.mvc?taskId={id}"),
];

/// Derives the web UI host from a zone API base URL.
///
/// Zone API hosts follow the `webservicesN` naming and the matching web UI
/// lives on `wwN`; anything unexpected falls back to a default host.
pub fn derive_web_base(api_base: &str) -> String {
    let Some(rest) = api_base.strip_prefix("https://webservices") else {
        return DEFAULT_WEB_BASE.to_string();
    };
    let zone: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if zone.is_empty() {
        return DEFAULT_WEB_BASE.to_string();
    }
    format!("https://ww{zone}.autotask.net")
}

/// Adds the deep-link property to a record, when possible.
pub fn stamp(record: &mut Value, resource: &str, web_base: &str) {
    let Some((_, template)) = LINK_TEMPLATES.iter().find(|(name, _)| *name == resource) else {
        return;
    };

    let id = match record.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return,
    };

    let link = format!("{}{}", web_base, template.replace("{id}", &id));
    if let Some(object) = record.as_object_mut() {
        object.insert(LINK_PROPERTY.to_string(), Value::String(link));
    }
}
