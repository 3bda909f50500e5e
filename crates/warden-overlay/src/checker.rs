//! Overlay evaluation.
//!
//! Records for a resource are checked in order. The first in-scope record
//! whose restrictions all pass grants access; when every in-scope record
//! fails, the last failure is reported.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use warden_types::{Classification, Context, OrgId, Principal, ResourceCategory};

use crate::network::ip_in_list;
use crate::record::{DatabaseOverlay, KnowledgeBaseOverlay, OverlayGrant, OverlayPermission};

// ============================================================================
// Source
// ============================================================================

/// Read access to stored overlay records.
pub trait OverlaySource {
    /// Records for `resource_id` in `org_id` under `category`, in storage order.
    fn overlays(
        &self,
        org_id: &OrgId,
        category: ResourceCategory,
        resource_id: &str,
    ) -> Vec<&OverlayPermission>;
}

impl OverlaySource for [OverlayPermission] {
    fn overlays(
        &self,
        org_id: &OrgId,
        category: ResourceCategory,
        resource_id: &str,
    ) -> Vec<&OverlayPermission> {
        self.iter()
            .filter(|r| {
                r.category() == category
                    && &r.grant().org_id == org_id
                    && r.grant().resource_id == resource_id
            })
            .collect()
    }
}

impl OverlaySource for Vec<OverlayPermission> {
    fn overlays(
        &self,
        org_id: &OrgId,
        category: ResourceCategory,
        resource_id: &str,
    ) -> Vec<&OverlayPermission> {
        self.as_slice().overlays(org_id, category, resource_id)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Why an overlay check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayDenial {
    #[error("no permission granted for this resource")]
    NotInScope,

    #[error("action '{action}' requires {flag}")]
    MissingCapability { action: String, flag: &'static str },

    #[error("action '{0}' is denied for this resource")]
    ActionDenied(String),

    #[error("action '{0}' is not in the allowed actions for this resource")]
    ActionNotAllowed(String),

    #[error("access not allowed at hour {hour} UTC (allowed {start}-{end})")]
    OutsideHours { hour: u32, start: u8, end: u8 },

    #[error("access not allowed on weekday {0}")]
    DayNotAllowed(u32),

    #[error("IP address {0} is denied")]
    IpDenied(String),

    #[error("IP address {0} is not in the allowed list")]
    IpNotAllowed(String),

    #[error("document '{0}' is denied")]
    DocumentDenied(String),

    #[error("document '{0}' is not in the allowed documents")]
    DocumentNotAllowed(String),

    #[error("document category '{0}' is denied")]
    CategoryDenied(String),

    #[error("document category '{0}' is not in the allowed categories")]
    CategoryNotAllowed(String),

    #[error("classification {classification} exceeds the allowed maximum {ceiling}")]
    ClassificationExceeded {
        classification: Classification,
        ceiling: Classification,
    },

    #[error("table '{0}' is denied")]
    TableDenied(String),

    #[error("table '{0}' is not in the allowed tables")]
    TableNotAllowed(String),
}

/// Result of checking the overlays of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayDecision {
    /// The resource has no overlay records; nothing restricts access.
    NoRecords,
    /// An in-scope record passed every check.
    Granted,
    Denied(OverlayDenial),
}

impl OverlayDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, OverlayDecision::Denied(_))
    }

    pub fn denial(&self) -> Option<&OverlayDenial> {
        match self {
            OverlayDecision::Denied(denial) => Some(denial),
            _ => None,
        }
    }
}

// ============================================================================
// Request
// ============================================================================

/// The parts of an access request the overlay checks consume.
#[derive(Debug, Clone, Copy)]
pub struct OverlayRequest<'a> {
    pub principal: &'a Principal,
    pub action: &'a str,
    pub resource_id: &'a str,
    pub context: &'a Context,
    pub now: DateTime<Utc>,
}

impl OverlayRequest<'_> {
    /// The request IP, from `ip_address` or `request.ip`.
    fn ip(&self) -> Option<&str> {
        self.context
            .get("ip_address")
            .and_then(Value::as_str)
            .or_else(|| {
                self.context
                    .get("request")
                    .and_then(|r| r.get("ip"))
                    .and_then(Value::as_str)
            })
    }

    fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

// ============================================================================
// Checks
// ============================================================================

/// Checks the overlays stored for the requested resource.
///
/// Categories without overlays always yield [`OverlayDecision::NoRecords`].
pub fn check_resource<S: OverlaySource + ?Sized>(
    source: &S,
    category: ResourceCategory,
    request: &OverlayRequest<'_>,
) -> OverlayDecision {
    if !category.has_overlays() {
        return OverlayDecision::NoRecords;
    }
    let records = source.overlays(&request.principal.org_id, category, request.resource_id);
    check_records(&records, request)
}

/// Checks an explicit list of records for one resource.
pub fn check_records(
    records: &[&OverlayPermission],
    request: &OverlayRequest<'_>,
) -> OverlayDecision {
    if records.is_empty() {
        return OverlayDecision::NoRecords;
    }

    let mut last_failure = OverlayDenial::NotInScope;
    for record in records {
        if !record.grant().scope.includes(request.principal) {
            continue;
        }
        match check_record(record, request) {
            Ok(()) => return OverlayDecision::Granted,
            Err(denial) => {
                debug!(
                    resource = request.resource_id,
                    user = %request.principal.id,
                    %denial,
                    "Overlay record did not grant access"
                );
                last_failure = denial;
            }
        }
    }

    OverlayDecision::Denied(last_failure)
}

/// Runs every check of one in-scope record.
pub fn check_record(
    record: &OverlayPermission,
    request: &OverlayRequest<'_>,
) -> Result<(), OverlayDenial> {
    let action = request.action;
    if let Some((flag, false)) = record.capability(action) {
        return Err(OverlayDenial::MissingCapability {
            action: action.to_string(),
            flag,
        });
    }

    check_grant(record.grant(), request)?;

    match record {
        OverlayPermission::Tool(_) => Ok(()),
        OverlayPermission::KnowledgeBase(kb) => check_knowledge_base(kb, request),
        OverlayPermission::Database(db) => check_database(db, request),
    }
}

fn check_grant(grant: &OverlayGrant, request: &OverlayRequest<'_>) -> Result<(), OverlayDenial> {
    let action = request.action;
    if grant.denied_actions.iter().any(|a| a == action) {
        return Err(OverlayDenial::ActionDenied(action.to_string()));
    }
    if !grant.allowed_actions.is_empty() && !grant.allowed_actions.iter().any(|a| a == action) {
        return Err(OverlayDenial::ActionNotAllowed(action.to_string()));
    }

    if let (Some(start), Some(end)) = (grant.allowed_hours_start, grant.allowed_hours_end) {
        let hour = request.now.hour();
        if !hour_in_window(hour, start, end) {
            return Err(OverlayDenial::OutsideHours { hour, start, end });
        }
    }

    let weekday = request.now.weekday().num_days_from_monday();
    if !grant.allowed_days.is_empty()
        && !grant.allowed_days.iter().any(|d| u32::from(*d) == weekday)
    {
        return Err(OverlayDenial::DayNotAllowed(weekday));
    }

    match request.ip() {
        Some(ip) if ip_in_list(ip, &grant.denied_ips) => {
            return Err(OverlayDenial::IpDenied(ip.to_string()));
        }
        Some(ip) if !grant.allowed_ips.is_empty() && !ip_in_list(ip, &grant.allowed_ips) => {
            return Err(OverlayDenial::IpNotAllowed(ip.to_string()));
        }
        None if !grant.allowed_ips.is_empty() => {
            return Err(OverlayDenial::IpNotAllowed("unknown".to_string()));
        }
        _ => {}
    }

    Ok(())
}

/// Inclusive hour window. A window with `start > end` spans midnight.
fn hour_in_window(hour: u32, start: u8, end: u8) -> bool {
    let (start, end) = (u32::from(start), u32::from(end));
    if start <= end {
        (start..=end).contains(&hour)
    } else {
        hour >= start || hour <= end
    }
}

fn check_knowledge_base(
    kb: &KnowledgeBaseOverlay,
    request: &OverlayRequest<'_>,
) -> Result<(), OverlayDenial> {
    if let Some(document) = request.context_str("document_id") {
        check_lists(
            document,
            &kb.allowed_document_ids,
            &kb.denied_document_ids,
            OverlayDenial::DocumentDenied,
            OverlayDenial::DocumentNotAllowed,
        )?;
    }

    if let Some(category) = request.context_str("category") {
        check_lists(
            category,
            &kb.allowed_categories,
            &kb.denied_categories,
            OverlayDenial::CategoryDenied,
            OverlayDenial::CategoryNotAllowed,
        )?;
    }

    if let (Some(ceiling), Some(label)) =
        (kb.max_classification, request.context_str("classification"))
    {
        let classification = Classification::parse_or_restricted(label);
        if classification > ceiling {
            return Err(OverlayDenial::ClassificationExceeded {
                classification,
                ceiling,
            });
        }
    }

    Ok(())
}

fn check_database(db: &DatabaseOverlay, request: &OverlayRequest<'_>) -> Result<(), OverlayDenial> {
    match request.context_str("table") {
        Some(table) => check_lists(
            table,
            &db.allowed_tables,
            &db.denied_tables,
            OverlayDenial::TableDenied,
            OverlayDenial::TableNotAllowed,
        ),
        None => Ok(()),
    }
}

/// Deny list first, then a non-empty allow list.
fn check_lists(
    value: &str,
    allowed: &[String],
    denied: &[String],
    on_denied: fn(String) -> OverlayDenial,
    on_not_allowed: fn(String) -> OverlayDenial,
) -> Result<(), OverlayDenial> {
    if denied.iter().any(|d| d == value) {
        return Err(on_denied(value.to_string()));
    }
    if !allowed.is_empty() && !allowed.iter().any(|a| a == value) {
        return Err(on_not_allowed(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(10, 9, 17, true ; "inside")]
    #[test_case(9, 9, 17, true ; "start inclusive")]
    #[test_case(17, 9, 17, true ; "end inclusive")]
    #[test_case(20, 9, 17, false ; "after")]
    #[test_case(23, 22, 6, true ; "overnight late")]
    #[test_case(3, 22, 6, true ; "overnight early")]
    #[test_case(12, 22, 6, false ; "overnight midday")]
    fn hour_windows(hour: u32, start: u8, end: u8, expected: bool) {
        assert_eq!(hour_in_window(hour, start, end), expected);
    }

    #[test]
    fn deny_list_wins_over_allow_list() {
        let allowed = vec!["doc-1".to_string()];
        let denied = vec!["doc-1".to_string()];
        assert_eq!(
            check_lists(
                "doc-1",
                &allowed,
                &denied,
                OverlayDenial::DocumentDenied,
                OverlayDenial::DocumentNotAllowed
            ),
            Err(OverlayDenial::DocumentDenied("doc-1".to_string()))
        );
    }

    #[test]
    fn not_in_scope_message() {
        assert_eq!(
            OverlayDenial::NotInScope.to_string(),
            "no permission granted for this resource"
        );
    }
}
