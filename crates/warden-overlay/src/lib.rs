//! # warden-overlay: per-resource overlay permissions
//!
//! Role permissions decide whether a principal may act on a *category* of
//! resource. Overlays narrow that per resource: who the grant covers, which
//! capabilities it enables, and when, from where and on what data it applies.
//!
//! Two outcomes are deliberately distinct:
//!
//! - a resource with **no records** is unrestricted ([`OverlayDecision::NoRecords`]);
//! - a resource with records that **do not cover** the principal is denied
//!   ([`OverlayDenial::NotInScope`]).

pub mod checker;
pub mod network;
pub mod record;


pub use checker::{
    OverlayDecision, OverlayDenial, OverlayRequest, OverlaySource, check_record, check_records,
    check_resource,
};
pub use record::{
    DatabaseOverlay, KnowledgeBaseOverlay, OverlayGrant, OverlayPermission, ToolOverlay,
};
