//! Overlay permission records.
//!
//! An overlay is a resource-scoped grant stored alongside role permissions.
//! Each category carries its own capability flags; the restrictions shared by
//! every category live in [`OverlayGrant`].

use serde::{Deserialize, Serialize};
use warden_types::{Classification, OrgId, ResourceCategory, Scope};

// ============================================================================
// Shared Grant
// ============================================================================

/// Scope and restrictions common to every overlay category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayGrant {
    pub org_id: OrgId,
    pub resource_id: String,
    /// Who the grant applies to. An empty scope matches nobody.
    #[serde(default)]
    pub scope: Scope,
    /// If non-empty, only these actions pass.
    #[serde(default)]
    pub allowed_actions: Vec<String>,
    #[serde(default)]
    pub denied_actions: Vec<String>,
    /// First UTC hour of the access window (inclusive).
    #[serde(default)]
    pub allowed_hours_start: Option<u8>,
    /// Last UTC hour of the access window (inclusive).
    #[serde(default)]
    pub allowed_hours_end: Option<u8>,
    /// Weekdays on which access is allowed, 0 = Monday. Empty allows every day.
    #[serde(default)]
    pub allowed_days: Vec<u8>,
    /// Addresses or CIDR blocks. If non-empty, the request IP must match one.
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    #[serde(default)]
    pub denied_ips: Vec<String>,
}

impl OverlayGrant {
    pub fn new(org_id: impl Into<OrgId>, resource_id: &str, scope: Scope) -> Self {
        Self {
            org_id: org_id.into(),
            resource_id: resource_id.to_string(),
            scope,
            allowed_actions: Vec::new(),
            denied_actions: Vec::new(),
            allowed_hours_start: None,
            allowed_hours_end: None,
            allowed_days: Vec::new(),
            allowed_ips: Vec::new(),
            denied_ips: Vec::new(),
        }
    }

    pub fn allow_action(mut self, action: &str) -> Self {
        self.allowed_actions.push(action.to_string());
        self
    }

    pub fn deny_action(mut self, action: &str) -> Self {
        self.denied_actions.push(action.to_string());
        self
    }

    pub fn with_hours(mut self, start: u8, end: u8) -> Self {
        self.allowed_hours_start = Some(start);
        self.allowed_hours_end = Some(end);
        self
    }

    pub fn with_days(mut self, days: &[u8]) -> Self {
        self.allowed_days = days.to_vec();
        self
    }

    pub fn allow_ip(mut self, entry: &str) -> Self {
        self.allowed_ips.push(entry.to_string());
        self
    }

    pub fn deny_ip(mut self, entry: &str) -> Self {
        self.denied_ips.push(entry.to_string());
        self
    }
}

// ============================================================================
// Per-Category Records
// ============================================================================

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOverlay {
    #[serde(flatten)]
    pub grant: OverlayGrant,
    #[serde(default = "yes")]
    pub can_view: bool,
    #[serde(default)]
    pub can_execute: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl ToolOverlay {
    /// A view-only grant.
    pub fn new(grant: OverlayGrant) -> Self {
        Self {
            grant,
            can_view: true,
            can_execute: false,
            can_edit: false,
            can_delete: false,
        }
    }

    pub fn executable(mut self) -> Self {
        self.can_execute = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseOverlay {
    #[serde(flatten)]
    pub grant: OverlayGrant,
    #[serde(default = "yes")]
    pub can_view: bool,
    #[serde(default)]
    pub can_view_full_content: bool,
    #[serde(default)]
    pub can_search: bool,
    #[serde(default)]
    pub can_download: bool,
    #[serde(default)]
    pub can_upload: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
    /// Highest classification this grant may read. `None` sets no ceiling.
    #[serde(default)]
    pub max_classification: Option<Classification>,
    #[serde(default)]
    pub allowed_document_ids: Vec<String>,
    #[serde(default)]
    pub denied_document_ids: Vec<String>,
    #[serde(default)]
    pub allowed_categories: Vec<String>,
    #[serde(default)]
    pub denied_categories: Vec<String>,
}

impl KnowledgeBaseOverlay {
    /// A view-only grant with no ceiling and no document restrictions.
    pub fn new(grant: OverlayGrant) -> Self {
        Self {
            grant,
            can_view: true,
            can_view_full_content: false,
            can_search: false,
            can_download: false,
            can_upload: false,
            can_edit: false,
            can_delete: false,
            max_classification: None,
            allowed_document_ids: Vec::new(),
            denied_document_ids: Vec::new(),
            allowed_categories: Vec::new(),
            denied_categories: Vec::new(),
        }
    }

    pub fn with_ceiling(mut self, ceiling: Classification) -> Self {
        self.max_classification = Some(ceiling);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseOverlay {
    #[serde(flatten)]
    pub grant: OverlayGrant,
    #[serde(default = "yes")]
    pub can_select: bool,
    #[serde(default)]
    pub can_insert: bool,
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub can_execute_procedure: bool,
    #[serde(default)]
    pub allowed_tables: Vec<String>,
    #[serde(default)]
    pub denied_tables: Vec<String>,
}

impl DatabaseOverlay {
    /// A read-only grant.
    pub fn new(grant: OverlayGrant) -> Self {
        Self {
            grant,
            can_select: true,
            can_insert: false,
            can_update: false,
            can_delete: false,
            can_execute_procedure: false,
            allowed_tables: Vec::new(),
            denied_tables: Vec::new(),
        }
    }
}

// ============================================================================
// Overlay Permission
// ============================================================================

/// A stored overlay record, tagged by the category it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum OverlayPermission {
    Tool(ToolOverlay),
    KnowledgeBase(KnowledgeBaseOverlay),
    Database(DatabaseOverlay),
}

impl OverlayPermission {
    pub fn category(&self) -> ResourceCategory {
        match self {
            OverlayPermission::Tool(_) => ResourceCategory::Tool,
            OverlayPermission::KnowledgeBase(_) => ResourceCategory::KnowledgeBase,
            OverlayPermission::Database(_) => ResourceCategory::Database,
        }
    }

    pub fn grant(&self) -> &OverlayGrant {
        match self {
            OverlayPermission::Tool(t) => &t.grant,
            OverlayPermission::KnowledgeBase(k) => &k.grant,
            OverlayPermission::Database(d) => &d.grant,
        }
    }

    /// Returns the capability flag `action` requires and whether it is set.
    ///
    /// `None` means the action is not mapped to a flag and needs none.
    pub fn capability(&self, action: &str) -> Option<(&'static str, bool)> {
        match self {
            OverlayPermission::Tool(t) => match action {
                "view" | "read" => Some(("can_view", t.can_view)),
                "execute" | "run" => Some(("can_execute", t.can_execute)),
                "edit" | "update" => Some(("can_edit", t.can_edit)),
                "delete" => Some(("can_delete", t.can_delete)),
                _ => None,
            },
            OverlayPermission::KnowledgeBase(k) => match action {
                "view" | "read" => Some(("can_view", k.can_view)),
                "view_full_content" | "read_full" => {
                    Some(("can_view_full_content", k.can_view_full_content))
                }
                "search" | "query" => Some(("can_search", k.can_search)),
                "download" => Some(("can_download", k.can_download)),
                "upload" => Some(("can_upload", k.can_upload)),
                "edit" | "update" => Some(("can_edit", k.can_edit)),
                "delete" => Some(("can_delete", k.can_delete)),
                _ => None,
            },
            OverlayPermission::Database(d) => match action {
                "select" | "read" | "query" => Some(("can_select", d.can_select)),
                "insert" => Some(("can_insert", d.can_insert)),
                "update" => Some(("can_update", d.can_update)),
                "delete" => Some(("can_delete", d.can_delete)),
                "execute" | "execute_procedure" => {
                    Some(("can_execute_procedure", d.can_execute_procedure))
                }
                _ => None,
            },
        }
    }
}

impl From<ToolOverlay> for OverlayPermission {
    fn from(value: ToolOverlay) -> Self {
        OverlayPermission::Tool(value)
    }
}

impl From<KnowledgeBaseOverlay> for OverlayPermission {
    fn from(value: KnowledgeBaseOverlay) -> Self {
        OverlayPermission::KnowledgeBase(value)
    }
}

impl From<DatabaseOverlay> for OverlayPermission {
    fn from(value: DatabaseOverlay) -> Self {
        OverlayPermission::Database(value)
    }
}
