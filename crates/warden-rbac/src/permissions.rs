//! Permission strings and permission sets.
//!
//! A permission is written `<category>:<action>`. The action `*` grants every
//! action within the category.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use warden_types::ResourceCategory;

/// The action that grants every action in a category.
pub const WILDCARD_ACTION: &str = "*";

/// A parsed `category:action` permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Permission {
    pub category: String,
    pub action: String,
}

impl Permission {
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
        }
    }

    /// The permission required to perform `action` on `category`.
    pub fn required(category: ResourceCategory, action: &str) -> Self {
        Self::new(category.as_str(), action)
    }

    /// The wildcard permission for `category`.
    pub fn wildcard(category: ResourceCategory) -> Self {
        Self::new(category.as_str(), WILDCARD_ACTION)
    }

    /// Parses `category:action`. Returns `None` when there is no separator or
    /// either side is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (category, action) = s.split_once(':')?;
        if category.is_empty() || action.is_empty() {
            return None;
        }
        Some(Self::new(category, action))
    }

    pub fn is_wildcard(&self) -> bool {
        self.action == WILDCARD_ACTION
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.action)
    }
}

/// The effective permissions of a principal.
///
/// Stored as raw strings so that malformed grants survive aggregation
/// unchanged; they simply never satisfy a typed check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the exact permission string is present.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns whether `action` on `category` is granted, exactly or through
    /// the category wildcard.
    pub fn allows(&self, category: ResourceCategory, action: &str) -> bool {
        self.contains(&Permission::required(category, action).to_string())
            || self.contains(&Permission::wildcard(category).to_string())
    }

    /// Adds a permission string. Returns whether it was newly inserted.
    pub fn grant(&mut self, permission: &str) -> bool {
        self.permissions.insert(permission.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Well-formed permissions in the set, skipping malformed strings.
    pub fn parsed(&self) -> impl Iterator<Item = Permission> + '_ {
        self.permissions.iter().filter_map(|p| Permission::parse(p))
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl<'a> Extend<&'a String> for PermissionSet {
    fn extend<T: IntoIterator<Item = &'a String>>(&mut self, iter: T) {
        for permission in iter {
            self.grant(permission);
        }
    }
}

impl<'a> FromIterator<&'a str> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = Self::new();
        for permission in iter {
            set.grant(permission);
        }
        set
    }
}
