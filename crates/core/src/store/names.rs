//! Store naming.
//!
//! A store name is `<version-tag>-<role>`. Bumping the version tag is the
//! only way old stores become stale.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Deployment generation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreRole {
    /// Pre-provisioned, rarely-changing assets.
    Static,
    /// Responses accumulated from live traffic.
    Dynamic,
}

impl StoreRole {
    pub fn suffix(self) -> &'static str {
        match self {
            StoreRole::Static => "static",
            StoreRole::Dynamic => "dynamic",
        }
    }
}

/// The current store names, derived once from the active version tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    tag: VersionTag,
    static_name: String,
    dynamic_name: String,
}

impl StoreNames {
    pub fn new(tag: VersionTag) -> Self {
        let static_name = format!("{tag}-{}", StoreRole::Static.suffix());
        let dynamic_name = format!("{tag}-{}", StoreRole::Dynamic.suffix());
        Self { tag, static_name, dynamic_name }
    }

    pub fn tag(&self) -> &VersionTag {
        &self.tag
    }

    pub fn name(&self, role: StoreRole) -> &str {
        match role {
            StoreRole::Static => &self.static_name,
            StoreRole::Dynamic => &self.dynamic_name,
        }
    }

    /// Whether `name` is one of the current store names.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name || name == self.dynamic_name
    }
}
