use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of field removed during canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrippedField {
    /// Top-level resource identifier.
    ResourceId,
    /// Top-level lookup name.
    Name,
    /// Other server-assigned top-level field (e.g. `uuid`).
    InstanceField,
    /// Per-page identifier.
    PageId,
    /// Per-widget identifier.
    WidgetId,
}

impl StrippedField {
    /// Stable metric key.
    pub fn as_str(self) -> &'static str {
        match self {
            StrippedField::ResourceId => "resource_id",
            StrippedField::Name => "name",
            StrippedField::InstanceField => "instance_fields",
            StrippedField::PageId => "page_id",
            StrippedField::WidgetId => "widget_id",
        }
    }
}

/// Counts of fields removed from a fetched resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalizationReport {
    /// Removed field counts keyed by [`StrippedField::as_str`].
    pub stripped: BTreeMap<String, u64>,
}

impl CanonicalizationReport {
    pub(crate) fn record(&mut self, field: StrippedField) {
        *self.stripped.entry(field.as_str().to_string()).or_insert(0) += 1;
    }

    /// Number of fields of the given kind that were removed.
    pub fn count(&self, field: StrippedField) -> u64 {
        self.stripped.get(field.as_str()).copied().unwrap_or(0)
    }

    /// Total number of removed fields.
    pub fn total(&self) -> u64 {
        self.stripped.values().sum()
    }
}
