use crate::document::Document;
use crate::path::DocumentPath;
use crate::report::{CanonicalizationReport, StrippedField};

/// Error returned when a canonical document cannot be encoded.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// The document could not be rendered as canonical JSON.
    #[error("canonical encoding failed: {0}")]
    Encoding(String),
    /// The fingerprint did not form a valid digest.
    #[error("fingerprint rejected: {0}")]
    Digest(#[from] crate::ValidationError),
}

/// Names of the server-assigned fields at each nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierProfile {
    /// Top-level resource identifier.
    pub resource_id: String,
    /// Top-level lookup name; supplied by the caller, never compared.
    pub name: String,
    /// Other top-level fields the server assigns per instance.
    pub instance_fields: Vec<String>,
    /// Key of the ordered page collection.
    pub pages: String,
    /// Per-page identifier.
    pub page_id: String,
    /// Key of the ordered widget collection inside a page.
    pub widgets: String,
    /// Per-widget identifier.
    pub widget_id: String,
}

impl IdentifierProfile {
    /// Field layout of the monitoring server's `dashboard` objects.
    pub fn dashboard() -> Self {
        Self {
            resource_id: "dashboardid".into(),
            name: "name".into(),
            instance_fields: vec!["uuid".into()],
            pages: "pages".into(),
            page_id: "dashboard_pageid".into(),
            widgets: "widgets".into(),
            widget_id: "widgetid".into(),
        }
    }
}

impl Default for IdentifierProfile {
    fn default() -> Self {
        Self::dashboard()
    }
}

/// Canonical document plus a tally of what was removed.
#[derive(Debug, Clone)]
pub struct CanonicalizationResult {
    /// Document free of instance identifiers and of the lookup name.
    pub document: Document,
    /// Counts of stripped fields.
    pub report: CanonicalizationReport,
}

/// Strips instance-specific identifiers from fetched resources.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    profile: IdentifierProfile,
}

impl Canonicalizer {
    /// Creates a canonicalizer for the provided field layout.
    pub fn new(profile: IdentifierProfile) -> Self {
        Self { profile }
    }

    /// Field layout this canonicalizer strips.
    pub fn profile(&self) -> &IdentifierProfile {
        &self.profile
    }

    /// Removes the resource id, the name, and every page and widget id.
    ///
    /// All other fields, and the order of pages and widgets, are kept as
    /// they were. Fields that are absent are skipped; pages or widgets that
    /// are not mappings pass through untouched.
    pub fn canonicalize(&self, fetched: Document) -> CanonicalizationResult {
        let mut document = fetched;
        let mut report = CanonicalizationReport::default();
        let profile = &self.profile;

        if document.remove(&profile.resource_id).is_some() {
            report.record(StrippedField::ResourceId);
        }
        for field in &profile.instance_fields {
            if document.remove(field).is_some() {
                report.record(StrippedField::InstanceField);
            }
        }
        if document.remove(&profile.name).is_some() {
            report.record(StrippedField::Name);
        }

        let pages = document
            .as_mapping_mut()
            .and_then(|map| map.get_mut(&profile.pages))
            .and_then(Document::as_sequence_mut);

        for page in pages.into_iter().flatten() {
            if page.remove(&profile.page_id).is_some() {
                report.record(StrippedField::PageId);
            }
            let widgets = page
                .as_mapping_mut()
                .and_then(|map| map.get_mut(&profile.widgets))
                .and_then(Document::as_sequence_mut);
            for widget in widgets.into_iter().flatten() {
                if widget.remove(&profile.widget_id).is_some() {
                    report.record(StrippedField::WidgetId);
                }
            }
        }

        CanonicalizationResult { document, report }
    }

    /// Canonical document without the report.
    pub fn strip(&self, fetched: Document) -> Document {
        self.canonicalize(fetched).document
    }

    /// Lists every path at which an identifier or the lookup name appears.
    ///
    /// An empty result means the document is already canonical.
    pub fn find_identifiers(&self, document: &Document) -> Vec<DocumentPath> {
        let profile = &self.profile;
        let root = DocumentPath::root();
        let mut found = Vec::new();

        let top_level = std::iter::once(&profile.resource_id)
            .chain(profile.instance_fields.iter())
            .chain(std::iter::once(&profile.name));
        for field in top_level {
            if document.get(field).is_some() {
                found.push(root.push_field(field));
            }
        }

        let pages = document.get(&profile.pages).and_then(Document::as_sequence);
        for (page_idx, page) in pages.into_iter().flatten().enumerate() {
            let page_path = root.push_field(&profile.pages).push_index(page_idx);
            if page.get(&profile.page_id).is_some() {
                found.push(page_path.push_field(&profile.page_id));
            }
            let widgets = page.get(&profile.widgets).and_then(Document::as_sequence);
            for (widget_idx, widget) in widgets.into_iter().flatten().enumerate() {
                if widget.get(&profile.widget_id).is_some() {
                    found.push(
                        page_path
                            .push_field(&profile.widgets)
                            .push_index(widget_idx)
                            .push_field(&profile.widget_id),
                    );
                }
            }
        }

        found
    }
}
