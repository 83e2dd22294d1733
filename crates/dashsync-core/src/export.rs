//! Read-only export of a named resource.

use crate::errors::CoreError;
use crate::store::ResourceStore;
use dashsync_canonical::{Document, ResourceName};
use dashsync_remote::RpcTransport;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Text formats an export can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON, four-space indented, keys in server order.
    Json,
    /// YAML, keys in server order.
    Yaml,
}

impl ExportFormat {
    /// Lowercase format name.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(CoreError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Reads named resources in canonical form.
pub struct Exporter<'a, T: RpcTransport + ?Sized> {
    store: ResourceStore<'a, T>,
}

impl<'a, T: RpcTransport + ?Sized> Exporter<'a, T> {
    /// Creates an exporter over a resource store.
    pub fn new(store: ResourceStore<'a, T>) -> Self {
        Self { store }
    }

    /// Dashboard exporter over `transport`.
    pub fn dashboards(transport: &'a T) -> Self {
        Self::new(ResourceStore::dashboards(transport))
    }

    /// Canonical content of `name`; [`CoreError::NotFound`] when absent.
    ///
    /// The result can be fed back to the reconciler unchanged.
    pub fn export(&self, name: &ResourceName) -> Result<Document, CoreError> {
        self.store.load(name)
    }

    /// Canonical content of `name`, rendered as text.
    pub fn export_as(&self, name: &ResourceName, format: ExportFormat) -> Result<String, CoreError> {
        let document = self.export(name)?;
        render(&document, format)
    }
}

/// Renders a document in the requested format, keeping key order.
pub fn render(document: &Document, format: ExportFormat) -> Result<String, CoreError> {
    match format {
        ExportFormat::Json => {
            let mut out = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
            document
                .serialize(&mut serializer)
                .map_err(|e| CoreError::Render(e.to_string()))?;
            String::from_utf8(out).map_err(|e| CoreError::Render(e.to_string()))
        }
        ExportFormat::Yaml => {
            serde_yaml::to_string(document).map_err(|e| CoreError::Render(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_supported_formats() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("YAML".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
    }

    #[test]
    fn rejects_unsupported_format() {
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat(ref f) if f == "xml"));
        assert_eq!(err.to_string(), "Unsupported format: xml");
    }

    #[test]
    fn json_render_uses_four_space_indent_and_keeps_order() {
        let document = Document::from(json!({"b": "1", "a": ["x"]}));
        let text = render(&document, ExportFormat::Json).unwrap();
        assert_eq!(text, "{\n    \"b\": \"1\",\n    \"a\": [\n        \"x\"\n    ]\n}");
    }

    #[test]
    fn yaml_render_keeps_order() {
        let document = Document::from(json!({"zeta": "1", "alpha": "2"}));
        let text = render(&document, ExportFormat::Yaml).unwrap();
        assert_eq!(text, "zeta: '1'\nalpha: '2'\n");
    }
}
