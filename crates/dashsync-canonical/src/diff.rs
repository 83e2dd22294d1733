use serde::Serialize;

use crate::document::Document;
use crate::path::DocumentPath;

/// Before/after pair reported when a change would be applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diff {
    /// Canonical remote content, or an empty mapping when absent.
    pub before: Document,
    /// Desired content.
    pub after: Document,
}

impl Diff {
    /// Diff for a resource that does not exist yet.
    pub fn creation(after: Document) -> Self {
        Self {
            before: Document::mapping(),
            after,
        }
    }

    /// First path at which the two sides differ.
    pub fn first_difference(&self) -> Option<DocumentPath> {
        first_difference(&self.before, &self.after)
    }
}

/// Returns the first path at which `left` and `right` differ.
///
/// Walks depth first: sequences in order (a length mismatch reports the
/// first missing index), mapping keys in `left`'s order, then keys only
/// present in `right`. Returns `None` exactly when the documents are equal.
pub fn first_difference(left: &Document, right: &Document) -> Option<DocumentPath> {
    walk(left, right, DocumentPath::root())
}

fn walk(left: &Document, right: &Document, path: DocumentPath) -> Option<DocumentPath> {
    match (left, right) {
        (Document::Sequence(a), Document::Sequence(b)) => {
            for (idx, (x, y)) in a.iter().zip(b.iter()).enumerate() {
                if let Some(found) = walk(x, y, path.push_index(idx)) {
                    return Some(found);
                }
            }
            if a.len() != b.len() {
                return Some(path.push_index(a.len().min(b.len())));
            }
            None
        }
        (Document::Mapping(a), Document::Mapping(b)) => {
            for (key, x) in a {
                match b.get(key) {
                    Some(y) => {
                        if let Some(found) = walk(x, y, path.push_field(key)) {
                            return Some(found);
                        }
                    }
                    None => return Some(path.push_field(key)),
                }
            }
            b.keys()
                .find(|key| !a.contains_key(key.as_str()))
                .map(|key| path.push_field(key))
        }
        _ if left == right => None,
        _ => Some(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from(value)
    }

    #[test]
    fn equal_documents_have_no_difference() {
        let a = doc(json!({"pages": [{"widgets": [{"x": 1}]}]}));
        assert_eq!(first_difference(&a, &a.clone()), None);
    }

    #[test]
    fn reports_changed_widget_field() {
        let a = doc(json!({"pages": [{"widgets": [{"x": 1}]}]}));
        let b = doc(json!({"pages": [{"widgets": [{"x": 2}]}]}));
        assert_eq!(
            first_difference(&a, &b).unwrap().to_string(),
            "pages[0].widgets[0].x"
        );
    }

    #[test]
    fn reports_missing_page() {
        let a = doc(json!({"pages": [{}, {}]}));
        let b = doc(json!({"pages": [{}]}));
        assert_eq!(first_difference(&a, &b).unwrap().to_string(), "pages[1]");
    }

    #[test]
    fn reports_key_only_on_right() {
        let a = doc(json!({"a": 1}));
        let b = doc(json!({"a": 1, "b": 2}));
        assert_eq!(first_difference(&a, &b).unwrap().to_string(), "b");
    }

    #[test]
    fn type_mismatch_reports_current_path() {
        let a = doc(json!({"a": [1]}));
        let b = doc(json!({"a": {"0": 1}}));
        assert_eq!(first_difference(&a, &b).unwrap().to_string(), "a");
    }
}
