use serde::{Serialize, Serializer};
use std::fmt;

/// One step into a [`crate::Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Mapping key.
    Field(String),
    /// Sequence position.
    Index(usize),
}

/// Location inside a document, rendered as `pages[1].widgets[0].x`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPath {
    segments: Vec<Segment>,
}

impl DocumentPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended by a mapping key.
    pub fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(field.to_string()));
        Self { segments }
    }

    /// Returns a new path extended by a sequence index.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    /// Segments from the root down.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "root");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

impl Serialize for DocumentPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_root() {
        assert_eq!(DocumentPath::root().to_string(), "root");
    }

    #[test]
    fn renders_nested_path() {
        let path = DocumentPath::root()
            .push_field("pages")
            .push_index(1)
            .push_field("widgets")
            .push_index(0)
            .push_field("x");
        assert_eq!(path.to_string(), "pages[1].widgets[0].x");
    }
}
