//! Canonical document model for dashboard reconciliation.
//!
//! Remote objects and desired-state files are both held as [`Document`]
//! trees. The [`Canonicalizer`] strips the identifiers the server assigns
//! per instance (resource, page, and widget ids) together with the lookup
//! name, so that a fetched resource and a desired document can be compared
//! with plain structural equality.
//!
#![deny(missing_docs)]

/// Identifier stripping.
pub mod canonicalizer;
/// Structural diff helpers.
pub mod diff;
/// Content fingerprints.
pub mod digest;
/// Recursive document value type.
pub mod document;
/// Validated names and ids.
pub mod identifiers;
/// Paths into documents.
pub mod path;
/// Stripped-field tallies.
pub mod report;
/// Validation helpers used by canonical types.
pub mod validation;

pub use canonicalizer::{
    CanonicalizationError, CanonicalizationResult, Canonicalizer, IdentifierProfile,
};
pub use diff::{first_difference, Diff};
pub use digest::{fingerprint, Digest, DigestAlg};
pub use document::{Document, Mapping};
pub use identifiers::{RemoteId, ResourceName};
pub use path::{DocumentPath, Segment};
pub use report::{CanonicalizationReport, StrippedField};
pub use validation::ValidationError;
