use dashsync_canonical::DocumentPath;
use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No resource with the given name exists remotely.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Resource label, e.g. `Dashboard`.
        kind: String,
        /// Name or id that was looked up.
        name: String,
    },
    /// A `get`, `create`, or `update` call failed; the sequence was aborted.
    #[error("remote call failed: {0}")]
    Remote(#[from] dashsync_remote::RemoteError),
    /// Export was requested in a format this engine does not render.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    /// The desired document carries a server-assigned field or the name.
    #[error("desired document is not canonical: `{path}` must not be set")]
    NotCanonical {
        /// First offending location.
        path: DocumentPath,
    },
    /// The desired document is not a mapping.
    #[error("desired document must be a mapping, got {0}")]
    InvalidDocument(&'static str),
    /// An operation argument is required by the chosen action.
    #[error("missing argument `{argument}` for action `{action}`")]
    MissingArgument {
        /// Action that requires it.
        action: &'static str,
        /// Argument name.
        argument: &'static str,
    },
    /// An operation argument is not one of the accepted values.
    #[error("invalid {name}: {value}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
    /// Rendering the export failed.
    #[error("render failed: {0}")]
    Render(String),
    /// Name or id failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] dashsync_canonical::ValidationError),
}
