//! Converges a named remote resource onto a desired canonical document.
//!
//! One invocation walks a fixed sequence of blocking calls:
//!
//! ```text
//! lookup ──absent──▶ create                      (1 mutating call)
//!    │
//!    └─present──▶ fetch ─▶ canonicalize ─▶ compare
//!                                            ├─equal──▶ done      (0 calls)
//!                                            └─differ─▶ clear ─▶ repopulate (2 calls)
//! ```
//!
//! Dry runs stop before the first mutating call and report the diff instead.
//! The remote API cannot patch nested pages, so a replace first collapses the
//! page list to a single empty page and then writes the full document. If the
//! second call fails the resource is left cleared; nothing is rolled back.

use crate::errors::CoreError;
use crate::store::ResourceStore;
use dashsync_canonical::{first_difference, Diff, Document, RemoteId, ResourceName};
use dashsync_remote::RpcTransport;
use serde::Serialize;

/// What was observed about the named resource before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceState {
    /// No resource with the name exists.
    Absent,
    /// The resource exists and its canonical content equals the desired one.
    PresentMatching,
    /// The resource exists and differs from the desired content.
    PresentDiffering,
}

/// Observation that drives the transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Nothing with the name exists.
    Absent,
    /// Found, and equal to the desired content.
    PresentMatching {
        /// Resolved identifier.
        id: RemoteId,
    },
    /// Found, and different from the desired content.
    PresentDiffering {
        /// Resolved identifier.
        id: RemoteId,
        /// Canonical remote content.
        existing: Document,
    },
}

impl Observation {
    /// Classified state.
    pub fn state(&self) -> ResourceState {
        match self {
            Observation::Absent => ResourceState::Absent,
            Observation::PresentMatching { .. } => ResourceState::PresentMatching,
            Observation::PresentDiffering { .. } => ResourceState::PresentDiffering,
        }
    }
}

/// Terminal result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The resource did not exist and was created.
    Created,
    /// The resource already matched; nothing was sent.
    Unchanged,
    /// The resource was cleared and repopulated.
    Replaced,
    /// Dry run: the change that would have been applied.
    WouldChange {
        /// Canonical before/after content.
        diff: Diff,
    },
}

impl Outcome {
    /// True for every outcome except [`Outcome::Unchanged`].
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }

    /// Diff payload of a dry run.
    pub fn diff(&self) -> Option<&Diff> {
        match self {
            Outcome::WouldChange { diff } => Some(diff),
            _ => None,
        }
    }
}

/// Drives a single named resource to its desired content.
pub struct Reconciler<'a, T: RpcTransport + ?Sized> {
    store: ResourceStore<'a, T>,
}

impl<'a, T: RpcTransport + ?Sized> Reconciler<'a, T> {
    /// Creates a reconciler over a resource store.
    pub fn new(store: ResourceStore<'a, T>) -> Self {
        Self { store }
    }

    /// Dashboard reconciler over `transport`.
    pub fn dashboards(transport: &'a T) -> Self {
        Self::new(ResourceStore::dashboards(transport))
    }

    /// Underlying store.
    pub fn store(&self) -> &ResourceStore<'a, T> {
        &self.store
    }

    /// Resolves and classifies the named resource without mutating anything.
    pub fn observe(&self, name: &ResourceName, desired: &Document) -> Result<Observation, CoreError> {
        let Some(id) = self.store.lookup_id(name)? else {
            return Ok(Observation::Absent);
        };

        let existing = self.store.fetch_canonical(&id)?.document;
        if existing == *desired {
            return Ok(Observation::PresentMatching { id });
        }
        if let Some(path) = first_difference(&existing, desired) {
            tracing::debug!(name = %name, path = %path, "resource differs");
        }
        Ok(Observation::PresentDiffering { id, existing })
    }

    /// Converges `name` onto `desired`.
    ///
    /// `desired` must be a mapping free of server-assigned ids and of the
    /// name field; otherwise no call is made and an error is returned.
    /// Mutating calls issued: none for `Unchanged` and dry runs, one
    /// `create` for `Created`, and `update` (clear) followed by `update`
    /// (repopulate) for `Replaced`.
    pub fn reconcile(
        &self,
        name: &ResourceName,
        desired: &Document,
        dry_run: bool,
    ) -> Result<Outcome, CoreError> {
        let span = tracing::info_span!("reconcile", name = %name, dry_run);
        let _guard = span.enter();

        self.check_desired(desired)?;

        match self.observe(name, desired)? {
            Observation::Absent => {
                if dry_run {
                    return Ok(Outcome::WouldChange {
                        diff: Diff::creation(desired.clone()),
                    });
                }
                self.create(name, desired)?;
                Ok(Outcome::Created)
            }
            Observation::PresentMatching { .. } => {
                tracing::info!("resource already up to date");
                Ok(Outcome::Unchanged)
            }
            Observation::PresentDiffering { id, existing } => {
                if dry_run {
                    return Ok(Outcome::WouldChange {
                        diff: Diff {
                            before: existing,
                            after: desired.clone(),
                        },
                    });
                }
                self.replace(name, &id, desired)?;
                Ok(Outcome::Replaced)
            }
        }
    }

    fn check_desired(&self, desired: &Document) -> Result<(), CoreError> {
        if desired.as_mapping().is_none() {
            return Err(CoreError::InvalidDocument(desired.kind()));
        }
        match self.store.canonicalizer().find_identifiers(desired).into_iter().next() {
            Some(path) => Err(CoreError::NotCanonical { path }),
            None => Ok(()),
        }
    }

    fn create(&self, name: &ResourceName, desired: &Document) -> Result<(), CoreError> {
        let profile = &self.store.kind().profile;
        let mut object = desired.clone();
        object.insert(profile.name.as_str(), name.as_str());

        let ids = self.store.collection().create(&object)?;
        tracing::info!(ids = ?ids.iter().map(RemoteId::as_str).collect::<Vec<_>>(), "created resource");
        Ok(())
    }

    fn replace(&self, name: &ResourceName, id: &RemoteId, desired: &Document) -> Result<(), CoreError> {
        let profile = &self.store.kind().profile;
        let collection = self.store.collection();

        let mut clear = Document::mapping();
        clear.insert(profile.resource_id.as_str(), id.as_str());
        clear.insert(profile.pages.as_str(), vec![Document::mapping()]);
        collection.update(&clear)?;
        tracing::info!(id = %id, "cleared pages");

        let mut repopulate = desired.clone();
        repopulate.insert(profile.name.as_str(), name.as_str());
        repopulate.insert(profile.resource_id.as_str(), id.as_str());
        if let Err(err) = collection.update(&repopulate) {
            tracing::warn!(id = %id, error = %err, "repopulate failed; resource left with cleared pages");
            return Err(err.into());
        }
        tracing::info!(id = %id, "repopulated pages");
        Ok(())
    }
}
