//! Lookup, existence check, and canonical fetch shared by the writer and
//! reader flows.

use crate::errors::CoreError;
use dashsync_canonical::{
    fingerprint, CanonicalizationResult, Canonicalizer, Document, IdentifierProfile, RemoteId,
    ResourceName,
};
use dashsync_remote::{Collection, GetRequest, Output, RpcTransport};

/// Remote collection plus the field layout of its objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceKind {
    /// Collection name, e.g. `dashboard`.
    pub collection: String,
    /// Instance-specific fields to strip.
    pub profile: IdentifierProfile,
    /// `select*` parameters requested on a full fetch.
    pub related: Vec<String>,
}

impl ResourceKind {
    /// Dashboards with their pages, users, and user groups.
    pub fn dashboard() -> Self {
        Self {
            collection: "dashboard".into(),
            profile: IdentifierProfile::dashboard(),
            related: vec![
                "selectPages".into(),
                "selectUsers".into(),
                "selectUserGroups".into(),
            ],
        }
    }

    /// Label used in messages: the collection name, capitalized.
    pub fn label(&self) -> String {
        let mut chars = self.collection.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Default for ResourceKind {
    fn default() -> Self {
        Self::dashboard()
    }
}

/// Read access to one kind of named resource.
pub struct ResourceStore<'a, T: RpcTransport + ?Sized> {
    collection: Collection<'a, T>,
    kind: ResourceKind,
    canonicalizer: Canonicalizer,
}

impl<'a, T: RpcTransport + ?Sized> ResourceStore<'a, T> {
    /// Binds a resource kind to a transport.
    pub fn new(transport: &'a T, kind: ResourceKind) -> Self {
        Self {
            collection: Collection::new(transport, kind.collection.clone()),
            canonicalizer: Canonicalizer::new(kind.profile.clone()),
            kind,
        }
    }

    /// Dashboard store over `transport`.
    pub fn dashboards(transport: &'a T) -> Self {
        Self::new(transport, ResourceKind::dashboard())
    }

    /// Underlying collection.
    pub fn collection(&self) -> &Collection<'a, T> {
        &self.collection
    }

    /// Resource kind.
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Canonicalizer for this kind.
    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Id of the resource named `name`, or `None` when there is none.
    ///
    /// The server does not enforce unique names. When several resources
    /// share the name, the first one returned is used and a warning is
    /// logged; which one that is depends on server ordering.
    pub fn lookup_id(&self, name: &ResourceName) -> Result<Option<RemoteId>, CoreError> {
        let id_field = &self.kind.profile.resource_id;
        let request = GetRequest::new()
            .filter(&self.kind.profile.name, name.as_str())
            .output(Output::Fields(vec![id_field.clone()]));

        let matches = self.collection.get(&request)?;
        if matches.len() > 1 {
            tracing::warn!(
                name = %name,
                count = matches.len(),
                "several resources share this name; using the first match"
            );
        }

        let id = matches
            .first()
            .and_then(|found| found.get(id_field))
            .and_then(id_string)
            .map(RemoteId::new);

        tracing::debug!(name = %name, id = ?id.as_ref().map(RemoteId::as_str), "looked up resource");
        Ok(id)
    }

    /// True iff a resource named `name` exists.
    pub fn exists(&self, name: &ResourceName) -> Result<bool, CoreError> {
        Ok(self.lookup_id(name)?.is_some())
    }

    /// Fetches the resource with its related collections and canonicalizes it.
    ///
    /// A fetch that returns nothing (the resource vanished after lookup) is
    /// reported as [`CoreError::NotFound`] with the id.
    pub fn fetch_canonical(&self, id: &RemoteId) -> Result<CanonicalizationResult, CoreError> {
        let mut request = GetRequest::new().ids(&self.collection.ids_key(), std::slice::from_ref(id));
        for select in &self.kind.related {
            request = request.select_related(select);
        }

        let fetched = self
            .collection
            .get(&request)?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found(format!("id {}", id)))?;

        let result = self.canonicalizer.canonicalize(fetched);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let digest = fingerprint(&result.document).ok();
            tracing::debug!(
                id = %id,
                stripped = result.report.total(),
                fingerprint = ?digest.map(|d| d.to_string()),
                "fetched canonical resource"
            );
        }
        Ok(result)
    }

    /// Looks up `name` and returns its canonical content.
    pub fn load(&self, name: &ResourceName) -> Result<Document, CoreError> {
        let id = self
            .lookup_id(name)?
            .ok_or_else(|| self.not_found(name.to_string()))?;
        Ok(self.fetch_canonical(&id)?.document)
    }

    fn not_found(&self, name: String) -> CoreError {
        CoreError::NotFound {
            kind: self.kind.label(),
            name,
        }
    }
}

fn id_string(value: &Document) -> Option<String> {
    match value {
        Document::String(s) => Some(s.clone()),
        Document::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
