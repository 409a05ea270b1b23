use serde::Deserialize;
use serde::Serialize;

use crate::CimInstance;

/// The lifecycle change a manager reports. Fixed at construction and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicationType {
    Creation,
    Deletion,
    Modification,
}

impl IndicationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicationType::Creation => "creation",
            IndicationType::Deletion => "deletion",
            IndicationType::Modification => "modification",
        }
    }
}

/// One detected change: a (old, new) pair of instances where exactly one
/// side is absent (creation/deletion) or both are present but differ in
/// non-key properties (modification).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub old: Option<CimInstance>,
    pub new: Option<CimInstance>,
}

impl DiffEntry {
    pub fn created(new: CimInstance) -> Self {
        Self {
            old: None,
            new: Some(new),
        }
    }

    pub fn deleted(old: CimInstance) -> Self {
        Self {
            old: Some(old),
            new: None,
        }
    }

    pub fn changed(
        old: CimInstance,
        new: CimInstance,
    ) -> Self {
        Self {
            old: Some(old),
            new: Some(new),
        }
    }

    /// The indication type this entry describes.
    pub fn kind(&self) -> Option<IndicationType> {
        match (&self.old, &self.new) {
            (None, Some(_)) => Some(IndicationType::Creation),
            (Some(_), None) => Some(IndicationType::Deletion),
            (Some(_), Some(_)) => Some(IndicationType::Modification),
            (None, None) => None,
        }
    }

    pub fn matches_type(
        &self,
        ty: IndicationType,
    ) -> bool {
        self.kind() == Some(ty)
    }
}

/// Per-call context supplied by the host when indications are enabled.
/// Replaces the process-wide broker/context globals of older provider
/// stacks: every manager carries its own.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Namespace indications are delivered into
    pub namespace: String,
    /// Requesting user, when the host supplies one
    pub user: Option<String>,
}

impl OperationContext {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            user: None,
        }
    }

    pub fn with_user(
        mut self,
        user: impl Into<String>,
    ) -> Self {
        self.user = Some(user.into());
        self
    }
}
