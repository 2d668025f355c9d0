//! Read-only catalog of experts and causes.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sciconnect_core::config::DirectoryConfig;
use sciconnect_core::types::{Cause, Expert};

use crate::error::DirectoryError;
use crate::seed;

/// On-disk / over-the-wire shape of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub experts: Vec<Expert>,
    #[serde(default)]
    pub causes: Vec<Cause>,
}

/// Display fields for a cause, with an empty fallback for failed lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CauseView {
    pub name: String,
    pub description: String,
    pub impact: String,
}

impl CauseView {
    /// The neutral display used when a cause id does not resolve.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_neutral(&self) -> bool {
        self.name.is_empty()
    }
}

impl From<&Cause> for CauseView {
    fn from(cause: &Cause) -> Self {
        Self {
            name: cause.name.clone(),
            description: cause.description.clone(),
            impact: cause.impact.clone(),
        }
    }
}

/// Immutable expert and cause catalog.
///
/// Built once at startup and never mutated afterwards, so every view the
/// filter engine derives from it is reproducible.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    experts: Vec<Expert>,
    causes: Vec<Cause>,
}

impl DirectoryStore {
    /// Build a store, rejecting duplicate expert or cause ids.
    pub fn new(experts: Vec<Expert>, causes: Vec<Cause>) -> Result<Self, DirectoryError> {
        ensure_unique(experts.iter().map(|e| e.id.as_str()))?;
        ensure_unique(causes.iter().map(|c| c.id.as_str()))?;
        tracing::debug!(
            experts = experts.len(),
            causes = causes.len(),
            "Directory catalog loaded"
        );
        Ok(Self { experts, causes })
    }

    /// The built-in catalog.
    pub fn seeded() -> Self {
        Self {
            experts: seed::experts(),
            causes: seed::causes(),
        }
    }

    /// Parse a JSON catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let doc: CatalogDocument =
            serde_json::from_str(json).map_err(|e| DirectoryError::Load(e.to_string()))?;
        Self::new(doc.experts, doc.causes)
    }

    /// Read and parse a JSON catalog file.
    pub fn from_json_file(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DirectoryError::Load(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), "Directory catalog read from file");
        Ok(store)
    }

    /// Load the configured catalog, or the seed catalog when none is set.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        match config.catalog_path.as_deref() {
            Some(path) => Self::from_json_file(Path::new(path)),
            None => Ok(Self::seeded()),
        }
    }

    pub fn list_experts(&self) -> &[Expert] {
        &self.experts
    }

    pub fn list_causes(&self) -> &[Cause] {
        &self.causes
    }

    pub fn find_cause(&self, id: &str) -> Result<&Cause, DirectoryError> {
        self.causes
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DirectoryError::CauseNotFound(id.to_string()))
    }

    pub fn find_expert(&self, id: &str) -> Result<&Expert, DirectoryError> {
        self.experts
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| DirectoryError::ExpertNotFound(id.to_string()))
    }

    /// Display fields for a cause id; unknown ids yield the neutral view.
    pub fn cause_or_neutral(&self, id: &str) -> CauseView {
        match self.find_cause(id) {
            Ok(cause) => CauseView::from(cause),
            Err(e) => {
                tracing::debug!(error = %e, "Falling back to neutral cause view");
                CauseView::neutral()
            }
        }
    }

    /// Catalog causes an expert supports, in the expert's order.
    ///
    /// Names that do not match any catalog cause are skipped.
    pub fn causes_for(&self, expert: &Expert) -> Vec<&Cause> {
        expert
            .causes
            .iter()
            .filter_map(|name| self.causes.iter().find(|c| &c.name == name))
            .collect()
    }
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), DirectoryError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DirectoryError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}
