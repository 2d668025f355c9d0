//! Compound expert filter: personality tag AND free-text query.
//!
//! Filtering is a pure function of the `FilterState` and the catalog. Results
//! keep catalog order; nothing is re-sorted.

use std::collections::HashMap;

use sciconnect_core::types::{Expert, PersonalityType, TagFilter};

use crate::store::DirectoryStore;

/// User-controlled filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Free-text query matched against name, field and bio.
    pub query: String,
    pub tag: TagFilter,
}

impl FilterState {
    pub fn new(query: impl Into<String>, tag: TagFilter) -> Self {
        Self {
            query: query.into(),
            tag,
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_tag(&mut self, tag: TagFilter) {
        self.tag = tag;
    }

    /// True when the state lets every expert through.
    pub fn is_unfiltered(&self) -> bool {
        self.tag == TagFilter::All && self.query.is_empty()
    }
}

/// Lowercased query, computed once per evaluation instead of once per expert.
struct Needle(String);

impl Needle {
    fn new(query: &str) -> Self {
        Self(query.to_lowercase())
    }

    fn matches(&self, expert: &Expert) -> bool {
        self.0.is_empty()
            || expert.name.to_lowercase().contains(&self.0)
            || expert.field.to_lowercase().contains(&self.0)
            || expert.bio.to_lowercase().contains(&self.0)
    }
}

/// Apply a filter state to a sequence of experts.
pub fn apply<'a>(experts: &'a [Expert], state: &FilterState) -> Vec<&'a Expert> {
    let needle = Needle::new(&state.query);
    experts
        .iter()
        .filter(|e| state.tag.matches(e.personality) && needle.matches(e))
        .collect()
}

/// Catalog positions grouped by personality tag, ascending.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    positions: HashMap<PersonalityType, Vec<usize>>,
}

impl TagIndex {
    pub fn build(experts: &[Expert]) -> Self {
        let mut positions: HashMap<PersonalityType, Vec<usize>> = HashMap::new();
        for (i, expert) in experts.iter().enumerate() {
            positions.entry(expert.personality).or_default().push(i);
        }
        Self { positions }
    }

    pub fn positions(&self, tag: PersonalityType) -> &[usize] {
        self.positions.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Filter engine bound to a catalog, scanning only the selected tag's
/// experts when a tag filter is active.
#[derive(Debug)]
pub struct FilterEngine<'a> {
    store: &'a DirectoryStore,
    index: TagIndex,
}

impl<'a> FilterEngine<'a> {
    pub fn new(store: &'a DirectoryStore) -> Self {
        Self {
            store,
            index: TagIndex::build(store.list_experts()),
        }
    }

    pub fn apply(&self, state: &FilterState) -> Vec<&'a Expert> {
        let experts = self.store.list_experts();
        match state.tag {
            TagFilter::All => apply(experts, state),
            TagFilter::Only(tag) => {
                let needle = Needle::new(&state.query);
                self.index
                    .positions(tag)
                    .iter()
                    .map(|&i| &experts[i])
                    .filter(|e| needle.matches(e))
                    .collect()
            }
        }
    }
}
