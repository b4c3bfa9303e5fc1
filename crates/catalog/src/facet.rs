//! Multi-select facet groups with an aggregate `"All"` entry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stockroom_core::{CatalogError, CatalogResult, Product, ProductStatus};

/// Sentinel name of the aggregate facet entry.
pub const ALL: &str = "All";

/// One entry of a facet list, with an informational count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetItem {
    pub name: String,
    pub count: usize,
}

/// Selected names of one facet group.
///
/// When produced by a [`FacetSet`], `"All"` is present exactly when every
/// concrete name is present. Values built with [`FacetSelection::from_names`]
/// carry no such guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetSelection(BTreeSet<String>);

/// Restriction a selection places on its dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetFilter {
    Unrestricted,
    Only(BTreeSet<String>),
}

impl FacetSelection {
    /// Build a selection verbatim, without enforcing the `"All"` invariant.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn contains_all(&self) -> bool {
        self.0.contains(ALL)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Selected names without the sentinel.
    pub fn concrete(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|name| *name != ALL)
    }

    /// Normalize to the restriction sent on the wire.
    ///
    /// Empty or `"All"`-bearing selections are unrestricted; the sentinel is
    /// never part of an `Only` set.
    pub fn filter(&self) -> FacetFilter {
        if self.is_empty() || self.contains_all() {
            FacetFilter::Unrestricted
        } else {
            FacetFilter::Only(self.concrete().map(str::to_string).collect())
        }
    }
}

impl FacetFilter {
    /// Descriptor form: empty set means no restriction.
    pub fn into_set(self) -> BTreeSet<String> {
        match self {
            FacetFilter::Unrestricted => BTreeSet::new(),
            FacetFilter::Only(names) => names,
        }
    }
}

/// One facet group: the closed list of concrete names plus the current
/// selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetSet {
    names: Vec<String>,
    selection: FacetSelection,
}

impl FacetSet {
    /// Create a group with nothing selected.
    ///
    /// `"All"` and duplicate names are dropped; display order is kept. A group
    /// without any concrete name is rejected.
    pub fn new<I, S>(names: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| name != ALL && seen.insert(name.clone()))
            .collect();

        if names.is_empty() {
            return Err(CatalogError::validation(
                "facet group needs at least one concrete name",
            ));
        }

        Ok(Self {
            names,
            selection: FacetSelection::default(),
        })
    }

    /// Concrete names in display order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn selection(&self) -> &FacetSelection {
        &self.selection
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.contains(name)
    }

    /// Toggle one entry and return the resulting selection.
    ///
    /// Unknown names leave the selection untouched.
    pub fn toggle(&mut self, name: &str) -> &FacetSelection {
        if name == ALL {
            if self.selection.contains_all() {
                self.selection.0.clear();
            } else {
                self.select_every_name();
            }
            return &self.selection;
        }

        if !self.names.iter().any(|n| n == name) {
            tracing::warn!(facet = name, "ignoring toggle of unknown facet name");
            return &self.selection;
        }

        if self.selection.0.remove(name) {
            self.selection.0.remove(ALL);
        } else {
            self.selection.0.insert(name.to_string());
            if self.names.iter().all(|n| self.selection.contains(n)) {
                self.selection.0.insert(ALL.to_string());
            }
        }

        &self.selection
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.selection.0.clear();
    }

    fn select_every_name(&mut self) {
        self.selection = FacetSelection::from_names(
            self.names
                .iter()
                .cloned()
                .chain(std::iter::once(ALL.to_string())),
        );
    }
}

/// Build a facet list: a leading `"All"` entry counting every item, then
/// one entry per name counting items whose key matches it.
pub fn facet_items<T>(items: &[T], names: &[String], key: impl Fn(&T) -> &str) -> Vec<FacetItem> {
    let mut out = Vec::with_capacity(names.len() + 1);
    out.push(FacetItem {
        name: ALL.to_string(),
        count: items.len(),
    });
    out.extend(names.iter().map(|name| FacetItem {
        name: name.clone(),
        count: items.iter().filter(|item| key(item) == name).count(),
    }));
    out
}

pub fn category_facet_items(products: &[Product], categories: &[String]) -> Vec<FacetItem> {
    facet_items(products, categories, |p| p.category.as_str())
}

pub fn status_facet_items(products: &[Product]) -> Vec<FacetItem> {
    facet_items(products, &ProductStatus::names(), |p| p.status.as_str())
}
