//! Canonical query descriptor and its wire form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::facet::{ALL, FacetSelection};

/// Result ordering by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Latest,
    Oldest,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Latest => "latest",
            SortMode::Oldest => "oldest",
        }
    }
}

/// What the result list should show.
///
/// Empty `categories` / `statuses` mean no restriction on that dimension.
/// Sets compare independently of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub categories: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
    pub search_text: String,
    pub sort_mode: SortMode,
}

/// Combine the browsing inputs into a descriptor.
///
/// Pure and total: the `"All"` sentinel never reaches the result and the
/// search text is trimmed.
pub fn compose(
    categories: &FacetSelection,
    statuses: &FacetSelection,
    search_text: &str,
    sort_mode: SortMode,
) -> QueryDescriptor {
    QueryDescriptor {
        categories: categories.filter().into_set(),
        statuses: statuses.filter().into_set(),
        search_text: search_text.trim().to_string(),
        sort_mode,
    }
}

impl QueryDescriptor {
    pub fn has_text_filter(&self) -> bool {
        !self.search_text.is_empty()
    }

    /// Wire parameters for the query service.
    pub fn to_params(&self) -> QueryParams {
        fn join(set: &BTreeSet<String>) -> Option<String> {
            (!set.is_empty()).then(|| set.iter().map(String::as_str).collect::<Vec<_>>().join(","))
        }

        QueryParams {
            category: join(&self.categories),
            status: join(&self.statuses),
            search: self.has_text_filter().then(|| self.search_text.clone()),
            sort: Some(self.sort_mode),
        }
    }
}

/// Query-string form of a descriptor (`?category=a,b&status=..&search=..&sort=..`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortMode>,
}

impl QueryParams {
    /// Decode the service side of the contract.
    ///
    /// A list containing `"All"` is unrestricted, as is a missing one.
    pub fn into_descriptor(self) -> QueryDescriptor {
        fn split(list: Option<String>) -> BTreeSet<String> {
            let names: BTreeSet<String> = list
                .iter()
                .flat_map(|l| l.split(','))
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            if names.contains(ALL) { BTreeSet::new() } else { names }
        }

        QueryDescriptor {
            categories: split(self.category),
            statuses: split(self.status),
            search_text: self.search.as_deref().map(str::trim).unwrap_or_default().to_string(),
            sort_mode: self.sort.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_drops_sentinel_and_trims_search() {
        let categories = FacetSelection::from_names(["All", "Hardware", "Furniture"]);
        let statuses = FacetSelection::from_names(["Active"]);

        let descriptor = compose(&categories, &statuses, "  drill ", SortMode::Oldest);

        assert!(descriptor.categories.is_empty());
        assert_eq!(descriptor.statuses, ["Active".to_string()].into());
        assert_eq!(descriptor.search_text, "drill");
        assert_eq!(descriptor.sort_mode, SortMode::Oldest);
    }

    #[test]
    fn compose_never_propagates_sentinel_from_partial_set() {
        // Not reachable through FacetSet, but must still be normalized.
        let broken = FacetSelection::from_names(["All", "Hardware"]);
        let descriptor = compose(&broken, &FacetSelection::default(), "", SortMode::Latest);
        assert!(!descriptor.categories.contains(ALL));
    }

    #[test]
    fn whitespace_search_is_no_text_filter() {
        let descriptor = compose(
            &FacetSelection::default(),
            &FacetSelection::default(),
            "   ",
            SortMode::Latest,
        );
        assert!(!descriptor.has_text_filter());
        assert_eq!(descriptor.to_params().search, None);
    }

    #[test]
    fn set_order_does_not_affect_equality() {
        let a = compose(
            &FacetSelection::from_names(["Hardware", "Furniture"]),
            &FacetSelection::default(),
            "x",
            SortMode::Latest,
        );
        let b = compose(
            &FacetSelection::from_names(["Furniture", "Hardware"]),
            &FacetSelection::default(),
            "x ",
            SortMode::Latest,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn params_join_sets_and_omit_unrestricted_dimensions() {
        let descriptor = compose(
            &FacetSelection::from_names(["Hardware", "Furniture"]),
            &FacetSelection::from_names(["All", "Active", "Inactive", "Out of Stock"]),
            "saw",
            SortMode::Oldest,
        );

        let params = descriptor.to_params();
        assert_eq!(params.category.as_deref(), Some("Furniture,Hardware"));
        assert_eq!(params.status, None);
        assert_eq!(params.search.as_deref(), Some("saw"));

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["sort"], "oldest");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn params_decode_back_to_the_same_descriptor() {
        let descriptor = compose(
            &FacetSelection::from_names(["Hardware"]),
            &FacetSelection::from_names(["Active", "Inactive"]),
            "saw",
            SortMode::Oldest,
        );
        assert_eq!(descriptor.to_params().into_descriptor(), descriptor);
    }

    #[test]
    fn service_treats_all_in_list_as_unrestricted() {
        let params = QueryParams {
            category: Some("All,Hardware".to_string()),
            status: Some("Active".to_string()),
            search: None,
            sort: None,
        };
        let descriptor = params.into_descriptor();
        assert!(descriptor.categories.is_empty());
        assert_eq!(descriptor.sort_mode, SortMode::Latest);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn selection() -> impl Strategy<Value = FacetSelection> {
            prop::collection::vec(
                prop_oneof![Just("All"), Just("Hardware"), Just("Furniture"), Just("Garden")],
                0..5,
            )
            .prop_map(FacetSelection::from_names)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: compose is deterministic and never emits the sentinel.
            #[test]
            fn compose_is_deterministic(
                categories in selection(),
                statuses in selection(),
                search in "[ a-z]{0,12}",
                oldest in any::<bool>()
            ) {
                let sort = if oldest { SortMode::Oldest } else { SortMode::Latest };
                let first = compose(&categories, &statuses, &search, sort);
                let second = compose(&categories, &statuses, &search, sort);

                prop_assert_eq!(&first, &second);
                prop_assert!(!first.categories.contains(ALL));
                prop_assert!(!first.statuses.contains(ALL));
                prop_assert_eq!(first.search_text.trim(), first.search_text.as_str());
            }
        }
    }
}
