//! Last accepted result set plus fetch status.

use serde::Serialize;
use stockroom_core::{Entity, Product};

use crate::query::QueryDescriptor;

/// Holds the live result set.
///
/// Item operations (`replace_all`, `insert_one`, `remove_one`, `update_one`)
/// are total and never touch the fetch flags. `loading` and `error` belong
/// to the dispatcher, `mutating` to whoever drives create/update calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultStore<T = Product> {
    items: Vec<T>,
    source: Option<QueryDescriptor>,
    loading: bool,
    mutating: bool,
    error: Option<String>,
}

impl<T> Default for ResultStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            source: None,
            loading: false,
            mutating: false,
            error: None,
        }
    }
}

impl<T> ResultStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Descriptor that produced the current items, if any fetch committed.
    pub fn source(&self) -> Option<&QueryDescriptor> {
        self.source.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_mutating(&self) -> bool {
        self.mutating
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Replace the items with a fetch result and record its descriptor.
    pub fn commit(&mut self, source: QueryDescriptor, items: Vec<T>) {
        self.replace_all(items);
        self.source = Some(source);
    }

    /// Optimistic append; the next real fetch decides the final position.
    pub fn insert_one(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn finish_fetch(&mut self) {
        self.loading = false;
    }

    /// Record a failed fetch; the items stay visible.
    pub fn fail_fetch(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn begin_mutation(&mut self) {
        self.mutating = true;
        self.error = None;
    }

    pub fn finish_mutation(&mut self, error: Option<String>) {
        self.mutating = false;
        if error.is_some() {
            self.error = error;
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

impl<T: Entity> ResultStore<T> {
    pub fn contains(&self, id: &T::Id) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// Drop the item with `id`. Absent ids are ignored.
    pub fn remove_one(&mut self, id: &T::Id) {
        self.items.retain(|item| item.id() != id);
    }

    /// Replace the item sharing `item`'s id. Absent ids are ignored.
    pub fn update_one(&mut self, item: T) {
        if let Some(slot) = self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            *slot = item;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{ProductId, ProductStatus};

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.to_string(),
            price: 10.0,
            stock_quantity: 3.0,
            category: "Hardware".to_string(),
            status: ProductStatus::Active,
            vendor: "Acme".to_string(),
            image_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn store_with(ids: &[&str]) -> ResultStore {
        let mut store = ResultStore::new();
        store.replace_all(ids.iter().map(|id| product(id, "x")).collect());
        store
    }

    fn ids(store: &ResultStore) -> Vec<&str> {
        store.items().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn remove_absent_id_leaves_store_unchanged() {
        let mut store = store_with(&["a", "b"]);
        let before = store.clone();

        store.remove_one(&ProductId::from("abc"));

        assert_eq!(store, before);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = store_with(&["a", "b", "c"]);

        store.remove_one(&ProductId::from("b"));
        store.remove_one(&ProductId::from("b"));

        assert_eq!(ids(&store), ["a", "c"]);
    }

    #[test]
    fn insert_appends_at_end() {
        let mut store = store_with(&["a"]);
        store.insert_one(product("z", "new"));
        assert_eq!(ids(&store), ["a", "z"]);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = store_with(&["a", "b", "c"]);

        store.update_one(product("b", "renamed"));

        assert_eq!(ids(&store), ["a", "b", "c"]);
        assert_eq!(store.items()[1].name, "renamed");
    }

    #[test]
    fn update_of_absent_id_is_ignored() {
        let mut store = store_with(&["a"]);
        let before = store.clone();

        store.update_one(product("missing", "ghost"));

        assert_eq!(store, before);
    }

    #[test]
    fn item_operations_leave_fetch_flags_alone() {
        let mut store = store_with(&["a"]);
        store.begin_fetch();
        store.fail_fetch("boom");
        store.begin_fetch();

        store.insert_one(product("b", "x"));
        store.update_one(product("a", "y"));
        store.remove_one(&ProductId::from("b"));

        assert!(store.is_loading());
        assert_eq!(store.error(), None);
    }

    #[test]
    fn failed_fetch_keeps_previous_items() {
        let mut store = store_with(&["a", "b"]);
        store.begin_fetch();

        store.fail_fetch("Failed to fetch products");

        assert!(!store.is_loading());
        assert_eq!(store.error(), Some("Failed to fetch products"));
        assert_eq!(ids(&store), ["a", "b"]);
    }

    #[test]
    fn commit_tags_items_with_descriptor() {
        let mut store: ResultStore = ResultStore::new();
        let descriptor = QueryDescriptor {
            search_text: "drill".to_string(),
            ..QueryDescriptor::default()
        };

        store.commit(descriptor.clone(), vec![product("a", "drill")]);

        assert_eq!(store.source(), Some(&descriptor));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_mutation_records_error_without_touching_items() {
        let mut store = store_with(&["a"]);
        store.begin_mutation();
        assert!(store.is_mutating());

        store.finish_mutation(Some("Failed to create product".to_string()));

        assert!(!store.is_mutating());
        assert_eq!(store.error(), Some("Failed to create product"));
        assert_eq!(ids(&store), ["a"]);
    }
}
