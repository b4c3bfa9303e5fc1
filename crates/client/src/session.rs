//! Browsing session: facet groups, search, sort and page position.

use stockroom_catalog::{
    FacetItem, FacetSet, Page, QueryDescriptor, SortMode, category_facet_items, clamp_page,
    compose, paginate, status_facet_items, total_pages,
};
use stockroom_core::{CatalogResult, Product, ProductStatus};

use crate::dispatcher::DispatcherHandle;

/// Receiver of recomputed descriptors.
pub trait DescriptorSink {
    fn descriptor_changed(&self, descriptor: QueryDescriptor);
}

impl DescriptorSink for DispatcherHandle {
    fn descriptor_changed(&self, descriptor: QueryDescriptor) {
        DispatcherHandle::descriptor_changed(self, descriptor);
    }
}

/// Controller state of one browsing session.
///
/// Every input change recomputes the descriptor synchronously. The sink only
/// hears about actual changes, and each change resets the page to 1.
#[derive(Debug)]
pub struct CatalogSession<S> {
    categories: FacetSet,
    statuses: FacetSet,
    search_text: String,
    sort_mode: SortMode,
    page_size: usize,
    current_page: usize,
    descriptor: QueryDescriptor,
    sink: S,
}

impl<S: DescriptorSink> CatalogSession<S> {
    /// Start a session with nothing selected and hand the initial
    /// descriptor to `sink`.
    pub fn new<I, N>(categories: I, page_size: usize, sink: S) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let categories = FacetSet::new(categories)?;
        let statuses = FacetSet::new(ProductStatus::names())?;
        let descriptor = compose(
            categories.selection(),
            statuses.selection(),
            "",
            SortMode::default(),
        );

        sink.descriptor_changed(descriptor.clone());

        Ok(Self {
            categories,
            statuses,
            search_text: String::new(),
            sort_mode: SortMode::default(),
            page_size: page_size.max(1),
            current_page: 1,
            descriptor,
            sink,
        })
    }

    pub fn categories(&self) -> &FacetSet {
        &self.categories
    }

    pub fn statuses(&self) -> &FacetSet {
        &self.statuses
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn toggle_category(&mut self, name: &str) {
        self.categories.toggle(name);
        self.recompute();
    }

    pub fn toggle_status(&mut self, name: &str) {
        self.statuses.toggle(name);
        self.recompute();
    }

    /// Raw text as typed; trimming happens in the descriptor.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.recompute();
    }

    pub fn set_sort_mode(&mut self, sort_mode: SortMode) {
        self.sort_mode = sort_mode;
        self.recompute();
    }

    /// Deselect both facet groups at once.
    pub fn clear_filters(&mut self) {
        self.categories.clear();
        self.statuses.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        let next = compose(
            self.categories.selection(),
            self.statuses.selection(),
            &self.search_text,
            self.sort_mode,
        );
        if next == self.descriptor {
            return;
        }

        tracing::debug!(?next, "query descriptor changed");
        self.descriptor = next.clone();
        self.current_page = 1;
        self.sink.descriptor_changed(next);
    }

    /// Visible page of `items`, clamping the page index first if the result
    /// set shrank under it.
    pub fn page<'a, T>(&mut self, items: &'a [T]) -> Page<'a, T> {
        let total = total_pages(items.len(), self.page_size);
        self.current_page = clamp_page(self.current_page, total);
        paginate(items, self.page_size, self.current_page)
    }

    pub fn set_page(&mut self, page: usize, item_count: usize) {
        self.current_page = clamp_page(page, total_pages(item_count, self.page_size));
    }

    pub fn next_page(&mut self, item_count: usize) {
        self.set_page(self.current_page.saturating_add(1), item_count);
    }

    pub fn previous_page(&mut self, item_count: usize) {
        self.set_page(self.current_page.saturating_sub(1), item_count);
    }

    /// Category facet list with counts over `products`.
    pub fn category_items(&self, products: &[Product]) -> Vec<FacetItem> {
        category_facet_items(products, self.categories.names())
    }

    /// Status facet list with counts over `products`.
    pub fn status_items(&self, products: &[Product]) -> Vec<FacetItem> {
        status_facet_items(products)
    }
}
