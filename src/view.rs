use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::columns::{CellValue, ColumnModel};
use crate::filter::{FilterState, distinct_categories, filter_records};
use crate::pagination::Paginator;
use crate::snapshot::{Record, Snapshot};

/// Externally visible state of a view. Only changed through [`ViewEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub global_filter: String,
    pub category: Option<String>,
    pub page_index: usize,
    pub page_size: usize,
}

/// Pagination metadata for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageInfo {
    pub page_index: usize,
    pub page_count: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub filtered_count: usize,
    pub total_count: usize,
}

/// Filters, paginates and projects a snapshot of records.
///
/// The filtered collection is a list of indices into the source and is
/// recomputed from scratch whenever the source or a predicate changes.
pub struct ViewEngine {
    columns: ColumnModel,
    category_field: String,
    source: Arc<Vec<Record>>,
    rows: Arc<Vec<usize>>,
    categories: Vec<String>,
    filter: FilterState,
    pages: Paginator,
}

impl ViewEngine {
    pub fn new(columns: ColumnModel, category_field: impl Into<String>, page_size: usize) -> Self {
        ViewEngine {
            columns,
            category_field: category_field.into(),
            source: Arc::new(Vec::new()),
            rows: Arc::new(Vec::new()),
            categories: Vec::new(),
            filter: FilterState::default(),
            pages: Paginator::new(page_size),
        }
    }

    /// Replaces the record collection. `None` stands for a pending or failed
    /// fetch and behaves exactly like an empty collection.
    pub fn set_source(&mut self, snapshot: Option<Snapshot>) {
        let records = snapshot.map(|s| s.products).unwrap_or_default();
        info!("New source with {} records", records.len());
        self.source = Arc::new(records);
        self.categories = distinct_categories(&self.source, &self.category_field);
        self.recompute();
        self.pages.clamp(self.rows.len());
    }

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.filter.global_filter = text.into();
        trace!("Global filter => {:?}", self.filter.global_filter);
        self.recompute();
        self.pages.reset();
    }

    /// An empty value removes the category filter.
    pub fn set_categorical_filter(&mut self, value: Option<&str>) {
        self.filter.category = value.filter(|v| !v.is_empty()).map(str::to_string);
        trace!("Category filter => {:?}", self.filter.category);
        self.recompute();
        self.pages.reset();
    }

    pub fn set_page_index(&mut self, index: usize) {
        self.pages.set_page_index(index, self.rows.len());
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pages.set_page_size(page_size, self.rows.len());
    }

    pub fn next_page(&mut self) {
        self.pages.next_page(self.rows.len());
    }

    pub fn previous_page(&mut self) {
        self.pages.previous_page();
    }

    pub fn first_page(&mut self) {
        self.pages.first_page();
    }

    pub fn last_page(&mut self) {
        self.pages.last_page(self.rows.len());
    }

    fn recompute(&mut self) {
        self.rows = Arc::new(filter_records(
            &self.source,
            &self.columns,
            &self.category_field,
            &self.filter,
        ));
        debug!(
            "Filtered collection has {}/{} records",
            self.rows.len(),
            self.source.len()
        );
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            global_filter: self.filter.global_filter.clone(),
            category: self.filter.category.clone(),
            page_index: self.pages.page_index(),
            page_size: self.pages.page_size(),
        }
    }

    pub fn page_info(&self) -> PageInfo {
        let filtered_count = self.rows.len();
        PageInfo {
            page_index: self.pages.page_index(),
            page_count: self.pages.page_count(filtered_count),
            can_go_next: self.pages.can_go_next(filtered_count),
            can_go_previous: self.pages.can_go_previous(),
            filtered_count,
            total_count: self.source.len(),
        }
    }

    pub fn page_index(&self) -> usize {
        self.pages.page_index()
    }

    pub fn page_count(&self) -> usize {
        self.pages.page_count(self.rows.len())
    }

    pub fn can_go_next(&self) -> bool {
        self.pages.can_go_next(self.rows.len())
    }

    pub fn can_go_previous(&self) -> bool {
        self.pages.can_go_previous()
    }

    pub fn filtered_count(&self) -> usize {
        self.rows.len()
    }

    pub fn filtered_records(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter().map(|&idx| &self.source[idx])
    }

    pub fn current_page_records(&self) -> Vec<&Record> {
        self.rows[self.pages.page_range(self.rows.len())]
            .iter()
            .map(|&idx| &self.source[idx])
            .collect()
    }

    /// Current page as rows of cells in column order.
    pub fn current_page_cells(&self) -> Vec<Vec<CellValue>> {
        self.current_page_records()
            .into_iter()
            .map(|record| self.columns.cells(record))
            .collect()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.headers()
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    /// Distinct categories of the unfiltered source.
    pub fn distinct_categories(&self) -> &[String] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Formatter;
    use serde_json::json;

    fn engine(page_size: usize) -> ViewEngine {
        let mut columns = ColumnModel::new();
        columns
            .define("id", "ID", Formatter::Number)
            .unwrap()
            .define("title", "Product Name", Formatter::Text)
            .unwrap()
            .define("category", "Category", Formatter::Text)
            .unwrap()
            .define("stock", "Stock", Formatter::Quantity)
            .unwrap();
        ViewEngine::new(columns, "category", page_size)
    }

    fn snapshot(n: usize) -> Snapshot {
        let categories = ["beauty", "fragrances", "furniture"];
        Snapshot::from_records(
            (0..n)
                .map(|i| {
                    json!({
                        "id": i + 1,
                        "title": format!("Product {}", i + 1),
                        "category": categories[i % categories.len()],
                        "stock": i % 4,
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn defaults_before_any_source() {
        let view = engine(10);
        assert_eq!(
            view.state(),
            ViewState {
                global_filter: String::new(),
                category: None,
                page_index: 0,
                page_size: 10,
            }
        );
        assert_eq!(view.page_count(), 1);
        assert!(view.current_page_records().is_empty());
        assert!(view.distinct_categories().is_empty());
    }

    #[test]
    fn twenty_five_records_scenario() {
        let mut view = engine(10);
        view.set_source(Some(snapshot(25)));
        assert_eq!(view.page_count(), 3);
        assert_eq!(view.current_page_records().len(), 10);

        view.set_page_index(2);
        assert_eq!(view.current_page_records().len(), 5);
        assert!(!view.can_go_next());
        assert!(view.can_go_previous());
        assert_eq!(view.current_page_cells()[0][0].to_string(), "21");
    }

    #[test]
    fn filter_changes_reset_the_page() {
        let mut view = engine(2);
        view.set_source(Some(snapshot(25)));
        view.set_page_index(3);
        view.set_global_filter("product");
        assert_eq!(view.page_index(), 0);

        view.set_page_index(3);
        view.set_categorical_filter(Some("beauty"));
        assert_eq!(view.page_index(), 0);
        assert_eq!(view.filtered_count(), 9);
        assert!(
            view.filtered_records()
                .all(|r| r["category"] == "beauty")
        );
    }

    #[test]
    fn unknown_category_yields_single_empty_page() {
        let mut view = engine(10);
        view.set_source(Some(snapshot(25)));
        view.set_categorical_filter(Some("groceries"));
        assert_eq!(view.filtered_count(), 0);
        assert_eq!(view.page_count(), 1);
        assert!(view.current_page_records().is_empty());
        assert!(!view.can_go_next());
        assert!(!view.can_go_previous());
    }

    #[test]
    fn empty_category_clears_the_filter() {
        let mut view = engine(10);
        view.set_source(Some(snapshot(25)));
        view.set_categorical_filter(Some("furniture"));
        assert_eq!(view.filtered_count(), 8);
        view.set_categorical_filter(Some(""));
        assert_eq!(view.state().category, None);
        assert_eq!(view.filtered_count(), 25);
    }

    #[test]
    fn global_filter_searches_formatted_cells() {
        let mut view = engine(10);
        view.set_source(Some(snapshot(25)));
        view.set_global_filter("OUT OF STOCK");
        // stock is i % 4, so every fourth record is empty
        assert_eq!(view.filtered_count(), 7);
        view.set_global_filter("");
        assert_eq!(view.filtered_count(), 25);
    }

    #[test]
    fn replacing_the_source_reclamps() {
        let mut view = engine(10);
        view.set_source(Some(snapshot(25)));
        view.set_page_index(2);
        view.set_source(Some(snapshot(12)));
        assert_eq!(view.page_index(), 1);
        assert_eq!(view.current_page_records().len(), 2);

        view.set_source(None);
        assert_eq!(view.page_index(), 0);
        assert_eq!(view.page_count(), 1);
        assert!(view.current_page_records().is_empty());
        assert!(view.distinct_categories().is_empty());
    }

    #[test]
    fn filters_survive_a_source_replacement() {
        let mut view = engine(10);
        view.set_source(Some(snapshot(6)));
        view.set_categorical_filter(Some("beauty"));
        view.set_source(Some(snapshot(25)));
        assert_eq!(view.filtered_count(), 9);
        assert_eq!(
            view.distinct_categories(),
            &["beauty".to_string(), "fragrances".to_string(), "furniture".to_string()]
        );
    }

    #[test]
    fn page_info_matches_accessors() {
        let mut view = engine(10);
        view.set_source(Some(snapshot(25)));
        view.next_page();
        let info = view.page_info();
        assert_eq!(
            info,
            PageInfo {
                page_index: 1,
                page_count: 3,
                can_go_next: true,
                can_go_previous: true,
                filtered_count: 25,
                total_count: 25,
            }
        );
        view.last_page();
        view.next_page();
        assert_eq!(view.page_index(), 2);
        view.first_page();
        view.previous_page();
        assert_eq!(view.page_index(), 0);
    }

    #[test]
    fn headers_in_declaration_order() {
        let view = engine(10);
        assert_eq!(view.headers(), vec!["ID", "Product Name", "Category", "Stock"]);
    }
}
