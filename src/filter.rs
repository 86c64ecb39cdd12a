use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, trace};

use crate::columns::ColumnModel;
use crate::snapshot::Record;

/// Active predicates of the filter stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub global_filter: String,
    pub category: Option<String>,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.global_filter.is_empty() || self.category.is_some()
    }
}

/// Exact, case sensitive match of the categorical field. No category set
/// matches everything, a record without the field matches nothing else.
pub fn matches_category(record: &Record, field: &str, category: Option<&str>) -> bool {
    match category {
        None => true,
        Some(value) => record.get(field).and_then(|v| v.as_str()) == Some(value),
    }
}

/// Case insensitive substring search over every projected display value.
/// `needle` has to be lowercase already.
pub fn matches_global(record: &Record, columns: &ColumnModel, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    columns
        .project(record)
        .iter()
        .any(|(_, cell)| cell.to_string().to_lowercase().contains(needle))
}

/// Returns the indices of all records passing both predicates, in source order.
pub fn filter_records(
    records: &[Record],
    columns: &ColumnModel,
    category_field: &str,
    state: &FilterState,
) -> Vec<usize> {
    if !state.is_active() {
        return (0..records.len()).collect();
    }
    let start_time = Instant::now();
    let needle = state.global_filter.to_lowercase();
    let category = state.category.as_deref();

    // rayon keeps the source order when collecting into a Vec
    let matches: Vec<usize> = records
        .par_iter()
        .enumerate()
        .filter(|(_, record)| {
            matches_category(record, category_field, category)
                && matches_global(record, columns, &needle)
        })
        .map(|(idx, _)| idx)
        .collect();

    debug!(
        "Filter {:?} kept {}/{} records in {}ms",
        state,
        matches.len(),
        records.len(),
        start_time.elapsed().as_millis()
    );
    matches
}

/// Unique string values of `field` in first seen order.
pub fn distinct_categories(records: &[Record], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let categories: Vec<String> = records
        .iter()
        .filter_map(|r| r.get(field).and_then(|v| v.as_str()))
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect();
    trace!("Found {} distinct values for \"{field}\"", categories.len());
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Formatter;
    use serde_json::json;

    fn columns() -> ColumnModel {
        let mut model = ColumnModel::new();
        model
            .define("title", "Product Name", Formatter::Text)
            .unwrap()
            .define("category", "Category", Formatter::Text)
            .unwrap()
            .define("stock", "Stock", Formatter::Quantity)
            .unwrap();
        model
    }

    fn records() -> Vec<Record> {
        vec![
            json!({"title": "Red Lipstick", "category": "beauty", "stock": 3}),
            json!({"title": "Oak Table", "category": "furniture", "stock": 0}),
            json!({"title": "Eyeshadow Palette", "category": "beauty", "stock": 0}),
            json!({"title": "Apple", "category": "groceries", "stock": 9}),
            json!({"title": "Mirror"}),
        ]
    }

    fn state(text: &str, category: Option<&str>) -> FilterState {
        FilterState {
            global_filter: text.to_string(),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn empty_filter_is_identity() {
        let records = records();
        let result = filter_records(&records, &columns(), "category", &state("", None));
        assert_eq!(result, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn global_filter_is_case_insensitive_on_display_values() {
        let records = records();
        let result = filter_records(&records, &columns(), "category", &state("TABLE", None));
        assert_eq!(result, vec![1]);

        // Formatted values are searched, not raw ones
        // A product without a stock count is out of stock as well
        let result = filter_records(&records, &columns(), "category", &state("out of", None));
        assert_eq!(result, vec![1, 2, 4]);

        // Fallback markers are display values too
        let result = filter_records(&records, &columns(), "category", &state("n/a", None));
        assert_eq!(result, vec![4]);
    }

    #[test]
    fn category_filter_is_exact() {
        let records = records();
        let cols = columns();
        assert_eq!(
            filter_records(&records, &cols, "category", &state("", Some("beauty"))),
            vec![0, 2]
        );
        assert!(filter_records(&records, &cols, "category", &state("", Some("Beauty"))).is_empty());
        assert!(filter_records(&records, &cols, "category", &state("", Some("beau"))).is_empty());
    }

    #[test]
    fn both_predicates_are_combined() {
        let records = records();
        let result = filter_records(&records, &columns(), "category", &state("palette", Some("beauty")));
        assert_eq!(result, vec![2]);
        let result = filter_records(&records, &columns(), "category", &state("apple", Some("beauty")));
        assert!(result.is_empty());
    }

    #[test]
    fn filtering_preserves_order_and_is_idempotent() {
        let records: Vec<Record> = (0..200)
            .map(|i| json!({"title": format!("item {i}"), "category": if i % 3 == 0 { "a" } else { "b" }, "stock": i}))
            .collect();
        let cols = columns();
        let filter = state("1", Some("a"));
        let once = filter_records(&records, &cols, "category", &filter);
        assert!(once.windows(2).all(|w| w[0] < w[1]));

        let subset: Vec<Record> = once.iter().map(|&i| records[i].clone()).collect();
        let twice = filter_records(&subset, &cols, "category", &filter);
        assert_eq!(twice, (0..subset.len()).collect::<Vec<usize>>());
    }

    #[test]
    fn categories_are_unique_in_first_seen_order() {
        assert_eq!(
            distinct_categories(&records(), "category"),
            vec!["beauty", "furniture", "groceries"]
        );
        assert!(distinct_categories(&[], "category").is_empty());
    }
}
