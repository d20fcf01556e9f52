//! Aggregate statistics over the live product list.
//!
//! [`aggregate`] is pure: it is recomputed from the current list whenever
//! the list changes and has no state of its own.

use std::collections::HashMap;

use grocify_core::{Product, ProductStatus};
use serde::Serialize;

/// Product counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub active: usize,
    pub inactive: usize,
}

/// Number of products in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// One labelled value in a chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: usize,
}

/// Summary of a product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductStats {
    pub total: usize,
    pub by_status: StatusCounts,
    /// Categories in order of first appearance in the list.
    pub by_category: Vec<CategoryCount>,
}

impl ProductStats {
    /// Count for one category, if present.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<usize> {
        self.by_category
            .iter()
            .find(|c| c.category == name)
            .map(|c| c.count)
    }

    /// Active/inactive series for the status pie chart.
    #[must_use]
    pub fn status_series(&self) -> [ChartPoint; 2] {
        [
            ChartPoint {
                name: ProductStatus::Active.label().to_owned(),
                value: self.by_status.active,
            },
            ChartPoint {
                name: ProductStatus::Inactive.label().to_owned(),
                value: self.by_status.inactive,
            },
        ]
    }

    /// Per-category series for the category bar chart.
    #[must_use]
    pub fn category_series(&self) -> Vec<ChartPoint> {
        self.by_category
            .iter()
            .map(|c| ChartPoint {
                name: c.category.clone(),
                value: c.count,
            })
            .collect()
    }
}

/// Summarize a product list.
///
/// `active + inactive == total` always holds.
#[must_use]
pub fn aggregate(products: &[Product]) -> ProductStats {
    let mut by_status = StatusCounts::default();
    let mut by_category: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for product in products {
        match product.status {
            ProductStatus::Active => by_status.active += 1,
            ProductStatus::Inactive => by_status.inactive += 1,
        }

        let slot = *index.entry(product.category.as_str()).or_insert_with(|| {
            by_category.push(CategoryCount {
                category: product.category.clone(),
                count: 0,
            });
            by_category.len() - 1
        });
        if let Some(entry) = by_category.get_mut(slot) {
            entry.count += 1;
        }
    }

    ProductStats {
        total: products.len(),
        by_status,
        by_category,
    }
}
