//! Conversion from raw store documents to [`Product`]s.
//!
//! Mapping is total: documents written by older clients or by hand may
//! have missing or oddly typed fields, and one bad document must not hide
//! the rest of the collection. Every coercion is logged at warn level.

use grocify_core::{Price, Product, ProductId, ProductStatus, field_names};
use serde_json::Value;
use tracing::warn;

use crate::store::{Document, Snapshot};

/// Map every document in a snapshot, preserving store order.
#[must_use]
pub fn products_from_snapshot(snapshot: &Snapshot) -> Vec<Product> {
    snapshot
        .documents
        .iter()
        .map(product_from_document)
        .collect()
}

/// Map one document.
///
/// - missing `name` or `category` read as empty strings
/// - `price` may be a number or a numeric string; anything else is 0
/// - `status` other than exactly `"active"` reads as inactive
/// - missing `createdAt` reads as 0
#[must_use]
pub fn product_from_document(doc: &Document) -> Product {
    let fields = &doc.fields;

    Product {
        id: ProductId::new(doc.id.clone()),
        name: string_field(doc, field_names::NAME),
        description: fields
            .get(field_names::DESCRIPTION)
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .map(str::to_owned),
        price: price_field(doc),
        category: string_field(doc, field_names::CATEGORY),
        status: status_field(doc),
        created_at: created_at_field(doc),
    }
}

fn string_field(doc: &Document, name: &str) -> String {
    match doc.fields.get(name) {
        Some(Value::String(s)) => s.clone(),
        other => {
            warn!(id = %doc.id, field = name, value = ?other, "Field is not a string, using empty");
            String::new()
        }
    }
}

fn price_field(doc: &Document) -> Price {
    let parsed = match doc.fields.get(field_names::PRICE) {
        Some(Value::Number(n)) => n.as_f64().and_then(|v| Price::from_f64(v).ok()),
        Some(Value::String(s)) => Price::parse(s).ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        warn!(
            id = %doc.id,
            value = ?doc.fields.get(field_names::PRICE),
            "Price is missing or invalid, using 0"
        );
        Price::ZERO
    })
}

fn status_field(doc: &Document) -> ProductStatus {
    match doc.fields.get(field_names::STATUS) {
        Some(Value::String(s)) => {
            if !ProductStatus::is_canonical(s) {
                warn!(id = %doc.id, status = %s, "Non-canonical status, reading as inactive");
            }
            ProductStatus::from_stored(s)
        }
        other => {
            warn!(id = %doc.id, value = ?other, "Status is missing, reading as inactive");
            ProductStatus::Inactive
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn created_at_field(doc: &Document) -> i64 {
    match doc.fields.get(field_names::CREATED_AT) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|v| v as i64))
            .unwrap_or_default(),
        other => {
            warn!(id = %doc.id, value = ?other, "createdAt is missing, using 0");
            0
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocify_core::Fields;
    use serde_json::json;

    use super::*;

    fn doc(id: &str, value: Value) -> Document {
        let Value::Object(fields) = value else {
            panic!("test document must be an object");
        };
        Document::new(id, fields)
    }

    #[test]
    fn test_well_formed_document() {
        let product = product_from_document(&doc(
            "p1",
            json!({
                "name": "Milk",
                "description": "Whole, 1L",
                "price": 3.5,
                "category": "Dairy",
                "status": "active",
                "createdAt": 1_700_000_000_000_i64
            }),
        ));

        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.name, "Milk");
        assert_eq!(product.description.as_deref(), Some("Whole, 1L"));
        assert_eq!(product.price, Price::parse("3.5").unwrap());
        assert_eq!(product.category, "Dairy");
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.created_at, 1_700_000_000_000);
    }

    #[test]
    fn test_empty_document_is_still_a_product() {
        let product = product_from_document(&Document::new("p2", Fields::new()));
        assert_eq!(product.name, "");
        assert_eq!(product.category, "");
        assert_eq!(product.price, Price::ZERO);
        assert_eq!(product.status, ProductStatus::Inactive);
        assert_eq!(product.created_at, 0);
        assert!(product.description.is_none());
    }

    #[test]
    fn test_legacy_values_are_coerced() {
        let product = product_from_document(&doc(
            "p3",
            json!({
                "name": "Bread",
                "price": "2.25",
                "category": "Bakery",
                "status": "Active",
                "createdAt": 1.5e12
            }),
        ));
        assert_eq!(product.price, Price::parse("2.25").unwrap());
        assert_eq!(product.status, ProductStatus::Inactive);
        assert_eq!(product.created_at, 1_500_000_000_000);
    }

    #[test]
    fn test_bad_price_reads_as_zero() {
        for price in [json!("free"), json!(-4), json!(null), json!([1])] {
            let product = product_from_document(&doc("p", json!({ "price": price })));
            assert_eq!(product.price, Price::ZERO);
        }
    }

    #[test]
    fn test_snapshot_order_is_preserved() {
        let snapshot = Snapshot {
            sequence: 1,
            documents: vec![
                doc("c", json!({ "name": "Cheese" })),
                doc("a", json!({ "name": "Apples" })),
                doc("b", json!({ "name": "Bread" })),
            ],
        };
        let names: Vec<_> = products_from_snapshot(&snapshot)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Cheese", "Apples", "Bread"]);
    }
}
