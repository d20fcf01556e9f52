//! End-to-end dashboard flows.
//!
//! Logs in against [`FakeAuthBackend`], mounts views over the HTTP store
//! served by [`FakeDocumentServer`], and drives products through their
//! lifecycle. The product list is only ever changed by the feed, so every
//! assertion on it waits for the store to echo the write back.

use std::sync::Arc;
use std::time::Duration;

use grocify_core::{Fields, Price, Product, ProductForm, ProductStatus};
use grocify_dashboard::auth::Authorized;
use grocify_dashboard::config::DashboardConfig;
use grocify_dashboard::feed::{FeedStatus, ProductListReader};
use grocify_dashboard::middleware::Navigation;
use grocify_dashboard::routes;
use grocify_dashboard::state::AppState;
use grocify_dashboard::store::AnyStore;
use grocify_dashboard::views::{LoginOutcome, Modal};
use grocify_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, FakeAuthBackend, FakeDocumentServer, temp_state_path,
};
use serde_json::json;

struct Harness {
    _auth: FakeAuthBackend,
    docs: FakeDocumentServer,
    state: AppState<AnyStore>,
    authorized: Authorized,
}

async fn logged_in() -> Harness {
    let auth = FakeAuthBackend::start().await;
    let docs = FakeDocumentServer::start_guarded(&auth).await;
    let config = DashboardConfig {
        store_url: Some(docs.url.clone()),
        state_path: Some(temp_state_path()),
        request_timeout: Some(Duration::from_secs(5)),
        ..auth.config()
    };
    let state = AppState::from_config(config).unwrap();

    let outcome = state.login_view().submit(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(outcome, LoginOutcome::Redirect(routes::PRODUCTS));
    let Navigation::Proceed {
        access: Some(authorized),
        ..
    } = state.route_guard().enter(routes::PRODUCTS).await
    else {
        panic!("login did not grant access");
    };

    Harness {
        _auth: auth,
        docs,
        state,
        authorized,
    }
}

async fn wait_for<F>(reader: &mut ProductListReader, predicate: F) -> Arc<[Product]>
where
    F: FnMut(&[Product]) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), reader.wait_until(predicate))
        .await
        .expect("product list never reached the expected state")
        .expect("feed ended")
}

fn form(name: &str, price: &str, category: &str, status: &str) -> ProductForm {
    ProductForm {
        name: name.into(),
        description: String::new(),
        price: price.into(),
        category: category.into(),
        status: status.into(),
    }
}

// =============================================================================
// Product Lifecycle
// =============================================================================

#[tokio::test]
async fn test_milk_lifecycle() {
    let h = logged_in().await;
    let products = h.state.products_view(&h.authorized);
    let analytics = h.state.analytics_view(&h.authorized);
    let mut list = products.products_reader();

    // Empty collection: nothing listed, all counts zero.
    assert!(products.products().is_empty());
    let stats = analytics.stats();
    assert_eq!(stats.total, 0);
    assert!(stats.by_category.is_empty());

    // Add Milk.
    products.open_add();
    products
        .save(form("Milk", "3.5", "Dairy", "active"))
        .await
        .unwrap();
    assert_eq!(products.modal(), Modal::Closed);

    let current = wait_for(&mut list, |p| p.len() == 1).await;
    let milk = current[0].clone();
    assert_eq!(milk.name, "Milk");
    assert_eq!(milk.price, Price::parse("3.5").unwrap());
    assert_eq!(milk.category, "Dairy");
    assert_eq!(milk.status, ProductStatus::Active);
    assert!(milk.created_at > 0);

    let stats = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stats = analytics.stats();
            if stats.total == 1 {
                break stats;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.by_status.active, 1);
    assert_eq!(stats.category("Dairy"), Some(1));

    // Toggle to inactive.
    let next = products.toggle_status(&milk).await.unwrap();
    assert_eq!(next, ProductStatus::Inactive);
    let current = wait_for(&mut list, |p| {
        p.first().is_some_and(|m| m.status == ProductStatus::Inactive)
    })
    .await;
    assert_eq!(current[0].id, milk.id);
    assert_eq!(current[0].created_at, milk.created_at);

    // Delete.
    products.delete(&milk.id).await.unwrap();
    wait_for(&mut list, <[Product]>::is_empty).await;
    assert!(products.last_error().is_none());

    products.unmount();
    analytics.unmount();
}

#[tokio::test]
async fn test_edit_keeps_identity() {
    let h = logged_in().await;
    let view = h.state.products_view(&h.authorized);
    let mut list = view.products_reader();

    view.save(form("Bread", "2.25", "Bakery", "active"))
        .await
        .unwrap();
    let current = wait_for(&mut list, |p| p.len() == 1).await;
    let bread = current[0].clone();

    view.open_edit(&bread);
    let Modal::Editing { id, mut form } = view.modal() else {
        panic!("expected edit modal");
    };
    assert_eq!(id, bread.id);
    form.name = "Sourdough".into();
    view.save(form).await.unwrap();

    let current = wait_for(&mut list, |p| p.first().is_some_and(|b| b.name == "Sourdough")).await;
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, bread.id);
    assert_eq!(current[0].created_at, bread.created_at);
    assert_eq!(h.docs.store.documents("products").len(), 1);
}

#[tokio::test]
async fn test_concurrent_commands_all_land() {
    let h = logged_in().await;
    let view = h.state.products_view(&h.authorized);
    let mut list = view.products_reader();

    let (a, b, c) = tokio::join!(
        view.save(form("Apples", "1.2", "Produce", "active")),
        view.save(form("Cheddar", "5", "Dairy", "inactive")),
        view.save(form("Bagels", "3", "Bakery", "active")),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let current = wait_for(&mut list, |p| p.len() == 3).await;
    let mut names: Vec<_> = current.iter().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Apples", "Bagels", "Cheddar"]);
}

// =============================================================================
// Legacy Data and Failures
// =============================================================================

#[tokio::test]
async fn test_legacy_documents_are_counted_as_inactive() {
    let h = logged_in().await;
    let seed = |value: serde_json::Value| serde_json::from_value::<Fields>(value).unwrap();
    h.docs.store.put(
        "products",
        "a",
        seed(json!({ "name": "Milk", "price": 3.5, "category": "Dairy", "status": "active", "createdAt": 1 })),
    );
    h.docs.store.put(
        "products",
        "b",
        seed(json!({ "name": "Eggs", "price": "4.10", "category": "Dairy", "status": "Active" })),
    );
    h.docs.store.put("products", "c", seed(json!({ "status": "disabled" })));

    let mut analytics = h.state.analytics_view(&h.authorized);
    let stats = tokio::time::timeout(Duration::from_secs(5), analytics.next_stats())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_status.active, 1);
    assert_eq!(stats.by_status.inactive, 2);
    assert_eq!(stats.category("Dairy"), Some(2));
    assert_eq!(stats.category(""), Some(1));

    let eggs = analytics
        .products()
        .iter()
        .find(|p| p.name == "Eggs")
        .cloned()
        .unwrap();
    assert_eq!(eggs.price, Price::parse("4.1").unwrap());
}

#[tokio::test]
async fn test_feed_failure_keeps_last_list() {
    let h = logged_in().await;
    let view = h.state.products_view(&h.authorized);
    let mut list = view.products_reader();

    view.save(form("Milk", "3.5", "Dairy", "active"))
        .await
        .unwrap();
    wait_for(&mut list, |p| p.len() == 1).await;

    h.docs.store.fail_feed("products", "permission denied");
    for _ in 0..100 {
        if matches!(view.feed_status(), FeedStatus::Failed(_)) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(view.feed_status().error().is_some());
    assert_eq!(view.products().len(), 1);
}

#[tokio::test]
async fn test_unmounted_view_ignores_late_results() {
    let h = logged_in().await;
    let view = h.state.products_view(&h.authorized);
    view.open_add();

    let pending = {
        let view = view.clone();
        tokio::spawn(async move { view.save(form("Milk", "3.5", "Dairy", "active")).await })
    };
    view.unmount();
    pending.await.unwrap().unwrap();

    // The write reached the store, but the unmounted view kept its state.
    assert_eq!(h.docs.store.documents("products").len(), 1);
    assert!(view.modal().is_open());
    assert!(!view.is_mounted());
}
