mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use bizdesk_api::subscription::ResourceKind;
use common::{wait_for_usage_updates, Harness};

#[tokio::test]
async fn create_normalizes_and_counts_usage() -> Result<()> {
    let harness = Harness::new();
    let (user_id, token) = harness.active_user().await;

    let (status, body) = harness
        .post(
            "/api/customers",
            &token,
            json!({
                "name": "Acme Traders",
                "phone": "(987) 654-3210",
                "email": "Sales@Acme.IN",
                "gstin": "27aapfu0939f1zv",
                "gstNumber": "ignored",
                "isActive": 0,
            }),
        )
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Customer created successfully"));
    let customer = &body["customer"];
    assert_eq!(customer["phone"], json!("9876543210"));
    assert_eq!(customer["email"], json!("sales@acme.in"));
    assert_eq!(customer["gstin"], json!("27AAPFU0939F1ZV"));
    assert_eq!(customer["isActive"], json!(false));
    assert_eq!(customer["totalOrders"], json!(0));

    wait_for_usage_updates(&harness.billing, 1).await;
    assert_eq!(harness.billing.usage(user_id, ResourceKind::Customers).await, 1);
    Ok(())
}

#[tokio::test]
async fn create_rejects_duplicates_and_bad_input() -> Result<()> {
    let harness = Harness::new();
    let (user_id, token) = harness.active_user().await;
    harness.store.seed_customer(user_id, "Acme", "9876543210").await;

    let (status, body) = harness
        .post("/api/customers", &token, json!({ "name": "Other", "phone": "98765 43210" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Another customer already uses this phone number"));

    let (status, body) = harness
        .post("/api/customers", &token, json!({ "name": "Other", "phone": "+91 98765 43210" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Phone number must be a valid 10-digit number"));

    assert_eq!(harness.billing.usage_updates(), 0);
    Ok(())
}

#[tokio::test]
async fn list_is_scoped_and_searchable() -> Result<()> {
    let harness = Harness::new();
    let (user_id, token) = harness.active_user().await;
    let (other_user, _) = harness.active_user().await;

    harness.store.seed_customer(user_id, "Acme Traders", "9876543210").await;
    harness.store.seed_customer(user_id, "Bharat Steel", "9123456780").await;
    harness.store.seed_customer(other_user, "Acme Foreign", "9000000001").await;

    let (status, body) = harness.get("/api/customers", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(2));

    let (status, body) = harness.get("/api/customers?search=acme", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["customers"][0]["name"], json!("Acme Traders"));

    let (_, body) = harness.get("/api/customers?limit=1", &token).await?;
    assert_eq!(body["count"], json!(1));
    Ok(())
}

#[tokio::test]
async fn collection_requires_credentials_too() -> Result<()> {
    let harness = Harness::new();
    let (status, _) = harness.send(Method::GET, "/api/customers", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(harness.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn malformed_query_string_is_a_json_400() -> Result<()> {
    let harness = Harness::new();
    let (_, token) = harness.active_user().await;

    let (status, body) = harness.get("/api/customers?limit=abc", &token).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Invalid query parameters"));
    assert_eq!(harness.store.calls(), 0);
    Ok(())
}
