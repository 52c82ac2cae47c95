use serde_json::{json, Value};
use storefront_api::schema::{Country, Product};
use storefront_api::{build_router, AppState, MemoryStore};
use uuid::Uuid;

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
async fn spawn_test_server() -> String {
    let app = build_router(AppState::new(MemoryStore::new()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

async fn create_product(client: &reqwest::Client, base: &str, name: &str, price: &str) -> Uuid {
    let id = Uuid::new_v4();
    let resp = client
        .post(format!("{}/api/Product", base))
        .json(&json!({ "ProductId": id, "Name": name, "Price": price }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let count: u64 = resp.json().await.unwrap();
    assert_eq!(count, 1);
    id
}

async fn list_products(client: &reqwest::Client, base: &str, filters: Value) -> reqwest::Response {
    client
        .get(format!("{}/api/Product", base))
        .query(&[("filters", filters.to_string())])
        .send()
        .await
        .unwrap()
}

async fn error_code(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.unwrap();
    body["error"]["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_is_ok() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn list_without_filters_returns_everything_in_order() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    for name in ["Widget", "Gadget", "Gizmo"] {
        create_product(&client, &base, name, "5").await;
    }
    let resp = client.get(format!("{}/api/Product", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let rows: Vec<Product> = resp.json().await.unwrap();
    let names: Vec<_> = rows.iter().map(|p| p.name.clone().unwrap()).collect();
    assert_eq!(names, vec!["Widget", "Gadget", "Gizmo"]);
}

#[tokio::test]
async fn list_applies_contains_filter() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    create_product(&client, &base, "Widget", "5").await;
    create_product(&client, &base, "Gadget", "7").await;
    create_product(&client, &base, "Widgetron", "9").await;

    let resp = list_products(
        &client,
        &base,
        json!([{ "Property": "Name", "Operator": "Contains", "Value": "Widget" }]),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let rows: Vec<Product> = resp.json().await.unwrap();
    let names: Vec<_> = rows.iter().map(|p| p.name.clone().unwrap()).collect();
    assert_eq!(names, vec!["Widget", "Widgetron"]);
}

#[tokio::test]
async fn list_combines_criteria_with_and() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    create_product(&client, &base, "Widget", "5").await;
    create_product(&client, &base, "Widgetron", "50").await;

    let resp = list_products(
        &client,
        &base,
        json!([
            { "Property": "Name", "Operator": "StartsWith", "Value": "Widget" },
            { "Property": "Price", "Operator": "GreaterThan", "Value": "10" }
        ]),
    )
    .await;
    let rows: Vec<Product> = resp.json().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name.as_deref(), Some("Widgetron"));
}

#[tokio::test]
async fn empty_result_is_success() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let resp = list_products(
        &client,
        &base,
        json!([{ "Property": "Name", "Operator": "Equal", "Value": "Nothing" }]),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let rows: Vec<Product> = resp.json().await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn malformed_filter_is_bad_request() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/api/Product", base))
        .query(&[("filters", "[{not json")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "malformed_filter");
}

#[tokio::test]
async fn unknown_field_is_bad_request_even_when_empty() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let resp = list_products(
        &client,
        &base,
        json!([{ "Property": "Colour", "Operator": "Equal", "Value": "red" }]),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "unknown_field");
    assert_eq!(body["error"]["details"]["property"], "Colour");
}

#[tokio::test]
async fn unparsable_operand_is_type_mismatch() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let resp = list_products(
        &client,
        &base,
        json!([{ "Property": "Price", "Operator": "LessThan", "Value": "cheap" }]),
    )
    .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "type_mismatch");
}

#[tokio::test]
async fn get_by_id_returns_entity_or_no_content() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let id = create_product(&client, &base, "Widget", "5").await;

    let resp = client.get(format!("{}/api/Product/{}", base, id)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let product: Product = resp.json().await.unwrap();
    assert_eq!(product.product_id, id);

    let resp = client
        .get(format!("{}/api/Product/{}", base, Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_path_id_is_bad_request() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/api/Product/not-a-uuid", base)).await.unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "bad_request");
}

#[tokio::test]
async fn duplicate_add_conflicts() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let id = create_product(&client, &base, "Widget", "5").await;
    let resp = client
        .post(format!("{}/api/Product", base))
        .json(&json!({ "ProductId": id, "Name": "Again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn put_overwrites_every_field_but_identity() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let id = create_product(&client, &base, "Widget", "5").await;

    let resp = client
        .put(format!("{}/api/Product/{}", base, id))
        .json(&json!({ "ProductId": id, "Name": "Widget Pro", "Price": "12.50" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let count: u64 = resp.json().await.unwrap();
    assert_eq!(count, 1);

    let product: Product = client
        .get(format!("{}/api/Product/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product.name.as_deref(), Some("Widget Pro"));
    assert_eq!(product.price.to_string(), "12.50");
    assert_eq!(product.code, None);
}

#[tokio::test]
async fn put_with_mismatched_identity_is_rejected() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let id = create_product(&client, &base, "Widget", "5").await;
    let other = Uuid::new_v4();

    let resp = client
        .put(format!("{}/api/Product/{}", base, id))
        .json(&json!({ "ProductId": other, "Name": "Hijack" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "identity_mismatch");
    assert_eq!(
        body["error"]["message"],
        format!("Mismatched ProductId: path '{}', body '{}'", id, other)
    );

    let product: Product = client
        .get(format!("{}/api/Product/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product.name.as_deref(), Some("Widget"));
}

#[tokio::test]
async fn put_and_delete_missing_entity_are_not_found() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let existing = create_product(&client, &base, "Widget", "5").await;
    let id = Uuid::new_v4();

    let resp = client
        .put(format!("{}/api/Product/{}", base, id))
        .json(&json!({ "ProductId": id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(format!("{}/api/Product/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let rows: Vec<Product> = client
        .get(format!("{}/api/Product", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].product_id, existing);
    assert_eq!(rows[0].name.as_deref(), Some("Widget"));
}

#[tokio::test]
async fn wrongly_typed_body_uses_error_envelope() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/Customer", base))
        .json(&json!({ "CustomerId": Uuid::new_v4(), "Name": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"].as_str().unwrap().contains("Name"));

    let rows: Vec<Value> = client
        .get(format!("{}/api/Customer", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn delete_removes_entity() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let id = create_product(&client, &base, "Widget", "5").await;

    let resp = client
        .delete(format!("{}/api/Product/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let count: u64 = resp.json().await.unwrap();
    assert_eq!(count, 1);

    let resp = client.get(format!("{}/api/Product/{}", base, id)).send().await.unwrap();
    assert_eq!(resp.status(), 204);
}

#[tokio::test]
async fn country_is_keyed_by_name() {
    let base = spawn_test_server().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/Country", base))
        .json(&json!({ "Name": "India", "CountryId": Uuid::new_v4(), "Code": "IN" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .put(format!("{}/api/Country/India", base))
        .json(&json!({ "Name": "India", "Code": "IND" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let country: Country = client
        .get(format!("{}/api/Country/India", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(country.code.as_deref(), Some("IND"));
    assert_eq!(country.country_id, Uuid::nil());
}
