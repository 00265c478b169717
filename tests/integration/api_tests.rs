//! API integration tests
//!
//! Need a running server backed by an empty database.

use reqwest::{multipart, Client};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique target service name per test run
fn ts_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

async fn create_ts(client: &Client, name: &str) {
    let response = client
        .post(format!("{}/target-services", BASE_URL))
        .json(&json!({
            "name": name,
            "display_name": "Integration package",
            "csv_conf": { "isbn": 1, "eisbn": 2, "title": 3, "authors": [4] }
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
}

async fn upload(client: &Client, name: &str, csv: &'static str) -> Value {
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(csv.as_bytes()).file_name("titles.csv"),
    );
    let response = client
        .post(format!("{}/target-services/{}/upload", BASE_URL, name))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse response")
}

async fn find_record(client: &Client, isbn: &str) -> Value {
    client
        .get(format!("{}/records?isbn={}", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

async fn toggle(client: &Client, name: &str) {
    let response = client
        .post(format!("{}/target-services/{}/toggle-active", BASE_URL, name))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

async fn delete_ts(client: &Client, name: &str) {
    let _ = client
        .delete(format!("{}/target-services/{}", BASE_URL, name))
        .send()
        .await;
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_create_get_and_list_target_service() {
    let client = Client::new();
    let name = ts_name("create");
    create_ts(&client, &name).await;

    let response = client
        .get(format!("{}/target-services/{}", BASE_URL, name))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["target_service"]["active"], true);
    assert_eq!(body["records_count"], 0);
    assert_eq!(body["csv_conf_display"], "isbn; eisbn; title; authors");
    assert_eq!(body["csv_conf_fields"], 4);

    let listing: Value = client
        .get(format!("{}/target-services", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(listing
        .as_array()
        .expect("listing is an array")
        .iter()
        .any(|ts| ts["name"] == name.as_str()));

    // Same name twice is a conflict
    let response = client
        .post(format!("{}/target-services", BASE_URL))
        .json(&json!({ "name": name, "display_name": "Again" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    delete_ts(&client, &name).await;
}

#[tokio::test]
#[ignore]
async fn test_update_target_service() {
    let client = Client::new();
    let name = ts_name("update");
    create_ts(&client, &name).await;

    let response = client
        .put(format!("{}/target-services/{}", BASE_URL, name))
        .json(&json!({ "display_name": "Renamed", "csv_conf": { "title": 1, "eisbn": 2 } }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["display_name"], "Renamed");
    assert_eq!(body["csv_conf"]["eisbn"], 2);

    let view: Value = client
        .get(format!("{}/target-services/{}/csv-conf", BASE_URL, name))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(view["display"], "title; eisbn");
    assert_eq!(view["valid"], true);

    delete_ts(&client, &name).await;
}

#[tokio::test]
#[ignore]
async fn test_upload_then_reupload_reconciles_by_isbn() {
    let client = Client::new();
    let name = ts_name("upload");
    create_ts(&client, &name).await;

    let csv = "\
isbn,eisbn,title,author
978-0-00-000001-1,978-0-00-000001-2,First title,Doe
,978-0-00-000002-2,Second title,Roe
978-0-00-000003-1,,,Nobody
";
    let report = upload(&client, &name, csv).await;
    assert_eq!(report["rows_read"], 3);
    assert_eq!(report["created"], 2);
    assert_eq!(report["updated"], 0);
    assert_eq!(report["rejected"][0]["line"], 4);

    let report = upload(&client, &name, csv).await;
    assert_eq!(report["created"], 0);
    assert_eq!(report["updated"], 2);

    let record: Value = client
        .get(format!("{}/records?isbn=9780000000012", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(record["title"], "First title");
    assert_eq!(record["target_services"][0], name.as_str());

    let record_id = record["id"].as_str().expect("record id").to_string();
    let response = client
        .delete(format!("{}/records/{}", BASE_URL, record_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/records/{}", BASE_URL, record_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    delete_ts(&client, &name).await;
}

#[tokio::test]
#[ignore]
async fn test_toggle_and_delete_propagate_to_records() {
    let client = Client::new();
    let name = ts_name("toggle");
    create_ts(&client, &name).await;
    upload(&client, &name, "isbn,eisbn,title,author\n978-1-00-000001-1,,Toggled,\n").await;

    let body: Value = client
        .post(format!("{}/target-services/{}/toggle-active", BASE_URL, name))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["active"], false);

    let record: Value = client
        .get(format!("{}/records?isbn=9781000000011", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(record["active"], false);

    // Back on, then delete: the record loses its only package
    client
        .post(format!("{}/target-services/{}/toggle-active", BASE_URL, name))
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .delete(format!("{}/target-services/{}", BASE_URL, name))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let record: Value = client
        .get(format!("{}/records?isbn=9781000000011", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(record["active"], false);
    assert_eq!(record["target_services"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_shared_record_follows_remaining_target_service() {
    let client = Client::new();
    let first = ts_name("shared-a");
    let second = ts_name("shared-b");
    create_ts(&client, &first).await;
    create_ts(&client, &second).await;

    let csv = "isbn,eisbn,title,author\n978-1-00-000002-1,,Shared,\n";
    upload(&client, &first, csv).await;
    let report = upload(&client, &second, csv).await;
    assert_eq!(report["updated"], 1);

    let record = find_record(&client, "9781000000021").await;
    assert_eq!(record["target_services"].as_array().map(Vec::len), Some(2));

    // Still available through the other package
    toggle(&client, &first).await;
    let record = find_record(&client, "9781000000021").await;
    assert_eq!(record["active"], true);

    let response = client
        .delete(format!("{}/target-services/{}", BASE_URL, first))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let record = find_record(&client, "9781000000021").await;
    assert_eq!(record["active"], true);
    assert_eq!(record["target_services"][0], second.as_str());
    assert_eq!(record["target_services"].as_array().map(Vec::len), Some(1));

    // Now the only package: toggling it off reaches the record
    toggle(&client, &second).await;
    let record = find_record(&client, "9781000000021").await;
    assert_eq!(record["active"], false);

    delete_ts(&client, &second).await;
    let record = find_record(&client, "9781000000021").await;
    assert_eq!(record["active"], false);
    assert_eq!(record["target_services"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_import_into_inactive_target_service() {
    let client = Client::new();
    let name = ts_name("inactive");
    create_ts(&client, &name).await;
    upload(&client, &name, "isbn,eisbn,title,author\n978-1-00-000003-1,,Known,\n").await;
    toggle(&client, &name).await;

    let report = upload(
        &client,
        &name,
        "isbn,eisbn,title,author\n978-1-00-000003-1,,Known again,\n978-1-00-000004-1,,Unknown,\n",
    )
    .await;
    assert_eq!(report["created"], 1);
    assert_eq!(report["updated"], 1);

    // Merged but not re-activated, and new records start inactive
    let known = find_record(&client, "9781000000031").await;
    assert_eq!(known["title"], "Known again");
    assert_eq!(known["active"], false);
    let unknown = find_record(&client, "9781000000041").await;
    assert_eq!(unknown["active"], false);

    toggle(&client, &name).await;
    upload(&client, &name, "isbn,eisbn,title,author\n978-1-00-000003-1,,Known,\n").await;
    let known = find_record(&client, "9781000000031").await;
    assert_eq!(known["active"], true);

    delete_ts(&client, &name).await;
}

#[tokio::test]
#[ignore]
async fn test_concurrent_create_is_a_conflict() {
    let client = Client::new();
    let name = ts_name("race");
    let body = json!({ "name": name, "display_name": "Race" });
    let url = format!("{}/target-services", BASE_URL);

    let (a, b) = tokio::join!(
        client.post(&url).json(&body).send(),
        client.post(&url).json(&body).send()
    );
    let mut statuses = vec![
        a.expect("Failed to send request").status().as_u16(),
        b.expect("Failed to send request").status().as_u16(),
    ];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![201, 409]);

    delete_ts(&client, &name).await;
}

#[tokio::test]
#[ignore]
async fn test_unknown_target_service() {
    let client = Client::new();

    let response = client
        .get(format!("{}/target-services/{}", BASE_URL, ts_name("missing")))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
