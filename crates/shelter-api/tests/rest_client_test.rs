// Integration tests for `RestClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelter_api::{Error, Query, RestClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let transport = TransportConfig::new(SecretString::from("anon-key".to_owned()));
    let client = RestClient::new(Url::parse(&server.uri()).unwrap(), &transport).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_select_renders_query_and_sends_auth() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/adopt_animals"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(query_param("select", "*"))
        .and(query_param("species", "eq.Dog"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a1", "name": "Rex", "species": "Dog" },
            { "id": "a2", "name": "Bruno", "species": "Dog" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = Query::new().eq("species", "Dog").order_by("created_at", false);
    let rows = client.select("adopt_animals", &query).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Rex");
    assert_eq!(rows[1]["id"], "a2");
}

#[tokio::test]
async fn test_insert_returns_representation() {
    let (server, client) = setup().await;

    let row = json!({ "name": "Mittens", "species": "Cat", "current_status": "Available" });

    Mock::given(method("POST"))
        .and(path("/rest/v1/rescued_animals"))
        .and(header("prefer", "return=representation"))
        .and(body_json(&row))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": "r9", "name": "Mittens", "species": "Cat", "current_status": "Available" }
        ])))
        .mount(&server)
        .await;

    let stored = client.insert("rescued_animals", &row).await.unwrap();
    assert_eq!(stored["id"], "r9");
}

#[tokio::test]
async fn test_update_targets_id() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/volunteers"))
        .and(query_param("id", "eq.v1"))
        .and(body_json(json!({ "status": "approved" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": "v1", "status": "approved" }])),
        )
        .mount(&server)
        .await;

    let updated = client
        .update("volunteers", "v1", &json!({ "status": "approved" }))
        .await
        .unwrap();
    assert_eq!(updated["status"], "approved");
}

#[tokio::test]
async fn test_delete_succeeds_with_row() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/gov_rules"))
        .and(query_param("id", "eq.g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "g1" }])))
        .expect(1)
        .mount(&server)
        .await;

    client.delete("gov_rules", "g1").await.unwrap();
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_update_with_empty_representation_is_no_rows() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/rescued_animals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client
        .update("rescued_animals", "missing", &json!({ "current_status": "Adopted" }))
        .await
        .unwrap_err();

    match err {
        Error::NoRowsAffected { table, id } => {
            assert_eq!(table, "rescued_animals");
            assert_eq!(id, "missing");
        }
        other => panic!("expected NoRowsAffected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_with_empty_representation_is_no_rows() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client.delete("contacts", "c1").await.unwrap_err();
    assert!(matches!(err, Error::NoRowsAffected { .. }));
}

#[tokio::test]
async fn test_rls_violation_is_permission_denied() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/adopt_animals"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "42501",
            "details": null,
            "hint": null,
            "message": "new row violates row-level security policy for table \"adopt_animals\""
        })))
        .mount(&server)
        .await;

    let err = client
        .insert("adopt_animals", &json!({ "name": "Rex" }))
        .await
        .unwrap_err();

    assert!(err.is_policy());
    assert_eq!(err.api_error_code(), Some("42501"));
    assert!(
        err.to_string()
            .contains("new row violates row-level security policy")
    );
}

#[tokio::test]
async fn test_check_violation_is_constraint() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/donations"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "23514",
            "details": "Failing row contains (-5).",
            "hint": null,
            "message": "new row for relation \"donations\" violates check constraint \"amount_positive\""
        })))
        .mount(&server)
        .await;

    let err = client
        .insert("donations", &json!({ "amount": -5 }))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Constraint { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_gateway_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/donations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client.select("donations", &Query::new()).await.unwrap_err();

    assert!(err.is_transient());
    assert!(matches!(err, Error::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_non_json_success_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client.select("contacts", &Query::new()).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("maintenance")),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}
