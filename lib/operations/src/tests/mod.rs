use serde_json::json;

use crm_connector_transport::testing::{graphql_failure, MockTransport};
use crm_connector_transport::{GraphqlEndpoint, GraphqlRequest, TransportError};

use crate::bulk::BulkOutcome;
use crate::client::CrmClient;
use crate::error::OperationError;
use crate::upsert::{UpsertAction, UpsertMatch};


fn client_with(
    handler: impl Fn(GraphqlEndpoint, &GraphqlRequest) -> Result<serde_json::Value, TransportError>
        + Send
        + Sync
        + 'static,
) -> CrmClient<MockTransport> {
    CrmClient::new(MockTransport::new(handler))
}

#[tokio::test]
async fn get_unwraps_the_first_node_of_the_plural_query() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        assert!(request.query.starts_with("query FindCompany("));
        assert_eq!(request.variables.as_ref().unwrap()["id"], json!("abc"));
        // The discovered selection makes it into the document: the Address
        // complex type with subfields, the connection field skipped.
        assert!(request.query.contains("address {"));
        assert!(!request.query.contains("people"));
        Ok(json!({
            "companies": {
                "edges": fixtures::edges(vec![json!({ "id": "abc", "name": "Acme" })])
            }
        }))
    });

    let record = client.get("company", "abc").await.unwrap();
    assert_eq!(record["id"], json!("abc"));
    assert_eq!(record["name"], json!("Acme"));
}

#[tokio::test]
async fn get_with_no_match_is_record_not_found() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        Ok(json!({ "companies": { "edges": [] } }))
    });

    let err = client.get("company", "missing").await.unwrap_err();
    assert!(matches!(err, OperationError::RecordNotFound(_)));
}

#[tokio::test]
async fn unknown_resource_fails_before_any_data_request() {
    let client = client_with(|endpoint, request| {
        fixtures::schema_backend(endpoint, request)
            .unwrap_or_else(|| panic!("unexpected data request: {}", request.query))
    });

    let err = client.get("rocket", "abc").await.unwrap_err();
    assert!(matches!(err, OperationError::UnknownResource(resource) if resource == "rocket"));
}

#[tokio::test]
async fn list_collects_every_node() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        assert!(request.query.starts_with("query FindManyCompanies("));
        assert_eq!(request.variables.as_ref().unwrap()["limit"], json!(50));
        Ok(json!({
            "companies": {
                "edges": fixtures::edges(vec![
                    json!({ "id": "1", "name": "Acme" }),
                    json!({ "id": "2", "name": "Initech" }),
                ])
            }
        }))
    });

    let records = client.list("company", 50).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["name"], json!("Initech"));
}

#[tokio::test]
async fn delete_returns_the_minimal_record() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        assert!(request.query.contains("deleteCompany(id: $id)"));
        Ok(json!({ "deleteCompany": { "id": "abc" } }))
    });

    let record = client.delete("company", "abc").await.unwrap();
    assert_eq!(record, json!({ "id": "abc" }));
}

#[tokio::test]
async fn bulk_create_captures_per_record_failure_without_aborting() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        let data = request.variables.as_ref().unwrap()["data"].clone();
        if data["name"] == json!("Beta") {
            return Err(graphql_failure("Beta exploded"));
        }
        Ok(json!({ "createCompany": { "id": "new", "name": data["name"].clone() } }))
    });

    let inputs = vec![
        json!({ "name": "Alpha" }),
        json!({ "name": "Beta" }),
        json!({ "name": "Gamma" }),
    ];
    let outcomes = client.create_many("company", &inputs).await.unwrap();

    assert_eq!(outcomes.len(), 3);
    match &outcomes[0] {
        BulkOutcome::Succeeded { index, record } => {
            assert_eq!(*index, 0);
            assert_eq!(record["name"], json!("Alpha"));
        }
        other => panic!("expected success at index 0, got {other:?}"),
    }
    match &outcomes[1] {
        BulkOutcome::Failed { index, error } => {
            assert_eq!(*index, 1);
            assert!(error.contains("Beta exploded"));
        }
        other => panic!("expected failure at index 1, got {other:?}"),
    }
    assert!(outcomes[2].is_success());

    // The field selection is derived once for the whole batch, not per record.
    let introspections = client
        .transport()
        .calls()
        .iter()
        .filter(|(_, request)| request.query.contains("__type("))
        .count();
    assert_eq!(introspections, 1);
}

#[tokio::test]
async fn upsert_by_id_updates_when_the_probe_finds_a_record() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        if request.query.starts_with("query FindPerson(") {
            return Ok(json!({
                "people": {
                    "edges": fixtures::edges(vec![json!({ "id": "p-1", "email": "ada@example.com" })])
                }
            }));
        }
        assert!(request.query.starts_with("mutation UpdatePerson("));
        Ok(json!({ "updatePerson": { "id": "p-1", "email": "ada@new.example.com" } }))
    });

    let matching = UpsertMatch::ById("p-1".to_string());
    let data = json!({ "email": "ada@new.example.com" });
    // Deterministic: same probe result, same branch, both times.
    for _ in 0..2 {
        let result = client.upsert("person", &matching, &data).await.unwrap();
        assert_eq!(result.action, UpsertAction::Updated);
        assert_eq!(result.record["id"], json!("p-1"));
    }
}

#[tokio::test]
async fn upsert_by_id_creates_when_the_probe_finds_nothing() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        if request.query.starts_with("query FindPerson(") {
            return Ok(json!({ "people": { "edges": [] } }));
        }
        assert!(request.query.starts_with("mutation CreatePerson("));
        Ok(json!({ "createPerson": { "id": "p-2", "email": "new@example.com" } }))
    });

    let matching = UpsertMatch::ById("p-2".to_string());
    let data = json!({ "email": "new@example.com" });
    for _ in 0..2 {
        let result = client.upsert("person", &matching, &data).await.unwrap();
        assert_eq!(result.action, UpsertAction::Created);
        assert_eq!(result.record["id"], json!("p-2"));
    }
}

#[tokio::test]
async fn upsert_probe_failure_biases_toward_create() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        if request.query.starts_with("query FindPerson(") {
            return Err(graphql_failure("transient network blip"));
        }
        assert!(request.query.starts_with("mutation CreatePerson("));
        Ok(json!({ "createPerson": { "id": "p-3" } }))
    });

    let result = client
        .upsert(
            "person",
            &UpsertMatch::ById("p-3".to_string()),
            &json!({ "email": "x@example.com" }),
        )
        .await
        .unwrap();
    assert_eq!(result.action, UpsertAction::Created);
}

#[tokio::test]
async fn upsert_by_unique_field_scans_candidates() {
    let client = client_with(|endpoint, request| {
        if let Some(response) = fixtures::schema_backend(endpoint, request) {
            return response;
        }
        if request.query.starts_with("query FindManyPeople(") {
            return Ok(json!({
                "people": {
                    "edges": fixtures::edges(vec![
                        json!({ "id": "p-1", "email": "ada@example.com" }),
                        json!({ "id": "p-2", "email": "grace@example.com" }),
                    ])
                }
            }));
        }
        assert!(request.query.starts_with("mutation UpdatePerson("));
        assert_eq!(request.variables.as_ref().unwrap()["id"], json!("p-2"));
        Ok(json!({ "updatePerson": { "id": "p-2", "email": "grace@example.com" } }))
    });

    let matching = UpsertMatch::ByField {
        field: "email".to_string(),
        value: json!("grace@example.com"),
    };
    let result = client
        .upsert("person", &matching, &json!({ "city": "York" }))
        .await
        .unwrap();
    assert_eq!(result.action, UpsertAction::Updated);
    assert_eq!(result.record["id"], json!("p-2"));
}
