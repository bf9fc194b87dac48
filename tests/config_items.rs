//! Configuration item, customer user and session operations against a
//! mock OTRS webservice.

mod common;

use common::{client_for, op_path, received_bodies, PASSWORD, USERNAME};
use otrs_mcp::otrs_client::WEB_URL_KEY;
use otrs_mcp::tools::{AddCustomerUserInput, SearchConfigItemsInput};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_config_items_by_name_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(op_path("ConfigItemSearch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ConfigItemIDs": ["3"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input = SearchConfigItemsInput {
        name: Some("X".to_string()),
        ..Default::default()
    };
    let result = assert_ok!(client.search_config_items(&input).await);
    assert_eq!(result.get("ConfigItemIDs"), Some(&json!(["3"])));

    let body = received_bodies(&server).await.remove(0);
    assert_eq!(
        body,
        json!({
            "Limit": 50,
            "Result": "ARRAY",
            "Name": "X",
            "UserLogin": USERNAME,
            "Password": PASSWORD
        })
    );
}

#[tokio::test]
async fn test_search_config_items_wraps_filters_in_lists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(op_path("ConfigItemSearch")))
        .and(body_partial_json(json!({
            "Limit": 10,
            "ClassIDs": ["Computer"],
            "DeplStateIDs": ["Production"],
            "InciStateIDs": ["Operational"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input = SearchConfigItemsInput {
        class_name: Some("Computer".to_string()),
        deployment_state: Some("Production".to_string()),
        incident_state: Some("Operational".to_string()),
        limit: Some(10),
        ..Default::default()
    };
    assert_ok!(client.search_config_items(&input).await);

    let body = received_bodies(&server).await.remove(0);
    assert!(body.get("Name").is_none());
}

#[tokio::test]
async fn test_get_config_item_is_returned_unchanged() {
    let server = MockServer::start().await;
    let item = json!({
        "ConfigItem": [{"ConfigItemID": "55", "Name": "srv-db-01", "Class": "Computer"}]
    });
    Mock::given(method("POST"))
        .and(path(op_path("ConfigItemGet")))
        .and(body_partial_json(json!({"ConfigItemID": "55", "DynamicFields": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(item.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = assert_ok!(client.get_config_item("55", true).await);

    assert_eq!(Value::Object(result.clone()), item);
    assert!(!result.contains_key(WEB_URL_KEY));
}

#[tokio::test]
async fn test_get_config_item_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(op_path("ConfigItemGet")))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = assert_err!(client.get_config_item("55", false).await);
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn test_add_customer_user_nests_customer_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(op_path("CustomerUserAdd")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"UserLogin": "jdoe"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input = AddCustomerUserInput {
        login: "jdoe".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: "jane.doe@example.com".to_string(),
        customer_id: None,
    };
    let result = assert_ok!(client.add_customer_user(&input).await);
    assert_eq!(result.get("UserLogin"), Some(&json!("jdoe")));

    let body = received_bodies(&server).await.remove(0);
    assert_eq!(body["UserLogin"], json!(USERNAME));
    assert_eq!(
        body["CustomerUser"],
        json!({
            "UserLogin": "jdoe",
            "UserFirstname": "Jane",
            "UserLastname": "Doe",
            "UserEmail": "jane.doe@example.com",
            "UserCustomerID": "jdoe"
        })
    );
}

#[tokio::test]
async fn test_create_session_returns_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(op_path("SessionCreate")))
        .and(body_partial_json(json!({"UserLogin": USERNAME})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"SessionID": "q9Z"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = assert_ok!(client.create_session().await);
    assert_eq!(result.get("SessionID"), Some(&json!("q9Z")));
}
