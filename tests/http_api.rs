//! Integration tests for the HTTP transport against a mock server.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cloudnode::{
    ApiConfig, CloudApi, CloudClient, CompartmentId, Error, HttpCloudApi, InstanceFilter,
    LoadBalancerSpec, PollPolicy,
};

fn api_for(server: &MockServer, token: &str) -> HttpCloudApi {
    let mut config = ApiConfig::new(server.uri(), token);
    config.timeout = Duration::from_secs(5);
    HttpCloudApi::new(config).unwrap()
}

fn instance_body(id: &str, display_name: &str, state: &str) -> serde_json::Value {
    json!({
        "id": id,
        "displayName": display_name,
        "compartmentId": "comp-1",
        "lifecycleState": state,
    })
}

#[tokio::test]
async fn get_instance_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/inst-1"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(instance_body("inst-1", "worker-1", "RUNNING")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server, "secret-token");
    let instance = api.get_instance("inst-1").await.unwrap();

    assert_eq!(instance.id, "inst-1");
    assert_eq!(instance.display_name, "worker-1");
}

#[tokio::test]
async fn listing_feeds_cursor_back_as_page_param() {
    let server = MockServer::start().await;
    let compartment = CompartmentId::from("comp-1");

    Mock::given(method("GET"))
        .and(path("/instances"))
        .and(query_param("compartmentId", "comp-1"))
        .and(query_param("displayName", "worker-1"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([instance_body("inst-0", "worker-1", "TERMINATED")]))
                .insert_header("opc-next-page", "cursor-2"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/instances"))
        .and(query_param("page", "cursor-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([instance_body("inst-1", "worker-1", "RUNNING")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = Arc::new(api_for(&server, ""));
    let client = CloudClient::new(api, compartment);
    let resolved = client.instance_by_node_name("worker-1").await.unwrap();

    assert_eq!(resolved.id, "inst-1");
}

#[tokio::test]
async fn first_page_carries_no_page_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instances"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server, "");
    let page = api
        .list_instances(
            &CompartmentId::from("comp-1"),
            InstanceFilter::default(),
            None,
        )
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert!(page.next.is_none());
}

#[rstest]
#[case(401)]
#[case(403)]
#[case(500)]
#[tokio::test]
async fn non_success_status_surfaces_as_api_error(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/inst-1"))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .mount(&server)
        .await;

    let api = api_for(&server, "");
    let err = api.get_instance("inst-1").await.unwrap_err();

    match err {
        Error::Api {
            status: got,
            body,
        } => {
            assert_eq!(got, status);
            assert_eq!(body, "nope");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_and_await_load_balancer_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadBalancers"))
        .respond_with(ResponseTemplate::new(202).insert_header("opc-work-request-id", "wr-9"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/loadBalancerWorkRequests/wr-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "wr-9",
            "lifecycleState": "SUCCEEDED",
            "loadBalancerId": "lb-1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/loadBalancers/lb-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "lb-1",
            "displayName": "ingress",
            "shapeName": "100Mbps",
            "subnetIds": ["subnet-1"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = Arc::new(api_for(&server, ""));
    let client = CloudClient::new(api, CompartmentId::from("comp-1"))
        .with_poll_policy(PollPolicy::immediate(15));

    let lb = client
        .create_and_await_load_balancer(LoadBalancerSpec {
            display_name: "ingress".to_string(),
            shape_name: "100Mbps".to_string(),
            subnet_ids: vec!["subnet-1".to_string()],
        })
        .await
        .unwrap();

    assert_eq!(lb.id, "lb-1");
    assert_eq!(lb.display_name, "ingress");
}

#[tokio::test]
async fn missing_work_request_header_is_malformed_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/loadBalancers"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let api = api_for(&server, "");
    let err = api
        .create_load_balancer(
            &CompartmentId::from("comp-1"),
            &LoadBalancerSpec {
                display_name: "ingress".to_string(),
                shape_name: "100Mbps".to_string(),
                subnet_ids: vec![],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedData(_)));
}

#[tokio::test]
async fn delete_listener_returns_work_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/loadBalancers/lb-1/listeners/tcp-80"))
        .respond_with(ResponseTemplate::new(202).insert_header("opc-work-request-id", "wr-4"))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server, "");
    let wr_id = api.delete_listener("lb-1", "tcp-80").await.unwrap();
    assert_eq!(wr_id, "wr-4");
}

#[tokio::test]
async fn work_request_failure_message_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loadBalancerWorkRequests/wr-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "wr-2",
            "lifecycleState": "FAILED",
            "message": "subnet is full",
        })))
        .mount(&server)
        .await;

    let api = Arc::new(api_for(&server, ""));
    let client = CloudClient::new(api, CompartmentId::from("comp-1"))
        .with_poll_policy(PollPolicy::immediate(15));

    let err = client.await_work_request("wr-2").await.unwrap_err();
    match err {
        Error::OperationFailed { id, message } => {
            assert_eq!(id, "wr-2");
            assert_eq!(message, "subnet is full");
        }
        other => panic!("expected OperationFailed, got {other:?}"),
    }
}
