//! HTTP store and token endpoint behaviour against a wiremock server.

use assert_json_diff::assert_json_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use authz_client::{AccessToken, AuthError, Authenticator, ClientConfig, ClientCredentials, DirectoryClient};
use authz_core::{AuthzModel, DirectoryStore, NewPermission, ProvisionError, Provisioner, RoleUpdate, StoreError};

const TOKEN: &str = "test-token-123";

fn client_for(server: &MockServer) -> DirectoryClient {
    let config = ClientConfig::new(Url::parse(&format!("{}/api", server.uri())).unwrap());
    DirectoryClient::new(config, AccessToken::new(TOKEN)).unwrap()
}

async fn mount_listing(server: &MockServer, resource: &str, items: Value) {
    let mut wrapped = serde_json::Map::new();
    wrapped.insert(resource.to_string(), items);
    let wrapped = Value::Object(wrapped);
    Mock::given(method("GET"))
        .and(path(format!("/api/{resource}")))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(wrapped))
        .expect(1)
        .mount(server)
        .await;
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_authenticate_posts_client_credentials_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=cid"))
        .and(body_string_contains("client_secret=s%26cret"))
        .and(body_string_contains("audience=urn%3Aauth0-authz-api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "abc", "token_type": "Bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let authenticator =
        Authenticator::new(reqwest::Client::new(), format!("{}/oauth/token", server.uri()));
    let token = authenticator
        .authenticate(&ClientCredentials::new("cid", "s&cret"))
        .await
        .unwrap();

    assert_eq!(token.as_str(), "abc");
}

#[tokio::test]
async fn test_authenticate_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("access_denied"))
        .mount(&server)
        .await;

    let authenticator =
        Authenticator::new(reqwest::Client::new(), format!("{}/oauth/token", server.uri()));
    let err = authenticator
        .authenticate(&ClientCredentials::new("cid", "wrong"))
        .await
        .unwrap_err();

    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "access_denied");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_authenticate_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "missing"})))
        .mount(&server)
        .await;

    let authenticator =
        Authenticator::new(reqwest::Client::new(), format!("{}/oauth/token", server.uri()));
    let err = authenticator
        .authenticate(&ClientCredentials::new("cid", "secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(_)));
}

// =============================================================================
// Store calls
// =============================================================================

#[tokio::test]
async fn test_list_permissions_unwraps_collection() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "permissions",
        json!([{
            "_id": "p-1",
            "name": "read:users",
            "description": "Read Users",
            "applicationType": "client",
            "applicationId": "app1"
        }]),
    )
    .await;

    let permissions = client_for(&server).list_permissions().await.unwrap();

    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].id, "p-1");
    assert_eq!(permissions[0].application_id, "app1");
}

#[tokio::test]
async fn test_create_permission_returns_stored_entity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/permissions"))
        .and(body_json(json!({
            "name": "read:users",
            "description": "Read Users",
            "applicationType": "client",
            "applicationId": "app1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "p-42",
            "name": "read:users",
            "description": "Read Users",
            "applicationType": "client",
            "applicationId": "app1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server)
        .create_permission(&NewPermission {
            name: "read:users".into(),
            description: "Read Users".into(),
            application_type: "client".into(),
            application_id: "app1".into(),
        })
        .await
        .unwrap();

    assert_eq!(created.id, "p-42");
}

#[tokio::test]
async fn test_set_role_permissions_puts_full_role_without_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/roles/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "r-1"})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .set_role_permissions(
            "r-1",
            &RoleUpdate {
                name: "admin".into(),
                description: "Admins".into(),
                application_type: "client".into(),
                application_id: "app1".into(),
                permissions: vec!["p-1".into(), "p-2".into()],
            },
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_json_eq!(
        body,
        json!({
            "name": "admin",
            "description": "Admins",
            "applicationType": "client",
            "applicationId": "app1",
            "permissions": ["p-1", "p-2"]
        })
    );
}

#[tokio::test]
async fn test_set_group_nesting_patches_id_list() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/groups/g-1/nested"))
        .and(body_json(json!(["g-2", "g-3"])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .set_group_nesting("g-1", &["g-2".to_string(), "g-3".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficient_scope"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_groups().await.unwrap_err();
    match err {
        StoreError::Status { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "insufficient_scope");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_listing_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_roles().await.unwrap_err();
    assert!(matches!(err, StoreError::Decode { .. }));
}

/// Serves one response whose body is shorter than its `Content-Length`.
async fn truncated_body_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"permis",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/api")
}

#[tokio::test]
async fn test_interrupted_body_is_a_transport_error() {
    let base = truncated_body_server().await;
    let client = DirectoryClient::new(ClientConfig::new(Url::parse(&base).unwrap()), AccessToken::new(TOKEN))
        .unwrap();

    let err = client.list_permissions().await.unwrap_err();
    match err {
        StoreError::Transport { message } => assert!(message.contains("response body")),
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn test_provision_full_scenario_over_http() {
    let server = MockServer::start().await;
    mount_listing(&server, "permissions", json!([])).await;
    mount_listing(&server, "roles", json!([])).await;
    mount_listing(&server, "groups", json!([])).await;

    for (id, name, description) in [
        ("p-1", "read:users", "Read Users"),
        ("p-2", "write:users", "Write Users"),
    ] {
        Mock::given(method("POST"))
            .and(path("/api/permissions"))
            .and(body_partial_json(json!({"name": name, "description": description})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": id,
                "name": name,
                "description": description,
                "applicationType": "client",
                "applicationId": "app1"
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/api/roles"))
        .and(body_json(json!({
            "name": "admin",
            "description": "Administrators",
            "applicationType": "client",
            "applicationId": "app1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "r-1",
            "name": "admin",
            "description": "Administrators",
            "applicationType": "client",
            "applicationId": "app1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/roles/r-1"))
        .and(body_partial_json(json!({"permissions": ["p-1"]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/groups"))
        .and(body_json(json!({"name": "admins", "description": "Admin users"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "g-1",
            "name": "admins",
            "description": "Admin users"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let model = AuthzModel::from_json_str(
        &json!({
            "applications": [{
                "id": "app1",
                "permissions": ["read:users", "write:users"],
                "roles": [{"name": "admin", "description": "Administrators", "permissions": ["read:users"]}]
            }],
            "groups": [{"name": "admins", "description": "Admin users"}]
        })
        .to_string(),
    )
    .unwrap();

    let client = client_for(&server);
    let report = Provisioner::new(&client).provision(&model).await.unwrap();
    assert_eq!(report.total_created(), 4);

    let order: Vec<(String, String)> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() != "GET")
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect();
    let expected: Vec<(String, String)> = [
        ("POST", "/api/permissions"),
        ("POST", "/api/permissions"),
        ("POST", "/api/roles"),
        ("PUT", "/api/roles/r-1"),
        ("POST", "/api/groups"),
    ]
    .into_iter()
    .map(|(m, p)| (m.to_string(), p.to_string()))
    .collect();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn test_provision_stops_on_failed_write() {
    let server = MockServer::start().await;
    mount_listing(&server, "permissions", json!([])).await;
    mount_listing(&server, "roles", json!([])).await;
    mount_listing(&server, "groups", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/permissions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("validation failed"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/roles"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let model = AuthzModel::from_json_str(
        r#"{"applications": [{"id": "app1", "permissions": ["read:users"], "roles": [{"name": "admin"}]}]}"#,
    )
    .unwrap();

    let client = client_for(&server);
    let err = Provisioner::new(&client).provision(&model).await.unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::StoreWrite { source: StoreError::Status { status: 400, .. }, .. }
    ));
}
