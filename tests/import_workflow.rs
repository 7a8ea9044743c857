use mockapi_server::config::ImportConfig;
use mockapi_server::{build_app, serve, MemoryStore};
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

const PETSTORE: &str = r##"
openapi: 3.0.3
info:
  title: Pets
  version: "1.0"
paths:
  /pets/{id}:
    parameters:
      - {name: id, in: path, required: true, schema: {type: string}}
    get:
      responses:
        "404":
          description: missing
          content:
            application/json:
              example: {"error": "not found"}
        "200":
          description: one pet
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
  /pets:
    post:
      responses:
        "201":
          description: created
          headers:
            Location:
              schema:
                type: string
              example: /pets/1
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
    get:
      responses:
        "200":
          description: all pets
          content:
            application/json:
              examples:
                two:
                  value: [{"id": 1, "name": "Rex"}, {"id": 2, "name": "Tom"}]
components:
  schemas:
    Pet:
      type: object
      properties:
        id:
          type: integer
        name:
          type: string
        tags:
          type: array
          items:
            type: string
"##;

// Test client wrapper for making API calls as one user
struct TestClient {
    client: Client,
    base_url: String,
    user_id: Option<String>,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            user_id: None,
        }
    }

    fn as_user(&self, user_id: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            user_id: Some(user_id.to_string()),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.user_id {
            Some(user_id) => builder.header("X-User-Id", user_id),
            None => builder,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.request(reqwest::Method::POST, path).json(&json).send().await
    }

    async fn post_raw(&self, path: &str, body: &str) -> reqwest::Result<reqwest::Response> {
        self.request(reqwest::Method::POST, path)
            .header("Content-Type", "application/yaml")
            .body(body.to_string())
            .send()
            .await
    }

    async fn post_file(&self, path: &str, body: &str) -> reqwest::Result<reqwest::Response> {
        let part = multipart::Part::bytes(body.as_bytes().to_vec()).file_name("openapi.yaml");
        self.request(reqwest::Method::POST, path)
            .multipart(multipart::Form::new().part("file", part))
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.request(reqwest::Method::GET, path).send().await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.request(reqwest::Method::DELETE, path).send().await
    }
}

async fn spawn_server() -> TestClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = build_app(Arc::new(MemoryStore::new()), &ImportConfig::default());
    tokio::spawn(async move {
        serve(listener, app).await.unwrap();
    });
    TestClient::new(format!("http://{}", address))
}

/// Register a user and give them an organisation with one project; returns (client, project)
async fn setup_project(anonymous: &TestClient, email: &str) -> (TestClient, Value) {
    let response = anonymous
        .post("/users", json!({"email": email, "name": "Dev"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = response.json().await.unwrap();
    let client = anonymous.as_user(user["id"].as_str().unwrap());

    let organisation: Value = client
        .post("/organisations", json!({"name": "Acme"}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let response = client
        .post(
            "/projects",
            json!({"name": "Pets", "organisation_id": organisation["id"]}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let project: Value = response.json().await.unwrap();

    (client, project)
}

fn routes(preview: &Value) -> Vec<(String, String, String)> {
    preview["operations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|op| {
            (
                op["path"].as_str().unwrap().to_string(),
                op["method"].as_str().unwrap().to_string(),
                op["status"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

fn route(path: &str, method: &str, status: &str) -> (String, String, String) {
    (path.to_string(), method.to_string(), status.to_string())
}

#[tokio::test]
async fn test_import_workflow() {
    let anonymous = spawn_server().await;
    let health = anonymous.get("/health").await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let (client, project) = setup_project(&anonymous, "dev@example.com").await;
    let project_id = project["id"].as_str().unwrap();
    let code = project["code"].as_str().unwrap();

    // An endpoint that already exists before the import
    let response = client
        .post(
            &format!("/projects/{}/endpoints", project_id),
            json!({"method": "get", "path": "/pets", "response_body": "[]"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let existing: Value = response.json().await.unwrap();
    assert_eq!(existing["method"], "GET");

    // Preview from a raw body
    let preview_path = format!("/projects/{}/openapi/preview", project_id);
    let response = client.post_raw(&preview_path, PETSTORE).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let preview = &body["preview"];

    assert_eq!(preview["total_operations"], 3);
    assert_eq!(preview["new_count"], 2);
    assert_eq!(preview["existing_count"], 1);
    assert_eq!(preview["skipped_count"], 0);
    assert_eq!(
        routes(preview),
        vec![
            route("/pets", "GET", "existing"),
            route("/pets", "POST", "new"),
            route("/pets/{id}", "GET", "new"),
        ]
    );
    assert_eq!(preview["operations"][0]["reason"], "endpoint already exists");

    let post = &preview["operations"][1];
    assert_eq!(post["response_status"], 201);
    assert_eq!(post["response_body"], r#"{"id":0,"name":"","tags":[""]}"#);
    assert_eq!(post["response_headers"], r#"{"Location":"/pets/1"}"#);

    // "200" sorts before "404", so the synthesized pet wins over the error example
    let get_one = &preview["operations"][2];
    assert_eq!(get_one["response_status"], 200);
    assert_eq!(get_one["response_body"], r#"{"id":0,"name":"","tags":[""]}"#);

    // Same document as a multipart upload
    let response = client.post_file(&preview_path, PETSTORE).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let multipart_body: Value = response.json().await.unwrap();
    assert_eq!(multipart_body, body);

    // Soft-deleting the existing endpoint makes the operation new again
    let response = client
        .delete(&format!("/endpoints/{}", existing["id"].as_str().unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body: Value = client
        .post_raw(&preview_path, PETSTORE)
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["preview"]["new_count"], 3);
    assert_eq!(body["preview"]["operations"][0]["status"], "new");

    // Commit every previewed operation
    let operations = body["preview"]["operations"].clone();
    let response = client
        .post(
            &format!("/projects/{}/endpoints/bulk", project_id),
            json!({"endpoints": operations.clone()}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["result"]["created"].as_array().unwrap().len(), 3);
    assert!(result["result"]["skipped"].as_array().unwrap().is_empty());

    // Committing again skips everything
    let result: Value = client
        .post(
            &format!("/projects/{}/endpoints/bulk", project_id),
            json!({"endpoints": operations}),
        )
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(result["result"]["created"].as_array().unwrap().is_empty());
    let skipped = result["result"]["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 3);
    assert_eq!(
        skipped[0]["reason"],
        "endpoint with same method and path already exists"
    );

    // The imported endpoints are served under the project code
    let response = anonymous.get(&format!("/mock/{}/pets", code)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    let pets: Value = response.json().await.unwrap();
    assert_eq!(pets, json!([{"id": 1, "name": "Rex"}, {"id": 2, "name": "Tom"}]));

    let response = anonymous
        .post(&format!("/mock/{}/pets", code), json!({"name": "Rex"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["location"], "/pets/1");

    let response = anonymous.get(&format!("/mock/{}/pets/{{id}}", code)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = anonymous.delete(&format!("/mock/{}/pets", code)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_documents_are_rejected() {
    let anonymous = spawn_server().await;
    let (client, project) = setup_project(&anonymous, "dev@example.com").await;
    let preview_path = format!("/projects/{}/openapi/preview", project["id"].as_str().unwrap());

    for document in [
        "openapi: [unclosed",
        "swagger: \"2.0\"\ninfo: {title: t, version: v}\npaths: {}\n",
        "openapi: 3.0.0\ninfo: {title: t, version: v}\npaths:\n  /a:\n    get:\n      responses:\n        \"200\":\n          $ref: \"other.yaml#/components/responses/Ok\"\n",
        "openapi: 3.0.0\ninfo: {title: t, version: v}\npaths:\n  /a:\n    get:\n      responses: {}\n",
        "openapi: 3.0.0\ninfo: {title: t, version: v}\npaths:\n  /a/{id}:\n    get:\n      responses:\n        \"200\": {description: ok}\n",
    ] {
        let response = client.post_raw(&preview_path, document).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid openapi document"));
    }

    let response = client
        .post(
            &format!("/projects/{}/endpoints/bulk", project["id"].as_str().unwrap()),
            json!({"endpoints": []}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "no endpoints provided");
}

#[tokio::test]
async fn test_actor_and_project_access() {
    let anonymous = spawn_server().await;
    let (client, project) = setup_project(&anonymous, "owner@example.com").await;
    let project_id = project["id"].as_str().unwrap();
    let preview_path = format!("/projects/{}/openapi/preview", project_id);

    // No header at all
    let response = anonymous.post_raw(&preview_path, PETSTORE).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A header naming no user
    let response = anonymous
        .as_user("ghost")
        .post_raw(&preview_path, PETSTORE)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A real user outside the project's organisation
    let (outsider, _) = setup_project(&anonymous, "outsider@example.com").await;
    let response = outsider.post_raw(&preview_path, PETSTORE).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting the project removes its mock routes
    let response = client
        .post(
            &format!("/projects/{}/endpoints", project_id),
            json!({"method": "GET", "path": "/ping", "response_body": "\"pong\""}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let code = project["code"].as_str().unwrap();
    let response = anonymous.get(&format!("/mock/{}/ping", code)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "\"pong\"");

    let response = client.delete(&format!("/projects/{}", project_id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = anonymous.get(&format!("/mock/{}/ping", code)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "project not found");

    // Duplicate registration
    let response = anonymous
        .post("/users", json!({"email": "OWNER@example.com"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
