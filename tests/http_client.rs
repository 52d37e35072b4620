// This file is part of the terraform-provider-zendesk project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP client against a mock Zendesk server

use serde_json::json;
use terraform_provider_zendesk::client::{endpoint, ApiError, HttpClient, ZendeskApi};
use terraform_provider_zendesk::resources::group::GroupApi;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTHORIZATION: &str = "Basic YWRtaW5AYWNtZS50ZXN0L3Rva2VuOnMzY3JldA==";

fn client(server: &MockServer) -> HttpClient {
    HttpClient::with_base_url(server.uri(), "admin@acme.test", "s3cret").unwrap()
}

#[tokio::test]
async fn requests_are_authenticated_with_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/groups/7.json"))
        .and(header("authorization", AUTHORIZATION))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"group": {"id": 7, "name": "Support"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let group = endpoint::fetch::<GroupApi>(&client(&server), "7")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.id, Some(7));
    assert_eq!(group.name, "Support");
}

#[tokio::test]
async fn missing_objects_are_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/groups/8.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "RecordNotFound"})))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.get("/api/v2/groups/8.json").await.unwrap_err();
    assert!(ApiError::is_not_found(&err));
    assert!(endpoint::fetch::<GroupApi>(&client, "8").await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_requests_keep_the_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/groups.json"))
        .and(body_json(json!({"group": {"name": "", "description": null}})))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(r#"{"error":"RecordInvalid"}"#),
        )
        .mount(&server)
        .await;

    let err = endpoint::create(&client(&server), GroupApi::default())
        .await
        .unwrap_err();
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Status { status, body, .. }) => {
            assert_eq!(*status, 422);
            assert!(body.contains("RecordInvalid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_answers_are_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/groups/7.json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/webhooks/01GDXYD7.json"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client(&server);
    client.delete("/api/v2/groups/7.json").await.unwrap();
    let answer = client
        .put("/api/v2/webhooks/01GDXYD7.json", json!({"webhook": {"name": "Alerts"}}))
        .await
        .unwrap();
    assert!(answer.is_null());
}

#[tokio::test]
async fn search_query_is_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/search.json"))
        .and(query_param("query", "type:group name:Support"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let answer = client(&server)
        .get_query("/api/v2/search.json", &[("query", "type:group name:Support")])
        .await
        .unwrap();
    assert_eq!(answer["count"], 0);
}
