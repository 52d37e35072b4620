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

use std::fmt::Debug;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value as JsonValue;
use tracing::debug;

use super::{ApiError, ZendeskApi};

/// Zendesk API over HTTPS, authenticated with an API token
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    api_token: String,
}

impl HttpClient {
    pub fn new(subdomain: &str, username: &str, api_token: &str) -> Result<Self> {
        Self::with_base_url(
            format!("https://{subdomain}.zendesk.com"),
            username,
            api_token,
        )
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            username: username.into(),
            api_token: api_token.into(),
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<JsonValue>,
    ) -> Result<JsonValue> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "zendesk request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .basic_auth(format!("{}/token", self.username), Some(&self.api_token));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%method, %url, status = status.as_u16(), "zendesk response");

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                method: method.to_string(),
                path: path.to_owned(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.to_string(),
                path: path.to_owned(),
                status: status.as_u16(),
                body: text,
            }
            .into());
        }
        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ZendeskApi for HttpClient {
    async fn get(&self, path: &str) -> Result<JsonValue> {
        self.send(Method::GET, path, &[], None).await
    }
    async fn get_query(&self, path: &str, query: &[(&str, &str)]) -> Result<JsonValue> {
        self.send(Method::GET, path, query, None).await
    }
    async fn post(&self, path: &str, body: JsonValue) -> Result<JsonValue> {
        self.send(Method::POST, path, &[], Some(body)).await
    }
    async fn put(&self, path: &str, body: JsonValue) -> Result<JsonValue> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }
    async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }
}

impl Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
