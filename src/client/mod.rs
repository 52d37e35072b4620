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

//! Zendesk REST client
//!
//! Resources talk to Zendesk through the object-safe [`ZendeskApi`] trait,
//! using the typed helpers of [`endpoint`]. [`HttpClient`] is the network implementation.

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tf_provider::Diagnostics;
use tokio::sync::RwLock;

pub mod endpoint;
#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use endpoint::Endpoint;
pub use http::HttpClient;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{method} {path}: not found")]
    NotFound { method: String, path: String },
    #[error("{method} {path}: status {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },
    #[error("{path}: response has no `{key}` object")]
    MissingKey { path: String, key: &'static str },
}

impl ApiError {
    /// Check if an error comes from a 404 answer
    pub fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound { .. }))
    }
}

/// JSON verbs of the Zendesk API
///
/// Paths are absolute, eg: `/api/v2/groups/42.json`.
/// A successful answer with an empty body is returned as `null`.
#[async_trait]
pub trait ZendeskApi: Send + Sync {
    async fn get(&self, path: &str) -> Result<JsonValue>;
    async fn get_query(&self, path: &str, query: &[(&str, &str)]) -> Result<JsonValue>;
    async fn post(&self, path: &str, body: JsonValue) -> Result<JsonValue>;
    async fn put(&self, path: &str, body: JsonValue) -> Result<JsonValue>;
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Client shared between the provider and all its resources
///
/// It is empty until the provider is configured.
#[derive(Clone, Default)]
pub struct SharedClient {
    inner: Arc<RwLock<Option<Arc<dyn ZendeskApi>>>>,
}

impl SharedClient {
    pub fn new(client: Arc<dyn ZendeskApi>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(client))),
        }
    }

    pub async fn set(&self, client: Arc<dyn ZendeskApi>) {
        *self.inner.write().await = Some(client);
    }

    pub async fn get(&self, diags: &mut Diagnostics) -> Option<Arc<dyn ZendeskApi>> {
        let client = self.inner.read().await.clone();
        if client.is_none() {
            diags.root_error(
                "Zendesk provider is not configured",
                "The provider must be configured before managing Zendesk objects",
            );
        }
        client
    }
}

impl Debug for SharedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedClient").finish_non_exhaustive()
    }
}
