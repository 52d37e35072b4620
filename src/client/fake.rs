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

//! Scripted in-memory implementation of [`ZendeskApi`] for tests

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{ApiError, ZendeskApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn name(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Answer of a scripted call: a JSON body or an HTTP error status
#[derive(Debug, Clone)]
enum Answer {
    Body(JsonValue),
    Status(u16),
}

#[derive(Debug, Default)]
pub struct FakeApi {
    answers: Mutex<HashMap<(Method, String), Answer>>,
    calls: Mutex<Vec<(Method, String, Option<JsonValue>)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, method: Method, path: &str, body: JsonValue) -> Self {
        if let Ok(mut answers) = self.answers.lock() {
            answers.insert((method, path.to_owned()), Answer::Body(body));
        }
        self
    }

    pub fn fail(self, method: Method, path: &str, status: u16) -> Self {
        if let Ok(mut answers) = self.answers.lock() {
            answers.insert((method, path.to_owned()), Answer::Status(status));
        }
        self
    }

    /// Calls received so far, with their bodies
    pub fn calls(&self) -> Vec<(Method, String, Option<JsonValue>)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn call(&self, method: Method, path: &str, body: Option<JsonValue>) -> Result<JsonValue> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((method, path.to_owned(), body));
        }
        let answer = self
            .answers
            .lock()
            .ok()
            .and_then(|answers| answers.get(&(method, path.to_owned())).cloned());
        let error = |status| ApiError::Status {
            method: method.name().to_owned(),
            path: path.to_owned(),
            status,
            body: String::new(),
        };
        match answer {
            Some(Answer::Body(body)) => Ok(body),
            Some(Answer::Status(404)) => Err(ApiError::NotFound {
                method: method.name().to_owned(),
                path: path.to_owned(),
            }
            .into()),
            Some(Answer::Status(status)) => Err(error(status).into()),
            None => Err(error(501).into()),
        }
    }
}

#[async_trait]
impl ZendeskApi for FakeApi {
    async fn get(&self, path: &str) -> Result<JsonValue> {
        self.call(Method::Get, path, None)
    }

    async fn get_query(&self, path: &str, query: &[(&str, &str)]) -> Result<JsonValue> {
        let query: Vec<_> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.call(Method::Get, &format!("{path}?{}", query.join("&")), None)
    }

    async fn post(&self, path: &str, body: JsonValue) -> Result<JsonValue> {
        self.call(Method::Post, path, Some(body))
    }

    async fn put(&self, path: &str, body: JsonValue) -> Result<JsonValue> {
        self.call(Method::Put, path, Some(body))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.call(Method::Delete, path, None).map(drop)
    }
}
