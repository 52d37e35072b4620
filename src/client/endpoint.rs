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

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::{ApiError, ZendeskApi};

/// Zendesk object exposed as a REST collection
pub trait Endpoint: Serialize + DeserializeOwned + Send + Sync {
    /// Collection below `/api/v2`, eg: `slas/policies`
    const COLLECTION: &'static str;
    /// Key wrapping a single object in requests and responses, eg: `sla_policy`
    const KEY: &'static str;

    fn collection_path() -> String {
        format!("/api/v2/{}.json", Self::COLLECTION)
    }

    fn item_path(id: &str) -> String {
        format!("/api/v2/{}/{}.json", Self::COLLECTION, id)
    }
}

pub fn wrap<E: Endpoint>(item: &E) -> Result<JsonValue> {
    let mut body = Map::new();
    body.insert(E::KEY.to_owned(), serde_json::to_value(item)?);
    Ok(JsonValue::Object(body))
}

pub fn unwrap<E: Endpoint>(path: &str, mut body: JsonValue) -> Result<E> {
    match body.get_mut(E::KEY) {
        Some(item) => Ok(serde_json::from_value(item.take())?),
        None => Err(ApiError::MissingKey {
            path: path.to_owned(),
            key: E::KEY,
        }
        .into()),
    }
}

pub async fn create<E: Endpoint>(api: &dyn ZendeskApi, item: E) -> Result<E> {
    let path = E::collection_path();
    let response = api.post(&path, wrap(&item)?).await?;
    unwrap(&path, response)
}

/// Get an object, or `None` if it does not exist anymore
pub async fn fetch<E: Endpoint>(api: &dyn ZendeskApi, id: &str) -> Result<Option<E>> {
    let path = E::item_path(id);
    match api.get(&path).await {
        Ok(response) => Ok(Some(unwrap(&path, response)?)),
        Err(err) if ApiError::is_not_found(&err) => Ok(None),
        Err(err) => Err(err),
    }
}

pub async fn update<E: Endpoint>(api: &dyn ZendeskApi, id: &str, item: E) -> Result<E> {
    let path = E::item_path(id);
    let response = api.put(&path, wrap(&item)?).await?;
    if response.is_null() {
        // Some endpoints answer `204 No Content`
        let response = api.get(&path).await?;
        unwrap(&path, response)
    } else {
        unwrap(&path, response)
    }
}

/// Delete an object, succeeding if it is already gone
pub async fn delete<E: Endpoint>(api: &dyn ZendeskApi, id: &str) -> Result<()> {
    match api.delete(&E::item_path(id)).await {
        Err(err) if ApiError::is_not_found(&err) => Ok(()),
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::{unwrap, wrap, Endpoint};
    use crate::client::ApiError;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Policy {
        title: String,
    }

    impl Endpoint for Policy {
        const COLLECTION: &'static str = "slas/policies";
        const KEY: &'static str = "sla_policy";
    }

    #[test]
    fn paths() {
        assert_eq!(Policy::collection_path(), "/api/v2/slas/policies.json");
        assert_eq!(Policy::item_path("12"), "/api/v2/slas/policies/12.json");
    }

    #[test]
    fn wrapping() {
        let policy = Policy {
            title: "Urgent".into(),
        };
        let body = wrap(&policy).unwrap();
        assert_eq!(body, json!({"sla_policy": {"title": "Urgent"}}));
        assert_eq!(unwrap::<Policy>("/", body).unwrap(), policy);
    }

    #[test]
    fn missing_key() {
        let err =
            unwrap::<Policy>("/api/v2/slas/policies.json", json!({"error": "x"})).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::MissingKey { key: "sla_policy", .. })
        ));
    }
}
