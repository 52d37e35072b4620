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

//! Generic create, read, update, delete and import of Zendesk objects
//!
//! Each operation converts the Terraform state into an API request, calls the API,
//! and converts the response back. On failure, a diagnostic is reported and no
//! state is returned.

use std::future::Future;

use anyhow::Result;
use tf_provider::value::Value;
use tf_provider::Diagnostics;
use tracing::{info, warn};

/// Terraform state of a Zendesk object
pub trait ApiModel: Sized + Send {
    type Api: Send;

    /// Build the API request from a planned state
    fn to_request(&self, diags: &mut Diagnostics) -> Option<Self::Api>;

    /// Build the new state from an API response
    ///
    /// `self` is the planned or prior state. It keeps the practitioner's
    /// representation where the API loses it.
    fn from_response(self, response: Self::Api) -> Self;

    fn id(&self) -> Option<&str>;

    /// State of an object being imported
    fn with_id(id: String) -> Self;
}

pub async fn create_resource<M, F, Fut>(
    diags: &mut Diagnostics,
    name: &str,
    planned: M,
    create: F,
) -> Option<M>
where
    M: ApiModel,
    F: FnOnce(M::Api) -> Fut,
    Fut: Future<Output = Result<M::Api>>,
{
    let request = planned.to_request(diags)?;
    match create(request).await {
        Ok(response) => {
            let state = planned.from_response(response);
            info!(resource = name, id = state.id().unwrap_or_default(), "created");
            Some(state)
        }
        Err(err) => {
            diags.root_error(format!("Failed to create {name}"), format!("{err:#}"));
            None
        }
    }
}

/// Refresh a state, yielding null if the object does not exist anymore
pub async fn read_resource<M, F, Fut>(
    diags: &mut Diagnostics,
    name: &str,
    state: M,
    read: F,
) -> Option<Value<M>>
where
    M: ApiModel,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Option<M::Api>>>,
{
    let Some(id) = state.id().map(str::to_owned) else {
        diags.root_error_short(format!("Cannot read {name} without an id"));
        return None;
    };
    match read(id.clone()).await {
        Ok(Some(response)) => Some(Value::Value(state.from_response(response))),
        Ok(None) => {
            warn!(resource = name, %id, "not found, removing from state");
            Some(Value::Null)
        }
        Err(err) => {
            diags.root_error(format!("Failed to read {name}"), format!("{err:#}"));
            None
        }
    }
}

pub async fn update_resource<M, F, Fut>(
    diags: &mut Diagnostics,
    name: &str,
    planned: M,
    update: F,
) -> Option<M>
where
    M: ApiModel,
    F: FnOnce(String, M::Api) -> Fut,
    Fut: Future<Output = Result<M::Api>>,
{
    let Some(id) = planned.id().map(str::to_owned) else {
        diags.root_error_short(format!("Cannot update {name} without an id"));
        return None;
    };
    let request = planned.to_request(diags)?;
    match update(id.clone(), request).await {
        Ok(response) => {
            info!(resource = name, %id, "updated");
            Some(planned.from_response(response))
        }
        Err(err) => {
            diags.root_error(format!("Failed to update {name}"), format!("{err:#}"));
            None
        }
    }
}

pub async fn delete_resource<M, F, Fut>(
    diags: &mut Diagnostics,
    name: &str,
    state: &M,
    delete: F,
) -> Option<()>
where
    M: ApiModel,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let Some(id) = state.id().map(str::to_owned) else {
        // Nothing was created
        return Some(());
    };
    match delete(id.clone()).await {
        Ok(()) => {
            info!(resource = name, %id, "deleted");
            Some(())
        }
        Err(err) => {
            diags.root_error(format!("Failed to delete {name}"), format!("{err:#}"));
            None
        }
    }
}

pub async fn import_resource<M, F, Fut>(
    diags: &mut Diagnostics,
    name: &str,
    id: String,
    read: F,
) -> Option<M>
where
    M: ApiModel,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Option<M::Api>>>,
{
    match read_resource(diags, name, M::with_id(id.clone()), read).await? {
        Value::Value(state) => Some(state),
        _ => {
            diags.root_error(
                format!("Cannot import {name}"),
                format!("{name} `{id}` does not exist"),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::anyhow;
    use tf_provider::value::Value;
    use tf_provider::Diagnostics;

    use super::{
        create_resource, delete_resource, import_resource, read_resource, update_resource,
        ApiModel,
    };

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Named {
        id: Option<String>,
        name: String,
    }

    impl ApiModel for Named {
        type Api = (u32, String);

        fn to_request(&self, diags: &mut Diagnostics) -> Option<Self::Api> {
            if self.name.is_empty() {
                diags.root_error_short("empty name");
                return None;
            }
            Some((0, self.name.clone()))
        }
        fn from_response(self, response: Self::Api) -> Self {
            Self {
                id: Some(response.0.to_string()),
                name: response.1,
            }
        }
        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }
        fn with_id(id: String) -> Self {
            Self {
                id: Some(id),
                ..Default::default()
            }
        }
    }

    fn named(id: Option<&str>, name: &str) -> Named {
        Named {
            id: id.map(str::to_owned),
            name: name.to_owned(),
        }
    }

    #[tokio::test]
    async fn create_writes_the_response() {
        let mut diags = Diagnostics::default();
        let state = create_resource(
            &mut diags,
            "group",
            named(None, "Tier 1"),
            |request| async move { Ok::<_, anyhow::Error>((12, request.1)) },
        )
        .await;
        assert_eq!(state, Some(named(Some("12"), "Tier 1")));
    }

    #[tokio::test]
    async fn failed_create_writes_nothing() {
        let mut diags = Diagnostics::default();
        let state = create_resource(&mut diags, "group", named(None, "Tier 1"), |_| async {
            Err::<_, anyhow::Error>(anyhow!("422 Unprocessable Entity"))
        })
        .await;
        assert_eq!(state, None);
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].summary, "Failed to create group");
        assert!(diags.errors[0].detail.contains("422"));
    }

    #[tokio::test]
    async fn invalid_request_is_not_sent() {
        let mut diags = Diagnostics::default();
        let called = AtomicBool::new(false);
        let state = create_resource(&mut diags, "group", named(None, ""), |request| {
            called.store(true, Ordering::Relaxed);
            async move { Ok::<_, anyhow::Error>(request) }
        })
        .await;
        assert_eq!(state, None);
        assert!(!called.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn read_of_missing_object_is_null() {
        let mut diags = Diagnostics::default();
        let state = read_resource(&mut diags, "group", named(Some("3"), "Old"), |_| async {
            Ok::<_, anyhow::Error>(None)
        })
        .await;
        assert_eq!(state, Some(Value::Null));
        assert!(diags.errors.is_empty());

        let state = read_resource(&mut diags, "group", named(Some("3"), "Old"), |id| async move {
            Ok::<_, anyhow::Error>(Some((id.parse::<u32>().unwrap(), "New".to_owned())))
        })
        .await;
        assert_eq!(state, Some(Value::Value(named(Some("3"), "New"))));
    }

    #[tokio::test]
    async fn update_uses_the_planned_id() {
        let mut diags = Diagnostics::default();
        let state = update_resource(
            &mut diags,
            "group",
            named(Some("8"), "Renamed"),
            |id, request| async move {
                assert_eq!(id, "8");
                Ok::<_, anyhow::Error>((8, request.1))
            },
        )
        .await;
        assert_eq!(state, Some(named(Some("8"), "Renamed")));

        let state = update_resource(&mut diags, "group", named(Some("8"), "Renamed"), |_, _| async {
            Err::<_, anyhow::Error>(anyhow!("boom"))
        })
        .await;
        assert_eq!(state, None);
        assert_eq!(diags.errors[0].summary, "Failed to update group");
    }

    #[tokio::test]
    async fn delete_without_id_is_a_no_op() {
        let mut diags = Diagnostics::default();
        let result = delete_resource(&mut diags, "group", &named(None, "x"), |_| async {
            Err::<_, anyhow::Error>(anyhow!("must not be called"))
        })
        .await;
        assert_eq!(result, Some(()));
    }

    #[tokio::test]
    async fn import_missing_object_fails() {
        let mut diags = Diagnostics::default();
        let state: Option<Named> = import_resource(&mut diags, "group", "404".into(), |_| async {
            Ok::<_, anyhow::Error>(None)
        })
        .await;
        assert_eq!(state, None);
        assert_eq!(diags.errors.len(), 1);

        let mut diags = Diagnostics::default();
        let state: Option<Named> = import_resource(&mut diags, "group", "5".into(), |_| async {
            Ok::<_, anyhow::Error>(Some((5, "Imported".to_owned())))
        })
        .await;
        assert_eq!(state, Some(named(Some("5"), "Imported")));
    }
}
