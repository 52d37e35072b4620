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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{AttributePath, Diagnostics, RawValue, Resource};

use crate::client::{endpoint, Endpoint, SharedClient, ZendeskApi};
use crate::crud::{self, ApiModel};
use crate::upgrade;

/// Kind of Zendesk object managed by a [`ZendeskResource`]
#[async_trait]
pub trait ZendeskObject: Debug + Send + Sync + 'static {
    /// Name used in diagnostics and logs
    const NAME: &'static str;

    type Api: Endpoint;
    type State<'a>: ApiModel<Api = Self::Api>
        + Serialize
        + for<'de> Deserialize<'de>
        + Debug
        + Clone
        + Default
        + Send
        + Sync;

    fn schema(&self) -> Schema;

    fn validate<'a>(&self, diags: &mut Diagnostics, config: &Self::State<'a>) {
        _ = (diags, config);
    }

    /// Mark computed attributes unknown before creation
    fn plan_create<'a>(&self, state: &mut Self::State<'a>);

    /// Mark computed attributes unknown before an update
    fn plan_update<'a>(&self, state: &mut Self::State<'a>) {
        _ = state;
    }

    /// Attributes whose change forces a replacement
    fn requires_replace<'a>(
        &self,
        prior: &Self::State<'a>,
        proposed: &Self::State<'a>,
    ) -> Vec<AttributePath> {
        _ = (prior, proposed);
        Vec::new()
    }

    /// Follow-up calls after the object has been created
    ///
    /// The object exists at this point: failures are reported in `diags`
    /// and the returned state must still identify it.
    async fn after_create<'a>(
        &self,
        diags: &mut Diagnostics,
        api: &dyn ZendeskApi,
        planned: &Self::State<'a>,
        state: Self::State<'a>,
    ) -> Self::State<'a> {
        _ = (diags, api, planned);
        state
    }

    /// Follow-up calls after the object has been updated
    async fn after_update<'a>(
        &self,
        diags: &mut Diagnostics,
        api: &dyn ZendeskApi,
        prior: &Self::State<'a>,
        planned: &Self::State<'a>,
        state: Self::State<'a>,
    ) -> Self::State<'a> {
        _ = (diags, api, prior, planned);
        state
    }

    /// Upgrade a state written with a previous schema version
    fn upgrade<'a>(
        &self,
        diags: &mut Diagnostics,
        version: i64,
        prior_state: &RawValue,
    ) -> Option<Self::State<'a>> {
        _ = prior_state;
        upgrade::unsupported(diags, Self::NAME, version)
    }
}

/// Terraform resource managing one kind of Zendesk object
#[derive(Debug)]
pub struct ZendeskResource<T: ZendeskObject> {
    object: T,
    client: SharedClient,
}

impl<T: ZendeskObject> ZendeskResource<T> {
    pub fn new(object: T, client: SharedClient) -> Self {
        Self { object, client }
    }
}

#[async_trait]
impl<T: ZendeskObject> Resource for ZendeskResource<T> {
    type State<'a> = Value<T::State<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(self.object.schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Value::Value(config) = &config {
            self.object.validate(diags, config);
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(state) = state else {
            return Some((state, private_state));
        };
        let api = self.client.get(diags).await?;
        let client = api.as_ref();

        let state = crud::read_resource(diags, T::NAME, state, move |id| async move {
            endpoint::fetch::<T::Api>(client, &id).await
        })
        .await?;
        Some((state, private_state))
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        if let Value::Value(state) = &mut state {
            self.object.plan_create(state);
        }
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let mut state = proposed_state;
        let trigger_replace = match (&prior_state, &mut state) {
            (Value::Value(prior), Value::Value(proposed)) => {
                self.object.plan_update(proposed);
                self.object.requires_replace(prior, proposed)
            }
            _ => Vec::new(),
        };
        Some((state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(planned) = planned_state else {
            diags.root_error_short(format!("Cannot create a null {}", T::NAME));
            return None;
        };
        let api = self.client.get(diags).await?;
        let client = api.as_ref();

        let state = crud::create_resource(diags, T::NAME, planned.clone(), |request| {
            endpoint::create(client, request)
        })
        .await?;
        let state = self
            .object
            .after_create(diags, client, &planned, state)
            .await;
        Some((Value::Value(state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (Value::Value(prior), Value::Value(planned)) = (prior_state, planned_state) else {
            diags.root_error_short(format!("Cannot update a null {}", T::NAME));
            return None;
        };
        let api = self.client.get(diags).await?;
        let client = api.as_ref();

        let state = crud::update_resource(
            diags,
            T::NAME,
            planned.clone(),
            move |id, request| async move { endpoint::update(client, &id, request).await },
        )
        .await?;
        let state = self
            .object
            .after_update(diags, client, &prior, &planned, state)
            .await;
        Some((Value::Value(state), planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let Value::Value(state) = prior_state else {
            return Some(());
        };
        let api = self.client.get(diags).await?;
        let client = api.as_ref();

        crud::delete_resource(diags, T::NAME, &state, move |id| async move {
            endpoint::delete::<T::Api>(client, &id).await
        })
        .await
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let api = self.client.get(diags).await?;
        let client = api.as_ref();

        let state: T::State<'a> = crud::import_resource(diags, T::NAME, id, move |id| async move {
            endpoint::fetch::<T::Api>(client, &id).await
        })
        .await?;
        Some((Value::Value(state), Default::default()))
    }

    async fn upgrade<'a>(
        &self,
        diags: &mut Diagnostics,
        version: i64,
        prior_state: RawValue,
    ) -> Option<Self::State<'a>> {
        self.object
            .upgrade(diags, version, &prior_state)
            .map(Value::Value)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::sync::Arc;

    use serde_json::json;
    use tf_provider::value::{Value, ValueEmpty, ValueString};
    use tf_provider::{Diagnostics, RawValue, Resource};

    use super::{ZendeskObject, ZendeskResource};
    use crate::client::fake::{FakeApi, Method};
    use crate::client::SharedClient;
    use crate::resources::group::GroupState;
    use crate::resources::webhook::WebhookState;
    use crate::resources::{Group, Trigger, Webhook};

    fn resource<T: ZendeskObject>(object: T, api: FakeApi) -> (ZendeskResource<T>, Arc<FakeApi>) {
        _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let api = Arc::new(api);
        let resource = ZendeskResource::new(object, SharedClient::new(api.clone()));
        (resource, api)
    }

    fn group(id: Option<&str>, name: &str) -> Value<GroupState<'static>> {
        Value::Value(GroupState {
            id: id.map(|id| Cow::Owned(id.to_owned())).into(),
            name: ValueString::from(name.to_owned()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn read_of_a_deleted_object_is_null() {
        let (resource, _) = resource(
            Group,
            FakeApi::new().fail(Method::Get, "/api/v2/groups/7.json", 404),
        );
        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .read(&mut diags, group(Some("7"), "Support"), ValueEmpty::Null, ValueEmpty::Null)
            .await
            .unwrap();
        assert!(state.is_null());
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn failed_create_writes_no_state() {
        let (resource, _) = resource(
            Group,
            FakeApi::new().fail(Method::Post, "/api/v2/groups.json", 422),
        );
        let mut diags = Diagnostics::default();
        let created = resource
            .create(
                &mut diags,
                group(None, "Support"),
                group(None, "Support"),
                ValueEmpty::Null,
                ValueEmpty::Null,
            )
            .await;
        assert!(created.is_none());
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].summary, "Failed to create group");
    }

    #[tokio::test]
    async fn create_sends_the_wrapped_object() {
        let (resource, api) = resource(
            Group,
            FakeApi::new().answer(
                Method::Post,
                "/api/v2/groups.json",
                json!({"group": {
                    "id": 7,
                    "name": "Support",
                    "description": "",
                    "default": false,
                    "is_public": true,
                }}),
            ),
        );
        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .create(
                &mut diags,
                group(None, "Support"),
                group(None, "Support"),
                ValueEmpty::Null,
                ValueEmpty::Null,
            )
            .await
            .unwrap();
        let state = state.as_ref_option().unwrap();
        assert_eq!(state.id.as_str(), "7");
        assert!(state.description.is_null());
        assert_eq!(state.is_public, Value::Value(true));
        assert_eq!(
            api.calls()[0].2,
            Some(json!({"group": {"name": "Support", "description": null}}))
        );
    }

    #[tokio::test]
    async fn update_without_body_reads_the_object_back() {
        let (resource, api) = resource(
            Group,
            FakeApi::new()
                .answer(Method::Put, "/api/v2/groups/7.json", serde_json::Value::Null)
                .answer(
                    Method::Get,
                    "/api/v2/groups/7.json",
                    json!({"group": {"id": 7, "name": "Tier 2"}}),
                ),
        );
        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .update(
                &mut diags,
                group(Some("7"), "Support"),
                group(Some("7"), "Tier 2"),
                group(Some("7"), "Tier 2"),
                ValueEmpty::Null,
                ValueEmpty::Null,
            )
            .await
            .unwrap();
        assert_eq!(state.as_ref_option().unwrap().name.as_str(), "Tier 2");
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn destroy_of_a_missing_object_succeeds() {
        let (resource, _) = resource(
            Group,
            FakeApi::new().fail(Method::Delete, "/api/v2/groups/7.json", 404),
        );
        let mut diags = Diagnostics::default();
        let destroyed = resource
            .destroy(
                &mut diags,
                group(Some("7"), "Support"),
                ValueEmpty::Null,
                ValueEmpty::Null,
            )
            .await;
        assert_eq!(destroyed, Some(()));
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn webhook_creation_fetches_the_signing_secret() {
        let (resource, api) = resource(
            Webhook,
            FakeApi::new()
                .answer(Method::Post, "/api/v2/webhooks.json", alerts_response())
                .answer(
                    Method::Get,
                    "/api/v2/webhooks/01GDXYD7ZTWYP6ZRXN9SBGP1Y3/signing_secret.json",
                    json!({"signing_secret": {
                        "algorithm": "SHA256",
                        "secret": "dGhpcyBpcyBhIHNlY3JldA==",
                    }}),
                ),
        );
        let planned = alerts_webhook();
        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .create(
                &mut diags,
                planned.clone(),
                planned,
                ValueEmpty::Null,
                ValueEmpty::Null,
            )
            .await
            .unwrap();
        let state = state.as_ref_option().unwrap();
        assert_eq!(state.id.as_str(), "01GDXYD7ZTWYP6ZRXN9SBGP1Y3");
        assert_eq!(state.signing_secret.as_str(), "dGhpcyBpcyBhIHNlY3JldA==");
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn failed_follow_up_keeps_the_created_webhook() {
        let (resource, api) = resource(
            Webhook,
            FakeApi::new()
                .answer(Method::Post, "/api/v2/webhooks.json", alerts_response())
                .fail(
                    Method::Get,
                    "/api/v2/webhooks/01GDXYD7ZTWYP6ZRXN9SBGP1Y3/signing_secret.json",
                    500,
                ),
        );
        let planned = alerts_webhook();
        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .create(
                &mut diags,
                planned.clone(),
                planned,
                ValueEmpty::Null,
                ValueEmpty::Null,
            )
            .await
            .unwrap();
        let state = state.as_ref_option().unwrap();
        assert_eq!(state.id.as_str(), "01GDXYD7ZTWYP6ZRXN9SBGP1Y3");
        assert!(state.signing_secret.is_null());
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(
            diags.errors[0].summary,
            "Failed to fetch the webhook signing secret"
        );
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn version_0_trigger_is_upgraded() {
        let resource = ZendeskResource::new(Trigger, SharedClient::default());
        let prior = RawValue::Json(
            serde_json::to_vec(&json!({
                "id": "10",
                "url": null,
                "title": "Close solved tickets",
                "description": null,
                "active": true,
                "position": 4,
                "category_id": null,
                "all": [{"field": "status", "operator": "is", "value": "solved"}],
                "any": null,
                "actions": [{
                    "field": "status",
                    "value": "closed",
                    "target": null,
                    "custom_field_id": null,
                    "notification_subject": null,
                    "content_type": null,
                    "slack_workspace": null,
                    "slack_channel": null,
                    "slack_title": null,
                }],
            }))
            .unwrap(),
        );
        let mut diags = Diagnostics::default();
        let state = Resource::upgrade(&resource, &mut diags, 0, prior).await;
        assert!(diags.errors.is_empty());
        let state = state.unwrap();
        let state = state.as_ref_option().unwrap();
        assert_eq!(state.title.as_str(), "Close solved tickets");
        let conditions = state.conditions.as_ref_option().unwrap();
        let all = conditions.all.as_ref_option().unwrap();
        assert_eq!(all.len(), 1);
        let status = all[0].as_ref_option().unwrap();
        assert_eq!(status.value.as_str(), "solved");
        assert!(status.custom_field_id.is_null());
        assert!(conditions.any.is_null());
    }

    fn alerts_response() -> serde_json::Value {
        json!({"webhook": {
            "id": "01GDXYD7ZTWYP6ZRXN9SBGP1Y3",
            "name": "Alerts",
            "endpoint": "https://alerts.example.com",
            "http_method": "POST",
            "request_format": "json",
            "status": "active",
            "subscriptions": ["conditional_ticket_events"],
        }})
    }

    fn alerts_webhook() -> Value<WebhookState<'static>> {
        Value::Value(WebhookState {
            name: ValueString::from("Alerts"),
            endpoint: ValueString::from("https://alerts.example.com"),
            http_method: ValueString::from("POST"),
            request_format: ValueString::from("json"),
            status: ValueString::from("active"),
            subscriptions: Value::Value(vec![ValueString::from("conditional_ticket_events")]),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn unconfigured_provider_is_a_diagnostic() {
        let resource = ZendeskResource::new(Group, SharedClient::default());
        let mut diags = Diagnostics::default();
        let imported = resource.import(&mut diags, "7".to_owned()).await;
        assert!(imported.is_none());
        assert_eq!(diags.errors[0].summary, "Zendesk provider is not configured");
    }
}
