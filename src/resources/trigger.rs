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

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, RawValue};

use crate::client::Endpoint;
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::upgrade;
use crate::utils::{
    attribute, id_attribute, id_value, string, string_value, url_attribute, WithUnknown,
};
use crate::validation::{
    validate_actions, validate_conditions, ActionSpec, ConditionsSpec, ResourceKind,
};

use super::rules::{
    actions_attribute, actions_from_api, actions_to_api, conditions_attribute,
    conditions_from_api, conditions_to_api, ActionApi, ConditionsApi,
};

/// Business rule run on ticket creation and update
#[derive(Debug, Clone, Copy, Default)]
pub struct Trigger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TriggerState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub title: ValueString<'a>,
    pub description: ValueString<'a>,
    pub active: ValueBool,
    pub position: ValueNumber,
    pub category_id: ValueString<'a>,
    pub conditions: Value<ConditionsSpec<'a>>,
    pub actions: ValueList<Value<ActionSpec<'a>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TriggerApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub conditions: ConditionsApi,
    pub actions: Vec<ActionApi>,
}

impl Endpoint for TriggerApi {
    const COLLECTION: &'static str = "triggers";
    const KEY: &'static str = "trigger";
}

impl<'a> ApiModel for TriggerState<'a> {
    type Api = TriggerApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<TriggerApi> {
        Some(TriggerApi {
            title: string(&self.title).unwrap_or_default(),
            description: string(&self.description),
            active: self.active.as_ref_option().copied(),
            position: self.position.as_ref_option().copied(),
            category_id: string(&self.category_id),
            conditions: conditions_to_api(&self.conditions),
            actions: actions_to_api(&self.actions),
            ..Default::default()
        })
    }

    fn from_response(self, response: TriggerApi) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            title: string_value(Some(response.title)),
            // Zendesk answers "" for a missing description
            description: match response.description {
                Some(description) if description.is_empty() && self.description.is_null() => {
                    Value::Null
                }
                description => string_value(description),
            },
            active: response.active.into(),
            position: response.position.into(),
            category_id: string_value(response.category_id),
            conditions: conditions_from_api(&self.conditions, response.conditions),
            actions: actions_from_api(&self.actions, response.actions),
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref_option()
    }

    fn with_id(id: String) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl ZendeskObject for Trigger {
    const NAME: &'static str = "trigger";
    type Api = TriggerApi;
    type State<'a> = TriggerState<'a>;

    fn schema(&self) -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => id_attribute(),
                    "url" => url_attribute(),
                    "title" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Title of the trigger",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the trigger",
                    ),
                    "active" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether the trigger runs",
                    ),
                    "position" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::OptionalComputed,
                        "Position of the trigger within its category",
                    ),
                    "category_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::OptionalComputed,
                        "Id of the trigger category",
                    ),
                    "conditions" => conditions_attribute(
                        "Conditions checked on ticket creation and update",
                    ),
                    "actions" => actions_attribute(),
                },
                description: Description::plain("Zendesk trigger"),
                ..Default::default()
            },
        }
    }

    fn validate<'a>(&self, diags: &mut Diagnostics, config: &TriggerState<'a>) {
        validate_conditions(
            diags,
            ResourceKind::Trigger,
            &config.conditions,
            AttributePath::new("conditions"),
        );
        validate_actions(
            diags,
            ResourceKind::Trigger,
            &config.actions,
            AttributePath::new("actions"),
        );
    }

    fn plan_create<'a>(&self, state: &mut TriggerState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.active.unknown_if_null();
        state.position.unknown_if_null();
        state.category_id.unknown_if_null();
    }

    fn upgrade<'a>(
        &self,
        diags: &mut Diagnostics,
        version: i64,
        prior_state: &RawValue,
    ) -> Option<TriggerState<'a>> {
        if version != 0 {
            return upgrade::unsupported(diags, Self::NAME, version);
        }
        let state = upgrade::upgrade_conditions(diags, prior_state, "conditions")?;
        upgrade::decode(diags, state)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tf_provider::value::{Value, ValueString};
    use tf_provider::{Diagnostics, RawValue};

    use super::{Trigger, TriggerApi, TriggerState};
    use crate::crud::ApiModel;
    use crate::resource::ZendeskObject;

    #[test]
    fn empty_description_stays_null() {
        let response: TriggerApi = serde_json::from_value(json!({
            "id": 10,
            "title": "Notify requester",
            "description": "",
            "active": true,
            "position": 3,
            "category_id": "10026",
            "conditions": {"all": [], "any": []},
            "actions": [],
        }))
        .unwrap();
        let state = TriggerState::default().from_response(response);
        assert_eq!(state.id, ValueString::from("10"));
        assert!(state.description.is_null());
        assert_eq!(state.category_id, ValueString::from("10026"));
        assert_eq!(state.position, Value::Value(3));
    }

    #[test]
    fn upgrade_from_version_0() {
        let prior = RawValue::Json(
            serde_json::to_vec(&json!({
                "id": "10",
                "url": null,
                "title": "Notify requester",
                "description": null,
                "active": true,
                "position": 1,
                "category_id": "10026",
                "conditions": {
                    "all": [{"field": "update_type", "operator": null, "value": "Create"}],
                    "any": [],
                },
                "actions": [{
                    "field": "status",
                    "value": "open",
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
        let state = Trigger.upgrade(&mut diags, 0, &prior).unwrap();
        assert!(diags.errors.is_empty());
        let Value::Value(conditions) = &state.conditions else {
            panic!("conditions should be set");
        };
        let all = conditions.all.as_ref_option().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(
            all[0].as_ref_option().unwrap().value,
            ValueString::from("Create")
        );
        assert!(all[0].as_ref_option().unwrap().values.is_null());

        assert!(Trigger.upgrade(&mut diags, 3, &prior).is_none());
    }
}
