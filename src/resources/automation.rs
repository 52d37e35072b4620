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

/// Time based business rule
#[derive(Debug, Clone, Copy, Default)]
pub struct Automation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AutomationState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub title: ValueString<'a>,
    pub active: ValueBool,
    pub position: ValueNumber,
    pub conditions: Value<ConditionsSpec<'a>>,
    pub actions: ValueList<Value<ActionSpec<'a>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AutomationApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    pub conditions: ConditionsApi,
    pub actions: Vec<ActionApi>,
}

impl Endpoint for AutomationApi {
    const COLLECTION: &'static str = "automations";
    const KEY: &'static str = "automation";
}

impl<'a> ApiModel for AutomationState<'a> {
    type Api = AutomationApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<AutomationApi> {
        Some(AutomationApi {
            title: string(&self.title).unwrap_or_default(),
            active: self.active.as_ref_option().copied(),
            position: self.position.as_ref_option().copied(),
            conditions: conditions_to_api(&self.conditions),
            actions: actions_to_api(&self.actions),
            ..Default::default()
        })
    }

    fn from_response(self, response: AutomationApi) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            title: string_value(Some(response.title)),
            active: response.active.into(),
            position: response.position.into(),
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

impl ZendeskObject for Automation {
    const NAME: &'static str = "automation";
    type Api = AutomationApi;
    type State<'a> = AutomationState<'a>;

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
                        "Title of the automation",
                    ),
                    "active" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether the automation runs",
                    ),
                    "position" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::OptionalComputed,
                        "Position of the automation, deciding the order of execution",
                    ),
                    "conditions" => conditions_attribute(
                        "Conditions checked every hour on open tickets",
                    ),
                    "actions" => actions_attribute(),
                },
                description: Description::plain("Zendesk automation"),
                ..Default::default()
            },
        }
    }

    fn validate<'a>(&self, diags: &mut Diagnostics, config: &AutomationState<'a>) {
        validate_conditions(
            diags,
            ResourceKind::Automation,
            &config.conditions,
            AttributePath::new("conditions"),
        );
        validate_actions(
            diags,
            ResourceKind::Automation,
            &config.actions,
            AttributePath::new("actions"),
        );
    }

    fn plan_create<'a>(&self, state: &mut AutomationState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.active.unknown_if_null();
        state.position.unknown_if_null();
    }

    fn upgrade<'a>(
        &self,
        diags: &mut Diagnostics,
        version: i64,
        prior_state: &RawValue,
    ) -> Option<AutomationState<'a>> {
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
    use tf_provider::value::Value;
    use tf_provider::{Diagnostics, RawValue};

    use super::{Automation, AutomationState};
    use crate::resource::ZendeskObject;

    #[test]
    fn version_0_conditions_are_nested() {
        let prior = RawValue::Json(
            serde_json::to_vec(&json!({
                "id": "12",
                "url": "https://example.zendesk.com/api/v2/automations/12.json",
                "title": "Close solved tickets",
                "active": true,
                "position": 3,
                "all": [
                    {"field": "status", "operator": "is", "value": "solved"},
                    {"field": "SOLVED", "operator": "greater_than", "value": "96"}
                ],
                "any": null,
                "actions": null
            }))
            .unwrap(),
        );
        let mut diags = Diagnostics::default();

        let state: AutomationState = Automation.upgrade(&mut diags, 0, &prior).unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(state.title.as_str(), "Close solved tickets");
        assert_eq!(state.position, Value::Value(3));
        let conditions = state.conditions.unwrap();
        let all = conditions.all.unwrap();
        assert_eq!(all.len(), 2);
        let hours = all[1].as_ref_option().unwrap();
        assert_eq!(hours.field.as_str(), "SOLVED");
        assert_eq!(hours.value.as_str(), "96");
        assert!(hours.values.is_null());
        assert!(conditions.any.is_null());
    }

    #[test]
    fn only_version_0_is_upgraded() {
        let prior = RawValue::Json(b"{}".to_vec());
        let mut diags = Diagnostics::default();

        let state: Option<AutomationState> = Automation.upgrade(&mut diags, 4, &prior);

        assert!(state.is_none());
        assert_eq!(diags.errors.len(), 1);
    }
}
