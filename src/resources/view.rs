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
use serde_json::Value as JsonValue;
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, RawValue};

use crate::client::Endpoint;
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::upgrade;
use crate::utils::{
    attribute, id_attribute, id_value, string, string_list, string_value, strings, url_attribute,
    WithUnknown,
};
use crate::validation::{validate_conditions, ConditionsSpec, ResourceKind};

use super::rules::{
    conditions_attribute, conditions_from_api, conditions_to_api, ConditionApi, ConditionsApi,
};

/// Filtered list of tickets
#[derive(Debug, Clone, Copy, Default)]
pub struct View;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub title: ValueString<'a>,
    pub description: ValueString<'a>,
    pub active: ValueBool,
    pub position: ValueNumber,
    pub conditions: Value<ConditionsSpec<'a>>,
    pub columns: ValueList<ValueString<'a>>,
    pub group_by: ValueString<'a>,
    pub group_order: ValueString<'a>,
    pub sort_by: ValueString<'a>,
    pub sort_order: ValueString<'a>,
}

/// Views are written with top-level `all`, `any` and `output`,
/// and read back with `conditions` and `execution`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewApi {
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
    pub all: Vec<ConditionApi>,
    pub any: Vec<ConditionApi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<ViewOutput>,
    #[serde(skip_serializing)]
    pub conditions: ConditionsApi,
    #[serde(skip_serializing)]
    pub execution: ViewExecution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewOutput {
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewExecution {
    pub columns: Vec<ViewColumn>,
    pub group_by: Option<String>,
    pub group_order: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewColumn {
    /// Name of a system column, or id of a custom field
    pub id: JsonValue,
    pub title: Option<String>,
}

impl ViewColumn {
    fn key(&self) -> String {
        match &self.id {
            JsonValue::String(id) => id.clone(),
            id => id.to_string(),
        }
    }
}

impl Endpoint for ViewApi {
    const COLLECTION: &'static str = "views";
    const KEY: &'static str = "view";
}

impl<'a> ApiModel for ViewState<'a> {
    type Api = ViewApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<ViewApi> {
        let conditions = conditions_to_api(&self.conditions);
        Some(ViewApi {
            title: string(&self.title).unwrap_or_default(),
            description: string(&self.description),
            active: self.active.as_ref_option().copied(),
            position: self.position.as_ref_option().copied(),
            all: conditions.all,
            any: conditions.any,
            output: Some(ViewOutput {
                columns: strings(&self.columns).unwrap_or_default(),
                group_by: string(&self.group_by),
                group_order: string(&self.group_order),
                sort_by: string(&self.sort_by),
                sort_order: string(&self.sort_order),
            }),
            ..Default::default()
        })
    }

    fn from_response(self, response: ViewApi) -> Self {
        let execution = response.execution;
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            title: string_value(Some(response.title)),
            description: string_value(response.description.filter(|d| !d.is_empty())),
            active: response.active.into(),
            position: response.position.into(),
            conditions: conditions_from_api(&self.conditions, response.conditions),
            columns: string_list(
                &self.columns,
                execution.columns.iter().map(ViewColumn::key).collect(),
            ),
            group_by: string_value(execution.group_by),
            group_order: string_value(execution.group_order),
            sort_by: string_value(execution.sort_by),
            sort_order: string_value(execution.sort_order),
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

impl ZendeskObject for View {
    const NAME: &'static str = "view";
    type Api = ViewApi;
    type State<'a> = ViewState<'a>;

    fn schema(&self) -> Schema {
        let computed_string = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::OptionalComputed,
                description,
            )
        };
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
                        "Title of the view",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the view",
                    ),
                    "active" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether the view is shown to agents",
                    ),
                    "position" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::OptionalComputed,
                        "Position of the view in the list of views",
                    ),
                    "conditions" => conditions_attribute(
                        "Conditions of the tickets shown in the view",
                    ),
                    "columns" => attribute(
                        AttributeType::List(AttributeType::String.into()),
                        AttributeConstraint::OptionalComputed,
                        "Columns shown: system column names or custom field ids",
                    ),
                    "group_by" => computed_string("Column grouping the tickets"),
                    "group_order" => computed_string("Order of the groups: `asc` or `desc`"),
                    "sort_by" => computed_string("Column sorting the tickets"),
                    "sort_order" => computed_string("Order of the tickets: `asc` or `desc`"),
                },
                description: Description::plain("Zendesk view"),
                ..Default::default()
            },
        }
    }

    fn validate<'a>(&self, diags: &mut Diagnostics, config: &ViewState<'a>) {
        validate_conditions(
            diags,
            ResourceKind::View,
            &config.conditions,
            AttributePath::new("conditions"),
        );
    }

    fn plan_create<'a>(&self, state: &mut ViewState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.active.unknown_if_null();
        state.position.unknown_if_null();
        state.columns.unknown_if_null();
        state.group_by.unknown_if_null();
        state.group_order.unknown_if_null();
        state.sort_by.unknown_if_null();
        state.sort_order.unknown_if_null();
    }

    fn upgrade<'a>(
        &self,
        diags: &mut Diagnostics,
        version: i64,
        prior_state: &RawValue,
    ) -> Option<ViewState<'a>> {
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

    use super::{View, ViewApi, ViewState};
    use crate::client::endpoint;
    use crate::crud::ApiModel;
    use crate::resource::ZendeskObject;
    use crate::validation::{ConditionSpec, ConditionsSpec};

    fn planned() -> ViewState<'static> {
        ViewState {
            title: ValueString::from("Open tickets"),
            conditions: Value::Value(ConditionsSpec {
                all: Value::Value(vec![Value::Value(ConditionSpec {
                    field: ValueString::from("status"),
                    operator: ValueString::from("less_than"),
                    value: ValueString::from("solved"),
                    ..Default::default()
                })]),
                any: Value::Null,
            }),
            columns: Value::Value(vec!["subject".into(), "requester".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn request_uses_top_level_conditions() {
        let request = planned().to_request(&mut Diagnostics::default()).unwrap();
        let body = endpoint::wrap(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "view": {
                    "title": "Open tickets",
                    "description": null,
                    "all": [{"field": "status", "operator": "less_than", "value": "solved"}],
                    "any": [],
                    "output": {"columns": ["subject", "requester"]},
                }
            })
        );
    }

    #[test]
    fn response_uses_execution() {
        let response: ViewApi = serde_json::from_value(json!({
            "id": 25,
            "title": "Open tickets",
            "description": "",
            "active": true,
            "position": 0,
            "conditions": {
                "all": [{"field": "status", "operator": "less_than", "value": "solved"}],
                "any": [],
            },
            "execution": {
                "columns": [{"id": "subject", "title": "Subject"}, {"id": 360001, "title": "Plan"}],
                "group_by": "status",
                "group_order": "asc",
                "sort_by": "created",
                "sort_order": "desc",
            },
        }))
        .unwrap();
        let state = planned().from_response(response);
        assert_eq!(state.id, ValueString::from("25"));
        assert!(state.description.is_null());
        assert_eq!(state.conditions, planned().conditions);
        assert_eq!(
            state.columns,
            Value::Value(vec!["subject".into(), "360001".into()])
        );
        assert_eq!(state.sort_order, ValueString::from("desc"));
    }

    #[test]
    fn version_0_nested_conditions_are_kept() {
        let prior = RawValue::Json(
            serde_json::to_vec(&json!({
                "id": "25",
                "title": "Open tickets",
                "active": true,
                "conditions": {
                    "all": [{"field": "status", "operator": "less_than", "value": "solved"}],
                    "any": null
                },
                "columns": ["subject", "requester"],
                "sort_order": "desc"
            }))
            .unwrap(),
        );
        let mut diags = Diagnostics::default();

        let state: ViewState = View.upgrade(&mut diags, 0, &prior).unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(state.id, ValueString::from("25"));
        assert_eq!(state.conditions, planned().conditions);
        assert_eq!(state.columns, planned().columns);
        assert_eq!(state.sort_order, ValueString::from("desc"));
    }
}
