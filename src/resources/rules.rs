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

//! Conditions and actions shared by business rules

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::map;

use crate::utils::{attribute, list_value, string, string_value};
use crate::validation::tables::{action_shape, ActionShape};
use crate::validation::{
    ActionSpec, ActionTarget, ConditionSpec, ConditionsSpec, CUSTOM_FIELD, CUSTOM_FIELDS_PREFIX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConditionApi {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConditionsApi {
    pub all: Vec<ConditionApi>,
    pub any: Vec<ConditionApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActionApi {
    pub field: String,
    #[serde(default)]
    pub value: JsonValue,
}

fn condition_attributes() -> HashMap<String, Attribute> {
    map! {
        "field" => attribute(
            AttributeType::String,
            AttributeConstraint::Required,
            "Field to test, or `custom_field` to test the field given by `custom_field_id`",
        ),
        "operator" => attribute(
            AttributeType::String,
            AttributeConstraint::Optional,
            "Comparison operator, omitted for fields without operator",
        ),
        "value" => attribute(
            AttributeType::String,
            AttributeConstraint::Optional,
            "Value to compare the field to",
        ),
        "values" => attribute(
            AttributeType::List(AttributeType::String.into()),
            AttributeConstraint::Optional,
            "Values to compare list fields to, with `includes` and `not_includes`",
        ),
        "custom_field_id" => attribute(
            AttributeType::Number,
            AttributeConstraint::Optional,
            "Id of the custom field tested when `field` is `custom_field`",
        ),
    }
}

pub fn conditions_attribute(description: &'static str) -> Attribute {
    let list = |description: &'static str| Attribute {
        attr_type: AttributeType::AttributeList(condition_attributes()),
        description: Description::plain(description),
        constraint: AttributeConstraint::Optional,
        ..Default::default()
    };
    Attribute {
        attr_type: AttributeType::AttributeSingle(map! {
            "all" => list("Conditions that must all be met"),
            "any" => list("Conditions of which at least one must be met"),
        }),
        description: Description::plain(description),
        constraint: AttributeConstraint::Required,
        ..Default::default()
    }
}

pub fn actions_attribute() -> Attribute {
    let optional =
        |attr_type, description| attribute(attr_type, AttributeConstraint::Optional, description);
    Attribute {
        attr_type: AttributeType::AttributeList(map! {
            "field" => attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                "Field to set, or `custom_field` to set the field given by `custom_field_id`",
            ),
            "value" => attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                "Value to set",
            ),
            "target" => optional(
                AttributeType::String,
                "Recipient of notifications: user, group, target or webhook",
            ),
            "custom_field_id" => optional(
                AttributeType::Number,
                "Id of the custom field set when `field` is `custom_field`",
            ),
            "notification_subject" => optional(
                AttributeType::String,
                "Subject of notifications and side conversations",
            ),
            "content_type" => optional(AttributeType::String, "Content type of side conversations"),
            "slack_workspace" => optional(
                AttributeType::String,
                "Slack workspace of side conversations",
            ),
            "slack_channel" => optional(
                AttributeType::String,
                "Slack channel of side conversations",
            ),
            "slack_title" => optional(AttributeType::String, "Title of Slack side conversations"),
        }),
        description: Description::plain("Actions applied to the matching tickets"),
        constraint: AttributeConstraint::Required,
        ..Default::default()
    }
}

fn api_field(field: &ValueString, custom_field_id: &ValueNumber) -> String {
    match (field.as_deref_option(), custom_field_id) {
        (Some(CUSTOM_FIELD), Value::Value(id)) => format!("{CUSTOM_FIELDS_PREFIX}{id}"),
        (field, _) => field.unwrap_or_default().to_owned(),
    }
}

/// Keep the `custom_field` form when the prior state used it
fn state_field<'a>(
    prior: Option<(&ValueString, &ValueNumber)>,
    field: String,
) -> (ValueString<'a>, ValueNumber) {
    if let Some((prior_field, _)) = prior {
        if prior_field.as_deref_option() == Some(CUSTOM_FIELD) {
            let id = field
                .strip_prefix(CUSTOM_FIELDS_PREFIX)
                .and_then(|id| id.parse().ok());
            if let Some(id) = id {
                return (ValueString::from(CUSTOM_FIELD), Value::Value(id));
            }
        }
    }
    (string_value(Some(field)), Value::Null)
}

fn text<'a>(value: &JsonValue) -> ValueString<'a> {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::String(value) => Value::Value(Cow::Owned(value.clone())),
        value => Value::Value(Cow::Owned(value.to_string())),
    }
}

fn target(value: &JsonValue) -> Value<ActionTarget> {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Number(id) => match id.as_i64() {
            Some(id) => Value::Value(ActionTarget::Id(id)),
            None => Value::Value(ActionTarget::Name(id.to_string())),
        },
        JsonValue::String(name) => Value::Value(ActionTarget::Name(name.clone())),
        value => Value::Value(ActionTarget::Name(value.to_string())),
    }
}

fn target_json(target: &Value<ActionTarget>) -> JsonValue {
    match target {
        Value::Value(ActionTarget::Id(id)) => json!(id),
        Value::Value(ActionTarget::Name(name)) => json!(name),
        _ => JsonValue::Null,
    }
}

fn text_json(value: &ValueString) -> JsonValue {
    string(value).map_or(JsonValue::Null, JsonValue::String)
}

pub fn condition_to_api(condition: &ConditionSpec) -> ConditionApi {
    let value = match (&condition.values, &condition.value) {
        (Value::Value(values), _) => JsonValue::Array(values.iter().map(text_json).collect()),
        (_, value) => text_json(value),
    };
    ConditionApi {
        field: api_field(&condition.field, &condition.custom_field_id),
        operator: string(&condition.operator),
        value,
    }
}

pub fn condition_from_api<'a>(
    prior: Option<&ConditionSpec>,
    condition: ConditionApi,
) -> ConditionSpec<'a> {
    let (field, custom_field_id) = state_field(
        prior.map(|prior| (&prior.field, &prior.custom_field_id)),
        condition.field,
    );
    let as_list = prior.map_or(false, |prior| prior.values.is_value());
    let (value, values) = match condition.value {
        JsonValue::Null => (Value::Null, Value::Null),
        JsonValue::Array(items) => (Value::Null, Value::Value(items.iter().map(text).collect())),
        scalar if as_list => (Value::Null, Value::Value(vec![text(&scalar)])),
        scalar => (text(&scalar), Value::Null),
    };
    ConditionSpec {
        field,
        operator: string_value(condition.operator),
        value,
        values,
        custom_field_id,
    }
}

pub fn conditions_to_api(conditions: &Value<ConditionsSpec>) -> ConditionsApi {
    let list = |list: &ValueList<Value<ConditionSpec>>| {
        list.iter()
            .flatten()
            .filter_map(Value::as_ref_option)
            .map(condition_to_api)
            .collect()
    };
    match conditions {
        Value::Value(conditions) => ConditionsApi {
            all: list(&conditions.all),
            any: list(&conditions.any),
        },
        _ => Default::default(),
    }
}

fn conditions_list_from_api<'a>(
    prior: &ValueList<Value<ConditionSpec>>,
    conditions: Vec<ConditionApi>,
) -> ValueList<Value<ConditionSpec<'a>>> {
    let prior_entries = prior.as_ref_option().map(Vec::as_slice).unwrap_or_default();
    let conditions = conditions
        .into_iter()
        .enumerate()
        .map(|(i, condition)| {
            let prior = prior_entries.get(i).and_then(Value::as_ref_option);
            Value::Value(condition_from_api(prior, condition))
        })
        .collect();
    list_value(prior, conditions)
}

pub fn conditions_from_api<'a>(
    prior: &Value<ConditionsSpec>,
    conditions: ConditionsApi,
) -> Value<ConditionsSpec<'a>> {
    let default = ConditionsSpec::default();
    let prior = prior.as_ref_option().unwrap_or(&default);
    Value::Value(ConditionsSpec {
        all: conditions_list_from_api(&prior.all, conditions.all),
        any: conditions_list_from_api(&prior.any, conditions.any),
    })
}

pub fn action_to_api(action: &ActionSpec) -> ActionApi {
    let field = api_field(&action.field, &action.custom_field_id);
    let value = text_json(&action.value);
    let value = match action_shape(&field) {
        ActionShape::Plain => value,
        ActionShape::Target => json!([target_json(&action.target), value]),
        ActionShape::TargetWithSubject => json!([
            target_json(&action.target),
            text_json(&action.notification_subject),
            value,
        ]),
        ActionShape::SideConversation => json!([
            text_json(&action.notification_subject),
            value,
            text_json(&action.content_type),
        ]),
        ActionShape::Slack => json!([
            text_json(&action.slack_workspace),
            text_json(&action.slack_channel),
            text_json(&action.slack_title),
            value,
        ]),
    };
    ActionApi { field, value }
}

pub fn action_from_api<'a>(prior: Option<&ActionSpec>, action: ActionApi) -> ActionSpec<'a> {
    let shape = action_shape(&action.field);
    let (field, custom_field_id) = state_field(
        prior.map(|prior| (&prior.field, &prior.custom_field_id)),
        action.field,
    );
    let mut state = ActionSpec {
        field,
        custom_field_id,
        ..Default::default()
    };

    let parts = match action.value {
        JsonValue::Array(parts) if shape != ActionShape::Plain => parts,
        value => {
            state.value = text(&value);
            return state;
        }
    };
    match (shape, parts.as_slice()) {
        (ActionShape::Target, [recipient, value]) => {
            state.target = target(recipient);
            state.value = text(value);
        }
        (ActionShape::TargetWithSubject, [recipient, subject, value]) => {
            state.target = target(recipient);
            state.notification_subject = text(subject);
            state.value = text(value);
        }
        (ActionShape::SideConversation, [subject, value, content_type]) => {
            state.notification_subject = text(subject);
            state.value = text(value);
            state.content_type = text(content_type);
        }
        (ActionShape::Slack, [workspace, channel, title, value]) => {
            state.slack_workspace = text(workspace);
            state.slack_channel = text(channel);
            state.slack_title = text(title);
            state.value = text(value);
        }
        _ => state.value = string_value(Some(JsonValue::Array(parts.to_vec()).to_string())),
    }
    state
}

pub fn actions_to_api(actions: &ValueList<Value<ActionSpec>>) -> Vec<ActionApi> {
    actions
        .iter()
        .flatten()
        .filter_map(Value::as_ref_option)
        .map(action_to_api)
        .collect()
}

pub fn actions_from_api<'a>(
    prior: &ValueList<Value<ActionSpec>>,
    actions: Vec<ActionApi>,
) -> ValueList<Value<ActionSpec<'a>>> {
    let prior_entries = prior.as_ref_option().map(Vec::as_slice).unwrap_or_default();
    let actions = actions
        .into_iter()
        .enumerate()
        .map(|(i, action)| {
            let prior = prior_entries.get(i).and_then(Value::as_ref_option);
            Value::Value(action_from_api(prior, action))
        })
        .collect();
    list_value(prior, actions)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tf_provider::value::{Value, ValueString};

    use super::{
        action_from_api, action_to_api, condition_from_api, condition_to_api, conditions_from_api,
        ActionApi, ConditionApi, ConditionsApi,
    };
    use crate::validation::{ActionSpec, ActionTarget, ConditionSpec, ConditionsSpec};

    #[test]
    fn custom_field_action_reads_back_as_custom_field() {
        let planned = ActionSpec {
            field: ValueString::from("custom_field"),
            value: ValueString::from("gold"),
            custom_field_id: Value::Value(360042),
            ..Default::default()
        };
        let request = action_to_api(&planned);
        assert_eq!(
            request,
            ActionApi {
                field: "custom_fields_360042".into(),
                value: json!("gold"),
            }
        );
        assert_eq!(action_from_api(Some(&planned), request.clone()), planned);

        let imported = action_from_api(None, request);
        assert_eq!(imported.field, ValueString::from("custom_fields_360042"));
        assert!(imported.custom_field_id.is_null());
    }

    #[test]
    fn notification_actions_are_arrays() {
        let planned = ActionSpec {
            field: ValueString::from("notification_user"),
            value: ValueString::from("Your ticket was updated"),
            target: Value::Value(ActionTarget::Name("requester_id".into())),
            notification_subject: ValueString::from("Update"),
            ..Default::default()
        };
        let request = action_to_api(&planned);
        assert_eq!(
            request.value,
            json!(["requester_id", "Update", "Your ticket was updated"])
        );
        assert_eq!(action_from_api(Some(&planned), request), planned);

        let webhook = action_from_api(
            None,
            ActionApi {
                field: "notification_webhook".into(),
                value: json!([1234, "{\"ticket\": \"{{ticket.id}}\"}"]),
            },
        );
        assert_eq!(webhook.target, Value::Value(ActionTarget::Id(1234)));
        assert_eq!(webhook.value, ValueString::from("{\"ticket\": \"{{ticket.id}}\"}"));
    }

    #[test]
    fn side_conversations() {
        let planned = ActionSpec {
            field: ValueString::from("side_conversation_slack"),
            value: ValueString::from("Please look"),
            slack_workspace: ValueString::from("T01"),
            slack_channel: ValueString::from("C02"),
            ..Default::default()
        };
        let request = action_to_api(&planned);
        assert_eq!(request.value, json!(["T01", "C02", null, "Please look"]));
        assert_eq!(action_from_api(Some(&planned), request), planned);
    }

    #[test]
    fn numbers_are_read_as_strings() {
        let action = action_from_api(
            None,
            ActionApi {
                field: "group_id".into(),
                value: json!(360001),
            },
        );
        assert_eq!(action.value, ValueString::from("360001"));
    }

    #[test]
    fn condition_values() {
        let planned = ConditionSpec {
            field: ValueString::from("custom_status_id"),
            operator: ValueString::from("includes"),
            values: Value::Value(vec!["1".into(), "2".into()]),
            ..Default::default()
        };
        let request = condition_to_api(&planned);
        assert_eq!(request.value, json!(["1", "2"]));
        assert_eq!(condition_from_api(Some(&planned), request), planned);

        let single = ConditionSpec {
            values: Value::Value(vec!["1".into()]),
            ..planned.clone()
        };
        let read = condition_from_api(
            Some(&single),
            ConditionApi {
                field: "custom_status_id".into(),
                operator: Some("includes".into()),
                value: json!(1),
            },
        );
        assert_eq!(read, single);

        let changed = ConditionSpec {
            field: ValueString::from("status"),
            operator: ValueString::from("changed"),
            ..Default::default()
        };
        let request = condition_to_api(&changed);
        assert_eq!(request.value, json!(null));
        assert_eq!(condition_from_api(Some(&changed), request), changed);
    }

    #[test]
    fn empty_lists_keep_prior_form() {
        let prior = Value::Value(ConditionsSpec {
            all: Value::Value(vec![Value::Value(ConditionSpec {
                field: ValueString::from("status"),
                operator: ValueString::from("is"),
                value: ValueString::from("open"),
                ..Default::default()
            })]),
            any: Value::Null,
        });
        let response = ConditionsApi {
            all: vec![ConditionApi {
                field: "status".into(),
                operator: Some("is".into()),
                value: json!("open"),
            }],
            any: vec![],
        };
        assert_eq!(conditions_from_api(&prior, response), prior);
    }
}
