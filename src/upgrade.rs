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

//! Migration of states written with schema version 0
//!
//! Upgrades work on the JSON state: the reshaped attributes are decoded into
//! private version 0 structures, every other attribute is carried as is.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tf_provider::{Diagnostics, RawValue};
use tracing::warn;

use crate::validation::form_condition::format_key;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionV0 {
    pub field: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionV1 {
    pub field: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
    pub values: Option<Vec<String>>,
    pub custom_field_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionsV1 {
    pub all: Option<Vec<ConditionV1>>,
    pub any: Option<Vec<ConditionV1>>,
}

impl From<ConditionV0> for ConditionV1 {
    fn from(condition: ConditionV0) -> Self {
        Self {
            field: condition.field,
            operator: condition.operator,
            value: condition.value,
            values: None,
            custom_field_id: None,
        }
    }
}

/// Merge `all` and `any` version 0 lists, keeping their order
pub fn unify_conditions(
    all: Option<Vec<ConditionV0>>,
    any: Option<Vec<ConditionV0>>,
) -> ConditionsV1 {
    let convert = |list: Option<Vec<ConditionV0>>| {
        list.map(|list| list.into_iter().map(ConditionV1::from).collect())
    };
    ConditionsV1 {
        all: convert(all),
        any: convert(any),
    }
}

/// Upgrade the conditions of a business rule into `attribute`
///
/// Version 0 states held `all` and `any` either at the top level, or nested in `attribute`.
pub fn upgrade_conditions(
    diags: &mut Diagnostics,
    prior_state: &RawValue,
    attribute: &str,
) -> Option<JsonValue> {
    let mut state: Map<String, JsonValue> = prior_state.deserialize(diags)?;

    let lists = match state.remove(attribute) {
        Some(JsonValue::Object(mut nested)) => Some((nested.remove("all"), nested.remove("any"))),
        Some(JsonValue::Null) if !state.contains_key("all") && !state.contains_key("any") => None,
        _ => Some((state.remove("all"), state.remove("any"))),
    };

    let conditions = match lists {
        Some((all, any)) => {
            let all = decode_attribute(diags, "all", all)?;
            let any = decode_attribute(diags, "any", any)?;
            encode(diags, unify_conditions(all, any))?
        }
        None => JsonValue::Null,
    };
    state.insert(attribute.to_owned(), conditions);
    Some(JsonValue::Object(state))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct RequiredOnStatusesV0 {
    #[serde(rename = "type")]
    pub status_type: Option<String>,
    pub statuses: Option<Vec<String>>,
}

/// Child field, identical in both versions
///
/// End-user child fields had no `required_on_statuses` in version 0.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct ChildFieldV0 {
    pub id: Option<i64>,
    pub is_required: Option<bool>,
    #[serde(default)]
    pub required_on_statuses: Option<RequiredOnStatusesV0>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct FormConditionV0 {
    pub parent_field_id: Option<i64>,
    pub value: Option<String>,
    pub child_fields: Option<Vec<ChildFieldV0>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FormConditionV1 {
    pub child_fields: Option<Vec<ChildFieldV0>>,
}

fn form_condition_key(condition: &FormConditionV0) -> String {
    let value = condition.value.as_deref().unwrap_or_default();
    match condition.parent_field_id {
        Some(parent_field_id) => format_key(parent_field_id, value),
        None => format!(":{value}"),
    }
}

/// Turn a set of form conditions into a map keyed by `<parent_field_id>:<value>`
///
/// Conditions are visited in sorted order; the last condition of a key wins.
pub fn regroup_form_conditions(
    conditions: Option<Vec<FormConditionV0>>,
) -> Option<BTreeMap<String, FormConditionV1>> {
    let mut conditions = conditions?;
    conditions.sort();

    let mut regrouped = BTreeMap::new();
    for condition in conditions {
        let key = form_condition_key(&condition);
        let previous = regrouped.insert(
            key.clone(),
            FormConditionV1 {
                child_fields: condition.child_fields,
            },
        );
        if previous.is_some() {
            warn!(%key, "duplicate form condition in prior state, keeping the last one");
        }
    }
    Some(regrouped)
}

/// Upgrade the agent and end-user conditions of a ticket form
pub fn upgrade_form_conditions(
    diags: &mut Diagnostics,
    prior_state: &RawValue,
) -> Option<JsonValue> {
    let mut state: Map<String, JsonValue> = prior_state.deserialize(diags)?;

    for attribute in ["agent_conditions", "end_user_conditions"] {
        let conditions = decode_attribute(diags, attribute, state.remove(attribute))?;
        let regrouped = encode(diags, regroup_form_conditions(conditions))?;
        state.insert(attribute.to_owned(), regrouped);
    }
    Some(JsonValue::Object(state))
}

/// Report a state version without migration
pub fn unsupported<T>(diags: &mut Diagnostics, name: &str, version: i64) -> Option<T> {
    diags.root_error_short(format!("Cannot upgrade {name} state from version {version}"));
    None
}

/// Decode an upgraded JSON state into the current state
pub fn decode<T: DeserializeOwned>(diags: &mut Diagnostics, state: JsonValue) -> Option<T> {
    match serde_json::from_value(state) {
        Ok(state) => Some(state),
        Err(err) => {
            diags.root_error("Failed to decode upgraded state", err.to_string());
            None
        }
    }
}

fn decode_attribute<T: DeserializeOwned>(
    diags: &mut Diagnostics,
    attribute: &str,
    value: Option<JsonValue>,
) -> Option<T> {
    match serde_json::from_value(value.unwrap_or_default()) {
        Ok(value) => Some(value),
        Err(err) => {
            diags.root_error(
                format!("Failed to decode prior `{attribute}`"),
                err.to_string(),
            );
            None
        }
    }
}

fn encode<T: Serialize>(diags: &mut Diagnostics, value: T) -> Option<JsonValue> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(err) => {
            diags.root_error("Failed to encode upgraded state", err.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tf_provider::{Diagnostics, RawValue};

    use super::{
        regroup_form_conditions, unify_conditions, upgrade_conditions, upgrade_form_conditions,
        ChildFieldV0, ConditionV0, ConditionV1, ConditionsV1, FormConditionV0,
    };

    fn raw(value: serde_json::Value) -> RawValue {
        RawValue::Json(serde_json::to_vec(&value).unwrap())
    }

    fn condition(field: &str, operator: &str, value: &str) -> ConditionV0 {
        ConditionV0 {
            field: Some(field.into()),
            operator: Some(operator.into()),
            value: Some(value.into()),
        }
    }

    #[test]
    fn status_open_example() {
        let upgraded =
            unify_conditions(Some(vec![condition("status", "is", "open")]), Some(vec![]));
        assert_eq!(
            serde_json::to_value(upgraded).unwrap(),
            json!({
                "all": [{
                    "field": "status",
                    "operator": "is",
                    "value": "open",
                    "values": null,
                    "custom_field_id": null,
                }],
                "any": [],
            })
        );
    }

    #[test]
    fn downgrade_then_upgrade_keeps_order() {
        let original = ConditionsV1 {
            all: Some(vec![
                ConditionV1 {
                    field: Some("status".into()),
                    operator: Some("less_than".into()),
                    value: Some("solved".into()),
                    ..Default::default()
                },
                ConditionV1 {
                    field: Some("current_tags".into()),
                    operator: Some("includes".into()),
                    value: Some("vip".into()),
                    ..Default::default()
                },
            ]),
            any: Some(vec![
                ConditionV1 {
                    field: Some("priority".into()),
                    operator: Some("is".into()),
                    value: Some("urgent".into()),
                    ..Default::default()
                },
                ConditionV1 {
                    field: Some("priority".into()),
                    operator: Some("is".into()),
                    value: Some("high".into()),
                    ..Default::default()
                },
            ]),
        };
        let downgrade = |list: &Option<Vec<ConditionV1>>| {
            list.as_ref().map(|list| {
                list.iter()
                    .map(|c| ConditionV0 {
                        field: c.field.clone(),
                        operator: c.operator.clone(),
                        value: c.value.clone(),
                    })
                    .collect()
            })
        };
        let upgraded = unify_conditions(downgrade(&original.all), downgrade(&original.any));
        assert_eq!(upgraded, original);
    }

    #[test]
    fn top_level_lists_move_into_conditions() {
        let mut diags = Diagnostics::default();
        let state = raw(json!({
            "id": "42",
            "title": "Close solved tickets",
            "all": [{"field": "status", "operator": "is", "value": "solved"}],
            "any": null,
        }));
        let upgraded = upgrade_conditions(&mut diags, &state, "conditions").unwrap();
        assert!(diags.errors.is_empty());
        assert_eq!(upgraded["id"], "42");
        assert_eq!(upgraded["title"], "Close solved tickets");
        assert!(upgraded.get("all").is_none());
        assert_eq!(upgraded["conditions"]["all"][0]["value"], "solved");
        assert_eq!(upgraded["conditions"]["any"], json!(null));
    }

    #[test]
    fn nested_lists_are_reshaped_in_place() {
        let mut diags = Diagnostics::default();
        let state = raw(json!({
            "id": "7",
            "filter": {
                "all": [{"field": "priority", "operator": "is", "value": "high"}],
                "any": [],
            },
        }));
        let upgraded = upgrade_conditions(&mut diags, &state, "filter").unwrap();
        assert_eq!(
            upgraded["filter"]["all"][0],
            json!({
                "field": "priority",
                "operator": "is",
                "value": "high",
                "values": null,
                "custom_field_id": null,
            })
        );
        assert_eq!(upgraded["filter"]["any"], json!([]));
    }

    #[test]
    fn decode_failure_is_reported() {
        let mut diags = Diagnostics::default();
        let state = raw(json!({"all": "not a list"}));
        assert!(upgrade_conditions(&mut diags, &state, "conditions").is_none());
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn form_condition_example() {
        let regrouped = regroup_form_conditions(Some(vec![FormConditionV0 {
            parent_field_id: Some(100),
            value: Some("a".into()),
            child_fields: Some(vec![ChildFieldV0 {
                id: Some(5),
                is_required: Some(true),
                required_on_statuses: None,
            }]),
        }]))
        .unwrap();
        assert_eq!(
            serde_json::to_value(regrouped).unwrap(),
            json!({
                "100:a": {
                    "child_fields": [{
                        "id": 5,
                        "is_required": true,
                        "required_on_statuses": null,
                    }],
                },
            })
        );
    }

    #[test]
    fn duplicate_keys_are_deterministic() {
        let first = FormConditionV0 {
            parent_field_id: Some(1),
            value: Some("x".into()),
            child_fields: Some(vec![ChildFieldV0 {
                id: Some(10),
                ..Default::default()
            }]),
        };
        let second = FormConditionV0 {
            child_fields: Some(vec![ChildFieldV0 {
                id: Some(20),
                ..Default::default()
            }]),
            ..first.clone()
        };
        let forward = regroup_form_conditions(Some(vec![first.clone(), second.clone()]));
        let backward = regroup_form_conditions(Some(vec![second, first]));
        assert_eq!(forward, backward);
        let forward = forward.unwrap();
        assert_eq!(forward.len(), 1);
        assert_eq!(forward["1:x"].child_fields.as_ref().unwrap()[0].id, Some(20));
    }

    #[test]
    fn ticket_form_state() {
        let mut diags = Diagnostics::default();
        let state = raw(json!({
            "id": "9",
            "name": "Support",
            "agent_conditions": [{
                "parent_field_id": 100,
                "value": "a",
                "child_fields": [{
                    "id": 5,
                    "is_required": false,
                    "required_on_statuses": {"type": "SOME_STATUSES", "statuses": ["open"]},
                }],
            }],
            "end_user_conditions": null,
        }));
        let upgraded = upgrade_form_conditions(&mut diags, &state).unwrap();
        assert!(diags.errors.is_empty());
        assert_eq!(upgraded["name"], "Support");
        let child = &upgraded["agent_conditions"]["100:a"]["child_fields"][0];
        assert_eq!(child["required_on_statuses"]["type"], "SOME_STATUSES");
        assert_eq!(upgraded["end_user_conditions"], json!(null));
    }
}
