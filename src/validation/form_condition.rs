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
use tf_provider::value::{Value, ValueBool, ValueList, ValueMap, ValueNumber, ValueString};
use tf_provider::{AttributePath, Diagnostics};

pub const NO_STATUSES: &str = "NO_STATUSES";
pub const SOME_STATUSES: &str = "SOME_STATUSES";
pub const ALL_STATUSES: &str = "ALL_STATUSES";

/// Audience of ticket form conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormConditionType {
    Agent,
    EndUser,
}

impl FormConditionType {
    pub fn attribute(self) -> &'static str {
        match self {
            FormConditionType::Agent => "agent_conditions",
            FormConditionType::EndUser => "end_user_conditions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequiredOnStatuses<'a> {
    #[serde(rename = "type")]
    pub status_type: ValueString<'a>,
    pub statuses: ValueList<ValueString<'a>>,
}

/// Field shown when the parent field of a form condition has the expected value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChildFieldCondition<'a> {
    pub id: ValueNumber,
    pub is_required: ValueBool,
    pub required_on_statuses: Value<RequiredOnStatuses<'a>>,
}

/// Form condition, keyed by `<parent_field_id>:<value>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FormCondition<'a> {
    pub child_fields: ValueList<Value<ChildFieldCondition<'a>>>,
}

/// Split a form condition key into the parent field id and its value
///
/// The value may itself contain colons.
pub fn parse_key(key: &str) -> Option<(i64, &str)> {
    let (parent_field_id, value) = key.split_once(':')?;
    Some((parent_field_id.parse().ok()?, value))
}

pub fn format_key(parent_field_id: i64, value: &str) -> String {
    format!("{parent_field_id}:{value}")
}

pub fn validate_form_conditions(
    diags: &mut Diagnostics,
    condition_type: FormConditionType,
    conditions: &ValueMap<Value<FormCondition>>,
    attr_path: AttributePath,
) {
    for (key, condition) in conditions.iter().flatten() {
        let attr_path = attr_path.clone().key(key.to_string());
        if parse_key(key).is_none() {
            diags.error(
                "Invalid form condition key",
                format!("`{key}` should be formatted as `<parent_field_id>:<value>`"),
                attr_path.clone(),
            );
        }
        let Value::Value(condition) = condition else {
            continue;
        };
        for (i, child) in condition.child_fields.iter().flatten().enumerate() {
            if let Value::Value(child) = child {
                let attr_path = attr_path.clone().attribute("child_fields").index(i as i64);
                validate_child_field(diags, condition_type, child, &attr_path);
            }
        }
    }
}

pub fn validate_child_field(
    diags: &mut Diagnostics,
    condition_type: FormConditionType,
    child: &ChildFieldCondition,
    attr_path: &AttributePath,
) {
    let attr_path = attr_path.clone().attribute("required_on_statuses");
    let required = match (condition_type, &child.required_on_statuses) {
        (_, Value::Unknown) | (FormConditionType::EndUser, Value::Null) => return,
        (FormConditionType::Agent, Value::Null) => {
            diags.error(
                "Missing `required_on_statuses`",
                "Child fields of agent conditions must specify `required_on_statuses`",
                attr_path,
            );
            return;
        }
        (FormConditionType::EndUser, Value::Value(_)) => {
            diags.error(
                "Unexpected `required_on_statuses`",
                "Child fields of end-user conditions cannot be required on statuses",
                attr_path,
            );
            return;
        }
        (FormConditionType::Agent, Value::Value(required)) => required,
    };

    let statuses = match &required.statuses {
        Value::Value(statuses) => statuses.len(),
        Value::Null => 0,
        Value::Unknown => return,
    };
    match required.status_type.as_deref_option() {
        Some(SOME_STATUSES) => {
            if statuses == 0 {
                diags.error(
                    "Missing statuses",
                    format!("`{SOME_STATUSES}` requires at least one status"),
                    attr_path.attribute("statuses"),
                );
            }
        }
        Some(NO_STATUSES | ALL_STATUSES) => {
            if statuses > 0 {
                diags.error(
                    "Unexpected statuses",
                    format!("`statuses` can only be set with `{SOME_STATUSES}`"),
                    attr_path.attribute("statuses"),
                );
            }
        }
        Some(status_type) => diags.error(
            "Invalid status type",
            format!(
                "`{status_type}` is not one of `{NO_STATUSES}`, `{SOME_STATUSES}`, `{ALL_STATUSES}`"
            ),
            attr_path.attribute("type"),
        ),
        None => {
            if required.status_type.is_null() {
                diags.error_short("`type` is required", attr_path.attribute("type"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tf_provider::value::{Value, ValueString};
    use tf_provider::{AttributePath, Diagnostics};

    use super::{
        parse_key, validate_child_field, validate_form_conditions, ChildFieldCondition,
        FormCondition, FormConditionType, RequiredOnStatuses,
    };

    fn child(
        required_on_statuses: Value<RequiredOnStatuses<'static>>,
    ) -> ChildFieldCondition<'static> {
        ChildFieldCondition {
            id: Value::Value(5),
            is_required: Value::Value(true),
            required_on_statuses,
        }
    }

    fn check(condition_type: FormConditionType, child: &ChildFieldCondition) -> Diagnostics {
        let mut diags = Diagnostics::default();
        validate_child_field(&mut diags, condition_type, child, &AttributePath::new("child"));
        diags
    }

    fn statuses(
        status_type: &'static str,
        statuses: &[&'static str],
    ) -> Value<RequiredOnStatuses<'static>> {
        Value::Value(RequiredOnStatuses {
            status_type: ValueString::from(status_type),
            statuses: Value::Value(statuses.iter().map(|s| ValueString::from(*s)).collect()),
        })
    }

    #[test]
    fn requirement_depends_on_audience() {
        let unset = child(Value::Null);
        assert_eq!(check(FormConditionType::Agent, &unset).errors.len(), 1);
        assert!(check(FormConditionType::EndUser, &unset).errors.is_empty());

        let set = child(statuses("ALL_STATUSES", &[]));
        assert!(check(FormConditionType::Agent, &set).errors.is_empty());
        assert_eq!(check(FormConditionType::EndUser, &set).errors.len(), 1);

        assert!(check(FormConditionType::Agent, &child(Value::Unknown)).errors.is_empty());
    }

    #[test]
    fn status_types() {
        let some = child(statuses("SOME_STATUSES", &["open", "pending"]));
        assert!(check(FormConditionType::Agent, &some).errors.is_empty());

        let empty = child(statuses("SOME_STATUSES", &[]));
        assert_eq!(check(FormConditionType::Agent, &empty).errors.len(), 1);

        let extra = child(statuses("NO_STATUSES", &["open"]));
        assert_eq!(check(FormConditionType::Agent, &extra).errors.len(), 1);

        let invalid = child(statuses("MOST_STATUSES", &[]));
        let diags = check(FormConditionType::Agent, &invalid);
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("child")
                .attribute("required_on_statuses")
                .attribute("type")
        );
    }

    #[test]
    fn keys() {
        assert_eq!(parse_key("100:a"), Some((100, "a")));
        assert_eq!(parse_key("100:a:b"), Some((100, "a:b")));
        assert_eq!(parse_key("100:"), Some((100, "")));
        assert_eq!(parse_key("abc:a"), None);
        assert_eq!(parse_key("100"), None);
    }

    #[test]
    fn map_paths() {
        let conditions = Value::Value(BTreeMap::from([
            (
                "100:a".into(),
                Value::Value(FormCondition {
                    child_fields: Value::Value(vec![Value::Value(child(Value::Null))]),
                }),
            ),
            ("oops".into(), Value::Value(FormCondition::default())),
        ]));
        let mut diags = Diagnostics::default();
        validate_form_conditions(
            &mut diags,
            FormConditionType::Agent,
            &conditions,
            AttributePath::new("agent_conditions"),
        );
        assert_eq!(diags.errors.len(), 2);
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("agent_conditions")
                .key("100:a")
                .attribute("child_fields")
                .index(0)
                .attribute("required_on_statuses")
        );
        assert_eq!(
            diags.errors[1].attribute,
            AttributePath::new("agent_conditions").key("oops")
        );
    }
}
