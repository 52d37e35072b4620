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
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{AttributePath, Diagnostics};

use super::resolve_field;
use super::tables::{condition_table, ResourceKind, ValueShape};

/// Condition of a business rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionSpec<'a> {
    pub field: ValueString<'a>,
    pub operator: ValueString<'a>,
    pub value: ValueString<'a>,
    pub values: ValueList<ValueString<'a>>,
    pub custom_field_id: ValueNumber,
}

/// Conditions that must all be met, and conditions of which one must be met
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionsSpec<'a> {
    pub all: ValueList<Value<ConditionSpec<'a>>>,
    pub any: ValueList<Value<ConditionSpec<'a>>>,
}

pub fn validate_conditions(
    diags: &mut Diagnostics,
    kind: ResourceKind,
    conditions: &Value<ConditionsSpec>,
    attr_path: AttributePath,
) {
    let Value::Value(conditions) = conditions else {
        return;
    };
    for (name, list) in [("all", &conditions.all), ("any", &conditions.any)] {
        for (i, condition) in list.iter().flatten().enumerate() {
            if let Value::Value(condition) = condition {
                let attr_path = attr_path.clone().attribute(name).index(i as i64);
                validate_condition(diags, kind, condition, &attr_path);
            }
        }
    }
}

pub fn validate_condition(
    diags: &mut Diagnostics,
    kind: ResourceKind,
    condition: &ConditionSpec,
    attr_path: &AttributePath,
) {
    let field = match &condition.field {
        Value::Value(field) => field.as_ref(),
        Value::Null => {
            diags.error_short("`field` is required", attr_path.clone().attribute("field"));
            return;
        }
        Value::Unknown => return,
    };
    if condition.operator.is_unknown()
        || condition.value.is_unknown()
        || condition.values.is_unknown()
    {
        return;
    }
    let Some(field) = resolve_field(diags, field, &condition.custom_field_id, attr_path) else {
        return;
    };

    let table = condition_table(kind);
    let Some(rule) = table.lookup(&field) else {
        diags.error(
            format!("Invalid condition `{field}` for a {kind}"),
            format!("Acceptable fields are: {}", table.describe()),
            attr_path.clone().attribute("field"),
        );
        return;
    };

    let operator = condition.operator.as_deref_option();
    if !rule.accepts(operator) {
        let detail = match operator {
            Some(_) if rule.operators.is_empty() => {
                format!("`{field}` conditions do not take an operator")
            }
            _ => format!(
                "`{field}` conditions accept the operators: {}",
                rule.operators.join(", ")
            ),
        };
        diags.error(
            "Invalid condition operator",
            detail,
            attr_path.clone().attribute("operator"),
        );
        return;
    }

    let operator = operator.unwrap_or("is");
    match rule.shape(Some(operator)) {
        ValueShape::Empty => {
            for (name, is_set) in [
                ("value", condition.value.is_value()),
                ("values", condition.values.is_value()),
            ] {
                if is_set {
                    diags.error(
                        format!("Unexpected `{name}`"),
                        format!("Operator `{operator}` does not take a value"),
                        attr_path.clone().attribute(name),
                    );
                }
            }
        }
        ValueShape::Single => {
            if condition.values.is_value() {
                diags.error(
                    "Unexpected `values`",
                    format!("`{field}` with operator `{operator}` takes a single `value`"),
                    attr_path.clone().attribute("values"),
                );
            } else if condition.value.is_null() {
                diags.error(
                    "Missing `value`",
                    format!("`{field}` with operator `{operator}` requires a `value`"),
                    attr_path.clone().attribute("value"),
                );
            }
        }
        ValueShape::Multi => {
            if condition.value.is_value() {
                diags.error(
                    "Unexpected `value`",
                    format!("`{field}` with operator `{operator}` takes a list of `values`"),
                    attr_path.clone().attribute("value"),
                );
            } else if condition.values.as_ref_option().map_or(true, Vec::is_empty) {
                diags.error(
                    "Missing `values`",
                    format!("`{field}` with operator `{operator}` requires at least one value"),
                    attr_path.clone().attribute("values"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::{Value, ValueString};
    use tf_provider::{AttributePath, Diagnostics};

    use super::{validate_condition, validate_conditions, ConditionSpec, ConditionsSpec};
    use crate::utils::string_value;
    use crate::validation::tables::ResourceKind;

    fn condition(
        field: &str,
        operator: Option<&str>,
        value: Option<&str>,
    ) -> ConditionSpec<'static> {
        ConditionSpec {
            field: ValueString::from(field.to_owned()),
            operator: string_value(operator.map(str::to_owned)),
            value: string_value(value.map(str::to_owned)),
            ..Default::default()
        }
    }

    fn check(kind: ResourceKind, condition: &ConditionSpec) -> Diagnostics {
        let mut diags = Diagnostics::default();
        validate_condition(
            &mut diags,
            kind,
            condition,
            &AttributePath::new("conditions").attribute("all").index(0),
        );
        diags
    }

    #[test]
    fn simple_conditions() {
        let status = condition("status", Some("is"), Some("open"));
        assert!(check(ResourceKind::Trigger, &status).errors.is_empty());
        assert!(check(ResourceKind::View, &status).errors.is_empty());

        let hours = condition("NEW", Some("greater_than"), Some("24"));
        assert!(check(ResourceKind::Automation, &hours).errors.is_empty());
        assert_eq!(check(ResourceKind::Trigger, &hours).errors.len(), 1);
    }

    #[test]
    fn unknown_field_names_the_field() {
        for kind in ResourceKind::ALL {
            let diags = check(kind, &condition("bogus", Some("is"), Some("x")));
            assert_eq!(diags.errors.len(), 1);
            assert!(diags.errors[0].summary.contains("bogus"));
        }
    }

    #[test]
    fn operators() {
        let diags = check(ResourceKind::Trigger, &condition("status", Some("like"), Some("open")));
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("conditions")
                .attribute("all")
                .index(0)
                .attribute("operator")
        );

        let update = condition("update_type", None, Some("Create"));
        assert!(check(ResourceKind::Trigger, &update).errors.is_empty());
        let update = condition("update_type", Some("is"), Some("Create"));
        assert_eq!(check(ResourceKind::Trigger, &update).errors.len(), 1);
    }

    #[test]
    fn value_shapes() {
        let changed = condition("status", Some("changed"), None);
        assert!(check(ResourceKind::Trigger, &changed).errors.is_empty());
        let changed = condition("status", Some("changed"), Some("open"));
        assert_eq!(check(ResourceKind::Trigger, &changed).errors.len(), 1);

        let missing = condition("status", Some("is"), None);
        assert_eq!(check(ResourceKind::Trigger, &missing).errors.len(), 1);

        let mut multi = condition("custom_status_id", Some("includes"), None);
        assert_eq!(check(ResourceKind::Trigger, &multi).errors.len(), 1);
        multi.values = Value::Value(vec!["1".into(), "2".into()]);
        assert!(check(ResourceKind::Trigger, &multi).errors.is_empty());
        multi.operator = "is".into();
        assert_eq!(check(ResourceKind::Trigger, &multi).errors.len(), 1);

        let present = condition("requester.custom_fields.plan", Some("present"), None);
        assert!(check(ResourceKind::Trigger, &present).errors.is_empty());
    }

    #[test]
    fn custom_field_reference() {
        let mut custom = condition("custom_field", Some("is"), Some("gold"));
        custom.custom_field_id = Value::Value(360005);
        for kind in ResourceKind::ALL {
            assert!(check(kind, &custom).errors.is_empty());
        }
        custom.custom_field_id = Value::Null;
        assert_eq!(check(ResourceKind::Sla, &custom).errors.len(), 1);
    }

    #[test]
    fn unknown_values_are_deferred() {
        let mut unknown = condition("bogus", Some("is"), None);
        unknown.value = Value::Unknown;
        assert!(check(ResourceKind::Trigger, &unknown).errors.is_empty());
        let mut unknown = condition("status", None, Some("open"));
        unknown.operator = Value::Unknown;
        assert!(check(ResourceKind::Trigger, &unknown).errors.is_empty());
    }

    #[test]
    fn all_and_any_paths() {
        let conditions = Value::Value(ConditionsSpec {
            all: Value::Value(vec![Value::Value(condition("status", Some("is"), Some("open")))]),
            any: Value::Value(vec![
                Value::Value(condition("priority", Some("is"), Some("high"))),
                Value::Value(condition("bogus", Some("is"), Some("x"))),
            ]),
        });
        let mut diags = Diagnostics::default();
        validate_conditions(
            &mut diags,
            ResourceKind::Trigger,
            &conditions,
            AttributePath::new("conditions"),
        );
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("conditions")
                .attribute("any")
                .index(1)
                .attribute("field")
        );
    }
}
