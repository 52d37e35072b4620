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

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{AttributePath, Diagnostics};

use super::resolve_field;
use super::tables::{action_table, ActionShape, ResourceKind};

/// Action of a trigger, an automation or a macro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActionSpec<'a> {
    pub field: ValueString<'a>,
    pub value: ValueString<'a>,
    pub target: Value<ActionTarget>,
    pub custom_field_id: ValueNumber,
    pub notification_subject: ValueString<'a>,
    pub content_type: ValueString<'a>,
    pub slack_workspace: ValueString<'a>,
    pub slack_channel: ValueString<'a>,
    pub slack_title: ValueString<'a>,
}

/// Recipient of a notification: a user or group id, or a name like `requester_id`
///
/// Always stored as a string in Terraform state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(untagged)]
pub enum ActionTarget {
    Id(i64),
    Name(String),
}

impl Serialize for ActionTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Display for ActionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionTarget::Id(id) => write!(f, "{id}"),
            ActionTarget::Name(name) => f.write_str(name),
        }
    }
}

pub fn validate_actions(
    diags: &mut Diagnostics,
    kind: ResourceKind,
    actions: &ValueList<Value<ActionSpec>>,
    attr_path: AttributePath,
) {
    for (i, action) in actions.iter().flatten().enumerate() {
        if let Value::Value(action) = action {
            validate_action(diags, kind, action, &attr_path.clone().index(i as i64));
        }
    }
}

pub fn validate_action(
    diags: &mut Diagnostics,
    kind: ResourceKind,
    action: &ActionSpec,
    attr_path: &AttributePath,
) {
    let field = match &action.field {
        Value::Value(field) => field.as_ref(),
        Value::Null => {
            diags.error_short("`field` is required", attr_path.clone().attribute("field"));
            return;
        }
        Value::Unknown => return,
    };
    if action.value.is_unknown() {
        return;
    }
    let Some(field) = resolve_field(diags, field, &action.custom_field_id, attr_path) else {
        return;
    };

    let table = action_table(kind);
    let Some(shape) = table.lookup(&field) else {
        diags.error(
            format!("Invalid action `{field}` for a {kind}"),
            format!("Acceptable fields are: {}", table.describe()),
            attr_path.clone().attribute("field"),
        );
        return;
    };

    let has_target = match &action.target {
        Value::Value(_) => true,
        Value::Null => false,
        Value::Unknown => return,
    };
    if has_target != shape.has_target() {
        let detail = if has_target {
            format!("`{field}` does not take a `target`")
        } else {
            format!("`{field}` requires a `target`")
        };
        diags.error(
            "Invalid action value",
            detail,
            attr_path.clone().attribute("target"),
        );
        return;
    }

    let (required, optional): (&[&str], &[&str]) = match shape {
        ActionShape::Plain | ActionShape::Target => (&[], &[]),
        ActionShape::TargetWithSubject => (&["notification_subject"], &[]),
        ActionShape::SideConversation => (&["notification_subject", "content_type"], &[]),
        ActionShape::Slack => (&["slack_workspace", "slack_channel"], &["slack_title"]),
    };
    let companions = [
        ("notification_subject", &action.notification_subject),
        ("content_type", &action.content_type),
        ("slack_workspace", &action.slack_workspace),
        ("slack_channel", &action.slack_channel),
        ("slack_title", &action.slack_title),
    ];
    for (name, value) in companions {
        if required.contains(&name) {
            if value.is_null() {
                diags.error(
                    format!("Missing `{name}`"),
                    format!("`{field}` actions require `{name}`"),
                    attr_path.clone().attribute(name),
                );
            }
        } else if !optional.contains(&name) && value.is_value() {
            diags.error(
                format!("Unexpected `{name}`"),
                format!("`{field}` actions do not take `{name}`"),
                attr_path.clone().attribute(name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::{Value, ValueString};
    use tf_provider::{AttributePath, Diagnostics};

    use super::{validate_action, validate_actions, ActionSpec, ActionTarget};
    use crate::validation::tables::ResourceKind;

    fn action(field: &str, value: &str) -> ActionSpec<'static> {
        ActionSpec {
            field: ValueString::from(field.to_owned()),
            value: ValueString::from(value.to_owned()),
            ..Default::default()
        }
    }

    fn check(kind: ResourceKind, action: &ActionSpec) -> Diagnostics {
        let mut diags = Diagnostics::default();
        validate_action(&mut diags, kind, action, &AttributePath::new("actions").index(0));
        diags
    }

    #[test]
    fn unknown_field_is_rejected_for_every_kind() {
        for kind in ResourceKind::ALL {
            let diags = check(kind, &action("not_a_field", "x"));
            assert_eq!(diags.errors.len(), 1, "{kind}");
            assert!(diags.errors[0].summary.contains("not_a_field"));
            assert_eq!(
                diags.errors[0].attribute,
                AttributePath::new("actions").index(0).attribute("field")
            );
        }
    }

    #[test]
    fn custom_field_is_valid_for_every_kind() {
        for kind in ResourceKind::ALL {
            let mut custom = action("custom_field", "yes");
            custom.custom_field_id = Value::Value(360001);
            let diags = check(kind, &custom);
            assert!(diags.errors.is_empty(), "{kind}: {:?}", diags.errors);
        }
    }

    #[test]
    fn custom_field_without_id() {
        let diags = check(ResourceKind::Trigger, &action("custom_field", "yes"));
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("actions").index(0).attribute("custom_field_id")
        );
    }

    #[test]
    fn target_decides_the_shape() {
        let mut notify = action("notification_user", "Ticket updated");
        notify.notification_subject = ValueString::from("Update");
        assert_eq!(check(ResourceKind::Trigger, &notify).errors.len(), 1);

        notify.target = Value::Value(ActionTarget::Name("requester_id".into()));
        assert!(check(ResourceKind::Trigger, &notify).errors.is_empty());

        let mut status = action("status", "solved");
        assert!(check(ResourceKind::Trigger, &status).errors.is_empty());
        status.target = Value::Value(ActionTarget::Id(42));
        let diags = check(ResourceKind::Trigger, &status);
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("actions").index(0).attribute("target")
        );
    }

    #[test]
    fn unknown_values_are_deferred() {
        let mut unknown = action("notification_user", "x");
        unknown.target = Value::Unknown;
        assert!(check(ResourceKind::Trigger, &unknown).errors.is_empty());

        let mut unknown = action("not_a_field", "x");
        unknown.value = Value::Unknown;
        assert!(check(ResourceKind::Trigger, &unknown).errors.is_empty());

        let mut unknown = action("status", "x");
        unknown.field = Value::Unknown;
        assert!(check(ResourceKind::Macro, &unknown).errors.is_empty());
    }

    #[test]
    fn side_conversation_companions() {
        let mut side = action("side_conversation", "Hello");
        side.notification_subject = ValueString::from("Question");
        let diags = check(ResourceKind::Trigger, &side);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("content_type"));

        side.content_type = ValueString::from("text/html");
        assert!(check(ResourceKind::Trigger, &side).errors.is_empty());

        let mut slack = action("side_conversation_slack", "Hello");
        slack.slack_workspace = ValueString::from("T0123");
        slack.slack_channel = ValueString::from("C0456");
        assert!(check(ResourceKind::Trigger, &slack).errors.is_empty());
        slack.slack_title = ValueString::from("Escalation");
        assert!(check(ResourceKind::Trigger, &slack).errors.is_empty());

        let mut plain = action("priority", "high");
        plain.slack_channel = ValueString::from("C0456");
        assert_eq!(check(ResourceKind::Automation, &plain).errors.len(), 1);
    }

    #[test]
    fn list_paths_are_indexed() {
        let actions = Value::Value(vec![
            Value::Value(action("status", "open")),
            Value::Null,
            Value::Value(action("bogus", "x")),
        ]);
        let mut diags = Diagnostics::default();
        validate_actions(
            &mut diags,
            ResourceKind::Automation,
            &actions,
            AttributePath::new("actions"),
        );
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(
            diags.errors[0].attribute,
            AttributePath::new("actions").index(2).attribute("field")
        );
    }
}
