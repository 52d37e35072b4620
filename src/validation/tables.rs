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

//! Fields and operators accepted by Zendesk business rules
//!
//! Tables are built once and only read afterwards.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::OnceLock;

/// Kind of business rule owning conditions or actions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Trigger,
    Automation,
    View,
    Sla,
    Macro,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Trigger,
        ResourceKind::Automation,
        ResourceKind::View,
        ResourceKind::Sla,
        ResourceKind::Macro,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Trigger => "trigger",
            ResourceKind::Automation => "automation",
            ResourceKind::View => "view",
            ResourceKind::Sla => "sla policy",
            ResourceKind::Macro => "macro",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes an action must carry beside its `value`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionShape {
    /// `value` only
    Plain,
    /// `target` and `value`
    Target,
    /// `target`, `notification_subject` and `value`
    TargetWithSubject,
    /// `notification_subject`, `content_type` and `value`
    SideConversation,
    /// `slack_workspace`, `slack_channel`, `value` and optionally `slack_title`
    Slack,
}

impl ActionShape {
    pub fn has_target(self) -> bool {
        matches!(self, ActionShape::Target | ActionShape::TargetWithSubject)
    }
}

/// Expected values of a condition, decided by its operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueShape {
    /// Neither `value` nor `values`
    Empty,
    /// `value`
    Single,
    /// `values`
    Multi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConditionRule {
    /// Accepted operators, empty if the field takes no operator
    pub operators: &'static [&'static str],
    /// `includes` and `not_includes` take a list of values
    pub multi: bool,
}

impl ConditionRule {
    const fn new(operators: &'static [&'static str]) -> Self {
        Self {
            operators,
            multi: false,
        }
    }

    const fn multi(operators: &'static [&'static str]) -> Self {
        Self {
            operators,
            multi: true,
        }
    }

    pub fn accepts(&self, operator: Option<&str>) -> bool {
        match operator {
            None => self.operators.is_empty(),
            Some(operator) => self.operators.contains(&operator),
        }
    }

    pub fn shape(&self, operator: Option<&str>) -> ValueShape {
        match operator {
            Some("present" | "not_present" | "changed" | "not_changed") => ValueShape::Empty,
            Some("includes" | "not_includes") if self.multi => ValueShape::Multi,
            _ => ValueShape::Single,
        }
    }
}

/// Field lookup with dynamic field families
#[derive(Debug)]
pub struct ValidityTable<R> {
    fields: BTreeMap<&'static str, R>,
    prefixes: Vec<(&'static str, R)>,
}

impl<R: Copy> ValidityTable<R> {
    fn new(fields: &[(&'static str, R)], prefixes: &[(&'static str, R)]) -> Self {
        Self {
            fields: fields.iter().copied().collect(),
            prefixes: prefixes.to_vec(),
        }
    }

    pub fn lookup(&self, field: &str) -> Option<R> {
        self.fields.get(field).copied().or_else(|| {
            self.prefixes
                .iter()
                .find(|(prefix, _)| field.len() > prefix.len() && field.starts_with(prefix))
                .map(|(_, rule)| *rule)
        })
    }

    /// Acceptable fields, formatted for diagnostics
    pub fn describe(&self) -> String {
        self.fields
            .keys()
            .map(|field| format!("`{field}`"))
            .chain(self.prefixes.iter().map(|(prefix, _)| format!("`{prefix}<id>`")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub const CUSTOM_FIELDS_PREFIX: &str = "custom_fields_";
const REQUESTER_FIELDS_PREFIX: &str = "requester.custom_fields.";
const ORGANIZATION_FIELDS_PREFIX: &str = "organization.custom_fields.";

const NO_OPERATOR: &[&str] = &[];
const IS: &[&str] = &["is", "is_not"];
const ORDERED: &[&str] = &["is", "is_not", "less_than", "greater_than"];
const CHANGES: &[&str] = &[
    "is",
    "is_not",
    "less_than",
    "greater_than",
    "changed",
    "value",
    "value_previous",
    "not_changed",
    "not_value",
    "not_value_previous",
];
const ID_CHANGES: &[&str] = &[
    "is",
    "is_not",
    "changed",
    "value",
    "value_previous",
    "not_changed",
    "not_value",
    "not_value_previous",
];
const STATUS_CHANGES: &[&str] = &[
    "includes",
    "not_includes",
    "is",
    "is_not",
    "changed",
    "value",
    "value_previous",
    "not_changed",
    "not_value",
    "not_value_previous",
];
const STATUS_IS: &[&str] = &["includes", "not_includes", "is", "is_not"];
const TAGS: &[&str] = &["includes", "not_includes"];
const WORDS: &[&str] = &["includes", "not_includes", "is", "is_not"];
const CUSTOM: &[&str] = &[
    "is",
    "is_not",
    "present",
    "not_present",
    "includes",
    "not_includes",
    "less_than",
    "greater_than",
    "changed",
    "not_changed",
];
const HOURS: &[&str] = &[
    "is",
    "less_than",
    "greater_than",
    "is_business_hours",
    "less_than_business_hours",
    "greater_than_business_hours",
];

/// Time based fields of automations and views, in hours
pub const HOURS_FIELDS: &[&str] = &[
    "NEW",
    "OPEN",
    "PENDING",
    "SOLVED",
    "CLOSED",
    "ASSIGNED_AT",
    "UPDATE",
    "REQUESTER_UPDATED_AT",
    "ASSIGNEE_UPDATED_AT",
    "DUE_DATE",
    "UNTIL_DUE_DATE",
];

const TICKET_ACTIONS: &[(&str, ActionShape)] = &[
    ("status", ActionShape::Plain),
    ("type", ActionShape::Plain),
    ("priority", ActionShape::Plain),
    ("group_id", ActionShape::Plain),
    ("assignee_id", ActionShape::Plain),
    ("set_tags", ActionShape::Plain),
    ("current_tags", ActionShape::Plain),
    ("remove_tags", ActionShape::Plain),
    ("custom_status_id", ActionShape::Plain),
    ("ticket_form_id", ActionShape::Plain),
    ("brand_id", ActionShape::Plain),
];

const NOTIFICATION_ACTIONS: &[(&str, ActionShape)] = &[
    ("notification_user", ActionShape::TargetWithSubject),
    ("notification_group", ActionShape::TargetWithSubject),
    ("notification_target", ActionShape::Target),
    ("notification_webhook", ActionShape::Target),
    ("notification_zis", ActionShape::Target),
    ("satisfaction_score", ActionShape::Plain),
];

const TRIGGER_ACTIONS: &[(&str, ActionShape)] = &[
    ("requester_id", ActionShape::Plain),
    ("locale_id", ActionShape::Plain),
    ("follower", ActionShape::Plain),
    ("side_conversation", ActionShape::SideConversation),
    ("side_conversation_ticket", ActionShape::SideConversation),
    ("side_conversation_slack", ActionShape::Slack),
];

const MACRO_ACTIONS: &[(&str, ActionShape)] = &[
    ("subject", ActionShape::Plain),
    ("comment_value", ActionShape::Plain),
    ("comment_value_html", ActionShape::Plain),
    ("comment_mode_is_public", ActionShape::Plain),
    ("side_conversation", ActionShape::SideConversation),
];

const TICKET_CONDITIONS: &[(&str, ConditionRule)] = &[
    ("type", ConditionRule::new(ID_CHANGES)),
    ("group_id", ConditionRule::new(ID_CHANGES)),
    ("assignee_id", ConditionRule::new(ID_CHANGES)),
    ("requester_id", ConditionRule::new(ID_CHANGES)),
    ("organization_id", ConditionRule::new(ID_CHANGES)),
    ("current_tags", ConditionRule::new(TAGS)),
    ("via_id", ConditionRule::new(IS)),
    ("brand_id", ConditionRule::new(IS)),
    ("ticket_form_id", ConditionRule::new(ID_CHANGES)),
];

const TRIGGER_CONDITIONS: &[(&str, ConditionRule)] = &[
    ("status", ConditionRule::new(CHANGES)),
    ("priority", ConditionRule::new(CHANGES)),
    ("custom_status_id", ConditionRule::multi(STATUS_CHANGES)),
    ("satisfaction_score", ConditionRule::new(CHANGES)),
    ("update_type", ConditionRule::new(NO_OPERATOR)),
    ("comment_is_public", ConditionRule::new(NO_OPERATOR)),
    ("ticket_is_public", ConditionRule::new(NO_OPERATOR)),
    ("reopens", ConditionRule::new(ORDERED)),
    ("replies", ConditionRule::new(ORDERED)),
    ("agent_stations", ConditionRule::new(ORDERED)),
    ("group_stations", ConditionRule::new(ORDERED)),
    ("recipient", ConditionRule::new(IS)),
    ("role", ConditionRule::new(IS)),
    ("current_via_id", ConditionRule::new(IS)),
    ("locale_id", ConditionRule::new(IS)),
    ("subject_includes_word", ConditionRule::new(WORDS)),
    ("comment_includes_word", ConditionRule::new(WORDS)),
];

const SCHEDULED_CONDITIONS: &[(&str, ConditionRule)] = &[
    ("status", ConditionRule::new(ORDERED)),
    ("priority", ConditionRule::new(ORDERED)),
    ("custom_status_id", ConditionRule::multi(STATUS_IS)),
    ("satisfaction_score", ConditionRule::new(IS)),
    ("recipient", ConditionRule::new(IS)),
];

const SLA_CONDITIONS: &[(&str, ConditionRule)] = &[
    ("priority", ConditionRule::new(IS)),
    ("custom_status_id", ConditionRule::multi(STATUS_IS)),
];

const CONDITION_PREFIXES: &[(&str, ConditionRule)] = &[
    (CUSTOM_FIELDS_PREFIX, ConditionRule::new(CUSTOM)),
    (REQUESTER_FIELDS_PREFIX, ConditionRule::new(CUSTOM)),
    (ORGANIZATION_FIELDS_PREFIX, ConditionRule::new(CUSTOM)),
];

const ACTION_PREFIXES: &[(&str, ActionShape)] = &[(CUSTOM_FIELDS_PREFIX, ActionShape::Plain)];

struct Tables {
    actions: BTreeMap<ResourceKind, ValidityTable<ActionShape>>,
    conditions: BTreeMap<ResourceKind, ValidityTable<ConditionRule>>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let hours: Vec<_> = HOURS_FIELDS
            .iter()
            .map(|field| (*field, ConditionRule::new(HOURS)))
            .collect();

        let actions = ResourceKind::ALL
            .into_iter()
            .map(|kind| {
                let fields: Vec<_> = match kind {
                    ResourceKind::Trigger => {
                        [TICKET_ACTIONS, NOTIFICATION_ACTIONS, TRIGGER_ACTIONS].concat()
                    }
                    ResourceKind::Automation => [TICKET_ACTIONS, NOTIFICATION_ACTIONS].concat(),
                    ResourceKind::Macro => [TICKET_ACTIONS, MACRO_ACTIONS].concat(),
                    ResourceKind::View | ResourceKind::Sla => Vec::new(),
                };
                (kind, ValidityTable::new(&fields, ACTION_PREFIXES))
            })
            .collect();

        let conditions = ResourceKind::ALL
            .into_iter()
            .map(|kind| {
                let fields: Vec<_> = match kind {
                    ResourceKind::Trigger => [TICKET_CONDITIONS, TRIGGER_CONDITIONS].concat(),
                    ResourceKind::Automation | ResourceKind::View => {
                        [TICKET_CONDITIONS, SCHEDULED_CONDITIONS, hours.as_slice()].concat()
                    }
                    ResourceKind::Sla => [TICKET_CONDITIONS, SLA_CONDITIONS].concat(),
                    ResourceKind::Macro => Vec::new(),
                };
                (kind, ValidityTable::new(&fields, CONDITION_PREFIXES))
            })
            .collect();

        Tables {
            actions,
            conditions,
        }
    })
}

pub fn action_table(kind: ResourceKind) -> &'static ValidityTable<ActionShape> {
    &tables().actions[&kind]
}

pub fn condition_table(kind: ResourceKind) -> &'static ValidityTable<ConditionRule> {
    &tables().conditions[&kind]
}

/// Shape of an action field, whatever the kind of rule
pub fn action_shape(field: &str) -> ActionShape {
    ResourceKind::ALL
        .into_iter()
        .find_map(|kind| action_table(kind).lookup(field))
        .unwrap_or(ActionShape::Plain)
}

#[cfg(test)]
mod tests {
    use super::{
        action_shape, action_table, condition_table, ActionShape, ResourceKind, ValueShape,
    };

    #[test]
    fn custom_fields_are_valid_for_every_kind() {
        for kind in ResourceKind::ALL {
            assert_eq!(
                action_table(kind).lookup("custom_fields_360012"),
                Some(ActionShape::Plain),
                "{kind}"
            );
            assert!(condition_table(kind).lookup("custom_fields_360012").is_some());
        }
    }

    #[test]
    fn bare_prefix_is_not_a_field() {
        assert_eq!(action_table(ResourceKind::Trigger).lookup("custom_fields_"), None);
    }

    #[test]
    fn notification_shapes() {
        let table = action_table(ResourceKind::Trigger);
        assert_eq!(
            table.lookup("notification_user"),
            Some(ActionShape::TargetWithSubject)
        );
        assert_eq!(table.lookup("notification_webhook"), Some(ActionShape::Target));
        assert_eq!(table.lookup("side_conversation_slack"), Some(ActionShape::Slack));
        assert_eq!(action_table(ResourceKind::Macro).lookup("notification_user"), None);
        assert_eq!(action_shape("notification_group"), ActionShape::TargetWithSubject);
        assert_eq!(action_shape("comment_value"), ActionShape::Plain);
    }

    #[test]
    fn views_and_sla_have_no_fixed_actions() {
        assert_eq!(action_table(ResourceKind::View).lookup("status"), None);
        assert_eq!(action_table(ResourceKind::Sla).lookup("status"), None);
    }

    #[test]
    fn hours_only_on_scheduled_rules() {
        assert!(condition_table(ResourceKind::Automation).lookup("NEW").is_some());
        assert!(condition_table(ResourceKind::View).lookup("UNTIL_DUE_DATE").is_some());
        assert!(condition_table(ResourceKind::Trigger).lookup("NEW").is_none());
    }

    #[test]
    fn operator_decides_value_shape() {
        let rule = condition_table(ResourceKind::Trigger)
            .lookup("custom_status_id")
            .unwrap();
        assert_eq!(rule.shape(Some("includes")), ValueShape::Multi);
        assert_eq!(rule.shape(Some("is")), ValueShape::Single);
        assert_eq!(rule.shape(Some("changed")), ValueShape::Empty);

        let tags = condition_table(ResourceKind::Trigger)
            .lookup("current_tags")
            .unwrap();
        assert_eq!(tags.shape(Some("includes")), ValueShape::Single);
    }

    #[test]
    fn operator_less_fields() {
        let rule = condition_table(ResourceKind::Trigger)
            .lookup("update_type")
            .unwrap();
        assert!(rule.accepts(None));
        assert!(!rule.accepts(Some("is")));

        let rule = condition_table(ResourceKind::Trigger).lookup("status").unwrap();
        assert!(!rule.accepts(None));
        assert!(rule.accepts(Some("value_previous")));
    }

    #[test]
    fn describe_lists_fields_and_families() {
        let described = action_table(ResourceKind::View).describe();
        assert_eq!(described, "`custom_fields_<id>`");
        let described = condition_table(ResourceKind::Sla).describe();
        assert!(described.contains("`priority`"));
        assert!(described.contains("`requester.custom_fields.<id>`"));
    }
}
