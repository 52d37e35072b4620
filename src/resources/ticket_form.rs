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

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueList, ValueMap, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, RawValue};

use crate::client::Endpoint;
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::upgrade;
use crate::utils::{
    attribute, id_attribute, id_value, list_value, string, string_value, url_attribute,
    WithUnknown,
};
use crate::validation::form_condition::{format_key, parse_key};
use crate::validation::{
    validate_form_conditions, ChildFieldCondition, FormCondition, FormConditionType,
    RequiredOnStatuses,
};

/// Set of ticket fields shown together
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketForm;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TicketFormState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub name: ValueString<'a>,
    pub display_name: ValueString<'a>,
    pub position: ValueNumber,
    pub active: ValueBool,
    pub default: ValueBool,
    pub end_user_visible: ValueBool,
    pub in_all_brands: ValueBool,
    pub restricted_brand_ids: ValueList<ValueNumber>,
    pub ticket_field_ids: ValueList<ValueNumber>,
    pub agent_conditions: ValueMap<'a, Value<FormCondition<'a>>>,
    pub end_user_conditions: ValueMap<'a, Value<FormCondition<'a>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TicketFormApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_user_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_all_brands: Option<bool>,
    pub restricted_brand_ids: Vec<i64>,
    pub ticket_field_ids: Vec<i64>,
    pub agent_conditions: Vec<FormConditionApi>,
    pub end_user_conditions: Vec<FormConditionApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FormConditionApi {
    pub parent_field_id: i64,
    /// String for dropdowns, boolean for checkboxes
    pub value: JsonValue,
    pub child_fields: Vec<ChildFieldApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChildFieldApi {
    pub id: i64,
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_on_statuses: Option<RequiredOnStatusesApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RequiredOnStatusesApi {
    #[serde(rename = "type")]
    pub status_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<String>>,
}

impl Endpoint for TicketFormApi {
    const COLLECTION: &'static str = "ticket_forms";
    const KEY: &'static str = "ticket_form";
}

fn numbers(value: &ValueList<ValueNumber>) -> Vec<i64> {
    value
        .iter()
        .flatten()
        .filter_map(|number| number.as_ref_option().copied())
        .collect()
}

fn number_list(prior: &ValueList<ValueNumber>, numbers: Vec<i64>) -> ValueList<ValueNumber> {
    list_value(prior, numbers.into_iter().map(Value::Value).collect())
}

fn condition_value(value: &str) -> JsonValue {
    match value {
        "true" => JsonValue::Bool(true),
        "false" => JsonValue::Bool(false),
        value => JsonValue::String(value.to_owned()),
    }
}

fn condition_key(condition: &FormConditionApi) -> String {
    match &condition.value {
        JsonValue::String(value) => format_key(condition.parent_field_id, value),
        value => format_key(condition.parent_field_id, &value.to_string()),
    }
}

fn child_field_to_api(child: &ChildFieldCondition) -> ChildFieldApi {
    ChildFieldApi {
        id: child.id.as_ref_option().copied().unwrap_or_default(),
        is_required: child.is_required.as_ref_option().copied().unwrap_or_default(),
        required_on_statuses: child.required_on_statuses.as_ref_option().map(|required| {
            RequiredOnStatusesApi {
                status_type: string(&required.status_type).unwrap_or_default(),
                statuses: required
                    .statuses
                    .as_ref_option()
                    .map(|statuses| statuses.iter().filter_map(string).collect()),
            }
        }),
    }
}

fn child_field_from_api<'a>(child: ChildFieldApi) -> ChildFieldCondition<'a> {
    ChildFieldCondition {
        id: Value::Value(child.id),
        is_required: Value::Value(child.is_required),
        required_on_statuses: child
            .required_on_statuses
            .map(|required| RequiredOnStatuses {
                status_type: string_value(Some(required.status_type)),
                statuses: required
                    .statuses
                    .filter(|statuses| !statuses.is_empty())
                    .map(|statuses| {
                        statuses
                            .into_iter()
                            .map(|status| Value::Value(Cow::Owned(status)))
                            .collect()
                    })
                    .into(),
            })
            .into(),
    }
}

pub(crate) fn form_conditions_to_api(
    conditions: &ValueMap<Value<FormCondition>>,
) -> Vec<FormConditionApi> {
    conditions
        .iter()
        .flatten()
        .filter_map(|(key, condition)| {
            let (parent_field_id, value) = parse_key(key)?;
            let condition = condition.as_ref_option()?;
            Some(FormConditionApi {
                parent_field_id,
                value: condition_value(value),
                child_fields: condition
                    .child_fields
                    .iter()
                    .flatten()
                    .filter_map(Value::as_ref_option)
                    .map(child_field_to_api)
                    .collect(),
            })
        })
        .collect()
}

pub(crate) fn form_conditions_from_api<'a>(
    prior: &ValueMap<Value<FormCondition>>,
    conditions: Vec<FormConditionApi>,
) -> ValueMap<'a, Value<FormCondition<'a>>> {
    if conditions.is_empty() && prior.is_null() {
        return Value::Null;
    }
    let conditions: BTreeMap<_, _> = conditions
        .into_iter()
        .map(|condition| {
            let key = condition_key(&condition);
            let child_fields = condition
                .child_fields
                .into_iter()
                .map(|child| Value::Value(child_field_from_api(child)))
                .collect();
            (
                Cow::Owned(key),
                Value::Value(FormCondition {
                    child_fields: Value::Value(child_fields),
                }),
            )
        })
        .collect();
    Value::Value(conditions)
}

fn form_conditions_attribute(description: &'static str) -> Attribute {
    Attribute {
        attr_type: AttributeType::AttributeMap(map! {
            "child_fields" => Attribute {
                attr_type: AttributeType::AttributeList(map! {
                    "id" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::Required,
                        "Id of the ticket field shown by the condition",
                    ),
                    "is_required" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::Required,
                        "Whether the child field must be filled",
                    ),
                    "required_on_statuses" => Attribute {
                        attr_type: AttributeType::AttributeSingle(map! {
                            "type" => attribute(
                                AttributeType::String,
                                AttributeConstraint::Required,
                                "One of `NO_STATUSES`, `SOME_STATUSES` or `ALL_STATUSES`",
                            ),
                            "statuses" => attribute(
                                AttributeType::List(Box::new(AttributeType::String)),
                                AttributeConstraint::Optional,
                                "Statuses on which the field is required, with `SOME_STATUSES`",
                            ),
                        }),
                        description: Description::plain(
                            "Ticket statuses on which the field is required, \
                             for agent conditions only",
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                }),
                description: Description::plain("Fields shown when the parent field has the value"),
                constraint: AttributeConstraint::Required,
                ..Default::default()
            },
        }),
        description: Description::plain(description),
        constraint: AttributeConstraint::Optional,
        ..Default::default()
    }
}

impl<'a> ApiModel for TicketFormState<'a> {
    type Api = TicketFormApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<TicketFormApi> {
        Some(TicketFormApi {
            name: string(&self.name).unwrap_or_default(),
            display_name: string(&self.display_name),
            position: self.position.as_ref_option().copied(),
            active: self.active.as_ref_option().copied(),
            default: self.default.as_ref_option().copied(),
            end_user_visible: self.end_user_visible.as_ref_option().copied(),
            in_all_brands: self.in_all_brands.as_ref_option().copied(),
            restricted_brand_ids: numbers(&self.restricted_brand_ids),
            ticket_field_ids: numbers(&self.ticket_field_ids),
            agent_conditions: form_conditions_to_api(&self.agent_conditions),
            end_user_conditions: form_conditions_to_api(&self.end_user_conditions),
            ..Default::default()
        })
    }

    fn from_response(self, response: TicketFormApi) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            name: string_value(Some(response.name)),
            display_name: string_value(response.display_name),
            position: response.position.into(),
            active: response.active.into(),
            default: response.default.into(),
            end_user_visible: response.end_user_visible.into(),
            in_all_brands: response.in_all_brands.into(),
            restricted_brand_ids: number_list(
                &self.restricted_brand_ids,
                response.restricted_brand_ids,
            ),
            ticket_field_ids: number_list(&self.ticket_field_ids, response.ticket_field_ids),
            agent_conditions: form_conditions_from_api(
                &self.agent_conditions,
                response.agent_conditions,
            ),
            end_user_conditions: form_conditions_from_api(
                &self.end_user_conditions,
                response.end_user_conditions,
            ),
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

impl ZendeskObject for TicketForm {
    const NAME: &'static str = "ticket form";
    type Api = TicketFormApi;
    type State<'a> = TicketFormState<'a>;

    fn schema(&self) -> Schema {
        let flag = |description| {
            attribute(
                AttributeType::Bool,
                AttributeConstraint::OptionalComputed,
                description,
            )
        };
        let ids = |description| {
            attribute(
                AttributeType::List(Box::new(AttributeType::Number)),
                AttributeConstraint::Optional,
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
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the form shown to agents",
                    ),
                    "display_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::OptionalComputed,
                        "Name of the form shown to end users",
                    ),
                    "position" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::OptionalComputed,
                        "Position of the form in the form list",
                    ),
                    "active" => flag("Whether the form is usable"),
                    "default" => flag("Whether the form is the default form"),
                    "end_user_visible" => flag("Whether end users can choose the form"),
                    "in_all_brands" => flag("Whether the form is available in every brand"),
                    "restricted_brand_ids" => ids("Brands the form is restricted to"),
                    "ticket_field_ids" => ids("Ticket fields of the form, in order"),
                    "agent_conditions" => form_conditions_attribute(
                        "Conditional fields shown to agents, keyed by `<parent_field_id>:<value>`",
                    ),
                    "end_user_conditions" => form_conditions_attribute(
                        "Conditional fields shown to end users, \
                         keyed by `<parent_field_id>:<value>`",
                    ),
                },
                description: Description::plain("Zendesk ticket form"),
                ..Default::default()
            },
        }
    }

    fn validate<'a>(&self, diags: &mut Diagnostics, config: &TicketFormState<'a>) {
        validate_form_conditions(
            diags,
            FormConditionType::Agent,
            &config.agent_conditions,
            AttributePath::new(FormConditionType::Agent.attribute()),
        );
        validate_form_conditions(
            diags,
            FormConditionType::EndUser,
            &config.end_user_conditions,
            AttributePath::new(FormConditionType::EndUser.attribute()),
        );
    }

    fn plan_create<'a>(&self, state: &mut TicketFormState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.display_name.unknown_if_null();
        state.position.unknown_if_null();
        state.active.unknown_if_null();
        state.default.unknown_if_null();
        state.end_user_visible.unknown_if_null();
        state.in_all_brands.unknown_if_null();
    }

    fn upgrade<'a>(
        &self,
        diags: &mut Diagnostics,
        version: i64,
        prior_state: &RawValue,
    ) -> Option<TicketFormState<'a>> {
        if version != 0 {
            return upgrade::unsupported(diags, Self::NAME, version);
        }
        let state = upgrade::upgrade_form_conditions(diags, prior_state)?;
        upgrade::decode(diags, state)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tf_provider::value::{Value, ValueMap};
    use tf_provider::{Diagnostics, RawValue};

    use super::{
        form_conditions_from_api, form_conditions_to_api, FormConditionApi, TicketForm,
        TicketFormState,
    };
    use crate::resource::ZendeskObject;
    use crate::validation::FormCondition;

    #[test]
    fn conditions_are_keyed_by_parent_and_value() {
        let conditions: Vec<FormConditionApi> = serde_json::from_value(json!([
            {
                "parent_field_id": 100,
                "value": "matrix:red",
                "child_fields": [{
                    "id": 200,
                    "is_required": true,
                    "required_on_statuses": {"type": "SOME_STATUSES", "statuses": ["new", "open"]},
                }],
            },
            {
                "parent_field_id": 101,
                "value": true,
                "child_fields": [{"id": 201, "is_required": false}],
            },
        ]))
        .unwrap();

        let prior: ValueMap<Value<FormCondition>> = Value::Null;
        let state = form_conditions_from_api(&prior, conditions.clone());
        let map = state.as_ref_option().unwrap();
        assert_eq!(
            map.keys().map(|key| key.as_ref()).collect::<Vec<_>>(),
            vec!["100:matrix:red", "101:true"]
        );

        let checkbox = map["101:true"].as_ref_option().unwrap();
        let child = checkbox.child_fields.as_ref_option().unwrap()[0]
            .as_ref_option()
            .unwrap();
        assert!(child.required_on_statuses.is_null());

        assert_eq!(form_conditions_to_api(&state), conditions);
    }

    #[test]
    fn empty_conditions_stay_null() {
        let prior: ValueMap<Value<FormCondition>> = Value::Null;
        assert!(form_conditions_from_api(&prior, vec![]).is_null());

        let prior: ValueMap<Value<FormCondition>> = Value::Value(Default::default());
        assert_eq!(
            form_conditions_from_api(&prior, vec![]),
            Value::Value(Default::default())
        );
    }

    #[test]
    fn version_0_condition_sets_become_keyed_maps() {
        let prior = RawValue::Json(
            serde_json::to_vec(&json!({
                "id": "9",
                "name": "Support",
                "ticket_field_ids": [100, 5],
                "agent_conditions": [{
                    "parent_field_id": 100,
                    "value": "b",
                    "child_fields": [{
                        "id": 6,
                        "is_required": false,
                        "required_on_statuses": {"type": "SOME_STATUSES", "statuses": ["open"]}
                    }]
                }],
                "end_user_conditions": [{
                    "parent_field_id": 100,
                    "value": "a",
                    "child_fields": [{"id": 5, "is_required": true}]
                }]
            }))
            .unwrap(),
        );
        let mut diags = Diagnostics::default();

        let state: TicketFormState = TicketForm.upgrade(&mut diags, 0, &prior).unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(state.name.as_str(), "Support");

        let end_user = state.end_user_conditions.as_ref_option().unwrap();
        assert_eq!(
            end_user.keys().map(|key| key.as_ref()).collect::<Vec<_>>(),
            vec!["100:a"]
        );
        let children = end_user["100:a"]
            .as_ref_option()
            .unwrap()
            .child_fields
            .as_ref_option()
            .unwrap();
        assert_eq!(children.len(), 1);
        let child = children[0].as_ref_option().unwrap();
        assert_eq!(child.id, Value::Value(5));
        assert_eq!(child.is_required, Value::Value(true));
        assert!(child.required_on_statuses.is_null());

        let agent = state.agent_conditions.as_ref_option().unwrap();
        let children = agent["100:b"]
            .as_ref_option()
            .unwrap()
            .child_fields
            .as_ref_option()
            .unwrap();
        let child = children[0].as_ref_option().unwrap();
        let statuses = child.required_on_statuses.as_ref_option().unwrap();
        assert_eq!(statuses.status_type.as_str(), "SOME_STATUSES");
        assert_eq!(statuses.statuses, Value::Value(vec!["open".into()]));
    }
}
