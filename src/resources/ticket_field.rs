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
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics};

use crate::client::Endpoint;
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::utils::{
    attribute, id_attribute, id_value, list_value, string, string_value, url_attribute,
    WithUnknown,
};

/// Custom field of tickets
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketField;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TicketFieldState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    #[serde(rename = "type")]
    pub field_type: ValueString<'a>,
    pub title: ValueString<'a>,
    pub description: ValueString<'a>,
    pub position: ValueNumber,
    pub active: ValueBool,
    pub required: ValueBool,
    pub visible_in_portal: ValueBool,
    pub editable_in_portal: ValueBool,
    pub required_in_portal: ValueBool,
    pub title_in_portal: ValueString<'a>,
    pub regexp_for_validation: ValueString<'a>,
    pub tag: ValueString<'a>,
    pub custom_field_options: ValueList<Value<FieldOptionState<'a>>>,
}

/// Option of a dropdown or multiselect field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FieldOptionState<'a> {
    pub id: ValueNumber,
    pub name: ValueString<'a>,
    pub value: ValueString<'a>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TicketFieldApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub field_type: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_in_portal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable_in_portal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_in_portal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_in_portal: Option<String>,
    pub regexp_for_validation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field_options: Option<Vec<FieldOptionApi>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FieldOptionApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub value: String,
}

impl Endpoint for TicketFieldApi {
    const COLLECTION: &'static str = "ticket_fields";
    const KEY: &'static str = "ticket_field";
}

pub(crate) fn options_to_api(
    options: &ValueList<Value<FieldOptionState>>,
) -> Option<Vec<FieldOptionApi>> {
    options.as_ref_option().map(|options| {
        options
            .iter()
            .filter_map(Value::as_ref_option)
            .map(|option| FieldOptionApi {
                id: option.id.as_ref_option().copied(),
                name: string(&option.name).unwrap_or_default(),
                value: string(&option.value).unwrap_or_default(),
            })
            .collect()
    })
}

pub(crate) fn options_from_api<'a>(
    prior: &ValueList<Value<FieldOptionState>>,
    options: Option<Vec<FieldOptionApi>>,
) -> ValueList<Value<FieldOptionState<'a>>> {
    let options = options
        .unwrap_or_default()
        .into_iter()
        .map(|option| {
            Value::Value(FieldOptionState {
                id: option.id.into(),
                name: string_value(Some(option.name)),
                value: string_value(Some(option.value)),
            })
        })
        .collect();
    list_value(prior, options)
}

/// New options get their id on apply
pub(crate) fn plan_options(options: &mut ValueList<Value<FieldOptionState>>) {
    for option in options.iter_mut().flatten() {
        if let Value::Value(option) = option {
            option.id.unknown_if_null();
        }
    }
}

pub(crate) fn options_attribute(description: &'static str) -> Attribute {
    Attribute {
        attr_type: AttributeType::AttributeList(map! {
            "id" => attribute(
                AttributeType::Number,
                AttributeConstraint::Computed,
                "Id of the option",
            ),
            "name" => attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                "Name of the option shown to users",
            ),
            "value" => attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                "Value of the option, used as a tag for ticket fields",
            ),
        }),
        description: Description::plain(description),
        constraint: AttributeConstraint::Optional,
        ..Default::default()
    }
}

impl<'a> ApiModel for TicketFieldState<'a> {
    type Api = TicketFieldApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<TicketFieldApi> {
        Some(TicketFieldApi {
            field_type: string(&self.field_type).unwrap_or_default(),
            title: string(&self.title).unwrap_or_default(),
            description: string(&self.description),
            position: self.position.as_ref_option().copied(),
            active: self.active.as_ref_option().copied(),
            required: self.required.as_ref_option().copied(),
            visible_in_portal: self.visible_in_portal.as_ref_option().copied(),
            editable_in_portal: self.editable_in_portal.as_ref_option().copied(),
            required_in_portal: self.required_in_portal.as_ref_option().copied(),
            title_in_portal: string(&self.title_in_portal),
            regexp_for_validation: string(&self.regexp_for_validation),
            tag: string(&self.tag),
            custom_field_options: options_to_api(&self.custom_field_options),
            ..Default::default()
        })
    }

    fn from_response(self, response: TicketFieldApi) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            field_type: string_value(Some(response.field_type)),
            title: string_value(Some(response.title)),
            description: string_value(response.description.filter(|d| !d.is_empty())),
            position: response.position.into(),
            active: response.active.into(),
            required: response.required.into(),
            visible_in_portal: response.visible_in_portal.into(),
            editable_in_portal: response.editable_in_portal.into(),
            required_in_portal: response.required_in_portal.into(),
            title_in_portal: string_value(response.title_in_portal),
            regexp_for_validation: string_value(response.regexp_for_validation),
            tag: match (self.tag.is_null(), response.tag) {
                (true, Some(tag)) if tag.is_empty() => Value::Null,
                (_, tag) => string_value(tag),
            },
            custom_field_options: options_from_api(
                &self.custom_field_options,
                response.custom_field_options,
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

impl ZendeskObject for TicketField {
    const NAME: &'static str = "ticket field";
    type Api = TicketFieldApi;
    type State<'a> = TicketFieldState<'a>;

    fn schema(&self) -> Schema {
        let flag = |description| {
            attribute(
                AttributeType::Bool,
                AttributeConstraint::OptionalComputed,
                description,
            )
        };
        Schema {
            version: 0,
            block: Block {
                version: 0,
                attributes: map! {
                    "id" => id_attribute(),
                    "url" => url_attribute(),
                    "type" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Type of the field, eg: `text`, `tagger`, `checkbox`. \
                         Changing it replaces the field",
                    ),
                    "title" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Title of the field shown to agents",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the field",
                    ),
                    "position" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::OptionalComputed,
                        "Position of the field in the ticket",
                    ),
                    "active" => flag("Whether the field is usable"),
                    "required" => flag("Whether agents must fill the field to solve a ticket"),
                    "visible_in_portal" => flag("Whether end users can see the field"),
                    "editable_in_portal" => flag("Whether end users can edit the field"),
                    "required_in_portal" => flag("Whether end users must fill the field"),
                    "title_in_portal" => attribute(
                        AttributeType::String,
                        AttributeConstraint::OptionalComputed,
                        "Title of the field shown to end users",
                    ),
                    "regexp_for_validation" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Regular expression validating `regexp` fields",
                    ),
                    "tag" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Tag added to tickets when a checkbox field is checked",
                    ),
                    "custom_field_options" => options_attribute(
                        "Options of dropdown and multiselect fields",
                    ),
                },
                description: Description::plain("Zendesk ticket field"),
                ..Default::default()
            },
        }
    }

    fn plan_create<'a>(&self, state: &mut TicketFieldState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.position.unknown_if_null();
        state.active.unknown_if_null();
        state.required.unknown_if_null();
        state.visible_in_portal.unknown_if_null();
        state.editable_in_portal.unknown_if_null();
        state.required_in_portal.unknown_if_null();
        state.title_in_portal.unknown_if_null();
        plan_options(&mut state.custom_field_options);
    }

    fn plan_update<'a>(&self, state: &mut TicketFieldState<'a>) {
        plan_options(&mut state.custom_field_options);
    }

    fn requires_replace<'a>(
        &self,
        prior: &TicketFieldState<'a>,
        proposed: &TicketFieldState<'a>,
    ) -> Vec<AttributePath> {
        if prior.field_type != proposed.field_type {
            vec![AttributePath::new("type")]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::{Value, ValueString};
    use tf_provider::AttributePath;

    use super::{FieldOptionState, TicketField, TicketFieldState};
    use crate::resource::ZendeskObject;

    #[test]
    fn type_change_replaces_the_field() {
        let prior = TicketFieldState {
            field_type: ValueString::from("text"),
            title: ValueString::from("Plan"),
            ..Default::default()
        };
        let retitled = TicketFieldState {
            title: ValueString::from("Subscription"),
            ..prior.clone()
        };
        assert!(TicketField.requires_replace(&prior, &retitled).is_empty());

        let retyped = TicketFieldState {
            field_type: ValueString::from("tagger"),
            ..prior.clone()
        };
        assert_eq!(
            TicketField.requires_replace(&prior, &retyped),
            vec![AttributePath::new("type")]
        );
    }

    #[test]
    fn new_options_get_unknown_ids() {
        let mut state = TicketFieldState {
            custom_field_options: Value::Value(vec![
                Value::Value(FieldOptionState {
                    id: Value::Value(1),
                    name: ValueString::from("Gold"),
                    value: ValueString::from("gold"),
                }),
                Value::Value(FieldOptionState {
                    id: Value::Null,
                    name: ValueString::from("Silver"),
                    value: ValueString::from("silver"),
                }),
            ]),
            ..Default::default()
        };
        TicketField.plan_update(&mut state);
        let options = state.custom_field_options.as_ref_option().unwrap();
        assert_eq!(options[0].as_ref_option().unwrap().id, Value::Value(1));
        assert!(options[1].as_ref_option().unwrap().id.is_unknown());
    }
}
