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
    attribute, id_attribute, id_value, string, string_value, url_attribute, WithUnknown,
};
use crate::validation::{validate_actions, ActionSpec, ResourceKind};

use super::rules::{actions_attribute, actions_from_api, actions_to_api, ActionApi};

/// Set of actions applied by agents on a ticket
#[derive(Debug, Clone, Copy, Default)]
pub struct Macro;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MacroState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub title: ValueString<'a>,
    pub description: ValueString<'a>,
    pub active: ValueBool,
    pub position: ValueNumber,
    pub restriction: Value<RestrictionState<'a>>,
    pub actions: ValueList<Value<ActionSpec<'a>>>,
}

/// Who can use the macro
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RestrictionState<'a> {
    #[serde(rename = "type")]
    pub restriction_type: ValueString<'a>,
    pub ids: ValueList<ValueNumber>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MacroApi {
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
    pub restriction: Option<RestrictionApi>,
    pub actions: Vec<ActionApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RestrictionApi {
    #[serde(rename = "type")]
    pub restriction_type: String,
    pub ids: Vec<i64>,
}

impl Endpoint for MacroApi {
    const COLLECTION: &'static str = "macros";
    const KEY: &'static str = "macro";
}

impl<'a> ApiModel for MacroState<'a> {
    type Api = MacroApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<MacroApi> {
        Some(MacroApi {
            title: string(&self.title).unwrap_or_default(),
            description: string(&self.description),
            active: self.active.as_ref_option().copied(),
            position: self.position.as_ref_option().copied(),
            restriction: self.restriction.as_ref_option().map(|restriction| RestrictionApi {
                restriction_type: string(&restriction.restriction_type).unwrap_or_default(),
                ids: restriction
                    .ids
                    .iter()
                    .flatten()
                    .filter_map(|id| id.as_ref_option().copied())
                    .collect(),
            }),
            actions: actions_to_api(&self.actions),
            ..Default::default()
        })
    }

    fn from_response(self, response: MacroApi) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            title: string_value(Some(response.title)),
            description: string_value(response.description.filter(|d| !d.is_empty())),
            active: response.active.into(),
            position: response.position.into(),
            restriction: response
                .restriction
                .map(|restriction| RestrictionState {
                    restriction_type: string_value(Some(restriction.restriction_type)),
                    ids: Value::Value(restriction.ids.into_iter().map(Value::Value).collect()),
                })
                .into(),
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

impl ZendeskObject for Macro {
    const NAME: &'static str = "macro";
    type Api = MacroApi;
    type State<'a> = MacroState<'a>;

    fn schema(&self) -> Schema {
        Schema {
            version: 0,
            block: Block {
                version: 0,
                attributes: map! {
                    "id" => id_attribute(),
                    "url" => url_attribute(),
                    "title" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Title of the macro",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the macro",
                    ),
                    "active" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether agents can use the macro",
                    ),
                    "position" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::OptionalComputed,
                        "Position of the macro in the list of macros",
                    ),
                    "restriction" => Attribute {
                        attr_type: AttributeType::AttributeSingle(map! {
                            "type" => attribute(
                                AttributeType::String,
                                AttributeConstraint::Required,
                                "`Group` or `User`",
                            ),
                            "ids" => attribute(
                                AttributeType::List(AttributeType::Number.into()),
                                AttributeConstraint::Required,
                                "Ids of the groups or users allowed to use the macro",
                            ),
                        }),
                        description: Description::plain(
                            "Restrict the macro to some groups or users",
                        ),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "actions" => actions_attribute(),
                },
                description: Description::plain("Zendesk macro"),
                ..Default::default()
            },
        }
    }

    fn validate<'a>(&self, diags: &mut Diagnostics, config: &MacroState<'a>) {
        validate_actions(
            diags,
            ResourceKind::Macro,
            &config.actions,
            AttributePath::new("actions"),
        );
    }

    fn plan_create<'a>(&self, state: &mut MacroState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.active.unknown_if_null();
        state.position.unknown_if_null();
    }
}
