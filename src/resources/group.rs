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
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueBool, ValueString};
use tf_provider::{map, Diagnostics};

use crate::client::Endpoint;
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::utils::{
    attribute, id_attribute, id_value, string, string_value, url_attribute, WithUnknown,
};

/// Group of agents
#[derive(Debug, Clone, Copy, Default)]
pub struct Group;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub default: ValueBool,
    pub is_public: ValueBool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GroupApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl Endpoint for GroupApi {
    const COLLECTION: &'static str = "groups";
    const KEY: &'static str = "group";
}

impl<'a> ApiModel for GroupState<'a> {
    type Api = GroupApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<GroupApi> {
        Some(GroupApi {
            name: string(&self.name).unwrap_or_default(),
            description: string(&self.description),
            default: self.default.as_ref_option().copied(),
            is_public: self.is_public.as_ref_option().copied(),
            ..Default::default()
        })
    }

    fn from_response(self, response: GroupApi) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            name: string_value(Some(response.name)),
            description: match response.description {
                Some(description) if description.is_empty() && self.description.is_null() => {
                    Value::Null
                }
                description => string_value(description),
            },
            default: response.default.into(),
            is_public: response.is_public.into(),
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

impl ZendeskObject for Group {
    const NAME: &'static str = "group";
    type Api = GroupApi;
    type State<'a> = GroupState<'a>;

    fn schema(&self) -> Schema {
        Schema {
            version: 0,
            block: Block {
                version: 0,
                attributes: map! {
                    "id" => id_attribute(),
                    "url" => url_attribute(),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the group",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the group",
                    ),
                    "default" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether new agents are added to the group",
                    ),
                    "is_public" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether end users can see the group. A private group cannot become public",
                    ),
                },
                description: Description::plain("Zendesk group of agents"),
                ..Default::default()
            },
        }
    }

    fn plan_create<'a>(&self, state: &mut GroupState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.default.unknown_if_null();
        state.is_public.unknown_if_null();
    }
}
