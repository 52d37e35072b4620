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

/// Brand of the account, with its own help center
#[derive(Debug, Clone, Copy, Default)]
pub struct Brand;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BrandState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub name: ValueString<'a>,
    pub subdomain: ValueString<'a>,
    pub brand_url: ValueString<'a>,
    pub host_mapping: ValueString<'a>,
    pub active: ValueBool,
    pub default: ValueBool,
    pub signature_template: ValueString<'a>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BrandApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub name: String,
    pub subdomain: String,
    #[serde(skip_serializing)]
    pub brand_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_mapping: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing)]
    pub default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_template: Option<String>,
}

impl Endpoint for BrandApi {
    const COLLECTION: &'static str = "brands";
    const KEY: &'static str = "brand";
}

impl<'a> ApiModel for BrandState<'a> {
    type Api = BrandApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<BrandApi> {
        Some(BrandApi {
            name: string(&self.name).unwrap_or_default(),
            subdomain: string(&self.subdomain).unwrap_or_default(),
            host_mapping: string(&self.host_mapping),
            active: self.active.as_ref_option().copied(),
            signature_template: string(&self.signature_template),
            ..Default::default()
        })
    }

    fn from_response(self, response: BrandApi) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            name: string_value(Some(response.name)),
            subdomain: string_value(Some(response.subdomain)),
            brand_url: string_value(response.brand_url),
            host_mapping: string_value(response.host_mapping),
            active: response.active.into(),
            default: response.default.into(),
            signature_template: string_value(response.signature_template),
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

impl ZendeskObject for Brand {
    const NAME: &'static str = "brand";
    type Api = BrandApi;
    type State<'a> = BrandState<'a>;

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
                        "Name of the brand",
                    ),
                    "subdomain" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Subdomain of the brand help center",
                    ),
                    "brand_url" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "URL of the brand help center",
                    ),
                    "host_mapping" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Custom domain of the brand help center",
                    ),
                    "active" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether the brand is active",
                    ),
                    "default" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::Computed,
                        "Whether the brand is the default brand of the account",
                    ),
                    "signature_template" => attribute(
                        AttributeType::String,
                        AttributeConstraint::OptionalComputed,
                        "Signature appended to agent comments",
                    ),
                },
                description: Description::plain("Zendesk brand"),
                ..Default::default()
            },
        }
    }

    fn plan_create<'a>(&self, state: &mut BrandState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.brand_url = Value::Unknown;
        state.default = Value::Unknown;
        state.active.unknown_if_null();
        state.signature_template.unknown_if_null();
    }
}
