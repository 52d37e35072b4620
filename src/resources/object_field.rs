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

//! Custom fields of users and organizations
//!
//! Both kinds share the same shape and only differ by their collection.

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, Schema};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics};
use tracing::info;

use crate::client::{endpoint, Endpoint, ZendeskApi};
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::utils::{
    attribute, id_attribute, id_value, string, string_value, url_attribute, WithUnknown,
};

use super::ticket_field::{
    options_attribute, options_from_api, options_to_api, plan_options, FieldOptionApi,
    FieldOptionState,
};

/// Object owning custom fields
pub trait FieldOwner: Debug + Clone + Copy + Default + PartialEq + Send + Sync + 'static {
    const NAME: &'static str;
    const COLLECTION: &'static str;
    const KEY: &'static str;
    /// Zendesk ignores the position given on creation
    const CORRECT_POSITION: bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Users;

impl FieldOwner for Users {
    const NAME: &'static str = "user field";
    const COLLECTION: &'static str = "user_fields";
    const KEY: &'static str = "user_field";
    const CORRECT_POSITION: bool = false;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Organizations;

impl FieldOwner for Organizations {
    const NAME: &'static str = "organization field";
    const COLLECTION: &'static str = "organization_fields";
    const KEY: &'static str = "organization_field";
    const CORRECT_POSITION: bool = true;
}

/// Custom field of the objects owned by `O`
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectField<O: FieldOwner>(PhantomData<O>);

pub type UserField = ObjectField<Users>;
pub type OrganizationField = ObjectField<Organizations>;

impl<O: FieldOwner> ObjectField<O> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(bound = "")]
pub struct ObjectFieldState<'a, O: FieldOwner> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub key: ValueString<'a>,
    #[serde(rename = "type")]
    pub field_type: ValueString<'a>,
    pub title: ValueString<'a>,
    pub description: ValueString<'a>,
    pub position: ValueNumber,
    pub active: ValueBool,
    pub regexp_for_validation: ValueString<'a>,
    pub tag: ValueString<'a>,
    pub custom_field_options: ValueList<Value<FieldOptionState<'a>>>,
    #[serde(skip)]
    owner: PhantomData<O>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, bound = "")]
pub struct ObjectFieldApi<O: FieldOwner> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    pub regexp_for_validation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field_options: Option<Vec<FieldOptionApi>>,
    #[serde(skip)]
    owner: PhantomData<O>,
}

impl<O: FieldOwner> Endpoint for ObjectFieldApi<O> {
    const COLLECTION: &'static str = O::COLLECTION;
    const KEY: &'static str = O::KEY;
}

impl<'a, O: FieldOwner> ApiModel for ObjectFieldState<'a, O> {
    type Api = ObjectFieldApi<O>;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<ObjectFieldApi<O>> {
        Some(ObjectFieldApi {
            key: string(&self.key).unwrap_or_default(),
            field_type: string(&self.field_type).unwrap_or_default(),
            title: string(&self.title).unwrap_or_default(),
            description: string(&self.description),
            position: self.position.as_ref_option().copied(),
            active: self.active.as_ref_option().copied(),
            regexp_for_validation: string(&self.regexp_for_validation),
            tag: string(&self.tag),
            custom_field_options: options_to_api(&self.custom_field_options),
            ..Default::default()
        })
    }

    fn from_response(self, response: ObjectFieldApi<O>) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            key: string_value(Some(response.key)),
            field_type: string_value(Some(response.field_type)),
            title: string_value(Some(response.title)),
            description: string_value(response.description.filter(|d| !d.is_empty())),
            position: response.position.into(),
            active: response.active.into(),
            regexp_for_validation: string_value(response.regexp_for_validation),
            tag: string_value(response.tag),
            custom_field_options: options_from_api(
                &self.custom_field_options,
                response.custom_field_options,
            ),
            owner: PhantomData,
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

#[async_trait]
impl<O: FieldOwner> ZendeskObject for ObjectField<O> {
    const NAME: &'static str = O::NAME;
    type Api = ObjectFieldApi<O>;
    type State<'a> = ObjectFieldState<'a, O>;

    fn schema(&self) -> Schema {
        Schema {
            version: 0,
            block: Block {
                version: 0,
                attributes: map! {
                    "id" => id_attribute(),
                    "url" => url_attribute(),
                    "key" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Unique key of the field in API payloads. Changing it replaces the field",
                    ),
                    "type" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Type of the field, eg: `text`, `dropdown`, `date`. \
                         Changing it replaces the field",
                    ),
                    "title" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Title of the field",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the field",
                    ),
                    "position" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::OptionalComputed,
                        "Position of the field",
                    ),
                    "active" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether the field is usable",
                    ),
                    "regexp_for_validation" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Regular expression validating `regexp` fields",
                    ),
                    "tag" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Tag added when a checkbox field is checked",
                    ),
                    "custom_field_options" => options_attribute("Options of dropdown fields"),
                },
                description: Description::plain(format!("Zendesk {}", O::NAME)),
                ..Default::default()
            },
        }
    }

    fn plan_create<'a>(&self, state: &mut ObjectFieldState<'a, O>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.position.unknown_if_null();
        state.active.unknown_if_null();
        plan_options(&mut state.custom_field_options);
    }

    fn plan_update<'a>(&self, state: &mut ObjectFieldState<'a, O>) {
        plan_options(&mut state.custom_field_options);
    }

    fn requires_replace<'a>(
        &self,
        prior: &ObjectFieldState<'a, O>,
        proposed: &ObjectFieldState<'a, O>,
    ) -> Vec<AttributePath> {
        let mut replace = Vec::new();
        if prior.key != proposed.key {
            replace.push(AttributePath::new("key"));
        }
        if prior.field_type != proposed.field_type {
            replace.push(AttributePath::new("type"));
        }
        replace
    }

    async fn after_create<'a>(
        &self,
        diags: &mut Diagnostics,
        api: &dyn ZendeskApi,
        planned: &ObjectFieldState<'a, O>,
        state: ObjectFieldState<'a, O>,
    ) -> ObjectFieldState<'a, O> {
        let position = match planned.position {
            Value::Value(position) if O::CORRECT_POSITION => position,
            _ => return state,
        };
        if state.position == Value::Value(position) {
            return state;
        }
        let id = state.id.as_deref_option().unwrap_or_default().to_owned();
        let Some(request) = planned.to_request(diags) else {
            return state;
        };
        match endpoint::update(api, &id, request).await {
            Ok(response) => {
                info!(resource = O::NAME, %id, position, "corrected position");
                state.from_response(response)
            }
            Err(err) => {
                diags.root_error(
                    format!("Failed to set the position of {}", O::NAME),
                    format!("{err:#}"),
                );
                state
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::ValueString;
    use tf_provider::AttributePath;

    use super::{ObjectFieldApi, ObjectFieldState, Organizations, UserField, Users};
    use crate::client::Endpoint;
    use crate::resource::ZendeskObject;

    #[test]
    fn key_and_type_changes_replace_the_field() {
        let prior = ObjectFieldState::<Users> {
            key: ValueString::from("plan"),
            field_type: ValueString::from("text"),
            ..Default::default()
        };
        let renamed = ObjectFieldState {
            key: ValueString::from("subscription"),
            field_type: ValueString::from("dropdown"),
            ..prior.clone()
        };
        assert_eq!(
            UserField::new().requires_replace(&prior, &renamed),
            vec![AttributePath::new("key"), AttributePath::new("type")]
        );
        assert!(UserField::new().requires_replace(&prior, &prior).is_empty());
    }

    #[test]
    fn collections() {
        assert_eq!(
            ObjectFieldApi::<Users>::item_path("7"),
            "/api/v2/user_fields/7.json"
        );
        assert_eq!(
            ObjectFieldApi::<Organizations>::collection_path(),
            "/api/v2/organization_fields.json"
        );
    }
}
