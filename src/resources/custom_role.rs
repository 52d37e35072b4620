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
use tf_provider::value::{Value, ValueBool, ValueNumber, ValueString};
use tf_provider::{map, Diagnostics};

use crate::client::Endpoint;
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::utils::{attribute, id_attribute, id_value, string, string_value, WithUnknown};

/// Agent role with custom permissions
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CustomRoleState<'a> {
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub role_type: ValueNumber,
    pub configuration: Value<ConfigurationState<'a>>,
}

/// Permissions of the role
///
/// Permissions left out keep the value chosen by Zendesk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigurationState<'a> {
    pub end_user_profile_access: ValueString<'a>,
    pub explore_access: ValueString<'a>,
    pub forum_access: ValueString<'a>,
    pub group_access: ValueBool,
    pub macro_access: ValueString<'a>,
    pub manage_business_rules: ValueBool,
    pub manage_dynamic_content: ValueBool,
    pub manage_extensions_and_channels: ValueBool,
    pub organization_editing: ValueBool,
    pub report_access: ValueString<'a>,
    pub side_conversation_create: ValueBool,
    pub ticket_access: ValueString<'a>,
    pub ticket_comment_access: ValueString<'a>,
    pub ticket_deletion: ValueBool,
    pub ticket_editing: ValueBool,
    pub ticket_merge: ValueBool,
    pub ticket_tag_editing: ValueBool,
    pub user_view_access: ValueString<'a>,
    pub view_access: ValueString<'a>,
    pub view_deleted_tickets: ValueBool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CustomRoleApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub role_type: Option<i64>,
    pub configuration: ConfigurationApi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfigurationApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_user_profile_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explore_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macro_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_business_rules: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_dynamic_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_extensions_and_channels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_editing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_conversation_create: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_comment_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_deletion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_editing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_tag_editing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_view_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_deleted_tickets: Option<bool>,
}

impl Endpoint for CustomRoleApi {
    const COLLECTION: &'static str = "custom_roles";
    const KEY: &'static str = "custom_role";
}

impl<'a> ConfigurationState<'a> {
    fn to_api(&self) -> ConfigurationApi {
        ConfigurationApi {
            end_user_profile_access: string(&self.end_user_profile_access),
            explore_access: string(&self.explore_access),
            forum_access: string(&self.forum_access),
            group_access: self.group_access.as_ref_option().copied(),
            macro_access: string(&self.macro_access),
            manage_business_rules: self.manage_business_rules.as_ref_option().copied(),
            manage_dynamic_content: self.manage_dynamic_content.as_ref_option().copied(),
            manage_extensions_and_channels: self
                .manage_extensions_and_channels
                .as_ref_option()
                .copied(),
            organization_editing: self.organization_editing.as_ref_option().copied(),
            report_access: string(&self.report_access),
            side_conversation_create: self.side_conversation_create.as_ref_option().copied(),
            ticket_access: string(&self.ticket_access),
            ticket_comment_access: string(&self.ticket_comment_access),
            ticket_deletion: self.ticket_deletion.as_ref_option().copied(),
            ticket_editing: self.ticket_editing.as_ref_option().copied(),
            ticket_merge: self.ticket_merge.as_ref_option().copied(),
            ticket_tag_editing: self.ticket_tag_editing.as_ref_option().copied(),
            user_view_access: string(&self.user_view_access),
            view_access: string(&self.view_access),
            view_deleted_tickets: self.view_deleted_tickets.as_ref_option().copied(),
        }
    }

    fn from_api(response: ConfigurationApi) -> Self {
        Self {
            end_user_profile_access: string_value(response.end_user_profile_access),
            explore_access: string_value(response.explore_access),
            forum_access: string_value(response.forum_access),
            group_access: response.group_access.into(),
            macro_access: string_value(response.macro_access),
            manage_business_rules: response.manage_business_rules.into(),
            manage_dynamic_content: response.manage_dynamic_content.into(),
            manage_extensions_and_channels: response.manage_extensions_and_channels.into(),
            organization_editing: response.organization_editing.into(),
            report_access: string_value(response.report_access),
            side_conversation_create: response.side_conversation_create.into(),
            ticket_access: string_value(response.ticket_access),
            ticket_comment_access: string_value(response.ticket_comment_access),
            ticket_deletion: response.ticket_deletion.into(),
            ticket_editing: response.ticket_editing.into(),
            ticket_merge: response.ticket_merge.into(),
            ticket_tag_editing: response.ticket_tag_editing.into(),
            user_view_access: string_value(response.user_view_access),
            view_access: string_value(response.view_access),
            view_deleted_tickets: response.view_deleted_tickets.into(),
        }
    }

    fn plan(&mut self) {
        self.end_user_profile_access.unknown_if_null();
        self.explore_access.unknown_if_null();
        self.forum_access.unknown_if_null();
        self.group_access.unknown_if_null();
        self.macro_access.unknown_if_null();
        self.manage_business_rules.unknown_if_null();
        self.manage_dynamic_content.unknown_if_null();
        self.manage_extensions_and_channels.unknown_if_null();
        self.organization_editing.unknown_if_null();
        self.report_access.unknown_if_null();
        self.side_conversation_create.unknown_if_null();
        self.ticket_access.unknown_if_null();
        self.ticket_comment_access.unknown_if_null();
        self.ticket_deletion.unknown_if_null();
        self.ticket_editing.unknown_if_null();
        self.ticket_merge.unknown_if_null();
        self.ticket_tag_editing.unknown_if_null();
        self.user_view_access.unknown_if_null();
        self.view_access.unknown_if_null();
        self.view_deleted_tickets.unknown_if_null();
    }
}

fn configuration_attribute() -> Attribute {
    let text = |description| {
        attribute(
            AttributeType::String,
            AttributeConstraint::OptionalComputed,
            description,
        )
    };
    let flag = |description| {
        attribute(
            AttributeType::Bool,
            AttributeConstraint::OptionalComputed,
            description,
        )
    };
    Attribute {
        attr_type: AttributeType::AttributeSingle(map! {
            "end_user_profile_access" => text(
                "Access to end user profiles: `readonly`, `edit`, `edit-within-org` or `full`",
            ),
            "explore_access" => text("Access to Explore: `none`, `readonly`, `edit` or `full`"),
            "forum_access" => text(
                "Access to the help center: `readonly`, `edit-topics` or `full`",
            ),
            "group_access" => flag("Whether the agent can manage groups"),
            "macro_access" => text(
                "Access to macros: `readonly`, `manage-personal`, `manage-group` or `full`",
            ),
            "manage_business_rules" => flag(
                "Whether the agent can manage triggers, automations and SLA policies",
            ),
            "manage_dynamic_content" => flag("Whether the agent can manage dynamic content"),
            "manage_extensions_and_channels" => flag(
                "Whether the agent can manage channels and extensions",
            ),
            "organization_editing" => flag("Whether the agent can edit organizations"),
            "report_access" => text("Access to reports: `none`, `readonly` or `full`"),
            "side_conversation_create" => flag("Whether the agent can start side conversations"),
            "ticket_access" => text(
                "Tickets the agent can access: `all`, `within-groups`, \
                 `within-organization` or `assigned-only`",
            ),
            "ticket_comment_access" => text("Comments the agent can add: `public` or `none`"),
            "ticket_deletion" => flag("Whether the agent can delete tickets"),
            "ticket_editing" => flag("Whether the agent can edit ticket properties"),
            "ticket_merge" => flag("Whether the agent can merge tickets"),
            "ticket_tag_editing" => flag("Whether the agent can edit ticket tags"),
            "user_view_access" => text(
                "Access to customer lists: `none`, `readonly`, `manage-personal`, \
                 `manage-group` or `full`",
            ),
            "view_access" => text(
                "Access to views: `readonly`, `manage-personal`, `manage-group`, \
                 `full` or `playonly`",
            ),
            "view_deleted_tickets" => flag("Whether the agent can see deleted tickets"),
        }),
        description: Description::plain("Permissions granted by the role"),
        constraint: AttributeConstraint::OptionalComputed,
        ..Default::default()
    }
}

impl<'a> ApiModel for CustomRoleState<'a> {
    type Api = CustomRoleApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<CustomRoleApi> {
        Some(CustomRoleApi {
            name: string(&self.name).unwrap_or_default(),
            description: string(&self.description),
            configuration: self
                .configuration
                .as_ref_option()
                .map(ConfigurationState::to_api)
                .unwrap_or_default(),
            ..Default::default()
        })
    }

    fn from_response(self, response: CustomRoleApi) -> Self {
        Self {
            id: id_value(response.id),
            name: string_value(Some(response.name)),
            description: match response.description {
                Some(description) if description.is_empty() && self.description.is_null() => {
                    Value::Null
                }
                description => string_value(description),
            },
            role_type: response.role_type.into(),
            configuration: Value::Value(ConfigurationState::from_api(response.configuration)),
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

impl ZendeskObject for CustomRole {
    const NAME: &'static str = "custom role";
    type Api = CustomRoleApi;
    type State<'a> = CustomRoleState<'a>;

    fn schema(&self) -> Schema {
        Schema {
            version: 0,
            block: Block {
                version: 0,
                attributes: map! {
                    "id" => id_attribute(),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the role",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the role",
                    ),
                    "role_type" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::Computed,
                        "Type of the role, `0` for custom agent roles",
                    ),
                    "configuration" => configuration_attribute(),
                },
                description: Description::plain("Zendesk custom agent role"),
                ..Default::default()
            },
        }
    }

    fn plan_create<'a>(&self, state: &mut CustomRoleState<'a>) {
        state.id = Value::Unknown;
        state.role_type = Value::Unknown;
        match &mut state.configuration {
            Value::Value(configuration) => configuration.plan(),
            configuration => *configuration = Value::Unknown,
        }
    }

    fn plan_update<'a>(&self, state: &mut CustomRoleState<'a>) {
        if let Value::Value(configuration) = &mut state.configuration {
            configuration.plan();
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tf_provider::value::{Value, ValueString};

    use super::{ConfigurationState, CustomRole, CustomRoleState};
    use crate::resource::ZendeskObject;

    #[test]
    fn omitted_permissions_are_not_sent() {
        let configuration = ConfigurationState {
            ticket_access: ValueString::from("within-groups"),
            ticket_deletion: Value::Value(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(configuration.to_api()).unwrap(),
            json!({"ticket_access": "within-groups", "ticket_deletion": false})
        );
    }

    #[test]
    fn omitted_permissions_are_computed() {
        let mut state = CustomRoleState {
            configuration: Value::Value(ConfigurationState {
                ticket_merge: Value::Value(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        CustomRole.plan_create(&mut state);
        let configuration = state.configuration.as_ref_option().unwrap();
        assert_eq!(configuration.ticket_merge, Value::Value(true));
        assert!(configuration.ticket_editing.is_unknown());
        assert!(configuration.view_access.is_unknown());
    }
}
