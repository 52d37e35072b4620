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

//! Zendesk provider, exposing every resource and data source

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{map, Diagnostics, DynamicDataSource, DynamicResource, Provider};
use tracing::info;

use crate::client::{HttpClient, SharedClient};
use crate::data_sources::SearchDataSource;
use crate::resource::ZendeskResource;
use crate::resources::{
    Automation, Brand, CustomRole, DynamicContent, Group, Macro, OrganizationField, Schedule,
    SlaPolicy, TicketField, TicketForm, Trigger, UserField, View, Webhook,
};

pub mod config;

pub use config::{Credentials, ProviderConfig};

#[derive(Debug, Default, Clone)]
pub struct ZendeskProvider {
    client: SharedClient,
}

impl ZendeskProvider {
    /// Provider using an already configured client
    pub fn with_client(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for ZendeskProvider {
    type Config<'a> = Value<ProviderConfig<'a>>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        let attribute = |description, sensitive| Attribute {
            attr_type: AttributeType::String,
            description: Description::plain(description),
            constraint: AttributeConstraint::Optional,
            sensitive,
            ..Default::default()
        };
        Some(Schema {
            version: 1,
            block: Block {
                attributes: map! {
                    "subdomain" => attribute(
                        "Subdomain of the Zendesk account, `<subdomain>.zendesk.com`. \
                         Defaults to `ZENDESK_SUBDOMAIN`",
                        false,
                    ),
                    "username" => attribute(
                        "Email of the user owning the API token. Defaults to `ZENDESK_USERNAME`",
                        false,
                    ),
                    "api_token" => attribute(
                        "Zendesk API token. Defaults to `ZENDESK_API_TOKEN`",
                        true,
                    ),
                },
                description: Description::plain("Manage the configuration of a Zendesk account"),
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        let config = config.unwrap_or_default();
        config.validate(diags, config::process_env);

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let config = config.unwrap_or_default();
        let Some(credentials) = config.credentials(diags, config::process_env) else {
            if diags.errors.is_empty() {
                diags.root_error_short("Zendesk credentials are not known");
            }
            return None;
        };

        match HttpClient::new(
            &credentials.subdomain,
            &credentials.username,
            &credentials.api_token,
        ) {
            Ok(client) => {
                info!(
                    subdomain = %credentials.subdomain,
                    %terraform_version,
                    "configured Zendesk provider"
                );
                self.client.set(Arc::new(client)).await;
                Some(())
            }
            Err(err) => {
                diags.root_error("Failed to create the Zendesk client", format!("{err:#}"));
                None
            }
        }
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        let client = &self.client;
        Some(map! {
            "automation"         => ZendeskResource::new(Automation, client.clone()),
            "trigger"            => ZendeskResource::new(Trigger, client.clone()),
            "view"               => ZendeskResource::new(View, client.clone()),
            "macro"              => ZendeskResource::new(Macro, client.clone()),
            "ticket_field"       => ZendeskResource::new(TicketField, client.clone()),
            "ticket_form"        => ZendeskResource::new(TicketForm, client.clone()),
            "sla_policy"         => ZendeskResource::new(SlaPolicy, client.clone()),
            "webhook"            => ZendeskResource::new(Webhook, client.clone()),
            "group"              => ZendeskResource::new(Group, client.clone()),
            "brand"              => ZendeskResource::new(Brand, client.clone()),
            "custom_role"        => ZendeskResource::new(CustomRole, client.clone()),
            "user_field"         => ZendeskResource::new(UserField::new(), client.clone()),
            "organization_field" => ZendeskResource::new(OrganizationField::new(), client.clone()),
            "schedule"           => ZendeskResource::new(Schedule, client.clone()),
            "dynamic_content"    => ZendeskResource::new(DynamicContent, client.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        Some(map! {
            "search" => SearchDataSource::new(self.client.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tf_provider::{Diagnostics, DynamicResource, Provider};

    use super::ZendeskProvider;
    use crate::client::fake::{FakeApi, Method};
    use crate::client::SharedClient;

    #[test]
    fn every_resource_is_exposed() {
        let provider = ZendeskProvider::default();
        let mut diags = Diagnostics::default();
        let mut resources: Vec<_> = provider
            .get_resources(&mut diags)
            .unwrap()
            .into_keys()
            .collect();
        resources.sort();
        assert_eq!(
            resources,
            vec![
                "automation",
                "brand",
                "custom_role",
                "dynamic_content",
                "group",
                "macro",
                "organization_field",
                "schedule",
                "sla_policy",
                "ticket_field",
                "ticket_form",
                "trigger",
                "user_field",
                "view",
                "webhook",
            ]
        );

        let data_sources = provider.get_data_sources(&mut diags).unwrap();
        assert!(data_sources.contains_key("search"));
    }

    #[test]
    fn every_schema_is_valid() {
        let provider = ZendeskProvider::default();
        let mut diags = Diagnostics::default();
        for (name, resource) in provider.get_resources(&mut diags).unwrap() {
            assert!(resource.schema(&mut diags).is_some(), "{name}");
        }
        assert!(provider.schema(&mut diags).is_some());
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn resources_share_the_provider_client() {
        let api = Arc::new(FakeApi::new().answer(
            Method::Get,
            "/api/v2/groups/7.json",
            json!({"group": {"id": 7, "name": "Support"}}),
        ));
        let provider = ZendeskProvider::with_client(SharedClient::new(api.clone()));
        let mut diags = Diagnostics::default();
        let resources = provider.get_resources(&mut diags).unwrap();

        let imported = resources["group"].import(&mut diags, "7".to_owned()).await;
        assert!(imported.is_some());
        assert!(diags.errors.is_empty());
        assert_eq!(api.calls().len(), 1);
    }
}
