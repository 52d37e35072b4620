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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueList, ValueString};
use tf_provider::{map, Diagnostics};
use tracing::info;

use crate::client::{ApiError, Endpoint, ZendeskApi};
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::utils::{
    attribute, id_attribute, string, string_list, string_value, strings, WithUnknown,
};

/// HTTP endpoint called by triggers and automations
#[derive(Debug, Clone, Copy, Default)]
pub struct Webhook;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WebhookState<'a> {
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub endpoint: ValueString<'a>,
    pub http_method: ValueString<'a>,
    pub request_format: ValueString<'a>,
    pub status: ValueString<'a>,
    pub subscriptions: ValueList<ValueString<'a>>,
    pub authentication: Value<AuthenticationState<'a>>,
    pub signing_secret: ValueString<'a>,
}

/// Credentials sent with each call
///
/// Zendesk never returns them, so they are kept from the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AuthenticationState<'a> {
    #[serde(rename = "type")]
    pub auth_type: ValueString<'a>,
    pub add_position: ValueString<'a>,
    pub username: ValueString<'a>,
    pub password: ValueString<'a>,
    pub token: ValueString<'a>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebhookApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub endpoint: String,
    pub http_method: String,
    pub request_format: String,
    pub status: String,
    pub subscriptions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthenticationApi {
    #[serde(rename = "type")]
    pub auth_type: String,
    pub add_position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Endpoint for WebhookApi {
    const COLLECTION: &'static str = "webhooks";
    const KEY: &'static str = "webhook";
}

#[derive(Debug, Deserialize)]
struct SigningSecretResponse {
    signing_secret: SigningSecret,
}

#[derive(Debug, Deserialize)]
struct SigningSecret {
    secret: String,
}

fn signing_secret_path(id: &str) -> String {
    format!("/api/v2/webhooks/{id}/signing_secret.json")
}

async fn fetch_signing_secret(api: &dyn ZendeskApi, id: &str) -> anyhow::Result<String> {
    let path = signing_secret_path(id);
    let response = api.get(&path).await?;
    match serde_json::from_value::<SigningSecretResponse>(response) {
        Ok(response) => Ok(response.signing_secret.secret),
        Err(_) => Err(ApiError::MissingKey {
            path,
            key: "signing_secret",
        }
        .into()),
    }
}

fn authentication_to_api(auth: &AuthenticationState) -> AuthenticationApi {
    let auth_type = string(&auth.auth_type).unwrap_or_default();
    let data = match auth_type.as_str() {
        "basic_auth" => Some(json!({
            "username": string(&auth.username),
            "password": string(&auth.password),
        })),
        "bearer_token" => Some(json!({ "token": string(&auth.token) })),
        _ => None,
    };
    AuthenticationApi {
        auth_type,
        add_position: string(&auth.add_position).unwrap_or_else(|| "header".to_owned()),
        data,
    }
}

fn authentication_from_api<'a>(
    prior: &Value<AuthenticationState>,
    auth: Option<AuthenticationApi>,
) -> Value<AuthenticationState<'a>> {
    let Some(auth) = auth else {
        return Value::Null;
    };
    let (username, password, token) = match prior {
        Value::Value(prior) => (
            string(&prior.username),
            string(&prior.password),
            string(&prior.token),
        ),
        _ => (None, None, None),
    };
    Value::Value(AuthenticationState {
        auth_type: string_value(Some(auth.auth_type)),
        add_position: string_value(Some(auth.add_position)),
        username: string_value(username),
        password: string_value(password),
        token: string_value(token),
    })
}

impl<'a> ApiModel for WebhookState<'a> {
    type Api = WebhookApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<WebhookApi> {
        Some(WebhookApi {
            id: None,
            name: string(&self.name).unwrap_or_default(),
            description: string(&self.description),
            endpoint: string(&self.endpoint).unwrap_or_default(),
            http_method: string(&self.http_method).unwrap_or_default(),
            request_format: string(&self.request_format).unwrap_or_default(),
            status: string(&self.status).unwrap_or_default(),
            subscriptions: strings(&self.subscriptions).unwrap_or_default(),
            authentication: self.authentication.as_ref_option().map(authentication_to_api),
        })
    }

    fn from_response(self, response: WebhookApi) -> Self {
        Self {
            id: string_value(response.id),
            name: string_value(Some(response.name)),
            description: match response.description {
                Some(description) if description.is_empty() && self.description.is_null() => {
                    Value::Null
                }
                description => string_value(description),
            },
            endpoint: string_value(Some(response.endpoint)),
            http_method: string_value(Some(response.http_method)),
            request_format: string_value(Some(response.request_format)),
            status: string_value(Some(response.status)),
            subscriptions: string_list(&self.subscriptions, response.subscriptions),
            authentication: authentication_from_api(&self.authentication, response.authentication),
            signing_secret: self.signing_secret,
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
impl ZendeskObject for Webhook {
    const NAME: &'static str = "webhook";
    type Api = WebhookApi;
    type State<'a> = WebhookState<'a>;

    fn schema(&self) -> Schema {
        let sensitive = |description| Attribute {
            attr_type: AttributeType::String,
            description: Description::plain(description),
            constraint: AttributeConstraint::Optional,
            sensitive: true,
            ..Default::default()
        };
        Schema {
            version: 0,
            block: Block {
                version: 0,
                attributes: map! {
                    "id" => id_attribute(),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the webhook",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the webhook",
                    ),
                    "endpoint" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "URL called by the webhook",
                    ),
                    "http_method" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "HTTP method of the calls: `GET`, `POST`, `PUT`, `PATCH` or `DELETE`",
                    ),
                    "request_format" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Format of the body: `json`, `xml` or `form_encoded`",
                    ),
                    "status" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "`active` or `inactive`",
                    ),
                    "subscriptions" => attribute(
                        AttributeType::List(AttributeType::String.into()),
                        AttributeConstraint::Optional,
                        "Events the webhook is subscribed to, eg: `conditional_ticket_events`",
                    ),
                    "authentication" => Attribute {
                        attr_type: AttributeType::AttributeSingle(map! {
                            "type" => attribute(
                                AttributeType::String,
                                AttributeConstraint::Required,
                                "`basic_auth` or `bearer_token`",
                            ),
                            "add_position" => attribute(
                                AttributeType::String,
                                AttributeConstraint::OptionalComputed,
                                "Where the credentials are sent, only `header` is supported",
                            ),
                            "username" => attribute(
                                AttributeType::String,
                                AttributeConstraint::Optional,
                                "User name for `basic_auth`",
                            ),
                            "password" => sensitive("Password for `basic_auth`"),
                            "token" => sensitive("Token for `bearer_token`"),
                        }),
                        description: Description::plain("Credentials sent to the endpoint"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "signing_secret" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain(
                            "Secret used to sign the calls of the webhook",
                        ),
                        constraint: AttributeConstraint::Computed,
                        sensitive: true,
                        ..Default::default()
                    },
                },
                description: Description::plain("Zendesk webhook"),
                ..Default::default()
            },
        }
    }

    fn plan_create<'a>(&self, state: &mut WebhookState<'a>) {
        state.id = Value::Unknown;
        state.signing_secret = Value::Unknown;
        if let Value::Value(auth) = &mut state.authentication {
            auth.add_position.unknown_if_null();
        }
    }

    async fn after_create<'a>(
        &self,
        diags: &mut Diagnostics,
        api: &dyn ZendeskApi,
        _planned: &WebhookState<'a>,
        mut state: WebhookState<'a>,
    ) -> WebhookState<'a> {
        let id = state.id.as_deref_option().unwrap_or_default().to_owned();
        match fetch_signing_secret(api, &id).await {
            Ok(secret) => {
                info!(resource = Self::NAME, %id, "fetched signing secret");
                state.signing_secret = string_value(Some(secret));
            }
            Err(err) => {
                diags.root_error(
                    "Failed to fetch the webhook signing secret",
                    format!("{err:#}"),
                );
                state.signing_secret = Value::Null;
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::{Value, ValueString};

    use super::{
        authentication_from_api, authentication_to_api, AuthenticationApi, AuthenticationState,
    };

    #[test]
    fn credentials_are_kept_from_the_configuration() {
        let prior = Value::Value(AuthenticationState {
            auth_type: ValueString::from("basic_auth"),
            add_position: ValueString::Null,
            username: ValueString::from("alice"),
            password: ValueString::from("s3cret"),
            token: ValueString::Null,
        });
        let request = authentication_to_api(prior.as_ref_option().unwrap());
        assert_eq!(request.add_position, "header");
        assert_eq!(
            request.data,
            Some(serde_json::json!({"username": "alice", "password": "s3cret"}))
        );

        let response = AuthenticationApi {
            auth_type: "basic_auth".into(),
            add_position: "header".into(),
            data: None,
        };
        let state = authentication_from_api(&prior, Some(response));
        let state = state.as_ref_option().unwrap();
        assert_eq!(state.add_position.as_str(), "header");
        assert_eq!(state.password.as_str(), "s3cret");
        assert!(state.token.is_null());
    }
}
