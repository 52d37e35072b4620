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
use tf_provider::value::{Value, ValueString};
use tf_provider::{AttributePath, Diagnostics};

/// Attributes of the `provider "zendesk"` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderConfig<'a> {
    pub subdomain: ValueString<'a>,
    pub username: ValueString<'a>,
    pub api_token: ValueString<'a>,
}

/// Configuration with the environment fallbacks applied
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub subdomain: String,
    pub username: String,
    pub api_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("subdomain", &self.subdomain)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

pub const SUBDOMAIN_ENV: &str = "ZENDESK_SUBDOMAIN";
pub const USERNAME_ENV: &str = "ZENDESK_USERNAME";
pub const API_TOKEN_ENV: &str = "ZENDESK_API_TOKEN";

fn resolve(
    diags: &mut Diagnostics,
    value: &ValueString,
    name: &'static str,
    env_name: &str,
    env: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    match value {
        Value::Value(value) if !value.is_empty() => return Some(value.to_string()),
        // Known at apply time only
        Value::Unknown => return None,
        _ => (),
    }
    match env(env_name).filter(|value| !value.is_empty()) {
        Some(value) => Some(value),
        None => {
            diags.error(
                format!("Missing `{name}`"),
                format!(
                    "Set `{name}` in the provider block or the `{env_name}` environment variable"
                ),
                AttributePath::new(name),
            );
            None
        }
    }
}

impl<'a> ProviderConfig<'a> {
    /// Resolve the credentials, the provider block winning over the environment
    pub fn credentials(
        &self,
        diags: &mut Diagnostics,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<Credentials> {
        let subdomain = resolve(diags, &self.subdomain, "subdomain", SUBDOMAIN_ENV, &env);
        let username = resolve(diags, &self.username, "username", USERNAME_ENV, &env);
        let api_token = resolve(diags, &self.api_token, "api_token", API_TOKEN_ENV, &env);
        Some(Credentials {
            subdomain: subdomain?,
            username: username?,
            api_token: api_token?,
        })
    }

    /// Check that every attribute can be resolved
    ///
    /// Unknown attributes are accepted.
    pub fn validate(&self, diags: &mut Diagnostics, env: impl Fn(&str) -> Option<String>) {
        for (value, name, env_name) in [
            (&self.subdomain, "subdomain", SUBDOMAIN_ENV),
            (&self.username, "username", USERNAME_ENV),
            (&self.api_token, "api_token", API_TOKEN_ENV),
        ] {
            if !value.is_unknown() {
                _ = resolve(diags, value, name, env_name, &env);
            }
        }
    }
}

/// Read the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tf_provider::value::{Value, ValueString};
    use tf_provider::{AttributePath, Diagnostics};

    use super::ProviderConfig;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn attributes_win_over_environment() {
        let config = ProviderConfig {
            subdomain: ValueString::from("acme"),
            username: ValueString::from("admin@acme.test"),
            api_token: ValueString::from("from-config"),
        };
        let mut diags = Diagnostics::default();
        let credentials = config
            .credentials(&mut diags, env(&[("ZENDESK_API_TOKEN", "from-env")]))
            .unwrap();
        assert_eq!(credentials.subdomain, "acme");
        assert_eq!(credentials.api_token, "from-config");
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn environment_fills_missing_attributes() {
        let config = ProviderConfig {
            subdomain: ValueString::from("acme"),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let credentials = config
            .credentials(
                &mut diags,
                env(&[
                    ("ZENDESK_USERNAME", "admin@acme.test"),
                    ("ZENDESK_API_TOKEN", "from-env"),
                ]),
            )
            .unwrap();
        assert_eq!(credentials.username, "admin@acme.test");
        assert_eq!(credentials.api_token, "from-env");
    }

    #[test]
    fn missing_values_are_errors() {
        let config = ProviderConfig {
            subdomain: ValueString::from("acme"),
            username: ValueString::from(""),
            api_token: Value::Null,
        };
        let mut diags = Diagnostics::default();
        assert!(config.credentials(&mut diags, env(&[])).is_none());
        assert_eq!(diags.errors.len(), 2);
        assert_eq!(diags.errors[0].attribute, AttributePath::new("username"));
        assert_eq!(diags.errors[1].attribute, AttributePath::new("api_token"));
    }

    #[test]
    fn unknown_values_are_valid() {
        let config = ProviderConfig {
            subdomain: Value::Unknown,
            username: Value::Unknown,
            api_token: Value::Unknown,
        };
        let mut diags = Diagnostics::default();
        config.validate(&mut diags, env(&[]));
        assert!(diags.errors.is_empty());
    }
}
