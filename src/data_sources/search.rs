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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueEmpty, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, DataSource, Diagnostics};
use tracing::debug;

use crate::client::{SharedClient, ZendeskApi};
use crate::utils::attribute;

const SEARCH_PATH: &str = "/api/v2/search.json";

/// Search of Zendesk objects with the Zendesk query syntax
///
/// Only the first page of results is returned.
#[derive(Debug, Clone)]
pub struct SearchDataSource {
    client: SharedClient,
}

impl SearchDataSource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchState<'a> {
    pub query: ValueString<'a>,
    pub count: ValueNumber,
    pub results: ValueList<Value<SearchResult<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResult<'a> {
    pub id: ValueNumber,
    pub result_type: ValueString<'a>,
    pub url: ValueString<'a>,
    pub name: ValueString<'a>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchResponse {
    count: i64,
    results: Vec<JsonValue>,
}

fn text<'a>(result: &JsonValue, key: &str) -> ValueString<'a> {
    result
        .get(key)
        .and_then(JsonValue::as_str)
        .map(|text| Cow::Owned(text.to_owned()))
        .into()
}

/// Tickets have a subject, articles a title, other objects a name
fn result_from_api<'a>(result: &JsonValue) -> SearchResult<'a> {
    let name = ["name", "subject", "title"]
        .into_iter()
        .map(|key| text(result, key))
        .find(Value::is_value)
        .unwrap_or_default();
    SearchResult {
        id: result.get("id").and_then(JsonValue::as_i64).into(),
        result_type: text(result, "result_type"),
        url: text(result, "url"),
        name,
    }
}

pub(crate) async fn search<'a>(
    api: &dyn ZendeskApi,
    query: &str,
) -> anyhow::Result<(i64, Vec<SearchResult<'a>>)> {
    let response = api.get_query(SEARCH_PATH, &[("query", query)]).await?;
    let response: SearchResponse = serde_json::from_value(response)?;
    debug!(query, count = response.count, "searched");
    let results = response.results.iter().map(result_from_api).collect();
    Ok((response.count, results))
}

#[async_trait]
impl DataSource for SearchDataSource {
    type State<'a> = SearchState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 0,
            block: Block {
                version: 0,
                attributes: map! {
                    "query" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Zendesk search query, eg: `type:group name:Support`",
                    ),
                    "count" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::Computed,
                        "Total number of matching objects",
                    ),
                    "results" => Attribute {
                        attr_type: AttributeType::AttributeList(map! {
                            "id" => attribute(
                                AttributeType::Number,
                                AttributeConstraint::Computed,
                                "Id of the object",
                            ),
                            "result_type" => attribute(
                                AttributeType::String,
                                AttributeConstraint::Computed,
                                "Type of the object, eg: `ticket`, `user`, `group`",
                            ),
                            "url" => attribute(
                                AttributeType::String,
                                AttributeConstraint::Computed,
                                "API URL of the object",
                            ),
                            "name" => attribute(
                                AttributeType::String,
                                AttributeConstraint::Computed,
                                "Name, subject or title of the object",
                            ),
                        }),
                        description: Description::plain("First page of matching objects"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                },
                description: Description::plain("Search Zendesk objects"),
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Value::Value(query) = &config.query {
            if query.trim().is_empty() {
                diags.error_short("Empty search query", AttributePath::new("query"));
            }
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let api = self.client.get(diags).await?;
        let query = config.query.as_deref_option().unwrap_or_default().to_owned();

        match search(api.as_ref(), &query).await {
            Ok((count, results)) => Some(SearchState {
                count: Value::Value(count),
                results: Value::Value(results.into_iter().map(Value::Value).collect()),
                ..config
            }),
            Err(err) => {
                diags.root_error("Failed to search Zendesk", format!("{err:#}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tf_provider::value::Value;

    use super::result_from_api;

    #[test]
    fn result_names() {
        let group = result_from_api(&json!({
            "id": 4,
            "result_type": "group",
            "url": "https://example.zendesk.com/api/v2/groups/4.json",
            "name": "Support",
        }));
        assert_eq!(group.id, Value::Value(4));
        assert_eq!(group.name.as_str(), "Support");

        let ticket =
            result_from_api(&json!({"id": 35436, "result_type": "ticket", "subject": "Help"}));
        assert_eq!(ticket.name.as_str(), "Help");
        assert!(ticket.url.is_null());
    }
}
