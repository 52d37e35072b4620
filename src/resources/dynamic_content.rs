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

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics};
use tracing::info;

use crate::client::{endpoint, Endpoint, ZendeskApi};
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::utils::{
    attribute, id_attribute, id_value, list_value, string, string_value, url_attribute, WithUnknown,
};

/// Localized text referenced by a placeholder
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicContent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DynamicContentState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub name: ValueString<'a>,
    pub placeholder: ValueString<'a>,
    pub default_locale_id: ValueNumber,
    pub variants: ValueList<Value<VariantState<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VariantState<'a> {
    pub id: ValueNumber,
    pub locale_id: ValueNumber,
    pub content: ValueString<'a>,
    pub default: ValueBool,
    pub active: ValueBool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DynamicContentApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub name: String,
    #[serde(skip_serializing)]
    pub placeholder: Option<String>,
    pub default_locale_id: i64,
    pub variants: Vec<VariantApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VariantApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub locale_id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Endpoint for DynamicContentApi {
    const COLLECTION: &'static str = "dynamic_content/items";
    const KEY: &'static str = "item";
}

fn variant_to_api(variant: &VariantState) -> VariantApi {
    VariantApi {
        id: variant.id.as_ref_option().copied(),
        locale_id: variant.locale_id.as_ref_option().copied().unwrap_or_default(),
        content: string(&variant.content).unwrap_or_default(),
        default: variant.default.as_ref_option().copied(),
        active: variant.active.as_ref_option().copied(),
    }
}

fn variants_to_api(variants: &ValueList<Value<VariantState>>) -> Vec<VariantApi> {
    variants
        .iter()
        .flatten()
        .filter_map(Value::as_ref_option)
        .map(variant_to_api)
        .collect()
}

/// Read variants back in the order of the prior state, matching them by locale
fn variants_from_api<'a>(
    prior: &ValueList<Value<VariantState>>,
    variants: Vec<VariantApi>,
) -> ValueList<Value<VariantState<'a>>> {
    let mut order = BTreeMap::new();
    for (i, variant) in variants_to_api(prior).into_iter().enumerate() {
        order.entry(variant.locale_id).or_insert(i);
    }
    let mut variants = variants;
    variants.sort_by_key(|variant| order.get(&variant.locale_id).copied().unwrap_or(usize::MAX));

    let variants = variants
        .into_iter()
        .map(|variant| {
            Value::Value(VariantState {
                id: variant.id.into(),
                locale_id: Value::Value(variant.locale_id),
                content: string_value(Some(variant.content)),
                default: variant.default.into(),
                active: variant.active.into(),
            })
        })
        .collect();
    list_value(prior, variants)
}

/// Variant changes needed to go from the prior variants to the planned ones
#[derive(Debug, Default, PartialEq)]
struct VariantChanges {
    create: Vec<VariantApi>,
    update: Vec<VariantApi>,
    delete: Vec<i64>,
}

fn variant_changes(
    prior: &ValueList<Value<VariantState>>,
    planned: &ValueList<Value<VariantState>>,
) -> VariantChanges {
    let prior: BTreeMap<_, _> = variants_to_api(prior)
        .into_iter()
        .map(|variant| (variant.locale_id, variant))
        .collect();
    let planned = variants_to_api(planned);

    let mut changes = VariantChanges::default();
    for mut variant in planned.iter().cloned() {
        match prior.get(&variant.locale_id) {
            Some(existing) => {
                variant.id = existing.id;
                if variant.content != existing.content
                    || variant.active.is_some_and(|active| Some(active) != existing.active)
                    || variant.default.is_some_and(|default| Some(default) != existing.default)
                {
                    changes.update.push(variant);
                }
            }
            None => {
                variant.id = None;
                changes.create.push(variant);
            }
        }
    }
    for (locale_id, variant) in &prior {
        if !planned.iter().any(|planned| planned.locale_id == *locale_id) {
            changes.delete.extend(variant.id);
        }
    }
    changes
}

async fn apply_variant_changes(
    api: &dyn ZendeskApi,
    id: &str,
    changes: VariantChanges,
) -> anyhow::Result<()> {
    let variants = format!("/api/v2/dynamic_content/items/{id}/variants");
    if !changes.update.is_empty() {
        api.put(
            &format!("{variants}/update_many.json"),
            json!({ "variants": changes.update }),
        )
        .await?;
    }
    if !changes.create.is_empty() {
        api.post(
            &format!("{variants}/create_many.json"),
            json!({ "variants": changes.create }),
        )
        .await?;
    }
    for variant_id in changes.delete {
        api.delete(&format!("{variants}/{variant_id}.json")).await?;
    }
    Ok(())
}

impl<'a> ApiModel for DynamicContentState<'a> {
    type Api = DynamicContentApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<DynamicContentApi> {
        Some(DynamicContentApi {
            name: string(&self.name).unwrap_or_default(),
            default_locale_id: self.default_locale_id.as_ref_option().copied().unwrap_or_default(),
            variants: variants_to_api(&self.variants),
            ..Default::default()
        })
    }

    fn from_response(self, response: DynamicContentApi) -> Self {
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            name: string_value(Some(response.name)),
            placeholder: string_value(response.placeholder),
            default_locale_id: Value::Value(response.default_locale_id),
            variants: variants_from_api(&self.variants, response.variants),
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

fn plan_variants(variants: &mut ValueList<Value<VariantState>>) {
    for variant in variants.iter_mut().flatten() {
        if let Value::Value(variant) = variant {
            variant.id.unknown_if_null();
            variant.default.unknown_if_null();
            variant.active.unknown_if_null();
        }
    }
}

#[async_trait]
impl ZendeskObject for DynamicContent {
    const NAME: &'static str = "dynamic content";
    type Api = DynamicContentApi;
    type State<'a> = DynamicContentState<'a>;

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
                        "Name of the item",
                    ),
                    "placeholder" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "Placeholder inserting the item in texts, eg: `{{dc.welcome}}`",
                    ),
                    "default_locale_id" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::Required,
                        "Locale of the default variant",
                    ),
                    "variants" => Attribute {
                        attr_type: AttributeType::AttributeList(map! {
                            "id" => attribute(
                                AttributeType::Number,
                                AttributeConstraint::Computed,
                                "Id of the variant",
                            ),
                            "locale_id" => attribute(
                                AttributeType::Number,
                                AttributeConstraint::Required,
                                "Locale of the variant, unique within the item",
                            ),
                            "content" => attribute(
                                AttributeType::String,
                                AttributeConstraint::Required,
                                "Text of the variant",
                            ),
                            "default" => attribute(
                                AttributeType::Bool,
                                AttributeConstraint::OptionalComputed,
                                "Whether the variant is used when no locale matches",
                            ),
                            "active" => attribute(
                                AttributeType::Bool,
                                AttributeConstraint::OptionalComputed,
                                "Whether the variant is used",
                            ),
                        }),
                        description: Description::plain("Localized texts of the item"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                },
                description: Description::plain("Zendesk dynamic content item"),
                ..Default::default()
            },
        }
    }

    fn validate<'a>(&self, diags: &mut Diagnostics, config: &DynamicContentState<'a>) {
        let mut locales = BTreeMap::new();
        for (i, variant) in config.variants.iter().flatten().enumerate() {
            let Some(&locale_id) = variant
                .as_ref_option()
                .and_then(|v| v.locale_id.as_ref_option())
            else {
                continue;
            };
            if let Some(first) = locales.insert(locale_id, i) {
                diags.error(
                    "Duplicate variant locale",
                    format!("Locale {locale_id} is already used by variant {first}"),
                    AttributePath::new("variants")
                        .index(i as i64)
                        .attribute("locale_id"),
                );
            }
        }
    }

    fn plan_create<'a>(&self, state: &mut DynamicContentState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.placeholder = Value::Unknown;
        plan_variants(&mut state.variants);
    }

    fn plan_update<'a>(&self, state: &mut DynamicContentState<'a>) {
        plan_variants(&mut state.variants);
    }

    async fn after_update<'a>(
        &self,
        diags: &mut Diagnostics,
        api: &dyn ZendeskApi,
        prior: &DynamicContentState<'a>,
        planned: &DynamicContentState<'a>,
        state: DynamicContentState<'a>,
    ) -> DynamicContentState<'a> {
        let changes = variant_changes(&prior.variants, &planned.variants);
        if changes == VariantChanges::default() {
            return state;
        }
        let id = state.id.as_deref_option().unwrap_or_default().to_owned();
        let result = match apply_variant_changes(api, &id, changes).await {
            Ok(()) => endpoint::fetch::<DynamicContentApi>(api, &id).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(Some(item)) => {
                info!(resource = Self::NAME, %id, "variants updated");
                planned.clone().from_response(item)
            }
            Ok(None) => {
                diags.root_error_short("Dynamic content vanished while updating its variants");
                state
            }
            Err(err) => {
                diags.root_error(
                    "Failed to update dynamic content variants",
                    format!("{err:#}"),
                );
                state
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::{Value, ValueString};

    use super::{variant_changes, variants_from_api, VariantApi, VariantState};

    fn variant(id: Option<i64>, locale_id: i64, content: &str) -> Value<VariantState<'static>> {
        Value::Value(VariantState {
            id: id.into(),
            locale_id: Value::Value(locale_id),
            content: ValueString::from(content.to_owned()),
            default: Value::Null,
            active: Value::Null,
        })
    }

    #[test]
    fn variants_are_matched_by_locale() {
        let prior = Value::Value(vec![
            variant(Some(10), 1, "Hello"),
            variant(Some(11), 16, "Bonjour"),
            variant(Some(12), 8, "Hallo"),
        ]);
        let planned = Value::Value(vec![
            variant(None, 1, "Hello"),
            variant(None, 16, "Salut"),
            variant(None, 2, "Hola"),
        ]);
        let changes = variant_changes(&prior, &planned);
        assert_eq!(changes.update.len(), 1);
        assert_eq!(changes.update[0].id, Some(11));
        assert_eq!(changes.update[0].content, "Salut");
        assert_eq!(changes.create.len(), 1);
        assert_eq!(changes.create[0].locale_id, 2);
        assert_eq!(changes.delete, vec![12]);
    }

    #[test]
    fn variants_follow_the_prior_order() {
        let prior = Value::Value(vec![variant(None, 16, "Bonjour"), variant(None, 1, "Hello")]);
        let response = vec![
            VariantApi {
                id: Some(10),
                locale_id: 1,
                content: "Hello".into(),
                default: Some(true),
                active: Some(true),
            },
            VariantApi {
                id: Some(11),
                locale_id: 16,
                content: "Bonjour".into(),
                default: Some(false),
                active: Some(true),
            },
        ];
        let state = variants_from_api(&prior, response);
        let locales: Vec<_> = state
            .iter()
            .flatten()
            .map(|variant| variant.as_ref_option().unwrap().locale_id.clone())
            .collect();
        assert_eq!(locales, vec![Value::Value(16), Value::Value(1)]);
    }
}
