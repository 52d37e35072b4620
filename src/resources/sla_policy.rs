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
use tf_provider::{map, AttributePath, Diagnostics, RawValue};

use crate::client::Endpoint;
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::upgrade;
use crate::utils::{
    attribute, id_attribute, id_value, list_value, string, string_value, url_attribute,
    WithUnknown,
};
use crate::validation::{validate_conditions, ConditionsSpec, ResourceKind};

use super::rules::{conditions_attribute, conditions_from_api, conditions_to_api, ConditionsApi};

/// Service level agreement policy
#[derive(Debug, Clone, Copy, Default)]
pub struct SlaPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SlaPolicyState<'a> {
    pub id: ValueString<'a>,
    pub url: ValueString<'a>,
    pub title: ValueString<'a>,
    pub description: ValueString<'a>,
    pub position: ValueNumber,
    pub filter: Value<ConditionsSpec<'a>>,
    pub policy_metrics: ValueList<Value<PolicyMetricState<'a>>>,
}

/// Target time of one metric for one priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PolicyMetricState<'a> {
    pub priority: ValueString<'a>,
    pub metric: ValueString<'a>,
    pub target: ValueNumber,
    pub business_hours: ValueBool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SlaPolicyApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    pub filter: ConditionsApi,
    pub policy_metrics: Vec<PolicyMetricApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PolicyMetricApi {
    pub priority: String,
    pub metric: String,
    pub target: i64,
    pub business_hours: bool,
}

impl Endpoint for SlaPolicyApi {
    const COLLECTION: &'static str = "slas/policies";
    const KEY: &'static str = "sla_policy";
}

fn policy_metrics_attribute() -> Attribute {
    Attribute {
        attr_type: AttributeType::AttributeList(map! {
            "priority" => attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                "Ticket priority: `low`, `normal`, `high` or `urgent`",
            ),
            "metric" => attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                "Measured metric, eg: `first_reply_time`, `next_reply_time`",
            ),
            "target" => attribute(
                AttributeType::Number,
                AttributeConstraint::Required,
                "Target time in minutes",
            ),
            "business_hours" => attribute(
                AttributeType::Bool,
                AttributeConstraint::Required,
                "Whether the target is counted in business hours",
            ),
        }),
        description: Description::plain("Targets of the policy"),
        constraint: AttributeConstraint::Optional,
        ..Default::default()
    }
}

impl<'a> ApiModel for SlaPolicyState<'a> {
    type Api = SlaPolicyApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<SlaPolicyApi> {
        let policy_metrics = self
            .policy_metrics
            .iter()
            .flatten()
            .filter_map(Value::as_ref_option)
            .map(|metric| PolicyMetricApi {
                priority: string(&metric.priority).unwrap_or_default(),
                metric: string(&metric.metric).unwrap_or_default(),
                target: metric.target.as_ref_option().copied().unwrap_or_default(),
                business_hours: metric
                    .business_hours
                    .as_ref_option()
                    .copied()
                    .unwrap_or_default(),
            })
            .collect();
        Some(SlaPolicyApi {
            title: string(&self.title).unwrap_or_default(),
            description: string(&self.description),
            position: self.position.as_ref_option().copied(),
            filter: conditions_to_api(&self.filter),
            policy_metrics,
            ..Default::default()
        })
    }

    fn from_response(self, response: SlaPolicyApi) -> Self {
        let policy_metrics = response
            .policy_metrics
            .into_iter()
            .map(|metric| {
                Value::Value(PolicyMetricState {
                    priority: string_value(Some(metric.priority)),
                    metric: string_value(Some(metric.metric)),
                    target: Value::Value(metric.target),
                    business_hours: Value::Value(metric.business_hours),
                })
            })
            .collect();
        Self {
            id: id_value(response.id),
            url: string_value(response.url),
            title: string_value(Some(response.title)),
            description: match response.description {
                Some(description) if description.is_empty() && self.description.is_null() => {
                    Value::Null
                }
                description => string_value(description),
            },
            position: response.position.into(),
            filter: conditions_from_api(&self.filter, response.filter),
            policy_metrics: list_value(&self.policy_metrics, policy_metrics),
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

impl ZendeskObject for SlaPolicy {
    const NAME: &'static str = "sla policy";
    type Api = SlaPolicyApi;
    type State<'a> = SlaPolicyState<'a>;

    fn schema(&self) -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                attributes: map! {
                    "id" => id_attribute(),
                    "url" => url_attribute(),
                    "title" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Title of the policy",
                    ),
                    "description" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Description of the policy",
                    ),
                    "position" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::OptionalComputed,
                        "Position of the policy, the first matching policy applies",
                    ),
                    "filter" => conditions_attribute(
                        "Conditions a ticket must match for the policy to apply",
                    ),
                    "policy_metrics" => policy_metrics_attribute(),
                },
                description: Description::plain("Zendesk SLA policy"),
                ..Default::default()
            },
        }
    }

    fn validate<'a>(&self, diags: &mut Diagnostics, config: &SlaPolicyState<'a>) {
        validate_conditions(
            diags,
            ResourceKind::Sla,
            &config.filter,
            AttributePath::new("filter"),
        );
    }

    fn plan_create<'a>(&self, state: &mut SlaPolicyState<'a>) {
        state.id = Value::Unknown;
        state.url = Value::Unknown;
        state.position.unknown_if_null();
    }

    fn upgrade<'a>(
        &self,
        diags: &mut Diagnostics,
        version: i64,
        prior_state: &RawValue,
    ) -> Option<SlaPolicyState<'a>> {
        if version != 0 {
            return upgrade::unsupported(diags, Self::NAME, version);
        }
        let state = upgrade::upgrade_conditions(diags, prior_state, "filter")?;
        upgrade::decode(diags, state)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tf_provider::value::Value;
    use tf_provider::{Diagnostics, RawValue};

    use super::{SlaPolicy, SlaPolicyApi, SlaPolicyState};
    use crate::crud::ApiModel;
    use crate::resource::ZendeskObject;

    #[test]
    fn response_fills_filter_and_metrics() {
        let response: SlaPolicyApi = serde_json::from_value(json!({
            "id": 25,
            "url": "https://example.zendesk.com/api/v2/slas/policies/25.json",
            "title": "Urgent incidents",
            "description": "",
            "position": 3,
            "filter": {
                "all": [{"field": "type", "operator": "is", "value": "incident"}],
                "any": [],
            },
            "policy_metrics": [
                {
                    "priority": "urgent",
                    "metric": "first_reply_time",
                    "target": 30,
                    "business_hours": false,
                },
            ],
        }))
        .unwrap();

        let state = SlaPolicyState::default().from_response(response);
        assert_eq!(state.id.as_str(), "25");
        assert!(state.description.is_null());

        let filter = state.filter.as_ref_option().unwrap();
        let all = filter.all.as_ref_option().unwrap();
        assert_eq!(all[0].as_ref_option().unwrap().value.as_str(), "incident");
        assert!(filter.any.is_null());

        let metrics = state.policy_metrics.as_ref_option().unwrap();
        assert_eq!(metrics[0].as_ref_option().unwrap().target, Value::Value(30));
    }

    #[test]
    fn version_0_conditions_move_into_filter() {
        let prior = RawValue::Json(
            serde_json::to_vec(&json!({
                "id": "25",
                "title": "Urgent incidents",
                "position": 3,
                "all": [{"field": "type", "operator": "is", "value": "incident"}],
                "any": [{"field": "priority", "operator": "is", "value": "urgent"}],
                "policy_metrics": [{
                    "priority": "urgent",
                    "metric": "first_reply_time",
                    "target": 30,
                    "business_hours": false
                }]
            }))
            .unwrap(),
        );
        let mut diags = Diagnostics::default();

        let state: SlaPolicyState = SlaPolicy.upgrade(&mut diags, 0, &prior).unwrap();

        assert!(diags.errors.is_empty());
        let filter = state.filter.as_ref_option().unwrap();
        let all = filter.all.as_ref_option().unwrap();
        assert_eq!(all[0].as_ref_option().unwrap().value.as_str(), "incident");
        let any = filter.any.as_ref_option().unwrap();
        assert_eq!(any[0].as_ref_option().unwrap().field.as_str(), "priority");
        assert!(any[0].as_ref_option().unwrap().custom_field_id.is_null());

        let metrics = state.policy_metrics.as_ref_option().unwrap();
        assert_eq!(metrics[0].as_ref_option().unwrap().target, Value::Value(30));
    }
}
