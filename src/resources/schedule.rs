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
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{map, Diagnostics};
use tracing::info;

use crate::client::{ApiError, Endpoint, ZendeskApi};
use crate::crud::ApiModel;
use crate::resource::ZendeskObject;
use crate::utils::{
    attribute, id_attribute, id_value, list_value, string, string_value, WithUnknown,
};

/// Business hours of the account
#[derive(Debug, Clone, Copy, Default)]
pub struct Schedule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScheduleState<'a> {
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub time_zone: ValueString<'a>,
    pub intervals: ValueList<Value<IntervalState>>,
}

/// Opening interval, in minutes since Sunday midnight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IntervalState {
    pub start_time: ValueNumber,
    pub end_time: ValueNumber,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScheduleApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub time_zone: String,
    /// Only writable through the workweek endpoint
    #[serde(skip_serializing)]
    pub intervals: Vec<IntervalApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IntervalApi {
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Debug, Deserialize)]
struct WorkweekResponse {
    workweek: Workweek,
}

#[derive(Debug, Deserialize)]
struct Workweek {
    intervals: Vec<IntervalApi>,
}

impl Endpoint for ScheduleApi {
    const COLLECTION: &'static str = "business_hours/schedules";
    const KEY: &'static str = "schedule";
}

fn intervals_to_api(intervals: &ValueList<Value<IntervalState>>) -> Vec<IntervalApi> {
    intervals
        .iter()
        .flatten()
        .filter_map(Value::as_ref_option)
        .map(|interval| IntervalApi {
            start_time: interval.start_time.as_ref_option().copied().unwrap_or_default(),
            end_time: interval.end_time.as_ref_option().copied().unwrap_or_default(),
        })
        .collect()
}

fn intervals_from_api(
    prior: &ValueList<Value<IntervalState>>,
    intervals: Vec<IntervalApi>,
) -> ValueList<Value<IntervalState>> {
    let intervals = intervals
        .into_iter()
        .map(|interval| {
            Value::Value(IntervalState {
                start_time: Value::Value(interval.start_time),
                end_time: Value::Value(interval.end_time),
            })
        })
        .collect();
    list_value(prior, intervals)
}

/// Replace the opening intervals of a schedule
async fn set_workweek(
    api: &dyn ZendeskApi,
    id: &str,
    intervals: Vec<IntervalApi>,
) -> anyhow::Result<Vec<IntervalApi>> {
    let path = format!("/api/v2/business_hours/schedules/{id}/workweek.json");
    let response = api
        .put(&path, json!({ "workweek": { "intervals": intervals } }))
        .await?;
    match serde_json::from_value::<WorkweekResponse>(response) {
        Ok(response) => Ok(response.workweek.intervals),
        Err(_) => Err(ApiError::MissingKey {
            path,
            key: "workweek",
        }
        .into()),
    }
}

impl Schedule {
    async fn apply_workweek<'a>(
        &self,
        diags: &mut Diagnostics,
        api: &dyn ZendeskApi,
        planned: &ScheduleState<'a>,
        mut state: ScheduleState<'a>,
    ) -> ScheduleState<'a> {
        let id = state.id.as_deref_option().unwrap_or_default().to_owned();
        match set_workweek(api, &id, intervals_to_api(&planned.intervals)).await {
            Ok(intervals) => {
                info!(resource = Self::NAME, %id, "workweek updated");
                state.intervals = intervals_from_api(&planned.intervals, intervals);
            }
            Err(err) => {
                diags.root_error("Failed to set the schedule workweek", format!("{err:#}"));
            }
        }
        state
    }
}

impl<'a> ApiModel for ScheduleState<'a> {
    type Api = ScheduleApi;

    fn to_request(&self, _diags: &mut Diagnostics) -> Option<ScheduleApi> {
        Some(ScheduleApi {
            name: string(&self.name).unwrap_or_default(),
            time_zone: string(&self.time_zone).unwrap_or_default(),
            ..Default::default()
        })
    }

    fn from_response(self, response: ScheduleApi) -> Self {
        Self {
            id: id_value(response.id),
            name: string_value(Some(response.name)),
            time_zone: string_value(Some(response.time_zone)),
            intervals: intervals_from_api(&self.intervals, response.intervals),
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
impl ZendeskObject for Schedule {
    const NAME: &'static str = "schedule";
    type Api = ScheduleApi;
    type State<'a> = ScheduleState<'a>;

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
                        "Name of the schedule",
                    ),
                    "time_zone" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Time zone of the schedule, eg: `Pacific Time (US & Canada)`",
                    ),
                    "intervals" => Attribute {
                        attr_type: AttributeType::AttributeList(map! {
                            "start_time" => attribute(
                                AttributeType::Number,
                                AttributeConstraint::Required,
                                "Opening time, in minutes since Sunday midnight",
                            ),
                            "end_time" => attribute(
                                AttributeType::Number,
                                AttributeConstraint::Required,
                                "Closing time, in minutes since Sunday midnight",
                            ),
                        }),
                        description: Description::plain("Opening intervals of the week"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                },
                description: Description::plain("Zendesk business hours schedule"),
                ..Default::default()
            },
        }
    }

    fn plan_create<'a>(&self, state: &mut ScheduleState<'a>) {
        state.id = Value::Unknown;
        state.intervals.unknown_if_null();
    }

    async fn after_create<'a>(
        &self,
        diags: &mut Diagnostics,
        api: &dyn ZendeskApi,
        planned: &ScheduleState<'a>,
        state: ScheduleState<'a>,
    ) -> ScheduleState<'a> {
        if !planned.intervals.is_value() {
            return state;
        }
        self.apply_workweek(diags, api, planned, state).await
    }

    async fn after_update<'a>(
        &self,
        diags: &mut Diagnostics,
        api: &dyn ZendeskApi,
        prior: &ScheduleState<'a>,
        planned: &ScheduleState<'a>,
        state: ScheduleState<'a>,
    ) -> ScheduleState<'a> {
        if !planned.intervals.is_value() || planned.intervals == prior.intervals {
            return state;
        }
        self.apply_workweek(diags, api, planned, state).await
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::Value;

    use super::{intervals_from_api, intervals_to_api, IntervalApi, IntervalState};

    #[test]
    fn intervals_keep_their_order() {
        let intervals = vec![
            IntervalApi {
                start_time: 1980,
                end_time: 2460,
            },
            IntervalApi {
                start_time: 3420,
                end_time: 3900,
            },
        ];
        let prior: Value<Vec<Value<IntervalState>>> = Value::Null;
        let state = intervals_from_api(&prior, intervals.clone());
        assert_eq!(intervals_to_api(&state), intervals);
        assert!(intervals_from_api(&prior, vec![]).is_null());
    }
}
