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

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description};
use tf_provider::value::{Value, ValueList, ValueString};

pub(crate) trait WithUnknown {
    /// Mark a value unknown when the configuration left it null
    ///
    /// Used for optional computed attributes during planning
    fn unknown_if_null(&mut self);
}

impl<T> WithUnknown for Value<T> {
    fn unknown_if_null(&mut self) {
        if self.is_null() {
            *self = Value::Unknown;
        }
    }
}

/// Copy the string out of a known value
pub(crate) fn string(value: &ValueString) -> Option<String> {
    value.as_deref_option().map(str::to_owned)
}

pub(crate) fn string_value<'a>(value: Option<String>) -> ValueString<'a> {
    value.map(Cow::Owned).into()
}

pub(crate) fn id_value<'a>(id: Option<i64>) -> ValueString<'a> {
    string_value(id.map(|id| id.to_string()))
}

/// Parse a numeric Zendesk id stored as a string
pub(crate) fn numeric_id(value: &ValueString) -> Option<i64> {
    value.as_deref_option().and_then(|id| id.parse().ok())
}

pub(crate) fn strings(value: &ValueList<ValueString>) -> Option<Vec<String>> {
    value
        .as_ref_option()
        .map(|list| list.iter().filter_map(string).collect())
}

/// Build a list value from an API list
///
/// An empty list is kept null when the prior value was null,
/// so that an omitted attribute does not show a diff against `[]`.
pub(crate) fn list_value<T, U>(prior: &ValueList<T>, items: Vec<U>) -> ValueList<U> {
    if items.is_empty() && prior.is_null() {
        Value::Null
    } else {
        Value::Value(items)
    }
}

pub(crate) fn string_list<'a, T>(
    prior: &ValueList<T>,
    items: Vec<String>,
) -> ValueList<ValueString<'a>> {
    list_value(
        prior,
        items.into_iter().map(|item| Value::Value(Cow::Owned(item))).collect(),
    )
}

pub(crate) fn id_attribute() -> Attribute {
    Attribute {
        attr_type: AttributeType::String,
        description: Description::plain("Zendesk identifier of the object"),
        constraint: AttributeConstraint::Computed,
        ..Default::default()
    }
}

pub(crate) fn url_attribute() -> Attribute {
    Attribute {
        attr_type: AttributeType::String,
        description: Description::plain("API URL of the object"),
        constraint: AttributeConstraint::Computed,
        ..Default::default()
    }
}

pub(crate) fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &'static str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use tf_provider::value::{Value, ValueList, ValueString};

    use super::{list_value, numeric_id, WithUnknown};

    #[test]
    fn null_becomes_unknown() {
        let mut value = ValueString::Null;
        value.unknown_if_null();
        assert!(value.is_unknown());

        let mut value = ValueString::from("kept");
        value.unknown_if_null();
        assert_eq!(value.as_str(), "kept");
    }

    #[test]
    fn empty_list_stays_null() {
        let prior: ValueList<ValueString> = Value::Null;
        assert!(list_value::<_, i64>(&prior, vec![]).is_null());

        let prior: ValueList<ValueString> = Value::Value(vec![]);
        assert_eq!(list_value::<_, i64>(&prior, vec![]), Value::Value(vec![]));
        assert_eq!(list_value(&Value::<Vec<i64>>::Null, vec![1]), Value::Value(vec![1]));
    }

    #[test]
    fn parse_ids() {
        assert_eq!(numeric_id(&ValueString::from("360001")), Some(360001));
        assert_eq!(numeric_id(&ValueString::from("abc")), None);
        assert_eq!(numeric_id(&ValueString::Unknown), None);
    }
}
