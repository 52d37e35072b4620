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

//! Validation of business rule conditions and actions, and of ticket form conditions

use std::borrow::Cow;

use tf_provider::value::{Value, ValueNumber};
use tf_provider::{AttributePath, Diagnostics};

pub mod action;
pub mod condition;
pub mod form_condition;
pub mod tables;

pub use action::{validate_actions, ActionSpec, ActionTarget};
pub use condition::{validate_conditions, ConditionSpec, ConditionsSpec};
pub use form_condition::{
    validate_form_conditions, ChildFieldCondition, FormCondition, FormConditionType,
    RequiredOnStatuses,
};
pub use tables::{ResourceKind, CUSTOM_FIELDS_PREFIX};

/// Field referring to the custom field given by `custom_field_id`
pub const CUSTOM_FIELD: &str = "custom_field";

/// Id used while `custom_field_id` is not known yet
const PLACEHOLDER_CUSTOM_FIELD_ID: i64 = 0;

/// Resolve the key of a field in the validity tables
///
/// `custom_field` is rewritten into `custom_fields_<custom_field_id>`.
/// Errors are reported on `custom_field_id` and `None` is returned.
pub fn resolve_field<'f>(
    diags: &mut Diagnostics,
    field: &'f str,
    custom_field_id: &ValueNumber,
    attr_path: &AttributePath,
) -> Option<Cow<'f, str>> {
    if field != CUSTOM_FIELD {
        if custom_field_id.is_value() {
            diags.error(
                "Unexpected `custom_field_id`",
                format!("`custom_field_id` can only be set when `field` is `{CUSTOM_FIELD}`"),
                attr_path.clone().attribute("custom_field_id"),
            );
            return None;
        }
        return Some(Cow::Borrowed(field));
    }

    let id = match custom_field_id {
        Value::Value(id) => *id,
        Value::Unknown => PLACEHOLDER_CUSTOM_FIELD_ID,
        Value::Null => {
            diags.error(
                "Missing `custom_field_id`",
                format!("`custom_field_id` is required when `field` is `{CUSTOM_FIELD}`"),
                attr_path.clone().attribute("custom_field_id"),
            );
            return None;
        }
    };
    Some(Cow::Owned(format!("{CUSTOM_FIELDS_PREFIX}{id}")))
}

#[cfg(test)]
mod tests {
    use tf_provider::value::Value;
    use tf_provider::{AttributePath, Diagnostics};

    use super::resolve_field;

    #[test]
    fn custom_field_is_rewritten() {
        let mut diags = Diagnostics::default();
        let path = AttributePath::new("actions");

        let field = resolve_field(&mut diags, "custom_field", &Value::Value(360042), &path);
        assert_eq!(field.as_deref(), Some("custom_fields_360042"));

        let field = resolve_field(&mut diags, "custom_field", &Value::Unknown, &path);
        assert_eq!(field.as_deref(), Some("custom_fields_0"));

        let field = resolve_field(&mut diags, "status", &Value::Null, &path);
        assert_eq!(field.as_deref(), Some("status"));
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn custom_field_needs_an_id() {
        let mut diags = Diagnostics::default();
        let path = AttributePath::new("actions");

        assert_eq!(resolve_field(&mut diags, "custom_field", &Value::Null, &path), None);
        assert_eq!(diags.errors.len(), 1);

        assert_eq!(resolve_field(&mut diags, "status", &Value::Value(1), &path), None);
        assert_eq!(diags.errors.len(), 2);
    }
}
