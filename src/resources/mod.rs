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

//! Zendesk objects managed by the provider

pub mod automation;
pub mod brand;
pub mod custom_role;
pub mod dynamic_content;
pub mod group;
pub mod macros;
pub mod object_field;
pub mod rules;
pub mod schedule;
pub mod sla_policy;
pub mod ticket_field;
pub mod ticket_form;
pub mod trigger;
pub mod view;
pub mod webhook;

pub use automation::Automation;
pub use brand::Brand;
pub use custom_role::CustomRole;
pub use dynamic_content::DynamicContent;
pub use group::Group;
pub use macros::Macro;
pub use object_field::{ObjectField, OrganizationField, UserField};
pub use schedule::Schedule;
pub use sla_policy::SlaPolicy;
pub use ticket_field::TicketField;
pub use ticket_form::TicketForm;
pub use trigger::Trigger;
pub use view::View;
pub use webhook::Webhook;
