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

//! Terraform and ToFu provider for Zendesk
//!
//! Every Zendesk object is exposed as a [`resource::ZendeskResource`], generic over a
//! [`resource::ZendeskObject`] describing its schema and its API representation.
//! Business rules are validated against the fields and operators Zendesk accepts,
//! before any call to the API.

pub mod client;
pub mod crud;
pub mod data_sources;
pub mod provider;
pub mod resource;
pub mod resources;
pub mod upgrade;
pub mod validation;

mod utils;

pub use provider::ZendeskProvider;
