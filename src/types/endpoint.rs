// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
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

use crate::types::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Interface {
    Internal,
    Public,
    Admin,
}

impl Interface {
    /// Interfaces a project gets visibility of.
    pub const PROJECT_VISIBLE: [Interface; 2] = [Interface::Internal, Interface::Public];

    /// Interfaces an endpoint group is bootstrapped for.
    pub const BOOTSTRAP: [Interface; 3] = [Interface::Public, Interface::Internal, Interface::Admin];
}

pub fn endpoint_group_name(service: &str, interface: Interface) -> String {
    format!("{service}-{interface}")
}

/// Endpoint category name to the service names it contains.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct EndpointCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

/// Endpoint groups a project should see.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DesiredGroups {
    pub names: Vec<String>,
    pub unknown_categories: Vec<String>,
}

impl EndpointCatalog {
    pub fn new(categories: BTreeMap<String, Vec<String>>) -> Self {
        Self { categories }
    }

    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Flattens `categories` into `<service>-<interface>` names, keeping the
    /// first occurrence of each name.
    pub fn desired_groups<S: AsRef<str>>(&self, categories: &[S]) -> DesiredGroups {
        let mut desired = DesiredGroups::default();

        for category in categories {
            let category = category.as_ref();
            let Some(services) = self.categories.get(category) else {
                desired.unknown_categories.push(category.to_owned());
                continue;
            };

            for service in services {
                for interface in Interface::PROJECT_VISIBLE {
                    let name = endpoint_group_name(service, interface);
                    if !desired.names.contains(&name) {
                        desired.names.push(name);
                    }
                }
            }
        }

        desired
    }
}
