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

//! Naming of RBAC grants and of the provisioned network topology.

/// Grants a project use of a network as its external gateway.
pub const ACCESS_AS_EXTERNAL: &str = "access_as_external";
pub const ACCESS_AS_SHARED: &str = "access_as_shared";

pub const RBAC_OBJECT_NETWORK: &str = "network";

/// Availability zone hint of every provisioned router and network.
pub const AVAILABILITY_ZONE: &str = "nova";

/// Names of the router, network and subnet connecting a project to `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    pub router: String,
    pub network: String,
    pub subnet: String,
}

impl Topology {
    pub fn to_network(target: &str, project_name: &str) -> Self {
        let project = project_name.to_lowercase();
        Self {
            router: format!("router-to-{target}-{project}"),
            network: format!("net-to-{target}-{project}"),
            subnet: format!("subnet-to-{target}-{project}"),
        }
    }
}

/// Subnet of a domain service network hosted in the domain's service project.
pub fn service_subnet_name(service_network: &str) -> String {
    format!("subnet-{service_network}")
}
