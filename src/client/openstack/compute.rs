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

use super::{OpenStack, ServiceType};
use crate::client::{ComputeApi, Flavor, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct FlavorAccess {
    tenant_id: String,
}

#[async_trait]
impl ComputeApi for OpenStack {
    async fn list_flavors(&self) -> Result<Vec<Flavor>> {
        // `None` lists public and private flavors alike for administrators.
        self.get_key(
            ServiceType::Compute,
            "/flavors/detail",
            &[("is_public", "None")],
            "flavors",
        )
        .await
    }

    async fn list_flavor_access(&self, flavor_id: &str) -> Result<Vec<String>> {
        let access: Vec<FlavorAccess> = self
            .get_key(
                ServiceType::Compute,
                &format!("/flavors/{flavor_id}/os-flavor-access"),
                &[],
                "flavor_access",
            )
            .await?;
        Ok(access.into_iter().map(|access| access.tenant_id).collect())
    }

    async fn add_flavor_access(&self, flavor_id: &str, project_id: &str) -> Result<()> {
        self.post(
            ServiceType::Compute,
            &format!("/flavors/{flavor_id}/action"),
            &json!({ "addTenantAccess": { "tenant": project_id } }),
        )
        .await
    }
}
