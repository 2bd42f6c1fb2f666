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
use crate::client::{QuotaApi, Result};
use crate::types::quota::{QuotaCategory, QuotaMap};
use async_trait::async_trait;
use serde_json::{Map, Value, json};

/// Service, path prefix and envelope key of the quota API of a category.
fn quota_api(category: QuotaCategory) -> (ServiceType, &'static str, &'static str) {
    match category {
        QuotaCategory::Compute => (ServiceType::Compute, "/os-quota-sets", "quota_set"),
        QuotaCategory::Network => (ServiceType::Network, "/quotas", "quota"),
        QuotaCategory::Volume => (ServiceType::BlockStorage, "/os-quota-sets", "quota_set"),
    }
}

/// Keeps the integer members of a quota set; ids and nested details are dropped.
fn quota_map(values: Map<String, Value>) -> QuotaMap {
    values
        .into_iter()
        .filter_map(|(key, value)| value.as_i64().map(|value| (key, value)))
        .collect()
}

#[async_trait]
impl QuotaApi for OpenStack {
    async fn get_quotas(&self, category: QuotaCategory, project_id: &str) -> Result<QuotaMap> {
        let (service, prefix, key) = quota_api(category);
        let values: Map<String, Value> = self
            .get_key(service, &format!("{prefix}/{project_id}"), &[], key)
            .await?;
        Ok(quota_map(values))
    }

    async fn set_quota(
        &self,
        category: QuotaCategory,
        project_id: &str,
        key: &str,
        value: i64,
    ) -> Result<()> {
        let (service, prefix, envelope) = quota_api(category);
        self.put(
            service,
            &format!("{prefix}/{project_id}"),
            Some(&json!({ envelope: { key: value } })),
        )
        .await
        .map(drop)
    }
}
