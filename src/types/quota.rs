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

//! Quota categories and the resource keys each backing service knows about.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Live or desired quota values of one category, keyed by resource name.
/// A negative value means unlimited.
pub type QuotaMap = BTreeMap<String, i64>;

/// The unlimited sentinel every service understands.
pub const UNLIMITED: i64 = -1;

/// Network resource whose desired value depends on the project's entitlements.
pub const ROUTER_KEY: &str = "router";

const COMPUTE_KEYS: &[&str] = &[
    "cores",
    "injected_file_content_bytes",
    "injected_file_path_bytes",
    "injected_files",
    "instances",
    "key_pairs",
    "metadata_items",
    "ram",
    "server_group_members",
    "server_groups",
];

const NETWORK_KEYS: &[&str] = &[
    "floatingip",
    "network",
    "port",
    "rbac_policy",
    "router",
    "security_group",
    "security_group_rule",
    "subnet",
    "subnetpool",
];

const VOLUME_KEYS: &[&str] = &[
    "backup_gigabytes",
    "backups",
    "gigabytes",
    "per_volume_gigabytes",
    "snapshots",
    "volumes",
];

/// Per-object size caps. Scaling them with the project size makes no sense.
const MULTIPLIER_EXEMPT_KEYS: &[&str] = &[
    "injected_file_content_bytes",
    "injected_file_path_bytes",
    "metadata_items",
    "per_volume_gigabytes",
];

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuotaCategory {
    Compute,
    Network,
    Volume,
}

impl QuotaCategory {
    pub fn known_keys(self) -> &'static [&'static str] {
        match self {
            QuotaCategory::Compute => COMPUTE_KEYS,
            QuotaCategory::Network => NETWORK_KEYS,
            QuotaCategory::Volume => VOLUME_KEYS,
        }
    }

    /// Category owning a resource key, if any.
    pub fn of_key(key: &str) -> Option<Self> {
        [
            QuotaCategory::Network,
            QuotaCategory::Compute,
            QuotaCategory::Volume,
        ]
        .into_iter()
        .find(|category| category.known_keys().contains(&key))
    }
}

pub fn is_multiplier_exempt(key: &str) -> bool {
    MULTIPLIER_EXEMPT_KEYS.contains(&key)
}

/// Collapses every negative value onto the unlimited sentinel.
pub fn clamp(value: i64) -> i64 {
    if value < 0 { UNLIMITED } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_of_key() {
        assert_eq!(QuotaCategory::of_key("cores"), Some(QuotaCategory::Compute));
        assert_eq!(QuotaCategory::of_key("router"), Some(QuotaCategory::Network));
        assert_eq!(QuotaCategory::of_key("gigabytes"), Some(QuotaCategory::Volume));
        assert_eq!(QuotaCategory::of_key("bogus"), None);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-20), UNLIMITED);
        assert_eq!(clamp(-1), UNLIMITED);
        assert_eq!(clamp(0), 0);
        assert_eq!(clamp(42), 42);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(QuotaCategory::Compute.to_string(), "compute");
        assert_eq!("volume".parse::<QuotaCategory>().ok(), Some(QuotaCategory::Volume));
    }
}
