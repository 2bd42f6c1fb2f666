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

//! Typed view over the free-form attributes attached to a project.

use crate::types::error::{Error, InvalidAttributeSnafu};
use crate::types::quota::{QuotaCategory, ROUTER_KEY};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_DOMAIN: &str = "default";
pub const DEFAULT_PUBLIC_NETWORK: &str = "public";
pub const DEFAULT_SERVICE_NETWORK_TYPE: &str = "shared";
pub const DEFAULT_ENDPOINT_CATEGORIES: [&str; 2] = ["default", "orchestration"];

const QUOTA_OVERRIDE_PREFIX: &str = "quota_";
const TRUTHY: [&str; 4] = ["true", "True", "yes", "Yes"];

/// Raw attributes as stored on the project record.
pub type Attributes = BTreeMap<String, Value>;

/// Per-project policy parsed from [`Attributes`].
///
/// `None` always means "not set", so callers can tell an explicit `false`
/// apart from an absent attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectSettings {
    pub quota_class: Option<String>,
    pub quota_multiplier: Option<i64>,
    pub quota_multiplier_compute: Option<i64>,
    pub quota_multiplier_network: Option<i64>,
    pub quota_multiplier_storage: Option<i64>,
    pub quota_router: Option<i64>,
    /// Verbatim `quota_<resource>` values, keyed by resource.
    pub quota_overrides: BTreeMap<String, i64>,

    pub has_public_network: Option<bool>,
    pub show_public_network: Option<bool>,
    pub has_service_network: Option<bool>,
    pub public_network: Option<String>,
    pub service_network: Option<String>,
    pub service_network_cidr: Option<String>,
    pub service_network_type: Option<String>,
    pub is_service_project: Option<bool>,
    pub has_shared_images: Option<bool>,
    pub homeproject: Option<bool>,
    pub managed_network_resources: Option<bool>,
    pub endpoints: Option<Vec<String>>,
    pub unmanaged: bool,
}

impl ProjectSettings {
    pub fn from_attributes(attributes: &Attributes) -> Result<Self, Error> {
        let mut quota_overrides = BTreeMap::new();
        for (key, value) in attributes {
            let Some(resource) = key.strip_prefix(QUOTA_OVERRIDE_PREFIX) else {
                continue;
            };
            if resource == ROUTER_KEY {
                continue;
            }
            quota_overrides.insert(resource.to_owned(), parse_int(key, value)?);
        }

        Ok(Self {
            quota_class: string_attr(attributes, "quotaclass"),
            quota_multiplier: int_attr(attributes, "quotamultiplier")?,
            quota_multiplier_compute: int_attr(attributes, "quotamultiplier_compute")?,
            quota_multiplier_network: int_attr(attributes, "quotamultiplier_network")?,
            quota_multiplier_storage: int_attr(attributes, "quotamultiplier_storage")?,
            quota_router: int_attr(attributes, "quota_router")?,
            quota_overrides,
            has_public_network: bool_attr(attributes, "has_public_network"),
            show_public_network: bool_attr(attributes, "show_public_network"),
            has_service_network: bool_attr(attributes, "has_service_network"),
            public_network: string_attr(attributes, "public_network"),
            service_network: string_attr(attributes, "service_network"),
            service_network_cidr: string_attr(attributes, "service_network_cidr"),
            service_network_type: string_attr(attributes, "service_network_type"),
            is_service_project: bool_attr(attributes, "is_service_project"),
            has_shared_images: bool_attr(attributes, "has_shared_images"),
            homeproject: bool_attr(attributes, "homeproject"),
            managed_network_resources: bool_attr(attributes, "managed_network_resources"),
            endpoints: string_attr(attributes, "endpoints").map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|category| !category.is_empty())
                    .map(str::to_owned)
                    .collect()
            }),
            unmanaged: attributes.contains_key("unmanaged"),
        })
    }

    /// Multiplier applied to the class values of `category`.
    pub fn multiplier(&self, category: QuotaCategory) -> i64 {
        let specific = match category {
            QuotaCategory::Compute => self.quota_multiplier_compute,
            QuotaCategory::Network => self.quota_multiplier_network,
            QuotaCategory::Volume => self.quota_multiplier_storage,
        };
        specific.or(self.quota_multiplier).unwrap_or(1)
    }

    pub fn has_public_network(&self) -> bool {
        self.has_public_network.unwrap_or(false)
    }

    pub fn has_service_network(&self) -> bool {
        self.has_service_network.unwrap_or(false)
    }

    pub fn is_service_project(&self) -> bool {
        self.is_service_project.unwrap_or(false)
    }

    pub fn has_shared_images(&self) -> bool {
        self.has_shared_images.unwrap_or(false)
    }

    pub fn public_network_name(&self) -> &str {
        self.public_network
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_NETWORK)
    }

    pub fn service_network_name(&self, domain_name: &str) -> String {
        self.service_network
            .clone()
            .unwrap_or_else(|| service_project_name(domain_name))
    }

    /// RBAC action used to share the service network.
    pub fn service_network_action(&self) -> String {
        format!(
            "access_as_{}",
            self.service_network_type
                .as_deref()
                .unwrap_or(DEFAULT_SERVICE_NETWORK_TYPE)
        )
    }

    pub fn endpoint_categories(&self) -> Vec<String> {
        match &self.endpoints {
            Some(endpoints) => endpoints.clone(),
            None => DEFAULT_ENDPOINT_CATEGORIES
                .iter()
                .map(|category| (*category).to_owned())
                .collect(),
        }
    }
}

/// Name of the per-domain project that hosts the service network.
pub fn service_project_name(domain_name: &str) -> String {
    format!("{domain_name}-service")
}

/// Name of the per-domain project that owns shared images.
pub fn images_project_name(domain_name: &str) -> String {
    format!("{domain_name}-images")
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => TRUTHY.contains(&text.as_str()),
        _ => false,
    }
}

fn bool_attr(attributes: &Attributes, key: &str) -> Option<bool> {
    attributes.get(key).map(is_truthy)
}

fn string_attr(attributes: &Attributes, key: &str) -> Option<String> {
    attributes.get(key).map(|value| match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

fn int_attr(attributes: &Attributes, key: &str) -> Result<Option<i64>, Error> {
    attributes
        .get(key)
        .map(|value| parse_int(key, value))
        .transpose()
}

fn parse_int(key: &str, value: &Value) -> Result<i64, Error> {
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        InvalidAttributeSnafu {
            key,
            value: value.to_string(),
        }
        .build()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn attributes(value: Value) -> Attributes {
        serde_json::from_value(value).expect("Should be an object")
    }

    #[test_case(json!(true), true ; "json true")]
    #[test_case(json!(false), false ; "json false")]
    #[test_case(json!("true"), true ; "lowercase true")]
    #[test_case(json!("True"), true ; "capitalized true")]
    #[test_case(json!("yes"), true ; "lowercase yes")]
    #[test_case(json!("Yes"), true ; "capitalized yes")]
    #[test_case(json!("TRUE"), false ; "uppercase is false")]
    #[test_case(json!("no"), false ; "no")]
    #[test_case(json!(1), false ; "number")]
    fn test_is_truthy(value: Value, expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }

    // Test: absent attributes stay None, explicit false stays Some(false)
    #[test]
    fn test_absent_versus_explicit_false() {
        let settings =
            ProjectSettings::from_attributes(&attributes(json!({"homeproject": "false"})))
                .unwrap();

        assert_eq!(settings.homeproject, Some(false));
        assert_eq!(settings.has_public_network, None);
        assert!(!settings.has_public_network());
        assert!(!settings.unmanaged);
    }

    #[test]
    fn test_multipliers() {
        let settings = ProjectSettings::from_attributes(&attributes(json!({
            "quotamultiplier": "4",
            "quotamultiplier_storage": 2,
        })))
        .unwrap();

        assert_eq!(settings.multiplier(QuotaCategory::Compute), 4);
        assert_eq!(settings.multiplier(QuotaCategory::Network), 4);
        assert_eq!(settings.multiplier(QuotaCategory::Volume), 2);

        let defaults = ProjectSettings::default();
        assert_eq!(defaults.multiplier(QuotaCategory::Network), 1);
    }

    // Test: quota_router is kept apart from the generic overrides
    #[test]
    fn test_quota_overrides() {
        let settings = ProjectSettings::from_attributes(&attributes(json!({
            "quota_router": "3",
            "quota_cores": "64",
            "quota_gigabytes": 1000,
            "quotaclass": "huge",
        })))
        .unwrap();

        assert_eq!(settings.quota_router, Some(3));
        assert_eq!(settings.quota_overrides.len(), 2);
        assert_eq!(settings.quota_overrides.get("cores"), Some(&64));
        assert_eq!(settings.quota_overrides.get("gigabytes"), Some(&1000));
        assert_eq!(settings.quota_class.as_deref(), Some("huge"));
    }

    #[test]
    fn test_invalid_integer_is_rejected() {
        let err = ProjectSettings::from_attributes(&attributes(json!({
            "quotamultiplier": "lots",
        })))
        .unwrap_err();

        assert!(matches!(err, Error::InvalidAttribute { ref key, .. } if key == "quotamultiplier"));
    }

    #[test]
    fn test_network_defaults() {
        let settings = ProjectSettings::default();

        assert_eq!(settings.public_network_name(), "public");
        assert_eq!(settings.service_network_name("acme"), "acme-service");
        assert_eq!(settings.service_network_action(), "access_as_shared");
        assert_eq!(
            settings.endpoint_categories(),
            vec!["default".to_string(), "orchestration".to_string()]
        );
    }

    #[test]
    fn test_endpoints_and_unmanaged() {
        let settings = ProjectSettings::from_attributes(&attributes(json!({
            "endpoints": "default, telemetry,",
            "service_network_type": "external",
            "unmanaged": "whatever",
        })))
        .unwrap();

        assert_eq!(
            settings.endpoints,
            Some(vec!["default".to_string(), "telemetry".to_string()])
        );
        assert_eq!(settings.service_network_action(), "access_as_external");
        assert!(settings.unmanaged);
    }
}
