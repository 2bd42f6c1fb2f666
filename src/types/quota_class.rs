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

//! Quota class catalog and single-hop parent resolution.
//!
//! A catalog maps class names to raw YAML mappings. Resolving a class merges
//! its direct parent underneath it; the parent's own parent is never consulted.

use crate::types::error::{Error, MalformedClassSnafu};
use crate::types::quota::{QuotaCategory, QuotaMap};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use snafu::ResultExt;
use std::collections::BTreeMap;

/// Prefix of domain names that default to [`PREFIXED_DEFAULT_CLASS`].
pub const RESERVED_DOMAIN_PREFIX: &str = "ok";
pub const PREFIXED_DEFAULT_CLASS: &str = "okeanos";
pub const FALLBACK_DEFAULT_CLASS: &str = "basic";

/// System projects with a class of their own name.
pub const SYSTEM_PROJECTS: [&str; 2] = ["admin", "service"];

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BandwidthClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress_burst: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_burst: Option<i64>,
}

/// A fully resolved quota class.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuotaClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub compute: QuotaMap,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub network: QuotaMap,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volume: QuotaMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<BandwidthClass>,

    /// Private volume types every project of this class may use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_types: Vec<String>,

    /// Private flavors every project of this class may use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flavors: Vec<String>,

    /// Makes the public network visible to projects that do not say, unless
    /// it is `false`. Any other value, a network name included, counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network: Option<Value>,
}

impl QuotaClass {
    pub fn quotas(&self, category: QuotaCategory) -> &QuotaMap {
        match category {
            QuotaCategory::Compute => &self.compute,
            QuotaCategory::Network => &self.network,
            QuotaCategory::Volume => &self.volume,
        }
    }

    pub fn public_network_by_default(&self) -> bool {
        match &self.public_network {
            None | Some(Value::Bool(false)) => false,
            Some(_) => true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuotaClassCatalog {
    classes: BTreeMap<String, Value>,
}

impl QuotaClassCatalog {
    pub fn new(classes: BTreeMap<String, Value>) -> Self {
        Self { classes }
    }

    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        let classes: BTreeMap<String, Value> = serde_yaml_ng::from_str(content)?;
        Ok(Self::new(classes))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Resolves `name` into a flat class.
    ///
    /// Returns `Ok(None)` when the catalog has no such class. A parent that is
    /// not in the catalog is ignored.
    pub fn resolve(&self, name: &str) -> Result<Option<QuotaClass>, Error> {
        let Some(raw) = self.classes.get(name) else {
            return Ok(None);
        };

        let parent = raw
            .get("parent")
            .and_then(Value::as_str)
            .and_then(|parent| self.classes.get(parent));

        let merged = match parent {
            Some(parent) => deep_merge(parent.clone(), raw.clone()),
            None => raw.clone(),
        };

        serde_yaml_ng::from_value(merged)
            .map(Some)
            .context(MalformedClassSnafu { name })
    }

    /// Picks the class name that applies to a project.
    pub fn class_name_for(
        project_name: &str,
        explicit: Option<&str>,
        domain_name: &str,
    ) -> String {
        if SYSTEM_PROJECTS.contains(&project_name) {
            return project_name.to_owned();
        }

        if let Some(explicit) = explicit {
            return explicit.to_owned();
        }

        if domain_name.starts_with(RESERVED_DOMAIN_PREFIX) {
            PREFIXED_DEFAULT_CLASS.to_owned()
        } else {
            FALLBACK_DEFAULT_CLASS.to_owned()
        }
    }
}

/// Merges `overlay` onto `base`. Mappings merge per key, sequences are
/// concatenated without duplicates, everything else is replaced.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (Value::Sequence(mut base), Value::Sequence(overlay)) => {
            for item in overlay {
                if !base.contains(&item) {
                    base.push(item);
                }
            }
            Value::Sequence(base)
        }
        (_, overlay) => overlay,
    }
}
