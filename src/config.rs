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

use crate::types::endpoint::EndpointCatalog;
use crate::types::error::{Error, ParseConfigSnafu, ReadConfigSnafu};
use crate::types::quota_class::QuotaClassCatalog;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CLASSES_PATH: &str = "etc/classes.yml";
pub const DEFAULT_ENDPOINTS_PATH: &str = "etc/endpoints.yml";
pub const DEFAULT_CLOUD: &str = "admin";
pub const DEFAULT_ADMIN_DOMAIN: &str = "default";

/// Switches of one `manage` run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub dry_run: bool,
    pub manage_endpoints: bool,
    pub manage_homeprojects: bool,
    pub manage_private_volume_types: bool,
    pub manage_private_flavors: bool,
    pub assign_admin_user: bool,
    pub admin_domain: String,
    pub classes: PathBuf,
    pub endpoints: PathBuf,
    pub cloud: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dry_run: false,
            manage_endpoints: false,
            manage_homeprojects: false,
            manage_private_volume_types: true,
            manage_private_flavors: true,
            assign_admin_user: false,
            admin_domain: DEFAULT_ADMIN_DOMAIN.to_owned(),
            classes: PathBuf::from(DEFAULT_CLASSES_PATH),
            endpoints: PathBuf::from(DEFAULT_ENDPOINTS_PATH),
            cloud: DEFAULT_CLOUD.to_owned(),
        }
    }
}

fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let content = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
    serde_yaml_ng::from_str(&content).context(ParseConfigSnafu { path })
}

pub fn load_classes(path: &Path) -> Result<QuotaClassCatalog, Error> {
    let classes: BTreeMap<String, serde_yaml_ng::Value> = load_yaml(path)?;
    Ok(QuotaClassCatalog::new(classes))
}

pub fn load_endpoints(path: &Path) -> Result<EndpointCatalog, Error> {
    load_yaml(path)
}
