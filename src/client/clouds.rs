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

//! Connection profiles from `clouds.yaml`.

use super::{
    Error, MissingCloudsFileSnafu, ParseCloudsFileSnafu, ProfileNotFoundSnafu,
    ReadCloudsFileSnafu,
};
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CLOUDS_FILE_ENV: &str = "OS_CLIENT_CONFIG_FILE";
const CLOUDS_FILE_NAME: &str = "clouds.yaml";

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AuthConfig {
    pub auth_url: String,
    pub username: String,
    pub password: String,

    #[serde(default)]
    pub user_domain_name: Option<String>,
    #[serde(default)]
    pub user_domain_id: Option<String>,

    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_domain_name: Option<String>,
    #[serde(default)]
    pub project_domain_id: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CloudProfile {
    pub auth: AuthConfig,

    #[serde(default)]
    pub region_name: Option<String>,

    /// Endpoint interface taken from the service catalog, `public` when unset.
    #[serde(default)]
    pub interface: Option<String>,

    #[serde(default = "verify_by_default")]
    pub verify: bool,
}

fn verify_by_default() -> bool {
    true
}

impl CloudProfile {
    /// Same credentials, scoped to another project of the same project domain.
    pub fn scoped_to(&self, project_name: &str) -> Self {
        let mut profile = self.clone();
        profile.auth.project_name = Some(project_name.to_owned());
        profile.auth.project_id = None;
        profile
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("public")
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CloudsFile {
    #[serde(default)]
    clouds: BTreeMap<String, CloudProfile>,
}

impl CloudsFile {
    /// Loads the first `clouds.yaml` found in the usual locations.
    pub fn discover() -> Result<Self, Error> {
        let path = candidate_paths()
            .into_iter()
            .find(|path| path.is_file())
            .context(MissingCloudsFileSnafu)?;
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).context(ReadCloudsFileSnafu { path })?;
        serde_yaml_ng::from_str(&content).context(ParseCloudsFileSnafu { path })
    }

    pub fn profile(&self, name: &str) -> Result<&CloudProfile, Error> {
        self.clouds
            .get(name)
            .context(ProfileNotFoundSnafu { profile: name })
    }
}

/// Search order: `$OS_CLIENT_CONFIG_FILE`, the working directory, the user
/// config directory, then `/etc/openstack`.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(path) = std::env::var(CLOUDS_FILE_ENV) {
        paths.push(PathBuf::from(path));
    }

    paths.push(PathBuf::from(CLOUDS_FILE_NAME));

    if let Some(config) = dirs::config_dir() {
        paths.push(config.join("openstack").join(CLOUDS_FILE_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("openstack").join(CLOUDS_FILE_NAME));
    }

    paths.push(PathBuf::from("/etc/openstack").join(CLOUDS_FILE_NAME));
    paths
}
