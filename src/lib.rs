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

use crate::client::Cloud;
use crate::client::clouds::CloudsFile;
use crate::client::dry_run::DryRun;
use crate::client::openstack::OpenStackConnector;
use crate::config::Options;
use crate::context::Context;
use crate::reconcile::{Scope, endpoint_groups};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod client;
pub mod config;
pub mod context;
mod error_policy;
pub mod reconcile;
pub mod types;


pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();
}

/// Converges every project in `scope`.
pub async fn manage(options: Options, scope: Scope) -> Result<(), Box<dyn std::error::Error>> {
    let context = Context::connect(options).await?;
    reconcile::run(&context, scope).await?;
    info!("run completed");

    Ok(())
}

/// Resolves a quota class and renders it as YAML.
pub fn show_class(classes: &Path, name: &str) -> Result<String, Box<dyn std::error::Error>> {
    let catalog = config::load_classes(classes)?;
    let class = catalog
        .resolve(name)?
        .ok_or_else(|| format!("quota class {name} not found in {}", classes.display()))?;

    Ok(serde_yaml_ng::to_string(&class)?)
}

/// Creates missing endpoint groups and renders the name to id table.
pub async fn bootstrap_endpoint_groups(
    cloud: &str,
    dry_run: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let connector = OpenStackConnector::new(CloudsFile::discover()?);
    let connection: Box<dyn Cloud> = Box::new(connector.connect_default(cloud).await?);
    let connection: Box<dyn Cloud> = if dry_run {
        Box::new(DryRun::new(connection))
    } else {
        connection
    };

    let groups = endpoint_groups::bootstrap(connection.as_ref()).await?;
    let width = groups.keys().map(String::len).max().unwrap_or(0);

    Ok(groups
        .values()
        .map(|group| format!("{:<width$}  {}\n", group.name, group.id))
        .collect())
}
