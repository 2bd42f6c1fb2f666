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

use crate::client::clouds::CloudsFile;
use crate::client::dry_run::{DryRun, DryRunConnector};
use crate::client::openstack::OpenStackConnector;
use crate::client::{Cloud, ProfileConnector};
use crate::config::{self, Options};
use crate::types::endpoint::EndpointCatalog;
use crate::types::quota_class::{QuotaClass, QuotaClassCatalog};
use crate::{client, types};
use snafu::Snafu;
use tracing::info;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(transparent)]
    Client { source: client::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },
}

/// Everything a run needs: the admin connection, a way to open per-domain
/// connections, the policy catalogs and the run switches.
pub struct Context {
    pub(crate) cloud: Box<dyn Cloud>,
    pub(crate) connector: Box<dyn ProfileConnector>,
    pub(crate) classes: QuotaClassCatalog,
    pub(crate) endpoints: EndpointCatalog,
    pub(crate) options: Options,
}

impl Context {
    /// Builds a context; with `dry_run` every connection is made read-only.
    pub fn new(
        cloud: Box<dyn Cloud>,
        connector: Box<dyn ProfileConnector>,
        classes: QuotaClassCatalog,
        endpoints: EndpointCatalog,
        options: Options,
    ) -> Self {
        let (cloud, connector): (Box<dyn Cloud>, Box<dyn ProfileConnector>) = if options.dry_run {
            info!("dry-run: no changes will be made");
            (
                Box::new(DryRun::new(cloud)),
                Box::new(DryRunConnector::new(connector)),
            )
        } else {
            (cloud, connector)
        };

        Self {
            cloud,
            connector,
            classes,
            endpoints,
            options,
        }
    }

    /// Loads the configuration files and connects with the configured cloud.
    pub async fn connect(options: Options) -> Result<Self, Error> {
        let classes = config::load_classes(&options.classes)?;
        let endpoints = config::load_endpoints(&options.endpoints)?;
        let connector = OpenStackConnector::new(CloudsFile::discover()?);
        let cloud = connector.connect_default(&options.cloud).await?;
        info!("connected to cloud {}", options.cloud);

        Ok(Self::new(
            Box::new(cloud),
            Box::new(connector),
            classes,
            endpoints,
            options,
        ))
    }

    pub fn resolve_class(&self, name: &str) -> Result<Option<QuotaClass>, Error> {
        Ok(self.classes.resolve(name)?)
    }
}
