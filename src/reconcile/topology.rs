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

use super::{Error, Target, network};
use crate::client::{NewNetwork, NewRouter, NewSubnet, Project};
use crate::context::Context;
use crate::types::network::{AVAILABILITY_ZONE, Topology, service_subnet_name};
use crate::types::project::{ProjectSettings, service_project_name};
use crate::types::quota::QuotaCategory;
use tracing::{info, warn};

/// Classes whose projects never get network resources provisioned.
const UNPROVISIONED_CLASSES: [&str; 2] = ["default", "service"];

pub fn should_provision(target: &Target<'_>) -> bool {
    let settings = &target.settings;
    let managed = settings.managed_network_resources.is_some()
        && !UNPROVISIONED_CLASSES.contains(&target.class_name.as_str());

    managed || (settings.is_service_project() && settings.has_service_network())
}

/// Creates the router, network and subnet a project needs to reach the public
/// and service networks.
pub async fn provision(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let project = target.project;
    let settings = &target.settings;

    if settings.multiplier(QuotaCategory::Network) == 0 {
        info!("{} - network quota multiplier is 0, no network resources", project.name);
        return Ok(());
    }

    if settings.has_public_network() {
        if settings.is_service_project() {
            info!("{} - service project, no public network resources", project.name);
        } else {
            connect_project(ctx, project, settings.public_network_name()).await?;
        }
    }

    if !target.in_default_domain() && settings.has_service_network() {
        let network_name = settings.service_network_name(&target.domain.name.to_lowercase());
        if settings.is_service_project() {
            provision_service_network(ctx, target, &network_name).await?;
        } else {
            connect_project(ctx, project, &network_name).await?;
        }
    }

    Ok(())
}

/// Gives `project` a routed network towards `target_network`.
async fn connect_project(ctx: &Context, project: &Project, target_network: &str) -> Result<(), Error> {
    let names = Topology::to_network(target_network, &project.name);
    let mut attach = false;

    let router = match ctx.cloud.find_router(&names.router, &project.id).await? {
        Some(router) => router,
        None => {
            let Some(external) = ctx.cloud.find_network(target_network, None).await? else {
                warn!(
                    "{} - network {} not found, cannot create router {}",
                    project.name, target_network, names.router
                );
                return Ok(());
            };

            info!("{} - create router {}", project.name, names.router);
            attach = true;
            ctx.cloud
                .create_router(&NewRouter {
                    name: names.router.clone(),
                    project_id: project.id.clone(),
                    external_network_id: external.id,
                    enable_snat: true,
                    availability_zone_hints: vec![AVAILABILITY_ZONE.to_owned()],
                })
                .await?
        }
    };

    let network = match ctx.cloud.find_network(&names.network, Some(&project.id)).await? {
        Some(network) => network,
        None => {
            info!("{} - create network {}", project.name, names.network);
            ctx.cloud
                .create_network(&NewNetwork {
                    name: names.network.clone(),
                    project_id: project.id.clone(),
                    availability_zone_hints: vec![AVAILABILITY_ZONE.to_owned()],
                })
                .await?
        }
    };

    let subnet = match ctx.cloud.find_subnet(&names.subnet, &project.id).await? {
        Some(subnet) => subnet,
        None => {
            info!("{} - create subnet {}", project.name, names.subnet);
            attach = true;
            ctx.cloud
                .create_subnet(&NewSubnet::new(&names.subnet, &network.id, &project.id, None))
                .await?
        }
    };

    if attach {
        info!(
            "{} - attach subnet {} to router {}",
            project.name, names.subnet, names.router
        );
        ctx.cloud
            .add_router_interface(&router.id, &subnet.id)
            .await?;
    }

    Ok(())
}

/// Creates the domain's service network inside its `<domain>-service` project.
async fn provision_service_network(
    ctx: &Context,
    target: &Target<'_>,
    network_name: &str,
) -> Result<(), Error> {
    let domain = target.domain;
    let hosting_name = service_project_name(&domain.name);
    let Some(hosting) = ctx.cloud.find_project(&hosting_name, Some(&domain.id)).await? else {
        warn!(
            "{} - project {} not found, cannot create {}",
            target.name(),
            hosting_name,
            network_name
        );
        return Ok(());
    };
    let hosting_settings = ProjectSettings::from_attributes(&hosting.attributes)?;

    let network = match ctx.cloud.find_network(network_name, Some(&hosting.id)).await? {
        Some(network) => network,
        None => {
            info!("{} - create service network {}", hosting.name, network_name);
            let network = ctx
                .cloud
                .create_network(&NewNetwork {
                    name: network_name.to_owned(),
                    project_id: hosting.id.clone(),
                    availability_zone_hints: vec![AVAILABILITY_ZONE.to_owned()],
                })
                .await?;

            network::ensure_grant(
                ctx,
                &hosting,
                network_name,
                &hosting_settings.service_network_action(),
                true,
            )
            .await?;
            network
        }
    };

    let subnet_name = service_subnet_name(network_name);
    if ctx.cloud.find_subnet(&subnet_name, &hosting.id).await?.is_none() {
        info!("{} - create service subnet {}", hosting.name, subnet_name);
        ctx.cloud
            .create_subnet(&NewSubnet::new(
                &subnet_name,
                &network.id,
                &hosting.id,
                target.settings.service_network_cidr.clone(),
            ))
            .await?;
    }

    Ok(())
}
