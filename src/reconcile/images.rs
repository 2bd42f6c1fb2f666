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

use super::{Error, Target};
use crate::client::{self, Cloud, Domain, Image, NewVolume, Project};
use crate::context::Context;
use crate::types::image::{
    MEMBER_ACCEPTED, cache_volume_name, cache_volume_size, cached_image_id,
};
use crate::types::project::images_project_name;
use tracing::{debug, error, info, warn};

/// Connection profile of the per-domain admin used for the image cache.
pub fn cache_profile(domain_name: &str) -> String {
    format!("opm-{domain_name}-admin")
}

async fn images_project(ctx: &Context, domain: &Domain) -> Result<Option<Project>, Error> {
    Ok(ctx
        .cloud
        .find_project(&images_project_name(&domain.name), Some(&domain.id))
        .await?)
}

/// Makes the project an accepted member of every image of `<domain>-images`.
pub async fn share_images(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let Some(owner) = images_project(ctx, target.domain).await? else {
        debug!(
            "{} - no {} project",
            target.name(),
            images_project_name(&target.domain.name)
        );
        return Ok(());
    };

    for image in ctx.cloud.list_shared_images(&owner.id).await? {
        share_image(ctx, &image, target.project).await?;
    }

    Ok(())
}

async fn share_image(ctx: &Context, image: &Image, project: &Project) -> Result<(), Error> {
    let image_name = image.name.as_deref().unwrap_or(&image.id);
    let member = match ctx.cloud.find_member(&image.id, &project.id).await? {
        Some(member) => member,
        None => {
            info!("{} - share image {}", project.name, image_name);
            ctx.cloud.add_member(&image.id, &project.id).await?
        }
    };

    if member.status != MEMBER_ACCEPTED {
        info!(
            "{} - accept image {} ({})",
            project.name, image_name, member.status
        );
        ctx.cloud
            .update_member_status(&image.id, &project.id, MEMBER_ACCEPTED)
            .await?;
    }

    Ok(())
}

/// Keeps one `cache-<image id>` volume per shared image of the domain.
pub async fn cache_images(ctx: &Context, domain: &Domain) -> Result<(), Error> {
    let Some(owner) = images_project(ctx, domain).await? else {
        return Ok(());
    };
    let images = ctx.cloud.list_shared_images(&owner.id).await?;

    let profile = cache_profile(&domain.name);
    let cloud = match ctx.connector.connect(&profile, &owner.name).await {
        Ok(cloud) => cloud,
        Err(client::Error::ProfileNotFound { .. }) => {
            warn!(
                "{} - profile {} not found, skipping image cache",
                domain.name, profile
            );
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    remove_stale_volumes(cloud.as_ref(), domain).await?;

    for image in &images {
        let name = cache_volume_name(&image.id);
        if cloud.find_volume(&name).await?.is_some() {
            continue;
        }

        let Some(size) = image.size else {
            warn!("{} - image {} has no size, not cached", domain.name, image.id);
            continue;
        };

        let volume = NewVolume {
            name,
            size: cache_volume_size(size, image.min_disk),
            image_id: image.id.clone(),
        };
        info!(
            "{} - prepare image cache {} ({} GiB)",
            domain.name, volume.name, volume.size
        );
        if let Err(err) = cloud.create_volume(&volume).await {
            error!("{} - creating {} failed: {}", domain.name, volume.name, err);
        }
    }

    Ok(())
}

async fn remove_stale_volumes(cloud: &dyn Cloud, domain: &Domain) -> Result<(), Error> {
    for volume in cloud.list_volumes().await? {
        let Some(image_id) = volume.name.as_deref().and_then(cached_image_id) else {
            continue;
        };
        if cloud.find_image(image_id).await?.is_some() {
            continue;
        }

        info!("{} - remove image cache {}", domain.name, volume.id);
        if let Err(err) = cloud.delete_volume(&volume.id).await {
            error!("{} - removing {} failed: {}", domain.name, volume.id, err);
        }
    }

    Ok(())
}
