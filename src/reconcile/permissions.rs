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

use super::{Error, RunCache, Target};
use crate::client::User;
use crate::context::Context;
use crate::error_policy::tolerate_conflict;
use tracing::{debug, error, info, warn};

/// Roles a user gets on its home project.
pub const HOME_PROJECT_ROLES: [&str; 2] = ["member", "load-balancer_member"];

/// Role of the domain admin user on every project of its domain.
pub const ADMIN_USER_ROLE: &str = "member";

/// User names a home project may belong to, most specific first.
///
/// `<domain>-jdoe` belongs to `jdoe`; `<domain>-jdoe-test` falls back to
/// `jdoe` when the suffix contains no dot.
pub fn home_user_candidates(project_name: &str, domain_name: &str) -> Vec<String> {
    let Some(user) = project_name
        .strip_prefix(domain_name)
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|user| !user.is_empty())
    else {
        return Vec::new();
    };

    let mut candidates = vec![user.to_owned()];
    if let Some((base, suffix)) = user.rsplit_once('-')
        && !suffix.contains('.')
        && !base.is_empty()
    {
        candidates.push(base.to_owned());
    }
    candidates
}

async fn assign_roles(
    ctx: &Context,
    cache: &RunCache,
    target: &Target<'_>,
    user: &User,
    roles: &[&str],
) {
    let project = target.project;

    for role_name in roles {
        let Some(role) = cache.role(role_name) else {
            warn!("{} - role {} does not exist", project.name, role_name);
            continue;
        };

        let assigned = ctx
            .cloud
            .assign_project_role(&project.id, &user.id, &role.id)
            .await;
        match tolerate_conflict(assigned) {
            Ok(Some(())) => debug!(
                "{} - {} has role {}",
                project.name, user.name, role_name
            ),
            Ok(None) => debug!(
                "{} - {} already has role {}",
                project.name, user.name, role_name
            ),
            Err(err) => error!(
                "{} - assigning {} to {} failed: {}",
                project.name, role_name, user.name, err
            ),
        }
    }
}

/// Gives the owner of a home project its roles there.
pub async fn reconcile_home_project(
    ctx: &Context,
    cache: &RunCache,
    target: &Target<'_>,
) -> Result<(), Error> {
    let project = target.project;
    if target.settings.homeproject == Some(false) {
        return Ok(());
    }

    let mut owner = None;
    for candidate in home_user_candidates(&project.name, &target.domain.name) {
        if let Some(user) = ctx.cloud.find_user(&candidate, &target.domain.id).await? {
            owner = Some(user);
            break;
        }
    }

    let Some(user) = owner else {
        debug!("{} - no home project user", project.name);
        return Ok(());
    };

    info!("{} - ensure permissions of {}", project.name, user.name);
    assign_roles(ctx, cache, target, &user, &HOME_PROJECT_ROLES).await;
    Ok(())
}

/// Gives `<domain>-admin` of the admin domain the member role.
pub async fn assign_admin_user(
    ctx: &Context,
    cache: &mut RunCache,
    target: &Target<'_>,
) -> Result<(), Error> {
    let name = format!("{}-admin", target.domain.name);
    let Some(user) = cache.admin_user(ctx.cloud.as_ref(), &name).await? else {
        warn!("{} - admin user {} not found", target.name(), name);
        return Ok(());
    };

    info!("{} - ensure permissions of {}", target.name(), user.name);
    assign_roles(ctx, cache, target, &user, &[ADMIN_USER_ROLE]).await;
    Ok(())
}
