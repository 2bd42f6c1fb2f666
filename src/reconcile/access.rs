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

//! Access of projects to private volume types and flavors.

use super::{Error, Target};
use crate::context::Context;
use crate::error_policy::tolerate_conflict;
use crate::types::project::DEFAULT_DOMAIN;
use tracing::{debug, error, info};

/// Whether `name` carries the `<DOMAIN>-` prefix, ignoring case.
pub fn has_domain_prefix(name: &str, domain_name: &str) -> bool {
    let prefix = format!("{}-", domain_name.to_uppercase());
    name.to_uppercase().starts_with(&prefix)
}

/// Picks the only candidate, logging when there is none or more than one.
fn single<T>(project: &str, kind: &str, name: &str, mut candidates: Vec<T>) -> Option<T> {
    match candidates.len() {
        0 => {
            error!("{} - {} {} not found", project, kind, name);
            None
        }
        1 => candidates.pop(),
        _ => {
            error!(
                "{} - {} {} is not unique, please use its id",
                project, kind, name
            );
            None
        }
    }
}

async fn grant_volume_type(ctx: &Context, target: &Target<'_>, type_id: &str, name: &str) {
    let project = target.project;
    info!("{} - add volume type {}", project.name, name);
    match tolerate_conflict(ctx.cloud.add_volume_type_access(type_id, &project.id).await) {
        Ok(Some(())) => {}
        Ok(None) => debug!("{} - volume type {} already granted", project.name, name),
        Err(err) => error!("{} - adding volume type {} failed: {}", project.name, name, err),
    }
}

async fn grant_flavor(ctx: &Context, target: &Target<'_>, flavor_id: &str, name: &str) {
    let project = target.project;
    info!("{} - add flavor {}", project.name, name);
    match tolerate_conflict(ctx.cloud.add_flavor_access(flavor_id, &project.id).await) {
        Ok(Some(())) => {}
        Ok(None) => debug!("{} - flavor {} already granted", project.name, name),
        Err(err) => error!("{} - adding flavor {} failed: {}", project.name, name, err),
    }
}

/// Grants the private volume types listed by the quota class.
pub async fn reconcile_class_volume_types(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let Some(class) = &target.class else {
        return Ok(());
    };

    for name in &class.volume_types {
        let candidates = ctx.cloud.list_private_volume_types(Some(name)).await?;
        if let Some(volume_type) = single(target.name(), "volume type", name, candidates) {
            grant_volume_type(ctx, target, &volume_type.id, name).await;
        }
    }

    Ok(())
}

/// Grants every private volume type named after the project's domain.
pub async fn reconcile_private_volume_types(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let project = target.project;
    if project.domain_id == DEFAULT_DOMAIN && project.name == "admin" {
        return Ok(());
    }

    info!("{} - managing private volume types", project.name);
    for volume_type in ctx.cloud.list_private_volume_types(None).await? {
        if !has_domain_prefix(&volume_type.name, &target.domain.name) {
            continue;
        }

        let access = ctx.cloud.list_volume_type_access(&volume_type.id).await?;
        if access.contains(&project.id) {
            continue;
        }
        grant_volume_type(ctx, target, &volume_type.id, &volume_type.name).await;
    }

    Ok(())
}

/// Grants the private flavors listed by the quota class, by name or id.
pub async fn reconcile_class_flavors(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let Some(class) = &target.class else {
        return Ok(());
    };
    if class.flavors.is_empty() {
        return Ok(());
    }

    let private: Vec<_> = ctx
        .cloud
        .list_flavors()
        .await?
        .into_iter()
        .filter(|flavor| !flavor.is_public)
        .collect();

    for name in &class.flavors {
        let candidates = private
            .iter()
            .filter(|flavor| &flavor.name == name || &flavor.id == name)
            .collect();
        if let Some(flavor) = single(target.name(), "flavor", name, candidates) {
            grant_flavor(ctx, target, &flavor.id, name).await;
        }
    }

    Ok(())
}

/// Grants every private flavor named after the project's domain.
pub async fn reconcile_private_flavors(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let project = target.project;

    info!("{} - managing private flavors", project.name);
    for flavor in ctx.cloud.list_flavors().await? {
        if flavor.is_public || !has_domain_prefix(&flavor.name, &target.domain.name) {
            continue;
        }

        let access = ctx.cloud.list_flavor_access(&flavor.id).await?;
        if access.contains(&project.id) {
            continue;
        }
        grant_flavor(ctx, target, &flavor.id, &flavor.name).await;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::tests::FakeCloud;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("ACME-ssd", "acme", true ; "upper prefix")]
    #[test_case("acme-ssd", "Acme", true ; "mixed case")]
    #[test_case("acmessd", "acme", false ; "no dash")]
    #[test_case("other-acme-ssd", "acme", false ; "prefix elsewhere")]
    fn test_has_domain_prefix(name: &str, domain: &str, expected: bool) {
        assert_eq!(has_domain_prefix(name, domain), expected);
    }

    // Test: class volume types are granted once, duplicates are refused
    #[tokio::test]
    async fn test_class_volume_types() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({"quotaclass": "limited"}));
        let premium = fake.add_volume_type("premium", false);
        fake.add_volume_type("premium", true);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile_class_volume_types(&ctx, &target).await.unwrap();
        reconcile_class_volume_types(&ctx, &target).await.unwrap();

        assert_eq!(
            fake.mutations(),
            vec![format!("add_volume_type_access {} {}", premium.id, project.id)]
        );

        fake.add_volume_type("premium", false);
        fake.clear_mutations();
        reconcile_class_volume_types(&ctx, &target).await.unwrap();
        assert!(fake.mutations().is_empty(), "ambiguous names are not granted");
    }

    #[tokio::test]
    async fn test_private_volume_types() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        let ssd = fake.add_volume_type("ACME-ssd", false);
        fake.add_volume_type("other-ssd", false);
        fake.add_volume_type("acme-public", true);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile_private_volume_types(&ctx, &target).await.unwrap();

        assert_eq!(
            fake.mutations(),
            vec![format!("add_volume_type_access {} {}", ssd.id, project.id)]
        );

        fake.clear_mutations();
        reconcile_private_volume_types(&ctx, &target).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_admin_project_keeps_volume_types() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("default");
        let project = fake.add_project(&domain, "admin", json!({}));
        fake.add_volume_type("DEFAULT-ssd", false);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile_private_volume_types(&ctx, &target).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    // Test: class flavors match by name or id
    #[tokio::test]
    async fn test_class_flavors() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({"quotaclass": "limited"}));
        let gpu = fake.add_flavor("gpu.large", false);
        fake.add_flavor("gpu.large", true);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile_class_flavors(&ctx, &target).await.unwrap();
        reconcile_class_flavors(&ctx, &target).await.unwrap();

        assert_eq!(
            fake.mutations(),
            vec![format!("add_flavor_access {} {}", gpu.id, project.id)]
        );
    }

    #[tokio::test]
    async fn test_private_flavors() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        let private = fake.add_flavor("ACME-big", false);
        fake.add_flavor("ACME-public", true);
        fake.add_flavor("OTHER-big", false);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile_private_flavors(&ctx, &target).await.unwrap();
        assert_eq!(
            fake.mutations(),
            vec![format!("add_flavor_access {} {}", private.id, project.id)]
        );

        fake.clear_mutations();
        reconcile_private_flavors(&ctx, &target).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_grant_failure_is_logged() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        fake.add_flavor("ACME-big", false);
        fake.fail("add_flavor_access", 500);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile_private_flavors(&ctx, &target).await.unwrap();
        assert!(fake.state().flavor_access.is_empty());
    }
}
