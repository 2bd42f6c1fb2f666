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
use crate::context::Context;
use crate::error_policy::tolerate_conflict;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Attaches the endpoint groups of the project's categories it does not have yet.
pub async fn reconcile(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let project = target.project;
    let desired = ctx
        .endpoints
        .desired_groups(&target.settings.endpoint_categories());

    for category in &desired.unknown_categories {
        warn!("{} - unknown endpoint category {}", project.name, category);
    }

    let groups: BTreeMap<String, String> = ctx
        .cloud
        .list_endpoint_groups()
        .await?
        .into_iter()
        .map(|group| (group.name, group.id))
        .collect();

    let assigned: BTreeSet<String> = ctx
        .cloud
        .list_project_endpoint_groups(&project.id)
        .await?
        .into_iter()
        .map(|group| group.name)
        .collect();

    for name in &desired.names {
        if assigned.contains(name) {
            continue;
        }

        let Some(group_id) = groups.get(name) else {
            warn!("{} - endpoint group {} does not exist", project.name, name);
            continue;
        };

        info!("{} - add endpoint group {}", project.name, name);
        let added = ctx
            .cloud
            .add_endpoint_group_to_project(group_id, &project.id)
            .await;
        if tolerate_conflict(added)?.is_none() {
            debug!("{} - endpoint group {} already added", project.name, name);
        }
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

    // Test: only missing groups are attached and unknown names are skipped
    #[tokio::test]
    async fn test_attach_missing_groups() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        let keystone_public = fake.add_endpoint_group("keystone-public");
        let keystone_internal = fake.add_endpoint_group("keystone-internal");
        let nova_public = fake.add_endpoint_group("nova-public");
        fake.add_endpoint_group("heat-public");
        fake.state()
            .project_endpoint_groups
            .insert(project.id.clone(), vec![keystone_public.id.clone()]);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();

        let attached = fake.state().project_endpoint_groups[&project.id].clone();
        assert!(attached.contains(&keystone_internal.id));
        assert!(attached.contains(&nova_public.id));
        assert_eq!(attached.len(), 4, "keystone-public, keystone-internal, nova-public, heat-public");

        fake.clear_mutations();
        reconcile(&ctx, &target).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_categories() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(
            &domain,
            "acme-web",
            json!({"endpoints": "orchestration, storage"}),
        );
        let heat = fake.add_endpoint_group("heat-internal");
        fake.add_endpoint_group("keystone-internal");
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();

        assert_eq!(
            fake.mutations(),
            vec![format!("add_endpoint_group_to_project {} {}", heat.id, project.id)]
        );
    }

    // Test: a group attached concurrently does not stop the remaining groups
    #[tokio::test]
    async fn test_conflict_on_attach_is_satisfied() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        fake.add_endpoint_group("keystone-public");
        fake.add_endpoint_group("nova-public");
        fake.fail("add_endpoint_group_to_project", 409);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();
    }
}
