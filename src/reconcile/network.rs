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
use crate::client::{NewRbacPolicy, Project};
use crate::context::Context;
use crate::error_policy::{tolerate_absent, tolerate_conflict};
use crate::types::network::{ACCESS_AS_EXTERNAL, RBAC_OBJECT_NETWORK};
use crate::types::project::ProjectSettings;
use crate::types::quota_class::QuotaClass;
use tracing::{debug, error, info};

/// Whether the public network should be visible to a project.
///
/// `show_public_network` forces visibility, an explicit `has_public_network`
/// wins next, and the class default decides otherwise.
pub fn public_network_visible(settings: &ProjectSettings, class: Option<&QuotaClass>) -> bool {
    if settings.show_public_network == Some(true) {
        return true;
    }
    if let Some(explicit) = settings.has_public_network {
        return explicit;
    }
    class.is_some_and(QuotaClass::public_network_by_default)
}

/// Converges the RBAC grant of `network_name` to `project`.
pub async fn ensure_grant(
    ctx: &Context,
    project: &Project,
    network_name: &str,
    action: &str,
    desired: bool,
) -> Result<(), Error> {
    let Some(network) = ctx.cloud.find_network(network_name, None).await? else {
        debug!("{} - network {} not found", project.name, network_name);
        return Ok(());
    };

    let grants = ctx
        .cloud
        .list_rbac_policies(&project.id, action, &network.id)
        .await?;

    if desired && grants.is_empty() {
        info!(
            "{} - grant {} on network {}",
            project.name, action, network_name
        );
        let policy = NewRbacPolicy {
            action: action.to_owned(),
            object_type: RBAC_OBJECT_NETWORK.to_owned(),
            object_id: network.id.clone(),
            target_tenant: project.id.clone(),
        };
        if tolerate_conflict(ctx.cloud.create_rbac_policy(&policy).await)?.is_none() {
            debug!("{} - grant on {} already exists", project.name, network_name);
        }
    } else if !desired && let Some(grant) = grants.first() {
        info!(
            "{} - revoke {} on network {}",
            project.name, action, network_name
        );
        if tolerate_absent(ctx.cloud.delete_rbac_policy(&grant.id).await)?.is_none() {
            debug!("{} - grant on {} already revoked", project.name, network_name);
        }
    }

    Ok(())
}

/// Converges the public and, outside the default domain, the service network
/// grants of a project.
///
/// A failed public grant is logged and does not skip the service grant.
pub async fn reconcile(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let settings = &target.settings;
    let project = target.project;

    let public_name = settings.public_network_name();
    let public = ensure_grant(
        ctx,
        project,
        public_name,
        ACCESS_AS_EXTERNAL,
        public_network_visible(settings, target.class.as_ref()),
    )
    .await;
    if let Err(err) = public {
        error!("{} - grant on network {} failed: {}", project.name, public_name, err);
    }

    if !target.in_default_domain() {
        let domain_name = target.domain.name.to_lowercase();
        ensure_grant(
            ctx,
            project,
            &settings.service_network_name(&domain_name),
            &settings.service_network_action(),
            settings.has_service_network(),
        )
        .await?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::tests::FakeCloud;
    use crate::types::network::ACCESS_AS_SHARED;
    use serde_json::json;
    use test_case::test_case;

    fn settings(attributes: serde_json::Value) -> ProjectSettings {
        ProjectSettings::from_attributes(&serde_json::from_value(attributes).unwrap()).unwrap()
    }

    fn class(public_network: Option<bool>) -> QuotaClass {
        QuotaClass {
            public_network: public_network.map(serde_yaml_ng::Value::Bool),
            ..Default::default()
        }
    }

    #[test_case(json!({}), None, false ; "nothing set")]
    #[test_case(json!({}), Some(true), true ; "class default")]
    #[test_case(json!({"has_public_network": "no"}), Some(true), false ; "explicit false wins")]
    #[test_case(json!({"has_public_network": "yes"}), Some(false), true ; "explicit true wins")]
    #[test_case(json!({"has_public_network": false, "show_public_network": "True"}), None, true ; "show forces")]
    fn test_public_network_visible(attributes: serde_json::Value, default: Option<bool>, expected: bool) {
        assert_eq!(
            public_network_visible(&settings(attributes), Some(&class(default))),
            expected
        );
    }

    // Test: grants are created once and revoked when no longer wanted
    #[tokio::test]
    async fn test_grant_and_revoke() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let public = fake.add_network("public", "admin-project");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        let ctx = fake.context(Options::default());

        ensure_grant(&ctx, &project, "public", ACCESS_AS_EXTERNAL, true)
            .await
            .unwrap();
        ensure_grant(&ctx, &project, "public", ACCESS_AS_EXTERNAL, true)
            .await
            .unwrap();
        assert_eq!(
            fake.mutations(),
            vec![format!(
                "create_rbac_policy access_as_external {} {}",
                public.id, project.id
            )]
        );

        fake.clear_mutations();
        ensure_grant(&ctx, &project, "public", ACCESS_AS_EXTERNAL, false)
            .await
            .unwrap();
        assert_eq!(fake.mutations().len(), 1);
        assert!(fake.state().rbac_policies.is_empty());
    }

    #[tokio::test]
    async fn test_missing_network_is_a_no_op() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        let ctx = fake.context(Options::default());

        ensure_grant(&ctx, &project, "public", ACCESS_AS_EXTERNAL, true)
            .await
            .unwrap();
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_conflict_on_create_is_satisfied() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        fake.add_network("public", "admin-project");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        fake.fail("create_rbac_policy", 409);
        let ctx = fake.context(Options::default());

        ensure_grant(&ctx, &project, "public", ACCESS_AS_EXTERNAL, true)
            .await
            .unwrap();
    }

    // Test: the service network is granted with its configured action
    #[tokio::test]
    async fn test_service_network_grant() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("Acme");
        let service = fake.add_network("acme-service", "service-project");
        let project = fake.add_project(
            &domain,
            "acme-web",
            json!({"has_service_network": "True", "quotaclass": "basic"}),
        );
        let stale = fake.add_rbac_policy(&project.id, ACCESS_AS_SHARED, "other-network");
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();

        let state = fake.state();
        assert_eq!(state.rbac_policies.len(), 2);
        assert!(state.rbac_policies.contains(&stale));
        let grant = &state.rbac_policies[1];
        assert_eq!(grant.action, ACCESS_AS_SHARED);
        assert_eq!(grant.object_id, service.id);
    }

    #[tokio::test]
    async fn test_no_service_grant_in_default_domain() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("default");
        fake.add_network("default-service", "service-project");
        let project = fake.add_project(&domain, "web", json!({"has_service_network": true}));
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    // Test: a grant revoked concurrently is already converged
    #[tokio::test]
    async fn test_revoke_of_vanished_grant_is_a_no_op() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let public = fake.add_network("public", "admin-project");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        fake.add_rbac_policy(&project.id, ACCESS_AS_EXTERNAL, &public.id);
        fake.fail("delete_rbac_policy", 404);
        let ctx = fake.context(Options::default());

        ensure_grant(&ctx, &project, "public", ACCESS_AS_EXTERNAL, false)
            .await
            .unwrap();
    }

    // Test: a failed public revoke still converges the service grant
    #[tokio::test]
    async fn test_grants_converge_independently() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let public = fake.add_network("public", "admin-project");
        let service = fake.add_network("acme-service", "service-project");
        let project = fake.add_project(
            &domain,
            "acme-web",
            json!({"has_public_network": "no", "has_service_network": "yes"}),
        );
        fake.add_rbac_policy(&project.id, ACCESS_AS_EXTERNAL, &public.id);
        fake.fail("delete_rbac_policy", 404);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();

        let state = fake.state();
        assert!(
            state
                .rbac_policies
                .iter()
                .any(|grant| grant.object_id == service.id && grant.target_tenant == project.id)
        );
    }

    #[tokio::test]
    async fn test_failed_public_grant_keeps_service_grant() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let public = fake.add_network("public", "admin-project");
        let service = fake.add_network("acme-service", "service-project");
        let project = fake.add_project(
            &domain,
            "acme-web",
            json!({"has_public_network": "no", "has_service_network": "yes"}),
        );
        fake.add_rbac_policy(&project.id, ACCESS_AS_EXTERNAL, &public.id);
        fake.fail("delete_rbac_policy", 500);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();

        let state = fake.state();
        assert!(state.rbac_policies.iter().any(|grant| grant.object_id == public.id));
        assert!(state.rbac_policies.iter().any(|grant| grant.object_id == service.id));
    }
}
