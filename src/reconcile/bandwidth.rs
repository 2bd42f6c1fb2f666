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
use crate::client::QosPolicy;
use crate::context::Context;
use crate::types::bandwidth::{BandwidthLimits, Direction, POLICY_NAME, RateLimit};
use crate::types::quota_class::{QuotaClass, SYSTEM_PROJECTS};
use tracing::info;

/// Converges the `bw-limiter` QoS policy of a project with its class.
pub async fn reconcile(ctx: &Context, target: &Target<'_>, class: &QuotaClass) -> Result<(), Error> {
    let project = target.project;

    if target.in_default_domain() && SYSTEM_PROJECTS.contains(&project.name.as_str()) {
        info!("{} - skipping bandwidth limits", project.name);
        return Ok(());
    }

    let limits = BandwidthLimits::from_class(class.bandwidth.as_ref());
    let existing = ctx.cloud.list_qos_policies(POLICY_NAME, &project.id).await?;

    if limits.is_unlimited() {
        for policy in existing {
            info!("{} - removing QoS policy {}", project.name, policy.id);
            ctx.cloud.delete_qos_policy(&policy.id).await?;
        }
        return Ok(());
    }

    let (policy, fresh) = match existing.into_iter().next() {
        Some(policy) => (policy, false),
        None => {
            info!("{} - creating QoS policy {}", project.name, POLICY_NAME);
            let policy = ctx
                .cloud
                .create_qos_policy(POLICY_NAME, &project.id, true)
                .await?;
            (policy, true)
        }
    };

    for direction in Direction::ALL {
        reconcile_rule(ctx, target, &policy, fresh, direction, limits.get(direction)).await?;
    }

    Ok(())
}

async fn reconcile_rule(
    ctx: &Context,
    target: &Target<'_>,
    policy: &QosPolicy,
    fresh: bool,
    direction: Direction,
    limit: RateLimit,
) -> Result<(), Error> {
    let project = &target.project.name;

    // A policy created in this pass has no rules yet.
    let existing = if fresh {
        None
    } else {
        ctx.cloud
            .list_bandwidth_limit_rules(&policy.id, direction)
            .await?
            .into_iter()
            .next()
    };

    if limit.is_unlimited() {
        if let Some(rule) = existing {
            info!("{} - removing {} bandwidth limit", project, direction);
            ctx.cloud
                .delete_bandwidth_limit_rule(&policy.id, &rule.id)
                .await?;
        }
        return Ok(());
    }

    match existing {
        None => {
            info!(
                "{} - creating {} bandwidth limit {}/{}",
                project, direction, limit.max_kbps, limit.max_burst_kbps
            );
            ctx.cloud
                .create_bandwidth_limit_rule(&policy.id, direction, limit)
                .await?;
        }
        Some(rule) if rule.limit() != limit => {
            info!(
                "{} - updating {} bandwidth limit {}/{} -> {}/{}",
                project,
                direction,
                rule.max_kbps,
                rule.max_burst_kbps,
                limit.max_kbps,
                limit.max_burst_kbps
            );
            ctx.cloud
                .update_bandwidth_limit_rule(&policy.id, &rule.id, limit)
                .await?;
        }
        Some(_) => {}
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

    fn limited(fake: &FakeCloud, domain: &str) -> (crate::client::Domain, crate::client::Project) {
        let domain = fake.add_domain(domain);
        let project = fake.add_project(&domain, "acme-web", json!({"quotaclass": "limited"}));
        (domain, project)
    }

    // Test: all limits unlimited with a policy present is one delete and no rule calls
    #[tokio::test]
    async fn test_unlimited_deletes_policy() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({"quotaclass": "basic"}));
        let policy = fake.add_qos_policy(POLICY_NAME, &project.id);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();
        let class = target.class.clone().unwrap();

        reconcile(&ctx, &target, &class).await.unwrap();

        assert_eq!(
            fake.mutations(),
            vec![format!("delete_qos_policy {}", policy.id)]
        );
        assert!(fake.state().rule_reads.is_empty());
    }

    #[tokio::test]
    async fn test_unlimited_without_policy_does_nothing() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();
        let class = target.class.clone().unwrap();

        reconcile(&ctx, &target, &class).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    // Test: a freshly created policy gets its rules without listing them first
    #[tokio::test]
    async fn test_fresh_policy_skips_rule_listing() {
        let fake = FakeCloud::default();
        let (domain, project) = limited(&fake, "acme");
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();
        let class = target.class.clone().unwrap();

        reconcile(&ctx, &target, &class).await.unwrap();

        let mutations = fake.mutations();
        assert_eq!(mutations.len(), 2);
        assert!(mutations[0].starts_with("create_qos_policy bw-limiter"));
        assert!(mutations[1].ends_with("egress 1000/2000"));
        assert!(fake.state().rule_reads.is_empty());

        let policy = fake.state().qos_policies[0].clone();
        assert!(policy.is_default);
    }

    #[tokio::test]
    async fn test_rules_converge_per_direction() {
        let fake = FakeCloud::default();
        let (domain, project) = limited(&fake, "acme");
        let policy = fake.add_qos_policy(POLICY_NAME, &project.id);
        fake.add_bandwidth_rule(
            &policy.id,
            Direction::Egress,
            RateLimit {
                max_kbps: 500,
                max_burst_kbps: 2000,
            },
        );
        fake.add_bandwidth_rule(
            &policy.id,
            Direction::Ingress,
            RateLimit {
                max_kbps: 100,
                max_burst_kbps: 100,
            },
        );
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();
        let class = target.class.clone().unwrap();

        reconcile(&ctx, &target, &class).await.unwrap();

        let mutations = fake.mutations();
        assert_eq!(mutations.len(), 2);
        assert!(mutations[0].starts_with("update_bandwidth_limit_rule"));
        assert!(mutations[0].ends_with("1000/2000"));
        assert!(mutations[1].starts_with("delete_bandwidth_limit_rule"));

        fake.clear_mutations();
        reconcile(&ctx, &target, &class).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_system_projects_of_default_domain_are_skipped() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("default");
        let project = fake.add_project(&domain, "admin", json!({}));
        fake.add_qos_policy(POLICY_NAME, &project.id);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();
        let class = target.class.clone().unwrap();

        reconcile(&ctx, &target, &class).await.unwrap();
        assert!(fake.mutations().is_empty());
    }
}
