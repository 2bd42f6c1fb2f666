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

use super::{Error, Target, bandwidth};
use crate::context::Context;
use crate::types::project::{DEFAULT_DOMAIN, ProjectSettings};
use crate::types::quota::{self, QuotaCategory, QuotaMap, ROUTER_KEY};
use crate::types::quota_class::QuotaClass;
use tracing::{error, info, warn};

/// Order in which categories are converged. Bandwidth follows network.
const CATEGORIES: [QuotaCategory; 3] = [
    QuotaCategory::Network,
    QuotaCategory::Compute,
    QuotaCategory::Volume,
];

/// Desired quota values of one category.
///
/// Class values are scaled by the category multiplier unless the key is
/// exempt; `quota_<resource>` overrides replace the scaled value. The router
/// quota grows by one per external attachment the project is entitled to.
pub fn desired_quotas(
    class: &QuotaClass,
    settings: &ProjectSettings,
    domain_name: &str,
    category: QuotaCategory,
) -> QuotaMap {
    let multiplier = settings.multiplier(category);
    let mut desired = QuotaMap::new();

    for (key, value) in class.quotas(category) {
        if key == ROUTER_KEY {
            continue;
        }
        let factor = if quota::is_multiplier_exempt(key) {
            1
        } else {
            multiplier
        };
        desired.insert(key.clone(), value.saturating_mul(factor));
    }

    for (key, value) in &settings.quota_overrides {
        if QuotaCategory::of_key(key) == Some(category) {
            desired.insert(key.clone(), *value);
        }
    }

    if category == QuotaCategory::Network
        && let Some(router) = desired_router(class, settings, domain_name)
    {
        desired.insert(ROUTER_KEY.to_owned(), router);
    }

    desired
        .into_iter()
        .map(|(key, value)| (key, quota::clamp(value)))
        .collect()
}

fn desired_router(class: &QuotaClass, settings: &ProjectSettings, domain_name: &str) -> Option<i64> {
    if let Some(router) = settings.quota_router {
        return Some(router);
    }

    let base = *class.network.get(ROUTER_KEY)?;
    if base < 0 {
        return Some(quota::UNLIMITED);
    }

    let service_project = settings.is_service_project();
    let public = settings.has_public_network() && !service_project;
    let service = settings.has_service_network()
        && !domain_name.eq_ignore_ascii_case(DEFAULT_DOMAIN)
        && !service_project;

    Some(base + i64::from(public) + i64::from(service))
}

/// Converges compute, network and volume quotas plus the bandwidth policy.
pub async fn reconcile(ctx: &Context, target: &Target<'_>) -> Result<(), Error> {
    let project = target.project;
    let Some(class) = &target.class else {
        error!(
            "{} - quota class {} not found, skipping quotas",
            project.name, target.class_name
        );
        return Ok(());
    };

    info!("{} - quotaclass {}", project.name, target.class_name);

    for key in target.settings.quota_overrides.keys() {
        if QuotaCategory::of_key(key).is_none() {
            warn!("{} - ignoring override of unknown quota {}", project.name, key);
        }
    }

    for category in CATEGORIES {
        info!("{} - check {} quota", project.name, category);
        let desired = desired_quotas(class, &target.settings, &target.domain.name, category);
        let live = ctx.cloud.get_quotas(category, &project.id).await?;

        for (key, value) in &desired {
            let current = live.get(key);
            if current == Some(value) {
                continue;
            }

            info!(
                "{} - {}[{}] = {} != {}",
                project.name,
                category,
                key,
                value,
                current.map_or_else(|| "unset".to_owned(), i64::to_string)
            );
            if let Err(err) = ctx.cloud.set_quota(category, &project.id, key, *value).await {
                error!("{} - setting {}[{}] failed: {}", project.name, category, key, err);
            }
        }

        if category == QuotaCategory::Network
            && let Err(err) = bandwidth::reconcile(ctx, target, class).await
        {
            error!("{} - bandwidth failed: {}", project.name, err);
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
    use crate::types::quota_class::QuotaClassCatalog;
    use serde_json::json;
    use test_case::test_case;

    fn class(name: &str) -> QuotaClass {
        QuotaClassCatalog::from_yaml(crate::tests::CLASSES)
            .unwrap()
            .resolve(name)
            .unwrap()
            .unwrap()
    }

    fn settings(attributes: serde_json::Value) -> ProjectSettings {
        ProjectSettings::from_attributes(&serde_json::from_value(attributes).unwrap()).unwrap()
    }

    // Test: class {network: {router: 1}} with a public network gives 2 routers
    #[test]
    fn test_router_with_public_entitlement() {
        let desired = desired_quotas(
            &class("basic"),
            &settings(json!({"has_public_network": true})),
            "acme",
            QuotaCategory::Network,
        );
        assert_eq!(desired.get("router"), Some(&2));
    }

    #[test_case(json!({}), "acme", 1 ; "no entitlement")]
    #[test_case(json!({"has_public_network": true, "has_service_network": true}), "acme", 3 ; "both entitlements")]
    #[test_case(json!({"has_service_network": true}), "default", 1 ; "no service network in default domain")]
    #[test_case(json!({"has_public_network": true, "is_service_project": true}), "acme", 1 ; "service project")]
    #[test_case(json!({"has_public_network": true, "quota_router": 7}), "acme", 7 ; "explicit router")]
    fn test_router_entitlements(attributes: serde_json::Value, domain: &str, expected: i64) {
        let desired = desired_quotas(
            &class("basic"),
            &settings(attributes),
            domain,
            QuotaCategory::Network,
        );
        assert_eq!(desired.get("router"), Some(&expected));
    }

    #[test]
    fn test_unlimited_router_stays_unlimited() {
        let desired = desired_quotas(
            &class("admin"),
            &settings(json!({"has_public_network": true})),
            "default",
            QuotaCategory::Network,
        );
        assert_eq!(desired.get("router"), Some(&-1));
    }

    // Test: multipliers scale class values except the exempt keys
    #[test]
    fn test_multipliers_and_exempt_keys() {
        let settings = settings(json!({
            "quotamultiplier": "2",
            "quotamultiplier_storage": 3,
        }));
        let compute = desired_quotas(&class("basic"), &settings, "acme", QuotaCategory::Compute);
        assert_eq!(compute.get("cores"), Some(&8));
        assert_eq!(compute.get("ram"), Some(&8192));
        assert_eq!(compute.get("injected_file_content_bytes"), Some(&10240));

        let volume = desired_quotas(&class("basic"), &settings, "acme", QuotaCategory::Volume);
        assert_eq!(volume.get("gigabytes"), Some(&60));
        assert_eq!(volume.get("per_volume_gigabytes"), Some(&100));

        let network = desired_quotas(&class("basic"), &settings, "acme", QuotaCategory::Network);
        assert_eq!(network.get("port"), Some(&20));
        assert_eq!(network.get("router"), Some(&1), "router is never scaled");
    }

    #[test]
    fn test_overrides_are_verbatim_and_clamped() {
        let settings = settings(json!({
            "quotamultiplier": 4,
            "quota_cores": "3",
            "quota_volumes": -5,
            "quota_unknown": 9,
        }));
        let compute = desired_quotas(&class("basic"), &settings, "acme", QuotaCategory::Compute);
        assert_eq!(compute.get("cores"), Some(&3));
        assert!(!compute.contains_key("unknown"));

        let volume = desired_quotas(&class("basic"), &settings, "acme", QuotaCategory::Volume);
        assert_eq!(volume.get("volumes"), Some(&-1));
    }

    #[test]
    fn test_negative_values_clamp_to_unlimited() {
        let desired = desired_quotas(
            &class("admin"),
            &settings(json!({"quotamultiplier": 3})),
            "default",
            QuotaCategory::Compute,
        );
        assert_eq!(desired.get("cores"), Some(&-1));
    }

    // Test: only differing keys are written, one call per key
    #[tokio::test]
    async fn test_reconcile_updates_only_differences() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({"quotaclass": "basic"}));
        fake.set_quotas(
            QuotaCategory::Compute,
            &project.id,
            &[
                ("cores", 4),
                ("injected_file_content_bytes", 10240),
                ("instances", 2),
                ("ram", 2048),
                ("key_pairs", 100),
            ],
        );
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();

        let compute_writes: Vec<_> = fake
            .mutations()
            .into_iter()
            .filter(|m| m.starts_with("set_quota compute"))
            .collect();
        assert_eq!(
            compute_writes,
            vec![format!("set_quota compute {} ram=4096", project.id)]
        );
        assert_eq!(
            fake.quotas(QuotaCategory::Compute, &project.id).get("key_pairs"),
            Some(&100),
            "keys outside the class are left alone"
        );

        fake.clear_mutations();
        reconcile(&ctx, &target).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_without_class_is_skipped() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({"quotaclass": "gold"}));
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        assert!(target.class.is_none());
        reconcile(&ctx, &target).await.unwrap();
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_continues_with_other_keys() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", json!({}));
        fake.fail("set_quota", 403);
        let ctx = fake.context(Options::default());
        let target = Target::new(&ctx, &project, &domain).unwrap();

        reconcile(&ctx, &target).await.unwrap();
        assert!(fake.state().quotas.is_empty());
    }
}
