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

//! Read-only decorator: reads reach the wrapped cloud, writes are only logged.
//!
//! Write calls answer with placeholder objects carrying [`PLACEHOLDER_ID`], so
//! a pass that creates something and then uses it keeps going and logs every
//! decision it would take.

use super::{
    BandwidthLimitRule, BlockStorageApi, Cloud, ComputeApi, Domain, EndpointGroup, Flavor,
    IdentityApi, Image, ImageApi, ImageMember, Network, NetworkApi, NewEndpointGroup, NewNetwork,
    NewRbacPolicy, NewRouter, NewSubnet, NewVolume, ProfileConnector, Project, QosPolicy,
    QuotaApi, RbacPolicy, Result, Role, Router, Service, Subnet, User, Volume, VolumeType,
};
use crate::types::bandwidth::{Direction, RateLimit};
use crate::types::quota::{QuotaCategory, QuotaMap};
use async_trait::async_trait;
use tracing::info;

pub const PLACEHOLDER_ID: &str = "dry-run";

pub struct DryRun {
    inner: Box<dyn Cloud>,
}

impl DryRun {
    pub fn new(inner: Box<dyn Cloud>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl IdentityApi for DryRun {
    async fn list_domains(&self) -> Result<Vec<Domain>> {
        self.inner.list_domains().await
    }

    async fn find_domain(&self, name_or_id: &str) -> Result<Option<Domain>> {
        self.inner.find_domain(name_or_id).await
    }

    async fn list_projects(&self, domain_id: &str) -> Result<Vec<Project>> {
        self.inner.list_projects(domain_id).await
    }

    async fn find_project(
        &self,
        name_or_id: &str,
        domain_id: Option<&str>,
    ) -> Result<Option<Project>> {
        self.inner.find_project(name_or_id, domain_id).await
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        self.inner.list_roles().await
    }

    async fn find_user(&self, name: &str, domain_id: &str) -> Result<Option<User>> {
        self.inner.find_user(name, domain_id).await
    }

    async fn assign_project_role(
        &self,
        project_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<()> {
        info!(
            "dry-run: skip assigning role {} to user {} on project {}",
            role_id, user_id, project_id
        );
        Ok(())
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        self.inner.list_services().await
    }

    async fn list_endpoint_groups(&self) -> Result<Vec<EndpointGroup>> {
        self.inner.list_endpoint_groups().await
    }

    async fn create_endpoint_group(&self, group: &NewEndpointGroup) -> Result<EndpointGroup> {
        info!("dry-run: skip creating endpoint group {}", group.name);
        Ok(EndpointGroup {
            id: PLACEHOLDER_ID.to_owned(),
            name: group.name.clone(),
        })
    }

    async fn list_project_endpoint_groups(&self, project_id: &str) -> Result<Vec<EndpointGroup>> {
        self.inner.list_project_endpoint_groups(project_id).await
    }

    async fn add_endpoint_group_to_project(&self, group_id: &str, project_id: &str) -> Result<()> {
        info!(
            "dry-run: skip adding endpoint group {} to project {}",
            group_id, project_id
        );
        Ok(())
    }
}

#[async_trait]
impl QuotaApi for DryRun {
    async fn get_quotas(&self, category: QuotaCategory, project_id: &str) -> Result<QuotaMap> {
        self.inner.get_quotas(category, project_id).await
    }

    async fn set_quota(
        &self,
        category: QuotaCategory,
        project_id: &str,
        key: &str,
        value: i64,
    ) -> Result<()> {
        info!(
            "dry-run: skip setting {}[{}] = {} on project {}",
            category, key, value, project_id
        );
        Ok(())
    }
}

#[async_trait]
impl ComputeApi for DryRun {
    async fn list_flavors(&self) -> Result<Vec<Flavor>> {
        self.inner.list_flavors().await
    }

    async fn list_flavor_access(&self, flavor_id: &str) -> Result<Vec<String>> {
        self.inner.list_flavor_access(flavor_id).await
    }

    async fn add_flavor_access(&self, flavor_id: &str, project_id: &str) -> Result<()> {
        info!(
            "dry-run: skip granting flavor {} to project {}",
            flavor_id, project_id
        );
        Ok(())
    }
}

#[async_trait]
impl NetworkApi for DryRun {
    async fn find_network(&self, name: &str, project_id: Option<&str>) -> Result<Option<Network>> {
        self.inner.find_network(name, project_id).await
    }

    async fn create_network(&self, network: &NewNetwork) -> Result<Network> {
        info!("dry-run: skip creating network {}", network.name);
        Ok(Network {
            id: PLACEHOLDER_ID.to_owned(),
            name: network.name.clone(),
            project_id: network.project_id.clone(),
        })
    }

    async fn find_subnet(&self, name: &str, project_id: &str) -> Result<Option<Subnet>> {
        self.inner.find_subnet(name, project_id).await
    }

    async fn create_subnet(&self, subnet: &NewSubnet) -> Result<Subnet> {
        info!("dry-run: skip creating subnet {}", subnet.name);
        Ok(Subnet {
            id: PLACEHOLDER_ID.to_owned(),
            name: subnet.name.clone(),
            network_id: subnet.network_id.clone(),
            project_id: subnet.project_id.clone(),
        })
    }

    async fn find_router(&self, name: &str, project_id: &str) -> Result<Option<Router>> {
        self.inner.find_router(name, project_id).await
    }

    async fn create_router(&self, router: &NewRouter) -> Result<Router> {
        info!("dry-run: skip creating router {}", router.name);
        Ok(Router {
            id: PLACEHOLDER_ID.to_owned(),
            name: router.name.clone(),
            project_id: router.project_id.clone(),
        })
    }

    async fn add_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<()> {
        info!(
            "dry-run: skip attaching subnet {} to router {}",
            subnet_id, router_id
        );
        Ok(())
    }

    async fn list_rbac_policies(
        &self,
        target_tenant: &str,
        action: &str,
        network_id: &str,
    ) -> Result<Vec<RbacPolicy>> {
        self.inner
            .list_rbac_policies(target_tenant, action, network_id)
            .await
    }

    async fn create_rbac_policy(&self, policy: &NewRbacPolicy) -> Result<RbacPolicy> {
        info!(
            "dry-run: skip creating rbac policy {} on {} for {}",
            policy.action, policy.object_id, policy.target_tenant
        );
        Ok(RbacPolicy {
            id: PLACEHOLDER_ID.to_owned(),
            action: policy.action.clone(),
            object_type: policy.object_type.clone(),
            object_id: policy.object_id.clone(),
            target_tenant: policy.target_tenant.clone(),
        })
    }

    async fn delete_rbac_policy(&self, policy_id: &str) -> Result<()> {
        info!("dry-run: skip deleting rbac policy {}", policy_id);
        Ok(())
    }

    async fn list_qos_policies(&self, name: &str, project_id: &str) -> Result<Vec<QosPolicy>> {
        self.inner.list_qos_policies(name, project_id).await
    }

    async fn create_qos_policy(
        &self,
        name: &str,
        project_id: &str,
        is_default: bool,
    ) -> Result<QosPolicy> {
        info!(
            "dry-run: skip creating qos policy {} for project {}",
            name, project_id
        );
        Ok(QosPolicy {
            id: PLACEHOLDER_ID.to_owned(),
            name: name.to_owned(),
            project_id: project_id.to_owned(),
            is_default,
        })
    }

    async fn delete_qos_policy(&self, policy_id: &str) -> Result<()> {
        info!("dry-run: skip deleting qos policy {}", policy_id);
        Ok(())
    }

    async fn list_bandwidth_limit_rules(
        &self,
        policy_id: &str,
        direction: Direction,
    ) -> Result<Vec<BandwidthLimitRule>> {
        self.inner
            .list_bandwidth_limit_rules(policy_id, direction)
            .await
    }

    async fn create_bandwidth_limit_rule(
        &self,
        policy_id: &str,
        direction: Direction,
        limit: RateLimit,
    ) -> Result<BandwidthLimitRule> {
        info!(
            "dry-run: skip creating {} bandwidth limit rule on policy {}",
            direction, policy_id
        );
        Ok(BandwidthLimitRule {
            id: PLACEHOLDER_ID.to_owned(),
            max_kbps: limit.max_kbps,
            max_burst_kbps: limit.max_burst_kbps,
            direction,
        })
    }

    async fn update_bandwidth_limit_rule(
        &self,
        policy_id: &str,
        rule_id: &str,
        limit: RateLimit,
    ) -> Result<()> {
        info!(
            "dry-run: skip updating bandwidth limit rule {} on policy {} to {}/{}",
            rule_id, policy_id, limit.max_kbps, limit.max_burst_kbps
        );
        Ok(())
    }

    async fn delete_bandwidth_limit_rule(&self, policy_id: &str, rule_id: &str) -> Result<()> {
        info!(
            "dry-run: skip deleting bandwidth limit rule {} on policy {}",
            rule_id, policy_id
        );
        Ok(())
    }
}

#[async_trait]
impl BlockStorageApi for DryRun {
    async fn list_private_volume_types(&self, name: Option<&str>) -> Result<Vec<VolumeType>> {
        self.inner.list_private_volume_types(name).await
    }

    async fn list_volume_type_access(&self, type_id: &str) -> Result<Vec<String>> {
        self.inner.list_volume_type_access(type_id).await
    }

    async fn add_volume_type_access(&self, type_id: &str, project_id: &str) -> Result<()> {
        info!(
            "dry-run: skip granting volume type {} to project {}",
            type_id, project_id
        );
        Ok(())
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>> {
        self.inner.list_volumes().await
    }

    async fn find_volume(&self, name: &str) -> Result<Option<Volume>> {
        self.inner.find_volume(name).await
    }

    async fn create_volume(&self, volume: &NewVolume) -> Result<Volume> {
        info!(
            "dry-run: skip creating volume {} ({} GiB)",
            volume.name, volume.size
        );
        Ok(Volume {
            id: PLACEHOLDER_ID.to_owned(),
            name: Some(volume.name.clone()),
        })
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        info!("dry-run: skip deleting volume {}", volume_id);
        Ok(())
    }
}

#[async_trait]
impl ImageApi for DryRun {
    async fn list_shared_images(&self, owner: &str) -> Result<Vec<Image>> {
        self.inner.list_shared_images(owner).await
    }

    async fn find_image(&self, image_id: &str) -> Result<Option<Image>> {
        self.inner.find_image(image_id).await
    }

    async fn find_member(&self, image_id: &str, member_id: &str) -> Result<Option<ImageMember>> {
        self.inner.find_member(image_id, member_id).await
    }

    async fn add_member(&self, image_id: &str, member_id: &str) -> Result<ImageMember> {
        info!(
            "dry-run: skip sharing image {} with project {}",
            image_id, member_id
        );
        Ok(ImageMember {
            image_id: image_id.to_owned(),
            member_id: member_id.to_owned(),
            status: "pending".to_owned(),
        })
    }

    async fn update_member_status(
        &self,
        image_id: &str,
        member_id: &str,
        status: &str,
    ) -> Result<ImageMember> {
        info!(
            "dry-run: skip setting member {} of image {} to {}",
            member_id, image_id, status
        );
        Ok(ImageMember {
            image_id: image_id.to_owned(),
            member_id: member_id.to_owned(),
            status: status.to_owned(),
        })
    }
}

/// Wraps every connection a [`ProfileConnector`] opens in [`DryRun`].
pub struct DryRunConnector {
    inner: Box<dyn ProfileConnector>,
}

impl DryRunConnector {
    pub fn new(inner: Box<dyn ProfileConnector>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ProfileConnector for DryRunConnector {
    async fn connect(&self, profile: &str, project_name: &str) -> Result<Box<dyn Cloud>> {
        let cloud = self.inner.connect(profile, project_name).await?;
        Ok(Box::new(DryRun::new(cloud)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::tests::FakeCloud;

    // Test: writes are swallowed, reads still reach the wrapped cloud
    #[tokio::test]
    async fn test_writes_are_not_forwarded() {
        let fake = FakeCloud::default();
        let domain = fake.add_domain("acme");
        let project = fake.add_project(&domain, "acme-web", serde_json::json!({}));
        let cloud = DryRun::new(Box::new(fake.clone()));

        cloud
            .set_quota(QuotaCategory::Compute, &project.id, "cores", 8)
            .await
            .unwrap();
        let network = cloud
            .create_network(&NewNetwork {
                name: "net".into(),
                project_id: project.id.clone(),
                availability_zone_hints: vec![],
            })
            .await
            .unwrap();
        cloud.delete_rbac_policy("some-policy").await.unwrap();

        assert_eq!(network.id, PLACEHOLDER_ID);
        assert!(fake.mutations().is_empty(), "no call may reach the cloud");

        let projects = cloud.list_projects(&domain.id).await.unwrap();
        assert_eq!(projects.len(), 1);
    }

    #[tokio::test]
    async fn test_connector_wraps_connections() {
        let fake = FakeCloud::default();
        fake.add_profile("opm-acme-admin");
        let connector = DryRunConnector::new(Box::new(fake.clone()));

        let cloud = connector.connect("opm-acme-admin", "acme-images").await.unwrap();
        cloud
            .create_volume(&NewVolume {
                name: "cache-x".into(),
                size: 1,
                image_id: "x".into(),
            })
            .await
            .unwrap();

        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_connector_reports_missing_profile() {
        let fake = FakeCloud::default();
        let connector = DryRunConnector::new(Box::new(fake));

        let result = connector.connect("opm-acme-admin", "acme-images").await;
        assert!(matches!(
            result,
            Err(crate::client::Error::ProfileNotFound { .. })
        ));
    }
}
