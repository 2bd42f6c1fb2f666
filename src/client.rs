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

//! Remote service interfaces used by the reconcilers.
//!
//! Every backing service is an object-safe async trait so the reconcilers can
//! run against the REST client, the dry-run decorator or an in-memory fake.

use crate::types::bandwidth::{Direction, RateLimit};
use crate::types::endpoint::Interface;
use crate::types::project::Attributes;
use crate::types::quota::{QuotaCategory, QuotaMap};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::path::PathBuf;

pub mod clouds;
pub mod dry_run;
pub mod openstack;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{} '{}' not found", kind, name))]
    NotFound { kind: String, name: String },

    #[snafu(display("conflict: {}", message))]
    Conflict { message: String },

    #[snafu(display("{} matches more than one {}", name, kind))]
    Ambiguous { kind: String, name: String },

    #[snafu(display("{} {} returned {}: {}", method, url, status, message))]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[snafu(display("request to {} failed: {}", url, source))]
    Transport { url: String, source: reqwest::Error },

    #[snafu(display("decode response of {}: {}", url, source))]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[snafu(display("authentication against {} failed: {}", auth_url, message))]
    Auth { auth_url: String, message: String },

    #[snafu(display("service catalog has no {} endpoint for interface {}", service_type, interface))]
    Catalog {
        service_type: String,
        interface: String,
    },

    #[snafu(display("cloud profile '{}' not found", profile))]
    ProfileNotFound { profile: String },

    #[snafu(display("no clouds.yaml found"))]
    MissingCloudsFile,

    #[snafu(display("read {}: {}", path.display(), source))]
    ReadCloudsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("parse {}: {}", path.display(), source))]
    ParseCloudsFile {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
            || matches!(self, Error::Status { status: 404, .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
            || matches!(self, Error::Status { status: 409, .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Domain {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub domain_id: String,

    /// Everything else stored on the project, including the policy attributes.
    #[serde(flatten)]
    pub attributes: Attributes,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Role {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub domain_id: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub service_type: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EndpointGroupFilters {
    pub interface: Interface,
    pub service_id: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct EndpointGroup {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewEndpointGroup {
    pub name: String,
    pub filters: EndpointGroupFilters,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project_id: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewNetwork {
    pub name: String,
    pub project_id: String,
    pub availability_zone_hints: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub project_id: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewSubnet {
    pub name: String,
    pub network_id: String,
    pub project_id: String,
    pub ip_version: u8,
    pub enable_dhcp: bool,

    /// Explicit range; the default subnet pool is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_default_subnetpool: bool,
}

impl NewSubnet {
    pub fn new(name: &str, network_id: &str, project_id: &str, cidr: Option<String>) -> Self {
        Self {
            name: name.to_owned(),
            network_id: network_id.to_owned(),
            project_id: project_id.to_owned(),
            ip_version: 4,
            enable_dhcp: true,
            use_default_subnetpool: cidr.is_none(),
            cidr,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Router {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewRouter {
    pub name: String,
    pub project_id: String,
    pub external_network_id: String,
    pub enable_snat: bool,
    pub availability_zone_hints: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct RbacPolicy {
    pub id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub object_type: String,
    #[serde(default)]
    pub object_id: String,
    #[serde(default)]
    pub target_tenant: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewRbacPolicy {
    pub target_tenant: String,
    pub action: String,
    pub object_type: String,
    pub object_id: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct QosPolicy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct BandwidthLimitRule {
    pub id: String,
    pub max_kbps: i64,
    #[serde(default)]
    pub max_burst_kbps: i64,
    pub direction: Direction,
}

impl BandwidthLimitRule {
    pub fn limit(&self) -> RateLimit {
        RateLimit {
            max_kbps: self.max_kbps,
            max_burst_kbps: self.max_burst_kbps,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    #[serde(rename = "os-flavor-access:is_public", default = "public_by_default")]
    pub is_public: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct VolumeType {
    pub id: String,
    pub name: String,
    #[serde(default = "public_by_default")]
    pub is_public: bool,
}

fn public_by_default() -> bool {
    true
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewVolume {
    pub name: String,
    pub size: u64,
    #[serde(rename = "imageRef")]
    pub image_id: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub min_disk: u64,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct ImageMember {
    pub image_id: String,
    pub member_id: String,
    pub status: String,
}

#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn list_domains(&self) -> Result<Vec<Domain>>;

    /// Looks a domain up by id first, then by name.
    async fn find_domain(&self, name_or_id: &str) -> Result<Option<Domain>>;

    async fn list_projects(&self, domain_id: &str) -> Result<Vec<Project>>;

    /// Looks a project up by id first, then by name within `domain_id` if given.
    async fn find_project(&self, name_or_id: &str, domain_id: Option<&str>)
    -> Result<Option<Project>>;

    async fn list_roles(&self) -> Result<Vec<Role>>;

    async fn find_user(&self, name: &str, domain_id: &str) -> Result<Option<User>>;

    async fn assign_project_role(&self, project_id: &str, user_id: &str, role_id: &str)
    -> Result<()>;

    async fn list_services(&self) -> Result<Vec<Service>>;

    async fn list_endpoint_groups(&self) -> Result<Vec<EndpointGroup>>;

    async fn create_endpoint_group(&self, group: &NewEndpointGroup) -> Result<EndpointGroup>;

    async fn list_project_endpoint_groups(&self, project_id: &str) -> Result<Vec<EndpointGroup>>;

    async fn add_endpoint_group_to_project(&self, group_id: &str, project_id: &str) -> Result<()>;
}

#[async_trait]
pub trait QuotaApi: Send + Sync {
    async fn get_quotas(&self, category: QuotaCategory, project_id: &str) -> Result<QuotaMap>;

    async fn set_quota(
        &self,
        category: QuotaCategory,
        project_id: &str,
        key: &str,
        value: i64,
    ) -> Result<()>;
}

#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Public and private flavors.
    async fn list_flavors(&self) -> Result<Vec<Flavor>>;

    /// Ids of the projects granted access to a private flavor.
    async fn list_flavor_access(&self, flavor_id: &str) -> Result<Vec<String>>;

    async fn add_flavor_access(&self, flavor_id: &str, project_id: &str) -> Result<()>;
}

#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn find_network(&self, name: &str, project_id: Option<&str>) -> Result<Option<Network>>;

    async fn create_network(&self, network: &NewNetwork) -> Result<Network>;

    async fn find_subnet(&self, name: &str, project_id: &str) -> Result<Option<Subnet>>;

    async fn create_subnet(&self, subnet: &NewSubnet) -> Result<Subnet>;

    async fn find_router(&self, name: &str, project_id: &str) -> Result<Option<Router>>;

    async fn create_router(&self, router: &NewRouter) -> Result<Router>;

    async fn add_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<()>;

    async fn list_rbac_policies(
        &self,
        target_tenant: &str,
        action: &str,
        network_id: &str,
    ) -> Result<Vec<RbacPolicy>>;

    async fn create_rbac_policy(&self, policy: &NewRbacPolicy) -> Result<RbacPolicy>;

    async fn delete_rbac_policy(&self, policy_id: &str) -> Result<()>;

    async fn list_qos_policies(&self, name: &str, project_id: &str) -> Result<Vec<QosPolicy>>;

    async fn create_qos_policy(
        &self,
        name: &str,
        project_id: &str,
        is_default: bool,
    ) -> Result<QosPolicy>;

    async fn delete_qos_policy(&self, policy_id: &str) -> Result<()>;

    async fn list_bandwidth_limit_rules(
        &self,
        policy_id: &str,
        direction: Direction,
    ) -> Result<Vec<BandwidthLimitRule>>;

    async fn create_bandwidth_limit_rule(
        &self,
        policy_id: &str,
        direction: Direction,
        limit: RateLimit,
    ) -> Result<BandwidthLimitRule>;

    async fn update_bandwidth_limit_rule(
        &self,
        policy_id: &str,
        rule_id: &str,
        limit: RateLimit,
    ) -> Result<()>;

    async fn delete_bandwidth_limit_rule(&self, policy_id: &str, rule_id: &str) -> Result<()>;
}

#[async_trait]
pub trait BlockStorageApi: Send + Sync {
    /// Private volume types, optionally filtered by exact name.
    async fn list_private_volume_types(&self, name: Option<&str>) -> Result<Vec<VolumeType>>;

    /// Ids of the projects granted access to a private volume type.
    async fn list_volume_type_access(&self, type_id: &str) -> Result<Vec<String>>;

    async fn add_volume_type_access(&self, type_id: &str, project_id: &str) -> Result<()>;

    /// Volumes of the project the connection is scoped to.
    async fn list_volumes(&self) -> Result<Vec<Volume>>;

    async fn find_volume(&self, name: &str) -> Result<Option<Volume>>;

    async fn create_volume(&self, volume: &NewVolume) -> Result<Volume>;

    async fn delete_volume(&self, volume_id: &str) -> Result<()>;
}

#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Images with `shared` visibility owned by `owner`.
    async fn list_shared_images(&self, owner: &str) -> Result<Vec<Image>>;

    async fn find_image(&self, image_id: &str) -> Result<Option<Image>>;

    async fn find_member(&self, image_id: &str, member_id: &str) -> Result<Option<ImageMember>>;

    async fn add_member(&self, image_id: &str, member_id: &str) -> Result<ImageMember>;

    async fn update_member_status(
        &self,
        image_id: &str,
        member_id: &str,
        status: &str,
    ) -> Result<ImageMember>;
}

/// A connection to every service of one cloud.
pub trait Cloud: IdentityApi + QuotaApi + ComputeApi + NetworkApi + BlockStorageApi + ImageApi {}

impl<T> Cloud for T where
    T: IdentityApi + QuotaApi + ComputeApi + NetworkApi + BlockStorageApi + ImageApi
{
}

/// Opens connections from named profiles.
#[async_trait]
pub trait ProfileConnector: Send + Sync {
    /// Connects with `profile`, scoped to `project_name`.
    ///
    /// Fails with [`Error::ProfileNotFound`] when the profile is not configured.
    async fn connect(&self, profile: &str, project_name: &str) -> Result<Box<dyn Cloud>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    // Test: extra project fields land in the attribute map
    #[test]
    fn test_project_attributes_are_flattened() {
        let project: Project = serde_json::from_value(json!({
            "id": "p1",
            "name": "acme-web",
            "domain_id": "d1",
            "quotaclass": "huge",
            "has_public_network": true,
        }))
        .unwrap();

        assert_eq!(project.name, "acme-web");
        assert_eq!(project.attributes.get("quotaclass"), Some(&json!("huge")));
        assert_eq!(project.attributes.get("has_public_network"), Some(&json!(true)));
        assert!(!project.attributes.contains_key("id"));
    }

    #[test]
    fn test_error_classification() {
        let not_found = Error::Status {
            method: "GET".into(),
            url: "http://x".into(),
            status: 404,
            message: String::new(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_conflict());

        let conflict = Error::Conflict {
            message: "exists".into(),
        };
        assert!(conflict.is_conflict());
    }

    #[test]
    fn test_new_subnet_uses_default_pool_without_cidr() {
        let subnet = NewSubnet::new("s", "n", "p", None);
        let body = serde_json::to_value(&subnet).unwrap();
        assert_eq!(body["use_default_subnetpool"], json!(true));
        assert!(body.get("cidr").is_none());

        let subnet = NewSubnet::new("s", "n", "p", Some("10.0.0.0/24".into()));
        let body = serde_json::to_value(&subnet).unwrap();
        assert_eq!(body["cidr"], json!("10.0.0.0/24"));
        assert!(body.get("use_default_subnetpool").is_none());
    }

    #[test]
    fn test_flavor_visibility_defaults_to_public() {
        let flavor: Flavor = serde_json::from_value(json!({"id": "f", "name": "m1"})).unwrap();
        assert!(flavor.is_public);

        let flavor: Flavor = serde_json::from_value(
            json!({"id": "f", "name": "m1", "os-flavor-access:is_public": false}),
        )
        .unwrap();
        assert!(!flavor.is_public);
    }
}
