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

use super::{OpenStack, ServiceType, single};
use crate::client::{
    BandwidthLimitRule, Network, NetworkApi, NewNetwork, NewRbacPolicy, NewRouter, NewSubnet,
    QosPolicy, RbacPolicy, Result, Router, Subnet,
};
use crate::types::bandwidth::{Direction, RateLimit};
use crate::types::network::RBAC_OBJECT_NETWORK;
use async_trait::async_trait;
use serde_json::json;

fn rule_path(policy_id: &str) -> String {
    format!("/qos/policies/{policy_id}/bandwidth_limit_rules")
}

#[async_trait]
impl NetworkApi for OpenStack {
    async fn find_network(&self, name: &str, project_id: Option<&str>) -> Result<Option<Network>> {
        let mut query = vec![("name", name)];
        if let Some(project_id) = project_id {
            query.push(("project_id", project_id));
        }
        let networks = self
            .get_key(ServiceType::Network, "/networks", &query, "networks")
            .await?;
        single("network", name, networks)
    }

    async fn create_network(&self, network: &NewNetwork) -> Result<Network> {
        self.post_key(
            ServiceType::Network,
            "/networks",
            &json!({ "network": network }),
            "network",
        )
        .await
    }

    async fn find_subnet(&self, name: &str, project_id: &str) -> Result<Option<Subnet>> {
        let subnets = self
            .get_key(
                ServiceType::Network,
                "/subnets",
                &[("name", name), ("project_id", project_id)],
                "subnets",
            )
            .await?;
        single("subnet", name, subnets)
    }

    async fn create_subnet(&self, subnet: &NewSubnet) -> Result<Subnet> {
        self.post_key(
            ServiceType::Network,
            "/subnets",
            &json!({ "subnet": subnet }),
            "subnet",
        )
        .await
    }

    async fn find_router(&self, name: &str, project_id: &str) -> Result<Option<Router>> {
        let routers = self
            .get_key(
                ServiceType::Network,
                "/routers",
                &[("name", name), ("project_id", project_id)],
                "routers",
            )
            .await?;
        single("router", name, routers)
    }

    async fn create_router(&self, router: &NewRouter) -> Result<Router> {
        let body = json!({
            "router": {
                "name": router.name,
                "project_id": router.project_id,
                "availability_zone_hints": router.availability_zone_hints,
                "external_gateway_info": {
                    "network_id": router.external_network_id,
                    "enable_snat": router.enable_snat,
                },
            }
        });
        self.post_key(ServiceType::Network, "/routers", &body, "router")
            .await
    }

    async fn add_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<()> {
        self.put(
            ServiceType::Network,
            &format!("/routers/{router_id}/add_router_interface"),
            Some(&json!({ "subnet_id": subnet_id })),
        )
        .await
        .map(drop)
    }

    async fn list_rbac_policies(
        &self,
        target_tenant: &str,
        action: &str,
        network_id: &str,
    ) -> Result<Vec<RbacPolicy>> {
        self.get_key(
            ServiceType::Network,
            "/rbac-policies",
            &[
                ("target_tenant", target_tenant),
                ("action", action),
                ("object_type", RBAC_OBJECT_NETWORK),
                ("object_id", network_id),
            ],
            "rbac_policies",
        )
        .await
    }

    async fn create_rbac_policy(&self, policy: &NewRbacPolicy) -> Result<RbacPolicy> {
        self.post_key(
            ServiceType::Network,
            "/rbac-policies",
            &json!({ "rbac_policy": policy }),
            "rbac_policy",
        )
        .await
    }

    async fn delete_rbac_policy(&self, policy_id: &str) -> Result<()> {
        self.delete(ServiceType::Network, &format!("/rbac-policies/{policy_id}"))
            .await
    }

    async fn list_qos_policies(&self, name: &str, project_id: &str) -> Result<Vec<QosPolicy>> {
        self.get_key(
            ServiceType::Network,
            "/qos/policies",
            &[("name", name), ("project_id", project_id)],
            "policies",
        )
        .await
    }

    async fn create_qos_policy(
        &self,
        name: &str,
        project_id: &str,
        is_default: bool,
    ) -> Result<QosPolicy> {
        self.post_key(
            ServiceType::Network,
            "/qos/policies",
            &json!({
                "policy": {
                    "name": name,
                    "project_id": project_id,
                    "is_default": is_default,
                }
            }),
            "policy",
        )
        .await
    }

    async fn delete_qos_policy(&self, policy_id: &str) -> Result<()> {
        self.delete(ServiceType::Network, &format!("/qos/policies/{policy_id}"))
            .await
    }

    async fn list_bandwidth_limit_rules(
        &self,
        policy_id: &str,
        direction: Direction,
    ) -> Result<Vec<BandwidthLimitRule>> {
        let direction = direction.to_string();
        self.get_key(
            ServiceType::Network,
            &rule_path(policy_id),
            &[("direction", direction.as_str())],
            "bandwidth_limit_rules",
        )
        .await
    }

    async fn create_bandwidth_limit_rule(
        &self,
        policy_id: &str,
        direction: Direction,
        limit: RateLimit,
    ) -> Result<BandwidthLimitRule> {
        self.post_key(
            ServiceType::Network,
            &rule_path(policy_id),
            &json!({
                "bandwidth_limit_rule": {
                    "max_kbps": limit.max_kbps,
                    "max_burst_kbps": limit.max_burst_kbps,
                    "direction": direction,
                }
            }),
            "bandwidth_limit_rule",
        )
        .await
    }

    async fn update_bandwidth_limit_rule(
        &self,
        policy_id: &str,
        rule_id: &str,
        limit: RateLimit,
    ) -> Result<()> {
        self.put(
            ServiceType::Network,
            &format!("{}/{rule_id}", rule_path(policy_id)),
            Some(&json!({
                "bandwidth_limit_rule": {
                    "max_kbps": limit.max_kbps,
                    "max_burst_kbps": limit.max_burst_kbps,
                }
            })),
        )
        .await
        .map(drop)
    }

    async fn delete_bandwidth_limit_rule(&self, policy_id: &str, rule_id: &str) -> Result<()> {
        self.delete(
            ServiceType::Network,
            &format!("{}/{rule_id}", rule_path(policy_id)),
        )
        .await
    }
}
