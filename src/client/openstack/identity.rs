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

use super::{OpenStack, ServiceType, found, single};
use crate::client::{
    Domain, EndpointGroup, IdentityApi, NewEndpointGroup, Project, Result, Role, Service, User,
};
use async_trait::async_trait;
use serde_json::json;

const ENDPOINT_FILTER: &str = "/OS-EP-FILTER";

#[async_trait]
impl IdentityApi for OpenStack {
    async fn list_domains(&self) -> Result<Vec<Domain>> {
        self.get_key(ServiceType::Identity, "/domains", &[], "domains")
            .await
    }

    async fn find_domain(&self, name_or_id: &str) -> Result<Option<Domain>> {
        let by_id = found(
            self.get_key(
                ServiceType::Identity,
                &format!("/domains/{name_or_id}"),
                &[],
                "domain",
            )
            .await,
        )?;
        if by_id.is_some() {
            return Ok(by_id);
        }

        let domains = self
            .get_key(
                ServiceType::Identity,
                "/domains",
                &[("name", name_or_id)],
                "domains",
            )
            .await?;
        single("domain", name_or_id, domains)
    }

    async fn list_projects(&self, domain_id: &str) -> Result<Vec<Project>> {
        self.get_key(
            ServiceType::Identity,
            "/projects",
            &[("domain_id", domain_id)],
            "projects",
        )
        .await
    }

    async fn find_project(
        &self,
        name_or_id: &str,
        domain_id: Option<&str>,
    ) -> Result<Option<Project>> {
        let by_id: Option<Project> = found(
            self.get_key(
                ServiceType::Identity,
                &format!("/projects/{name_or_id}"),
                &[],
                "project",
            )
            .await,
        )?;
        if let Some(project) = by_id
            && domain_id.is_none_or(|domain_id| project.domain_id == domain_id)
        {
            return Ok(Some(project));
        }

        let mut query = vec![("name", name_or_id)];
        if let Some(domain_id) = domain_id {
            query.push(("domain_id", domain_id));
        }
        let projects = self
            .get_key(ServiceType::Identity, "/projects", &query, "projects")
            .await?;
        single("project", name_or_id, projects)
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        self.get_key(ServiceType::Identity, "/roles", &[], "roles")
            .await
    }

    async fn find_user(&self, name: &str, domain_id: &str) -> Result<Option<User>> {
        let users = self
            .get_key(
                ServiceType::Identity,
                "/users",
                &[("name", name), ("domain_id", domain_id)],
                "users",
            )
            .await?;
        single("user", name, users)
    }

    async fn assign_project_role(
        &self,
        project_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<()> {
        self.put(
            ServiceType::Identity,
            &format!("/projects/{project_id}/users/{user_id}/roles/{role_id}"),
            None,
        )
        .await
        .map(drop)
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        self.get_key(ServiceType::Identity, "/services", &[], "services")
            .await
    }

    async fn list_endpoint_groups(&self) -> Result<Vec<EndpointGroup>> {
        self.get_key(
            ServiceType::Identity,
            &format!("{ENDPOINT_FILTER}/endpoint_groups"),
            &[],
            "endpoint_groups",
        )
        .await
    }

    async fn create_endpoint_group(&self, group: &NewEndpointGroup) -> Result<EndpointGroup> {
        self.post_key(
            ServiceType::Identity,
            &format!("{ENDPOINT_FILTER}/endpoint_groups"),
            &json!({ "endpoint_group": group }),
            "endpoint_group",
        )
        .await
    }

    async fn list_project_endpoint_groups(&self, project_id: &str) -> Result<Vec<EndpointGroup>> {
        self.get_key(
            ServiceType::Identity,
            &format!("{ENDPOINT_FILTER}/projects/{project_id}/endpoint_groups"),
            &[],
            "endpoint_groups",
        )
        .await
    }

    async fn add_endpoint_group_to_project(&self, group_id: &str, project_id: &str) -> Result<()> {
        self.put(
            ServiceType::Identity,
            &format!("{ENDPOINT_FILTER}/endpoint_groups/{group_id}/projects/{project_id}"),
            None,
        )
        .await
        .map(drop)
    }
}
