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

use crate::client::{Cloud, Domain, Project, Role, User};
use crate::context::Context;
use crate::types::project::{DEFAULT_DOMAIN, ProjectSettings};
use crate::types::quota_class::{QuotaClass, QuotaClassCatalog, SYSTEM_PROJECTS};
use crate::{client, context, types};
use snafu::{OptionExt, Snafu};
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{error, info, warn};

pub mod access;
pub mod bandwidth;
pub mod endpoint_groups;
pub mod endpoints;
pub mod images;
pub mod network;
pub mod permissions;
pub mod quota;
pub mod topology;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(transparent)]
    Context { source: context::Error },

    #[snafu(transparent)]
    Client { source: client::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },

    #[snafu(display("project {} does not exist", name))]
    ProjectNotFound { name: String },

    #[snafu(display("project {} in domain {} does not exist", name, domain))]
    ProjectNotFoundInDomain { name: String, domain: String },

    #[snafu(display("domain {} does not exist", name))]
    DomainNotFound { name: String },

    #[snafu(display("admin domain {} does not exist", name))]
    AdminDomainNotFound { name: String },
}

/// Which projects a run converges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Project { name: String },
    ProjectInDomain { name: String, domain: String },
    Domain { name: String },
    All,
}

impl Scope {
    pub fn new(name: Option<String>, domain: Option<String>) -> Self {
        match (name, domain) {
            (Some(name), None) => Scope::Project { name },
            (Some(name), Some(domain)) => Scope::ProjectInDomain { name, domain },
            (None, Some(name)) => Scope::Domain { name },
            (None, None) => Scope::All,
        }
    }
}

/// Lookups shared by every project of one run.
#[derive(Debug, Default)]
pub struct RunCache {
    roles: BTreeMap<String, Role>,
    admin_users: BTreeMap<String, Option<User>>,
    admin_domain: Option<Domain>,
}

impl RunCache {
    /// Reads roles and, when admin users are assigned, the admin domain.
    pub async fn load(ctx: &Context) -> Result<Self, Error> {
        let roles = ctx
            .cloud
            .list_roles()
            .await?
            .into_iter()
            .map(|role| (role.name.clone(), role))
            .collect();

        let admin_domain = if ctx.options.assign_admin_user {
            let domain = ctx
                .cloud
                .find_domain(&ctx.options.admin_domain)
                .await?
                .context(AdminDomainNotFoundSnafu {
                    name: &ctx.options.admin_domain,
                })?;
            Some(domain)
        } else {
            None
        };

        Ok(Self {
            roles,
            admin_users: BTreeMap::new(),
            admin_domain,
        })
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn admin_domain(&self) -> Option<&Domain> {
        self.admin_domain.as_ref()
    }

    /// Looks a user of the admin domain up once per run.
    pub async fn admin_user(&mut self, cloud: &dyn Cloud, name: &str) -> Result<Option<User>, Error> {
        if let Some(user) = self.admin_users.get(name) {
            return Ok(user.clone());
        }

        let Some(domain) = &self.admin_domain else {
            return Ok(None);
        };
        let user = cloud.find_user(name, &domain.id).await?;
        self.admin_users.insert(name.to_owned(), user.clone());
        Ok(user)
    }
}

/// A managed project with its parsed policy.
pub struct Target<'a> {
    pub project: &'a Project,
    pub domain: &'a Domain,
    pub settings: ProjectSettings,
    pub class_name: String,
    pub class: Option<QuotaClass>,
}

impl<'a> Target<'a> {
    pub fn new(ctx: &Context, project: &'a Project, domain: &'a Domain) -> Result<Self, Error> {
        let settings = ProjectSettings::from_attributes(&project.attributes)?;
        Ok(Self::with_settings(ctx, project, domain, settings))
    }

    fn with_settings(
        ctx: &Context,
        project: &'a Project,
        domain: &'a Domain,
        settings: ProjectSettings,
    ) -> Self {
        if settings.quota_class.is_none() && !SYSTEM_PROJECTS.contains(&project.name.as_str()) {
            warn!("{} - quotaclass not set --> use default", project.name);
        }

        let class_name = QuotaClassCatalog::class_name_for(
            &project.name,
            settings.quota_class.as_deref(),
            &domain.name,
        );

        let class = match ctx.resolve_class(&class_name) {
            Ok(Some(class)) => Some(class),
            Ok(None) => {
                error!(
                    "{} - quota class {} is not defined in {}",
                    project.name,
                    class_name,
                    ctx.options.classes.display()
                );
                None
            }
            Err(err) => {
                error!("{} - {}", project.name, err);
                None
            }
        };

        Self {
            project,
            domain,
            settings,
            class_name,
            class,
        }
    }

    pub fn name(&self) -> &str {
        &self.project.name
    }

    /// Compared by name, as the service network naming is.
    pub fn in_default_domain(&self) -> bool {
        self.domain.name.eq_ignore_ascii_case(DEFAULT_DOMAIN)
    }
}

/// Whether `project` is one of the system projects of the default domain.
pub fn is_system_project(project: &Project) -> bool {
    project.domain_id == DEFAULT_DOMAIN && SYSTEM_PROJECTS.contains(&project.name.as_str())
}

fn log_pass<E: Display>(project: &str, pass: &str, result: Result<(), E>) {
    if let Err(err) = result {
        error!("{} - {} failed: {}", project, pass, err);
    }
}

/// Converges every project in `scope`.
pub async fn run(ctx: &Context, scope: Scope) -> Result<(), Error> {
    let mut cache = RunCache::load(ctx).await?;

    match scope {
        Scope::Project { name } => {
            let project = ctx
                .cloud
                .find_project(&name, None)
                .await?
                .context(ProjectNotFoundSnafu { name: &name })?;

            if is_system_project(&project) {
                handle_unmanaged_project(ctx, &project).await;
                return Ok(());
            }

            let domain = ctx
                .cloud
                .find_domain(&project.domain_id)
                .await?
                .context(DomainNotFoundSnafu {
                    name: &project.domain_id,
                })?;
            info!("{} - domain_id = {}", domain.name, domain.id);

            process_project(ctx, &mut cache, &project, &domain).await;
        }
        Scope::ProjectInDomain { name, domain } => {
            let domain = ctx
                .cloud
                .find_domain(&domain)
                .await?
                .context(DomainNotFoundSnafu { name: &domain })?;

            let project = ctx
                .cloud
                .find_project(&name, Some(&domain.id))
                .await?
                .context(ProjectNotFoundInDomainSnafu {
                    name: &name,
                    domain: &domain.name,
                })?;

            if is_system_project(&project) {
                handle_unmanaged_project(ctx, &project).await;
                return Ok(());
            }

            info!("{} - domain_id = {}", domain.name, domain.id);
            process_project(ctx, &mut cache, &project, &domain).await;
        }
        Scope::Domain { name } => {
            let domain = ctx
                .cloud
                .find_domain(&name)
                .await?
                .context(DomainNotFoundSnafu { name: &name })?;

            process_domain(ctx, &mut cache, &domain).await?;
        }
        Scope::All => {
            info!("Processing all domains");
            for domain in ctx.cloud.list_domains().await? {
                log_pass(
                    &domain.name,
                    "domain",
                    process_domain(ctx, &mut cache, &domain).await,
                );
            }
        }
    }

    Ok(())
}

async fn process_domain(ctx: &Context, cache: &mut RunCache, domain: &Domain) -> Result<(), Error> {
    info!("{} - domain_id = {}", domain.name, domain.id);

    for project in ctx.cloud.list_projects(&domain.id).await? {
        if is_system_project(&project) {
            handle_unmanaged_project(ctx, &project).await;
        } else {
            process_project(ctx, cache, &project, domain).await;
        }
    }

    log_pass(
        &domain.name,
        "image cache",
        images::cache_images(ctx, domain).await,
    );
    Ok(())
}

/// Runs every pass for one project. A failing pass is logged and the next
/// pass still runs.
pub async fn process_project(ctx: &Context, cache: &mut RunCache, project: &Project, domain: &Domain) {
    info!(
        "{} - project_id = {}, domain_id = {}",
        project.name, project.id, project.domain_id
    );

    let settings = match ProjectSettings::from_attributes(&project.attributes) {
        Ok(settings) => settings,
        Err(err) => {
            error!("{} - skipping project: {}", project.name, err);
            return;
        }
    };

    if settings.unmanaged {
        warn!("{} - not managed --> skipping", project.name);
        return;
    }

    let target = Target::with_settings(ctx, project, domain, settings);
    let name = target.name();
    let options = &ctx.options;

    log_pass(name, "quota", quota::reconcile(ctx, &target).await);

    if options.manage_endpoints {
        log_pass(name, "endpoints", endpoints::reconcile(ctx, &target).await);
    }

    if options.manage_homeprojects {
        log_pass(
            name,
            "home project",
            permissions::reconcile_home_project(ctx, cache, &target).await,
        );
    }

    if options.assign_admin_user {
        log_pass(
            name,
            "admin user",
            permissions::assign_admin_user(ctx, cache, &target).await,
        );
    }

    log_pass(name, "network rbac", network::reconcile(ctx, &target).await);

    if target.settings.has_shared_images() {
        log_pass(name, "shared images", images::share_images(ctx, &target).await);
    }

    if topology::should_provision(&target) {
        log_pass(name, "network resources", topology::provision(ctx, &target).await);
    }

    log_pass(
        name,
        "volume types",
        access::reconcile_class_volume_types(ctx, &target).await,
    );

    if options.manage_private_volume_types {
        log_pass(
            name,
            "private volume types",
            access::reconcile_private_volume_types(ctx, &target).await,
        );
    }

    log_pass(
        name,
        "flavors",
        access::reconcile_class_flavors(ctx, &target).await,
    );

    if options.manage_private_flavors {
        log_pass(
            name,
            "private flavors",
            access::reconcile_private_flavors(ctx, &target).await,
        );
    }
}

/// System projects only get the public network grant (service) and quotas.
pub async fn handle_unmanaged_project(ctx: &Context, project: &Project) {
    let settings = match ProjectSettings::from_attributes(&project.attributes) {
        Ok(settings) => settings,
        Err(err) => {
            error!("{} - skipping project: {}", project.name, err);
            return;
        }
    };

    if project.name == "service" {
        log_pass(
            &project.name,
            "network rbac",
            network::ensure_grant(
                ctx,
                project,
                settings.public_network_name(),
                types::network::ACCESS_AS_EXTERNAL,
                true,
            )
            .await,
        );
    }

    let domain = Domain {
        id: project.domain_id.clone(),
        name: DEFAULT_DOMAIN.to_owned(),
    };
    let target = Target::with_settings(ctx, project, &domain, settings);
    log_pass(&project.name, "quota", quota::reconcile(ctx, &target).await);

    warn!(
        "project {} ({}) in the default domain is not managed",
        project.name, project.id
    );
}
