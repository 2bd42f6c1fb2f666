// Copyright 2024 RustFS Team
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

use clap::{Args, Parser, Subcommand};
use project_manager::config::{
    DEFAULT_ADMIN_DOMAIN, DEFAULT_CLASSES_PATH, DEFAULT_CLOUD, DEFAULT_ENDPOINTS_PATH, Options,
};
use project_manager::reconcile::Scope;
use project_manager::{bootstrap_endpoint_groups, init_tracing, manage, show_class};
use std::path::PathBuf;

shadow_rs::shadow!(build);

#[derive(Parser)]
#[command(name = "project-manager")]
#[command(version = build::PKG_VERSION, long_version = build::CLAP_LONG_VERSION)]
#[command(about = "Converges OpenStack projects with their quota classes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile quotas, networks, endpoints and access of projects
    Manage(ManageArgs),

    /// Print a resolved quota class as YAML
    ShowClass {
        name: String,

        #[arg(long, default_value = DEFAULT_CLASSES_PATH)]
        classes: PathBuf,
    },

    /// Create the endpoint group of every service and interface
    EndpointGroups {
        #[arg(long)]
        dry_run: bool,

        #[arg(long, env = "OS_CLOUD", default_value = DEFAULT_CLOUD)]
        cloud: String,
    },
}

#[derive(Args)]
struct ManageArgs {
    /// Log every decision without changing anything
    #[arg(long)]
    dry_run: bool,

    #[arg(long)]
    manage_endpoints: bool,

    #[arg(long)]
    manage_homeprojects: bool,

    #[arg(long = "nomanage-privatevolumetypes")]
    no_manage_private_volume_types: bool,

    #[arg(long = "nomanage-privateflavors")]
    no_manage_private_flavors: bool,

    /// Give `<domain>-admin` the member role on every project of its domain
    #[arg(long)]
    assign_admin_user: bool,

    #[arg(long, default_value = DEFAULT_ADMIN_DOMAIN)]
    admin_domain: String,

    #[arg(long, default_value = DEFAULT_CLASSES_PATH)]
    classes: PathBuf,

    #[arg(long, default_value = DEFAULT_ENDPOINTS_PATH)]
    endpoints: PathBuf,

    /// Named profile of clouds.yaml
    #[arg(long, env = "OS_CLOUD", default_value = DEFAULT_CLOUD)]
    cloud: String,

    #[arg(long)]
    domain: Option<String>,

    /// Project name or id
    #[arg(long)]
    name: Option<String>,
}

impl ManageArgs {
    fn into_parts(self) -> (Options, Scope) {
        let options = Options {
            dry_run: self.dry_run,
            manage_endpoints: self.manage_endpoints,
            manage_homeprojects: self.manage_homeprojects,
            manage_private_volume_types: !self.no_manage_private_volume_types,
            manage_private_flavors: !self.no_manage_private_flavors,
            assign_admin_user: self.assign_admin_user,
            admin_domain: self.admin_domain,
            classes: self.classes,
            endpoints: self.endpoints,
            cloud: self.cloud,
        };

        (options, Scope::new(self.name, self.domain))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Manage(args) => {
            let (options, scope) = args.into_parts();
            manage(options, scope).await?
        }
        Commands::ShowClass { name, classes } => print!("{}", show_class(&classes, &name)?),
        Commands::EndpointGroups { dry_run, cloud } => {
            print!("{}", bootstrap_endpoint_groups(&cloud, dry_run).await?)
        }
    }

    Ok(())
}
