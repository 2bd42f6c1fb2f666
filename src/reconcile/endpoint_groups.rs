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

use super::Error;
use crate::client::{Cloud, EndpointGroup, EndpointGroupFilters, NewEndpointGroup};
use crate::types::endpoint::{Interface, endpoint_group_name};
use std::collections::BTreeMap;
use tracing::info;

/// Creates the `<service>-<interface>` endpoint group of every service and
/// returns all groups by name.
pub async fn bootstrap(cloud: &dyn Cloud) -> Result<BTreeMap<String, EndpointGroup>, Error> {
    let mut groups: BTreeMap<String, EndpointGroup> = cloud
        .list_endpoint_groups()
        .await?
        .into_iter()
        .map(|group| (group.name.clone(), group))
        .collect();

    for service in cloud.list_services().await? {
        for interface in Interface::BOOTSTRAP {
            let name = endpoint_group_name(&service.name, interface);
            if groups.contains_key(&name) {
                continue;
            }

            info!("create endpoint group {}", name);
            let group = cloud
                .create_endpoint_group(&NewEndpointGroup {
                    name: name.clone(),
                    filters: EndpointGroupFilters {
                        interface,
                        service_id: service.id.clone(),
                    },
                })
                .await?;
            groups.insert(name, group);
        }
    }

    Ok(groups)
}
