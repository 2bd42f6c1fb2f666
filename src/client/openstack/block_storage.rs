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
use crate::client::{BlockStorageApi, NewVolume, Result, Volume, VolumeType};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct VolumeTypeAccess {
    project_id: String,
}

#[async_trait]
impl BlockStorageApi for OpenStack {
    async fn list_private_volume_types(&self, name: Option<&str>) -> Result<Vec<VolumeType>> {
        let types: Vec<VolumeType> = self
            .get_key(
                ServiceType::BlockStorage,
                "/types",
                &[("is_public", "false")],
                "volume_types",
            )
            .await?;

        Ok(types
            .into_iter()
            .filter(|volume_type| !volume_type.is_public)
            .filter(|volume_type| name.is_none_or(|name| volume_type.name == name))
            .collect())
    }

    async fn list_volume_type_access(&self, type_id: &str) -> Result<Vec<String>> {
        let access: Vec<VolumeTypeAccess> = self
            .get_key(
                ServiceType::BlockStorage,
                &format!("/types/{type_id}/os-volume-type-access"),
                &[],
                "volume_type_access",
            )
            .await?;
        Ok(access.into_iter().map(|access| access.project_id).collect())
    }

    async fn add_volume_type_access(&self, type_id: &str, project_id: &str) -> Result<()> {
        self.post(
            ServiceType::BlockStorage,
            &format!("/types/{type_id}/action"),
            &json!({ "addProjectAccess": { "project": project_id } }),
        )
        .await
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>> {
        self.get_key(ServiceType::BlockStorage, "/volumes", &[], "volumes")
            .await
    }

    async fn find_volume(&self, name: &str) -> Result<Option<Volume>> {
        let volumes = self
            .get_key(
                ServiceType::BlockStorage,
                "/volumes",
                &[("name", name)],
                "volumes",
            )
            .await?;
        single("volume", name, volumes)
    }

    async fn create_volume(&self, volume: &NewVolume) -> Result<Volume> {
        self.post_key(
            ServiceType::BlockStorage,
            "/volumes",
            &json!({ "volume": volume }),
            "volume",
        )
        .await
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        self.delete(ServiceType::BlockStorage, &format!("/volumes/{volume_id}"))
            .await
    }
}
