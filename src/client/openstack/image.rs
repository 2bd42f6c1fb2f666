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

use super::{OpenStack, ServiceType, decode_key, found};
use crate::client::{DecodeSnafu, Image, ImageApi, ImageMember, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};
use snafu::ResultExt;

const IMAGE_API_PREFIX: &str = "/v2";

/// Path of the next page relative to the versioned image endpoint.
fn next_page(value: &Value) -> Option<String> {
    value
        .get("next")
        .and_then(Value::as_str)
        .map(|next| next.strip_prefix(IMAGE_API_PREFIX).unwrap_or(next).to_owned())
}

#[async_trait]
impl ImageApi for OpenStack {
    async fn list_shared_images(&self, owner: &str) -> Result<Vec<Image>> {
        let mut images = Vec::new();
        let mut page = self
            .send_json(
                Method::GET,
                ServiceType::Image,
                "/images",
                &[("owner", owner), ("visibility", "shared")],
                None,
            )
            .await?;

        loop {
            let next = next_page(&page);
            let batch: Vec<Image> = decode_key(page, "images", "/images")?;
            images.extend(batch);

            let Some(next) = next else {
                break;
            };
            page = self
                .send_json(Method::GET, ServiceType::Image, &next, &[], None)
                .await?;
        }

        Ok(images)
    }

    async fn find_image(&self, image_id: &str) -> Result<Option<Image>> {
        let path = format!("/images/{image_id}");
        found(
            self.send_json(Method::GET, ServiceType::Image, &path, &[], None)
                .await,
        )?
        .map(|value| serde_json::from_value(value).context(DecodeSnafu { url: &path }))
        .transpose()
    }

    async fn find_member(&self, image_id: &str, member_id: &str) -> Result<Option<ImageMember>> {
        let path = format!("/images/{image_id}/members/{member_id}");
        found(
            self.send_json(Method::GET, ServiceType::Image, &path, &[], None)
                .await,
        )?
        .map(|value| serde_json::from_value(value).context(DecodeSnafu { url: &path }))
        .transpose()
    }

    async fn add_member(&self, image_id: &str, member_id: &str) -> Result<ImageMember> {
        let path = format!("/images/{image_id}/members");
        let value = self
            .send_json(
                Method::POST,
                ServiceType::Image,
                &path,
                &[],
                Some(&json!({ "member": member_id })),
            )
            .await?;
        serde_json::from_value(value).context(DecodeSnafu { url: path })
    }

    async fn update_member_status(
        &self,
        image_id: &str,
        member_id: &str,
        status: &str,
    ) -> Result<ImageMember> {
        let path = format!("/images/{image_id}/members/{member_id}");
        let value = self
            .put(ServiceType::Image, &path, Some(&json!({ "status": status })))
            .await?;
        serde_json::from_value(value).context(DecodeSnafu { url: path })
    }
}
