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

//! REST client for an OpenStack cloud.
//!
//! Authenticates with Keystone v3 password credentials, keeps the issued token
//! and resolves service URLs from the token's catalog.

use super::clouds::{CloudProfile, CloudsFile};
use super::{
    AmbiguousSnafu, AuthSnafu, CatalogSnafu, Cloud, ConflictSnafu, DecodeSnafu, ProfileConnector,
    Result, StatusSnafu, TransportSnafu,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use snafu::{OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::time::Duration;
use strum::Display;
use tracing::debug;

mod block_storage;
mod compute;
mod identity;
mod image;
mod network;
mod quota;

const TOKEN_HEADER: &str = "X-Auth-Token";
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum ServiceType {
    Identity,
    Compute,
    Network,
    BlockStorage,
    Image,
}

impl ServiceType {
    /// Catalog types a service may be registered under, preferred first.
    fn catalog_types(self) -> &'static [&'static str] {
        match self {
            ServiceType::Identity => &["identity"],
            ServiceType::Compute => &["compute"],
            ServiceType::Network => &["network"],
            ServiceType::BlockStorage => &["block-storage", "volumev3", "volume"],
            ServiceType::Image => &["image"],
        }
    }

    /// API version path some services do not carry in their catalog URL.
    fn version_suffix(self) -> Option<&'static str> {
        match self {
            ServiceType::Identity => Some("/v3"),
            ServiceType::Network => Some("/v2.0"),
            ServiceType::Image => Some("/v2"),
            ServiceType::Compute | ServiceType::BlockStorage => None,
        }
    }
}

pub struct OpenStack {
    http: reqwest::Client,
    token: String,
    endpoints: BTreeMap<String, String>,
}

impl OpenStack {
    pub async fn connect(profile: &CloudProfile) -> Result<Self> {
        let auth_url = base_url(&profile.auth.auth_url, ServiceType::Identity);
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("project-manager/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!profile.verify)
            .build()
            .context(TransportSnafu {
                url: auth_url.clone(),
            })?;

        let url = format!("{auth_url}/auth/tokens");
        debug!("authenticating as {} against {}", profile.auth.username, url);

        let response = http
            .post(&url)
            .json(&auth_request(profile))
            .send()
            .await
            .context(TransportSnafu { url: url.clone() })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return AuthSnafu {
                auth_url,
                message: format!("{status}: {message}"),
            }
            .fail();
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .context(AuthSnafu {
                auth_url: auth_url.clone(),
                message: "response carries no token",
            })?;

        let body = response.text().await.context(TransportSnafu { url: url.clone() })?;
        let body: TokenResponse = serde_json::from_str(&body).context(DecodeSnafu { url })?;

        let mut endpoints = catalog_endpoints(
            &body.token.catalog,
            profile.interface(),
            profile.region_name.as_deref(),
        );
        // The token was issued by the configured URL; keep talking to it.
        endpoints.insert("identity".to_owned(), auth_url);

        Ok(Self {
            http,
            token,
            endpoints,
        })
    }

    fn endpoint(&self, service: ServiceType) -> Result<String> {
        let url = service
            .catalog_types()
            .iter()
            .find_map(|service_type| self.endpoints.get(*service_type))
            .context(CatalogSnafu {
                service_type: service.to_string(),
                interface: "configured",
            })?;

        Ok(base_url(url, service))
    }

    fn request(
        &self,
        method: Method,
        service: ServiceType,
        path: &str,
    ) -> Result<(RequestBuilder, String)> {
        let url = format!("{}{}", self.endpoint(service)?, path);
        let builder = self
            .http
            .request(method, &url)
            .header(TOKEN_HEADER, &self.token);
        Ok((builder, url))
    }

    async fn execute(&self, builder: RequestBuilder, method: &Method, url: &str) -> Result<String> {
        debug!("{} {}", method, url);

        let response = builder.send().await.context(TransportSnafu { url })?;
        let status = response.status();
        let body = response.text().await.context(TransportSnafu { url })?;

        if status == StatusCode::CONFLICT {
            return ConflictSnafu { message: body }.fail();
        }

        if !status.is_success() {
            return StatusSnafu {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                message: body,
            }
            .fail();
        }

        Ok(body)
    }

    async fn send_json(
        &self,
        method: Method,
        service: ServiceType,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let (mut builder, url) = self.request(method.clone(), service, path)?;
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let text = self.execute(builder, &method, &url).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).context(DecodeSnafu { url })
    }

    /// GETs `path` and decodes the member `key` of the response.
    pub(crate) async fn get_key<T: DeserializeOwned>(
        &self,
        service: ServiceType,
        path: &str,
        query: &[(&str, &str)],
        key: &str,
    ) -> Result<T> {
        let value = self
            .send_json(Method::GET, service, path, query, None)
            .await?;
        decode_key(value, key, path)
    }

    pub(crate) async fn post_key<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        service: ServiceType,
        path: &str,
        body: &B,
        key: &str,
    ) -> Result<T> {
        let body = serde_json::to_value(body).context(DecodeSnafu { url: path })?;
        let value = self
            .send_json(Method::POST, service, path, &[], Some(&body))
            .await?;
        decode_key(value, key, path)
    }

    pub(crate) async fn post(&self, service: ServiceType, path: &str, body: &Value) -> Result<()> {
        self.send_json(Method::POST, service, path, &[], Some(body))
            .await
            .map(drop)
    }

    pub(crate) async fn put(
        &self,
        service: ServiceType,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.send_json(Method::PUT, service, path, &[], body).await
    }

    pub(crate) async fn delete(&self, service: ServiceType, path: &str) -> Result<()> {
        self.send_json(Method::DELETE, service, path, &[], None)
            .await
            .map(drop)
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    token: Token,
}

#[derive(serde::Deserialize)]
struct Token {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(serde::Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(serde::Deserialize)]
struct CatalogEndpoint {
    interface: String,
    url: String,
    #[serde(default)]
    region_id: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

fn auth_request(profile: &CloudProfile) -> Value {
    let auth = &profile.auth;

    let user_domain = match (&auth.user_domain_id, &auth.user_domain_name) {
        (Some(id), _) => json!({ "id": id }),
        (None, Some(name)) => json!({ "name": name }),
        (None, None) => json!({ "id": "default" }),
    };

    let project_domain = match (&auth.project_domain_id, &auth.project_domain_name) {
        (Some(id), _) => json!({ "id": id }),
        (None, Some(name)) => json!({ "name": name }),
        (None, None) => user_domain.clone(),
    };

    let scope = match (&auth.project_id, &auth.project_name) {
        (Some(id), _) => json!({ "project": { "id": id } }),
        (None, Some(name)) => json!({ "project": { "name": name, "domain": project_domain } }),
        (None, None) => Value::Null,
    };

    let mut request = json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": auth.username,
                        "password": auth.password,
                        "domain": user_domain,
                    }
                }
            }
        }
    });

    if !scope.is_null() {
        request["auth"]["scope"] = scope;
    }
    request
}

fn catalog_endpoints(
    catalog: &[CatalogEntry],
    interface: &str,
    region: Option<&str>,
) -> BTreeMap<String, String> {
    catalog
        .iter()
        .filter_map(|entry| {
            entry
                .endpoints
                .iter()
                .filter(|endpoint| endpoint.interface == interface)
                .find(|endpoint| match region {
                    Some(region) => {
                        endpoint.region_id.as_deref() == Some(region)
                            || endpoint.region.as_deref() == Some(region)
                    }
                    None => true,
                })
                .map(|endpoint| (entry.service_type.clone(), endpoint.url.clone()))
        })
        .collect()
}

/// Normalizes a catalog URL: no trailing slash, version path appended once.
fn base_url(url: &str, service: ServiceType) -> String {
    let url = url.trim_end_matches('/');
    match service.version_suffix() {
        Some(suffix) if !url.ends_with(suffix) => format!("{url}{suffix}"),
        _ => url.to_owned(),
    }
}

fn decode_key<T: DeserializeOwned>(mut value: Value, key: &str, path: &str) -> Result<T> {
    let member = value.get_mut(key).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(member).context(DecodeSnafu { url: path })
}

/// Maps a not-found answer onto `None`.
pub(crate) fn found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// At most one match of a name lookup.
pub(crate) fn single<T>(kind: &str, name: &str, mut items: Vec<T>) -> Result<Option<T>> {
    if items.len() > 1 {
        return AmbiguousSnafu { kind, name }.fail();
    }
    Ok(items.pop())
}

/// Opens connections from the profiles of a `clouds.yaml`.
pub struct OpenStackConnector {
    clouds: CloudsFile,
}

impl OpenStackConnector {
    pub fn new(clouds: CloudsFile) -> Self {
        Self { clouds }
    }

    /// Connects with `profile` using its own project scope.
    pub async fn connect_default(&self, profile: &str) -> Result<OpenStack> {
        OpenStack::connect(self.clouds.profile(profile)?).await
    }
}

#[async_trait]
impl ProfileConnector for OpenStackConnector {
    async fn connect(&self, profile: &str, project_name: &str) -> Result<Box<dyn Cloud>> {
        let profile = self.clouds.profile(profile)?.scoped_to(project_name);
        let cloud = OpenStack::connect(&profile).await?;
        Ok(Box::new(cloud))
    }
}

impl std::fmt::Debug for OpenStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStack")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
