//! Docker Registry HTTP API v2 client
//!
//! Catalog, tag listing, manifest lookup (manifest list, image manifest and config
//! blob merged into one document) and deletion by digest. Credentials, when
//! configured, are sent with HTTP basic auth on every request.

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use reqwest::header::{HeaderMap, ACCEPT, WWW_AUTHENTICATE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub mod manifest;
pub mod naming;

pub use manifest::Manifest;
pub use naming::{image_mark, split_image_name, tag_sort_key, ImageMark};

/// Media types accepted when fetching manifests.
pub const MANIFEST_ACCEPT: &str = "application/vnd.oci.image.index.v1+json,\
application/vnd.docker.distribution.manifest.list.v2+json,\
application/vnd.docker.distribution.manifest.v2+json,\
application/vnd.oci.image.manifest.v1+json";

pub const DIGEST_HEADER: &str = "Docker-Content-Digest";

/// Supported `Www-Authenticate` schemes
pub const AUTH_PROVIDERS: &[&str] = &["basic"];

const REGISTRY_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    repositories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TagListResponse {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Authentication scheme announced by the registry, lower-cased.
pub fn auth_provider(headers: &HeaderMap) -> Option<String> {
    headers
        .get(WWW_AUTHENTICATE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_whitespace().next())
        .map(|scheme| scheme.to_lowercase())
}

// Helper function to map transport errors to RegistryError
fn map_http_error(error: reqwest::Error) -> RegistryError {
    if error.is_timeout() {
        RegistryError::Connection(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        RegistryError::Connection(format!("Connection error: {}", error))
    } else if let Some(status) = error.status() {
        RegistryError::RequestFailed {
            status: status.as_u16(),
            body: error.to_string(),
        }
    } else {
        RegistryError::Connection(format!("HTTP error: {}", error))
    }
}

async fn check_status(response: Response) -> Result<Response, RegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(match status {
        StatusCode::NOT_FOUND => RegistryError::NotFound(body),
        StatusCode::UNAUTHORIZED => RegistryError::Unauthorized(body),
        _ => RegistryError::RequestFailed {
            status: status.as_u16(),
            body,
        },
    })
}

fn digest_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(DIGEST_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn json_object(response: Response) -> Result<Map<String, Value>, RegistryError> {
    let value: Value = response
        .json()
        .await
        .map_err(|e| RegistryError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RegistryError::InvalidResponse(format!(
            "Expected a JSON object, got {}",
            other
        ))),
    }
}

/// Registry client
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(RegistryError::InvalidResponse(
                "Registry endpoint not set. Check configuration file.".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(REGISTRY_HTTP_CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RegistryError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        authenticated: bool,
    ) -> Result<Response, RegistryError> {
        let url = format!("{}{}", self.endpoint, uri);
        debug!(method = %method, url = %url, "Registry request");

        let mut request = self
            .client
            .request(method, &url)
            .header(ACCEPT, MANIFEST_ACCEPT);
        if authenticated {
            if let Some(credentials) = &self.credentials {
                request = request.basic_auth(&credentials.username, Some(&credentials.password));
            }
        }
        request.send().await.map_err(map_http_error)
    }

    /// Check the registry's auth scheme, then the configured credentials.
    pub async fn login(&self) -> Result<(), RegistryError> {
        let response = self.request(Method::GET, "/v2/", false).await?;
        let provider = auth_provider(response.headers());
        match provider.as_deref() {
            Some(scheme) if AUTH_PROVIDERS.contains(&scheme) => {}
            other => {
                return Err(RegistryError::UnsupportedAuth(
                    other.unwrap_or("None").to_string(),
                ))
            }
        }
        if self.credentials.is_none() {
            return Err(RegistryError::Unauthorized(
                "Username and password are required".to_string(),
            ));
        }

        let response = self.request(Method::GET, "/v2/", true).await?;
        check_status(response).await?;
        Ok(())
    }

    /// `GET /v2/` with credentials; true when the registry answers 200.
    pub async fn ping(&self) -> Result<bool, RegistryError> {
        let response = self.request(Method::GET, "/v2/", true).await?;
        Ok(response.status().is_success())
    }

    pub async fn repositories(&self) -> Result<Vec<String>, RegistryError> {
        let response = self.request(Method::GET, "/v2/_catalog", true).await?;
        let response = check_status(response).await?;
        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(format!("Failed to parse catalog: {}", e)))?;
        Ok(catalog.repositories.unwrap_or_default())
    }

    /// Tags of `image` in version order (`latest` last). None when the image is unknown.
    pub async fn tags(&self, image: &str) -> Result<Option<Vec<String>>, RegistryError> {
        let response = self
            .request(Method::GET, &format!("/v2/{}/tags/list", image), true)
            .await?;
        let response = match check_status(response).await {
            Ok(response) => response,
            Err(RegistryError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let list: TagListResponse = match response.json().await {
            Ok(list) => list,
            Err(e) => {
                warn!(image = %image, error = %e, "Malformed tag list");
                return Ok(None);
            }
        };
        let mut tags = list.tags.unwrap_or_default();
        tags.sort_by_cached_key(|tag| tag_sort_key(tag));
        Ok(Some(tags))
    }

    /// Manifest of `image:tag` merged with its config blob.
    ///
    /// For a multi-arch tag the platform manifest named by `digest` is used, or the
    /// first entry of the manifest list when no digest is given. None when the tag is
    /// unknown or the manifest carries no config.
    pub async fn manifest(
        &self,
        image: &str,
        tag: &str,
        digest: Option<&str>,
    ) -> Result<Option<Manifest>, RegistryError> {
        let mut document = Map::new();
        let mut reference = digest.unwrap_or(tag).to_string();

        let response = self
            .request(Method::GET, &format!("/v2/{}/manifests/{}", image, tag), true)
            .await?;
        match check_status(response).await {
            Ok(response) => {
                let list = json_object(response).await?;
                let manifests = list.get("manifests").cloned().unwrap_or(Value::Null);
                if digest.is_none() {
                    if let Some(first) = manifests
                        .as_array()
                        .and_then(|entries| entries.first())
                        .and_then(|entry| entry.get("digest"))
                        .and_then(Value::as_str)
                    {
                        reference = first.to_string();
                    }
                }
                document.insert("manifests".to_string(), manifests);
            }
            Err(RegistryError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let response = self
            .request(Method::GET, &format!("/v2/{}/manifests/{}", image, reference), true)
            .await?;
        let response = match check_status(response).await {
            Ok(response) => response,
            Err(RegistryError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let manifest_digest = digest_header(response.headers());
        document.extend(json_object(response).await?);
        match manifest_digest {
            Some(value) => {
                document.insert("digest".to_string(), Value::String(value));
            }
            None if reference.starts_with("sha256:") => {
                document.insert("digest".to_string(), Value::String(reference.clone()));
            }
            None => warn!(image = %image, tag = %tag, "Registry sent no manifest digest"),
        }

        let Some(config_digest) = document
            .get("config")
            .and_then(|config| config.get("digest"))
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            warn!(image = %image, tag = %tag, "Unknown manifest without config");
            return Ok(None);
        };

        let response = self
            .request(Method::GET, &format!("/v2/{}/blobs/{}", image, config_digest), true)
            .await?;
        let response = check_status(response).await?;
        let blob_digest = digest_header(response.headers());
        document.extend(json_object(response).await?);
        document.insert(
            "id".to_string(),
            blob_digest.map(Value::String).unwrap_or(Value::Null),
        );

        Ok(Some(Manifest::from_map(document)))
    }

    /// Delete `image:tag` by its manifest digest. False when the tag or its digest
    /// cannot be resolved.
    pub async fn delete(&self, image: &str, tag: &str) -> Result<bool, RegistryError> {
        let Some(manifest) = self.manifest(image, tag, None).await? else {
            return Ok(false);
        };
        let Some(digest) = manifest.digest() else {
            return Ok(false);
        };

        let response = self
            .request(Method::DELETE, &format!("/v2/{}/manifests/{}", image, digest), true)
            .await?;
        check_status(response).await?;
        debug!(image = %image, tag = %tag, digest = %digest, "Tag deleted");
        Ok(true)
    }
}
