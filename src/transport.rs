//! Network Transport
//!
//! Request descriptors and the transport seam the task queue dispatches through.
//! A transport answers every accepted request with exactly one response; failures
//! below HTTP (connection refused, timeouts) come back as a 503 response rather than
//! as a missing completion.

use crate::registry::RegistryClient;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

/// Hook invoked once with the response of the request it was attached to.
pub type CompletionHook = Arc<dyn Fn(&TransportResponse) + Send + Sync>;

/// Response delivered by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Only 200 counts as success.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Description of one network request: target, verb, payload and completion hook.
#[derive(Clone)]
pub struct RequestDescriptor {
    pub target: String,
    pub verb: Method,
    pub payload: Option<Value>,
    pub on_complete: Option<CompletionHook>,
}

impl RequestDescriptor {
    pub fn new(target: impl Into<String>, verb: Method) -> Self {
        Self {
            target: target.into(),
            verb,
            payload: None,
            on_complete: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TransportResponse) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("target", &self.target)
            .field("verb", &self.verb)
            .field("payload", &self.payload)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Network transport seam
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request. Always yields a response.
    async fn send(&self, target: &str, verb: &Method, payload: Option<&Value>) -> TransportResponse;
}

/// Target path addressing one image tag, shaped like the web UI route.
pub fn tag_target(image: &str, tag: &str) -> String {
    format!("/_/{}/tags/{}", image, tag)
}

/// Split a tag target back into `(image, tag)`.
pub fn parse_tag_target(target: &str) -> Option<(&str, &str)> {
    let rest = target.strip_prefix("/_/")?;
    let (image, tag) = rest.rsplit_once("/tags/")?;
    if image.is_empty() || tag.is_empty() || tag.contains('/') {
        return None;
    }
    Some((image, tag))
}

/// Transport backed by the registry client.
///
/// Understands `DELETE /_/{image}/tags/{tag}` (tag deletion) and
/// `GET /_/{image}/tags/{tag}` (manifest lookup).
pub struct RegistryTransport {
    registry: RegistryClient,
    disable_delete: bool,
}

impl RegistryTransport {
    pub fn new(registry: RegistryClient, disable_delete: bool) -> Self {
        Self {
            registry,
            disable_delete,
        }
    }

    async fn delete_tag(&self, image: &str, tag: &str) -> TransportResponse {
        if self.disable_delete {
            return TransportResponse::new(405, "Method Not Allowed");
        }
        match self.registry.delete(image, tag).await {
            Ok(true) => TransportResponse::ok(format!("{}:{} successfully deleted", image, tag)),
            Ok(false) => TransportResponse::new(404, format!("{}:{} not found", image, tag)),
            Err(e) => {
                warn!(image = %image, tag = %tag, error = %e, "Tag deletion failed");
                TransportResponse::new(e.status_code(), e.to_string())
            }
        }
    }

    async fn get_manifest(&self, image: &str, tag: &str) -> TransportResponse {
        match self.registry.manifest(image, tag, None).await {
            Ok(Some(manifest)) => match serde_json::to_string(manifest.as_value()) {
                Ok(body) => TransportResponse::ok(body),
                Err(e) => TransportResponse::new(500, e.to_string()),
            },
            Ok(None) => TransportResponse::new(404, format!("{}:{} not found", image, tag)),
            Err(e) => TransportResponse::new(e.status_code(), e.to_string()),
        }
    }
}

#[async_trait]
impl Transport for RegistryTransport {
    async fn send(&self, target: &str, verb: &Method, _payload: Option<&Value>) -> TransportResponse {
        let Some((image, tag)) = parse_tag_target(target) else {
            return TransportResponse::new(404, format!("Unknown target: {}", target));
        };
        debug!(image = %image, tag = %tag, verb = %verb, "Registry transport request");
        match *verb {
            Method::DELETE => self.delete_tag(image, tag).await,
            Method::GET => self.get_manifest(image, tag).await,
            _ => TransportResponse::new(405, "Method Not Allowed"),
        }
    }
}
