use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::{error::ApiError, AppState};

/// Forwards `/api/ollama/{path}` to `{upstream}/api/{path}` of the generation service.
pub struct GenerationProxy {
    client: reqwest::Client,
    upstream: String,
}

impl GenerationProxy {
    pub fn new(upstream: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream: upstream.trim_end_matches('/').to_owned(),
        }
    }

    pub fn target(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query {
            Some(query) => format!("{}/api/{path}?{query}", self.upstream),
            None => format!("{}/api/{path}", self.upstream),
        }
    }
}

/// Passes method, body and content type through and returns the upstream answer untouched.
pub async fn forward_generation(
    State(state): State<AppState>,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let proxy = &state.proxy;
    let target = proxy.target(&path, uri.query());
    debug!("Forwarding {method} to {target}");

    let mut request = proxy.client.request(method, &target).body(body);
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        request = request.header(CONTENT_TYPE, content_type.clone());
    }

    let upstream = request.send().await.map_err(|e| {
        error!("Generation service request to {target} failed {e:?}");
        ApiError::GenerationUnavailable
    })?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body = upstream.bytes().await.map_err(|e| {
        error!("Reading generation service response failed {e:?}");
        ApiError::GenerationUnavailable
    })?;

    let mut response = (status, body).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::GenerationProxy;

    #[test]
    fn target_maps_under_upstream_api() {
        let proxy = GenerationProxy::new("http://localhost:11434/");
        assert_eq!(
            proxy.target("generate", None),
            "http://localhost:11434/api/generate"
        );
        assert_eq!(
            proxy.target("/tags", Some("x=1")),
            "http://localhost:11434/api/tags?x=1"
        );
    }
}
