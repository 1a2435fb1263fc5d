//! The owner's HTTP surface.

use std::collections::BTreeMap;

use http::header::{CACHE_CONTROL, CONTENT_TYPE, VARY};
use http::{HeaderValue, Response, StatusCode};
use mosaic_core::{
    FragmentError, FragmentRequest, GatewayExport, GatewayIdentity, RenderMode,
    RENDER_MODE_QUERY, VERSION_QUERY,
};

use crate::fragment::Fragment;

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// A route on the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BffRoute<'a> {
    /// `GET /` - the gateway export.
    Export,
    /// `GET /healthcheck`
    Health,
    /// A fragment's render URL.
    Render(&'a str),
    /// `GET /{fragment}/placeholder`
    Placeholder(&'a str),
    /// `GET /{fragment}/static/{file}`
    Static(&'a str, &'a str),
    /// Anything else.
    NotFound,
}

/// A set of fragments served by one owner process.
#[derive(Debug)]
pub struct Bff {
    identity: GatewayIdentity,
    fragments: BTreeMap<String, Fragment>,
    export: GatewayExport,
}

impl Bff {
    /// Create an owner. Fragment names must be unique.
    pub fn new(identity: GatewayIdentity, fragments: Vec<Fragment>) -> Result<Self, FragmentError> {
        let mut by_name = BTreeMap::new();
        for fragment in fragments {
            let name = fragment.name().to_string();
            if by_name.insert(name.clone(), fragment).is_some() {
                return Err(FragmentError::InvalidManifest(format!(
                    "duplicate fragment name '{}'",
                    name
                )));
            }
        }

        let exposed = by_name
            .iter()
            .map(|(name, fragment)| Ok((name.clone(), fragment.expose()?)))
            .collect::<Result<BTreeMap<_, _>, FragmentError>>()?;
        let export = GatewayExport::new(&identity.name, &identity.url, exposed);

        tracing::info!(
            gateway = %identity.name,
            fragments = by_name.len(),
            hash = %export.hash,
            "gateway ready"
        );

        Ok(Self {
            identity,
            fragments: by_name,
            export,
        })
    }

    /// Gateway identity.
    pub fn identity(&self) -> &GatewayIdentity {
        &self.identity
    }

    /// The export document served at `/`.
    pub fn export(&self) -> &GatewayExport {
        &self.export
    }

    /// Look up a fragment by name.
    pub fn fragment(&self, name: &str) -> Option<&Fragment> {
        self.fragments.get(name)
    }

    /// Match a path to a route.
    pub fn route<'p>(&'p self, path: &'p str) -> BffRoute<'p> {
        match path {
            "/" | "" => return BffRoute::Export,
            "/healthcheck" => return BffRoute::Health,
            _ => {}
        }

        if let Some(fragment) = self
            .fragments
            .values()
            .find(|f| f.manifest().render.url == path)
        {
            return BffRoute::Render(fragment.name());
        }

        let segments: Vec<&str> = path.trim_start_matches('/').splitn(3, '/').collect();
        match segments.as_slice() {
            [name, "placeholder"] => BffRoute::Placeholder(name),
            [name, "static", file] if !file.is_empty() => BffRoute::Static(name, file),
            _ => BffRoute::NotFound,
        }
    }

    /// Handle an HTTP request.
    pub async fn handle<B>(&self, req: &http::Request<B>) -> Response<Vec<u8>> {
        self.handle_request(&FragmentRequest::from_http(req)).await
    }

    /// Handle a parsed request.
    #[tracing::instrument(skip_all, fields(path = %req.path, request_id = %req.request_id))]
    pub async fn handle_request(&self, req: &FragmentRequest) -> Response<Vec<u8>> {
        match self.route(&req.path) {
            BffRoute::Export => match serde_json::to_vec(&self.export) {
                Ok(body) => respond(StatusCode::OK, JSON, body),
                Err(err) => respond(StatusCode::INTERNAL_SERVER_ERROR, TEXT, err.to_string()),
            },
            BffRoute::Health => respond(StatusCode::OK, TEXT, "OK"),
            BffRoute::Render(name) => match self.fragments.get(name) {
                Some(fragment) => self.render(fragment, req).await,
                None => not_found(),
            },
            BffRoute::Placeholder(name) => match self.fragments.get(name) {
                Some(fragment) => respond(StatusCode::OK, HTML, fragment.placeholder(req)),
                None => not_found(),
            },
            BffRoute::Static(name, file) => match self.fragments.get(name) {
                Some(fragment) => serve_static(fragment, req, file),
                None => not_found(),
            },
            BffRoute::NotFound => not_found(),
        }
    }

    async fn render(&self, fragment: &Fragment, req: &FragmentRequest) -> Response<Vec<u8>> {
        let mode = match RenderMode::from_query(req.query_param(RENDER_MODE_QUERY)) {
            Ok(mode) => mode,
            Err(err) => return error_response(&err),
        };
        let version = req.query_param(VERSION_QUERY);

        let result = match mode {
            RenderMode::Stream => fragment
                .render(req, version)
                .await
                .and_then(|partials| {
                    serde_json::to_vec(&partials)
                        .map_err(|e| FragmentError::RenderFailed {
                            fragment: fragment.name().to_string(),
                            source: e.into(),
                        })
                })
                .map(|body| respond(StatusCode::OK, JSON, body)),
            RenderMode::Preview => fragment
                .render_preview(req, version)
                .await
                .map(|html| respond(StatusCode::OK, HTML, html)),
        };

        result.unwrap_or_else(|err| {
            tracing::error!(fragment = fragment.name(), mode = %mode, error = %err, "render failed");
            error_response(&err)
        })
    }
}

fn serve_static(fragment: &Fragment, req: &FragmentRequest, file: &str) -> Response<Vec<u8>> {
    match fragment.static_asset(req, file) {
        Ok(asset) => {
            let mut response = respond(StatusCode::OK, asset.kind.content_type(), asset.body.as_str());
            let headers = response.headers_mut();
            headers.insert(CACHE_CONTROL, HeaderValue::from_static(asset.cache_control()));
            if !asset.is_pinned_by_url() {
                headers.insert(VARY, HeaderValue::from_static("Cookie"));
            }
            response
        }
        Err(err @ FragmentError::VersionNotFound { .. }) => {
            respond(StatusCode::NOT_FOUND, TEXT, err.to_string())
        }
        Err(err) => error_response(&err),
    }
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Vec<u8>>) -> Response<Vec<u8>> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn error_response(err: &FragmentError) -> Response<Vec<u8>> {
    respond(err.status(), TEXT, err.to_string())
}

fn not_found() -> Response<Vec<u8>> {
    respond(StatusCode::NOT_FOUND, TEXT, "Not Found")
}
