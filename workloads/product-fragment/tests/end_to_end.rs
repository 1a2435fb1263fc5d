//! Owner and composer wired together in-process.

use std::sync::Arc;

use async_trait::async_trait;
use mosaic_sdk::prelude::*;
use pretty_assertions::assert_eq;
use product_fragment::handlers::{ProductContent, UserData};
use product_fragment::{bff, product_handler, PRODUCT};

/// Routes composer requests straight into an owner.
struct Loopback {
    bff: Bff,
}

#[async_trait(?Send)]
impl HttpClient for Loopback {
    async fn send(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = http::Request::builder().uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let req = builder
            .body(())
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let response = self.bff.handle(&req).await;
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        Ok(FetchResponse::new(response.status().as_u16(), headers, response.body().clone()))
    }
}

fn body(response: &http::Response<Vec<u8>>) -> String {
    String::from_utf8(response.body().clone()).unwrap()
}

/// An owner whose product fragment declares no assets.
fn bare_bff() -> Bff {
    let manifest = FragmentManifest::new(PRODUCT, "1.0.0", RenderConfig::new("/product"));
    let fragment = Fragment::builder(manifest)
        .version("1.0.0", Handler::new(ProductContent).with_data(UserData))
        .build()
        .unwrap();
    let identity = GatewayIdentity {
        name: "browsing".into(),
        url: "http://localhost:4446".into(),
    };
    Bff::new(identity, vec![fragment]).unwrap()
}

// === Owner Tests ===

#[tokio::test]
async fn test_preview_document() {
    let response = bare_bff().handle_request(&FragmentRequest::new("/product")).await;

    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(
        body(&response),
        "<html><head><title>Browsing - product</title></head><body><div>Rendered Fragment ACG</div></body></html>"
    );
}

#[tokio::test]
async fn test_stream_partials() {
    let req = FragmentRequest::new("/product").with_query(RENDER_MODE_QUERY, "stream");
    let response = bare_bff().handle_request(&req).await;

    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(body(&response), r#"{"main":"<div>Rendered Fragment ACG</div>"}"#);
}

#[tokio::test]
async fn test_static_asset_follows_version_cookie() {
    let bff = bff().unwrap();

    let pinned = FragmentRequest::new("/product/static/bundle.js").with_cookie("product-cookie", "1.0.1");
    let response = bff.handle_request(&pinned).await;
    assert_eq!(response.status(), http::StatusCode::OK);
    assert!(body(&response).contains("version1.0.1"));

    let default = bff.handle_request(&FragmentRequest::new("/product/static/bundle.js")).await;
    assert!(body(&default).contains("version1.0.0"));
}

#[tokio::test]
async fn test_placeholder_only_in_newer_version() {
    let bff = bff().unwrap();

    let default = bff.handle_request(&FragmentRequest::new("/product/placeholder")).await;
    assert_eq!(body(&default), "");

    let pinned = FragmentRequest::new("/product/placeholder").with_cookie("product-cookie", "1.0.1");
    assert_eq!(
        body(&bff.handle_request(&pinned).await),
        "<div class=\"product-skeleton\"></div>"
    );
}

// === Composer Tests ===

const STOREFRONT: &str = r#"
[[gateways]]
name = "browsing"
url = "http://localhost:4446"

[[pages]]
name = "product-detail"
url = "/product-detail"
fragments = [{ name = "product", gateway = "browsing" }]
"#;

async fn storefront() -> Storefront {
    storefront_over(bff().unwrap()).await
}

async fn storefront_over(bff: Bff) -> Storefront {
    let config = StorefrontConfig::from_toml(STOREFRONT).unwrap();
    let storefront = Storefront::from_config(&config, Arc::new(Loopback { bff })).unwrap();
    assert_eq!(storefront.refresh().await.unwrap(), 1);
    storefront
}

/// An owner whose versions ship differently named bundles.
fn renamed_bundle_bff() -> Bff {
    let bundle = |file: &str| {
        VersionManifest::default().with_asset(AssetDescriptor::external(
            "product-bundle",
            file,
            AssetLocation::BodyEnd,
            AssetType::Js,
        ))
    };
    let manifest = FragmentManifest::new(PRODUCT, "1.0.0", RenderConfig::new("/product"))
        .with_version("1.0.0", bundle("bundle.js"))
        .with_version("1.0.1", bundle("bundle.1.js"));
    let files = StaticFiles::new()
        .with_file("1.0.0", "bundle.js", "version1.0.0")
        .with_file("1.0.1", "bundle.1.js", "version1.0.1");
    let fragment = Fragment::builder(manifest)
        .assets(files)
        .version("1.0.0", product_handler("1.0.0"))
        .version("1.0.1", product_handler("1.0.1"))
        .build()
        .unwrap();
    let identity = GatewayIdentity {
        name: "browsing".into(),
        url: "http://localhost:4446".into(),
    };
    Bff::new(identity, vec![fragment]).unwrap()
}

#[tokio::test]
async fn test_composed_preview_page() {
    let storefront = storefront().await;
    let response = storefront
        .handle_request(&FragmentRequest::new("/product-detail"))
        .await;

    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(
        body(&response),
        concat!(
            "<html><head><title>Browsing - product-detail</title></head><body>",
            "<div>Rendered Fragment ACG</div>",
            r#"<script src="/product/static/bundle.js?__version=1.0.0" type="text/javascript"></script>"#,
            "</body></html>"
        )
    );
}

#[tokio::test]
async fn test_composed_page_follows_version_cookie() {
    let storefront = storefront().await;
    let req = FragmentRequest::new("/product-detail").with_cookie("product-cookie", "1.0.1");
    let html = body(&storefront.handle_request(&req).await);

    assert!(html.contains("/product/static/bundle.js?__version=1.0.1"));

    let asset = FragmentRequest::new("/product/static/bundle.js").with_query(VERSION_QUERY, "1.0.1");
    let response = storefront.handle_request(&asset).await;
    assert!(body(&response).contains("version1.0.1"));
}

#[tokio::test]
async fn test_unknown_version_cookie_serves_default_assets() {
    let storefront = storefront().await;
    let req = FragmentRequest::new("/product-detail").with_cookie("product-cookie", "9.9.9");
    let response = storefront.handle_request(&req).await;

    assert_eq!(response.status(), http::StatusCode::OK);
    let html = body(&response);
    assert!(html.contains("<div>Rendered Fragment ACG</div>"));
    assert!(html.contains("/product/static/bundle.js?__version=1.0.0"));
    assert!(!html.contains("9.9.9"));

    let asset = FragmentRequest::new("/product/static/bundle.js")
        .with_query(VERSION_QUERY, "1.0.0")
        .with_cookie("product-cookie", "9.9.9");
    let response = storefront.handle_request(&asset).await;
    assert_eq!(response.status(), http::StatusCode::OK);
    assert!(body(&response).contains("version1.0.0"));
}

#[tokio::test]
async fn test_pinned_version_uses_its_own_asset_files() {
    let storefront = storefront_over(renamed_bundle_bff()).await;
    let req = FragmentRequest::new("/product-detail").with_cookie("product-cookie", "1.0.1");
    let html = body(&storefront.handle_request(&req).await);

    assert!(html.contains(r#"src="/product/static/bundle.1.js?__version=1.0.1""#));

    let asset = FragmentRequest::new("/product/static/bundle.1.js").with_query(VERSION_QUERY, "1.0.1");
    let response = storefront.handle_request(&asset).await;
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(body(&response), "version1.0.1");

    let default = body(&storefront.handle_request(&FragmentRequest::new("/product-detail")).await);
    assert!(default.contains(r#"src="/product/static/bundle.js?__version=1.0.0""#));
}

#[tokio::test]
async fn test_composed_stream_page() {
    let storefront = storefront().await;
    let req = FragmentRequest::new("/product-detail").with_query(RENDER_MODE_QUERY, "stream");
    let response = storefront.handle_request(&req).await;

    let page: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(page["page"], "product-detail");
    assert_eq!(page["fragments"]["product"]["main"], "<div>Rendered Fragment ACG</div>");
    assert_eq!(
        page["assets"]["product"]["BODY_END"][0],
        r#"<script src="/product/static/bundle.js?__version=1.0.0" type="text/javascript"></script>"#
    );
}

#[tokio::test]
async fn test_export_drives_proxy_configuration() {
    let storefront = storefront().await;
    let proxy = storefront.fragment(PRODUCT).unwrap();
    let snapshot = proxy.snapshot().unwrap();

    assert_eq!(snapshot.config.version, "1.0.0");
    assert_eq!(snapshot.config.test_cookie, "product-cookie");
    assert!(snapshot.config.render.placeholder);
    assert_eq!(
        storefront.gateways()[0].hash().as_deref(),
        Some(bff().unwrap().export().hash.as_str())
    );
}
