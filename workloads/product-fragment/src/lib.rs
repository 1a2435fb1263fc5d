//! Reference fragment owner for the Mosaic composition engine.
//!
//! Serves the `product` fragment in two versions. Both versions render the
//! same markup and ship a `bundle.js` carrying their version marker, so
//! clients pinned with the `product-cookie` cookie can be told apart by
//! their assets alone.

pub mod handlers;

#[cfg(target_arch = "wasm32")]
mod component;

use anyhow::{Context, Result};
use mosaic_sdk::prelude::*;

use handlers::{product_placeholder, ProductContent, UserData};

/// Gateway manifest shipped with the component.
pub const MANIFEST: &str = include_str!("../mosaic.toml");

/// Name of the product fragment.
pub const PRODUCT: &str = "product";

/// Parse the embedded gateway manifest.
pub fn manifest() -> Result<GatewayManifest> {
    GatewayManifest::from_toml(MANIFEST).context("embedded mosaic.toml is invalid")
}

/// Asset files of every product version.
pub fn product_files() -> StaticFiles {
    StaticFiles::new()
        .with_file("1.0.0", "bundle.js", include_str!("../static/1.0.0/bundle.js"))
        .with_file("1.0.1", "bundle.js", include_str!("../static/1.0.1/bundle.js"))
}

/// The product handler set. Only `1.0.1` offers a placeholder.
pub fn product_handler(version: &str) -> Handler {
    let handler = Handler::new(ProductContent).with_data(UserData);
    match version {
        "1.0.1" => handler.with_placeholder(product_placeholder),
        _ => handler,
    }
}

/// Build the product fragment from its manifest.
pub fn product(manifest: FragmentManifest) -> Result<Fragment, FragmentError> {
    let mut builder = Fragment::builder(manifest.clone()).assets(product_files());
    for version in manifest.versions.keys() {
        builder = builder.version(version, product_handler(version));
    }
    builder.build()
}

/// Build the owner serving every fragment in the embedded manifest.
pub fn bff() -> Result<Bff> {
    let manifest = manifest()?;
    let product_manifest = manifest
        .fragment(PRODUCT)
        .cloned()
        .context("embedded mosaic.toml has no product fragment")?;

    let bff = Bff::new(manifest.gateway.clone(), vec![product(product_manifest)?])?;
    Ok(bff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_manifest() {
        let manifest = manifest().unwrap();
        let product = manifest.fragment(PRODUCT).unwrap();
        assert_eq!(product.version, "1.0.0");
        assert_eq!(product.test_cookie, "product-cookie");
        assert_eq!(product.versions.len(), 2);
    }

    #[test]
    fn test_every_declared_asset_has_a_file() {
        let manifest = manifest().unwrap();
        let files = product_files();
        for (version, declared) in &manifest.fragment(PRODUCT).unwrap().versions {
            for asset in &declared.assets {
                let body = files.read(version, &asset.file_name).unwrap();
                assert!(body.contains(&format!("version{}", version)));
            }
        }
    }

    #[test]
    fn test_bff_builds() {
        let bff = bff().unwrap();
        assert!(bff.fragment(PRODUCT).is_some());
        assert!(bff.export().verify());
    }
}
