//! Version selection from overrides, cookies and defaults.

use std::collections::BTreeMap;

use crate::context::Cookies;
use crate::error::FragmentError;
use crate::manifest::FragmentManifest;

/// What decided the selected version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// An explicit override from the caller.
    Override,
    /// The fragment's test cookie.
    Cookie,
    /// The configured default.
    Default,
}

/// A version picked by the selector.
#[derive(Debug)]
pub struct ResolvedVersion<'v, V> {
    /// Version id.
    pub id: &'v str,
    /// The version itself.
    pub version: &'v V,
    /// Why this version was picked.
    pub source: VersionSource,
}

/// Picks the version of a fragment to render for a request.
///
/// Resolution is a map lookup and is recomputed per request, since the
/// version cookie varies between requests.
#[derive(Debug, Clone, Copy)]
pub struct VersionSelector<'a> {
    fragment: &'a str,
    default_version: &'a str,
    test_cookie: &'a str,
}

impl<'a> VersionSelector<'a> {
    /// Create a selector.
    pub fn new(fragment: &'a str, default_version: &'a str, test_cookie: &'a str) -> Self {
        Self {
            fragment,
            default_version,
            test_cookie,
        }
    }

    /// Create a selector from a fragment manifest.
    pub fn for_manifest(manifest: &'a FragmentManifest) -> Self {
        Self::new(&manifest.name, &manifest.version, &manifest.test_cookie)
    }

    /// Resolve the version to use.
    ///
    /// An override must exist. A cookie naming an unknown version is ignored.
    /// A missing default is a configuration error.
    pub fn resolve<'v, V>(
        &self,
        versions: &'v BTreeMap<String, V>,
        cookies: &Cookies,
        requested: Option<&str>,
    ) -> Result<ResolvedVersion<'v, V>, FragmentError> {
        if let Some(requested) = requested {
            return self.lookup(versions, requested, VersionSource::Override);
        }

        if let Some(pinned) = cookies.get(self.test_cookie) {
            if let Some((id, version)) = versions.get_key_value(pinned.as_str()) {
                return Ok(ResolvedVersion {
                    id: id.as_str(),
                    version,
                    source: VersionSource::Cookie,
                });
            }
            tracing::debug!(
                fragment = self.fragment,
                cookie = self.test_cookie,
                version = %pinned,
                "version cookie names an unknown version, using default"
            );
        }

        self.lookup(versions, self.default_version, VersionSource::Default)
    }

    fn lookup<'v, V>(
        &self,
        versions: &'v BTreeMap<String, V>,
        id: &str,
        source: VersionSource,
    ) -> Result<ResolvedVersion<'v, V>, FragmentError> {
        let (id, version) = versions
            .get_key_value(id)
            .ok_or_else(|| FragmentError::version_not_found(self.fragment, id))?;

        Ok(ResolvedVersion {
            id: id.as_str(),
            version,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions() -> BTreeMap<String, &'static str> {
        let mut v = BTreeMap::new();
        v.insert("1.0.0".to_string(), "v1");
        v.insert("1.0.1".to_string(), "v2");
        v
    }

    fn cookies(pairs: &[(&str, &str)]) -> Cookies {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const SELECTOR: VersionSelector<'static> = VersionSelector {
        fragment: "product",
        default_version: "1.0.0",
        test_cookie: "product-cookie",
    };

    #[test]
    fn test_default_version() {
        let versions = versions();
        let resolved = SELECTOR.resolve(&versions, &Cookies::new(), None).unwrap();
        assert_eq!(resolved.id, "1.0.0");
        assert_eq!(resolved.source, VersionSource::Default);
    }

    #[test]
    fn test_cookie_overrides_default() {
        let versions = versions();
        let jar = cookies(&[("product-cookie", "1.0.1")]);

        let first = SELECTOR.resolve(&versions, &jar, None).unwrap();
        let second = SELECTOR.resolve(&versions, &jar, None).unwrap();

        assert_eq!(first.id, "1.0.1");
        assert_eq!(*first.version, "v2");
        assert_eq!(first.source, VersionSource::Cookie);
        assert_eq!(second.id, first.id);
    }

    #[test]
    fn test_unknown_cookie_falls_back_to_default() {
        let versions = versions();
        let jar = cookies(&[("product-cookie", "0.0.1")]);
        let resolved = SELECTOR.resolve(&versions, &jar, None).unwrap();
        assert_eq!(resolved.id, "1.0.0");
    }

    #[test]
    fn test_override_wins_over_cookie() {
        let versions = versions();
        let jar = cookies(&[("product-cookie", "1.0.1")]);
        let resolved = SELECTOR.resolve(&versions, &jar, Some("1.0.0")).unwrap();
        assert_eq!(resolved.id, "1.0.0");
        assert_eq!(resolved.source, VersionSource::Override);
    }

    #[test]
    fn test_unknown_override_fails() {
        let versions = versions();
        for missing in ["2.0.0", "", "1.0"] {
            let err = SELECTOR
                .resolve(&versions, &Cookies::new(), Some(missing))
                .unwrap_err();
            assert!(
                matches!(&err, FragmentError::VersionNotFound { version, .. } if version == missing)
            );
        }
    }

    #[test]
    fn test_missing_default_fails() {
        let versions = versions();
        let selector = VersionSelector::new("product", "9.0.0", "product-cookie");
        assert!(selector.resolve(&versions, &Cookies::new(), None).is_err());
    }
}
