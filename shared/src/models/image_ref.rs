//! Image Reference Model
//!
//! A stored image reference is one of:
//! - empty (no image)
//! - an absolute URL (`http://`, `https://`)
//! - a data URI (`data:image...`, legacy inline uploads)
//! - a storage-relative path under [`STORAGE_PREFIX`]
//!
//! References are stored as plain strings; the variant is recovered by
//! prefix sniffing so legacy documents keep deserializing. Turning a
//! reference into something renderable happens at read time through
//! [`resolve_asset_url`], never at write time.

use serde::{Deserialize, Serialize};

/// Path prefix for files written by the upload endpoint
pub const STORAGE_PREFIX: &str = "/uploads/";

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";
const DATA_IMAGE_PREFIX: &str = "data:image";

/// Kind of an image reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRefKind {
    Empty,
    Absolute,
    DataUri,
    Stored,
    Unrecognized,
}

impl ImageRefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageRefKind::Empty => "empty",
            ImageRefKind::Absolute => "absolute",
            ImageRefKind::DataUri => "data_uri",
            ImageRefKind::Stored => "stored",
            ImageRefKind::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for ImageRefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Image reference held by an image-bearing settings field
///
/// Serialized as a bare string (`""` when empty); `null` deserializes to
/// [`ImageRef::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ImageRef {
    #[default]
    Empty,
    Absolute(String),
    DataUri(String),
    /// Storage-relative path (starts with [`STORAGE_PREFIX`])
    Stored(String),
    /// Non-empty value matching no known shape; resolved like a relative path
    Unrecognized(String),
}

impl ImageRef {
    /// Classify a raw stored value
    ///
    /// Blank values (whitespace only) are `Empty` and serialize back as `""`.
    pub fn classify(raw: &str) -> Self {
        if raw.trim().is_empty() {
            ImageRef::Empty
        } else if raw.starts_with(HTTP_PREFIX) || raw.starts_with(HTTPS_PREFIX) {
            ImageRef::Absolute(raw.to_string())
        } else if raw.starts_with(DATA_IMAGE_PREFIX) {
            ImageRef::DataUri(raw.to_string())
        } else if raw.starts_with(STORAGE_PREFIX) {
            ImageRef::Stored(raw.to_string())
        } else {
            ImageRef::Unrecognized(raw.to_string())
        }
    }

    /// Reference to an uploaded file by name (`/uploads/<name>`)
    pub fn stored(filename: &str) -> Self {
        ImageRef::Stored(format!(
            "{}{}",
            STORAGE_PREFIX,
            filename.trim_start_matches('/')
        ))
    }

    pub fn kind(&self) -> ImageRefKind {
        match self {
            ImageRef::Empty => ImageRefKind::Empty,
            ImageRef::Absolute(_) => ImageRefKind::Absolute,
            ImageRef::DataUri(_) => ImageRefKind::DataUri,
            ImageRef::Stored(_) => ImageRefKind::Stored,
            ImageRef::Unrecognized(_) => ImageRefKind::Unrecognized,
        }
    }

    /// Raw stored value (`""` when empty)
    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Empty => "",
            ImageRef::Absolute(s)
            | ImageRef::DataUri(s)
            | ImageRef::Stored(s)
            | ImageRef::Unrecognized(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ImageRef::Empty)
    }

    /// Whether this value may be persisted in a settings document
    pub fn is_storable(&self) -> bool {
        !matches!(self, ImageRef::Unrecognized(_))
    }

    /// Renderable URL for this reference
    pub fn resolve(&self, api_base: &str) -> String {
        match self {
            ImageRef::Empty => String::new(),
            ImageRef::Absolute(s) | ImageRef::DataUri(s) => s.clone(),
            ImageRef::Stored(s) | ImageRef::Unrecognized(s) => join_base(api_base, s),
        }
    }
}

impl From<Option<String>> for ImageRef {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(ImageRef::classify).unwrap_or_default()
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        ImageRef::classify(value)
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        match value {
            ImageRef::Empty => String::new(),
            ImageRef::Absolute(s)
            | ImageRef::DataUri(s)
            | ImageRef::Stored(s)
            | ImageRef::Unrecognized(s) => s,
        }
    }
}

/// Resolve a stored image reference to a renderable URL
///
/// Empty or missing input yields `""`. Absolute URLs and data URIs pass
/// through unchanged; anything else is treated as a storage-relative path
/// and prefixed with `api_base`.
pub fn resolve_asset_url(reference: Option<&str>, api_base: &str) -> String {
    match reference {
        Some(raw) => ImageRef::classify(raw).resolve(api_base),
        None => String::new(),
    }
}

fn join_base(api_base: &str, path: &str) -> String {
    if api_base.ends_with('/') && path.starts_with('/') {
        format!("{}{}", api_base.trim_end_matches('/'), path)
    } else {
        format!("{}{}", api_base, path)
    }
}

/// Resolver bound to one API base, handed to consumers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetResolver {
    api_base: String,
}

impl AssetResolver {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn resolve(&self, image: &ImageRef) -> String {
        image.resolve(&self.api_base)
    }

    pub fn resolve_raw(&self, reference: Option<&str>) -> String {
        resolve_asset_url(reference, &self.api_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.example.com";

    #[test]
    fn test_resolve_table() {
        let cases: &[(Option<&str>, &str)] = &[
            (Some(""), ""),
            (None, ""),
            (
                Some("https://cdn.example.com/a.png"),
                "https://cdn.example.com/a.png",
            ),
            (Some("http://cdn.example.com/a.png"), "http://cdn.example.com/a.png"),
            (
                Some("data:image/png;base64,AAA"),
                "data:image/png;base64,AAA",
            ),
            (
                Some("/uploads/x.png"),
                "https://api.example.com/uploads/x.png",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(
                resolve_asset_url(*input, BASE),
                *expected,
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_resolve_is_stable() {
        let first = resolve_asset_url(Some("/uploads/x.png"), BASE);
        for _ in 0..3 {
            assert_eq!(resolve_asset_url(Some("/uploads/x.png"), BASE), first);
        }
    }

    #[test]
    fn test_resolve_trailing_slash_base() {
        assert_eq!(
            resolve_asset_url(Some("/uploads/x.png"), "https://api.example.com/"),
            "https://api.example.com/uploads/x.png"
        );
        // Relative input without a leading slash is concatenated as-is
        assert_eq!(
            resolve_asset_url(Some("uploads/x.png"), "https://api.example.com/"),
            "https://api.example.com/uploads/x.png"
        );
    }

    #[test]
    fn test_whitespace_is_empty() {
        assert_eq!(resolve_asset_url(Some("   "), BASE), "");
        assert!(ImageRef::classify(" \t").is_empty());

        // Blank is normalized to "" on the way back out, and stays there
        let json = serde_json::to_string(&ImageRef::classify("   ")).unwrap();
        assert_eq!(json, "\"\"");
        let reparsed: ImageRef = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, ImageRef::Empty);
    }

    #[test]
    fn test_classify() {
        assert_eq!(ImageRef::classify("").kind(), ImageRefKind::Empty);
        assert_eq!(
            ImageRef::classify("https://x/y.png").kind(),
            ImageRefKind::Absolute
        );
        assert_eq!(
            ImageRef::classify("data:image/jpeg;base64,/9j").kind(),
            ImageRefKind::DataUri
        );
        assert_eq!(
            ImageRef::classify("/uploads/a.jpg").kind(),
            ImageRefKind::Stored
        );
        assert_eq!(
            ImageRef::classify("ftp://x/y.png").kind(),
            ImageRefKind::Unrecognized
        );
        // data: without the image media type is not a data image
        assert_eq!(
            ImageRef::classify("data:text/plain,hi").kind(),
            ImageRefKind::Unrecognized
        );
    }

    #[test]
    fn test_stored_constructor() {
        assert_eq!(ImageRef::stored("a.png").as_str(), "/uploads/a.png");
        assert_eq!(ImageRef::stored("/a.png").as_str(), "/uploads/a.png");
        assert!(ImageRef::stored("a.png").is_storable());
        assert!(!ImageRef::classify("images/a.png").is_storable());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let logo = ImageRef::classify("/uploads/logo.png");
        assert_eq!(
            serde_json::to_string(&logo).unwrap(),
            "\"/uploads/logo.png\""
        );
        assert_eq!(serde_json::to_string(&ImageRef::Empty).unwrap(), "\"\"");

        let parsed: ImageRef = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, ImageRef::Empty);
        let parsed: ImageRef = serde_json::from_str("\"https://cdn/x.png\"").unwrap();
        assert_eq!(parsed, ImageRef::Absolute("https://cdn/x.png".into()));
    }

    #[test]
    fn test_asset_resolver() {
        let resolver = AssetResolver::new(BASE);
        assert_eq!(
            resolver.resolve(&ImageRef::stored("hero.jpg")),
            "https://api.example.com/uploads/hero.jpg"
        );
        assert_eq!(resolver.resolve_raw(None), "");
    }
}
