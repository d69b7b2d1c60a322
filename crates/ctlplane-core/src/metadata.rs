//! Entity kinds, API versioning, and the embedded `Metadata` block shared
//! by every declarative object.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six entity kinds the catalog model recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Catalog,
    Variant,
    Namespace,
    Resource,
    SkillSet,
    View,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Catalog => "Catalog",
            Kind::Variant => "Variant",
            Kind::Namespace => "Namespace",
            Kind::Resource => "Resource",
            Kind::SkillSet => "SkillSet",
            Kind::View => "View",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Catalog" => Ok(Kind::Catalog),
            "Variant" => Ok(Kind::Variant),
            "Namespace" => Ok(Kind::Namespace),
            "Resource" => Ok(Kind::Resource),
            "SkillSet" => Ok(Kind::SkillSet),
            "View" => Ok(Kind::View),
            other => Err(CoreError::InvalidInput(format!("unrecognized kind {other:?}"))),
        }
    }
}

/// API version, a semver string with an optional pre-release suffix
/// (e.g. `0.1.0-alpha.1`). `validateVersion` accepts any version whose
/// major component is in the supported-majors set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion(semver::Version);

const SUPPORTED_MAJORS: &[u64] = &[0];

impl ApiVersion {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let version = semver::Version::parse(raw)
            .map_err(|e| CoreError::InvalidVersion(format!("{raw}: {e}")))?;
        if !SUPPORTED_MAJORS.contains(&version.major) {
            return Err(CoreError::InvalidVersion(format!(
                "unsupported major version {} in {raw}",
                version.major
            )));
        }
        Ok(Self(version))
    }

    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = CoreError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        ApiVersion::parse(&value)
    }
}

impl From<ApiVersion> for String {
    fn from(value: ApiVersion) -> Self {
        value.to_string()
    }
}

/// Embedded metadata block carried by every declarative object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Internal identifiers, never round-tripped through the declarative
    /// JSON/YAML surface.
    #[serde(skip)]
    pub catalog_id: Option<uuid::Uuid>,
    #[serde(skip)]
    pub variant_id: Option<uuid::Uuid>,
}

impl Metadata {
    /// The effective storage path: `"/" + (namespace or "default") + path + "/" + name`, cleaned.
    pub fn storage_path(&self) -> String {
        let namespace = self.namespace.as_deref().unwrap_or("default");
        let prefix = self.path.as_deref().unwrap_or("");
        let raw = format!("/{namespace}{prefix}/{}", self.name);
        clean_path(&raw)
    }
}

/// Collapse repeated slashes and resolve `.`/empty segments, leaving a
/// leading `/` and no trailing slash (unless the path is just `/`).
pub fn clean_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for seg in raw.split('/') {
        if seg.is_empty() || seg == "." {
            continue;
        }
        segments.push(seg);
    }
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_accepts_prerelease() {
        assert!(ApiVersion::parse("0.1.0-alpha.1").is_ok());
    }

    #[test]
    fn version_rejects_unsupported_major() {
        assert!(ApiVersion::parse("1.0.0").is_err());
    }

    #[test]
    fn version_rejects_malformed() {
        assert!(ApiVersion::parse("not-a-version").is_err());
    }

    #[test]
    fn storage_path_defaults_namespace() {
        let meta = Metadata {
            name: "widget".into(),
            catalog: "acme".into(),
            path: Some("/configs".into()),
            ..Default::default()
        };
        assert_eq!(meta.storage_path(), "/default/configs/widget");
    }

    #[test]
    fn clean_path_collapses_dots_and_slashes() {
        assert_eq!(clean_path("//a/./b//"), "/a/b");
        assert_eq!(clean_path(""), "/");
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [Kind::Catalog, Kind::Variant, Kind::Namespace, Kind::Resource, Kind::SkillSet, Kind::View] {
            let parsed: Kind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
