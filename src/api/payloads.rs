//! Request bodies for the resource operations
//!
//! Optional fields are left out of the wire body when unset, so a partial
//! update only touches what the caller named.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Body of `POST /repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Body of `POST /user/repos`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewRepository {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
}

impl NewRepository {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Body of `PATCH /repos/{owner}/{repo}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepositoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl RepositoryUpdate {
    /// Returns true when no field would be sent
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Kind of object a tag points at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagObjectType {
    #[default]
    Commit,
    Tree,
    Blob,
}

/// Author of an annotated tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tagger {
    pub name: String,
    pub email: String,
    /// Serialized as ISO 8601 with a `Z` suffix
    #[serde(serialize_with = "serialize_iso8601")]
    pub date: DateTime<Utc>,
}

/// Everything in a tag-creation body except the tag name itself
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTag {
    pub message: String,
    /// SHA of the tagged object
    pub object: String,
    #[serde(rename = "type")]
    pub object_type: TagObjectType,
    pub tagger: Tagger,
}

/// Wire body of `POST /repos/{owner}/{repo}/tags`
#[derive(Debug, Serialize)]
pub(crate) struct TagBody<'a> {
    pub tag: &'a str,
    #[serde(flatten)]
    pub details: &'a NewTag,
}

fn serialize_iso8601<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, true))
}
