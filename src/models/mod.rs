//! Data models for relink entities.
//!
//! This module defines the core data structures:
//! - `WorkItem` - A tracked work item with its attached links
//! - `Link` - A relationship edge (hyperlink, related item, external artifact)
//! - `ArtifactLinkType` - The named type of an external artifact link
//! - `LinkTypeEnd` - A relationship role from the target repository's schema
//! - `Changeset` - A version-control commit with its checkin notes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Artifact link type that marks a version-control changeset reference.
/// All other artifact link types are generic external references.
pub const CHANGESET_ARTIFACT_TYPE: &str = "Fixed in Changeset";

/// Checkin-note field stamped on target changesets at migration time,
/// holding the originating source changeset number.
pub const CHECKIN_NOTE_FIELD: &str = "SourceChangesetId";

/// A tracked work item.
///
/// Source and target items live in disjoint identifier spaces; an item is
/// never shared between the two repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Identifier, unique within the item's own repository
    pub id: u64,

    /// Item title (carried for reporting only)
    #[serde(default)]
    pub title: String,

    /// Raw provenance field: the identifier of the source-repository item
    /// this item was copied from. Present only on target items. Kept as
    /// free text because migration tooling writes it unvalidated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,

    /// Links currently attached to the item
    #[serde(default)]
    pub links: Vec<Link>,
}

impl WorkItem {
    /// Create a new work item with no provenance and no links.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            source_ref: None,
            links: Vec::new(),
        }
    }

    /// Parse the provenance field as a source item identifier.
    ///
    /// Returns `None` when the field is absent, `Some(Err(raw))` when it is
    /// present but not an integer. Index building and batch processing both
    /// go through this so the two stages treat bad provenance identically.
    pub fn source_id(&self) -> Option<std::result::Result<u64, &str>> {
        self.source_ref
            .as_deref()
            .map(|raw| raw.trim().parse::<u64>().map_err(|_| raw))
    }
}

/// The named type of an external artifact link.
///
/// Equality is by name value, never by instance identity: two separately
/// constructed instances with the same name are the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactLinkType(String);

impl ArtifactLinkType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether this type denotes a version-control changeset reference.
    pub fn is_changeset(&self) -> bool {
        self.0.eq_ignore_ascii_case(CHANGESET_ARTIFACT_TYPE)
    }
}

impl fmt::Display for ArtifactLinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A relationship edge attached to a work item.
///
/// Every variant carries an optional free-text comment; the comment never
/// participates in equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Link {
    /// A URI-like location outside the item-tracking domain
    Hyperlink {
        location: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
    /// A typed reference to another item in the same repository
    Related {
        /// Relationship role, e.g. "Child" or "Duplicate"
        type_end: String,
        /// Identifier of the referenced item
        target_id: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
    /// A typed reference to an artifact outside the item-tracking domain
    External {
        artifact_type: ArtifactLinkType,
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
}

impl Link {
    /// Whether two links denote the same relationship edge.
    ///
    /// Hyperlinks compare by location, related links by (type end, target
    /// id), external links by (artifact type, URI). Comments are ignored.
    pub fn same_edge(&self, other: &Link) -> bool {
        match (self, other) {
            (Link::Hyperlink { location: a, .. }, Link::Hyperlink { location: b, .. }) => a == b,
            (
                Link::Related {
                    type_end: ta,
                    target_id: ia,
                    ..
                },
                Link::Related {
                    type_end: tb,
                    target_id: ib,
                    ..
                },
            ) => ta == tb && ia == ib,
            (
                Link::External {
                    artifact_type: ta,
                    uri: ua,
                    ..
                },
                Link::External {
                    artifact_type: tb,
                    uri: ub,
                    ..
                },
            ) => ta == tb && ua == ub,
            _ => false,
        }
    }

    /// The free-text comment, if any.
    pub fn comment(&self) -> Option<&str> {
        match self {
            Link::Hyperlink { comment, .. }
            | Link::Related { comment, .. }
            | Link::External { comment, .. } => comment.as_deref(),
        }
    }

    /// Short category name for logging and reporting.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Link::Hyperlink { .. } => "hyperlink",
            Link::Related { .. } => "related",
            Link::External { artifact_type, .. } if artifact_type.is_changeset() => "changeset",
            Link::External { .. } => "external",
        }
    }
}

/// A relationship role defined by the target repository's type schema.
///
/// Related links can only be created for roles the schema defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTypeEnd {
    pub name: String,
}

impl LinkTypeEnd {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An atomic version-control commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Changeset {
    /// Changeset number, unique within its repository
    pub id: u64,

    /// Artifact URI addressing this changeset
    pub artifact_uri: String,

    /// Checkin-note annotations attached to the changeset
    #[serde(default)]
    pub checkin_notes: BTreeMap<String, String>,
}

impl Changeset {
    /// Look up a checkin-note value by field name, case-insensitively.
    pub fn note(&self, field: &str) -> Option<&str> {
        self.checkin_notes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(_, value)| value.as_str())
    }
}
