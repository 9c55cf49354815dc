//! Changeset remapping between source and target version control.
//!
//! Target changesets created by the migration carry a checkin note naming
//! the source changeset they were copied from. Remapping resolves a source
//! changeset artifact URI to the first target changeset whose note matches
//! its number.

use crate::Result;
use crate::models::CHECKIN_NOTE_FIELD;
use crate::repo::VersionControl;
use std::collections::HashMap;
use tracing::{debug, info};

/// Outcome of probing the target's checkin-note schema.
enum NoteIndex {
    /// The provenance field is not configured at the target; remapping is
    /// impossible and every lookup reports no match.
    Unsupported,
    /// Note value mapped to the artifact URI of the first changeset, in
    /// history order, carrying that value.
    Ready(HashMap<String, String>),
}

/// Resolves source changeset references to their target-side equivalents.
///
/// The target's full history is scanned once at construction and indexed by
/// note value; lookups afterwards are map reads. First match in changeset
/// order wins, same as a per-lookup linear scan would produce.
pub struct ChangesetRemapper<'a> {
    source: &'a dyn VersionControl,
    notes: NoteIndex,
}

impl<'a> ChangesetRemapper<'a> {
    /// Probe the target schema and index its history.
    ///
    /// Failing to read the target's schema or history is fatal: without
    /// them the run cannot decide whether changeset links are mappable.
    pub fn new(source: &'a dyn VersionControl, target: &dyn VersionControl) -> Result<Self> {
        let fields = target.checkin_note_fields()?;
        let field = fields
            .iter()
            .find(|name| name.eq_ignore_ascii_case(CHECKIN_NOTE_FIELD));

        let notes = match field {
            None => {
                info!(
                    field = CHECKIN_NOTE_FIELD,
                    "target checkin-note schema has no provenance field; changeset remapping not supported"
                );
                NoteIndex::Unsupported
            }
            Some(field) => {
                let mut map = HashMap::new();
                for changeset in target.history()? {
                    if let Some(value) = changeset.note(field) {
                        map.entry(value.trim().to_string())
                            .or_insert_with(|| changeset.artifact_uri.clone());
                    }
                }
                debug!(entries = map.len(), "indexed target changeset provenance notes");
                NoteIndex::Ready(map)
            }
        };

        Ok(Self { source, notes })
    }

    /// Whether the target supports changeset remapping at all.
    pub fn is_supported(&self) -> bool {
        matches!(self.notes, NoteIndex::Ready(_))
    }

    /// Find the target changeset equivalent to a source changeset.
    ///
    /// Returns `Ok(None)` when remapping is unsupported or when no target
    /// changeset carries the source changeset number; the caller must then
    /// skip the link rather than stage it. Resolving the source URI itself
    /// can fail, which is an error.
    pub fn remap(&self, source_uri: &str) -> Result<Option<String>> {
        let number = self.source.resolve_changeset(source_uri)?;
        match &self.notes {
            NoteIndex::Unsupported => Ok(None),
            NoteIndex::Ready(map) => Ok(map.get(&number.to_string()).cloned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::models::Changeset;
    use std::collections::BTreeMap;

    struct FakeVcs {
        fields: Vec<String>,
        history: Vec<Changeset>,
    }

    impl FakeVcs {
        fn empty() -> Self {
            Self {
                fields: Vec::new(),
                history: Vec::new(),
            }
        }
    }

    impl VersionControl for FakeVcs {
        fn resolve_changeset(&self, artifact_uri: &str) -> Result<u64> {
            self.history
                .iter()
                .find(|cs| cs.artifact_uri == artifact_uri)
                .map(|cs| cs.id)
                .ok_or_else(|| Error::ChangesetNotFound(artifact_uri.to_string()))
        }

        fn checkin_note_fields(&self) -> Result<Vec<String>> {
            Ok(self.fields.clone())
        }

        fn history(&self) -> Result<Vec<Changeset>> {
            Ok(self.history.clone())
        }
    }

    fn changeset(id: u64, source_note: Option<&str>) -> Changeset {
        let mut notes = BTreeMap::new();
        if let Some(value) = source_note {
            notes.insert(CHECKIN_NOTE_FIELD.to_string(), value.to_string());
        }
        Changeset {
            id,
            artifact_uri: format!("vstfs:///VersionControl/Changeset/{}", id),
            checkin_notes: notes,
        }
    }

    fn source_with(ids: &[u64]) -> FakeVcs {
        FakeVcs {
            fields: Vec::new(),
            history: ids.iter().map(|&id| changeset(id, None)).collect(),
        }
    }

    #[test]
    fn test_remap_matches_note_value() {
        let source = source_with(&[17]);
        let target = FakeVcs {
            fields: vec![CHECKIN_NOTE_FIELD.to_string()],
            history: vec![changeset(100, None), changeset(101, Some("17"))],
        };
        let remapper = ChangesetRemapper::new(&source, &target).unwrap();
        assert!(remapper.is_supported());
        assert_eq!(
            remapper
                .remap("vstfs:///VersionControl/Changeset/17")
                .unwrap(),
            Some("vstfs:///VersionControl/Changeset/101".to_string())
        );
    }

    #[test]
    fn test_remap_first_match_in_history_order() {
        let source = source_with(&[17]);
        // Two target changesets claim source 17; the earlier one wins.
        let target = FakeVcs {
            fields: vec![CHECKIN_NOTE_FIELD.to_string()],
            history: vec![changeset(101, Some("17")), changeset(102, Some("17"))],
        };
        let remapper = ChangesetRemapper::new(&source, &target).unwrap();
        assert_eq!(
            remapper
                .remap("vstfs:///VersionControl/Changeset/17")
                .unwrap(),
            Some("vstfs:///VersionControl/Changeset/101".to_string())
        );
    }

    #[test]
    fn test_remap_unmatched_returns_none() {
        let source = source_with(&[17]);
        let target = FakeVcs {
            fields: vec![CHECKIN_NOTE_FIELD.to_string()],
            history: vec![changeset(101, Some("99"))],
        };
        let remapper = ChangesetRemapper::new(&source, &target).unwrap();
        assert_eq!(
            remapper
                .remap("vstfs:///VersionControl/Changeset/17")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_remap_unsupported_schema() {
        let source = source_with(&[17]);
        let target = FakeVcs {
            fields: vec!["Code Reviewer".to_string()],
            history: vec![changeset(101, Some("17"))],
        };
        let remapper = ChangesetRemapper::new(&source, &target).unwrap();
        assert!(!remapper.is_supported());
        assert_eq!(
            remapper
                .remap("vstfs:///VersionControl/Changeset/17")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_field_name_match_is_case_insensitive() {
        let source = source_with(&[17]);
        let target = FakeVcs {
            fields: vec!["sourcechangesetid".to_string()],
            history: vec![changeset(101, Some("17"))],
        };
        let remapper = ChangesetRemapper::new(&source, &target).unwrap();
        assert!(remapper.is_supported());
    }

    #[test]
    fn test_unknown_source_uri_is_error() {
        let source = FakeVcs::empty();
        let target = FakeVcs::empty();
        let remapper = ChangesetRemapper::new(&source, &target).unwrap();
        assert!(remapper.remap("vstfs:///nope").is_err());
    }
}
