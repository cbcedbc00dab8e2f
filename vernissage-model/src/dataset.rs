use std::collections::HashMap;

use crate::artwork::{ArtworkRef, RawArtwork};
use crate::error::ModelError;
use crate::ids::ArtworkId;

/// The current artwork dataset of a scene session.
///
/// Keeps API order (layout slots are filled in that order) while answering
/// membership queries in O(1); clicks are only honoured for artworks that
/// are still present.
#[derive(Debug, Clone, Default)]
pub struct ArtworkSet {
    items: Vec<ArtworkRef>,
    index: HashMap<ArtworkId, usize>,
}

impl ArtworkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from validated records. Later duplicates of an id are
    /// dropped.
    pub fn from_refs(refs: impl IntoIterator<Item = ArtworkRef>) -> Self {
        let mut set = Self::new();
        for art in refs {
            set.insert(art);
        }
        set
    }

    /// Parse a JSON array of raw API records. Records that fail validation
    /// are skipped and logged; a malformed document is an error.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let raw: Vec<RawArtwork> = serde_json::from_str(json)?;
        let total = raw.len();
        let refs: Vec<ArtworkRef> = raw
            .into_iter()
            .filter_map(|record| match ArtworkRef::try_from_raw(record) {
                Ok(art) => Some(art),
                Err(err) => {
                    log::warn!("Skipping artwork record: {err}");
                    None
                }
            })
            .collect();
        if refs.len() < total {
            log::info!(
                "Loaded {} of {} artwork records",
                refs.len(),
                total
            );
        }
        Ok(Self::from_refs(refs))
    }

    /// Insert a record; returns false when the id is already present.
    pub fn insert(&mut self, art: ArtworkRef) -> bool {
        if self.index.contains_key(&art.id) {
            return false;
        }
        self.index.insert(art.id.clone(), self.items.len());
        self.items.push(art);
        true
    }

    pub fn remove(&mut self, id: &ArtworkId) -> Option<ArtworkRef> {
        let position = self.index.remove(id)?;
        let removed = self.items.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn replace_all(&mut self, refs: impl IntoIterator<Item = ArtworkRef>) {
        *self = Self::from_refs(refs);
    }

    pub fn contains(&self, id: &ArtworkId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ArtworkId) -> Option<&ArtworkRef> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtworkRef> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ArtworkRef] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ArtworkRef> for ArtworkSet {
    fn from_iter<T: IntoIterator<Item = ArtworkRef>>(iter: T) -> Self {
        Self::from_refs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(id: u64) -> ArtworkRef {
        ArtworkRef::new(ArtworkId::from(id), format!("Work {id}"), None, None)
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut set: ArtworkSet = (1..=4).map(art).collect();
        assert!(set.remove(&ArtworkId::from(2)).is_some());
        assert!(!set.contains(&ArtworkId::from(2)));
        assert_eq!(set.get(&ArtworkId::from(4)).unwrap().title, "Work 4");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn duplicate_ids_are_ignored() {
        let mut set = ArtworkSet::new();
        assert!(set.insert(art(1)));
        assert!(!set.insert(art(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn invalid_records_are_skipped() {
        let set = ArtworkSet::from_json_str(
            r#"[{"id": 1, "title": "ok"}, {"id": ""}, {"id": "2"}]"#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert!(ArtworkSet::from_json_str("{not json").is_err());
    }
}
