use crate::message_id::MessageId;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

/// Ids of messages whose reports are already in the grid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessedIds {
    ids: BTreeSet<String>,
}

impl ProcessedIds {
    /// Loads the JSON array at `path`; a missing file is an empty set.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        let ids = serde_json::from_str(&content)?;
        Ok(ProcessedIds { ids })
    }

    /// Writes through a temporary file, so an interrupted save keeps the
    /// previous state.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let payload = serde_json::to_string_pretty(&self.ids)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, payload)?;
        fs::rename(&tmp_path, path)
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id.as_str())
    }

    pub fn insert(&mut self, id: &MessageId) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ids = ProcessedIds::load(&dir.path().join("processed_mail_ids.json")).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_mail_ids.json");
        let a = MessageId::from("a".repeat(64));
        let b = MessageId::from("b".repeat(64));

        let mut ids = ProcessedIds::default();
        assert!(ids.insert(&b));
        assert!(ids.insert(&a));
        assert!(!ids.insert(&a));
        ids.save(&path).unwrap();

        let loaded = ProcessedIds::load(&path).unwrap();
        assert_eq!(loaded, ids);
        assert!(loaded.contains(&a));
        assert_eq!(loaded.len(), 2);
        assert!(!dir.path().join("processed_mail_ids.json.tmp").exists());

        let saved: Vec<String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, vec!["a".repeat(64), "b".repeat(64)]);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_mail_ids.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(
            ProcessedIds::load(&path).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
    }
}
