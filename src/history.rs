//! Persistence of the last conversation so `--follow-up` can continue it.

use crate::error::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

const LAST_CONVERSATION: &str = "last-conversation.json";
const HISTORY_DIR: &str = "history";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }
}

/// Where conversations are kept.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn last_path(&self) -> PathBuf {
        self.root.join(LAST_CONVERSATION)
    }

    /// The last conversation, or an empty one when there is none.
    pub fn load_last(&self) -> Result<Conversation> {
        let content = match fs::read_to_string(self.last_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Conversation::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_last(&self, conversation: &Conversation) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(conversation)?;
        fs::write(self.last_path(), json)?;
        Ok(())
    }

    /// Moves the last conversation into the timestamped archive. Returns the
    /// archived path, or `None` when there was nothing to archive.
    pub fn archive_last(&self) -> Result<Option<PathBuf>> {
        let last = self.last_path();
        if !last.exists() {
            return Ok(None);
        }

        let archive_dir = self.root.join(HISTORY_DIR);
        fs::create_dir_all(&archive_dir)?;
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let target = archive_dir.join(format!("{stamp}_{LAST_CONVERSATION}"));
        fs::rename(&last, &target)?;

        tracing::debug!(path = %target.display(), "archived last conversation");
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_conversation_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        assert_eq!(store.load_last().unwrap(), Conversation::default());
        assert_eq!(store.archive_last().unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nested"));

        let mut conversation = Conversation::default();
        conversation.push(Role::User, "hi");
        conversation.push(Role::Assistant, "hello");
        store.save_last(&conversation).unwrap();

        assert_eq!(store.load_last().unwrap(), conversation);
    }

    #[test]
    fn test_json_shape() {
        let mut conversation = Conversation::default();
        conversation.push(Role::User, "hi");
        let value = serde_json::to_value(&conversation).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "messages": [{ "role": "user", "content": "hi" }] })
        );
    }

    #[test]
    fn test_archive_moves_last_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        let mut conversation = Conversation::default();
        conversation.push(Role::User, "old");
        store.save_last(&conversation).unwrap();

        let archived = store.archive_last().unwrap().unwrap();
        assert!(archived.starts_with(dir.path().join(HISTORY_DIR)));
        assert!(archived
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_last-conversation.json"));
        assert_eq!(store.load_last().unwrap(), Conversation::default());

        let content = fs::read_to_string(archived).unwrap();
        let restored: Conversation = serde_json::from_str(&content).unwrap();
        assert_eq!(restored, conversation);
    }

    #[test]
    fn test_corrupt_conversation_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        fs::write(dir.path().join(LAST_CONVERSATION), "{ not json").unwrap();
        assert!(store.load_last().is_err());
    }
}
