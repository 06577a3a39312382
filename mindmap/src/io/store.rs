//! Conversation persistence behind an explicit store interface.
//!
//! No core logic touches an ambient singleton: callers receive a
//! [`ConversationStore`] and the implementation decides where records live.
//! [`FileStore`] keeps everything in one pretty-JSON file with atomic writes;
//! [`MemoryStore`] backs tests.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::io::transport::{ChatMessage, Role};
use crate::node::Node;

/// Truncation applied when a conversation title is derived from the first
/// user message.
const TITLE_LIMIT: usize = 15;

/// Default title for freshly created conversations.
pub const NEW_CONVERSATION_TITLE: &str = "新对话";

/// One saved conversation with its generated mind map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    /// Milliseconds since the Unix epoch; refreshed on save.
    pub timestamp: u64,
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "mindMapData")]
    pub mind_map_data: Option<Node>,
}

impl Conversation {
    /// Fresh conversation with the default title and no messages.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: NEW_CONVERSATION_TITLE.to_string(),
            timestamp: now_millis(),
            messages: Vec::new(),
            mind_map_data: None,
        }
    }
}

/// Key-value persistence of conversations plus active-selection tracking.
pub trait ConversationStore {
    /// All conversations, newest first.
    fn list(&self) -> Result<Vec<Conversation>>;

    fn get(&self, id: &str) -> Result<Option<Conversation>>;

    /// Insert or replace, refreshing the timestamp and auto-deriving the
    /// title (mind-map root label first, else the first user message).
    fn save(&self, conversation: Conversation) -> Result<()>;

    /// Remove a conversation; clears the active id when it pointed here.
    fn delete(&self, id: &str) -> Result<()>;

    fn active_id(&self) -> Result<Option<String>>;

    fn set_active_id(&self, id: &str) -> Result<()>;
}

/// Refresh bookkeeping fields before a record is persisted.
fn prepare_for_save(conversation: &mut Conversation) {
    conversation.timestamp = now_millis();

    if let Some(root_label) = conversation
        .mind_map_data
        .as_ref()
        .map(|tree| tree.data.text.as_str())
        .filter(|label| !label.is_empty())
    {
        conversation.title = root_label.to_string();
    } else if conversation.title.is_empty() || conversation.title == NEW_CONVERSATION_TITLE {
        if let Some(first_user) = conversation
            .messages
            .iter()
            .find(|m| m.role == Role::User)
        {
            conversation.title = first_user.content.chars().take(TITLE_LIMIT).collect();
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Everything the store persists, as one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
}

impl StoreState {
    fn upsert(&mut self, mut conversation: Conversation) {
        prepare_for_save(&mut conversation);
        match self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
        {
            Some(existing) => *existing = conversation,
            None => self.conversations.insert(0, conversation),
        }
    }

    fn remove(&mut self, id: &str) {
        self.conversations.retain(|c| c.id != id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
    }

    fn sorted_newest_first(&self) -> Vec<Conversation> {
        let mut list = self.conversations.clone();
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        list
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryStore {
    fn list(&self) -> Result<Vec<Conversation>> {
        Ok(self.state.borrow().sorted_newest_first())
    }

    fn get(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self
            .state
            .borrow()
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    fn save(&self, conversation: Conversation) -> Result<()> {
        self.state.borrow_mut().upsert(conversation);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.state.borrow_mut().remove(id);
        Ok(())
    }

    fn active_id(&self) -> Result<Option<String>> {
        Ok(self.state.borrow().active_id.clone())
    }

    fn set_active_id(&self, id: &str) -> Result<()> {
        self.state.borrow_mut().active_id = Some(id.to_string());
        Ok(())
    }
}

/// Store backed by a single pretty-JSON file (atomic temp-file + rename).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<StoreState> {
        if !self.path.exists() {
            return Ok(StoreState::default());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("read store {}", self.path.display()))?;
        let state: StoreState = serde_json::from_str(&contents)
            .with_context(|| format!("parse store {}", self.path.display()))?;
        Ok(state)
    }

    fn write(&self, state: &StoreState) -> Result<()> {
        debug!(path = %self.path.display(), conversations = state.conversations.len(), "writing store");
        let mut buf = serde_json::to_string_pretty(state)?;
        buf.push('\n');
        write_atomic(&self.path, &buf)
    }
}

impl ConversationStore for FileStore {
    fn list(&self) -> Result<Vec<Conversation>> {
        Ok(self.load()?.sorted_newest_first())
    }

    fn get(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self
            .load()?
            .conversations
            .into_iter()
            .find(|c| c.id == id))
    }

    fn save(&self, conversation: Conversation) -> Result<()> {
        let mut state = self.load()?;
        state.upsert(conversation);
        self.write(&state)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.load()?;
        state.remove(id);
        self.write(&state)
    }

    fn active_id(&self) -> Result<Option<String>> {
        Ok(self.load()?.active_id)
    }

    fn set_active_id(&self, id: &str) -> Result<()> {
        let mut state = self.load()?;
        state.active_id = Some(id.to_string());
        self.write(&state)
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("store path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp store {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace store {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn store_with_file(temp: &tempfile::TempDir) -> FileStore {
        FileStore::new(temp.path().join("conversations.json"))
    }

    /// Verifies save then get preserves the record.
    #[test]
    fn file_store_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store_with_file(&temp);

        let mut conversation = Conversation::new("c1");
        conversation.messages.push(ChatMessage::user("什么是思维导图"));
        store.save(conversation).expect("save");

        let loaded = store.get("c1").expect("get").expect("present");
        assert_eq!(loaded.messages.len(), 1);
    }

    #[test]
    fn list_is_sorted_newest_first() {
        let store = MemoryStore::new();
        let mut old = Conversation::new("old");
        let mut new = Conversation::new("new");
        store.save(old.clone()).expect("save old");
        store.save(new.clone()).expect("save new");

        // Force a deterministic ordering regardless of clock resolution.
        old = store.get("old").expect("get").expect("present");
        new = store.get("new").expect("get").expect("present");
        old.timestamp = 1;
        new.timestamp = 2;
        let mut state = StoreState {
            conversations: vec![old, new],
            active_id: None,
        };
        let listed = state.sorted_newest_first();
        assert_eq!(listed[0].id, "new");
        assert_eq!(listed[1].id, "old");
        state.remove("new");
        assert_eq!(state.conversations.len(), 1);
    }

    #[test]
    fn save_titles_from_mind_map_root() {
        let store = MemoryStore::new();
        let mut conversation = Conversation::new("c1");
        conversation.mind_map_data = Some(Node::leaf("中心主题"));
        store.save(conversation).expect("save");
        let loaded = store.get("c1").expect("get").expect("present");
        assert_eq!(loaded.title, "中心主题");
    }

    #[test]
    fn save_titles_from_first_user_message_when_no_tree() {
        let store = MemoryStore::new();
        let mut conversation = Conversation::new("c1");
        conversation
            .messages
            .push(ChatMessage::assistant("你好，想了解什么？"));
        conversation
            .messages
            .push(ChatMessage::user("请介绍一下量子计算的基本原理和应用场景"));
        store.save(conversation).expect("save");
        let loaded = store.get("c1").expect("get").expect("present");
        assert_eq!(loaded.title.chars().count(), 15);
        assert!(loaded.title.starts_with("请介绍一下"));
    }

    #[test]
    fn explicit_title_is_kept() {
        let store = MemoryStore::new();
        let mut conversation = Conversation::new("c1");
        conversation.title = "自定义标题".to_string();
        conversation.messages.push(ChatMessage::user("hello"));
        store.save(conversation).expect("save");
        let loaded = store.get("c1").expect("get").expect("present");
        assert_eq!(loaded.title, "自定义标题");
    }

    #[test]
    fn delete_clears_active_id_when_it_matches() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store_with_file(&temp);
        store.save(Conversation::new("c1")).expect("save");
        store.set_active_id("c1").expect("set active");
        assert_eq!(store.active_id().expect("active").as_deref(), Some("c1"));

        store.delete("c1").expect("delete");
        assert_eq!(store.active_id().expect("active"), None);
        assert!(store.get("c1").expect("get").is_none());
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store_with_file(&temp);
        assert!(store.list().expect("list").is_empty());
        assert_eq!(store.active_id().expect("active"), None);
    }
}
