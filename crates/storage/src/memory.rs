use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwap;
use snafu::{OptionExt, ResultExt, ensure};
use tokio::sync::{Mutex, watch};

use crate::error::{
    ConversationNotFoundSnafu, CreateSnapshotDirSnafu, EmptyMessageSnafu, ParseSnapshotSnafu,
    ReadSnapshotSnafu, RenameSnapshotSnafu, SerializeSnapshotSnafu, StoreResult,
    WriteSnapshotSnafu,
};
use crate::ids::{ConversationIndex, MessageId};
use crate::types::{ConversationRecord, MessageRecord, MessageRole, StoreSnapshot};
use crate::{BoxFuture, ConversationStore};

/// Read-side view published after every successful mutation.
#[derive(Debug, Default)]
struct PublishedState {
    conversations: Arc<Vec<ConversationRecord>>,
    messages: Arc<Vec<MessageRecord>>,
    active: ConversationIndex,
}

impl PublishedState {
    fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        let messages = snapshot
            .active_conversation()
            .map(|conversation| conversation.messages.clone())
            .unwrap_or_default();

        Self {
            conversations: Arc::new(snapshot.conversations.clone()),
            messages: Arc::new(messages),
            active: snapshot.active,
        }
    }
}

/// In-memory conversation store with optional JSON snapshot persistence.
///
/// Writers are serialized through one async mutex and persist before publishing,
/// so readers never observe state that failed to reach disk.
pub struct MemoryConversationStore {
    published: ArcSwap<PublishedState>,
    snapshot: Mutex<StoreSnapshot>,
    revision: watch::Sender<u64>,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryConversationStore {
    fn default() -> Self {
        Self::from_snapshot(StoreSnapshot::default())
    }
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let snapshot = snapshot.normalized();
        let (revision, _) = watch::channel(0);

        Self {
            published: ArcSwap::from_pointee(PublishedState::from_snapshot(&snapshot)),
            snapshot: Mutex::new(snapshot),
            revision,
            snapshot_path: None,
        }
    }

    /// Loads the snapshot at `path` and keeps persisting to it.
    ///
    /// A missing file yields an empty store; an unreadable or corrupt one is an error.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(&path).context(ReadSnapshotSnafu {
                stage: "read-snapshot-file",
                path: path.clone(),
            })?;
            let snapshot: StoreSnapshot =
                serde_json::from_str(&content).context(ParseSnapshotSnafu {
                    stage: "parse-snapshot-json",
                    path: path.clone(),
                })?;
            tracing::info!(
                "loaded {} conversations from {:?}",
                snapshot.conversations.len(),
                path
            );
            snapshot
        } else {
            tracing::info!("snapshot not found at {:?}, starting empty", path);
            StoreSnapshot::default()
        };

        Ok(Self::from_snapshot(snapshot).with_snapshot_path(path))
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Starts on a fresh conversation regardless of what the snapshot had active.
    pub fn forget_active(mut self) -> Self {
        let snapshot = self.snapshot.get_mut();
        snapshot.active = ConversationIndex::NEW;
        self.published
            .store(Arc::new(PublishedState::from_snapshot(snapshot)));
        self
    }

    async fn commit(&self, snapshot: &mut StoreSnapshot, next: StoreSnapshot) -> StoreResult<()> {
        if let Some(path) = self.snapshot_path.as_deref() {
            persist_snapshot(path, &next).await?;
        }

        self.published
            .store(Arc::new(PublishedState::from_snapshot(&next)));
        *snapshot = next;
        self.revision.send_modify(|revision| *revision += 1);
        Ok(())
    }

    async fn toggle_inner(&self, index: ConversationIndex) -> StoreResult<()> {
        let index = if index.is_new() {
            ConversationIndex::NEW
        } else {
            index
        };
        let mut snapshot = self.snapshot.lock().await;
        if snapshot.active == index {
            tracing::debug!("conversation {index} already active");
            return Ok(());
        }

        if let Some(position) = index.position() {
            ensure!(
                position < snapshot.conversations.len(),
                ConversationNotFoundSnafu {
                    stage: "toggle-conversation",
                    index: index.0,
                    len: snapshot.conversations.len(),
                }
            );
        }

        let mut next = snapshot.clone();
        next.active = index;
        self.commit(&mut snapshot, next).await?;
        tracing::debug!("toggled active conversation to {index}");
        Ok(())
    }

    async fn append_inner(&self, role: MessageRole, content: String) -> StoreResult<MessageRecord> {
        ensure!(
            !content.trim().is_empty(),
            EmptyMessageSnafu {
                stage: "append-message",
            }
        );

        let mut snapshot = self.snapshot.lock().await;
        let mut next = snapshot.clone();
        let now = unix_timestamp_seconds();

        let position = match next.active.position() {
            Some(position) if position < next.conversations.len() => position,
            _ => {
                next.conversations.push(ConversationRecord::new(now));
                let position = next.conversations.len() - 1;
                next.active = ConversationIndex::from(position);
                tracing::debug!("created conversation {} for first message", next.active);
                position
            }
        };

        let message = MessageRecord {
            id: MessageId::new_v7(),
            role,
            content,
            created_at_unix_seconds: now,
        };
        next.conversations[position].push(message.clone());
        self.commit(&mut snapshot, next).await?;
        Ok(message)
    }

    async fn delete_inner(&self, index: ConversationIndex) -> StoreResult<()> {
        let mut snapshot = self.snapshot.lock().await;
        let len = snapshot.conversations.len();
        let position = index
            .position()
            .filter(|position| *position < len)
            .context(ConversationNotFoundSnafu {
                stage: "delete-conversation",
                index: index.0,
                len,
            })?;

        let mut next = snapshot.clone();
        next.conversations.remove(position);
        next.active = match next.active.position() {
            Some(active) if active == position => ConversationIndex::NEW,
            Some(active) if active > position => ConversationIndex::from(active - 1),
            _ => next.active,
        };
        self.commit(&mut snapshot, next).await?;
        tracing::debug!("deleted conversation {index}");
        Ok(())
    }
}

impl ConversationStore for MemoryConversationStore {
    fn messages(&self) -> Arc<Vec<MessageRecord>> {
        self.published.load().messages.clone()
    }

    fn conversations(&self) -> Arc<Vec<ConversationRecord>> {
        self.published.load().conversations.clone()
    }

    fn active(&self) -> ConversationIndex {
        self.published.load().active
    }

    fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn toggle<'a>(&'a self, index: ConversationIndex) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(self.toggle_inner(index))
    }

    fn append_message<'a>(
        &'a self,
        role: MessageRole,
        content: String,
    ) -> BoxFuture<'a, StoreResult<MessageRecord>> {
        Box::pin(self.append_inner(role, content))
    }

    fn delete_conversation<'a>(
        &'a self,
        index: ConversationIndex,
    ) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(self.delete_inner(index))
    }
}

async fn persist_snapshot(path: &Path, snapshot: &StoreSnapshot) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .context(CreateSnapshotDirSnafu {
                stage: "create-snapshot-directory",
                path: parent.to_path_buf(),
            })?;
    }

    let content = serde_json::to_string_pretty(snapshot).context(SerializeSnapshotSnafu {
        stage: "serialize-snapshot-json",
    })?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, content)
        .await
        .context(WriteSnapshotSnafu {
            stage: "write-temporary-snapshot-file",
            path: temp_path.clone(),
        })?;

    tokio::fs::rename(&temp_path, path)
        .await
        .context(RenameSnapshotSnafu {
            stage: "rename-temporary-snapshot-file",
            from: temp_path,
            to: path.to_path_buf(),
        })?;

    tracing::debug!("saved snapshot to {:?}", path);
    Ok(())
}

fn unix_timestamp_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default()
}
