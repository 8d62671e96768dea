//! In-memory editor host.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::bridge::{
    domain::BlockId,
    ports::{EditorHost, EditorHostError, EditorHostResult},
};

/// Thread-safe in-memory block store with parent links.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEditorHost {
    state: Arc<RwLock<InMemoryEditorState>>,
}

#[derive(Debug, Default)]
struct InMemoryEditorState {
    blocks: HashMap<BlockId, String>,
    parents: HashMap<BlockId, BlockId>,
    updates: Vec<BlockId>,
    read_only: HashSet<BlockId>,
    unavailable: bool,
}

impl InMemoryEditorHost {
    /// Creates an empty editor host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces a block.
    ///
    /// # Errors
    ///
    /// Returns [`EditorHostError::Transport`] when the state lock is
    /// poisoned.
    pub fn insert_block(&self, id: &BlockId, content: impl Into<String>) -> EditorHostResult<()> {
        let mut state = self.write()?;
        state.blocks.insert(id.clone(), content.into());
        Ok(())
    }

    /// Stores a block as a child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorHostError::Transport`] when the state lock is
    /// poisoned.
    pub fn insert_child_block(
        &self,
        parent: &BlockId,
        id: &BlockId,
        content: impl Into<String>,
    ) -> EditorHostResult<()> {
        let mut state = self.write()?;
        state.blocks.insert(id.clone(), content.into());
        state.parents.insert(id.clone(), parent.clone());
        Ok(())
    }

    /// Makes every subsequent call fail with a transport error, or restores
    /// normal operation.
    ///
    /// # Errors
    ///
    /// Returns [`EditorHostError::Transport`] when the state lock is
    /// poisoned.
    pub fn set_unavailable(&self, unavailable: bool) -> EditorHostResult<()> {
        self.write()?.unavailable = unavailable;
        Ok(())
    }

    /// Makes the host refuse every update of `id`, as the kernel does for a
    /// locked document.
    ///
    /// # Errors
    ///
    /// Returns [`EditorHostError::Transport`] when the state lock is
    /// poisoned.
    pub fn set_read_only(&self, id: &BlockId) -> EditorHostResult<()> {
        self.write()?.read_only.insert(id.clone());
        Ok(())
    }

    /// Returns the current content of a block.
    ///
    /// # Errors
    ///
    /// Returns [`EditorHostError::Transport`] when the state lock is
    /// poisoned.
    pub fn content(&self, id: &BlockId) -> EditorHostResult<Option<String>> {
        Ok(self.read()?.blocks.get(id).cloned())
    }

    /// Returns the blocks updated so far, in update order.
    ///
    /// # Errors
    ///
    /// Returns [`EditorHostError::Transport`] when the state lock is
    /// poisoned.
    pub fn updated_blocks(&self) -> EditorHostResult<Vec<BlockId>> {
        Ok(self.read()?.updates.clone())
    }

    fn read(&self) -> EditorHostResult<std::sync::RwLockReadGuard<'_, InMemoryEditorState>> {
        self.state
            .read()
            .map_err(|err| EditorHostError::transport(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> EditorHostResult<std::sync::RwLockWriteGuard<'_, InMemoryEditorState>> {
        self.state
            .write()
            .map_err(|err| EditorHostError::transport(std::io::Error::other(err.to_string())))
    }
}

fn unavailable_error() -> EditorHostError {
    EditorHostError::transport(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "editor host unavailable",
    ))
}

#[async_trait]
impl EditorHost for InMemoryEditorHost {
    async fn block_content(&self, id: &BlockId) -> EditorHostResult<Option<String>> {
        let state = self.read()?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        Ok(state
            .blocks
            .get(id)
            .filter(|content| !content.is_empty())
            .cloned())
    }

    async fn update_block_content(&self, id: &BlockId, content: &str) -> EditorHostResult<()> {
        let mut state = self.write()?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        if state.read_only.contains(id) {
            return Err(EditorHostError::rejected(-1, format!("block {id} is read-only")));
        }
        if !state.blocks.contains_key(id) {
            return Err(EditorHostError::rejected(
                -1,
                format!("block {id} does not exist"),
            ));
        }
        state.blocks.insert(id.clone(), content.to_owned());
        state.updates.push(id.clone());
        Ok(())
    }

    async fn parent_id(&self, id: &BlockId) -> EditorHostResult<Option<BlockId>> {
        let state = self.read()?;
        if state.unavailable {
            return Err(unavailable_error());
        }
        Ok(state.parents.get(id).cloned())
    }
}
