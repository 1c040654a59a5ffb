//! Transient preview references.
//!
//! A [`PreviewRegistry`] is a bounded table of live previews, the server-side
//! counterpart of a browser's object-URL table. Each allocation returns a
//! [`PreviewHandle`]; dropping the handle removes its entry, so release
//! happens on every exit path (replacement, clear, or teardown).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use crate::file::ImageFile;
use crate::MediaError;

/// Default number of previews that may be live at once.
pub const DEFAULT_PREVIEW_CAPACITY: usize = 256;

#[derive(Debug)]
struct Table {
    entries: HashMap<Uuid, ImageFile>,
    capacity: usize,
}

#[derive(Debug, Clone)]
pub struct PreviewRegistry {
    table: Arc<Mutex<Table>>,
}

impl PreviewRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                entries: HashMap::new(),
                capacity,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // Entries are plain data; a panic mid-update cannot corrupt them.
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Allocate a preview for `file`.
    pub fn allocate(&self, file: &ImageFile) -> Result<PreviewHandle, MediaError> {
        let mut table = self.lock();
        if table.entries.len() >= table.capacity {
            return Err(MediaError::PreviewTableFull {
                capacity: table.capacity,
            });
        }
        let id = Uuid::new_v4();
        table.entries.insert(id, file.clone());
        debug!(preview = %id, name = %file.name(), "Allocated preview");
        Ok(PreviewHandle {
            id,
            registry: self.clone(),
        })
    }

    /// Look up a live preview.
    pub fn resolve(&self, id: &Uuid) -> Option<ImageFile> {
        self.lock().entries.get(id).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.lock().entries.len()
    }

    fn release(&self, id: &Uuid) {
        if self.lock().entries.remove(id).is_some() {
            debug!(preview = %id, "Released preview");
        }
    }
}

impl Default for PreviewRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_CAPACITY)
    }
}

/// Scoped preview reference. Not `Clone`: exactly one owner releases it.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Path under which the preview server exposes this handle.
    pub fn url(&self) -> String {
        format!("/api/previews/{}", self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(&self.id);
    }
}
