//! In-process session store.

use std::sync::Mutex;

use super::{SessionRecord, SessionStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SessionRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn append(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.lock().push(record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.lock().clone())
    }
}
