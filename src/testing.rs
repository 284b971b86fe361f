//! In-memory stand-ins used by the unit tests.

use std::cell::{Cell, RefCell};

use crate::config::{ConfigError, ConfigProvider, SheetCredentials};
use crate::core::{Contact, ContactDraft};
use crate::sync::{RowStore, SheetError};

/// Sheet stand-in: `rows[0]` is physical row 2.
#[derive(Default)]
pub struct FakeSheet {
    pub rows: RefCell<Vec<ContactDraft>>,
    calls: RefCell<Vec<String>>,
    fail_next: RefCell<Option<SheetError>>,
}

impl FakeSheet {
    pub fn with_rows(rows: &[(&str, &str, &str)]) -> Self {
        let sheet = Self::default();
        *sheet.rows.borrow_mut() = rows
            .iter()
            .map(|(name, email, notes)| ContactDraft::new(*name, *email, *notes))
            .collect();
        sheet
    }

    /// Make the next store call fail with `err`.
    pub fn fail_with(&self, err: SheetError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: String) -> Result<(), SheetError> {
        self.calls.borrow_mut().push(call);
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl RowStore for FakeSheet {
    async fn list(&self) -> Result<Vec<Contact>, SheetError> {
        self.record("list".to_string())?;
        Ok(self
            .rows
            .borrow()
            .iter()
            .zip(2u32..)
            .map(|(draft, row_index)| Contact {
                row_index,
                name: draft.name.clone(),
                email: draft.email.clone(),
                notes: draft.notes.clone(),
            })
            .collect())
    }

    async fn append(&self, draft: &ContactDraft) -> Result<(), SheetError> {
        self.record("append".to_string())?;
        self.rows.borrow_mut().push(draft.clone());
        Ok(())
    }

    async fn update(&self, row_index: u32, draft: &ContactDraft) -> Result<(), SheetError> {
        self.record(format!("update {}", row_index))?;
        let mut rows = self.rows.borrow_mut();
        let slot = (row_index as usize)
            .checked_sub(2)
            .and_then(|i| rows.get_mut(i))
            .ok_or_else(|| SheetError::Remote("Range out of bounds".to_string()))?;
        *slot = draft.clone();
        Ok(())
    }
}

/// Config store kept in memory. While `unavailable` is set every call
/// fails the way a missing Secret Service does.
#[derive(Default)]
pub struct MemoryConfig {
    pub stored: RefCell<Option<SheetCredentials>>,
    pub unavailable: Cell<bool>,
}

impl MemoryConfig {
    pub fn with(sheet_id: &str, api_key: &str) -> Self {
        Self {
            stored: RefCell::new(SheetCredentials::new(sheet_id, api_key)),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        let config = Self::with("sheet", "key");
        config.unavailable.set(true);
        config
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.unavailable.get() {
            return Err(ConfigError::Keyring("no secret service".to_string()));
        }
        Ok(())
    }
}

impl ConfigProvider for MemoryConfig {
    async fn load(&self) -> Result<Option<SheetCredentials>, ConfigError> {
        self.check()?;
        Ok(self.stored.borrow().clone())
    }

    async fn save(&self, credentials: &SheetCredentials) -> Result<(), ConfigError> {
        self.check()?;
        *self.stored.borrow_mut() = Some(credentials.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ConfigError> {
        self.check()?;
        *self.stored.borrow_mut() = None;
        Ok(())
    }
}
