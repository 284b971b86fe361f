pub mod keyring;
pub mod sheets;

use crate::core::{Contact, ContactDraft};

/// Shown whenever a delete is requested. Removing rows needs OAuth, which a
/// plain API key cannot provide.
pub const UNSUPPORTED_DELETE_MESSAGE: &str = "Note: To delete, you need to use the Sheets API with OAuth. For now, manually delete the row in Google Sheets and refresh.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    /// The service answered with an `error.message`.
    #[error("{0}")]
    Remote(String),
    #[error("{}", UNSUPPORTED_DELETE_MESSAGE)]
    Unsupported,
    /// The request never produced a usable response.
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
}

/// Row-oriented contact storage.
///
/// Writes report only success or failure. Callers learn server-assigned
/// state (new row numbers in particular) by calling [`RowStore::list`] again.
#[allow(async_fn_in_trait)]
pub trait RowStore {
    /// All contact rows, in sheet order.
    async fn list(&self) -> Result<Vec<Contact>, SheetError>;

    /// Add one row after the last used row.
    async fn append(&self, draft: &ContactDraft) -> Result<(), SheetError>;

    /// Overwrite all three cells of `row_index`.
    async fn update(&self, row_index: u32, draft: &ContactDraft) -> Result<(), SheetError>;

    /// Row deletion is never attempted.
    async fn delete(&self, row_index: u32) -> Result<(), SheetError> {
        log::info!("Delete of row {} refused: not supported with an API key", row_index);
        Err(SheetError::Unsupported)
    }
}
