use crate::core::{ContactField, FilterField, SortField};

/// User events fed into [`crate::view::ContactView::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Search and ordering
    SetSearch(String),
    SetFilterField(FilterField),
    SetSort(SortField),

    // Add/edit form
    BeginAdd,
    /// Open the form on the contact at this sheet row.
    BeginEdit(u32),
    SetFormField(ContactField, String),
    CancelForm,
    Submit,

    // Sheet
    Refresh,
    RequestDelete(u32),
}
