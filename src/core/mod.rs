pub mod contact;
pub mod query;

pub use contact::{Contact, ContactDraft, ContactField, FilterField, SortDirection, SortField};
pub use query::{ContactQuery, derive_visible};
