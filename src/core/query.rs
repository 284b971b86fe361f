use std::cmp::Ordering;

use super::contact::{Contact, FilterField, SortDirection, SortField};

/// Search and ordering applied to the loaded contact list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactQuery {
    pub search: String,
    pub filter_field: FilterField,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl ContactQuery {
    /// Toggle direction on the active field, or switch to `field` ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
    }
}

/// Case-insensitive substring match of `search` against the selected fields.
/// An empty term matches every contact.
pub fn matches(contact: &Contact, search: &str, filter_field: FilterField) -> bool {
    let needle = search.to_lowercase();
    filter_field
        .fields()
        .iter()
        .any(|&f| contact.field(f).to_lowercase().contains(&needle))
}

pub fn filter_contacts(contacts: &[Contact], search: &str, filter_field: FilterField) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| matches(c, search, filter_field))
        .cloned()
        .collect()
}

/// Case-insensitive comparison on one field. Descending reverses the result,
/// so equal keys stay in list order either way.
pub fn compare(a: &Contact, b: &Contact, field: SortField, direction: SortDirection) -> Ordering {
    let key = field.as_field();
    let ordering = a.field(key).to_lowercase().cmp(&b.field(key).to_lowercase());
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

pub fn sort_contacts(contacts: &mut [Contact], field: SortField, direction: SortDirection) {
    // sort_by is stable: ties keep the order the sheet returned them in
    contacts.sort_by(|a, b| compare(a, b, field, direction));
}

/// The filtered and sorted projection shown to the user.
pub fn derive_visible(contacts: &[Contact], query: &ContactQuery) -> Vec<Contact> {
    let mut visible = filter_contacts(contacts, &query.search, query.filter_field);
    sort_contacts(&mut visible, query.sort_field, query.sort_direction);
    visible
}
