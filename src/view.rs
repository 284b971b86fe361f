use chrono::{DateTime, Local, TimeDelta};

use crate::core::{
    Contact, ContactDraft, ContactField, ContactQuery, FilterField, SortField, derive_visible,
};
use crate::message::Message;
use crate::sync::{RowStore, SheetError, UNSUPPORTED_DELETE_MESSAGE};

/// How long a settled status message stays up.
pub const STATUS_TTL_SECS: i64 = 3;

/// The single pending-operation slot. While `Loading`, new loads and writes
/// are refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    Idle,
    Loading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub posted_at: DateTime<Local>,
    /// Progress messages stay until the operation replaces them.
    pub transient: bool,
}

impl StatusMessage {
    fn is_expired(&self, now: DateTime<Local>) -> bool {
        self.transient && now - self.posted_at >= TimeDelta::seconds(STATUS_TTL_SECS)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Closed,
    Adding,
    /// Row captured when editing began. It is not checked again on submit.
    Editing(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub mode: FormMode,
    pub draft: ContactDraft,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Load,
    Add,
    Update,
    Delete,
}

fn failure_text(err: &SheetError, op: Operation) -> String {
    match err {
        SheetError::Remote(message) => format!("Error: {}", message),
        SheetError::Unsupported => UNSUPPORTED_DELETE_MESSAGE.to_string(),
        SheetError::Transport(detail) | SheetError::Decode(detail) => {
            let what = match op {
                Operation::Load => "loading contacts",
                Operation::Add => "adding contact",
                Operation::Update => "updating contact",
                Operation::Delete => "deleting contact",
            };
            format!("Error {}: {}", what, detail)
        }
    }
}

/// In-memory contact list plus everything the user is doing with it.
///
/// The list is never patched locally: every successful write is followed by
/// a full reload from the store.
pub struct ContactView<S> {
    store: S,
    contacts: Vec<Contact>,
    query: ContactQuery,
    status: Option<StatusMessage>,
    activity: Activity,
    form: ContactForm,
}

impl<S: RowStore> ContactView<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            contacts: Vec::new(),
            query: ContactQuery::default(),
            status: None,
            activity: Activity::Idle,
            form: ContactForm::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Contacts in sheet order, unfiltered.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn total_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn query(&self) -> &ContactQuery {
        &self.query
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn is_loading(&self) -> bool {
        self.activity == Activity::Loading
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    // --- Derived projection ---

    pub fn visible_contacts(&self) -> Vec<Contact> {
        derive_visible(&self.contacts, &self.query)
    }

    /// Header arrow for `field` when it is the active sort column.
    pub fn sort_indicator(&self, field: SortField) -> Option<&'static str> {
        (self.query.sort_field == field).then(|| self.query.sort_direction.arrow())
    }

    /// What to show when no contact is visible.
    pub fn empty_state_text(&self) -> &'static str {
        if self.is_loading() && self.contacts.is_empty() {
            "Loading contacts from Google Sheets..."
        } else if !self.query.search.is_empty() {
            "No contacts found matching your search"
        } else {
            "No contacts yet. Add one to get started!"
        }
    }

    // --- Local state ---

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
    }

    pub fn set_filter_field(&mut self, field: FilterField) {
        self.query.filter_field = field;
    }

    pub fn set_sort(&mut self, field: SortField) {
        self.query.toggle_sort(field);
    }

    pub fn begin_add(&mut self) {
        self.form = ContactForm {
            mode: FormMode::Adding,
            draft: ContactDraft::default(),
        };
    }

    pub fn begin_edit(&mut self, contact: &Contact) {
        self.form = ContactForm {
            mode: FormMode::Editing(contact.row_index),
            draft: contact.to_draft(),
        };
    }

    pub fn set_form_field(&mut self, field: ContactField, value: impl Into<String>) {
        self.form.draft.set(field, value.into());
    }

    pub fn cancel_form(&mut self) {
        self.form = ContactForm::default();
    }

    /// Drop the status message once its lifetime has passed.
    pub fn expire_status(&mut self, now: DateTime<Local>) {
        if self.status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.status = None;
        }
    }

    fn post_progress(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            posted_at: Local::now(),
            transient: false,
        });
    }

    fn post_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            posted_at: Local::now(),
            transient: true,
        });
    }

    fn try_begin(&mut self, what: &str) -> bool {
        if self.is_loading() {
            log::warn!("Ignoring {} while another sheet operation is in flight", what);
            return false;
        }
        self.activity = Activity::Loading;
        true
    }

    // --- Sheet operations ---

    /// Replace the contact list with a fresh read of the sheet.
    pub async fn reload(&mut self) -> bool {
        if !self.try_begin("refresh") {
            return false;
        }
        let loaded = self.fetch_contacts().await;
        self.activity = Activity::Idle;
        loaded
    }

    async fn fetch_contacts(&mut self) -> bool {
        self.post_progress("Loading contacts from Google Sheets...");
        match self.store.list().await {
            Ok(contacts) => {
                let count = contacts.len();
                self.contacts = contacts;
                self.post_status(format!("Loaded {} contacts", count));
                true
            }
            Err(e) => {
                log::error!("Contact load failed: {}", e);
                self.post_status(failure_text(&e, Operation::Load));
                false
            }
        }
    }

    /// Append the form buffer as a new row. A form with neither name nor
    /// email is ignored without touching the store.
    pub async fn submit_add(&mut self) -> bool {
        if self.form.draft.is_blank() {
            return false;
        }
        if !self.try_begin("add") {
            return false;
        }

        let draft = self.form.draft.clone();
        self.post_progress("Adding contact to Google Sheets...");
        let added = match self.store.append(&draft).await {
            Ok(()) => {
                self.post_status("Contact added successfully!");
                self.fetch_contacts().await;
                true
            }
            Err(e) => {
                log::error!("Contact append failed: {}", e);
                self.post_status(failure_text(&e, Operation::Add));
                false
            }
        };

        self.activity = Activity::Idle;
        self.form = ContactForm::default();
        added
    }

    /// Write the form buffer over the row recorded by [`Self::begin_edit`].
    /// The form is closed whatever the outcome.
    pub async fn submit_edit(&mut self) -> bool {
        let FormMode::Editing(row_index) = self.form.mode else {
            return false;
        };
        if !self.try_begin("update") {
            return false;
        }

        let draft = self.form.draft.clone();
        self.post_progress("Updating contact in Google Sheets...");
        let updated = match self.store.update(row_index, &draft).await {
            Ok(()) => {
                self.post_status("Contact updated successfully!");
                self.fetch_contacts().await;
                true
            }
            Err(e) => {
                log::error!("Contact update of row {} failed: {}", row_index, e);
                self.post_status(failure_text(&e, Operation::Update));
                false
            }
        };

        self.activity = Activity::Idle;
        self.form = ContactForm::default();
        updated
    }

    /// Deletion is not available; this only posts the guidance message.
    pub async fn request_delete(&mut self, row_index: u32) {
        if let Err(e) = self.store.delete(row_index).await {
            self.post_status(failure_text(&e, Operation::Delete));
        }
    }

    // --- Event entry point ---

    pub async fn update(&mut self, message: Message) {
        match message {
            Message::SetSearch(term) => self.set_search(term),
            Message::SetFilterField(field) => self.set_filter_field(field),
            Message::SetSort(field) => self.set_sort(field),

            Message::BeginAdd => self.begin_add(),
            Message::BeginEdit(row_index) => {
                match self.contacts.iter().find(|c| c.row_index == row_index).cloned() {
                    Some(contact) => self.begin_edit(&contact),
                    None => log::warn!("No loaded contact at row {}", row_index),
                }
            }
            Message::SetFormField(field, value) => self.set_form_field(field, value),
            Message::CancelForm => self.cancel_form(),
            Message::Submit => match self.form.mode {
                FormMode::Adding => {
                    self.submit_add().await;
                }
                FormMode::Editing(_) => {
                    self.submit_edit().await;
                }
                FormMode::Closed => {}
            },

            Message::Refresh => {
                self.reload().await;
            }
            Message::RequestDelete(row_index) => self.request_delete(row_index).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SortDirection, SortField};
    use crate::testing::FakeSheet;

    async fn loaded(rows: &[(&str, &str, &str)]) -> ContactView<FakeSheet> {
        let mut view = ContactView::new(FakeSheet::with_rows(rows));
        assert!(view.reload().await);
        view.store().clear_calls();
        view
    }

    #[tokio::test]
    async fn reload_maps_rows_from_row_two() {
        let view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        assert_eq!(
            view.visible_contacts(),
            vec![Contact {
                row_index: 2,
                name: "Alice".to_string(),
                email: "a@x.com".to_string(),
                notes: "vip".to_string(),
            }]
        );
        assert_eq!(view.status_text(), Some("Loaded 1 contacts"));
        assert_eq!(view.activity(), Activity::Idle);
    }

    #[tokio::test]
    async fn search_scenarios() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.update(Message::SetSearch("vip".to_string())).await;
        view.update(Message::SetFilterField(FilterField::All)).await;
        assert_eq!(view.visible_contacts().len(), 1);

        view.update(Message::SetSearch("bob".to_string())).await;
        assert!(view.visible_contacts().is_empty());
        assert_eq!(view.empty_state_text(), "No contacts found matching your search");
        assert_eq!(view.total_count(), 1);
        assert!(view.store().calls().is_empty());
    }

    #[tokio::test]
    async fn blank_add_makes_no_call() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.begin_add();
        view.set_form_field(ContactField::Notes, "just notes");
        assert!(!view.submit_add().await);
        assert!(view.store().calls().is_empty());
        assert_eq!(view.total_count(), 1);
        assert_eq!(view.form().mode, FormMode::Adding);
    }

    #[tokio::test]
    async fn add_appends_then_reloads() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.update(Message::BeginAdd).await;
        view.update(Message::SetFormField(ContactField::Name, "Bob".to_string())).await;
        view.update(Message::SetFormField(ContactField::Email, "bob@x.com".to_string())).await;
        view.update(Message::Submit).await;

        assert_eq!(view.store().calls(), vec!["append", "list"]);
        let bob = view
            .contacts()
            .iter()
            .find(|c| c.name == "Bob")
            .cloned()
            .unwrap();
        assert_eq!(bob.row_index, 3);
        assert_eq!(bob.email, "bob@x.com");
        assert_eq!(bob.notes, "");
        assert_eq!(view.form(), &ContactForm::default());
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn failed_add_keeps_list_and_reports_message() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.begin_add();
        view.set_form_field(ContactField::Name, "Bob");
        view.store().fail_with(SheetError::Remote("Quota exceeded".to_string()));

        assert!(!view.submit_add().await);
        assert_eq!(view.store().calls(), vec!["append"]);
        assert_eq!(view.status_text(), Some("Error: Quota exceeded"));
        assert_eq!(view.total_count(), 1);
        assert_eq!(view.form().mode, FormMode::Closed);
    }

    #[tokio::test]
    async fn transport_failure_on_load_is_generic_and_recoverable() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.store().fail_with(SheetError::Transport("connection refused".to_string()));

        assert!(!view.reload().await);
        assert_eq!(view.status_text(), Some("Error loading contacts: connection refused"));
        assert_eq!(view.total_count(), 1);

        assert!(view.reload().await);
        assert_eq!(view.status_text(), Some("Loaded 1 contacts"));
    }

    #[tokio::test]
    async fn edit_overwrites_only_the_recorded_row() {
        let mut view = loaded(&[
            ("Alice", "a@x.com", "vip"),
            ("Bob", "bob@x.com", ""),
            ("Carol", "carol@x.com", "friend"),
        ])
        .await;

        view.update(Message::BeginEdit(3)).await;
        assert_eq!(view.form().mode, FormMode::Editing(3));
        assert_eq!(view.form().draft, ContactDraft::new("Bob", "bob@x.com", ""));

        view.set_form_field(ContactField::Notes, "met at conference");
        assert!(view.submit_edit().await);

        assert_eq!(view.store().calls(), vec!["update 3", "list"]);
        let contacts = view.contacts();
        assert_eq!(contacts[0].notes, "vip");
        assert_eq!(contacts[1].notes, "met at conference");
        assert_eq!(contacts[1].name, "Bob");
        assert_eq!(contacts[2].name, "Carol");
        assert_eq!(view.status_text(), Some("Loaded 3 contacts"));
        assert_eq!(view.form().mode, FormMode::Closed);
    }

    #[tokio::test]
    async fn edit_uses_stale_row_when_sheet_shifted() {
        let mut view = loaded(&[("Alice", "a@x.com", ""), ("Bob", "bob@x.com", "")]).await;
        let bob = view.contacts()[1].clone();
        view.begin_edit(&bob);

        // Someone inserts a row above Bob directly in the sheet.
        view.store()
            .rows
            .borrow_mut()
            .insert(0, ContactDraft::new("Zed", "z@x.com", ""));

        view.set_form_field(ContactField::Name, "Robert");
        assert!(view.submit_edit().await);
        let names: Vec<&str> = view.contacts().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Robert", "Bob"]);
    }

    #[tokio::test]
    async fn failed_edit_closes_form_and_keeps_list() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.update(Message::BeginEdit(2)).await;
        view.set_form_field(ContactField::Name, "Alicia");
        view.store().fail_with(SheetError::Decode("bad json".to_string()));

        assert!(!view.submit_edit().await);
        assert_eq!(view.store().calls(), vec!["update 2"]);
        assert_eq!(view.status_text(), Some("Error updating contact: bad json"));
        assert_eq!(view.contacts()[0].name, "Alice");
        assert_eq!(view.form(), &ContactForm::default());
    }

    #[tokio::test]
    async fn submit_edit_without_edit_form_does_nothing() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.begin_add();
        assert!(!view.submit_edit().await);
        view.update(Message::BeginEdit(99)).await;
        assert_eq!(view.form().mode, FormMode::Adding);
        assert!(view.store().calls().is_empty());
    }

    #[tokio::test]
    async fn delete_only_posts_guidance() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.update(Message::RequestDelete(2)).await;
        assert_eq!(view.status_text(), Some(UNSUPPORTED_DELETE_MESSAGE));
        assert!(view.store().calls().is_empty());
        assert_eq!(view.total_count(), 1);
    }

    #[tokio::test]
    async fn operations_are_refused_while_loading() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.begin_add();
        view.set_form_field(ContactField::Name, "Bob");
        view.activity = Activity::Loading;

        assert!(!view.submit_add().await);
        assert!(!view.reload().await);
        assert!(view.store().calls().is_empty());
        assert_eq!(view.form().draft.name, "Bob");
    }

    #[tokio::test]
    async fn sort_messages_toggle_direction() {
        let mut view = loaded(&[("bob", "", ""), ("Alice", "", ""), ("carol", "", "")]).await;
        let names = |v: &ContactView<FakeSheet>| -> Vec<String> {
            v.visible_contacts().into_iter().map(|c| c.name).collect()
        };
        assert_eq!(names(&view), vec!["Alice", "bob", "carol"]);
        assert_eq!(view.sort_indicator(SortField::Name), Some("↑"));
        assert_eq!(view.sort_indicator(SortField::Email), None);

        view.update(Message::SetSort(SortField::Name)).await;
        assert_eq!(view.query().sort_direction, SortDirection::Desc);
        assert_eq!(names(&view), vec!["carol", "bob", "Alice"]);
        assert_eq!(view.sort_indicator(SortField::Name), Some("↓"));

        view.update(Message::SetSort(SortField::Email)).await;
        assert_eq!(view.query().sort_field, SortField::Email);
        assert_eq!(view.query().sort_direction, SortDirection::Asc);
    }

    #[tokio::test]
    async fn settled_status_expires_after_ttl() {
        let mut view = loaded(&[]).await;
        assert_eq!(view.status_text(), Some("Loaded 0 contacts"));
        assert_eq!(view.empty_state_text(), "No contacts yet. Add one to get started!");

        let posted = view.status().unwrap().posted_at;
        view.expire_status(posted + TimeDelta::seconds(1));
        assert!(view.status().is_some());
        view.expire_status(posted + TimeDelta::seconds(STATUS_TTL_SECS));
        assert!(view.status().is_none());
    }

    #[tokio::test]
    async fn progress_status_does_not_expire() {
        let mut view = ContactView::new(FakeSheet::default());
        view.post_progress("Loading contacts from Google Sheets...");
        let posted = view.status().unwrap().posted_at;
        view.expire_status(posted + TimeDelta::seconds(60));
        assert_eq!(view.status_text(), Some("Loading contacts from Google Sheets..."));
    }

    #[tokio::test]
    async fn cancel_form_discards_buffer() {
        let mut view = loaded(&[("Alice", "a@x.com", "vip")]).await;
        view.update(Message::BeginEdit(2)).await;
        view.update(Message::SetFormField(ContactField::Email, "new@x.com".to_string())).await;
        view.update(Message::CancelForm).await;
        assert_eq!(view.form(), &ContactForm::default());
        view.update(Message::Submit).await;
        assert!(view.store().calls().is_empty());
        assert_eq!(view.contacts()[0].email, "a@x.com");
    }
}
