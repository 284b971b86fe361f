use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use sheetbook::core::SortField;
use sheetbook::sync::RowStore;
use sheetbook::view::{ContactView, FormMode};

const NOTES_WIDTH: usize = 48;

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

fn header(label: &str, arrow: Option<&str>) -> String {
    match arrow {
        Some(arrow) => format!("{} {}", label, arrow),
        None => label.to_string(),
    }
}

/// Contact table, empty-state line and count, as shown after every command.
pub fn render<S: RowStore>(view: &ContactView<S>) -> String {
    let visible = view.visible_contacts();
    let mut out = String::new();

    if visible.is_empty() {
        out.push_str(view.empty_state_text());
        out.push('\n');
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Row".to_string(),
                header("Name", view.sort_indicator(SortField::Name)),
                header("Email", view.sort_indicator(SortField::Email)),
                "Notes".to_string(),
            ]);
        for contact in &visible {
            table.add_row(vec![
                contact.row_index.to_string(),
                contact.name.clone(),
                contact.email.clone(),
                truncate(&contact.notes, NOTES_WIDTH),
            ]);
        }
        out.push_str(&table.to_string());
        out.push('\n');
    }

    let query = view.query();
    out.push_str(&format!("{} contacts", view.total_count()));
    if !query.search.is_empty() {
        out.push_str(&format!(
            " ({} matching \"{}\" in {})",
            visible.len(),
            query.search,
            query.filter_field
        ));
    }
    out
}

/// The open add/edit form, if any.
pub fn render_form<S: RowStore>(view: &ContactView<S>) -> Option<String> {
    let form = view.form();
    let title = match form.mode {
        FormMode::Closed => return None,
        FormMode::Adding => "Add New Contact".to_string(),
        FormMode::Editing(row) => format!("Edit Contact (row {})", row),
    };
    Some(format!(
        "{}\n  name:  {}\n  email: {}\n  notes: {}\n(`set <field> <value>`, `save`, `cancel`)",
        title, form.draft.name, form.draft.email, form.draft.notes
    ))
}
