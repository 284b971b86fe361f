use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod shell;
mod table;

use sheetbook::app::Session;
use sheetbook::config::{self, AppConfig, LocalConfigProvider, SheetCredentials};
use sheetbook::core::{ContactField, FilterField, SortField};
use sheetbook::sync::SheetError;
use sheetbook::sync::sheets::SheetsClient;
use sheetbook::view::ContactView;

type AppSession = Session<
    LocalConfigProvider,
    SheetsClient,
    Box<dyn Fn(&SheetCredentials) -> Result<SheetsClient, SheetError>>,
>;

#[derive(Parser, Debug)]
#[command(name = "sheetbook", version, about = "Contacts kept in a Google Sheet")]
struct Cli {
    /// Log at debug level regardless of the config file
    #[arg(long, global = true)]
    debug: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store the sheet id and API key
    Setup { sheet_id: String, api_key: String },
    /// Forget the stored sheet id and API key
    Reset,
    /// Print contacts
    List {
        /// Case-insensitive search term
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, name, email or notes
        #[arg(short, long, default_value = "all")]
        field: FilterField,
        /// name or email
        #[arg(long, default_value = "name")]
        sort: SortField,
        #[arg(long)]
        desc: bool,
    },
    /// Append a contact
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Overwrite the contact at a sheet row
    Edit {
        row: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show how to delete a contact
    Delete { row: u32 },
    /// Interactive mode (default)
    Shell,
}

fn init_logging(debug: bool) {
    // Logs go to the systemd user journal (`journalctl --user -t sheetbook -f`).
    // Wrapper filters: sheetbook at info/debug, everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("sheetbook") {
                let max = if sheetbook::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    sheetbook::set_debug_logging(debug);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("sheetbook".to_string()),
        Err(e) => {
            if debug {
                eprintln!("journal logging unavailable: {}", e);
            }
            return;
        }
    };

    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

fn connector(app_config: &AppConfig) -> Box<dyn Fn(&SheetCredentials) -> Result<SheetsClient, SheetError>> {
    let api_base = app_config.api_base.clone();
    let sheet_name = app_config.sheet_name.clone();
    Box::new(move |creds: &SheetCredentials| -> Result<SheetsClient, SheetError> {
        Ok(SheetsClient::new(&creds.sheet_id, &creds.api_key)?
            .with_api_base(&api_base)
            .with_sheet_name(&sheet_name))
    })
}

fn require_view(session: &mut AppSession) -> Result<&mut ContactView<SheetsClient>, Box<dyn std::error::Error>> {
    if !session.is_configured() {
        let reason = session
            .status_text()
            .map(|s| format!("{}\n", s))
            .unwrap_or_default();
        return Err(format!(
            "{}No sheet configured. Run `sheetbook setup <SHEET_ID> <API_KEY>` first.",
            reason
        )
        .into());
    }
    session
        .view_mut()
        .ok_or_else(|| "No sheet configured".into())
}

/// Print the view's status and fail if the last operation did not go through.
fn finish(view: &ContactView<SheetsClient>, ok: bool) -> Result<(), Box<dyn std::error::Error>> {
    let status = view.status_text().unwrap_or_default().to_string();
    if ok {
        if !status.is_empty() {
            println!("{}", status);
        }
        Ok(())
    } else {
        Err(status.into())
    }
}

async fn run(cli: Cli, provider: LocalConfigProvider, app_config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut session: AppSession = Session::start(provider, connector(&app_config)).await;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Setup { sheet_id, api_key } => {
            let saved = session.save_configuration(&sheet_id, &api_key).await?;
            if let Some(status) = session.status_text() {
                println!("{}", status);
            }
            if !saved {
                return Err("Configuration not saved".into());
            }
        }
        Command::Reset => {
            session.reset_configuration().await?;
            println!("Configuration cleared");
        }
        Command::List { search, field, sort, desc } => {
            let view = require_view(&mut session)?;
            view.set_search(search);
            view.set_filter_field(field);
            if view.query().sort_field != sort {
                view.set_sort(sort);
            }
            if desc {
                view.set_sort(sort);
            }
            println!("{}", table::render(view));
        }
        Command::Add { name, email, notes } => {
            let view = require_view(&mut session)?;
            view.begin_add();
            view.set_form_field(ContactField::Name, name);
            view.set_form_field(ContactField::Email, email);
            view.set_form_field(ContactField::Notes, notes);
            if view.form().draft.is_blank() {
                return Err("A contact needs a name or an email".into());
            }
            let added = view.submit_add().await;
            finish(view, added)?;
        }
        Command::Edit { row, name, email, notes } => {
            let view = require_view(&mut session)?;
            let contact = view
                .contacts()
                .iter()
                .find(|c| c.row_index == row)
                .cloned()
                .ok_or_else(|| format!("No contact at row {}", row))?;
            view.begin_edit(&contact);
            for (field, value) in [
                (ContactField::Name, name),
                (ContactField::Email, email),
                (ContactField::Notes, notes),
            ] {
                if let Some(value) = value {
                    view.set_form_field(field, value);
                }
            }
            let updated = view.submit_edit().await;
            finish(view, updated)?;
        }
        Command::Delete { row } => {
            let view = require_view(&mut session)?;
            view.request_delete(row).await;
            if let Some(status) = view.status_text() {
                println!("{}", status);
            }
        }
        Command::Shell => shell::run(&mut session).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let provider = LocalConfigProvider::new(cli.config.clone().unwrap_or_else(config::default_config_path));
    let app_config = provider.app_config().unwrap_or_else(|e| {
        eprintln!("{}: {}", provider.path().display(), e);
        AppConfig::default()
    });

    init_logging(cli.debug || app_config.debug_logging);
    log::info!("Using config {}", provider.path().display());

    run(cli, provider, app_config).await
}
