use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use sheetbook::core::{ContactField, FilterField, SortField};
use sheetbook::message::Message;

use crate::AppSession;
use crate::table;

const HELP: &str = "\
Commands:
  search [TERM]            filter contacts (no term clears the search)
  filter all|name|email|notes
  sort name|email          sort by a column, again to reverse
  add                      open the add form
  edit ROW                 open the edit form for a sheet row
  set name|email|notes VALUE
  save                     submit the open form
  cancel                   close the form
  delete ROW
  refresh                  reload from the sheet
  setup SHEET_ID API_KEY   connect to a sheet
  reset                    forget the sheet and key
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    View(Message),
    Setup { sheet_id: String, api_key: String },
    Reset,
    Show,
    Help,
    Quit,
}

fn parse_row(arg: &str) -> Result<u32, String> {
    arg.trim()
        .parse::<u32>()
        .map_err(|_| format!("`{}` is not a row number", arg.trim()))
}

fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" | "list" | "ls" => ShellCommand::Show,
        "search" | "/" => ShellCommand::View(Message::SetSearch(rest.to_string())),
        "filter" => ShellCommand::View(Message::SetFilterField(rest.parse::<FilterField>()?)),
        "sort" => ShellCommand::View(Message::SetSort(rest.parse::<SortField>()?)),
        "add" | "new" => ShellCommand::View(Message::BeginAdd),
        "edit" => ShellCommand::View(Message::BeginEdit(parse_row(rest)?)),
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = field.parse::<ContactField>()?;
            ShellCommand::View(Message::SetFormField(field, value.trim().to_string()))
        }
        "save" | "submit" => ShellCommand::View(Message::Submit),
        "cancel" => ShellCommand::View(Message::CancelForm),
        "delete" | "rm" => ShellCommand::View(Message::RequestDelete(parse_row(rest)?)),
        "refresh" | "reload" => ShellCommand::View(Message::Refresh),
        "setup" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(sheet_id), Some(api_key)) => ShellCommand::Setup {
                    sheet_id: sheet_id.to_string(),
                    api_key: api_key.to_string(),
                },
                _ => return Err("usage: setup SHEET_ID API_KEY".to_string()),
            }
        }
        "reset" => ShellCommand::Reset,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command `{}` (try `help`)", other)),
    };
    Ok(command)
}

fn render(session: &mut AppSession) {
    match session.view_mut() {
        Some(view) => {
            view.expire_status(chrono::Local::now());
            println!("{}", table::render(view));
            if let Some(form) = table::render_form(view) {
                println!("\n{}", form);
            }
        }
        None => {
            println!("Not connected. Create a sheet with headers Name, Email, Notes in row 1,");
            println!("then run `setup SHEET_ID API_KEY` with a Google Cloud API key.");
        }
    }
    if let Some(status) = session.status_text() {
        println!("» {}", status);
    }
}

fn prompt() {
    print!("sheetbook> ");
    let _ = std::io::stdout().flush();
}

pub async fn run(session: &mut AppSession) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render(session);
    prompt();

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Help) => println!("{}", HELP),
            Ok(ShellCommand::Show) => render(session),
            Ok(ShellCommand::Setup { sheet_id, api_key }) => {
                if let Err(e) = session.save_configuration(&sheet_id, &api_key).await {
                    println!("{}", e);
                }
                render(session);
            }
            Ok(ShellCommand::Reset) => {
                if let Err(e) = session.reset_configuration().await {
                    println!("{}", e);
                }
                render(session);
            }
            Ok(ShellCommand::View(message)) => match session.view_mut() {
                Some(view) => {
                    log::debug!("shell: {:?}", message);
                    view.update(message).await;
                    render(session);
                }
                None => println!("Not connected. Run `setup SHEET_ID API_KEY` first."),
            },
            Err(e) => println!("{}", e),
        }
        prompt();
    }

    Ok(())
}
