//! Terminal host for the file browser.
//!
//! Run with:
//! ```bash
//! DROPBOX_APP_KEY=... cargo run -p core-service --example dropbox_shell
//! ```
//!
//! Sign-in opens the system browser. After approving, paste the URL Dropbox
//! redirected to (it carries `?code=...`) back into the shell.

use anyhow::Context;
use core_runtime::config::AppConfig;
use core_runtime::logging::init_logging;
use core_service::{bootstrap_desktop, Command, Confirmation, OutputMode};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  search <query>        search files by name and content
  folders <query>       search folders only
  ls [path]             list a folder
  open <n>              open entry n of the current listing
  edit                  toggle edit mode (text read until a line with a single '.')
  save                  upload the open file
  new <name>            create a file in the current folder
  mv <n> <new name>     rename entry n
  rm <n>                delete entry n (asks first)
  copy                  copy the open file to the clipboard
  mode view|clipboard   what opening a file does
  show                  print the open file
  clear                 close the open file
  logout                sign out
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("reading configuration")?;
    init_logging(config.logging.clone()).context("initializing logging")?;

    let redirect_uri = config.redirect_uri.clone();
    let (browser, navigator) = bootstrap_desktop(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut events = browser.events().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if event.is_failure() {
                tracing::warn!(?event, "Operation failed");
            }
        }
    });

    if browser.is_setup_required() {
        println!("{}", browser.status().await);
        return Ok(());
    }

    println!("{}", browser.execute(Command::SignIn).await);
    println!("Paste the URL Dropbox redirected you to ({}...):", redirect_uri);
    let Some(url) = lines.next_line().await? else {
        return Ok(());
    };
    navigator.set_current_url(url.trim())?;
    println!("{}", browser.execute(Command::CompleteSignIn).await);
    println!("{}", HELP);

    let mut editing = false;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match verb {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            "search" => Command::search(rest),
            "folders" => Command::Search {
                query: rest.to_string(),
                folders_only: true,
            },
            "ls" => Command::ListFolder {
                path: rest.to_string(),
            },
            "open" => match entry(&browser, rest).await {
                Some(entry) => Command::Open {
                    path: entry.path,
                    name: entry.name,
                    is_folder: entry.is_folder,
                },
                None => continue,
            },
            "edit" if !editing => {
                editing = true;
                browser.execute(Command::BeginEdit).await;
                println!("Enter the new text, end with '.' on its own line:");
                let mut text = Vec::new();
                while let Some(line) = lines.next_line().await? {
                    if line == "." {
                        break;
                    }
                    text.push(line);
                }
                Command::UpdateEdit {
                    text: text.join("\n"),
                }
            }
            "edit" => {
                editing = false;
                Command::EndEdit
            }
            "save" => {
                editing = false;
                Command::Save
            }
            "new" => Command::CreateFile {
                name: rest.to_string(),
                content: String::new(),
            },
            "mv" => {
                let (index, new_name) = rest.split_once(' ').unwrap_or((rest, ""));
                match entry(&browser, index).await {
                    Some(entry) => Command::Rename {
                        path: entry.path,
                        new_name: new_name.to_string(),
                    },
                    None => continue,
                }
            }
            "rm" => match entry(&browser, rest).await {
                Some(entry) => {
                    println!("Delete \"{}\"? [y/N]", entry.name);
                    let answer = lines.next_line().await?;
                    let confirmation = match answer.as_deref().map(str::trim) {
                        Some("y") | Some("Y") => Confirmation::Confirmed,
                        Some(_) => Confirmation::Declined,
                        None => Confirmation::Dismissed,
                    };
                    Command::Delete {
                        path: entry.path,
                        confirmation,
                    }
                }
                None => continue,
            },
            "copy" => Command::CopyContent,
            "mode" => Command::SetOutputMode {
                mode: if rest == "clipboard" {
                    OutputMode::Clipboard
                } else {
                    OutputMode::View
                },
            },
            "show" => {
                let state = browser.state().await;
                match (state.open_file, state.edit_buffer) {
                    (Some(file), Some(buffer)) => println!("{} (editing)\n{}", file.name, buffer),
                    (Some(file), None) => println!("{}\n{}", file.name, file.content),
                    (None, _) => println!("No file open"),
                }
                continue;
            }
            "clear" => Command::Clear,
            "logout" => Command::SignOut,
            other => {
                println!("Unknown command '{}'; try 'help'", other);
                continue;
            }
        };

        let status = browser.execute(command).await;
        if !status.is_empty() {
            println!("{}", status);
        }

        if matches!(verb, "search" | "folders" | "ls" | "open" | "mv" | "rm" | "new") {
            for (i, entry) in browser.state().await.listing.iter().enumerate() {
                let marker = if entry.is_folder { "/" } else { "" };
                println!("{:>3}  {}{}", i, entry.name, marker);
            }
        }
    }

    Ok(())
}

async fn entry(
    browser: &core_service::FileBrowser,
    index: &str,
) -> Option<provider_dropbox::ListingEntry> {
    let listing = browser.state().await.listing;
    let entry = index.parse::<usize>().ok().and_then(|i| listing.get(i).cloned());
    if entry.is_none() {
        println!("No entry '{}' in the current listing", index);
    }
    entry
}
