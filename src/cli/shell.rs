//! Interactive session: the list view and the preview side by side in one terminal.
use std::io::{stdout, Write};

use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    cli::editor::open_editor_for_content, Config, ListView, PreviewView, Result, TemplateId,
    TemplatePatch, TemplateStore,
};

const HELP: &str = "\
Commands:
  add <title>       create a template and select it
  select <id>       select a template
  type <text>       replace the selected content (\\n for a line break)
  edit              edit the selected content in $EDITOR
  delete [id]       delete a template (default: the selected one)
  list              show the template list
  preview           show the phone preview
  fetch [url]       replace all templates with a server's list
  help              show this help
  quit              leave the shell";

/// A parsed shell input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add(String),
    Select(TemplateId),
    Type(String),
    Edit,
    Delete(Option<TemplateId>),
    List,
    Preview,
    Fetch(Option<String>),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = match line.trim_start().split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line.trim(), ""),
        };
        let arg = rest.trim();

        let parse_id = |value: &str| {
            value
                .parse::<TemplateId>()
                .map_err(|_| ShellCommand::Invalid(format!("'{}' is not a template id", value)))
        };

        match word {
            "" => ShellCommand::Empty,
            "add" => ShellCommand::Add(arg.to_string()),
            "select" => parse_id(arg).map_or_else(|e| e, ShellCommand::Select),
            // Keep the text as typed; only the separator after the word is dropped
            "type" => ShellCommand::Type(rest.replace("\\n", "\n")),
            "edit" => ShellCommand::Edit,
            "delete" if arg.is_empty() => ShellCommand::Delete(None),
            "delete" => parse_id(arg).map_or_else(|e| e, |id| ShellCommand::Delete(Some(id))),
            "list" | "ls" => ShellCommand::List,
            "preview" => ShellCommand::Preview,
            "fetch" => ShellCommand::Fetch((!arg.is_empty()).then(|| arg.to_string())),
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => ShellCommand::Invalid(format!("Unknown command '{}'. Try 'help'.", other)),
        }
    }
}

/// Runs the shell until `quit` or end of input. Must be called inside a `LocalSet`.
pub async fn run_shell(store: &TemplateStore, config: &Config) -> Result<()> {
    let list = ListView::new(store.clone(), config.debounce_delay());
    let preview = PreviewView::new(store.clone());

    println!("{}", list.output());
    println!("{}", preview.output());
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ShellCommand::parse(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Invalid(message) => println!("{}", message),
            ShellCommand::List => println!("{}", list.output()),
            ShellCommand::Preview => println!("{}", preview.output()),
            ShellCommand::Add(title) => {
                if list.submit_title(&title) {
                    print_views(&list, &preview);
                } else {
                    println!("A title is required.");
                }
            }
            ShellCommand::Select(id) => {
                list.click(id);
                print_views(&list, &preview);
            }
            ShellCommand::Type(text) => {
                if store.get_selected_template().is_none() {
                    println!("Select a template first.");
                } else {
                    list.edit_content(&text);
                }
            }
            ShellCommand::Edit => {
                list.commit_pending().await;
                match store.get_selected_template() {
                    Some(template) => {
                        match open_editor_for_content(config, &template.title, &template.content) {
                            Ok(content) => {
                                store.update_template(template.id, TemplatePatch::content(content));
                                println!("{}", preview.output());
                            }
                            Err(e) => println!("{}", e),
                        }
                    }
                    None => println!("Select a template first."),
                }
            }
            ShellCommand::Delete(id) => {
                list.commit_pending().await;
                match id.or(store.get_state().selected_template_id) {
                    Some(id) => {
                        store.delete_template(id);
                        print_views(&list, &preview);
                    }
                    None => println!("Nothing to delete."),
                }
            }
            ShellCommand::Fetch(url) => match url.or_else(|| config.server_url.clone()) {
                Some(url) => {
                    if store.load_templates_from_server(&url).await {
                        print_views(&list, &preview);
                    } else {
                        println!("Could not load templates from {}", url);
                    }
                }
                None => println!("No URL given and no server_url configured."),
            },
        }
    }

    if list.has_pending_edit() {
        debug!("Waiting for the last edit before leaving");
        list.commit_pending().await;
    }
    info!("Shell closed");
    Ok(())
}

fn print_views(list: &ListView, preview: &PreviewView) {
    println!("{}", list.output());
    println!("{}", preview.output());
}
