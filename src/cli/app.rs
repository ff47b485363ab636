//! CLI module for the msgtmpl application
//!
//! This module handles the command-line interface for interacting with the
//! template store.
use std::{
    fs::read_to_string,
    io::{stdin, stdout, Write},
    path::PathBuf,
};

use log::info;

use crate::{
    cli::{editor::open_editor_for_content, shell::run_shell},
    content_preview, format_created_at, search_templates, Commands, Config, PreviewView,
    RemoteSource, Result, Template, TemplateId, TemplatePatch, TemplateStore, TmplError,
};

/// CLI Application handler - processes CLI commands against the template store
pub struct App {
    /// The template store
    store: TemplateStore,

    /// Application configuration
    config: Config,

    /// Where `config --set/--reset` writes to
    config_path: PathBuf,
}

impl App {
    /// Create a new CLI application with the given store and config
    pub fn new(store: TemplateStore, config: Config, config_path: PathBuf) -> Self {
        store.set_remote(RemoteSource::new(config.fetch_timeout()));
        Self {
            store,
            config,
            config_path,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Add {
                title,
                content,
                edit,
            } => self.handle_add(title, content, edit)?,

            Commands::List { json, limit } => self.handle_list(json, limit)?,

            Commands::Show { id } => self.handle_show(id)?,

            Commands::Update {
                id,
                content,
                file,
                edit,
            } => self.handle_update(id, content, file, edit)?,

            Commands::Delete { id, force } => self.handle_delete(id, force)?,

            Commands::Search { query, limit } => self.handle_search(&query, limit),

            Commands::Fetch { url, persist } => self.handle_fetch(url, persist).await?,

            Commands::Shell => run_shell(&self.store, &self.config).await?,

            Commands::Config { show, set, reset } => self.handle_config(show, set, reset)?,
        }

        Ok(())
    }

    fn find_template(&self, id: TemplateId) -> Result<Template> {
        self.store
            .get_state()
            .templates
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(TmplError::TemplateNotFound { id })
    }

    fn handle_add(&self, title: String, content: Option<String>, edit: bool) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TmplError::InvalidInput {
                message: "Template title must not be empty".to_string(),
            });
        }
        if content.is_some() && edit {
            return Err(TmplError::InvalidInput {
                message: "Cannot specify both --content and --edit options".to_string(),
            });
        }

        let content = match content {
            Some(c) => Some(c),
            None if edit => Some(open_editor_for_content(&self.config, title, "")?),
            None => None,
        };

        let id = self.store.add_template(title);
        if let Some(content) = content {
            self.store.update_template(id, TemplatePatch::content(content));
        }

        println!("Template created with ID: {}", id);
        Ok(())
    }

    fn handle_list(&self, json: bool, limit: usize) -> Result<()> {
        let mut templates = self.store.get_state().templates;
        if limit > 0 && templates.len() > limit {
            templates.truncate(limit);
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&templates)?);
            return Ok(());
        }

        if templates.is_empty() {
            println!("No templates yet. Create one with `msgtmpl add <TITLE>`.");
            return Ok(());
        }

        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, template) in templates.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }
            println!(
                "ID: {} | Created: {}",
                template.id,
                format_created_at(&template.created_at)
            );
            println!("Title: {}", console::style(&template.title).bold());

            let preview = content_preview(&template.content, 60);
            if !preview.is_empty() {
                println!("{}", console::style(preview).dim());
            }
        }

        println!(
            "\n{} template{}",
            templates.len(),
            if templates.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn handle_show(&self, id: TemplateId) -> Result<()> {
        let template = self.find_template(id)?;
        let preview = PreviewView::new(self.store.clone());
        self.store.select_template(template.id);

        println!("{}", console::style(&template.title).bold());
        println!("{}", preview.output());
        Ok(())
    }

    fn handle_update(
        &self,
        id: TemplateId,
        content: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
    ) -> Result<()> {
        let sources = [content.is_some(), file.is_some(), edit];
        match sources.iter().filter(|given| **given).count() {
            0 => {
                return Err(TmplError::InvalidInput {
                    message: "Specify one of --content, --file or --edit".to_string(),
                })
            }
            1 => {}
            _ => {
                return Err(TmplError::InvalidInput {
                    message: "--content, --file and --edit are mutually exclusive".to_string(),
                })
            }
        }

        let template = self.find_template(id)?;
        let new_content = match (content, file) {
            (Some(c), _) => c,
            (_, Some(file_path)) => {
                if !file_path.exists() {
                    return Err(TmplError::InvalidInput {
                        message: format!("File not found: {}", file_path.display()),
                    });
                }
                read_to_string(file_path)?
            }
            (None, None) => {
                open_editor_for_content(&self.config, &template.title, &template.content)?
            }
        };

        self.store
            .update_template(id, TemplatePatch::content(new_content));
        println!("Template {} updated.", id);
        Ok(())
    }

    fn handle_delete(&self, id: TemplateId, force: bool) -> Result<()> {
        let template = self.find_template(id)?;

        if !force {
            println!("You are about to delete the following template:");
            println!("ID:      {}", template.id);
            println!("Title:   {}", template.title);
            println!("Created: {}", format_created_at(&template.created_at));

            let preview = content_preview(&template.content, 60);
            if !preview.is_empty() {
                println!("\nContent preview:\n{}", preview);
            }

            println!("\nThis action cannot be undone!");
            print!("Are you sure you want to delete this template? [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;

            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        self.store.delete_template(id);
        println!(
            "Template '{}' ({}) has been permanently deleted.",
            template.title, template.id
        );
        Ok(())
    }

    fn handle_search(&self, query: &str, limit: usize) {
        let mut results = search_templates(&self.store.get_state().templates, query);
        if limit > 0 && results.len() > limit {
            results.truncate(limit);
        }

        if results.is_empty() {
            println!("No templates found matching query: \"{}\"", query);
            return;
        }

        for template in &results {
            println!(
                "#{}  {}  {}",
                template.id,
                console::style(&template.title).bold(),
                console::style(content_preview(&template.content, 40)).dim()
            );
        }
        println!("\nFound {} matching templates.", results.len());
    }

    async fn handle_fetch(&self, url: Option<String>, persist: bool) -> Result<()> {
        let url = url
            .or_else(|| self.config.server_url.clone())
            .ok_or_else(|| TmplError::ConfigError {
                message: "No URL given and no server_url configured".to_string(),
            })?;

        if !self.store.load_templates_from_server(&url).await {
            return Err(TmplError::Network {
                url,
                message: "see log for details".to_string(),
            });
        }

        let count = self.store.get_state().templates.len();
        if persist {
            self.store.flush()?;
            println!("Fetched and saved {} templates from {}", count, url);
        } else {
            println!(
                "Fetched {} templates from {} (not saved; use --persist to keep them)",
                count, url
            );
        }
        Ok(())
    }

    fn handle_config(&mut self, show: bool, set: Option<String>, reset: bool) -> Result<()> {
        let changing = reset || set.is_some();
        if reset {
            self.config = Config::default();
            self.config.save(&self.config_path)?;
            println!("Configuration reset to defaults.");
        }

        if let Some(assignment) = set {
            self.config.set(&assignment)?;
            self.config.save(&self.config_path)?;
            info!("Applied configuration change: {}", assignment);
        }

        if show || !changing {
            println!("Config file: {}", self.config_path.display());
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }
}
