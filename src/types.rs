//! Core data structures for the msgtmpl application.
//!
//! This module contains the application state snapshot and the CLI
//! subcommand definitions.
use std::path::PathBuf;

use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::{Template, TemplateId, TmplError};

/// A specialized Result type for msgtmpl operations.
pub type Result<T> = std::result::Result<T, TmplError>;

/// The canonical snapshot held by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    /// Templates, newest first
    pub templates: Vec<Template>,
    /// Lookup key into `templates`; may dangle after external loads
    pub selected_template_id: Option<TemplateId>,
}

/// Available subcommands for the msgtmpl application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new template
    Add {
        /// Title of the template
        title: String,

        /// Initial message content
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,
    },

    /// List templates, newest first
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,

        /// Limit the number of templates shown (0 shows all)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,
    },

    /// Show the phone preview of a template
    Show {
        /// ID of the template to preview
        id: TemplateId,
    },

    /// Replace the content of a template
    Update {
        /// ID of the template to update
        id: TemplateId,

        /// New content
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the new content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,
    },

    /// Delete a template by ID
    Delete {
        /// ID of the template to delete
        id: TemplateId,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Search templates by title or content
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Replace all templates with a list fetched from a server
    Fetch {
        /// URL returning a JSON array of templates (defaults to the configured server_url)
        url: Option<String>,

        /// Save the fetched templates to storage
        #[clap(short, long)]
        persist: bool,
    },

    /// Interactive session with the template list and live preview
    Shell,

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
