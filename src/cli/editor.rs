//! Editing template content in an external editor.
use std::{
    fs::{read_to_string, OpenOptions},
    io::Write,
    path::Path,
    process::Command,
};

use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{Config, Result, TmplError};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

/// Opens the configured editor on `initial` content and returns what the user saved.
pub fn open_editor_for_content(config: &Config, title: &str, initial: &str) -> Result<String> {
    let temp_file = Builder::new().suffix(".txt").tempfile()?;
    let temp_path = temp_file.path().to_path_buf();

    let editor_cmd = config.get_editor_command();
    write_editor_template(&temp_path, title, initial)?;

    info!("Opening editor for '{}'. Save and exit when done...", title);
    launch_editor(&editor_cmd, &temp_path)?;

    let content = read_to_string(&temp_path)?;
    Ok(process_editor_content(&content))
}

fn write_editor_template(path: &Path, title: &str, initial: &str) -> Result<()> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;

    // A title containing the terminator would close the header early
    let title = title.replace(COMMENT_END, "-- >");
    writeln!(file, "{} Message template: {}", COMMENT_START, title)?;
    writeln!(
        file,
        "Lines that start with {} and end with {} are ignored.",
        COMMENT_START, COMMENT_END
    )?;
    writeln!(file, "Save and exit the editor when you're done. {}", COMMENT_END)?;
    write!(file, "{}", initial)?;

    Ok(())
}

fn launch_editor(editor_cmd: &str, file_path: &Path) -> Result<()> {
    let args = split(editor_cmd).map_err(|e| TmplError::EditorError {
        message: format!("Failed to parse editor command: {}", e),
    })?;

    let Some((program, rest)) = args.split_first() else {
        return Err(TmplError::EditorError {
            message: "Empty editor command".to_string(),
        });
    };

    let status = Command::new(program).args(rest).arg(file_path).status()?;
    if !status.success() {
        return Err(TmplError::EditorError {
            message: "Editor exited with non-zero status".to_string(),
        });
    }

    Ok(())
}

/// Drops the instruction header written by [`write_editor_template`].
fn process_editor_content(content: &str) -> String {
    let mut in_comment = false;
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with(COMMENT_START) {
                in_comment = !trimmed.ends_with(COMMENT_END);
                return false;
            }
            if in_comment {
                in_comment = !trimmed.ends_with(COMMENT_END);
                return false;
            }
            true
        })
        .collect();
    kept.join("\n")
}
