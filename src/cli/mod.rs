mod app;
mod args;
mod editor;
mod shell;

pub use app::App;
pub use args::Cli;
pub use shell::{run_shell, ShellCommand};
