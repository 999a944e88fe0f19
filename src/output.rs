//! Colored status reporting for dof
//!
//! Everything here writes to stderr; stdout is reserved for the dry-run
//! command lines so that `dof ... > script.sh` stays clean.

use owo_colors::OwoColorize;

/// Environment variable that enables `debug` traces.
pub const DEBUG_ENV: &str = "DOF_DEBUG";

/// Print an info message (cyan)
pub fn info(message: &str) {
    eprintln!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Whether debug tracing was requested through `DOF_DEBUG`.
pub fn debug_enabled() -> bool {
    std::env::var_os(DEBUG_ENV).is_some_and(|v| !v.is_empty() && v != "0")
}

/// Print a debug trace, only when `DOF_DEBUG` is set.
pub fn debug(message: &str) {
    if debug_enabled() {
        eprintln!("{} {}", "[dof:debug]".dimmed(), message);
    }
}

/// Print a recipe line for `dof -l`.
pub fn recipe_item(name: &str, template: &str) {
    println!("{}: {}", name.green(), template);
}
