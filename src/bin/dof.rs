//! dof - run commands for each element of a list
//!
//! Usage:
//!   dof [items] [-x globs] [-g regexes] [-X dirs] do [command]
//!   dof --<recipe>
//!   dof -l

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use dof::cli::{self, Action};
use dof::config::Recipes;
use dof::executor::ShellRunner;
use dof::expand::Registry;
use dof::{output, pipeline, DofError, Pipeline};

#[derive(Parser)]
#[command(name = "dof")]
#[command(about = "dof (do-for) run commands for each element of 'list'.")]
#[command(version)]
#[command(override_usage = "dof [list] [-x patterns] do [commands]")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Items, option clusters, and `do` followed by the command
    ///
    /// Options: -e execute, -f force non-stop, -p plain files only,
    /// -d directories only, -r recursive, -x exclude globs, -g exclude
    /// regexes, -X exclude directories (with -r), -s first..last[..step]
    /// add a sequence, - read items from stdin, -l list recipes,
    /// --<recipe> run a recipe, -h help, -v version
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "WORDS")]
    words: Vec<String>,
}

fn command() -> clap::Command {
    Cli::command().after_help(cli::reference_text(Registry::standard()))
}

fn main() -> ExitCode {
    match run() {
        Ok(status) => ExitCode::from(exit_code_to_u8(status)),
        Err(err) => {
            output::error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<i32> {
    // clap eats the first bare `--`; supply one so a user's `--` stays a word.
    let mut args = std::env::args_os();
    let args = args
        .next()
        .into_iter()
        .chain(std::iter::once(OsString::from("--")))
        .chain(args);
    let matches = command().get_matches_from(args);
    let cli = Cli::from_arg_matches(&matches)?;

    let mut stdin = io::stdin().lock();
    let action = cli::parse_words(&cli.words, &mut stdin)?;

    match action {
        Action::Help => {
            command().print_long_help()?;
            Ok(0)
        }
        Action::Version => {
            println!("dof version {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Action::ListRecipes => {
            let recipes = Recipes::load()?;
            if recipes.is_empty() {
                output::info("no recipes defined (/etc/dof.conf, ~/.dofrc)");
            }
            for recipe in recipes.iter() {
                output::recipe_item(&recipe.name, &recipe.template);
            }
            Ok(0)
        }
        Action::Recipe { name, flags } => {
            let recipes = Recipes::load()?;
            let recipe = recipes
                .get(&name)
                .ok_or_else(|| DofError::RecipeNotFound(name.clone()))?;
            let exe = std::env::current_exe().context("cannot locate the dof executable")?;
            Ok(pipeline::run_recipe(recipe, &exe, flags, &mut ShellRunner))
        }
        Action::Run(inv) => {
            let pipeline = Pipeline::new(&inv)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let status = pipeline
                .run(&mut ShellRunner, &mut out)
                .context("running the pipeline")?;
            Ok(status)
        }
    }
}

/// Fit a command status into a process exit code. A failure never becomes 0.
fn exit_code_to_u8(status: i32) -> u8 {
    match status {
        0 => 0,
        s => u8::try_from(s.clamp(1, 255)).unwrap_or(u8::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_clamp() {
        assert_eq!(exit_code_to_u8(0), 0);
        assert_eq!(exit_code_to_u8(3), 3);
        assert_eq!(exit_code_to_u8(300), 255);
        assert_eq!(exit_code_to_u8(-1), 1);
    }

    #[test]
    fn test_cli_definition() {
        command().debug_assert();
    }
}
