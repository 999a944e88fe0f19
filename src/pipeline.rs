//! The pipeline: selection, expansion, and execution for one invocation.
//!
//! Everything the run needs is built once from the parsed `Invocation`:
//! regexes and directory globs are compiled here so that a bad pattern fails
//! before any command is printed or run.

use std::io::Write;
use std::path::Path;

use crate::cli::Invocation;
use crate::config::Recipe;
use crate::error::DofError;
use crate::executor::{shell_quote, CommandRunner, Executor};
use crate::expand::Template;
use crate::output;
use crate::select::{FileFilter, Pattern, Selection};
use crate::walk;

/// Behaviour switches set by `-e -f -p -d -r`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Run commands instead of printing them
    pub execute: bool,
    /// Keep going after a failing command
    pub force: bool,
    /// Plain files only
    pub plain_only: bool,
    /// Directories only
    pub dirs_only: bool,
    /// Repeat in every subdirectory
    pub recursive: bool,
}

impl Flags {
    /// The command-line options that reproduce these flags, each followed
    /// by a space.
    pub fn options(&self) -> String {
        [
            (self.execute, "-e "),
            (self.force, "-f "),
            (self.plain_only, "-p "),
            (self.dirs_only, "-d "),
            (self.recursive, "-r "),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, opt)| *opt)
        .collect()
    }

    fn file_filter(&self) -> FileFilter {
        FileFilter {
            plain_only: self.plain_only,
            dirs_only: self.dirs_only,
        }
    }
}

/// A ready-to-run pipeline.
#[derive(Debug)]
pub struct Pipeline {
    flags: Flags,
    selection: Selection,
    dir_exclude: Vec<glob::Pattern>,
    template: Template,
}

impl Pipeline {
    /// Compile the invocation. Fails on the first bad regex or directory glob.
    pub fn new(inv: &Invocation) -> Result<Self, DofError> {
        let include = inv.include.iter().map(Pattern::classify).collect();
        let exclude = inv.exclude.iter().map(Pattern::classify).collect();
        let regex_exclude: Vec<Pattern> = inv.regex_exclude.iter().map(Pattern::regex).collect();
        let selection = Selection::new(
            include,
            exclude,
            &regex_exclude,
            inv.flags.file_filter(),
        )?;

        let dir_exclude = inv
            .dir_exclude
            .iter()
            .map(|text| {
                glob::Pattern::new(text).map_err(|source| DofError::InvalidDirPattern {
                    pattern: text.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !dir_exclude.is_empty() && !inv.flags.recursive {
            output::warning("-X has no effect without -r");
        }

        Ok(Self {
            flags: inv.flags,
            selection,
            dir_exclude,
            template: Template::new(inv.template()),
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Run in the current directory, or in every directory below it with
    /// `-r`. Returns the last non-zero command status, or 0.
    pub fn run(
        &self,
        runner: &mut dyn CommandRunner,
        out: &mut dyn Write,
    ) -> Result<i32, DofError> {
        if self.flags.recursive {
            walk::walk(Path::new("."), &self.dir_exclude, self.flags.force, |_| {
                self.run_here(runner, out)
            })
        } else {
            self.run_here(runner, out)
        }
    }

    /// Select items relative to the current directory and process them.
    pub fn run_here(
        &self,
        runner: &mut dyn CommandRunner,
        out: &mut dyn Write,
    ) -> Result<i32, DofError> {
        let items = self.selection.select();
        Executor::new(&self.template, self.flags, runner, out).run(&items)
    }
}

/// The shell command that replays `recipe` through the `dof` binary at `exe`
/// with `flags`.
pub fn recipe_command(recipe: &Recipe, exe: &Path, flags: Flags) -> String {
    format!(
        "{} {}{}",
        shell_quote(exe.display()),
        flags.options(),
        recipe.template
    )
}

/// Run `recipe` with `flags` and return its exit status.
pub fn run_recipe(
    recipe: &Recipe,
    exe: &Path,
    flags: Flags,
    runner: &mut dyn CommandRunner,
) -> i32 {
    let command = recipe_command(recipe, exe, flags);
    output::debug(&format!("recipe {}: {}", recipe.name, command));
    runner.run(&command)
}
