//! Item selection - include patterns, exclusions, and file-type filtering.
//!
//! Order of operations:
//! 1. include entries, globs expanded in place
//! 2. glob/literal excludes (expanded the same way, then removed by exact match)
//! 3. regex excludes
//! 4. plain-file / directory attribute check
//!
//! The include order is preserved; nothing is re-sorted.

use std::fs;

use glob::MatchOptions;
use regex::{Regex, RegexBuilder};

use crate::error::DofError;
use crate::output;
use crate::paths;

/// How a pattern string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Literal,
    Glob,
    Regex,
}

/// A pattern string, classified once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    text: String,
    kind: PatternKind,
}

impl Pattern {
    /// Classify `text` as a glob if it has metacharacters, else a literal.
    pub fn classify(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = if paths::is_glob_pattern(&text) {
            PatternKind::Glob
        } else {
            PatternKind::Literal
        };
        Self { text, kind }
    }

    /// A pattern that came from the regex list.
    pub fn regex(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: PatternKind::Regex,
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// The items this pattern stands for: glob matches, or the literal itself.
    pub fn items(&self) -> Vec<String> {
        match self.kind {
            PatternKind::Literal => vec![self.text.clone()],
            PatternKind::Glob => expand_glob(&self.text),
            PatternKind::Regex => Vec::new(),
        }
    }

    /// Compile a regex pattern (POSIX extended flavour, `.` stops at newlines).
    pub fn compile(&self) -> Result<Regex, DofError> {
        RegexBuilder::new(&self.text)
            .multi_line(true)
            .build()
            .map_err(|source| DofError::InvalidRegex {
                pattern: self.text.clone(),
                source,
            })
    }
}

/// Which file types survive the attribute check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileFilter {
    pub plain_only: bool,
    pub dirs_only: bool,
}

impl FileFilter {
    fn is_active(&self) -> bool {
        self.plain_only || self.dirs_only
    }

    /// Stat `item` and check it against the filter. A failed stat never
    /// matches.
    pub fn accepts(&self, item: &str) -> bool {
        if !self.is_active() {
            return true;
        }
        match fs::metadata(item) {
            Ok(meta) => {
                !(self.plain_only && !meta.is_file()) && !(self.dirs_only && !meta.is_dir())
            }
            Err(err) => {
                output::debug(&format!("stat '{}' failed: {}", item, err));
                false
            }
        }
    }
}

/// Include/exclude rules for one invocation. Regexes are compiled up front.
#[derive(Debug, Clone)]
pub struct Selection {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    regexes: Vec<Regex>,
    filter: FileFilter,
}

impl Selection {
    /// Build the rules, failing on the first malformed regex.
    pub fn new(
        include: Vec<Pattern>,
        exclude: Vec<Pattern>,
        regex_exclude: &[Pattern],
        filter: FileFilter,
    ) -> Result<Self, DofError> {
        let regexes = regex_exclude
            .iter()
            .map(Pattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            include,
            exclude,
            regexes,
            filter,
        })
    }

    /// Produce the ordered item list, relative to the current directory.
    pub fn select(&self) -> Vec<String> {
        let mut items: Vec<String> = self.include.iter().flat_map(Pattern::items).collect();

        for pattern in &self.exclude {
            let victims = pattern.items();
            if !victims.is_empty() {
                items.retain(|item| !victims.contains(item));
            }
        }

        if !self.regexes.is_empty() {
            items.retain(|item| !self.regexes.iter().any(|re| re.is_match(item)));
        }

        items.retain(|item| self.filter.accepts(item));
        items
    }
}

/// Expand a glob pattern. `~` and `{a,b}` are expanded first; hidden files
/// need an explicit leading dot and `.`/`..` are never returned. No match
/// gives an empty list.
///
/// Directory entries whose names are not valid UTF-8 cannot be passed on as
/// items; they are reported and skipped.
pub fn expand_glob(pattern: &str) -> Vec<String> {
    let mut matches = Vec::new();
    for candidate in expand_braces(&expand_tilde(pattern)) {
        match glob_paths(&candidate) {
            Ok(found) => matches.extend(
                found
                    .into_iter()
                    .filter(|path| !paths::is_dots(paths::filename(path))),
            ),
            Err(err) => {
                output::warning(&format!("invalid glob pattern '{}': {}", candidate, err));
            }
        }
    }
    matches
}

/// Match `pattern` one path component at a time. Wildcard components are
/// matched against the directory listing, sorted by name; literal ones only
/// have to exist.
fn glob_paths(pattern: &str) -> Result<Vec<String>, glob::PatternError> {
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let (mut found, rest) = match pattern.strip_prefix('/') {
        Some(rest) => (vec!["/".to_string()], rest),
        None => (vec![String::new()], pattern),
    };
    let components: Vec<&str> = rest.split('/').collect();
    let last = components.len().saturating_sub(1);

    for (idx, component) in components.into_iter().enumerate() {
        if component.is_empty() {
            // `a//b` is `a/b`; a trailing `/` asks for directories
            if idx == last {
                found.retain(|path| fs::metadata(dir_of(path)).is_ok_and(|m| m.is_dir()));
            }
            continue;
        }

        if !paths::is_glob_pattern(component) {
            found = found
                .iter()
                .map(|base| join(base, component))
                .filter(|path| fs::symlink_metadata(path).is_ok())
                .collect();
            continue;
        }

        let matcher = glob::Pattern::new(component)?;
        let mut next = Vec::new();
        for base in &found {
            next.extend(
                list_dir(base)
                    .into_iter()
                    .filter(|name| matcher.matches_with(name, options))
                    .map(|name| join(base, &name)),
            );
        }
        found = next;
    }

    found.retain(|path| !path.is_empty());
    Ok(found)
}

/// The sorted UTF-8 entry names of `base`. Unreadable directories give
/// nothing.
fn list_dir(base: &str) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir_of(base)) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| match entry.file_name().into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                output::warning(&format!(
                    "skipping '{}' in '{}': name is not valid UTF-8",
                    raw.to_string_lossy(),
                    dir_of(base)
                ));
                None
            }
        })
        .collect();
    names.sort();
    names
}

fn dir_of(base: &str) -> &str {
    if base.is_empty() { "." } else { base }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

/// Replace a leading `~` or `~/` with the home directory.
fn expand_tilde(pattern: &str) -> String {
    let rest = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return pattern.to_string(),
    };
    match dirs::home_dir().as_deref().and_then(|home| home.to_str()) {
        Some(home) => format!("{}{}", home, rest),
        None => pattern.to_string(),
    }
}

/// Expand `{a,b,c}` alternatives, left to right, nested groups included.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut commas = Vec::new();
    for (idx, c) in pattern[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + idx);
                    break;
                }
            }
            ',' if depth == 1 => commas.push(open + idx),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };
    let head = &pattern[..open];
    let tail = &pattern[close + 1..];

    if commas.is_empty() {
        // `{x}` has no alternatives: keep it, expand what follows
        let kept = &pattern[..=close];
        return expand_braces(tail)
            .into_iter()
            .map(|t| format!("{}{}", kept, t))
            .collect();
    }

    let mut alternatives = Vec::with_capacity(commas.len() + 1);
    let mut start = open + 1;
    for comma in commas {
        alternatives.push(&pattern[start..comma]);
        start = comma + 1;
    }
    alternatives.push(&pattern[start..close]);

    alternatives
        .into_iter()
        .flat_map(|alt| expand_braces(&format!("{}{}{}", head, alt, tail)))
        .collect()
}
