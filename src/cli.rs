//! Command-line word scanner.
//!
//! `clap` collects the raw words; this module gives them meaning. Before
//! `do`, words are items or option clusters; each of `-x`, `-g`, `-X`
//! switches the list that later words go to. After `do`, every word is part
//! of the command template.

use std::io::BufRead;

use crate::error::DofError;
use crate::expand::Registry;
use crate::output;
use crate::paths;
use crate::pipeline::Flags;
use crate::sequence;

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(Invocation),
    Recipe { name: String, flags: Flags },
    ListRecipes,
    Help,
    Version,
}

/// A parsed invocation, before any pattern is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub flags: Flags,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub regex_exclude: Vec<String>,
    pub dir_exclude: Vec<String>,
    /// Command words after `do`, if `do` was given
    pub commands: Option<Vec<String>>,
}

impl Invocation {
    /// The command template: the words after `do` joined by spaces, or `%f`.
    pub fn template(&self) -> String {
        match &self.commands {
            Some(words) => words.join(" "),
            None => "%f".to_string(),
        }
    }

    fn add(&mut self, stage: Stage, word: String) {
        match stage {
            Stage::Items => {
                if !paths::is_dots(paths::filename(&word)) {
                    self.include.push(word);
                }
            }
            Stage::Exclude => self.exclude.push(word),
            Stage::ExcludeRegex => self.regex_exclude.push(word),
            Stage::ExcludeDirs => self.dir_exclude.push(word),
            Stage::Commands => self.commands.get_or_insert_with(Vec::new).push(word),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Items,
    Exclude,
    ExcludeRegex,
    ExcludeDirs,
    Commands,
}

/// Scan the argument words. A lone `-` reads items from `stdin`.
pub fn parse_words(words: &[String], stdin: &mut dyn BufRead) -> Result<Action, DofError> {
    let mut inv = Invocation::default();
    let mut stage = Stage::Items;
    let mut pending_sequence = false;

    for word in words {
        if pending_sequence {
            for value in sequence::parse(word)?.values() {
                inv.add(stage, value);
            }
            pending_sequence = false;
            continue;
        }

        if stage == Stage::Commands {
            inv.add(stage, word.clone());
            continue;
        }

        if word == "do" {
            stage = Stage::Commands;
            inv.commands.get_or_insert_with(Vec::new);
            continue;
        }

        if word == "-" {
            for line in read_lines(stdin)? {
                inv.add(stage, line);
            }
            continue;
        }

        if let Some(name) = word.strip_prefix("--") {
            return Ok(match name {
                "help" => Action::Help,
                "version" => Action::Version,
                _ => Action::Recipe {
                    name: name.to_string(),
                    flags: inv.flags,
                },
            });
        }

        let Some(cluster) = word.strip_prefix('-') else {
            inv.add(stage, word.clone());
            continue;
        };
        for opt in cluster.chars() {
            match opt {
                'e' => inv.flags.execute = true,
                'f' => inv.flags.force = true,
                'p' => inv.flags.plain_only = true,
                'd' => inv.flags.dirs_only = true,
                'r' => inv.flags.recursive = true,
                'x' => stage = Stage::Exclude,
                'g' => stage = Stage::ExcludeRegex,
                'X' => stage = Stage::ExcludeDirs,
                's' => pending_sequence = true,
                'l' => return Ok(Action::ListRecipes),
                'h' => return Ok(Action::Help),
                'v' => return Ok(Action::Version),
                other => return Err(DofError::UnknownOption(other)),
            }
        }
    }

    if pending_sequence {
        return Err(DofError::MissingSequence);
    }
    Ok(Action::Run(inv))
}

/// Read item lines from `input`, without their line endings. Empty lines
/// are dropped; lines that are not valid UTF-8 are reported and skipped.
fn read_lines(input: &mut dyn BufRead) -> Result<Vec<String>, DofError> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = buf
            .strip_suffix(b"\n")
            .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
            .unwrap_or(&buf[..]);
        if line.is_empty() {
            continue;
        }
        match std::str::from_utf8(line) {
            Ok(text) => lines.push(text.to_string()),
            Err(_) => output::warning(&format!(
                "skipping stdin line that is not valid UTF-8: {}",
                String::from_utf8_lossy(line)
            )),
        }
    }
    Ok(lines)
}

const MODIFIERS: &[(&str, &str)] = &[
    ("l<c>", "keep the text before the first <c> (lf<c>, ll<c>: first, last)"),
    ("r<c>", "keep the text after the first <c> (rf<c>, rl<c>: first, last)"),
    ("ls<str>", "keep the text before the first <str>"),
    ("rs<str>", "keep the text after the first <str>"),
    ("t<a><b>", "replace every <a> with <b>"),
    ("s/pat/rep/[g]", "replace pat with rep, every occurrence with g"),
];

/// The variables and modifiers section of `dof -h`.
pub fn reference_text(registry: &Registry) -> String {
    let mut text = String::from("Variables:\n");
    for var in registry.iter() {
        text.push_str(&format!("  %{:<14}{}\n", var.name, var.description));
    }
    text.push_str("\nModifiers (chained with ':' after a variable, e.g. %{b}:lf_):\n");
    for (syntax, description) in MODIFIERS {
        text.push_str(&format!("  {:<15}{}\n", syntax, description));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn parse(line: &str) -> Result<Action, DofError> {
        parse_words(&words(line), &mut "".as_bytes())
    }

    fn invocation(line: &str) -> Invocation {
        match parse(line).unwrap() {
            Action::Run(inv) => inv,
            other => panic!("expected a run, got {:?}", other),
        }
    }

    #[test]
    fn test_items_and_commands() {
        let inv = invocation("1.txt 2.log do echo %b.%e");
        assert_eq!(inv.include, vec!["1.txt", "2.log"]);
        assert_eq!(inv.template(), "echo %b.%e");
    }

    #[test]
    fn test_default_template_without_do() {
        let inv = invocation("*.c");
        assert_eq!(inv.commands, None);
        assert_eq!(inv.template(), "%f");
    }

    #[test]
    fn test_empty_command_after_do() {
        let inv = invocation("a do");
        assert_eq!(inv.template(), "");
    }

    #[test]
    fn test_flags_and_clusters() {
        let inv = invocation("-ef -p -r x");
        assert_eq!(
            inv.flags,
            Flags {
                execute: true,
                force: true,
                plain_only: true,
                dirs_only: false,
                recursive: true,
            }
        );
        assert_eq!(inv.include, vec!["x"]);
    }

    #[test]
    fn test_list_switches() {
        let inv = invocation("* -x *.o -g ~$ -X .git target do rm %f");
        assert_eq!(inv.include, vec!["*"]);
        assert_eq!(inv.exclude, vec!["*.o"]);
        assert_eq!(inv.regex_exclude, vec!["~$"]);
        assert_eq!(inv.dir_exclude, vec![".git", "target"]);
        assert_eq!(inv.template(), "rm %f");
    }

    #[test]
    fn test_words_after_do_are_literal() {
        let inv = invocation("a do ls -l do -x");
        assert_eq!(inv.template(), "ls -l do -x");
        assert_eq!(inv.flags, Flags::default());
    }

    #[test]
    fn test_dots_are_dropped() {
        let inv = invocation(". .. src/.. a");
        assert_eq!(inv.include, vec!["a"]);
    }

    #[test]
    fn test_sequence_goes_to_current_list() {
        let inv = invocation("-s 1..3 -x -s 2..2");
        assert_eq!(inv.include, vec!["1", "2", "3"]);
        assert_eq!(inv.exclude, vec!["2"]);
    }

    #[test]
    fn test_sequence_errors() {
        assert!(matches!(parse("-s"), Err(DofError::MissingSequence)));
        assert!(matches!(parse("-s 1-3"), Err(DofError::InvalidSequence(_))));
    }

    #[test]
    fn test_stdin_items() {
        let mut input = "one\n\ntwo\r\nthree".as_bytes();
        let action = parse_words(&words("- do cat %f"), &mut input).unwrap();
        let Action::Run(inv) = action else {
            panic!("expected a run");
        };
        assert_eq!(inv.include, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_stdin_skips_invalid_utf8_lines() {
        let mut input: &[u8] = b"ok\n\xff\nalso ok\n";
        let action = parse_words(&words("-"), &mut input).unwrap();
        let Action::Run(inv) = action else {
            panic!("expected a run");
        };
        assert_eq!(inv.include, vec!["ok", "also ok"]);
    }

    #[test]
    fn test_recipe_carries_flags() {
        assert_eq!(
            parse("-e --to-ogg ignored").unwrap(),
            Action::Recipe {
                name: "to-ogg".into(),
                flags: Flags {
                    execute: true,
                    ..Flags::default()
                },
            }
        );
    }

    #[test]
    fn test_bare_double_dash_is_a_recipe_name() {
        assert_eq!(
            parse("a -- b").unwrap(),
            Action::Recipe {
                name: String::new(),
                flags: Flags::default(),
            }
        );
    }

    #[test]
    fn test_info_actions() {
        assert_eq!(parse("-h").unwrap(), Action::Help);
        assert_eq!(parse("--help").unwrap(), Action::Help);
        assert_eq!(parse("-v").unwrap(), Action::Version);
        assert_eq!(parse("--version").unwrap(), Action::Version);
        assert_eq!(parse("a -l").unwrap(), Action::ListRecipes);
    }

    #[test]
    fn test_reference_text_lists_variables() {
        let text = reference_text(Registry::standard());
        for name in ["%f", "%b", "%d", "%e", "%home"] {
            assert!(text.contains(name), "missing {}", name);
        }
        assert!(text.contains("s/pat/rep/[g]"));
    }

    #[test]
    fn test_unknown_option() {
        assert!(matches!(parse("-eq"), Err(DofError::UnknownOption('q'))));
    }
}
