//! Modifiers: post-processing steps chained after a variable with `:`.
//!
//! ```text
//! l[f|l]<c>     keep the text before the first (default) or last <c>
//! ls<string>    keep the text before the first <string>
//! r[f|l]<c>     keep the text after the first (default) or last <c>
//! rs<string>    keep the text after the first <string>
//! t<a><b>       replace every <a> with <b> (more pairs may follow)
//! s/pat/rep/[g] replace the first (or, with g, every) pat with rep
//! ```
//!
//! A target that is not found leaves the buffer untouched.

use crate::output;

/// Upper bound on replacements done by a global `s` modifier.
pub const MAX_SUBSTITUTIONS: usize = 4096;

/// Which part of the buffer survives a truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Keep the text before the match
    Left,
    /// Keep the text after the match
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// `l`/`r` with one or more single characters, applied in turn
    Truncate {
        side: Side,
        occurrence: Occurrence,
        targets: Vec<char>,
    },
    /// `ls`/`rs` with a multi-character needle
    TruncateAt { side: Side, needle: String },
    /// `t`: single-pass character transliteration
    Transliterate(Vec<(char, char)>),
    /// `s`: literal search and replace
    Replace {
        pattern: String,
        replacement: String,
        global: bool,
    },
}

impl Modifier {
    /// Apply the modifier to `buf` in place.
    pub fn apply(&self, buf: &mut String) {
        match self {
            Modifier::Truncate {
                side,
                occurrence,
                targets,
            } => {
                for &c in targets {
                    let found = match occurrence {
                        Occurrence::First => buf.find(c),
                        Occurrence::Last => buf.rfind(c),
                    };
                    if let Some(idx) = found {
                        cut(buf, *side, idx, c.len_utf8());
                    }
                }
            }
            Modifier::TruncateAt { side, needle } => {
                if let Some(idx) = buf.find(needle.as_str()) {
                    cut(buf, *side, idx, needle.len());
                }
            }
            Modifier::Transliterate(pairs) => {
                if pairs.iter().any(|&(from, _)| buf.contains(from)) {
                    *buf = buf
                        .chars()
                        .map(|c| {
                            pairs
                                .iter()
                                .find(|&&(from, _)| from == c)
                                .map_or(c, |&(_, to)| to)
                        })
                        .collect();
                }
            }
            Modifier::Replace {
                pattern,
                replacement,
                global,
            } => {
                if pattern.is_empty() || !buf.contains(pattern.as_str()) {
                    return;
                }
                let count = if *global { MAX_SUBSTITUTIONS } else { 1 };
                *buf = buf.replacen(pattern.as_str(), replacement, count);
            }
        }
    }
}

fn cut(buf: &mut String, side: Side, idx: usize, len: usize) {
    match side {
        Side::Left => buf.truncate(idx),
        Side::Right => {
            buf.drain(..idx + len);
        }
    }
}

/// Parse the modifier chain that follows a variable name.
///
/// `text` is whatever follows the name, normally starting with `:`. Parsing
/// stops at the first segment that does not start with `:`; unknown modifier
/// letters are reported and skipped.
pub fn parse_chain(text: &str) -> Vec<Modifier> {
    let mut mods = Vec::new();
    let mut rest = text;
    while let Some(segment) = rest.strip_prefix(':') {
        let (modifier, remaining) = parse_one(segment);
        mods.extend(modifier);
        rest = remaining;
    }
    if !rest.is_empty() {
        output::debug(&format!("ignoring trailing text after modifiers: {}", rest));
    }
    mods
}

/// Parse a single modifier; returns it and the unparsed remainder, which is
/// either empty or starts with `:`.
fn parse_one(segment: &str) -> (Option<Modifier>, &str) {
    let mut chars = segment.chars();
    let Some(kind) = chars.next() else {
        return (None, "");
    };
    if kind == 's' {
        return parse_replace(chars.as_str());
    }

    let (body, remaining) = split_segment(chars.as_str());
    let modifier = match kind {
        'l' => parse_truncate(Side::Left, body),
        'r' => parse_truncate(Side::Right, body),
        't' => parse_transliterate(body),
        other => {
            output::warning(&format!("unknown modifier `{}{}'", other, body));
            None
        }
    };
    (modifier, remaining)
}

fn split_segment(text: &str) -> (&str, &str) {
    match text.find(':') {
        Some(idx) => text.split_at(idx),
        None => (text, ""),
    }
}

fn parse_truncate(side: Side, body: &str) -> Option<Modifier> {
    let mut chars = body.chars();
    let first = chars.next()?;
    let tail = chars.as_str();
    let modifier = match first {
        's' if !tail.is_empty() => Modifier::TruncateAt {
            side,
            needle: tail.to_string(),
        },
        'f' if !tail.is_empty() => Modifier::Truncate {
            side,
            occurrence: Occurrence::First,
            targets: tail.chars().collect(),
        },
        'l' if !tail.is_empty() => Modifier::Truncate {
            side,
            occurrence: Occurrence::Last,
            targets: tail.chars().collect(),
        },
        _ => Modifier::Truncate {
            side,
            occurrence: Occurrence::First,
            targets: body.chars().collect(),
        },
    };
    Some(modifier)
}

fn parse_transliterate(body: &str) -> Option<Modifier> {
    let chars: Vec<char> = body.chars().collect();
    let pairs: Vec<(char, char)> = chars
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    if pairs.is_empty() {
        return None;
    }
    Some(Modifier::Transliterate(pairs))
}

/// `s<mark><pat><mark><repl><mark>[g]`. The fields are bounded by the mark,
/// so they may contain `:`.
fn parse_replace(text: &str) -> (Option<Modifier>, &str) {
    let mut chars = text.chars();
    let Some(mark) = chars.next() else {
        return (None, "");
    };
    let (pattern, after_pattern) = split_field(chars.as_str(), mark);
    let (replacement, after_replacement) = match after_pattern {
        Some(rest) => split_field(rest, mark),
        None => ("", None),
    };
    let tail = after_replacement.unwrap_or("");
    let global = tail.starts_with('g');
    let (_, remaining) = split_segment(tail);

    let modifier = Modifier::Replace {
        pattern: pattern.to_string(),
        replacement: replacement.to_string(),
        global,
    };
    (Some(modifier), remaining)
}

fn split_field(text: &str, mark: char) -> (&str, Option<&str>) {
    match text.find(mark) {
        Some(idx) => (&text[..idx], Some(&text[idx + mark.len_utf8()..])),
        None => (text, None),
    }
}

/// Apply every modifier of `chain` to `buf`, left to right.
pub fn apply_chain(chain: &[Modifier], buf: &mut String) {
    for modifier in chain {
        modifier.apply(buf);
    }
}
