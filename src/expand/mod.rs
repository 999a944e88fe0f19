//! Template expansion - turns a command template into a command line per item.
//!
//! Escapes recognised in a template:
//!
//! ```text
//! %%  %'  %"  %\     the literal character
//! %~                 the home directory
//! %name[:mod...]     variable, modifiers run up to the next whitespace
//! %{expr} %(expr) %[expr]
//!                    expression up to the closing bracket; a `:` right
//!                    after the bracket continues the modifier chain
//! 'text'             copied verbatim without the quotes (unquote mode)
//! ```
//!
//! Anything else after `%` is copied through unchanged.

pub mod eval;
pub mod modifier;
pub mod registry;

pub use eval::evaluate;
pub use registry::{Registry, Variable};

use crate::output;

/// A command template, parsed lazily on every expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    unquote: bool,
}

impl Template {
    /// Create a template with unquote mode enabled.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            unquote: true,
        }
    }

    /// Enable or disable single-quote stripping.
    pub fn unquote(mut self, unquote: bool) -> Self {
        self.unquote = unquote;
        self
    }

    /// The raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Expand the template for `item` using the standard variables.
    pub fn expand(&self, item: &str) -> String {
        self.expand_with(item, Registry::standard())
    }

    /// Expand the template for `item` using `registry`.
    ///
    /// Unknown variables are reported on stderr and expand to nothing.
    pub fn expand_with(&self, item: &str, registry: &Registry) -> String {
        let src = self.source.as_str();
        let mut out = String::with_capacity(src.len() + item.len());
        let mut in_quote = false;
        let mut pos = 0;

        while let Some(c) = src[pos..].chars().next() {
            pos += c.len_utf8();

            if self.unquote {
                if in_quote {
                    if c == '\'' {
                        in_quote = false;
                    } else {
                        out.push(c);
                    }
                    continue;
                }
                if c == '\'' {
                    in_quote = true;
                    continue;
                }
            }

            if c != '%' {
                out.push(c);
                continue;
            }

            let rest = &src[pos..];
            let Some(next) = rest.chars().next() else {
                out.push('%');
                break;
            };
            match next {
                '%' | '\'' | '"' | '\\' => {
                    out.push(next);
                    pos += 1;
                }
                '~' => {
                    pos += 1;
                    substitute("home", item, registry, &mut out);
                }
                '{' | '(' | '[' => {
                    let close = closing(next);
                    let body = &rest[1..];
                    let (expr_len, consumed) = match body.find(close) {
                        Some(idx) => (idx, idx + 1),
                        None => (body.len(), body.len()),
                    };
                    let tail = modifier_tail(&body[consumed..]);
                    let expr = format!("{}{}", &body[..expr_len], tail);
                    pos += 1 + consumed + tail.len();
                    substitute(&expr, item, registry, &mut out);
                }
                ch if ch.is_ascii_alphanumeric() => {
                    let name_len = rest
                        .find(|c: char| !c.is_ascii_alphanumeric())
                        .unwrap_or(rest.len());
                    let tail = modifier_tail(&rest[name_len..]);
                    let expr = &rest[..name_len + tail.len()];
                    pos += expr.len();
                    substitute(expr, item, registry, &mut out);
                }
                _ => out.push('%'),
            }
        }
        out
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

/// Expand `template` for `item` with unquote mode and the standard variables.
pub fn expand(template: &str, item: &str) -> String {
    Template::new(template).expand(item)
}

fn closing(open: char) -> char {
    match open {
        '{' => '}',
        '(' => ')',
        _ => ']',
    }
}

/// The `:...` modifier text at the start of `text`, up to the next whitespace.
fn modifier_tail(text: &str) -> &str {
    if !text.starts_with(':') {
        return "";
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    &text[..end]
}

fn substitute(expr: &str, item: &str, registry: &Registry, out: &mut String) {
    match evaluate(expr, item, registry) {
        Ok(value) => out.push_str(&value),
        Err(err) => output::warning(&err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_escapes_is_identity() {
        for text in ["echo hello", "", "a b  c", "tab\tand ünïcode", "50 percent"] {
            assert_eq!(expand(text, "item"), text);
        }
    }

    #[test]
    fn test_single_letter_variables() {
        assert_eq!(expand("%f", "a/b.txt"), "a/b.txt");
        assert_eq!(expand("%b", "a/b.txt"), "b");
        assert_eq!(expand("%d", "a/b.txt"), "a");
        assert_eq!(expand("%e", "a/b.txt"), "txt");
    }

    #[test]
    fn test_adjacent_variables() {
        assert_eq!(expand("echo %b.%e", "1.txt"), "echo 1.txt");
        assert_eq!(expand("mv %f %d/%b.bak", "src/x.c"), "mv src/x.c src/x.bak");
    }

    #[test]
    fn test_literal_escapes() {
        assert_eq!(expand("100%%", "x"), "100%");
        assert_eq!(expand("say %'hi%'", "x"), "say 'hi'");
        assert_eq!(expand("%\"%f%\"", "a b"), "\"a b\"");
        assert_eq!(expand("a%\\b", "x"), "a\\b");
    }

    #[test]
    fn test_braced_expression() {
        assert_eq!(expand("%{b:lf_}", "foo_bar.txt"), "foo");
        assert_eq!(expand("%(f:s/}/x/)", "a}b"), "axb");
        assert_eq!(expand("%[b]-x", "k.c"), "k-x");
    }

    #[test]
    fn test_modifier_after_closing_bracket() {
        assert_eq!(expand("%{b}:lf_", "foo_bar.txt"), "foo");
        assert_eq!(expand("%{b}:lf_ done", "foo_bar.txt"), "foo done");
    }

    #[test]
    fn test_modifiers_stop_at_whitespace() {
        assert_eq!(expand("%f:l. next", "a.b"), "a next");
        // the whole word belongs to the chain; brackets end it earlier
        assert_eq!(expand("cp %f %b:t_-.o", "x/my_file.c"), "cp x/my_file.c my-file");
        assert_eq!(
            expand("cp %f %{b:t_-}.orig", "x/my_file.c"),
            "cp x/my_file.c my-file.orig"
        );
    }

    #[test]
    fn test_unknown_variable_expands_to_nothing() {
        assert_eq!(expand("[%zz]", "x"), "[]");
        assert_eq!(expand("a %{nope} b", "x"), "a  b");
    }

    #[test]
    fn test_unrecognised_escape_is_copied() {
        assert_eq!(expand("%-x", "i"), "%-x");
        assert_eq!(expand("end%", "i"), "end%");
        assert_eq!(expand("% f", "i"), "% f");
    }

    #[test]
    fn test_unterminated_bracket_takes_the_rest() {
        assert_eq!(expand("%{f", "abc"), "abc");
    }

    #[test]
    fn test_single_quotes_suppress_escapes() {
        assert_eq!(expand("printf '%s\\n' %f", "x"), "printf %s\\n x");
        assert_eq!(expand("'%f' %f", "x"), "%f x");
    }

    #[test]
    fn test_quotes_kept_without_unquote() {
        let tpl = Template::new("echo '%f'").unquote(false);
        assert_eq!(tpl.expand("x"), "echo 'x'");
    }

    #[test]
    fn test_home_shortcut() {
        let home = Registry::standard().get("home").unwrap().evaluate("");
        assert_eq!(expand("%~/bin", "x"), format!("{}/bin", home));
    }

    #[test]
    fn test_expansion_is_not_length_bounded() {
        let item = "x".repeat(100_000);
        let out = expand("%f %f %f", &item);
        assert_eq!(out.len(), 3 * 100_000 + 2);
    }
}
