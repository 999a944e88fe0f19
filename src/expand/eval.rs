//! Expression evaluation: `name[:modifier]*` against one item.

use crate::error::ExpandError;

use super::modifier;
use super::registry::Registry;

/// Split an expression into its variable name (the leading run of ASCII
/// alphanumerics) and the modifier text that follows.
pub fn split_name(expr: &str) -> (&str, &str) {
    let end = expr
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(expr.len());
    expr.split_at(end)
}

/// Evaluate one expression for `item`.
///
/// Fails only when the variable name is unknown; modifiers whose target is
/// missing leave the value unchanged.
pub fn evaluate(expr: &str, item: &str, registry: &Registry) -> Result<String, ExpandError> {
    let (name, rest) = split_name(expr);
    let var = registry
        .get(name)
        .ok_or_else(|| ExpandError::UnknownVariable(expr.to_string()))?;

    let mut buf = var.evaluate(item);
    modifier::apply_chain(&modifier::parse_chain(rest), &mut buf);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str, item: &str) -> Result<String, ExpandError> {
        evaluate(expr, item, Registry::standard())
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("b:lf_"), ("b", ":lf_"));
        assert_eq!(split_name("home"), ("home", ""));
        assert_eq!(split_name(":x"), ("", ":x"));
    }

    #[test]
    fn test_plain_variables() {
        assert_eq!(eval("f", "a/b.txt").unwrap(), "a/b.txt");
        assert_eq!(eval("b", "a/b.txt").unwrap(), "b");
        assert_eq!(eval("d", "a/b.txt").unwrap(), "a");
        assert_eq!(eval("e", "a/b.txt").unwrap(), "txt");
    }

    #[test]
    fn test_with_modifiers() {
        assert_eq!(eval("b:lf_", "foo_bar.txt").unwrap(), "foo");
        assert_eq!(eval("f:rl/", "x/y/z.c").unwrap(), "z.c");
        assert_eq!(eval("f:s/.c/.o/", "main.c").unwrap(), "main.o");
    }

    #[test]
    fn test_unknown_variable() {
        assert_eq!(
            eval("zz:l.", "a"),
            Err(ExpandError::UnknownVariable("zz:l.".into()))
        );
        assert!(eval("", "a").is_err());
    }

    #[test]
    fn test_name_is_longest_alphanumeric_run() {
        // "fx" is not "f" followed by "x"
        assert!(eval("fx", "a").is_err());
        assert_eq!(eval("home", "a").unwrap(), eval("home:", "a").unwrap());
    }
}
