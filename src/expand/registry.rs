//! Variable registry for `%` expansions.
//!
//! The standard registry is built once on first use and never changes
//! afterwards. Names are unique; `Registry::insert` refuses duplicates.

use std::sync::LazyLock;

use chrono::Local;

use crate::paths;

/// How a variable produces its value.
#[derive(Clone, Copy)]
pub enum Value {
    /// A fixed string
    Const(&'static str),
    /// A pure function of the current item
    Item(fn(&str) -> String),
    /// Read from the process environment or the clock at expansion time
    Ambient(fn() -> String),
}

/// A named variable usable as `%name`.
#[derive(Clone, Copy)]
pub struct Variable {
    pub name: &'static str,
    pub value: Value,
    /// Human-readable description (shown by `dof -h`)
    pub description: &'static str,
}

impl Variable {
    /// Produce this variable's value for `item`.
    pub fn evaluate(&self, item: &str) -> String {
        match self.value {
            Value::Const(s) => s.to_string(),
            Value::Item(f) => f(item),
            Value::Ambient(f) => f(),
        }
    }
}

impl std::fmt::Debug for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Ordered set of variables, looked up by exact name.
#[derive(Debug, Default)]
pub struct Registry {
    vars: Vec<Variable>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable. Returns false (and keeps the existing entry) if the
    /// name is already taken.
    pub fn insert(&mut self, var: Variable) -> bool {
        if self.get(var.name).is_some() {
            return false;
        }
        self.vars.push(var);
        true
    }

    /// Look up a variable by exact name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|v| v.name == name)
    }

    /// Iterate variables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter()
    }

    /// The built-in variables.
    pub fn standard() -> &'static Registry {
        static STANDARD: LazyLock<Registry> = LazyLock::new(build_standard);
        &STANDARD
    }
}

fn build_standard() -> Registry {
    let mut reg = Registry::new();
    let vars = [
        Variable {
            name: "f",
            value: Value::Item(|item| item.to_string()),
            description: "the string (if file; the full path name)",
        },
        Variable {
            name: "b",
            value: Value::Item(|item| paths::basename(item).to_string()),
            description: "the basename (no directory, no extension)",
        },
        Variable {
            name: "d",
            value: Value::Item(|item| paths::dirname(item).to_string()),
            description: "the directory (without trailing '/')",
        },
        Variable {
            name: "e",
            value: Value::Item(|item| paths::extname(item).to_string()),
            description: "the extension (without '.')",
        },
        Variable {
            name: "n",
            value: Value::Item(|item| paths::filename(item).to_string()),
            description: "the file name (no directory, with extension)",
        },
        Variable {
            name: "home",
            value: Value::Ambient(home_dir),
            description: "the home directory (also %~)",
        },
        Variable {
            name: "cwd",
            value: Value::Ambient(current_dir),
            description: "the current working directory",
        },
        Variable {
            name: "date",
            value: Value::Ambient(|| Local::now().format("%Y-%m-%d").to_string()),
            description: "the current date (YYYY-MM-DD)",
        },
        Variable {
            name: "time",
            value: Value::Ambient(|| Local::now().format("%H:%M:%S").to_string()),
            description: "the current time (HH:MM:SS)",
        },
        Variable {
            name: "q",
            value: Value::Const("'"),
            description: "a single quote (also %')",
        },
        Variable {
            name: "Q",
            value: Value::Const("\""),
            description: "a double quote (also %\")",
        },
    ];
    for var in vars {
        reg.insert(var);
    }
    reg
}

fn home_dir() -> String {
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => home,
        _ => dirs::home_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

fn current_dir() -> String {
    std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}
