//! Recipe configuration.
//!
//! A recipe is a named command template, run with `dof --name`. Recipes are
//! read from, in order:
//!
//! 1. `/etc/dof.conf`
//! 2. `~/.dofrc`
//! 3. `<config dir>/dof/recipes.toml`
//!
//! The first two use `name: template` lines. The TOML file has a `[recipes]`
//! table of `name = "template"`. A later definition replaces an earlier one
//! with the same name. `DOF_CONFIG` replaces the whole list with one file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DofError;
use crate::output;

/// Environment variable naming a single configuration file to use instead.
pub const CONFIG_ENV: &str = "DOF_CONFIG";

/// A named command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub name: String,
    pub template: String,
}

#[derive(Debug, Deserialize, Default)]
struct RecipesToml {
    #[serde(default)]
    recipes: BTreeMap<String, String>,
}

/// The recipe table, in order of first definition.
#[derive(Debug, Clone, Default)]
pub struct Recipes {
    entries: Vec<Recipe>,
}

impl Recipes {
    /// Load from `DOF_CONFIG` if set, else from the default search list.
    pub fn load() -> Result<Self, DofError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load_from(&[PathBuf::from(path)]),
            _ => Self::load_from(&default_config_paths()),
        }
    }

    /// Load every file in `paths`. Missing files are skipped.
    pub fn load_from(paths: &[PathBuf]) -> Result<Self, DofError> {
        let mut recipes = Self::default();
        for path in paths {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    return Err(DofError::Config {
                        path: path.clone(),
                        message: err.to_string(),
                    });
                }
            };
            output::debug(&format!("reading recipes from {}", path.display()));

            if is_toml(path) {
                let parsed: RecipesToml = toml::from_str(&text).map_err(|e| DofError::Config {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                for (name, template) in parsed.recipes {
                    recipes.insert(name, template);
                }
            } else {
                for (name, template) in parse_lines(&text) {
                    recipes.insert(name, template);
                }
            }
        }
        Ok(recipes)
    }

    /// Add a recipe, replacing the template of an existing one in place.
    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        let name = name.into();
        let template = template.into();
        match self.entries.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing.template = template,
            None => self.entries.push(Recipe { name, template }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.entries.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `/etc/dof.conf`, `~/.dofrc`, and `<config dir>/dof/recipes.toml`.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/dof.conf")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".dofrc"));
    }
    if let Some(config) = dirs::config_dir() {
        paths.push(config.join("dof").join("recipes.toml"));
    }
    paths
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

/// Parse `name: template` lines. Blank lines, `#` comments, and lines
/// without a colon are skipped.
fn parse_lines(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(|line| line.trim_start_matches([' ', '\t']))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(name, template)| {
            (
                name.to_string(),
                template.trim_start_matches([' ', '\t']).to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_lines() {
        let parsed = parse_lines(
            "# comment\n\n  to-ogg:\tffmpeg -i %f %b.ogg\nno colon here\n   # indented comment\nx:a:b\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("to-ogg".to_string(), "ffmpeg -i %f %b.ogg".to_string()),
                ("x".to_string(), "a:b".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let recipes = Recipes::load_from(&[dir.path().join("absent.conf")]).unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_later_source_overrides() {
        let dir = TempDir::new().unwrap();
        let system = write(&dir, "dof.conf", "a: one\nb: two\n");
        let user = write(&dir, "recipes.toml", "[recipes]\nb = \"three\"\nc = \"four\"\n");

        let recipes = Recipes::load_from(&[system, user]).unwrap();
        let listed: Vec<_> = recipes
            .iter()
            .map(|r| (r.name.as_str(), r.template.as_str()))
            .collect();
        assert_eq!(listed, vec![("a", "one"), ("b", "three"), ("c", "four")]);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let bad = write(&dir, "recipes.toml", "[recipes\n");
        assert!(matches!(
            Recipes::load_from(&[bad]),
            Err(DofError::Config { .. })
        ));
    }

    #[test]
    fn test_toml_without_recipes_table() {
        let dir = TempDir::new().unwrap();
        let empty = write(&dir, "recipes.toml", "# nothing yet\n");
        assert!(Recipes::load_from(&[empty]).unwrap().is_empty());
    }

    #[test]
    fn test_get() {
        let mut recipes = Recipes::default();
        recipes.insert("up", "echo %f:s/a/A/g");
        assert_eq!(recipes.get("up").unwrap().template, "echo %f:s/a/A/g");
        assert!(recipes.get("down").is_none());
    }
}
