//! Template interpolation for YAML configs
//!
//! Handles `{{ env.NAME }}` interpolation so secrets such as the database
//! password can stay out of the configuration file. Values defined under
//! `vars` are available too, which keeps the renderer testable without
//! touching the process environment.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ root.name }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\.([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Environment variables
    pub env: HashMap<String, String>,
    /// Additional variables
    pub vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context populated from the process environment
    pub fn from_env() -> Self {
        Self {
            env: std::env::vars().collect(),
            ..Default::default()
        }
    }

    /// Set a variable under `vars`
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Get a value by root and name (e.g., "env", "PGPASSWORD")
    pub fn get(&self, root: &str, name: &str) -> Option<&str> {
        match root {
            "env" => self.env.get(name),
            "vars" => self.vars.get(name),
            _ => None,
        }
        .map(String::as_str)
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        if let Some(value) = ctx.get(&cap[1], &cap[2]) {
            value.to_string()
        } else {
            missing.push(format!("{}.{}", &cap[1], &cap[2]));
            cap[0].to_string()
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TemplateContext {
        let mut ctx = TemplateContext::new();
        ctx.set_var("user", "loader").set_var("db", "wealth");
        ctx.env.insert("PGPASSWORD".to_string(), "s3cret".to_string());
        ctx
    }

    #[test]
    fn test_env_substitution() {
        let result = render("password: {{ env.PGPASSWORD }}", &ctx()).unwrap();
        assert_eq!(result, "password: s3cret");
    }

    #[test]
    fn test_multiple_substitutions() {
        let result = render("postgresql://{{ vars.user }}@localhost/{{ vars.db }}", &ctx()).unwrap();
        assert_eq!(result, "postgresql://loader@localhost/wealth");
    }

    #[test]
    fn test_undefined_variable() {
        let result = render("{{ env.NOT_SET_ANYWHERE }} {{ vars.nope }}", &ctx());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("env.NOT_SET_ANYWHERE"));
        assert!(err.contains("vars.nope"));
    }

    #[test]
    fn test_no_templates() {
        let result = render("plain: value", &ctx()).unwrap();
        assert_eq!(result, "plain: value");
    }

    #[test]
    fn test_whitespace_in_template() {
        assert_eq!(render("{{vars.db}}", &ctx()).unwrap(), "wealth");
        assert_eq!(render("{{  vars.db  }}", &ctx()).unwrap(), "wealth");
    }
}
