//! Flat `{{name}}` substitution.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Substitutes named string variables into a template.
pub trait TemplateEngine {
    fn render(&self, template: &str, vars: &BTreeMap<String, String>) -> String;
}

/// `{{ name }}` references, whitespace inside the braces allowed.
///
/// A reference with no matching variable is left as written, so partial
/// substitution passes can be chained.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceTemplate;

static VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

impl TemplateEngine for BraceTemplate {
    fn render(&self, template: &str, vars: &BTreeMap<String, String>) -> String {
        VAR_REF
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_owned(),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_known_vars() {
        let out = BraceTemplate.render("Hi {{name}}, {{ n }}!", &vars(&[("name", "Ada"), ("n", "3")]));
        assert_eq!(out, "Hi Ada, 3!");
    }

    #[test]
    fn test_unknown_vars_untouched() {
        let out = BraceTemplate.render("{{a}} {{b}}", &vars(&[("a", "1")]));
        assert_eq!(out, "1 {{b}}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = BraceTemplate.render("{{a}}", &vars(&[("a", "{{b}}"), ("b", "x")]));
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn test_non_identifier_braces_ignored() {
        let out = BraceTemplate.render("{{1x}} {{ a-b }} {x}", &vars(&[("x", "y")]));
        assert_eq!(out, "{{1x}} {{ a-b }} {x}");
    }
}
