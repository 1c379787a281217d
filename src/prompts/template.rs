//! Placeholder substitution for prompt templates.
//!
//! Tokens look like `{{answer}}`. Every recognised placeholder in a template
//! is replaced; a placeholder without a value renders as [`NOT_PROVIDED`].
//! Unrecognised tokens are left as written.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Text substituted for a placeholder that has no (or a blank) value.
pub const NOT_PROVIDED: &str = "Not provided";

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// The named placeholders a template may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    Answer,
    Question,
    Field,
    Analysis1,
    Analysis2,
    Analysis3,
    JobDescription,
}

impl Placeholder {
    pub const ALL: [Placeholder; 7] = [
        Self::Answer,
        Self::Question,
        Self::Field,
        Self::Analysis1,
        Self::Analysis2,
        Self::Analysis3,
        Self::JobDescription,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::Question => "question",
            Self::Field => "field",
            Self::Analysis1 => "analysis1",
            Self::Analysis2 => "analysis2",
            Self::Analysis3 => "analysis3",
            Self::JobDescription => "jobDescription",
        }
    }

    /// The analysis placeholder for a 1-based position.
    pub fn analysis(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::Analysis1),
            2 => Some(Self::Analysis2),
            3 => Some(Self::Analysis3),
            _ => None,
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Placeholder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown placeholder '{}'", s))
    }
}

/// Values for a single render.
#[derive(Debug, Clone, Default)]
pub struct PromptValues {
    values: BTreeMap<Placeholder, String>,
}

impl PromptValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; `None` leaves the placeholder unset.
    pub fn with(mut self, placeholder: Placeholder, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.values.insert(placeholder, value.into());
        }
        self
    }

    /// Resolved text for a placeholder.
    pub fn resolve(&self, placeholder: Placeholder) -> &str {
        self.values
            .get(&placeholder)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_PROVIDED)
    }
}

/// Substitute every recognised placeholder in `template`.
pub fn render(template: &str, values: &PromptValues) -> String {
    TOKEN_PATTERN
        .replace_all(template, |caps: &Captures| match caps[1].parse::<Placeholder>() {
            Ok(placeholder) => values.resolve(placeholder).to_string(),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholders a template refers to, in order of first use.
pub fn placeholders_in(template: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    for caps in TOKEN_PATTERN.captures_iter(template) {
        if let Ok(p) = caps[1].parse::<Placeholder>() {
            if !found.contains(&p) {
                found.push(p);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_substitution_is_total() {
        let template = "Answer: {{answer}}\nAgain: {{ answer }}";
        let values = PromptValues::new().with(Placeholder::Answer, Some("I can start in May"));
        let rendered = render(template, &values);

        assert!(!rendered.contains("{{answer}}"));
        assert!(!rendered.contains("{{ answer }}"));
        assert_eq!(rendered.matches("I can start in May").count(), 2);
    }

    #[test]
    fn test_missing_and_blank_values_render_not_provided() {
        let template = "{{analysis1}} | {{analysis2}} | {{analysis3}}";
        let values = PromptValues::new()
            .with(Placeholder::Analysis1, Some("first"))
            .with(Placeholder::Analysis2, Some("   "))
            .with(Placeholder::Analysis3, None::<String>);
        assert_eq!(
            render(template, &values),
            "first | Not provided | Not provided"
        );
    }

    #[test]
    fn test_unknown_tokens_are_left_alone() {
        let rendered = render("{{salary}} and {{question}}", &PromptValues::new());
        assert_eq!(rendered, "{{salary}} and Not provided");
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let values = PromptValues::new()
            .with(Placeholder::Answer, Some("{{question}}"))
            .with(Placeholder::Question, Some("Q"));
        assert_eq!(render("{{answer}}", &values), "{{question}}");
    }

    #[test]
    fn test_placeholder_round_trip_names() {
        for p in Placeholder::ALL {
            assert_eq!(p.name().parse::<Placeholder>().unwrap(), p);
        }
        assert!("jobdescription".parse::<Placeholder>().is_err());
    }

    #[test]
    fn test_placeholders_in() {
        let found = placeholders_in("{{field}} {{answer}} {{field}} {{other}}");
        assert_eq!(found, vec![Placeholder::Field, Placeholder::Answer]);
    }

    #[test]
    fn test_analysis_index() {
        assert_eq!(Placeholder::analysis(2), Some(Placeholder::Analysis2));
        assert_eq!(Placeholder::analysis(4), None);
    }
}
