use handlebars::{Handlebars, no_escape};

use crate::{error::ScribeError, record::Commit};

const COMMIT_TEMPLATE_NAME: &str = "commit";

pub const DEFAULT_COMMIT_TEMPLATE: &str = r#"Commit {{id}}
{{message}}
{{#each hunks}}
--- {{file}} @@ -{{old_start}},{{old_lines}} +{{new_start}},{{new_lines}} @@
{{old_text}}
+++
{{new_text}}
{{/each}}"#;

/// Turns commits into prompt text.
pub struct PromptRenderer {
    registry: Handlebars<'static>,
}

impl PromptRenderer {
    pub fn new() -> Result<Self, ScribeError> {
        Self::with_template(DEFAULT_COMMIT_TEMPLATE)
    }

    /// Uses a caller-supplied handlebars template. The commit is exposed with
    /// its record field names (`id`, `message`, `hunks[].file`, ...).
    pub fn with_template(template: &str) -> Result<Self, ScribeError> {
        let mut registry = Handlebars::new();
        // Diffs are plain text, not HTML.
        registry.register_escape_fn(no_escape);
        registry.set_strict_mode(true);
        registry.register_template_string(COMMIT_TEMPLATE_NAME, template)?;
        Ok(Self { registry })
    }

    pub fn render(&self, commit: &Commit) -> Result<String, ScribeError> {
        Ok(self.registry.render(COMMIT_TEMPLATE_NAME, commit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Hunk;

    fn sample_commit() -> Commit {
        Commit {
            id: "abc123".to_string(),
            message: "fix <bug> & more".to_string(),
            hunks: vec![Hunk {
                file_name: "a.py".to_string(),
                old_start: 1,
                old_lines: 2,
                new_start: 1,
                new_lines: 3,
                old_text: "x=1".to_string(),
                new_text: "x=1\ny=2".to_string(),
            }],
        }
    }

    #[test]
    fn default_template_includes_every_hunk_field() {
        let prompt = PromptRenderer::new().unwrap().render(&sample_commit()).unwrap();

        assert!(prompt.starts_with("Commit abc123\n"));
        assert!(prompt.contains("--- a.py @@ -1,2 +1,3 @@"));
        assert!(prompt.contains("x=1\ny=2"));
    }

    #[test]
    fn text_is_not_html_escaped() {
        let prompt = PromptRenderer::new().unwrap().render(&sample_commit()).unwrap();
        assert!(prompt.contains("fix <bug> & more"));
    }

    #[test]
    fn custom_template_renders() {
        let renderer = PromptRenderer::with_template("{{id}}: {{message}}").unwrap();
        assert_eq!(renderer.render(&sample_commit()).unwrap(), "abc123: fix <bug> & more");
    }

    #[test]
    fn unknown_field_fails_in_strict_mode() {
        let renderer = PromptRenderer::with_template("{{author}}").unwrap();
        assert!(matches!(
            renderer.render(&sample_commit()),
            Err(ScribeError::Render(_))
        ));
    }

    #[test]
    fn broken_template_is_rejected() {
        assert!(matches!(
            PromptRenderer::with_template("{{#each hunks}}"),
            Err(ScribeError::Template(_))
        ));
    }
}
