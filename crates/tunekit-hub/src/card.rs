use std::fmt::Write as _;

/// Typed fields for a generated model card.
///
/// `render` is deterministic: same fields, same document. The card is the
/// `README.md` shipped alongside the uploaded weights.
#[derive(Debug, Clone)]
pub struct ModelCard {
    pub repo_id: String,
    pub model_name: String,
    pub base_model: String,
    pub version: String,
    pub license: String,
    pub language: String,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

impl ModelCard {
    #[must_use]
    pub fn new(
        repo_id: impl Into<String>,
        model_name: impl Into<String>,
        base_model: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            repo_id: repo_id.into(),
            model_name: model_name.into(),
            base_model: base_model.into(),
            version: version.into(),
            license: "apache-2.0".to_string(),
            language: "en".to_string(),
            tags: vec!["text-generation".to_string(), "fine-tuned".to_string()],
            description: None,
        }
    }

    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Render the card: YAML front matter followed by markdown sections.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("---\n");
        let _ = writeln!(out, "language:\n- {}", self.language);
        let _ = writeln!(out, "license: {}", self.license);
        out.push_str("tags:\n");
        for tag in &self.tags {
            let _ = writeln!(out, "- {tag}");
        }
        let _ = writeln!(out, "base_model: {}", self.base_model);
        out.push_str("pipeline_tag: text-generation\n");
        out.push_str("---\n\n");

        let _ = writeln!(out, "# {}\n", self.model_name);

        if let Some(description) = &self.description {
            let _ = writeln!(out, "{description}\n");
        } else {
            let _ = writeln!(
                out,
                "**{}** is a parameter-efficient fine-tune of `{}`.\n",
                self.model_name, self.base_model
            );
        }

        out.push_str("## Quick Start\n\n");
        out.push_str("```python\n");
        out.push_str("from transformers import AutoModelForCausalLM, AutoTokenizer\n\n");
        let _ = writeln!(out, "model = AutoModelForCausalLM.from_pretrained(\"{}\")", self.repo_id);
        let _ = writeln!(out, "tokenizer = AutoTokenizer.from_pretrained(\"{}\")", self.repo_id);
        out.push_str("```\n\n");

        out.push_str("## Model Details\n\n");
        let _ = writeln!(out, "- **Base model:** {}", self.base_model);
        out.push_str("- **Training method:** LoRA fine-tuning\n");
        let _ = writeln!(out, "- **Version:** {}", self.version);
        let _ = writeln!(out, "- **License:** {}", self.license);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> ModelCard {
        ModelCard::new("acme/demo-7b", "demo-7b", "meta-llama/Llama-2-7b-chat-hf", "v0.1.0")
    }

    #[test]
    fn test_render_starts_with_front_matter() {
        let rendered = card().render();
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.contains("license: apache-2.0"));
        assert!(rendered.contains("base_model: meta-llama/Llama-2-7b-chat-hf"));
        assert!(rendered.contains("- text-generation"));
    }

    #[test]
    fn test_render_mentions_repo_and_version() {
        let rendered = card().render();
        assert!(rendered.contains("# demo-7b"));
        assert!(rendered.contains("from_pretrained(\"acme/demo-7b\")"));
        assert!(rendered.contains("**Version:** v0.1.0"));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(card().render(), card().render());
    }

    #[test]
    fn test_custom_description_replaces_default_blurb() {
        let rendered = card().with_description("A model.").render();
        assert!(rendered.contains("A model.\n"));
        assert!(!rendered.contains("parameter-efficient fine-tune"));
    }
}
