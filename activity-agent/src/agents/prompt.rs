use anyhow::{bail, Context, Result};
use std::path::Path;

const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// Instruction script handed to the model as the system message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    text: String,
}

impl SystemPrompt {
    pub fn new(template: &str, language: &str) -> Result<Self> {
        let text = template.replace(LANGUAGE_PLACEHOLDER, language);
        if text.trim().is_empty() {
            bail!("system prompt is empty");
        }
        Ok(Self { text })
    }

    pub fn load(path: impl AsRef<Path>, language: &str) -> Result<Self> {
        let path = path.as_ref();
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read system prompt from {}", path.display()))?;
        Self::new(&template, language)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
