//! Prompt template with `{context}` and `{question}` placeholders

use crate::store::Chunk;

/// The answering prompt
pub const ANSWER_TEMPLATE: &str = "Answer the question based only on the following context:
{context}
Question: {question}
";

/// Separator placed between retrieved chunks
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// A text pattern filled with retrieved context and the user's question
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(ANSWER_TEMPLATE)
    }
}

impl PromptTemplate {
    /// Build a template from a pattern (see `validate`)
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Check that both placeholders are present
    pub fn validate(&self) -> anyhow::Result<()> {
        for placeholder in ["{context}", "{question}"] {
            if !self.template.contains(placeholder) {
                anyhow::bail!("Prompt template is missing the {} placeholder", placeholder);
            }
        }
        Ok(())
    }

    /// Join chunk texts in relevance order
    pub fn join_context(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Substitute both placeholders in a single pass
    ///
    /// A `{question}` that happens to appear inside a chunk is left alone.
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{context}") {
                out.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{question}") {
                out.push_str(question);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }

    /// Render with the given chunks as context
    pub fn format(&self, chunks: &[Chunk], question: &str) -> String {
        self.render(&Self::join_context(chunks), question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_rendering() {
        let chunks = vec![Chunk::from_text("Rust has ownership."), Chunk::from_text("Go has GC.")];
        let prompt = PromptTemplate::default().format(&chunks, "what is ownership?");
        assert_eq!(
            prompt,
            "Answer the question based only on the following context:\n\
             Rust has ownership.\n\nGo has GC.\n\
             Question: what is ownership?\n"
        );
    }

    #[test]
    fn test_placeholders_in_inputs_are_not_expanded() {
        let template = PromptTemplate::default();
        let prompt = template.render("see {question}", "{context}?");
        assert!(prompt.contains("see {question}\nQuestion: {context}?"));
    }

    #[test]
    fn test_other_braces_kept() {
        let template = PromptTemplate::new("{ctx} {context} {} {question}");
        assert_eq!(template.render("C", "Q"), "{ctx} C {} Q");
    }

    #[test]
    fn test_validate() {
        assert!(PromptTemplate::default().validate().is_ok());
        assert!(PromptTemplate::new("only {question}").validate().is_err());
    }

    #[test]
    fn test_empty_context() {
        let prompt = PromptTemplate::default().format(&[], "anything");
        assert!(prompt.contains("context:\n\nQuestion: anything"));
    }
}
