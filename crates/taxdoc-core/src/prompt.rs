/// Prompt sent to the chat model. `{context}` and `{question}` are replaced
/// with the retrieved chunk texts and the raw user query.
pub const RAG_PROMPT_TEMPLATE: &str = "\
You are an expert on HMRC regulations and a helpful AI assistant.
Answer the user's question based *only* on the provided context below.
If the context does not contain the answer, politely state that the information is not available in the source documents.

Context:
{context}

Question: {question}
";

/// Join retrieved chunk texts into the context block, separated by blank lines.
pub fn format_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Substitute context and question into the prompt template.
pub fn build_prompt(context: &str, question: &str) -> String {
    RAG_PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_context_joins_with_blank_lines() {
        let chunks = ["first chunk", "second chunk"];
        assert_eq!(format_context(&chunks), "first chunk\n\nsecond chunk");
    }

    #[test]
    fn format_context_empty_is_empty() {
        let chunks: [&str; 0] = [];
        assert_eq!(format_context(&chunks), "");
    }

    #[test]
    fn build_prompt_substitutes_both_fields() {
        let prompt = build_prompt("the small profits rate is 19%", "what is the rate?");
        assert!(prompt.contains("Context:\nthe small profits rate is 19%"));
        assert!(prompt.contains("Question: what is the rate?"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
    }
}
