//! Assembling retrieved chunks into a grounded system prompt.

use crate::document::Retrieval;
use crate::error::Result;
use crate::retriever::Retriever;

/// Separator placed between retrieved chunks in the context block.
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Name used in the prompt when the document has none.
pub const DEFAULT_DOCUMENT_NAME: &str = "the uploaded document";

/// The reply the model is told to give when the context is insufficient.
pub const NOT_FOUND_REPLY: &str = "I cannot find that information in the uploaded document";

/// Join retrieved chunks into one context block.
pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
    let parts: Vec<&str> = chunks.iter().map(AsRef::as_ref).collect();
    parts.join(CHUNK_SEPARATOR)
}

/// Prepend `context` and answering rules to the developer's system message.
pub fn augment_system_prompt(
    document_name: Option<&str>,
    context: &str,
    developer_message: &str,
) -> String {
    let document_name =
        document_name.filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_DOCUMENT_NAME);
    format!(
        "You are an AI assistant that answers questions based solely on the provided context from {document_name}.

IMPORTANT INSTRUCTIONS:
- Only use information from the provided context to answer questions
- If the context doesn't contain enough information to answer the question, say \"{NOT_FOUND_REPLY}\"
- Do not use your general knowledge - stick strictly to the provided context
- Be accurate and cite specific parts of the context when possible

Context from the document:
{context}

{developer_message}"
    )
}

/// A system prompt together with the retrieval that shaped it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedPrompt {
    /// Chunks that went into the context block; empty for plain chat.
    pub retrieval: Retrieval,
    /// The system message to send to the model.
    pub system_prompt: String,
}

impl GroundedPrompt {
    /// Retrieve context for `user_message` and build the system prompt.
    ///
    /// With no chunks the developer message is used unchanged (plain chat).
    /// Otherwise the retriever's configured `top_k` chunks are folded into
    /// the prompt.
    pub async fn build(
        retriever: &Retriever,
        document_name: Option<&str>,
        chunks: &[String],
        developer_message: &str,
        user_message: &str,
    ) -> Result<Self> {
        let top_k = retriever.config().top_k;
        let retrieval = retriever.retrieve_scored(user_message, chunks, top_k).await?;
        if chunks.is_empty() {
            return Ok(Self { retrieval, system_prompt: developer_message.to_string() });
        }

        let relevant: Vec<&str> = retrieval.chunks.iter().map(|c| c.text.as_str()).collect();
        let context = build_context(&relevant);
        let system_prompt = augment_system_prompt(document_name, &context, developer_message);
        Ok(Self { retrieval, system_prompt })
    }
}

/// Build the system prompt for one chat turn.
///
/// See [`GroundedPrompt::build`]; this keeps only the prompt text.
pub async fn system_prompt(
    retriever: &Retriever,
    document_name: Option<&str>,
    chunks: &[String],
    developer_message: &str,
    user_message: &str,
) -> Result<String> {
    let grounded =
        GroundedPrompt::build(retriever, document_name, chunks, developer_message, user_message)
            .await?;
    Ok(grounded.system_prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_joins_with_blank_line() {
        assert_eq!(build_context(&["first", "second"]), "first\n\nsecond");
        assert_eq!(build_context::<&str>(&[]), "");
    }

    #[test]
    fn prompt_names_the_document() {
        let prompt = augment_system_prompt(Some("handbook.pdf"), "ctx", "Be brief.");
        assert!(prompt.contains("context from handbook.pdf."));
        assert!(prompt.contains("Context from the document:\nctx\n\nBe brief."));
        assert!(prompt.contains(NOT_FOUND_REPLY));
    }

    #[test]
    fn prompt_falls_back_to_generic_name() {
        let prompt = augment_system_prompt(None, "ctx", "");
        assert!(prompt.contains(DEFAULT_DOCUMENT_NAME));
        let prompt = augment_system_prompt(Some("  "), "ctx", "");
        assert!(prompt.contains(DEFAULT_DOCUMENT_NAME));
    }

    #[tokio::test]
    async fn no_chunks_means_plain_chat() {
        let retriever = Retriever::lexical();
        let prompt = system_prompt(&retriever, None, &[], "You are helpful.", "hi").await.unwrap();
        assert_eq!(prompt, "You are helpful.");
    }

    #[tokio::test]
    async fn grounded_prompt_keeps_the_retrieval() {
        let chunks = vec!["cats and dogs".to_string(), "borrow checker rules".to_string()];
        let grounded =
            GroundedPrompt::build(&Retriever::lexical(), None, &chunks, "dev", "borrow checker")
                .await
                .unwrap();
        assert_eq!(grounded.retrieval.chunks[0].index, 1);
        assert!(grounded.system_prompt.starts_with("You are an AI assistant"));
        assert!(grounded.system_prompt.ends_with("borrow checker rules\n\ncats and dogs\n\ndev"));
    }

    #[tokio::test]
    async fn chunks_are_retrieved_into_the_prompt() {
        let chunks = vec!["rust borrow checker".to_string(), "gardening tips".to_string()];
        let prompt =
            system_prompt(&Retriever::lexical(), Some("notes"), &chunks, "dev", "borrow checker")
                .await
                .unwrap();
        assert!(prompt.contains(
            "Context from the document:\nrust borrow checker\n\ngardening tips\n\ndev"
        ));
    }
}
