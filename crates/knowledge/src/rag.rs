//! Retrieval-augmented answering.
//!
//! Retrieves the chunks nearest to a question and asks the answer model to
//! respond from them.

use crate::store::DocumentStore;
use crate::types::QueryResponse;
use docqa_core::{AppError, AppResult};
use docqa_llm::Answerer;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Answer returned when retrieval finds nothing.
pub const NO_RESULTS_ANSWER: &str =
    "Sorry, I couldn't find relevant information in the documents.";

/// Answer returned when the retrieved chunks carry no text.
pub const EMPTY_CONTEXT_ANSWER: &str = "The context retrieved was empty or irrelevant.";

/// Answer `question` from the `top_k` nearest chunks.
///
/// The model is only called when retrieval produced non-blank context.
pub async fn ask(
    store: &DocumentStore,
    answerer: &dyn Answerer,
    question: &str,
    top_k: usize,
) -> AppResult<QueryResponse> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Question cannot be empty".to_string()));
    }
    if top_k == 0 {
        return Err(AppError::Validation(
            "top_k must be greater than zero".to_string(),
        ));
    }

    tracing::info!(top_k, "Answering question");

    let sources = store.search(question, top_k).await?;
    if sources.is_empty() {
        tracing::info!("No chunks retrieved");
        return Ok(QueryResponse {
            question: question.to_string(),
            answer: NO_RESULTS_ANSWER.to_string(),
            sources,
        });
    }

    let context = sources
        .iter()
        .map(|hit| hit.chunk.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    if context.trim().is_empty() {
        tracing::info!(hits = sources.len(), "Retrieved chunks carry no text");
        return Ok(QueryResponse {
            question: question.to_string(),
            answer: EMPTY_CONTEXT_ANSWER.to_string(),
            sources,
        });
    }

    tracing::debug!(
        hits = sources.len(),
        context_chars = context.len(),
        "Built answer context"
    );

    let answer = answerer.generate_answer(question, &context).await?;

    Ok(QueryResponse {
        question: question.to_string(),
        answer,
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;
    use crate::store::StoreConfig;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingAnswerer {
        calls: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Answerer for RecordingAnswerer {
        async fn generate_answer(&self, question: &str, context: &str) -> AppResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((question.to_string(), context.to_string()));
            if self.fail {
                Err(AppError::Llm("upstream 503".to_string()))
            } else {
                Ok(format!("answer from {} chars", context.len()))
            }
        }
    }

    fn store(dir: &TempDir) -> DocumentStore {
        DocumentStore::open(
            StoreConfig::in_dir(dir.path()),
            Arc::new(MockProvider::new(64)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_store_gives_canned_answer() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let answerer = RecordingAnswerer::default();

        let response = ask(&store, &answerer, "What is Rust?", 3).await.unwrap();

        assert_eq!(response.answer, NO_RESULTS_ANSWER);
        assert!(response.sources.is_empty());
        assert!(answerer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_context_joined_with_newlines() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .add_document("a", "A", "Rust guarantees memory safety")
            .await
            .unwrap();
        store
            .add_document("b", "B", "Cargo builds Rust crates")
            .await
            .unwrap();
        let answerer = RecordingAnswerer::default();

        let response = ask(&store, &answerer, "  Rust memory safety?  ", 5)
            .await
            .unwrap();

        assert_eq!(response.question, "Rust memory safety?");
        assert_eq!(response.sources.len(), 2);

        let calls = answerer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (question, context) = &calls[0];
        assert_eq!(question, "Rust memory safety?");
        let expected: Vec<&str> = response.sources.iter().map(|h| h.chunk.as_str()).collect();
        assert_eq!(context, &expected.join("\n"));
        assert_eq!(response.answer, format!("answer from {} chars", context.len()));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let answerer = RecordingAnswerer::default();

        assert!(matches!(
            ask(&store, &answerer, "   ", 3).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ask(&store, &answerer, "question", 0).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.add_document("a", "A", "some text").await.unwrap();
        let answerer = RecordingAnswerer {
            fail: true,
            ..Default::default()
        };

        assert!(matches!(
            ask(&store, &answerer, "text?", 3).await,
            Err(AppError::Llm(_))
        ));
    }
}
