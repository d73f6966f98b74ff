//! Passage retrieval for the RAG agent.
//!
//! [`EmbeddingRetriever`] ranks passages by cosine similarity of their embeddings to the
//! query's embedding. [`PassageRetriever`] ranks by shared terms and needs no model.
//! [`RetrieverTool`] exposes either to the model.

use crate::error::{Result, ToolchatError};
use crate::llm::gateway::LlmGateway;
use crate::llm::tools::{parse_args, LlmTool, ToolDescriptor, ToolOutput};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info};

/// Number of passages handed to the model per query
pub const DEFAULT_TOP_K: usize = 3;

/// Source of passages relevant to a query, most relevant first
pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str) -> Result<Vec<String>>;
}

/// Split a corpus into passages on blank lines
pub fn split_passages(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Load the passages of a plain-text corpus; a missing or empty corpus is a startup error
pub fn load_passages(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ToolchatError::ConfigError(format!(
            "Corpus file {} does not exist.",
            path.display()
        )));
    }
    let passages = split_passages(&std::fs::read_to_string(path)?);
    if passages.is_empty() {
        return Err(ToolchatError::ConfigError(format!(
            "No passages were created from {}.",
            path.display()
        )));
    }
    info!("Loaded {} passages from {}", passages.len(), path.display());
    Ok(passages)
}

/// Cosine similarity of two vectors; 0 when either is zero or their lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Retriever ranking passages by embedding similarity
///
/// Passages are embedded once by [`EmbeddingRetriever::build`]; each query costs one
/// embedding call. Synchronous retrieval (as done by [`RetrieverTool`]) blocks on the
/// current multi-threaded tokio runtime.
pub struct EmbeddingRetriever {
    gateway: Arc<dyn LlmGateway>,
    model: Option<String>,
    passages: Vec<(String, Vec<f32>)>,
    top_k: usize,
}

impl EmbeddingRetriever {
    /// Embed every passage with `model` (the gateway default when `None`)
    pub async fn build(
        gateway: Arc<dyn LlmGateway>,
        passages: Vec<String>,
        model: Option<String>,
    ) -> Result<Self> {
        let mut embedded = Vec::with_capacity(passages.len());
        for passage in passages {
            let vector = gateway.calculate_embeddings(&passage, model.as_deref()).await?;
            embedded.push((passage, vector));
        }
        info!("Embedded {} passages", embedded.len());
        Ok(Self {
            gateway,
            model,
            passages: embedded,
            top_k: DEFAULT_TOP_K,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Embed `query` and return the `top_k` most similar passages
    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        let query_vector = self.gateway.calculate_embeddings(query, self.model.as_deref()).await?;
        let mut scored: Vec<(f32, &String)> = self
            .passages
            .iter()
            .map(|(passage, vector)| (cosine_similarity(&query_vector, vector), passage))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        Ok(scored.into_iter().take(self.top_k).map(|(_, p)| p.clone()).collect())
    }
}

impl Retriever for EmbeddingRetriever {
    fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        let handle = Handle::try_current().map_err(|_| {
            ToolchatError::ToolError("embedding retrieval needs a tokio runtime".to_string())
        })?;
        if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
            return Err(ToolchatError::ToolError(
                "embedding retrieval needs the multi-threaded tokio runtime".to_string(),
            ));
        }
        tokio::task::block_in_place(|| handle.block_on(self.search(query)))
    }
}

/// In-memory retriever ranking passages by how many query terms they contain
#[derive(Debug, Clone)]
pub struct PassageRetriever {
    passages: Vec<String>,
    top_k: usize,
}

impl PassageRetriever {
    pub fn new(passages: Vec<String>) -> Self {
        Self {
            passages,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(split_passages(text))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_passages(path)?))
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

impl Retriever for PassageRetriever {
    fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        let query_terms = terms(query);
        let mut scored: Vec<(usize, &String)> = self
            .passages
            .iter()
            .map(|p| (terms(p).intersection(&query_terms).count(), p))
            .filter(|(score, _)| *score > 0)
            .collect();
        // stable sort keeps corpus order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(self.top_k).map(|(_, p)| p.clone()).collect())
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RetrieverArgs {
    /// The user's query to search for relevant information.
    pub query: String,
}

/// Exposes a [`Retriever`] to the model as `retriever_tool`
pub struct RetrieverTool {
    retriever: Arc<dyn Retriever>,
}

impl RetrieverTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }

    /// Format retrieved passages the way the model is prompted to cite them
    pub fn format_passages(passages: &[String]) -> String {
        if passages.is_empty() {
            return "No relevant information found for Artificial Intelligence.".to_string();
        }
        passages
            .iter()
            .enumerate()
            .map(|(i, p)| format!("Document {}:\n{}\n", i + 1, p))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl LlmTool for RetrieverTool {
    fn run(&self, args: &HashMap<String, Value>) -> Result<ToolOutput> {
        let RetrieverArgs { query } = parse_args(args)?;
        let text = match self.retriever.retrieve(&query) {
            Ok(passages) => {
                debug!("Retrieved {} passages for query: {}", passages.len(), query);
                Self::format_passages(&passages)
            }
            Err(e) => format!("Error retrieving information: {}", e),
        };
        Ok(ToolOutput::new(json!(text)))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<RetrieverArgs>(
            "retriever_tool",
            "Retrieves relevant information on artificial intelligence based on the user's query.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedGateway;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CORPUS: &str = "Transformers use attention.\n\n\
        Gradient descent minimizes loss.\n\n\
        Attention heads in transformers attend to tokens.\n\n\
        Unrelated cooking recipe.";

    struct FailingRetriever;

    impl Retriever for FailingRetriever {
        fn retrieve(&self, _query: &str) -> Result<Vec<String>> {
            Err(ToolchatError::GatewayError("index offline".to_string()))
        }
    }

    fn query_args(query: &str) -> HashMap<String, Value> {
        HashMap::from([("query".to_string(), json!(query))])
    }

    #[test]
    fn test_from_text_splits_on_blank_lines() {
        let retriever = PassageRetriever::from_text(CORPUS);
        assert_eq!(retriever.len(), 4);
    }

    #[test]
    fn test_retrieve_ranks_by_term_overlap() {
        let retriever = PassageRetriever::from_text(CORPUS);

        let passages = retriever.retrieve("How does attention work in transformers?").unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0], "Transformers use attention.");
        assert_eq!(passages[1], "Attention heads in transformers attend to tokens.");
    }

    #[test]
    fn test_retrieve_respects_top_k() {
        let retriever = PassageRetriever::from_text(CORPUS).with_top_k(1);
        assert_eq!(retriever.retrieve("attention transformers").unwrap().len(), 1);
    }

    #[test]
    fn test_from_file_missing_is_config_error() {
        let err = PassageRetriever::from_file("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, ToolchatError::ConfigError(_)));
    }

    #[test]
    fn test_from_file_loads_passages() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", CORPUS).unwrap();

        let retriever = PassageRetriever::from_file(file.path()).unwrap();
        assert_eq!(retriever.len(), 4);
    }

    #[test]
    fn test_tool_formats_documents() {
        let tool = RetrieverTool::new(Arc::new(PassageRetriever::from_text(CORPUS)));

        let output = tool.run(&query_args("gradient descent")).unwrap();

        assert_eq!(output.render(), "Document 1:\nGradient descent minimizes loss.\n");
    }

    #[test]
    fn test_format_multiple_passages() {
        let text = RetrieverTool::format_passages(&["one".to_string(), "two".to_string()]);
        assert_eq!(text, "Document 1:\none\n\nDocument 2:\ntwo\n");
    }

    #[test]
    fn test_tool_reports_no_results() {
        let tool = RetrieverTool::new(Arc::new(PassageRetriever::from_text(CORPUS)));

        let output = tool.run(&query_args("zebra")).unwrap();

        assert_eq!(output.render(), "No relevant information found for Artificial Intelligence.");
    }

    #[test]
    fn test_tool_reports_retriever_error_as_text() {
        let tool = RetrieverTool::new(Arc::new(FailingRetriever));

        let output = tool.run(&query_args("anything")).unwrap();

        assert_eq!(
            output.render(),
            "Error retrieving information: LLM gateway error: index offline"
        );
    }

    fn embedding_gateway() -> Arc<ScriptedGateway> {
        ScriptedGateway::with_embeddings(
            vec![],
            &[
                ("Transformers use attention.", vec![1.0, 0.0, 0.0]),
                ("Gradient descent minimizes loss.", vec![0.0, 1.0, 0.0]),
                ("Attention heads attend to tokens.", vec![0.8, 0.0, 0.6]),
                ("what is attention", vec![1.0, 0.0, 0.1]),
            ],
        )
    }

    async fn embedding_retriever(gateway: &Arc<ScriptedGateway>) -> EmbeddingRetriever {
        let passages = split_passages(
            "Transformers use attention.\n\nGradient descent minimizes loss.\n\n\
             Attention heads attend to tokens.",
        );
        EmbeddingRetriever::build(gateway.clone(), passages, None).await.unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_embedding_search_ranks_by_similarity() {
        let gateway = embedding_gateway();
        let retriever = embedding_retriever(&gateway).await.with_top_k(2);

        let passages = retriever.search("what is attention").await.unwrap();

        assert_eq!(
            passages,
            vec!["Transformers use attention.", "Attention heads attend to tokens."]
        );
    }

    #[tokio::test]
    async fn test_passages_are_embedded_once() {
        let gateway = embedding_gateway();
        let retriever = embedding_retriever(&gateway).await;

        retriever.search("what is attention").await.unwrap();
        retriever.search("what is attention").await.unwrap();

        assert_eq!(retriever.len(), 3);
        let texts = gateway.embedded_texts();
        assert_eq!(texts.len(), 5);
        assert_eq!(texts[3], "what is attention");
    }

    #[tokio::test]
    async fn test_build_fails_when_embedding_fails() {
        let gateway = ScriptedGateway::with_embeddings(vec![], &[]);

        let result =
            EmbeddingRetriever::build(gateway, vec!["unknown passage".to_string()], None).await;

        assert!(matches!(result, Err(ToolchatError::GatewayError(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_tool_uses_embedding_retriever() {
        let gateway = embedding_gateway();
        let retriever = embedding_retriever(&gateway).await.with_top_k(1);
        let tool = RetrieverTool::new(Arc::new(retriever));

        let output = tool.run(&query_args("what is attention")).unwrap();

        assert_eq!(output.render(), "Document 1:\nTransformers use attention.\n");
    }

    #[tokio::test]
    async fn test_blocking_retrieve_needs_multi_thread_runtime() {
        let gateway = embedding_gateway();
        let retriever = embedding_retriever(&gateway).await;

        let err = retriever.retrieve("what is attention").unwrap_err();

        assert!(matches!(err, ToolchatError::ToolError(_)));
    }
}
