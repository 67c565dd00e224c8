//! End-to-end tests of the build-once, query-many pipeline with fake providers.

use async_trait::async_trait;
use docent::chunking::{self, Passage};
use docent::config::Settings;
use docent::document::{DocumentLoader, FileLoader};
use docent::embedding::Embedder;
use docent::orchestrator::{Orchestrator, OrchestratorState};
use docent::rag::AnswerGenerator;
use docent::{DocentError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Embeds text as counts of the letters a, b and c plus a constant.
#[derive(Default)]
struct LetterEmbedder {
    batch_calls: AtomicUsize,
    texts_embedded: AtomicUsize,
}

fn letters(text: &str) -> Vec<f32> {
    let count = |c: char| text.chars().filter(|&x| x.eq_ignore_ascii_case(&c)).count() as f32;
    vec![count('a'), count('b'), count('c'), 1.0]
}

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| letters(t)).collect())
    }

    fn dimensions(&self) -> usize {
        4
    }
}

/// Answers with the pages it was shown.
#[derive(Default)]
struct PageListGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl AnswerGenerator for PageListGenerator {
    async fn generate(&self, question: &str, context: &[Passage]) -> Result<String> {
        if context.is_empty() {
            return Err(DocentError::NoContext);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let pages: Vec<String> = context.iter().map(|p| p.source_page.to_string()).collect();
        Ok(format!("{} -> pages {}", question, pages.join(",")))
    }
}

fn write_document(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn orchestrator(
    embedder: Arc<LetterEmbedder>,
    generator: Arc<PageListGenerator>,
) -> Orchestrator {
    let mut settings = Settings::default();
    settings.retrieval.top_k = 2;
    Orchestrator::with_components(&settings, embedder, generator).unwrap()
}

#[test]
fn test_two_page_scenario_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let content = format!("{}\x0C{}", "A".repeat(1500), "B".repeat(500));
    let path = write_document(&dir, "handbook.txt", &content);

    let document = FileLoader::new().load(&path).unwrap();
    let passages = chunking::split(&document, 1000, 200).unwrap();

    let lengths: Vec<(usize, usize)> = passages
        .iter()
        .map(|p| (p.source_page, p.text.chars().count()))
        .collect();
    assert_eq!(lengths, vec![(1, 1000), (1, 700), (2, 500)]);
}

#[tokio::test]
async fn test_build_once_query_many() {
    let dir = tempfile::tempdir().unwrap();
    let content = format!("{}\x0C{}\x0C{}", "a".repeat(1500), "b".repeat(500), "c".repeat(300));
    let path = write_document(&dir, "handbook.txt", &content);

    let embedder = Arc::new(LetterEmbedder::default());
    let generator = Arc::new(PageListGenerator::default());
    let orch = orchestrator(embedder.clone(), generator.clone());

    let report = orch.build_index(&path, false).await.unwrap();
    assert_eq!(report.pages, 3);
    assert_eq!(report.passages_indexed, 4);

    let again = orch.build_index(&path, false).await.unwrap();
    assert!(again.skipped);
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(embedder.texts_embedded.load(Ordering::SeqCst), 4);

    let answer = orch.answer("bbb").await.unwrap();
    assert_eq!(answer.sources[0].passage.source_page, 2);
    assert!(answer
        .sources
        .windows(2)
        .all(|w| w[0].score >= w[1].score));

    let answer = orch.answer("aaa").await.unwrap();
    assert_eq!(answer.sources.len(), 2);
    assert!(answer.sources.iter().all(|s| s.passage.source_page == 1));
    assert_eq!(answer.text, "aaa -> pages 1,1");
}

#[tokio::test]
async fn test_concurrent_answers_share_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, "handbook.txt", "aaaa\x0Cbbbb\x0Ccccc");

    let generator = Arc::new(PageListGenerator::default());
    let orch = Arc::new(orchestrator(Arc::new(LetterEmbedder::default()), generator.clone()));
    orch.build_index(&path, false).await.unwrap();

    let questions = ["a?", "b?", "c?", "abc?", "cab?", "bb?"];
    let answers = futures::future::join_all(questions.iter().map(|q| {
        let orch = orch.clone();
        async move { orch.answer(q).await }
    }))
    .await;

    assert!(answers.iter().all(|a| a.is_ok()));
    assert_eq!(generator.calls.load(Ordering::SeqCst), questions.len());
}

#[tokio::test]
async fn test_empty_document_fails_with_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir, "empty.txt", "");

    let orch = orchestrator(
        Arc::new(LetterEmbedder::default()),
        Arc::new(PageListGenerator::default()),
    );

    let err = orch.build_index(&path, false).await.unwrap_err();
    assert_eq!(err.kind(), "DocumentLoadError");
    assert!(matches!(orch.state().await, OrchestratorState::Failed { .. }));
}

#[tokio::test]
async fn test_answer_before_build_is_not_ready() {
    let generator = Arc::new(PageListGenerator::default());
    let orch = orchestrator(Arc::new(LetterEmbedder::default()), generator.clone());

    let err = orch
        .answer("What is the attendance policy?")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NotReadyError");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_rebuild_then_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_document(&dir, "handbook.txt", "aaaa\x0Cbbbb");
    let missing = dir.path().join("missing.txt");

    let orch = orchestrator(
        Arc::new(LetterEmbedder::default()),
        Arc::new(PageListGenerator::default()),
    );

    orch.build_index(&good, false).await.unwrap();
    assert!(orch.build_index(&missing, false).await.is_err());
    assert!(matches!(
        orch.answer("a?").await,
        Err(DocentError::NotReady(_))
    ));

    orch.build_index(&good, false).await.unwrap();
    assert!(orch.answer("a?").await.is_ok());
}
