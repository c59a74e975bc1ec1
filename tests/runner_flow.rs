//! End-to-end runner behavior against an in-memory evaluator: block
//! accumulation, error surfacing, and the activation contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use ponyrun::page::{OutputBlock, Page};
use ponyrun::playground::{EvalOutcome, EvalRequest, Evaluate, PlaygroundError};
use ponyrun::runner::{ResolveMode, RunnerError, SnippetRunner, SubmitOptions};

#[derive(Clone, Copy)]
enum Fail {
    Network,
    Parse,
}

#[derive(Default)]
struct FakeEvaluator {
    snippets: HashMap<String, EvalOutcome>,
    sources: HashMap<String, String>,
    submit_result: Option<EvalOutcome>,
    submitted: Mutex<Vec<EvalRequest>>,
    fail: Option<Fail>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeEvaluator {
    async fn gate(&self) -> Result<(), PlaygroundError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        match self.fail {
            Some(Fail::Network) => Err(PlaygroundError::Network {
                detail: "connection refused".into(),
            }),
            Some(Fail::Parse) => Err(PlaygroundError::Parse {
                detail: "expected value at line 1".into(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Evaluate for FakeEvaluator {
    async fn evaluate_snippet(&self, id: &str) -> Result<EvalOutcome, PlaygroundError> {
        self.gate().await?;
        self.snippets
            .get(id)
            .cloned()
            .ok_or_else(|| PlaygroundError::Network {
                detail: format!("404 - no snippet {}", id),
            })
    }

    async fn fetch_source(&self, id: &str) -> Result<String, PlaygroundError> {
        self.gate().await?;
        self.sources
            .get(id)
            .cloned()
            .ok_or_else(|| PlaygroundError::Network {
                detail: format!("404 - no source {}", id),
            })
    }

    async fn evaluate_code(&self, req: &EvalRequest) -> Result<EvalOutcome, PlaygroundError> {
        self.gate().await?;
        self.submitted.lock().unwrap().push(req.clone());
        Ok(self
            .submit_result
            .clone()
            .unwrap_or(EvalOutcome::Success { stdout: String::new() }))
    }
}

fn reference_runner(evaluator: Arc<FakeEvaluator>) -> SnippetRunner {
    SnippetRunner::new(evaluator, ResolveMode::Reference, SubmitOptions::default())
}

#[tokio::test]
async fn click_appends_exactly_one_result_block() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator
        .snippets
        .insert("hello.pony".into(), EvalOutcome::Success { stdout: "42".into() });

    let mut page = Page::new();
    let area = page.push_output();
    page.push_trigger("hello.pony");

    let binding = reference_runner(Arc::new(evaluator)).bind(&page);
    binding.click(0).unwrap().handle.await??;

    assert_eq!(area.blocks(), vec![OutputBlock::Result("42".into())]);
    Ok(())
}

#[tokio::test]
async fn compile_failure_renders_compiler_text() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator.snippets.insert(
        "broken.pony".into(),
        EvalOutcome::Failure { compiler: "syntax error".into() },
    );

    let mut page = Page::new();
    let area = page.push_output();
    page.push_trigger("broken.pony");

    let binding = reference_runner(Arc::new(evaluator)).bind(&page);
    binding.click(0).unwrap().handle.await??;

    assert_eq!(area.blocks(), vec![OutputBlock::Result("syntax error".into())]);
    Ok(())
}

#[tokio::test]
async fn submission_carries_fetched_source_unmodified() -> Result<()> {
    let raw = "actor Main\n  new create(env: Env) =>\n    env.out.print(\"hi\")\n";
    let mut evaluator = FakeEvaluator::default();
    evaluator.sources.insert("hello.pony".into(), raw.into());
    evaluator.submit_result = Some(EvalOutcome::Success { stdout: "hi".into() });
    let evaluator = Arc::new(evaluator);

    let opts = SubmitOptions {
        branch: "nightly".into(),
        color: true,
        separate_output: false,
    };
    let runner = SnippetRunner::new(evaluator.clone(), ResolveMode::Submission, opts);

    let mut page = Page::new();
    let area = page.push_output();
    page.push_trigger("hello.pony");

    runner.bind(&page).click(0).unwrap().handle.await??;

    let submitted = evaluator.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].code, raw);
    assert_eq!(submitted[0].branch, "nightly");
    assert!(submitted[0].color);
    assert!(!submitted[0].separate_output);
    drop(submitted);

    assert_eq!(area.blocks(), vec![OutputBlock::Result("hi".into())]);
    Ok(())
}

#[tokio::test]
async fn overlapping_clicks_append_two_independent_blocks() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator
        .snippets
        .insert("hello.pony".into(), EvalOutcome::Success { stdout: "42".into() });
    evaluator.delay = Some(Duration::from_millis(25));

    let mut page = Page::new();
    let area = page.push_output();
    page.push_trigger("hello.pony");

    let binding = reference_runner(Arc::new(evaluator)).bind(&page);
    // Second click lands before the first resolves.
    let first = binding.click(0).unwrap();
    let second = binding.click(0).unwrap();
    for joined in futures::future::join_all([first.handle, second.handle]).await {
        joined??;
    }

    let blocks = area.blocks();
    assert_eq!(blocks.len(), 2);
    assert!(blocks.iter().all(|b| *b == OutputBlock::Result("42".into())));
    Ok(())
}

#[tokio::test]
async fn clicks_in_sequence_accumulate_rather_than_replace() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator
        .snippets
        .insert("hello.pony".into(), EvalOutcome::Success { stdout: "42".into() });

    let mut page = Page::new();
    let area = page.push_output();
    page.push_trigger("hello.pony");

    let binding = reference_runner(Arc::new(evaluator)).bind(&page);
    binding.click(0).unwrap().handle.await??;
    binding.click(0).unwrap().handle.await??;

    assert_eq!(area.len(), 2);
    Ok(())
}

#[tokio::test]
async fn click_always_suppresses_default_action() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator.fail = Some(Fail::Network);

    let mut page = Page::new();
    page.push_output();
    page.push_trigger("hello.pony");

    let binding = reference_runner(Arc::new(evaluator)).bind(&page);
    let click = binding.click(0).unwrap();
    // Latched synchronously, before the task has run at all.
    assert!(click.activation.default_prevented());
    let _ = click.handle.await?;
    Ok(())
}

#[tokio::test]
async fn network_failure_renders_visible_error_block() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator.fail = Some(Fail::Network);

    let mut page = Page::new();
    let area = page.push_output();
    page.push_trigger("hello.pony");

    let binding = reference_runner(Arc::new(evaluator)).bind(&page);
    let res = binding.click(0).unwrap().handle.await?;
    assert!(matches!(res, Err(RunnerError::Network { .. })));

    let blocks = area.blocks();
    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        OutputBlock::Error(msg) => assert!(msg.contains("network failure"), "got: {}", msg),
        other => panic!("expected error block, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn parse_failure_renders_visible_error_block() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator.fail = Some(Fail::Parse);

    let mut page = Page::new();
    let area = page.push_output();
    page.push_trigger("hello.pony");

    let binding = reference_runner(Arc::new(evaluator)).bind(&page);
    let res = binding.click(0).unwrap().handle.await?;
    assert!(matches!(res, Err(RunnerError::Parse { .. })));

    let blocks = area.blocks();
    assert_eq!(blocks.len(), 1);
    assert!(matches!(&blocks[0], OutputBlock::Error(msg) if msg.contains("malformed response")));
    Ok(())
}

#[tokio::test]
async fn missing_output_container_surfaces_markup_error() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator
        .snippets
        .insert("orphan.pony".into(), EvalOutcome::Success { stdout: "42".into() });
    let evaluator = Arc::new(evaluator);

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let runner = SnippetRunner::new(
        evaluator.clone(),
        ResolveMode::Reference,
        SubmitOptions::default(),
    )
    .error_hook(move |err: &RunnerError| {
        sink.lock().unwrap().push(err.to_string());
    });

    // No output sibling anywhere before the trigger.
    let mut page = Page::new();
    page.push_trigger("orphan.pony");

    let binding = runner.bind(&page);
    let res = binding.click(0).unwrap().handle.await?;
    assert!(matches!(res, Err(RunnerError::Markup { .. })));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("markup failure"), "got: {}", seen[0]);
    // The faulty trigger never reached the network.
    assert_eq!(evaluator.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn empty_snippet_id_is_rejected_before_any_call() -> Result<()> {
    let evaluator = Arc::new(FakeEvaluator::default());

    let mut page = Page::new();
    let area = page.push_output();
    page.push_trigger("  ");

    let binding = reference_runner(evaluator.clone()).bind(&page);
    let res = binding.click(0).unwrap().handle.await?;
    assert!(matches!(res, Err(RunnerError::Markup { .. })));

    assert!(matches!(&area.blocks()[0], OutputBlock::Error(msg) if msg.contains("markup failure")));
    assert_eq!(evaluator.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn markup_fault_is_returned_even_without_a_hook() -> Result<()> {
    let evaluator = Arc::new(FakeEvaluator::default());

    // No output sibling and no error hook installed.
    let mut page = Page::new();
    page.push_trigger("orphan.pony");

    let binding = reference_runner(evaluator.clone()).bind(&page);
    let res = binding.click(0).unwrap().handle.await?;
    assert!(matches!(res, Err(RunnerError::Markup { .. })));
    assert_eq!(evaluator.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn binding_discovers_triggers_once_and_clicks_by_index() -> Result<()> {
    let mut evaluator = FakeEvaluator::default();
    evaluator
        .snippets
        .insert("a.pony".into(), EvalOutcome::Success { stdout: "a".into() });
    evaluator
        .snippets
        .insert("b.pony".into(), EvalOutcome::Success { stdout: "b".into() });

    let mut page = Page::new();
    let first = page.push_output();
    page.push_trigger("a.pony");
    let second = page.push_output();
    page.push_trigger("b.pony");

    let binding = reference_runner(Arc::new(evaluator)).bind(&page);
    assert_eq!(binding.len(), 2);
    assert!(binding.click(5).is_none());

    binding.click(1).unwrap().handle.await??;
    assert!(first.is_empty());
    assert_eq!(second.blocks(), vec![OutputBlock::Result("b".into())]);

    // Disposing consumes the binding; no further clicks can be
    // delivered through it.
    binding.dispose();
    Ok(())
}
