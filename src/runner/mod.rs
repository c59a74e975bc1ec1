//! SnippetRunner: binds run-button triggers in a page model and drives
//! one independent evaluation task per activation.
//!
//! Binding is explicit: `SnippetRunner::bind` takes a page root and
//! returns a [`Binding`] that owns every attachment. Dropping (or
//! disposing) the binding detaches everything; there is no hidden
//! process-wide registration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::page::{OutputBlock, Page, TriggerRef};
use crate::playground::{EvalOutcome, EvalRequest, Evaluate, PlaygroundError};

/// How a trigger's snippet id becomes runnable code on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// One round trip: the service resolves the id itself.
    Reference,
    /// Two round trips: fetch raw source, then submit it for evaluation.
    Submission,
}

/// Knobs carried into an evaluation-by-submission body.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub branch: String,
    pub color: bool,
    pub separate_output: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            branch: "release".to_string(),
            color: false,
            separate_output: true,
        }
    }
}

/// The three failure kinds an activation can surface. Every one renders
/// visibly; none aborts silently.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("network failure: {detail}")]
    Network { detail: String },

    #[error("malformed response: {detail}")]
    Parse { detail: String },

    #[error("markup failure: {detail}")]
    Markup { detail: String },
}

impl From<PlaygroundError> for RunnerError {
    fn from(err: PlaygroundError) -> Self {
        match err {
            PlaygroundError::Network { detail } => RunnerError::Network { detail },
            PlaygroundError::Parse { detail } => RunnerError::Parse { detail },
            // An empty identifier means the trigger markup was broken.
            PlaygroundError::EmptyIdentifier => RunnerError::Markup {
                detail: "empty snippet identifier".to_string(),
            },
        }
    }
}

/// Shared resolution pipeline. `Binding::click` wraps this with page
/// dispatch; the CLI handlers call it directly.
pub async fn resolve_outcome(
    evaluator: &dyn Evaluate,
    mode: ResolveMode,
    opts: &SubmitOptions,
    id: &str,
) -> Result<EvalOutcome, RunnerError> {
    // Rejected here, before any evaluator call.
    if id.trim().is_empty() {
        return Err(PlaygroundError::EmptyIdentifier.into());
    }
    match mode {
        ResolveMode::Reference => Ok(evaluator.evaluate_snippet(id).await?),
        ResolveMode::Submission => {
            // The fetched text goes into the body unmodified.
            let code = evaluator.fetch_source(id).await?;
            let req = EvalRequest {
                code,
                separate_output: opts.separate_output,
                color: opts.color,
                branch: opts.branch.clone(),
            };
            Ok(evaluator.evaluate_code(&req).await?)
        }
    }
}

/// The trigger event handed to a click. The runner latches
/// `prevent_default` before any network I/O so the host never
/// navigates away.
#[derive(Debug, Default)]
pub struct Activation {
    default_prevented: AtomicBool,
}

impl Activation {
    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}

type ErrorHook = Arc<dyn Fn(&RunnerError) + Send + Sync>;

pub struct SnippetRunner {
    evaluator: Arc<dyn Evaluate>,
    mode: ResolveMode,
    opts: SubmitOptions,
    on_error: Option<ErrorHook>,
}

impl SnippetRunner {
    pub fn new(evaluator: Arc<dyn Evaluate>, mode: ResolveMode, opts: SubmitOptions) -> Self {
        Self { evaluator, mode, opts, on_error: None }
    }

    /// Install a callback observing every classified failure, in
    /// addition to the visible error block rendered into the page.
    pub fn error_hook(mut self, hook: impl Fn(&RunnerError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Discover every trigger under the page root, once, and attach.
    pub fn bind(&self, page: &Page) -> Binding {
        Binding {
            evaluator: self.evaluator.clone(),
            mode: self.mode,
            opts: self.opts.clone(),
            on_error: self.on_error.clone(),
            triggers: page.triggers(),
        }
    }
}

/// A click in flight: the activation (for inspecting the
/// prevent-default latch) and the spawned task driving it. The task
/// resolves to the activation's classified failure, if any, so a
/// trigger with nowhere to render still cannot fail silently.
pub struct ClickTask {
    pub activation: Arc<Activation>,
    pub handle: JoinHandle<Result<(), RunnerError>>,
}

/// Everything one `bind` attached. Disposing it (or letting it drop)
/// detaches all triggers; clicks can only be delivered through a live
/// binding.
pub struct Binding {
    evaluator: Arc<dyn Evaluate>,
    mode: ResolveMode,
    opts: SubmitOptions,
    on_error: Option<ErrorHook>,
    triggers: Vec<TriggerRef>,
}

impl Binding {
    pub fn triggers(&self) -> &[TriggerRef] {
        &self.triggers
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn dispose(self) {}

    /// Deliver a click to the nth bound trigger. Each click spawns its
    /// own task; overlapping clicks progress independently and append
    /// in completion order.
    pub fn click(&self, index: usize) -> Option<ClickTask> {
        let trigger = self.triggers.get(index)?.clone();
        let activation = Arc::new(Activation::default());
        // Step one of the contract, before any await point.
        activation.prevent_default();

        let evaluator = self.evaluator.clone();
        let mode = self.mode;
        let opts = self.opts.clone();
        let on_error = self.on_error.clone();

        let handle = tokio::spawn(async move {
            let Some(area) = trigger.output.as_ref() else {
                let err = RunnerError::Markup {
                    detail: format!(
                        "trigger for '{}' has no preceding output container",
                        trigger.snippet_id
                    ),
                };
                if let Some(hook) = &on_error {
                    hook(&err);
                }
                // No container to render into, so the fault travels
                // out through the task itself.
                return Err(err);
            };

            match resolve_outcome(evaluator.as_ref(), mode, &opts, &trigger.snippet_id).await {
                Ok(outcome) => {
                    // Success and compile failure both render as a
                    // result block; the service answered either way.
                    area.append(OutputBlock::Result(outcome.text().to_string()));
                    Ok(())
                }
                Err(err) => {
                    area.append(OutputBlock::Error(err.to_string()));
                    if let Some(hook) = &on_error {
                        hook(&err);
                    }
                    Err(err)
                }
            }
        });

        Some(ClickTask { activation, handle })
    }
}
