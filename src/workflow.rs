//! Orchestrator entry points.
//!
//! A run moves strictly forward through the [`WorkflowState`]s:
//!
//! ```text
//! Parsing → Extracting → Prompting → AwaitingResponse → Formatting → Done
//! ```
//!
//! Any error jumps straight to `Failed` and is returned unchanged; no stage
//! recovers or retries, and no partial output is produced. Each transition is
//! reported to the configured [`crate::status::StatusCallback`].
//!
//! [`run`] awaits the result in place. [`spawn`] runs it on a Tokio task and
//! hands status events back through a channel, for interfaces that must
//! apply them on their own task.

use crate::config::SummarizerConfig;
use crate::document::Document;
use crate::error::DocSumError;
use crate::output::{FormattedOutput, RunStats, StructuredSummary};
use crate::pipeline::llm::{InferenceBackend, OllamaClient};
use crate::pipeline::{extract, postprocess, response};
use crate::prompts;
use crate::request::{self, Mode, RequestParameters};
use crate::status::{ChannelStatus, NoopStatus, SharedStatus, StatusCallback, StatusEvent, WorkflowState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Summarize or answer, depending on the request.
///
/// A non-blank question selects question-answer mode; otherwise a
/// structured summary is produced.
///
/// # Errors
/// Every failure from extraction, the usability check or the inference
/// call is returned unchanged. See [`DocSumError`].
pub async fn run(
    path: impl AsRef<Path>,
    params: &RequestParameters,
    config: &SummarizerConfig,
) -> Result<FormattedOutput, DocSumError> {
    execute(path.as_ref(), params, params.mode(), config).await
}

/// Produce a structured summary, ignoring any question in `params`.
pub async fn summarize(
    path: impl AsRef<Path>,
    params: &RequestParameters,
    config: &SummarizerConfig,
) -> Result<FormattedOutput, DocSumError> {
    execute(path.as_ref(), params, Mode::Summarize, config).await
}

/// Answer `question` strictly from the document.
///
/// # Errors
/// [`DocSumError::InvalidQuestion`] when `question` is blank.
pub async fn answer_question(
    path: impl AsRef<Path>,
    question: &str,
    params: &RequestParameters,
    config: &SummarizerConfig,
) -> Result<FormattedOutput, DocSumError> {
    let params = RequestParameters {
        question: Some(question.to_string()),
        ..params.clone()
    };
    execute(path.as_ref(), &params, Mode::QuestionAnswer, config).await
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(
    path: impl AsRef<Path>,
    params: &RequestParameters,
    config: &SummarizerConfig,
) -> Result<FormattedOutput, DocSumError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocSumError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(path, params, config))
}

/// A run executing on a background task.
pub struct RunHandle {
    /// Status events in emission order. Closes once the run has finished.
    pub events: UnboundedReceiver<StatusEvent>,
    task: JoinHandle<Result<FormattedOutput, DocSumError>>,
}

impl RunHandle {
    /// Wait for the run to finish and return its result.
    pub async fn finish(self) -> Result<FormattedOutput, DocSumError> {
        self.task
            .await
            .map_err(|e| DocSumError::Internal(format!("Workflow task failed: {}", e)))?
    }
}

/// Start [`run`] on a Tokio task.
///
/// The task owns its inputs. Status events go to [`RunHandle::events`] and
/// also to any callback already present in `config`.
pub fn spawn(
    path: impl Into<PathBuf>,
    params: RequestParameters,
    mut config: SummarizerConfig,
) -> RunHandle {
    let path = path.into();
    let (tx, events) = mpsc::unbounded_channel();

    let channel: SharedStatus = Arc::new(ChannelStatus::new(tx));
    let status: SharedStatus = match config.status_callback.take() {
        Some(existing) => Arc::new(TeeStatus(vec![existing, channel])),
        None => channel,
    };
    config.status_callback = Some(status);

    let task = tokio::spawn(async move { run(&path, &params, &config).await });
    RunHandle { events, task }
}

/// Write `text` to `path` byte for byte.
///
/// Missing parent directories are created. The write goes to a temp file
/// that is then renamed, so a failed save never leaves a partial file.
pub async fn save_output(path: impl AsRef<Path>, text: &str) -> Result<(), DocSumError> {
    let path = path.as_ref();
    let write_err = |e| DocSumError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    tokio::fs::write(&tmp_path, text.as_bytes())
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    debug!("Saved {} bytes to {}", text.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Fans status events out to several callbacks.
struct TeeStatus(Vec<SharedStatus>);

impl StatusCallback for TeeStatus {
    fn on_state(&self, state: WorkflowState, message: &str) {
        for cb in &self.0 {
            cb.on_state(state, message);
        }
    }

    fn on_warning(&self, message: &str) {
        for cb in &self.0 {
            cb.on_warning(message);
        }
    }
}

fn enter(status: &SharedStatus, state: WorkflowState) {
    debug!("Workflow state: {:?}", state);
    status.on_state(state, state.status_message());
}

async fn execute(
    path: &Path,
    params: &RequestParameters,
    mode: Mode,
    config: &SummarizerConfig,
) -> Result<FormattedOutput, DocSumError> {
    let status: SharedStatus = config
        .status_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopStatus));

    let result = execute_stages(path, params, mode, config, &status).await;
    if let Err(ref e) = result {
        warn!("Run failed: {}", e);
        status.on_state(WorkflowState::Failed, &e.to_string());
    }
    result
}

async fn execute_stages(
    path: &Path,
    params: &RequestParameters,
    mode: Mode,
    config: &SummarizerConfig,
    status: &SharedStatus,
) -> Result<FormattedOutput, DocSumError> {
    let total_start = Instant::now();

    let question = match mode {
        Mode::QuestionAnswer => Some(
            params
                .active_question()
                .ok_or(DocSumError::InvalidQuestion)?
                .to_string(),
        ),
        Mode::Summarize => None,
    };
    let model = params
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(config.model.as_str())
        .to_string();

    info!("Starting {:?} run: {}", mode, path.display());

    // ── Step 1: Parse ────────────────────────────────────────────────────
    enter(status, WorkflowState::Parsing);
    let document = Document::from_path(path)?;

    // ── Step 2: Extract ──────────────────────────────────────────────────
    enter(status, WorkflowState::Extracting);
    let extract_start = Instant::now();
    let extracted = extract::extract_text(&document, config).await?;
    let extraction_duration_ms = extract_start.elapsed().as_millis() as u64;

    if !extracted.is_usable(config.min_usable_chars) {
        return Err(DocSumError::DocumentTooShort {
            chars: extracted.trimmed_len(),
            minimum: config.min_usable_chars,
        });
    }

    // ── Step 3: Build prompt ─────────────────────────────────────────────
    enter(status, WorkflowState::Prompting);
    let (prompt, target_words) = match question.as_deref() {
        Some(q) => (
            prompts::build_question_prompt(config.question_template.as_deref(), &extracted.text, q),
            None,
        ),
        None => {
            let target = request::target_word_count(extracted.word_count, params.length_fraction);
            debug!(
                "Target summary length: {} words ({} source words)",
                target, extracted.word_count
            );
            let prompt = prompts::build_summary_prompt(
                config.summary_template.as_deref(),
                &extracted.text,
                target,
                &params.keywords,
            );
            (prompt, Some(target))
        }
    };

    // ── Step 4: Inference ────────────────────────────────────────────────
    enter(status, WorkflowState::AwaitingResponse);
    let backend = resolve_backend(config)?;
    let inference_start = Instant::now();
    let raw = backend.generate(&model, &prompt).await?;
    let inference_duration_ms = inference_start.elapsed().as_millis() as u64;
    info!("Model {} answered in {}ms", model, inference_duration_ms);

    // ── Step 5: Format ───────────────────────────────────────────────────
    enter(status, WorkflowState::Formatting);
    let cleaned = postprocess::clean_response(&raw);
    if cleaned.trim().is_empty() {
        return Err(DocSumError::EmptyResponse);
    }

    let stats = RunStats {
        model,
        source_words: extracted.word_count,
        target_words,
        extraction_method: extracted.method,
        extraction_duration_ms,
        inference_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    let output = match question {
        Some(q) => {
            let answer = apply_word_limit(cleaned.trim(), config.summary_word_limit);
            FormattedOutput {
                mode,
                text: postprocess::render_answer(&q, &answer),
                summary: None,
                question: Some(q.trim().to_string()),
                answer: Some(answer),
                stats,
            }
        }
        None => {
            let parsed = response::parse_structured_response(&cleaned);
            let summary = StructuredSummary {
                summary: apply_word_limit(&parsed.summary, config.summary_word_limit),
                ..parsed
            };
            FormattedOutput {
                mode,
                text: postprocess::render_summary(&summary),
                summary: Some(summary),
                question: None,
                answer: None,
                stats,
            }
        }
    };

    enter(status, WorkflowState::Done);
    info!(
        "Run complete: {} chars of output in {}ms",
        output.text.len(),
        output.stats.total_duration_ms
    );
    Ok(output)
}

fn apply_word_limit(text: &str, limit: Option<usize>) -> String {
    match limit {
        Some(n) => postprocess::enforce_word_limit(text, n),
        None => text.to_string(),
    }
}

/// The configured backend, or an [`OllamaClient`] for `config.endpoint`.
fn resolve_backend(config: &SummarizerConfig) -> Result<Arc<dyn InferenceBackend>, DocSumError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }
    Ok(Arc::new(OllamaClient::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_limit_is_optional() {
        assert_eq!(apply_word_limit("a b c", None), "a b c");
        assert_eq!(apply_word_limit("a b c", Some(2)), "a b...");
    }

    #[tokio::test]
    async fn save_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/summary.txt");
        save_output(&path, "TITLE: x").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "TITLE: x");
        assert!(!dir.path().join("nested/deeper/summary.txt.tmp").exists());
    }

    #[tokio::test]
    async fn missing_file_reports_failed_state() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct Last(Mutex<Option<WorkflowState>>);
        impl StatusCallback for Last {
            fn on_state(&self, state: WorkflowState, _message: &str) {
                *self.0.lock().unwrap() = Some(state);
            }
        }

        let last = Arc::new(Last::default());
        let config = SummarizerConfig::builder()
            .status_callback(last.clone())
            .build()
            .unwrap();
        let err = run("/no/such/file.txt", &RequestParameters::new(), &config)
            .await
            .unwrap_err();

        assert!(matches!(err, DocSumError::IoFailure { .. }), "got {err:?}");
        assert_eq!(*last.0.lock().unwrap(), Some(WorkflowState::Failed));
    }
}
