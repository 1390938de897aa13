//! Two-stage blog pipeline: document text → research brief → blog post.
//!
//! ```text
//! START -> RESEARCH -> WRITE -> DONE
//!          RESEARCH -> FAILED(research)
//!                      WRITE -> FAILED(write)
//! ```
//!
//! Stages run strictly in order; the writer only ever sees the brief. A
//! failed stage ends the run and nothing after it is attempted.

use std::time::Instant;

use tracing::{info, instrument, warn};

use docbrief_shared::{BlogArtifacts, DocBriefError, Result, Stage};

use crate::invoker::LlmInvoker;
use crate::prompt;

/// Progress callback for reporting pipeline status.
pub trait PipelineProgress: Send + Sync {
    /// Called before a stage invokes the model.
    fn stage_started(&self, stage: Stage);
    /// Called after a stage produced its artifact.
    fn stage_finished(&self, stage: Stage, artifact_chars: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl PipelineProgress for SilentProgress {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage, _artifact_chars: usize) {}
}

/// Run research then write over `document_text`.
///
/// Returns both artifacts on success. On failure the error is
/// [`DocBriefError::Stage`] tagged with the stage that failed; blank input
/// is rejected with [`DocBriefError::EmptyCorpus`] before any invocation.
#[instrument(skip_all, fields(model = invoker.model(), chars = document_text.len()))]
pub async fn run_blog_pipeline(
    invoker: &dyn LlmInvoker,
    document_text: &str,
    progress: &dyn PipelineProgress,
) -> Result<BlogArtifacts> {
    if document_text.trim().is_empty() {
        return Err(DocBriefError::EmptyCorpus);
    }

    let start = Instant::now();

    let brief = run_stage(
        invoker,
        Stage::Research,
        &prompt::research_prompt(document_text),
        progress,
    )
    .await?;

    let post = run_stage(invoker, Stage::Write, &prompt::writer_prompt(&brief), progress).await?;

    info!(
        brief_chars = brief.len(),
        post_chars = post.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "blog pipeline complete"
    );

    Ok(BlogArtifacts { brief, post })
}

async fn run_stage(
    invoker: &dyn LlmInvoker,
    stage: Stage,
    prompt: &str,
    progress: &dyn PipelineProgress,
) -> Result<String> {
    progress.stage_started(stage);
    info!(%stage, prompt_chars = prompt.len(), "stage started");

    match invoker.invoke(prompt).await {
        Ok(output) => {
            progress.stage_finished(stage, output.len());
            info!(%stage, output_chars = output.len(), "stage finished");
            Ok(output)
        }
        Err(e) => {
            warn!(%stage, error = %e, "stage failed, aborting pipeline");
            Err(DocBriefError::stage(stage, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use docbrief_shared::InvocationError;

    use super::*;
    use crate::invoker::mock::ScriptedInvoker;

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgress for RecordingProgress {
        fn stage_started(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start:{stage}"));
        }
        fn stage_finished(&self, stage: Stage, _artifact_chars: usize) {
            self.events.lock().unwrap().push(format!("finish:{stage}"));
        }
    }

    #[tokio::test]
    async fn success_returns_brief_and_post() {
        let invoker = ScriptedInvoker::replying(&["BRIEF_TEXT", "POST_TEXT"]);

        let artifacts = run_blog_pipeline(&invoker, "Widgets are great.", &SilentProgress)
            .await
            .unwrap();

        assert_eq!(
            artifacts,
            BlogArtifacts {
                brief: "BRIEF_TEXT".into(),
                post: "POST_TEXT".into(),
            }
        );
        assert_eq!(invoker.calls(), 2);
    }

    #[tokio::test]
    async fn writer_receives_brief_verbatim() {
        let invoker = ScriptedInvoker::replying(&["BRIEF_TEXT", "POST_TEXT"]);
        run_blog_pipeline(&invoker, "Widgets are great.", &SilentProgress)
            .await
            .unwrap();

        let prompts = invoker.prompts();
        assert!(prompts[0].contains("Widgets are great."));
        assert!(prompts[1].contains("Research Brief:\nBRIEF_TEXT"));
        assert!(!prompts[1].contains("Widgets are great."));
    }

    #[tokio::test]
    async fn research_failure_skips_write() {
        let invoker = ScriptedInvoker::new([
            Err(InvocationError::new("quota exceeded")),
            Ok("POST_TEXT".to_string()),
        ]);

        let err = run_blog_pipeline(&invoker, "doc", &SilentProgress)
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::Research));
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(invoker.calls(), 1);
    }

    #[tokio::test]
    async fn write_failure_is_tagged_write() {
        let invoker = ScriptedInvoker::new([
            Ok("BRIEF_TEXT".to_string()),
            Err(InvocationError::new("503 Service Unavailable")),
        ]);

        let err = run_blog_pipeline(&invoker, "doc", &SilentProgress)
            .await
            .unwrap_err();

        match err {
            DocBriefError::Stage { stage, source } => {
                assert_eq!(stage, Stage::Write);
                assert_eq!(source.message(), "503 Service Unavailable");
            }
            other => panic!("expected stage error, got {other:?}"),
        }
        assert_eq!(invoker.calls(), 2);
    }

    #[tokio::test]
    async fn brief_mentioning_error_is_not_a_failure() {
        let invoker = ScriptedInvoker::replying(&[
            "Error handling: the paper covers Error types in depth.",
            "POST_TEXT",
        ]);

        let artifacts = run_blog_pipeline(&invoker, "doc", &SilentProgress)
            .await
            .unwrap();

        assert!(artifacts.brief.contains("Error"));
        assert_eq!(artifacts.post, "POST_TEXT");
        assert_eq!(invoker.calls(), 2);
    }

    #[tokio::test]
    async fn blank_document_is_rejected_without_invoking() {
        let invoker = ScriptedInvoker::replying(&["BRIEF_TEXT", "POST_TEXT"]);

        let err = run_blog_pipeline(&invoker, "  \n\t", &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, DocBriefError::EmptyCorpus));
        assert_eq!(invoker.calls(), 0);
    }

    #[tokio::test]
    async fn progress_reports_stages_in_order() {
        let invoker = ScriptedInvoker::new([
            Ok("BRIEF_TEXT".to_string()),
            Err(InvocationError::new("boom")),
        ]);
        let progress = RecordingProgress::default();

        let _ = run_blog_pipeline(&invoker, "doc", &progress).await;

        assert_eq!(
            *progress.events.lock().unwrap(),
            vec!["start:research", "finish:research", "start:write"]
        );
    }
}
