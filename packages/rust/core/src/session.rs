//! Per-session state: the document corpus and the conversation log.
//!
//! A [`Session`] is owned by the presentation layer and passed into every
//! operation. Nothing here is process-global; two sessions never share a
//! corpus or a log.

use tracing::{debug, info, instrument, warn};

use docbrief_shared::{BlogArtifacts, ChatConfig, DocBriefError, Result, SessionId, Turn};

use crate::conversation::{self, ConversationLog};
use crate::invoker::LlmInvoker;
use crate::pipeline::{self, PipelineProgress};
use crate::prompt;

/// One interactive session.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    corpus: String,
    log: ConversationLog,
    history_window: usize,
}

impl Session {
    /// A fresh session with no document text and an empty log.
    pub fn new(chat: &ChatConfig) -> Self {
        let log = match chat.max_retained_turns {
            Some(max) => ConversationLog::with_max_retained(max),
            None => ConversationLog::new(),
        };

        Self {
            id: SessionId::new(),
            corpus: String::new(),
            log,
            history_window: chat.history_window,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Replace the document corpus. The conversation log is kept.
    pub fn process(&mut self, text: String) {
        if text.trim().is_empty() {
            warn!(session = %self.id, "processed documents yielded no text");
        }
        info!(session = %self.id, chars = text.len(), "document corpus replaced");
        self.corpus = text;
    }

    pub fn corpus(&self) -> &str {
        &self.corpus
    }

    pub fn has_corpus(&self) -> bool {
        !self.corpus.trim().is_empty()
    }

    /// Retained turns, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.log.turns()
    }

    /// Clear the conversation log. The corpus is kept.
    pub fn reset(&mut self) {
        info!(session = %self.id, turns = self.log.len(), "conversation reset");
        self.log.reset();
    }

    /// Answer `question` from the corpus and recent history.
    ///
    /// The history window holds the last K turns counting the question
    /// itself. The question and answer are recorded only when the
    /// invocation succeeds; on any error the log is left as it was.
    #[instrument(skip_all, fields(session = %self.id, model = invoker.model()))]
    pub async fn ask(&mut self, invoker: &dyn LlmInvoker, question: &str) -> Result<String> {
        if !self.has_corpus() {
            return Err(DocBriefError::EmptyCorpus);
        }
        if question.trim().is_empty() {
            return Err(DocBriefError::EmptyQuestion);
        }

        let pending = Turn::user(question);
        let history = self.history_with(&pending);
        let prompt = prompt::qa_prompt(&self.corpus, &history, question);

        debug!(
            prompt_chars = prompt.len(),
            history_lines = history.lines().count(),
            "answering question"
        );

        let answer = invoker.invoke(&prompt).await?;

        self.log.append(pending);
        self.log.append(Turn::assistant(answer.clone()));

        Ok(answer)
    }

    /// Generate a brief and a blog post from the corpus.
    pub async fn create_blog_post(
        &self,
        invoker: &dyn LlmInvoker,
        progress: &dyn PipelineProgress,
    ) -> Result<BlogArtifacts> {
        if !self.has_corpus() {
            return Err(DocBriefError::EmptyCorpus);
        }
        pipeline::run_blog_pipeline(invoker, &self.corpus, progress).await
    }

    /// Serialized window as it would be after appending `pending`.
    fn history_with(&self, pending: &Turn) -> String {
        conversation::serialize(self.log.window_with(pending, self.history_window))
    }
}
