use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use docbrief_shared::InvocationError;

use super::LlmInvoker;

/// Test invoker that replays scripted replies and records every prompt.
///
/// Once the script runs out it echoes the prompt back.
pub(crate) struct ScriptedInvoker {
    replies: Mutex<VecDeque<Result<String, InvocationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
    pub(crate) fn new(replies: impl IntoIterator<Item = Result<String, InvocationError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok((*r).to_string())))
    }

    pub(crate) fn echo() -> Self {
        Self::new(Vec::<Result<String, InvocationError>>::new())
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmInvoker for ScriptedInvoker {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, InvocationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(prompt.to_string()))
    }
}
