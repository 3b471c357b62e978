use std::sync::Mutex;

use crate::llm::{ChatModel, ChatRequest, LlmError};

/// Deterministic model for tests and offline runs.
///
/// Returns a fixed reply (or a fixed failure) and records every request.
#[derive(Debug)]
pub struct MockModel {
    reply: Result<String, String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A model whose every call fails with a communication error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChatRequest>> {
        // Poisoning only means another caller panicked mid-push
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChatModel for MockModel {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.lock().push(request.clone());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(LlmError::Communication(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user("hello")],
            temperature: 0.7,
        }
    }

    #[test]
    fn test_mock_records_requests() {
        let model = MockModel::new("world");
        assert_eq!(model.complete(&request()).unwrap(), "world");
        assert_eq!(model.call_count(), 1);
        assert_eq!(model.requests()[0].messages[0].content, "hello");
    }

    #[test]
    fn test_failing_mock() {
        let model = MockModel::failing("boom");
        let err = model.complete(&request()).unwrap_err();
        assert!(matches!(err, LlmError::Communication(ref m) if m == "boom"));
    }
}
