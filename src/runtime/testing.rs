//! Mock implementations for testing
//!
//! These mocks drive the runtime without any network I/O.

use crate::backend::{
    BackendHealth, ChatBackend, ChatRequest, CodeGenReply, CodeGenRequest, ExchangeError,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Backend
// ============================================================================

/// Backend that returns queued outcomes and records what it was sent
pub struct MockBackend {
    replies: Mutex<VecDeque<Result<String, ExchangeError>>>,
    code: Mutex<VecDeque<Result<CodeGenReply, ExchangeError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    codegen_requests: Mutex<Vec<CodeGenRequest>>,
    /// When set, every chat call waits for one notification before answering
    gate: Option<Arc<Notify>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            code: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            codegen_requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// A backend whose chat calls block until the returned `Notify` fires
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new()
        };
        (backend, gate)
    }

    pub fn queue_reply(&self, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
    }

    pub fn queue_error(&self, error: ExchangeError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_code(&self, outcome: Result<CodeGenReply, ExchangeError>) {
        self.code.lock().unwrap().push_back(outcome);
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn recorded_codegen_requests(&self) -> Vec<CodeGenRequest> {
        self.codegen_requests.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ExchangeError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::transport("No mock response queued")))
    }

    async fn generate_code(&self, request: &CodeGenRequest) -> Result<CodeGenReply, ExchangeError> {
        self.codegen_requests.lock().unwrap().push(request.clone());
        self.code
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::transport("No mock code queued")))
    }

    async fn health(&self) -> Result<BackendHealth, ExchangeError> {
        Ok(BackendHealth {
            status: "ok".to_string(),
            model: Some("mock".to_string()),
            api_configured: true,
        })
    }

    fn endpoint(&self) -> &str {
        "mock://backend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CodeGenMetadata, ErrorCategory};
    use crate::codegen::CodegenError;
    use crate::display::{DisplayEntry, Transcript};
    use crate::render::render;
    use crate::runtime::ChatRuntime;
    use crate::session::{Role, Session, Turn};
    use crate::state_machine::{Event, TerminalOutcome, TransitionError, TurnState};
    use std::time::Duration;

    const SYSTEM: &str = "You are a coding assistant.";

    fn runtime(backend: &Arc<MockBackend>) -> ChatRuntime<Transcript> {
        ChatRuntime::new(Session::new(SYSTEM), backend.clone(), Transcript::new())
    }

    /// Drive completions, failing the test instead of hanging
    async fn settle(rt: &mut ChatRuntime<Transcript>) {
        tokio::time::timeout(Duration::from_secs(2), rt.wait_idle())
            .await
            .expect("runtime did not go idle");
    }

    fn turn_entry(role: Role, content: &str) -> DisplayEntry {
        DisplayEntry::Turn {
            role,
            document: render(content),
        }
    }

    fn notice(category: ErrorCategory, message: &str) -> DisplayEntry {
        DisplayEntry::Notice {
            category,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_backend_reports_missing_reply() {
        let mock = MockBackend::new();
        mock.queue_reply("hi");
        let request = ChatRequest { messages: vec![] };

        assert_eq!(mock.chat(&request).await, Ok("hi".to_string()));
        assert!(matches!(
            mock.chat(&request).await,
            Err(ExchangeError::Transport(_))
        ));
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply("hi");
        let mut rt = runtime(&backend);

        rt.submit("hello").unwrap();

        assert!(rt.state().is_pending());
        assert!(!rt.display().submit_enabled());
        assert_eq!(rt.display().entries().last(), Some(&DisplayEntry::Pending));

        settle(&mut rt).await;

        assert_eq!(
            rt.session().snapshot(),
            vec![Turn::system(SYSTEM), Turn::user("hello"), Turn::assistant("hi")]
        );
        assert_eq!(
            rt.display().entries(),
            &[turn_entry(Role::User, "hello"), turn_entry(Role::Assistant, "hi")]
        );
        assert_eq!(rt.last_outcome(), Some(TerminalOutcome::Success));
        assert!(rt.display().submit_enabled());
        assert!(rt.display().focused());
        assert_eq!(rt.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn test_request_carries_snapshot_after_user_turn() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply("first");
        backend.queue_reply("second");
        let mut rt = runtime(&backend);

        rt.submit("one").unwrap();
        settle(&mut rt).await;
        rt.submit("two").unwrap();
        settle(&mut rt).await;

        let requests = backend.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].messages,
            vec![
                Turn::system(SYSTEM),
                Turn::user("one"),
                Turn::assistant("first"),
                Turn::user("two"),
            ]
        );
    }

    #[tokio::test]
    async fn test_http_failure_shows_notice_without_assistant_turn() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_error(ExchangeError::Http {
            status: 500,
            body: "overload".to_string(),
        });
        let mut rt = runtime(&backend);

        rt.submit("hello").unwrap();
        settle(&mut rt).await;

        assert_eq!(
            rt.session().snapshot(),
            vec![Turn::system(SYSTEM), Turn::user("hello")]
        );
        assert_eq!(
            rt.display().entries(),
            &[
                turn_entry(Role::User, "hello"),
                notice(ErrorCategory::Application, "Backend error 500: overload"),
            ]
        );
        assert_eq!(rt.last_outcome(), Some(TerminalOutcome::ApplicationError));
        assert!(rt.display().submit_enabled());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_error(ExchangeError::transport("connection refused"));
        let mut rt = runtime(&backend);

        rt.submit("hello").unwrap();
        settle(&mut rt).await;

        assert_eq!(
            rt.display().entries().last(),
            Some(&notice(
                ErrorCategory::Transport,
                "Network error: connection refused"
            ))
        );
        assert_eq!(rt.last_outcome(), Some(TerminalOutcome::TransportError));
        assert_eq!(rt.session().store().count(Role::Assistant), 0);
    }

    #[tokio::test]
    async fn test_empty_and_application_errors() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_error(ExchangeError::EmptyResponse);
        backend.queue_error(ExchangeError::Application("quota exceeded".to_string()));
        let mut rt = runtime(&backend);

        rt.submit("a").unwrap();
        settle(&mut rt).await;
        rt.submit("b").unwrap();
        settle(&mut rt).await;

        let notices: Vec<&DisplayEntry> = rt
            .display()
            .entries()
            .iter()
            .filter(|e| matches!(e, DisplayEntry::Notice { .. }))
            .collect();
        assert_eq!(
            notices,
            vec![
                &notice(ErrorCategory::Application, "Empty response from backend"),
                &notice(ErrorCategory::Application, "Error: quota exceeded"),
            ]
        );
        assert_eq!(rt.session().store().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let backend = Arc::new(MockBackend::new());
        let mut rt = runtime(&backend);

        rt.submit("   \n\t").unwrap();

        assert_eq!(rt.state(), TurnState::Idle);
        assert_eq!(rt.session().snapshot(), vec![Turn::system(SYSTEM)]);
        assert!(rt.display().entries().is_empty());
        assert!(backend.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_submit_clears_input_field() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply("hi");
        let mut rt = runtime(&backend);
        rt.display_mut().set_input("  hello  ");

        rt.submit("  hello  ").unwrap();

        assert_eq!(rt.display().input(), "");
        settle(&mut rt).await;
        assert_eq!(rt.session().snapshot().get(1), Some(&Turn::user("hello")));
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_busy() {
        let (backend, gate) = MockBackend::gated();
        let backend = Arc::new(backend);
        backend.queue_reply("hi");
        let mut rt = runtime(&backend);

        rt.submit("one").unwrap();
        assert_eq!(rt.submit("two"), Err(TransitionError::Busy));
        assert_eq!(rt.session().store().len(), 2);

        gate.notify_one();
        settle(&mut rt).await;

        assert_eq!(backend.recorded_requests().len(), 1);
        assert_eq!(rt.session().store().len(), 3);
    }

    #[tokio::test]
    async fn test_clear_while_pending_drops_stale_reply() {
        let (backend, gate) = MockBackend::gated();
        let backend = Arc::new(backend);
        backend.queue_reply("stale");
        backend.queue_reply("fresh");
        let mut rt = runtime(&backend);

        rt.submit("hello").unwrap();
        rt.clear();

        assert_eq!(rt.session().snapshot(), vec![Turn::system(SYSTEM)]);
        assert_eq!(rt.display().entries(), &[DisplayEntry::Pending]);
        assert_eq!(
            rt.state(),
            TurnState::Pending {
                exchange_id: 1,
                superseded: true
            }
        );

        gate.notify_one();
        settle(&mut rt).await;

        assert_eq!(rt.session().snapshot(), vec![Turn::system(SYSTEM)]);
        assert!(rt.display().entries().is_empty());
        assert!(rt.display().submit_enabled());

        rt.submit("again").unwrap();
        gate.notify_one();
        settle(&mut rt).await;

        assert_eq!(
            rt.session().snapshot(),
            vec![Turn::system(SYSTEM), Turn::user("again"), Turn::assistant("fresh")]
        );
    }

    #[tokio::test]
    async fn test_clear_when_idle_resets_everything() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply("hi");
        let mut rt = runtime(&backend);
        rt.submit("hello").unwrap();
        settle(&mut rt).await;

        rt.clear();

        assert_eq!(rt.session().snapshot(), vec![Turn::system(SYSTEM)]);
        assert!(rt.display().entries().is_empty());
        assert_eq!(rt.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn test_unexpected_completion_is_dropped() {
        let backend = Arc::new(MockBackend::new());
        let mut rt = runtime(&backend);

        rt.handle_event(Event::ExchangeCompleted {
            exchange_id: 42,
            outcome: Ok("ghost".to_string()),
        });

        assert_eq!(rt.session().snapshot(), vec![Turn::system(SYSTEM)]);
        assert!(rt.display().entries().is_empty());
        assert_eq!(rt.last_outcome(), None);
    }

    #[tokio::test]
    async fn test_generate_code_is_kept_and_shown() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_code(Ok(CodeGenReply {
            code: "print('hi')".to_string(),
            metadata: Some(CodeGenMetadata {
                language: Some("python".to_string()),
                model: Some("mock".to_string()),
                latency_ms: Some(3),
                temperature: Some(0.2),
            }),
        }));
        let mut rt = runtime(&backend);

        let generated = rt.generate_code("print hi").await.unwrap();

        assert_eq!(rt.session().last_code(), Some(&generated));
        assert_eq!(
            rt.display().entries(),
            &[DisplayEntry::Generated(generated.clone())]
        );
        assert_eq!(rt.display().code_blocks()[0].code, "print('hi')");
        // Code generation is not a conversation turn
        assert_eq!(rt.session().store().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_code_failure_shows_notice() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_code(Err(ExchangeError::transport("timed out")));
        let mut rt = runtime(&backend);

        let result = rt.generate_code("sort a list").await;

        assert!(matches!(result, Err(CodegenError::Exchange(_))));
        assert_eq!(
            rt.display().entries(),
            &[notice(ErrorCategory::Transport, "Network error: timed out")]
        );
        assert!(rt.session().last_code().is_none());
    }
}
