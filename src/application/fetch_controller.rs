use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use futures::{future, stream, stream::BoxStream, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::{
    api::Transport,
    domain::{FetchOutcome, FetchRequest, NetworkError, ProgressState},
};

/// Presentation-side sink for the lifecycle of a fetch. Callbacks carry the
/// originating request so a sink shared across overlapping fetches can tell
/// them apart.
pub trait FetchObserver: Send + Sync {
    fn on_state_changed(&self, request: &FetchRequest, state: ProgressState);
    fn on_log(&self, line: &str);
    fn on_body_received(&self, request: &FetchRequest, body: &str);
}

/// Observer callbacks flattened into values, for delivery through the GUI
/// runtime as messages.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    StateChanged(FetchRequest, ProgressState),
    Log(String),
    BodyReceived(FetchRequest, String),
}

/// `FetchObserver` that forwards every callback onto an unbounded channel.
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<FetchEvent>,
}

impl ChannelObserver {
    /// Returns the observer and the stream its callbacks surface on. The
    /// stream ends once the observer is dropped and the queue is drained.
    pub fn unbounded() -> (Self, impl Stream<Item = FetchEvent> + Send + 'static) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let events = stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|event| (event, receiver))
        });

        (Self { sender }, events)
    }
}

impl FetchObserver for ChannelObserver {
    fn on_state_changed(&self, request: &FetchRequest, state: ProgressState) {
        let _ = self
            .sender
            .send(FetchEvent::StateChanged(request.clone(), state));
    }

    fn on_log(&self, line: &str) {
        let _ = self.sender.send(FetchEvent::Log(line.to_string()));
    }

    fn on_body_received(&self, request: &FetchRequest, body: &str) {
        let _ = self
            .sender
            .send(FetchEvent::BodyReceived(request.clone(), body.to_string()));
    }
}

/// Performs one GET per issued request and reports the lifecycle to an
/// observer. Failure is returned as a value; `fetch` never errors out.
///
/// Overlapping fetches are allowed and proceed independently; each carries
/// its own request id and each emits its own `Completed`.
#[derive(Clone)]
pub struct FetchController {
    transport: Arc<dyn Transport>,
    next_request_id: Arc<AtomicU64>,
}

impl FetchController {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            next_request_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Tag a URL with a fresh request id. Requests are immutable once issued.
    pub fn issue(&self, url: impl Into<String>) -> FetchRequest {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        FetchRequest {
            id,
            url: url.into(),
        }
    }

    /// Suspending mode: suspends at the await of the GET response, leaving
    /// the calling thread's executor free to run other work meanwhile.
    pub async fn fetch(
        &self,
        request: &FetchRequest,
        observer: &dyn FetchObserver,
    ) -> FetchOutcome {
        observer.on_log(&format!(
            "[#{}] Starting HTML download of {}...",
            request.id, request.url
        ));
        observer.on_state_changed(request, ProgressState::InFlight);

        let result = self.transport.get(&request.url).await;
        self.complete(request, observer, result)
    }

    /// Blocking mode: occupies the calling thread for the full round trip.
    /// Same observable transitions as `fetch`, kept for contrast with it.
    pub fn fetch_blocking(
        &self,
        request: &FetchRequest,
        observer: &dyn FetchObserver,
    ) -> FetchOutcome {
        observer.on_log(&format!(
            "[#{}] Starting HTML download of {}...",
            request.id, request.url
        ));
        observer.on_state_changed(request, ProgressState::InFlight);

        let result = self.transport.get_blocking(&request.url);
        self.complete(request, observer, result)
    }

    /// The lifecycle of one suspending-mode fetch as an event stream. The
    /// fetch itself is driven by polling the stream; the outcome is dropped
    /// here because every consumer-visible effect arrives as an event.
    pub fn fetch_stream(&self, request: FetchRequest) -> BoxStream<'static, FetchEvent> {
        let controller = self.clone();
        let (observer, events) = ChannelObserver::unbounded();

        let drive = stream::once(async move { controller.fetch(&request, &observer).await })
            .filter_map(|_outcome| future::ready(None));

        stream::select(events, drive).boxed()
    }

    fn complete(
        &self,
        request: &FetchRequest,
        observer: &dyn FetchObserver,
        result: crate::api::Result<String>,
    ) -> FetchOutcome {
        let outcome = match result {
            Ok(body) => {
                observer.on_log(&format!("[#{}] Finished HTML download.", request.id));
                observer.on_body_received(request, &body);

                let length = body.len();
                FetchOutcome::Success { body, length }
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "fetch failed");
                FetchOutcome::Failure {
                    reason: NetworkError {
                        url: request.url.clone(),
                        detail: e.to_string(),
                    },
                }
            }
        };

        observer.on_state_changed(request, ProgressState::Completed);

        match &outcome {
            FetchOutcome::Success { length, .. } => {
                observer.on_log(&format!(
                    "[#{}] Length of returned HTML = {}",
                    request.id, length
                ));
            }
            FetchOutcome::Failure { .. } => {
                observer.on_log(&format!(
                    "[#{}] URL is invalid or cannot reach website.",
                    request.id
                ));
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::{self, TransportError};

    /// Transport serving a fixed body, or refusing every connection.
    struct StubTransport {
        body: Option<String>,
    }

    impl StubTransport {
        fn serving(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: Some(body.to_string()),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self { body: None })
        }

        fn respond(&self) -> api::Result<String> {
            match &self.body {
                Some(body) => Ok(body.clone()),
                None => Err(TransportError::Connection(
                    "connection refused".to_string(),
                )),
            }
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, _url: &str) -> api::Result<String> {
            self.respond()
        }

        fn get_blocking(&self, _url: &str) -> api::Result<String> {
            self.respond()
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        states: Mutex<Vec<ProgressState>>,
        log: Mutex<Vec<String>>,
        bodies: Mutex<Vec<String>>,
    }

    impl FetchObserver for RecordingObserver {
        fn on_state_changed(&self, _request: &FetchRequest, state: ProgressState) {
            self.states.lock().unwrap().push(state);
        }

        fn on_log(&self, line: &str) {
            self.log.lock().unwrap().push(line.to_string());
        }

        fn on_body_received(&self, _request: &FetchRequest, body: &str) {
            self.bodies.lock().unwrap().push(body.to_string());
        }
    }

    #[tokio::test]
    async fn test_fetch_success_reports_body_and_length() {
        let controller = FetchController::new(StubTransport::serving("hello"));
        let observer = RecordingObserver::default();

        let request = controller.issue("http://example.com");
        let outcome = controller.fetch(&request, &observer).await;

        assert_eq!(
            outcome,
            FetchOutcome::Success {
                body: "hello".to_string(),
                length: 5
            }
        );
        assert_eq!(*observer.bodies.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_value() {
        let controller = FetchController::new(StubTransport::unreachable());
        let observer = RecordingObserver::default();

        let request = controller.issue("http://bad.invalid");
        let outcome = controller.fetch(&request, &observer).await;

        match outcome {
            FetchOutcome::Failure { reason } => {
                assert_eq!(reason.url, "http://bad.invalid");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(observer.bodies.lock().unwrap().is_empty());
        assert!(observer
            .log
            .lock()
            .unwrap()
            .last()
            .unwrap()
            .contains("URL is invalid or cannot reach website"));
    }

    #[tokio::test]
    async fn test_states_move_strictly_forward() {
        // Success and failure alike end in Completed.
        for transport in [StubTransport::serving("x"), StubTransport::unreachable()] {
            let controller = FetchController::new(transport);
            let observer = RecordingObserver::default();

            let request = controller.issue("http://example.com");
            controller.fetch(&request, &observer).await;

            assert_eq!(
                *observer.states.lock().unwrap(),
                vec![ProgressState::InFlight, ProgressState::Completed]
            );
        }
    }

    #[test]
    fn test_blocking_states_move_strictly_forward() {
        let controller = FetchController::new(StubTransport::serving("x"));
        let observer = RecordingObserver::default();

        let request = controller.issue("http://example.com");
        controller.fetch_blocking(&request, &observer);

        assert_eq!(
            *observer.states.lock().unwrap(),
            vec![ProgressState::InFlight, ProgressState::Completed]
        );
    }

    #[tokio::test]
    async fn test_blocking_and_suspending_agree() {
        for transport in [
            StubTransport::serving("same body"),
            StubTransport::unreachable(),
        ] {
            let controller = FetchController::new(transport);

            let suspended = controller
                .fetch(&controller.issue("http://example.com"), &RecordingObserver::default())
                .await;
            let blocked = controller.fetch_blocking(
                &controller.issue("http://example.com"),
                &RecordingObserver::default(),
            );

            assert_eq!(suspended, blocked);
        }
    }

    #[tokio::test]
    async fn test_log_brackets_the_state_transitions() {
        let controller = FetchController::new(StubTransport::serving("hello"));
        let observer = RecordingObserver::default();

        let request = controller.issue("http://example.com");
        controller.fetch(&request, &observer).await;

        let log = observer.log.lock().unwrap();
        assert!(log.first().unwrap().contains("Starting HTML download"));
        assert!(log.last().unwrap().contains("Length of returned HTML = 5"));
    }

    #[tokio::test]
    async fn test_fetch_stream_delivers_ordered_events() {
        let controller = FetchController::new(StubTransport::serving("hello"));
        let request = controller.issue("http://example.com");

        let events = controller
            .fetch_stream(request.clone())
            .collect::<Vec<_>>()
            .await;

        let states: Vec<ProgressState> = events
            .iter()
            .filter_map(|event| match event {
                FetchEvent::StateChanged(_, state) => Some(*state),
                _ => None,
            })
            .collect();
        assert_eq!(states, vec![ProgressState::InFlight, ProgressState::Completed]);

        assert!(events.iter().any(|event| matches!(
            event,
            FetchEvent::BodyReceived(r, body) if r.id == request.id && body == "hello"
        )));
    }

    #[tokio::test]
    async fn test_issue_tags_requests_with_fresh_ids() {
        let controller = FetchController::new(StubTransport::serving("x"));

        let first = controller.issue("http://example.com");
        let second = controller.issue("http://example.com");

        assert_ne!(first.id, second.id);
        assert_eq!(first.url, second.url);
    }
}
