use crate::resolver::{combination_query, Resolver};
use craftboard_engine::{Board, BoardSize, Candidate, Element};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};

pub type SharedBoard = Arc<Mutex<Board>>;

/// An unordered pair of element names, as dropped by the user (source onto target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinationRequest {
    pub elem1: String,
    pub elem2: String,
}

impl CombinationRequest {
    /// Dropping a card onto itself, or an unnamed card, is not a combination.
    pub fn from_drop(source: &str, target: &str) -> Option<Self> {
        if source.is_empty() || target.is_empty() || source == target {
            return None;
        }
        Some(Self {
            elem1: source.to_string(),
            elem2: target.to_string(),
        })
    }

    pub fn query(&self) -> String {
        combination_query(&self.elem1, &self.elem2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombinationOutcome {
    Success { name: String, emoji: String },
    Failure { reason: String },
}

impl CombinationOutcome {
    fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
pub struct CombinationHandler {
    resolver: Arc<dyn Resolver>,
}

impl CombinationHandler {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver }
    }

    /// One round-trip to the resolver. Never retries; every error becomes `Failure`.
    pub async fn request_combination(&self, request: &CombinationRequest) -> CombinationOutcome {
        let query = request.query();
        let resolution = match self.resolver.resolve(&query).await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("combine {} + {} failed: {e}", request.elem1, request.elem2);
                return CombinationOutcome::failure(e.to_string());
            }
        };

        if resolution.resource.is_empty() || resolution.emoji.is_empty() {
            log::warn!(
                "combine {} + {} returned an incomplete result: {:?}",
                request.elem1,
                request.elem2,
                resolution
            );
            return CombinationOutcome::failure("incomplete result");
        }

        log::info!(
            "{} + {} = {} {}",
            request.elem1,
            request.elem2,
            resolution.emoji,
            resolution.resource
        );
        CombinationOutcome::Success {
            name: resolution.resource,
            emoji: resolution.emoji,
        }
    }

    /// `None` for a self-drop, which issues no request.
    pub async fn on_drop(&self, source: &str, target: &str) -> Option<CombinationOutcome> {
        let request = CombinationRequest::from_drop(source, target)?;
        Some(self.request_combination(&request).await)
    }
}

/// Feed an outcome into the board. Failures leave it untouched.
pub fn apply_outcome(
    board: &Mutex<Board>,
    outcome: &CombinationOutcome,
    size: BoardSize,
) -> Option<Element> {
    let CombinationOutcome::Success { name, emoji } = outcome else {
        return None;
    };
    let mut board = board.lock().unwrap_or_else(PoisonError::into_inner);
    board.place_if_new(Candidate::new(name.as_str(), emoji.as_str()), size)
}

struct Completed {
    outcome: CombinationOutcome,
    size: BoardSize,
}

/// Fire-and-forget drop handling.
///
/// Each drop runs as its own task; finished outcomes are queued to a single consumer that
/// applies them to the board in completion order. In-flight requests are neither capped
/// nor cancelled.
#[derive(Clone)]
pub struct Table {
    handler: CombinationHandler,
    completed: mpsc::UnboundedSender<Completed>,
    applied: watch::Receiver<u64>,
}

impl Table {
    /// Starts the consumer task; must be called from within a tokio runtime.
    pub fn spawn(handler: CombinationHandler, board: SharedBoard) -> Self {
        let (completed, rx) = mpsc::unbounded_channel();
        let (applied_tx, applied) = watch::channel(0);
        tokio::spawn(run_placements(board, rx, applied_tx));
        Self {
            handler,
            completed,
            applied,
        }
    }

    /// Queue a combination for `source` dropped onto `target`. Returns false when
    /// `from_drop` rejects the pair.
    pub fn drop_on(&self, source: &str, target: &str, size: BoardSize) -> bool {
        let Some(request) = CombinationRequest::from_drop(source, target) else {
            return false;
        };

        let handler = self.handler.clone();
        let completed = self.completed.clone();
        tokio::spawn(async move {
            let task = tokio::spawn(async move { handler.request_combination(&request).await });
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("combination task aborted: {e}");
                    CombinationOutcome::failure("combination task aborted")
                }
            };
            let _ = completed.send(Completed { outcome, size });
        });
        true
    }

    /// Count of outcomes the consumer has applied so far (including failures).
    pub fn applied(&self) -> watch::Receiver<u64> {
        self.applied.clone()
    }
}

async fn run_placements(
    board: SharedBoard,
    mut rx: mpsc::UnboundedReceiver<Completed>,
    applied: watch::Sender<u64>,
) {
    while let Some(done) = rx.recv().await {
        if let Some(element) = apply_outcome(&board, &done.outcome, done.size) {
            log::info!("discovered {} {}", element.emoji, element.name);
        }
        applied.send_modify(|n| *n += 1);
    }
}
