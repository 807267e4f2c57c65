//! Board worker that owns the authoritative [`BoardSession`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), applies
//! them to the session and publishes events to the EventBus. Merge RPCs,
//! inventory fetches and timers run as spawned tasks that report back
//! through a completion queue, so the session is only ever touched here.

use std::sync::Arc;
use std::time::Duration;

use board_core::{
    AttemptId, Availability, BoardSession, BoardSnapshot, CraftedItem, InstanceId, InventoryItem,
    InventorySnapshot, ItemId, MergeSource, Position,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::api::{Backend, BackendError, MergeOutcome, PlaceOutcome};
use crate::events::{BoardEvent, EventBus, InventoryEvent, MergeEvent};

/// Commands that can be sent to the board worker
pub enum Command {
    Place {
        item: ItemId,
        position: Position,
        reply: oneshot::Sender<PlaceOutcome>,
    },
    Move {
        instance: InstanceId,
        position: Position,
        reply: oneshot::Sender<Option<Position>>,
    },
    Remove {
        instance: InstanceId,
        reply: oneshot::Sender<bool>,
    },
    BeginMerge {
        target: InstanceId,
        dropped: MergeSource,
        reply: oneshot::Sender<MergeOutcome>,
    },
    Search {
        text: String,
        reply: oneshot::Sender<()>,
    },
    /// Replies once the newest fetch has been applied or has failed.
    Refresh {
        reply: oneshot::Sender<Result<usize, BackendError>>,
    },
    Reset {
        reply: oneshot::Sender<Vec<AttemptId>>,
    },
    QueryBoard {
        reply: oneshot::Sender<BoardSnapshot>,
    },
    QueryAvailability {
        item: ItemId,
        reply: oneshot::Sender<Availability>,
    },
}

/// Results of work the worker spawned.
enum Completion {
    MergeSettled {
        attempt: AttemptId,
        result: Result<CraftedItem, BackendError>,
    },
    SettleElapsed {
        instance: InstanceId,
    },
    SearchElapsed {
        generation: u64,
    },
    InventoryLoaded {
        generation: u64,
        search: String,
        result: Result<FetchedInventory, BackendError>,
    },
}

/// Full inventory plus, while a search is active, the matching subset.
struct FetchedInventory {
    full: Vec<InventoryItem>,
    filtered: Option<Vec<InventoryItem>>,
}

#[derive(Clone, Debug)]
pub struct WorkerSettings {
    pub settle_delay: Duration,
    pub search_debounce: Duration,
    pub fetch_on_start: bool,
}

/// Background task that processes board commands.
pub struct BoardWorker {
    session: BoardSession,
    backend: Arc<dyn Backend>,
    settings: WorkerSettings,
    command_rx: mpsc::Receiver<Command>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    event_bus: EventBus,
    search: String,
    search_generation: u64,
    fetch_generation: u64,
    refresh_waiters: Vec<oneshot::Sender<Result<usize, BackendError>>>,
}

impl BoardWorker {
    pub fn new(
        session: BoardSession,
        backend: Arc<dyn Backend>,
        settings: WorkerSettings,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        info!(
            target: "board::worker",
            width = session.config().width,
            height = session.config().height,
            items = session.inventory().len(),
            "board worker initialized"
        );

        Self {
            session,
            backend,
            settings,
            command_rx,
            completion_tx,
            completion_rx,
            event_bus,
            search: String::new(),
            search_generation: 0,
            fetch_generation: 0,
            refresh_waiters: Vec::new(),
        }
    }

    /// Main worker loop. Ends once every handle has been dropped.
    pub async fn run(mut self) {
        if self.settings.fetch_on_start {
            self.request_fetch();
        }

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(completion) = self.completion_rx.recv() => {
                    self.handle_completion(completion);
                }
            }
        }

        info!(target: "board::worker", "board worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Place {
                item,
                position,
                reply,
            } => {
                let outcome = self.place(item, position);
                if reply.send(outcome).is_err() {
                    debug!(target: "board::worker", "Place reply channel closed (caller dropped)");
                }
            }
            Command::Move {
                instance,
                position,
                reply,
            } => {
                let moved = self.session.move_token(&instance, position);
                if let Some(position) = moved {
                    self.event_bus
                        .publish(BoardEvent::TokenMoved { instance, position });
                }
                if reply.send(moved).is_err() {
                    debug!(target: "board::worker", "Move reply channel closed (caller dropped)");
                }
            }
            Command::Remove { instance, reply } => {
                let removed = self.session.remove(&instance).is_some();
                if removed {
                    self.event_bus.publish(BoardEvent::TokenRemoved { instance });
                }
                if reply.send(removed).is_err() {
                    debug!(target: "board::worker", "Remove reply channel closed (caller dropped)");
                }
            }
            Command::BeginMerge {
                target,
                dropped,
                reply,
            } => {
                let outcome = self.begin_merge(target, dropped);
                if reply.send(outcome).is_err() {
                    debug!(
                        target: "board::worker",
                        "BeginMerge reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Search { text, reply } => {
                self.schedule_search(text);
                if reply.send(()).is_err() {
                    debug!(target: "board::worker", "Search reply channel closed (caller dropped)");
                }
            }
            Command::Refresh { reply } => {
                self.refresh_waiters.push(reply);
                self.request_fetch();
            }
            Command::Reset { reply } => {
                let discarded = self.session.reset();
                info!(
                    target: "board::worker",
                    discarded = discarded.len(),
                    "board reset"
                );
                self.event_bus.publish(BoardEvent::BoardReset {
                    discarded: discarded.clone(),
                });
                if reply.send(discarded).is_err() {
                    debug!(target: "board::worker", "Reset reply channel closed (caller dropped)");
                }
            }
            Command::QueryBoard { reply } => {
                if reply.send(self.session.snapshot()).is_err() {
                    debug!(
                        target: "board::worker",
                        "QueryBoard reply channel closed (caller dropped)"
                    );
                }
            }
            Command::QueryAvailability { item, reply } => {
                let availability = self.session.availability(&item);
                if reply.send(availability).is_err() {
                    debug!(
                        target: "board::worker",
                        "QueryAvailability reply channel closed (caller dropped)"
                    );
                }
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::MergeSettled { attempt, result } => self.settle_merge(attempt, result),
            Completion::SettleElapsed { instance } => {
                if self.session.settle(&instance) {
                    self.event_bus.publish(BoardEvent::TokenSettled { instance });
                }
            }
            Completion::SearchElapsed { generation } => {
                if generation == self.search_generation {
                    self.request_fetch();
                }
            }
            Completion::InventoryLoaded {
                generation,
                search,
                result,
            } => self.apply_inventory(generation, search, result),
        }
    }

    fn place(&mut self, item: ItemId, position: Position) -> PlaceOutcome {
        match self.session.place(&item, position, now_ms()) {
            Ok(token) => {
                debug!(
                    target: "board::worker",
                    item = %item,
                    instance = %token.instance,
                    position = %token.position,
                    "token placed"
                );
                self.event_bus.publish(BoardEvent::TokenPlaced {
                    token: token.clone(),
                });
                PlaceOutcome::Placed(token)
            }
            Err(rejection) => {
                debug!(
                    target: "board::worker",
                    item = %item,
                    reason = rejection.as_str(),
                    "placement rejected"
                );
                PlaceOutcome::Rejected(rejection)
            }
        }
    }

    fn begin_merge(&mut self, target: InstanceId, dropped: MergeSource) -> MergeOutcome {
        let attempt = match self.session.begin_merge(&target, dropped) {
            Ok(attempt) => attempt,
            Err(rejection) => {
                debug!(
                    target: "board::merge",
                    target_instance = %target,
                    reason = rejection.as_str(),
                    "merge rejected"
                );
                return MergeOutcome::Rejected(rejection);
            }
        };

        debug!(
            target: "board::merge",
            attempt = %attempt.id,
            target_item = %attempt.target_item,
            dropped_item = %attempt.dropped_item,
            "merge pending"
        );

        let backend = Arc::clone(&self.backend);
        let completion_tx = self.completion_tx.clone();
        let (id, target_item, dropped_item) = (
            attempt.id,
            attempt.target_item.clone(),
            attempt.dropped_item.clone(),
        );
        tokio::spawn(async move {
            let result = backend.merge(&target_item, &dropped_item).await;
            if completion_tx
                .send(Completion::MergeSettled {
                    attempt: id,
                    result,
                })
                .is_err()
            {
                debug!(target: "board::merge", attempt = %id, "worker gone before merge settled");
            }
        });

        self.event_bus.publish(MergeEvent::MergeStarted { attempt });
        MergeOutcome::Pending(id)
    }

    fn settle_merge(&mut self, attempt: AttemptId, result: Result<CraftedItem, BackendError>) {
        match result {
            Ok(crafted) => {
                let Some(resolved) = self.session.resolve_merge(attempt, &crafted, now_ms())
                else {
                    debug!(
                        target: "board::merge",
                        attempt = %attempt,
                        "discarding stale merge result"
                    );
                    return;
                };

                debug!(
                    target: "board::merge",
                    attempt = %attempt,
                    crafted = %crafted.id,
                    instance = %resolved.token.instance,
                    "merge resolved"
                );
                self.schedule_settle(resolved.token.instance.clone());
                self.event_bus.publish(MergeEvent::MergeResolved {
                    attempt,
                    dropped: resolved.attempt.dropped_instance().cloned(),
                    target: resolved.attempt.target,
                    token: resolved.token,
                });
                self.request_fetch();
            }
            Err(error) => {
                let Some(failed) = self.session.fail_merge(attempt) else {
                    debug!(
                        target: "board::merge",
                        attempt = %attempt,
                        "discarding stale merge failure"
                    );
                    return;
                };

                warn!(
                    target: "board::merge",
                    attempt = %attempt,
                    error = %error,
                    returned = failed.returned.is_some(),
                    "merge failed; sources restored"
                );
                self.event_bus.publish(MergeEvent::MergeFailed {
                    attempt,
                    restored: failed.restored,
                    returned: failed.returned,
                    error: error.to_string(),
                });
            }
        }
    }

    fn schedule_settle(&self, instance: InstanceId) {
        let delay = self.settings.settle_delay;
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = completion_tx.send(Completion::SettleElapsed { instance });
        });
    }

    fn schedule_search(&mut self, text: String) {
        self.search = text;
        self.search_generation += 1;

        let generation = self.search_generation;
        let delay = self.settings.search_debounce;
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = completion_tx.send(Completion::SearchElapsed { generation });
        });
    }

    /// Refetches the full inventory, and the search results when a search
    /// is active. Only the newest generation is applied when results arrive.
    fn request_fetch(&mut self) {
        self.fetch_generation += 1;

        let generation = self.fetch_generation;
        let search = self.search.clone();
        let backend = Arc::clone(&self.backend);
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = fetch_with_search(backend.as_ref(), &search).await;
            let _ = completion_tx.send(Completion::InventoryLoaded {
                generation,
                search,
                result,
            });
        });
    }

    fn apply_inventory(
        &mut self,
        generation: u64,
        search: String,
        result: Result<FetchedInventory, BackendError>,
    ) {
        if generation != self.fetch_generation {
            debug!(
                target: "board::worker",
                generation,
                latest = self.fetch_generation,
                "discarding superseded inventory fetch"
            );
            return;
        }

        let reply = match result {
            Ok(fetched) => {
                let full = InventorySnapshot::new(fetched.full);
                let count = full.len();
                let filtered = fetched.filtered.map(InventorySnapshot::new);
                let listed = filtered.as_ref().map_or(count, InventorySnapshot::len);
                self.session.replace_inventory(full);
                self.session.set_tray_filter(filtered);
                debug!(
                    target: "board::worker",
                    generation,
                    items = count,
                    listed,
                    search = %search,
                    "inventory refreshed"
                );
                self.event_bus.publish(InventoryEvent::InventoryRefreshed {
                    generation,
                    search,
                    items: listed,
                });
                Ok(count)
            }
            Err(error) => {
                warn!(
                    target: "board::worker",
                    generation,
                    error = %error,
                    "inventory refresh failed"
                );
                self.event_bus.publish(InventoryEvent::InventoryRefreshFailed {
                    generation,
                    error: error.to_string(),
                });
                Err(error)
            }
        };

        for waiter in self.refresh_waiters.drain(..) {
            if waiter.send(reply.clone()).is_err() {
                debug!(target: "board::worker", "Refresh reply channel closed (caller dropped)");
            }
        }
    }
}

async fn fetch_with_search(
    backend: &dyn Backend,
    search: &str,
) -> Result<FetchedInventory, BackendError> {
    let full = backend.fetch_inventory("").await?;
    let filtered = if search.trim().is_empty() {
        None
    } else {
        Some(backend.fetch_inventory(search).await?)
    };
    Ok(FetchedInventory { full, filtered })
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
