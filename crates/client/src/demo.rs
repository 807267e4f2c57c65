//! Scripted frontend that plays one drag session against the board.
//!
//! Drops the first two draggable tray items next to each other, drags the
//! second onto the first and prints the resulting board and toasts.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use board_core::{AttemptId, BoardConfig, BoardSnapshot, BoardToken, Delta};
use board_runtime::{Event, MergeEvent, RuntimeHandle, Topic};
use client_frontend_core::{
    ClientPoint, DragEnd, DragInteractionAdapter, DragSource, DropOutcome, DropTarget,
    EventConsumer, Frontend, FrontendConfig, MessageLevel, PointerSample, ToastConsumer,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

pub struct ScriptedFrontend {
    config: FrontendConfig,
    board: BoardConfig,
    toasts: ToastConsumer,
    merge_timeout: Duration,
}

impl ScriptedFrontend {
    pub fn new(config: FrontendConfig, board: BoardConfig) -> Self {
        let toasts = ToastConsumer::new(config.messages.clone());
        Self {
            config,
            board,
            toasts,
            merge_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_merge_timeout(mut self, timeout: Duration) -> Self {
        self.merge_timeout = timeout;
        self
    }

    pub fn toasts(&self) -> &ToastConsumer {
        &self.toasts
    }

    async fn drop_from_tray(
        &self,
        adapter: &mut DragInteractionAdapter,
        handle: &RuntimeHandle,
        snapshot: &BoardSnapshot,
    ) -> Result<Vec<BoardToken>> {
        let origin = self.config.board_origin;
        let picks = snapshot
            .tray
            .iter()
            .filter(|entry| !entry.disabled)
            .take(2)
            .map(|entry| entry.item.clone());

        let mut placed = Vec::new();
        for (item, offset) in picks.zip([100, 240]) {
            adapter.on_pointer(PointerSample::Mouse(ClientPoint::new(
                origin.x + offset,
                origin.y + 120,
            )));
            adapter.on_drag_start(DragSource::Inventory(item.clone()), now_ms());

            match adapter
                .on_drag_end(DragEnd::new(DropTarget::Board, Delta::default()), handle)
                .await?
            {
                DropOutcome::Placed(token) => placed.push(token),
                other => info!(item = %item.id, ?other, "tray drop did not land"),
            }
        }
        Ok(placed)
    }

    async fn await_merge(
        &mut self,
        merges: &mut broadcast::Receiver<Event>,
        attempt: AttemptId,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.merge_timeout;
        loop {
            let event = tokio::time::timeout_at(deadline, merges.recv())
                .await
                .with_context(|| format!("merge {attempt} did not settle in time"))?
                .context("merge event stream closed")?;

            self.toasts.on_event(&event);
            let settled = match &event {
                Event::Merge(MergeEvent::MergeResolved { attempt: id, .. })
                | Event::Merge(MergeEvent::MergeFailed { attempt: id, .. }) => *id == attempt,
                _ => false,
            };
            if settled {
                return Ok(());
            }
        }
    }

    fn drain(&mut self, events: &mut broadcast::Receiver<Event>) {
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.toasts.on_event(&event);
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "toast feed lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

#[async_trait]
impl Frontend for ScriptedFrontend {
    async fn run(&mut self, handle: RuntimeHandle) -> Result<()> {
        let mut merges = handle.subscribe(Topic::Merge);
        let mut inventory = handle.subscribe(Topic::Inventory);

        handle
            .refresh()
            .await
            .context("failed to load the inventory")?;

        let mut adapter = DragInteractionAdapter::new(self.board.clone(), self.config.board_origin);
        let snapshot = handle.board().await?;
        let placed = self.drop_from_tray(&mut adapter, &handle, &snapshot).await?;

        if let [target, dropped] = placed.as_slice() {
            let delta = Delta::new(
                target.position.left - dropped.position.left,
                target.position.top - dropped.position.top,
            );
            adapter.on_drag_start(DragSource::from_token(dropped), now_ms());
            adapter.on_drag_over(&DropTarget::Token(target.instance.clone()));

            let outcome = adapter
                .on_drag_end(
                    DragEnd::new(DropTarget::Token(target.instance.clone()), delta),
                    &handle,
                )
                .await?;
            match outcome {
                DropOutcome::MergePending(attempt) => {
                    info!(
                        %attempt,
                        target = %target.original_id,
                        dropped = %dropped.original_id,
                        "merge in flight"
                    );
                    self.await_merge(&mut merges, attempt).await?;
                }
                other => info!(?other, "merge gesture was not accepted"),
            }
        } else {
            warn!(placed = placed.len(), "need two tokens on the board to merge");
        }

        self.drain(&mut inventory);
        render(&handle.board().await?, &self.toasts);
        Ok(())
    }
}

fn render(snapshot: &BoardSnapshot, toasts: &ToastConsumer) {
    println!("Board:");
    for token in snapshot.visible() {
        let marker = if token.is_new() { " (new)" } else { "" };
        println!("  {} {} at {}{marker}", token.emoji, token.title, token.position);
    }

    println!("Tray:");
    for entry in &snapshot.tray {
        let state = if entry.disabled { "disabled" } else { "ready" };
        println!(
            "  {} {} [{}] {state}",
            entry.item.emoji, entry.item.handle, entry.availability
        );
    }

    for toast in toasts.message_log().iter() {
        let level = match toast.level {
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warn",
            MessageLevel::Error => "error",
        };
        println!("[{level}] {}", toast.text);
    }
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use client_bootstrap::{BootstrapConfig, RuntimeBuilder};

    use super::*;

    #[tokio::test]
    async fn demo_session_crafts_from_the_first_two_items() {
        let setup = RuntimeBuilder::new(BootstrapConfig::default())
            .build()
            .await
            .unwrap();
        let handle = setup.runtime.handle();

        let mut frontend = ScriptedFrontend::new(FrontendConfig::default(), BoardConfig::default());
        frontend.run(handle.clone()).await.unwrap();

        let board = handle.board().await.unwrap();
        let titles: Vec<_> = board.visible().map(|token| token.title.as_str()).collect();
        assert_eq!(titles, ["Steam"]);
        assert!(
            frontend
                .toasts()
                .message_log()
                .iter()
                .any(|toast| toast.text.contains("Steam"))
        );
    }
}
