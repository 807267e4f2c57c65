//! Bridges pointer and drag primitives to board operations.
//!
//! The drag layer owns hit-testing and pointer capture. It reports drag
//! start, drag over and drag end; [`DragInteractionAdapter`] turns those into
//! a [`BoardIntent`] and dispatches it through the runtime handle.
mod gesture;
mod pointer;

pub use gesture::{BoardIntent, DragEnd, DragSource, DropOutcome, DropTarget};
pub use pointer::{ClientPoint, PointerSample, PointerTracker};

use board_core::{BoardConfig, BoardToken, InstanceId, MergeSource, Position, TokenFlags};
use board_runtime::{MergeOutcome, PlaceOutcome, RuntimeHandle};
use tracing::debug;

use pointer::{centred, to_board};

/// A gesture between drag start and drag end.
#[derive(Clone, Debug)]
pub struct ActiveDrag {
    pub source: DragSource,
    /// Token currently under the pointer, for the hover highlight.
    pub hovered: Option<InstanceId>,
    /// Overlay rendered while an inventory item is being dragged.
    pub preview: Option<BoardToken>,
}

pub struct DragInteractionAdapter {
    board: BoardConfig,
    board_origin: ClientPoint,
    pointer: PointerTracker,
    active: Option<ActiveDrag>,
}

impl DragInteractionAdapter {
    /// `board_origin` is the board's top-left corner in client space.
    pub fn new(board: BoardConfig, board_origin: ClientPoint) -> Self {
        Self {
            board,
            board_origin,
            pointer: PointerTracker::new(),
            active: None,
        }
    }

    pub fn set_board_origin(&mut self, origin: ClientPoint) {
        self.board_origin = origin;
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        self.active.as_ref()
    }

    pub fn hovered(&self) -> Option<&InstanceId> {
        self.active.as_ref()?.hovered.as_ref()
    }

    pub fn on_pointer(&mut self, sample: PointerSample) {
        self.pointer.update(sample);

        let Some(pointer) = self.pointer.board_position(self.board_origin) else {
            return;
        };
        if let Some(preview) = self.active.as_mut().and_then(|drag| drag.preview.as_mut()) {
            let half = self.board.token.estimate(&preview.title).half();
            preview.position = centred(pointer, half);
        }
    }

    /// Starts a gesture. An inventory drag gets a preview token with a fresh
    /// instance id, flagged as coming from the inventory.
    pub fn on_drag_start(&mut self, source: DragSource, now_ms: u64) {
        let preview = match &source {
            DragSource::Inventory(item) => {
                let position = self
                    .pointer
                    .board_position(self.board_origin)
                    .map(|pointer| centred(pointer, self.board.token.estimate(&item.handle).half()))
                    .unwrap_or(Position::ORIGIN);
                Some(
                    BoardToken::from_item(InstanceId::generate(&item.id, now_ms), item, position)
                        .with_flags(TokenFlags::FROM_INVENTORY),
                )
            }
            DragSource::Board { .. } => None,
        };

        self.active = Some(ActiveDrag {
            source,
            hovered: None,
            preview,
        });
    }

    pub fn on_drag_over(&mut self, over: &DropTarget) {
        if let Some(drag) = self.active.as_mut() {
            drag.hovered = match over {
                DropTarget::Token(instance) => Some(instance.clone()),
                DropTarget::Board | DropTarget::Outside => None,
            };
        }
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Classifies a finished gesture.
    pub fn resolve(&self, source: &DragSource, end: &DragEnd) -> BoardIntent {
        match (source, &end.over) {
            (_, DropTarget::Outside) => BoardIntent::SnapBack,

            (DragSource::Inventory(item), DropTarget::Board) => {
                // The release point wins over the last tracked sample.
                let pointer = end
                    .client_offset
                    .map(|point| to_board(point, self.board_origin))
                    .or_else(|| self.pointer.board_position(self.board_origin));
                match pointer {
                    Some(pointer) => {
                        let half = self.board.token.estimate(&item.handle).half();
                        BoardIntent::Place {
                            item: item.id.clone(),
                            position: centred(pointer, half),
                        }
                    }
                    None => BoardIntent::SnapBack,
                }
            }
            (DragSource::Inventory(item), DropTarget::Token(target)) => BoardIntent::Merge {
                target: target.clone(),
                dropped: MergeSource::Inventory(item.id.clone()),
            },

            (DragSource::Board { instance, .. }, DropTarget::Token(target))
                if target != instance =>
            {
                BoardIntent::Merge {
                    target: target.clone(),
                    dropped: MergeSource::Token(instance.clone()),
                }
            }
            // Hovering its own droppable region counts as empty board.
            (DragSource::Board { instance, origin }, _) => BoardIntent::Move {
                instance: instance.clone(),
                position: *origin + end.delta,
            },
        }
    }

    /// Ends the active gesture and applies it. A drag end without a matching
    /// start is a trailing event and snaps back.
    pub async fn on_drag_end(
        &mut self,
        end: DragEnd,
        handle: &RuntimeHandle,
    ) -> board_runtime::Result<DropOutcome> {
        let Some(drag) = self.active.take() else {
            debug!(target: "board::drag", "drag end without an active gesture");
            return Ok(DropOutcome::SnappedBack);
        };

        let intent = self.resolve(&drag.source, &end);
        debug!(target: "board::drag", ?intent, "drop resolved");
        dispatch(handle, intent).await
    }
}

/// Sends `intent` to the runtime.
pub async fn dispatch(
    handle: &RuntimeHandle,
    intent: BoardIntent,
) -> board_runtime::Result<DropOutcome> {
    let outcome = match intent {
        BoardIntent::Place { item, position } => match handle.place(item, position).await? {
            PlaceOutcome::Placed(token) => DropOutcome::Placed(token),
            PlaceOutcome::Rejected(rejection) => DropOutcome::Rejected(rejection),
        },
        BoardIntent::Move { instance, position } => {
            match handle.move_token(instance, position).await? {
                Some(position) => DropOutcome::Moved(position),
                None => DropOutcome::SnappedBack,
            }
        }
        BoardIntent::Merge { target, dropped } => match handle.merge(target, dropped).await? {
            MergeOutcome::Pending(attempt) => DropOutcome::MergePending(attempt),
            MergeOutcome::Rejected(rejection) => DropOutcome::Rejected(rejection),
        },
        BoardIntent::SnapBack => DropOutcome::SnappedBack,
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use board_core::{CraftedItem, Delta, InventoryItem, ItemId, Rejection};
    use board_runtime::{InMemoryBackend, Runtime};

    use super::*;

    const ORIGIN: ClientPoint = ClientPoint { x: 20, y: 100 };

    fn wood() -> InventoryItem {
        InventoryItem::new("wood", "Wood", "🪵").with_amount(1)
    }

    fn adapter() -> DragInteractionAdapter {
        DragInteractionAdapter::new(BoardConfig::default(), ORIGIN)
    }

    async fn runtime() -> (Runtime, RuntimeHandle) {
        let fire = InventoryItem::new("fire", "Fire", "🔥").basic();
        let backend = InMemoryBackend::new([wood(), fire])
            .with_recipe("wood", "fire", CraftedItem::new("ash", "Ash", "🩶"));
        let runtime = Runtime::builder().backend(backend).build().unwrap();
        let handle = runtime.handle();
        handle.refresh().await.unwrap();
        (runtime, handle)
    }

    #[test]
    fn tray_drop_centres_the_token_on_the_pointer() {
        let mut adapter = adapter();
        adapter.on_pointer(PointerSample::Mouse(ClientPoint::new(220, 300)));

        let intent = adapter.resolve(
            &DragSource::Inventory(wood()),
            &DragEnd::new(DropTarget::Board, Delta::new(999, 999)),
        );

        let half = BoardConfig::default().token.estimate("Wood").half();
        assert_eq!(
            intent,
            BoardIntent::Place {
                item: ItemId::from("wood"),
                position: Position::new(200 - half.x, 200 - half.y),
            }
        );
    }

    #[test]
    fn tray_drop_without_pointer_uses_release_point() {
        let adapter = adapter();
        let end =
            DragEnd::new(DropTarget::Board, Delta::default()).at(ClientPoint::new(120, 200));

        let intent = adapter.resolve(&DragSource::Inventory(wood()), &end);
        assert!(matches!(intent, BoardIntent::Place { .. }));

        let intent = adapter.resolve(
            &DragSource::Inventory(wood()),
            &DragEnd::new(DropTarget::Board, Delta::default()),
        );
        assert_eq!(intent, BoardIntent::SnapBack);
    }

    #[test]
    fn release_point_wins_over_the_tracked_pointer() {
        let mut adapter = adapter();
        adapter.on_pointer(PointerSample::Mouse(ClientPoint::new(220, 300)));

        let end = DragEnd::new(DropTarget::Board, Delta::default()).at(ClientPoint::new(70, 150));
        let intent = adapter.resolve(&DragSource::Inventory(wood()), &end);

        let half = BoardConfig::default().token.estimate("Wood").half();
        assert_eq!(
            intent,
            BoardIntent::Place {
                item: ItemId::from("wood"),
                position: Position::new(50 - half.x, 50 - half.y),
            }
        );
    }

    #[test]
    fn board_drags_move_by_delta_and_merge_onto_others() {
        let adapter = adapter();
        let source = DragSource::Board {
            instance: InstanceId::from("wood-1-1"),
            origin: Position::new(50, 60),
        };

        assert_eq!(
            adapter.resolve(&source, &DragEnd::new(DropTarget::Board, Delta::new(15, -20))),
            BoardIntent::Move {
                instance: InstanceId::from("wood-1-1"),
                position: Position::new(65, 40),
            }
        );
        assert_eq!(
            adapter.resolve(
                &source,
                &DragEnd::new(DropTarget::Token(InstanceId::from("wood-1-1")), Delta::new(3, 3))
            ),
            BoardIntent::Move {
                instance: InstanceId::from("wood-1-1"),
                position: Position::new(53, 63),
            }
        );
        assert_eq!(
            adapter.resolve(
                &source,
                &DragEnd::new(DropTarget::Token(InstanceId::from("fire-1-2")), Delta::default())
            ),
            BoardIntent::Merge {
                target: InstanceId::from("fire-1-2"),
                dropped: MergeSource::Token(InstanceId::from("wood-1-1")),
            }
        );
        assert_eq!(
            adapter.resolve(&source, &DragEnd::new(DropTarget::Outside, Delta::new(5, 5))),
            BoardIntent::SnapBack
        );
    }

    #[test]
    fn preview_follows_the_pointer_and_hover_is_tracked() {
        let mut adapter = adapter();
        adapter.on_drag_start(DragSource::Inventory(wood()), 7);

        let preview = adapter.active().and_then(|drag| drag.preview.as_ref()).unwrap();
        assert!(preview.is_from_inventory());

        adapter.on_pointer(PointerSample::Touch(ClientPoint::new(220, 300)));
        let half = BoardConfig::default().token.estimate("Wood").half();
        let preview = adapter.active().and_then(|drag| drag.preview.as_ref()).unwrap();
        assert_eq!(preview.position, Position::new(200 - half.x, 200 - half.y));

        adapter.on_drag_over(&DropTarget::Token(InstanceId::from("fire-1-2")));
        assert_eq!(adapter.hovered(), Some(&InstanceId::from("fire-1-2")));
        adapter.on_drag_over(&DropTarget::Board);
        assert_eq!(adapter.hovered(), None);
    }

    #[tokio::test]
    async fn full_gestures_reach_the_board() {
        let (_runtime, handle) = runtime().await;
        let mut adapter = adapter();

        adapter.on_pointer(PointerSample::Mouse(ClientPoint::new(-500, -500)));
        adapter.on_drag_start(DragSource::Inventory(wood()), 1);
        let placed = adapter
            .on_drag_end(DragEnd::new(DropTarget::Board, Delta::default()), &handle)
            .await
            .unwrap();
        let DropOutcome::Placed(token) = placed else {
            panic!("wood should land, got {placed:?}");
        };
        assert_eq!(token.position, Position::new(10, 10));
        assert!(!token.is_from_inventory());

        adapter.on_drag_start(DragSource::Inventory(wood()), 2);
        let second = adapter
            .on_drag_end(DragEnd::new(DropTarget::Board, Delta::default()), &handle)
            .await
            .unwrap();
        assert_eq!(
            second,
            DropOutcome::Rejected(Rejection::ItemUnavailable {
                item: ItemId::from("wood")
            })
        );

        adapter.on_drag_start(DragSource::from_token(&token), 3);
        let moved = adapter
            .on_drag_end(DragEnd::new(DropTarget::Board, Delta::new(40, 25)), &handle)
            .await
            .unwrap();
        assert_eq!(moved, DropOutcome::Moved(Position::new(50, 35)));

        let fire = InventoryItem::new("fire", "Fire", "🔥").basic();
        adapter.on_drag_start(DragSource::Inventory(fire), 4);
        let merged = adapter
            .on_drag_end(
                DragEnd::new(DropTarget::Token(token.instance.clone()), Delta::default()),
                &handle,
            )
            .await
            .unwrap();
        assert!(matches!(merged, DropOutcome::MergePending(_)));
    }

    #[tokio::test]
    async fn trailing_drag_end_snaps_back() {
        let (_runtime, handle) = runtime().await;
        let mut adapter = adapter();

        let outcome = adapter
            .on_drag_end(DragEnd::new(DropTarget::Board, Delta::new(1, 1)), &handle)
            .await
            .unwrap();
        assert_eq!(outcome, DropOutcome::SnappedBack);

        adapter.on_drag_start(
            DragSource::Board {
                instance: InstanceId::from("gone-1-1"),
                origin: Position::new(30, 30),
            },
            5,
        );
        let outcome = adapter
            .on_drag_end(DragEnd::new(DropTarget::Board, Delta::new(5, 5)), &handle)
            .await
            .unwrap();
        assert_eq!(outcome, DropOutcome::SnappedBack);
    }
}
