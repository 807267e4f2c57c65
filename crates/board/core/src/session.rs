//! One player's crafting session: inventory, board and in-flight merges.
//!
//! [`BoardSession`] is the reducer the runtime worker drives. Each method is
//! one discrete event; availability is checked before anything changes, so a
//! rejected gesture leaves the session untouched.
use crate::config::BoardConfig;
use crate::error::Rejection;
use crate::geometry::Position;
use crate::inventory::{Availability, InventoryItem, InventoryLedger, InventorySnapshot, ItemId};
use crate::merge::{
    AttemptId, CraftedItem, FailedMerge, MergeAttempt, MergeCoordinator, MergeSource,
    ResolvedMerge,
};
use crate::state::{BoardState, BoardToken, InstanceId};

#[derive(Clone, Debug)]
pub struct BoardSession {
    /// Full, unfiltered inventory. Availability is always derived from this.
    inventory: InventorySnapshot,
    /// Search results shown in the tray instead of the full inventory.
    tray_filter: Option<InventorySnapshot>,
    board: BoardState,
    merges: MergeCoordinator,
}

impl BoardSession {
    pub fn new(config: BoardConfig) -> Self {
        Self::with_inventory(config, InventorySnapshot::default())
    }

    pub fn with_inventory(config: BoardConfig, inventory: InventorySnapshot) -> Self {
        Self {
            inventory,
            tray_filter: None,
            board: BoardState::new(config),
            merges: MergeCoordinator::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        self.board.config()
    }

    pub fn inventory(&self) -> &InventorySnapshot {
        &self.inventory
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn merges(&self) -> &MergeCoordinator {
        &self.merges
    }

    /// Ledger over the full inventory, the board and pending merges.
    pub fn ledger(&self) -> InventoryLedger<'_> {
        InventoryLedger::new(&self.inventory, &self.board).with_merges(&self.merges)
    }

    pub fn availability(&self, item: &ItemId) -> Availability {
        self.ledger().remaining_available(item)
    }

    pub fn tray_filter(&self) -> Option<&InventorySnapshot> {
        self.tray_filter.as_ref()
    }

    /// Places one unit of `item` at `position` (clamped).
    pub fn place(
        &mut self,
        item: &ItemId,
        position: Position,
        now_ms: u64,
    ) -> Result<BoardToken, Rejection> {
        let ledger = self.ledger();
        let source = ledger
            .item(item)
            .cloned()
            .ok_or_else(|| Rejection::UnknownItem { item: item.clone() })?;
        if !ledger.can_place(item, 1) {
            return Err(Rejection::ItemUnavailable { item: item.clone() });
        }

        let instance = self.board.place(&source, position, now_ms);
        self.board
            .get(&instance)
            .cloned()
            .ok_or(Rejection::DroppedMissing { instance })
    }

    pub fn move_token(&mut self, instance: &InstanceId, position: Position) -> Option<Position> {
        self.board.move_token(instance, position)
    }

    pub fn remove(&mut self, instance: &InstanceId) -> Option<BoardToken> {
        self.board.remove(instance)
    }

    pub fn begin_merge(
        &mut self,
        target: &InstanceId,
        dropped: MergeSource,
    ) -> Result<MergeAttempt, Rejection> {
        self.merges
            .begin(&mut self.board, &self.inventory, target, dropped)
    }

    /// Applies a successful merge. A crafted type the snapshot does not know
    /// yet is recorded provisionally with one unit.
    pub fn resolve_merge(
        &mut self,
        id: AttemptId,
        crafted: &CraftedItem,
        now_ms: u64,
    ) -> Option<ResolvedMerge> {
        let resolved = self.merges.resolve(&mut self.board, id, crafted, now_ms)?;
        self.inventory.insert_provisional(crafted.provisional_item());
        Some(resolved)
    }

    pub fn fail_merge(&mut self, id: AttemptId) -> Option<FailedMerge> {
        self.merges.fail(&mut self.board, &self.inventory, id)
    }

    /// Clears the highlight of a freshly crafted token.
    pub fn settle(&mut self, instance: &InstanceId) -> bool {
        self.board.get(instance).is_some_and(BoardToken::is_new)
            && self.board.set_new(instance, false)
    }

    /// Swaps in a refetched, unfiltered inventory. Tokens already on the
    /// board stay put even if the new amounts no longer cover them.
    pub fn replace_inventory(&mut self, inventory: InventorySnapshot) {
        self.inventory = inventory;
    }

    /// Narrows the tray to search results; `None` lists the full inventory.
    /// Availability keeps using the full inventory.
    pub fn set_tray_filter(&mut self, filtered: Option<InventorySnapshot>) {
        self.tray_filter = filtered;
    }

    /// Clears the board and forgets pending merges; returns the discarded
    /// attempts.
    pub fn reset(&mut self) -> Vec<AttemptId> {
        let mut discarded: Vec<_> = self.merges.pending().map(|attempt| attempt.id).collect();
        discarded.sort_unstable();
        self.merges.clear();
        self.board.clear();
        discarded
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let ledger = self.ledger();

        let mut tokens: Vec<_> = self.board.tokens().cloned().collect();
        tokens.sort_by(|a, b| a.instance.cmp(&b.instance));

        let listed = self.tray_filter.as_ref().unwrap_or(&self.inventory);
        let tray = listed
            .iter()
            .map(|item| {
                let availability = if self.inventory.contains(&item.id) {
                    ledger.remaining_available(&item.id)
                } else {
                    // Listed by a search newer than the last full refetch.
                    ledger.availability_of(item)
                };
                TrayEntry {
                    item: item.clone(),
                    availability,
                    disabled: availability.is_exhausted(),
                }
            })
            .collect();

        let mut pending: Vec<_> = self.merges.pending().cloned().collect();
        pending.sort_by_key(|attempt| attempt.id);

        BoardSnapshot {
            tokens,
            tray,
            pending,
        }
    }
}

/// Inventory tray row.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrayEntry {
    pub item: InventoryItem,
    pub availability: Availability,
    /// Rendered greyed out and not draggable.
    pub disabled: bool,
}

/// Read-only copy of the session for renderers and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardSnapshot {
    pub tokens: Vec<BoardToken>,
    pub tray: Vec<TrayEntry>,
    pub pending: Vec<MergeAttempt>,
}

impl BoardSnapshot {
    /// Tokens currently rendered, i.e. not hidden by a pending merge.
    pub fn visible(&self) -> impl Iterator<Item = &BoardToken> {
        self.tokens.iter().filter(|token| !token.is_hidden())
    }

    pub fn token(&self, instance: &InstanceId) -> Option<&BoardToken> {
        self.tokens.iter().find(|token| &token.instance == instance)
    }

    pub fn tray_entry(&self, item: &ItemId) -> Option<&TrayEntry> {
        self.tray.iter().find(|entry| &entry.item.id == item)
    }
}
