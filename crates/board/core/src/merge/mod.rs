//! Merge state machine.
//!
//! One attempt moves through
//! `Idle -> Validating -> Pending -> Resolved | Failed` and returns to
//! `Idle`. [`MergeCoordinator::begin`] covers entry, validation and the
//! optimistic hide; the caller then runs the merge RPC and reports back with
//! [`MergeCoordinator::resolve`] or [`MergeCoordinator::fail`]. Attempts on
//! different targets may be pending at the same time and settle in any
//! order. A target holds at most one pending attempt.
mod attempt;

use std::collections::HashMap;

pub use attempt::{
    AttemptId, CraftedItem, FailedMerge, MergeAttempt, MergePhase, MergeSource, ResolvedMerge,
};

use crate::error::Rejection;
use crate::inventory::{InventoryLedger, InventorySnapshot, ItemId};
use crate::state::{BoardState, BoardToken, InstanceId, TokenFlags};

#[derive(Clone, Debug, Default)]
pub struct MergeCoordinator {
    pending: HashMap<AttemptId, MergeAttempt>,
    /// Target instance -> attempt anchored on it.
    locked_targets: HashMap<InstanceId, AttemptId>,
    next_attempt: u64,
}

impl MergeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase of the merge anchored on `target`, if any.
    pub fn phase(&self, target: &InstanceId) -> MergePhase {
        if self.locked_targets.contains_key(target) {
            MergePhase::Pending
        } else {
            MergePhase::Idle
        }
    }

    pub fn attempt(&self, id: AttemptId) -> Option<&MergeAttempt> {
        self.pending.get(&id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &MergeAttempt> {
        self.pending.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Units of `item` dropped straight from the tray into attempts that are
    /// still pending. Tray drops have no token to hide, so the unit is held
    /// here until the attempt settles.
    pub fn reserved_units(&self, item: &ItemId) -> u32 {
        let count = self
            .pending
            .values()
            .filter(|attempt| matches!(&attempt.dropped, MergeSource::Inventory(id) if id == item))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// True if `instance` is the target or the dropped token of a pending
    /// attempt.
    pub fn is_engaged(&self, instance: &InstanceId) -> bool {
        self.locked_targets.contains_key(instance)
            || self
                .pending
                .values()
                .any(|attempt| attempt.dropped_instance() == Some(instance))
    }

    /// Starts a merge of `dropped` onto `target`.
    ///
    /// On success the dropped token (if it is a board token) is hidden, the
    /// target is locked, and the returned attempt carries the item ids to
    /// send to the merge RPC. On rejection nothing changes.
    pub fn begin(
        &mut self,
        board: &mut BoardState,
        inventory: &InventorySnapshot,
        target: &InstanceId,
        dropped: MergeSource,
    ) -> Result<MergeAttempt, Rejection> {
        let target_token = self.check_entry(board, target, &dropped)?;

        let mut attempt = MergeAttempt {
            id: AttemptId(self.next_attempt),
            phase: MergePhase::Validating,
            target: target.clone(),
            target_item: target_token.original_id.clone(),
            dropped_item: match &dropped {
                MergeSource::Token(instance) => board
                    .get(instance)
                    .map(|token| token.original_id.clone())
                    .ok_or_else(|| Rejection::DroppedMissing {
                        instance: instance.clone(),
                    })?,
                MergeSource::Inventory(item) => item.clone(),
            },
            dropped,
            anchor: target_token.position,
        };

        self.validate(board, inventory, &attempt)?;

        self.next_attempt += 1;
        if let Some(instance) = attempt.dropped_instance() {
            board.set_hidden(instance, true);
        }
        attempt.phase = MergePhase::Pending;
        self.locked_targets.insert(attempt.target.clone(), attempt.id);
        self.pending.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    /// Completes an attempt with the crafted item.
    ///
    /// Both sources leave the board and a highlighted token for `crafted`
    /// takes the target's place. Returns `None` for attempts that are no
    /// longer pending (e.g. discarded by a reset).
    pub fn resolve(
        &mut self,
        board: &mut BoardState,
        id: AttemptId,
        crafted: &CraftedItem,
        now_ms: u64,
    ) -> Option<ResolvedMerge> {
        let mut attempt = self.release(id)?;
        let anchor = board
            .get(&attempt.target)
            .map(|token| token.position)
            .unwrap_or(attempt.anchor);

        let token = BoardToken {
            instance: InstanceId::generate(&crafted.id, now_ms),
            original_id: crafted.id.clone(),
            title: crafted.handle.clone(),
            emoji: crafted.emoji.clone(),
            position: anchor,
            flags: TokenFlags::NEW,
        };
        board.replace(&attempt.target, attempt.dropped_instance(), token.clone());

        attempt.phase = MergePhase::Resolved;
        Some(ResolvedMerge {
            attempt,
            token: board.get(&token.instance).cloned().unwrap_or(token),
        })
    }

    /// Rolls an attempt back to its pre-merge visuals.
    ///
    /// The dropped token becomes visible again unless its units were placed
    /// elsewhere in the meantime; in that case it returns to the inventory
    /// (is removed) so the board never over-allocates.
    pub fn fail(
        &mut self,
        board: &mut BoardState,
        inventory: &InventorySnapshot,
        id: AttemptId,
    ) -> Option<FailedMerge> {
        let mut attempt = self.release(id)?;
        let mut restored = Vec::with_capacity(2);
        let mut returned = None;

        if board.set_hidden(&attempt.target, false) {
            restored.push(attempt.target.clone());
        }

        if let Some(instance) = attempt.dropped_instance().cloned() {
            let fits = InventoryLedger::new(inventory, board)
                .with_merges(self)
                .can_place(&attempt.dropped_item, 1);
            if fits {
                if board.set_hidden(&instance, false) {
                    restored.push(instance);
                }
            } else if board.remove(&instance).is_some() {
                returned = Some(instance);
            }
        }

        attempt.phase = MergePhase::Failed;
        Some(FailedMerge {
            attempt,
            restored,
            returned,
        })
    }

    /// Forgets every pending attempt. Attempt ids keep counting so late
    /// results for discarded attempts are recognised as stale.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.locked_targets.clear();
    }

    fn release(&mut self, id: AttemptId) -> Option<MergeAttempt> {
        let attempt = self.pending.remove(&id)?;
        if self.locked_targets.get(&attempt.target) == Some(&id) {
            self.locked_targets.remove(&attempt.target);
        }
        Some(attempt)
    }

    fn check_entry<'b>(
        &self,
        board: &'b BoardState,
        target: &InstanceId,
        dropped: &MergeSource,
    ) -> Result<&'b BoardToken, Rejection> {
        let target_token = board.get(target).ok_or_else(|| Rejection::TargetMissing {
            instance: target.clone(),
        })?;

        if let MergeSource::Token(instance) = dropped {
            if instance == target {
                return Err(Rejection::SelfDrop);
            }
            let token = board.get(instance).ok_or_else(|| Rejection::DroppedMissing {
                instance: instance.clone(),
            })?;
            if token.is_hidden() || self.is_engaged(instance) {
                return Err(Rejection::DroppedBusy {
                    instance: instance.clone(),
                });
            }
        }

        if target_token.is_hidden() {
            return Err(Rejection::TargetHidden {
                instance: target.clone(),
            });
        }
        if self.locked_targets.contains_key(target) {
            return Err(Rejection::TargetLocked {
                instance: target.clone(),
            });
        }

        Ok(target_token)
    }

    fn validate(
        &self,
        board: &BoardState,
        inventory: &InventorySnapshot,
        attempt: &MergeAttempt,
    ) -> Result<(), Rejection> {
        let ledger = InventoryLedger::new(inventory, board).with_merges(self);

        if !ledger.covers_placed(&attempt.target_item) {
            return Err(Rejection::ItemUnavailable {
                item: attempt.target_item.clone(),
            });
        }

        match &attempt.dropped {
            MergeSource::Token(_) => {
                if !ledger.covers_placed(&attempt.dropped_item) {
                    return Err(Rejection::ItemUnavailable {
                        item: attempt.dropped_item.clone(),
                    });
                }
            }
            MergeSource::Inventory(item) => {
                if ledger.item(item).is_none() {
                    return Err(Rejection::UnknownItem { item: item.clone() });
                }
                if !ledger.can_place(item, 1) {
                    return Err(Rejection::ItemUnavailable { item: item.clone() });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::geometry::Position;
    use crate::inventory::InventoryItem;

    struct Fixture {
        board: BoardState,
        inventory: InventorySnapshot,
        merges: MergeCoordinator,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                board: BoardState::new(BoardConfig::default()),
                inventory: InventorySnapshot::new([
                    InventoryItem::new("10", "Mud", "🟫").with_amount(1),
                    InventoryItem::new("20", "Rock", "🪨").with_amount(1),
                    InventoryItem::new("fire", "Fire", "🔥").basic(),
                ]),
                merges: MergeCoordinator::new(),
            }
        }

        fn place(&mut self, item: impl Into<ItemId>, position: Position) -> InstanceId {
            let item = self.inventory.get(&item.into()).cloned().unwrap();
            self.board.place(&item, position, 1)
        }

        fn begin(
            &mut self,
            target: &InstanceId,
            dropped: MergeSource,
        ) -> Result<MergeAttempt, Rejection> {
            self.merges
                .begin(&mut self.board, &self.inventory, target, dropped)
        }
    }

    fn golem() -> CraftedItem {
        CraftedItem::new("99", "Stone Golem", "🗿")
    }

    #[test]
    fn begin_hides_dropped_and_locks_target() {
        let mut fx = Fixture::new();
        let a = fx.place("10", Position::new(40, 40));
        let b = fx.place("20", Position::new(200, 100));

        let attempt = fx.begin(&b, MergeSource::Token(a.clone())).unwrap();

        assert_eq!(attempt.phase, MergePhase::Pending);
        assert_eq!(attempt.target_item, ItemId::from("20"));
        assert_eq!(attempt.dropped_item, ItemId::from("10"));
        assert!(fx.board.get(&a).unwrap().is_hidden());
        assert!(!fx.board.get(&b).unwrap().is_hidden());
        assert_eq!(fx.merges.phase(&b), MergePhase::Pending);
    }

    #[test]
    fn second_attempt_on_pending_target_is_rejected() {
        let mut fx = Fixture::new();
        let b = fx.place("20", Position::new(200, 100));
        let f1 = fx.place("fire", Position::new(40, 40));
        let f2 = fx.place("fire", Position::new(80, 40));

        fx.begin(&b, MergeSource::Token(f1)).unwrap();
        let second = fx.begin(&b, MergeSource::Token(f2.clone()));

        assert_eq!(second, Err(Rejection::TargetLocked { instance: b }));
        assert!(!fx.board.get(&f2).unwrap().is_hidden());
        assert_eq!(fx.merges.pending_count(), 1);
    }

    #[test]
    fn hidden_and_self_targets_are_rejected() {
        let mut fx = Fixture::new();
        let a = fx.place("10", Position::new(40, 40));
        let b = fx.place("20", Position::new(200, 100));
        let f = fx.place("fire", Position::new(80, 200));

        assert_eq!(fx.begin(&a, MergeSource::Token(a.clone())), Err(Rejection::SelfDrop));

        fx.begin(&b, MergeSource::Token(a.clone())).unwrap();
        assert_eq!(
            fx.begin(&a, MergeSource::Token(f.clone())),
            Err(Rejection::TargetHidden { instance: a.clone() })
        );
        assert_eq!(
            fx.begin(&f, MergeSource::Token(b.clone())),
            Err(Rejection::DroppedBusy { instance: b })
        );
    }

    #[test]
    fn inventory_drop_requires_a_free_unit() {
        let mut fx = Fixture::new();
        let a = fx.place("10", Position::new(40, 40));
        let b = fx.place("20", Position::new(200, 100));

        let rejected = fx.begin(&b, MergeSource::Inventory(ItemId::from("10")));
        assert_eq!(rejected, Err(Rejection::ItemUnavailable { item: ItemId::from("10") }));
        assert_eq!(fx.merges.pending_count(), 0);

        let unknown = fx.begin(&a, MergeSource::Inventory(ItemId::from("ghost")));
        assert_eq!(unknown, Err(Rejection::UnknownItem { item: ItemId::from("ghost") }));

        let attempt = fx.begin(&a, MergeSource::Inventory(ItemId::from("fire"))).unwrap();
        assert_eq!(attempt.dropped_instance(), None);
        assert_eq!(fx.merges.phase(&a), MergePhase::Pending);
    }

    #[test]
    fn one_tray_unit_cannot_feed_two_pending_merges() {
        let mut fx = Fixture::new();
        let f1 = fx.place("fire", Position::new(40, 40));
        let f2 = fx.place("fire", Position::new(120, 40));
        let mud = ItemId::from("10");

        let first = fx.begin(&f1, MergeSource::Inventory(mud.clone())).unwrap();
        assert_eq!(fx.merges.reserved_units(&mud), 1);

        let second = fx.begin(&f2, MergeSource::Inventory(mud.clone()));
        assert_eq!(second, Err(Rejection::ItemUnavailable { item: mud.clone() }));
        assert_eq!(fx.merges.pending_count(), 1);

        fx.merges.fail(&mut fx.board, &fx.inventory, first.id).unwrap();
        assert_eq!(fx.merges.reserved_units(&mud), 0);
        assert!(fx.begin(&f2, MergeSource::Inventory(mud)).is_ok());
    }

    #[test]
    fn shrunken_inventory_blocks_merging_placed_tokens() {
        let mut fx = Fixture::new();
        let a = fx.place("10", Position::new(40, 40));
        let b = fx.place("20", Position::new(200, 100));
        fx.inventory = InventorySnapshot::new([
            InventoryItem::new("10", "Mud", "🟫").with_amount(0),
            InventoryItem::new("20", "Rock", "🪨").with_amount(1),
        ]);

        let rejected = fx.begin(&b, MergeSource::Token(a.clone()));
        assert_eq!(rejected, Err(Rejection::ItemUnavailable { item: ItemId::from("10") }));
        assert!(!fx.board.get(&a).unwrap().is_hidden());
    }

    #[test]
    fn resolve_replaces_both_sources_at_target_position() {
        let mut fx = Fixture::new();
        let a = fx.place("10", Position::new(40, 40));
        let b = fx.place("20", Position::new(200, 100));
        let attempt = fx.begin(&b, MergeSource::Token(a.clone())).unwrap();

        let resolved = fx.merges.resolve(&mut fx.board, attempt.id, &golem(), 5).unwrap();

        assert_eq!(resolved.attempt.phase, MergePhase::Resolved);
        assert_eq!(fx.board.len(), 1);
        assert!(!fx.board.contains(&a) && !fx.board.contains(&b));
        let token = fx.board.get(&resolved.token.instance).unwrap();
        assert_eq!(token.original_id, ItemId::from("99"));
        assert_eq!(token.position, Position::new(200, 100));
        assert!(token.is_new());
        assert_eq!(fx.merges.phase(&b), MergePhase::Idle);
    }

    #[test]
    fn fail_restores_both_tokens() {
        let mut fx = Fixture::new();
        let a = fx.place("10", Position::new(40, 40));
        let b = fx.place("20", Position::new(200, 100));
        let attempt = fx.begin(&b, MergeSource::Token(a.clone())).unwrap();

        let failed = fx.merges.fail(&mut fx.board, &fx.inventory, attempt.id).unwrap();

        assert_eq!(failed.attempt.phase, MergePhase::Failed);
        assert_eq!(failed.returned, None);
        assert_eq!(fx.board.len(), 2);
        assert!(fx.board.tokens().all(|token| !token.is_hidden()));
        assert_eq!(fx.merges.pending_count(), 0);
    }

    #[test]
    fn fail_returns_dropped_token_when_its_unit_was_reused() {
        let mut fx = Fixture::new();
        let a = fx.place("10", Position::new(40, 40));
        let b = fx.place("20", Position::new(200, 100));
        let attempt = fx.begin(&b, MergeSource::Token(a.clone())).unwrap();

        // The hidden token frees its unit, which the player spends elsewhere.
        fx.place("10", Position::new(300, 300));
        let failed = fx.merges.fail(&mut fx.board, &fx.inventory, attempt.id).unwrap();

        assert_eq!(failed.returned, Some(a.clone()));
        assert!(!fx.board.contains(&a));
        assert_eq!(fx.board.count_visible(&ItemId::from("10")), 1);
    }

    #[test]
    fn settling_an_unknown_attempt_is_a_no_op() {
        let mut fx = Fixture::new();
        let a = fx.place("10", Position::new(40, 40));
        let b = fx.place("20", Position::new(200, 100));
        let attempt = fx.begin(&b, MergeSource::Token(a)).unwrap();

        fx.merges.clear();
        assert!(fx.merges.resolve(&mut fx.board, attempt.id, &golem(), 5).is_none());
        assert!(fx.merges.fail(&mut fx.board, &fx.inventory, attempt.id).is_none());

        let next = fx.place("fire", Position::new(10, 10));
        let again = fx.begin(&b, MergeSource::Token(next)).unwrap();
        assert_ne!(again.id, attempt.id);
    }
}
