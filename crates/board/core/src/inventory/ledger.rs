use std::fmt;

use crate::inventory::{InventoryItem, InventorySnapshot, ItemId};
use crate::merge::MergeCoordinator;
use crate::state::BoardState;

/// How many more units of an item may be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Availability {
    /// Basic items are never capacity-limited.
    Unlimited,
    /// `amount - placed - reserved`; negative when the board holds more than the
    /// latest snapshot grants (e.g. the inventory shrank after a refetch).
    Limited(i64),
}

impl Availability {
    /// Whether `quantity` more units fit.
    pub fn allows(self, quantity: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(remaining) => remaining >= i64::from(quantity),
        }
    }

    /// True when nothing more may be placed; the tray renders such items
    /// disabled.
    pub fn is_exhausted(self) -> bool {
        !self.allows(1)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Limited(remaining) => write!(f, "{remaining} left"),
        }
    }
}

/// Read-only view deriving availability from an inventory snapshot and the
/// board occupancy.
///
/// The ledger keeps no counters of its own. Every query recounts the board
/// (and, when attached, the pending merges), so it can never drift from the
/// state it describes.
#[derive(Clone, Copy)]
pub struct InventoryLedger<'a> {
    inventory: &'a InventorySnapshot,
    board: &'a BoardState,
    merges: Option<&'a MergeCoordinator>,
}

impl<'a> InventoryLedger<'a> {
    pub fn new(inventory: &'a InventorySnapshot, board: &'a BoardState) -> Self {
        Self {
            inventory,
            board,
            merges: None,
        }
    }

    /// Also counts units held by pending merges dropped straight from the
    /// tray.
    pub fn with_merges(mut self, merges: &'a MergeCoordinator) -> Self {
        self.merges = Some(merges);
        self
    }

    pub fn item(&self, id: &ItemId) -> Option<&'a InventoryItem> {
        self.inventory.get(id)
    }

    /// Visible tokens of `id` on the board.
    ///
    /// Hidden tokens belong to an in-flight merge and are not counted.
    pub fn count_on_board(&self, id: &ItemId) -> u32 {
        self.board.count_visible(id)
    }

    /// Units of `id` held by pending tray-origin merges.
    pub fn reserved(&self, id: &ItemId) -> u32 {
        self.merges.map_or(0, |merges| merges.reserved_units(id))
    }

    fn in_use(&self, id: &ItemId) -> i64 {
        i64::from(self.count_on_board(id)) + i64::from(self.reserved(id))
    }

    /// Units of `id` that may still be placed. Items missing from the
    /// snapshot are treated as owning zero units.
    pub fn remaining_available(&self, id: &ItemId) -> Availability {
        match self.inventory.get(id) {
            Some(item) => self.availability_of(item),
            None => Availability::Limited(-self.in_use(id)),
        }
    }

    /// Like [`remaining_available`](Self::remaining_available), but trusts
    /// the given record instead of looking it up in the snapshot.
    pub fn availability_of(&self, item: &InventoryItem) -> Availability {
        if item.is_basic {
            Availability::Unlimited
        } else {
            Availability::Limited(i64::from(item.amount) - self.in_use(&item.id))
        }
    }

    pub fn can_place(&self, id: &ItemId, quantity: u32) -> bool {
        self.remaining_available(id).allows(quantity)
    }

    /// Whether the tokens of `id` already on the board are still backed by
    /// the inventory, i.e. the board does not hold more than is owned.
    pub fn covers_placed(&self, id: &ItemId) -> bool {
        self.remaining_available(id).allows(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::geometry::Position;

    fn inventory() -> InventorySnapshot {
        InventorySnapshot::new([
            InventoryItem::new("wood", "Wood", "🪵").with_amount(2),
            InventoryItem::new("fire", "Fire", "🔥").basic(),
        ])
    }

    #[test]
    fn limited_items_count_down_with_placements() {
        let inventory = inventory();
        let mut board = BoardState::new(BoardConfig::default());
        let wood = inventory.get(&ItemId::from("wood")).cloned().unwrap();

        assert_eq!(
            InventoryLedger::new(&inventory, &board).remaining_available(&wood.id),
            Availability::Limited(2)
        );

        board.place(&wood, Position::new(50, 50), 1);
        board.place(&wood, Position::new(90, 50), 1);

        let ledger = InventoryLedger::new(&inventory, &board);
        assert_eq!(ledger.remaining_available(&wood.id), Availability::Limited(0));
        assert!(!ledger.can_place(&wood.id, 1));
        assert!(ledger.covers_placed(&wood.id));
    }

    #[test]
    fn hidden_tokens_are_not_counted() {
        let inventory = inventory();
        let mut board = BoardState::new(BoardConfig::default());
        let wood = inventory.get(&ItemId::from("wood")).cloned().unwrap();

        let first = board.place(&wood, Position::new(50, 50), 1);
        board.place(&wood, Position::new(90, 50), 1);
        board.set_hidden(&first, true);

        let ledger = InventoryLedger::new(&inventory, &board);
        assert_eq!(ledger.count_on_board(&wood.id), 1);
        assert_eq!(ledger.remaining_available(&wood.id), Availability::Limited(1));
    }

    #[test]
    fn basic_items_are_unlimited() {
        let inventory = inventory();
        let mut board = BoardState::new(BoardConfig::default());
        let fire = inventory.get(&ItemId::from("fire")).cloned().unwrap();
        for step in 0..50 {
            board.place(&fire, Position::new(step, step), 1);
        }

        let ledger = InventoryLedger::new(&inventory, &board);
        assert_eq!(ledger.remaining_available(&fire.id), Availability::Unlimited);
        assert!(ledger.can_place(&fire.id, 1_000));
    }

    #[test]
    fn unknown_items_have_nothing_left() {
        let inventory = inventory();
        let board = BoardState::new(BoardConfig::default());
        let ledger = InventoryLedger::new(&inventory, &board);

        assert!(ledger.covers_placed(&ItemId::from("ghost")));
        assert!(!ledger.can_place(&ItemId::from("ghost"), 1));
    }

    #[test]
    fn pending_tray_merges_hold_their_unit() {
        use crate::merge::MergeSource;

        let inventory = InventorySnapshot::new([
            InventoryItem::new("gem", "Gem", "💎").with_amount(1),
            InventoryItem::new("fire", "Fire", "🔥").basic(),
        ]);
        let mut board = BoardState::new(BoardConfig::default());
        let fire = inventory.get(&ItemId::from("fire")).cloned().unwrap();
        let target = board.place(&fire, Position::new(40, 40), 1);
        let gem = ItemId::from("gem");

        let mut merges = MergeCoordinator::new();
        merges
            .begin(&mut board, &inventory, &target, MergeSource::Inventory(gem.clone()))
            .unwrap();

        let bare = InventoryLedger::new(&inventory, &board);
        assert_eq!(bare.remaining_available(&gem), Availability::Limited(1));

        let ledger = bare.with_merges(&merges);
        assert_eq!(ledger.reserved(&gem), 1);
        assert_eq!(ledger.remaining_available(&gem), Availability::Limited(0));
        assert!(ledger.covers_placed(&gem));
        assert!(!ledger.can_place(&gem, 1));
    }
}
