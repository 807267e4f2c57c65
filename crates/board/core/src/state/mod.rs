//! Tokens currently placed on the crafting board.
//!
//! [`BoardState`] is a keyed map of placements. Every operation is a
//! defensive no-op on unknown ids: the drag layer may deliver trailing events
//! for tokens that were already merged or removed, and those must never
//! fail.
mod token;

use std::collections::HashMap;

pub use token::{BoardToken, InstanceId, TokenFlags};

use crate::config::BoardConfig;
use crate::geometry::{Position, clamp_position};
use crate::inventory::{InventoryItem, ItemId};

#[derive(Clone, Debug)]
pub struct BoardState {
    config: BoardConfig,
    tokens: HashMap<InstanceId, BoardToken>,
}

impl BoardState {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            tokens: HashMap::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn get(&self, instance: &InstanceId) -> Option<&BoardToken> {
        self.tokens.get(instance)
    }

    pub fn contains(&self, instance: &InstanceId) -> bool {
        self.tokens.contains_key(instance)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &BoardToken> {
        self.tokens.values()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of visible tokens showing `item`.
    pub fn count_visible(&self, item: &ItemId) -> u32 {
        let count = self
            .tokens
            .values()
            .filter(|token| &token.original_id == item && !token.is_hidden())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Clamps `position` for a token titled `title`.
    pub fn clamp(&self, title: &str, position: Position) -> Position {
        clamp_position(
            position,
            self.config.token.estimate(title),
            self.config.container(),
            self.config.edge_padding,
        )
    }

    /// Places a new token for `item` and returns its fresh instance id.
    ///
    /// Availability is the caller's concern; see
    /// [`InventoryLedger::can_place`](crate::InventoryLedger::can_place).
    pub fn place(&mut self, item: &InventoryItem, position: Position, now_ms: u64) -> InstanceId {
        let instance = InstanceId::generate(&item.id, now_ms);
        let position = self.clamp(&item.handle, position);
        let token = BoardToken::from_item(instance.clone(), item, position);
        self.tokens.insert(instance.clone(), token);
        instance
    }

    /// Inserts a prepared token, clamping its position.
    pub fn insert(&mut self, mut token: BoardToken) {
        token.position = self.clamp(&token.title, token.position);
        self.tokens.insert(token.instance.clone(), token);
    }

    /// Moves a token; returns the clamped position, or `None` if the token
    /// is gone.
    pub fn move_token(&mut self, instance: &InstanceId, position: Position) -> Option<Position> {
        let clamped = {
            let token = self.tokens.get(instance)?;
            self.clamp(&token.title, position)
        };
        let token = self.tokens.get_mut(instance)?;
        token.position = clamped;
        Some(clamped)
    }

    /// Returns true if the token exists.
    pub fn set_hidden(&mut self, instance: &InstanceId, hidden: bool) -> bool {
        self.set_flag(instance, TokenFlags::HIDDEN, hidden)
    }

    pub fn set_new(&mut self, instance: &InstanceId, new: bool) -> bool {
        self.set_flag(instance, TokenFlags::NEW, new)
    }

    pub fn remove(&mut self, instance: &InstanceId) -> Option<BoardToken> {
        self.tokens.remove(instance)
    }

    /// Swaps the merge sources for the crafted token in one step.
    ///
    /// Either source may already be gone; the new token is inserted
    /// regardless.
    pub fn replace(
        &mut self,
        target: &InstanceId,
        dropped: Option<&InstanceId>,
        token: BoardToken,
    ) {
        self.tokens.remove(target);
        if let Some(dropped) = dropped {
            self.tokens.remove(dropped);
        }
        self.insert(token);
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    fn set_flag(&mut self, instance: &InstanceId, flag: TokenFlags, value: bool) -> bool {
        match self.tokens.get_mut(instance) {
            Some(token) => {
                token.flags.set(flag, value);
                true
            }
            None => false,
        }
    }
}
