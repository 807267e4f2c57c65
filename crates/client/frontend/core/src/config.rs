//! Frontend configuration structures and loaders.
//!
//! UI settings shared by every frontend: the toast log and where the board
//! sits in client space.
use std::env;

use crate::drag::ClientPoint;

#[derive(Clone, Debug, Default)]
pub struct FrontendConfig {
    pub messages: MessageConfig,
    /// Top-left corner of the board in client coordinates.
    pub board_origin: ClientPoint,
}

impl FrontendConfig {
    pub const fn new(messages: MessageConfig, board_origin: ClientPoint) -> Self {
        Self {
            messages,
            board_origin,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BOARD_MESSAGE_CAPACITY` - Toast log capacity (default: 32)
    /// - `BOARD_SHOW_MERGE_MESSAGES` - Toast successful merges (default: true)
    /// - `BOARD_SHOW_REFRESH_MESSAGES` - Toast successful refetches (default: false)
    /// - `BOARD_ORIGIN_X` / `BOARD_ORIGIN_Y` - Board offset in client space (default: 0)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("BOARD_MESSAGE_CAPACITY") {
            config.messages.capacity = capacity.max(1);
        }
        if let Some(show) = read_env_bool("BOARD_SHOW_MERGE_MESSAGES") {
            config.messages.show_merges = show;
        }
        if let Some(show) = read_env_bool("BOARD_SHOW_REFRESH_MESSAGES") {
            config.messages.show_refreshes = show;
        }
        if let Some(x) = read_env::<i32>("BOARD_ORIGIN_X") {
            config.board_origin.x = x;
        }
        if let Some(y) = read_env::<i32>("BOARD_ORIGIN_Y") {
            config.board_origin.y = y;
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
    pub show_merges: bool,
    /// Refetches happen after every merge, so these are noisy.
    pub show_refreshes: bool,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            show_merges: true,
            show_refreshes: false,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
