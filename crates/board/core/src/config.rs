//! Board dimensions and tunable constants.
use crate::geometry::Size;

/// Errors raised when a [`BoardConfig`] cannot describe a usable board.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("edge padding must not be negative, got {0}")]
    NegativePadding(i32),

    #[error("token metrics must be positive")]
    InvalidTokenMetrics,
}

/// Heuristic used to estimate a token's rendered footprint from its title.
///
/// The board never measures rendered text, so clamping works on this
/// estimate: a fixed base (emoji plus chrome) and a per-character width,
/// capped at `max_width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenMetrics {
    pub base_width: i32,
    pub char_width: i32,
    pub max_width: i32,
    pub height: i32,
}

impl TokenMetrics {
    pub const DEFAULT_BASE_WIDTH: i32 = 44;
    pub const DEFAULT_CHAR_WIDTH: i32 = 8;
    pub const DEFAULT_MAX_WIDTH: i32 = 220;
    pub const DEFAULT_HEIGHT: i32 = 36;

    /// Estimated size of a token displaying `title`.
    pub fn estimate(&self, title: &str) -> Size {
        let chars = i32::try_from(title.chars().count()).unwrap_or(i32::MAX);
        let width = self
            .base_width
            .saturating_add(self.char_width.saturating_mul(chars))
            .min(self.max_width);
        Size::new(width, self.height)
    }
}

impl Default for TokenMetrics {
    fn default() -> Self {
        Self {
            base_width: Self::DEFAULT_BASE_WIDTH,
            char_width: Self::DEFAULT_CHAR_WIDTH,
            max_width: Self::DEFAULT_MAX_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}

/// Geometry and timing of the crafting board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardConfig {
    /// Droppable area width in pixels.
    pub width: i32,
    /// Droppable area height in pixels.
    pub height: i32,
    /// Gap kept between any token and the board edge.
    pub edge_padding: i32,
    pub token: TokenMetrics,
    /// How long a freshly crafted token keeps its highlight.
    pub settle_delay_ms: u64,
}

impl BoardConfig {
    pub const DEFAULT_WIDTH: i32 = 360;
    pub const DEFAULT_HEIGHT: i32 = 480;
    pub const EDGE_PADDING: i32 = 10;
    pub const SETTLE_DELAY_MS: u64 = 1000;

    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_token_metrics(mut self, token: TokenMetrics) -> Self {
        self.token = token;
        self
    }

    pub fn container(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.edge_padding < 0 {
            return Err(ConfigError::NegativePadding(self.edge_padding));
        }
        let token = &self.token;
        if token.base_width <= 0
            || token.char_width < 0
            || token.max_width <= 0
            || token.height <= 0
        {
            return Err(ConfigError::InvalidTokenMetrics);
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            edge_padding: Self::EDGE_PADDING,
            token: TokenMetrics::default(),
            settle_delay_ms: Self::SETTLE_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_grows_with_title_and_caps() {
        let metrics = TokenMetrics::default();
        let short = metrics.estimate("Fire");
        let long = metrics.estimate(&"x".repeat(200));

        assert_eq!(short.width, 44 + 4 * 8);
        assert_eq!(short.height, TokenMetrics::DEFAULT_HEIGHT);
        assert_eq!(long.width, TokenMetrics::DEFAULT_MAX_WIDTH);
    }

    #[test]
    fn validate_rejects_degenerate_boards() {
        assert!(BoardConfig::default().validate().is_ok());
        assert_eq!(
            BoardConfig::new(0, 100).validate(),
            Err(ConfigError::InvalidDimensions {
                width: 0,
                height: 100
            })
        );

        let mut config = BoardConfig::default();
        config.edge_padding = -1;
        assert_eq!(config.validate(), Err(ConfigError::NegativePadding(-1)));
    }
}
