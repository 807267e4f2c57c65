//! Board-relative pixel geometry.
use std::fmt;
use std::ops::Add;

/// Top-left corner of a token, relative to the droppable area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub left: i32,
    pub top: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { left: 0, top: 0 };

    pub fn new(left: i32, top: i32) -> Self {
        Self { left, top }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.top)
    }
}

/// Pointer travel reported by the drag layer between drag start and drag end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delta {
    pub x: i32,
    pub y: i32,
}

impl Delta {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add<Delta> for Position {
    type Output = Position;

    fn add(self, delta: Delta) -> Position {
        Position::new(
            self.left.saturating_add(delta.x),
            self.top.saturating_add(delta.y),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn half(self) -> Delta {
        Delta::new(self.width / 2, self.height / 2)
    }
}

/// Clamps `position` so a token of size `token` stays inside `container`
/// with `padding` pixels to spare on every edge.
///
/// When the container is too small for the token the lower bound wins, so
/// the result is always `>= padding` on both axes.
pub fn clamp_position(position: Position, token: Size, container: Size, padding: i32) -> Position {
    let max_left = container.width - token.width - padding;
    let max_top = container.height - token.height - padding;
    Position::new(
        clamp_axis(position.left, padding, max_left),
        clamp_axis(position.top, padding, max_top),
    )
}

fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    value.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: Size = Size {
        width: 80,
        height: 36,
    };
    const CONTAINER: Size = Size {
        width: 360,
        height: 480,
    };

    #[test]
    fn inside_positions_are_untouched() {
        let pos = Position::new(100, 200);
        assert_eq!(clamp_position(pos, TOKEN, CONTAINER, 10), pos);
    }

    #[test]
    fn negative_and_oversized_coordinates_are_pulled_in() {
        let low = clamp_position(Position::new(-500, -3), TOKEN, CONTAINER, 10);
        assert_eq!(low, Position::new(10, 10));

        let high = clamp_position(Position::new(10_000, 9_999), TOKEN, CONTAINER, 10);
        assert_eq!(high, Position::new(360 - 80 - 10, 480 - 36 - 10));
    }

    #[test]
    fn bounds_hold_for_a_sweep_of_drop_points() {
        for x in (-400..800).step_by(37) {
            for y in (-400..900).step_by(41) {
                let pos = clamp_position(Position::new(x, y), TOKEN, CONTAINER, 10);
                assert!(pos.left >= 10 && pos.left <= CONTAINER.width - TOKEN.width - 10);
                assert!(pos.top >= 10 && pos.top <= CONTAINER.height - TOKEN.height - 10);
            }
        }
    }

    #[test]
    fn tiny_container_falls_back_to_padding() {
        let pos = clamp_position(Position::new(50, 50), TOKEN, Size::new(40, 20), 10);
        assert_eq!(pos, Position::new(10, 10));
    }

    #[test]
    fn delta_is_added_per_axis() {
        assert_eq!(Position::new(20, 30) + Delta::new(-5, 12), Position::new(15, 42));
    }
}
