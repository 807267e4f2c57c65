//! Global pointer tracking for tray-to-board drops.
use board_core::{Delta, Position};

/// Pointer coordinates in client (viewport) space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientPoint {
    pub x: i32,
    pub y: i32,
}

impl ClientPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Raw pointer input, mouse or touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerSample {
    Mouse(ClientPoint),
    /// First active touch point.
    Touch(ClientPoint),
    /// Last finger lifted; the previous position stays valid for the drop.
    TouchEnd,
}

/// Remembers the latest pointer position.
///
/// Items dragged out of the tray have no board position of their own, so the
/// drop position is derived from where the pointer was at release.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    last: Option<ClientPoint>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sample: PointerSample) {
        match sample {
            PointerSample::Mouse(point) | PointerSample::Touch(point) => self.last = Some(point),
            PointerSample::TouchEnd => {}
        }
    }

    pub fn last(&self) -> Option<ClientPoint> {
        self.last
    }

    /// Board-relative position of the last sample, given the board's
    /// top-left corner in client space.
    pub fn board_position(&self, board_origin: ClientPoint) -> Option<Position> {
        self.last.map(|point| to_board(point, board_origin))
    }
}

pub(crate) fn to_board(point: ClientPoint, board_origin: ClientPoint) -> Position {
    Position::new(
        point.x.saturating_sub(board_origin.x),
        point.y.saturating_sub(board_origin.y),
    )
}

/// Centres a token of half-size `half` on `pointer`.
pub(crate) fn centred(pointer: Position, half: Delta) -> Position {
    pointer + Delta::new(-half.x, -half.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_end_keeps_the_last_position() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.board_position(ClientPoint::new(0, 0)), None);

        tracker.update(PointerSample::Mouse(ClientPoint::new(120, 340)));
        tracker.update(PointerSample::Touch(ClientPoint::new(150, 360)));
        tracker.update(PointerSample::TouchEnd);

        assert_eq!(
            tracker.board_position(ClientPoint::new(20, 60)),
            Some(Position::new(130, 300))
        );
    }
}
