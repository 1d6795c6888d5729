//! Swipe tracking for panels.
//!
//! Only the decision logic lives here: where a drag may start, how far it
//! has travelled in the panel's opening direction, and whether it crossed the
//! threshold. Positions are in viewport columns.

use super::{PanelParams, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Opening,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeState {
    pub direction: SwipeDirection,
    pub start: i32,
    /// Signed travel in the opening direction.
    pub travel: i32,
}

/// What ending a drag decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    Open,
    Close,
    Cancel,
}

#[derive(Debug, Default)]
pub struct SwipeTracker {
    state: Option<SwipeState>,
}

impl SwipeTracker {
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<SwipeState> {
        self.state
    }

    /// Begin a drag at `x`. Opening drags must start inside the active area
    /// (measured from the panel's edge; `0` means anywhere).
    pub fn start(&mut self, params: &PanelParams, viewport: i32, x: i32, opened: bool) -> bool {
        self.state = None;
        if !params.swipe {
            return false;
        }
        let direction = if opened {
            SwipeDirection::Closing
        } else {
            if params.swipe_only_close {
                return false;
            }
            let area = i32::from(params.swipe_active_area);
            let from_edge = match params.side {
                Side::Left => x,
                Side::Right => viewport - x,
            };
            if area > 0 && from_edge > area {
                return false;
            }
            SwipeDirection::Opening
        };
        self.state = Some(SwipeState {
            direction,
            start: x,
            travel: 0,
        });
        true
    }

    /// Record movement to `x`; returns the open progress in `0.0..=1.0`.
    pub fn update(&mut self, params: &PanelParams, width: u16, x: i32) -> Option<f32> {
        let state = self.state.as_mut()?;
        state.travel = match params.side {
            Side::Left => x - state.start,
            Side::Right => state.start - x,
        };
        let width = f32::from(width.max(1));
        let travel = state.travel as f32;
        let progress = match state.direction {
            SwipeDirection::Opening => travel / width,
            SwipeDirection::Closing => 1.0 + travel / width,
        };
        Some(progress.clamp(0.0, 1.0))
    }

    pub fn finish(&mut self, params: &PanelParams) -> SwipeOutcome {
        let Some(state) = self.state.take() else {
            return SwipeOutcome::Cancel;
        };
        let threshold = i32::from(params.swipe_threshold);
        match state.direction {
            SwipeDirection::Opening if state.travel > 0 && state.travel > threshold => SwipeOutcome::Open,
            SwipeDirection::Closing if state.travel < 0 && -state.travel > threshold => SwipeOutcome::Close,
            _ => SwipeOutcome::Cancel,
        }
    }
}
