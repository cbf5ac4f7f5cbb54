use bevy::prelude::*;

use super::view::PinchGesture;

/// Marker component for the 2D painter camera.
#[derive(Component, Reflect)]
pub struct PainterCamera;

/// Current view transform applied to the grid.
#[derive(Resource, Clone, Copy, Debug, Reflect)]
pub struct ViewState {
    /// Zoom level, within the configured limits.
    pub zoom_level: f32,
    /// Pixel offset of the grid from its centered position.
    pub pan_offset: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom_level: 1.0,
            pan_offset: Vec2::ZERO,
        }
    }
}

/// Multi-touch and drag bookkeeping.
///
/// While `is_gesturing` is set, single-touch painting is suppressed.
#[derive(Resource, Default)]
pub struct GestureState {
    /// `true` from the moment two fingers are down until every finger is lifted.
    pub is_gesturing: bool,
    /// Active pinch; only set while exactly its two fingers are down.
    pub pinch: Option<PinchGesture>,
    /// Cursor position at the previous frame of a pan drag.
    pub drag_anchor: Option<Vec2>,
}

/// What a frame of touches means for the pinch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinchUpdate {
    /// No gesture, or a gesture waiting for a fresh two-finger pair.
    Idle,
    /// A pinch just started from the current finger pair.
    Started,
    /// The pinch moved: zoom toward `target` around `focus`.
    Zoom {
        /// Unclamped zoom implied by the finger spread.
        target: f32,
        /// Pinch center in canvas pixels.
        focus: Vec2,
    },
    /// The last finger lifted.
    Ended,
}

impl GestureState {
    /// Enters gesture mode with the given pinch.
    pub fn begin(&mut self, pinch: PinchGesture) {
        self.is_gesturing = true;
        self.pinch = Some(pinch);
    }

    /// Leaves gesture mode.
    pub fn end(&mut self) {
        self.is_gesturing = false;
        self.pinch = None;
    }

    /// Advances the gesture from this frame's `(touch id, position)` list.
    ///
    /// A pinch is bound to the two touches that started it. As soon as the
    /// finger count leaves two, or one of those touches is gone, the pinch is
    /// dropped; a later pair starts a new one from the zoom at that time.
    /// Gesture mode lasts until every finger is lifted.
    pub fn track(&mut self, touches: &[(u64, Vec2)], zoom: f32) -> PinchUpdate {
        if touches.is_empty() {
            if self.is_gesturing {
                self.end();
                return PinchUpdate::Ended;
            }
            return PinchUpdate::Idle;
        }
        if touches.len() >= 2 {
            self.is_gesturing = true;
        }
        if touches.len() != 2 {
            self.pinch = None;
            return PinchUpdate::Idle;
        }

        let position = |id: u64| touches.iter().find(|(t, _)| *t == id).map(|(_, p)| *p);
        if let Some(pinch) = self.pinch {
            let [first, second] = pinch.fingers();
            if let (Some(a), Some(b)) = (position(first), position(second)) {
                return PinchUpdate::Zoom {
                    target: pinch.target_zoom(a, b),
                    focus: PinchGesture::focus(a, b),
                };
            }
            self.pinch = None;
        }

        let [(first, a), (second, b)] = [touches[0], touches[1]];
        match PinchGesture::begin([first, second], a, b, zoom) {
            Some(pinch) => {
                self.begin(pinch);
                PinchUpdate::Started
            }
            None => PinchUpdate::Idle,
        }
    }
}
