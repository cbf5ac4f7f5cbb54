//! Sub-hex buttons: the center disc and the two hexagonal side tabs.
//!
//! Drawing and hit-testing both derive from [`hex_button_dimensions`], so what
//! the user sees and what a click hits cannot drift apart.

use bevy::prelude::*;

/// One of the three interactive zones of a hovered hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum HexButton {
    /// Circle at the hex center.
    Center,
    /// Hexagonal tab left of center.
    Left,
    /// Hexagonal tab right of center.
    Right,
}

impl HexButton {
    /// Every button, in hit-test priority order.
    pub const ALL: [HexButton; 3] = [HexButton::Center, HexButton::Left, HexButton::Right];
}

/// Sizes of the three buttons for a hex of a given radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexButtonDimensions {
    /// Diameter of the center circle.
    pub center_diameter: f32,
    /// Horizontal distance from hex center to each side tab's center.
    pub side_offset: f32,
    /// Width of a side tab.
    pub side_width: f32,
    /// Height of a side tab.
    pub side_height: f32,
}

/// Button sizes as fractions of `radius`.
pub fn hex_button_dimensions(radius: f32) -> HexButtonDimensions {
    HexButtonDimensions {
        center_diameter: radius * 0.6,
        side_offset: radius * 0.65,
        side_width: radius * 0.5,
        side_height: radius * 0.8,
    }
}

impl HexButtonDimensions {
    /// Center of `button` for a hex centered at `hex_center`.
    pub fn button_center(&self, button: HexButton, hex_center: Vec2) -> Vec2 {
        match button {
            HexButton::Center => hex_center,
            HexButton::Left => hex_center - Vec2::X * self.side_offset,
            HexButton::Right => hex_center + Vec2::X * self.side_offset,
        }
    }

    /// Outline of a side tab: a flat-top hexagon clipped to the tab's box.
    ///
    /// Points go clockwise from the top-left shoulder, matching the
    /// `25% 0, 75% 0, 100% 50%, 75% 100%, 25% 100%, 0 50%` clip shape.
    pub fn side_outline(&self, button: HexButton, hex_center: Vec2) -> [Vec2; 6] {
        let c = self.button_center(button, hex_center);
        let hw = self.side_width / 2.0;
        let hh = self.side_height / 2.0;
        [
            c + Vec2::new(-hw / 2.0, -hh),
            c + Vec2::new(hw / 2.0, -hh),
            c + Vec2::new(hw, 0.0),
            c + Vec2::new(hw / 2.0, hh),
            c + Vec2::new(-hw / 2.0, hh),
            c + Vec2::new(-hw, 0.0),
        ]
    }
}

/// Whether `(x, y)` falls inside `button` of the hex centered at `(hex_x, hex_y)`.
///
/// The center button is an exact circle test. Side tabs are tested against
/// a linear interpolation of the clip-path slope: the allowed horizontal reach
/// shrinks linearly from the full half-width at mid-height to half of it at
/// the top and bottom. This is a deliberate approximation kept consistent
/// with the drawn outline, not a general point-in-polygon routine.
pub fn is_point_in_hex_button(
    x: f32,
    y: f32,
    button: HexButton,
    hex_x: f32,
    hex_y: f32,
    radius: f32,
) -> bool {
    let dims = hex_button_dimensions(radius);
    let point = Vec2::new(x, y);
    let center = dims.button_center(button, Vec2::new(hex_x, hex_y));

    match button {
        HexButton::Center => point.distance(center) <= dims.center_diameter / 2.0,
        HexButton::Left | HexButton::Right => {
            let half_w = dims.side_width / 2.0;
            let half_h = dims.side_height / 2.0;
            let d = (point - center).abs();
            if d.y > half_h {
                return false;
            }
            let reach = half_w - (half_w / 2.0) * (d.y / half_h);
            d.x <= reach
        }
    }
}

/// The button under `point` for a hex at `hex_center`, if any.
pub fn hex_button_at(point: Vec2, hex_center: Vec2, radius: f32) -> Option<HexButton> {
    HexButton::ALL.into_iter().find(|&button| {
        is_point_in_hex_button(point.x, point.y, button, hex_center.x, hex_center.y, radius)
    })
}
