//! Control scheme: key bindings and pointer dragging.

use iced::Point;
use iced::keyboard::{Key, Modifiers, key};
use iced::mouse;

use crate::cube::Direction;

/// Something the user asked the driver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Step the selected axis forwards (+1) or backwards (-1)
    CycleAxis(i32),
    /// Step the selected slice up (+1) or down (-1)
    CycleSlice(i32),
    /// Turn the selected slice
    Turn(Direction),
    Quit,
}

/// Maps a key press to an action. `D`/`A` cycle the axis, `W`/`S` cycle the
/// slice, `Space`/`Enter` turn (reversed while Shift is held), `Escape` quits.
pub(crate) fn action_for_key(key: &Key, modifiers: Modifiers) -> Option<Action> {
    match key.as_ref() {
        Key::Character(c) => match c.to_ascii_lowercase().as_str() {
            "d" => Some(Action::CycleAxis(1)),
            "a" => Some(Action::CycleAxis(-1)),
            "w" => Some(Action::CycleSlice(1)),
            "s" => Some(Action::CycleSlice(-1)),
            _ => None,
        },
        Key::Named(key::Named::Space | key::Named::Enter) => {
            let direction = Direction::Clockwise;
            if modifiers.shift() {
                Some(Action::Turn(direction.rev()))
            } else {
                Some(Action::Turn(direction))
            }
        }
        Key::Named(key::Named::Escape) => Some(Action::Quit),
        _ => None,
    }
}

/// Tracks the drag button so pointer motion only moves the camera while it
/// is held.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct DragState {
    pub(crate) is_pressed: bool,
    last_position: Option<Point>,
}

impl DragState {
    pub(crate) const BUTTON: mouse::Button = mouse::Button::Left;

    pub(crate) fn press(&mut self, position: Option<Point>) {
        self.is_pressed = true;
        self.last_position = position;
    }

    pub(crate) fn release(&mut self) {
        self.is_pressed = false;
        self.last_position = None;
    }

    /// Returns the pointer delta since the last motion, if dragging.
    pub(crate) fn motion(&mut self, position: Point) -> Option<(f32, f32)> {
        if !self.is_pressed {
            return None;
        }
        let delta = self
            .last_position
            .map(|last| (position.x - last.x, position.y - last.y));
        self.last_position = Some(position);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_key(c: &str) -> Key {
        Key::Character(c.into())
    }

    #[test]
    fn test_selection_keys() {
        let none = Modifiers::empty();
        assert_eq!(action_for_key(&char_key("d"), none), Some(Action::CycleAxis(1)));
        assert_eq!(action_for_key(&char_key("a"), none), Some(Action::CycleAxis(-1)));
        assert_eq!(action_for_key(&char_key("w"), none), Some(Action::CycleSlice(1)));
        assert_eq!(action_for_key(&char_key("S"), Modifiers::SHIFT), Some(Action::CycleSlice(-1)));
        assert_eq!(action_for_key(&char_key("q"), none), None);
    }

    #[test]
    fn test_shift_reverses_turn() {
        let space = Key::Named(key::Named::Space);
        let enter = Key::Named(key::Named::Enter);
        assert_eq!(
            action_for_key(&space, Modifiers::empty()),
            Some(Action::Turn(Direction::Clockwise))
        );
        assert_eq!(
            action_for_key(&enter, Modifiers::SHIFT),
            Some(Action::Turn(Direction::CounterClockwise))
        );
    }

    #[test]
    fn test_escape_quits() {
        let escape = Key::Named(key::Named::Escape);
        assert_eq!(action_for_key(&escape, Modifiers::empty()), Some(Action::Quit));
    }

    #[test]
    fn test_motion_only_while_pressed() {
        let mut drag = DragState::default();
        assert_eq!(drag.motion(Point::new(5.0, 5.0)), None);

        drag.press(Some(Point::new(10.0, 10.0)));
        assert_eq!(drag.motion(Point::new(13.0, 6.0)), Some((3.0, -4.0)));
        assert_eq!(drag.motion(Point::new(14.0, 6.0)), Some((1.0, 0.0)));

        drag.release();
        assert_eq!(drag.motion(Point::new(20.0, 20.0)), None);
    }

    #[test]
    fn test_first_motion_without_press_position_is_swallowed() {
        let mut drag = DragState::default();
        drag.press(None);
        assert_eq!(drag.motion(Point::new(1.0, 1.0)), None);
        assert_eq!(drag.motion(Point::new(2.0, 3.0)), Some((1.0, 2.0)));
    }
}
