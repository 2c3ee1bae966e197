//! Mouse frame replay.
//!
//! Move frames are applied relative to wherever the local pointer currently
//! is, scaled by the configured speed. Buttons frames carry the full mask;
//! the replay tracks which button it is holding and injects transitions only
//! on change, so scroll-while-dragging does not chatter the button. The
//! horizontal scroll sense is inverted between the wire and the injector.

use std::sync::Arc;

use tracing::warn;

use hidswitch_core::MouseFrame;

use crate::infrastructure::injection::{InputInjector, MouseButton};

/// Frame decoder's counterpart on the injection side, for one mouse link.
pub struct MouseReplay {
    injector: Arc<dyn InputInjector>,
    mouse_speed: f64,
    held: Option<MouseButton>,
}

impl MouseReplay {
    pub fn new(injector: Arc<dyn InputInjector>, mouse_speed: f64) -> Self {
        Self {
            injector,
            mouse_speed,
            held: None,
        }
    }

    pub fn handle_frame(&mut self, frame: MouseFrame) {
        match frame {
            MouseFrame::Move { dx, dy } => self.apply_move(dx, dy),
            MouseFrame::Buttons { button, y_scroll, x_scroll } => {
                self.apply_buttons(button);
                if y_scroll != 0 || x_scroll != 0 {
                    if let Err(error) =
                        self.injector.scroll(-i32::from(x_scroll), i32::from(y_scroll))
                    {
                        warn!(%error, "scroll failed");
                    }
                }
            }
        }
    }

    /// Releases a held button, as when the hub connection drops.
    pub fn release_held(&mut self) {
        if let Some(button) = self.held.take() {
            if let Err(error) = self.injector.mouse_toggle(button, false) {
                warn!(%error, "button release failed");
            }
        }
    }

    fn apply_move(&mut self, dx: i8, dy: i8) {
        let (x, y) = match self.injector.mouse_position() {
            Ok(position) => position,
            Err(error) => {
                warn!(%error, "pointer position lookup failed");
                return;
            }
        };
        let dx = self.scale(dx);
        let dy = self.scale(dy);
        if let Err(error) = self.injector.mouse_move(x + dx, y + dy) {
            warn!(%error, "pointer move failed");
        }
    }

    fn apply_buttons(&mut self, mask: u8) {
        let next = MouseButton::from_mask(mask);
        if next == self.held {
            return;
        }
        if let Some(previous) = self.held {
            if let Err(error) = self.injector.mouse_toggle(previous, false) {
                warn!(%error, "button release failed");
            }
        }
        if let Some(button) = next {
            if let Err(error) = self.injector.mouse_toggle(button, true) {
                warn!(%error, "button press failed");
            }
        }
        self.held = next;
    }

    fn scale(&self, delta: i8) -> i32 {
        (f64::from(delta) * self.mouse_speed).round() as i32
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::injection::InjectionError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingInjector {
        position: Mutex<(i32, i32)>,
        moves: Mutex<Vec<(i32, i32)>>,
        toggles: Mutex<Vec<(MouseButton, bool)>>,
        scrolls: Mutex<Vec<(i32, i32)>>,
    }

    impl InputInjector for RecordingInjector {
        fn key_toggle(&self, _key: &str, _down: bool) -> Result<(), InjectionError> {
            Ok(())
        }

        fn mouse_position(&self) -> Result<(i32, i32), InjectionError> {
            Ok(*self.position.lock().unwrap())
        }

        fn mouse_move(&self, x: i32, y: i32) -> Result<(), InjectionError> {
            *self.position.lock().unwrap() = (x, y);
            self.moves.lock().unwrap().push((x, y));
            Ok(())
        }

        fn mouse_toggle(&self, button: MouseButton, down: bool) -> Result<(), InjectionError> {
            self.toggles.lock().unwrap().push((button, down));
            Ok(())
        }

        fn scroll(&self, dx: i32, dy: i32) -> Result<(), InjectionError> {
            self.scrolls.lock().unwrap().push((dx, dy));
            Ok(())
        }
    }

    fn replay() -> (MouseReplay, Arc<RecordingInjector>) {
        let injector = Arc::new(RecordingInjector::default());
        (MouseReplay::new(injector.clone(), 1.0), injector)
    }

    #[test]
    fn test_moves_are_relative_to_the_current_pointer() {
        let (mut replay, injector) = replay();
        *injector.position.lock().unwrap() = (100, 50);

        replay.handle_frame(MouseFrame::Move { dx: 5, dy: -3 });
        replay.handle_frame(MouseFrame::Move { dx: -10, dy: 0 });

        assert_eq!(*injector.moves.lock().unwrap(), vec![(105, 47), (95, 47)]);
    }

    #[test]
    fn test_mouse_speed_scales_deltas() {
        let injector = Arc::new(RecordingInjector::default());
        let mut replay = MouseReplay::new(injector.clone(), 1.5);

        replay.handle_frame(MouseFrame::Move { dx: 10, dy: -3 });

        // -3 * 1.5 rounds away from zero.
        assert_eq!(*injector.moves.lock().unwrap(), vec![(15, -5)]);
    }

    #[test]
    fn test_button_transitions_inject_once() {
        let (mut replay, injector) = replay();

        replay.handle_frame(MouseFrame::Buttons { button: 1, y_scroll: 0, x_scroll: 0 });
        replay.handle_frame(MouseFrame::Buttons { button: 1, y_scroll: 1, x_scroll: 0 });
        replay.handle_frame(MouseFrame::Buttons { button: 0, y_scroll: 0, x_scroll: 0 });

        assert_eq!(
            *injector.toggles.lock().unwrap(),
            vec![(MouseButton::Left, true), (MouseButton::Left, false)]
        );
    }

    #[test]
    fn test_switching_buttons_releases_the_previous_one() {
        let (mut replay, injector) = replay();

        replay.handle_frame(MouseFrame::Buttons { button: 1, y_scroll: 0, x_scroll: 0 });
        replay.handle_frame(MouseFrame::Buttons { button: 2, y_scroll: 0, x_scroll: 0 });

        assert_eq!(
            *injector.toggles.lock().unwrap(),
            vec![
                (MouseButton::Left, true),
                (MouseButton::Left, false),
                (MouseButton::Right, true),
            ]
        );
    }

    #[test]
    fn test_horizontal_scroll_sense_is_inverted() {
        let (mut replay, injector) = replay();

        replay.handle_frame(MouseFrame::Buttons { button: 0, y_scroll: 2, x_scroll: 3 });

        assert_eq!(*injector.scrolls.lock().unwrap(), vec![(-3, 2)]);
    }

    #[test]
    fn test_release_held_lets_go_of_a_dragged_button() {
        let (mut replay, injector) = replay();
        replay.handle_frame(MouseFrame::Buttons { button: 4, y_scroll: 0, x_scroll: 0 });

        replay.release_held();
        replay.release_held();

        assert_eq!(
            *injector.toggles.lock().unwrap(),
            vec![(MouseButton::Middle, true), (MouseButton::Middle, false)]
        );
    }
}
