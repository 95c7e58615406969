//! The event pump: normalization, modifier bookkeeping and synchronous
//! dispatch.
//!
//! Every capture backend funnels its decoded [`RawEvent`]s through one
//! [`EventPump`] living on the hook thread.  For each raw event the pump:
//!
//! 1. applies the modifier/button transition to the shared
//!    [`ModifierState`] *before* building the event, so the dispatched mask
//!    already reflects the event itself;
//! 2. builds the [`VirtualEvent`] and calls the handler synchronously;
//! 3. emits the mandated follow-up events in order: one `KeyTyped` per
//!    UTF-16 unit immediately after its `KeyPressed`, and a `MouseClicked`
//!    immediately after a `MouseReleased` that lands on its press
//!    coordinates;
//! 4. reclassifies motion as `MouseDragged` while any button bit is held;
//! 5. returns the accumulated consume verdict to the backend.
//!
//! The handler runs on the hook thread with the OS blocked on it; there is
//! no queue.  Slow handlers stall input delivery system-wide and can get
//! the hook evicted on Windows and macOS.

use tapwire_core::event::{
    EventKind, KeyboardData, MouseData, VirtualEvent, WheelData, MOUSE_NOBUTTON,
};
use tapwire_core::{ModifierMask, CHAR_UNDEFINED};

use crate::capture::RawEvent;
use crate::modifiers::ModifierState;

/// Synchronous event handler; returning `true` consumes the event.
pub type DispatchHandler = Box<dyn FnMut(&VirtualEvent) -> bool + Send>;

/// Control characters the OS reports as "typed" for navigation keys; these
/// never produce a `KeyTyped` event.
const NON_TYPED_CHARS: &[u16] = &[
    0x01, // Home
    0x04, // End
    0x05, // Help
    0x0B, // Page Up
    0x0C, // Page Down
    0x10, // function keys
    0x1F, // Volume Up
];

/// Default multi-click window when the OS does not report one.
pub const DEFAULT_MULTI_CLICK_MS: u64 = 500;

/// Pending click-chain bookkeeping.
#[derive(Debug, Default)]
struct ClickTracker {
    count: u16,
    button: u16,
    press_time: u64,
    press_x: i16,
    press_y: i16,
    /// Cleared by any motion between press and release.
    pending: bool,
}

impl ClickTracker {
    /// Registers a button press and returns the click count to report.
    fn press(&mut self, button: u16, x: i16, y: i16, time: u64, window_ms: u64) -> u16 {
        if self.count > 0
            && button == self.button
            && time.wrapping_sub(self.press_time) <= window_ms
        {
            self.count += 1;
        } else {
            self.count = 1;
        }
        self.button = button;
        self.press_time = time;
        self.press_x = x;
        self.press_y = y;
        self.pending = true;
        self.count
    }

    /// Whether a release at these coordinates completes a click.
    fn completes_click(&self, button: u16, x: i16, y: i16) -> bool {
        self.pending && button == self.button && x == self.press_x && y == self.press_y
    }

    fn motion(&mut self) {
        self.pending = false;
        self.count = 0;
    }
}

/// Per-session normalizer and dispatcher.
pub struct EventPump {
    handler: DispatchHandler,
    modifiers: &'static ModifierState,
    clicks: ClickTracker,
    multi_click_ms: u64,
}

impl EventPump {
    pub fn new(
        handler: DispatchHandler,
        modifiers: &'static ModifierState,
        multi_click_ms: u64,
    ) -> Self {
        EventPump {
            handler,
            modifiers,
            clicks: ClickTracker::default(),
            multi_click_ms,
        }
    }

    /// Dispatches the session-start marker.
    pub fn hook_enabled(&mut self, time: u64) {
        self.dispatch(EventKind::HookEnabled, time);
    }

    /// Dispatches the session-end marker.
    pub fn hook_disabled(&mut self, time: u64) {
        self.dispatch(EventKind::HookDisabled, time);
    }

    /// Normalizes and dispatches one raw event; returns the consume
    /// verdict.
    pub fn feed(&mut self, raw: RawEvent) -> bool {
        match raw {
            RawEvent::KeyDown {
                key,
                rawcode,
                chars,
                time,
            } => {
                if let Some(mask) = key.modifier_mask() {
                    if key.is_lock() {
                        self.modifiers.toggle(mask);
                    } else {
                        self.modifiers.set(mask);
                    }
                }

                let mut consumed = self.dispatch(
                    EventKind::KeyPressed(KeyboardData {
                        key,
                        rawcode,
                        keychar: CHAR_UNDEFINED,
                    }),
                    time,
                );

                if !suppress_typed(&chars) {
                    for unit in chars {
                        consumed |= self.dispatch(
                            EventKind::KeyTyped(KeyboardData {
                                key,
                                rawcode,
                                keychar: unit,
                            }),
                            time,
                        );
                    }
                }

                consumed
            }

            RawEvent::KeyUp { key, rawcode, time } => {
                if let Some(mask) = key.modifier_mask() {
                    if !key.is_lock() {
                        self.modifiers.unset(mask);
                    }
                }

                self.dispatch(
                    EventKind::KeyReleased(KeyboardData {
                        key,
                        rawcode,
                        keychar: CHAR_UNDEFINED,
                    }),
                    time,
                )
            }

            RawEvent::ButtonDown { button, x, y, time } => {
                self.modifiers.set(ModifierMask::button(button));
                let clicks = self.clicks.press(button, x, y, time, self.multi_click_ms);

                self.dispatch(
                    EventKind::MousePressed(MouseData {
                        button,
                        clicks,
                        x,
                        y,
                    }),
                    time,
                )
            }

            RawEvent::ButtonUp { button, x, y, time } => {
                self.modifiers.unset(ModifierMask::button(button));
                let clicks = self.clicks.count;

                let mut consumed = self.dispatch(
                    EventKind::MouseReleased(MouseData {
                        button,
                        clicks,
                        x,
                        y,
                    }),
                    time,
                );

                if self.clicks.completes_click(button, x, y) {
                    consumed |= self.dispatch(
                        EventKind::MouseClicked(MouseData {
                            button,
                            clicks,
                            x,
                            y,
                        }),
                        time,
                    );
                }

                consumed
            }

            RawEvent::Motion { x, y, time } => {
                self.clicks.motion();

                let data = MouseData {
                    button: MOUSE_NOBUTTON,
                    clicks: 0,
                    x,
                    y,
                };
                let kind = if self.modifiers.snapshot().intersects(ModifierMask::ANY_BUTTON) {
                    EventKind::MouseDragged(data)
                } else {
                    EventKind::MouseMoved(data)
                };

                self.dispatch(kind, time)
            }

            RawEvent::Wheel {
                x,
                y,
                rotation,
                delta,
                scroll,
                direction,
                time,
            } => self.dispatch(
                EventKind::MouseWheel(WheelData {
                    x,
                    y,
                    scroll,
                    rotation,
                    delta,
                    direction,
                }),
                time,
            ),
        }
    }

    fn dispatch(&mut self, kind: EventKind, time: u64) -> bool {
        let mut event = VirtualEvent::new(kind, time);
        event.mask = self.modifiers.snapshot();
        (self.handler)(&event)
    }
}

/// The typed follow-up is dropped for empty resolutions and for the OS
/// non-character block.
fn suppress_typed(chars: &[u16]) -> bool {
    match chars {
        [] => true,
        [single] => NON_TYPED_CHARS.contains(single),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_tracker_counts_within_window() {
        let mut tracker = ClickTracker::default();
        assert_eq!(tracker.press(1, 10, 10, 1000, 500), 1);
        assert_eq!(tracker.press(1, 10, 10, 1300, 500), 2);
        assert_eq!(tracker.press(1, 10, 10, 1600, 500), 3);
        // Outside the window the chain restarts.
        assert_eq!(tracker.press(1, 10, 10, 2600, 500), 1);
    }

    #[test]
    fn test_click_tracker_resets_on_button_change() {
        let mut tracker = ClickTracker::default();
        tracker.press(1, 0, 0, 100, 500);
        assert_eq!(tracker.press(2, 0, 0, 150, 500), 1);
    }

    #[test]
    fn test_click_requires_exact_coordinates() {
        let mut tracker = ClickTracker::default();
        tracker.press(1, 10, 10, 100, 500);
        assert!(tracker.completes_click(1, 10, 10));
        assert!(!tracker.completes_click(1, 11, 10));
        assert!(!tracker.completes_click(2, 10, 10));
    }

    #[test]
    fn test_motion_breaks_the_pending_click() {
        let mut tracker = ClickTracker::default();
        tracker.press(1, 10, 10, 100, 500);
        tracker.motion();
        assert!(!tracker.completes_click(1, 10, 10));
    }

    #[test]
    fn test_suppress_typed_blocks_non_characters() {
        assert!(suppress_typed(&[]));
        for &unit in NON_TYPED_CHARS {
            assert!(suppress_typed(&[unit]), "0x{unit:02X} should be suppressed");
        }
        assert!(!suppress_typed(&[0x61]));
        // Surrogate pairs are never suppressed by the single-unit block.
        assert!(!suppress_typed(&[0xD83D, 0xDE00]));
    }
}
