//! End-to-end dispatch pipeline scenarios driven through the mock capture
//! backend.
//!
//! These tests exercise the full normalizer contract without OS hooks:
//! event ordering, modifier mask snapshots, typed-character follow-ups,
//! drag reclassification, click synthesis and consume verdicts.

use std::sync::{Arc, Mutex};

use tapwire_core::event::{EventKind, VirtualEvent, WheelDirection, WheelScroll};
use tapwire_core::{ModifierMask, VirtualKey, CHAR_UNDEFINED};
use tapwire_hook::capture::{mock::MockBackend, RawEvent};

/// Collects every dispatched event; consumes none.
fn recording_backend() -> (MockBackend, Arc<Mutex<Vec<VirtualEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let backend = MockBackend::new(move |event: &VirtualEvent| {
        sink.lock().unwrap().push(*event);
        false
    });
    (backend, events)
}

fn kinds(events: &[VirtualEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|event| match event.kind {
            EventKind::HookEnabled => "enabled",
            EventKind::HookDisabled => "disabled",
            EventKind::KeyPressed(_) => "pressed",
            EventKind::KeyReleased(_) => "released",
            EventKind::KeyTyped(_) => "typed",
            EventKind::MousePressed(_) => "mouse_pressed",
            EventKind::MouseReleased(_) => "mouse_released",
            EventKind::MouseClicked(_) => "mouse_clicked",
            EventKind::MouseMoved(_) => "mouse_moved",
            EventKind::MouseDragged(_) => "mouse_dragged",
            EventKind::MouseWheel(_) => "wheel",
            _ => "other",
        })
        .collect()
}

#[test]
fn test_key_press_emits_typed_then_release_in_order() {
    // The canonical round-trip: press A, observe pressed + typed 'a',
    // release A.
    let (mut backend, events) = recording_backend();

    backend.inject(RawEvent::KeyDown {
        key: VirtualKey::A,
        rawcode: 0x41,
        chars: vec![u16::from(b'a')],
        time: 1,
    });
    backend.inject(RawEvent::KeyUp {
        key: VirtualKey::A,
        rawcode: 0x41,
        time: 2,
    });

    let events = events.lock().unwrap();
    assert_eq!(kinds(&events), vec!["pressed", "typed", "released"]);

    let typed = events[1].keyboard().unwrap();
    assert_eq!(typed.key, VirtualKey::A);
    assert_eq!(typed.keychar, u16::from(b'a'));
    assert_eq!(typed.rawcode, 0x41);

    let pressed = events[0].keyboard().unwrap();
    assert_eq!(pressed.keychar, CHAR_UNDEFINED);
}

#[test]
fn test_shift_mask_is_set_before_dispatch_and_snapshotted() {
    // Press left shift, then A; every event must carry the post-event
    // mask, so even the shift press itself reports the shift bit.
    let (mut backend, events) = recording_backend();

    backend.inject(RawEvent::KeyDown {
        key: VirtualKey::ShiftLeft,
        rawcode: 0xA0,
        chars: vec![],
        time: 1,
    });
    backend.inject(RawEvent::KeyDown {
        key: VirtualKey::A,
        rawcode: 0x41,
        chars: vec![u16::from(b'A')],
        time: 2,
    });
    backend.inject(RawEvent::KeyUp {
        key: VirtualKey::ShiftLeft,
        rawcode: 0xA0,
        time: 3,
    });
    backend.inject(RawEvent::KeyUp {
        key: VirtualKey::A,
        rawcode: 0x41,
        time: 4,
    });

    let events = events.lock().unwrap();
    assert_eq!(
        kinds(&events),
        vec!["pressed", "pressed", "typed", "released", "released"]
    );

    // Shift press already carries its own bit.
    assert!(events[0].mask.contains(ModifierMask::SHIFT_L));
    assert!(events[0].mask.intersects(ModifierMask::SHIFT));

    // The A press and its typed event see shift held, and the typed
    // character is uppercase.
    assert!(events[1].mask.contains(ModifierMask::SHIFT_L));
    assert_eq!(events[2].keyboard().unwrap().keychar, u16::from(b'A'));

    // Shift release clears the bit on its own event already.
    assert!(!events[3].mask.intersects(ModifierMask::SHIFT));
    assert!(!events[4].mask.intersects(ModifierMask::SHIFT));
}

#[test]
fn test_drag_classification_and_click_synthesis() {
    // Press button 1, move, release elsewhere: moves become drags and the
    // moved release produces no click.  A clean press/release pair at one
    // spot produces the click.
    let (mut backend, events) = recording_backend();

    backend.inject(RawEvent::ButtonDown {
        button: 1,
        x: 10,
        y: 10,
        time: 1,
    });
    backend.inject(RawEvent::Motion {
        x: 15,
        y: 12,
        time: 2,
    });
    backend.inject(RawEvent::Motion {
        x: 20,
        y: 14,
        time: 3,
    });
    backend.inject(RawEvent::ButtonUp {
        button: 1,
        x: 20,
        y: 14,
        time: 4,
    });

    // Second gesture: no motion between press and release.
    backend.inject(RawEvent::ButtonDown {
        button: 1,
        x: 30,
        y: 30,
        time: 1000,
    });
    backend.inject(RawEvent::ButtonUp {
        button: 1,
        x: 30,
        y: 30,
        time: 1040,
    });

    let events = events.lock().unwrap();
    assert_eq!(
        kinds(&events),
        vec![
            "mouse_pressed",
            "mouse_dragged",
            "mouse_dragged",
            "mouse_released",
            "mouse_pressed",
            "mouse_released",
            "mouse_clicked",
        ]
    );

    // While the button is held the mask carries its bit; never a plain
    // move.
    assert!(events[1].mask.contains(ModifierMask::BUTTON1));
    assert!(events[2].mask.contains(ModifierMask::BUTTON1));
    // The release event reports the bit already cleared.
    assert!(!events[3].mask.intersects(ModifierMask::ANY_BUTTON));

    let clicked = events[6].mouse().unwrap();
    assert_eq!(clicked.button, 1);
    assert_eq!((clicked.x, clicked.y), (30, 30));
}

#[test]
fn test_motion_without_buttons_stays_a_move() {
    let (mut backend, events) = recording_backend();

    backend.inject(RawEvent::Motion { x: 5, y: 5, time: 1 });

    let events = events.lock().unwrap();
    assert_eq!(kinds(&events), vec!["mouse_moved"]);
    assert!(!events[0].mask.intersects(ModifierMask::ANY_BUTTON));
}

#[test]
fn test_multi_click_counting_is_monotonic_within_the_window() {
    let (mut backend, events) = recording_backend();

    for (press_time, release_time) in [(0u64, 30u64), (100, 130), (200, 230)] {
        backend.inject(RawEvent::ButtonDown {
            button: 1,
            x: 50,
            y: 50,
            time: press_time,
        });
        backend.inject(RawEvent::ButtonUp {
            button: 1,
            x: 50,
            y: 50,
            time: release_time,
        });
    }

    let events = events.lock().unwrap();
    let clicks: Vec<u16> = events
        .iter()
        .filter_map(|event| match event.kind {
            EventKind::MouseClicked(data) => Some(data.clicks),
            _ => None,
        })
        .collect();
    assert_eq!(clicks, vec![1, 2, 3]);

    // Press events report the same count as the click they complete.
    let presses: Vec<u16> = events
        .iter()
        .filter_map(|event| match event.kind {
            EventKind::MousePressed(data) => Some(data.clicks),
            _ => None,
        })
        .collect();
    assert_eq!(presses, vec![1, 2, 3]);
}

#[test]
fn test_click_chain_restarts_after_the_window() {
    let (mut backend, events) = recording_backend();

    backend.inject(RawEvent::ButtonDown {
        button: 1,
        x: 0,
        y: 0,
        time: 0,
    });
    backend.inject(RawEvent::ButtonUp {
        button: 1,
        x: 0,
        y: 0,
        time: 10,
    });
    // Well past the default 500 ms window.
    backend.inject(RawEvent::ButtonDown {
        button: 1,
        x: 0,
        y: 0,
        time: 5_000,
    });

    let events = events.lock().unwrap();
    let presses: Vec<u16> = events
        .iter()
        .filter_map(|event| match event.kind {
            EventKind::MousePressed(data) => Some(data.clicks),
            _ => None,
        })
        .collect();
    assert_eq!(presses, vec![1, 1]);
}

#[test]
fn test_surrogate_pair_emits_two_typed_events_in_order() {
    // U+1F600 arrives as the two UTF-16 units D83D DE00.
    let (mut backend, events) = recording_backend();

    backend.inject(RawEvent::KeyDown {
        key: VirtualKey::Undefined,
        rawcode: 0,
        chars: vec![0xD83D, 0xDE00],
        time: 1,
    });

    let events = events.lock().unwrap();
    assert_eq!(kinds(&events), vec!["pressed", "typed", "typed"]);
    assert_eq!(events[1].keyboard().unwrap().keychar, 0xD83D);
    assert_eq!(events[2].keyboard().unwrap().keychar, 0xDE00);
}

#[test]
fn test_non_character_resolutions_do_not_type() {
    let (mut backend, events) = recording_backend();

    // Page Up resolves to the control code 0x0B on some platforms.
    backend.inject(RawEvent::KeyDown {
        key: VirtualKey::PageUp,
        rawcode: 0x21,
        chars: vec![0x0B],
        time: 1,
    });
    // Empty resolutions (modifier keys et al) do not type either.
    backend.inject(RawEvent::KeyDown {
        key: VirtualKey::F5,
        rawcode: 0x74,
        chars: vec![],
        time: 2,
    });

    let events = events.lock().unwrap();
    assert_eq!(kinds(&events), vec!["pressed", "pressed"]);
}

#[test]
fn test_undefined_keys_are_still_dispatched() {
    let (mut backend, events) = recording_backend();

    backend.inject(RawEvent::KeyDown {
        key: VirtualKey::Undefined,
        rawcode: 0xE7,
        chars: vec![],
        time: 1,
    });

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    let pressed = events[0].keyboard().unwrap();
    assert_eq!(pressed.key, VirtualKey::Undefined);
    assert_eq!(pressed.rawcode, 0xE7, "rawcode must survive for unknown keys");
}

#[test]
fn test_lock_keys_toggle_on_press_only() {
    let (mut backend, events) = recording_backend();

    for time in [1u64, 2, 3, 4] {
        backend.inject(RawEvent::KeyDown {
            key: VirtualKey::CapsLock,
            rawcode: 0x14,
            chars: vec![],
            time,
        });
        backend.inject(RawEvent::KeyUp {
            key: VirtualKey::CapsLock,
            rawcode: 0x14,
            time: time + 10,
        });
    }

    let events = events.lock().unwrap();
    let caps: Vec<bool> = events
        .iter()
        .map(|event| event.mask.contains(ModifierMask::CAPS_LOCK))
        .collect();
    // press/release pairs: on after the first press and its release, off
    // after the second press, and so on.
    assert_eq!(caps, vec![true, true, false, false, true, true, false, false]);
}

#[test]
fn test_wheel_payload_passes_through() {
    let (mut backend, events) = recording_backend();

    backend.inject(RawEvent::Wheel {
        x: 100,
        y: 200,
        rotation: -2,
        delta: 120,
        scroll: WheelScroll::Unit,
        direction: WheelDirection::Vertical,
        time: 9,
    });

    let events = events.lock().unwrap();
    match events[0].kind {
        EventKind::MouseWheel(wheel) => {
            assert_eq!(wheel.rotation, -2);
            assert_eq!(wheel.delta, 120);
            assert_eq!(wheel.direction, WheelDirection::Vertical);
            assert_eq!((wheel.x, wheel.y), (100, 200));
        }
        other => panic!("expected a wheel event, got {other:?}"),
    }
}

#[test]
fn test_consume_verdict_covers_the_typed_follow_up() {
    // A handler that consumes only typed events must still cause the
    // backend-level verdict for the whole key press to be "consumed".
    let mut backend = MockBackend::new(|event: &VirtualEvent| {
        matches!(event.kind, EventKind::KeyTyped(_))
    });

    let with_text = backend.inject(RawEvent::KeyDown {
        key: VirtualKey::A,
        rawcode: 0x41,
        chars: vec![u16::from(b'a')],
        time: 1,
    });
    let without_text = backend.inject(RawEvent::KeyDown {
        key: VirtualKey::F5,
        rawcode: 0x74,
        chars: vec![],
        time: 2,
    });

    assert!(with_text);
    assert!(!without_text);
}

#[test]
fn test_hook_lifecycle_markers_bracket_the_session() {
    let (mut backend, events) = recording_backend();

    backend.enable();
    backend.inject(RawEvent::Motion { x: 1, y: 1, time: 1 });
    backend.disable(2);

    let events = events.lock().unwrap();
    assert_eq!(kinds(&events), vec!["enabled", "mouse_moved", "disabled"]);
}
