//! Criterion benchmarks for the key code translation tables.
//!
//! Translation sits on the hook's hot path: every captured key event runs
//! one native→virtual lookup before dispatch, and every synthesized key
//! event runs the reverse direction.  During rapid typing or pointer
//! drags this happens thousands of times per second on the thread that
//! the OS is blocking on, so the pair tables must stay in the
//! sub-microsecond range.
//!
//! Both directions are linear scans over the pair tables (the tables are
//! multi-valued on the native side, so a dense index would not preserve
//! alias ordering).  The benchmarks cover best-case rows near the top of
//! the table and worst-case misses that scan the whole table.
//!
//! ```bash
//! cargo bench --package tapwire-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tapwire_core::keymap::{linux_xkb::XkbKeymap, KeyMapper, VirtualKey};

/// A realistic spread of keys: letters, digits, function keys, modifiers,
/// cursor keys and the sentinel.
const BENCH_KEYS: &[VirtualKey] = &[
    VirtualKey::A,
    VirtualKey::Z,
    VirtualKey::Enter,
    VirtualKey::Escape,
    VirtualKey::Backspace,
    VirtualKey::Tab,
    VirtualKey::Space,
    VirtualKey::F1,
    VirtualKey::F12,
    VirtualKey::ControlLeft,
    VirtualKey::ShiftLeft,
    VirtualKey::AltLeft,
    VirtualKey::MetaLeft,
    VirtualKey::Left,
    VirtualKey::Right,
    VirtualKey::Up,
    VirtualKey::Down,
    VirtualKey::Digit1,
    VirtualKey::Digit0,
    VirtualKey::Undefined,
];

/// VK codes matching [`BENCH_KEYS`], plus an unmapped code for the miss
/// path.
const BENCH_VK_CODES: &[u16] = &[
    0x41, // 'A'
    0x5A, // 'Z'
    0x0D, // VK_RETURN
    0x1B, // VK_ESCAPE
    0x08, // VK_BACK
    0x09, // VK_TAB
    0x20, // VK_SPACE
    0x70, // VK_F1
    0x7B, // VK_F12
    0x11, // VK_CONTROL
    0x10, // VK_SHIFT
    0x12, // VK_MENU
    0x25, // VK_LEFT
    0x27, // VK_RIGHT
    0x26, // VK_UP
    0x28, // VK_DOWN
    0x31, // '1'
    0x30, // '0'
    0x07, // unassigned, exercises the full-scan miss
];

fn bench_windows_vk(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_windows_vk");

    group.bench_function("vk_to_key_single", |b| {
        b.iter(|| KeyMapper::windows_vk_to_key(black_box(0x41), black_box(false)))
    });

    group.bench_function("vk_to_key_batch_19", |b| {
        b.iter(|| {
            BENCH_VK_CODES
                .iter()
                .map(|&vk| KeyMapper::windows_vk_to_key(black_box(vk), false))
                .collect::<Vec<_>>()
        })
    });

    // Reverse direction: best case near the table head vs. a key with no
    // Windows mapping, which scans the whole table.
    group.bench_with_input(
        BenchmarkId::new("key_to_vk", "Enter"),
        &VirtualKey::Enter,
        |b, &key| b.iter(|| KeyMapper::key_to_windows_vk(black_box(key))),
    );
    group.bench_with_input(
        BenchmarkId::new("key_to_vk", "Rfkill_miss"),
        &VirtualKey::Rfkill,
        |b, &key| b.iter(|| KeyMapper::key_to_windows_vk(black_box(key))),
    );

    group.finish();
}

fn bench_macos_kvk(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_macos_kvk");

    group.bench_function("kvk_to_key_single", |b| {
        b.iter(|| KeyMapper::macos_kvk_to_key(black_box(0x00)))
    });

    group.bench_function("key_to_kvk_batch_20", |b| {
        b.iter(|| {
            BENCH_KEYS
                .iter()
                .map(|&key| KeyMapper::key_to_macos_kvk(black_box(key)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

fn bench_linux_xkb(c: &mut Criterion) {
    // Resolution happens once per hook session; lookups happen per event.
    // Bind a plausible pc105 subset so lookups hit real rows.
    let keymap = XkbKeymap::resolve([
        (9u8, *b"ESC\0"),
        (24, *b"AD01"),
        (36, *b"RTRN"),
        (38, *b"AC01"),
        (50, *b"LFSH"),
        (62, *b"RTSH"),
        (64, *b"LALT"),
        (65, *b"SPCE"),
        (98, *b"UP\0\0"),
        (105, *b"RCTL"),
        (108, *b"KPEN"),
        (133, *b"LWIN"),
    ]);

    let mut group = c.benchmark_group("keymap_linux_xkb");

    group.bench_function("keycode_to_key_single", |b| {
        b.iter(|| keymap.keycode_to_key(black_box(38)))
    });

    group.bench_function("key_to_keycode_single", |b| {
        b.iter(|| keymap.key_to_keycode(black_box(VirtualKey::Enter)))
    });

    group.bench_function("resolve_session_setup", |b| {
        b.iter(|| {
            XkbKeymap::resolve(black_box([
                (9u8, *b"ESC\0"),
                (36, *b"RTRN"),
                (38, *b"AC01"),
                (65, *b"SPCE"),
            ]))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_windows_vk, bench_macos_kvk, bench_linux_xkb);
criterion_main!(benches);
