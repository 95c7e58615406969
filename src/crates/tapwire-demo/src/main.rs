//! tapwire command-line demonstrator.
//!
//! `listen` prints every captured event until Ctrl-C; `type` injects text
//! through the synthesis engine; `metrics` dumps the host's input
//! settings.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tapwire_core::event::EventKind;

#[derive(Parser)]
#[command(name = "tapwire", about = "Userland keyboard and mouse hooking demo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print captured keyboard and mouse events until interrupted.
    Listen {
        /// Capture keyboard events only.
        #[arg(long, conflicts_with = "mouse")]
        keyboard: bool,
        /// Capture mouse events only.
        #[arg(long)]
        mouse: bool,
        /// Swallow F12 presses instead of passing them through, to
        /// demonstrate event consumption.
        #[arg(long)]
        eat_f12: bool,
    },
    /// Inject text into the focused application.
    Type {
        /// The text to type.
        text: String,
    },
    /// Print keyboard and pointer system metrics.
    Metrics,
}

fn main() -> anyhow::Result<()> {
    // Level overridable through RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Listen {
            keyboard,
            mouse,
            eat_f12,
        } => listen(keyboard, mouse, eat_f12),
        Command::Type { text } => {
            tapwire_hook::post_text(&text).context("text injection failed")?;
            info!("typed {} characters", text.chars().count());
            Ok(())
        }
        Command::Metrics => {
            print_metrics();
            Ok(())
        }
    }
}

fn listen(keyboard: bool, mouse: bool, eat_f12: bool) -> anyhow::Result<()> {
    tapwire_hook::set_dispatch_handler(move |event| {
        match &event.kind {
            EventKind::KeyPressed(key) => {
                println!(
                    "pressed  {:?} raw=0x{:02X} mask={:04X}",
                    key.key,
                    key.rawcode,
                    event.mask.bits()
                );
                if eat_f12 && key.key == tapwire_core::VirtualKey::F12 {
                    println!("         (consumed)");
                    return true;
                }
            }
            EventKind::KeyReleased(key) => println!("released {:?}", key.key),
            EventKind::KeyTyped(key) => {
                let shown = char::from_u32(key.keychar as u32).unwrap_or('\u{FFFD}');
                println!("typed    {shown:?} (unit 0x{:04X})", key.keychar)
            }
            EventKind::MousePressed(mouse) => {
                println!(
                    "button {} down at ({}, {}) clicks={}",
                    mouse.button, mouse.x, mouse.y, mouse.clicks
                )
            }
            EventKind::MouseReleased(mouse) => println!("button {} up", mouse.button),
            EventKind::MouseClicked(mouse) => {
                println!("click x{} button {}", mouse.clicks, mouse.button)
            }
            EventKind::MouseWheel(wheel) => {
                println!("wheel {:?} rotation {}", wheel.direction, wheel.rotation)
            }
            EventKind::HookEnabled => info!("hook enabled"),
            EventKind::HookDisabled => info!("hook disabled"),
            // Moves and drags are too chatty for stdout.
            _ => {}
        }
        false
    });

    stop_on_stdin_close();

    info!("hook starting; press Enter (or close stdin) to exit");
    let result = if keyboard {
        tapwire_hook::run_keyboard()
    } else if mouse {
        tapwire_hook::run_mouse()
    } else {
        tapwire_hook::run()
    };
    result.map_err(|error| anyhow::anyhow!("hook failed with code 0x{:02X}: {error}", error.code()))
}

/// Requests a clean stop when stdin yields a line or closes.
///
/// `run` blocks the main thread, so the stop request has to come from
/// somewhere else; a parked reader thread avoids signal handling in the
/// demo.
fn stop_on_stdin_close() {
    std::thread::spawn(|| {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        let _ = tapwire_hook::stop();
    });
}

fn print_metrics() {
    let rows: [(&str, Option<i64>); 6] = [
        ("auto repeat rate", tapwire_hook::auto_repeat_rate()),
        ("auto repeat delay", tapwire_hook::auto_repeat_delay()),
        (
            "pointer acceleration multiplier",
            tapwire_hook::pointer_acceleration_multiplier(),
        ),
        (
            "pointer acceleration threshold",
            tapwire_hook::pointer_acceleration_threshold(),
        ),
        ("pointer sensitivity", tapwire_hook::pointer_sensitivity()),
        ("multi click time", tapwire_hook::multi_click_time()),
    ];
    for (name, value) in rows {
        match value {
            Some(value) => println!("{name}: {value}"),
            None => println!("{name}: unavailable"),
        }
    }

    for screen in tapwire_hook::screen_info() {
        println!(
            "screen {}: {}x{} at ({}, {})",
            screen.number, screen.width, screen.height, screen.x, screen.y
        );
    }
}
