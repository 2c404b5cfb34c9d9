//! Build script for tearfree-firmware
//!
//! - Sets up linker search paths and arguments for memory.x
//! - Validates board.toml and compiles it to a `const DisplayConfig`
//! - Checks board.toml agrees with the `avoid-tear-effect` feature

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tearfree_core::config::{
    BufferPlacement, DisplayConfig, FrameBufferCount, FsClockPatch, Orientation, TouchCalibration,
};

/// Top level of board.toml
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BoardFile {
    display: DisplayConfig,
}

fn main() {
    setup_linker();
    let config = load_board();
    check_features(&config);
    generate_board_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, parse and validate board.toml
fn load_board() -> DisplayConfig {
    println!("cargo:rerun-if-changed=board.toml");

    let board_path = Path::new("board.toml");

    if !board_path.exists() {
        fail(
            "board.toml not found!",
            &[
                "The firmware requires a board.toml configuration file.",
                "Please create one in the tearfree-firmware directory.",
            ],
        );
    }

    let content = match fs::read_to_string(board_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read board.toml", &[&e.to_string()]),
    };

    let board: BoardFile = match toml::from_str(&content) {
        Ok(board) => board,
        Err(e) => {
            let msg = e.to_string();
            let lines: Vec<&str> = msg.lines().collect();
            fail("Invalid board.toml", &lines)
        }
    };

    if let Err(e) = board.display.validate() {
        fail(
            "Invalid display configuration in board.toml",
            &[&format!("{:?}", e)],
        );
    }

    println!("cargo:warning=board.toml validated successfully");
    board.display
}

/// The tear-avoidance strategy is a type, picked by cargo feature
fn check_features(config: &DisplayConfig) {
    println!("cargo::rustc-check-cfg=cfg(vsync_bounded)");

    let feature = env::var_os("CARGO_FEATURE_AVOID_TEAR_EFFECT").is_some();
    if feature != config.avoid_tear_effect {
        fail(
            "Feature mismatch",
            &[
                &format!(
                    "board.toml has avoid_tear_effect = {}",
                    config.avoid_tear_effect
                ),
                &format!(
                    "but the `avoid-tear-effect` feature is {}",
                    if feature { "enabled" } else { "disabled" }
                ),
            ],
        );
    }

    if config.avoid_tear_effect && config.vsync_timeout_ms.is_some() {
        println!("cargo:rustc-cfg=vsync_bounded");
    }
}

/// Write `$OUT_DIR/board_config.rs`
fn generate_board_config(config: &DisplayConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("board_config.rs")).unwrap();
    f.write_all(render_config(config).as_bytes()).unwrap();
}

fn render_config(c: &DisplayConfig) -> String {
    let orientation = match c.orientation {
        Orientation::Portrait => "Portrait",
        Orientation::PortraitInverted => "PortraitInverted",
        Orientation::Landscape => "Landscape",
        Orientation::LandscapeInverted => "LandscapeInverted",
    };
    let frame_buffers = match c.frame_buffers {
        FrameBufferCount::One => "One",
        FrameBufferCount::Two => "Two",
    };
    let placement = match c.placement {
        BufferPlacement::Internal => "Internal",
        BufferPlacement::External => "External",
    };
    let fs_patch = match c.fs_patch {
        Some(FsClockPatch {
            clock_hz,
            settle_ms,
        }) => format!(
            "Some(FsClockPatch {{ clock_hz: {}, settle_ms: {} }})",
            clock_hz, settle_ms
        ),
        None => "None".to_string(),
    };
    let vsync_timeout_ms = match c.vsync_timeout_ms {
        Some(ms) => format!("Some({})", ms),
        None => "None".to_string(),
    };
    let TouchCalibration {
        swap_xy,
        invert_x,
        invert_y,
        offset_x,
        offset_y,
    } = c.touch;

    format!(
        "// Generated by build.rs from board.toml\n\
         pub const BOARD: DisplayConfig = DisplayConfig {{\n\
         \x20   hor_res: {},\n\
         \x20   ver_res: {},\n\
         \x20   orientation: Orientation::{},\n\
         \x20   invert_color: {},\n\
         \x20   pixel_clock_hz: {},\n\
         \x20   fs_patch: {},\n\
         \x20   avoid_tear_effect: {},\n\
         \x20   frame_buffers: FrameBufferCount::{},\n\
         \x20   placement: BufferPlacement::{},\n\
         \x20   double_draw_buffer: {},\n\
         \x20   bounce_buffer: {},\n\
         \x20   vsync_timeout_ms: {},\n\
         \x20   backlight_duty: {},\n\
         \x20   touch: TouchCalibration {{\n\
         \x20       swap_xy: {},\n\
         \x20       invert_x: {},\n\
         \x20       invert_y: {},\n\
         \x20       offset_x: {},\n\
         \x20       offset_y: {},\n\
         \x20   }},\n\
         }};\n",
        c.hor_res,
        c.ver_res,
        orientation,
        c.invert_color,
        c.pixel_clock_hz,
        fs_patch,
        c.avoid_tear_effect,
        frame_buffers,
        placement,
        c.double_draw_buffer,
        c.bounce_buffer,
        vsync_timeout_ms,
        c.backlight_duty,
        swap_xy,
        invert_x,
        invert_y,
        offset_x,
        offset_y,
    )
}

/// Abort the build with a boxed error message
fn fail(title: &str, details: &[&str]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(details)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
