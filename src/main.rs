// What you SEE:
// • A 400x400 canvas. O opens a photo as the background (stretched to fill).
// • F / L drop a fist / laser sprite somewhere on the canvas. Drag sprites with the left mouse.
// • Tab picks which kind the sliders drive; Up/Down resize, Left/Right rotate,
//   PageUp/PageDown shift the hue, mouse wheel nudges the size. Delete removes that kind.
// • R clears all sprites (the photo stays). P saves meme.png. ESC quits.

mod compositor;
mod config;
mod controls;
mod draw;
mod editor;
mod error;
mod export;
mod gamma;
mod hue;
mod loader;
mod overlay;
mod session;
mod sprites;
mod store;
mod types;

use clap::Parser;
use config::{CliOverrides, EditorConfig};
use controls::Controls;
use draw::{Drawer, draw_hud};
use editor::{Command, Editor};
use error::Error;
use std::path::PathBuf;
use store::OverlayStore;
use types::{FrameBuffer, SURFACE_HEIGHT, SURFACE_WIDTH};

/// Backdrop shown where the surface is transparent (no photo yet).
const BACKDROP: u32 = 0x00_2A_2A_2E;

#[derive(Parser, Debug)]
#[command(name = "meme-studio", version, about = "Put fists and lasers on a photo, save it as meme.png")]
struct Args {
    /// Photo to start with as the background
    background: Option<PathBuf>,

    /// Config file (default: ./meme.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that receives meme.png
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Share of each sprite axis that reacts to the mouse, in (0, 1]
    #[arg(long)]
    hit_fraction: Option<f32>,

    /// Seed for sprite placement (reproducible sessions)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    log::info!("Starting meme-studio v{}", env!("CARGO_PKG_VERSION"));

    let mut config = EditorConfig::discover(args.config.as_deref())?;
    config.apply_overrides(&CliOverrides { out_dir: args.out_dir, hit_fraction: args.hit_fraction })?;

    /* --- Window + editor ---
       Visual: an empty dark canvas; sprites appear as you add them. */
    let mut drawer = Drawer::new("Meme Studio", SURFACE_WIDTH as usize, SURFACE_HEIGHT as usize)?;
    let mut controls = Controls::new(&config.controls);
    let store = match args.seed {
        Some(seed) => OverlayStore::seeded(seed),
        None => OverlayStore::new(),
    };
    let mut editor = Editor::new(config, store);

    if let Some(path) = args.background {
        editor.dispatch(Command::Upload(path));
    }

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        // 1) Inputs -> commands -> one mutation + render each
        for action in drawer.actions() {
            if let Some(cmd) = controls.translate(action) {
                editor.dispatch(cmd);
            }
        }

        // 2) Finished decodes (photo upload, template files)
        editor.poll_loader();

        // 3) Surface + HUD to the window; the HUD never reaches the export
        let mut screen = FrameBuffer::from_surface(editor.surface(), BACKDROP);
        let kind = controls.active();
        let s = controls.sliders(kind);
        let top = vec![format!(
            "{} | SCALE {:.1} | ROT {:.0} | HUE {:.0} | {}{}",
            kind.name(),
            s.scale.value,
            s.rotation.value,
            s.hue.value,
            editor.session().store.len(),
            if editor.is_dragging() { " | DRAG" } else { "" },
        )];
        let bottom = match editor.status() {
            Some(status) => vec![status.to_string()],
            None if editor.is_loading() => vec!["LOADING...".to_string()],
            None if editor.session().store.is_empty() => {
                vec!["O PHOTO  F/L ADD  TAB KIND  DEL  R RESET  P SAVE".to_string()]
            }
            None => vec!["DRAG TO MOVE  ARROWS/PGUP/PGDN/WHEEL ADJUST".to_string()],
        };
        draw_hud(&mut screen, &top, &bottom);
        drawer.present(&screen)?;
    }

    log::info!("bye after {} renders", editor.render_count());
    Ok(())
}
