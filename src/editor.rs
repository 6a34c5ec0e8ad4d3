// Editor controller.
// Every input collaborator (buttons, sliders, pointer, file picker) becomes a
// `Command`. One command is one mutation of the session followed by at most
// one render. Failures stop at `Editor::dispatch`: they are logged, shown in
// the status line, and the session is left as it was.

use crate::compositor::Compositor;
use crate::config::EditorConfig;
use crate::error::Error;
use crate::export;
use crate::loader::{DecodeTarget, Loader};
use crate::session::Session;
use crate::store::OverlayStore;
use crate::types::{OverlayId, OverlayKind, SURFACE_HEIGHT, SURFACE_WIDTH, Vec2};
use image::RgbaImage;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddOverlay(OverlayKind),
    SetScale(OverlayKind, f32),
    /// Relative resize (mouse wheel).
    ScaleBy(OverlayKind, f32),
    SetRotation(OverlayKind, f32),
    SetHue(OverlayKind, f32),
    DeleteKind(OverlayKind),
    Reset,
    Export,
    Upload(PathBuf),
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp,
}

/// Overlay currently held by the pointer.
#[derive(Debug, Clone, Copy)]
struct Drag {
    id: OverlayId,
    /// Pointer position minus the overlay's top-left at grab time.
    offset: Vec2,
}

pub struct Editor {
    session: Session,
    compositor: Compositor,
    surface: RgbaImage,
    loader: Loader,
    config: EditorConfig,
    drag: Option<Drag>,
    status: Option<String>,
    renders: u64,
}

impl Editor {
    /// Fresh session; configured template files start decoding right away.
    pub fn new(config: EditorConfig, store: OverlayStore) -> Self {
        let mut editor = Self {
            session: Session::new(store),
            compositor: Compositor::new(),
            surface: RgbaImage::new(SURFACE_WIDTH, SURFACE_HEIGHT),
            loader: Loader::new(),
            config,
            drag: None,
            status: None,
            renders: 0,
        };

        for kind in OverlayKind::ALL {
            let Some(path) = editor.config.templates.path(kind).map(PathBuf::from) else {
                continue;
            };
            if let Err(e) = editor.loader.submit_path(DecodeTarget::Template(kind), &path) {
                editor.report(&e);
            }
        }

        editor.render();
        editor
    }

    /// Run a command, catching any failure here.
    pub fn dispatch(&mut self, cmd: Command) {
        if let Err(e) = self.apply(cmd) {
            self.report(&e);
        }
    }

    /// Run a command and hand back its error, if any.
    pub fn apply(&mut self, cmd: Command) -> Result<(), Error> {
        match cmd {
            Command::AddOverlay(kind) => {
                self.session.add_overlay(kind);
                self.render();
            }
            Command::SetScale(kind, scale) => {
                self.session.store.set_scale(kind, scale)?;
                self.render();
            }
            Command::ScaleBy(kind, factor) => {
                self.session.store.scale_by(kind, factor)?;
                self.render();
            }
            Command::SetRotation(kind, degrees) => {
                self.session.store.set_rotation(kind, degrees)?;
                self.render();
            }
            Command::SetHue(kind, degrees) => {
                self.session.store.set_hue(kind, degrees)?;
                self.render();
            }
            Command::DeleteKind(kind) => {
                let removed = self.session.store.delete_by_kind(kind);
                log::debug!("deleted {removed} {kind} overlay(s)");
                if self.drag.is_some_and(|d| self.session.store.get(d.id).is_none()) {
                    self.drag = None;
                }
                self.render();
            }
            Command::Reset => {
                self.session.reset();
                self.drag = None;
                self.status = None;
                self.render();
            }
            Command::Export => {
                let path = export::save(&self.surface, &self.config.export.dir)?;
                self.status = Some(format!("SAVED {}", path.display()));
            }
            Command::Upload(path) => {
                self.loader.submit_path(DecodeTarget::Background, &path)?;
                self.status = Some("LOADING...".into());
            }
            Command::PointerDown(p) => {
                self.drag = self
                    .session
                    .store
                    .hit_test(p, self.config.hit.fraction)
                    .and_then(|id| self.session.store.get(id))
                    .map(|o| Drag { id: o.id, offset: Vec2::new(p.x - o.x, p.y - o.y) });
            }
            Command::PointerMove(p) => {
                if let Some(drag) = self.drag {
                    let (x, y) = (p.x - drag.offset.x, p.y - drag.offset.y);
                    if self.session.store.move_to(drag.id, x, y) {
                        self.render();
                    } else {
                        self.drag = None;
                    }
                }
            }
            Command::PointerUp => {
                self.drag = None;
            }
        }
        Ok(())
    }

    /// Apply finished decodes: one state change and one render each.
    /// Returns true if anything changed on screen.
    pub fn poll_loader(&mut self) -> bool {
        let mut changed = false;
        for done in self.loader.poll() {
            match done.result {
                Ok(image) => {
                    log::debug!("applying decode {:?} for {:?}", done.generation, done.target);
                    self.session.apply_decoded(done.target, image);
                    if done.target == DecodeTarget::Background {
                        self.status = None;
                    }
                    self.render();
                    changed = true;
                }
                Err(e) => self.report(&e),
            }
        }
        changed
    }

    fn render(&mut self) {
        self.compositor
            .render(&mut self.surface, self.session.background.as_ref(), &self.session.store);
        self.renders += 1;
    }

    fn report(&mut self, e: &Error) {
        match e {
            Error::InvalidParameter(_) => log::warn!("{e}"),
            _ => log::error!("{e}"),
        }
        self.status = Some(e.label().to_string());
    }

    /// Surface as of the last render.
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_pending()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }
}
