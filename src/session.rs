// Session state: everything one editing session mutates.
// Owned by the editor and handed to the store/compositor by reference; there are no globals.

use crate::loader::DecodeTarget;
use crate::sprites::TemplateRegistry;
use crate::store::OverlayStore;
use crate::types::{OverlayId, OverlayKind};
use image::RgbaImage;

pub struct Session {
    /// Uploaded photo; replaced wholesale, kept across `reset`.
    pub background: Option<RgbaImage>,
    pub store: OverlayStore,
    pub templates: TemplateRegistry,
}

impl Session {
    pub fn new(store: OverlayStore) -> Self {
        Self { background: None, store, templates: TemplateRegistry::new() }
    }

    /// Place the current template of `kind`.
    pub fn add_overlay(&mut self, kind: OverlayKind) -> OverlayId {
        let template = self.templates.get(kind);
        self.store.add_overlay(template, kind)
    }

    /// Remove every overlay. The background photo stays.
    pub fn reset(&mut self) {
        self.store.clear();
    }

    /// A decode finished: swap the background or the template of one kind.
    pub fn apply_decoded(&mut self, target: DecodeTarget, image: RgbaImage) {
        match target {
            DecodeTarget::Background => {
                log::info!("background {}x{}", image.width(), image.height());
                self.background = Some(image);
            }
            DecodeTarget::Template(kind) => {
                log::info!("{kind} template {}x{}", image.width(), image.height());
                let template = self.templates.set(kind, image);
                self.store.retarget(kind, &template);
            }
        }
    }
}
