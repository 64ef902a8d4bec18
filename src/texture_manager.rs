use egui::{Context, TextureHandle, TextureId, TextureOptions};

use crate::engine::Engine;

/// Keeps the canvas composite uploaded as a texture, re-uploading only when
/// the engine's pixels have changed since the last frame.
#[derive(Default)]
pub struct TextureManager {
    handle: Option<TextureHandle>,
    /// Engine revision the current texture was built from
    revision: Option<u64>,
    uploads: u64,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the texture showing `engine`'s display composite
    pub fn texture_for(&mut self, ctx: &Context, engine: &Engine) -> TextureId {
        let revision = engine.revision();
        if self.handle.is_none() || self.revision != Some(revision) {
            let image = engine.composite_for_display().to_color_image();
            match &mut self.handle {
                Some(handle) => handle.set(image, TextureOptions::LINEAR),
                None => self.handle = Some(ctx.load_texture("canvas", image, TextureOptions::LINEAR)),
            }
            self.revision = Some(revision);
            self.uploads += 1;
            log::trace!("Uploaded canvas texture for revision {}", revision);
        }

        match &self.handle {
            Some(handle) => handle.id(),
            None => TextureId::default(),
        }
    }

    /// Forces the next call to re-upload
    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::tools::Color;

    #[test]
    fn test_upload_only_when_revision_changes() {
        let ctx = Context::default();
        let mut engine = Engine::new(8, 8, EngineConfig::default()).unwrap();
        let mut textures = TextureManager::new();

        let first = textures.texture_for(&ctx, &engine);
        let again = textures.texture_for(&ctx, &engine);
        assert_eq!(first, again);
        assert_eq!(textures.uploads(), 1);

        engine.fill_at(egui::pos2(1.0, 1.0), Color::BLACK);
        let updated = textures.texture_for(&ctx, &engine);
        assert_eq!(updated, first);
        assert_eq!(textures.uploads(), 2);

        textures.invalidate();
        textures.texture_for(&ctx, &engine);
        assert_eq!(textures.uploads(), 3);
    }
}
