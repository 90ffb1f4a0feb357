use std::collections::BTreeMap;

use crate::engine::handle::{EngineHandle, TextureSource, TextureUpload, UploadKind};
use crate::foundation::core::ExecutionMode;
use crate::foundation::error::{BridgeError, BridgeResult};
use crate::host::HostImage;

/// Turn a host image name into a valid shader identifier.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`, and a leading digit gets a `_` prefix.
pub fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// A texture or cubemap the engine already holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureCacheEntry {
    /// Sanitized engine-side name.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel.
    pub channels: u32,
    /// How the pixels reached the engine.
    pub upload: UploadKind,
}

impl TextureCacheEntry {
    fn for_image(name: String, image: &HostImage, upload: UploadKind) -> Self {
        Self {
            name,
            width: image.width,
            height: image.height,
            channels: image.channels,
            upload,
        }
    }
}

/// Upload-once cache of textures and cubemaps, keyed by sanitized name.
///
/// Entries are never refreshed when pixel content changes; only [`ResourceCache::clear`]
/// (on engine reset) forgets them.
#[derive(Clone, Debug, Default)]
pub struct ResourceCache {
    textures: BTreeMap<String, TextureCacheEntry>,
    cubemaps: BTreeMap<String, TextureCacheEntry>,
    force_pixel_buffer: bool,
}

impl ResourceCache {
    /// Empty cache using GPU handles where possible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always copy pixels, even in preview mode.
    pub fn with_pixel_upload(mut self, force: bool) -> Self {
        self.force_pixel_buffer = force;
        self
    }

    /// Cached texture by sanitized name.
    pub fn texture(&self, name: &str) -> Option<&TextureCacheEntry> {
        self.textures.get(name)
    }

    /// Cached cubemap by sanitized name.
    pub fn cubemap(&self, name: &str) -> Option<&TextureCacheEntry> {
        self.cubemaps.get(name)
    }

    /// Number of cached textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.cubemaps.clear();
    }

    /// Make sure `image` is loaded as a texture. Returns `true` when an upload was issued.
    pub fn ensure_texture(
        &mut self,
        engine: &mut dyn EngineHandle,
        image: &HostImage,
        mode: ExecutionMode,
    ) -> BridgeResult<bool> {
        let name = sanitize_name(&image.name);
        if self.textures.contains_key(&name) {
            return Ok(false);
        }

        let source = match (mode, image.gpu_handle) {
            (ExecutionMode::Preview, Some(handle)) if !self.force_pixel_buffer => {
                TextureSource::GpuHandle(handle)
            }
            _ => TextureSource::Pixels(checked_pixels(image)?),
        };

        if engine.have_texture(&name) {
            tracing::debug!(name = %name, "texture already present in engine");
            let entry = TextureCacheEntry::for_image(name.clone(), image, source.kind());
            self.textures.insert(name, entry);
            return Ok(false);
        }

        engine.add_texture(&TextureUpload {
            name: &name,
            width: image.width,
            height: image.height,
            channels: image.channels,
            source,
        })?;
        tracing::debug!(name = %name, upload = ?source.kind(), "texture uploaded");
        let entry = TextureCacheEntry::for_image(name.clone(), image, source.kind());
        self.textures.insert(name, entry);
        Ok(true)
    }

    /// Make sure `image` is loaded as the environment cubemap. Returns `true` on upload.
    pub fn ensure_cubemap(
        &mut self,
        engine: &mut dyn EngineHandle,
        image: &HostImage,
    ) -> BridgeResult<bool> {
        let name = sanitize_name(&image.name);
        if self.cubemaps.contains_key(&name) {
            return Ok(false);
        }
        let entry = TextureCacheEntry::for_image(name.clone(), image, UploadKind::PixelBuffer);
        if engine.have_cubemap(&name) {
            self.cubemaps.insert(name, entry);
            return Ok(false);
        }

        let pixels = checked_pixels(image)?;
        engine.add_cubemap(&name, image.width, image.height, image.channels, pixels)?;
        tracing::debug!(name = %name, "cubemap uploaded");
        self.cubemaps.insert(name, entry);
        Ok(true)
    }
}

fn checked_pixels(image: &HostImage) -> BridgeResult<&[f32]> {
    let expected = image.width as usize * image.height as usize * image.channels as usize;
    if !(1..=4).contains(&image.channels) || image.pixels.len() != expected {
        return Err(BridgeError::validation(format!(
            "image '{}' has {} floats, expected {}x{}x{}",
            image.name,
            image.pixels.len(),
            image.width,
            image.height,
            image.channels
        )));
    }
    Ok(&image.pixels)
}

#[cfg(test)]
#[path = "../../tests/unit/sync/resources.rs"]
mod tests;
