//! Attachment loaders: how the JSON loader turns an attachment descriptor into
//! a textured region.
//!
//! Game glue implements `AttachmentLoader` to plug in its own texture source;
//! `AtlasAttachmentLoader` covers the usual atlas-backed case.

use crate::atlas::Atlas;
use crate::attachment::RegionAttachment;
use crate::error::{LoadError, LookupKind};

pub trait AttachmentLoader {
    /// Create the region attachment `name` of skin `skin`, textured from `path`.
    /// Geometry (position, size, ...) is filled in by the caller afterwards.
    fn new_region_attachment(
        &mut self,
        skin: &str,
        name: &str,
        path: &str,
    ) -> Result<RegionAttachment, LoadError>;
}

/// Resolves region paths against a parsed atlas; a missing region fails the load.
#[derive(Debug, Clone, Copy)]
pub struct AtlasAttachmentLoader<'a> {
    atlas: &'a Atlas,
}

impl<'a> AtlasAttachmentLoader<'a> {
    pub fn new(atlas: &'a Atlas) -> Self {
        Self { atlas }
    }
}

impl AttachmentLoader for AtlasAttachmentLoader<'_> {
    fn new_region_attachment(
        &mut self,
        skin: &str,
        name: &str,
        path: &str,
    ) -> Result<RegionAttachment, LoadError> {
        let region = self
            .atlas
            .find_region(path)
            .ok_or_else(|| LoadError::MissingReference {
                kind: LookupKind::Region,
                name: path.to_string(),
                referrer: format!("attachment '{name}' in skin '{skin}'"),
            })?;

        let mut att = RegionAttachment::new(name);
        att.set_path(path);
        att.set_texture(Some(region.texture()));
        att.set_uvs(region.u, region.v, region.u2, region.v2, region.rotate);
        att.set_region(
            region.width as f32,
            region.height as f32,
            region.offset_x,
            region.offset_y,
            region.original_width as f32,
            region.original_height as f32,
        );
        Ok(att)
    }
}

/// Untextured quads covering the full 0..1 UV range; useful for headless
/// tooling and tests. The region is treated as untrimmed at attachment size.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainAttachmentLoader;

impl AttachmentLoader for PlainAttachmentLoader {
    fn new_region_attachment(
        &mut self,
        _skin: &str,
        name: &str,
        path: &str,
    ) -> Result<RegionAttachment, LoadError> {
        let mut att = RegionAttachment::new(name);
        att.set_path(path);
        Ok(att)
    }
}
