//! Attachments: renderable shapes bound to slots.
//!
//! Only textured region quads exist today; `Attachment` stays a closed enum so
//! skin resolution and timelines never depend on concrete geometry.

use crate::atlas::TextureHandle;
use crate::bone::Bone;

// Corner order inside the 8-float offset/vertex/uv arrays.
pub const BL_X: usize = 0;
pub const BL_Y: usize = 1;
pub const UL_X: usize = 2;
pub const UL_Y: usize = 3;
pub const UR_X: usize = 4;
pub const UR_Y: usize = 5;
pub const BR_X: usize = 6;
pub const BR_Y: usize = 7;

#[derive(Clone, Debug, PartialEq)]
pub enum Attachment {
    Region(RegionAttachment),
}

impl Attachment {
    pub fn name(&self) -> &str {
        match self {
            Attachment::Region(r) => &r.name,
        }
    }

    pub fn as_region(&self) -> Option<&RegionAttachment> {
        match self {
            Attachment::Region(r) => Some(r),
        }
    }
}

/// Textured quad positioned relative to its slot's bone.
///
/// Geometry inputs are private; every setter refreshes the cached corner
/// offsets so `compute_world_vertices` only does the bone projection.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionAttachment {
    name: String,
    path: String,
    x: f32,
    y: f32,
    rotation: f32,
    scale_x: f32,
    scale_y: f32,
    width: f32,
    height: f32,

    // Atlas region trim data: the packed cell may be smaller than the
    // original image and offset inside it.
    region_offset_x: f32,
    region_offset_y: f32,
    region_width: f32,
    region_height: f32,
    region_original_width: f32,
    region_original_height: f32,

    uvs: [f32; 8],
    offset: [f32; 8],
    texture: Option<TextureHandle>,
}

impl RegionAttachment {
    /// Untrimmed 32x32 quad covering the whole texture.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut att = Self {
            path: name.clone(),
            name,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width: 32.0,
            height: 32.0,
            region_offset_x: 0.0,
            region_offset_y: 0.0,
            region_width: 32.0,
            region_height: 32.0,
            region_original_width: 32.0,
            region_original_height: 32.0,
            uvs: [0.0; 8],
            offset: [0.0; 8],
            texture: None,
        };
        att.set_uvs(0.0, 0.0, 1.0, 1.0, false);
        att.update_offset();
        att
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Atlas region path the attachment was resolved from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn uvs(&self) -> &[f32; 8] {
        &self.uvs
    }

    pub fn offset(&self) -> &[f32; 8] {
        &self.offset
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.texture = texture;
    }

    /// Set the local placement relative to the bone.
    pub fn set_transform(&mut self, x: f32, y: f32, rotation: f32, scale_x: f32, scale_y: f32) {
        self.x = x;
        self.y = y;
        self.rotation = rotation;
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self.update_offset();
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.update_offset();
    }

    /// Set the packed region size, its offset inside the original image and
    /// the original (untrimmed) size.
    pub fn set_region(
        &mut self,
        width: f32,
        height: f32,
        offset_x: f32,
        offset_y: f32,
        original_width: f32,
        original_height: f32,
    ) {
        self.region_width = width;
        self.region_height = height;
        self.region_offset_x = offset_x;
        self.region_offset_y = offset_y;
        self.region_original_width = original_width;
        self.region_original_height = original_height;
        self.update_offset();
    }

    /// Assign texture coordinates. A region packed rotated 90 degrees in the
    /// atlas permutes the UV corners; the geometry corners stay put.
    pub fn set_uvs(&mut self, u: f32, v: f32, u2: f32, v2: f32, rotate: bool) {
        let uvs = &mut self.uvs;
        if rotate {
            uvs[UL_X] = u;
            uvs[UL_Y] = v2;
            uvs[UR_X] = u;
            uvs[UR_Y] = v;
            uvs[BR_X] = u2;
            uvs[BR_Y] = v;
            uvs[BL_X] = u2;
            uvs[BL_Y] = v2;
        } else {
            uvs[BL_X] = u;
            uvs[BL_Y] = v2;
            uvs[UL_X] = u;
            uvs[UL_Y] = v;
            uvs[UR_X] = u2;
            uvs[UR_Y] = v;
            uvs[BR_X] = u2;
            uvs[BR_Y] = v2;
        }
    }

    /// Recompute the 4 local corner offsets from the geometry inputs.
    pub fn update_offset(&mut self) {
        let original_w = if self.region_original_width != 0.0 {
            self.region_original_width
        } else {
            self.width
        };
        let original_h = if self.region_original_height != 0.0 {
            self.region_original_height
        } else {
            self.height
        };
        let region_scale_x = self.width / original_w * self.scale_x;
        let region_scale_y = self.height / original_h * self.scale_y;
        let local_x = -self.width / 2.0 * self.scale_x + self.region_offset_x * region_scale_x;
        let local_y = -self.height / 2.0 * self.scale_y + self.region_offset_y * region_scale_y;
        let local_x2 = local_x + self.region_width * region_scale_x;
        let local_y2 = local_y + self.region_height * region_scale_y;

        let radians = self.rotation.to_radians();
        let (sin, cos) = radians.sin_cos();
        let local_x_cos = local_x * cos + self.x;
        let local_x_sin = local_x * sin;
        let local_y_cos = local_y * cos + self.y;
        let local_y_sin = local_y * sin;
        let local_x2_cos = local_x2 * cos + self.x;
        let local_x2_sin = local_x2 * sin;
        let local_y2_cos = local_y2 * cos + self.y;
        let local_y2_sin = local_y2 * sin;

        let o = &mut self.offset;
        o[BL_X] = local_x_cos - local_y_sin;
        o[BL_Y] = local_y_cos + local_x_sin;
        o[UL_X] = local_x_cos - local_y2_sin;
        o[UL_Y] = local_y2_cos + local_x_sin;
        o[UR_X] = local_x2_cos - local_y2_sin;
        o[UR_Y] = local_y2_cos + local_x2_sin;
        o[BR_X] = local_x2_cos - local_y_sin;
        o[BR_Y] = local_y_cos + local_x2_sin;
    }

    /// Project the cached offsets through the bone's world matrix and
    /// translate by `(x + bone.world_x, y + bone.world_y)`.
    pub fn compute_world_vertices(&self, x: f32, y: f32, bone: &Bone) -> [f32; 8] {
        let x = x + bone.world_x();
        let y = y + bone.world_y();
        let [m00, m01, m10, m11] = bone.matrix();
        let o = &self.offset;
        let mut out = [0.0; 8];
        for corner in 0..4 {
            let ox = o[corner * 2];
            let oy = o[corner * 2 + 1];
            out[corner * 2] = ox * m00 + oy * m01 + x;
            out[corner * 2 + 1] = ox * m10 + oy * m11 + y;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn untrimmed_quad_is_centered_on_pivot() {
        let mut att = RegionAttachment::new("head");
        att.set_size(20.0, 10.0);
        att.set_region(20.0, 10.0, 0.0, 0.0, 20.0, 10.0);
        let o = att.offset();
        assert_eq!([o[BL_X], o[BL_Y]], [-10.0, -5.0]);
        assert_eq!([o[UL_X], o[UL_Y]], [-10.0, 5.0]);
        assert_eq!([o[UR_X], o[UR_Y]], [10.0, 5.0]);
        assert_eq!([o[BR_X], o[BR_Y]], [10.0, -5.0]);
    }

    #[test]
    fn rotation_and_translation_move_corners() {
        let mut att = RegionAttachment::new("arm");
        att.set_size(2.0, 2.0);
        att.set_region(2.0, 2.0, 0.0, 0.0, 2.0, 2.0);
        att.set_transform(5.0, 0.0, 90.0, 1.0, 1.0);
        let o = att.offset();
        // (-1,-1) rotated 90 degrees is (1,-1), then shifted by x=5
        approx(o[BL_X], 6.0, 1e-5);
        approx(o[BL_Y], -1.0, 1e-5);
        approx(o[UR_X], 4.0, 1e-5);
        approx(o[UR_Y], 1.0, 1e-5);
    }

    #[test]
    fn trimmed_region_shifts_quad() {
        let mut att = RegionAttachment::new("trim");
        att.set_size(100.0, 100.0);
        // 50x50 packed cell sitting at (10, 20) inside a 100x100 original
        att.set_region(50.0, 50.0, 10.0, 20.0, 100.0, 100.0);
        let o = att.offset();
        assert_eq!([o[BL_X], o[BL_Y]], [-40.0, -30.0]);
        assert_eq!([o[UR_X], o[UR_Y]], [10.0, 20.0]);
    }

    #[test]
    fn rotated_region_permutes_uvs() {
        let mut att = RegionAttachment::new("r");
        att.set_uvs(0.1, 0.2, 0.3, 0.4, false);
        assert_eq!(*att.uvs(), [0.1, 0.4, 0.1, 0.2, 0.3, 0.2, 0.3, 0.4]);
        att.set_uvs(0.1, 0.2, 0.3, 0.4, true);
        assert_eq!(*att.uvs(), [0.3, 0.4, 0.1, 0.4, 0.1, 0.2, 0.3, 0.2]);
        // geometry unaffected by UV rotation
        let before = *att.offset();
        att.set_uvs(0.0, 0.0, 1.0, 1.0, true);
        assert_eq!(*att.offset(), before);
    }
}
