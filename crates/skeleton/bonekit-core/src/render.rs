//! Renderer-facing output: one textured quad per visible region attachment.

use crate::atlas::TextureHandle;
use crate::skeleton::Skeleton;

/// Everything a renderer needs to draw one slot.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionDraw {
    pub slot_index: usize,
    /// World-space corners, `[BL, UL, UR, BR]` as x/y pairs.
    pub vertices: [f32; 8],
    pub uvs: [f32; 8],
    /// Slot color multiplied by the skeleton tint.
    pub color: [f32; 4],
    pub texture: Option<TextureHandle>,
}

impl Skeleton {
    /// Visible regions in draw order (back to front). Call after
    /// `update_world_transform`.
    pub fn draw_regions(&self) -> impl Iterator<Item = RegionDraw> + '_ {
        self.draw_order().iter().filter_map(move |&slot_index| {
            let slot = &self.slots()[slot_index];
            let region = slot.attachment()?.as_region()?;
            let bone = &self.bones()[slot.bone()];
            Some(RegionDraw {
                slot_index,
                vertices: region.compute_world_vertices(self.x, self.y, bone),
                uvs: *region.uvs(),
                color: slot.color.tint(self.color).to_array(),
                texture: region.texture(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::attachment::{Attachment, RegionAttachment};
    use crate::color::Color;
    use crate::data::{BoneData, SkeletonData, SlotData};
    use crate::skeleton::Skeleton;
    use crate::skin::Skin;

    fn two_slot_skeleton() -> Skeleton {
        let mut data = SkeletonData::new();
        data.add_bone(BoneData::new("root", None));
        for name in ["back", "front", "empty"] {
            let mut slot = SlotData::new(name, 0);
            if name != "empty" {
                slot.attachment_name = Some(name.into());
            }
            data.add_slot(slot);
        }
        let mut skin = Skin::new("default");
        let mut back = RegionAttachment::new("back");
        back.set_size(2.0, 2.0);
        skin.add_attachment(0, "back", Attachment::Region(back));
        skin.add_attachment(1, "front", Attachment::Region(RegionAttachment::new("front")));
        data.add_skin(skin);
        Skeleton::new(Arc::new(data))
    }

    #[test]
    fn follows_draw_order_and_skips_empty_slots() {
        let mut skel = two_slot_skeleton();
        skel.update_world_transform();
        let order: Vec<usize> = skel.draw_regions().map(|d| d.slot_index).collect();
        assert_eq!(order, vec![0, 1]);

        skel.draw_order_mut().reverse();
        let order: Vec<usize> = skel.draw_regions().map(|d| d.slot_index).collect();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn origin_and_tint_are_applied() {
        let mut skel = two_slot_skeleton();
        skel.x = 100.0;
        skel.y = 50.0;
        skel.color = Color::new(0.5, 1.0, 1.0, 1.0);
        skel.slot_mut(0).color = Color::new(1.0, 0.5, 1.0, 0.5);
        skel.update_world_transform();

        let back = skel.draw_regions().next().unwrap();
        assert_eq!(back.vertices, [99.0, 49.0, 99.0, 51.0, 101.0, 51.0, 101.0, 49.0]);
        assert_eq!(back.color, [0.5, 0.5, 1.0, 0.5]);
        assert_eq!(back.texture, None);
    }
}
