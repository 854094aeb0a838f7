//! Skeleton instance: per-character mutable pose built from shared template data.

use std::sync::Arc;

use crate::attachment::Attachment;
use crate::bone::Bone;
use crate::color::Color;
use crate::config::Config;
use crate::data::SkeletonData;
use crate::error::{LookupKind, SkeletonError};
use crate::skin::Skin;
use crate::slot::Slot;

#[derive(Clone, Debug)]
pub struct Skeleton {
    data: Arc<SkeletonData>,
    config: Config,
    bones: Vec<Bone>,
    slots: Vec<Slot>,
    /// Slot indices in back-to-front order.
    draw_order: Vec<usize>,
    skin: Option<Arc<Skin>>,
    time: f32,

    /// Origin added to every world vertex.
    pub x: f32,
    pub y: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Tint multiplied into every slot color on output.
    pub color: Color,
}

impl Skeleton {
    pub fn new(data: Arc<SkeletonData>) -> Self {
        Self::with_config(data, Config::default())
    }

    /// Instantiate one bone per template bone and one slot per template slot,
    /// then apply the setup pose.
    pub fn with_config(data: Arc<SkeletonData>, config: Config) -> Self {
        let bones: Vec<Bone> = data
            .bones
            .iter()
            .enumerate()
            .map(|(i, bd)| {
                debug_assert!(
                    bd.parent.map_or(true, |p| p < i),
                    "bone '{}' precedes its parent",
                    bd.name
                );
                Bone::new(bd.clone(), bd.parent)
            })
            .collect();
        let slots: Vec<Slot> = data.slots.iter().map(|sd| Slot::new(sd.clone())).collect();
        let draw_order = (0..slots.len()).collect();

        let mut skeleton = Self {
            data,
            config,
            bones,
            slots,
            draw_order,
            skin: None,
            time: 0.0,
            x: 0.0,
            y: 0.0,
            flip_x: false,
            flip_y: false,
            color: Color::WHITE,
        };
        skeleton.set_to_setup_pose();
        skeleton
    }

    pub fn data(&self) -> &Arc<SkeletonData> {
        &self.data
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone_mut(&mut self, index: usize) -> &mut Bone {
        &mut self.bones[index]
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_mut(&mut self, index: usize) -> &mut Slot {
        &mut self.slots[index]
    }

    pub fn root_bone(&self) -> Option<&Bone> {
        self.bones.first()
    }

    pub fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }

    /// Reorder slots for z-ordering; entries must stay a permutation of slot indices.
    pub fn draw_order_mut(&mut self) -> &mut [usize] {
        &mut self.draw_order
    }

    pub fn skin(&self) -> Option<&Arc<Skin>> {
        self.skin.as_ref()
    }

    /// Accumulated time, advanced by `update`.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn update(&mut self, delta: f32) {
        self.time += delta;
    }

    /// Recompute every bone's world transform, parents first. Bone order in the
    /// template guarantees a parent is updated before any of its children.
    pub fn update_world_transform(&mut self) {
        let (flip_x, flip_y, y_down) = (self.flip_x, self.flip_y, self.config.y_down);
        for i in 0..self.bones.len() {
            let (done, rest) = self.bones.split_at_mut(i);
            let bone = &mut rest[0];
            let parent = bone.parent().map(|p| &done[p]);
            bone.update_world_transform(parent, flip_x, flip_y, y_down);
        }
    }

    pub fn set_to_setup_pose(&mut self) {
        self.set_bones_to_setup_pose();
        self.set_slots_to_setup_pose();
    }

    pub fn set_bones_to_setup_pose(&mut self) {
        for bone in &mut self.bones {
            bone.set_to_setup_pose();
        }
    }

    /// Restore slot colors, setup attachments (resolved through the current
    /// skin, then the default skin) and the draw order.
    pub fn set_slots_to_setup_pose(&mut self) {
        for i in 0..self.slots.len() {
            let data = self.slots[i].data().clone();
            let attachment = data
                .attachment_name
                .as_deref()
                .and_then(|name| self.attachment_by_slot_index(i, name));
            let slot = &mut self.slots[i];
            slot.color = data.color;
            slot.set_attachment(attachment, self.time);
        }
        for (i, entry) in self.draw_order.iter_mut().enumerate() {
            *entry = i;
        }
    }

    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name() == name)
    }

    pub fn find_bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name() == name)
    }

    pub fn find_slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name() == name)
    }

    pub fn find_slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name() == name)
    }

    /// Swap skins. When both an old and a new skin exist, every slot still
    /// showing an attachment from the old skin is re-resolved with the same
    /// key in the new skin; slots the old skin did not assign are untouched.
    pub fn set_skin(&mut self, skin: Option<Arc<Skin>>) {
        if let (Some(old), Some(new)) = (&self.skin, &skin) {
            for (slot_index, name, old_att) in old.entries() {
                let slot = &mut self.slots[slot_index];
                let showing_old = slot
                    .attachment()
                    .map_or(false, |current| Arc::ptr_eq(current, old_att));
                if !showing_old {
                    continue;
                }
                if let Some(att) = new.get_attachment(slot_index, name) {
                    slot.set_attachment(Some(att.clone()), self.time);
                }
            }
        }
        log::debug!(
            "skin {:?} -> {:?}",
            self.skin.as_ref().map(|s| s.name().to_string()),
            skin.as_ref().map(|s| s.name().to_string())
        );
        self.skin = skin;
    }

    pub fn set_skin_by_name(&mut self, name: &str) -> Result<(), SkeletonError> {
        let skin = self
            .data
            .find_skin(name)
            .cloned()
            .ok_or_else(|| SkeletonError::not_found(LookupKind::Skin, name))?;
        self.set_skin(Some(skin));
        Ok(())
    }

    /// Resolve `(slot_index, name)` against the current skin, then the default skin.
    pub fn attachment_by_slot_index(&self, slot_index: usize, name: &str) -> Option<Arc<Attachment>> {
        if let Some(att) = self
            .skin
            .as_ref()
            .and_then(|skin| skin.get_attachment(slot_index, name))
        {
            return Some(att.clone());
        }
        self.data
            .default_skin
            .as_ref()
            .and_then(|skin| skin.get_attachment(slot_index, name))
            .cloned()
    }

    pub fn attachment_by_slot_name(&self, slot_name: &str, name: &str) -> Option<Arc<Attachment>> {
        let slot_index = self.data.find_slot_index(slot_name)?;
        self.attachment_by_slot_index(slot_index, name)
    }

    /// Set (or with `None`, clear) the attachment of the named slot.
    pub fn set_attachment(
        &mut self,
        slot_name: &str,
        attachment_name: Option<&str>,
    ) -> Result<(), SkeletonError> {
        let slot_index = self
            .find_slot_index(slot_name)
            .ok_or_else(|| SkeletonError::not_found(LookupKind::Slot, slot_name))?;
        let attachment = match attachment_name {
            Some(name) => Some(
                self.attachment_by_slot_index(slot_index, name)
                    .ok_or_else(|| SkeletonError::not_found(LookupKind::Attachment, name))?,
            ),
            None => None,
        };
        let now = self.time;
        self.slots[slot_index].set_attachment(attachment, now);
        Ok(())
    }

    /// Seconds since the slot's current attachment was set.
    pub fn attachment_time(&self, slot_index: usize) -> f32 {
        self.slots[slot_index].attachment_time(self.time)
    }

    /// World-space corners of the slot's region attachment, or `None` when the
    /// slot shows nothing. Requires `update_world_transform` to have run.
    pub fn world_vertices(&self, slot_index: usize) -> Option<[f32; 8]> {
        let slot = &self.slots[slot_index];
        let region = slot.attachment()?.as_region()?;
        let bone = &self.bones[slot.bone()];
        Some(region.compute_world_vertices(self.x, self.y, bone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::RegionAttachment;
    use crate::data::{BoneData, SlotData};

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn region(name: &str) -> Attachment {
        Attachment::Region(RegionAttachment::new(name))
    }

    /// root -> arm -> hand, two slots on hand/arm, default + alt skins.
    fn fixture() -> Arc<SkeletonData> {
        let mut data = SkeletonData::new();
        let root = data.add_bone(BoneData::new("root", None));
        let mut arm = BoneData::new("arm", Some(root));
        arm.x = 10.0;
        arm.rotation = 90.0;
        let arm = data.add_bone(arm);
        let mut hand = BoneData::new("hand", Some(arm));
        hand.x = 5.0;
        let hand = data.add_bone(hand);

        let mut sleeve = SlotData::new("sleeve", arm);
        sleeve.attachment_name = Some("sleeve".into());
        sleeve.color = Color::new(1.0, 0.0, 0.0, 1.0);
        data.add_slot(sleeve);
        let mut glove = SlotData::new("glove", hand);
        glove.attachment_name = Some("glove".into());
        data.add_slot(glove);

        let mut default = Skin::new("default");
        default.add_attachment(0, "sleeve", region("sleeve-default"));
        data.add_skin(default);
        let mut alt = Skin::new("alt");
        alt.add_attachment(1, "glove", region("glove-alt"));
        data.add_skin(alt);
        let mut red = Skin::new("red");
        red.add_attachment(1, "glove", region("glove-red"));
        data.add_skin(red);
        Arc::new(data)
    }

    fn attachment_name(skel: &Skeleton, slot: usize) -> Option<String> {
        skel.slots()[slot].attachment().map(|a| a.name().to_string())
    }

    #[test]
    fn setup_pose_resolves_default_skin() {
        let skel = Skeleton::new(fixture());
        assert_eq!(attachment_name(&skel, 0).as_deref(), Some("sleeve-default"));
        // no skin provides "glove" yet
        assert_eq!(attachment_name(&skel, 1), None);
        assert_eq!(skel.slots()[0].color, Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(skel.draw_order(), &[0, 1]);
    }

    #[test]
    fn setup_pose_after_mutation() {
        let mut skel = Skeleton::new(fixture());
        skel.set_skin_by_name("alt").unwrap();
        skel.bone_mut(1).rotation = 12.0;
        skel.bone_mut(2).x = -3.0;
        skel.slot_mut(0).color = Color::new(0.0, 0.0, 0.0, 0.0);
        skel.draw_order_mut().swap(0, 1);
        skel.set_to_setup_pose();

        for bone in skel.bones() {
            let d = bone.data();
            assert_eq!((bone.x, bone.y, bone.rotation), (d.x, d.y, d.rotation));
            assert_eq!((bone.scale_x, bone.scale_y), (d.scale_x, d.scale_y));
        }
        assert_eq!(skel.slots()[0].color, Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(attachment_name(&skel, 1).as_deref(), Some("glove-alt"));
        assert_eq!(skel.draw_order(), &[0, 1]);
    }

    #[test]
    fn world_transform_is_top_down() {
        let mut skel = Skeleton::new(fixture());
        skel.update_world_transform();
        let hand = &skel.bones()[2];
        approx(hand.world_x(), 10.0, 1e-5);
        approx(hand.world_y(), 5.0, 1e-5);
    }

    #[test]
    fn child_before_parent_gives_stale_pose() {
        let mut skel = Skeleton::new(fixture());
        skel.update_world_transform();
        let expected = (skel.bones()[2].world_x(), skel.bones()[2].world_y());

        // Move the arm, then update the hand before its parent.
        skel.bone_mut(1).x = 20.0;
        let (done, rest) = skel.bones.split_at_mut(2);
        rest[0].update_world_transform(Some(&done[1]), false, false, false);
        let stale = (skel.bones()[2].world_x(), skel.bones()[2].world_y());
        approx(stale.0, expected.0, 1e-5);
        approx(stale.1, expected.1, 1e-5);

        skel.update_world_transform();
        approx(skel.bones()[2].world_x(), 20.0, 1e-5);
    }

    #[test]
    fn skin_swap_reassigns_only_old_skin_slots() {
        let mut skel = Skeleton::new(fixture());
        skel.set_skin_by_name("alt").unwrap();
        skel.set_attachment("glove", Some("glove")).unwrap();
        assert_eq!(attachment_name(&skel, 1).as_deref(), Some("glove-alt"));

        skel.set_skin_by_name("red").unwrap();
        assert_eq!(attachment_name(&skel, 1).as_deref(), Some("glove-red"));
        // slot 0 shows a default-skin attachment: untouched by the swap
        assert_eq!(attachment_name(&skel, 0).as_deref(), Some("sleeve-default"));
    }

    #[test]
    fn first_skin_does_not_reassign() {
        let mut skel = Skeleton::new(fixture());
        skel.set_skin_by_name("alt").unwrap();
        assert_eq!(attachment_name(&skel, 1), None);
    }

    #[test]
    fn missing_names_are_errors() {
        let mut skel = Skeleton::new(fixture());
        assert_eq!(
            skel.set_skin_by_name("zombie"),
            Err(SkeletonError::NotFound {
                kind: LookupKind::Skin,
                name: "zombie".into()
            })
        );
        assert!(matches!(
            skel.set_attachment("tail", Some("x")),
            Err(SkeletonError::NotFound { kind: LookupKind::Slot, .. })
        ));
        assert!(matches!(
            skel.set_attachment("glove", Some("glove")),
            Err(SkeletonError::NotFound { kind: LookupKind::Attachment, .. })
        ));
        skel.set_attachment("sleeve", None).unwrap();
        assert_eq!(attachment_name(&skel, 0), None);
    }

    #[test]
    fn attachment_time_uses_skeleton_clock() {
        let mut skel = Skeleton::new(fixture());
        skel.update(1.0);
        skel.set_attachment("sleeve", Some("sleeve")).unwrap();
        skel.update(0.5);
        approx(skel.attachment_time(0), 0.5, 1e-6);
        approx(skel.time(), 1.5, 1e-6);
    }

    fn tilted_root(config: Config) -> Skeleton {
        let mut data = SkeletonData::new();
        let mut root = BoneData::new("root", None);
        root.rotation = 30.0;
        data.add_bone(root);
        Skeleton::with_config(Arc::new(data), config)
    }

    fn assert_matrix(skel: &Skeleton, expected: [f32; 4]) {
        let m = skel.bones()[0].matrix();
        for (got, want) in m.iter().zip(expected) {
            approx(*got, want, 1e-4);
        }
    }

    #[test]
    fn skeleton_flags_reach_bone_matrices() {
        let (c, s) = (0.866_025_4, 0.5);

        let mut skel = tilted_root(Config::default());
        skel.update_world_transform();
        assert_matrix(&skel, [c, -s, s, c]);

        let y_down = Config {
            y_down: true,
            ..Config::default()
        };
        let mut skel = tilted_root(y_down);
        skel.update_world_transform();
        assert_matrix(&skel, [c, -s, -s, -c]);

        skel.flip_x = true;
        skel.update_world_transform();
        assert_matrix(&skel, [-c, s, -s, -c]);

        // flip_y and y_down cancel on the second row
        skel.flip_y = true;
        skel.update_world_transform();
        assert_matrix(&skel, [-c, s, s, c]);

        let mut skel = tilted_root(Config::default());
        skel.flip_x = true;
        skel.update_world_transform();
        assert_matrix(&skel, [-c, s, s, c]);
    }

    #[test]
    fn identity_bone_returns_local_offsets() {
        let mut data = SkeletonData::new();
        data.add_bone(BoneData::new("root", None));
        let mut slot = SlotData::new("s", 0);
        slot.attachment_name = Some("quad".into());
        data.add_slot(slot);
        let mut skin = Skin::new("default");
        let mut quad = RegionAttachment::new("quad");
        quad.set_transform(3.0, -2.0, 30.0, 1.5, 0.5);
        skin.add_attachment(0, "quad", Attachment::Region(quad.clone()));
        data.add_skin(skin);

        let mut skel = Skeleton::new(Arc::new(data));
        skel.update_world_transform();
        assert_eq!(skel.world_vertices(0), Some(*quad.offset()));
    }
}
