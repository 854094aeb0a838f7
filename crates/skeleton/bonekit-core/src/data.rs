//! Immutable, shareable template data (setup pose, hierarchy, skins, animations).
//!
//! A `SkeletonData` is built once by a loader and wrapped in an `Arc`; every
//! `Skeleton` instantiated from it only reads it.

use std::sync::Arc;

use crate::animation::Animation;
use crate::color::Color;
use crate::skin::Skin;

/// Setup pose of one bone.
#[derive(Clone, Debug, PartialEq)]
pub struct BoneData {
    pub name: String,
    /// Index of the parent in `SkeletonData::bones`; always lower than this
    /// bone's own index.
    pub parent: Option<usize>,
    pub length: f32,
    pub x: f32,
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl BoneData {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            length: 0.0,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// Setup state of one slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotData {
    pub name: String,
    /// Index of the owning bone in `SkeletonData::bones`.
    pub bone: usize,
    pub color: Color,
    pub attachment_name: Option<String>,
}

impl SlotData {
    pub fn new(name: impl Into<String>, bone: usize) -> Self {
        Self {
            name: name.into(),
            bone,
            color: Color::WHITE,
            attachment_name: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SkeletonData {
    pub bones: Vec<Arc<BoneData>>,
    pub slots: Vec<Arc<SlotData>>,
    pub skins: Vec<Arc<Skin>>,
    /// Fallback skin consulted after the skeleton's current skin.
    pub default_skin: Option<Arc<Skin>>,
    pub animations: Vec<Animation>,
}

impl SkeletonData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone; its parent (if any) must already be present.
    pub fn add_bone(&mut self, bone: BoneData) -> usize {
        debug_assert!(
            bone.parent.map_or(true, |p| p < self.bones.len()),
            "bone '{}' added before its parent",
            bone.name
        );
        self.bones.push(Arc::new(bone));
        self.bones.len() - 1
    }

    pub fn add_slot(&mut self, slot: SlotData) -> usize {
        debug_assert!(slot.bone < self.bones.len(), "slot '{}' bone out of range", slot.name);
        self.slots.push(Arc::new(slot));
        self.slots.len() - 1
    }

    /// Register a skin; a skin named `default` also becomes the default skin.
    pub fn add_skin(&mut self, skin: Skin) -> Arc<Skin> {
        let skin = Arc::new(skin);
        if skin.name() == "default" {
            self.default_skin = Some(skin.clone());
        }
        self.skins.push(skin.clone());
        skin
    }

    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    pub fn find_bone(&self, name: &str) -> Option<&Arc<BoneData>> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn find_bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn find_slot(&self, name: &str) -> Option<&Arc<SlotData>> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn find_slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn find_skin(&self, name: &str) -> Option<&Arc<Skin>> {
        self.skins.iter().find(|s| s.name() == name)
    }

    pub fn find_animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name() == name)
    }
}
