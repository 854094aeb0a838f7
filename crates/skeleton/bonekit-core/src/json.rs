//! Skeleton JSON loader.
//!
//! Parses the exported skeleton document into private raw structs with serde,
//! then resolves names to indices and builds `SkeletonData`. Any unresolved
//! reference, malformed color, unsupported attachment type or unsorted
//! keyframe array fails the whole load.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::animation::Animation;
use crate::attachment::Attachment;
use crate::color::Color;
use crate::config::Config;
use crate::curve::Curve;
use crate::data::{BoneData, SkeletonData, SlotData};
use crate::error::{LoadError, LookupKind};
use crate::loader::AttachmentLoader;
use crate::skin::Skin;
use crate::timeline::{
    AttachmentTimeline, ColorTimeline, RotateTimeline, ScaleTimeline, Timeline,
    TranslateTimeline,
};

pub struct SkeletonJson<L: AttachmentLoader> {
    loader: L,
    scale: f32,
}

impl<L: AttachmentLoader> SkeletonJson<L> {
    pub fn new(loader: L) -> Self {
        Self { loader, scale: 1.0 }
    }

    /// Loader honoring the load-time fields of `config`.
    pub fn with_config(loader: L, config: &Config) -> Self {
        Self::new(loader).with_scale(config.scale)
    }

    /// Uniform scale for positions, lengths, attachment geometry and translate keys.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn read_str(&mut self, s: &str) -> Result<SkeletonData, LoadError> {
        let raw: RawSkeleton = serde_json::from_str(s)?;
        let mut data = SkeletonData::new();

        for rb in &raw.bones {
            let parent = match &rb.parent {
                Some(name) => Some(data.find_bone_index(name).ok_or_else(|| {
                    LoadError::MissingReference {
                        kind: LookupKind::Bone,
                        name: name.clone(),
                        referrer: format!("bone '{}' (parents must come first)", rb.name),
                    }
                })?),
                None => None,
            };
            let mut bone = BoneData::new(rb.name.clone(), parent);
            bone.length = rb.length * self.scale;
            bone.x = rb.x * self.scale;
            bone.y = rb.y * self.scale;
            bone.rotation = rb.rotation;
            bone.scale_x = rb.scale_x;
            bone.scale_y = rb.scale_y;
            data.add_bone(bone);
        }

        for rs in &raw.slots {
            let bone = data
                .find_bone_index(&rs.bone)
                .ok_or_else(|| LoadError::MissingReference {
                    kind: LookupKind::Bone,
                    name: rs.bone.clone(),
                    referrer: format!("slot '{}'", rs.name),
                })?;
            let mut slot = SlotData::new(rs.name.clone(), bone);
            if let Some(hex) = &rs.color {
                slot.color = Color::from_hex(hex)?;
            }
            slot.attachment_name = rs.attachment.clone().filter(|n| !n.is_empty());
            data.add_slot(slot);
        }

        for (skin_name, slots) in &raw.skins {
            let skin = self.read_skin(&data, skin_name, slots)?;
            data.add_skin(skin);
        }

        for (anim_name, ra) in &raw.animations {
            let animation = self.read_animation(&data, anim_name, ra)?;
            data.add_animation(animation);
        }

        log::debug!(
            "skeleton loaded: {} bones, {} slots, {} skins, {} animations",
            data.bones.len(),
            data.slots.len(),
            data.skins.len(),
            data.animations.len()
        );
        Ok(data)
    }

    fn read_skin(
        &mut self,
        data: &SkeletonData,
        skin_name: &str,
        slots: &IndexMap<String, IndexMap<String, RawAttachment>>,
    ) -> Result<Skin, LoadError> {
        let mut skin = Skin::new(skin_name);
        for (slot_name, attachments) in slots {
            let slot_index = find_slot(data, slot_name, || format!("skin '{skin_name}'"))?;
            for (att_name, ra) in attachments {
                let kind = ra.kind.as_deref().unwrap_or("region");
                if !kind.is_empty() && kind != "region" {
                    return Err(LoadError::UnsupportedAttachment {
                        kind: kind.to_string(),
                        name: att_name.clone(),
                    });
                }
                let path = ra.name.as_deref().unwrap_or(att_name);
                let mut region = self
                    .loader
                    .new_region_attachment(skin_name, att_name, path)?;
                region.set_transform(
                    ra.x * self.scale,
                    ra.y * self.scale,
                    ra.rotation,
                    ra.scale_x,
                    ra.scale_y,
                );
                region.set_size(ra.width * self.scale, ra.height * self.scale);
                skin.add_attachment(slot_index, att_name.clone(), Attachment::Region(region));
            }
        }
        Ok(skin)
    }

    fn read_animation(
        &self,
        data: &SkeletonData,
        name: &str,
        ra: &RawAnimation,
    ) -> Result<Animation, LoadError> {
        let mut timelines = Vec::new();

        for (bone_name, rb) in &ra.bones {
            let bone_index = data
                .find_bone_index(bone_name)
                .ok_or_else(|| LoadError::MissingReference {
                    kind: LookupKind::Bone,
                    name: bone_name.clone(),
                    referrer: format!("animation '{name}'"),
                })?;
            let label = |channel: &str| format!("{name}/{bone_name}/{channel}");

            if !rb.rotate.is_empty() {
                check_sorted(rb.rotate.iter().map(|k| k.time), || label("rotate"))?;
                let mut t = RotateTimeline::new(bone_index, rb.rotate.len());
                for (i, key) in rb.rotate.iter().enumerate() {
                    t.set_frame(i, key.time, key.angle);
                    read_curve(t.curve_mut(), i, rb.rotate.len(), key.curve.as_ref());
                }
                timelines.push(Timeline::Rotate(t));
            }

            if !rb.translate.is_empty() {
                check_sorted(rb.translate.iter().map(|k| k.time), || label("translate"))?;
                let mut t = TranslateTimeline::new(bone_index, rb.translate.len());
                for (i, key) in rb.translate.iter().enumerate() {
                    t.set_frame(i, key.time, key.x * self.scale, key.y * self.scale);
                    read_curve(t.curve_mut(), i, rb.translate.len(), key.curve.as_ref());
                }
                timelines.push(Timeline::Translate(t));
            }

            if !rb.scale.is_empty() {
                check_sorted(rb.scale.iter().map(|k| k.time), || label("scale"))?;
                let mut t = ScaleTimeline::new(bone_index, rb.scale.len());
                for (i, key) in rb.scale.iter().enumerate() {
                    t.set_frame(i, key.time, key.x, key.y);
                    read_curve(t.curve_mut(), i, rb.scale.len(), key.curve.as_ref());
                }
                timelines.push(Timeline::Scale(t));
            }
        }

        for (slot_name, rs) in &ra.slots {
            let slot_index = find_slot(data, slot_name, || format!("animation '{name}'"))?;
            let label = |channel: &str| format!("{name}/{slot_name}/{channel}");

            if !rs.color.is_empty() {
                check_sorted(rs.color.iter().map(|k| k.time), || label("color"))?;
                let mut t = ColorTimeline::new(slot_index, rs.color.len());
                for (i, key) in rs.color.iter().enumerate() {
                    t.set_frame(i, key.time, Color::from_hex(&key.color)?);
                    read_curve(t.curve_mut(), i, rs.color.len(), key.curve.as_ref());
                }
                timelines.push(Timeline::Color(t));
            }

            if !rs.attachment.is_empty() {
                check_sorted(rs.attachment.iter().map(|k| k.time), || label("attachment"))?;
                let mut t = AttachmentTimeline::new(slot_index, rs.attachment.len());
                for (i, key) in rs.attachment.iter().enumerate() {
                    t.set_frame(i, key.time, key.name.as_deref());
                }
                timelines.push(Timeline::Attachment(t));
            }
        }

        Ok(Animation::new(name, timelines))
    }
}

fn find_slot(
    data: &SkeletonData,
    slot_name: &str,
    referrer: impl FnOnce() -> String,
) -> Result<usize, LoadError> {
    data.find_slot_index(slot_name)
        .ok_or_else(|| LoadError::MissingReference {
            kind: LookupKind::Slot,
            name: slot_name.to_string(),
            referrer: referrer(),
        })
}

fn check_sorted(
    times: impl Iterator<Item = f32>,
    label: impl FnOnce() -> String,
) -> Result<(), LoadError> {
    let mut last = f32::NEG_INFINITY;
    for t in times {
        if !t.is_finite() || t < last {
            return Err(LoadError::UnsortedKeyframes(label()));
        }
        last = t;
    }
    Ok(())
}

/// The curve of keyframe `i` shapes the segment towards keyframe `i + 1`;
/// the last keyframe's curve has no segment.
fn read_curve(curve: &mut Curve, i: usize, frame_count: usize, raw: Option<&RawCurve>) {
    if i + 1 >= frame_count {
        return;
    }
    match raw {
        Some(RawCurve::Bezier([cx1, cy1, cx2, cy2])) => curve.set_curve(i, *cx1, *cy1, *cx2, *cy2),
        Some(RawCurve::Named(kind)) if kind == "stepped" => curve.set_stepped(i),
        Some(RawCurve::Named(kind)) => {
            log::warn!("unknown curve '{kind}' treated as linear");
        }
        None => {}
    }
}

// ----- JSON schema (serde) -----

fn one() -> f32 {
    1.0
}

fn thirty_two() -> f32 {
    32.0
}

#[derive(Debug, Deserialize)]
struct RawSkeleton {
    #[serde(default)]
    bones: Vec<RawBone>,
    #[serde(default)]
    slots: Vec<RawSlot>,
    #[serde(default)]
    skins: IndexMap<String, IndexMap<String, IndexMap<String, RawAttachment>>>,
    #[serde(default)]
    animations: IndexMap<String, RawAnimation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBone {
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    length: f32,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "one")]
    scale_x: f32,
    #[serde(default = "one")]
    scale_y: f32,
}

#[derive(Debug, Deserialize)]
struct RawSlot {
    name: String,
    bone: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    attachment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttachment {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    /// Atlas region path; defaults to the attachment key.
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "one")]
    scale_x: f32,
    #[serde(default = "one")]
    scale_y: f32,
    #[serde(default = "thirty_two")]
    width: f32,
    #[serde(default = "thirty_two")]
    height: f32,
}

#[derive(Debug, Deserialize)]
struct RawAnimation {
    #[serde(default)]
    bones: IndexMap<String, RawBoneTimelines>,
    #[serde(default)]
    slots: IndexMap<String, RawSlotTimelines>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBoneTimelines {
    #[serde(default)]
    rotate: Vec<RawRotateKey>,
    #[serde(default)]
    translate: Vec<RawTranslateKey>,
    #[serde(default)]
    scale: Vec<RawScaleKey>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSlotTimelines {
    #[serde(default)]
    color: Vec<RawColorKey>,
    #[serde(default)]
    attachment: Vec<RawAttachmentKey>,
}

/// `"stepped"` or `[cx1, cy1, cx2, cy2]`; absent means linear.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCurve {
    Bezier([f32; 4]),
    Named(String),
}

#[derive(Debug, Deserialize)]
struct RawRotateKey {
    time: f32,
    #[serde(default)]
    angle: f32,
    #[serde(default)]
    curve: Option<RawCurve>,
}

#[derive(Debug, Deserialize)]
struct RawTranslateKey {
    time: f32,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    curve: Option<RawCurve>,
}

#[derive(Debug, Deserialize)]
struct RawScaleKey {
    time: f32,
    #[serde(default = "one")]
    x: f32,
    #[serde(default = "one")]
    y: f32,
    #[serde(default)]
    curve: Option<RawCurve>,
}

#[derive(Debug, Deserialize)]
struct RawColorKey {
    time: f32,
    color: String,
    #[serde(default)]
    curve: Option<RawCurve>,
}

#[derive(Debug, Deserialize)]
struct RawAttachmentKey {
    time: f32,
    #[serde(default)]
    name: Option<String>,
}
