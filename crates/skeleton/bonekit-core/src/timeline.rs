//! Keyframed channels for one property of one bone or slot.
//!
//! Every timeline keeps its keyframes in a flat `Vec<f32>` with a fixed stride
//! (time first, then values) sorted by time, plus a `Curve` with one easing
//! segment per keyframe pair. Bone timelines blend additively:
//! `current += (target - current) * alpha`, where the target is measured from
//! the setup pose. That is what lets several animations be mixed with
//! complementary alphas in the same frame.

use crate::color::Color;
use crate::curve::Curve;
use crate::interp::{lerp_f32, lerp_vec4, wrap_degrees};
use crate::skeleton::Skeleton;

const ROTATE_STRIDE: usize = 2;
const XY_STRIDE: usize = 3;
const COLOR_STRIDE: usize = 5;

/// Offset of the first keyframe whose time is greater than `target`.
///
/// Only meaningful when `target` lies in `[first time, last time)`; callers
/// handle the before-first and at-or-after-last cases themselves. With a single
/// interval the answer is always the second keyframe.
pub fn binary_search(values: &[f32], target: f32, stride: usize) -> usize {
    let mut low = 0usize;
    let mut high = (values.len() / stride).saturating_sub(2);
    if high == 0 {
        return stride;
    }
    let mut current = high >> 1;
    loop {
        if values[(current + 1) * stride] <= target {
            low = current + 1;
        } else {
            high = current;
        }
        if low == high {
            return (low + 1) * stride;
        }
        current = (low + high) >> 1;
    }
}

/// Percent elapsed between the keyframe before `frame` and `frame` (both
/// offsets of time fields), eased through the curve segment ending at `frame`.
fn segment_percent(
    frames: &[f32],
    curve: &Curve,
    frame: usize,
    stride: usize,
    time: f32,
) -> f32 {
    let frame_time = frames[frame];
    let prev_time = frames[frame - stride];
    let percent = 1.0 - (time - frame_time) / (prev_time - frame_time);
    curve.percent(frame / stride - 1, percent)
}

fn last_time(frames: &[f32], stride: usize) -> f32 {
    if frames.len() < stride {
        return 0.0;
    }
    frames[frames.len() - stride]
}

#[derive(Clone, Debug)]
pub enum Timeline {
    Rotate(RotateTimeline),
    Translate(TranslateTimeline),
    Scale(ScaleTimeline),
    Color(ColorTimeline),
    Attachment(AttachmentTimeline),
}

impl Timeline {
    /// Apply the timeline at `time` with blend weight `alpha`.
    pub fn apply(&self, skeleton: &mut Skeleton, time: f32, alpha: f32) {
        match self {
            Timeline::Rotate(t) => t.apply(skeleton, time, alpha),
            Timeline::Translate(t) => t.apply(skeleton, time, alpha),
            Timeline::Scale(t) => t.apply(skeleton, time, alpha),
            Timeline::Color(t) => t.apply(skeleton, time, alpha),
            Timeline::Attachment(t) => t.apply(skeleton, time, alpha),
        }
    }

    /// Time of the last keyframe.
    pub fn duration(&self) -> f32 {
        match self {
            Timeline::Rotate(t) => t.duration(),
            Timeline::Translate(t) => t.duration(),
            Timeline::Scale(t) => t.duration(),
            Timeline::Color(t) => t.duration(),
            Timeline::Attachment(t) => t.duration(),
        }
    }
}

// ----- Rotate -----

/// Keyframes `[time, angle]`, angles in degrees relative to the setup rotation.
#[derive(Clone, Debug)]
pub struct RotateTimeline {
    pub bone_index: usize,
    frames: Vec<f32>,
    curve: Curve,
}

impl RotateTimeline {
    pub fn new(bone_index: usize, frame_count: usize) -> Self {
        Self {
            bone_index,
            frames: vec![0.0; frame_count * ROTATE_STRIDE],
            curve: Curve::new(frame_count),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len() / ROTATE_STRIDE
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn curve_mut(&mut self) -> &mut Curve {
        &mut self.curve
    }

    pub fn set_frame(&mut self, index: usize, time: f32, angle: f32) {
        debug_assert!(index < self.frame_count(), "rotate frame out of range");
        let i = index * ROTATE_STRIDE;
        self.frames[i] = time;
        self.frames[i + 1] = angle;
    }

    pub fn duration(&self) -> f32 {
        last_time(&self.frames, ROTATE_STRIDE)
    }

    pub fn apply(&self, skeleton: &mut Skeleton, time: f32, alpha: f32) {
        let frames = &self.frames;
        if frames.is_empty() || time < frames[0] {
            return;
        }
        let bone = skeleton.bone_mut(self.bone_index);

        if time >= last_time(frames, ROTATE_STRIDE) {
            let amount = wrap_degrees(bone.data().rotation + frames[frames.len() - 1] - bone.rotation);
            bone.rotation += amount * alpha;
            return;
        }

        let frame = binary_search(frames, time, ROTATE_STRIDE);
        let last_value = frames[frame - 1];
        let percent = segment_percent(frames, &self.curve, frame, ROTATE_STRIDE, time);

        let delta = wrap_degrees(frames[frame + 1] - last_value);
        let amount = wrap_degrees(bone.data().rotation + (last_value + delta * percent) - bone.rotation);
        bone.rotation += amount * alpha;
    }
}

// ----- Translate / Scale -----

/// Interpolated `(x, y)` keyframe values at `time`, or `None` before the first keyframe.
fn sample_xy(frames: &[f32], curve: &Curve, time: f32) -> Option<(f32, f32)> {
    if frames.is_empty() || time < frames[0] {
        return None;
    }
    if time >= last_time(frames, XY_STRIDE) {
        let n = frames.len();
        return Some((frames[n - 2], frames[n - 1]));
    }
    let frame = binary_search(frames, time, XY_STRIDE);
    let last_x = frames[frame - 2];
    let last_y = frames[frame - 1];
    let percent = segment_percent(frames, curve, frame, XY_STRIDE, time);
    Some((
        lerp_f32(last_x, frames[frame + 1], percent),
        lerp_f32(last_y, frames[frame + 2], percent),
    ))
}

/// Keyframes `[time, x, y]`, offsets from the setup position.
#[derive(Clone, Debug)]
pub struct TranslateTimeline {
    pub bone_index: usize,
    frames: Vec<f32>,
    curve: Curve,
}

impl TranslateTimeline {
    pub fn new(bone_index: usize, frame_count: usize) -> Self {
        Self {
            bone_index,
            frames: vec![0.0; frame_count * XY_STRIDE],
            curve: Curve::new(frame_count),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len() / XY_STRIDE
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn curve_mut(&mut self) -> &mut Curve {
        &mut self.curve
    }

    pub fn set_frame(&mut self, index: usize, time: f32, x: f32, y: f32) {
        debug_assert!(index < self.frame_count(), "translate frame out of range");
        let i = index * XY_STRIDE;
        self.frames[i] = time;
        self.frames[i + 1] = x;
        self.frames[i + 2] = y;
    }

    pub fn duration(&self) -> f32 {
        last_time(&self.frames, XY_STRIDE)
    }

    pub fn apply(&self, skeleton: &mut Skeleton, time: f32, alpha: f32) {
        let Some((x, y)) = sample_xy(&self.frames, &self.curve, time) else {
            return;
        };
        let bone = skeleton.bone_mut(self.bone_index);
        let (setup_x, setup_y) = (bone.data().x, bone.data().y);
        bone.x += (setup_x + x - bone.x) * alpha;
        bone.y += (setup_y + y - bone.y) * alpha;
    }
}

/// Keyframes `[time, x, y]`, scale factors relative to 1 on top of the setup scale.
///
/// The target is `setup + value - 1`, not `setup + value`: a key of 1 holds the
/// setup scale, matching how exported scale keys are authored.
#[derive(Clone, Debug)]
pub struct ScaleTimeline {
    pub bone_index: usize,
    frames: Vec<f32>,
    curve: Curve,
}

impl ScaleTimeline {
    pub fn new(bone_index: usize, frame_count: usize) -> Self {
        Self {
            bone_index,
            frames: vec![0.0; frame_count * XY_STRIDE],
            curve: Curve::new(frame_count),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len() / XY_STRIDE
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn curve_mut(&mut self) -> &mut Curve {
        &mut self.curve
    }

    pub fn set_frame(&mut self, index: usize, time: f32, x: f32, y: f32) {
        debug_assert!(index < self.frame_count(), "scale frame out of range");
        let i = index * XY_STRIDE;
        self.frames[i] = time;
        self.frames[i + 1] = x;
        self.frames[i + 2] = y;
    }

    pub fn duration(&self) -> f32 {
        last_time(&self.frames, XY_STRIDE)
    }

    pub fn apply(&self, skeleton: &mut Skeleton, time: f32, alpha: f32) {
        let Some((x, y)) = sample_xy(&self.frames, &self.curve, time) else {
            return;
        };
        let bone = skeleton.bone_mut(self.bone_index);
        let (setup_x, setup_y) = (bone.data().scale_x, bone.data().scale_y);
        bone.scale_x += (setup_x - 1.0 + x - bone.scale_x) * alpha;
        bone.scale_y += (setup_y - 1.0 + y - bone.scale_y) * alpha;
    }
}

// ----- Color -----

/// Keyframes `[time, r, g, b, a]` for a slot tint.
#[derive(Clone, Debug)]
pub struct ColorTimeline {
    pub slot_index: usize,
    frames: Vec<f32>,
    curve: Curve,
}

impl ColorTimeline {
    pub fn new(slot_index: usize, frame_count: usize) -> Self {
        Self {
            slot_index,
            frames: vec![0.0; frame_count * COLOR_STRIDE],
            curve: Curve::new(frame_count),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len() / COLOR_STRIDE
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn curve_mut(&mut self) -> &mut Curve {
        &mut self.curve
    }

    pub fn set_frame(&mut self, index: usize, time: f32, color: Color) {
        debug_assert!(index < self.frame_count(), "color frame out of range");
        let i = index * COLOR_STRIDE;
        self.frames[i] = time;
        self.frames[i + 1] = color.r;
        self.frames[i + 2] = color.g;
        self.frames[i + 3] = color.b;
        self.frames[i + 4] = color.a;
    }

    pub fn duration(&self) -> f32 {
        last_time(&self.frames, COLOR_STRIDE)
    }

    fn rgba_at(&self, offset: usize) -> [f32; 4] {
        let f = &self.frames;
        [f[offset], f[offset + 1], f[offset + 2], f[offset + 3]]
    }

    pub fn apply(&self, skeleton: &mut Skeleton, time: f32, alpha: f32) {
        let frames = &self.frames;
        if frames.is_empty() || time < frames[0] {
            return;
        }

        let target = if time >= last_time(frames, COLOR_STRIDE) {
            self.rgba_at(frames.len() - 4)
        } else {
            let frame = binary_search(frames, time, COLOR_STRIDE);
            let percent = segment_percent(frames, &self.curve, frame, COLOR_STRIDE, time);
            lerp_vec4(self.rgba_at(frame - 4), self.rgba_at(frame + 1), percent)
        };

        let slot = skeleton.slot_mut(self.slot_index);
        if alpha < 1.0 {
            slot.color = Color::from_array(lerp_vec4(slot.color.to_array(), target, alpha));
        } else {
            slot.color = Color::from_array(target);
        }
    }
}

// ----- Attachment switch -----

/// Keyframes `time` with the attachment name to show from that time on
/// (`None` clears the slot). Not blended: `alpha` is ignored.
#[derive(Clone, Debug)]
pub struct AttachmentTimeline {
    pub slot_index: usize,
    frames: Vec<f32>,
    names: Vec<Option<String>>,
}

impl AttachmentTimeline {
    pub fn new(slot_index: usize, frame_count: usize) -> Self {
        Self {
            slot_index,
            frames: vec![0.0; frame_count],
            names: vec![None; frame_count],
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    /// An empty name is stored as `None`.
    pub fn set_frame(&mut self, index: usize, time: f32, name: Option<&str>) {
        debug_assert!(index < self.frame_count(), "attachment frame out of range");
        self.frames[index] = time;
        self.names[index] = name.filter(|n| !n.is_empty()).map(str::to_string);
    }

    pub fn duration(&self) -> f32 {
        last_time(&self.frames, 1)
    }

    pub fn apply(&self, skeleton: &mut Skeleton, time: f32, _alpha: f32) {
        let frames = &self.frames;
        if frames.is_empty() || time < frames[0] {
            return;
        }

        let frame = if time >= last_time(frames, 1) {
            // Several keys may share the last time; the latest one wins.
            frames.len() - 1
        } else {
            binary_search(frames, time, 1) - 1
        };

        let attachment = self.names[frame].as_deref().and_then(|name| {
            let found = skeleton.attachment_by_slot_index(self.slot_index, name);
            if found.is_none() {
                log::trace!("slot {}: attachment '{}' not in any skin", self.slot_index, name);
            }
            found
        });
        let now = skeleton.time();
        skeleton.slot_mut(self.slot_index).set_attachment(attachment, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_search_brackets_target() {
        // stride 2: times 0, 1, 2.5, 4, 7
        let frames = [0.0, 9.0, 1.0, 9.0, 2.5, 9.0, 4.0, 9.0, 7.0, 9.0];
        let times: Vec<f32> = frames.iter().step_by(2).copied().collect();
        let mut t = 0.0;
        while t < 7.0 {
            let offset = binary_search(&frames, t, 2);
            assert_eq!(offset % 2, 0);
            let k = offset / 2;
            assert!(k >= 1 && k < times.len(), "t={t} k={k}");
            assert!(times[k - 1] <= t && t < times[k], "t={t} k={k}");
            t += 0.125;
        }
    }

    #[test]
    fn binary_search_single_interval() {
        let frames = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(binary_search(&frames, 0.5, 3), 3);
    }

    #[test]
    fn binary_search_stride_one() {
        let frames = [0.0, 0.5, 1.0, 1.5];
        assert_eq!(binary_search(&frames, 0.0, 1), 1);
        assert_eq!(binary_search(&frames, 0.5, 1), 2);
        assert_eq!(binary_search(&frames, 1.2, 1), 3);
    }
}
