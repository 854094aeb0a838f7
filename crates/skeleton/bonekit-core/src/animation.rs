//! Animation: named set of timelines sharing one duration.

use crate::skeleton::Skeleton;
use crate::timeline::Timeline;

#[derive(Clone, Debug)]
pub struct Animation {
    name: String,
    timelines: Vec<Timeline>,
    duration: f32,
}

impl Animation {
    /// Duration is the latest keyframe time across all timelines.
    pub fn new(name: impl Into<String>, timelines: Vec<Timeline>) -> Self {
        let duration = timelines
            .iter()
            .map(Timeline::duration)
            .fold(0.0f32, f32::max);
        Self {
            name: name.into(),
            timelines,
            duration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    /// Pose the skeleton at `time` with full weight.
    pub fn apply(&self, skeleton: &mut Skeleton, time: f32, looped: bool) {
        self.mix(skeleton, time, looped, 1.0);
    }

    /// Pose the skeleton at `time`, blending every timeline by `alpha`.
    /// Cross-fading is done by the caller: mix two animations in the same
    /// frame with complementary alphas.
    pub fn mix(&self, skeleton: &mut Skeleton, time: f32, looped: bool, alpha: f32) {
        let time = self.local_time(time, looped);
        for timeline in &self.timelines {
            timeline.apply(skeleton, time, alpha);
        }
    }

    /// Time actually sampled: wrapped into `[0, duration)` when looping.
    pub fn local_time(&self, time: f32, looped: bool) -> f32 {
        if looped && self.duration > 0.0 {
            time.rem_euclid(self.duration)
        } else {
            time
        }
    }
}
