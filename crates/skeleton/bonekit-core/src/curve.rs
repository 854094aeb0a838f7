//! Per-segment easing between two keyframes.
//!
//! Each segment stores 6 floats. The first doubles as a sentinel:
//! - `0.0`  linear
//! - `-1.0` stepped (hold the left keyframe until the next one)
//! - otherwise the forward-difference deltas `dfx, dfy, ddfx, ddfy, dddfx, dddfy`
//!   of a cubic Bezier from (0,0) to (1,1), sampled at 10 uniform steps.

const LINEAR: f32 = 0.0;
const STEPPED: f32 = -1.0;
const SEGMENTS: usize = 10;
const STRIDE: usize = 6;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    curves: Vec<f32>,
}

impl Curve {
    /// Curve set for `frame_count` keyframes (`frame_count - 1` segments), all linear.
    pub fn new(frame_count: usize) -> Self {
        let segments = frame_count.saturating_sub(1);
        Self {
            curves: vec![LINEAR; segments * STRIDE],
        }
    }

    pub fn segment_count(&self) -> usize {
        self.curves.len() / STRIDE
    }

    pub fn set_linear(&mut self, segment: usize) {
        debug_assert!(segment < self.segment_count(), "curve segment out of range");
        self.curves[segment * STRIDE] = LINEAR;
    }

    pub fn set_stepped(&mut self, segment: usize) {
        debug_assert!(segment < self.segment_count(), "curve segment out of range");
        self.curves[segment * STRIDE] = STEPPED;
    }

    pub fn is_stepped(&self, segment: usize) -> bool {
        self.curves[segment * STRIDE] == STEPPED
    }

    pub fn is_linear(&self, segment: usize) -> bool {
        self.curves[segment * STRIDE] == LINEAR
    }

    /// Store a cubic Bezier with control points (cx1, cy1) and (cx2, cy2); the
    /// end points are fixed at (0,0) and (1,1).
    pub fn set_curve(&mut self, segment: usize, cx1: f32, cy1: f32, cx2: f32, cy2: f32) {
        debug_assert!(segment < self.segment_count(), "curve segment out of range");
        let subdiv_step = 1.0 / SEGMENTS as f32;
        let subdiv_step2 = subdiv_step * subdiv_step;
        let subdiv_step3 = subdiv_step2 * subdiv_step;
        let pre1 = 3.0 * subdiv_step;
        let pre2 = 3.0 * subdiv_step2;
        let pre4 = 6.0 * subdiv_step2;
        let pre5 = 6.0 * subdiv_step3;
        let tmp1x = -cx1 * 2.0 + cx2;
        let tmp1y = -cy1 * 2.0 + cy2;
        let tmp2x = (cx1 - cx2) * 3.0 + 1.0;
        let tmp2y = (cy1 - cy2) * 3.0 + 1.0;

        let i = segment * STRIDE;
        self.curves[i] = cx1 * pre1 + tmp1x * pre2 + tmp2x * subdiv_step3;
        self.curves[i + 1] = cy1 * pre1 + tmp1y * pre2 + tmp2y * subdiv_step3;
        self.curves[i + 2] = tmp1x * pre4 + tmp2x * pre5;
        self.curves[i + 3] = tmp1y * pre4 + tmp2y * pre5;
        self.curves[i + 4] = tmp2x * pre5;
        self.curves[i + 5] = tmp2y * pre5;
    }

    /// Remap a linear percent within `segment` to the eased percent.
    pub fn percent(&self, segment: usize, percent: f32) -> f32 {
        let percent = percent.clamp(0.0, 1.0);
        let i = segment * STRIDE;
        let mut dfx = self.curves[i];
        if dfx == LINEAR {
            return percent;
        }
        if dfx == STEPPED {
            return 0.0;
        }
        let mut dfy = self.curves[i + 1];
        let mut ddfx = self.curves[i + 2];
        let mut ddfy = self.curves[i + 3];
        let dddfx = self.curves[i + 4];
        let dddfy = self.curves[i + 5];

        let mut x = dfx;
        let mut y = dfy;
        let mut remaining = SEGMENTS - 2;
        loop {
            if x >= percent {
                let last_x = x - dfx;
                let last_y = y - dfy;
                return last_y + (y - last_y) * (percent - last_x) / (x - last_x);
            }
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            dfx += ddfx;
            dfy += ddfy;
            ddfx += dddfx;
            ddfy += dddfy;
            x += dfx;
            y += dfy;
        }
        // Last point is (1, 1).
        y + (1.0 - y) * (percent - x) / (1.0 - x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn linear_is_identity() {
        let c = Curve::new(2);
        for k in 0..=10 {
            let p = k as f32 / 10.0;
            assert_eq!(c.percent(0, p), p);
        }
    }

    #[test]
    fn stepped_holds_start() {
        let mut c = Curve::new(3);
        c.set_stepped(1);
        assert!(c.is_stepped(1));
        assert!(c.is_linear(0));
        for k in 0..10 {
            assert_eq!(c.percent(1, k as f32 / 10.0), 0.0);
        }
    }

    #[test]
    fn bezier_boundaries() {
        let mut c = Curve::new(2);
        c.set_curve(0, 0.25, 0.1, 0.25, 1.0);
        approx(c.percent(0, 0.0), 0.0, 1e-6);
        approx(c.percent(0, 1.0), 1.0, 1e-5);
        // clamped
        approx(c.percent(0, -0.5), 0.0, 1e-6);
        approx(c.percent(0, 1.5), 1.0, 1e-5);
    }

    #[test]
    fn bezier_with_linear_controls_is_near_identity() {
        let mut c = Curve::new(2);
        c.set_curve(0, 1.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0);
        for k in 0..=20 {
            let p = k as f32 / 20.0;
            approx(c.percent(0, p), p, 1e-3);
        }
    }

    #[test]
    fn ease_in_is_below_diagonal_and_monotonic() {
        let mut c = Curve::new(2);
        c.set_curve(0, 0.42, 0.0, 1.0, 1.0);
        let mut last = 0.0;
        for k in 1..20 {
            let p = k as f32 / 20.0;
            let v = c.percent(0, p);
            assert!(v < p, "p={p} v={v}");
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn segments_are_independent() {
        let mut c = Curve::new(4);
        assert_eq!(c.segment_count(), 3);
        c.set_curve(1, 0.42, 0.0, 1.0, 1.0);
        assert_eq!(c.percent(0, 0.5), 0.5);
        assert!(c.percent(1, 0.5) < 0.5);
        assert_eq!(c.percent(2, 0.5), 0.5);
    }
}
