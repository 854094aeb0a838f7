//! Runtime bone: animatable local pose plus derived world transform.

use std::sync::Arc;

use crate::data::BoneData;

#[derive(Clone, Debug)]
pub struct Bone {
    data: Arc<BoneData>,
    /// Index of the parent inside the owning skeleton's bone array.
    parent: Option<usize>,

    pub x: f32,
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,

    m00: f32,
    m01: f32,
    m10: f32,
    m11: f32,
    world_x: f32,
    world_y: f32,
    world_rotation: f32,
    world_scale_x: f32,
    world_scale_y: f32,
}

impl Bone {
    pub fn new(data: Arc<BoneData>, parent: Option<usize>) -> Self {
        let mut bone = Self {
            data,
            parent,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            m00: 1.0,
            m01: 0.0,
            m10: 0.0,
            m11: 1.0,
            world_x: 0.0,
            world_y: 0.0,
            world_rotation: 0.0,
            world_scale_x: 1.0,
            world_scale_y: 1.0,
        };
        bone.set_to_setup_pose();
        bone
    }

    pub fn data(&self) -> &Arc<BoneData> {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Restore the local pose from the template.
    pub fn set_to_setup_pose(&mut self) {
        let data = &self.data;
        self.x = data.x;
        self.y = data.y;
        self.rotation = data.rotation;
        self.scale_x = data.scale_x;
        self.scale_y = data.scale_y;
    }

    /// Recompute world fields from the current local pose and the parent's
    /// already-updated world transform (`None` for a root bone).
    ///
    /// `y_down` is the skeleton's axis convention; it negates the second
    /// matrix row independently of `flip_y`.
    pub fn update_world_transform(
        &mut self,
        parent: Option<&Bone>,
        flip_x: bool,
        flip_y: bool,
        y_down: bool,
    ) {
        match parent {
            Some(p) => {
                self.world_x = self.x * p.m00 + self.y * p.m01 + p.world_x;
                self.world_y = self.x * p.m10 + self.y * p.m11 + p.world_y;
                self.world_scale_x = p.world_scale_x * self.scale_x;
                self.world_scale_y = p.world_scale_y * self.scale_y;
                self.world_rotation = p.world_rotation + self.rotation;
            }
            None => {
                self.world_x = self.x;
                self.world_y = self.y;
                self.world_scale_x = self.scale_x;
                self.world_scale_y = self.scale_y;
                self.world_rotation = self.rotation;
            }
        }

        let (sin, cos) = self.world_rotation.to_radians().sin_cos();
        self.m00 = cos * self.world_scale_x;
        self.m10 = sin * self.world_scale_x;
        self.m01 = -sin * self.world_scale_y;
        self.m11 = cos * self.world_scale_y;
        if flip_x {
            self.m00 = -self.m00;
            self.m01 = -self.m01;
        }
        if flip_y {
            self.m10 = -self.m10;
            self.m11 = -self.m11;
        }
        if y_down {
            self.m10 = -self.m10;
            self.m11 = -self.m11;
        }
    }

    /// World 2x2 linear map as `[m00, m01, m10, m11]`.
    pub fn matrix(&self) -> [f32; 4] {
        [self.m00, self.m01, self.m10, self.m11]
    }

    pub fn world_x(&self) -> f32 {
        self.world_x
    }

    pub fn world_y(&self) -> f32 {
        self.world_y
    }

    pub fn world_rotation(&self) -> f32 {
        self.world_rotation
    }

    pub fn world_scale_x(&self) -> f32 {
        self.world_scale_x
    }

    pub fn world_scale_y(&self) -> f32 {
        self.world_scale_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn bone(x: f32, y: f32, rotation: f32, scale: f32) -> Bone {
        let mut data = BoneData::new("b", None);
        data.x = x;
        data.y = y;
        data.rotation = rotation;
        data.scale_x = scale;
        data.scale_y = scale;
        Bone::new(Arc::new(data), None)
    }

    #[test]
    fn root_world_equals_local() {
        let mut b = bone(3.0, 4.0, 0.0, 2.0);
        b.update_world_transform(None, false, false, false);
        assert_eq!(b.world_x(), 3.0);
        assert_eq!(b.world_y(), 4.0);
        assert_eq!(b.matrix(), [2.0, -0.0, 0.0, 2.0]);
    }

    #[test]
    fn child_composes_with_parent() {
        let mut parent = bone(10.0, 0.0, 90.0, 1.0);
        parent.update_world_transform(None, false, false, false);
        let mut child = bone(5.0, 0.0, 0.0, 1.0);
        child.update_world_transform(Some(&parent), false, false, false);
        // parent rotated 90 degrees: child's +x maps to world +y
        approx(child.world_x(), 10.0, 1e-5);
        approx(child.world_y(), 5.0, 1e-5);
        approx(child.world_rotation(), 90.0, 1e-6);
    }

    #[test]
    fn flips_negate_matrix_rows() {
        let mut b = bone(0.0, 0.0, 30.0, 1.0);
        b.update_world_transform(None, false, false, false);
        let [m00, m01, m10, m11] = b.matrix();
        b.update_world_transform(None, true, false, false);
        assert_eq!(b.matrix(), [-m00, -m01, m10, m11]);
        b.update_world_transform(None, false, true, false);
        assert_eq!(b.matrix(), [m00, m01, -m10, -m11]);
        b.update_world_transform(None, false, false, true);
        assert_eq!(b.matrix(), [m00, m01, -m10, -m11]);
        // flip_y and y_down cancel out
        b.update_world_transform(None, false, true, true);
        assert_eq!(b.matrix(), [m00, m01, m10, m11]);
    }

    #[test]
    fn setup_pose_restores_template() {
        let mut b = bone(1.0, 2.0, 45.0, 1.5);
        b.x = 9.0;
        b.rotation = -10.0;
        b.scale_y = 0.1;
        b.set_to_setup_pose();
        assert_eq!((b.x, b.y, b.rotation, b.scale_x, b.scale_y), (1.0, 2.0, 45.0, 1.5, 1.5));
    }
}
