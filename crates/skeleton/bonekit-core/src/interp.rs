//! Interpolation helpers shared by the timelines.

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ]
}

/// Wrap a rotation delta (degrees) onto the shortest arc, result in (-180, 180].
#[inline]
pub fn wrap_degrees(mut amount: f32) -> f32 {
    while amount > 180.0 {
        amount -= 360.0;
    }
    while amount < -180.0 {
        amount += 360.0;
    }
    // -180 is the same direction as 180; keep the half-open range.
    if amount == -180.0 {
        amount = 180.0;
    }
    amount
}
