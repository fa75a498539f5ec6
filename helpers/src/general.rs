/// argmin returns the index of the minimum value in the array x. If several values are equal to
/// the minimum, the index of the first one is returned. Returns `None` for an empty array.
pub fn argmin<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> Option<usize> {
    let mut iter = x.iter().enumerate();
    let (mut idx_min, &first) = iter.next()?;
    let mut val_min = first;

    for (i, &val) in iter {
        if val < val_min {
            val_min = val;
            idx_min = i;
        }
    }

    Some(idx_min)
}

/// wrap_deg maps an angle in degrees onto the range [0, 360).
pub fn wrap_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);

    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// signed_angle_diff_deg returns the shortest signed rotation (in degrees) that turns `from` into
/// `to`. The result lies in (-180, 180]; positive values are counter-clockwise.
pub fn signed_angle_diff_deg(to: f64, from: f64) -> f64 {
    let diff = wrap_deg(to - from);

    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}
