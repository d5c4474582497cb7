/// Number of distinct 14-bit angle values
pub const ANGLE_STEPS: u16 = 0x3FFF + 1;

/// Convert a raw 14-bit angle to degrees in `[0, 360)`
#[must_use]
pub fn raw_to_degrees(raw: u16) -> f32 {
    f32::from(raw & 0x3FFF) * 360.0 / f32::from(ANGLE_STEPS)
}

/// Reference `raw` against `null` and wrap the delta into `(-180, 180]`.
///
/// Both inputs are in `[0, 360)`, so the delta is in `(-360, 360)` and a
/// single wrap is enough.
#[must_use]
pub fn wrap_delta(raw: f32, null: f32) -> f32 {
    let delta = raw - null;
    if delta > 180.0 {
        delta - 360.0
    } else if delta <= -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(x: f32) -> f32 {
        if x < 0.0 { -x } else { x }
    }

    #[test]
    fn wraps_across_zero() {
        assert!(abs(wrap_delta(10.0, 350.0) - 20.0) < 1e-4);
        assert!(abs(wrap_delta(5.0, 10.0) + 5.0) < 1e-4);
        assert!(abs(wrap_delta(350.0, 10.0) + 20.0) < 1e-4);
    }

    #[test]
    fn half_turn_maps_to_positive_bound() {
        assert!(abs(wrap_delta(180.0, 0.0) - 180.0) < 1e-4);
        assert!(abs(wrap_delta(0.0, 180.0) - 180.0) < 1e-4);
    }

    #[test]
    fn wrapped_delta_stays_congruent_and_in_range() {
        let mut raw = 0.0_f32;
        while raw < 360.0 {
            let mut null = 0.0_f32;
            while null < 360.0 {
                let w = wrap_delta(raw, null);
                assert!(w > -180.0 && w <= 180.0, "{raw} - {null} -> {w}");
                let diff = w - (raw - null);
                assert!(
                    [-360.0, 0.0, 360.0].iter().any(|turn| abs(diff - turn) < 1e-3),
                    "{raw} - {null} -> {w}"
                );
                null += 7.5;
            }
            raw += 5.25;
        }
    }

    #[test]
    fn converts_raw_angle() {
        assert!(abs(raw_to_degrees(0)) < f32::EPSILON);
        assert!(abs(raw_to_degrees(0x2000) - 180.0) < 1e-4);
        assert!(raw_to_degrees(0x3FFF) < 360.0);
    }
}
