use core::f32::consts::TAU;

/// One full turn in radians.
pub const FULL_TURN: f32 = TAU;

/// Signed sweep of an arc from `start` to `end`.
///
/// Positive spans turn clockwise on screen (increasing angle), negative spans
/// anticlockwise:
/// - clockwise with `end < start` wraps forward by a full turn;
/// - anticlockwise with `start < end` wraps backward by a full turn;
/// - otherwise the span is `end - start`.
///
/// A request covering a whole turn in the drawing direction (including
/// `end == start`) returns exactly `±FULL_TURN` so the arc renders as a closed
/// circle instead of collapsing to nothing. Differences larger than one turn
/// are reduced modulo a turn.
pub fn arc_span(start: f32, end: f32, anticlockwise: bool) -> f32 {
    let delta = end - start;
    if !delta.is_finite() {
        return 0.0;
    }

    if anticlockwise {
        if -delta >= FULL_TURN {
            return -FULL_TURN;
        }
        let sweep = (-delta).rem_euclid(FULL_TURN);
        if sweep == 0.0 { -FULL_TURN } else { -sweep }
    } else {
        if delta >= FULL_TURN {
            return FULL_TURN;
        }
        let sweep = delta.rem_euclid(FULL_TURN);
        if sweep == 0.0 { FULL_TURN } else { sweep }
    }
}

/// Number of line segments needed to keep the chord error of an arc of
/// device radius `radius` and sweep `span` below `tolerance`.
pub(crate) fn arc_segments(radius: f32, span: f32, tolerance: f32) -> usize {
    let span = span.abs();
    if span == 0.0 {
        return 0;
    }
    let step = if radius > tolerance {
        2.0 * (1.0 - tolerance / radius).acos()
    } else {
        core::f32::consts::FRAC_PI_2
    };
    ((span / step.max(1e-3)).ceil() as usize).clamp(1, 1024)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── regular spans ─────────────────────────────────────────────────────

    #[test]
    fn clockwise_forward_is_plain_difference() {
        assert!(approx(arc_span(0.0, PI / 2.0, false), PI / 2.0));
    }

    #[test]
    fn clockwise_backwards_wraps_forward() {
        assert!(approx(arc_span(PI / 2.0, 0.0, false), 1.5 * PI));
    }

    #[test]
    fn anticlockwise_forward_wraps_backward() {
        assert!(approx(arc_span(0.0, PI / 2.0, true), -1.5 * PI));
    }

    #[test]
    fn anticlockwise_backwards_is_plain_difference() {
        assert!(approx(arc_span(PI, 0.0, true), -PI));
    }

    // ── full circles ──────────────────────────────────────────────────────

    #[test]
    fn clockwise_equal_angles_is_full_turn() {
        assert_eq!(arc_span(1.0, 1.0, false), FULL_TURN);
    }

    #[test]
    fn anticlockwise_equal_angles_is_full_turn() {
        assert_eq!(arc_span(1.0, 1.0, true), -FULL_TURN);
    }

    #[test]
    fn sweep_beyond_a_turn_is_full_circle() {
        assert_eq!(arc_span(0.0, 3.0 * PI, false), FULL_TURN);
        assert_eq!(arc_span(3.0 * PI, 0.0, true), -FULL_TURN);
    }

    #[test]
    fn non_finite_angles_produce_no_sweep() {
        assert_eq!(arc_span(0.0, f32::NAN, false), 0.0);
    }

    // ── flattening ────────────────────────────────────────────────────────

    #[test]
    fn larger_radius_needs_more_segments() {
        let small = arc_segments(4.0, PI, 0.25);
        let large = arc_segments(400.0, PI, 0.25);
        assert!(small >= 1);
        assert!(large > small);
    }
}
