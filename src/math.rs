//! Lattice math for slice turns: axis bookkeeping, the 2D quarter-turn
//! routine and snapping back onto the integer grid.

use nalgebra::Vector3;

/// 3-dimensional axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Axis {
    /// X axis (right).
    X = 0,
    /// Y axis (up).
    Y = 1,
    /// Z axis (towards the camera).
    Z = 2,
}

impl Axis {
    pub(crate) const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis in a position or orientation row.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Returns the two component indices spanning the plane perpendicular to
    /// this axis, in cyclic order. Rotating from the first towards the second
    /// is a right-handed rotation about `self`; this ordering is what gives the
    /// Y axis its transposed sign pattern relative to X and Z.
    pub(crate) fn perpendiculars(self) -> [usize; 2] {
        match self {
            Axis::X => [1, 2], // X+ => rotate from Y+ to Z+.
            Axis::Y => [2, 0], // Y+ => rotate from Z+ to X+.
            Axis::Z => [0, 1], // Z+ => rotate from X+ to Y+.
        }
    }

    /// Steps `step` places through X, Y, Z, wrapping in both directions.
    pub(crate) fn cycled(self, step: i32) -> Self {
        Self::ALL[(self.index() as i32 + step).rem_euclid(3) as usize]
    }
}

impl TryFrom<usize> for Axis {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::ALL.get(value).copied().ok_or(value)
    }
}

/// Sine and cosine of a quarter-turn angle, computed once per move.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct QuarterTurn {
    cos: f32,
    sin: f32,
}

impl QuarterTurn {
    /// `angle` is measured clockwise looking down the positive axis.
    pub(crate) fn from_angle(angle: f32) -> Self {
        Self {
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }

    /// Rotates the two components of `v` perpendicular to `axis`. The axis
    /// component is left as is.
    pub(crate) fn rotate(self, axis: Axis, v: &mut Vector3<f32>) {
        let [a, b] = axis.perpendiculars();
        let (va, vb) = (v[a], v[b]);
        v[a] = va * self.cos + vb * self.sin;
        v[b] = -va * self.sin + vb * self.cos;
    }
}

/// Rounds to the nearest integer, folding negative zero into zero.
pub(crate) fn snap(value: f32) -> f32 {
    let rounded = value.round();
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Snaps every component of `v` onto the integer lattice.
pub(crate) fn snap_vector(v: &mut Vector3<f32>) {
    v.apply(|c| *c = snap(*c));
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_axis_cycling_wraps_both_ways() {
        assert_eq!(Axis::X.cycled(1), Axis::Y);
        assert_eq!(Axis::Z.cycled(1), Axis::X);
        assert_eq!(Axis::X.cycled(-1), Axis::Z);
        assert_eq!(Axis::Y.cycled(-4), Axis::X);
    }

    #[test]
    fn test_axis_try_from() {
        assert_eq!(Axis::try_from(1), Ok(Axis::Y));
        assert_eq!(Axis::try_from(3), Err(3));
    }

    #[test]
    fn test_perpendiculars_are_right_handed() {
        for axis in Axis::ALL {
            let [a, b] = axis.perpendiculars();
            let mut ea = Vector3::zeros();
            let mut eb = Vector3::zeros();
            ea[a] = 1.0;
            eb[b] = 1.0;
            let mut axis_vec = Vector3::zeros();
            axis_vec[axis.index()] = 1.0;
            assert_eq!(ea.cross(&eb), axis_vec);
        }
    }

    #[test]
    fn test_clockwise_quarter_turn_about_z() {
        let turn = QuarterTurn::from_angle(-FRAC_PI_2);
        let mut v = Vector3::new(1.0, -1.0, 1.0);
        turn.rotate(Axis::Z, &mut v);
        snap_vector(&mut v);
        assert_eq!(v, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_rotate_leaves_axis_component() {
        let turn = QuarterTurn::from_angle(FRAC_PI_2);
        for axis in Axis::ALL {
            let mut v = Vector3::new(1.0, -1.0, 0.0);
            let before = v[axis.index()];
            turn.rotate(axis, &mut v);
            assert_eq!(v[axis.index()], before);
        }
    }

    #[test]
    fn test_snap_folds_negative_zero() {
        let snapped = snap(-1e-7);
        assert_eq!(snapped, 0.0);
        assert!(snapped.is_sign_positive());
        assert_eq!(snap(0.9999), 1.0);
        assert_eq!(snap(-1.00001), -1.0);
    }
}
