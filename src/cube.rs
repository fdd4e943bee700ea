//! 3x3x3 cube state and slice turns.
//!
//! The cube is a lattice of 27 cubelets. Each one carries a position on the
//! integer grid {-1, 0, 1}^3 and an orientation matrix whose rows track where
//! its local axes point. A move turns one slice by a quarter turn and snaps
//! everything it touched back onto the grid.

use std::f32::consts::FRAC_PI_2;

use nalgebra::{Matrix3, Vector3};

use crate::error::MoveError;
use crate::math::{Axis, QuarterTurn, snap_vector};

/// Number of cubelets in a 3x3x3 cube
pub(crate) const CUBELET_COUNT: usize = 27;

/// Index of the cubelet created at (0, 0, 0)
pub(crate) const CENTER_INDEX: usize = 13;

/// One planar layer perpendicular to an axis: -1, 0 or 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Slice(i8);

impl Slice {
    #[cfg(test)]
    pub(crate) const NEGATIVE: Slice = Slice(-1);
    #[cfg(test)]
    pub(crate) const MIDDLE: Slice = Slice(0);
    pub(crate) const POSITIVE: Slice = Slice(1);

    pub(crate) fn new(index: i32) -> Result<Self, MoveError> {
        match index {
            -1..=1 => Ok(Self(index as i8)),
            _ => Err(MoveError::Slice(index)),
        }
    }

    pub(crate) fn index(self) -> i32 {
        self.0 as i32
    }

    /// Steps to the other outer slice. The middle slice is never selected by
    /// stepping, so both directions land on the opposite face.
    pub(crate) fn stepped(self, step: i32) -> Self {
        if step == 0 {
            return self;
        }
        let mut index = self.index();
        for _ in 0..step.unsigned_abs() {
            index += step.signum();
            if index == 0 {
                index += step.signum();
            }
            if index > 1 {
                index = -1;
            } else if index < -1 {
                index = 1;
            }
        }
        Self(index as i8)
    }

    fn coordinate(self) -> f32 {
        self.0 as f32
    }
}

/// Rotation sense of a quarter turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Direction {
    /// Direction +1
    Clockwise,
    /// Direction -1
    CounterClockwise,
}

impl Direction {
    pub(crate) fn new(sign: i32) -> Result<Self, MoveError> {
        match sign {
            1 => Ok(Direction::Clockwise),
            -1 => Ok(Direction::CounterClockwise),
            _ => Err(MoveError::Direction(sign)),
        }
    }

    /// Raw direction value, +1 or -1.
    pub(crate) fn index(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    pub(crate) fn sign(self) -> f32 {
        self.index() as f32
    }

    pub(crate) fn rev(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// A validated quarter turn of one slice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Move {
    pub(crate) axis: Axis,
    pub(crate) slice: Slice,
    pub(crate) direction: Direction,
}

impl Move {
    /// Validates raw move parameters.
    pub(crate) fn new(axis: usize, slice: i32, direction: i32) -> Result<Self, MoveError> {
        Ok(Self {
            axis: Axis::try_from(axis).map_err(MoveError::Axis)?,
            slice: Slice::new(slice)?,
            direction: Direction::new(direction)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn inverse(self) -> Self {
        Self {
            direction: self.direction.rev(),
            ..self
        }
    }

    /// Turn angle in radians, measured clockwise looking down the axis.
    fn angle(self) -> f32 {
        -FRAC_PI_2 * self.direction.sign()
    }
}

/// Flat copy of the lattice handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CubeSnapshot {
    /// Position of each cubelet
    pub(crate) positions: [[f32; 3]; CUBELET_COUNT],
    /// Orientation of each cubelet, row by row
    pub(crate) orientations: [[[f32; 3]; 3]; CUBELET_COUNT],
}

/// The full cube: 27 positions and 27 orientations sharing one index.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CubeState {
    positions: [Vector3<f32>; CUBELET_COUNT],
    orientations: [Matrix3<f32>; CUBELET_COUNT],
    target_center_index: usize,
    target_center_position: Vector3<f32>,
}

impl CubeState {
    /// Creates a solved cube with every cubelet on its grid coordinate and an
    /// identity orientation.
    pub(crate) fn new() -> Self {
        let mut positions = [Vector3::zeros(); CUBELET_COUNT];
        let mut target_center_index = CENTER_INDEX;
        let mut i = 0;
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    positions[i] = Vector3::new(x as f32, y as f32, z as f32);
                    if (x, y, z) == (0, 0, 0) {
                        target_center_index = i;
                    }
                    i += 1;
                }
            }
        }

        Self {
            positions,
            orientations: [Matrix3::identity(); CUBELET_COUNT],
            target_center_index,
            target_center_position: positions[target_center_index],
        }
    }

    #[cfg(test)]
    pub(crate) fn positions(&self) -> &[Vector3<f32>; CUBELET_COUNT] {
        &self.positions
    }

    #[cfg(test)]
    pub(crate) fn orientations(&self) -> &[Matrix3<f32>; CUBELET_COUNT] {
        &self.orientations
    }

    pub(crate) fn target_center_index(&self) -> usize {
        self.target_center_index
    }

    /// Fixed reference point for the renderer. Never moves.
    pub(crate) fn target_center_position(&self) -> Vector3<f32> {
        self.target_center_position
    }

    /// Validates raw parameters and applies the move. Nothing is touched when
    /// validation fails.
    pub(crate) fn apply_rotation(
        &mut self,
        axis: usize,
        slice_index: i32,
        direction: i32,
    ) -> Result<(), MoveError> {
        let mv = Move::new(axis, slice_index, direction)?;
        self.apply_move(mv);
        Ok(())
    }

    /// Turns one slice by a quarter turn. Cubelets outside the slice are left
    /// bit-for-bit unchanged.
    fn apply_move(&mut self, mv: Move) {
        let turn = QuarterTurn::from_angle(mv.angle());
        let axis = mv.axis;
        let slice = mv.slice.coordinate();

        for (position, orientation) in self.positions.iter_mut().zip(&mut self.orientations) {
            // Positions are snapped after every move, so this is exact.
            if position[axis.index()] != slice {
                continue;
            }

            turn.rotate(axis, position);
            snap_vector(position);

            for r in 0..3 {
                let mut row: Vector3<f32> = orientation.row(r).transpose();
                turn.rotate(axis, &mut row);
                snap_vector(&mut row);
                orientation.set_row(r, &row.transpose());
            }
        }
    }

    /// Copies the lattice into flat buffers for upload.
    pub(crate) fn snapshot(&self) -> CubeSnapshot {
        let mut snapshot = CubeSnapshot {
            positions: [[0.0; 3]; CUBELET_COUNT],
            orientations: [[[0.0; 3]; 3]; CUBELET_COUNT],
        };
        for (i, (position, orientation)) in
            self.positions.iter().zip(&self.orientations).enumerate()
        {
            snapshot.positions[i] = (*position).into();
            for r in 0..3 {
                snapshot.orientations[i][r] = [
                    orientation[(r, 0)],
                    orientation[(r, 1)],
                    orientation[(r, 2)],
                ];
            }
        }
        snapshot
    }
}

impl Default for CubeState {
    fn default() -> Self {
        Self::new()
    }
}
