//! Interactive driver for the cube.
//!
//! Owns the cube state, camera, slice selection and the in-flight turn, and
//! pushes everything the renderer needs through a [`RenderBackend`]. One move
//! animates at a time; the lattice itself only changes when the animation
//! finishes.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::camera::CameraController;
use crate::config::Config;
use crate::cube::{CubeSnapshot, CubeState, Direction, Move, Slice};
use crate::error::MoveError;
use crate::math::Axis;

/// Receives cube snapshots and per-frame parameters.
pub(crate) trait RenderBackend {
    /// Full upload of every cubelet position and orientation.
    fn upload_state(&mut self, snapshot: &CubeSnapshot);
    /// Per-frame parameters.
    fn update_uniforms(&mut self, uniforms: &FrameUniforms);
}

/// Values that change every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FrameUniforms {
    /// Seconds since startup
    pub(crate) time: f32,
    /// Camera rotation around the vertical axis in radians
    pub(crate) cam_yaw: f32,
    /// Camera elevation in radians
    pub(crate) cam_pitch: f32,
    /// Distance from the camera to the target center
    pub(crate) cam_distance: f32,
    /// Selected axis and slice
    pub(crate) selection: [f32; 2],
    /// Interpolated turn angle in radians, 0 when idle
    pub(crate) anim_angle: f32,
    /// Axis of the turning slice, 0 when idle
    pub(crate) anim_axis: i32,
    /// Index of the turning slice, 0 when idle
    pub(crate) anim_slice: i32,
    /// Spread factor between cubelets, exactly 1 when idle
    pub(crate) expansion: f32,
    /// Point the camera orbits around
    pub(crate) target_center: [f32; 3],
}

/// Slice the next move will turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Selection {
    pub(crate) axis: Axis,
    pub(crate) slice: Slice,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            axis: Axis::X,
            slice: Slice::POSITIVE,
        }
    }
}

/// The move currently being animated.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Animation {
    /// Move applied to the cube once the animation ends
    mv: Move,
    /// Clock time the move was triggered at, in seconds
    start_time: f32,
}

/// Interactive cube session driving a [`RenderBackend`].
pub(crate) struct Driver<B> {
    /// Cube lattice, only changed when a turn completes
    cube: CubeState,
    /// Orbit camera
    camera: CameraController,
    /// Slice the next turn applies to
    selection: Selection,
    /// In-flight turn, if any
    animation: Option<Animation>,
    /// Seconds a turn takes
    animation_duration: f32,
    /// Extra spread between cubelets at the middle of a turn
    expansion_peak: f32,
    /// Receives snapshots and per-frame uniforms
    backend: B,
}

impl<B: RenderBackend> Driver<B> {
    /// Creates a solved cube and uploads it to `backend`.
    pub(crate) fn new(config: &Config, mut backend: B) -> Self {
        let cube = CubeState::new();
        log::debug!(
            "Center cubelet {} at {:?}",
            cube.target_center_index(),
            cube.target_center_position(),
        );
        backend.upload_state(&cube.snapshot());

        Self {
            cube,
            camera: CameraController::new(config),
            selection: Selection::default(),
            animation: None,
            animation_duration: config.animation_duration,
            expansion_peak: config.expansion_peak,
            backend,
        }
    }

    #[cfg(test)]
    pub(crate) fn cube(&self) -> &CubeState {
        &self.cube
    }

    pub(crate) fn selection(&self) -> Selection {
        self.selection
    }

    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Steps the selected axis. Ignored while a turn is animating.
    pub(crate) fn cycle_axis(&mut self, step: i32) -> bool {
        if self.ignore_while_animating("axis change") {
            return false;
        }
        self.selection.axis = self.selection.axis.cycled(step);
        log::debug!("Selected axis {:?}", self.selection.axis);
        true
    }

    /// Steps the selected slice, skipping the middle one. Ignored while a
    /// turn is animating.
    pub(crate) fn cycle_slice(&mut self, step: i32) -> bool {
        if self.ignore_while_animating("slice change") {
            return false;
        }
        self.selection.slice = self.selection.slice.stepped(step);
        log::debug!("Selected slice {}", self.selection.slice.index());
        true
    }

    /// Starts turning the selected slice.
    pub(crate) fn trigger_move(&mut self, direction: Direction, now: f32) -> bool {
        let Selection { axis, slice } = self.selection;
        match self.start_move(axis.index(), slice.index(), direction.index(), now) {
            Ok(started) => started,
            Err(err) => {
                log::error!("Selected move rejected: {err}");
                false
            }
        }
    }

    /// Validates the raw move parameters and starts animating the move. Any
    /// slice is accepted, including the middle one. Returns `Ok(false)` if
    /// another move is still in flight.
    pub(crate) fn start_move(
        &mut self,
        axis: usize,
        slice: i32,
        direction: i32,
        now: f32,
    ) -> Result<bool, MoveError> {
        let mv = Move::new(axis, slice, direction)?;
        if self.ignore_while_animating("move") {
            return Ok(false);
        }
        log::debug!("Starting {mv:?} at {now:.3}s");
        self.animation = Some(Animation {
            mv,
            start_time: now,
        });
        Ok(true)
    }

    pub(crate) fn drag_camera(&mut self, delta_x: f32, delta_y: f32) {
        self.camera.process_mouse_motion(delta_x, delta_y);
    }

    pub(crate) fn zoom_camera(&mut self, delta: f32) {
        self.camera.process_scroll(delta);
    }

    /// Advances the animation to `now` and pushes this frame's parameters to
    /// the backend. A finished turn is applied to the cube and the whole
    /// snapshot re-uploaded before the parameters are computed.
    pub(crate) fn frame(&mut self, now: f32) -> FrameUniforms {
        let mut anim_angle = 0.0;
        if let Some(animation) = self.animation {
            let elapsed = now - animation.start_time;
            if elapsed >= self.animation_duration {
                self.finish(animation.mv);
            } else {
                // A tick stamped before the trigger can arrive after it.
                let t = (elapsed / self.animation_duration).max(0.0);
                anim_angle = FRAC_PI_2 * animation.mv.direction.sign() * t;
            }
        }

        let (expansion, anim_axis, anim_slice) = match self.animation {
            Some(animation) => {
                let progress =
                    ((now - animation.start_time) / self.animation_duration).clamp(0.0, 1.0);
                (
                    1.0 + (progress * PI).sin() * self.expansion_peak,
                    animation.mv.axis.index() as i32,
                    animation.mv.slice.index(),
                )
            }
            None => (1.0, 0, 0),
        };

        let uniforms = FrameUniforms {
            time: now,
            cam_yaw: self.camera.yaw,
            cam_pitch: self.camera.pitch,
            cam_distance: self.camera.distance,
            selection: [
                self.selection.axis.index() as f32,
                self.selection.slice.index() as f32,
            ],
            anim_angle,
            anim_axis,
            anim_slice,
            expansion,
            target_center: self.cube.target_center_position().into(),
        };
        self.backend.update_uniforms(&uniforms);
        uniforms
    }

    fn finish(&mut self, mv: Move) {
        self.animation = None;
        let axis = mv.axis.index();
        let slice = mv.slice.index();
        if let Err(err) = self.cube.apply_rotation(axis, slice, mv.direction.index()) {
            log::error!("Dropping finished turn: {err}");
            return;
        }
        self.backend.upload_state(&self.cube.snapshot());
        log::info!("Turned {:?} slice {slice} {:?}", mv.axis, mv.direction);
    }

    fn ignore_while_animating(&self, what: &str) -> bool {
        if self.animation.is_some() {
            log::trace!("Ignoring {what} while a turn is animating");
        }
        self.animation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use approx::assert_abs_diff_eq;

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingBackend {
        uploads: Vec<CubeSnapshot>,
        uniforms: Vec<FrameUniforms>,
    }

    impl RenderBackend for RecordingBackend {
        fn upload_state(&mut self, snapshot: &CubeSnapshot) {
            self.uploads.push(snapshot.clone());
        }

        fn update_uniforms(&mut self, uniforms: &FrameUniforms) {
            self.uniforms.push(*uniforms);
        }
    }

    fn driver() -> Driver<RecordingBackend> {
        Driver::new(&Config::default(), RecordingBackend::default())
    }

    #[test]
    fn test_initial_upload() {
        let driver = driver();
        assert_eq!(driver.backend().uploads.len(), 1);
        assert_eq!(driver.backend().uploads[0], CubeState::new().snapshot());
        assert_eq!(driver.selection(), Selection::default());
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_idle_frame() {
        let mut driver = driver();
        let uniforms = driver.frame(3.0);
        assert_eq!(uniforms.time, 3.0);
        assert_eq!(uniforms.anim_angle, 0.0);
        assert_eq!(uniforms.expansion, 1.0);
        assert_eq!(uniforms.selection, [0.0, 1.0]);
        assert_eq!(uniforms.target_center, [0.0, 0.0, 0.0]);
        assert_eq!(driver.backend().uniforms, vec![uniforms]);
    }

    #[test]
    fn test_slice_cycling_skips_middle() {
        let mut driver = driver();
        assert_eq!(driver.selection().slice, Slice::POSITIVE);

        assert!(driver.cycle_slice(1));
        assert_eq!(driver.selection().slice, Slice::NEGATIVE);
        assert!(driver.cycle_slice(-1));
        assert_eq!(driver.selection().slice, Slice::POSITIVE);
        assert!(driver.cycle_slice(-1));
        assert_eq!(driver.selection().slice, Slice::NEGATIVE);
        assert!(driver.cycle_slice(1));
        assert_eq!(driver.selection().slice, Slice::POSITIVE);
    }

    #[test]
    fn test_axis_cycling() {
        let mut driver = driver();
        driver.cycle_axis(-1);
        assert_eq!(driver.selection().axis, Axis::Z);
        driver.cycle_axis(1);
        driver.cycle_axis(1);
        assert_eq!(driver.selection().axis, Axis::Y);
    }

    #[test]
    fn test_animation_progress_and_completion() {
        let mut driver = driver();
        driver.cycle_axis(-1); // Z
        assert!(driver.trigger_move(Direction::Clockwise, 10.0));

        let start = driver.frame(10.0);
        assert_eq!(start.anim_angle, 0.0);
        assert_eq!(start.expansion, 1.0);
        assert_eq!((start.anim_axis, start.anim_slice), (2, 1));

        let half = driver.frame(10.2);
        assert_abs_diff_eq!(half.anim_angle, FRAC_PI_4, epsilon = 1e-4);
        assert_abs_diff_eq!(half.expansion, 3.8, epsilon = 1e-3);
        assert_eq!(driver.backend().uploads.len(), 1);
        assert_eq!(driver.cube(), &CubeState::new());

        let done = driver.frame(10.5);
        assert_eq!(done.anim_angle, 0.0);
        assert_eq!(done.expansion, 1.0);
        assert!(!driver.is_animating());
        assert_eq!(driver.backend().uploads.len(), 2);

        let mut expected = CubeState::new();
        expected.apply_rotation(2, 1, 1).unwrap();
        assert_eq!(driver.cube(), &expected);
        assert_eq!(driver.backend().uploads[1], expected.snapshot());

        driver.frame(11.0);
        driver.frame(12.0);
        assert_eq!(driver.backend().uploads.len(), 2);
        assert_eq!(driver.cube(), &expected);
    }

    #[test]
    fn test_reverse_direction_angle() {
        let mut driver = driver();
        driver.trigger_move(Direction::CounterClockwise, 0.0);
        let half = driver.frame(0.2);
        assert_abs_diff_eq!(half.anim_angle, -FRAC_PI_4, epsilon = 1e-4);
    }

    #[test]
    fn test_input_ignored_while_animating() {
        let mut driver = driver();
        driver.trigger_move(Direction::Clockwise, 0.0);
        let selection = driver.selection();

        assert!(!driver.cycle_axis(1));
        assert!(!driver.cycle_slice(1));
        assert!(!driver.trigger_move(Direction::CounterClockwise, 0.1));
        assert_eq!(driver.selection(), selection);

        driver.frame(0.5);
        assert_eq!(driver.backend().uploads.len(), 2);
        assert!(driver.cycle_axis(1));
    }

    #[test]
    fn test_camera_drag_during_animation() {
        let mut driver = driver();
        driver.trigger_move(Direction::Clockwise, 0.0);
        driver.drag_camera(10.0, 5.0);
        let uniforms = driver.frame(0.1);
        assert_abs_diff_eq!(uniforms.cam_yaw, 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(uniforms.cam_pitch, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_middle_slice_only_programmatically() {
        let mut driver = driver();
        assert_eq!(driver.start_move(1, 0, 1, 0.0), Ok(true));
        driver.frame(0.4);
        assert!(!driver.is_animating());

        let mut expected = CubeState::new();
        expected.apply_rotation(1, 0, 1).unwrap();
        assert_eq!(driver.cube(), &expected);
    }

    #[test]
    fn test_invalid_start_move_is_rejected() {
        let mut driver = driver();
        assert_eq!(driver.start_move(3, 1, 1, 0.0), Err(MoveError::Axis(3)));
        assert_eq!(driver.start_move(0, 2, 1, 0.0), Err(MoveError::Slice(2)));
        assert_eq!(driver.start_move(0, 1, 0, 0.0), Err(MoveError::Direction(0)));
        assert!(!driver.is_animating());

        driver.frame(1.0);
        assert_eq!(driver.backend().uploads.len(), 1);
        assert_eq!(driver.cube(), &CubeState::new());

        assert_eq!(driver.start_move(0, -1, -1, 1.0), Ok(true));
        assert_eq!(driver.start_move(1, 1, 1, 1.1), Ok(false));
    }

    #[test]
    fn test_tick_before_trigger_does_not_turn_backwards() {
        let mut driver = driver();
        driver.trigger_move(Direction::Clockwise, 1.0);

        let early = driver.frame(0.99);
        assert_eq!(early.anim_angle, 0.0);
        assert_eq!(early.expansion, 1.0);
        assert!(driver.is_animating());

        let later = driver.frame(1.1);
        assert!(later.anim_angle > 0.0);
    }
}
