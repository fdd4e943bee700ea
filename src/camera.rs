use crate::config::Config;

const ZOOM_SENSITIVITY: f32 = 0.5;
const MIN_DISTANCE: f32 = 4.0;
const MAX_DISTANCE: f32 = 20.0;
/// Keeps the orbit from flipping over the poles.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Orbit camera around the cube, in radians. The raymarcher builds its view
/// ray from these angles directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CameraController {
    pub(crate) yaw: f32,
    pub(crate) pitch: f32,
    pub(crate) distance: f32,
    sensitivity: f32,
}

impl CameraController {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: config.camera_distance,
            sensitivity: config.drag_sensitivity,
        }
    }

    /// Pointer motion while the drag button is held.
    pub(crate) fn process_mouse_motion(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * self.sensitivity;
        self.pitch += delta_y * self.sensitivity;

        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub(crate) fn process_scroll(&mut self, delta: f32) {
        self.distance -= delta * ZOOM_SENSITIVITY;
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_drag_moves_yaw_and_pitch() {
        let mut camera = CameraController::new(&Config::default());
        camera.process_mouse_motion(10.0, -20.0);
        assert_relative_eq!(camera.yaw, 0.1);
        assert_relative_eq!(camera.pitch, -0.2);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = CameraController::new(&Config::default());
        camera.process_mouse_motion(0.0, 10_000.0);
        assert_eq!(camera.pitch, MAX_PITCH);
        camera.process_mouse_motion(0.0, -50_000.0);
        assert_eq!(camera.pitch, -MAX_PITCH);
    }

    #[test]
    fn test_scroll_zoom_is_clamped() {
        let mut camera = CameraController::new(&Config::default());
        camera.process_scroll(1.0);
        assert_relative_eq!(camera.distance, Config::default().camera_distance - 0.5);
        camera.process_scroll(1_000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.process_scroll(-1_000.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }
}
