use std::f32::consts::FRAC_PI_2;

use nalgebra::{Matrix4, Perspective3, Point3, Rotation3, Vector3};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};

use crate::vitrine::OBJECT_SPACING;

// wgpu의 클립 공간 z는 [0, 1]이라 OpenGL 투영을 반만큼 눌러줌
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub struct Camera {
    pub position: Point3<f32>,

    vertical_fov: f32,
    near: f32,
    far: f32,
    aspect: f32,

    // 궤도 조작이 주는 시선 오프셋
    yaw: f32,
    pitch: f32,
}

impl Camera {
    pub fn new(vertical_fov: f32, near: f32, far: f32, viewport_size: PhysicalSize<u32>) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 6.0),
            vertical_fov,
            near,
            far,
            aspect: viewport_size.width.max(1) as f32 / viewport_size.height.max(1) as f32,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.aspect = new_size.width as f32 / new_size.height as f32;
    }

    // 스크롤 한 화면 = 섹션 하나만큼 아래로
    pub fn apply_scroll(&mut self, scroll_y: f32, viewport_height: f32) {
        self.position.y = -(scroll_y / viewport_height.max(1.0)) * OBJECT_SPACING;
    }

    pub fn set_orbit(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    fn forward(&self) -> Vector3<f32> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch)
            * -Vector3::z()
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        let target = self.position + self.forward();
        let view = Matrix4::look_at_rh(&self.position, &target, &Vector3::y());
        let projection =
            Perspective3::new(self.aspect, self.vertical_fov, self.near, self.far).to_homogeneous();

        OPENGL_TO_WGPU_MATRIX * projection * view
    }
}

pub struct OrbitControls {
    yaw: f32,
    pitch: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    damping_factor: f32,

    dragging: bool,
    last_cursor: PhysicalPosition<f64>,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            damping_factor: 0.25,
            dragging: false,
            last_cursor: Default::default(),
        }
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = matches!(state, ElementState::Pressed);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = (position.x - self.last_cursor.x) as f32;
                let delta_y = (position.y - self.last_cursor.y) as f32;
                self.last_cursor = *position;

                if self.dragging {
                    self.drag(delta_x, delta_y);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn drag(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw_velocity -= delta_x * self.rotation_speed();
        self.pitch_velocity -= delta_y * self.rotation_speed();
    }

    // 매 틱 속도를 깎아서 목표 방향으로 스르륵 다가감
    pub fn update(&mut self, camera: &mut Camera) {
        self.yaw += self.yaw_velocity;
        self.pitch += self.pitch_velocity;

        self.yaw_velocity *= 1.0 - self.damping_factor;
        self.pitch_velocity *= 1.0 - self.damping_factor;

        // 수평선 아래에서 올려다보는 각도는 막음
        self.pitch = self.pitch.clamp(-(FRAC_PI_2 - 0.01), 0.0);

        camera.set_orbit(self.yaw, self.pitch);
    }

    pub fn rotation_speed(&self) -> f32 {
        0.005
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        Camera::new(35f32.to_radians(), 0.1, 100.0, PhysicalSize::new(800, 600))
    }

    #[test]
    fn scroll_maps_viewport_height_to_one_section() {
        let mut camera = test_camera();

        camera.apply_scroll(0.0, 600.0);
        assert_eq!(camera.position.y, 0.0);

        camera.apply_scroll(600.0, 600.0);
        assert!((camera.position.y + OBJECT_SPACING).abs() < 1e-6);

        camera.apply_scroll(300.0, 600.0);
        assert!((camera.position.y + OBJECT_SPACING / 2.0).abs() < 1e-6);
    }

    #[test]
    fn scroll_only_touches_height() {
        let mut camera = test_camera();
        camera.apply_scroll(450.0, 600.0);

        assert_eq!(camera.position.x, 0.0);
        assert_eq!(camera.position.z, 6.0);
    }

    #[test]
    fn orbit_steps_shrink_under_damping() {
        let mut controls = OrbitControls::new();
        let mut camera = test_camera();

        controls.drag(120.0, 0.0);

        let mut previous = controls.yaw();
        let mut steps = Vec::new();
        for _ in 0..5 {
            controls.update(&mut camera);
            steps.push((controls.yaw() - previous).abs());
            previous = controls.yaw();
        }

        for pair in steps.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn orbit_converges_instead_of_snapping() {
        let mut controls = OrbitControls::new();
        let mut camera = test_camera();

        controls.drag(200.0, 0.0);
        controls.update(&mut camera);
        let after_one = controls.yaw();

        for _ in 0..64 {
            controls.update(&mut camera);
        }

        // 첫 틱이 전부가 아니어야 하고, 남은 이동량은 0으로 수렴해야 함
        assert!(controls.yaw().abs() > after_one.abs());
        let settled = controls.yaw();
        controls.update(&mut camera);
        assert!((controls.yaw() - settled).abs() < 1e-4);
    }

    #[test]
    fn pitch_never_leaves_polar_bounds() {
        let mut controls = OrbitControls::new();
        let mut camera = test_camera();

        controls.drag(0.0, 10_000.0);
        for _ in 0..16 {
            controls.update(&mut camera);
        }
        assert!(controls.pitch() >= -FRAC_PI_2);

        controls.drag(0.0, -20_000.0);
        for _ in 0..16 {
            controls.update(&mut camera);
        }
        assert!(controls.pitch() <= 0.0);
    }

    #[test]
    fn view_projection_is_invertible() {
        let camera = test_camera();
        assert!(camera.view_projection_matrix().try_inverse().is_some());
    }
}
