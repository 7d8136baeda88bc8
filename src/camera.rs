use std::f32::consts::{PI, TAU};

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

use crate::input::{Cursor, InputEvent, PointerButton, Viewport};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Perspective camera looking from `position` at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn look_at<T: Into<Point3<f32>>>(&mut self, target: T) {
        self.target = target.into();
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Literal camera setup of a demo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 3.0),
            target: Point3::origin(),
            fovy: Deg(75.0),
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn camera(&self) -> Camera {
        Camera::new(self.position, self.target)
    }

    pub fn projection(&self, viewport: &Viewport) -> Projection {
        let mut projection = Projection::new(1, 1, self.fovy, self.znear, self.zfar);
        projection.set_aspect(viewport.aspect());
        projection
    }
}

/// Camera position on a circle around the origin steered by the cursor.
///
/// `cursor.x` in `[-0.5, 0.5]` maps to one full turn, `cursor.y` to height.
pub fn cursor_orbit_position(cursor: &Cursor, radius: f32) -> Point3<f32> {
    let (x, y) = (cursor.x as f32, cursor.y as f32);
    Point3::new(
        (x * TAU).sin() * radius,
        y * radius,
        (x * TAU).cos() * radius,
    )
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: &Camera, projection: &Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

const POLAR_EPSILON: f32 = 1e-6;
const MOVE_EPSILON: f32 = 1e-6;

/// Damped orbit around `target`: primary-button drag rotates, the wheel dollies.
///
/// Input only accumulates deltas; `update` applies them to a camera once per
/// frame and, with damping on, lets them decay over the following frames.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub config: OrbitConfig,
    pub target: Point3<f32>,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    rotating: bool,
    last_pointer: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            target: Point3::origin(),
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            rotating: false,
            last_pointer: None,
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Pending rotation as (azimuth, polar) radians.
    pub fn pending_rotation(&self) -> (f32, f32) {
        (self.theta_delta, self.phi_delta)
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.config.zoom_speed)
    }

    /// Returns `true` if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent, viewport: &Viewport) -> bool {
        match *event {
            InputEvent::PointerButton {
                button: PointerButton::Primary,
                pressed,
            } => {
                self.rotating = pressed;
                true
            }
            InputEvent::PointerMoved { x, y } => {
                let last = self.last_pointer.replace((x, y));
                match last {
                    Some((lx, ly)) if self.rotating => {
                        let height = viewport.height.max(1.0) as f32;
                        let dx = (x - lx) as f32 * self.config.rotate_speed;
                        let dy = (y - ly) as f32 * self.config.rotate_speed;
                        self.rotate_left(TAU * dx / height);
                        self.rotate_up(TAU * dy / height);
                        true
                    }
                    _ => false,
                }
            }
            InputEvent::Wheel { delta_y } => {
                if delta_y < 0.0 {
                    self.scale *= self.zoom_scale();
                } else if delta_y > 0.0 {
                    self.scale /= self.zoom_scale();
                }
                true
            }
            _ => false,
        }
    }

    /// Applies pending rotation and dolly to `camera`; returns `true` if it moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.position - self.target;
        let radius = offset.magnitude();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };

        if self.config.enable_damping {
            theta += self.theta_delta * self.config.damping_factor;
            phi += self.phi_delta * self.config.damping_factor;
        } else {
            theta += self.theta_delta;
            phi += self.phi_delta;
        }
        let phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.scale).clamp(self.config.min_distance, self.config.max_distance);

        let sin_phi_radius = phi.sin() * radius;
        let offset = Vector3::new(
            sin_phi_radius * theta.sin(),
            phi.cos() * radius,
            sin_phi_radius * theta.cos(),
        );
        let position = self.target + offset;

        if self.config.enable_damping {
            self.theta_delta *= 1.0 - self.config.damping_factor;
            self.phi_delta *= 1.0 - self.config.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
        }
        self.scale = 1.0;

        let moved = (position - camera.position).magnitude2() > MOVE_EPSILON;
        camera.position = position;
        camera.look_at(self.target);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn projection_resize_ignores_zero() {
        let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
        projection.resize(0, 600);
        assert!(close(projection.aspect, 800.0 / 600.0));
        projection.resize(1000, 500);
        assert!(close(projection.aspect, 2.0));
    }

    #[test]
    fn update_without_input_keeps_camera() {
        let mut controls = OrbitControls::new(OrbitConfig::default());
        let mut camera = Camera::new((1.0, 1.0, 5.0), (0.0, 0.0, 0.0));
        let moved = controls.update(&mut camera);
        assert!(!moved);
        assert!(close(camera.position.x, 1.0));
        assert!(close(camera.position.y, 1.0));
        assert!(close(camera.position.z, 5.0));
    }

    #[test]
    fn wheel_dolly_changes_distance() {
        let viewport = Viewport::fixed(800, 600);
        let mut controls = OrbitControls::new(OrbitConfig::default());
        let mut camera = Camera::new((0.0, 0.0, 10.0), (0.0, 0.0, 0.0));
        controls.handle_input(&InputEvent::Wheel { delta_y: -100.0 }, &viewport);
        controls.update(&mut camera);
        assert!(close(camera.position.to_vec().magnitude(), 9.5));
        controls.handle_input(&InputEvent::Wheel { delta_y: 100.0 }, &viewport);
        controls.update(&mut camera);
        assert!(close(camera.position.to_vec().magnitude(), 10.0));
    }
}
