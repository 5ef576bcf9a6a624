use glam::{Mat4, Quat, Vec3};

/// Input that changes the pose of a [Camera].
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CameraMovement {
    PitchUp,
    PitchDown,
    RollLeft,
    RollRight,
    YawLeft,
    YawRight,
    Right,
    Left,
    Forward,
    Backward,
    Upward,
    Downward,
}

/// Orthonormal axes of a camera. `right` is `front x up`, which is the screen right axis of a
/// right handed view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            front: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::NEG_X,
        }
    }
}

impl Orientation {
    pub fn apply_rotation(&mut self, rotation: Quat) {
        self.front = (rotation * self.front).normalize();
        self.up = (rotation * self.up).normalize();
        self.right = self.front.cross(self.up);
    }
}

/// A free flying camera that provides the pose used to cull terrain chunks.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Orientation,
    /// Rotation speed in degrees per second.
    pub angular_speed: f32,
    /// Translation speed in world units per second.
    pub speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Orientation::default(),
            angular_speed: 45.0,
            speed: 10.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a camera at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let front = (target - position).normalize_or(Vec3::Z);
        let rotation = Quat::from_rotation_arc(Vec3::Z, front);

        let mut camera = Self::new(position);
        camera.orientation.apply_rotation(rotation);
        camera
    }

    /// The unit length direction the camera is looking in.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation.front
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.orientation.front, self.orientation.up)
    }

    pub fn process_input(&mut self, movement: CameraMovement, delta_time: f32) {
        let angle = (self.angular_speed * delta_time).to_radians();
        let distance = self.speed * delta_time;

        let Orientation { front, up, right } = self.orientation;

        match movement {
            CameraMovement::PitchUp => self.rotate(Quat::from_axis_angle(right, angle)),
            CameraMovement::PitchDown => self.rotate(Quat::from_axis_angle(right, -angle)),
            CameraMovement::RollLeft => self.rotate(Quat::from_axis_angle(front, -angle)),
            CameraMovement::RollRight => self.rotate(Quat::from_axis_angle(front, angle)),
            CameraMovement::YawLeft => self.rotate(Quat::from_axis_angle(up, angle)),
            CameraMovement::YawRight => self.rotate(Quat::from_axis_angle(up, -angle)),
            CameraMovement::Right => self.position += right * distance,
            CameraMovement::Left => self.position -= right * distance,
            CameraMovement::Forward => self.position += front * distance,
            CameraMovement::Backward => self.position -= front * distance,
            CameraMovement::Upward => self.position += up * distance,
            CameraMovement::Downward => self.position -= up * distance,
        }
    }

    /// Move along the view direction, the way an airplane carrying the camera would.
    pub fn advance(&mut self, delta_time: f32, velocity: f32) {
        self.position += self.orientation.front * delta_time * velocity;
    }

    fn rotate(&mut self, rotation: Quat) {
        self.orientation.apply_rotation(rotation);
    }
}
