use crate::math::{normalize_angle, DEG_TO_RAD, RAD_TO_DEG, ZERO_SPEED_EPSILON};

/// A 2D vector used for positions and steering forces
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

/// Canvas coordinates share the vector representation.
pub type Point = Vector2D;

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Self::zero()
        }
    }

    /// Rescales the vector to `max` when it is longer, keeping its direction.
    pub fn limit(&self, max: f64) -> Self {
        let mag = self.magnitude();
        if mag > max {
            let scale = max / mag;
            Self {
                x: self.x * scale,
                y: self.y * scale,
            }
        } else {
            *self
        }
    }

    pub fn distance(&self, other: &Vector2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Heading of the vector in degrees, normalized to [0, 360).
    pub fn heading(&self) -> f64 {
        normalize_angle(self.y.atan2(self.x) * RAD_TO_DEG)
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f64> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f64> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// Velocity in polar form: speed along a heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolarVelocity {
    pub speed: f64,
    pub angle: f64,
}

impl PolarVelocity {
    pub fn new(speed: f64, angle: f64) -> Self {
        Self {
            speed,
            angle: normalize_angle(angle),
        }
    }

    pub fn to_vector(&self) -> Vector2D {
        let rad = self.angle * DEG_TO_RAD;
        Vector2D::new(self.speed * rad.cos(), self.speed * rad.sin())
    }

    /// Converts a Cartesian vector; a vanishing vector gets heading 0.
    pub fn from_vector(v: Vector2D) -> Self {
        let speed = v.magnitude();
        if speed < ZERO_SPEED_EPSILON {
            Self { speed, angle: 0.0 }
        } else {
            Self {
                speed,
                angle: v.heading(),
            }
        }
    }
}

/// An agent's velocity, stored in whichever form the active update policy
/// works in.
///
/// The weighted-force policy keeps `Cartesian`; the priority-decision policy
/// keeps `Polar`, which retains a heading while the agent is stationary.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Velocity {
    Cartesian { dx: f64, dy: f64 },
    Polar { speed: f64, angle: f64 },
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity::Cartesian { dx: 0.0, dy: 0.0 }
    }
}

impl Velocity {
    pub fn cartesian(dx: f64, dy: f64) -> Self {
        Velocity::Cartesian { dx, dy }
    }

    pub fn polar(speed: f64, angle: f64) -> Self {
        Velocity::Polar {
            speed,
            angle: normalize_angle(angle),
        }
    }

    /// Brings a polar angle back into `[0, 360)`; Cartesian values pass
    /// through.
    pub fn normalized(self) -> Self {
        match self {
            Velocity::Polar { speed, angle } => Velocity::polar(speed, angle),
            cartesian => cartesian,
        }
    }

    pub fn to_vector(&self) -> Vector2D {
        match *self {
            Velocity::Cartesian { dx, dy } => Vector2D::new(dx, dy),
            Velocity::Polar { speed, angle } => PolarVelocity { speed, angle }.to_vector(),
        }
    }

    pub fn to_polar(&self) -> PolarVelocity {
        match *self {
            Velocity::Cartesian { dx, dy } => PolarVelocity::from_vector(Vector2D::new(dx, dy)),
            Velocity::Polar { speed, angle } => PolarVelocity { speed, angle },
        }
    }

    /// Same velocity re-expressed in Cartesian form.
    pub fn to_cartesian(&self) -> Self {
        self.to_vector().into()
    }

    pub fn speed(&self) -> f64 {
        match *self {
            Velocity::Cartesian { dx, dy } => Vector2D::new(dx, dy).magnitude(),
            Velocity::Polar { speed, .. } => speed.abs(),
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            Velocity::Cartesian { dx, dy } => dx.is_finite() && dy.is_finite(),
            Velocity::Polar { speed, angle } => speed.is_finite() && angle.is_finite(),
        }
    }
}

impl From<Vector2D> for Velocity {
    fn from(v: Vector2D) -> Self {
        Velocity::Cartesian { dx: v.x, dy: v.y }
    }
}

impl From<PolarVelocity> for Velocity {
    fn from(p: PolarVelocity) -> Self {
        Velocity::Polar {
            speed: p.speed,
            angle: p.angle,
        }
    }
}
