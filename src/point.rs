use crate::error::Error;
use ordered_float::NotNan;
use std::ops::{Add, Sub};

const MIN_RAY_LENGTH: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::ConstructNotNan(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::ConstructNotNan(e, y))?
                .into_inner(),
        })
    }

    pub fn distance(self, other: Self) -> f64 {
        self.squared_distance(other).sqrt()
    }

    pub fn squared_distance(self, other: Self) -> f64 {
        let delta = other - self;
        delta.dot(delta)
    }

    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.y
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// Angle at `vertex` between the rays towards `a` and `b`, in degrees within `[0, 180]`.
pub fn angle(a: Point, vertex: Point, b: Point) -> Result<f64, Error> {
    let ray_a = a - vertex;
    let ray_b = b - vertex;
    let lengths = ray_a.norm() * ray_b.norm();
    if lengths < MIN_RAY_LENGTH {
        return Err(Error::DegenerateGeometry("zero-length ray in joint angle"));
    }
    let cos = (ray_a.dot(ray_b) / lengths).clamp(-1.0, 1.0);
    Ok(cos.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::{angle, Point};
    use crate::error::Error;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn xy_points() {
        let a = Point::new(0.5, 0.5).unwrap();
        let b = Point::new(1.0, 1.0).unwrap();
        assert_approx_eq!(a.squared_distance(b), 0.5);
        assert_eq!(a.midpoint(b), Point::new(0.75, 0.75).unwrap());
    }

    mod angle_tests {
        use super::*;

        fn p(x: f64, y: f64) -> Point {
            Point::new(x, y).unwrap()
        }

        #[test]
        fn right_angle() {
            assert_approx_eq!(angle(p(1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0)).unwrap(), 90.0);
        }

        #[test]
        fn straight_line() {
            assert_approx_eq!(angle(p(-1.0, 0.0), p(0.0, 0.0), p(2.0, 0.0)).unwrap(), 180.0);
        }

        #[test]
        fn folded() {
            assert_approx_eq!(angle(p(1.0, 0.0), p(0.0, 0.0), p(3.0, 0.0)).unwrap(), 0.0);
        }

        #[test]
        fn degenerate() {
            assert!(matches!(
                angle(p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0)),
                Err(Error::DegenerateGeometry(_))
            ));
        }
    }
}
