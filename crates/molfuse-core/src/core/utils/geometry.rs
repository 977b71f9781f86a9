use nalgebra::{Isometry3, Point3, Unit, UnitQuaternion, Vector3};
use std::f64::consts::PI;

/// Returns the shortest rotation taking `from` onto `to`.
///
/// Unlike [`UnitQuaternion::rotation_between`], this never fails: when the two
/// vectors are exactly antiparallel the rotation axis is undefined, so a half
/// turn about an axis perpendicular to `from` is returned instead. A zero-length
/// input yields the identity.
pub fn rotation_between(from: &Vector3<f64>, to: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::rotation_between(from, to)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&perpendicular_axis(from), PI))
}

/// Picks a unit axis perpendicular to `v`, preferring the XY plane when `v`
/// leans more towards X than Z.
pub fn perpendicular_axis(v: &Vector3<f64>) -> Unit<Vector3<f64>> {
    let axis = if v.x.abs() > v.z.abs() {
        Vector3::new(-v.y, v.x, 0.0)
    } else {
        Vector3::new(0.0, -v.z, v.y)
    };
    Unit::try_new(axis, f64::EPSILON).unwrap_or_else(Vector3::y_axis)
}

/// Builds a rotation from Euler angles applied in X, Y, Z order.
pub fn rotation_from_euler_xyz(angles: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles.x)
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles.y)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.z)
}

/// Maps a point expressed in an object's local frame to world space.
pub fn world_point(transform: &Isometry3<f64>, local: &Point3<f64>) -> Point3<f64> {
    transform.transform_point(local)
}

/// Maps a direction or offset expressed in an object's local frame to world
/// space. Translation does not apply to directions.
pub fn world_vector(transform: &Isometry3<f64>, local: &Vector3<f64>) -> Vector3<f64> {
    transform.transform_vector(local)
}

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: min.inf(&max),
            max: min.sup(&max),
        }
    }

    /// A cube of the given half extent centred on `center`.
    pub fn cube(center: &Point3<f64>, half_extent: f64) -> Self {
        let half = Vector3::repeat(half_extent.abs());
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box enclosing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.inf(&p),
            max: acc.max.sup(&p),
        }))
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// World-space box enclosing this (local) box after applying `transform`.
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Aabb {
        let corners = self.corners().map(|c| world_point(transform, &c));
        Self::from_points(corners).unwrap_or(*self)
    }
}
