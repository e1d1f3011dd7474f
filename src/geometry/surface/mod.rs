mod cylinder;
mod plane;

pub use cylinder::Cylinder;
pub use plane::Plane;

use crate::error::Result;
use crate::math::{Matrix4, Point3, Vector3};

/// Quantization step used when hashing surface geometry.
const KEY_RESOLUTION: f64 = 1e-6;

/// Surface classification, fixed when the surface is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceKind {
    Plane,
    Cylinder,
    Other,
}

/// The geometric surface carried by a face.
#[derive(Debug, Clone)]
pub enum FaceSurface {
    /// A planar surface.
    Plane(Plane),
    /// A cylindrical surface.
    Cylinder(Cylinder),
    /// A surface the kernel does not interpret, identified by an opaque id.
    Other(u64),
}

/// Hashable, quantized description of a surface's geometry.
///
/// Two surfaces rebuilt from the same footprint produce the same key even
/// though they are distinct objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceKey {
    pub kind: SurfaceKind,
    pub values: [i64; 7],
}

#[allow(clippy::cast_possible_truncation)]
fn quantize(value: f64) -> i64 {
    (value / KEY_RESOLUTION).round() as i64
}

impl FaceSurface {
    /// Returns the surface kind.
    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        match self {
            FaceSurface::Plane(_) => SurfaceKind::Plane,
            FaceSurface::Cylinder(_) => SurfaceKind::Cylinder,
            FaceSurface::Other(_) => SurfaceKind::Other,
        }
    }

    #[must_use]
    pub fn is_plane(&self) -> bool {
        matches!(self, FaceSurface::Plane(_))
    }

    #[must_use]
    pub fn is_cylinder(&self) -> bool {
        matches!(self, FaceSurface::Cylinder(_))
    }

    /// Returns the plane, if this is a planar surface.
    #[must_use]
    pub fn as_plane(&self) -> Option<&Plane> {
        match self {
            FaceSurface::Plane(plane) => Some(plane),
            _ => None,
        }
    }

    /// Returns the surface as an edge-insertion hint. Only planes and
    /// cylinders are passed on.
    #[must_use]
    pub fn as_hint(&self) -> Option<&FaceSurface> {
        match self {
            FaceSurface::Plane(_) | FaceSurface::Cylinder(_) => Some(self),
            FaceSurface::Other(_) => None,
        }
    }

    /// Returns the quantized geometric key.
    #[must_use]
    pub fn key(&self) -> SurfaceKey {
        let values = match self {
            FaceSurface::Plane(plane) => {
                let n = plane.plane_normal();
                let offset = plane.origin().coords.dot(n);
                [quantize(n.x), quantize(n.y), quantize(n.z), quantize(offset), 0, 0, 0]
            }
            FaceSurface::Cylinder(cylinder) => {
                let axis = if cylinder.axis().z < 0.0 {
                    -cylinder.axis()
                } else {
                    *cylinder.axis()
                };
                let c = cylinder.center().coords;
                let foot = c - axis * c.dot(&axis);
                [
                    quantize(axis.x),
                    quantize(axis.y),
                    quantize(axis.z),
                    quantize(foot.x),
                    quantize(foot.y),
                    quantize(foot.z),
                    quantize(cylinder.radius()),
                ]
            }
            #[allow(clippy::cast_possible_wrap)]
            FaceSurface::Other(id) => [*id as i64, 0, 0, 0, 0, 0, 0],
        };
        SurfaceKey {
            kind: self.kind(),
            values,
        }
    }

    /// Returns a copy moved by a similarity transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform degenerates the surface.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        Ok(match self {
            FaceSurface::Plane(plane) => FaceSurface::Plane(plane.transformed(matrix)?),
            FaceSurface::Cylinder(cylinder) => FaceSurface::Cylinder(cylinder.transformed(matrix)?),
            FaceSurface::Other(id) => FaceSurface::Other(*id),
        })
    }

    /// Surface normal at a point on the surface, or `None` for opaque surfaces.
    #[must_use]
    pub fn normal_at(&self, point: &Point3) -> Option<Vector3> {
        match self {
            FaceSurface::Plane(plane) => Some(*plane.plane_normal()),
            FaceSurface::Cylinder(cylinder) => cylinder.normal_at(point),
            FaceSurface::Other(_) => None,
        }
    }
}
