use crate::{Aabb, Mat4, Vec3};

/// Plane `n·p + d = 0` with the normal pointing into the frustum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_row(a: f32, b: f32, c: f32, d: f32) -> Plane {
        let normal = Vec3::new(a, b, c);
        let len = normal.length();
        if len > 0.0 {
            Plane {
                normal: normal / len,
                d: d / len,
            }
        } else {
            Plane { normal, d }
        }
    }

    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }
}

/// Six clip planes in the order left, right, bottom, top, near, far.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts planes from a combined `projection * view` matrix.
    pub fn from_view_projection(m: &Mat4) -> Frustum {
        let c = &m.cols;
        let row = |r: usize| [c[0][r], c[1][r], c[2][r], c[3][r]];
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));
        let plus = |a: [f32; 4]| Plane::from_row(r3[0] + a[0], r3[1] + a[1], r3[2] + a[2], r3[3] + a[3]);
        let minus = |a: [f32; 4]| Plane::from_row(r3[0] - a[0], r3[1] - a[1], r3[2] - a[2], r3[3] - a[3]);
        Frustum {
            planes: [plus(r0), minus(r0), plus(r1), minus(r1), plus(r2), minus(r2)],
        }
    }

    /// Conservative box test: false only when the box lies fully outside one plane.
    pub fn is_box_visible(&self, bb: &Aabb) -> bool {
        for p in &self.planes {
            let v = Vec3::new(
                if p.normal.x >= 0.0 { bb.max.x } else { bb.min.x },
                if p.normal.y >= 0.0 { bb.max.y } else { bb.min.y },
                if p.normal.z >= 0.0 { bb.max.z } else { bb.min.z },
            );
            if p.distance(v) < 0.0 {
                return false;
            }
        }
        true
    }
}
