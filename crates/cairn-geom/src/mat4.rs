use core::ops::Mul;

use crate::Vec3;

/// Column-major 4x4 matrix, `cols[c][r]`, right-handed with -Z forward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// View matrix looking from `eye` toward `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let f = (target - eye).normalized();
        let s = f.cross(up).normalized();
        let u = s.cross(f);
        let mut m = Mat4::IDENTITY;
        m.cols[0][0] = s.x;
        m.cols[1][0] = s.y;
        m.cols[2][0] = s.z;
        m.cols[0][1] = u.x;
        m.cols[1][1] = u.y;
        m.cols[2][1] = u.z;
        m.cols[0][2] = -f.x;
        m.cols[1][2] = -f.y;
        m.cols[2][2] = -f.z;
        m.cols[3][0] = -s.dot(eye);
        m.cols[3][1] = -u.dot(eye);
        m.cols[3][2] = f.dot(eye);
        m
    }

    /// OpenGL-style perspective projection (clip z in [-w, w]).
    pub fn perspective(fovy_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let t = (fovy_radians * 0.5).tan();
        let mut m = Mat4 {
            cols: [[0.0; 4]; 4],
        };
        m.cols[0][0] = 1.0 / (aspect * t);
        m.cols[1][1] = 1.0 / t;
        m.cols[2][2] = -(far + near) / (far - near);
        m.cols[2][3] = -1.0;
        m.cols[3][2] = -(2.0 * far * near) / (far - near);
        m
    }

    /// Camera position encoded in a rigid view matrix.
    pub fn view_origin(&self) -> Vec3 {
        let m = &self.cols;
        let mut eye = [0.0f32; 3];
        for (i, e) in eye.iter_mut().enumerate() {
            *e = -(m[i][0] * m[3][0] + m[i][1] * m[3][1] + m[i][2] * m[3][2]);
        }
        Vec3::new(eye[0], eye[1], eye[2])
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in out.iter_mut().enumerate() {
            for (r, v) in col.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Mat4 { cols: out }
    }
}
