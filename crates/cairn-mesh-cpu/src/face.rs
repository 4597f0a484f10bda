use cairn_geom::Vec3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosZ = 0,
    NegZ = 1,
    NegX = 2,
    PosX = 3,
    PosY = 4,
    NegY = 5,
}

/// Per-face quad corners (unit-cube offsets) with their texture coordinates.
///
/// Hand-authored so every side shows the texture upright when viewed from outside.
const FACE_CORNERS: [[([f32; 3], [f32; 2]); 4]; 6] = [
    // +Z
    [
        ([0.0, 0.0, 1.0], [0.0, 0.0]),
        ([1.0, 0.0, 1.0], [1.0, 0.0]),
        ([1.0, 1.0, 1.0], [1.0, 1.0]),
        ([0.0, 1.0, 1.0], [0.0, 1.0]),
    ],
    // -Z
    [
        ([0.0, 0.0, 0.0], [1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 1.0]),
        ([1.0, 1.0, 0.0], [0.0, 1.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0]),
    ],
    // -X
    [
        ([0.0, 1.0, 1.0], [1.0, 1.0]),
        ([0.0, 1.0, 0.0], [0.0, 1.0]),
        ([0.0, 0.0, 0.0], [0.0, 0.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0]),
    ],
    // +X
    [
        ([1.0, 1.0, 1.0], [0.0, 1.0]),
        ([1.0, 0.0, 1.0], [0.0, 0.0]),
        ([1.0, 0.0, 0.0], [1.0, 0.0]),
        ([1.0, 1.0, 0.0], [1.0, 1.0]),
    ],
    // +Y
    [
        ([0.0, 1.0, 0.0], [0.0, 1.0]),
        ([0.0, 1.0, 1.0], [0.0, 0.0]),
        ([1.0, 1.0, 1.0], [1.0, 0.0]),
        ([1.0, 1.0, 0.0], [1.0, 1.0]),
    ],
    // -Y
    [
        ([0.0, 0.0, 0.0], [0.0, 0.0]),
        ([1.0, 0.0, 0.0], [1.0, 0.0]),
        ([1.0, 0.0, 1.0], [1.0, 1.0]),
        ([0.0, 0.0, 1.0], [0.0, 1.0]),
    ],
];

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosZ,
        Face::NegZ,
        Face::NegX,
        Face::PosX,
        Face::PosY,
        Face::NegY,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        let (dx, dy, dz) = self.delta();
        Vec3::new(dx as f32, dy as f32, dz as f32)
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
            Face::NegX => (-1, 0, 0),
            Face::PosX => (1, 0, 0),
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
        }
    }

    /// Corner offsets and UVs of the quad, in emission order.
    #[inline]
    pub fn corners(self) -> &'static [([f32; 3], [f32; 2]); 4] {
        &FACE_CORNERS[self.index()]
    }
}
