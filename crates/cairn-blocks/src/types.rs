/// One voxel's block code. Stored directly in chunk grids.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    #[default]
    Air = 0,
    Stone = 1,
    Grass = 2,
    Dirt = 3,
    Wood = 4,
    Leaves = 5,
    Sand = 6,
    Water = 7,
    OakLog = 8,
    Gravel = 9,
}

impl BlockKind {
    pub const COUNT: usize = 10;

    pub const ALL: [BlockKind; Self::COUNT] = [
        BlockKind::Air,
        BlockKind::Stone,
        BlockKind::Grass,
        BlockKind::Dirt,
        BlockKind::Wood,
        BlockKind::Leaves,
        BlockKind::Sand,
        BlockKind::Water,
        BlockKind::OakLog,
        BlockKind::Gravel,
    ];

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_code(code: u8) -> Option<BlockKind> {
        Self::ALL.get(code as usize).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            BlockKind::Air => "air",
            BlockKind::Stone => "stone",
            BlockKind::Grass => "grass",
            BlockKind::Dirt => "dirt",
            BlockKind::Wood => "wood",
            BlockKind::Leaves => "leaves",
            BlockKind::Sand => "sand",
            BlockKind::Water => "water",
            BlockKind::OakLog => "oak_log",
            BlockKind::Gravel => "gravel",
        }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockKind::Air
    }

    #[inline]
    pub fn is_water(self) -> bool {
        self == BlockKind::Water
    }

    #[inline]
    pub fn is_leaves(self) -> bool {
        self == BlockKind::Leaves
    }

    /// Render bucket this kind's faces are emitted into.
    pub const fn bucket(self) -> MeshBucket {
        match self {
            BlockKind::Water => MeshBucket::Water,
            BlockKind::OakLog => MeshBucket::OakLog,
            BlockKind::Leaves => MeshBucket::Leaves,
            BlockKind::Stone => MeshBucket::Stone,
            BlockKind::Gravel => MeshBucket::Gravel,
            BlockKind::Sand => MeshBucket::Sand,
            _ => MeshBucket::Default,
        }
    }
}

/// Separate vertex/index buffer per material so each draws with its own texture.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum MeshBucket {
    Default = 0,
    OakLog = 1,
    Leaves = 2,
    Stone = 3,
    Gravel = 4,
    Sand = 5,
    Water = 6,
}

impl MeshBucket {
    pub const COUNT: usize = 7;

    /// Draw order: opaque buckets first, leaves next, water last.
    pub const ALL: [MeshBucket; Self::COUNT] = [
        MeshBucket::Default,
        MeshBucket::OakLog,
        MeshBucket::Stone,
        MeshBucket::Gravel,
        MeshBucket::Sand,
        MeshBucket::Leaves,
        MeshBucket::Water,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            MeshBucket::Default => "default",
            MeshBucket::OakLog => "oak_log",
            MeshBucket::Leaves => "leaves",
            MeshBucket::Stone => "stone",
            MeshBucket::Gravel => "gravel",
            MeshBucket::Sand => "sand",
            MeshBucket::Water => "water",
        }
    }
}
