use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::config::{BlockOverride, BlocksConfig};
use super::types::{BlockKind, MeshBucket};

#[derive(Clone, Debug, PartialEq)]
pub struct BlockType {
    pub kind: BlockKind,
    pub name: String,
    pub solid: bool,
    pub transparent: bool,
    pub liquid: bool,
    pub breakable: bool,
    pub hardness: f32,
    pub light_level: u8,
    pub bucket: MeshBucket,
}

impl BlockType {
    fn solid(kind: BlockKind, hardness: f32) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            solid: true,
            transparent: false,
            liquid: false,
            breakable: true,
            hardness,
            light_level: 0,
            bucket: kind.bucket(),
        }
    }

    fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Air => Self {
                solid: false,
                transparent: true,
                breakable: false,
                ..Self::solid(kind, 0.0)
            },
            BlockKind::Stone => Self::solid(kind, 1.5),
            BlockKind::Grass => Self::solid(kind, 0.6),
            BlockKind::Dirt => Self::solid(kind, 0.5),
            BlockKind::Wood => Self::solid(kind, 2.0),
            BlockKind::Leaves => Self {
                transparent: true,
                ..Self::solid(kind, 0.2)
            },
            BlockKind::Sand => Self::solid(kind, 0.5),
            BlockKind::Water => Self {
                solid: false,
                transparent: true,
                liquid: true,
                breakable: false,
                ..Self::solid(kind, 0.0)
            },
            BlockKind::OakLog => Self::solid(kind, 2.0),
            BlockKind::Gravel => Self::solid(kind, 0.6),
        }
    }

    fn apply(&mut self, o: &BlockOverride) {
        if let Some(v) = o.solid {
            self.solid = v;
        }
        if let Some(v) = o.transparent {
            self.transparent = v;
        }
        if let Some(v) = o.liquid {
            self.liquid = v;
        }
        if let Some(v) = o.breakable {
            self.breakable = v;
        }
        if let Some(v) = o.hardness {
            self.hardness = v.max(0.0);
        }
        if let Some(v) = o.light_level {
            self.light_level = v.min(15);
        }
    }
}

/// Immutable catalog indexed by block code. Built once and shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<BlockType>,
    pub by_name: HashMap<String, BlockKind>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BlockRegistry {
    pub fn with_defaults() -> Self {
        let blocks: Vec<BlockType> = BlockKind::ALL
            .iter()
            .map(|&k| BlockType::default_for(k))
            .collect();
        let by_name = BlockKind::ALL
            .iter()
            .map(|&k| (k.name().to_string(), k))
            .collect();
        Self { blocks, by_name }
    }

    #[inline]
    pub fn get(&self, code: u8) -> Option<&BlockType> {
        self.blocks.get(code as usize)
    }

    /// Properties for `kind`; every kind has an entry.
    #[inline]
    pub fn props(&self, kind: BlockKind) -> &BlockType {
        &self.blocks[kind as usize]
    }

    /// Unknown codes resolve to air.
    pub fn props_or_air(&self, code: u8) -> &BlockType {
        self.get(code)
            .unwrap_or_else(|| self.props(BlockKind::Air))
    }

    pub fn kind_by_name(&self, name: &str) -> Option<BlockKind> {
        self.by_name.get(name).copied()
    }

    pub fn is_solid(&self, kind: BlockKind) -> bool {
        self.props(kind).solid
    }

    /// Faces behind a transparent block stay visible. Air, water and leaves by default.
    #[inline]
    pub fn is_see_through(&self, kind: BlockKind) -> bool {
        self.props(kind).transparent
    }

    /// Solid and not transparent.
    #[inline]
    pub fn is_opaque(&self, kind: BlockKind) -> bool {
        let p = self.props(kind);
        p.solid && !p.transparent
    }

    pub fn from_configs(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = Self::with_defaults();
        let mut entries: Vec<(String, BlockOverride)> = cfg.blocks.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, o) in entries {
            let kind = reg
                .kind_by_name(&name)
                .ok_or_else(|| format!("unknown block '{name}' in block overrides"))?;
            reg.blocks[kind as usize].apply(&o);
        }
        Ok(reg)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_configs(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
