use std::collections::HashMap;

use serde::Deserialize;

/// Top-level override file:
///
/// ```toml
/// [blocks.stone]
/// hardness = 3.0
/// ```
#[derive(Deserialize, Debug, Default, Clone)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: HashMap<String, BlockOverride>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct BlockOverride {
    pub solid: Option<bool>,
    pub transparent: Option<bool>,
    pub liquid: Option<bool>,
    pub breakable: Option<bool>,
    pub hardness: Option<f32>,
    pub light_level: Option<u8>,
}
