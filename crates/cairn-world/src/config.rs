//! World configuration: serde sections with defaults, a lenient INI-style
//! loader, validation clamps and named presets.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "world_config.ini";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldConfig {
    pub rendering: RenderingConfig,
    pub terrain: TerrainConfig,
    pub trees: TreesConfig,
    pub performance: PerformanceConfig,
    pub clouds: CloudsConfig,
    pub debug: DebugConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderingConfig {
    pub render_distance: i32,
    pub load_distance: i32,
    pub fog_start_distance: f64,
    pub fog_end_distance: f64,
    pub enable_fog: bool,
    pub enable_frustum_culling: bool,
    pub max_chunks_per_frame: i32,
    pub unload_multiplier: f64,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            render_distance: 8,
            load_distance: 10,
            fog_start_distance: 64.0,
            fog_end_distance: 128.0,
            enable_fog: true,
            enable_frustum_culling: true,
            max_chunks_per_frame: 4,
            unload_multiplier: 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainConfig {
    pub seed: i64,
    pub sea_level: i32,
    pub min_height: i32,
    pub max_height: i32,
    pub base_height: i32,
    pub dirt_depth: i32,
    pub stone_depth: i32,
    pub height_noise: HeightNoiseConfig,
    pub lakes: LakesConfig,
    pub plains: PlainsConfig,
    pub gravel: GravelConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            sea_level: 32,
            min_height: 10,
            max_height: 65,
            base_height: 35,
            dirt_depth: 3,
            stone_depth: 30,
            height_noise: HeightNoiseConfig::default(),
            lakes: LakesConfig::default(),
            plains: PlainsConfig::default(),
            gravel: GravelConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeightNoiseConfig {
    pub frequency: f64,
    pub octaves: i32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub amplitude: f64,
}

impl Default for HeightNoiseConfig {
    fn default() -> Self {
        Self {
            frequency: 0.02,
            octaves: 4,
            persistence: 0.4,
            lacunarity: 2.0,
            amplitude: 15.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LakesConfig {
    pub enabled: bool,
    pub frequency: f64,
    pub threshold: f64,
    pub max_depth: i32,
    pub fix_floating_water: bool,
}

impl Default for LakesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 0.015,
            threshold: 0.45,
            max_depth: 8,
            fix_floating_water: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlainsConfig {
    pub enabled: bool,
    pub frequency: f64,
    pub threshold: f64,
    pub flatness_radius: i32,
    pub flatness_strength: f64,
}

impl Default for PlainsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 0.008,
            threshold: 0.4,
            flatness_radius: 8,
            flatness_strength: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GravelConfig {
    pub enabled: bool,
    pub frequency: f64,
    pub density: f64,
    pub max_distance: f64,
    pub edge_bonus: f64,
}

impl Default for GravelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 0.06,
            density: 0.4,
            max_distance: 5.0,
            edge_bonus: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreesConfig {
    pub enabled: bool,
    pub frequency: f64,
    pub threshold: f64,
    pub min_height: i32,
    pub max_height: i32,
    pub min_spacing: i32,
    pub generate_in_lakes: bool,
    pub leaves: LeavesConfig,
}

impl Default for TreesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 0.05,
            threshold: 0.3,
            min_height: 4,
            max_height: 7,
            min_spacing: 5,
            generate_in_lakes: false,
            leaves: LeavesConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeavesConfig {
    pub enable_cross_chunk_leaves: bool,
    pub min_leaves_per_tree: i32,
    pub enable_post_processing: bool,
}

impl Default for LeavesConfig {
    fn default() -> Self {
        Self {
            enable_cross_chunk_leaves: false,
            min_leaves_per_tree: 8,
            enable_post_processing: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceConfig {
    pub generation_threads: i32,
    pub generation_batch_size: i32,
    pub max_chunks_per_frame: i32,
    pub max_chunk_updates_per_frame: i32,
    pub max_memory_chunks: i32,
    pub enable_mesh_optimization: bool,
    pub chunk_update_delay: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            generation_threads: 4,
            generation_batch_size: 8,
            max_chunks_per_frame: 32,
            max_chunk_updates_per_frame: 8,
            max_memory_chunks: 200,
            enable_mesh_optimization: true,
            chunk_update_delay: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloudsConfig {
    pub enabled: bool,
    pub height: f64,
    pub speed: f64,
    pub density: f64,
    pub update_distance: f64,
    pub grid_size: i32,
    pub spacing: f64,
    pub layers: i32,
    pub layer_spacing: f64,
}

impl Default for CloudsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            height: 80.0,
            speed: 0.01,
            density: 0.5,
            update_distance: 64.0,
            grid_size: 32,
            spacing: 8.0,
            layers: 6,
            layer_spacing: 2.5,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugConfig {
    pub show_chunk_borders: bool,
    pub show_fps: bool,
    pub show_player_position: bool,
    pub show_chunk_info: bool,
    pub enable_wireframe: bool,
    pub log_tree_generation: bool,
    pub log_chunk_generation: bool,
}

impl WorldConfig {
    /// Loads `path`; a missing file yields defaults and writes them back out.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(target: "config", "{} not found; writing defaults", path.display());
            let cfg = WorldConfig::default();
            cfg.save_to_file(path)?;
            return Ok(cfg);
        }
        let text = fs::read_to_string(path)?;
        let cfg = Self::from_ini_str(&text)?;
        log::info!(target: "config", "loaded {}", path.display());
        Ok(cfg)
    }

    /// Parses `key = value` lines under `[section]` / `[section.sub]` headers.
    ///
    /// Unknown sections, unknown keys and values of the wrong type are
    /// logged and skipped; everything else falls back to defaults.
    pub fn from_ini_str(text: &str) -> Result<Self, Box<dyn Error>> {
        let mut doc = toml::Value::try_from(WorldConfig::default())?;
        let mut section: Option<Vec<String>> = Some(Vec::new());

        for (lineno, raw) in text.lines().enumerate() {
            let lineno = lineno + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if let Some(inner) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let path: Vec<String> = inner.split('.').map(|s| s.trim().to_string()).collect();
                section = match lookup_table(&doc, &path) {
                    Some(_) => Some(path),
                    None => {
                        log::warn!(target: "config", "line {lineno}: unknown section [{inner}]");
                        None
                    }
                };
                continue;
            }
            let Some(path) = section.as_ref() else {
                continue;
            };
            let Some((key, value)) = line.split_once('=') else {
                log::warn!(target: "config", "line {lineno}: expected key = value");
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            if let Err(e) = apply_value(&mut doc, path, key, value) {
                log::warn!(target: "config", "line {lineno}: {e}; skipped");
            }
        }

        let mut cfg: WorldConfig = doc.try_into()?;
        cfg.validate();
        Ok(cfg)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        let body = toml::to_string_pretty(self)?;
        let mut out = String::from("# World configuration\n\n");
        out.push_str(&body);
        fs::write(path.as_ref(), out)?;
        log::info!(target: "config", "saved {}", path.as_ref().display());
        Ok(())
    }

    /// Clamps every tunable into its supported range.
    pub fn validate(&mut self) {
        let r = &mut self.rendering;
        r.render_distance = r.render_distance.clamp(1, 32);
        r.load_distance = r.load_distance.clamp(r.render_distance, 64);
        r.fog_start_distance = r.fog_start_distance.clamp(16.0, 512.0);
        r.fog_end_distance = r
            .fog_end_distance
            .clamp(r.fog_start_distance + 16.0, 1024.0);
        r.max_chunks_per_frame = r.max_chunks_per_frame.clamp(1, 16);
        r.unload_multiplier = r.unload_multiplier.clamp(1.0, 4.0);

        let t = &mut self.terrain;
        t.sea_level = t.sea_level.clamp(1, 62);
        t.min_height = t.min_height.clamp(1, 62);
        t.max_height = t.max_height.clamp(t.min_height, 65);
        t.base_height = t.base_height.clamp(t.min_height, t.max_height);
        t.dirt_depth = t.dirt_depth.clamp(1, 10);
        t.stone_depth = t.stone_depth.clamp(1, 64);
        let h = &mut t.height_noise;
        h.frequency = h.frequency.clamp(0.001, 0.1);
        h.octaves = h.octaves.clamp(1, 8);
        h.persistence = h.persistence.clamp(0.1, 1.0);
        h.lacunarity = h.lacunarity.clamp(1.5, 4.0);
        h.amplitude = h.amplitude.clamp(5.0, 100.0);
        let l = &mut t.lakes;
        l.frequency = l.frequency.clamp(0.001, 0.1);
        l.threshold = l.threshold.clamp(0.0, 1.0);
        l.max_depth = l.max_depth.clamp(1, 32);
        let p = &mut t.plains;
        p.frequency = p.frequency.clamp(0.001, 0.1);
        p.threshold = p.threshold.clamp(0.0, 0.99);
        p.flatness_radius = p.flatness_radius.clamp(1, 32);
        p.flatness_strength = p.flatness_strength.clamp(0.1, 1.0);
        let g = &mut t.gravel;
        g.frequency = g.frequency.clamp(0.001, 0.5);
        g.density = g.density.clamp(0.0, 1.0);
        g.max_distance = g.max_distance.clamp(1.0, 6.0);
        g.edge_bonus = g.edge_bonus.clamp(0.0, 1.0);

        let tr = &mut self.trees;
        tr.frequency = tr.frequency.clamp(0.001, 0.2);
        tr.threshold = tr.threshold.clamp(-1.0, 1.0);
        tr.min_height = tr.min_height.clamp(3, 20);
        tr.max_height = tr.max_height.clamp(tr.min_height, 30);
        tr.min_spacing = tr.min_spacing.clamp(2, 20);
        tr.leaves.min_leaves_per_tree = tr.leaves.min_leaves_per_tree.clamp(1, 50);

        let pf = &mut self.performance;
        pf.generation_threads = pf.generation_threads.clamp(1, 16);
        pf.generation_batch_size = pf.generation_batch_size.clamp(1, 64);
        pf.max_chunks_per_frame = pf.max_chunks_per_frame.clamp(1, 64);
        pf.max_chunk_updates_per_frame = pf.max_chunk_updates_per_frame.clamp(1, 32);
        pf.max_memory_chunks = pf.max_memory_chunks.clamp(50, 1000);
        pf.chunk_update_delay = pf.chunk_update_delay.clamp(0.0, 5.0);

        let c = &mut self.clouds;
        c.grid_size = c.grid_size.clamp(4, 256);
        c.layers = c.layers.clamp(1, 16);
        c.density = c.density.clamp(0.0, 1.0);
    }

    /// Named tuning preset; unknown names give the defaults.
    pub fn preset(name: &str) -> Self {
        let mut cfg = WorldConfig::default();
        match name {
            "performance" => {
                cfg.rendering.render_distance = 6;
                cfg.rendering.max_chunks_per_frame = 6;
                cfg.trees.leaves.enable_post_processing = false;
            }
            "quality" => {
                cfg.rendering.render_distance = 12;
                cfg.rendering.max_chunks_per_frame = 2;
                cfg.rendering.enable_fog = true;
                cfg.trees.leaves.enable_post_processing = true;
            }
            "debug" => {
                cfg.rendering.render_distance = 4;
                cfg.debug.show_chunk_borders = true;
                cfg.debug.show_chunk_info = true;
                cfg.debug.log_tree_generation = true;
                cfg.debug.log_chunk_generation = true;
            }
            "minimal" => {
                cfg.rendering.render_distance = 3;
                cfg.rendering.max_chunks_per_frame = 1;
                cfg.trees.enabled = false;
                cfg.terrain.lakes.enabled = false;
                cfg.performance.enable_mesh_optimization = false;
            }
            other => {
                log::warn!(target: "config", "unknown preset '{other}', using defaults");
            }
        }
        cfg.validate();
        cfg
    }

    pub fn reset_to_defaults(&mut self) {
        *self = WorldConfig::default();
    }
}

fn lookup_table<'a>(doc: &'a toml::Value, path: &[String]) -> Option<&'a toml::value::Table> {
    let mut cur = doc.as_table()?;
    for part in path {
        cur = cur.get(part)?.as_table()?;
    }
    Some(cur)
}

fn lookup_table_mut<'a>(
    doc: &'a mut toml::Value,
    path: &[String],
) -> Option<&'a mut toml::value::Table> {
    let mut cur = doc.as_table_mut()?;
    for part in path {
        cur = cur.get_mut(part)?.as_table_mut()?;
    }
    Some(cur)
}

/// Coerces `raw` to the type of the existing default and stores it, but only
/// if the document still deserializes afterwards.
fn apply_value(doc: &mut toml::Value, path: &[String], key: &str, raw: &str) -> Result<(), String> {
    let section = lookup_table(doc, path).ok_or("unknown section")?;
    let current = match section.get(key) {
        Some(v) if !v.is_table() => v,
        _ => return Err(format!("unknown key '{key}'")),
    };
    let raw = raw.trim_matches('"');
    let parsed = match current {
        toml::Value::Boolean(_) => match raw.to_ascii_lowercase().as_str() {
            "true" => toml::Value::Boolean(true),
            "false" => toml::Value::Boolean(false),
            _ => return Err(format!("'{raw}' is not a boolean for '{key}'")),
        },
        toml::Value::Integer(_) => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|_| format!("'{raw}' is not an integer for '{key}'"))?,
        toml::Value::Float(_) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(toml::Value::Float)
            .ok_or_else(|| format!("'{raw}' is not a number for '{key}'"))?,
        toml::Value::String(_) => toml::Value::String(raw.to_string()),
        _ => return Err(format!("unsupported value type for '{key}'")),
    };

    let mut candidate = doc.clone();
    if let Some(table) = lookup_table_mut(&mut candidate, path) {
        table.insert(key.to_string(), parsed);
    }
    candidate
        .clone()
        .try_into::<WorldConfig>()
        .map_err(|e| format!("'{raw}' out of range for '{key}' ({e})"))?;
    *doc = candidate;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_nested_sections() {
        let doc = toml::Value::try_from(WorldConfig::default()).unwrap();
        let path = vec!["terrain".to_string(), "heightNoise".to_string()];
        let t = lookup_table(&doc, &path).unwrap();
        assert!(t.contains_key("octaves"));
        assert!(lookup_table(&doc, &["nope".to_string()]).is_none());
    }
}
