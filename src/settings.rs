use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use skirmish_navigation::{DEFAULT_MAX_SEARCH_DISTANCE, GridCoord};
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const LOCAL_CONFIG_PATH: &str = "config/local.toml";
const ENV_PREFIX: &str = "SKIRMISH";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub world: WorldSettings,
    #[serde(default)]
    pub pathfinding: PathfindingSettings,
    #[serde(default)]
    pub movement: MovementSettings,
    #[serde(default)]
    pub combat: CombatSettings,
    #[serde(default)]
    pub players: Vec<PlayerSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldSettings {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub trees: usize,
    #[serde(default)]
    pub rocks: usize,
    #[serde(default)]
    pub bushes: usize,
    /// Scenery and AI seed. Random when absent.
    pub seed: Option<u64>,
    #[serde(default)]
    pub show_path_debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathfindingSettings {
    pub max_search_distance: u32,
}

impl Default for PathfindingSettings {
    fn default() -> Self {
        Self {
            max_search_distance: DEFAULT_MAX_SEARCH_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovementSettings {
    pub tick_ms: u64,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self { tick_ms: 300 }
    }
}

impl MovementSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombatSettings {
    pub max_rounds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Ai,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSettings {
    pub name: String,
    pub kind: PlayerKind,
    pub spawn: GridCoord,
}

impl Settings {
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}

/// Layers `config/default.toml`, an optional `config/local.toml` and
/// `SKIRMISH__SECTION__KEY` environment overrides.
pub fn load_settings() -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(File::new(LOCAL_CONFIG_PATH, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(Settings::from_config);

    match settings {
        Ok(settings) => {
            info!(
                width = settings.world.width,
                height = settings.world.height,
                players = settings.players.len(),
                "Successfully loaded configuration"
            );
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
