use std::{fs::File, path::PathBuf};

use druid::{im::Vector, Data, Lens};
use icoforge_core::util::{mkdir_if_not_exists, DEFAULT_SIZES};
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "IcoForge";
const CONFIG_FILENAME: &str = "config.json";

#[derive(Clone, Debug, Data, Lens, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: String,
    pub sizes: Vector<u32>,
    pub move_original: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: String::new(),
            sizes: DEFAULT_SIZES.iter().copied().collect(),
            move_original: false,
        }
    }
}

impl Config {
    fn app_dirs() -> Option<AppDirs> {
        const USE_XDG_ON_MACOS: bool = false;

        AppDirs::new(Some(APP_NAME), USE_XDG_ON_MACOS)
    }

    pub fn config_dir() -> Option<PathBuf> {
        Self::app_dirs().map(|dirs| dirs.config_dir)
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILENAME))
    }

    pub fn load() -> Option<Config> {
        let path = Self::config_path()?;
        if let Ok(file) = File::open(&path) {
            log::info!("loading config: {:?}", &path);
            match serde_json::from_reader(file) {
                Ok(config) => Some(config),
                Err(err) => {
                    log::error!("failed to parse config: {}", err);
                    None
                }
            }
        } else {
            None
        }
    }

    pub fn save(&self) {
        let dir = Self::config_dir().expect("Failed to get config dir");
        let path = Self::config_path().expect("Failed to get config path");
        mkdir_if_not_exists(&dir).expect("Failed to create config dir");
        let file = File::create(path).expect("Failed to create config");
        serde_json::to_writer_pretty(file, self).expect("Failed to write config");
    }

    pub fn has_output_dir(&self) -> bool {
        !self.output_dir.is_empty()
    }

    pub fn output_root(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}
