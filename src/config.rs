use confique::{yaml::FormatOptions, Config as _};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Confique(#[from] confique::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not determine config dir parent path")]
    ParentPath,

    #[error(transparent)]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

/// Client surface the form runs on. Decides the loopback address of a local server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Web,
    Ios,
    Android,
    Desktop,
}

impl Platform {
    /// The Android emulator cannot see the host's `localhost`, it is reachable at `10.0.2.2`.
    pub fn loopback_base_url(&self) -> &'static str {
        match self {
            Platform::Android => "http://10.0.2.2:8000",
            Platform::Web | Platform::Ios | Platform::Desktop => "http://127.0.0.1:8000",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, confique::Config)]
pub struct Config {
    /// Base address of the registration service. Defaults to the platform's loopback address.
    #[config(env = "SIGNUP_BASE_URL")]
    pub base_url: Option<String>,

    /// Client platform: web, ios, android or desktop
    #[config(default = "web")]
    pub platform: Platform,

    /// Path of the registration resource
    #[config(env = "SIGNUP_REGISTER_PATH", default = "/register")]
    pub register_path: String,

    /// Request timeout in seconds
    #[config(default = 10)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Config> {
        let config_path = get_config_path(config_path)?;
        let config = Config::builder().env().file(config_path).load()?;

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.platform.loopback_base_url())
    }

    /// Full registration URL, joining base and path with exactly one slash.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url().trim_end_matches('/'),
            self.register_path.trim_start_matches('/')
        )
    }
}

pub fn init_config(config_path: Option<PathBuf>) -> Result<PathBuf> {
    // @TODO this will overwrite an existing config with no warning.
    write_config_template(config_path)
}

pub fn get_config_template() -> String {
    confique::yaml::template::<Config>(FormatOptions::default())
}

pub fn print_config_template() {
    println!("{}", get_config_template());
}

pub fn get_config_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => {
            let xdg_dirs = xdg::BaseDirectories::with_prefix("signup")?;
            Ok(xdg_dirs.get_config_file("config.yml"))
        }
    }
}

pub fn write_config_template(config_path: Option<PathBuf>) -> Result<PathBuf> {
    let config_path = get_config_path(config_path)?;
    let config_template = get_config_template();

    let config_path_dir = config_path.parent().ok_or(Error::ParentPath)?;

    std::fs::create_dir_all(config_path_dir)?;
    std::fs::write(config_path.clone(), config_template)?;

    Ok(config_path)
}
