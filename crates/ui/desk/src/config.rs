use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::state::ExportTiming;
use crate::domain::forms::{AgeGate, RequiredFields, age::DEFAULT_MIN_AGE, catalog};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub success_delay_ms: u64,
    pub reset_delay_ms: u64,
    /// Defaults to the project's downloads dir.
    pub download_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            success_delay_ms: 1000,
            reset_delay_ms: 2000,
            download_dir: None,
        }
    }
}

/// Overrides of the built-in required-field messages.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    pub min_age: i64,
    pub opportunity: RequiredFields,
    pub signup: RequiredFields,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            min_age: DEFAULT_MIN_AGE,
            opportunity: RequiredFields::default(),
            signup: RequiredFields::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate: f64,
    pub frame_rate: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate: 4.0,
            frame_rate: 30.0,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub forms: FormsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Defaults, then `config.json5` / `config.toml`, then `DESK__SECTION__KEY` variables.
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(&get_config_dir(), &get_data_dir(), true)
    }

    pub fn load(
        config_dir: &Path,
        data_dir: &Path,
        with_env: bool,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            debug!(
                "no configuration file in {}, using defaults",
                config_dir.display()
            );
        }
        if with_env {
            builder = builder.add_source(
                config::Environment::with_prefix(PROJECT_NAME.as_str())
                    .prefix_separator("__")
                    .separator("__"),
            );
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        if cfg.portal.timeout_secs == 0 {
            warn!("portal.timeout_secs is 0; requests will time out immediately");
        }
        Ok(cfg)
    }

    pub fn timing(&self) -> ExportTiming {
        ExportTiming {
            success_delay: Duration::from_millis(self.export.success_delay_ms),
            reset_delay: Duration::from_millis(self.export.reset_delay_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.portal.timeout_secs)
    }

    pub fn download_dir(&self, fallback: &Path) -> PathBuf {
        self.export
            .download_dir
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }

    pub fn opportunity_required(&self) -> RequiredFields {
        catalog::opportunity_required().merge(&self.forms.opportunity)
    }

    pub fn signup_required(&self) -> RequiredFields {
        catalog::signup_required().merge(&self.forms.signup)
    }

    pub fn age_gate(&self) -> AgeGate {
        AgeGate::new(self.forms.min_age)
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "volunteer_ai", env!("CARGO_PKG_NAME"))
}

pub fn ensure_data_and_config_dirs_exist() -> std::io::Result<()> {
    let data_dir = get_data_dir();
    let config_dir = get_config_dir();

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("desk_cfg_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_without_file() {
        let dir = temp_dir("defaults");
        let cfg = Config::load(&dir, &dir, false).unwrap();
        assert_eq!(cfg.portal.base_url, "http://127.0.0.1:8000");
        assert_eq!(cfg.timing(), ExportTiming::default());
        assert_eq!(cfg.forms.min_age, 18);
        assert_eq!(cfg.ui.frame_rate, 30.0);
        assert_eq!(cfg.config.config_dir, dir);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn toml_file_overrides_sections() {
        let dir = temp_dir("toml");
        fs::write(
            dir.join("config.toml"),
            r#"
[portal]
base_url = "http://portal.example:9000"

[export]
success_delay_ms = 50
download_dir = "/tmp/exports"

[forms.signup]
name = "Bitte Namen angeben."
"#,
        )
        .unwrap();

        let cfg = Config::load(&dir, &dir, false).unwrap();
        assert_eq!(cfg.portal.base_url, "http://portal.example:9000");
        assert_eq!(cfg.portal.timeout_secs, 10);
        assert_eq!(cfg.timing().success_delay, Duration::from_millis(50));
        assert_eq!(cfg.timing().reset_delay, Duration::from_millis(2000));
        assert_eq!(
            cfg.download_dir(Path::new("/fallback")),
            PathBuf::from("/tmp/exports")
        );

        let signup = cfg.signup_required();
        assert_eq!(signup.message("name"), Some("Bitte Namen angeben."));
        assert_eq!(signup.message("age"), Some("Age is required."));
        let _ = fs::remove_dir_all(dir);
    }
}
