//! Where the desk keeps its logs and exported files.
//!
//! Layout: `<base>/<studio>/<project_id>/{logs,downloads}`. The base is the
//! crate directory while running under cargo and the platform data dir
//! (`dirs::data_local_dir`) for an installed binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// `cargo run` / `cargo test`
    Development,
    /// Installed binary
    Production,
}

impl RuntimeEnvironment {
    fn detect() -> Self {
        let built_by_cargo = std::env::current_exe()
            .map(|exe| exe.components().any(|c| c.as_os_str() == "target"))
            .unwrap_or(false);
        if built_by_cargo || std::env::var_os("CARGO_MANIFEST_DIR").is_some() {
            RuntimeEnvironment::Development
        } else {
            RuntimeEnvironment::Production
        }
    }

    fn base_path(self) -> PathBuf {
        match self {
            RuntimeEnvironment::Development => std::env::var_os("CARGO_MANIFEST_DIR")
                .map(PathBuf::from)
                .or_else(|| std::env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from(".")),
            // Ohne Plattformverzeichnis (z.B. minimaler Container) im Arbeitsverzeichnis
            RuntimeEnvironment::Production => dirs::data_local_dir()
                .map(|dir| dir.join("Volunteer_Hub"))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Project-aware directory layout for one application.
#[derive(Debug, Clone)]
pub struct PathContext {
    environment: RuntimeEnvironment,
    base_path: Arc<Path>,
    studio: String,
    project_id: String,
    app_id: &'static str,
}

impl PathContext {
    pub fn new(
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        let environment = RuntimeEnvironment::detect();
        Self::build(environment, environment.base_path(), studio, project_id, app_id)
    }

    /// Fixed base directory, used by debug builds and tests.
    pub fn with_base_path(
        base_path: PathBuf,
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        Self::build(
            RuntimeEnvironment::detect(),
            base_path,
            studio,
            project_id,
            app_id,
        )
    }

    fn build(
        environment: RuntimeEnvironment,
        base_path: PathBuf,
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        Self {
            environment,
            base_path: base_path.into(),
            studio: studio.into(),
            project_id: project_id.into(),
            app_id,
        }
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    pub fn app_id(&self) -> &str {
        self.app_id
    }

    /// `<base>/<studio>/<project_id>`
    pub fn project_root(&self) -> PathBuf {
        self.base_path.join(&self.studio).join(&self.project_id)
    }

    /// Default target of exports: `<root>/downloads/`
    pub fn downloads_dir(&self) -> PathBuf {
        self.project_root().join("downloads")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.project_root().join("logs")
    }

    /// `<root>/logs/<app_id>.<timestamp>.log`
    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.{}.log", self.app_id, timestamp))
    }

    /// One log file per start.
    pub fn log_file_now(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        self.log_file(&timestamp)
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [self.downloads_dir(), self.logs_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
