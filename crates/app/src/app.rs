use paths::PathContext;
use std::marker::PhantomData;
#[cfg(debug_assertions)]
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application infrastructure context.
///
/// Contains path management, version info, and logging infrastructure.
pub struct AppContext {
    pub path_context: PathContext,
    pub version: &'static str,
    /// The log guard must be kept alive for the duration of the application
    /// to ensure log messages are properly flushed.
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.path_context.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }
}

/// Application metadata trait.
///
/// Define your application's identity by implementing this trait.
/// This is a pure marker trait - no logic, just constants.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "volunteer_ai";
    const PROJECT_ID: &'static str = "volunteer_hub";
}

/// Builder for creating applications with proper initialization.
pub struct AppBuilder<A: Application> {
    path_context: PathContext,
    version: &'static str,
    console: bool,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Create a new application builder.
    ///
    /// Sets up the path context (platform-specific directories) and makes sure
    /// all directories exist. Logging is installed by [`AppBuilder::build`].
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        let app_id = A::APP_ID;
        let studio = A::STUDIO;
        let project_id = A::PROJECT_ID;

        #[cfg(debug_assertions)]
        let path_context = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join(".out"),
            studio,
            project_id,
            app_id,
        );
        #[cfg(not(debug_assertions))]
        let path_context = PathContext::new(studio, project_id, app_id);

        path_context.ensure_directories()?;

        Ok(Self {
            path_context,
            version,
            console: true,
            _marker: PhantomData,
        })
    }

    /// Toggle the stdout log layer.
    ///
    /// Terminal UIs draw on the alternate screen; anything written to stdout
    /// while it is active ends up in the middle of the frame.
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Install logging (file + optional console) and return the context.
    pub fn build(self) -> Result<AppContext, BoxError> {
        let log_file_path = self.path_context.log_file_now();
        let log_dir = log_file_path
            .parent()
            .ok_or("log file path has no parent directory")?;
        let log_filename = log_file_path
            .file_name()
            .ok_or("log file path has no file name")?;

        let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        #[cfg(debug_assertions)]
        let level = LevelFilter::INFO;

        #[cfg(not(debug_assertions))]
        let level = LevelFilter::WARN;

        // RUST_LOG gewinnt, sonst gilt das Build-Profil
        let env_filter = || {
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy()
        };

        let file_layer = fmt::Layer::default()
            .with_target(false)
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(env_filter());

        let console_layer = self.console.then(|| {
            fmt::Layer::default()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(env_filter())
        });

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .with(tracing_error::ErrorLayer::default())
            .try_init()?;

        tracing::info!(
            app = A::APP_ID,
            version = self.version,
            log = %log_file_path.display(),
            "logging initialized"
        );

        Ok(AppContext {
            path_context: self.path_context,
            version: self.version,
            _log_guard: guard,
        })
    }
}

/// Shorthand for `AppBuilder::<A>::new(version)?.console(console).build()`.
pub fn init<A: Application>(version: &'static str, console: bool) -> Result<AppContext, BoxError> {
    AppBuilder::<A>::new(version)?.console(console).build()
}
