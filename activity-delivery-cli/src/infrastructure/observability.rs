use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub default_level: tracing::Level,
    pub json_format: bool,
    pub chrome_trace: bool,
    pub show_thread_ids: bool,
    pub show_targets: bool,
    /// Logs go to stderr; stdout is reserved for command output
    pub show_logs: bool,

    #[cfg(feature = "console")]
    pub enable_console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::WARN,
            json_format: false,
            chrome_trace: false,
            show_thread_ids: false,
            show_targets: true,
            show_logs: true,
            #[cfg(feature = "console")]
            enable_console: false,
        }
    }
}

impl LogConfig {
    /// Development configuration (verbose, human-readable)
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    /// Level from the number of `-v` flags
    pub fn from_verbosity(verbose: u8) -> Self {
        let default_level = match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };
        Self {
            default_level,
            ..Default::default()
        }
    }

    pub fn with_json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable Chrome tracing
    pub fn with_chrome_trace(mut self) -> Self {
        self.chrome_trace = true;
        self
    }

    /// Enable tokio console
    #[cfg(feature = "console")]
    pub fn with_console(mut self) -> Self {
        self.enable_console = true;
        self
    }

    pub fn without_logs(mut self) -> Self {
        self.show_logs = false;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = self.default_level.to_string().to_lowercase();
            EnvFilter::new(format!(
                "activity_delivery_cli={level},activity_delivery_bridge={level},activity_delivery_core={level}"
            ))
        })
    }

    pub fn init(self) -> Result<(), String> {
        let env_filter = self.env_filter();

        #[cfg(feature = "chrome-trace")]
        if self.chrome_trace {
            use tracing_chrome::ChromeLayerBuilder;

            let (chrome_layer, guard) = ChromeLayerBuilder::new().build();

            if self.show_logs {
                eprintln!("Chrome trace enabled (trace-<timestamp>.json, view at https://ui.perfetto.dev/)");
            }

            tracing_subscriber::registry()
                .with(env_filter)
                .with(chrome_layer)
                .with(
                    self.show_logs
                        .then(|| fmt::layer().with_writer(std::io::stderr).compact()),
                )
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {}", e))?;

            // Flushes on drop; keep it for the life of the process
            std::mem::forget(guard);
            return Ok(());
        }

        #[cfg(feature = "console")]
        if self.enable_console {
            use console_subscriber::ConsoleLayer;

            if self.show_logs {
                eprintln!("Tokio console listening on 127.0.0.1:6669");
            }

            let console_layer = ConsoleLayer::builder()
                .server_addr(([127, 0, 0, 1], 6669))
                .spawn();

            return tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {}", e));
        }

        if !self.show_logs {
            return tracing_subscriber::registry()
                .with(env_filter)
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {}", e));
        }

        if self.json_format {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {}", e))
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(self.show_targets)
                        .with_thread_ids(self.show_thread_ids),
                )
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {}", e))
        }
    }
}
