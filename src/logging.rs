use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting JSON output
pub const LOG_JSON_ENV: &str = "SPAMMER_LOG_JSON";

/// Filter used when `RUST_LOG` is unset; keeps HTTP internals out of the way
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Format chosen by [`LOG_JSON_ENV`]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(LOG_JSON_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("1") | Some("true") | Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global subscriber on stderr.
///
/// `RUST_LOG` overrides the default filter. Calling it twice is harmless.
pub fn init_logging() {
    init_logging_with(LogFormat::from_env());
}

pub fn init_logging_with(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
