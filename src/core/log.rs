use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber. `RUST_LOG` replaces the `level` defaults when set.
pub fn init_logging(level: LevelFilter) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(log_filter(level, rust_log.as_deref()))
        .init();
}

/// App and HTTP request events follow `level` unless explicit directives are given.
fn log_filter(level: LevelFilter, directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| {
            let level = level.to_string().to_lowercase();
            EnvFilter::new(format!("vpsval={level},tower_http={level}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn enabled_under(filter: EnvFilter) -> (bool, bool) {
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            (
                tracing::enabled!(target: "vpsval", Level::DEBUG),
                tracing::enabled!(target: "tower_http", Level::DEBUG),
            )
        })
    }

    #[test]
    fn test_verbose_enables_request_tracing() {
        assert_eq!(enabled_under(log_filter(LevelFilter::DEBUG, None)), (true, true));
    }

    #[test]
    fn test_off_silences_everything() {
        assert_eq!(enabled_under(log_filter(LevelFilter::OFF, None)), (false, false));
    }

    #[test]
    fn test_rust_log_overrides_level() {
        let filter = log_filter(LevelFilter::OFF, Some("debug"));
        assert_eq!(enabled_under(filter), (true, true));

        let filter = log_filter(LevelFilter::DEBUG, Some("vpsval=debug,tower_http=off"));
        assert_eq!(enabled_under(filter), (true, false));
    }

    #[test]
    fn test_invalid_rust_log_falls_back_to_level() {
        let filter = log_filter(LevelFilter::INFO, Some("vpsval=notalevel"));
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "tower_http", Level::INFO));
            assert!(!tracing::enabled!(target: "tower_http", Level::DEBUG));
        });
    }
}
