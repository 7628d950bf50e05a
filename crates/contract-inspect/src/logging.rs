use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable. A second call is a no-op.
pub fn init(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_new(cfg.level.trim()).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if cfg.format.trim().eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_harmless_when_repeated() {
        let json = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };
        init(&json);
        assert!(tracing::dispatcher::has_been_set());

        init(&json);
        init(&LoggingConfig {
            level: "not a level!!".to_string(),
            format: "console".to_string(),
        });
        tracing::warn!("still logging after repeated init");
        assert!(tracing::dispatcher::has_been_set());
    }
}
