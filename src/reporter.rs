//! Diagnostic reporting for configuration resolution.
//!
//! The resolver never writes to the terminal directly. It emits diagnostics
//! through a [`Reporter`] supplied by the caller so that the pipeline step
//! decides where messages end up.

/// Tracing target used for resolver diagnostics.
pub const REPORTER_TARGET: &str = "synthetics_step::config";

/// A sink for informational and error diagnostics.
pub trait Reporter: Send + Sync {
    /// Records an informational message.
    fn info(&self, message: &str);

    /// Records an error message.
    fn error(&self, message: &str);
}

/// Reporter that drops all messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn info(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

/// Forwards diagnostics to the active `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!(target: REPORTER_TARGET, "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: REPORTER_TARGET, "{message}");
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{Level, RecordingReporter};
    use super::{NoopReporter, Reporter, TracingReporter};

    #[test]
    fn recording_reporter_captures_messages_in_order() {
        let reporter = RecordingReporter::default();
        reporter.info("config file not found");
        reporter.error("config file is malformed");

        assert_eq!(
            reporter.take(),
            vec![
                (Level::Info, "config file not found".to_owned()),
                (Level::Error, "config file is malformed".to_owned()),
            ]
        );
        assert!(reporter.take().is_empty(), "take should drain messages");
    }

    #[test]
    fn silent_reporters_accept_messages() {
        let reporters: [&dyn Reporter; 2] = [&NoopReporter, &TracingReporter];
        for reporter in reporters {
            reporter.info("informational");
            reporter.error("failure");
        }
    }
}
