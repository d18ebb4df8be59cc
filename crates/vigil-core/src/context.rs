use std::time::{Duration, Instant};

use crate::error::{ProbeError, ProbeResult};

/// Execution context handed to a probe by the scheduler.
///
/// Carries the absolute deadline for the whole check. Probes derive a single
/// operation timeout from it and refuse to run unbounded.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    deadline: Option<Instant>,
}

impl CheckContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Convenience for callers that think in budgets rather than deadlines.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, floored to whole seconds.
    ///
    /// A deadline already in the past yields a zero timeout; downstream I/O
    /// then fails immediately with a timeout error.
    pub fn timeout(&self) -> ProbeResult<Duration> {
        let deadline = self
            .deadline
            .ok_or_else(|| ProbeError::Config("context deadline is not set".into()))?;
        let remaining = deadline.saturating_duration_since(Instant::now());
        Ok(Duration::from_secs(remaining.as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_deadline_is_a_config_error() {
        let ctx = CheckContext::new();
        match ctx.timeout() {
            Err(ProbeError::Config(msg)) => assert!(msg.contains("deadline")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn timeout_floors_to_whole_seconds() {
        let ctx = CheckContext::with_deadline(Instant::now() + Duration::from_millis(1900));
        assert_eq!(ctx.timeout().unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn sub_second_remainder_floors_to_zero() {
        let ctx = CheckContext::with_deadline(Instant::now() + Duration::from_millis(900));
        assert_eq!(ctx.timeout().unwrap(), Duration::ZERO);
    }

    #[test]
    fn past_deadline_yields_zero_timeout() {
        let ctx = CheckContext::with_deadline(Instant::now() - Duration::from_secs(1));
        assert_eq!(ctx.timeout().unwrap(), Duration::ZERO);
    }
}
