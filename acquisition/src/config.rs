use std::time::Duration;

/// Tuning for an acquisition session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionConfig {
    /// A fix at or below this accuracy (meters) ends the session.
    pub desired_accuracy_m: f64,
    /// Give up if no fix arrives within this long after `start()`.
    pub timeout: Duration,
    /// Readings measured longer ago than this are cached, not live.
    pub max_sample_age: Duration,
    /// Readings closer than this (meters) to the best fix count as "not moving".
    pub convergence_distance_m: f64,
    /// How long the position must stay put before the search stops.
    pub convergence_interval: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            desired_accuracy_m: 10.0,
            timeout: Duration::from_secs(60),
            max_sample_age: Duration::from_secs(5),
            convergence_distance_m: 1.0,
            convergence_interval: Duration::from_secs(10),
        }
    }
}

impl AcquisitionConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accuracy that ends the search.
    #[must_use]
    pub const fn desired_accuracy(mut self, meters: f64) -> Self {
        self.desired_accuracy_m = meters;
        self
    }

    /// Set the session timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum age of an accepted reading.
    #[must_use]
    pub const fn max_sample_age(mut self, age: Duration) -> Self {
        self.max_sample_age = age;
        self
    }

    /// Set the convergence distance and interval.
    #[must_use]
    pub const fn convergence(mut self, distance_m: f64, interval: Duration) -> Self {
        self.convergence_distance_m = distance_m;
        self.convergence_interval = interval;
        self
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AcquisitionConfig::default();
        assert!((config.desired_accuracy_m - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_sample_age, Duration::from_secs(5));
        assert_eq!(config.convergence_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_setters() {
        let config = AcquisitionConfig::new()
            .desired_accuracy(25.0)
            .timeout(Duration::from_secs(5))
            .convergence(2.0, Duration::from_secs(3));
        assert!((config.desired_accuracy_m - 25.0).abs() < f64::EPSILON);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!((config.convergence_distance_m - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.convergence_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
