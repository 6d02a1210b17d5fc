//! Config for the balancer service behaviors
//!
//! This module provides configuration options for controlling the behavior of the balancer and
//! of the HTTP service around it.
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override configuration values. All
//! values are optional. Values that cannot be parsed, and zero or negative worker counts and
//! durations, are ignored (with a warning) and the default is kept.
//!
//! - `BALANCER_BIND` — Address the HTTP server listens on (default: `0.0.0.0:8000`)
//! - `BALANCER_LOG` — Set to `"true"` to log to a file instead of stderr (default: `false`)
//! - `BALANCER_WORKERS` — Worker threads per search (default: physical CPU count)
//! - `BALANCER_DEFAULT_NUM_TEAMS` — Team count when the caller sends none (default: `2`)
//! - `BALANCER_DEFAULT_TIME_LIMIT_SECS` — Search budget when the caller sends none (default: `30`)
//! - `BALANCER_DEFAULT_NUM_ATTEMPTS` — Attempt ceiling when the caller sends none (default: `5`)
//! - `BALANCER_MAX_TIME_LIMIT_SECS` — Largest accepted search budget (default: `300`)
//! - `BALANCER_MAX_ATTEMPTS` — Largest accepted attempt ceiling (default: `1000`)
//! - `BALANCER_MAX_SWAP_PASSES` — Hill-climbing passes per attempt (default: `50`)

use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};

use tracing::warn;

use crate::normalizer::{RequestDefaults, RequestLimits};
use crate::objective::ObjectiveWeights;

/// Configuration for balancer behaviors.
#[derive(Debug, Clone, Copy)]
pub struct Configuration {
    pub(crate) bind_address: SocketAddr,
    pub(crate) log: bool,
    pub(crate) workers: usize,
    pub(crate) defaults: RequestDefaults,
    pub(crate) limits: RequestLimits,
    pub(crate) max_swap_passes: usize,
    pub(crate) weights: ObjectiveWeights,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - The server listens on `0.0.0.0:8000`.
    /// - Logs go to stderr.
    /// - Each search uses one worker thread per physical CPU.
    /// - Requests default to 2 teams, a 30 second budget and 5 attempts.
    /// - Budgets above 300 seconds and more than 1000 attempts are rejected.
    /// - Each attempt runs at most 50 hill-climbing passes.
    pub fn new() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8000)),
            log: false,
            workers: num_cpus::get_physical().max(1),
            defaults: RequestDefaults::default(),
            limits: RequestLimits::default(),
            max_swap_passes: 50,
            weights: ObjectiveWeights::default(),
        }
    }

    /// Create configuration from environment variables, see the module documentation.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn get_env_parsed<T: FromStr>(var: &str) -> Option<T> {
            let raw = env::var(var).ok()?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(var, value = %raw, "ignoring unparseable environment variable");
                    None
                }
            }
        }

        fn get_env_positive(var: &str) -> Option<usize> {
            match get_env_parsed::<usize>(var)? {
                0 => {
                    warn!(var, "ignoring zero environment variable");
                    None
                }
                value => Some(value),
            }
        }

        fn get_env_secs(var: &str) -> Option<Duration> {
            let secs = get_env_parsed::<f64>(var)?;
            match Duration::try_from_secs_f64(secs) {
                Ok(duration) if !duration.is_zero() => Some(duration),
                _ => {
                    warn!(var, secs, "ignoring non-positive duration");
                    None
                }
            }
        }

        let default = Self::new();
        Self {
            bind_address: get_env_parsed("BALANCER_BIND").unwrap_or(default.bind_address),
            log: get_env_flag("BALANCER_LOG", default.log),
            workers: get_env_positive("BALANCER_WORKERS").unwrap_or(default.workers),
            defaults: RequestDefaults {
                num_teams: get_env_parsed("BALANCER_DEFAULT_NUM_TEAMS")
                    .unwrap_or(default.defaults.num_teams),
                time_limit: get_env_secs("BALANCER_DEFAULT_TIME_LIMIT_SECS")
                    .unwrap_or(default.defaults.time_limit),
                num_attempts: get_env_parsed("BALANCER_DEFAULT_NUM_ATTEMPTS")
                    .unwrap_or(default.defaults.num_attempts),
            },
            limits: RequestLimits {
                max_time_limit: get_env_secs("BALANCER_MAX_TIME_LIMIT_SECS")
                    .unwrap_or(default.limits.max_time_limit),
                max_attempts: get_env_parsed("BALANCER_MAX_ATTEMPTS")
                    .unwrap_or(default.limits.max_attempts),
            },
            max_swap_passes: get_env_parsed("BALANCER_MAX_SWAP_PASSES")
                .unwrap_or(default.max_swap_passes),
            weights: default.weights,
        }
    }

    /// Address the HTTP server listens on.
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Whether logs go to a file.
    pub fn log(&self) -> bool {
        self.log
    }

    /// Set the address the HTTP server listens on.
    pub fn with_bind_address(mut self, value: SocketAddr) -> Self {
        self.bind_address = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Set the number of worker threads used by one search (at least one).
    pub fn with_workers(mut self, value: usize) -> Self {
        self.workers = value.max(1);
        self
    }

    /// Set the values used for parameters a caller leaves out.
    pub fn with_defaults(mut self, value: RequestDefaults) -> Self {
        self.defaults = value;
        self
    }

    /// Set the bounds enforced on caller parameters.
    pub fn with_limits(mut self, value: RequestLimits) -> Self {
        self.limits = value;
        self
    }

    /// Set the number of hill-climbing passes per attempt.
    pub fn with_max_swap_passes(mut self, value: usize) -> Self {
        self.max_swap_passes = value;
        self
    }

    /// Set the weights of the fairness objective.
    pub fn with_weights(mut self, value: ObjectiveWeights) -> Self {
        self.weights = value;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = Configuration::new()
            .with_workers(0)
            .with_max_swap_passes(3)
            .with_log(true);
        assert_eq!(config.workers, 1);
        assert_eq!(config.max_swap_passes, 3);
        assert!(config.log());
        assert_eq!(config.bind_address().port(), 8000);
    }

    #[test]
    fn test_defaults_match_form_values() {
        let config = Configuration::default();
        assert_eq!(config.defaults.num_teams, 2);
        assert_eq!(config.defaults.time_limit, Duration::from_secs(30));
        assert_eq!(config.defaults.num_attempts, 5);
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_from_env() {
        // env vars are process wide, so every case lives in this one test
        let vars = [
            ("BALANCER_WORKERS", "abc"),
            ("BALANCER_DEFAULT_TIME_LIMIT_SECS", "-1"),
            ("BALANCER_MAX_TIME_LIMIT_SECS", "0"),
            ("BALANCER_DEFAULT_NUM_ATTEMPTS", "0x10"),
            ("BALANCER_MAX_ATTEMPTS", "7"),
            ("BALANCER_DEFAULT_NUM_TEAMS", " 4 "),
            ("BALANCER_MAX_SWAP_PASSES", "12"),
            ("BALANCER_BIND", "127.0.0.1:9100"),
            ("BALANCER_LOG", "TRUE"),
        ];
        for (var, value) in vars {
            env::set_var(var, value);
        }
        let config = Configuration::from_env();
        for (var, _) in vars {
            env::remove_var(var);
        }

        let default = Configuration::new();
        assert_eq!(config.workers, default.workers);
        assert_eq!(config.defaults.time_limit, default.defaults.time_limit);
        assert_eq!(config.limits.max_time_limit, default.limits.max_time_limit);
        assert_eq!(config.defaults.num_attempts, default.defaults.num_attempts);

        assert_eq!(config.limits.max_attempts, 7);
        assert_eq!(config.defaults.num_teams, 4);
        assert_eq!(config.max_swap_passes, 12);
        assert_eq!(config.bind_address(), "127.0.0.1:9100".parse::<SocketAddr>().unwrap());
        assert!(config.log());

        env::set_var("BALANCER_WORKERS", "0");
        assert_eq!(Configuration::from_env().workers, default.workers);
        env::set_var("BALANCER_WORKERS", "3");
        assert_eq!(Configuration::from_env().workers, 3);
        env::remove_var("BALANCER_WORKERS");
    }
}
