//! Runner configuration
//!
//! Defines all configurable parameters of a job run including
//! gateway connection, stack naming, polling intervals and teardown behaviour.

use std::time::Duration;

/// Default base stack providing the cluster and network
pub const DEFAULT_BASE_STACK: &str = "game-ci";

/// Shortest failsafe time to live; the schedule is expressed in plural minutes
pub const MIN_FAILSAFE_TTL_MINUTES: u32 = 2;

/// Runner configuration
///
/// All timeouts and intervals are configurable to allow tuning
/// for different deployment scenarios (dev vs prod, fast vs slow backends).
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Control-plane gateway base URL (e.g., "http://localhost:8080")
    pub gateway_url: String,

    /// Pre-existing stack that owns the cluster, subnets and security group
    pub base_stack: String,

    /// How often the log stream is polled
    pub poll_interval: Duration,

    /// How long the log stream is still read after the task stopped
    pub stop_grace: Duration,

    /// Pause before re-describing a task that failed to reach running
    pub launch_retry_delay: Duration,

    /// Minutes before the failsafe stack deletes the job stack
    pub failsafe_ttl_minutes: u32,

    /// Whether teardown waits for the failsafe stack to be deleted too
    pub await_failsafe_deletion: bool,

    /// Region of the backend, enables the console link to the job's logs
    pub region: Option<String>,
}

impl RunnerConfig {
    /// Creates a new configuration with defaults
    pub fn new(gateway_url: String) -> Self {
        Self {
            gateway_url,
            base_stack: DEFAULT_BASE_STACK.to_string(),
            poll_interval: Duration::from_millis(1500),
            stop_grace: Duration::from_secs(30),
            launch_retry_delay: Duration::from_secs(3),
            failsafe_ttl_minutes: 100,
            await_failsafe_deletion: true,
            region: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SKIFF_GATEWAY_URL (required before running a job)
    /// - SKIFF_BASE_STACK (optional, default: game-ci)
    /// - SKIFF_POLL_INTERVAL_MS (optional, milliseconds, default: 1500)
    /// - SKIFF_STOP_GRACE_SECS (optional, seconds, default: 30)
    /// - SKIFF_LAUNCH_RETRY_DELAY_SECS (optional, seconds, default: 3)
    /// - SKIFF_FAILSAFE_TTL_MINUTES (optional, default: 100)
    /// - SKIFF_AWAIT_FAILSAFE_DELETION (optional, default: true)
    /// - SKIFF_REGION (optional)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from any key lookup
    ///
    /// Unset keys fall back to defaults; set keys must parse.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(lookup("SKIFF_GATEWAY_URL").unwrap_or_default());

        if let Some(base_stack) = lookup("SKIFF_BASE_STACK") {
            config.base_stack = base_stack;
        }

        if let Some(ms) = parse::<u64>(&lookup, "SKIFF_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(secs) = parse::<u64>(&lookup, "SKIFF_STOP_GRACE_SECS")? {
            config.stop_grace = Duration::from_secs(secs);
        }

        if let Some(secs) = parse::<u64>(&lookup, "SKIFF_LAUNCH_RETRY_DELAY_SECS")? {
            config.launch_retry_delay = Duration::from_secs(secs);
        }

        if let Some(minutes) = parse::<u32>(&lookup, "SKIFF_FAILSAFE_TTL_MINUTES")? {
            config.failsafe_ttl_minutes = minutes;
        }

        if let Some(wait) = parse::<bool>(&lookup, "SKIFF_AWAIT_FAILSAFE_DELETION")? {
            config.await_failsafe_deletion = wait;
        }

        config.region = lookup("SKIFF_REGION").filter(|r| !r.is_empty());

        Ok(config)
    }

    /// Console link to the job's log group, when a region is configured
    pub fn console_link(&self, log_group: &str) -> Option<String> {
        self.region
            .as_deref()
            .map(|region| console_link(region, log_group))
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.gateway_url.is_empty() {
            anyhow::bail!("gateway_url cannot be empty (set SKIFF_GATEWAY_URL or --gateway-url)");
        }

        if !self.gateway_url.starts_with("http://") && !self.gateway_url.starts_with("https://") {
            anyhow::bail!("gateway_url must start with http:// or https://");
        }

        if self.base_stack.is_empty() {
            anyhow::bail!("base_stack cannot be empty");
        }

        if !self
            .base_stack
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            anyhow::bail!("base_stack may only contain ASCII letters, digits and '-'");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.failsafe_ttl_minutes < MIN_FAILSAFE_TTL_MINUTES {
            anyhow::bail!(
                "failsafe_ttl_minutes must be at least {}",
                MIN_FAILSAFE_TTL_MINUTES
            );
        }

        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080".to_string())
    }
}

/// Console link to a log group in a region
pub fn console_link(region: &str, log_group: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/cloudwatch/home?region={region}#logsV2:log-groups/log-group/{log_group}"
    )
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("invalid value '{}' for {}: {}", raw, key, e))
        })
        .transpose()
}
