//! Configuration types.

use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// Onboarding configuration shared by both wizards.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Delay applied before an uploaded image is encoded.
    pub upload_latency: Duration,
    /// Latency of the in-memory identity service used by the demo binary.
    pub service_latency: Duration,
    /// Name greeted on the organization wizard's welcome step.
    pub default_user_name: Option<String>,
    /// Where the terminal step sends the user.
    pub dashboard_route: String,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            upload_latency: Duration::from_millis(1500),
            service_latency: Duration::from_millis(800),
            default_user_name: None,
            dashboard_route: "/dashboard".to_string(),
        }
    }
}

const UPLOAD_LATENCY_KEY: &str = "ONBOARDING_UPLOAD_LATENCY_MS";
const SERVICE_LATENCY_KEY: &str = "ONBOARDING_SERVICE_LATENCY_MS";

impl OnboardingConfig {
    /// Build config from environment variables, falling back to defaults
    /// for anything missing or unparsable.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok(), false).unwrap_or_default()
    }

    /// Like [`from_env`](Self::from_env), but rejects values that are set
    /// and fail to parse.
    pub fn try_from_env() -> crate::Result<Self> {
        Self::try_from_vars(|key| std::env::var(key).ok())
    }

    fn try_from_vars(var: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        Ok(Self::from_vars(var, true)?)
    }

    /// Build config from `var`, a lookup by variable name.
    ///
    /// With `strict` an unparsable latency is an error; otherwise it is
    /// logged and replaced by its default.
    fn from_vars(var: impl Fn(&str) -> Option<String>, strict: bool) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let latency = |key: &str, default: Duration| match var(key) {
            None => Ok(default),
            Some(raw) => match parse_millis(key, &raw) {
                Ok(latency) => Ok(latency),
                Err(e) if strict => Err(e),
                Err(e) => {
                    warn!(error = %e, "Using default latency");
                    Ok(default)
                }
            },
        };
        let upload_latency = latency(UPLOAD_LATENCY_KEY, defaults.upload_latency)?;
        let service_latency = latency(SERVICE_LATENCY_KEY, defaults.service_latency)?;

        let default_user_name = var("ONBOARDING_USER_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let dashboard_route = var("ONBOARDING_DASHBOARD_ROUTE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.dashboard_route);

        Ok(Self {
            upload_latency,
            service_latency,
            default_user_name,
            dashboard_route,
        })
    }

    /// Zero-latency config for tests.
    pub fn immediate() -> Self {
        Self {
            upload_latency: Duration::ZERO,
            service_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected milliseconds, got {raw:?} ({e})"),
        })
}
