use coffee_auth::AuthConfig;
use config::{Config as ConfigCrate, ConfigError, Environment};
use serde::Deserialize;

/// Main configuration structure for the drinks server
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// The port the server will listen to (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Identity provider and token validation settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Whether to create the house drink on startup (default: true)
    #[serde(default = "default_seed_drinks")]
    pub seed_drinks: bool,
}

fn default_port() -> u16 {
    5000
}

fn default_seed_drinks() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: default_port(),
            auth: AuthConfig::default(),
            seed_drinks: default_seed_drinks(),
        }
    }
}

impl Settings {
    /// Creates a new Settings instance from `COFFEE_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `COFFEE_AUTH__DOMAIN`;
    /// `COFFEE_AUTH__ALGORITHMS` takes a comma separated list.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_environment(Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("COFFEE")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("auth.algorithms")
            .try_parsing(true)
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        ConfigCrate::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    #[cfg(test)]
    pub fn for_test(auth: AuthConfig) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            auth,
            seed_drinks: false,
        }
    }
}
