//! Synthesis input and the ways to load it.
//!
//! A [`NetworkConfig`] can be built in code, read from a JSON file or
//! assembled from environment variables (after `.env` has been loaded).

use crate::error::{Result, SynthError};
use crate::processing::TopologyMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters for one synthesis call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Top-level block to subdivide, e.g. "10.0.0.0/20".
    pub base_cidr: String,
    /// Prefix applied to every generated resource name.
    pub name_prefix: String,
    /// Selects NAT-routed (true) or isolated (false) private subnets.
    #[serde(default)]
    pub nat_enabled: bool,
    /// Region used for the DHCP options domain; `None` skips DHCP options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Add an interface endpoint for the API gateway service.
    #[serde(default)]
    pub api_endpoint: bool,
}

impl NetworkConfig {
    pub fn new(base_cidr: &str, name_prefix: &str, nat_enabled: bool) -> NetworkConfig {
        NetworkConfig {
            base_cidr: base_cidr.to_string(),
            name_prefix: name_prefix.to_string(),
            nat_enabled,
            region: None,
            api_endpoint: false,
        }
    }

    /// The one place the NAT flag turns into a [`TopologyMode`].
    pub fn mode(&self) -> TopologyMode {
        TopologyMode::select(self.nat_enabled)
    }

    /// DHCP domain derived from the region, e.g. "eu-west-1.compute.internal".
    pub fn dhcp_domain(&self) -> Option<String> {
        self.region
            .as_ref()
            .map(|region| format!("{region}.compute.internal"))
    }

    /// Check the fields that do not need CIDR arithmetic.
    pub fn validate(&self) -> Result<()> {
        if self.name_prefix.is_empty() {
            return Err(SynthError::ConfigError("namePrefix is empty".to_string()));
        }
        if self.base_cidr.trim().is_empty() {
            return Err(SynthError::ConfigError("baseCidr is empty".to_string()));
        }
        if let Some(region) = &self.region {
            if region.trim().is_empty() {
                return Err(SynthError::ConfigError("region is empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Read a JSON config file.
///
/// Parse errors name the offending field path.
pub fn from_file(path: &Path) -> Result<NetworkConfig> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        SynthError::ConfigError(format!("Error reading config file {}: {e}", path.display()))
    })?;
    log::info!("Reading config file: {}", path.display());

    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let config: NetworkConfig = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        SynthError::ConfigError(format!(
            "Error parsing config file {}: path={} error={}",
            path.display(),
            e.path(),
            e
        ))
    })?;
    Ok(config)
}

/// Build a config from the process environment.
///
/// | var | meaning |
/// |---|---|
/// | `ENVIRONMENT`, `APP_NAME` | name prefix `{environment}-{app_name}`, lower-cased |
/// | `VPC_CIDR` | base CIDR |
/// | `NAT_GATEWAYS` | NAT-routed when > 0 (default 0) |
/// | `AWS_REGION` | optional, enables DHCP options |
/// | `API_ENDPOINT` | optional bool, adds the API endpoint |
pub fn from_env() -> Result<NetworkConfig> {
    from_vars(|key| std::env::var(key).ok())
}

/// Same as [`from_env`] with an injectable variable lookup.
pub fn from_vars<F>(get: F) -> Result<NetworkConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| -> Result<String> {
        get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SynthError::ConfigError(format!("missing environment variable {key}")))
    };

    let environment = required("ENVIRONMENT")?;
    let app_name = required("APP_NAME")?;
    let base_cidr = required("VPC_CIDR")?;

    let nat_gateways: u32 = match get("NAT_GATEWAYS") {
        Some(v) if !v.trim().is_empty() => v.trim().parse().map_err(|_| {
            SynthError::ConfigError(format!("NAT_GATEWAYS must be a number, got '{v}'"))
        })?,
        _ => 0,
    };
    if nat_gateways > 1 {
        log::warn!("NAT_GATEWAYS={nat_gateways}: only a single NAT gateway is planned");
    }

    let api_endpoint = match get("API_ENDPOINT") {
        Some(v) => parse_flag("API_ENDPOINT", &v)?,
        None => false,
    };

    let config = NetworkConfig {
        base_cidr,
        name_prefix: format!(
            "{}-{}",
            environment.to_lowercase(),
            app_name.to_lowercase()
        ),
        nat_enabled: nat_gateways > 0,
        region: get("AWS_REGION")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        api_endpoint,
    };
    log::debug!("config from environment: {config:?}");
    Ok(config)
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        other => Err(SynthError::ConfigError(format!(
            "{key} must be true or false, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_vars_full() {
        let config = from_vars(vars(&[
            ("ENVIRONMENT", "Dev"),
            ("APP_NAME", "Shop"),
            ("VPC_CIDR", "10.0.0.0/20"),
            ("NAT_GATEWAYS", "1"),
            ("AWS_REGION", "eu-west-1"),
            ("API_ENDPOINT", "true"),
        ]))
        .unwrap();
        assert_eq!(config.name_prefix, "dev-shop");
        assert_eq!(config.base_cidr, "10.0.0.0/20");
        assert!(config.nat_enabled);
        assert!(config.api_endpoint);
        assert_eq!(config.mode(), TopologyMode::NatRouted);
        assert_eq!(
            config.dhcp_domain().as_deref(),
            Some("eu-west-1.compute.internal")
        );
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = from_vars(vars(&[
            ("ENVIRONMENT", "prod"),
            ("APP_NAME", "api"),
            ("VPC_CIDR", "10.1.0.0/24"),
        ]))
        .unwrap();
        assert!(!config.nat_enabled);
        assert!(!config.api_endpoint);
        assert_eq!(config.region, None);
        assert_eq!(config.mode(), TopologyMode::Isolated);
    }

    #[test]
    fn test_from_vars_missing_and_bad() {
        let err = from_vars(vars(&[("ENVIRONMENT", "dev"), ("APP_NAME", "x")])).unwrap_err();
        assert_eq!(
            err,
            SynthError::ConfigError("missing environment variable VPC_CIDR".to_string())
        );

        assert!(from_vars(vars(&[
            ("ENVIRONMENT", "dev"),
            ("APP_NAME", "x"),
            ("VPC_CIDR", "10.0.0.0/24"),
            ("NAT_GATEWAYS", "two"),
        ]))
        .is_err());

        assert!(from_vars(vars(&[
            ("ENVIRONMENT", "dev"),
            ("APP_NAME", "x"),
            ("VPC_CIDR", "10.0.0.0/24"),
            ("API_ENDPOINT", "maybe"),
        ]))
        .is_err());
    }

    #[test]
    fn test_validate_name_prefix() {
        assert!(NetworkConfig::new("10.0.0.0/24", "demo", false).validate().is_ok());
        assert!(NetworkConfig::new("10.0.0.0/24", "dev-shop-2", true).validate().is_ok());
        assert_eq!(
            NetworkConfig::new("10.0.0.0/24", "", false).validate(),
            Err(SynthError::ConfigError("namePrefix is empty".to_string()))
        );
        for prefix in ["Demo", "my_app", "dev.shop", "dev-my_app"] {
            assert!(
                NetworkConfig::new("10.0.0.0/24", prefix, false).validate().is_ok(),
                "{prefix}"
            );
        }
        assert!(NetworkConfig::new(" ", "demo", false).validate().is_err());
    }

    #[test]
    fn test_env_config_always_synthesizes() {
        for app_name in ["shop", "My_App", "dev.shop", "API"] {
            let config = from_vars(vars(&[
                ("ENVIRONMENT", "Dev"),
                ("APP_NAME", app_name),
                ("VPC_CIDR", "10.0.0.0/20"),
                ("NAT_GATEWAYS", "1"),
            ]))
            .unwrap();
            assert_eq!(config.name_prefix, format!("dev-{}", app_name.to_lowercase()));
            let graph = crate::synthesize(&config).unwrap();
            assert_eq!(
                graph.exports().last().map(|e| e.name.clone()),
                Some(format!("{}-vpc", config.name_prefix))
            );
        }
    }

    #[test]
    fn test_json_field_names() {
        let config: NetworkConfig = serde_json::from_str(
            r#"{"baseCidr":"10.0.0.0/20","namePrefix":"demo","natEnabled":true}"#,
        )
        .unwrap();
        assert_eq!(config, NetworkConfig::new("10.0.0.0/20", "demo", true));

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"baseCidr":"10.0.0.0/20","namePrefix":"demo","natEnabled":true,"apiEndpoint":false}"#
        );
    }
}
