use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use flock_core::{SimulationConfig, UpdatePolicyKind};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub policy: Option<UpdatePolicyKind>,
    pub agents: Option<usize>,
}

/// Parses a full or partial JSON config; missing fields keep their defaults.
pub fn parse_config(json: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig = serde_json::from_str(json).context("Invalid simulation config")?;
    Ok(config)
}

/// Loads the config file when given, applies overrides, and validates the
/// result.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<SimulationConfig> {
    let mut config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            parse_config(&json).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }
    if let Some(policy) = overrides.policy {
        config.policy = policy;
    }
    if let Some(agents) = overrides.agents {
        config.initial_agents = agents;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None, &Overrides::default()).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            seed: Some(3),
            policy: Some(UpdatePolicyKind::PriorityDecision),
            agents: Some(4),
        };
        let config = load_config(None, &overrides).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.policy, UpdatePolicyKind::PriorityDecision);
        assert_eq!(config.initial_agents, 4);
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(r#"{ "width": 640, "decision": { "max_turn_angle": 15 } }"#).unwrap();
        assert_eq!(config.width, 640.0);
        assert_eq!(config.decision.max_turn_angle, 15.0);
        assert_eq!(config.decision.perfect_distance, 8.0);
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let dir = std::env::temp_dir().join(format!("flock-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        fs::write(&path, r#"{ "height": -10 }"#).unwrap();

        assert!(load_config(Some(&path), &Overrides::default()).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/flock.json")), &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
