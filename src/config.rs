use minerworks_scripting::AutomationConfig;
use std::{fs, path::Path};
use tracing::{info, warn};

pub const DEFAULT_AUTOMATION_PATH: &str = "config/automation.toml";

/// Load automation configuration from the default path.
pub fn load() -> AutomationConfig {
    load_from_path(Path::new(DEFAULT_AUTOMATION_PATH))
}

/// Load configuration from an explicit path, falling back to defaults on errors.
pub fn load_from_path(path: &Path) -> AutomationConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match AutomationConfig::from_toml_str(&contents) {
            Ok(cfg) => {
                info!(path = %path.display(), "loaded automation config");
                cfg
            }
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                AutomationConfig::default()
            }
        },
        Err(err) => {
            if path != Path::new(DEFAULT_AUTOMATION_PATH)
                || err.kind() != std::io::ErrorKind::NotFound
            {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
            } else {
                warn!(
                    "Automation config not found at {}. Using defaults",
                    path.display()
                );
            }
            AutomationConfig::default()
        }
    }
}
