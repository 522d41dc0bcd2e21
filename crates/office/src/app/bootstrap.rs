use std::env;
use std::fs;

use tracing::info;

use super::office::OfficeTuning;

pub const CONFIG_ENV_VAR: &str = "ATRIUM_CONFIG";

/// Resolves the office tuning: a JSON file pointed at by `ATRIUM_CONFIG`,
/// or the built-in defaults when the variable is unset. A file that is
/// present but unreadable or invalid is a startup error, not a silent
/// fallback.
pub fn resolve_tuning() -> Result<OfficeTuning, String> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(path) => {
            let raw = fs::read_to_string(&path)
                .map_err(|error| format!("failed to read office tuning file '{path}': {error}"))?;
            let tuning = parse_tuning_json(&raw)?;
            validate_tuning(&tuning)?;
            info!(path = %path, "office_tuning_loaded");
            Ok(tuning)
        }
        Err(env::VarError::NotPresent) => Ok(OfficeTuning::default()),
        Err(error) => Err(format!("failed to read {CONFIG_ENV_VAR}: {error}")),
    }
}

fn parse_tuning_json(raw: &str) -> Result<OfficeTuning, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, OfficeTuning>(&mut deserializer) {
        Ok(tuning) => Ok(tuning),
        Err(error) => Err(format!(
            "invalid office tuning at '{}': {}",
            error.path(),
            error.inner()
        )),
    }
}

fn validate_tuning(tuning: &OfficeTuning) -> Result<(), String> {
    if tuning.walk_speed_tiles_per_second <= 0.0 {
        return Err("walk_speed_tiles_per_second must be positive".to_string());
    }
    if tuning.idle_event_min_seconds < 0.0 {
        return Err("idle_event_min_seconds must not be negative".to_string());
    }
    if tuning.idle_event_max_seconds < tuning.idle_event_min_seconds {
        return Err("idle_event_max_seconds must be >= idle_event_min_seconds".to_string());
    }
    if tuning.special_duration_seconds <= 0.0 {
        return Err("special_duration_seconds must be positive".to_string());
    }
    if tuning.result_badge_seconds <= 0.0 {
        return Err("result_badge_seconds must be positive".to_string());
    }
    if !(0.01..=1.0).contains(&tuning.camera_smoothing) {
        return Err("camera_smoothing must be within 0.01..=1.0".to_string());
    }
    Ok(())
}
