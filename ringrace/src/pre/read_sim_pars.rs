use crate::core::ai::AiPars;
use crate::core::car::PlayerPars;
use crate::core::collision::CollisionPars;
use crate::core::race::RacePars;
use crate::core::track::TrackPars;
use crate::interfaces::autopilot::AutopilotPars;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs. Every field has a default, so an empty
/// JSON object describes the standard race.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimPars {
    pub track_pars: TrackPars,
    pub race_pars: RacePars,
    pub player_pars: PlayerPars,
    pub ai_pars: AiPars,
    pub collision_pars: CollisionPars,
    pub autopilot_pars: AutopilotPars,
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collision::HealthPolicy;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_object_gives_defaults() {
        let pars: SimPars = serde_json::from_str("{}").unwrap();
        assert_eq!(pars, SimPars::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let json = r##"{
            "track_pars": { "no_waypoints": 36 },
            "race_pars": { "health_policy": "ClampAndFinish" },
            "ai_pars": { "max_speed": 3.0, "body": { "color": "#00FF00" } }
        }"##;
        let pars: SimPars = serde_json::from_str(json).unwrap();

        assert_eq!(pars.track_pars.no_waypoints, 36);
        assert_eq!(pars.race_pars.health_policy, HealthPolicy::ClampAndFinish);
        assert_abs_diff_eq!(pars.ai_pars.max_speed, 3.0);
        assert_eq!(pars.ai_pars.body.color, "#00FF00");
        assert_abs_diff_eq!(pars.ai_pars.body.width, 30.0);
        assert_eq!(pars.ai_pars.start_delay, 60);
        assert_eq!(pars.player_pars, PlayerPars::default());
    }

    #[test]
    fn missing_file_has_context() {
        let err = read_sim_pars(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open parameter file"));
    }
}
