use crate::core::car::PlayerInput;
use crate::core::error::{check_non_negative, ConfigError};
use crate::core::kinematics::heading_towards;
use crate::core::race::Race;
use helpers::general::{argmin, signed_angle_diff_deg};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// * `heading_noise_std` - (deg) Standard deviation of the noise added to the target heading
/// * `steer_deadband` - (deg) Heading error tolerated without steering
/// * `advance_distance` - The autopilot switches to the next waypoint once closer than this
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AutopilotPars {
    pub heading_noise_std: f64,
    pub steer_deadband: f64,
    pub advance_distance: f64,
}

impl Default for AutopilotPars {
    fn default() -> Self {
        AutopilotPars {
            heading_noise_std: 4.0,
            steer_deadband: 5.0,
            advance_distance: 40.0,
        }
    }
}

/// Autopilot produces the player input in place of a human driver. It follows the waypoint
/// sequence like the AI but drives at full throttle, and its target heading is disturbed by
/// Gaussian noise. The same seed always produces the same inputs for the same race.
pub struct Autopilot {
    pars: AutopilotPars,
    rng: StdRng,
    noise: Option<Normal<f64>>,
    pub target_index: usize,
}

impl Autopilot {
    pub fn new(pars: &AutopilotPars, seed: u64, race: &Race) -> Result<Autopilot, ConfigError> {
        check_non_negative("autopilot heading noise", pars.heading_noise_std)?;
        check_non_negative("autopilot steering deadband", pars.steer_deadband)?;
        check_non_negative("autopilot advance distance", pars.advance_distance)?;

        let noise = if pars.heading_noise_std > 0.0 {
            Some(
                Normal::new(0.0, pars.heading_noise_std).map_err(|_| ConfigError::NonFinite {
                    name: "autopilot heading noise",
                    value: pars.heading_noise_std,
                })?,
            )
        } else {
            None
        };

        // start with the waypoint after the one closest to the player
        let waypoints = race.waypoints();
        let pos = race.player.car.pos();
        let dists: Vec<f64> = waypoints.iter().map(|wp| wp.dist_sq(&pos)).collect();
        let idx_closest = argmin(&dists).unwrap_or(0);

        Ok(Autopilot {
            pars: pars.clone(),
            rng: StdRng::seed_from_u64(seed),
            noise,
            target_index: (idx_closest + 1) % waypoints.len(),
        })
    }

    /// next_input returns the input for the next tick of `race`.
    pub fn next_input(&mut self, race: &Race) -> PlayerInput {
        let waypoints = race.waypoints();
        let pose = &race.player.car.pose;

        if pose.pos.dist(&waypoints[self.target_index]) < self.pars.advance_distance {
            self.target_index = (self.target_index + 1) % waypoints.len();
        }

        let noise = match &self.noise {
            Some(normal) => normal.sample(&mut self.rng),
            None => 0.0,
        };
        let target_angle = heading_towards(&pose.pos, &waypoints[self.target_index]) + noise;
        let angle_diff = signed_angle_diff_deg(target_angle, pose.heading);

        PlayerInput {
            turn_left: angle_diff > self.pars.steer_deadband,
            turn_right: angle_diff < -self.pars.steer_deadband,
            throttle_forward: true,
            throttle_backward: false,
        }
    }
}
