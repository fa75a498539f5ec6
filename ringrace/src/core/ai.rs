use crate::core::car::{BodyPars, Car};
use crate::core::error::{check_non_negative, ConfigError};
use crate::core::geom::Point;
use crate::core::kinematics::{advance, heading_towards, rotate, Pose};
use helpers::general::signed_angle_diff_deg;
use serde::{Deserialize, Serialize};

/// * `body` - Sprite size and color
/// * `max_speed` - Initial speed cap
/// * `start_delay` - (ticks) Time the AI waits on the grid before driving
/// * `turn_rate` - (deg/tick) Heading change while steering
/// * `acceleration` - Speed gained per tick while throttling
/// * `coast_deceleration` - Speed lost per tick while coasting
/// * `throttle_distance` - The AI throttles only while farther than this from its target
/// * `advance_distance` - The AI switches to the next waypoint once closer than this
/// * `steer_deadband` - (deg) Heading error tolerated without steering
/// * `max_speed_step` - Change of max speed per faster/slower debug command
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AiPars {
    pub body: BodyPars,
    pub max_speed: f64,
    pub start_delay: u32,
    pub turn_rate: f64,
    pub acceleration: f64,
    pub coast_deceleration: f64,
    pub throttle_distance: f64,
    pub advance_distance: f64,
    pub steer_deadband: f64,
    pub max_speed_step: f64,
}

impl Default for AiPars {
    fn default() -> Self {
        AiPars {
            body: BodyPars {
                color: String::from("#1E41FF"),
                ..BodyPars::default()
            },
            max_speed: 2.5,
            start_delay: 60,
            turn_rate: 5.0,
            acceleration: 0.1,
            coast_deceleration: 0.05,
            throttle_distance: 20.0,
            advance_distance: 30.0,
            steer_deadband: 15.0,
            max_speed_step: 0.5,
        }
    }
}

impl AiPars {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.body.validate()?;
        check_non_negative("AI max speed", self.max_speed)?;
        check_non_negative("AI turn rate", self.turn_rate)?;
        check_non_negative("AI acceleration", self.acceleration)?;
        check_non_negative("AI coast deceleration", self.coast_deceleration)?;
        check_non_negative("AI throttle distance", self.throttle_distance)?;
        check_non_negative("AI advance distance", self.advance_distance)?;
        check_non_negative("AI steering deadband", self.steer_deadband)?;
        check_non_negative("AI max speed step", self.max_speed_step)
    }
}

/// State of the AI controller: waiting on the grid, then following waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Idle { remaining: u32 },
    Navigating,
}

/// Driving intent computed by the controller for the current tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiIntent {
    pub throttle: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

/// plan_intent decides how to drive towards `target`. It returns the intent together with the
/// distance to the target.
pub fn plan_intent(pose: &Pose, target: &Point, ai_pars: &AiPars) -> (AiIntent, f64) {
    let distance = pose.pos.dist(target);
    let target_angle = heading_towards(&pose.pos, target);
    let angle_diff = signed_angle_diff_deg(target_angle, pose.heading);

    let throttle = distance > ai_pars.throttle_distance;
    let intent = AiIntent {
        throttle,
        steer_left: throttle && angle_diff > ai_pars.steer_deadband,
        steer_right: throttle && angle_diff < -ai_pars.steer_deadband,
    };

    (intent, distance)
}

/// AI car following the shared waypoint sequence.
/// * `target_index` - Index of the waypoint the AI currently drives to
/// * `state` - Controller state
/// * `intent` - Intent of the last navigating tick (for debug display)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiCar {
    pub car: Car,
    pub target_index: usize,
    pub state: AiState,
    pub intent: AiIntent,
}

impl AiCar {
    pub fn new(ai_pars: &AiPars, spawn: Point, heading: f64) -> AiCar {
        let state = if ai_pars.start_delay > 0 {
            AiState::Idle {
                remaining: ai_pars.start_delay,
            }
        } else {
            AiState::Navigating
        };

        AiCar {
            car: Car::new(Pose::new(spawn, heading, ai_pars.max_speed), &ai_pars.body),
            target_index: 0,
            state,
            intent: AiIntent::default(),
        }
    }

    /// update runs the controller for one tick. It returns the new target index if the AI
    /// switched to the next waypoint during this tick.
    pub fn update(&mut self, waypoints: &[Point], ai_pars: &AiPars) -> Option<usize> {
        assert!(
            self.target_index < waypoints.len(),
            "AI target index {} out of range for {} waypoints",
            self.target_index,
            waypoints.len()
        );

        if let AiState::Idle { remaining } = self.state {
            let remaining = remaining.saturating_sub(1);
            self.state = if remaining == 0 {
                AiState::Navigating
            } else {
                AiState::Idle { remaining }
            };
            return None;
        }

        let target = waypoints[self.target_index];
        let (intent, distance) = plan_intent(&self.car.pose, &target, ai_pars);
        self.intent = intent;

        let pose = &mut self.car.pose;
        if intent.steer_left {
            rotate(pose, ai_pars.turn_rate);
        }
        if intent.steer_right {
            rotate(pose, -ai_pars.turn_rate);
        }

        if intent.throttle {
            pose.speed = (pose.speed + ai_pars.acceleration).min(pose.max_speed);
        } else {
            pose.speed = (pose.speed - ai_pars.coast_deceleration).max(0.0);
        }

        // momentum carries the car on while coasting
        let distance_this_tick = pose.speed;
        advance(pose, distance_this_tick);

        if distance < ai_pars.advance_distance {
            self.target_index = (self.target_index + 1) % waypoints.len();
            Some(self.target_index)
        } else {
            None
        }
    }

    /// skip_waypoint makes the next waypoint the current target.
    pub fn skip_waypoint(&mut self, no_waypoints: usize) {
        self.target_index = (self.target_index + 1) % no_waypoints;
    }

    /// change_max_speed shifts the max speed by `delta`, never below `min_max_speed`.
    pub fn change_max_speed(&mut self, delta: f64, min_max_speed: f64) {
        self.car.pose.max_speed = (self.car.pose.max_speed + delta).max(min_max_speed);
    }
}
