use crate::core::error::{check_non_negative, check_positive, ConfigError};
use crate::core::geom::{Point, Rect};
use crate::core::kinematics::{advance, rotate, Pose};
use serde::{Deserialize, Serialize};

/// * `color` - Display color as CSS color string, e.g. "#DC0000"
/// * `width` - Width of the car sprite
/// * `height` - Height (length) of the car sprite
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BodyPars {
    pub color: String,
    pub width: f64,
    pub height: f64,
}

impl Default for BodyPars {
    fn default() -> Self {
        BodyPars {
            color: String::from("#DC0000"),
            width: 30.0,
            height: 50.0,
        }
    }
}

impl BodyPars {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("car width", self.width)?;
        check_positive("car height", self.height)
    }
}

/// * `body` - Sprite size and color
/// * `max_speed` - Initial speed cap
/// * `max_health` - Health at race start
/// * `turn_rate` - (deg/tick) Heading change per active steering input
/// * `forward_speed` - Speed when accelerating (capped by the current max speed)
/// * `reverse_speed` - Speed when reversing
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerPars {
    pub body: BodyPars,
    pub max_speed: f64,
    pub max_health: f64,
    pub turn_rate: f64,
    pub forward_speed: f64,
    pub reverse_speed: f64,
}

impl Default for PlayerPars {
    fn default() -> Self {
        PlayerPars {
            body: BodyPars {
                color: String::from("#DC0000"),
                ..BodyPars::default()
            },
            max_speed: 6.0,
            max_health: 100.0,
            turn_rate: 5.0,
            forward_speed: 6.0,
            reverse_speed: 4.0,
        }
    }
}

impl PlayerPars {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.body.validate()?;
        check_non_negative("player max speed", self.max_speed)?;
        check_positive("player max health", self.max_health)?;
        check_non_negative("player turn rate", self.turn_rate)?;
        check_non_negative("player forward speed", self.forward_speed)?;
        check_non_negative("player reverse speed", self.reverse_speed)
    }
}

/// Per-tick driving intents of the player, produced by the shell from raw input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub turn_left: bool,
    pub turn_right: bool,
    pub throttle_forward: bool,
    pub throttle_backward: bool,
}

/// Car holds the state shared by the player and the AI car.
/// * `pose` - Position, heading and speed
/// * `w`, `h` - Full sprite size (the collision box is derived from it)
/// * `damage` - Accumulated collision damage
/// * `last_collision_time` - (s) Race time of the last applied collision penalty
/// * `flash_timer` - (ticks) Remaining duration of the collision flash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub pose: Pose,
    pub w: f64,
    pub h: f64,
    pub damage: u32,
    pub last_collision_time: Option<f64>,
    pub flash_timer: u32,
}

impl Car {
    pub fn new(pose: Pose, body: &BodyPars) -> Car {
        Car {
            pose,
            w: body.width,
            h: body.height,
            damage: 0,
            last_collision_time: None,
            flash_timer: 0,
        }
    }

    pub fn pos(&self) -> Point {
        self.pose.pos
    }

    /// collision_box returns the unrotated box used for car-to-car contact, scaled by
    /// `shrink_factor` and centered on the car. It ignores the heading, so it does not match the
    /// rotated sprite.
    pub fn collision_box(&self, shrink_factor: f64) -> Rect {
        Rect::from_center(self.pose.pos, self.w * shrink_factor, self.h * shrink_factor)
    }

    /// The method counts the flash timer down by one tick.
    pub fn decay_flash(&mut self) {
        self.flash_timer = self.flash_timer.saturating_sub(1);
    }
}

/// Player car. The health may become negative unless the race clamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub car: Car,
    pub health: f64,
    pub max_health: f64,
}

impl Player {
    pub fn new(player_pars: &PlayerPars, spawn: Point, heading: f64) -> Player {
        Player {
            car: Car::new(
                Pose::new(spawn, heading, player_pars.max_speed),
                &player_pars.body,
            ),
            health: player_pars.max_health,
            max_health: player_pars.max_health,
        }
    }

    /// apply_input integrates one tick of player driving. The speed does not carry over between
    /// ticks: it is zero unless a throttle input is held during this tick.
    pub fn apply_input(&mut self, input: &PlayerInput, player_pars: &PlayerPars) {
        let pose = &mut self.car.pose;
        pose.speed = 0.0;

        if input.turn_left {
            rotate(pose, player_pars.turn_rate);
        }
        if input.turn_right {
            rotate(pose, -player_pars.turn_rate);
        }
        if input.throttle_forward {
            pose.speed = pose.max_speed.min(player_pars.forward_speed);
            let distance = pose.speed;
            advance(pose, distance);
        }
        if input.throttle_backward {
            pose.speed = -player_pars.reverse_speed;
            advance(pose, -player_pars.reverse_speed);
        }
    }

    /// health_fraction returns the health relative to the maximum, clamped to [0, 1] for display.
    pub fn health_fraction(&self) -> f64 {
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn player_at_origin() -> Player {
        Player::new(&PlayerPars::default(), Point::new(0.0, 0.0), 0.0)
    }

    #[test]
    fn forward_drives_up_at_capped_speed() {
        let mut player = player_at_origin();
        let input = PlayerInput {
            throttle_forward: true,
            ..PlayerInput::default()
        };

        player.apply_input(&input, &PlayerPars::default());
        assert_abs_diff_eq!(player.car.pose.speed, 6.0);
        assert_abs_diff_eq!(player.car.pose.pos.y, -6.0, epsilon = 1e-12);

        player.car.pose.max_speed = 3.5;
        player.apply_input(&input, &PlayerPars::default());
        assert_abs_diff_eq!(player.car.pose.speed, 3.5);
        assert_abs_diff_eq!(player.car.pose.pos.y, -9.5, epsilon = 1e-12);
    }

    #[test]
    fn releasing_throttle_stops_the_car() {
        let mut player = player_at_origin();
        player.apply_input(
            &PlayerInput {
                throttle_forward: true,
                ..PlayerInput::default()
            },
            &PlayerPars::default(),
        );
        player.apply_input(&PlayerInput::default(), &PlayerPars::default());

        assert_abs_diff_eq!(player.car.pose.speed, 0.0);
        assert_abs_diff_eq!(player.car.pose.pos.y, -6.0, epsilon = 1e-12);
    }

    #[test]
    fn reverse_and_steering() {
        let mut player = player_at_origin();
        player.apply_input(
            &PlayerInput {
                turn_left: true,
                throttle_backward: true,
                ..PlayerInput::default()
            },
            &PlayerPars::default(),
        );

        assert_abs_diff_eq!(player.car.pose.heading, 5.0);
        assert_abs_diff_eq!(player.car.pose.speed, -4.0);
        assert!(player.car.pose.pos.y > 0.0);

        player.apply_input(
            &PlayerInput {
                turn_left: true,
                turn_right: true,
                ..PlayerInput::default()
            },
            &PlayerPars::default(),
        );
        assert_abs_diff_eq!(player.car.pose.heading, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn collision_box_is_centered_and_shrunk() {
        let player = Player::new(&PlayerPars::default(), Point::new(100.0, 200.0), 45.0);
        let bbox = player.car.collision_box(0.5);

        assert_eq!(bbox, Rect::new(92.5, 187.5, 15.0, 25.0));
    }
}
