use crate::core::car::{Car, Player};
use crate::core::error::{check_non_negative, check_positive, ConfigError};
use serde::{Deserialize, Serialize};

/// * `shrink_factor` - Share of the full sprite size used for the collision box
/// * `flash_ticks` - (ticks) Duration of the collision flash of both cars
/// * `cooldown` - (s) Minimum time between two applied penalties
/// * `damage` - Damage added to both cars per penalty
/// * `health_loss` - Health lost by the player per penalty
/// * `player_speed_loss` - Speed lost by the player per penalty
/// * `ai_speed_loss` - Speed lost by the AI car per penalty
/// * `max_speed_loss` - Max speed lost by both cars per penalty
/// * `player_min_max_speed` - Lower bound of the player's max speed
/// * `ai_min_max_speed` - Lower bound of the AI car's max speed, also for the debug commands
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CollisionPars {
    pub shrink_factor: f64,
    pub flash_ticks: u32,
    pub cooldown: f64,
    pub damage: u32,
    pub health_loss: f64,
    pub player_speed_loss: f64,
    pub ai_speed_loss: f64,
    pub max_speed_loss: f64,
    pub player_min_max_speed: f64,
    pub ai_min_max_speed: f64,
}

impl Default for CollisionPars {
    fn default() -> Self {
        CollisionPars {
            shrink_factor: 0.5,
            flash_ticks: 15,
            cooldown: 1.0,
            damage: 10,
            health_loss: 20.0,
            player_speed_loss: 2.0,
            ai_speed_loss: 1.0,
            max_speed_loss: 0.5,
            player_min_max_speed: 3.0,
            ai_min_max_speed: 0.5,
        }
    }
}

impl CollisionPars {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("collision shrink factor", self.shrink_factor)?;
        check_non_negative("collision cooldown", self.cooldown)?;
        check_non_negative("collision health loss", self.health_loss)?;
        check_non_negative("player speed loss", self.player_speed_loss)?;
        check_non_negative("AI speed loss", self.ai_speed_loss)?;
        check_non_negative("max speed loss", self.max_speed_loss)?;
        check_non_negative("player minimum max speed", self.player_min_max_speed)?;
        check_non_negative("AI minimum max speed", self.ai_min_max_speed)
    }
}

/// HealthPolicy decides what happens when collisions drain the player's health.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum HealthPolicy {
    /// Health keeps decreasing below zero and the race goes on.
    #[default]
    Unclamped,
    /// Health stops at zero and the race finishes when it is reached.
    ClampAndFinish,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionOutcome {
    NoContact,
    /// The cars touch but the penalty is still on cooldown.
    Contact,
    /// A penalty was applied. `depleted` is set if the player's health reached zero under
    /// `HealthPolicy::ClampAndFinish` with this penalty.
    Penalty { depleted: bool },
}

/// CollisionResolver handles contact between the player and the AI car.
/// * `last_penalty_time` - (s) Race time of the last applied penalty of the pair
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionResolver {
    pub last_penalty_time: Option<f64>,
    pub no_penalties: u32,
}

impl CollisionResolver {
    pub fn new() -> CollisionResolver {
        CollisionResolver::default()
    }

    /// cooldown_elapsed returns true if a penalty may be applied at `now`.
    pub fn cooldown_elapsed(&self, now: f64, cooldown: f64) -> bool {
        match self.last_penalty_time {
            Some(last) => now - last > cooldown,
            None => true,
        }
    }

    /// resolve checks the two cars for contact at race time `now`. Any contact refreshes the
    /// flash timers of both cars, the damage and speed penalty is rate limited by the cooldown.
    pub fn resolve(
        &mut self,
        player: &mut Player,
        ai: &mut Car,
        collision_pars: &CollisionPars,
        health_policy: HealthPolicy,
        now: f64,
    ) -> CollisionOutcome {
        let player_box = player.car.collision_box(collision_pars.shrink_factor);
        let ai_box = ai.collision_box(collision_pars.shrink_factor);

        if !player_box.overlaps(&ai_box) {
            return CollisionOutcome::NoContact;
        }

        player.car.flash_timer = collision_pars.flash_ticks;
        ai.flash_timer = collision_pars.flash_ticks;

        if !self.cooldown_elapsed(now, collision_pars.cooldown) {
            return CollisionOutcome::Contact;
        }

        // damage and health
        player.car.damage += collision_pars.damage;
        ai.damage += collision_pars.damage;
        player.health -= collision_pars.health_loss;

        let mut depleted = false;
        if health_policy == HealthPolicy::ClampAndFinish && player.health <= 0.0 {
            player.health = 0.0;
            depleted = true;
        }

        // speed
        let pose = &mut player.car.pose;
        pose.speed = (pose.speed - collision_pars.player_speed_loss).max(0.0);
        pose.max_speed = (pose.max_speed - collision_pars.max_speed_loss)
            .max(collision_pars.player_min_max_speed);

        ai.pose.speed = (ai.pose.speed - collision_pars.ai_speed_loss).max(0.0);
        ai.pose.max_speed =
            (ai.pose.max_speed - collision_pars.max_speed_loss).max(collision_pars.ai_min_max_speed);

        player.car.last_collision_time = Some(now);
        ai.last_collision_time = Some(now);
        self.last_penalty_time = Some(now);
        self.no_penalties += 1;

        CollisionOutcome::Penalty { depleted }
    }
}
