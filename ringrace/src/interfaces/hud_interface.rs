use crate::core::race::RacePhase;
use crate::post::race_result::RaceResult;
use serde::{Deserialize, Serialize};

/// Maximum number of race states per second sent to the HUD in real-time mode.
pub const MAX_HUD_UPDATE_FREQUENCY: f64 = 20.0;

/// Number of cells of the text health bar.
const HEALTH_BAR_CELLS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// CarState is the renderable state of one car.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed: f64,
    pub max_speed: f64,
    pub damage: u32,
    pub flash_timer: u32,
    pub color: RgbColor,
}

/// RaceState is everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    pub tick: u64,
    pub racetime: f64,
    pub player: CarState,
    pub ai: CarState,

    // lap timing of the player
    pub laps: u32,
    pub cur_lap_time: f64,
    pub last_lap_time: Option<f64>,
    pub best_lap_time: Option<f64>,
    pub lap_valid: bool,

    pub health: f64,
    pub max_health: f64,
    pub health_fraction: f64,
    pub on_track: bool,
    pub ai_target_index: usize,

    pub debug: bool,
    pub paused: bool,
    pub phase: RacePhase,

    // final results payload (sent once when the race finishes)
    pub final_result: Option<RaceResult>,
}

impl RaceState {
    /// health_bar draws the health fraction as a bar of `HEALTH_BAR_CELLS` cells.
    pub fn health_bar(&self) -> String {
        let filled = (self.health_fraction * HEALTH_BAR_CELLS as f64).round() as usize;
        let filled = filled.min(HEALTH_BAR_CELLS);
        format!(
            "[{}{}]",
            "#".repeat(filled),
            ".".repeat(HEALTH_BAR_CELLS - filled)
        )
    }

    /// hud_line formats the state as a single line of text.
    pub fn hud_line(&self) -> String {
        let fmt_time = |t: Option<f64>| match t {
            Some(t) => format!("{:.3}s", t),
            None => String::from("--"),
        };

        let mut line = format!(
            "t={:7.2}s lap {} ({:.2}s{}) last {} best {} health {} {:5.1}/{:.0} dmg {}",
            self.racetime,
            self.laps,
            self.cur_lap_time,
            if self.lap_valid { "" } else { ", invalid" },
            fmt_time(self.last_lap_time),
            fmt_time(self.best_lap_time),
            self.health_bar(),
            self.health,
            self.max_health,
            self.player.damage,
        );

        if !self.on_track {
            line.push_str(" OFF TRACK");
        }
        if self.player.flash_timer > 0 {
            line.push_str(" HIT");
        }
        if self.debug {
            line.push_str(&format!(
                " | AI wp {} v {:.2}/{:.2}",
                self.ai_target_index, self.ai.speed, self.ai.max_speed
            ));
        }
        if self.paused {
            line.push_str(" [PAUSED]");
        }
        line
    }
}
