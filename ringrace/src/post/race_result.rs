use crate::core::events::RaceEvent;
use crate::core::race::{Race, RacePhase};
use crate::interfaces::hud_interface::RgbColor;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// RaceResult contains all race information that is required for post-processing the results.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct RaceResult {
    pub no_ticks: u64,
    pub racetime: f64,
    pub phase: RacePhase,

    // player laps
    pub laps: u32,
    pub lap_times: Vec<f64>,
    pub best_lap_time: Option<f64>,
    pub discarded_laps: u32,

    // collisions and damage
    pub no_collisions: u32,
    pub player_health: f64,
    pub player_max_health: f64,
    pub player_damage: u32,
    pub ai_damage: u32,

    // AI progress
    pub ai_waypoint_advances: u64,
    pub ai_target_index: usize,
    pub no_waypoints: usize,

    // trajectories for plotting (one point per simulated tick)
    pub player_path: Vec<(f64, f64)>,
    pub ai_path: Vec<(f64, f64)>,
    pub player_color: RgbColor,
    pub ai_color: RgbColor,

    pub events: Vec<RaceEvent>,
}

impl RaceResult {
    /// from_race collects the result of the current race state. Trajectories and events are
    /// recorded by the caller.
    pub fn from_race(race: &Race) -> RaceResult {
        RaceResult {
            no_ticks: race.cur_tick,
            racetime: race.cur_racetime,
            phase: race.phase,
            laps: race.lap_timer.laps,
            lap_times: race.lap_timer.lap_times.to_owned(),
            best_lap_time: race.lap_timer.best_lap_time,
            discarded_laps: race.lap_timer.discarded_laps,
            no_collisions: race.collision_resolver.no_penalties,
            player_health: race.player.health,
            player_max_health: race.player.max_health,
            player_damage: race.player.car.damage,
            ai_damage: race.ai.car.damage,
            ai_waypoint_advances: race.no_waypoint_advances,
            ai_target_index: race.ai.target_index,
            no_waypoints: race.waypoints().len(),
            player_path: Vec::new(),
            ai_path: Vec::new(),
            player_color: race.player_color,
            ai_color: race.ai_color,
            events: Vec::new(),
        }
    }

    /// ai_laps returns the number of full laps the AI has driven along the waypoint sequence.
    pub fn ai_laps(&self) -> u64 {
        if self.no_waypoints == 0 {
            0
        } else {
            self.ai_waypoint_advances / self.no_waypoints as u64
        }
    }

    /// print_lap_times prints the resulting lap times to the console output.
    pub fn print_lap_times(&self) {
        print!("{}", self);
    }

    /// write_to_file writes the result summary to a text file (default: output/last_run.txt).
    /// Returns the path to the written file.
    pub fn write_to_file(&self, path: Option<&Path>) -> anyhow::Result<String> {
        let out_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let out_dir = Path::new("output");
                std::fs::create_dir_all(out_dir).context("Failed to create output directory!")?;
                out_dir.join("last_run.txt")
            }
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)
            .context(format!(
                "Failed to open result file {}!",
                out_path.display()
            ))?;
        file.write_all(self.to_string().as_bytes())?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}

impl fmt::Display for RaceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_time = |t: Option<f64>| match t {
            Some(t) => format!("{:.3}s", t),
            None => String::from("--"),
        };

        writeln!(f, "RESULT: Lap times")?;
        writeln!(f, "lap, time")?;
        for (i, lap_time) in self.lap_times.iter().enumerate() {
            writeln!(f, "{:3}, {:8.3}s", i + 1, lap_time)?;
        }
        writeln!(
            f,
            "RESULT: {} valid laps, {} discarded, best lap {}",
            self.laps,
            self.discarded_laps,
            fmt_time(self.best_lap_time)
        )?;
        writeln!(
            f,
            "RESULT: {} collisions, health {:.1}/{:.1}, damage player {} / AI {}",
            self.no_collisions,
            self.player_health,
            self.player_max_health,
            self.player_damage,
            self.ai_damage
        )?;
        writeln!(
            f,
            "RESULT: AI passed {} waypoints ({} laps), current target {}",
            self.ai_waypoint_advances,
            self.ai_laps(),
            self.ai_target_index
        )?;
        writeln!(
            f,
            "RESULT: {} ticks, race time {:.3}s, phase {:?}",
            self.no_ticks, self.racetime, self.phase
        )
    }
}
