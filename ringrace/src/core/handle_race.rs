use crate::core::events::LogObserver;
use crate::core::race::Race;
use crate::interfaces::autopilot::Autopilot;
use crate::interfaces::hud_interface::{RaceState, MAX_HUD_UPDATE_FREQUENCY};
use crate::post::race_result::RaceResult;
use crate::post::telemetry::TelemetryWriter;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::Sender;
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Upper bound for the number of path points reserved before the race starts.
const MAX_PATH_PREALLOC: u64 = 1 << 16;

/// handle_race creates and simulates a race on the basis of the inserted parameters, and returns
/// the results for post-processing. The player is driven by the autopilot. The race ends after
/// `no_ticks` simulated ticks or when it reaches its finished phase.
pub fn handle_race(
    sim_pars: &SimPars,
    no_ticks: u64,
    seed: u64,
    print_debug: bool,
    tx: Option<&Sender<RaceState>>,
    realtime_factor: f64,
    telemetry_path: Option<&Path>,
) -> anyhow::Result<RaceResult> {
    let mut race = Race::new(sim_pars).context("Failed to set up the race!")?;
    race.debug = print_debug;
    race.subscribe(Box::new(LogObserver));

    let mut autopilot = Autopilot::new(&sim_pars.autopilot_pars, seed, &race)
        .context("Failed to set up the autopilot!")?;

    let mut telemetry = match telemetry_path {
        Some(path) => Some(TelemetryWriter::create(path)?),
        None => None,
    };

    // the race may finish long before `no_ticks`
    let path_capacity = no_ticks.min(MAX_PATH_PREALLOC) as usize;
    let mut player_path = Vec::with_capacity(path_capacity);
    let mut ai_path = Vec::with_capacity(path_capacity);
    let mut events = Vec::new();

    // check if sender was inserted -> in that case use real-time simulation for the HUD
    let sim_realtime = tx.is_some();
    if sim_realtime && !(realtime_factor > 0.0 && realtime_factor.is_finite()) {
        anyhow::bail!("Real-time factor must be positive (got {})!", realtime_factor);
    }

    let mut t_race_update_print = 0.0;
    let mut t_race_update_hud = f64::NEG_INFINITY;

    while race.cur_tick < no_ticks && !race.is_finished() {
        let t_start = Instant::now();

        let input = autopilot.next_input(&race);
        events.extend(race.simulate_timestep(&input));

        player_path.push((race.player.car.pose.pos.x, race.player.car.pose.pos.y));
        ai_path.push((race.ai.car.pose.pos.x, race.ai.car.pose.pos.y));

        if let Some(telemetry) = telemetry.as_mut() {
            telemetry.write(&race.race_state())?;
        }

        if race.cur_racetime > t_race_update_print + 0.9999 {
            debug!(
                racetime = race.cur_racetime,
                laps = race.lap_timer.laps,
                "Simulating..."
            );
            t_race_update_print = race.cur_racetime;
        }

        if let Some(tx) = tx {
            if race.cur_racetime > t_race_update_hud + 1.0 / MAX_HUD_UPDATE_FREQUENCY - 0.001 {
                tx.send(race.race_state())
                    .context("Failed to send race state to HUD!")?;
                t_race_update_hud = race.cur_racetime;
            }

            // sleep until time step is finished in real-time as well
            let t_step = Duration::from_secs_f64(race.timestep_size / realtime_factor);
            match t_step.checked_sub(t_start.elapsed()) {
                Some(t_sleep) => sleep(t_sleep),
                None => warn!(tick = race.cur_tick, "Could not keep up with real-time!"),
            }
        }
    }

    if let Some(telemetry) = telemetry {
        telemetry.finish()?;
    }

    let mut result = RaceResult::from_race(&race);
    result.player_path = player_path;
    result.ai_path = ai_path;
    result.events = events;
    info!(
        ticks = result.no_ticks,
        laps = result.laps,
        collisions = result.no_collisions,
        "race simulation finished"
    );

    // after the real-time loop finishes, send the final result once
    if let Some(tx) = tx {
        let final_msg = RaceState {
            final_result: Some(result.clone()),
            ..race.race_state()
        };
        tx.send(final_msg)
            .context("Failed to send final race result to HUD!")?;
    }

    Ok(result)
}
