use crate::core::ai::{AiCar, AiPars};
use crate::core::car::{Car, Player, PlayerInput, PlayerPars};
use crate::core::collision::{CollisionOutcome, CollisionPars, CollisionResolver, HealthPolicy};
use crate::core::error::{check_positive, ConfigError};
use crate::core::events::{dispatch, RaceEvent, RaceObserver};
use crate::core::geom::Point;
use crate::core::kinematics::heading_towards;
use crate::core::lap_timer::{LapOutcome, LapTimer};
use crate::core::track::{Track, TrackPars};
use crate::interfaces::hud_interface::{CarState, RaceState, RgbColor};
use crate::pre::read_sim_pars::SimPars;
use serde::{Deserialize, Serialize};

/// * `timestep_size` - (s) Duration of one tick
/// * `health_policy` - Behavior when the player's health is used up
/// * `lap_box_size` - Edge length of the square used for start/finish line detection
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RacePars {
    pub timestep_size: f64,
    pub health_policy: HealthPolicy,
    pub lap_box_size: f64,
}

impl Default for RacePars {
    fn default() -> Self {
        RacePars {
            timestep_size: 1.0 / 60.0,
            health_policy: HealthPolicy::Unclamped,
            lap_box_size: 30.0,
        }
    }
}

impl RacePars {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("timestep size", self.timestep_size)?;
        check_positive("lap detection box size", self.lap_box_size)
    }
}

/// RaceContext owns the track and the waypoint sequence of a race. The waypoints are generated
/// once and never change afterwards.
#[derive(Debug, Clone)]
pub struct RaceContext {
    track: Track,
    waypoints: Vec<Point>,
}

impl RaceContext {
    pub fn new(track_pars: &TrackPars) -> Result<RaceContext, ConfigError> {
        let track = Track::new(track_pars)?;
        let waypoints = track.generate_waypoints(track_pars.no_waypoints)?;
        Ok(RaceContext { track, waypoints })
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// ai_spawn returns the AI grid position: the first waypoint, facing the second one.
    pub fn ai_spawn(&self) -> (Point, f64) {
        self.spawn_at(0)
    }

    /// player_spawn returns the player grid position: the second to last waypoint, facing the
    /// last one. The player therefore starts just before the start/finish line.
    pub fn player_spawn(&self) -> (Point, f64) {
        self.spawn_at(self.waypoints.len() - 2)
    }

    fn spawn_at(&self, idx: usize) -> (Point, f64) {
        let pos = self.waypoints[idx];
        let next = self.waypoints[(idx + 1) % self.waypoints.len()];
        (pos, heading_towards(&pos, &next))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    #[default]
    Running,
    Finished,
}

/// Commands of the shell besides the driving input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    TogglePause,
    ToggleDebug,
    ResetAi,
    SkipWaypoint,
    AiFaster,
    AiSlower,
}

/// RaceSnapshot contains the complete mutable state of a race. Restoring it into a race built from
/// the same parameters continues the race exactly where the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub cur_tick: u64,
    pub cur_racetime: f64,
    pub phase: RacePhase,
    pub paused: bool,
    pub debug: bool,
    pub player: Player,
    pub ai: AiCar,
    pub lap_timer: LapTimer,
    pub collision_resolver: CollisionResolver,
    pub no_waypoint_advances: u64,
}

pub struct Race {
    pub timestep_size: f64,
    pub cur_tick: u64,
    pub cur_racetime: f64,
    pub phase: RacePhase,
    pub paused: bool,
    pub debug: bool,
    pub context: RaceContext,
    pub player: Player,
    pub ai: AiCar,
    pub lap_timer: LapTimer,
    pub collision_resolver: CollisionResolver,
    pub no_waypoint_advances: u64,
    pub player_color: RgbColor,
    pub ai_color: RgbColor,
    health_policy: HealthPolicy,
    player_pars: PlayerPars,
    ai_pars: AiPars,
    collision_pars: CollisionPars,
    observers: Vec<Box<dyn RaceObserver + Send>>,
}

impl Race {
    /// new validates the parameters and creates a race with both cars on the grid.
    pub fn new(sim_pars: &SimPars) -> Result<Race, ConfigError> {
        sim_pars.race_pars.validate()?;
        sim_pars.player_pars.validate()?;
        sim_pars.ai_pars.validate()?;
        sim_pars.collision_pars.validate()?;

        let context = RaceContext::new(&sim_pars.track_pars)?;
        let player_color = parse_color("player", &sim_pars.player_pars.body.color)?;
        let ai_color = parse_color("AI car", &sim_pars.ai_pars.body.color)?;

        let (player_pos, player_heading) = context.player_spawn();
        let (ai_pos, ai_heading) = context.ai_spawn();

        Ok(Race {
            timestep_size: sim_pars.race_pars.timestep_size,
            cur_tick: 0,
            cur_racetime: 0.0,
            phase: RacePhase::Running,
            paused: false,
            debug: false,
            player: Player::new(&sim_pars.player_pars, player_pos, player_heading),
            ai: AiCar::new(&sim_pars.ai_pars, ai_pos, ai_heading),
            lap_timer: LapTimer::new(0.0, sim_pars.race_pars.lap_box_size),
            collision_resolver: CollisionResolver::new(),
            no_waypoint_advances: 0,
            player_color,
            ai_color,
            health_policy: sim_pars.race_pars.health_policy,
            player_pars: sim_pars.player_pars.clone(),
            ai_pars: sim_pars.ai_pars.clone(),
            collision_pars: sim_pars.collision_pars.clone(),
            context,
            observers: Vec::new(),
        })
    }

    /// subscribe registers an observer that receives all events of the following ticks.
    pub fn subscribe(&mut self, observer: Box<dyn RaceObserver + Send>) {
        self.observers.push(observer);
    }

    pub fn track(&self) -> &Track {
        self.context.track()
    }

    pub fn waypoints(&self) -> &[Point] {
        self.context.waypoints()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHODS --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// simulate_timestep simulates one tick at the race time that follows from the tick counter.
    /// Race time does not advance while the race is paused or finished.
    pub fn simulate_timestep(&mut self, input: &PlayerInput) -> Vec<RaceEvent> {
        let now = (self.cur_tick + 1) as f64 * self.timestep_size;
        self.tick(input, now)
    }

    /// tick advances the race by one tick at race time `now` and returns the events of the tick
    /// after they were dispatched to the observers. It does nothing while the race is paused or
    /// finished.
    pub fn tick(&mut self, input: &PlayerInput, now: f64) -> Vec<RaceEvent> {
        if self.paused || self.is_finished() {
            return Vec::new();
        }

        self.cur_tick += 1;
        self.cur_racetime = now;
        let tick = self.cur_tick;
        let mut events = Vec::new();

        // collisions -------------------------------------------------------------------------------
        let outcome = self.collision_resolver.resolve(
            &mut self.player,
            &mut self.ai.car,
            &self.collision_pars,
            self.health_policy,
            now,
        );

        if let CollisionOutcome::Penalty { depleted } = outcome {
            events.push(RaceEvent::Collision {
                tick,
                time_s: now,
                player_health: self.player.health,
                player_damage: self.player.car.damage,
                ai_damage: self.ai.car.damage,
            });

            if depleted {
                events.push(RaceEvent::HealthDepleted { tick, time_s: now });
                self.phase = RacePhase::Finished;
                self.notify(&events);
                return events;
            }
        }

        self.player.car.decay_flash();
        self.ai.car.decay_flash();

        // AI ---------------------------------------------------------------------------------------
        if let Some(target_index) = self.ai.update(self.context.waypoints(), &self.ai_pars) {
            self.no_waypoint_advances += 1;
            events.push(RaceEvent::WaypointAdvanced { tick, target_index });
        }

        // player -----------------------------------------------------------------------------------
        self.player.apply_input(input, &self.player_pars);

        // lap timing -------------------------------------------------------------------------------
        let track = self.context.track();
        self.lap_timer.update_lap_validity(track, &self.player.car);
        match self.lap_timer.check_crossing(track, &self.player.car, now) {
            LapOutcome::Completed { lap, lap_time } => {
                events.push(RaceEvent::LapCompleted {
                    tick,
                    lap,
                    lap_time,
                });
            }
            LapOutcome::Discarded => events.push(RaceEvent::LapDiscarded { tick }),
            LapOutcome::NoCrossing => {}
        }

        self.notify(&events);
        events
    }

    fn notify(&mut self, events: &[RaceEvent]) {
        for event in events {
            for observer in self.observers.iter_mut() {
                dispatch(observer.as_mut(), event);
            }
        }
    }

    /// apply_command executes a shell command. Commands are accepted while paused.
    pub fn apply_command(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::TogglePause => self.paused = !self.paused,
            ShellCommand::ToggleDebug => self.debug = !self.debug,
            ShellCommand::ResetAi => {
                let (pos, heading) = self.context.ai_spawn();
                self.ai = AiCar::new(&self.ai_pars, pos, heading);
            }
            ShellCommand::SkipWaypoint => self.ai.skip_waypoint(self.context.waypoints().len()),
            ShellCommand::AiFaster => self.ai.change_max_speed(
                self.ai_pars.max_speed_step,
                self.collision_pars.ai_min_max_speed,
            ),
            ShellCommand::AiSlower => self.ai.change_max_speed(
                -self.ai_pars.max_speed_step,
                self.collision_pars.ai_min_max_speed,
            ),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // STATE ---------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// race_state returns the current state for rendering.
    pub fn race_state(&self) -> RaceState {
        RaceState {
            tick: self.cur_tick,
            racetime: self.cur_racetime,
            player: car_state(&self.player.car, self.player_color),
            ai: car_state(&self.ai.car, self.ai_color),
            laps: self.lap_timer.laps,
            cur_lap_time: self.lap_timer.current_lap_time(self.cur_racetime),
            last_lap_time: self.lap_timer.last_lap_time,
            best_lap_time: self.lap_timer.best_lap_time,
            lap_valid: self.lap_timer.lap_valid,
            health: self.player.health,
            max_health: self.player.max_health,
            health_fraction: self.player.health_fraction(),
            on_track: self.track().is_on_track(&self.player.car.pos()),
            ai_target_index: self.ai.target_index,
            debug: self.debug,
            paused: self.paused,
            phase: self.phase,
            final_result: None,
        }
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            cur_tick: self.cur_tick,
            cur_racetime: self.cur_racetime,
            phase: self.phase,
            paused: self.paused,
            debug: self.debug,
            player: self.player.clone(),
            ai: self.ai.clone(),
            lap_timer: self.lap_timer.clone(),
            collision_resolver: self.collision_resolver.clone(),
            no_waypoint_advances: self.no_waypoint_advances,
        }
    }

    /// restore replaces the mutable race state by the snapshot. The snapshot is rejected if its
    /// AI target does not exist on this race's track.
    pub fn restore(&mut self, snapshot: RaceSnapshot) -> Result<(), ConfigError> {
        let len = self.context.waypoints().len();
        if snapshot.ai.target_index >= len {
            return Err(ConfigError::WaypointIndex {
                index: snapshot.ai.target_index,
                len,
            });
        }

        self.cur_tick = snapshot.cur_tick;
        self.cur_racetime = snapshot.cur_racetime;
        self.phase = snapshot.phase;
        self.paused = snapshot.paused;
        self.debug = snapshot.debug;
        self.player = snapshot.player;
        self.ai = snapshot.ai;
        self.lap_timer = snapshot.lap_timer;
        self.collision_resolver = snapshot.collision_resolver;
        self.no_waypoint_advances = snapshot.no_waypoint_advances;
        Ok(())
    }
}

fn car_state(car: &Car, color: RgbColor) -> CarState {
    CarState {
        x: car.pose.pos.x,
        y: car.pose.pos.y,
        heading: car.pose.heading,
        speed: car.pose.speed,
        max_speed: car.pose.max_speed,
        damage: car.damage,
        flash_timer: car.flash_timer,
        color,
    }
}

/// parse_color converts a CSS color string into an RGB triple.
pub fn parse_color(name: &'static str, value: &str) -> Result<RgbColor, ConfigError> {
    let color = value
        .parse::<css_color_parser::Color>()
        .map_err(|_| ConfigError::Color {
            name,
            value: value.to_owned(),
        })?;
    Ok(RgbColor {
        r: color.r,
        g: color.g,
        b: color.b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::AiState;
    use crate::core::events::EventLog;
    use approx::assert_abs_diff_eq;
    use std::sync::{Arc, Mutex};

    fn default_race() -> Race {
        Race::new(&SimPars::default()).unwrap()
    }

    #[test]
    fn spawn_positions() {
        let race = default_race();
        let wps = race.waypoints();

        assert_eq!(race.ai.car.pos(), wps[0]);
        assert_eq!(race.player.car.pos(), wps[98]);
        assert_eq!(race.ai.state, AiState::Idle { remaining: 60 });
        // both cars face along the racing direction, i.e. to the right at the bottom
        assert!(race.ai.car.pose.heading > 180.0 && race.ai.car.pose.heading < 360.0);
        assert!(race.player.car.pose.heading > 180.0 && race.player.car.pose.heading < 360.0);
    }

    #[test]
    fn pause_freezes_everything() {
        let mut race = default_race();
        let forward = PlayerInput {
            throttle_forward: true,
            ..PlayerInput::default()
        };
        race.simulate_timestep(&forward);
        race.apply_command(ShellCommand::TogglePause);
        let before = race.snapshot();

        for _ in 0..100 {
            assert!(race.simulate_timestep(&forward).is_empty());
        }
        assert_eq!(race.snapshot(), before);

        race.apply_command(ShellCommand::TogglePause);
        race.simulate_timestep(&forward);
        assert_eq!(race.cur_tick, 2);
        assert_abs_diff_eq!(race.cur_racetime, 2.0 / 60.0, epsilon = 1e-12);
    }

    #[test]
    fn flash_decays_per_tick_and_freezes_while_paused() {
        let mut race = default_race();
        race.player.car.pose.pos = race.ai.car.pos();

        // contact sets 15 and the same tick counts it down once
        race.simulate_timestep(&PlayerInput::default());
        assert_eq!(race.player.car.flash_timer, 14);
        assert_eq!(race.ai.car.flash_timer, 14);

        race.player.car.pose.pos = race.waypoints()[50];
        race.simulate_timestep(&PlayerInput::default());
        assert_eq!(race.player.car.flash_timer, 13);
        assert_eq!(race.ai.car.flash_timer, 13);

        race.apply_command(ShellCommand::TogglePause);
        for _ in 0..5 {
            race.simulate_timestep(&PlayerInput::default());
        }
        assert_eq!(race.player.car.flash_timer, 13);
        assert_eq!(race.ai.car.flash_timer, 13);

        race.apply_command(ShellCommand::TogglePause);
        race.simulate_timestep(&PlayerInput::default());
        assert_eq!(race.player.car.flash_timer, 12);
        assert_eq!(race.race_state().player.flash_timer, 12);
    }

    #[test]
    fn hud_health_bar_follows_player_health() {
        let mut sim_pars = SimPars::default();
        sim_pars.collision_pars.health_loss = 150.0;
        let mut race = Race::new(&sim_pars).unwrap();
        assert_abs_diff_eq!(race.race_state().health_fraction, 1.0);
        assert!(race.race_state().hud_line().contains("[##########]"));

        race.player.car.pose.pos = race.ai.car.pos();
        race.simulate_timestep(&PlayerInput::default());

        let state = race.race_state();
        assert_abs_diff_eq!(state.health, -50.0);
        assert_abs_diff_eq!(state.health_fraction, 0.0);
        assert!(state.hud_line().contains("[..........]"));
    }

    #[test]
    fn slower_command_uses_collision_floor() {
        let mut sim_pars = SimPars::default();
        sim_pars.collision_pars.ai_min_max_speed = 2.0;
        let mut race = Race::new(&sim_pars).unwrap();

        for _ in 0..3 {
            race.apply_command(ShellCommand::AiSlower);
        }
        assert_abs_diff_eq!(race.ai.car.pose.max_speed, 2.0);
    }

    #[test]
    fn player_first_crossing_counts_as_lap() {
        let mut race = default_race();
        let forward = PlayerInput {
            throttle_forward: true,
            ..PlayerInput::default()
        };

        let mut laps = Vec::new();
        for _ in 0..30 {
            for event in race.simulate_timestep(&forward) {
                if let RaceEvent::LapCompleted { lap, .. } = event {
                    laps.push(lap);
                }
            }
        }
        assert_eq!(laps, vec![1]);
        assert_eq!(race.lap_timer.laps, 1);
    }

    #[test]
    fn debug_commands() {
        let mut race = default_race();

        race.apply_command(ShellCommand::SkipWaypoint);
        assert_eq!(race.ai.target_index, 1);
        race.apply_command(ShellCommand::AiFaster);
        assert_abs_diff_eq!(race.ai.car.pose.max_speed, 3.0);
        race.apply_command(ShellCommand::AiSlower);
        race.apply_command(ShellCommand::AiSlower);
        assert_abs_diff_eq!(race.ai.car.pose.max_speed, 2.0);

        race.apply_command(ShellCommand::ResetAi);
        assert_eq!(race.ai.target_index, 0);
        assert_abs_diff_eq!(race.ai.car.pose.max_speed, 2.5);
        assert_eq!(race.ai.car.pos(), race.waypoints()[0]);

        race.apply_command(ShellCommand::ToggleDebug);
        assert!(race.race_state().debug);
    }

    #[test]
    fn observers_receive_events() {
        struct Shared(Arc<Mutex<EventLog>>);
        impl RaceObserver for Shared {
            fn on_event(&mut self, event: &RaceEvent) {
                self.0.lock().unwrap().on_event(event);
            }
        }

        let log = Arc::new(Mutex::new(EventLog::default()));
        let mut race = default_race();
        race.subscribe(Box::new(Shared(Arc::clone(&log))));

        let mut returned = Vec::new();
        for _ in 0..300 {
            returned.extend(race.simulate_timestep(&PlayerInput::default()));
        }

        let log = log.lock().unwrap();
        assert!(!returned.is_empty());
        assert_eq!(log.events, returned);
    }

    #[test]
    fn bad_color_is_rejected() {
        let mut sim_pars = SimPars::default();
        sim_pars.ai_pars.body.color = String::from("not a color");

        assert!(matches!(
            Race::new(&sim_pars),
            Err(ConfigError::Color { .. })
        ));
    }

    #[test]
    fn restore_rejects_foreign_waypoint_index() {
        let mut race = default_race();
        let mut snapshot = race.snapshot();
        snapshot.ai.target_index = 100;

        assert_eq!(
            race.restore(snapshot),
            Err(ConfigError::WaypointIndex {
                index: 100,
                len: 100
            })
        );
    }
}
