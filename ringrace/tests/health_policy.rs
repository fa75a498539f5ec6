use ringrace::core::car::PlayerInput;
use ringrace::core::collision::HealthPolicy;
use ringrace::core::events::RaceEvent;
use ringrace::core::race::{Race, RacePhase};
use ringrace::pre::read_sim_pars::SimPars;

/// The player is parked on top of the waiting AI car, so every cooldown period ends in a penalty.
fn parked_race(health_policy: HealthPolicy) -> Race {
    let mut sim_pars = SimPars::default();
    sim_pars.race_pars.health_policy = health_policy;
    sim_pars.ai_pars.start_delay = 10_000;
    sim_pars.collision_pars.health_loss = 60.0;

    let mut race = Race::new(&sim_pars).unwrap();
    race.player.car.pose.pos = race.ai.car.pos();
    race
}

fn run(race: &mut Race, no_ticks: usize) -> Vec<RaceEvent> {
    (0..no_ticks)
        .flat_map(|_| race.simulate_timestep(&PlayerInput::default()))
        .collect()
}

#[test]
fn clamp_and_finish_ends_the_race() {
    let mut race = parked_race(HealthPolicy::ClampAndFinish);
    let events = run(&mut race, 200);

    let collisions = events
        .iter()
        .filter(|e| matches!(e, RaceEvent::Collision { .. }))
        .count();
    assert_eq!(collisions, 2);

    let depleted_tick = match events.last() {
        Some(RaceEvent::HealthDepleted { tick, .. }) => *tick,
        other => panic!("expected health depletion as last event, got {:?}", other),
    };
    assert!((61..=62).contains(&depleted_tick));

    assert_eq!(race.phase, RacePhase::Finished);
    assert_eq!(race.player.health, 0.0);
    assert_eq!(race.cur_tick, depleted_tick);
    assert!(race.simulate_timestep(&PlayerInput::default()).is_empty());
}

#[test]
fn unclamped_health_goes_negative() {
    let mut race = parked_race(HealthPolicy::Unclamped);
    let events = run(&mut race, 200);

    assert!(events
        .iter()
        .all(|e| !matches!(e, RaceEvent::HealthDepleted { .. })));
    assert_eq!(race.phase, RacePhase::Running);
    assert_eq!(race.cur_tick, 200);
    assert!(race.player.health < 0.0);
    assert_eq!(race.collision_resolver.no_penalties, 4);
}
