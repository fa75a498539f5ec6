use ringrace::core::car::PlayerInput;
use ringrace::core::events::RaceEvent;
use ringrace::core::race::Race;
use ringrace::pre::read_sim_pars::SimPars;

fn waypoint_advances(race: &mut Race, no_ticks: u64) -> Vec<usize> {
    let mut advances = Vec::new();
    for _ in 0..no_ticks {
        for event in race.simulate_timestep(&PlayerInput::default()) {
            if let RaceEvent::WaypointAdvanced { target_index, .. } = event {
                advances.push(target_index);
            }
        }
    }
    advances
}

#[test]
fn ai_laps_the_default_track_in_order() {
    let mut race = Race::new(&SimPars::default()).unwrap();
    let n = race.waypoints().len();

    let advances = waypoint_advances(&mut race, 5000);

    assert!(
        advances.len() >= n,
        "AI passed only {} of {} waypoints",
        advances.len(),
        n
    );
    let first_lap: Vec<usize> = advances[..n].to_vec();
    let expected: Vec<usize> = (1..n).chain(std::iter::once(0)).collect();
    assert_eq!(first_lap, expected);

    for pair in advances.windows(2) {
        assert_eq!(pair[1], (pair[0] + 1) % n);
    }
    assert_eq!(race.no_waypoint_advances, advances.len() as u64);
}

#[test]
fn ai_stays_on_track() {
    let mut race = Race::new(&SimPars::default()).unwrap();

    for _ in 0..2000 {
        race.simulate_timestep(&PlayerInput::default());
        let pos = race.ai.car.pos();
        assert!(
            race.track().is_on_track(&pos),
            "AI left the track at tick {}: {:?}",
            race.cur_tick,
            pos
        );
    }
}

#[test]
fn ai_waits_on_the_grid() {
    let mut race = Race::new(&SimPars::default()).unwrap();
    let spawn = race.ai.car.pos();

    for _ in 0..60 {
        race.simulate_timestep(&PlayerInput::default());
    }
    assert_eq!(race.ai.car.pos(), spawn);
    assert_eq!(race.ai.target_index, 0);

    race.simulate_timestep(&PlayerInput::default());
    assert_eq!(race.ai.target_index, 1);
}

#[test]
fn small_waypoint_counts_are_followed() {
    let mut sim_pars = SimPars::default();
    sim_pars.track_pars.no_waypoints = 12;
    let mut race = Race::new(&sim_pars).unwrap();

    let advances = waypoint_advances(&mut race, 5000);

    assert!(advances.len() >= 12);
    for pair in advances.windows(2) {
        assert_eq!(pair[1], (pair[0] + 1) % 12);
    }
}
