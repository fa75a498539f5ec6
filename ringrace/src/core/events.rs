use flume::Sender;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Notable things that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    WaypointAdvanced {
        tick: u64,
        target_index: usize,
    },
    LapCompleted {
        tick: u64,
        lap: u32,
        lap_time: f64,
    },
    LapDiscarded {
        tick: u64,
    },
    Collision {
        tick: u64,
        time_s: f64,
        player_health: f64,
        player_damage: u32,
        ai_damage: u32,
    },
    HealthDepleted {
        tick: u64,
        time_s: f64,
    },
}

/// RaceObserver receives the events of a race. Every hook forwards to `on_event` unless it is
/// overridden, so an observer interested in everything only implements `on_event`.
pub trait RaceObserver {
    fn on_event(&mut self, _event: &RaceEvent) {}

    fn on_waypoint_advance(&mut self, event: &RaceEvent) {
        self.on_event(event)
    }

    fn on_lap_completed(&mut self, event: &RaceEvent) {
        self.on_event(event)
    }

    fn on_lap_discarded(&mut self, event: &RaceEvent) {
        self.on_event(event)
    }

    fn on_collision(&mut self, event: &RaceEvent) {
        self.on_event(event)
    }

    fn on_health_depleted(&mut self, event: &RaceEvent) {
        self.on_event(event)
    }
}

/// dispatch calls the hook matching the event.
pub fn dispatch(observer: &mut dyn RaceObserver, event: &RaceEvent) {
    match event {
        RaceEvent::WaypointAdvanced { .. } => observer.on_waypoint_advance(event),
        RaceEvent::LapCompleted { .. } => observer.on_lap_completed(event),
        RaceEvent::LapDiscarded { .. } => observer.on_lap_discarded(event),
        RaceEvent::Collision { .. } => observer.on_collision(event),
        RaceEvent::HealthDepleted { .. } => observer.on_health_depleted(event),
    }
}

/// LogObserver writes every event to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct LogObserver;

impl RaceObserver for LogObserver {
    fn on_event(&mut self, event: &RaceEvent) {
        match event {
            RaceEvent::WaypointAdvanced { tick, target_index } => {
                debug!(tick, target_index, "AI switched to next waypoint")
            }
            RaceEvent::LapCompleted {
                tick,
                lap,
                lap_time,
            } => info!(tick, lap, lap_time, "lap completed"),
            RaceEvent::LapDiscarded { tick } => info!(tick, "lap discarded (left the track)"),
            RaceEvent::Collision {
                tick,
                player_health,
                player_damage,
                ai_damage,
                ..
            } => info!(tick, player_health, player_damage, ai_damage, "collision with AI car"),
            RaceEvent::HealthDepleted { tick, time_s } => {
                warn!(tick, time_s, "player health depleted, race finished")
            }
        }
    }
}

/// ChannelObserver forwards the events to another thread. Events are dropped once the receiver
/// is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<RaceEvent>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<RaceEvent>) -> ChannelObserver {
        ChannelObserver { tx }
    }
}

impl RaceObserver for ChannelObserver {
    fn on_event(&mut self, event: &RaceEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// EventLog collects all events of a race in order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<RaceEvent>,
}

impl RaceObserver for EventLog {
    fn on_event(&mut self, event: &RaceEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct LapCounter {
        laps: u32,
        others: u32,
    }

    impl RaceObserver for LapCounter {
        fn on_event(&mut self, _event: &RaceEvent) {
            self.others += 1;
        }

        fn on_lap_completed(&mut self, _event: &RaceEvent) {
            self.laps += 1;
        }
    }

    #[test]
    fn dispatch_picks_matching_hook() {
        let mut counter = LapCounter::default();
        dispatch(
            &mut counter,
            &RaceEvent::LapCompleted {
                tick: 10,
                lap: 1,
                lap_time: 12.5,
            },
        );
        dispatch(&mut counter, &RaceEvent::LapDiscarded { tick: 11 });

        assert_eq!(counter.laps, 1);
        assert_eq!(counter.others, 1);
    }

    #[test]
    fn channel_observer_forwards_and_survives_closed_channel() {
        let (tx, rx) = flume::unbounded();
        let mut observer = ChannelObserver::new(tx);
        let event = RaceEvent::HealthDepleted {
            tick: 3,
            time_s: 0.05,
        };

        dispatch(&mut observer, &event);
        assert_eq!(rx.try_recv(), Ok(event.clone()));

        drop(rx);
        dispatch(&mut observer, &event);
    }
}
