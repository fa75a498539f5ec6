use crate::core::car::Car;
use crate::core::geom::Rect;
use crate::core::track::Track;
use serde::{Deserialize, Serialize};

/// Outcome of a start/finish line check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LapOutcome {
    NoCrossing,
    Completed { lap: u32, lap_time: f64 },
    Discarded,
}

/// LapTimer counts valid laps of one car.
/// * `start_time` - (s) Race time at which the current lap started
/// * `laps` - Number of valid completed laps
/// * `last_cross` - True if the car overlapped the start/finish line during the previous tick
/// * `last_lap_time` - (s) Duration of the last valid lap
/// * `best_lap_time` - (s) Fastest valid lap so far
/// * `lap_valid` - False once the car left the track during the current lap
/// * `lap_times` - (s) Durations of all valid laps in order
/// * `discarded_laps` - Number of crossings that did not count because the lap was invalid
/// * `car_box_size` - Edge length of the square around the car used for line detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapTimer {
    pub start_time: f64,
    pub laps: u32,
    pub last_cross: bool,
    pub last_lap_time: Option<f64>,
    pub best_lap_time: Option<f64>,
    pub lap_valid: bool,
    pub lap_times: Vec<f64>,
    pub discarded_laps: u32,
    car_box_size: f64,
}

impl LapTimer {
    pub fn new(start_time: f64, car_box_size: f64) -> LapTimer {
        LapTimer {
            start_time,
            laps: 0,
            last_cross: false,
            last_lap_time: None,
            best_lap_time: None,
            lap_valid: true,
            lap_times: Vec::new(),
            discarded_laps: 0,
            car_box_size,
        }
    }

    /// detection_box returns the fixed-size square around the car that is tested against the
    /// start/finish line.
    pub fn detection_box(&self, car: &Car) -> Rect {
        Rect::from_center(car.pos(), self.car_box_size, self.car_box_size)
    }

    /// update_lap_validity invalidates the current lap as soon as the car is off track. It must
    /// be called every tick before `check_crossing`. An invalid lap stays invalid until the next
    /// crossing.
    pub fn update_lap_validity(&mut self, track: &Track, car: &Car) {
        if !track.is_on_track(&car.pos()) {
            self.lap_valid = false;
        }
    }

    /// check_crossing detects the car entering the start/finish line while moving forward. A valid
    /// lap is counted and timed, an invalid one is discarded. Either way the next lap starts at
    /// `now` and is valid again.
    pub fn check_crossing(&mut self, track: &Track, car: &Car, now: f64) -> LapOutcome {
        let crossing = self.detection_box(car).overlaps(&track.start_line);
        let mut outcome = LapOutcome::NoCrossing;

        if crossing && !self.last_cross && car.pose.speed > 0.0 {
            if self.lap_valid {
                let lap_time = now - self.start_time;
                self.laps += 1;
                self.last_lap_time = Some(lap_time);
                self.best_lap_time = Some(match self.best_lap_time {
                    Some(best) => best.min(lap_time),
                    None => lap_time,
                });
                self.lap_times.push(lap_time);
                outcome = LapOutcome::Completed {
                    lap: self.laps,
                    lap_time,
                };
            } else {
                self.discarded_laps += 1;
                outcome = LapOutcome::Discarded;
            }

            self.start_time = now;
            self.lap_valid = true;
        }

        self.last_cross = crossing;
        outcome
    }

    /// current_lap_time returns the time spent in the running lap.
    pub fn current_lap_time(&self, now: f64) -> f64 {
        now - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::car::BodyPars;
    use crate::core::geom::Point;
    use crate::core::kinematics::Pose;
    use crate::core::track::TrackPars;
    use approx::assert_abs_diff_eq;

    fn car_at(x: f64, y: f64, speed: f64) -> Car {
        let mut car = Car::new(Pose::new(Point::new(x, y), 270.0, 6.0), &BodyPars::default());
        car.pose.speed = speed;
        car
    }

    fn track() -> Track {
        Track::new(&TrackPars::default()).unwrap()
    }

    #[test]
    fn crossing_counts_once_per_entry() {
        let track = track();
        let mut timer = LapTimer::new(0.0, 30.0);

        assert_eq!(
            timer.check_crossing(&track, &car_at(360.0, 500.0, 5.0), 1.0),
            LapOutcome::NoCrossing
        );
        assert_eq!(
            timer.check_crossing(&track, &car_at(385.0, 500.0, 5.0), 2.0),
            LapOutcome::Completed {
                lap: 1,
                lap_time: 2.0
            }
        );
        // still on the line: no second count
        assert_eq!(
            timer.check_crossing(&track, &car_at(400.0, 500.0, 5.0), 2.1),
            LapOutcome::NoCrossing
        );
        assert_eq!(timer.laps, 1);
        assert_eq!(timer.last_lap_time, Some(2.0));
        assert_abs_diff_eq!(timer.start_time, 2.0);
    }

    #[test]
    fn standing_on_the_line_does_not_count() {
        let track = track();
        let mut timer = LapTimer::new(0.0, 30.0);

        assert_eq!(
            timer.check_crossing(&track, &car_at(400.0, 500.0, 0.0), 1.0),
            LapOutcome::NoCrossing
        );
        // the edge was consumed while standing, so creeping forward does not count either
        assert_eq!(
            timer.check_crossing(&track, &car_at(401.0, 500.0, 1.0), 1.1),
            LapOutcome::NoCrossing
        );
        assert_eq!(timer.laps, 0);
    }

    #[test]
    fn off_track_lap_is_discarded() {
        let track = track();
        let mut timer = LapTimer::new(0.0, 30.0);

        // drive into the infield and back
        timer.update_lap_validity(&track, &car_at(400.0, 300.0, 5.0));
        assert!(!timer.lap_valid);
        timer.update_lap_validity(&track, &car_at(360.0, 500.0, 5.0));
        assert!(!timer.lap_valid);
        timer.check_crossing(&track, &car_at(360.0, 500.0, 5.0), 9.0);

        let outcome = timer.check_crossing(&track, &car_at(385.0, 500.0, 5.0), 10.0);
        assert_eq!(outcome, LapOutcome::Discarded);
        assert_eq!(timer.laps, 0);
        assert_eq!(timer.discarded_laps, 1);
        assert_eq!(timer.last_lap_time, None);
        assert!(timer.lap_valid);
        assert!(timer.last_cross);
        assert_abs_diff_eq!(timer.start_time, 10.0);

        // the next clean lap counts from the discarded crossing
        timer.check_crossing(&track, &car_at(360.0, 500.0, 5.0), 20.0);
        let outcome = timer.check_crossing(&track, &car_at(385.0, 500.0, 5.0), 25.5);
        assert_eq!(
            outcome,
            LapOutcome::Completed {
                lap: 1,
                lap_time: 15.5
            }
        );
    }

    #[test]
    fn best_lap_is_tracked() {
        let track = track();
        let mut timer = LapTimer::new(0.0, 30.0);

        for now in [30.0, 55.0, 85.0] {
            timer.check_crossing(&track, &car_at(360.0, 500.0, 5.0), now - 1.0);
            timer.check_crossing(&track, &car_at(385.0, 500.0, 5.0), now);
        }

        assert_eq!(timer.lap_times, vec![30.0, 25.0, 30.0]);
        assert_eq!(timer.best_lap_time, Some(25.0));
        assert_eq!(timer.last_lap_time, Some(30.0));
    }
}
