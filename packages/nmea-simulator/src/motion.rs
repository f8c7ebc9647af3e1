//! motion.rs — Waypoint-route motion with inertia
//!
//! Advances one vessel along its route at a fixed 1 s tick: speed ramps
//! against acceleration/deceleration limits, heading slews at the rudder
//! turn rate, braking distance is computed dynamically from the current
//! speed, and arrival at the final waypoint drops the vessel into Holding.

use nmea_core::geo::{self, Point};

/// Fixed simulation step.
pub const TICK_SECONDS: f64 = 1.0;
/// Rudder-limited heading slew, degrees per second (18°/min).
pub const TURN_RATE_DEG_PER_SEC: f64 = 0.3;

const ACCELERATION_KNPS: f64 = 0.1;
const DECELERATION_KNPS: f64 = 0.2;
const BRAKING_KNPS: f64 = 0.3;
/// Minimum arrival radius, NM.
const ARRIVAL_FLOOR_NM: f64 = 0.005;

/// Where the engine is in its lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Cruising,
    Holding,
    Stopped,
}

/// What one tick did, for the frame emitters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Heading change applied this tick, scaled to degrees per minute.
    pub rot_deg_per_min: f64,
    /// Waypoint index reached this tick, if any.
    pub reached_waypoint: Option<usize>,
}

impl TickReport {
    fn idle() -> Self {
        Self {
            rot_deg_per_min: 0.0,
            reached_waypoint: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MotionEngine {
    waypoints: Vec<Point>,
    max_speed_kn: f64,
    turn_speed_kn: f64,

    pos: Point,
    heading_deg: f64,
    target_heading_deg: f64,
    speed_kn: f64,
    target_speed_kn: f64,
    target_idx: usize,
    mode: Mode,
}

impl MotionEngine {
    /// `waypoints` must be non-empty (validated at the config boundary).
    /// A one-point route starts directly in Holding.
    pub fn new(waypoints: Vec<Point>, max_speed_kn: f64) -> Self {
        let initial_heading = if waypoints.len() > 1 {
            geo::bearing(waypoints[0], waypoints[1])
        } else {
            0.0
        };
        let mode = if waypoints.len() > 1 {
            Mode::Cruising
        } else {
            Mode::Holding
        };
        Self {
            pos: waypoints[0],
            heading_deg: initial_heading,
            target_heading_deg: initial_heading,
            speed_kn: 0.0,
            target_speed_kn: max_speed_kn,
            target_idx: 1,
            mode,
            turn_speed_kn: f64::max(2.0, max_speed_kn * 0.4),
            max_speed_kn,
            waypoints,
        }
    }

    pub fn position(&self) -> Point {
        self.pos
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn speed_kn(&self) -> f64 {
        self.speed_kn
    }

    pub fn max_speed_kn(&self) -> f64 {
        self.max_speed_kn
    }

    pub fn turn_speed_kn(&self) -> f64 {
        self.turn_speed_kn
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// External termination: transport failure or an operator stop.
    pub fn stop(&mut self) {
        self.mode = Mode::Stopped;
        self.speed_kn = 0.0;
    }

    fn enter_holding(&mut self) {
        self.mode = Mode::Holding;
        self.speed_kn = 0.0;
    }

    /// Advance one second of simulated time.
    pub fn tick(&mut self) -> TickReport {
        match self.mode {
            Mode::Cruising => {}
            Mode::Holding => {
                self.speed_kn = 0.0;
                return TickReport::idle();
            }
            Mode::Stopped => return TickReport::idle(),
        }
        if self.target_idx >= self.waypoints.len() {
            self.enter_holding();
            return TickReport::idle();
        }

        let target = self.waypoints[self.target_idx];
        let dist_nm = geo::distance(self.pos, target);
        if dist_nm > ARRIVAL_FLOOR_NM {
            self.target_heading_deg = geo::bearing(self.pos, target);
        }
        let heading_diff =
            (self.target_heading_deg - self.heading_deg + 180.0).rem_euclid(360.0) - 180.0;
        let is_turning = heading_diff.abs() > TURN_RATE_DEG_PER_SEC;
        let is_final = self.target_idx == self.waypoints.len() - 1;

        // Commanded speed: brake for the last waypoint, slow through turns
        self.target_speed_kn = if is_final {
            let time_to_stop_s = self.speed_kn / BRAKING_KNPS;
            let braking_dist_nm = (self.speed_kn / 2.0) / 3600.0 * time_to_stop_s;
            if dist_nm <= braking_dist_nm + ARRIVAL_FLOOR_NM {
                0.0
            } else {
                self.max_speed_kn
            }
        } else if is_turning {
            self.turn_speed_kn
        } else {
            self.max_speed_kn
        };

        // Speed ramp
        if self.speed_kn < self.target_speed_kn {
            self.speed_kn =
                (self.speed_kn + ACCELERATION_KNPS * TICK_SECONDS).min(self.target_speed_kn);
        } else if self.speed_kn > self.target_speed_kn {
            let rate = if self.target_speed_kn == 0.0 {
                BRAKING_KNPS
            } else {
                DECELERATION_KNPS
            };
            self.speed_kn = (self.speed_kn - rate * TICK_SECONDS).max(0.0);
        }

        // Heading slew, snapping once within one rudder step
        let applied_delta = if is_turning {
            let step = TURN_RATE_DEG_PER_SEC.copysign(heading_diff);
            self.heading_deg += step;
            step
        } else {
            self.heading_deg = self.target_heading_deg;
            heading_diff
        };
        self.heading_deg = self.heading_deg.rem_euclid(360.0);

        // Advance along the (possibly still-slewing) heading
        self.pos = geo::destination(self.pos, self.heading_deg, self.speed_kn / 3600.0);

        // Arrival
        let arrival_nm = f64::max(ARRIVAL_FLOOR_NM, self.max_speed_kn / 3600.0 * 2.0);
        let mut reached = None;
        if dist_nm < arrival_nm {
            if is_final {
                if self.speed_kn < 0.1 {
                    reached = Some(self.target_idx);
                    self.enter_holding();
                }
            } else {
                reached = Some(self.target_idx);
                self.target_idx += 1;
            }
        }

        TickReport {
            rot_deg_per_min: applied_delta * 60.0,
            reached_waypoint: reached,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run_ticks(engine: &mut MotionEngine, n: usize) -> Vec<(f64, f64)> {
        (0..n)
            .map(|_| {
                let before = engine.heading_deg();
                engine.tick();
                (engine.speed_kn(), engine.heading_deg() - before)
            })
            .collect()
    }

    #[test]
    fn straight_leg_ramps_to_max_speed() {
        let mut engine = MotionEngine::new(
            vec![Point::new(35.1000, 129.0400), Point::new(35.1500, 129.0400)],
            10.0,
        );
        let mut last = 0.0;
        for i in 0..100 {
            engine.tick();
            assert!(
                engine.speed_kn() >= last,
                "speed dipped at tick {i}: {} < {last}",
                engine.speed_kn()
            );
            assert!(engine.heading_deg() < 0.3 || engine.heading_deg() > 359.7);
            last = engine.speed_kn();
        }
        assert!((engine.speed_kn() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn speed_and_turn_rate_invariants() {
        let mut engine = MotionEngine::new(
            vec![
                Point::new(35.10, 129.04),
                Point::new(35.10, 129.06),
                Point::new(35.12, 129.06),
            ],
            12.0,
        );
        let mut prev_heading = engine.heading_deg();
        for _ in 0..3000 {
            engine.tick();
            assert!(engine.speed_kn() <= 12.0 + 1e-9);
            let mut delta = (engine.heading_deg() - prev_heading).abs();
            if delta > 180.0 {
                delta = 360.0 - delta;
            }
            assert!(delta <= TURN_RATE_DEG_PER_SEC + 1e-9, "Δhdg {delta}");
            prev_heading = engine.heading_deg();
        }
    }

    #[test]
    fn turn_slows_to_turn_speed_then_recovers() {
        // the 90° turn at the second waypoint leads onto a non-final leg,
        // so the turn-speed reduction applies
        let mut engine = MotionEngine::new(
            vec![
                Point::new(35.10, 129.04),
                Point::new(35.10, 129.06),
                Point::new(35.12, 129.06),
                Point::new(35.12, 129.09),
            ],
            12.0,
        );
        assert!((engine.turn_speed_kn() - 4.8).abs() < 1e-9);
        let speeds: Vec<f64> = run_ticks(&mut engine, 3000)
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        let cruise = speeds
            .iter()
            .position(|s| *s >= 11.9)
            .expect("never reached cruise speed");
        let turn_entry = speeds[cruise..]
            .iter()
            .position(|s| *s < 5.0)
            .map(|i| cruise + i)
            .expect("never slowed for the turn");
        let recovered = speeds[turn_entry..]
            .iter()
            .position(|s| *s >= 11.9)
            .map(|i| turn_entry + i)
            .expect("never reaccelerated after the turn");
        let turn_min = speeds[turn_entry..recovered]
            .iter()
            .fold(f64::INFINITY, |a, s| a.min(*s));
        assert!(
            (turn_min - 4.8).abs() < 0.3,
            "expected turn speed near 4.8, got {turn_min}"
        );
    }

    #[test]
    fn final_waypoint_brakes_into_holding() {
        let end = Point::new(35.1500, 129.0400);
        let mut engine =
            MotionEngine::new(vec![Point::new(35.1000, 129.0400), end], 12.0);
        let mut holding_at = None;
        for i in 0..3000 {
            engine.tick();
            if engine.mode() == Mode::Holding {
                holding_at = Some(i);
                break;
            }
        }
        assert!(holding_at.is_some(), "never reached Holding");
        assert_eq!(engine.speed_kn(), 0.0);
        // stops within the dynamic braking envelope of the target
        let braking_envelope = (12.0 / 2.0) / 3600.0 * (12.0 / 0.3) + 0.005;
        assert!(geo::distance(engine.position(), end) < braking_envelope);
    }

    #[test]
    fn single_waypoint_starts_holding() {
        let mut engine = MotionEngine::new(vec![Point::new(35.10, 129.04)], 8.0);
        assert_eq!(engine.mode(), Mode::Holding);
        let before = engine.position();
        engine.tick();
        engine.tick();
        assert_eq!(engine.position(), before);
        assert_eq!(engine.speed_kn(), 0.0);
    }

    #[test]
    fn holding_freezes_position_and_speed() {
        let end = Point::new(35.1020, 129.0400);
        let mut engine =
            MotionEngine::new(vec![Point::new(35.1000, 129.0400), end], 6.0);
        for _ in 0..3000 {
            engine.tick();
            if engine.mode() == Mode::Holding {
                break;
            }
        }
        assert_eq!(engine.mode(), Mode::Holding);
        let pos = engine.position();
        let report = engine.tick();
        assert_eq!(engine.position(), pos);
        assert_eq!(report.rot_deg_per_min, 0.0);
    }

    #[test]
    fn stop_is_terminal() {
        let mut engine = MotionEngine::new(
            vec![Point::new(35.10, 129.04), Point::new(35.15, 129.04)],
            10.0,
        );
        engine.tick();
        engine.stop();
        assert_eq!(engine.mode(), Mode::Stopped);
        let pos = engine.position();
        engine.tick();
        assert_eq!(engine.mode(), Mode::Stopped);
        assert_eq!(engine.position(), pos);
    }

    #[test]
    fn minimum_turn_speed_floor() {
        let engine = MotionEngine::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            3.0,
        );
        assert!((engine.turn_speed_kn() - 2.0).abs() < 1e-9);
    }
}
