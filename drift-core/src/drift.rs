use glam::{Quat, Vec3};
use tracing::debug;

use crate::pose::BodyState;
use crate::settings::DriftSettings;

// Angle in radians between where the car points and where it is actually
// going. Always within [0, π]; the dot product is clamped first because
// floating error can push it a hair outside acos' domain.
pub fn slip_angle(forward: Vec3, velocity: Vec3) -> f32 {
    let dot = forward.dot(velocity.normalize_or_zero());
    dot.clamp(-1.0, 1.0).acos()
}

// The car's nose points down its local -z axis.
pub fn forward_vector(orientation: Quat) -> Vec3 {
    orientation * -Vec3::Z
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DriftEvent {
    Started,
    // `credited` tells whether the run cleared the threshold and should be
    // added to the session total
    Ended { score: f32, credited: bool },
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DriftState {
    pub active: bool,
    pub score: f32,
    pub angle: f32,
}

// Result of one scoring tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DriftReading {
    pub drifting: bool,
    pub speed: f32,
    pub angle: f32,
    pub score: f32,
    pub event: Option<DriftEvent>,
}

pub struct DriftScorer {
    state: DriftState,
    tuning: DriftSettings,
}

impl DriftScorer {
    pub fn new(tuning: DriftSettings) -> Self {
        Self {
            state: DriftState::default(),
            tuning,
        }
    }

    pub fn state(&self) -> DriftState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = DriftState::default();
    }

    pub fn update(&mut self, body: &BodyState, handbrake: bool) -> DriftReading {
        let speed = body.speed();

        // below the minimum speed nothing counts as a drift, and the last
        // angle is kept as is
        let mut drifting = false;
        if speed > self.tuning.min_speed {
            let angle = slip_angle(forward_vector(body.orientation), body.linear_velocity);
            self.state.angle = angle;

            if angle > self.tuning.min_angle || (handbrake && speed > self.tuning.handbrake_speed)
            {
                drifting = true;
                self.state.score += (1.0 + angle * 5.0) * (speed / 10.0);
            }
        }

        let event = match (self.state.active, drifting) {
            (false, true) => {
                self.state.active = true;
                debug!("drift started at speed {:.1}", speed);
                Some(DriftEvent::Started)
            }
            (true, false) => {
                let score = self.state.score;
                let credited = score > self.tuning.credit_threshold;
                debug!("drift ended with {:.1} points (credited: {})", score, credited);

                self.state.active = false;
                self.state.score = 0.0;
                Some(DriftEvent::Ended { score, credited })
            }
            _ => None,
        };

        DriftReading {
            drifting,
            speed,
            angle: self.state.angle,
            score: self.state.score,
            event,
        }
    }
}

// Running total for the session; only finished drifts over the threshold
// feed into it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SessionScore {
    total: f32,
}

impl SessionScore {
    pub fn total(&self) -> f32 {
        self.total
    }

    pub fn credit(&mut self, score: f32) -> f32 {
        self.total += score.max(0.0);
        self.total
    }

    pub fn reset(&mut self) {
        self.total = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    // A body moving at `speed` whose heading is `angle` radians off its
    // velocity.
    fn sliding_body(speed: f32, angle: f32) -> BodyState {
        BodyState {
            position: Vec3::ZERO,
            orientation: Quat::from_rotation_y(angle),
            linear_velocity: -Vec3::Z * speed,
            angular_velocity: Vec3::ZERO,
        }
    }

    #[test]
    fn test_slow_car_never_drifts() {
        let mut scorer = DriftScorer::new(DriftSettings::default());
        for step in 0..=20 {
            let speed = step as f32 * 0.25;
            for angle in [0.0, 0.5, 1.5, PI] {
                let reading = scorer.update(&sliding_body(speed, angle), true);
                assert!(!reading.drifting, "drifting at speed {}", speed);
                assert_eq!(reading.event, None);
            }
        }
        assert_eq!(scorer.state().angle, 0.0);
    }

    #[test]
    fn test_slip_angle_stays_in_domain() {
        // vectors whose dot product overshoots 1.0 through rounding
        let forward = Vec3::new(1.0000001, 0.0, 0.0);
        let angle = slip_angle(forward, Vec3::new(3.0, 0.0, 0.0));
        assert!(angle >= 0.0 && angle <= PI);

        let angle = slip_angle(-forward, Vec3::new(3.0, 0.0, 0.0));
        assert!(angle >= 0.0 && angle <= PI);
        assert!((angle - PI).abs() < 1e-3);

        for i in 0..64 {
            let theta = i as f32 * 0.1;
            let velocity = Vec3::new(theta.cos(), 0.0, theta.sin()) * 17.0;
            let angle = slip_angle(Vec3::X, velocity);
            assert!(angle >= 0.0 && angle <= PI);
        }
    }

    #[test]
    fn test_single_tick_increment() {
        let mut scorer = DriftScorer::new(DriftSettings::default());
        let reading = scorer.update(&sliding_body(10.0, 0.5), false);

        assert!(reading.drifting);
        assert!((reading.angle - 0.5).abs() < 1e-4);
        assert!((reading.score - 3.5).abs() < 1e-3);
        assert_eq!(reading.event, Some(DriftEvent::Started));
    }

    #[test]
    fn test_handbrake_clause() {
        let mut scorer = DriftScorer::new(DriftSettings::default());

        let reading = scorer.update(&sliding_body(9.0, 0.1), false);
        assert!(!reading.drifting);

        let reading = scorer.update(&sliding_body(9.0, 0.1), true);
        assert!(reading.drifting);
        assert_eq!(reading.event, Some(DriftEvent::Started));
    }

    #[test]
    fn test_handbrake_needs_more_than_eight() {
        let mut scorer = DriftScorer::new(DriftSettings::default());

        let reading = scorer.update(&sliding_body(8.0, 0.1), true);
        assert!(!reading.drifting);
        assert_eq!(reading.event, None);

        // the slip angle alone still counts at that speed
        let reading = scorer.update(&sliding_body(8.0, 0.6), false);
        assert!(reading.drifting);
        assert_eq!(reading.event, Some(DriftEvent::Started));
    }

    #[test]
    fn test_score_grows_while_drifting() {
        let mut scorer = DriftScorer::new(DriftSettings::default());
        let mut last = 0.0;
        for tick in 0..30 {
            let speed = 20.0 - tick as f32 * 0.3;
            let angle = 0.5 + (tick as f32 * 0.7).sin() * 0.05;
            let reading = scorer.update(&sliding_body(speed, angle), false);
            assert!(reading.drifting);
            assert!(reading.score >= last);
            last = reading.score;
        }
    }

    #[test]
    fn test_short_drift_is_discarded() {
        let mut scorer = DriftScorer::new(DriftSettings::default());
        // 3.5 points a tick, 14 ticks is 49 points
        for _ in 0..14 {
            scorer.update(&sliding_body(10.0, 0.5), false);
        }
        let reading = scorer.update(&sliding_body(10.0, 0.0), false);

        match reading.event {
            Some(DriftEvent::Ended { score, credited }) => {
                assert!((score - 49.0).abs() < 1e-2);
                assert!(!credited);
            }
            other => panic!("expected drift end, got {:?}", other),
        }
        assert_eq!(reading.score, 0.0);
        assert_eq!(scorer.state(), DriftState { active: false, score: 0.0, angle: 0.0 });
    }

    #[test]
    fn test_long_drift_is_credited() {
        let mut scorer = DriftScorer::new(DriftSettings::default());
        for _ in 0..20 {
            scorer.update(&sliding_body(10.0, 0.5), false);
        }
        // slowing below the minimum speed ends the drift too
        let reading = scorer.update(&sliding_body(3.0, 0.5), false);

        match reading.event {
            Some(DriftEvent::Ended { score, credited }) => {
                assert!((score - 70.0).abs() < 1e-2);
                assert!(credited);
            }
            other => panic!("expected drift end, got {:?}", other),
        }
        assert!(!scorer.state().active);
        assert_eq!(scorer.state().score, 0.0);
    }

    #[test]
    fn test_session_score_only_grows() {
        let mut session = SessionScore::default();
        assert_eq!(session.credit(70.0), 70.0);
        assert_eq!(session.credit(-5.0), 70.0);
        session.reset();
        assert_eq!(session.total(), 0.0);
    }
}
