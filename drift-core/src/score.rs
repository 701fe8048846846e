// Observer for the two numbers the HUD shows. The game calls these whenever
// a value changes; sinks must not assume any particular call frequency.
pub trait ScoreSink {
    fn on_score_changed(&mut self, total: f32);
    fn on_drift_score_changed(&mut self, current: f32);
}

// For headless runs: remembers the latest values and nothing else.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct LatestScores {
    pub total: f32,
    pub current: f32,
}

impl ScoreSink for LatestScores {
    fn on_score_changed(&mut self, total: f32) {
        self.total = total;
    }

    fn on_drift_score_changed(&mut self, current: f32) {
        self.current = current;
    }
}

// HUD text: the drift counter only shows up once a drift is worth noticing.
pub fn hud_text(total: f32, current: f32) -> String {
    if current > 10.0 {
        format!("Total {} | +{} Drifting!", total.floor(), current.floor())
    } else {
        format!("Total {}", total.floor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_text() {
        assert_eq!(hud_text(0.0, 0.0), "Total 0");
        assert_eq!(hud_text(120.7, 9.9), "Total 120");
        assert_eq!(hud_text(120.7, 33.2), "Total 120 | +33 Drifting!");
    }

    #[test]
    fn test_latest_scores() {
        let mut scores = LatestScores::default();
        scores.on_drift_score_changed(12.5);
        scores.on_score_changed(80.0);
        scores.on_drift_score_changed(0.0);
        assert_eq!(scores, LatestScores { total: 80.0, current: 0.0 });
    }
}
