use super::metrics::Confusion;
use crate::Label;
use crate::Probability;
use crate::Threshold;

/// what a threshold sweep maximizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    F1,
    Accuracy,
}

/// exhaustive sweep over a uniform threshold grid. ties go to the
/// earliest grid point; the winner is clipped into [floor, ceiling].
#[derive(Debug, Clone, Copy)]
pub struct Sweep {
    pub objective: Objective,
    pub floor: Threshold,
    pub ceiling: Threshold,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            objective: Objective::F1,
            floor: 0.,
            ceiling: 1.,
        }
    }
}

impl Sweep {
    pub fn best(&self, y: &[Label], scores: &[Probability]) -> Threshold {
        self.clip(match scores.is_empty() {
            true => crate::UNFIT_PROBABILITY,
            false => self.grid(y, scores),
        })
    }

    fn grid(&self, y: &[Label], scores: &[Probability]) -> Threshold {
        let steps = crate::SWEEP_GRID_STEPS;
        let mut winner = 0.5;
        let mut best = -1.;
        for k in 0..=steps {
            let t = k as f64 / steps as f64;
            let counts = Confusion::at(y, scores, t);
            let objective = match self.objective {
                Objective::F1 => counts.f1(),
                Objective::Accuracy => counts.accuracy(),
            };
            if objective > best {
                best = objective;
                winner = t;
            }
        }
        winner
    }

    fn clip(&self, t: Threshold) -> Threshold {
        t.clamp(self.floor, self.ceiling)
    }
}
