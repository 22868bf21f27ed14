use super::rules;
use crate::Probability;
use crate::model::Learner;
use crate::model::Model;

/// what the service scores with: a trained artifact when one loads,
/// the hand-rule fallback otherwise. the service never trains.
pub enum Scorer {
    Learned(Model),
    Heuristic,
}

impl Scorer {
    /// resolve from the MODEL_ALGO environment selector and the
    /// conventional artifact path; anything missing means rules
    pub fn boot() -> Self {
        let algorithm = std::env::var("MODEL_ALGO").unwrap_or_else(|_| "dt".into());
        let path = Model::path(&algorithm.to_lowercase());
        match Model::load(&path) {
            Ok(model) if model.fitted() => {
                log::info!("scoring with {} from {}", model.name(), path);
                Self::Learned(model)
            }
            Ok(_) => {
                log::warn!("artifact at {} is unfit, scoring by rules", path);
                Self::Heuristic
            }
            Err(e) => {
                log::warn!("no artifact at {} ({}), scoring by rules", path, e);
                Self::Heuristic
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Learned(model) => model.name(),
            Self::Heuristic => "RuleModel",
        }
    }

    pub fn probability(&self, x: &[Vec<f64>]) -> Vec<Probability> {
        match self {
            Self::Learned(model) => model.probability(x),
            Self::Heuristic => x.iter().map(|row| rules::heuristic(row)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arbitrary;
    use crate::data::Expense;

    #[test]
    fn the_fallback_scores_every_row_in_order() {
        let scorer = Scorer::Heuristic;
        let x = (0..10)
            .map(|_| crate::features::vectorize(&Expense::random()))
            .collect::<Vec<_>>();
        let p = scorer.probability(&x);
        assert!(p.len() == 10);
        assert!(p.iter().all(|p| (0. ..=0.95).contains(p)));
        assert!(scorer.name() == "RuleModel");
    }

    #[test]
    fn a_fitted_artifact_outranks_the_rules() {
        let x = (0..200).map(|i| vec![i as f64]).collect::<Vec<_>>();
        let y = x.iter().map(|row| (row[0] > 100.) as crate::Label).collect::<Vec<_>>();
        let mut tree = crate::model::Tree::seeded(1);
        tree.min_samples_split = 10;
        tree.fit(&x, &y).unwrap();
        let scorer = Scorer::Learned(Model::Tree(tree));
        assert!(scorer.name() == "DecisionTree");
        assert!(scorer.probability(&[vec![150.]])[0] >= 0.5);
        assert!(scorer.probability(&[vec![50.]])[0] < 0.5);
    }
}
