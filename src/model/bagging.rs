use super::Learner;
use super::tree::Tree;
use crate::Error;
use crate::Label;
use crate::Probability;
use crate::save::Binary;
use byteorder::BE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

/// bootstrap aggregation: independent trees over with-replacement
/// resamples, every feature available at every split.
#[derive(Debug, Clone, PartialEq)]
pub struct Bagging {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples: usize,
    pub max_thresholds: usize,
    pub seed: u64,
    pub(crate) trees: Vec<Tree>,
}

impl Default for Bagging {
    fn default() -> Self {
        Self {
            n_estimators: crate::ENSEMBLE_ESTIMATORS,
            max_depth: crate::TREE_MAX_DEPTH,
            min_samples: crate::TREE_MIN_SAMPLES_SPLIT,
            max_thresholds: crate::ENSEMBLE_MAX_THRESHOLDS,
            seed: 0,
            trees: vec![],
        }
    }
}

impl Bagging {
    pub fn seeded(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    pub fn fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl Learner for Bagging {
    fn name(&self) -> &'static str {
        "Bagging"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), Error> {
        super::validate(x, y)?;
        if self.n_estimators == 0 {
            return Err(Error::InvalidHyperparameter(
                "n_estimators must be positive".into(),
            ));
        }
        self.trees = super::plant(
            x,
            y,
            self.n_estimators,
            self.seed,
            self.max_depth,
            self.min_samples,
            self.max_thresholds,
            0,
        )?;
        Ok(())
    }

    fn probability(&self, x: &[Vec<f64>]) -> Vec<Probability> {
        super::vote(&self.trees, x)
    }
}

impl Binary for Bagging {
    const TAG: u8 = 2;

    fn encode<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<BE>(self.n_estimators as u32)?;
        w.write_u32::<BE>(self.max_depth as u32)?;
        w.write_u32::<BE>(self.min_samples as u32)?;
        w.write_u32::<BE>(self.max_thresholds as u32)?;
        w.write_u64::<BE>(self.seed)?;
        w.write_u32::<BE>(self.trees.len() as u32)?;
        for tree in &self.trees {
            tree.encode(w)?;
        }
        Ok(())
    }

    fn decode<R: std::io::Read>(r: &mut R) -> std::io::Result<Self> {
        let n_estimators = r.read_u32::<BE>()? as usize;
        let max_depth = r.read_u32::<BE>()? as usize;
        let min_samples = r.read_u32::<BE>()? as usize;
        let max_thresholds = r.read_u32::<BE>()? as usize;
        let seed = r.read_u64::<BE>()?;
        let count = r.read_u32::<BE>()? as usize;
        let mut trees = Vec::with_capacity(count);
        for _ in 0..count {
            trees.push(Tree::decode(r)?);
        }
        Ok(Self {
            n_estimators,
            max_depth,
            min_samples,
            max_thresholds,
            seed,
            trees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// one feature, four copies of each 0.02-spaced value, positive above 0.5
    fn steps() -> (Vec<Vec<f64>>, Vec<Label>) {
        let x = (0..100)
            .map(|i| vec![(i / 4) as f64 / 25.])
            .collect::<Vec<_>>();
        let y = x.iter().map(|row| (row[0] > 0.5) as Label).collect();
        (x, y)
    }

    fn fitted() -> (Bagging, Vec<Vec<f64>>, Vec<Label>) {
        let (x, y) = steps();
        let mut bag = Bagging {
            n_estimators: 10,
            min_samples: 2,
            seed: 17,
            ..Bagging::default()
        };
        bag.fit(&x, &y).unwrap();
        (bag, x, y)
    }

    #[test]
    fn separable_training_set_is_memorized() {
        let (bag, x, y) = fitted();
        assert!(bag.label(&x) == y);
    }

    #[test]
    fn the_boundary_falls_between_the_classes() {
        let (bag, _, _) = fitted();
        assert!(bag.probability(&[vec![0.5]])[0] <= 0.5);
        assert!(bag.probability(&[vec![0.51]])[0] >= 0.5);
    }

    #[test]
    fn unfit_ensemble_answers_the_sentinel() {
        let bag = Bagging::default();
        let p = bag.probability(&[vec![1.], vec![2.]]);
        assert!(p == vec![crate::UNFIT_PROBABILITY; 2]);
    }

    #[test]
    fn estimator_order_does_not_change_the_vote() {
        let (mut bag, x, _) = fitted();
        let before = bag.probability(&x);
        bag.trees.reverse();
        let after = bag.probability(&x);
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn fixed_seed_reproduces_the_ensemble() {
        let (x, y) = steps();
        let mut a = Bagging {
            n_estimators: 5,
            min_samples: 2,
            seed: 3,
            ..Bagging::default()
        };
        let mut b = a.clone();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert!(a == b);
    }

    #[test]
    fn zero_estimators_is_rejected() {
        let (x, y) = steps();
        let mut bag = Bagging {
            n_estimators: 0,
            ..Bagging::default()
        };
        assert!(matches!(
            bag.fit(&x, &y),
            Err(Error::InvalidHyperparameter(_))
        ));
        assert!(!bag.fitted());
    }

    #[test]
    fn codec_round_trip_is_bitwise() {
        let (bag, x, _) = fitted();
        let mut bytes = vec![];
        bag.encode(&mut bytes).unwrap();
        let back = Bagging::decode(&mut bytes.as_slice()).unwrap();
        assert!(back == bag);
        assert!(back.probability(&x) == bag.probability(&x));
    }
}
