use super::Learner;
use super::tree::Tree;
use crate::Error;
use crate::Label;
use crate::Probability;
use crate::save::Binary;
use byteorder::BE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

/// bagging plus per-split feature subsampling. when no width is chosen
/// the forest falls back to the square root of the feature count.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples: usize,
    pub max_thresholds: usize,
    pub max_features: usize,
    pub seed: u64,
    pub(crate) trees: Vec<Tree>,
}

impl Default for Forest {
    fn default() -> Self {
        Self {
            n_estimators: crate::ENSEMBLE_ESTIMATORS,
            max_depth: crate::TREE_MAX_DEPTH,
            min_samples: crate::TREE_MIN_SAMPLES_SPLIT,
            max_thresholds: crate::ENSEMBLE_MAX_THRESHOLDS,
            max_features: 0,
            seed: 0,
            trees: vec![],
        }
    }
}

impl Forest {
    pub fn seeded(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    pub fn fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl Learner for Forest {
    fn name(&self) -> &'static str {
        "RandomForest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), Error> {
        super::validate(x, y)?;
        if self.n_estimators == 0 {
            return Err(Error::InvalidHyperparameter(
                "n_estimators must be positive".into(),
            ));
        }
        let width = x[0].len();
        if self.max_features == 0 {
            self.max_features = (width as f64).sqrt().min(width as f64).max(1.) as usize;
        }
        self.trees = super::plant(
            x,
            y,
            self.n_estimators,
            self.seed,
            self.max_depth,
            self.min_samples,
            self.max_thresholds,
            self.max_features,
        )?;
        Ok(())
    }

    fn probability(&self, x: &[Vec<f64>]) -> Vec<Probability> {
        super::vote(&self.trees, x)
    }
}

impl Binary for Forest {
    const TAG: u8 = 3;

    fn encode<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<BE>(self.n_estimators as u32)?;
        w.write_u32::<BE>(self.max_depth as u32)?;
        w.write_u32::<BE>(self.min_samples as u32)?;
        w.write_u32::<BE>(self.max_thresholds as u32)?;
        w.write_u32::<BE>(self.max_features as u32)?;
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
        let max_features = r.read_u32::<BE>()? as usize;
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
            max_features,
            seed,
            trees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    /// nine features, only the first one matters
    fn wide(n: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<Label>) {
        let ref mut rng = SmallRng::seed_from_u64(seed);
        let x = (0..n)
            .map(|_| (0..9).map(|_| rng.random::<f64>()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let y = x.iter().map(|row| (row[0] > 0.5) as Label).collect();
        (x, y)
    }

    #[test]
    fn unset_width_derives_the_square_root() {
        let (x, y) = wide(200, 1);
        let mut forest = Forest {
            n_estimators: 5,
            min_samples: 10,
            ..Forest::default()
        };
        forest.fit(&x, &y).unwrap();
        assert!(forest.max_features == 3);
    }

    #[test]
    fn chosen_width_is_kept() {
        let (x, y) = wide(200, 2);
        let mut forest = Forest {
            n_estimators: 5,
            min_samples: 10,
            max_features: 7,
            ..Forest::default()
        };
        forest.fit(&x, &y).unwrap();
        assert!(forest.max_features == 7);
    }

    #[test]
    fn forest_learns_the_decisive_feature() {
        let (x, y) = wide(600, 3);
        let mut forest = Forest {
            n_estimators: 20,
            min_samples: 10,
            seed: 8,
            ..Forest::default()
        };
        forest.fit(&x, &y).unwrap();
        let hits = forest
            .label(&x)
            .iter()
            .zip(y.iter())
            .filter(|(a, b)| a == b)
            .count();
        assert!(hits as f64 / y.len() as f64 > 0.9);
    }

    #[test]
    fn unfit_forest_answers_the_sentinel() {
        let forest = Forest::default();
        assert!(forest.probability(&[vec![0.; 9]]) == vec![crate::UNFIT_PROBABILITY]);
    }

    #[test]
    fn fixed_seed_reproduces_the_forest() {
        let (x, y) = wide(200, 5);
        let mut a = Forest {
            n_estimators: 4,
            min_samples: 10,
            seed: 21,
            ..Forest::default()
        };
        let mut b = a.clone();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert!(a == b);
    }

    #[test]
    fn codec_round_trip_is_bitwise() {
        let (x, y) = wide(200, 6);
        let mut forest = Forest {
            n_estimators: 4,
            min_samples: 10,
            seed: 2,
            ..Forest::default()
        };
        forest.fit(&x, &y).unwrap();
        let mut bytes = vec![];
        forest.encode(&mut bytes).unwrap();
        let back = Forest::decode(&mut bytes.as_slice()).unwrap();
        assert!(back == forest);
        assert!(back.probability(&x) == forest.probability(&x));
    }
}
