pub mod bagging;
pub mod boosting;
pub mod external;
pub mod forest;
pub mod split;
pub mod tree;

pub use bagging::Bagging;
pub use boosting::Boosting;
pub use external::External;
pub use forest::Forest;
pub use tree::Tree;

use crate::Error;
use crate::Label;
use crate::Probability;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;

/// the one contract every learner speaks: fit once, then answer
/// probabilities per row, in input order, deterministically.
pub trait Learner {
    /// stable display name of the algorithm
    fn name(&self) -> &'static str;
    /// train on a dense feature matrix and binary labels
    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), Error>;
    /// positive-class probability per row
    fn probability(&self, x: &[Vec<f64>]) -> Vec<Probability>;
    /// hard labels at the 0.5 decision point
    fn label(&self, x: &[Vec<f64>]) -> Vec<Label> {
        self.probability(x)
            .into_iter()
            .map(|p| (p >= 0.5) as Label)
            .collect()
    }
}

/// closed set of learner kinds, dispatched by match. this is what the
/// harness, the CLI and the service hold; no trait objects required.
#[derive(Debug, Clone)]
pub enum Model {
    Tree(Tree),
    Bagging(Bagging),
    Forest(Forest),
    Boosting(Boosting),
    External(External),
}

impl Learner for Model {
    fn name(&self) -> &'static str {
        match self {
            Model::Tree(m) => m.name(),
            Model::Bagging(m) => m.name(),
            Model::Forest(m) => m.name(),
            Model::Boosting(m) => m.name(),
            Model::External(m) => m.name(),
        }
    }
    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), Error> {
        match self {
            Model::Tree(m) => m.fit(x, y),
            Model::Bagging(m) => m.fit(x, y),
            Model::Forest(m) => m.fit(x, y),
            Model::Boosting(m) => m.fit(x, y),
            Model::External(m) => m.fit(x, y),
        }
    }
    fn probability(&self, x: &[Vec<f64>]) -> Vec<Probability> {
        match self {
            Model::Tree(m) => m.probability(x),
            Model::Bagging(m) => m.probability(x),
            Model::Forest(m) => m.probability(x),
            Model::Boosting(m) => m.probability(x),
            Model::External(m) => m.probability(x),
        }
    }
}

impl Model {
    /// whether fit has produced a usable model
    pub fn fitted(&self) -> bool {
        match self {
            Model::Tree(m) => m.fitted(),
            Model::Bagging(m) => m.fitted(),
            Model::Forest(m) => m.fitted(),
            Model::Boosting(m) => m.fitted(),
            Model::External(m) => m.fitted(),
        }
    }
}

/// fit-entry validation shared by every learner.
/// a failed fit leaves no partial model behind.
pub(crate) fn validate(x: &[Vec<f64>], y: &[Label]) -> Result<(), Error> {
    if x.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if x.len() != y.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} rows against {} labels",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    if let Some(row) = x.iter().position(|r| r.len() != width) {
        return Err(Error::ShapeMismatch(format!(
            "row {} is {} wide, expected {}",
            row,
            x[row].len(),
            width
        )));
    }
    Ok(())
}

pub(crate) fn rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// deterministic child seed for the index-th draw under a parent seed
pub(crate) fn child(seed: u64, index: usize) -> u64 {
    use std::hash::Hash;
    use std::hash::Hasher;
    let ref mut hasher = std::collections::hash_map::DefaultHasher::new();
    seed.hash(hasher);
    index.hash(hasher);
    hasher.finish()
}

/// bootstrap-aggregated tree fitting shared by bagging and the forest.
/// per-tree fits run on the rayon pool; each estimator draws from its own
/// seed lineage and the finished trees land in index order.
#[allow(clippy::too_many_arguments)]
pub(crate) fn plant(
    x: &[Vec<f64>],
    y: &[Label],
    estimators: usize,
    seed: u64,
    max_depth: usize,
    min_samples: usize,
    max_thresholds: usize,
    max_features: usize,
) -> Result<Vec<Tree>, Error> {
    let rows = x.len();
    (0..estimators)
        .into_par_iter()
        .map(|k| {
            let base = child(seed, k);
            let ref mut draw = rng(child(base, 0));
            let sample = (0..rows)
                .map(|_| draw.random_range(0..rows))
                .collect::<Vec<_>>();
            let xb = sample.iter().map(|&i| x[i].clone()).collect::<Vec<_>>();
            let yb = sample.iter().map(|&i| y[i]).collect::<Vec<_>>();
            let mut tree = Tree::seeded(child(base, 1));
            tree.max_depth = max_depth;
            tree.min_samples_split = min_samples;
            tree.max_thresholds = max_thresholds;
            tree.max_features = max_features;
            tree.fit(&xb, &yb)?;
            Ok(tree)
        })
        .collect()
}

/// mean of per-tree leaf probabilities; the sentinel before any fit
pub(crate) fn vote(trees: &[Tree], x: &[Vec<f64>]) -> Vec<Probability> {
    match trees.len() {
        0 => vec![crate::UNFIT_PROBABILITY; x.len()],
        n => x
            .iter()
            .map(|row| trees.iter().map(|t| t.probability_row(row)).sum::<f64>() / n as f64)
            .collect(),
    }
}
