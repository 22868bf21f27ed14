use super::Learner;
use super::split;
use crate::Error;
use crate::Label;
use crate::Probability;
use crate::Threshold;
use crate::save::Binary;
use byteorder::BE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use rand::rngs::SmallRng;

/// a node in the tree arena. children are arena ids, so the whole
/// topology serializes as a flat list and predicts without chasing boxes.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split {
        feature: usize,
        threshold: Threshold,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: Probability,
    },
}

/// greedy CART-style binary classifier with subsampled candidate
/// thresholds and optional per-split feature subsampling.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub max_thresholds: usize,
    pub max_features: usize,
    pub seed: u64,
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            max_depth: crate::TREE_MAX_DEPTH,
            min_samples_split: crate::TREE_MIN_SAMPLES_SPLIT,
            max_thresholds: crate::TREE_MAX_THRESHOLDS,
            max_features: 0,
            seed: 0,
            nodes: vec![],
        }
    }
}

impl Tree {
    pub fn seeded(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    pub fn fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// descend from the root for one row; the sentinel covers an
    /// unfit tree or a malformed child id
    pub fn probability_row(&self, x: &[f64]) -> Probability {
        let mut at = 0;
        loop {
            match self.nodes.get(at) {
                None => return crate::UNFIT_PROBABILITY,
                Some(Node::Leaf { probability }) => return *probability,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    at = match x[*feature] <= *threshold {
                        true => *left,
                        false => *right,
                    };
                }
            }
        }
    }

    /// recursive arena construction. the root always lands at id 0,
    /// a split node reserves its slot before its children are grown.
    fn grow(&mut self, x: &[Vec<f64>], y: &[Label], idx: &[usize], depth: usize, rng: &mut SmallRng) -> usize {
        let p = split::positive_rate(y, idx);
        if idx.len() < self.min_samples_split || depth >= self.max_depth {
            return self.leaf(p);
        }
        if p == 0. || p == 1. {
            return self.leaf(p);
        }
        match self.choose(x, y, idx, rng) {
            None => self.leaf(p),
            Some((feature, threshold, l, r)) => {
                let at = self.leaf(p);
                let left = self.grow(x, y, &l, depth + 1, rng);
                let right = self.grow(x, y, &r, depth + 1, rng);
                self.nodes[at] = Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                };
                at
            }
        }
    }

    fn leaf(&mut self, probability: Probability) -> usize {
        self.nodes.push(Node::Leaf { probability });
        self.nodes.len() - 1
    }

    /// minimum weighted gini over (feature subset) x (candidate thresholds).
    /// first strict improvement wins; splits that empty a side are skipped.
    fn choose(
        &self,
        x: &[Vec<f64>],
        y: &[Label],
        idx: &[usize],
        rng: &mut SmallRng,
    ) -> Option<(usize, Threshold, Vec<usize>, Vec<usize>)> {
        let width = x[0].len();
        let mut lowest = f64::MAX;
        let mut best = None;
        for f in split::subset(width, self.max_features, rng) {
            for t in split::thresholds(x, idx, f, self.max_thresholds, rng) {
                let (l, r) = split::partition(x, idx, f, t);
                if l.is_empty() || r.is_empty() {
                    continue;
                }
                let impurity = split::gini(y, &l, &r);
                if impurity < lowest {
                    lowest = impurity;
                    best = Some((f, t, l, r));
                }
            }
        }
        best
    }
}

impl Learner for Tree {
    fn name(&self) -> &'static str {
        "DecisionTree"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), Error> {
        super::validate(x, y)?;
        if self.min_samples_split < 1 {
            return Err(Error::InvalidHyperparameter(
                "min_samples_split must be at least 1".into(),
            ));
        }
        let ref mut rng = super::rng(self.seed);
        let idx = (0..x.len()).collect::<Vec<_>>();
        self.nodes.clear();
        self.grow(x, y, &idx, 0, rng);
        Ok(())
    }

    fn probability(&self, x: &[Vec<f64>]) -> Vec<Probability> {
        x.iter().map(|row| self.probability_row(row)).collect()
    }
}

impl Binary for Tree {
    const TAG: u8 = 1;

    fn encode<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<BE>(self.max_depth as u32)?;
        w.write_u32::<BE>(self.min_samples_split as u32)?;
        w.write_u32::<BE>(self.max_thresholds as u32)?;
        w.write_u32::<BE>(self.max_features as u32)?;
        w.write_u64::<BE>(self.seed)?;
        w.write_u32::<BE>(self.nodes.len() as u32)?;
        for node in &self.nodes {
            match node {
                Node::Leaf { probability } => {
                    w.write_u8(0)?;
                    w.write_f64::<BE>(*probability)?;
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    w.write_u8(1)?;
                    w.write_u32::<BE>(*feature as u32)?;
                    w.write_f64::<BE>(*threshold)?;
                    w.write_u32::<BE>(*left as u32)?;
                    w.write_u32::<BE>(*right as u32)?;
                }
            }
        }
        Ok(())
    }

    fn decode<R: std::io::Read>(r: &mut R) -> std::io::Result<Self> {
        let max_depth = r.read_u32::<BE>()? as usize;
        let min_samples_split = r.read_u32::<BE>()? as usize;
        let max_thresholds = r.read_u32::<BE>()? as usize;
        let max_features = r.read_u32::<BE>()? as usize;
        let seed = r.read_u64::<BE>()?;
        let count = r.read_u32::<BE>()? as usize;
        let mut nodes = Vec::with_capacity(count);
        for _ in 0..count {
            nodes.push(match r.read_u8()? {
                0 => Node::Leaf {
                    probability: r.read_f64::<BE>()?,
                },
                1 => Node::Split {
                    feature: r.read_u32::<BE>()? as usize,
                    threshold: r.read_f64::<BE>()?,
                    left: r.read_u32::<BE>()? as usize,
                    right: r.read_u32::<BE>()? as usize,
                },
                kind => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("unknown node kind {}", kind),
                    ));
                }
            });
        }
        Ok(Self {
            max_depth,
            min_samples_split,
            max_thresholds,
            max_features,
            seed,
            nodes,
        })
    }
}
