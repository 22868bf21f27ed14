use super::Learner;
use super::split;
use crate::Error;
use crate::Label;
use crate::LogOdds;
use crate::Probability;
use crate::Threshold;
use crate::save::Binary;
use byteorder::BE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

/// the logistic link
pub fn sigmoid(z: f64) -> Probability {
    1. / (1. + (-z).exp())
}

/// a depth-1 regression tree: one split, two additive
/// contributions to the log-odds.
#[derive(Debug, Clone, PartialEq)]
pub struct Stump {
    pub feature: usize,
    pub threshold: Threshold,
    pub left: LogOdds,
    pub right: LogOdds,
}

impl Stump {
    fn value(&self, x: &[f64]) -> LogOdds {
        match x[self.feature] <= self.threshold {
            true => self.left,
            false => self.right,
        }
    }
}

/// gradient-boosted stumps on logistic pseudo-residuals.
///
/// training folds the prior log-odds into the running scores; whether
/// inference re-applies that prior is the `include_prior` field, kept
/// off by default so saved artifacts keep scoring the way they always
/// have. both paths serialize and are pinned by tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Boosting {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub min_samples: usize,
    pub max_thresholds: usize,
    pub include_prior: bool,
    pub(crate) prior: LogOdds,
    pub(crate) stumps: Vec<Stump>,
}

impl Default for Boosting {
    fn default() -> Self {
        Self {
            n_estimators: crate::BOOST_ESTIMATORS,
            learning_rate: crate::BOOST_LEARNING_RATE,
            min_samples: crate::BOOST_MIN_SAMPLES,
            max_thresholds: crate::BOOST_MAX_THRESHOLDS,
            include_prior: false,
            prior: 0.,
            stumps: vec![],
        }
    }
}

impl Boosting {
    pub fn fitted(&self) -> bool {
        !self.stumps.is_empty()
    }

    /// accumulated log-odds score for one row
    fn score(&self, x: &[f64]) -> LogOdds {
        let base = match self.include_prior {
            true => self.prior,
            false => 0.,
        };
        self.stumps
            .iter()
            .map(|s| self.learning_rate * s.value(x))
            .fold(base, |f, v| f + v)
    }

    /// best stump on the residuals by summed squared deviation from the
    /// per-side means; sides thinner than min_samples are inadmissible.
    fn choose(&self, x: &[Vec<f64>], residuals: &[f64]) -> Option<Stump> {
        let n = x.len();
        let width = x[0].len();
        let mut lowest = f64::MAX;
        let mut best = None;
        for f in 0..width {
            for t in split::rank_thresholds(x, f, self.max_thresholds) {
                let mut left = (0., 0usize);
                let mut right = (0., 0usize);
                for i in 0..n {
                    match x[i][f] <= t {
                        true => left = (left.0 + residuals[i], left.1 + 1),
                        false => right = (right.0 + residuals[i], right.1 + 1),
                    }
                }
                if left.1 < self.min_samples || right.1 < self.min_samples {
                    continue;
                }
                let lmean = left.0 / left.1 as f64;
                let rmean = right.0 / right.1 as f64;
                let sse = (0..n)
                    .map(|i| match x[i][f] <= t {
                        true => residuals[i] - lmean,
                        false => residuals[i] - rmean,
                    })
                    .map(|d| d * d)
                    .sum::<f64>();
                if sse < lowest {
                    lowest = sse;
                    best = Some(Stump {
                        feature: f,
                        threshold: t,
                        left: lmean,
                        right: rmean,
                    });
                }
            }
        }
        best
    }
}

impl Learner for Boosting {
    fn name(&self) -> &'static str {
        "GradientBoosting"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[Label]) -> Result<(), Error> {
        super::validate(x, y)?;
        if self.n_estimators == 0 {
            return Err(Error::InvalidHyperparameter(
                "n_estimators must be positive".into(),
            ));
        }
        if self.learning_rate <= 0. {
            return Err(Error::InvalidHyperparameter(
                "learning_rate must be positive".into(),
            ));
        }
        if self.min_samples < 1 {
            return Err(Error::InvalidHyperparameter(
                "min_samples must be at least 1".into(),
            ));
        }
        let n = x.len();
        let positives = y.iter().filter(|&&l| l == 1).count();
        let base = (positives as f64 / n as f64)
            .clamp(crate::BOOST_PRIOR_CLIP, 1. - crate::BOOST_PRIOR_CLIP);
        self.prior = (base / (1. - base)).ln();
        self.stumps.clear();
        let mut scores = vec![self.prior; n];
        for _ in 0..self.n_estimators {
            let residuals = (0..n)
                .map(|i| y[i] as f64 - sigmoid(scores[i]))
                .collect::<Vec<_>>();
            let Some(stump) = self.choose(x, &residuals) else {
                break;
            };
            for i in 0..n {
                scores[i] += self.learning_rate * stump.value(&x[i]);
            }
            self.stumps.push(stump);
        }
        Ok(())
    }

    fn probability(&self, x: &[Vec<f64>]) -> Vec<Probability> {
        match self.stumps.len() {
            0 => vec![crate::UNFIT_PROBABILITY; x.len()],
            _ => x.iter().map(|row| sigmoid(self.score(row))).collect(),
        }
    }
}

impl Binary for Boosting {
    const TAG: u8 = 4;

    fn encode<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<BE>(self.n_estimators as u32)?;
        w.write_f64::<BE>(self.learning_rate)?;
        w.write_u32::<BE>(self.min_samples as u32)?;
        w.write_u32::<BE>(self.max_thresholds as u32)?;
        w.write_u8(self.include_prior as u8)?;
        w.write_f64::<BE>(self.prior)?;
        w.write_u32::<BE>(self.stumps.len() as u32)?;
        for stump in &self.stumps {
            w.write_u32::<BE>(stump.feature as u32)?;
            w.write_f64::<BE>(stump.threshold)?;
            w.write_f64::<BE>(stump.left)?;
            w.write_f64::<BE>(stump.right)?;
        }
        Ok(())
    }

    fn decode<R: std::io::Read>(r: &mut R) -> std::io::Result<Self> {
        let n_estimators = r.read_u32::<BE>()? as usize;
        let learning_rate = r.read_f64::<BE>()?;
        let min_samples = r.read_u32::<BE>()? as usize;
        let max_thresholds = r.read_u32::<BE>()? as usize;
        let include_prior = r.read_u8()? != 0;
        let prior = r.read_f64::<BE>()?;
        let count = r.read_u32::<BE>()? as usize;
        let mut stumps = Vec::with_capacity(count);
        for _ in 0..count {
            stumps.push(Stump {
                feature: r.read_u32::<BE>()? as usize,
                threshold: r.read_f64::<BE>()?,
                left: r.read_f64::<BE>()?,
                right: r.read_f64::<BE>()?,
            });
        }
        Ok(Self {
            n_estimators,
            learning_rate,
            min_samples,
            max_thresholds,
            include_prior,
            prior,
            stumps,
        })
    }
}
