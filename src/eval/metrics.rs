use crate::Label;
use crate::Probability;
use crate::Threshold;

/// confusion counts at a decision threshold. predictions are s >= t.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl Confusion {
    pub fn at(y: &[Label], scores: &[Probability], threshold: Threshold) -> Self {
        let mut counts = Self::default();
        for (&label, &score) in y.iter().zip(scores.iter()) {
            match (score >= threshold, label == 1) {
                (true, true) => counts.tp += 1,
                (true, false) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (false, true) => counts.fn_ += 1,
            }
        }
        counts
    }

    pub fn precision(&self) -> f64 {
        match self.tp + self.fp {
            0 => 0.,
            d => self.tp as f64 / d as f64,
        }
    }

    pub fn recall(&self) -> f64 {
        match self.tp + self.fn_ {
            0 => 0.,
            d => self.tp as f64 / d as f64,
        }
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        match p + r {
            d if d > 0. => 2. * p * r / d,
            _ => 0.,
        }
    }

    pub fn accuracy(&self) -> f64 {
        match self.tp + self.fp + self.tn + self.fn_ {
            0 => 0.,
            n => (self.tp + self.tn) as f64 / n as f64,
        }
    }
}

/// hard labels from scores at a threshold
pub fn classify(scores: &[Probability], threshold: Threshold) -> Vec<Label> {
    scores.iter().map(|&s| (s >= threshold) as Label).collect()
}

/// fraction of agreeing labels; zero on empty input
pub fn accuracy(y: &[Label], predictions: &[Label]) -> f64 {
    match y.len() {
        0 => 0.,
        n => {
            let hits = y
                .iter()
                .zip(predictions.iter())
                .filter(|(a, b)| a == b)
                .count();
            hits as f64 / n as f64
        }
    }
}

/// area under the ROC curve by trapezoids over strictly-changing scores,
/// pairs sorted descending. one-class input returns the 0 sentinel.
pub fn roc_auc(y: &[Label], scores: &[Probability]) -> f64 {
    let mut pairs = scores.iter().copied().zip(y.iter().copied()).collect::<Vec<_>>();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));
    let pos = y.iter().filter(|&&l| l == 1).count();
    let neg = y.len() - pos;
    if pos == 0 || neg == 0 {
        return 0.;
    }
    let mut auc = 0.;
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut last = f64::INFINITY;
    let mut prev = (0., 0.); // (fpr, tpr)
    for (score, label) in pairs {
        if score != last {
            let point = (fp as f64 / neg as f64, tp as f64 / pos as f64);
            auc += (point.0 - prev.0) * (point.1 + prev.1) / 2.;
            prev = point;
            last = score;
        }
        match label {
            1 => tp += 1,
            _ => fp += 1,
        }
    }
    let point = (fp as f64 / neg as f64, tp as f64 / pos as f64);
    auc + (point.0 - prev.0) * (point.1 + prev.1) / 2.
}

/// area under the precision-recall curve, the running-recall step
/// estimator (no interpolation), pairs sorted descending.
pub fn pr_auc(y: &[Label], scores: &[Probability]) -> f64 {
    let mut pairs = scores.iter().copied().zip(y.iter().copied()).collect::<Vec<_>>();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = y.iter().filter(|&&l| l == 1).count();
    let mut auc = 0.;
    let mut recall = 0.;
    for (_, label) in pairs {
        match label {
            1 => {
                tp += 1;
                fn_ -= 1;
            }
            _ => fp += 1,
        }
        let precision = match tp + fp {
            0 => 0.,
            d => tp as f64 / d as f64,
        };
        let swept = match tp + fn_ {
            0 => 0.,
            d => tp as f64 / d as f64,
        };
        auc += (swept - recall) * precision;
        recall = swept;
    }
    auc
}
