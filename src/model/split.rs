use crate::Impurity;
use crate::Threshold;
use rand::Rng;
use rand::seq::SliceRandom;

/// positive rate of the labels reached by an index set
pub fn positive_rate(y: &[crate::Label], idx: &[usize]) -> f64 {
    idx.iter().map(|&i| y[i] as f64).sum::<f64>() / idx.len() as f64
}

/// weighted gini impurity of a candidate split.
/// an empty side contributes nothing; callers reject those splits outright.
pub fn gini(y: &[crate::Label], left: &[usize], right: &[usize]) -> Impurity {
    let half = |idx: &[usize]| -> Impurity {
        match idx.len() {
            0 => 0.,
            _ => {
                let p = positive_rate(y, idx);
                p * (1. - p)
            }
        }
    };
    let l = left.len() as f64;
    let r = right.len() as f64;
    let n = l + r;
    (l / n) * half(left) + (r / n) * half(right)
}

/// partition an index set by the split rule x[f] <= t
pub fn partition(
    x: &[Vec<f64>],
    idx: &[usize],
    feature: usize,
    threshold: Threshold,
) -> (Vec<usize>, Vec<usize>) {
    idx.iter()
        .copied()
        .partition(|&i| x[i][feature] <= threshold)
}

/// subsampled candidate thresholds for one feature over the active rows.
/// permute the observed values and keep a prefix. not quantile-based:
/// O(|idx|) per feature per node, and the randomization helps ensembles.
pub fn thresholds<R: Rng>(
    x: &[Vec<f64>],
    idx: &[usize],
    feature: usize,
    cap: usize,
    rng: &mut R,
) -> Vec<Threshold> {
    let mut values = idx.iter().map(|&i| x[i][feature]).collect::<Vec<_>>();
    values.shuffle(rng);
    values.truncate(cap.min(idx.len()));
    values
}

/// rank-spaced candidate thresholds over a full column, for stump fitting.
/// sorts once, emits values at evenly spaced rank positions, deduplicates
/// against the previous cut, and falls back to the column mean.
pub fn rank_thresholds(x: &[Vec<f64>], feature: usize, cuts: usize) -> Vec<Threshold> {
    let cuts = if cuts == 0 { 16 } else { cuts };
    let n = x.len();
    let mut values = x.iter().map(|row| row[feature]).collect::<Vec<_>>();
    values.sort_by(|a, b| a.total_cmp(b));
    let mut out = Vec::with_capacity(cuts);
    for k in 1..cuts {
        let rank = ((k as f64 / cuts as f64) * (n - 1) as f64).round() as usize;
        if rank == 0 || rank >= n {
            continue;
        }
        let t = values[rank];
        if out.last() != Some(&t) {
            out.push(t);
        }
    }
    if out.is_empty() {
        out.push(values.iter().sum::<f64>() / n as f64);
    }
    out
}

/// feature subset drawn without replacement: full Fisher-Yates shuffle,
/// then a prefix. zero (or an over-wide ask) means every feature.
pub fn subset<R: Rng>(count: usize, take: usize, rng: &mut R) -> Vec<usize> {
    let mut features = (0..count).collect::<Vec<_>>();
    if take == 0 || take >= count {
        return features;
    }
    features.shuffle(rng);
    features.truncate(take);
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rows(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    #[test]
    fn gini_of_pure_sides_is_zero() {
        let y = vec![0, 0, 1, 1];
        assert!(gini(&y, &[0, 1], &[2, 3]) == 0.);
    }

    #[test]
    fn gini_of_mixed_sides_is_weighted() {
        let y = vec![0, 1, 0, 1];
        // both sides half positive: impurity 0.25 each side
        assert!((gini(&y, &[0, 1], &[2, 3]) - 0.25).abs() < 1e-12);
        // one pure side lowers the weighted sum
        assert!(gini(&y, &[0, 2], &[1, 3]) == 0.);
    }

    #[test]
    fn partition_respects_the_split_rule() {
        let x = rows(&[1., 2., 3., 4.]);
        let (l, r) = partition(&x, &[0, 1, 2, 3], 0, 2.);
        assert!(l == vec![0, 1]);
        assert!(r == vec![2, 3]);
    }

    #[test]
    fn thresholds_are_capped_observed_values() {
        let x = rows(&[5., 1., 3., 2., 4.]);
        let ref mut rng = SmallRng::seed_from_u64(0);
        let cand = thresholds(&x, &[0, 1, 2, 3, 4], 0, 3, rng);
        assert!(cand.len() == 3);
        assert!(cand.iter().all(|t| (1. ..=5.).contains(t)));
    }

    #[test]
    fn thresholds_never_exceed_the_index_set() {
        let x = rows(&[1., 2.]);
        let ref mut rng = SmallRng::seed_from_u64(0);
        assert!(thresholds(&x, &[0, 1], 0, 64, rng).len() == 2);
    }

    #[test]
    fn rank_thresholds_are_sorted_and_deduplicated() {
        let x = rows(&[1., 1., 1., 2., 2., 3., 4., 5., 6., 7.]);
        let cand = rank_thresholds(&x, 0, 8);
        let mut sorted = cand.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted.dedup();
        assert!(cand == sorted);
    }

    #[test]
    fn rank_thresholds_fall_back_to_the_mean() {
        let x = rows(&[2., 2., 2., 2.]);
        let cand = rank_thresholds(&x, 0, 2);
        assert!(cand == vec![2.]);
    }

    #[test]
    fn subset_of_zero_means_every_feature() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        assert!(subset(4, 0, rng) == vec![0, 1, 2, 3]);
        assert!(subset(4, 9, rng) == vec![0, 1, 2, 3]);
    }

    #[test]
    fn subset_is_a_prefix_of_a_permutation() {
        let ref mut rng = SmallRng::seed_from_u64(42);
        let picked = subset(10, 4, rng);
        assert!(picked.len() == 4);
        let mut unique = picked.clone();
        unique.sort();
        unique.dedup();
        assert!(unique.len() == 4);
        assert!(picked.iter().all(|&f| f < 10));
    }
}
