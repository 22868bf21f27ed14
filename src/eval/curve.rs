use super::metrics;
use super::threshold::Objective;
use super::threshold::Sweep;
use crate::Error;
use crate::Threshold;
use crate::data::dataset::Dataset;
use crate::model::Learner;
use crate::model::Model;

/// how prefix sizes are spaced along the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Log,
    Linear,
}

/// repeated train/eval over growing prefixes of the training set.
/// each point refits a fresh learner and re-picks its own threshold
/// from the tail of the prefix.
#[derive(Debug, Clone)]
pub struct Harness {
    pub points: usize,
    pub floor: usize,
    pub scale: Scale,
    /// per-point auto threshold when set, the fixed fallback otherwise
    pub auto: Option<Objective>,
    pub fallback: Threshold,
    pub clamp: (Threshold, Threshold),
}

/// one row of the learning-curve table
#[derive(Debug, Clone)]
pub struct Point {
    pub size: usize,
    pub threshold: Threshold,
    pub train_acc: f64,
    pub test_acc: f64,
    pub train_f1: f64,
    pub test_f1: f64,
    pub train_roc: f64,
    pub test_roc: f64,
    pub train_pr: f64,
    pub test_pr: f64,
}

impl Harness {
    /// the prefix sizes to evaluate: log- or linearly-spaced from the
    /// floor to the full set, strictly increasing, ending exactly at n
    pub fn schedule(&self, total: usize) -> Vec<usize> {
        let points = self.points.max(2);
        let floor = match self.floor {
            f if f < 10 => 10,
            f if f > total => (total / 2).max(10),
            f => f,
        };
        let raw = match self.scale {
            Scale::Log => {
                let ratio = (total as f64 / floor as f64).powf(1. / (points - 1) as f64);
                (0..points)
                    .map(|i| (floor as f64 * ratio.powi(i as i32)).round() as usize)
                    .map(|s| s.min(total))
                    .collect::<Vec<_>>()
            }
            Scale::Linear => {
                let step = (total as f64 - floor as f64) / (points - 1) as f64;
                (0..points)
                    .map(|i| (floor as f64 + i as f64 * step).round() as usize)
                    .map(|s| s.min(total))
                    .collect::<Vec<_>>()
            }
        };
        let mut sizes = Vec::with_capacity(raw.len());
        let mut last = None;
        for mut s in raw {
            if let Some(l) = last {
                if s <= l {
                    s = l + 1;
                }
            }
            let s = s.min(total);
            if last != Some(s) {
                sizes.push(s);
                last = Some(s);
            }
        }
        if let Some(end) = sizes.last_mut() {
            if *end != total {
                *end = total;
            }
        }
        sizes
    }

    /// fit a fresh learner per prefix and tabulate both-side metrics.
    /// a single failed fit kills the whole run.
    pub fn run<F>(&self, train: &Dataset, test: &Dataset, factory: F) -> Result<Vec<Point>, Error>
    where
        F: Fn() -> Model,
    {
        let sizes = self.schedule(train.len());
        let progress = crate::progress(sizes.len());
        let mut points = Vec::with_capacity(sizes.len());
        for size in sizes {
            let x = &train.x[..size];
            let y = &train.y[..size];
            let mut model = factory();
            model.fit(x, y)?;
            let on_train = model.probability(x);
            let on_test = model.probability(&test.x);
            let threshold = self.pick(y, &on_train, size);
            points.push(self.tabulate(size, threshold, y, &on_train, &test.y, &on_test));
            log::debug!("curve point done (size {})", size);
            progress.inc(1);
        }
        progress.finish();
        Ok(points)
    }

    /// threshold for one curve point, from the tail of the prefix
    fn pick(&self, y: &[crate::Label], scores: &[f64], size: usize) -> Threshold {
        let tail = ((size as f64 * crate::CURVE_TAIL_FRACTION) as usize)
            .max(crate::CURVE_TAIL_MINIMUM)
            .min(size);
        let vy = &y[size - tail..];
        let vs = &scores[size - tail..];
        let (floor, ceiling) = self.clamp;
        match self.auto {
            Some(objective) => Sweep { objective, floor, ceiling }.best(vy, vs),
            None => self.fallback.clamp(floor, ceiling),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn tabulate(
        &self,
        size: usize,
        threshold: Threshold,
        ytr: &[crate::Label],
        ptr: &[f64],
        yte: &[crate::Label],
        pte: &[f64],
    ) -> Point {
        Point {
            size,
            threshold,
            train_acc: metrics::accuracy(ytr, &metrics::classify(ptr, threshold)),
            test_acc: metrics::accuracy(yte, &metrics::classify(pte, threshold)),
            train_f1: metrics::Confusion::at(ytr, ptr, threshold).f1(),
            test_f1: metrics::Confusion::at(yte, pte, threshold).f1(),
            train_roc: metrics::roc_auc(ytr, ptr),
            test_roc: metrics::roc_auc(yte, pte),
            train_pr: metrics::pr_auc(ytr, ptr),
            test_pr: metrics::pr_auc(yte, pte),
        }
    }
}

/// write the curve table as csv, creating parent directories
pub fn export(points: &[Point], path: &str) -> Result<(), Error> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut w = csv::Writer::from_path(path)?;
    w.write_record([
        "size",
        "train_acc",
        "test_acc",
        "train_f1",
        "test_f1",
        "train_roc_auc",
        "test_roc_auc",
        "train_pr_auc",
        "test_pr_auc",
    ])?;
    for p in points {
        w.write_record([
            p.size.to_string(),
            format!("{:.6}", p.train_acc),
            format!("{:.6}", p.test_acc),
            format!("{:.6}", p.train_f1),
            format!("{:.6}", p.test_f1),
            format!("{:.6}", p.train_roc),
            format!("{:.6}", p.test_roc),
            format!("{:.6}", p.train_pr),
            format!("{:.6}", p.test_pr),
        ])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::threshold::Objective;
    use crate::model::Tree;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn harness(points: usize, floor: usize, scale: Scale) -> Harness {
        Harness {
            points,
            floor,
            scale,
            auto: Some(Objective::F1),
            fallback: 0.5,
            clamp: (0.05, 0.95),
        }
    }

    #[test]
    fn log_schedule_is_strictly_increasing_and_complete() {
        let sizes = harness(10, 500, Scale::Log).schedule(10000);
        assert!(sizes[0] == 500);
        assert!(sizes.last() == Some(&10000));
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn linear_schedule_is_strictly_increasing_and_complete() {
        let sizes = harness(8, 100, Scale::Linear).schedule(5000);
        assert!(sizes[0] == 100);
        assert!(sizes.last() == Some(&5000));
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        let gap = sizes[1] - sizes[0];
        assert!(sizes.windows(2).all(|w| (w[1] - w[0]).abs_diff(gap) <= 1));
    }

    #[test]
    fn tiny_ranges_collapse_without_duplicates() {
        let sizes = harness(5, 10, Scale::Linear).schedule(12);
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        assert!(sizes.last() == Some(&12));
    }

    #[test]
    fn oversized_floor_is_pulled_back() {
        let sizes = harness(4, 900, Scale::Log).schedule(100);
        assert!(sizes[0] <= 100);
        assert!(sizes.last() == Some(&100));
    }

    #[test]
    fn one_point_is_promoted_to_two() {
        let sizes = harness(1, 50, Scale::Linear).schedule(1000);
        assert!(sizes.len() == 2);
    }

    #[test]
    fn the_run_tabulates_every_scheduled_size() {
        let ref mut rng = SmallRng::seed_from_u64(55);
        let x = (0..600)
            .map(|_| vec![rng.random::<f64>()])
            .collect::<Vec<_>>();
        let y = x.iter().map(|row| (row[0] > 0.5) as crate::Label).collect::<Vec<_>>();
        let train = Dataset {
            x: x[..500].to_vec(),
            y: y[..500].to_vec(),
        };
        let test = Dataset {
            x: x[500..].to_vec(),
            y: y[500..].to_vec(),
        };
        let harness = harness(4, 100, Scale::Linear);
        let points = harness
            .run(&train, &test, || {
                let mut tree = Tree::seeded(5);
                tree.min_samples_split = 10;
                Model::Tree(tree)
            })
            .unwrap();
        assert!(points.len() == harness.schedule(500).len());
        assert!(points.last().unwrap().size == 500);
        for p in &points {
            assert!((0. ..=1.).contains(&p.test_acc));
            assert!((0. ..=1.).contains(&p.test_f1));
            assert!((0.05..=0.95).contains(&p.threshold));
        }
        // a separable single feature should be learned by the last point
        assert!(points.last().unwrap().test_acc > 0.9);
    }

    #[test]
    fn csv_export_writes_one_row_per_point() {
        let path = std::env::temp_dir().join("antifraud-curve-test.csv");
        let path = path.to_string_lossy();
        let point = Point {
            size: 100,
            threshold: 0.5,
            train_acc: 1.,
            test_acc: 0.9,
            train_f1: 1.,
            test_f1: 0.9,
            train_roc: 1.,
            test_roc: 0.95,
            train_pr: 1.,
            test_pr: 0.93,
        };
        export(&[point.clone(), point], &path).unwrap();
        let text = std::fs::read_to_string(path.as_ref()).unwrap();
        assert!(text.lines().count() == 3);
        assert!(text.starts_with("size,train_acc,test_acc"));
        std::fs::remove_file(path.as_ref()).ok();
    }
}
