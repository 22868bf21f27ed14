//! Offline training driver.
//!
//! Regenerates or ingests the dataset, fits the selected learner,
//! reports holdout metrics at a validation-chosen threshold, saves the
//! artifact, and optionally tabulates a learning curve.

use antifraud::data::Dataset;
use antifraud::data::Generator;
use antifraud::data::ingest;
use antifraud::eval::Harness;
use antifraud::eval::Objective;
use antifraud::eval::Scale;
use antifraud::eval::Sweep;
use antifraud::eval::curve;
use antifraud::eval::metrics;
use antifraud::eval::plot;
use antifraud::model::Bagging;
use antifraud::model::Boosting;
use antifraud::model::External;
use antifraud::model::Forest;
use antifraud::model::Learner;
use antifraud::model::Model;
use antifraud::model::Tree;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser)]
#[command(about = "train a fraud scorer and tabulate its learning curve")]
struct Args {
    /// algorithm: dt | rf | bagging | gb | lgbm
    #[arg(long, default_value = "dt")]
    algo: String,
    /// estimators in ensembles and boosting
    #[arg(long, default_value_t = 30)]
    estimators: usize,
    #[arg(long, default_value_t = 6)]
    max_depth: usize,
    /// minimum samples to split (trees) or per leaf (boosting)
    #[arg(long, default_value_t = 100)]
    min_samples: usize,
    /// learning rate for gradient boosting
    #[arg(long, default_value_t = 0.1)]
    lr: f64,
    /// regenerate the synthetic dataset before training
    #[arg(long, default_value_t = false)]
    regen: bool,
    /// synthetic records to generate with --regen
    #[arg(long, default_value_t = 260000)]
    n: usize,
    #[arg(long, default_value = "data/synthetic.csv")]
    data: String,
    /// artifact path; defaults to models/<algo>_model.bin
    #[arg(long)]
    model_out: Option<String>,
    /// tabulate a learning curve after training
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    curve: bool,
    #[arg(long, default_value_t = 10)]
    curve_points: usize,
    /// smallest training prefix on the curve
    #[arg(long, default_value_t = 500)]
    curve_min: usize,
    /// log-spaced prefix sizes instead of linear
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    curve_log: bool,
    #[arg(long, default_value = "data/learning_curve.csv")]
    curve_csv: String,
    #[arg(long, default_value = "static/learning_curve.png")]
    curve_img: String,
    /// fixed classification threshold when auto-selection is off
    #[arg(long, default_value_t = 0.5)]
    threshold: f64,
    /// pick the threshold on a validation tail instead
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    threshold_auto: bool,
    /// objective for the automatic threshold: f1 | acc
    #[arg(long, default_value = "f1")]
    threshold_metric: String,
    #[arg(long, default_value_t = 0.05)]
    threshold_min: f64,
    #[arg(long, default_value_t = 0.95)]
    threshold_max: f64,
    /// seed for shuffling, splitting, and every randomized fit
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl Args {
    fn learner(&self) -> Model {
        match self.algo.as_str() {
            "rf" => {
                let mut forest = Forest::seeded(self.seed);
                forest.n_estimators = self.estimators;
                forest.max_depth = self.max_depth;
                forest.min_samples = self.min_samples;
                Model::Forest(forest)
            }
            "bagging" => {
                let mut bag = Bagging::seeded(self.seed);
                bag.n_estimators = self.estimators;
                bag.max_depth = self.max_depth;
                bag.min_samples = self.min_samples;
                Model::Bagging(bag)
            }
            "gb" => {
                let mut boost = Boosting::default();
                boost.n_estimators = self.estimators;
                boost.learning_rate = self.lr;
                boost.min_samples = self.min_samples;
                Model::Boosting(boost)
            }
            "lgbm" => {
                let mut backend = External::default();
                if self.max_depth > 0 {
                    backend.max_depth = self.max_depth as i32;
                    backend.num_leaves = 1 << self.max_depth;
                }
                backend.min_data_in_leaf = self.min_samples;
                backend.num_iterations = self.estimators;
                backend.learning_rate = self.lr;
                Model::External(backend)
            }
            _ => {
                let mut tree = Tree::seeded(self.seed);
                tree.max_depth = self.max_depth;
                tree.min_samples_split = self.min_samples;
                Model::Tree(tree)
            }
        }
    }

    fn objective(&self) -> Objective {
        match self.threshold_metric.as_str() {
            "acc" => Objective::Accuracy,
            _ => Objective::F1,
        }
    }

    /// threshold from the tail of the training set, clamped
    fn pick(&self, train: &Dataset, model: &Model) -> f64 {
        let tail = ((train.len() as f64 * antifraud::CURVE_TAIL_FRACTION) as usize)
            .max(100)
            .min(train.len());
        let vx = &train.x[train.len() - tail..];
        let vy = &train.y[train.len() - tail..];
        match self.threshold_auto {
            true => Sweep {
                objective: self.objective(),
                floor: self.threshold_min,
                ceiling: self.threshold_max,
            }
            .best(vy, &model.probability(vx)),
            false => self.threshold.clamp(self.threshold_min, self.threshold_max),
        }
    }
}

fn main() -> anyhow::Result<()> {
    antifraud::init();
    let args = Args::parse();

    if args.regen {
        log::info!("generating {} synthetic records into {}", args.n, args.data);
        Generator::new(args.n, 0.08, args.seed).export(&args.data)?;
    }

    let mut set = Dataset::from(ingest::read(&args.data)?);
    let ref mut rng = SmallRng::seed_from_u64(args.seed);
    set.shuffle(rng);
    log::info!(
        "class distribution: {} positive, {} negative",
        set.positives(),
        set.len() - set.positives()
    );
    let (train, test) = set.split(0.8, rng);

    let mut model = args.learner();
    model.fit(&train.x, &train.y)?;

    let threshold = args.pick(&train, &model);
    let scores = model.probability(&test.x);
    let counts = metrics::Confusion::at(&test.y, &scores, threshold);
    log::info!(
        "holdout: model={} threshold={:.3} accuracy={:.4} f1={:.4} precision={:.4} recall={:.4} roc_auc={:.4} pr_auc={:.4}",
        model.name(),
        threshold,
        metrics::accuracy(&test.y, &metrics::classify(&scores, threshold)),
        counts.f1(),
        counts.precision(),
        counts.recall(),
        metrics::roc_auc(&test.y, &scores),
        metrics::pr_auc(&test.y, &scores),
    );

    let path = args
        .model_out
        .clone()
        .unwrap_or_else(|| Model::path(&args.algo));
    model.save(&path)?;
    log::info!("artifact saved to {}", path);

    if args.curve {
        let harness = Harness {
            points: args.curve_points,
            floor: args.curve_min,
            scale: match args.curve_log {
                true => Scale::Log,
                false => Scale::Linear,
            },
            auto: args.threshold_auto.then(|| args.objective()),
            fallback: args.threshold,
            clamp: (args.threshold_min, args.threshold_max),
        };
        let points = harness.run(&train, &test, || args.learner())?;
        curve::export(&points, &args.curve_csv)?;
        match plot::render(&points, &args.curve_img) {
            Ok(()) => log::info!(
                "learning curve written to {} and {}",
                args.curve_csv,
                args.curve_img
            ),
            Err(e) => log::warn!("curve png failed ({}), table is at {}", e, args.curve_csv),
        }
    }
    Ok(())
}
