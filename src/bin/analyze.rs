//! Quick learning-curve analyzer.
//!
//! A lighter cut of the trainer: prefix split, linear sizes, accuracy
//! on both sides per size, one table and one png.

use antifraud::data::Dataset;
use antifraud::data::ingest;
use antifraud::eval::curve;
use antifraud::eval::metrics;
use antifraud::eval::plot;
use antifraud::model::Bagging;
use antifraud::model::Boosting;
use antifraud::model::Forest;
use antifraud::model::Learner;
use antifraud::model::Model;
use antifraud::model::Tree;
use clap::Parser;

#[derive(Parser)]
#[command(about = "sweep training sizes and tabulate both-side accuracy")]
struct Args {
    /// algorithm: dt | rf | bagging | gb
    #[arg(long, default_value = "dt")]
    algo: String,
    #[arg(long, default_value_t = 30)]
    estimators: usize,
    #[arg(long, default_value_t = 6)]
    max_depth: usize,
    #[arg(long, default_value_t = 100)]
    min_samples: usize,
    #[arg(long, default_value_t = 0.1)]
    lr: f64,
    /// points on the curve
    #[arg(long, default_value_t = 8)]
    points: usize,
    #[arg(long, default_value = "data/synthetic.csv")]
    data: String,
    #[arg(long, default_value = "static/learning_curve.png")]
    out_img: String,
    #[arg(long, default_value = "data/learning_curve.csv")]
    out_csv: String,
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
            _ => {
                let mut tree = Tree::seeded(self.seed);
                tree.max_depth = self.max_depth;
                tree.min_samples_split = self.min_samples;
                Model::Tree(tree)
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    antifraud::init();
    let args = Args::parse();

    let set = Dataset::from(ingest::read(&args.data)?);
    anyhow::ensure!(!set.is_empty(), "dataset at {} is empty", args.data);
    let cut = (0.8 * set.len() as f64) as usize;
    let train = Dataset {
        x: set.x[..cut].to_vec(),
        y: set.y[..cut].to_vec(),
    };
    let test = Dataset {
        x: set.x[cut..].to_vec(),
        y: set.y[cut..].to_vec(),
    };

    let sizes = (1..=args.points)
        .map(|i| {
            let fraction = i as f64 / args.points as f64;
            ((fraction * train.len() as f64) as usize).max(100).min(train.len())
        })
        .collect::<Vec<_>>();

    let mut points = vec![];
    for size in sizes {
        let x = &train.x[..size];
        let y = &train.y[..size];
        let mut model = args.learner();
        model.fit(x, y)?;
        let on_train = metrics::accuracy(y, &model.label(x));
        let on_test = metrics::accuracy(&test.y, &model.label(&test.x));
        println!(
            "{} | size={} | train={:.3} | test={:.3}",
            model.name(),
            size,
            on_train,
            on_test
        );
        points.push(curve::Point {
            size,
            threshold: 0.5,
            train_acc: on_train,
            test_acc: on_test,
            train_f1: 0.,
            test_f1: 0.,
            train_roc: 0.,
            test_roc: 0.,
            train_pr: 0.,
            test_pr: 0.,
        });
    }

    curve::export(&points, &args.out_csv)?;
    if let Err(e) = plot::render(&points, &args.out_img) {
        log::warn!("curve png failed ({}), table is at {}", e, args.out_csv);
    }
    Ok(())
}
