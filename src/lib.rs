#[cfg(feature = "server")]
pub mod service;

pub mod data;
pub mod error;
pub mod eval;
pub mod features;
pub mod model;
pub mod save;

pub use error::Error;

/// dimensional analysis types
pub type Probability = f64;
pub type Threshold = f64;
pub type Impurity = f64;
pub type LogOdds = f64;
pub type Label = u8;

// decision tree parameters
pub const TREE_MAX_DEPTH: usize = 6;
pub const TREE_MIN_SAMPLES_SPLIT: usize = 100;
pub const TREE_MAX_THRESHOLDS: usize = 64;

// ensemble parameters
pub const ENSEMBLE_ESTIMATORS: usize = 30;
pub const ENSEMBLE_MAX_THRESHOLDS: usize = 32;

// gradient boosting parameters
pub const BOOST_ESTIMATORS: usize = 50;
pub const BOOST_LEARNING_RATE: f64 = 0.1;
pub const BOOST_MIN_SAMPLES: usize = 100;
pub const BOOST_MAX_THRESHOLDS: usize = 32;
pub const BOOST_PRIOR_CLIP: f64 = 1e-3;

// threshold sweep parameters
pub const SWEEP_GRID_STEPS: usize = 200;

// learning curve parameters
pub const CURVE_TAIL_FRACTION: f64 = 0.1;
pub const CURVE_TAIL_MINIMUM: usize = 50;

/// what an unfit learner answers for every row
pub const UNFIT_PROBABILITY: Probability = 0.5;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// progress bar
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress
}

/// initialize logging
#[cfg(feature = "server")]
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
