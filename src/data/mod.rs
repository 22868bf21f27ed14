pub mod dataset;
pub mod expense;
pub mod generate;
pub mod ingest;

pub use dataset::Dataset;
pub use expense::Expense;
pub use generate::Generator;
