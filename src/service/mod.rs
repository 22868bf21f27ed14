pub mod rules;
pub mod scorer;
pub mod server;

pub use rules::Risk;
pub use scorer::Scorer;
