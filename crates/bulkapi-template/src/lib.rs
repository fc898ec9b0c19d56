pub mod path;

pub mod mock;

pub use path::PathEvaluator;
