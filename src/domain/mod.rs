pub mod error;
pub mod model;

pub use error::NetworkError;
pub use model::{FetchOutcome, FetchRequest, ProgressState};
