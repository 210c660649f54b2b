pub mod dataset;
pub mod error;
pub mod operations;
pub mod sampling;
pub mod split;
pub mod validation;

pub use dataset::*;
pub use error::*;
pub use operations::*;
pub use sampling::*;
pub use split::*;
pub use validation::*;
