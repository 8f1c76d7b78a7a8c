mod aggregated_point;
mod event;
mod measurement;
mod query;

pub use aggregated_point::*;
pub use event::*;
pub use measurement::*;
pub use query::*;
