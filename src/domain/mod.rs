pub mod agent;
pub mod record;

pub use agent::*;
pub use record::*;
