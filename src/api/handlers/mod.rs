pub mod broadcast;
pub mod callback;
pub mod responses;
pub mod system;

pub use broadcast::*;
pub use callback::*;
pub use responses::*;
pub use system::*;
