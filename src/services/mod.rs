pub mod dispatcher;
pub mod response_store;

pub use dispatcher::{BroadcastReport, DispatchOutcome, Dispatcher};
pub use response_store::{ResponseStore, StoreSnapshot};
