pub mod tasks;
pub mod users;

pub use tasks::TaskLedger;
pub use users::UserDirectory;
