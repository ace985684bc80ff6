mod channel;
mod inventory;
mod process;
mod repo;
mod report;

pub use channel::*;
pub use inventory::*;
pub use process::*;
pub use repo::*;
pub use report::*;
