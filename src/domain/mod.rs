mod customer;
mod ledger;
mod money;
mod time;
mod transaction;
mod validation;

pub use customer::*;
pub use ledger::*;
pub use money::*;
pub use time::*;
pub use transaction::*;
pub use validation::*;
