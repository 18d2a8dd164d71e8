mod customer;
mod order;
mod receipt;
mod transaction;
mod widget;

pub use customer::*;
pub use order::*;
pub use receipt::*;
pub use transaction::*;
pub use widget::*;
