//! Calendar date ranges and the month/week/day view model.

mod range;
mod view;

pub use range::*;
pub use view::*;
