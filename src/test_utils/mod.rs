//! the test_utils folder here will share utils or test components between
//! unit tests
mod broker;
mod instances;

pub use broker::*;
pub use instances::*;
