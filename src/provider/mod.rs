mod endpoint;

pub use endpoint::*;
