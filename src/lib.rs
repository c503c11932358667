pub mod boundary;
pub mod shared;
pub mod workflow;
