pub mod contracts;
pub mod lookup;
pub mod retry;
