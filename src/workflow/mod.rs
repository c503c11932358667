pub mod error;
pub mod payment;
pub mod persist;
pub mod readiness;
pub mod registry;
pub mod sequencer;
pub mod store;
pub mod validator;
