#![forbid(unsafe_code)]

pub mod command;
pub mod common;
pub mod dispatch;
pub mod handler;
pub mod matching;
pub mod settings;
pub mod utterance;

pub use common::{ContractViolation, ReasonCodeId, SchemaVersion, Validate};
