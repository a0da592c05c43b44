#![forbid(unsafe_code)]

pub mod dispatch;
pub mod pipeline;
pub mod settings;
