#![forbid(unsafe_code)]

pub mod catalog;
pub mod extract;
pub mod launcher;
pub mod matcher;
pub mod normalize;
pub mod system;
pub mod webservices;
