//! Sequence-level functionality built on the engines

pub mod batch;
pub mod io;
pub mod seq;
