//! Runtime module — process lifecycle: boot, run.

pub mod boot;
pub mod run;
