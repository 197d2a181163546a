//! Render-world plumbing shared by the compute stages.

pub mod extraction;
