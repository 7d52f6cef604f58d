//! Geometry helpers for rigid-body transforms.

pub mod geometry;
