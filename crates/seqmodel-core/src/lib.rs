//! seqmodel Core Types and Definitions
//!
//! This crate provides the foundational types shared by the seqmodel
//! pipeline. It includes:
//!
//! - **Geometry**: Points, sizes and bounding boxes in diagram space ([`geometry`] module)
//! - **Model**: The recovered interaction model: lifelines, scopes, message
//!   flows and guard variables ([`model`] module)

pub mod geometry;
pub mod model;
