//! File format parsing layer for notebook containers.
//!
//! # Module Organization
//!
//! - [`block`]: Length-prefixed block access at arbitrary addresses
//! - [`container`]: Footer → header → pages → layers traversal
//! - [`layer_info`]: `LAYERINFO` records and their assignment to layers

pub mod block;
pub mod container;
pub mod layer_info;
