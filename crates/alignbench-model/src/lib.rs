//! `alignbench-model` – the reference-frame model at the heart of the bench.
//!
//! Test hardware carries dozens of named mechanical and optical frames
//! (stage platform, focal-plane sensor, optics mounts, …) whose relative
//! poses come from heterogeneous sources: a bulk laser-tracker import,
//! manual additions, and frames derived from other frames. The model stores
//! them as a typed graph and answers "what is the transform between frame A
//! and frame B?" even when no direct measurement between them exists.
//!
//! # Modules
//!
//! - [`frame`] – [`Frame`]: one named node and its defining transform.
//! - [`graph`] – [`FrameGraph`]: owns all frames and links; construction,
//!   override, audit summary, and the transform query surface.
//! - [`resolver`] – breadth-first path search over the link graph,
//!   composing and inverting stored transforms along the way.
//! - [`sync`] – [`SyncReport`]: tolerance comparison between model output
//!   and independently measured hardware coordinates.
//! - [`snapshot`] – [`ModelSnapshot`]: serialisable image of the whole
//!   graph for embedding in a persisted setup.
//! - [`import`] – bulk bootstrap from decoded measurement records plus a
//!   [`ReferenceDefaults`] table.

pub mod frame;
pub mod graph;
pub mod import;
pub mod resolver;
pub mod snapshot;
pub mod sync;

pub use frame::Frame;
pub use graph::FrameGraph;
pub use import::{ReferenceDefaults, build_graph};
pub use snapshot::ModelSnapshot;
pub use sync::SyncReport;
