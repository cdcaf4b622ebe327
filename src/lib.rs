//! Spatial layout consistency engine for an interactive 2D map/level builder.
//!
//! The crate owns the full editing lifecycle of a floor layout: translating
//! raw pointer events into validated geometry mutations, maintaining camera
//! state for pan/zoom, snapping to per-entity grids and to neighboring room
//! edges, repairing collisions, and synthesizing door connectors between
//! rooms that come to share an exact boundary. The host is responsible only
//! for wiring input events to the engine, rendering the pull-based
//! [`session::RenderSnapshot`], and persisting the resulting
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::EngineCore`] event handlers and actions |
//! | [`session`] | In-memory entity store, camera, selection, render snapshot |
//! | [`model`] | Room / connector / furniture types and sparse updates |
//! | [`camera`] | Focal-point camera and coordinate conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against rooms, connectors, furniture, handles |
//! | [`grid`] | Multi-resolution grid quantization |
//! | [`snap`] | Edge-to-edge proximity snapping between rooms |
//! | [`collide`] | Overlap testing, resize clamping, nearest-valid search |
//! | [`adjacency`] | Exact-adjacency detection and connector synthesis |
//! | [`persist`] | Persistence collaborator contract and commit reconciliation |
//! | [`consts`] | Shared numeric constants (zoom limits, grids, thresholds) |

pub mod adjacency;
pub mod camera;
pub mod collide;
pub mod consts;
pub mod engine;
pub mod grid;
pub mod hit;
pub mod input;
pub mod model;
pub mod persist;
pub mod session;
pub mod snap;
