//! Shared numeric constants for the floorplan crate.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed camera zoom factor.
pub const MIN_ZOOM: f64 = 0.25;

/// Largest allowed camera zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

/// Multiplicative zoom step applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

// ── Grid resolutions (world units) ──────────────────────────────

/// Structural grid: rooms snap at this resolution.
pub const ROOM_GRID: f64 = 32.0;

/// Connectors snap at this resolution.
pub const CONNECTOR_GRID: f64 = 16.0;

/// Furniture snaps at this resolution.
pub const FURNITURE_GRID: f64 = 8.0;

// ── Geometry limits ─────────────────────────────────────────────

/// Minimum span of a room on either axis.
pub const MIN_ROOM_SIZE: f64 = 32.0;

/// Maximum edge-to-edge gap at which a dragged room snaps to a neighbor.
pub const SNAP_THRESHOLD: f64 = 8.0;

/// Ring cap for the nearest-valid-position search. Exceeding it returns the
/// original target flagged as degraded.
pub const MAX_SEARCH_RINGS: u32 = 16;

// ── Gestures ────────────────────────────────────────────────────

/// Screen-space movement below this stays a click; above it starts a drag.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Furniture ───────────────────────────────────────────────────

/// Footprint of a furniture item placed by a click, before the user edits it.
pub const DEFAULT_FURNITURE_SIZE: f64 = 32.0;

// ── Connectors ──────────────────────────────────────────────────

/// Footprint of a synthesized connector along the shared wall.
pub const CONNECTOR_WIDTH: f64 = 32.0;

/// Footprint of a synthesized connector across the shared wall.
pub const CONNECTOR_HEIGHT: f64 = 8.0;

/// An existing connector between the same room pair within this distance of
/// a detected adjacency suppresses auto-creation (one structural grid cell).
pub const CONNECTOR_DEDUP_TOLERANCE: f64 = ROOM_GRID;

/// A dragged connector may end up at most this far from the shared boundary
/// of its two rooms before being pulled back onto it.
pub const CONNECTOR_BOUNDARY_TOLERANCE: f64 = CONNECTOR_GRID;
