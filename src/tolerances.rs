//! Detector constants and acceptance thresholds.
//!
//! Every number a check compares against lives here so the checks read as
//! plain comparisons. Lengths are centimetres unless the name says otherwise.

/// `volume_id` of the negative-z pixel endcap.
pub const NEGATIVE_ENDCAP_VOLUME: i64 = 1;

/// `volume_id` of the pixel barrel.
pub const BARREL_VOLUME: i64 = 2;

/// `volume_id` of the positive-z pixel endcap.
pub const POSITIVE_ENDCAP_VOLUME: i64 = 3;

/// Barrel layers are numbered `1..=BARREL_LAYERS`.
pub const BARREL_LAYERS: i64 = 4;

/// Endcap layers are numbered `1..=ENDCAP_LAYERS`.
pub const ENDCAP_LAYERS: i64 = 12;

/// Endcap disks whose z position is compared against the reference.
///
/// One fewer than [`ENDCAP_LAYERS`]: the outermost disk is only covered by
/// the layer-range check.
pub const ENDCAP_DISKS_CHECKED: i64 = 11;

/// Allowed distance of a barrel hit from its layer radius.
pub const BARREL_TOLERANCE_CM: f64 = 0.4;

/// Allowed distance of an endcap hit from its disk z position.
pub const ENDCAP_TOLERANCE_CM: f64 = 0.8;

/// Geometry tables are stored in millimetres.
pub const GEOMETRY_UNIT_SCALE: f64 = 0.1;

/// Every event must carry strictly more hits than this.
pub const MIN_HITS_PER_EVENT: i64 = 80_000;
