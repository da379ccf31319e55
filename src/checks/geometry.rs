//! Geometry checks (GEO-001 through GEO-003).
//!
//! Hit positions are compared against the reference pixel geometry.
//!
//! With [`BoundPolicy::Extremal`] only the smallest and largest position in
//! each layer is compared: if both fall inside the open window
//! `(reference - tolerance, reference + tolerance)` every hit between them
//! does too. [`BoundPolicy::PerHit`] reaches the same verdict but counts the
//! hits outside the window for the report.

use super::CheckOutcome;
use crate::config::BoundPolicy;
use crate::engine::context::ValidationContext;
use crate::error::{LayerDeviation, Violation};
use crate::tolerances::{
    BARREL_LAYERS, BARREL_VOLUME, ENDCAP_DISKS_CHECKED, ENDCAP_LAYERS, NEGATIVE_ENDCAP_VOLUME,
    POSITIVE_ENDCAP_VOLUME,
};

const BARREL_REGION: &str = "pixel barrel";
const ENDCAP_REGION: &str = "pixel endcap";

/// Endcap volumes with the sign applied to the reference z.
const ENDCAPS: [(i64, f64); 2] = [(NEGATIVE_ENDCAP_VOLUME, -1.0), (POSITIVE_ENDCAP_VOLUME, 1.0)];

/// Run GEO-001: barrel hit radii lie within tolerance of their layer radius.
pub fn check_pixel_barrel(ctx: &ValidationContext) -> CheckOutcome {
    let tolerance = ctx.thresholds().barrel_tolerance_cm;
    let mut bounds = RegionBounds::new(BARREL_REGION, tolerance, ctx.thresholds().bound_policy);

    for layer in 1..=BARREL_LAYERS {
        let reference = ctx.geometry().barrel_radius(layer).unwrap_or(f64::NAN);
        let radii = ctx
            .dataset()
            .in_layer(BARREL_VOLUME, layer)
            .filter_map(|hit| hit.r());
        bounds.add_layer(BARREL_VOLUME, layer, reference, radii);
    }

    bounds.finish(BARREL_LAYERS as usize, "barrel layers")
}

/// Run GEO-002: endcap hit z positions lie within tolerance of their disk.
///
/// The negative endcap mirrors the reference z positions.
pub fn check_pixel_endcaps(ctx: &ValidationContext) -> CheckOutcome {
    let tolerance = ctx.thresholds().endcap_tolerance_cm;
    let mut bounds = RegionBounds::new(ENDCAP_REGION, tolerance, ctx.thresholds().bound_policy);

    for disk in 1..=ENDCAP_DISKS_CHECKED {
        let z_ref = ctx.geometry().endcap_z(disk).unwrap_or(f64::NAN);
        for (volume, sign) in ENDCAPS {
            let positions = ctx
                .dataset()
                .in_layer(volume, disk)
                .filter_map(|hit| hit.z);
            bounds.add_layer(volume, disk, sign * z_ref, positions);
        }
    }

    bounds.finish(ENDCAPS.len() * ENDCAP_DISKS_CHECKED as usize, "endcap disks")
}

/// Run GEO-003: volume and layer ids span exactly the pixel detector.
pub fn check_volume_and_layer_ids(ctx: &ValidationContext) -> CheckOutcome {
    let dataset = ctx.dataset();
    let mut problems = Vec::new();

    let volumes = span(dataset.hits().iter().filter_map(|h| h.volume_id));
    expect_span(
        &mut problems,
        "volume_id",
        volumes,
        (NEGATIVE_ENDCAP_VOLUME, POSITIVE_ENDCAP_VOLUME),
    );

    for (volume, label, last_layer) in [
        (BARREL_VOLUME, "barrel", BARREL_LAYERS),
        (NEGATIVE_ENDCAP_VOLUME, "negative endcap", ENDCAP_LAYERS),
        (POSITIVE_ENDCAP_VOLUME, "positive endcap", ENDCAP_LAYERS),
    ] {
        let layers = span(dataset.in_volume(volume).filter_map(|h| h.layer_id));
        expect_span(
            &mut problems,
            &format!("{} (volume {}) layer_id", label, volume),
            layers,
            (1, last_layer),
        );
    }

    if problems.is_empty() {
        Ok(format!(
            "volume_id spans [{}, {}], barrel layers [1, {}], endcap layers [1, {}]",
            NEGATIVE_ENDCAP_VOLUME, POSITIVE_ENDCAP_VOLUME, BARREL_LAYERS, ENDCAP_LAYERS
        ))
    } else {
        Err(Violation::LayerRange { problems })
    }
}

fn span(values: impl Iterator<Item = i64>) -> Option<(i64, i64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn expect_span(
    problems: &mut Vec<String>,
    what: &str,
    observed: Option<(i64, i64)>,
    expected: (i64, i64),
) {
    match observed {
        None => problems.push(format!("no hits with a {}", what)),
        Some(found) if found != expected => problems.push(format!(
            "{} spans [{}, {}], expected [{}, {}]",
            what, found.0, found.1, expected.0, expected.1
        )),
        Some(_) => {}
    }
}

/// Accumulates per-layer comparisons for one detector region.
struct RegionBounds {
    region: &'static str,
    tolerance: f64,
    policy: BoundPolicy,
    empty: Vec<(i64, i64)>,
    deviations: Vec<LayerDeviation>,
}

impl RegionBounds {
    fn new(region: &'static str, tolerance: f64, policy: BoundPolicy) -> Self {
        RegionBounds {
            region,
            tolerance,
            policy,
            empty: Vec::new(),
            deviations: Vec::new(),
        }
    }

    fn add_layer(
        &mut self,
        volume_id: i64,
        layer_id: i64,
        reference_cm: f64,
        positions: impl Iterator<Item = f64>,
    ) {
        let lo = reference_cm - self.tolerance;
        let hi = reference_cm + self.tolerance;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut count = 0usize;
        let mut outside = 0usize;
        for p in positions {
            count += 1;
            min = min.min(p);
            max = max.max(p);
            if !(p > lo && p < hi) {
                outside += 1;
            }
        }

        if count == 0 {
            self.empty.push((volume_id, layer_id));
            return;
        }

        let within = match self.policy {
            BoundPolicy::Extremal => min > lo && max < hi,
            BoundPolicy::PerHit => outside == 0,
        };
        if !within {
            self.deviations.push(LayerDeviation {
                volume_id,
                layer_id,
                reference_cm,
                min,
                max,
                outside: (self.policy == BoundPolicy::PerHit).then_some(outside),
            });
        }
    }

    fn finish(self, layers: usize, noun: &str) -> CheckOutcome {
        if !self.empty.is_empty() {
            return Err(Violation::EmptyLayer {
                region: self.region.to_string(),
                layers: self.empty,
            });
        }
        if !self.deviations.is_empty() {
            return Err(Violation::GeometryBound {
                region: self.region.to_string(),
                tolerance_cm: self.tolerance,
                deviations: self.deviations,
            });
        }
        let method = match self.policy {
            BoundPolicy::Extremal => "layer extremes",
            BoundPolicy::PerHit => "every hit",
        };
        Ok(format!(
            "All {} {} within {} cm of the reference ({} checked)",
            layers, noun, self.tolerance, method
        ))
    }
}
