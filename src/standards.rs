//! Road design-standard formulas and curve-parameter validation.
//!
//! Reference values follow common AASHTO/FHWA-like guidance tables and are
//! replaceable per call through explicit parameters.

use std::f64::consts::PI;

use crate::geometry::{distance, Point};

/// Design reaction time in seconds.
pub const DEFAULT_REACTION_TIME: f64 = 2.5;
/// Design braking deceleration in m/s^2.
pub const DEFAULT_DECELERATION: f64 = 3.4;

/// Typical superelevation fraction.
pub const TYPICAL_SUPERELEVATION: f64 = 0.04;
/// Commonly recommended superelevation ceiling.
pub const MAX_RECOMMENDED_SUPERELEVATION: f64 = 0.06;
/// Absolute superelevation ceiling.
pub const ABSOLUTE_MAX_SUPERELEVATION: f64 = 0.08;

/// Lateral friction factor by speed (km/h), ascending by speed.
pub static FRICTION_TABLE: &[(f64, f64)] = &[
    (20.0, 0.24),
    (30.0, 0.22),
    (50.0, 0.18),
    (70.0, 0.16),
    (90.0, 0.14),
    (120.0, 0.12),
];

/// Converts a speed from km/h to m/s.
pub fn kmh_to_ms(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

fn linear_interpolate(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    if x1 == x0 {
        return 0.5 * (y0 + y1);
    }
    y0 + (x - x0) / (x1 - x0) * (y1 - y0)
}

/// Recommended lateral friction factor for a design speed, interpolated from
/// [`FRICTION_TABLE`] and clamped at its ends.
pub fn recommend_friction(speed_kmh: f64) -> f64 {
    let first = FRICTION_TABLE[0];
    let last = FRICTION_TABLE[FRICTION_TABLE.len() - 1];
    if speed_kmh <= first.0 {
        return first.1;
    }
    if speed_kmh >= last.0 {
        return last.1;
    }
    for pair in FRICTION_TABLE.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if (x0..=x1).contains(&speed_kmh) {
            return linear_interpolate(speed_kmh, x0, y0, x1, y1);
        }
    }
    last.1
}

/// Stopping sight distance in meters: reaction distance plus braking
/// distance, `v*t + v^2 / (2a)`.
pub fn stopping_sight_distance(speed_kmh: f64, reaction_time: f64, decel: f64) -> f64 {
    let v = kmh_to_ms(speed_kmh);
    v * reaction_time + v * v / (2.0 * decel)
}

/// Minimum curve radius from `R = V^2 / (127 * (e + f))` with V in km/h.
/// `e` and `f` default to the recommended values when not supplied. A
/// non-positive denominator yields positive infinity.
pub fn min_radius(speed_kmh: f64, e: Option<f64>, f: Option<f64>) -> f64 {
    let e = e.unwrap_or(TYPICAL_SUPERELEVATION);
    let f = f.unwrap_or_else(|| recommend_friction(speed_kmh));
    let denom = 127.0 * (e + f);
    if denom <= 0.0 {
        return f64::INFINITY;
    }
    speed_kmh * speed_kmh / denom
}

/// Recommended radius range for a curve joining tangents `chord_length`
/// apart at the given design speed. Geometric baselines from the chord are
/// floored by a fraction of the superelevation-implied minimum; the result
/// always satisfies `min < max`.
pub fn recommend_radius_range(chord_length: f64, speed_kmh: f64) -> (f64, f64) {
    let chord = chord_length.max(0.0);
    let baseline_min = (chord / 8.0).max(3.0);
    let baseline_max = (chord * 8.0).max(30.0);
    let r_from_sup = min_radius(speed_kmh, None, None);
    let r_min = baseline_min.max(r_from_sup * 0.2).max(3.0);
    let r_max = baseline_max.max(r_min + 1.0);
    (r_min, r_max)
}

/// Recommended transition length range, a rule of thumb of
/// `Ls in [0.04R, 0.15R]` bounded to sensible metric limits.
pub fn recommend_spiral_length_range(radius: f64) -> (f64, f64) {
    let r = radius.max(0.0);
    let mut ls_min = (0.04 * r).max(3.0);
    let ls_max = (0.15 * r).max(10.0).min(200.0);
    if ls_min > ls_max {
        ls_min = ls_max * 0.5;
    }
    (ls_min, ls_max)
}

/// Conservative superelevation recommendation by design speed.
pub fn recommend_superelevation(speed_kmh: f64) -> f64 {
    if speed_kmh <= 50.0 {
        TYPICAL_SUPERELEVATION
    } else if speed_kmh <= 100.0 {
        MAX_RECOMMENDED_SUPERELEVATION.min(TYPICAL_SUPERELEVATION + 0.01)
    } else {
        ABSOLUTE_MAX_SUPERELEVATION.min(TYPICAL_SUPERELEVATION + 0.02)
    }
}

/// Suggested station label interval by design speed.
pub fn recommend_label_interval(speed_kmh: f64) -> f64 {
    if speed_kmh <= 40.0 {
        5.0
    } else if speed_kmh <= 80.0 {
        10.0
    } else {
        20.0
    }
}

/// Curve families accepted by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Arc,
    SpiralArcSpiral,
}

impl CurveKind {
    /// Parses the curve-type spellings accepted by the validator.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "arc" => Some(CurveKind::Arc),
            "spiral_arc_spiral" | "spiral" | "clothoid" | "sas" => Some(CurveKind::SpiralArcSpiral),
            _ => None,
        }
    }
}

/// Candidate curve parameters under validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveParams {
    pub radius: f64,
    pub spiral_length: f64,
}

/// Hard validation failures; any entry blocks the curve.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("radius must be greater than zero")]
    NonPositiveRadius,
    #[error("tangent distance {chord:.2} m exceeds 2*R for radius {radius:.2} m; a simple arc cannot be built")]
    ChordExceedsDiameter { chord: f64, radius: f64 },
    #[error("spiral length must be greater than zero")]
    NonPositiveSpiralLength,
    #[error("unknown curve type `{0}`; expected `arc` or `spiral_arc_spiral`")]
    UnknownCurveType(String),
    #[error("internal numeric failure while evaluating curve parameters")]
    NumericalFailure,
}

/// Soft findings; the curve may proceed after confirmation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveWarning {
    #[error("radius {radius:.1} m is below the recommended range {min:.1}..{max:.1} m")]
    RadiusBelowRecommended { radius: f64, min: f64, max: f64 },
    #[error("radius {radius:.1} m is above the recommended range {min:.1}..{max:.1} m")]
    RadiusAboveRecommended { radius: f64, min: f64, max: f64 },
    #[error("radius is very small compared to the superelevation/friction minimum")]
    RadiusFarBelowSuperelevationMinimum,
    #[error("tangent distance is very large for the central radius; the geometry may fail")]
    ChordLargeForRadius,
    #[error("spiral length {length:.1} m is below the recommended range {min:.1}..{max:.1} m")]
    SpiralBelowRecommended { length: f64, min: f64, max: f64 },
    #[error("spiral length {length:.1} m is above the recommended range {min:.1}..{max:.1} m")]
    SpiralAboveRecommended { length: f64, min: f64, max: f64 },
    #[error("heading change between the tangents is close to a reversal; review the curve parameters")]
    HeadingChangeExcessive,
}

/// Derived guidance values reported alongside validation findings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurveSuggestions {
    pub chord_length: f64,
    pub radius_range: (f64, f64),
    pub stopping_sight_distance: f64,
    pub superelevation: f64,
    pub friction: f64,
    pub label_interval: f64,
    pub spiral_length_range: Option<(f64, f64)>,
    pub min_radius_superelevation: Option<f64>,
}

/// Outcome of [`validate_curve_parameters`]. `ok` is authoritative: it is
/// true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveValidation {
    pub ok: bool,
    pub errors: Vec<CurveError>,
    pub warnings: Vec<CurveWarning>,
    pub suggestions: CurveSuggestions,
}

/// Validates candidate curve parameters between two tangent points.
///
/// Hard errors block construction; warnings are advisory. Any non-finite
/// intermediate collapses into the single generic
/// [`CurveError::NumericalFailure`] entry.
pub fn validate_curve_parameters(
    p_left: Point,
    p_right: Point,
    left_heading: Option<f64>,
    right_heading: Option<f64>,
    curve_type: &str,
    params: CurveParams,
    speed_kmh: f64,
) -> CurveValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = CurveSuggestions::default();

    let chord = distance(p_left, p_right);
    suggestions.chord_length = chord;
    let (r_min, r_max) = recommend_radius_range(chord, speed_kmh);
    suggestions.radius_range = (r_min, r_max);
    suggestions.stopping_sight_distance =
        stopping_sight_distance(speed_kmh, DEFAULT_REACTION_TIME, DEFAULT_DECELERATION);
    suggestions.superelevation = recommend_superelevation(speed_kmh);
    suggestions.friction = recommend_friction(speed_kmh);
    suggestions.label_interval = recommend_label_interval(speed_kmh);

    match CurveKind::parse(curve_type) {
        Some(CurveKind::Arc) => {
            let radius = params.radius;
            if radius <= 0.0 {
                errors.push(CurveError::NonPositiveRadius);
            } else {
                if chord > 2.0 * radius + 1e-9 {
                    errors.push(CurveError::ChordExceedsDiameter { chord, radius });
                }
                if radius < r_min {
                    warnings.push(CurveWarning::RadiusBelowRecommended {
                        radius,
                        min: r_min,
                        max: r_max,
                    });
                }
                if radius > r_max {
                    warnings.push(CurveWarning::RadiusAboveRecommended {
                        radius,
                        min: r_min,
                        max: r_max,
                    });
                }
                let sup_min = min_radius(speed_kmh, None, None);
                suggestions.min_radius_superelevation = Some(sup_min);
                if sup_min.is_finite() && radius < 0.2 * sup_min {
                    warnings.push(CurveWarning::RadiusFarBelowSuperelevationMinimum);
                }
            }
        }
        Some(CurveKind::SpiralArcSpiral) => {
            let radius = params.radius;
            if radius <= 0.0 {
                errors.push(CurveError::NonPositiveRadius);
            } else {
                if chord > 20.0 * radius {
                    warnings.push(CurveWarning::ChordLargeForRadius);
                }
                let (ls_min, ls_max) = recommend_spiral_length_range(radius);
                suggestions.spiral_length_range = Some((ls_min, ls_max));
                let length = params.spiral_length;
                if length <= 0.0 {
                    errors.push(CurveError::NonPositiveSpiralLength);
                } else {
                    if length < ls_min {
                        warnings.push(CurveWarning::SpiralBelowRecommended {
                            length,
                            min: ls_min,
                            max: ls_max,
                        });
                    }
                    if length > ls_max {
                        warnings.push(CurveWarning::SpiralAboveRecommended {
                            length,
                            min: ls_min,
                            max: ls_max,
                        });
                    }
                }
            }
        }
        None => errors.push(CurveError::UnknownCurveType(curve_type.to_string())),
    }

    if let (Some(lh), Some(rh)) = (left_heading, right_heading) {
        let mut dh = (rh - lh).abs();
        while dh > PI {
            dh = (dh - 2.0 * PI).abs();
        }
        if dh > PI * 0.95 {
            warnings.push(CurveWarning::HeadingChangeExcessive);
        }
    }

    let numeric_ok = chord.is_finite()
        && r_min.is_finite()
        && r_max.is_finite()
        && suggestions.stopping_sight_distance.is_finite()
        && suggestions.superelevation.is_finite()
        && suggestions.friction.is_finite();
    if !numeric_ok {
        errors.push(CurveError::NumericalFailure);
    }

    CurveValidation {
        ok: errors.is_empty(),
        errors,
        warnings,
        suggestions,
    }
}
