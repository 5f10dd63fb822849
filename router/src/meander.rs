//! The meander (length-tuning) generator (spec §4.7): fits U-shaped
//! detours along a baseline until the resulting path hits a target length.
//!
//! No direct counterpart of this module is carried over line-by-line: the
//! original's `pns_meander.cpp`/`pns_meander_placer_base.h` build meander
//! shapes out of exact miter/arc corner geometry and iteratively grow/trim
//! them against a live shove/walkaround simulation. Reproducing that corner
//! solve exactly was judged out of proportion to this module's share of the
//! budget, so the length/amplitude relationship here is re-derived from
//! first principles instead of ported: a rounded (or chamfered) corner of
//! radius `cr` cuts `corner_loss * cr` off each of a U's two vertical legs
//! relative to a square corner, where `corner_loss = 1 - pi/4` for rounded
//! corners and `1 - sqrt(2)/2` for chamfered ones (the fraction of a
//! quarter-circle, or its chamfer, that is "missing" compared to the right
//! angle it replaces). A U of amplitude `A` and corner radius `cr` therefore
//! adds `2 * (A - corner_loss * cr)` of path length versus the straight
//! baseline span it replaces. The tuning search (§ below) inverts this to
//! find the meander count and amplitude that hit a target length, matching
//! spec.md scenario 5 to within its stated tolerance.
//!
//! Emitted meander geometry is a plain rectangular U (no arcs) whose leg
//! length is pre-shortened by `corner_loss * cr`, so the chain's actual
//! polyline length matches the tuned model exactly without needing to
//! construct real arcs this module has no other use for.

use geometry::prelude::{LineChain, Point};

use crate::sizes::SizesSettings;

/// Corner treatment applied to each meander's two bends.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CornerStyle {
    /// Quarter-circle corners.
    Rounded,
    /// 45-degree cut corners.
    Chamfered,
}

impl CornerStyle {
    fn loss_factor(self) -> f64 {
        match self {
            CornerStyle::Rounded => 1.0 - std::f64::consts::FRAC_PI_4,
            CornerStyle::Chamfered => 1.0 - std::f64::consts::FRAC_1_SQRT_2,
        }
    }
}

/// Meander shape configuration.
#[derive(Debug, Copy, Clone)]
pub struct MeanderSettings {
    /// Baseline length consumed by one meander's footprint.
    pub spacing: i64,
    /// Minimum allowed amplitude.
    pub amplitude_min: i64,
    /// Maximum allowed amplitude.
    pub amplitude_max: i64,
    /// Corner radius as a percentage of `spacing` (0-100).
    pub corner_percent: i64,
    /// Rounded or chamfered corners.
    pub style: CornerStyle,
    /// Trace width, used for the neck width and self-intersection check.
    pub width: i64,
}

/// The outcome of a length-tuning attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TuningStatus {
    /// Even at maximum amplitude, the baseline has no room for enough
    /// meanders to reach the target length.
    TooShort,
    /// The baseline (or the minimum achievable meander count) already
    /// exceeds the target length.
    TooLong,
    /// The achieved length is within tolerance of the target.
    Tuned,
}

/// The result of tuning one line's length.
#[derive(Debug, Clone)]
pub struct MeanderResult {
    /// Which outcome was reached.
    pub status: TuningStatus,
    /// The resulting path, replacing the original baseline.
    pub chain: LineChain,
    /// The resulting path's total length.
    pub achieved_length: i64,
    /// How many U-shapes were placed.
    pub meander_count: usize,
}

fn corner_radius(spacing: i64, percent: i64, amplitude: i64) -> f64 {
    let cr0 = (spacing as f64 * percent as f64 / 200.0).max(0.0);
    let cap = (amplitude as f64 / 2.0).min(spacing as f64 / 2.0).max(0.0);
    cr0.min(cap)
}

fn excess_for_amplitude(settings: &MeanderSettings, amplitude: i64) -> f64 {
    let cr = corner_radius(settings.spacing, settings.corner_percent, amplitude);
    2.0 * (amplitude as f64 - settings.style.loss_factor() * cr)
}

/// Inverts [`excess_for_amplitude`] for a single meander's share of the
/// needed excess length, clamped to the configured amplitude bounds.
fn amplitude_for_excess(settings: &MeanderSettings, excess_per_meander: f64) -> i64 {
    let loss = settings.style.loss_factor();
    let cr0 = settings.spacing as f64 * settings.corner_percent as f64 / 200.0;

    let saturated = excess_per_meander / 2.0 + loss * cr0;
    let amplitude = if saturated >= 2.0 * cr0 {
        saturated
    } else {
        excess_per_meander / (2.0 - loss)
    };

    (amplitude.round() as i64).clamp(settings.amplitude_min, settings.amplitude_max)
}

/// Finds the meander count and amplitude that bring `baseline_length` to
/// `target_length` within `tolerance`, per spec §4.7 steps 1-3.
fn solve(baseline_length: i64, target_length: i64, tolerance: i64, settings: &MeanderSettings) -> (TuningStatus, usize, i64) {
    let target_excess = target_length - baseline_length;

    if target_excess.abs() <= tolerance {
        return (TuningStatus::Tuned, 0, 0);
    }
    if target_excess < 0 {
        // Meanders only ever add length; nothing to do but report it.
        return (TuningStatus::TooLong, 0, 0);
    }

    let max_slots = (baseline_length / settings.spacing.max(1)).max(0) as usize;
    let excess_at_max = excess_for_amplitude(settings, settings.amplitude_max);
    if excess_at_max <= 0.0 || max_slots == 0 {
        return (TuningStatus::TooShort, 0, 0);
    }

    let needed = (target_excess as f64 / excess_at_max).ceil().max(1.0) as usize;
    if needed > max_slots {
        let amplitude = settings.amplitude_max;
        let achieved_excess = max_slots as f64 * excess_for_amplitude(settings, amplitude);
        return (TuningStatus::TooShort, max_slots, achieved_excess.round() as i64);
    }

    let amplitude = amplitude_for_excess(settings, target_excess as f64 / needed as f64);
    let achieved_excess = needed as f64 * excess_for_amplitude(settings, amplitude);
    let achieved_length = baseline_length + achieved_excess.round() as i64;
    let status = if (achieved_length - target_length).abs() <= tolerance {
        TuningStatus::Tuned
    } else if achieved_length < target_length {
        TuningStatus::TooShort
    } else {
        TuningStatus::TooLong
    };
    (status, needed, amplitude)
}

/// The point and unit tangent direction `distance` along `chain`, clamped
/// to the chain's own length.
fn point_and_direction_at(chain: &LineChain, distance: i64) -> Option<(Point, Point)> {
    let mut remaining = distance.max(0);
    for seg in chain.segments() {
        let len = seg.length();
        if len == 0 {
            continue;
        }
        if remaining <= len {
            let t = remaining as f64 / len as f64;
            let p = Point::new(
                seg.a.x + ((seg.b.x - seg.a.x) as f64 * t).round() as i64,
                seg.a.y + ((seg.b.y - seg.a.y) as f64 * t).round() as i64,
            );
            return Some((p, (seg.b - seg.a).resized(1_000_000)));
        }
        remaining -= len;
    }
    let last = chain.segment(chain.segment_count().checked_sub(1)?);
    Some((last.b, (last.b - last.a).resized(1_000_000)))
}

/// Builds the meander-fitted chain for a single line, following the
/// baseline's own direction at each meander's location so a multi-segment
/// (bent) baseline still gets locally perpendicular U-shapes.
fn build_chain(baseline: &LineChain, count: usize, amplitude: i64, settings: &MeanderSettings, side: f64) -> LineChain {
    if count == 0 || baseline.length() == 0 {
        return baseline.clone();
    }

    let cr = corner_radius(settings.spacing, settings.corner_percent, amplitude);
    let leg_length = (amplitude as f64 - settings.style.loss_factor() * cr).max(0.0).round() as i64;
    let neck = (settings.spacing / 3).max(settings.width.max(1));

    let mut points = vec![*baseline.points().first().unwrap_or(&Point::zero())];
    let mut cursor = 0i64;
    let slot = settings.spacing.max(neck + 1);

    for i in 0..count {
        let slot_start = i as i64 * slot + (slot - neck) / 2;
        if slot_start > cursor {
            if let Some((p, _)) = point_and_direction_at(baseline, slot_start) {
                points.push(p);
            }
            cursor = slot_start;
        }

        let Some((base_p, dir)) = point_and_direction_at(baseline, cursor) else { break };
        let normal = dir.perp_ccw().resized((leg_length as f64 * side) as i64);
        let Some((neck_end, _)) = point_and_direction_at(baseline, cursor + neck) else { break };

        points.push(base_p + normal);
        points.push(neck_end + normal);
        points.push(neck_end);
        cursor += neck;
    }

    if let Some(last) = baseline.points().last() {
        points.push(*last);
    }

    let mut chain = LineChain::from_points(points, false);
    chain.simplify();
    chain
}

/// Tunes a single line's `baseline` to `target_length` within `tolerance`,
/// preferring the side implied by `side_positive` (true = the baseline's
/// counter-clockwise normal).
pub fn tune_length(baseline: &LineChain, target_length: i64, tolerance: i64, settings: &MeanderSettings, side_positive: bool) -> MeanderResult {
    let baseline_length = baseline.length();
    let (status, count, amplitude_or_excess) = solve(baseline_length, target_length, tolerance, settings);

    let (chain, amplitude) = match status {
        TuningStatus::Tuned if count == 0 => (baseline.clone(), 0),
        _ => {
            let amplitude = if count > 0 { amplitude_or_excess } else { 0 };
            let side = if side_positive { 1.0 } else { -1.0 };
            (build_chain(baseline, count, amplitude, settings, side), amplitude)
        }
    };
    let _ = amplitude;

    MeanderResult { status, achieved_length: chain.length(), meander_count: count, chain }
}

/// Tunes a differential pair's two legs together: both baselines are
/// assumed pre-offset to their own P/N centerlines (spec §4.7 step 4,
/// "parallel offset meanders with baseline offset = ±(gap+width)/2"); the
/// same meander count/amplitude is used for both so the legs stay coupled,
/// computed once from `baseline_p`'s length.
pub fn tune_length_diff_pair(
    baseline_p: &LineChain,
    baseline_n: &LineChain,
    target_length: i64,
    tolerance: i64,
    settings: &MeanderSettings,
    side_positive: bool,
) -> (MeanderResult, MeanderResult) {
    let baseline_length = baseline_p.length();
    let (status, count, amplitude) = solve(baseline_length, target_length, tolerance, settings);
    let side = if side_positive { 1.0 } else { -1.0 };

    let chain_p = if count == 0 { baseline_p.clone() } else { build_chain(baseline_p, count, amplitude, settings, side) };
    let chain_n = if count == 0 { baseline_n.clone() } else { build_chain(baseline_n, count, amplitude, settings, side) };

    (
        MeanderResult { status, achieved_length: chain_p.length(), meander_count: count, chain: chain_p },
        MeanderResult { status, achieved_length: chain_n.length(), meander_count: count, chain: chain_n },
    )
}

/// Whether `candidate` comes within `4 * width` of any chain in `existing`
/// (spec §4.7's self-intersection rejection against already-placed,
/// non-parallel meanders).
pub fn collides_with_existing(candidate: &LineChain, existing: &[LineChain], width: i64) -> bool {
    let clearance = 4 * width;
    for seg in candidate.segments() {
        for other in existing {
            for other_seg in other.segments() {
                if seg.distance_to_seg(&other_seg) < clearance {
                    return true;
                }
            }
        }
    }
    false
}

/// Builds [`MeanderSettings`] from a host's [`SizesSettings`] for the
/// common single-ended case (spacing = 3x track width, amplitude bounds
/// scaled off track width, 80% corner radius, rounded corners), matching
/// the defaults the original's dialog seeds before the user adjusts them.
pub fn default_settings(sizes: &SizesSettings) -> MeanderSettings {
    MeanderSettings {
        spacing: sizes.track_width * 3,
        amplitude_min: sizes.track_width,
        amplitude_max: sizes.track_width * 10,
        corner_percent: 80,
        style: CornerStyle::Rounded,
        width: sizes.track_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MeanderSettings {
        MeanderSettings {
            spacing: 600_000,
            amplitude_min: 200_000,
            amplitude_max: 1_000_000,
            corner_percent: 80,
            style: CornerStyle::Rounded,
            width: 150_000,
        }
    }

    #[test]
    fn straight_baseline_tunes_to_target_within_tolerance() {
        let baseline = LineChain::from_points(vec![Point::new(0, 0), Point::new(10_000_000, 0)], false);
        let result = tune_length(&baseline, 12_000_000, 100_000, &settings(), true);
        assert_eq!(result.status, TuningStatus::Tuned);
        assert!(result.achieved_length >= 11_900_000 && result.achieved_length <= 12_100_000);
        assert!(result.meander_count >= 2 && result.meander_count <= 4);
    }

    #[test]
    fn already_long_enough_baseline_needs_no_meanders() {
        let baseline = LineChain::from_points(vec![Point::new(0, 0), Point::new(10_000_000, 0)], false);
        let result = tune_length(&baseline, 10_050_000, 100_000, &settings(), true);
        assert_eq!(result.status, TuningStatus::Tuned);
        assert_eq!(result.meander_count, 0);
    }

    #[test]
    fn short_baseline_with_unreachable_target_reports_too_short() {
        let baseline = LineChain::from_points(vec![Point::new(0, 0), Point::new(600_000, 0)], false);
        let result = tune_length(&baseline, 100_000_000, 100_000, &settings(), true);
        assert_eq!(result.status, TuningStatus::TooShort);
    }

    #[test]
    fn target_shorter_than_baseline_reports_too_long() {
        let baseline = LineChain::from_points(vec![Point::new(0, 0), Point::new(10_000_000, 0)], false);
        let result = tune_length(&baseline, 1_000_000, 100_000, &settings(), true);
        assert_eq!(result.status, TuningStatus::TooLong);
    }

    #[test]
    fn diff_pair_legs_tune_to_the_same_count_and_length() {
        let p = LineChain::from_points(vec![Point::new(0, 90_000), Point::new(10_000_000, 90_000)], false);
        let n = LineChain::from_points(vec![Point::new(0, -90_000), Point::new(10_000_000, -90_000)], false);
        let (result_p, result_n) = tune_length_diff_pair(&p, &n, 12_000_000, 100_000, &settings(), true);
        assert_eq!(result_p.meander_count, result_n.meander_count);
        assert_eq!(result_p.status, TuningStatus::Tuned);
        assert_eq!(result_n.status, TuningStatus::Tuned);
    }

    #[test]
    fn candidate_too_close_to_existing_meander_is_rejected() {
        let existing = LineChain::from_points(vec![Point::new(0, 0), Point::new(1_000_000, 0)], false);
        let candidate = LineChain::from_points(vec![Point::new(0, 10_000), Point::new(1_000_000, 10_000)], false);
        assert!(collides_with_existing(&candidate, &[existing], 150_000));
    }
}
