//! Track/via/diff-pair sizing configuration consumed by the placers.
//!
//! Defaults match the original router's `SIZES_SETTINGS` so that a board
//! imported from a host carrying the same defaults produces identical
//! traces.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Via type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViaType {
    /// Spans the full layer stack.
    Through,
    /// Spans from an outer layer to an inner layer.
    Blind,
    /// Spans between two inner layers.
    Buried,
    /// A small via confined to adjacent layers only.
    Micro,
}

/// What happens to a via's copper on layers it no longer connects to after
/// a routing edit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnconnectedLayerRemoval {
    /// Keep copper on every layer in the via's stack regardless of
    /// connectivity.
    Never,
    /// Remove copper on layers the via no longer connects to.
    Always,
    /// Remove only on layers outside the via's connected span.
    OutsideSpanOnly,
}

/// Sizing configuration consumed by the line placer, dragger and diff-pair
/// placer. Builder-style setters are provided for the via stackup, which has
/// many optional fields; simple scalar settings use plain setters.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct SizesSettings {
    /// The clearance currently in effect for new traces, in internal units.
    #[builder(default = "155_000")]
    pub clearance: i64,

    /// The board-wide minimum clearance floor; `clearance` may never be
    /// set below this by the placer.
    #[builder(default = "50_000")]
    pub min_clearance: i64,

    /// The track width used for new segments.
    #[builder(default = "155_000")]
    pub track_width: i64,

    /// Whether `track_width` was explicitly chosen by the user this
    /// interaction (vs. inherited from the net class default).
    #[builder(default = "false")]
    pub track_width_is_explicit: bool,

    /// The board-wide minimum track width floor.
    #[builder(default = "100_000")]
    pub board_min_track_width: i64,

    /// The diameter of a newly placed via.
    #[builder(default = "600_000")]
    pub via_diameter: i64,

    /// The drill diameter of a newly placed via.
    #[builder(default = "250_000")]
    pub via_drill: i64,

    /// The via type to place.
    #[builder(default = "ViaType::Through")]
    pub via_type: ViaType,

    /// Hole-to-hole clearance, applied between any two drilled holes
    /// regardless of net.
    #[builder(default = "250_000")]
    pub hole_to_hole: i64,

    /// What to do with a via's copper on layers it stops connecting to.
    #[builder(default = "UnconnectedLayerRemoval::Never")]
    pub unconnected_layer_removal: UnconnectedLayerRemoval,

    /// Differential-pair trace width.
    #[builder(default = "125_000")]
    pub diff_pair_width: i64,

    /// Differential-pair copper-to-copper gap.
    #[builder(default = "180_000")]
    pub diff_pair_gap: i64,

    /// Differential-pair via-to-via gap. When `diff_pair_via_gap_is_bound`
    /// is set, this is kept equal to `diff_pair_gap` rather than
    /// independently editable.
    #[builder(default = "180_000")]
    pub diff_pair_via_gap: i64,

    /// Whether `diff_pair_via_gap` tracks `diff_pair_gap` automatically.
    #[builder(default = "true")]
    pub diff_pair_via_gap_is_bound: bool,
}

impl Default for SizesSettings {
    fn default() -> Self {
        SizesSettingsBuilder::default()
            .build()
            .expect("all fields carry defaults")
    }
}

impl SizesSettings {
    /// The UI-facing "source" string for a given size field (e.g. "netclass
    /// default", "board minimum", "user override"), used to explain where a
    /// value came from. The core never interprets these beyond storing and
    /// returning them.
    pub fn source_for(&self, field: SizeField) -> &'static str {
        match field {
            SizeField::Clearance => "net class",
            SizeField::TrackWidth => {
                if self.track_width_is_explicit {
                    "user override"
                } else {
                    "net class"
                }
            }
            SizeField::ViaDiameter | SizeField::ViaDrill => "net class",
            SizeField::DiffPairWidth | SizeField::DiffPairGap | SizeField::DiffPairViaGap => {
                "differential pair net class"
            }
        }
    }

    /// Sets `diff_pair_via_gap`, respecting the bound-to-trace-gap flag.
    pub fn set_diff_pair_gap(&mut self, gap: i64) {
        self.diff_pair_gap = gap;
        if self.diff_pair_via_gap_is_bound {
            self.diff_pair_via_gap = gap;
        }
    }
}

/// A sizing field, used only to key [`SizesSettings::source_for`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SizeField {
    /// See [`SizesSettings::clearance`].
    Clearance,
    /// See [`SizesSettings::track_width`].
    TrackWidth,
    /// See [`SizesSettings::via_diameter`].
    ViaDiameter,
    /// See [`SizesSettings::via_drill`].
    ViaDrill,
    /// See [`SizesSettings::diff_pair_width`].
    DiffPairWidth,
    /// See [`SizesSettings::diff_pair_gap`].
    DiffPairGap,
    /// See [`SizesSettings::diff_pair_via_gap`].
    DiffPairViaGap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_router_constants() {
        let sizes = SizesSettings::default();
        assert_eq!(sizes.track_width, 155_000);
        assert_eq!(sizes.via_diameter, 600_000);
        assert_eq!(sizes.via_drill, 250_000);
        assert_eq!(sizes.diff_pair_width, 125_000);
        assert_eq!(sizes.diff_pair_gap, 180_000);
    }

    #[test]
    fn bound_via_gap_follows_trace_gap() {
        let mut sizes = SizesSettings::default();
        sizes.set_diff_pair_gap(200_000);
        assert_eq!(sizes.diff_pair_via_gap, 200_000);
    }

    #[test]
    fn unbound_via_gap_stays_independent() {
        let mut sizes = SizesSettings::default();
        sizes.diff_pair_via_gap_is_bound = false;
        sizes.set_diff_pair_gap(200_000);
        assert_eq!(sizes.diff_pair_via_gap, 180_000);
    }
}
