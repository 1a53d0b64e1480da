//! Part coverage classification.
//!
//! A part counts as well covered when it was detected at least
//! [`GOOD_COVERAGE_THRESHOLD`](crate::models::GOOD_COVERAGE_THRESHOLD) times,
//! either within one inspection or across all records of one vehicle.

use super::GroupKey;
use crate::dataset::InspectionTable;
use crate::models::{Coverage, CoverageSplit, InspectionPartCoverage, PartCoverage, VehicleHeatmap};
use std::collections::BTreeMap;
use tracing::debug;

/// Classify every (inspection, part) group and split into good and poor.
pub fn inspection_part_coverage(table: &InspectionTable) -> CoverageSplit {
    let mut groups: BTreeMap<(GroupKey, GroupKey), usize> = BTreeMap::new();

    for record in table.records() {
        if let (Some(id), Some(part)) = (record.inspection_id, record.part_detected) {
            *groups
                .entry((GroupKey::new(id), GroupKey::new(part)))
                .or_default() += 1;
        }
    }

    let all: Vec<InspectionPartCoverage> = groups
        .into_iter()
        .map(|((id, part), count)| InspectionPartCoverage {
            inspection_id: id.as_str().to_string(),
            part: part.as_str().to_string(),
            count,
            coverage: Coverage::classify(count),
        })
        .collect();

    let (good, poor): (Vec<_>, Vec<_>) = all
        .iter()
        .cloned()
        .partition(|group| group.coverage == Coverage::Good);

    CoverageSplit { all, good, poor }
}

/// Part coverage for a single vehicle, for the coverage heatmap.
///
/// A vehicle with no records yields an empty heatmap.
pub fn vehicle_part_coverage(table: &InspectionTable, vehicle_id: &str) -> VehicleHeatmap {
    let mut parts: BTreeMap<GroupKey, usize> = BTreeMap::new();

    for record in table.records() {
        if record.vehicle_id != Some(vehicle_id) {
            continue;
        }
        if let Some(part) = record.part_detected {
            *parts.entry(GroupKey::new(part)).or_default() += 1;
        }
    }

    if parts.is_empty() {
        debug!("No detected parts for vehicle {}", vehicle_id);
    }

    VehicleHeatmap {
        vehicle_id: vehicle_id.to_string(),
        parts: parts
            .into_iter()
            .map(|(part, count)| PartCoverage {
                part: part.as_str().to_string(),
                count,
                coverage: Coverage::classify(count),
            })
            .collect(),
    }
}
