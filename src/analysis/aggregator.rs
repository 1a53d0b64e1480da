//! Counting aggregations over the inspection table.
//!
//! Missing values, vehicles per date, part frequency, per-vehicle part
//! counts and per-vehicle inspection frequency.

use super::GroupKey;
use crate::dataset::InspectionTable;
use crate::models::{
    max_ties, min_ties, DateVehicleCount, InspectionCountMode, InspectionFrequency, LabelCount,
    MissingCount, PartFrequency, VehicleCoverage,
};
use std::collections::{BTreeMap, HashSet};

/// Count null entries per column, in header order.
pub fn missing_value_summary(table: &InspectionTable) -> Vec<MissingCount> {
    let mut missing = vec![0usize; table.headers().len()];

    for row in table.rows() {
        for (i, slot) in missing.iter_mut().enumerate() {
            if row.get(i).map_or(true, |c| c.is_none()) {
                *slot += 1;
            }
        }
    }

    table
        .headers()
        .iter()
        .zip(missing)
        .map(|(column, missing)| MissingCount {
            column: column.clone(),
            missing,
        })
        .collect()
}

/// Number of distinct vehicles inspected on each date.
///
/// Rows without a date are skipped; null vehicle IDs are not counted.
pub fn vehicles_inspected_by_date(table: &InspectionTable) -> Vec<DateVehicleCount> {
    let mut by_date: BTreeMap<GroupKey, HashSet<&str>> = BTreeMap::new();

    for record in table.records() {
        let Some(date) = record.inspection_date else {
            continue;
        };
        let vehicles = by_date.entry(GroupKey::new(date)).or_default();
        if let Some(vehicle) = record.vehicle_id {
            vehicles.insert(vehicle);
        }
    }

    by_date
        .into_iter()
        .map(|(date, vehicles)| DateVehicleCount {
            date: date.as_str().to_string(),
            vehicles: vehicles.len(),
        })
        .collect()
}

/// How often each part was detected, most frequent first.
pub fn part_frequency(table: &InspectionTable) -> PartFrequency {
    let parts = rank_counts(table.records().filter_map(|r| r.part_detected));
    PartFrequency { parts }
}

/// Number of detected parts per vehicle across all its inspections.
pub fn vehicle_part_counts(table: &InspectionTable) -> VehicleCoverage {
    let mut by_vehicle: BTreeMap<GroupKey, usize> = BTreeMap::new();

    for record in table.records() {
        if let Some(vehicle) = record.vehicle_id {
            let count = by_vehicle.entry(GroupKey::new(vehicle)).or_default();
            if record.part_detected.is_some() {
                *count += 1;
            }
        }
    }

    let vehicles: Vec<LabelCount> = by_vehicle
        .into_iter()
        .map(|(vehicle, count)| LabelCount::new(vehicle.as_str(), count))
        .collect();

    VehicleCoverage {
        thorough: max_ties(&vehicles),
        poor: min_ties(&vehicles),
        vehicles,
    }
}

/// How many times each vehicle was inspected, most inspected first.
pub fn inspection_frequency(
    table: &InspectionTable,
    mode: InspectionCountMode,
) -> InspectionFrequency {
    let vehicles = match mode {
        InspectionCountMode::Rows => rank_counts(table.records().filter_map(|r| r.vehicle_id)),
        InspectionCountMode::Distinct => {
            let mut inspections: BTreeMap<GroupKey, HashSet<&str>> = BTreeMap::new();
            for record in table.records() {
                if let Some(vehicle) = record.vehicle_id {
                    let ids = inspections.entry(GroupKey::new(vehicle)).or_default();
                    if let Some(id) = record.inspection_id {
                        ids.insert(id);
                    }
                }
            }
            sort_descending(
                inspections
                    .into_iter()
                    .map(|(vehicle, ids)| LabelCount::new(vehicle.as_str(), ids.len()))
                    .collect(),
            )
        }
    };

    InspectionFrequency {
        mode,
        most: max_ties(&vehicles),
        least: min_ties(&vehicles),
        vehicles,
    }
}

/// Count occurrences of each label and rank them by count.
fn rank_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut counts: BTreeMap<GroupKey, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(GroupKey::new(label)).or_default() += 1;
    }

    sort_descending(
        counts
            .into_iter()
            .map(|(label, count)| LabelCount::new(label.as_str(), count))
            .collect(),
    )
}

/// Stable descending sort; equal counts keep their key order.
fn sort_descending(mut counts: Vec<LabelCount>) -> Vec<LabelCount> {
    counts.sort_by_key(|c| std::cmp::Reverse(c.count));
    counts
}
