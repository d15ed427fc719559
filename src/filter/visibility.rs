use super::PropertyIndex;
use crate::data::DamRecord;
use crate::map::GeoBounds;

/// Per-record shown flags. Records start shown and only mutate in
/// group-sized batches keyed by (property key, value), so a toggle is
/// atomic with respect to the group it affects.
pub struct VisibilityStore {
    shown: Vec<bool>,
}

impl VisibilityStore {
    pub fn all_shown(len: usize) -> Self {
        Self {
            shown: vec![true; len],
        }
    }

    pub fn is_shown(&self, id: usize) -> bool {
        self.shown.get(id).copied().unwrap_or(false)
    }

    /// Number of records currently shown anywhere on the map.
    pub fn shown_count(&self) -> usize {
        self.shown.iter().filter(|&&flag| flag).count()
    }

    /// Show or hide every record in one (key, value) group and return the
    /// group size for logging. Setting an already-matching flag is a
    /// no-op per record. An unknown pair affects nothing and reports zero.
    pub fn set_group_visible(
        &mut self,
        index: &PropertyIndex,
        key: &str,
        value: &str,
        visible: bool,
    ) -> usize {
        let Some(group) = index.group(key, value) else {
            return 0;
        };
        for &id in group {
            if let Some(flag) = self.shown.get_mut(id) {
                *flag = visible;
            }
        }
        group.len()
    }
}

/// Count shown records whose position falls inside `bounds`, boundary
/// inclusive. Pure full recount; runs on every visibility or viewport
/// change rather than keeping incremental state.
pub fn count_within(records: &[DamRecord], store: &VisibilityStore, bounds: &GeoBounds) -> usize {
    records
        .iter()
        .filter(|record| store.is_shown(record.id) && bounds.contains(record.lon, record.lat))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset_from;

    const KEYS: &[&str] = &["RISK_LEVEL"];

    fn fixture() -> Vec<DamRecord> {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature",
                  "geometry": { "type": "Point", "coordinates": [-123.1, 48.1] },
                  "properties": { "RISK_LEVEL": "High" } },
                { "type": "Feature",
                  "geometry": { "type": "Point", "coordinates": [-123.2, 48.2] },
                  "properties": { "RISK_LEVEL": "Low" } },
                { "type": "Feature",
                  "geometry": { "type": "Point", "coordinates": [-140.0, 60.0] },
                  "properties": { "RISK_LEVEL": "High" } }
            ]
        }"#;
        dataset_from(geojson.parse().unwrap()).unwrap().records
    }

    fn island_bounds() -> GeoBounds {
        GeoBounds {
            min_lon: -124.0,
            min_lat: 48.0,
            max_lon: -123.0,
            max_lat: 49.0,
        }
    }

    #[test]
    fn toggle_off_then_on_restores_flags() {
        let records = fixture();
        let index = PropertyIndex::build(&records, KEYS);
        let mut store = VisibilityStore::all_shown(records.len());

        let before: Vec<bool> = (0..records.len()).map(|id| store.is_shown(id)).collect();
        assert_eq!(store.set_group_visible(&index, "RISK_LEVEL", "High", false), 2);
        assert_eq!(store.shown_count(), 1);
        assert_eq!(store.set_group_visible(&index, "RISK_LEVEL", "High", true), 2);
        let after: Vec<bool> = (0..records.len()).map(|id| store.is_shown(id)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn unknown_group_is_a_noop_reporting_zero() {
        let records = fixture();
        let index = PropertyIndex::build(&records, KEYS);
        let mut store = VisibilityStore::all_shown(records.len());
        assert_eq!(
            store.set_group_visible(&index, "RISK_LEVEL", "Very High", false),
            0
        );
        assert_eq!(
            store.set_group_visible(&index, "SPILLWAY_TYPE", "Open", false),
            0
        );
        assert_eq!(store.shown_count(), records.len());
    }

    #[test]
    fn count_is_inclusive_of_the_boundary() {
        let records = fixture();
        let store = VisibilityStore::all_shown(records.len());
        let bounds = GeoBounds {
            min_lon: -123.1,
            min_lat: 48.1,
            max_lon: -123.1,
            max_lat: 48.1,
        };
        assert_eq!(count_within(&records, &store, &bounds), 1);
    }

    #[test]
    fn count_is_monotone_under_bounds_expansion() {
        let records = fixture();
        let store = VisibilityStore::all_shown(records.len());
        let narrow = island_bounds();
        let wide = GeoBounds {
            min_lon: -150.0,
            min_lat: 40.0,
            max_lon: -100.0,
            max_lat: 70.0,
        };
        let narrow_count = count_within(&records, &store, &narrow);
        let wide_count = count_within(&records, &store, &wide);
        assert!(wide_count >= narrow_count);
        assert_eq!(narrow_count, 2);
        assert_eq!(wide_count, 3);
    }

    #[test]
    fn hiding_a_group_drops_count_by_its_members_inside_the_box() {
        let records = fixture();
        let index = PropertyIndex::build(&records, KEYS);
        let mut store = VisibilityStore::all_shown(records.len());
        let bounds = island_bounds();

        // "High" has two members but only one inside the island box.
        let before = count_within(&records, &store, &bounds);
        store.set_group_visible(&index, "RISK_LEVEL", "High", false);
        let after = count_within(&records, &store, &bounds);
        assert_eq!(before - after, 1);
    }
}
