use geojson::{GeoJson, Geometry, JsonObject, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bucket label for records missing a value for an indexed key.
pub const SENTINEL: &str = "❓";

/// Build-time location of the dam feature collection.
pub const DATA_PATH: &str = "data/WRIS_DAMS_PUBLIC_SVW.geojson";

/// Fatal load failures. Any of these halts initialization; the session
/// keeps running so the log pane stays readable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse {} as GeoJSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: geojson::Error,
    },
    #[error("{} is not a feature collection", path.display())]
    NotACollection { path: PathBuf },
}

/// One dam feature: a marker position plus its flat property mapping.
/// Immutable after load.
#[derive(Debug, Clone)]
pub struct DamRecord {
    pub id: usize,
    pub lon: f64,
    pub lat: f64,
    props: BTreeMap<String, String>,
}

impl DamRecord {
    /// Property value for `key`. Absent and empty values both resolve to
    /// the sentinel, so every record classifies under every indexed key.
    pub fn value_for(&self, key: &str) -> &str {
        match self.props.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => SENTINEL,
        }
    }

    /// All stored properties in display (sorted-key) order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn property_count(&self) -> usize {
        self.props.len()
    }

    pub fn name(&self) -> &str {
        self.value_for("DAM_NAME")
    }
}

/// A parsed feature collection: its declared name plus the flattened records.
#[derive(Debug)]
pub struct Dataset {
    pub name: String,
    pub records: Vec<DamRecord>,
}

/// Read and parse the feature collection at `path`. No retry and no
/// partial load: the first failure is returned as-is.
pub fn load_dams(path: &Path) -> Result<Dataset, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = content.parse().map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    dataset_from(geojson).ok_or_else(|| LoadError::NotACollection {
        path: path.to_path_buf(),
    })
}

/// Flatten a parsed GeoJSON document into records. Returns `None` when the
/// document is not a feature collection. Features without usable geometry
/// are skipped; record ids are assigned in feature order.
pub fn dataset_from(geojson: GeoJson) -> Option<Dataset> {
    let fc = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return None,
    };

    let name = fc
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("name"))
        .and_then(|value| value.as_str())
        .unwrap_or("unnamed collection")
        .to_string();

    let mut records = Vec::with_capacity(fc.features.len());
    for feature in fc.features {
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        let Some((lon, lat)) = geometry_center(geometry) else {
            continue;
        };
        let id = records.len();
        records.push(DamRecord {
            id,
            lon,
            lat,
            props: flatten_properties(feature.properties.as_ref()),
        });
    }

    Some(Dataset { name, records })
}

/// Marker position for a feature: the center of its geometry's bounding
/// box, so line and polygon dams get a sensible point too.
fn geometry_center(geometry: &Geometry) -> Option<(f64, f64)> {
    let mut extent = Extent::new();
    extend_extent(&mut extent, &geometry.value);
    extent.center()
}

struct Extent {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl Extent {
    fn new() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, position: &[f64]) {
        if position.len() >= 2 {
            self.min_lon = self.min_lon.min(position[0]);
            self.max_lon = self.max_lon.max(position[0]);
            self.min_lat = self.min_lat.min(position[1]);
            self.max_lat = self.max_lat.max(position[1]);
        }
    }

    fn center(&self) -> Option<(f64, f64)> {
        if self.min_lon.is_finite() {
            Some((
                (self.min_lon + self.max_lon) / 2.0,
                (self.min_lat + self.max_lat) / 2.0,
            ))
        } else {
            None
        }
    }
}

fn extend_extent(extent: &mut Extent, value: &Value) {
    match value {
        Value::Point(position) => extent.add(position),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            for position in positions {
                extent.add(position);
            }
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            for line in lines {
                for position in line {
                    extent.add(position);
                }
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                for ring in rings {
                    for position in ring {
                        extent.add(position);
                    }
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                extend_extent(extent, &geometry.value);
            }
        }
    }
}

/// Stringify the feature's property mapping. Nulls are dropped (they read
/// as absent), everything else keeps its JSON display form.
fn flatten_properties(props: Option<&JsonObject>) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    if let Some(props) = props {
        for (key, value) in props {
            let text = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            flat.insert(key.clone(), text);
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "type": "FeatureCollection",
        "name": "WRIS_DAMS_PUBLIC_SVW",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-123.5, 48.5] },
                "properties": { "DAM_NAME": "ALPHA", "RISK_LEVEL": "High", "COMMISSIONED_YEAR": 1957 }
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-124.0, 48.0], [-123.0, 48.0], [-123.0, 49.0], [-124.0, 49.0], [-124.0, 48.0]]]
                },
                "properties": { "DAM_NAME": "BETA", "RISK_LEVEL": "", "DAM_OWNER": null }
            }
        ]
    }"#;

    #[test]
    fn parses_collection_name_and_records() {
        let dataset = dataset_from(FIXTURE.parse().unwrap()).unwrap();
        assert_eq!(dataset.name, "WRIS_DAMS_PUBLIC_SVW");
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.records[0].name(), "ALPHA");
    }

    #[test]
    fn polygon_features_get_bbox_center() {
        let dataset = dataset_from(FIXTURE.parse().unwrap()).unwrap();
        let beta = &dataset.records[1];
        assert!((beta.lon - -123.5).abs() < 1e-9);
        assert!((beta.lat - 48.5).abs() < 1e-9);
    }

    #[test]
    fn numbers_stringify_and_nulls_read_as_absent() {
        let dataset = dataset_from(FIXTURE.parse().unwrap()).unwrap();
        assert_eq!(dataset.records[0].value_for("COMMISSIONED_YEAR"), "1957");
        assert_eq!(dataset.records[1].value_for("DAM_OWNER"), SENTINEL);
    }

    #[test]
    fn empty_values_resolve_to_sentinel() {
        let dataset = dataset_from(FIXTURE.parse().unwrap()).unwrap();
        assert_eq!(dataset.records[1].value_for("RISK_LEVEL"), SENTINEL);
    }

    #[test]
    fn non_collection_payload_is_rejected() {
        let geojson: GeoJson = r#"{ "type": "Point", "coordinates": [0.0, 0.0] }"#
            .parse()
            .unwrap();
        assert!(dataset_from(geojson).is_none());
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let err = load_dams(Path::new("data/does-not-exist.geojson")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
