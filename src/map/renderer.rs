use crate::braille::BrailleCanvas;
use crate::data::DamRecord;
use crate::filter::VisibilityStore;
use crate::map::geometry::{draw_circle, draw_marker};
use crate::map::projection::Viewport;

/// How close a click must land to a marker, in Braille pixels.
const PICK_RADIUS: i32 = 4;

/// Marker layer produced for one frame: the dot canvas plus character-cell
/// glyph overlays for the highlighted marker.
pub struct MarkerLayer {
    pub canvas: BrailleCanvas,
    pub glyphs: Vec<(u16, u16, char)>,
}

/// Plot every shown record onto a fresh canvas sized `cols` x `rows`
/// character cells. The record behind the open popup gets a filled circle
/// and a diamond glyph instead of a plain cross.
pub fn render_markers(
    records: &[DamRecord],
    store: &VisibilityStore,
    viewport: &Viewport,
    highlighted: Option<usize>,
    cols: usize,
    rows: usize,
) -> MarkerLayer {
    let mut canvas = BrailleCanvas::new(cols, rows);
    let mut glyphs = Vec::new();

    for record in records {
        if !store.is_shown(record.id) {
            continue;
        }
        let (px, py) = viewport.project(record.lon, record.lat);
        if !viewport.is_visible(px, py) {
            continue;
        }
        if highlighted == Some(record.id) {
            draw_circle(&mut canvas, px, py, 2);
            if px >= 0 && py >= 0 {
                glyphs.push(((px / 2) as u16, (py / 4) as u16, '◆'));
            }
        } else {
            draw_marker(&mut canvas, px, py, 1);
        }
    }

    MarkerLayer { canvas, glyphs }
}

/// Find the shown record nearest to a canvas pixel, within the pick
/// radius. Linear scan; the inventory is a few hundred records.
pub fn hit_test(
    records: &[DamRecord],
    store: &VisibilityStore,
    viewport: &Viewport,
    px: i32,
    py: i32,
) -> Option<usize> {
    let mut best: Option<(i32, usize)> = None;
    for record in records {
        if !store.is_shown(record.id) {
            continue;
        }
        let (mx, my) = viewport.project(record.lon, record.lat);
        let dist = (mx - px).abs().max((my - py).abs());
        if dist <= PICK_RADIUS && best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, record.id));
        }
    }
    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset_from;

    fn records() -> Vec<DamRecord> {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature",
                  "geometry": { "type": "Point", "coordinates": [-123.56461, 48.50569] },
                  "properties": { "DAM_NAME": "CENTER" } },
                { "type": "Feature",
                  "geometry": { "type": "Point", "coordinates": [-100.0, 20.0] },
                  "properties": { "DAM_NAME": "FAR_AWAY" } }
            ]
        }"#;
        dataset_from(geojson.parse().unwrap()).unwrap().records
    }

    #[test]
    fn shown_markers_in_view_are_plotted() {
        let records = records();
        let store = VisibilityStore::all_shown(records.len());
        let viewport = Viewport::start(80, 48);
        let layer = render_markers(&records, &store, &viewport, None, 40, 12);
        // The center record lands mid-canvas; the far one is culled
        assert!(layer.canvas.rows().any(|row| row.chars().any(|c| c != '\u{2800}')));
        assert!(layer.glyphs.is_empty());
    }

    #[test]
    fn hidden_markers_are_not_pickable() {
        let records = records();
        let viewport = Viewport::start(80, 48);
        let store = VisibilityStore::all_shown(records.len());
        let (px, py) = viewport.project(records[0].lon, records[0].lat);
        assert_eq!(hit_test(&records, &store, &viewport, px, py), Some(0));

        let empty = VisibilityStore::all_shown(0);
        assert_eq!(hit_test(&records, &empty, &viewport, px, py), None);
    }

    #[test]
    fn highlighted_marker_gets_a_glyph() {
        let records = records();
        let store = VisibilityStore::all_shown(records.len());
        let viewport = Viewport::start(80, 48);
        let layer = render_markers(&records, &store, &viewport, Some(0), 40, 12);
        assert_eq!(layer.glyphs.len(), 1);
        assert_eq!(layer.glyphs[0].2, '◆');
    }
}
