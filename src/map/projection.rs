use std::f64::consts::PI;

/// Start view: southern Vancouver Island, where the dam inventory sits.
pub const START_CENTER: (f64, f64) = (-123.56461, 48.50569);
pub const START_ZOOM: f64 = 160.0;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 8192.0;

/// Geographic rectangle currently visible in the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Boundary inclusive on all four edges.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Viewport representing the visible map area and zoom level
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Create the build-time start view over the survey region.
    pub fn start(width: usize, height: usize) -> Self {
        Self::new(START_CENTER.0, START_CENTER.1, START_ZOOM, width, height)
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        // Clamp latitude
        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor towards a specific pixel location
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        // Get the geographic coordinates under the cursor
        let (lon, lat) = self.unproject(px, py);

        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom = new_zoom;

        // Pan so the same point lands back under the cursor
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;

        // Reverse the projection math
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_lat_rad = self.center_lat * PI / 180.0;
        let center_y = (1.0 - (center_lat_rad.tan() + 1.0 / center_lat_rad.cos()).ln() / PI) / 2.0;

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        // Convert from Web Mercator normalized coords back to lon/lat
        let lon = x * 360.0 - 180.0;
        let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
        let lat = lat_rad * 180.0 / PI;

        (lon, lat)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        // Web Mercator projection
        let x = (lon + 180.0) / 360.0;
        let lat_rad = lat * PI / 180.0;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_lat_rad = self.center_lat * PI / 180.0;
        let center_y = (1.0 - (center_lat_rad.tan() + 1.0 / center_lat_rad.cos()).ln() / PI) / 2.0;

        let scale = self.zoom * self.width as f64;

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;

        (px, py)
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Geographic rectangle covered by the canvas, for the marker counter.
    pub fn geo_bounds(&self) -> GeoBounds {
        let (lon_a, lat_a) = self.unproject(0, 0);
        let (lon_b, lat_b) = self.unproject(self.width as i32, self.height as i32);
        GeoBounds {
            min_lon: lon_a.min(lon_b),
            min_lat: lat_a.min(lat_b),
            max_lon: lon_a.max(lon_b),
            max_lat: lat_a.max(lat_b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn unproject_roundtrips_project() {
        let vp = Viewport::start(160, 96);
        let (px, py) = vp.project(START_CENTER.0, START_CENTER.1);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - START_CENTER.0).abs() < 0.01);
        assert!((lat - START_CENTER.1).abs() < 0.01);
    }

    #[test]
    fn geo_bounds_contains_the_view_center() {
        let vp = Viewport::start(160, 96);
        let bounds = vp.geo_bounds();
        assert!(bounds.contains(vp.center_lon, vp.center_lat));
        assert!(bounds.min_lon < bounds.max_lon);
        assert!(bounds.min_lat < bounds.max_lat);
    }

    #[test]
    fn zooming_out_grows_the_bounds() {
        let mut vp = Viewport::start(160, 96);
        let before = vp.geo_bounds();
        vp.zoom_out();
        let after = vp.geo_bounds();
        assert!(after.min_lon < before.min_lon);
        assert!(after.max_lon > before.max_lon);
        // Everything visible before stays visible after
        assert!(after.contains(before.min_lon, before.min_lat));
        assert!(after.contains(before.max_lon, before.max_lat));
    }

    #[test]
    fn bounds_edges_are_inclusive() {
        let bounds = GeoBounds {
            min_lon: -124.0,
            min_lat: 48.0,
            max_lon: -123.0,
            max_lat: 49.0,
        };
        assert!(bounds.contains(-124.0, 48.0));
        assert!(bounds.contains(-123.0, 49.0));
        assert!(!bounds.contains(-122.999, 48.5));
    }
}
