use crate::data::{DamRecord, Dataset, LoadError};
use crate::event_log::EventLog;
use crate::filter::{count_within, PropertyIndex, Sidebar, VisibilityStore, INDEXED_KEYS};
use crate::map::{hit_test, Viewport};
use crate::ui;
use std::fmt::Display;

/// Startup phase. The gap between `Attached` and `Ready` exists so one
/// frame can paint before the CPU-bound index build runs.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No dataset yet (or the load failed and initialization halted).
    Loading,
    /// Records parsed and on screen; index not built.
    Attached,
    /// Index and sidebar built; filters live.
    Ready,
}

/// Session state: one loaded dataset, its index, and the interactive view
/// onto it. All mutation flows through methods here; there are no
/// process-wide singletons.
pub struct App {
    pub viewport: Viewport,
    pub records: Vec<DamRecord>,
    pub collection_name: Option<String>,
    pub index: PropertyIndex,
    pub visibility: VisibilityStore,
    pub sidebar: Sidebar,
    pub log: EventLog,
    pub phase: Phase,
    pub should_quit: bool,
    /// Record behind the open popup, if any
    pub popup: Option<usize>,
    /// Shown records inside the current bounds; recomputed on every
    /// visibility or viewport change
    pub in_view: usize,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for the coordinate readout
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    pub fn new(width: usize, height: usize) -> Self {
        let (pixel_width, pixel_height) = ui::map_pixel_size(width, height);
        Self {
            viewport: Viewport::start(pixel_width, pixel_height),
            records: Vec::new(),
            collection_name: None,
            index: PropertyIndex::empty(INDEXED_KEYS),
            visibility: VisibilityStore::all_shown(0),
            sidebar: Sidebar::empty(),
            log: EventLog::new(),
            phase: Phase::Loading,
            should_quit: false,
            popup: None,
            in_view: 0,
            last_mouse: None,
            mouse_pos: None,
        }
    }

    /// First startup phase: take ownership of the parsed records and log
    /// the load milestone. The caller paints one frame before calling
    /// `build_index`, so the map is visible before the heavy pass.
    pub fn attach(&mut self, dataset: Dataset) {
        self.log.push(format!(
            "Loaded \"{}\" with {} features",
            dataset.name,
            dataset.records.len()
        ));
        self.visibility = VisibilityStore::all_shown(dataset.records.len());
        self.records = dataset.records;
        self.collection_name = Some(dataset.name);
        self.phase = Phase::Attached;
        self.recount();
    }

    /// Second startup phase: the CPU-bound index build plus sidebar
    /// derivation. Filters go live here.
    pub fn build_index(&mut self) {
        self.index = PropertyIndex::build(&self.records, INDEXED_KEYS);
        self.sidebar = Sidebar::from_index(&self.index);
        self.phase = Phase::Ready;
        self.recount();
        self.log.push("Done");
    }

    /// Load failures halt initialization: the error is logged and the
    /// session stays in `Loading` with an empty map. No retry.
    pub fn fail_load(&mut self, err: &LoadError) {
        self.log.push(format!("LoadError {err}"));
    }

    /// "Log and continue" for faults caught during event handling.
    pub fn report_fault(&mut self, err: &dyn Display) {
        self.log.push(format!("Error {err}"));
    }

    /// Full recount of shown records inside the current bounds.
    pub fn recount(&mut self) {
        self.in_view = count_within(&self.records, &self.visibility, &self.viewport.geo_bounds());
    }

    /// Flip the selected sidebar checkbox and dispatch the group toggle.
    pub fn toggle_selected(&mut self) {
        let Some((key, value, visible)) = self.sidebar.toggle_selected() else {
            return;
        };
        let affected = self
            .visibility
            .set_group_visible(&self.index, key, &value, visible);
        self.log.push(format!(
            "{} {} markers",
            if visible { "Added" } else { "Removed" },
            affected
        ));
        self.recount();
    }

    /// Update viewport size when the terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = ui::map_pixel_size(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
        self.recount();
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.recount();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.recount();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.recount();
    }

    /// Zoom towards a terminal cell, if it lies over the map
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        match ui::terminal_to_map_px(col, row) {
            Some((px, py)) => self.viewport.zoom_in_at(px, py),
            None => self.viewport.zoom_in(),
        }
        self.recount();
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        match ui::terminal_to_map_px(col, row) {
            Some((px, py)) => self.viewport.zoom_out_at(px, py),
            None => self.viewport.zoom_out(),
        }
        self.recount();
    }

    /// Restore the build-time start view, keeping the canvas size.
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::start(self.viewport.width, self.viewport.height);
        self.recount();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Left click: open a popup when a shown marker is under the cursor,
    /// otherwise start a drag.
    pub fn click(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = ui::terminal_to_map_px(col, row) {
            if let Some(id) = hit_test(&self.records, &self.visibility, &self.viewport, px, py) {
                self.open_popup(id);
                return;
            }
        }
        self.last_mouse = Some((col, row));
    }

    pub fn open_popup(&mut self, id: usize) {
        if let Some(record) = self.records.get(id) {
            self.log.push(format!(
                "Marker ({:.5}, {:.5}): {}",
                record.lat,
                record.lon,
                record.name()
            ));
            self.popup = Some(id);
        }
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Handle mouse drag by panning the map under the cursor
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // One cell is 2 braille pixels wide and 4 tall
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when the mouse button is released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Coordinate readout: (lat, lon) under the cursor when it hovers the
    /// map, otherwise the view center.
    pub fn readout_latlng(&self) -> (f64, f64) {
        if let Some((col, row)) = self.mouse_pos {
            if let Some((px, py)) = ui::terminal_to_map_px(col, row) {
                let (lon, lat) = self.viewport.unproject(px, py);
                return (lat, lon);
            }
        }
        (self.viewport.center_lat, self.viewport.center_lon)
    }

    /// Current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.0}x", self.viewport.zoom)
    }

    /// Status text mirroring the marker counter: in-bounds / shown.
    pub fn count_text(&self) -> String {
        format!("{}/{} visible", self.in_view, self.visibility.shown_count())
    }
}
