mod index;
mod sidebar;
mod visibility;

pub use index::PropertyIndex;
pub use sidebar::{Sidebar, SidebarRow};
pub use visibility::{count_within, VisibilityStore};

/// Property keys worth a filter group, fixed at build time. Free-text and
/// always-empty columns (names, file numbers, elevations, CAD annotations)
/// are deliberately left out.
pub const INDEXED_KEYS: &[&str] = &[
    "DISTRICT_PRECINCT_NAME",
    "DAM_TYPE",
    "DAM_FUNCTION",
    "COMMISSIONED_YEAR",
    "FAILURE_CONSEQUENCE",
    "RISK_LEVEL",
    "DAM_REGULATED_CODE",
    "DAM_OPERATION_CODE",
    "DAM_SAFETY_OFFICER",
];
