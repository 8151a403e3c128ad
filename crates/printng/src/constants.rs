//! Shared constants for print layout and the PrintNG protocol
//!
//! Unit conversion factors, defaults and the built-in paper sizes live here
//! so the layout, snapshot and session code agree on them.

use crate::types::Units;

// =============================================================================
// Unit Conversion
// =============================================================================

/// Inches per millimeter
pub const INCHES_PER_MM: f64 = 0.0393701;

/// Inches per centimeter
pub const INCHES_PER_CM: f64 = 0.393701;

/// Inches per point (1 inch = 72 points)
pub const INCHES_PER_PT: f64 = 1.0 / 72.0;

/// Inches per pica (1 inch = 6 picas)
pub const INCHES_PER_PC: f64 = 1.0 / 6.0;

/// Inches per CSS pixel (1 inch = 96 px)
pub const INCHES_PER_PX: f64 = 1.0 / 96.0;

/// Conversion factor from `units` to inches
#[inline]
pub fn inches_per_unit(units: Units) -> f64 {
    match units {
        Units::In => 1.0,
        Units::Mm => INCHES_PER_MM,
        Units::Cm => INCHES_PER_CM,
        Units::Pt => INCHES_PER_PT,
        Units::Pc => INCHES_PER_PC,
        Units::Px => INCHES_PER_PX,
    }
}

// =============================================================================
// Defaults
// =============================================================================

/// Default named page size
pub const DEFAULT_PAGE_SIZE: &str = "A4";

/// Default print resolution. The PrintNG renderer only prints at 96 dpi.
pub const DEFAULT_DPI: u32 = 96;

/// Resolutions offered for printing unless configured otherwise
pub const SUPPORTED_DPIS: &[u32] = &[DEFAULT_DPI];

/// Default HTTP timeout for template and print requests (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Page Rule
// =============================================================================

/// Fit and page-break declarations every page rule carries
pub const PAGE_FIT_RULES: &str =
    "fit: meet; fit-position: center; page-break-after: avoid; page-break-inside: avoid; ";

// =============================================================================
// Protocol
// =============================================================================

/// Response field holding the document URL
pub const DOCUMENT_URL_FIELD: &str = "getURL";

/// Id of the element that hosts the print map
pub const PRINT_MAP_ELEMENT_ID: &str = "printMap";

// =============================================================================
// Paper Sizes
// =============================================================================

/// Built-in paper sizes: name, portrait dimensions, units
pub const PAPER_SIZES: &[(&str, [f64; 2], Units)] = &[
    ("A4", [210.0, 297.0], Units::Mm),
    ("letter", [8.5, 11.0], Units::In),
    ("ledger", [11.0, 17.0], Units::In),
    ("A3", [297.0, 420.0], Units::Mm),
    ("B4", [250.0, 353.0], Units::Mm),
    ("legal", [8.5, 14.0], Units::In),
];
