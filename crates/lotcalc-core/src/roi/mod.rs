//! Eleven-year ROI projection for a single lot.

pub mod projector;

pub use projector::{project_roi, RoiInput, RoiProjector, RoiResult, RoiYear};
