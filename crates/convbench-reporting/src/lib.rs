//! Rendering of benchmark and fidelity reports to exportable formats.

pub mod export;

pub use export::{
    ExportFormat, ReportError, export_benchmark, export_fidelity, render_benchmark,
    render_fidelity,
};
