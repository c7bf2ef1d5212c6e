pub mod exporter;
pub mod nags;
pub mod style;
pub mod writer;

pub use exporter::{ExportSummary, GameLocation, PgnExporter};
pub use style::{Format, RenderStyle};
pub use writer::PgnWriter;
