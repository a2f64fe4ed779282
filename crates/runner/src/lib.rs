pub mod mtf;
pub mod report;
pub mod run;
pub mod sinks;

pub use mtf::{interleave, run_multi_series};
pub use report::RunReport;
pub use run::run_series;
pub use sinks::{
    FailingSink, MemoryAlertSink, MemoryDrawSink, TracingAlertSink, TracingDrawSink,
};
