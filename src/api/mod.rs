pub mod processor;

pub use processor::{ProcessReport, SlideInfo, SlideProcessor};
