pub mod chooser;
pub mod console;
pub mod fetcher;
pub mod placer;
pub mod report;
