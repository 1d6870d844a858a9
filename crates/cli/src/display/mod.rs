pub mod formatter;

pub use formatter::{format_detail, render_report};
