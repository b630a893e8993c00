//! Report rendering.

pub mod generator;

pub use generator::{
    generate_json_report, generate_label_listing, generate_markdown_report, generate_summary,
    generate_text_report, RenderOptions,
};
