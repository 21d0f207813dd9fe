/// TOML configuration (`pdfrag.toml`).
pub mod toml_config;
