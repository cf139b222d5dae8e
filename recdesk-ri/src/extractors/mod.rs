//! Evidence-source analyzers
//!
//! One module per evidence source. Each produces confidence-scored
//! candidates for downstream fusion; none of them decides anything final.

pub mod chat;
pub mod folder_pattern;
pub mod timeline;
pub mod transcript;
