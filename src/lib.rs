pub mod chrome;
pub mod config;
pub mod error;
pub mod geometry;
pub mod samples;
pub mod scan;
pub mod selector;
pub mod processing {
    pub mod color;
    pub mod filters;
    pub mod quantize;
}
pub mod tasks {
    pub mod analyzer;
}

pub use error::Error;
pub use geometry::{DisplayGeometry, Region};
pub use selector::{Analysis, StyleDecision, StyleSelector, select_style};
