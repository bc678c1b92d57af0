//! Application services

pub mod bundle;

pub use bundle::{
    BundleOptions, BundleOutput, BundleService, BundledEdge, Fragment, LeafPlacement, LeafSummary,
    Stroke,
};
