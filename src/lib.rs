//! Data-interchange layer for a hyperblock classification pipeline.
//!
//! Loads labeled tabular datasets from CSV, normalizes and partitions them
//! for training, and serializes the geometric hyperblock artifacts the
//! pipeline produces (a human-readable text format and a compact binary
//! format), plus the flattened array encodings the numeric kernels consume.
//!
//! ```text
//!   labeled .csv
//!        │
//!        ▼
//!   ┌──────────┐      ┌────────────┐      ┌────────────┐
//!   │  loader   │ ───▶ │ normalize  │ ───▶ │ partition  │ ───▶ training (external)
//!   └──────────┘      └────────────┘      └────────────┘            │
//!                                                                   ▼
//!   ┌──────────┐      ┌────────────┐                        Vec<HyperBlock>
//!   │ flatten   │ ◀─── │   codec    │ ◀──────────────────────────┘
//!   └──────────┘      └────────────┘
//!    flat arrays       .csv / .bin
//! ```

pub mod codec;
pub mod flatten;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod partition;
