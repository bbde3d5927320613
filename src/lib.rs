pub use vessel_core::*;
