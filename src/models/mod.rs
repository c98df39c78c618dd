pub mod deal;
pub mod source;

// Re-exports for convenience
pub use deal::*;
pub use source::*;
