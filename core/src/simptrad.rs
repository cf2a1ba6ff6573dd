//! Simplified↔Traditional conversion seam.
//!
//! Conversion tables live outside this crate; contexts call through this
//! trait when `mode_simp` is off.

/// Converts Simplified Chinese text to Traditional forms.
pub trait SimpTradConverter: Send + Sync {
    fn simp_to_trad(&self, src: &str) -> String;
}

/// Identity converter for embeddings without conversion data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl SimpTradConverter for Passthrough {
    fn simp_to_trad(&self, src: &str) -> String {
        src.to_string()
    }
}
