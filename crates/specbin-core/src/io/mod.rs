pub mod format;
pub mod spectrum;

pub use format::{format_scientific, normalize_text, parse_number, write_text};
pub use spectrum::{
    SpectrumFileError, parse_spectrum, read_spectrum, render_spectrum, write_spectrum,
};
