use std::fs;
use std::path::Path;

/// Scientific notation with a signed exponent of at least two digits, e.g.
/// `1.000000000E-04` for `format_scientific(1.0e-4, 9)`.
pub fn format_scientific(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    let formatted = format!("{value:.precision$E}");
    let Some((mantissa, exponent)) = formatted.split_once('E') else {
        return formatted;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}E{sign}{digits:0>2}")
}

/// Parse one numeric column, accepting Fortran `D` exponents.
pub fn parse_number(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replace(['D', 'd'], "E");
    normalized.parse::<f64>().ok()
}

pub fn normalize_text(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text(content))
}

#[cfg(test)]
mod tests {
    use super::{format_scientific, normalize_text, parse_number, write_text};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scientific_format_pads_the_exponent() {
        assert_eq!(format_scientific(1.0e-4, 9), "1.000000000E-04");
        assert_eq!(format_scientific(1.0, 6), "1.000000E+00");
        assert_eq!(format_scientific(-2.5e12, 6), "-2.500000E+12");
        assert_eq!(format_scientific(6.02e-123, 3), "6.020E-123");
        assert_eq!(format_scientific(0.0, 2), "0.00E+00");
        assert_eq!(format_scientific(f64::NEG_INFINITY, 6), "-INF");
    }

    #[test]
    fn numbers_accept_fortran_exponents() {
        assert_eq!(parse_number("1.5D-03"), Some(1.5e-3));
        assert_eq!(parse_number(" 2.0E+01 "), Some(20.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn text_writes_use_canonical_line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc"), "a\nb\nc\n");
        assert_eq!(normalize_text(""), "");

        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("out.dat");
        write_text(&path, "x 1\r\ny 2").expect("write should succeed");
        assert_eq!(fs::read_to_string(&path).expect("readable"), "x 1\ny 2\n");
    }
}
