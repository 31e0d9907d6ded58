//! Standard text rendering for the runtime's primitive values.

/// Magnitude at which number rendering switches to exponential
/// notation.
const EXP_UPPER: f64 = 1e21;
/// Nonzero magnitudes below this render in exponential notation.
const EXP_LOWER: f64 = 1e-6;

/// Render a number the way the host renders numbers: `NaN` and signed
/// `Infinity` by name, negative zero as `0`, integral values without a
/// fraction part, shortest round-trip decimal otherwise, exponential
/// notation outside the plain-decimal window.
pub fn render_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let mag = f.abs();
    if mag >= EXP_UPPER || mag < EXP_LOWER {
        return exponential(f);
    }
    format!("{}", f)
}

/// `{:e}` with the host's explicit exponent sign: `1e+21`, `1.5e-7`.
fn exponential(f: f64) -> String {
    let s = format!("{:e}", f);
    match s.find('e') {
        Some(pos) if !s[pos + 1..].starts_with('-') => {
            format!("{}e+{}", &s[..pos], &s[pos + 1..])
        }
        _ => s,
    }
}

pub fn render_bool(b: bool) -> String {
    if b { "true" } else { "false" }.to_string()
}
