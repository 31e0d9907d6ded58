//! Semantic conversions platform for weft — standalone cdylib.
//!
//! Implements the host's value-conversion bridge as a dynamically
//! loaded platform library:
//! - `string-to-number`: Just/Nothing -> String -> coerce text to a
//!   number, continuation-style
//! - `show`: render any boxed value as text
//! - `date-to-iso`: render a date in fixed ISO-8601 UTC text
//!
//! Uses the `weft-platform` shared crate for ABI types, wrapper types
//! (`WString`, `WDate`, `WValue`, `JustFn`), and the
//! `declare_platform!` macro. The conversion logic itself lives in
//! `weft-conv`; this crate only moves values across the boundary.

use weft_conv::error::ConvError;
use weft_conv::{coerce, datetime, render};
use weft_platform::*;

static HOST: HostContext = HostContext::new();

/// Coerce a string to a number, continuation-style.
///
/// `just` is the host's present-case constructor (applied to the f64
/// bits of the number), `nothing` the absent-case value returned
/// untouched. Every input maps to exactly one of the two alternatives
/// — the coercion itself never fails. Empty and whitespace-only text
/// coerce to zero by the host's coercion rule.
#[unsafe(export_name = "weft_string_to_number")]
pub extern "C" fn string_to_number(just: JustFn, nothing: i64, s: WString) -> i64 {
    match coerce::string_to_number(s.as_str()) {
        Some(n) => just.apply(n),
        None => nothing,
    }
}

/// Render a boxed value as text.
///
/// Strings pass through untouched — show on a String is the string
/// itself. Dates render in their standard ISO-8601 form. A tag with no
/// text rendering is a runtime failure and propagates to the host.
#[unsafe(export_name = "weft_show")]
pub extern "C" fn show(v: WValue) -> WString {
    let payload = v.payload();
    match v.tag() {
        TAG_INT => WString::from(payload.to_string().as_str()),
        TAG_FLOAT => {
            WString::from(render::render_float(f64::from_bits(payload as u64)).as_str())
        }
        TAG_BOOL => WString::from(render::render_bool(payload != 0).as_str()),
        TAG_STRING => WString::from_raw(payload),
        TAG_DATE => match datetime::iso_utc(f64::from_bits(payload as u64)) {
            Ok(text) => WString::from(text.as_str()),
            Err(e) => host_fail(&e.to_string()),
        },
        tag => host_fail(&ConvError::Unrenderable { tag }.to_string()),
    }
}

/// Render a date as `YYYY-MM-DDTHH:mm:ss.sssZ`.
///
/// An invalid date (NaN, outside the host's time range) is a runtime
/// failure and propagates to the host.
#[unsafe(export_name = "weft_date_to_iso")]
pub extern "C" fn date_to_iso(d: WDate) -> WString {
    match datetime::iso_utc(d.millis()) {
        Ok(text) => WString::from(text.as_str()),
        Err(e) => host_fail(&e.to_string()),
    }
}

declare_platform! {
    name: "semantic",
    version: "0.1.0",
    host: HOST,
    functions: [
        string_to_number {
            weft_name: "string-to-number",
            arity: 3,
            sig: "(Number -> a) -> a -> String -> a",
            doc: "Coerce text to a number; applies the first argument to the number, or returns the second unchanged",
        },
        show {
            weft_name: "show",
            arity: 1,
            sig: "a -> String",
            doc: "Render a value as text",
        },
        date_to_iso {
            weft_name: "date-to-iso",
            arity: 1,
            sig: "Date -> String",
            doc: "Render a date as ISO-8601 UTC text with millisecond precision",
        },
    ]
}
