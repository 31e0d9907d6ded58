//! Platform bridge tests: manifest handshake and the three entry
//! points, driven through a scripted in-test host.
//!
//! The host shim below provides what the weft loader provides at
//! manifest time: a heap allocator and a failure entry. Tests drive
//! the non-failing paths end-to-end over the i64 encoding; the failure
//! paths terminate the runtime by contract and are covered at the
//! `Result` level in the conversion-core tests.

use weft_platform::*;
use weft_semantic::{date_to_iso, show, string_to_number};

/// Leaky word-aligned allocator standing in for the runtime heap.
extern "C" fn heap_alloc(size: i64) -> i64 {
    let words = (size as usize).div_ceil(8);
    let buf = vec![0i64; words].into_boxed_slice();
    Box::into_raw(buf) as *mut i64 as i64
}

/// Host failure entry. Nothing in these tests should route here; if
/// something does, take the process down the way the real host would.
extern "C" fn heap_fail(msg: i64) -> ! {
    eprintln!("host failure: {}", WString::from_raw(msg).as_str());
    std::process::abort();
}

static CALLBACKS: HostCallbacks = HostCallbacks {
    alloc: heap_alloc,
    fail: heap_fail,
};

/// Run the manifest handshake, installing the host callbacks.
fn init_host() -> PlatformManifest {
    weft_semantic::weft_platform_manifest(&CALLBACKS)
}

#[test]
fn manifest_describes_the_three_conversions() {
    let manifest = init_host();
    assert_eq!(manifest.abi_version, ABI_VERSION);

    let (name, version, fns) = unsafe { manifest_to_descriptors(&manifest).unwrap() };
    assert_eq!(name, "semantic");
    assert_eq!(version, "0.1.0");

    let names: Vec<&str> = fns.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["string-to-number", "show", "date-to-iso"]);
    assert_eq!(fns[0].link_name, "weft_string_to_number");
    assert_eq!(fns[0].arity, 3);
    assert_eq!(fns[1].link_name, "weft_show");
    assert_eq!(fns[2].link_name, "weft_date_to_iso");
    assert!(fns.iter().all(|f| !f.ptr.is_null()));
    assert!(fns.iter().all(|f| !f.docstring.is_empty()));
}

// ── string-to-number ──────────────────────────────────────────────────────

/// Absent-case value the test host hands to the parser. The bridge
/// must return it untouched; as f64 bits this is a NaN pattern the
/// coercion never produces, so it cannot collide with a present
/// result.
const NOTHING: i64 = -1;

/// Present-case constructor: keeps the number's bits so tests can
/// compare exactly.
extern "C" fn just_bits(bits: i64) -> i64 {
    bits
}

fn coerce(text: &str) -> i64 {
    init_host();
    let s = WString::from(text);
    string_to_number(JustFn::from_raw(just_bits as usize as i64), NOTHING, s)
}

fn present(n: f64) -> i64 {
    n.to_bits() as i64
}

#[test]
fn parser_applies_the_present_constructor() {
    assert_eq!(coerce("42"), present(42.0));
    assert_eq!(coerce("  3.5  "), present(3.5));
}

#[test]
fn parser_coerces_empty_text_to_zero() {
    assert_eq!(coerce(""), present(0.0));
    assert_eq!(coerce("   "), present(0.0));
}

#[test]
fn parser_returns_the_absent_value_unchanged() {
    assert_eq!(coerce("abc"), NOTHING);
    assert_eq!(coerce("12px"), NOTHING);
}

// ── show ──────────────────────────────────────────────────────────────────

fn show_text(v: WValue) -> String {
    show(v).as_str().to_string()
}

#[test]
fn show_renders_primitives() {
    init_host();
    assert_eq!(show_text(WValue::boxed(TAG_INT, 7)), "7");
    assert_eq!(show_text(WValue::boxed(TAG_INT, -12)), "-12");
    assert_eq!(
        show_text(WValue::boxed(TAG_FLOAT, (2.5f64).to_bits() as i64)),
        "2.5"
    );
    assert_eq!(show_text(WValue::boxed(TAG_BOOL, 1)), "true");
    assert_eq!(show_text(WValue::boxed(TAG_BOOL, 0)), "false");
}

#[test]
fn show_on_string_is_the_string_itself() {
    init_host();
    let s = WString::from("already text");
    let out = show(WValue::boxed(TAG_STRING, s.raw()));
    assert_eq!(out.as_str(), "already text");
    // Identity, not a copy.
    assert_eq!(out.raw(), s.raw());
}

#[test]
fn show_renders_dates_in_their_standard_form() {
    init_host();
    let v = WValue::boxed(TAG_DATE, (0.0f64).to_bits() as i64);
    assert_eq!(show_text(v), "1970-01-01T00:00:00.000Z");
}

// ── date-to-iso ───────────────────────────────────────────────────────────

#[test]
fn date_to_iso_known_instants() {
    init_host();
    assert_eq!(
        date_to_iso(WDate::from(0.0)).as_str(),
        "1970-01-01T00:00:00.000Z"
    );
    assert_eq!(
        date_to_iso(WDate::from(1_700_000_000_000.0)).as_str(),
        "2023-11-14T22:13:20.000Z"
    );
}
