//! Shared interface crate for the weft platform ABI.
//!
//! Both the weft host runtime and every platform library depend on
//! this crate. It pins down everything that crosses the library
//! boundary: the i64 value encoding, manifest struct layouts, host
//! callbacks, and the `declare_platform!` macro.
//!
//! Platform authors work with the safe wrapper types (`WString`,
//! `WDate`, `WValue`, `JustFn`) — all `unsafe` is encapsulated here.
//! The host uses `manifest_to_descriptors()` to convert C-ABI
//! manifests into safe Rust types.

use std::sync::atomic::{AtomicPtr, Ordering};

/// ABI version — bump on breaking changes to the platform contract.
pub const ABI_VERSION: u32 = 1;

/// String layout: `[i64 len][u8 bytes...]` at the payload pointer.
pub const STRING_HEADER_BYTES: usize = 8;

// ── Boxed value encoding ──────────────────────────────────────────────────
//
// A boxed runtime value is a heap cell `[i64 tag][i64 payload]`. The
// payload is the value's unboxed encoding: the integer itself for Int,
// f64 bits for Float and Date, 0/1 for Bool, a string pointer for
// String.

pub const TAG_INT: i64 = 0;
pub const TAG_FLOAT: i64 = 1;
pub const TAG_BOOL: i64 = 2;
pub const TAG_STRING: i64 = 3;
pub const TAG_DATE: i64 = 4;

// ── C-ABI contract types ──────────────────────────────────────────────────

/// A single platform function descriptor in the C ABI.
///
/// All fields use raw pointers and lengths for C compatibility.
/// The host converts these into safe Rust types after loading.
#[repr(C)]
pub struct PlatformFn {
    /// Name as seen by weft code (e.g. "string-to-number").
    pub name: *const u8,
    pub name_len: usize,
    /// Symbol the host links against (e.g. "weft_string_to_number").
    pub link_name: *const u8,
    pub link_name_len: usize,
    /// Function pointer (extern "C", all i64 params/returns).
    pub ptr: *const u8,
    /// Number of i64 parameters.
    pub arity: u32,
    /// Type signature in weft surface syntax (e.g. "Date -> String").
    pub type_sig: *const u8,
    pub type_sig_len: usize,
    /// Docstring for the function.
    pub docstring: *const u8,
    pub docstring_len: usize,
}

// Safety: PlatformFn is a C-ABI struct with raw pointers; it is only
// constructed and accessed within unsafe blocks during library loading.
// The pointers must remain valid for the lifetime of the manifest.
unsafe impl Send for PlatformFn {}
unsafe impl Sync for PlatformFn {}

/// Host callbacks provided to the platform at manifest time.
///
/// The platform stores these for later use: `alloc` backs every
/// string the platform returns, and `fail` is the propagation channel
/// for runtime failures (invalid dates, unrenderable values).
#[repr(C)]
pub struct HostCallbacks {
    /// Allocate `size` bytes on the runtime heap, returns the payload
    /// pointer.
    pub alloc: extern "C" fn(i64) -> i64,
    /// Raise a runtime failure with a heap-string message. Never
    /// returns to the platform.
    pub fail: extern "C" fn(i64) -> !,
}

/// Platform manifest returned by the library's entry point.
///
/// Contains the platform name, version, and array of function
/// descriptors. The host validates `abi_version` and extracts
/// descriptors at load time.
#[repr(C)]
pub struct PlatformManifest {
    /// Must match `weft_platform::ABI_VERSION`.
    pub abi_version: u32,
    /// Platform name (e.g. "semantic").
    pub name: *const u8,
    pub name_len: usize,
    /// Platform version string.
    pub version: *const u8,
    pub version_len: usize,
    /// Array of function descriptors.
    pub functions: *const PlatformFn,
    pub function_count: usize,
}

// ── Global host callbacks ─────────────────────────────────────────────────

/// Global allocator function pointer, set by `HostContext::init()`.
/// Each platform library gets its own copy of this static (separate
/// compilation unit).
static GLOBAL_ALLOC: AtomicPtr<()> = AtomicPtr::new(std::ptr::null_mut());

/// Global failure function pointer, set by `HostContext::init()`.
static GLOBAL_FAIL: AtomicPtr<()> = AtomicPtr::new(std::ptr::null_mut());

/// Get the global allocator function. Panics if not initialized.
fn global_alloc() -> extern "C" fn(i64) -> i64 {
    let ptr = GLOBAL_ALLOC.load(Ordering::Relaxed);
    assert!(
        !ptr.is_null(),
        "platform not initialized: HostContext::init() not called"
    );
    unsafe { std::mem::transmute(ptr) }
}

/// Raise a runtime failure through the host. The message is copied
/// onto the runtime heap first so the host can render it.
///
/// If the host never installed callbacks the message goes to stderr
/// and the process exits.
pub fn host_fail(msg: &str) -> ! {
    let ptr = GLOBAL_FAIL.load(Ordering::Relaxed);
    if ptr.is_null() {
        eprintln!("weft platform failure: {}", msg);
        std::process::exit(1);
    }
    let fail: extern "C" fn(i64) -> ! = unsafe { std::mem::transmute(ptr) };
    fail(WString::from(msg).raw())
}

// ── Safe wrapper types ────────────────────────────────────────────────────
//
// `#[repr(transparent)]` wrappers over the i64 encoding. Platform
// functions take and return these directly; the ABI sees plain i64s.

/// A weft string value (pointer to `[i64 len][u8 bytes...]`).
#[repr(transparent)]
#[derive(Clone, Copy, Debug)]
pub struct WString(i64);

impl WString {
    /// View the string contents as a `&str`.
    ///
    /// # Safety invariant
    /// A `WString` always holds a valid pointer to `[i64 len][u8 bytes...]`.
    pub fn as_str(&self) -> &str {
        unsafe {
            let ptr = self.0;
            let len = *(ptr as *const i64) as usize;
            let bytes =
                std::slice::from_raw_parts((ptr + STRING_HEADER_BYTES as i64) as *const u8, len);
            std::str::from_utf8_unchecked(bytes)
        }
    }

    /// Rewrap a raw string pointer (e.g. a boxed String payload).
    pub fn from_raw(ptr: i64) -> Self {
        WString(ptr)
    }

    pub fn raw(self) -> i64 {
        self.0
    }
}

impl From<&str> for WString {
    fn from(s: &str) -> Self {
        let bytes = s.as_bytes();
        let size = (STRING_HEADER_BYTES + bytes.len()) as i64;
        let alloc = global_alloc();
        let ptr = alloc(size);
        unsafe {
            *(ptr as *mut i64) = bytes.len() as i64;
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                (ptr + STRING_HEADER_BYTES as i64) as *mut u8,
                bytes.len(),
            );
        }
        WString(ptr)
    }
}

impl From<WString> for String {
    fn from(v: WString) -> Self {
        v.as_str().to_string()
    }
}

/// A weft date value: milliseconds since the Unix epoch as f64 bits.
/// NaN marks an invalid date.
#[repr(transparent)]
#[derive(Clone, Copy, Debug)]
pub struct WDate(i64);

impl WDate {
    pub fn millis(self) -> f64 {
        f64::from_bits(self.0 as u64)
    }
}

impl From<f64> for WDate {
    fn from(ms: f64) -> Self {
        WDate(ms.to_bits() as i64)
    }
}

/// A boxed runtime value: pointer to a `[i64 tag][i64 payload]` heap
/// cell.
#[repr(transparent)]
#[derive(Clone, Copy, Debug)]
pub struct WValue(i64);

impl WValue {
    pub fn tag(self) -> i64 {
        unsafe { *(self.0 as *const i64) }
    }

    pub fn payload(self) -> i64 {
        unsafe { *((self.0 as *const i64).add(1)) }
    }

    /// Box a value on the runtime heap.
    pub fn boxed(tag: i64, payload: i64) -> Self {
        let alloc = global_alloc();
        let ptr = alloc(16);
        unsafe {
            *(ptr as *mut i64) = tag;
            *((ptr as *mut i64).add(1)) = payload;
        }
        WValue(ptr)
    }

    pub fn raw(self) -> i64 {
        self.0
    }
}

/// A host-supplied constructor function: one i64 argument, i64 result.
/// Used for continuation-style results where the caller provides the
/// success constructor and keeps the failure value for itself.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct JustFn(i64);

impl JustFn {
    /// Rewrap a raw function pointer received over the ABI.
    pub fn from_raw(ptr: i64) -> Self {
        JustFn(ptr)
    }

    /// Apply the constructor to a number (passed as f64 bits).
    ///
    /// # Safety invariant
    /// A `JustFn` always holds a valid `extern "C" fn(i64) -> i64`
    /// supplied by the host.
    pub fn apply(self, n: f64) -> i64 {
        let f: extern "C" fn(i64) -> i64 = unsafe { std::mem::transmute(self.0) };
        f(n.to_bits() as i64)
    }
}

// ── HostContext ───────────────────────────────────────────────────────────

/// Initialization handle for platform libraries.
///
/// Exists solely to receive and store host callbacks at manifest time.
/// Platform authors declare a static instance; the `declare_platform!`
/// macro calls `init()` automatically.
pub struct HostContext {
    callbacks: AtomicPtr<HostCallbacks>,
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new()
    }
}

impl HostContext {
    /// Create a new uninitialized context.
    pub const fn new() -> Self {
        HostContext {
            callbacks: AtomicPtr::new(std::ptr::null_mut()),
        }
    }

    /// Initialize from host callbacks.
    ///
    /// Stores a leaked copy of the callbacks and sets the crate-global
    /// allocator and failure entries used by the wrapper types.
    ///
    /// # Safety
    /// `callbacks` must point to a valid `HostCallbacks` struct.
    pub unsafe fn init(&self, callbacks: *const HostCallbacks) {
        let cb_copy = unsafe { Box::new(std::ptr::read(callbacks)) };
        let raw = Box::into_raw(cb_copy);
        self.callbacks.store(raw, Ordering::Relaxed);

        let alloc_fn = unsafe { (*raw).alloc };
        let fail_fn = unsafe { (*raw).fail };
        GLOBAL_ALLOC.store(alloc_fn as *mut (), Ordering::Relaxed);
        GLOBAL_FAIL.store(fail_fn as *mut (), Ordering::Relaxed);
    }
}

// ── Owned descriptors (safe Rust types) ───────────────────────────────────

/// Safe Rust descriptor for a platform function, converted from C-ABI.
///
/// Used by the host after loading a platform manifest.
pub struct OwnedPlatformFn {
    pub name: String,
    pub link_name: String,
    pub ptr: *const u8,
    pub arity: usize,
    pub type_sig: String,
    pub docstring: String,
}

/// Read a UTF-8 string field out of a C-ABI manifest.
///
/// # Safety
/// `ptr` must be valid for `len` bytes.
unsafe fn abi_str(what: &str, ptr: *const u8, len: usize) -> Result<String, String> {
    let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| format!("invalid UTF-8 in {}: {}", what, e))
}

/// Convert a C-ABI manifest into safe Rust descriptors.
///
/// # Safety
/// All pointers in the manifest must be valid and point to UTF-8 data.
pub unsafe fn manifest_to_descriptors(
    manifest: &PlatformManifest,
) -> Result<(String, String, Vec<OwnedPlatformFn>), String> {
    let name = unsafe { abi_str("platform name", manifest.name, manifest.name_len)? };
    let version = unsafe { abi_str("platform version", manifest.version, manifest.version_len)? };

    let functions =
        unsafe { std::slice::from_raw_parts(manifest.functions, manifest.function_count) };

    let mut descriptors = Vec::with_capacity(manifest.function_count);
    for func in functions {
        descriptors.push(OwnedPlatformFn {
            name: unsafe { abi_str("function name", func.name, func.name_len)? },
            link_name: unsafe { abi_str("function link_name", func.link_name, func.link_name_len)? },
            ptr: func.ptr,
            arity: func.arity as usize,
            type_sig: unsafe { abi_str("function type_sig", func.type_sig, func.type_sig_len)? },
            docstring: unsafe { abi_str("function docstring", func.docstring, func.docstring_len)? },
        });
    }

    Ok((name, version, descriptors))
}

// ── declare_platform! macro ───────────────────────────────────────────────

/// Derive the host-visible symbol from a weft function name.
///
/// Prepends `weft_` and replaces `-` with `_`.
/// E.g. `"date-to-iso"` -> `"weft_date_to_iso"`.
pub fn derive_link_name(weft_name: &str) -> String {
    format!("weft_{}", weft_name.replace('-', "_"))
}

/// Declare a platform library with metadata and function registrations.
///
/// Platform functions are normal `extern "C"` Rust functions using the
/// `W*` wrapper types — they are defined outside the macro. The macro
/// handles only manifest generation and host callback initialization.
///
/// # Example
///
/// ```ignore
/// use weft_platform::*;
///
/// static HOST: HostContext = HostContext::new();
///
/// pub extern "C" fn shout(s: WString) -> WString {
///     WString::from(s.as_str().to_uppercase().as_str())
/// }
///
/// declare_platform! {
///     name: "shout",
///     version: "0.1.0",
///     host: HOST,
///     functions: [
///         shout {
///             weft_name: "shout",
///             arity: 1,
///             sig: "String -> String",
///             doc: "Uppercase a string",
///         },
///     ]
/// }
/// ```
#[macro_export]
macro_rules! declare_platform {
    (
        name: $platform_name:literal,
        version: $platform_version:literal,
        host: $host:ident,
        functions: [
            $(
                $fn_ident:ident {
                    weft_name: $weft_name:literal,
                    arity: $arity:literal,
                    sig: $sig:literal,
                    doc: $doc:literal,
                }
            ),* $(,)?
        ]
    ) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn weft_platform_manifest(
            callbacks: *const $crate::HostCallbacks,
        ) -> $crate::PlatformManifest {
            // Initialize the host context (stores callbacks, sets the
            // global alloc and fail entries).
            unsafe { $host.init(callbacks); }

            let functions: &'static [$crate::PlatformFn] = Box::leak(vec![
                $(
                    {
                        let link_name: &'static [u8] = Box::leak(
                            $crate::derive_link_name($weft_name)
                                .into_bytes()
                                .into_boxed_slice(),
                        );
                        $crate::PlatformFn {
                            name: $weft_name.as_ptr(),
                            name_len: $weft_name.len(),
                            link_name: link_name.as_ptr(),
                            link_name_len: link_name.len(),
                            ptr: $fn_ident as *const u8,
                            arity: $arity,
                            type_sig: $sig.as_ptr(),
                            type_sig_len: $sig.len(),
                            docstring: $doc.as_ptr(),
                            docstring_len: $doc.len(),
                        }
                    },
                )*
            ].into_boxed_slice());

            $crate::PlatformManifest {
                abi_version: $crate::ABI_VERSION,
                name: $platform_name.as_ptr(),
                name_len: $platform_name.len(),
                version: $platform_version.as_ptr(),
                version_len: $platform_version.len(),
                functions: functions.as_ptr(),
                function_count: functions.len(),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_names_use_weft_prefix_and_underscores() {
        assert_eq!(derive_link_name("show"), "weft_show");
        assert_eq!(derive_link_name("string-to-number"), "weft_string_to_number");
    }

    #[test]
    fn date_roundtrips_through_bits() {
        let d = WDate::from(1_700_000_000_000.0);
        assert_eq!(d.millis(), 1_700_000_000_000.0);
        assert!(WDate::from(f64::NAN).millis().is_nan());
    }
}
