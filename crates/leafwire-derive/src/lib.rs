//! `#[derive(Record)]` for leafwire message types.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod record;

/// Derive `Record`, `WireField` and `Message` for a struct with named
/// fields. The struct must also implement `Default` and `Debug`.
///
/// # Attributes
///
/// Container:
/// - `#[wire(omit_absent)]`: sequences of optional records carry only the
///   present elements.
/// - `#[wire(crate = "path")]`: path of the core crate (default
///   `::leafwire_core`).
///
/// Field:
/// - `#[wire(version)]`: the version field.
/// - `#[wire(since = N)]`: on the wire only when the version is `>= N`.
/// - `#[wire(skip)]`: never on the wire.
///
/// Untagged fields before the version field are always encoded; untagged
/// fields after it behave as `since = 0`.
///
/// ```ignore
/// #[derive(Debug, Default, Record)]
/// struct Login {
///     #[wire(version)]
///     ver: u16,
///     user: String,
///     #[wire(since = 2)]
///     token: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(wire))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
