#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros used across the Folio workspace to keep error types,
//! feature slices and HTTP models uniform.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! folio-derive.workspace = true
//! ```
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its
//! own macros; see the consuming crates for real usages.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Turns an enum into a contextual error type.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A `<Name>Ext` trait with `.context(...)`, implemented for `Result<T, Name>`
///   and for `Result<T, Source>` of every variant that wraps a source error.
/// * `From<Source>` for every variant with a `source` field (or a field tagged
///   `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A module-local `format_context` helper for the `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants must use named fields. A variant carrying a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[folio_derive::folio_error]
/// pub enum CatalogError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &std::path::Path) -> Result<Vec<u8>, CatalogError> {
///     std::fs::read(path).context("Reading project file")
/// }
/// ```
#[proc_macro_attribute]
pub fn folio_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Wraps a struct into a cheaply clonable feature slice.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` holds it in an `Arc`,
/// derefs to it and implements `folio_kernel::domain::registry::FeatureSlice`
/// so it can be registered in the API state.
///
/// ```rust,ignore
/// #[folio_derive::folio_slice]
/// pub struct Catalog {
///     pub service: CatalogService,
/// }
///
/// let slice = Catalog::new(CatalogInner { service });
/// ```
#[proc_macro_attribute]
pub fn folio_slice(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand(input).into()
}

/// Declares an HTTP data model.
///
/// Adds `Debug`, `Serialize` and `Deserialize` when missing, `utoipa::ToSchema`
/// when the consuming crate enables its `server` feature, and a serde
/// `rename_all` policy (`camelCase` unless overridden).
/// Unknown fields are denied unless `deny_unknown_fields = false`.
///
/// ```rust,ignore
/// #[folio_derive::api_model(rename_all = "snake_case", deny_unknown_fields = false)]
/// pub struct ProjectView {
///     pub id: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_model(args.into(), input).into()
}

/// Documents an axum handler with `utoipa::path` (under the `server` feature).
///
/// Arguments are forwarded verbatim to `utoipa::path`.
///
/// ```rust,ignore
/// #[folio_derive::api_handler(
///     get,
///     path = "/api/projects",
///     responses((status = OK, body = [ProjectView])),
///     tag = "Catalog"
/// )]
/// pub async fn list_projects(State(state): State<ApiState>) -> ApiResult<Json<Vec<ProjectView>>> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_handler(args.into(), input).into()
}
