//! Procedural macros for the Sprig service runtime.
//!
//! This crate provides:
//!
//! - `#[register_service]` - Adds a service type to the link-time registry
//!
//! # Service Registration
//!
//! Put the attribute on the `impl Service for T` block. `T` must implement
//! `Default`; the registry builds every instance with it.
//!
//! ```rust,ignore
//! use sprig::prelude::*;
//!
//! #[derive(Default)]
//! pub struct Echo;
//!
//! #[register_service(alias = "echo")]
//! impl Service for Echo {}
//!
//! // Later, anywhere in the tree:
//! children.require_by_name("echo")?;
//! ```

mod service;

use proc_macro::TokenStream;
use syn::{ItemImpl, parse_macro_input};

/// Registers the implementing type with `SERVICE_REGISTRATIONS`.
///
/// # Attributes
///
/// - `#[register_service]` - Register under the type's identity only
/// - `#[register_service(alias = "...")]` - Also resolvable by `alias`
///
/// Generic impls are rejected at compile time.
#[proc_macro_attribute]
pub fn register_service(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = service::RegisterArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);
    let item = parse_macro_input!(item as ItemImpl);

    match service::register_service(args, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
