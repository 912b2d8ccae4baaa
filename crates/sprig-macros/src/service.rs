use proc_macro2::TokenStream;
use quote::quote;
use syn::{ItemImpl, LitStr, Type, meta::ParseNestedMeta};

// ─── Attribute arguments ──────────────────────────────────────────────────────

/// Parsed content of `#[register_service(…)]`.
#[derive(Default)]
pub struct RegisterArgs {
    alias: Option<LitStr>,
}

impl RegisterArgs {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("alias") {
            let alias: LitStr = meta.value()?.parse()?;
            if alias.value().is_empty() {
                return Err(syn::Error::new(alias.span(), "alias must not be empty"));
            }
            self.alias = Some(alias);
            Ok(())
        } else {
            Err(meta.error("unsupported register_service argument, expected `alias`"))
        }
    }
}

// ─── Expansion ────────────────────────────────────────────────────────────────

/// Implementation of the `#[register_service]` attribute macro.
///
/// Leaves the decorated `impl Service for T` block unchanged and appends a
/// `#[::sprig_core::linkme::distributed_slice]` static that adds `T` to
/// `SERVICE_REGISTRATIONS`. The static sits in a `const _` block so its name
/// is never visible to the surrounding module.
pub fn register_service(args: RegisterArgs, item: ItemImpl) -> syn::Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "register_service cannot be used on a generic impl; \
             register each concrete type with ServiceRegistration::of instead",
        ));
    }

    match &item.trait_ {
        Some((None, path, _))
            if path.segments.last().is_some_and(|s| s.ident == "Service") => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &item.self_ty,
                "register_service expects an `impl Service for T` block",
            ));
        }
    }

    let self_ty = &item.self_ty;
    if !matches!(**self_ty, Type::Path(_)) {
        return Err(syn::Error::new_spanned(
            self_ty,
            "register_service expects a named type",
        ));
    }

    let registration = match &args.alias {
        Some(alias) => quote! {
            ::sprig_core::ServiceRegistration::of::<#self_ty>().with_alias(#alias)
        },
        None => quote! { ::sprig_core::ServiceRegistration::of::<#self_ty>() },
    };

    // Anonymous const scope: same-named types from different modules never
    // produce clashing statics.
    Ok(quote! {
        #item

        const _: () = {
            #[::sprig_core::linkme::distributed_slice(::sprig_core::SERVICE_REGISTRATIONS)]
            #[linkme(crate = ::sprig_core::linkme)]
            static REGISTRATION: ::sprig_core::ServiceRegistration = #registration;
        };
    })
}
