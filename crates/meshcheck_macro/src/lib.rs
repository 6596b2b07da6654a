use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, ReturnType, parse_macro_input};

/// Memoize the return value of a `&self` method in `self._cache`.
///
/// The cache struct must have a field named exactly like the method holding
/// an `Option` of the return type. The value is computed on the first call
/// and cloned out on every call after that, so expensive values should be
/// returned behind an `Arc`.
///
/// A poisoned lock only means another thread panicked while holding it; the
/// cached `Option` is still consistent so we keep using it.
#[proc_macro_attribute]
pub fn cache_access(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    if let ReturnType::Default = input.sig.output {
        return syn::Error::new_spanned(
            &input.sig,
            "#[cache_access] needs a method with a return value to cache",
        )
        .to_compile_error()
        .into();
    }

    let attrs = input.attrs;
    let vis = input.vis;
    let sig = input.sig;
    let name = sig.ident.clone();
    let body = input.block;

    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            if let Some(cached) = self
                ._cache
                .read()
                .unwrap_or_else(::std::sync::PoisonError::into_inner)
                .#name
                .as_ref()
            {
                return cached.clone();
            }

            // compute outside of the lock, another caller may beat us to it
            let computed = (|| #body)();
            let mut cache = self
                ._cache
                .write()
                .unwrap_or_else(::std::sync::PoisonError::into_inner);
            cache.#name.get_or_insert(computed).clone()
        }
    };

    TokenStream::from(expanded)
}
