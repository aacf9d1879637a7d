//! Implementation of the `#[native]` attribute macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{FnArg, ItemFn, ReturnType, Type, parse_macro_input, spanned::Spanned};

pub fn native_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        return syn::Error::new(attr.span(), "`#[native]` takes no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as ItemFn);

    match native_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn native_inner(input: &ItemFn) -> syn::Result<TokenStream2> {
    let sig = &input.sig;
    let fn_name = &sig.ident;
    let fn_vis = &input.vis;

    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "native implementations must be synchronous",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "native implementations cannot be generic",
        ));
    }

    let param_types = extract_param_types(sig.inputs.iter())?;

    let arg_idents: Vec<_> = (0..param_types.len())
        .map(|i| format_ident!("__arg{}", i))
        .collect();
    let indices: Vec<_> = (0..param_types.len()).collect();

    let return_type = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    let meta_fn_name = format_ident!("__bridge_{}_meta", fn_name);

    Ok(quote! {
        #input

        #[doc(hidden)]
        #[allow(dead_code)]
        #fn_vis fn #meta_fn_name() -> ::ecu_bridge_core::NativeMeta {
            ::ecu_bridge_core::NativeMeta::new(
                concat!(module_path!(), "::", stringify!(#fn_name)),
                ::ecu_bridge_core::Signature::new(
                    vec![#(<#param_types as ::ecu_bridge_core::BridgeType>::SHAPE),*],
                    <#return_type as ::ecu_bridge_core::IntoNativeResult>::SHAPE,
                ),
                ::ecu_bridge_core::NativeFn::new(
                    |ctx: &mut ::ecu_bridge_core::CallContext<'_>|
                        -> ::core::result::Result<(), ::ecu_bridge_core::NativeError> {
                        #(let #arg_idents: #param_types = ctx.arg(#indices)?;)*
                        let ret = #fn_name(#(#arg_idents),*);
                        ctx.set_return(::ecu_bridge_core::IntoNativeResult::into_native_result(ret)?);
                        ::core::result::Result::Ok(())
                    },
                ),
            )
        }
    })
}

fn extract_param_types<'a>(inputs: impl Iterator<Item = &'a FnArg>) -> syn::Result<Vec<&'a Type>> {
    inputs
        .map(|arg| match arg {
            FnArg::Receiver(receiver) => Err(syn::Error::new(
                receiver.span(),
                "native implementations must be free functions",
            )),
            FnArg::Typed(pat_type) => Ok(&*pat_type.ty),
        })
        .collect()
}
