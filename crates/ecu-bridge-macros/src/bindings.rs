//! Implementation of the `bindings!` macro.
//!
//! Parses one or more symbol tables, rejects any name defined twice, and
//! expands each table into a module exposing `NAMESPACE`, `SYMBOLS` and
//! `module()`.

use std::collections::HashMap;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    Attribute, Ident, LitStr, Path, PathSegment, Token, Visibility, braced, parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

const SHAPES: [&str; 7] = ["Void", "Bool", "Int", "Long", "Double", "String", "Bytes"];

pub fn bindings_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as BindingsInput);

    match bindings_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Every table in one `bindings!` invocation.
struct BindingsInput {
    tables: Vec<Table>,
}

/// `pub mod name = "a.b.Class" { ... }`
struct Table {
    attrs: Vec<Attribute>,
    vis: Visibility,
    ident: Ident,
    namespace: LitStr,
    entries: Vec<TableEntry>,
}

/// `fn name => path;` or `fn name(Shape, ...) -> Shape;`
struct TableEntry {
    name: Ident,
    kind: EntryKind,
}

enum EntryKind {
    Bind(Path),
    Declare { params: Vec<Ident>, returns: Option<Ident> },
}

impl Parse for BindingsInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut tables = Vec::new();
        while !input.is_empty() {
            tables.push(input.parse()?);
        }
        Ok(Self { tables })
    }
}

impl Parse for Table {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        input.parse::<Token![mod]>()?;
        let ident: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let namespace: LitStr = input.parse()?;

        let content;
        braced!(content in input);
        let mut entries = Vec::new();
        while !content.is_empty() {
            entries.push(content.parse()?);
        }

        Ok(Self {
            attrs,
            vis,
            ident,
            namespace,
            entries,
        })
    }
}

impl Parse for TableEntry {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        // Doc comments on entries are accepted and dropped.
        input.call(Attribute::parse_outer)?;
        input.parse::<Token![fn]>()?;
        let name: Ident = input.parse()?;

        let kind = if input.peek(Token![=>]) {
            input.parse::<Token![=>]>()?;
            EntryKind::Bind(input.parse()?)
        } else {
            let content;
            parenthesized!(content in input);
            let params: Punctuated<Ident, Token![,]> =
                content.parse_terminated(Ident::parse, Token![,])?;
            let returns = if input.peek(Token![->]) {
                input.parse::<Token![->]>()?;
                Some(input.parse()?)
            } else {
                None
            };
            EntryKind::Declare {
                params: params.into_iter().collect(),
                returns,
            }
        };
        input.parse::<Token![;]>()?;

        Ok(Self { name, kind })
    }
}

fn bindings_inner(input: &BindingsInput) -> syn::Result<TokenStream2> {
    check_unique(input)?;

    let mut out = TokenStream2::new();
    for table in &input.tables {
        out.extend(expand_table(table)?);
    }
    Ok(out)
}

/// Reject any fully-qualified name that appears more than once.
fn check_unique(input: &BindingsInput) -> syn::Result<()> {
    let mut seen: HashMap<String, &TableEntry> = HashMap::new();

    for table in &input.tables {
        let namespace = table.namespace.value();
        for entry in &table.entries {
            let qualified = qualify(&namespace, &entry.name.to_string());
            if let Some(first) = seen.get(&qualified) {
                return Err(syn::Error::new(
                    entry.name.span(),
                    format!(
                        "symbol `{}` is defined more than once: first by {}, then by {}",
                        qualified,
                        describe(first),
                        describe(entry)
                    ),
                ));
            }
            seen.insert(qualified, entry);
        }
    }
    Ok(())
}

fn qualify(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_matches('.');
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

fn describe(entry: &TableEntry) -> String {
    match &entry.kind {
        EntryKind::Bind(path) => format!("`{}`", path_to_string(path)),
        EntryKind::Declare { .. } => "an unbound declaration".to_string(),
    }
}

fn path_to_string(path: &Path) -> String {
    let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    let joined = segments.join("::");
    if path.leading_colon.is_some() {
        format!("::{}", joined)
    } else {
        joined
    }
}

fn expand_table(table: &Table) -> syn::Result<TokenStream2> {
    let Table {
        attrs,
        vis,
        ident,
        namespace,
        entries,
    } = table;

    let names: Vec<String> = entries.iter().map(|e| e.name.to_string()).collect();

    let mut calls = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.name.to_string();
        calls.push(match &entry.kind {
            EntryKind::Bind(path) => {
                let meta_path = meta_path(path)?;
                quote! { .function(#name, #meta_path) }
            }
            EntryKind::Declare { params, returns } => {
                let params = params
                    .iter()
                    .map(|p| shape_tokens(p, true))
                    .collect::<syn::Result<Vec<_>>>()?;
                let returns = match returns {
                    Some(r) => shape_tokens(r, false)?,
                    None => quote! { ::ecu_bridge_core::Shape::Void },
                };
                quote! {
                    .declare(
                        #name,
                        ::ecu_bridge_core::Signature::new(vec![#(#params),*], #returns),
                    )
                }
            }
        });
    }

    Ok(quote! {
        #(#attrs)*
        #vis mod #ident {
            #[allow(unused_imports)]
            use super::*;

            /// Namespace shared by every symbol in this table.
            pub const NAMESPACE: &str = #namespace;

            /// Simple names of the symbols in this table, in table order.
            pub const SYMBOLS: &[&str] = &[#(#names),*];

            /// This table as a registry module.
            pub fn module() -> ::ecu_bridge_registry::Module {
                ::ecu_bridge_registry::Module::from_namespace(NAMESPACE)
                    #(#calls)*
            }
        }
    })
}

/// Path of the metadata function `#[native]` generated for `path`.
///
/// The table expands inside a child module, so a leading `self` or `super`
/// is moved up one level.
fn meta_path(path: &Path) -> syn::Result<Path> {
    let mut meta = path.clone();
    let last = meta
        .segments
        .last_mut()
        .ok_or_else(|| syn::Error::new(Span::call_site(), "empty implementation path"))?;
    last.ident = format_ident!("__bridge_{}_meta", last.ident, span = last.ident.span());

    if meta.leading_colon.is_none() {
        let first = meta.segments[0].ident.to_string();
        if first == "self" {
            meta.segments[0].ident = Ident::new("super", meta.segments[0].ident.span());
        } else if first == "super" {
            let mut lifted = Punctuated::new();
            lifted.push(PathSegment::from(Ident::new("super", Span::call_site())));
            lifted.extend(meta.segments);
            meta.segments = lifted;
        }
    }
    Ok(meta)
}

fn shape_tokens(ident: &Ident, is_param: bool) -> syn::Result<TokenStream2> {
    let name = ident.to_string();
    if !SHAPES.contains(&name.as_str()) {
        return Err(syn::Error::new(
            ident.span(),
            format!(
                "unknown shape `{}`; expected one of {}",
                name,
                SHAPES.join(", ")
            ),
        ));
    }
    if is_param && name == "Void" {
        return Err(syn::Error::new(
            ident.span(),
            "`Void` is not a valid parameter shape",
        ));
    }
    Ok(quote! { ::ecu_bridge_core::Shape::#ident })
}
