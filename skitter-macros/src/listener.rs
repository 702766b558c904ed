//! Listener-related macros.
//!
//! This module contains:
//! - `#[listener]` - Attribute macro generating `Listener::declare` from the
//!   `#[subscribe]` methods of an inherent impl block

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Expr, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Token, Type, TypeParamBound, Visibility,
    parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// One `field: Type` entry of `#[listener(inherit(...))]`.
struct Inherit {
    field: Ident,
    ty: Type,
}

/// Arguments of `#[listener(...)]`.
#[derive(Default)]
pub(crate) struct ListenerArgs {
    inherit: Vec<Inherit>,
}

impl Parse for ListenerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ListenerArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "inherit" => {
                    let content;
                    parenthesized!(content in input);
                    while !content.is_empty() {
                        let field: Ident = content.parse()?;
                        content.parse::<Token![:]>()?;
                        let ty: Type = content.parse()?;
                        args.inherit.push(Inherit { field, ty });
                        if content.peek(Token![,]) {
                            content.parse::<Token![,]>()?;
                        }
                    }
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown listener attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

/// Arguments of `#[subscribe(...)]`.
#[derive(Default)]
struct SubscribeArgs {
    preference: Option<Ident>,
    priority: Option<Expr>,
}

impl Parse for SubscribeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = SubscribeArgs::default();

        while !input.is_empty() {
            if input.peek(Ident) && !input.peek2(Token![=]) {
                // Bare preference: `#[subscribe(Caller)]`
                args.preference = Some(crate::parse_preference(input)?);
            } else {
                let ident: Ident = input.parse()?;
                input.parse::<Token![=]>()?;

                match ident.to_string().as_str() {
                    "priority" => args.priority = Some(input.parse()?),
                    "preference" => args.preference = Some(crate::parse_preference(input)?),
                    other => {
                        return Err(syn::Error::new(
                            ident.span(),
                            format!("unknown subscribe attribute: {}", other),
                        ));
                    }
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

/// Implementation of the `#[listener]` attribute macro.
pub fn listener_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ListenerArgs);
    let mut input = parse_macro_input!(item as ItemImpl);

    match expand(&args, &mut input) {
        Ok(declare) => TokenStream::from(quote! {
            #input
            #declare
        }),
        Err(err) => {
            let err = err.to_compile_error();
            TokenStream::from(quote! {
                #input
                #err
            })
        }
    }
}

fn expand(args: &ListenerArgs, input: &mut ItemImpl) -> syn::Result<proc_macro2::TokenStream> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[listener] goes on an inherent impl block, not a trait impl",
        ));
    }

    let mut declarations = Vec::new();
    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some(index) = method
            .attrs
            .iter()
            .position(|a| a.path().is_ident("subscribe"))
        else {
            continue;
        };
        let attr = method.attrs.remove(index);
        let sub_args = match &attr.meta {
            syn::Meta::Path(_) => SubscribeArgs::default(),
            _ => attr.parse_args()?,
        };
        declarations.push(declaration(method, &sub_args)?);
    }

    let inherits = args.inherit.iter().map(|Inherit { field, ty }| {
        quote! {
            handlers.inherit::<#ty>(|this| &this.#field);
        }
    });

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::skitter::Listener for #self_ty #where_clause {
            fn declare(handlers: &mut ::skitter::Declarations<Self>) {
                #(#declarations)*
                #(#inherits)*
            }
        }
    })
}

fn declaration(
    method: &ImplItemFn,
    args: &SubscribeArgs,
) -> syn::Result<proc_macro2::TokenStream> {
    let name = &method.sig.ident;
    let mut inputs = method.sig.inputs.iter();

    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &method.sig,
                "subscribed methods must take `&self`",
            ));
        }
    }

    let event = match (inputs.next(), inputs.next()) {
        (Some(FnArg::Typed(arg)), None) => match &*arg.ty {
            Type::Reference(reference) if reference.mutability.is_none() => &*reference.elem,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "the event argument must be a shared reference: `&Event`",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &method.sig,
                "subscribed methods take exactly one event argument: fn(&self, event: &Event)",
            ));
        }
    };

    let register = if is_any_event(event) {
        quote! { handlers.on_any(stringify!(#name), Self::#name) }
    } else {
        quote! { handlers.on::<#event, _, _>(stringify!(#name), Self::#name) }
    };

    let priority = args.priority.as_ref().map(|p| quote! { .priority(#p) });
    let preference = args
        .preference
        .as_ref()
        .map(|variant| quote! { .preference(::skitter::Preference::#variant) });
    let accessible = (!matches!(method.vis, Visibility::Public(_))).then(|| quote! { .accessible(false) });

    Ok(quote! {
        #register #priority #preference #accessible;
    })
}

/// `dyn AnyEvent`, with or without a path prefix or extra bounds.
fn is_any_event(ty: &Type) -> bool {
    match ty {
        Type::TraitObject(object) => object.bounds.iter().any(|bound| match bound {
            TypeParamBound::Trait(t) => t
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "AnyEvent"),
            _ => false,
        }),
        Type::Paren(inner) => is_any_event(&inner.elem),
        Type::Group(inner) => is_any_event(&inner.elem),
        _ => false,
    }
}
