//! Event-related macros.
//!
//! This module contains:
//! - `#[derive(Event)]` - Derive macro for implementing the `Event` trait,
//!   and `Cancelable` when requested

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, Ident, Index, Member, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Container arguments of `#[event(...)]`.
#[derive(Default)]
pub(crate) struct EventArgs {
    pub preference: Option<Ident>,
    pub cancelable: bool,
}

impl Parse for EventArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = EventArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "preference" => {
                    input.parse::<Token![=]>()?;
                    args.preference = Some(crate::parse_preference(input)?);
                }
                "cancelable" => args.cancelable = true,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown event attribute: {}", other),
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

/// Implementation of `#[derive(Event)]`.
pub fn derive_event_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut args = EventArgs::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("event")) {
        let parsed: EventArgs = attr.parse_args()?;
        args.preference = parsed.preference.or(args.preference);
        args.cancelable |= parsed.cancelable;
    }

    let preference = args.preference.map(|variant| {
        quote! {
            const PREFERENCE: ::core::option::Option<::skitter::Preference> =
                ::core::option::Option::Some(::skitter::Preference::#variant);
        }
    });

    let cancel = if args.cancelable {
        let member = cancel_state_member(input)?;
        Some(quote! {
            const CANCELABLE: bool = true;

            fn cancel_state(&self) -> ::core::option::Option<&::skitter::CancelState> {
                ::core::option::Option::Some(&self.#member)
            }
        })
    } else {
        None
    };

    let cancelable_impl = args.cancelable.then(|| {
        quote! {
            impl #impl_generics ::skitter::Cancelable for #name #ty_generics #where_clause {}
        }
    });

    Ok(quote! {
        impl #impl_generics ::skitter::Event for #name #ty_generics #where_clause {
            #preference
            #cancel
        }

        #cancelable_impl
    })
}

/// Locate the `CancelState` field: the one marked `#[event(cancel_state)]`,
/// else the only field whose type is named `CancelState`.
fn cancel_state_member(input: &DeriveInput) -> syn::Result<Member> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "cancelable events must be structs with a `CancelState` field",
        ));
    };

    let fields: Vec<(Member, &Field)> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.clone().map(|ident| (Member::Named(ident), f)))
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| (Member::Unnamed(Index::from(i)), f))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    let mut marked = Vec::new();
    for (member, field) in &fields {
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("event")) {
            let ident: Ident = attr.parse_args()?;
            if ident != "cancel_state" {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown field attribute: {}", ident),
                ));
            }
            marked.push(member.clone());
        }
    }
    match marked.len() {
        1 => return Ok(marked.remove(0)),
        0 => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "only one field may be marked `#[event(cancel_state)]`",
            ));
        }
    }

    let mut by_type: Vec<Member> = fields
        .iter()
        .filter(|(_, field)| is_cancel_state(&field.ty))
        .map(|(member, _)| member.clone())
        .collect();
    match by_type.len() {
        1 => Ok(by_type.remove(0)),
        0 => Err(syn::Error::new_spanned(
            &input.ident,
            "cancelable events need a `CancelState` field",
        )),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "several `CancelState` fields; mark one with `#[event(cancel_state)]`",
        )),
    }
}

fn is_cancel_state(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "CancelState"),
        _ => false,
    }
}
