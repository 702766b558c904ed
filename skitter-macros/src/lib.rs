//! Derive and attribute macros for skitter.
//!
//! Generated code refers to the `skitter` facade crate by absolute path.

use proc_macro::TokenStream;
use syn::{Ident, parse::ParseStream};

mod event;
mod listener;

/// Derive macro for implementing the `Event` trait.
///
/// # Attributes
///
/// - `#[event(preference = Main)]` fixes the execution preference of every
///   handler of this event.
/// - `#[event(cancelable)]` also implements `Cancelable`. The struct needs a
///   `CancelState` field; mark it `#[event(cancel_state)]` if the type is
///   aliased or there are several.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Event)]
/// #[event(cancelable)]
/// struct Chat {
///     text: String,
///     state: CancelState,
/// }
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}

/// Attribute macro that implements `Listener` for the type of an impl block.
///
/// Every method marked `#[subscribe]` becomes a handler. A method must take
/// `&self` and one `&Event` argument; taking `&dyn AnyEvent` makes it a
/// dead-event handler. Methods that are not `pub` are declared inaccessible
/// and rejected when an instance is subscribed.
///
/// # Arguments
///
/// - `#[subscribe(Caller)]` or `#[subscribe(preference = Caller)]`
/// - `#[subscribe(priority = 10)]`
/// - `#[listener(inherit(base: Base))]` includes the handlers of the
///   listener stored in field `base`.
///
/// # Example
///
/// ```rust,ignore
/// struct Moderation { log: CallLog }
///
/// #[listener]
/// impl Moderation {
///     #[subscribe(Caller, priority = 200)]
///     pub fn filter(&self, chat: &Chat) {
///         if chat.text.contains("spam") {
///             chat.cancel();
///         }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn listener(attr: TokenStream, item: TokenStream) -> TokenStream {
    listener::listener_impl(attr, item)
}

/// Parse a `Preference` variant name.
pub(crate) fn parse_preference(input: ParseStream) -> syn::Result<Ident> {
    let ident: Ident = input.parse()?;
    match ident.to_string().as_str() {
        "Caller" | "Main" | "Pool" | "Dispatch" => Ok(ident),
        other => Err(syn::Error::new(
            ident.span(),
            format!(
                "unknown preference `{}`; expected Caller, Main, Pool or Dispatch",
                other
            ),
        )),
    }
}
