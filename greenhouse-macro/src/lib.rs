/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![forbid(unsafe_code)]

//! Procedural macros for the greenhouse fleet runtime.
//!
//! [`greenhouse_message`] prepares a type for delivery through an actor mailbox and
//! [`greenhouse_actor`] prepares a type to serve as an actor's model.
//!
//! ```ignore
//! #[greenhouse_message]
//! pub struct Refresh;
//!
//! #[greenhouse_actor]
//! pub struct WeatherStation {
//!     refreshes: u64,
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

fn has_flag(attr: &TokenStream, flag: &str) -> bool {
    attr.to_string().split(',').any(|part| part.trim() == flag)
}

fn derive_list(traits: &[proc_macro2::TokenStream]) -> proc_macro2::TokenStream {
    if traits.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#traits),*)])
    }
}

/// Marks a type as a fleet message.
///
/// Expands to `#[derive(Clone, Debug)]` (skipping any already present) and a
/// compile-time assertion that the type is `Send + Sync + 'static`, which is
/// what the runtime's type-erased mailboxes require.
///
/// ```ignore
/// #[greenhouse_message]
/// pub struct Execute {
///     pub command: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn greenhouse_message(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut traits = Vec::new();
    if !has_derive(&input, "Clone") {
        traits.push(quote!(Clone));
    }
    if !has_derive(&input, "Debug") {
        traits.push(quote!(Debug));
    }
    let derives = derive_list(&traits);

    let assert_ident = quote::format_ident!("_AssertFleetMessage_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}

/// Marks a type as an actor model.
///
/// Expands to `#[derive(Default, Debug)]` (skipping any already present) and a
/// compile-time assertion that the type is `Send + 'static`.
///
/// Models that hold refs or other values without a sensible default use
/// `#[greenhouse_actor(no_default)]` and are built by an explicit factory closure.
///
/// ```ignore
/// #[greenhouse_actor(no_default)]
/// pub struct Site {
///     id: String,
///     registry: ActorRef,
/// }
/// ```
#[proc_macro_attribute]
pub fn greenhouse_actor(attr: TokenStream, item: TokenStream) -> TokenStream {
    let no_default = has_flag(&attr, "no_default");
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut traits = Vec::new();
    if !no_default && !has_derive(&input, "Default") {
        traits.push(quote!(Default));
    }
    if !has_derive(&input, "Debug") {
        traits.push(quote!(Debug));
    }
    let derives = derive_list(&traits);

    let assert_ident = quote::format_ident!("_AssertFleetActor_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
