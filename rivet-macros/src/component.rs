//! `#[derive(Component)]`
//!
//! Generates the `rivet::Component` impl describing how the container builds
//! and assigns a struct, and submits the type to the discovery registry.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, DeriveInput, Field, Fields, Ident, LitStr, Meta, Type};

/// Struct level `#[component(...)]` options
#[derive(Default)]
struct ComponentOptions {
    name: Option<LitStr>,
    constructors: Vec<Vec<Ident>>,
    no_default: bool,
}

/// Field level options
struct FieldOptions {
    skip: bool,
    inject: Option<bool>,
}

fn component_options(input: &DeriveInput) -> syn::Result<ComponentOptions> {
    let mut options = ComponentOptions::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("component")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("constructor") {
                let mut fields = Vec::new();
                meta.parse_nested_meta(|field| {
                    let ident = field
                        .path
                        .get_ident()
                        .cloned()
                        .ok_or_else(|| field.error("expected a field name"))?;
                    fields.push(ident);
                    Ok(())
                })?;
                options.constructors.push(fields);
                Ok(())
            } else if meta.path.is_ident("no_default") {
                options.no_default = true;
                Ok(())
            } else {
                Err(meta.error("unsupported component attribute"))
            }
        })?;
    }
    Ok(options)
}

fn field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions {
        skip: false,
        inject: None,
    };

    for attr in &field.attrs {
        if attr.path().is_ident("inject") {
            let mut optional = false;
            if let Meta::List(_) = attr.meta {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("optional") {
                        optional = true;
                        Ok(())
                    } else {
                        Err(meta.error("expected `optional`"))
                    }
                })?;
            }
            options.inject = Some(optional);
        } else if attr.path().is_ident("component") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    options.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported field attribute, expected `skip`"))
                }
            })?;
        }
    }

    if options.skip && options.inject.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "an #[inject] field needs its mutator and cannot be skipped",
        ));
    }
    Ok(options)
}

pub fn derive_component_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Component cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Component does not support tuple structs. Use named fields instead.",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Component can only be derived for structs",
            ))
        }
    };

    let options = component_options(input)?;
    let type_name = options
        .name
        .clone()
        .unwrap_or_else(|| LitStr::new(&name.to_string(), name.span()));

    let mut setters = Vec::new();
    let mut injectables = Vec::new();
    for field in &fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_options = field_options(field)?;
        if field_options.skip {
            continue;
        }

        let ty = &field.ty;
        let field_name = ident.unraw().to_string();
        setters.push(quote! {
            .setter(#field_name, |target: &mut Self, value: #ty| target.#ident = value)
        });

        if let Some(optional) = field_options.inject {
            injectables.push(quote! {
                .injectable(#field_name, <#ty as ::rivet::FromValue>::type_ref(), #optional)
            });
        }
    }

    let default_constructor = if options.no_default {
        quote! {}
    } else {
        quote! { .default_constructor() }
    };

    let constructors = options
        .constructors
        .iter()
        .map(|params| constructor(params, &fields))
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl ::rivet::Component for #name {
            const TYPE_NAME: &'static str = #type_name;

            fn describe() -> ::rivet::TypeDescriptor {
                ::rivet::TypeDescriptor::of::<Self>(Self::TYPE_NAME)
                    #default_constructor
                    #(#constructors)*
                    #(#setters)*
                    #(#injectables)*
                    .build()
            }
        }

        ::rivet::inventory::submit! {
            ::rivet::container::provider::ComponentTypeEntry {
                describe: <#name as ::rivet::Component>::describe,
                name: #type_name,
            }
        }
    })
}

/// `.constructor(...)` call taking `params` in order
fn constructor(params: &[Ident], fields: &[&Field]) -> syn::Result<TokenStream2> {
    let mut types: Vec<&Type> = Vec::new();
    for param in params {
        let field = fields
            .iter()
            .find(|f| f.ident.as_ref() == Some(param))
            .ok_or_else(|| syn::Error::new_spanned(param, format!("no field named `{}`", param)))?;
        types.push(&field.ty);
    }

    let rest = if params.len() < fields.len() {
        quote! { ..::std::default::Default::default() }
    } else {
        quote! {}
    };

    Ok(quote! {
        .constructor(
            vec![#(<#types as ::rivet::FromValue>::type_ref()),*],
            |args: &mut ::rivet::Arguments| {
                Ok(Self {
                    #(#params: args.next()?,)*
                    #rest
                })
            },
        )
    })
}
