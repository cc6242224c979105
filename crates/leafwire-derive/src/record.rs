//! Expansion of `#[derive(Record)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitInt, LitStr, Path, Result};

enum Tag {
    Always,
    Version,
    Since(u32),
    Skip,
}

struct Container {
    krate: Path,
    omit_absent: bool,
}

fn parse_container(input: &DeriveInput) -> Result<Container> {
    let mut container = Container {
        krate: syn::parse_quote!(::leafwire_core),
        omit_absent: false,
    };
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("wire")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("omit_absent") {
                container.omit_absent = true;
                Ok(())
            } else if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                container.krate = lit.parse()?;
                Ok(())
            } else {
                Err(meta.error("expected `omit_absent` or `crate = \"...\"`"))
            }
        })?;
    }
    Ok(container)
}

fn parse_field(field: &Field) -> Result<Option<Tag>> {
    let mut tag = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("wire")) {
        attr.parse_nested_meta(|meta| {
            let next = if meta.path.is_ident("version") {
                Tag::Version
            } else if meta.path.is_ident("skip") {
                Tag::Skip
            } else if meta.path.is_ident("since") {
                let lit: LitInt = meta.value()?.parse()?;
                Tag::Since(lit.base10_parse()?)
            } else {
                return Err(meta.error("expected `version`, `since = N` or `skip`"));
            };
            if tag.is_some() {
                return Err(meta.error("only one wire tag per field"));
            }
            tag = Some(next);
            Ok(())
        })?;
    }
    Ok(tag)
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let container = parse_container(&input)?;
    let krate = &container.krate;
    let omit_absent = container.omit_absent;

    let fields = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record can only be derived for structs",
            ))
        }
    };

    let mut seen_version = false;
    let mut steps = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else { continue };
        let ty = &field.ty;
        let name = ident.to_string();

        let tag = match parse_field(field)? {
            Some(tag) => tag,
            None if seen_version => Tag::Since(0),
            None => Tag::Always,
        };

        let call = match tag {
            Tag::Skip => continue,
            Tag::Always => quote!(field::<#ty>(#name, |r| &r.#ident, |r| &mut r.#ident)),
            Tag::Version => {
                seen_version = true;
                quote!(version::<#ty>(#name, |r| &r.#ident, |r| &mut r.#ident))
            }
            Tag::Since(n) => {
                quote!(since::<#ty>(#n, #name, |r| &r.#ident, |r| &mut r.#ident))
            }
        };
        steps.push(quote!(schema.#call?;));
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::codec::Record for #ident #ty_generics #where_clause {
            fn describe(
                schema: &mut #krate::codec::SchemaBuilder<Self>,
            ) -> #krate::Result<()> {
                schema.omit_absent(#omit_absent);
                #(#steps)*
                Ok(())
            }
        }

        impl #impl_generics #krate::codec::WireField for #ident #ty_generics #where_clause {
            fn kind() -> #krate::Result<#krate::codec::FieldKind> {
                #krate::codec::record::record_kind::<Self>()
            }

            fn zero() -> Self {
                ::core::default::Default::default()
            }

            fn wire_size(&self, _: #krate::codec::Layout) -> #krate::Result<usize> {
                #krate::codec::record::record_size(self)
            }

            fn encode(
                &self,
                w: &mut #krate::codec::Writer,
                _: #krate::codec::Layout,
            ) -> #krate::Result<()> {
                #krate::codec::record::record_encode(self, w)
            }

            fn decode(
                &mut self,
                r: &mut #krate::codec::Reader<'_>,
                _: #krate::codec::Layout,
            ) -> #krate::Result<()> {
                #krate::codec::record::record_decode(self, r)
            }
        }

        impl #impl_generics #krate::protocol::Message for #ident #ty_generics #where_clause {
            fn codec_kind(&self) -> #krate::protocol::CodecKind {
                #krate::protocol::CodecKind::Native
            }

            fn encode_body(
                &self,
                codec: &#krate::codec::Codec,
            ) -> #krate::Result<#krate::protocol::Body> {
                codec.marshal(self)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }
    })
}
