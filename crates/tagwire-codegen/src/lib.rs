// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, Data, DeriveInput, Expr, ExprLit, ExprRange, Fields, GenericArgument, Lit,
    LitInt, LitStr, PathArguments, RangeLimits, Type,
};

/// Highest field number the wire format can carry (29 bits).
const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Schema type of a declared field.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Message,
}

impl FieldKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint32" => Self::UInt32,
            "uint64" => Self::UInt64,
            "sint32" => Self::SInt32,
            "sint64" => Self::SInt64,
            "fixed32" => Self::Fixed32,
            "fixed64" => Self::Fixed64,
            "sfixed32" => Self::SFixed32,
            "sfixed64" => Self::SFixed64,
            "float" => Self::Float,
            "double" => Self::Double,
            "bool" => Self::Bool,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "message" => Self::Message,
            _ => return None,
        })
    }

    fn is_packable(self) -> bool {
        !matches!(self, Self::String | Self::Bytes | Self::Message)
    }

    /// Path of the runtime marker type; `value_ty` is only used for messages.
    fn marker(self, value_ty: &Type) -> TokenStream2 {
        let scalar = match self {
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::SInt32 => "SInt32",
            Self::SInt64 => "SInt64",
            Self::Fixed32 => "Fixed32",
            Self::Fixed64 => "Fixed64",
            Self::SFixed32 => "SFixed32",
            Self::SFixed64 => "SFixed64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Bool => "Bool",
            Self::String => "ProtoString",
            Self::Bytes => "ProtoBytes",
            Self::Message => {
                return match wrapper_inner(value_ty, "Box") {
                    Some(inner) => quote! { ::tagwire::field_type::BoxedMessageField<#inner> },
                    None => quote! { ::tagwire::field_type::MessageField<#value_ty> },
                };
            }
        };
        let ident = format_ident!("{}", scalar);
        quote! { ::tagwire::field_type::#ident }
    }
}

/// How a declared field stores its value(s).
#[derive(Clone, Copy, PartialEq, Eq)]
enum Cardinality {
    /// `Option<T>`: explicit presence.
    Optional,
    /// `T`: present whenever it differs from the default.
    Implicit,
    /// `Vec<T>`.
    Repeated { packed: bool },
}

struct FieldInfo {
    ident: syn::Ident,
    number: u32,
    cardinality: Cardinality,
    marker: TokenStream2,
    proto_name: String,
    json_name: String,
}

struct MessageInfo {
    name: String,
    ranges: Vec<(u32, u32)>,
    fields: Vec<FieldInfo>,
    unknown: syn::Ident,
    extensions: Option<syn::Ident>,
}

/// `#[derive(Message)]`: generates `Traversable` + `Message` impls.
///
/// Struct attribute `#[message(name = "pkg.Type", extensions = 100..200)]`
/// sets the fully-qualified name (defaults to the struct name) and
/// declares extension ranges (repeatable; `a..b` or `a..=b`).
///
/// Every field carries exactly one of:
/// - `#[field(number = N, <type>)]` with `<type>` one of `int32`, `int64`,
///   `uint32`, `uint64`, `sint32`, `sint64`, `fixed32`, `fixed64`,
///   `sfixed32`, `sfixed64`, `float`, `double`, `bool`, `string`, `bytes`,
///   `message`; plus optional `repeated`, `packed`, `proto = "..."`,
///   `json = "..."`
/// - `#[unknown]` on an `UnknownFields` field (required)
/// - `#[extensions]` on an `ExtensionSet` field (required when ranges are
///   declared)
///
/// Singular fields are `Option<T>` (explicit presence) or `T` (implicit
/// presence, scalars only); repeated fields are `Vec<T>`. Message fields
/// may box their payload: `Option<Box<T>>`.
///
/// Example:
/// ```ignore
/// #[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
/// #[message(name = "demo.Node", extensions = 100..200)]
/// struct Node {
///     #[field(number = 1, string)]
///     label: Option<String>,
///     #[field(number = 2, message)]
///     child: Option<Box<Node>>,
///     #[field(number = 3, sint64, repeated, packed)]
///     samples: Vec<i64>,
///     #[unknown]
///     unknown: tagwire::UnknownFields,
///     #[extensions]
///     extensions: tagwire::ExtensionSet,
/// }
/// ```
#[proc_macro_derive(Message, attributes(message, field, unknown, extensions))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let info = parse_message(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let message_name = &info.name;
    let unknown = &info.unknown;

    let traverse_fields = info.fields.iter().map(traverse_field);
    let decode_arms = info.fields.iter().map(decode_arm);
    let merge_fields = info.fields.iter().map(merge_field);

    let name_entries = info.fields.iter().map(|f| {
        let number = Literal::u32_unsuffixed(f.number);
        let proto = &f.proto_name;
        let rust = f.ident.to_string();
        if f.json_name == f.proto_name {
            quote! { (#number, ::tagwire::FieldNames::same(#proto, #rust)) }
        } else {
            let json = &f.json_name;
            quote! { (#number, ::tagwire::FieldNames::unique(#proto, #json, #rust)) }
        }
    });

    let ranges = info.ranges.iter().map(|(start, end)| {
        let start = Literal::u32_unsuffixed(*start);
        let end = Literal::u32_unsuffixed(*end);
        quote! { #start..#end }
    });

    let (traverse_extensions, extension_set, extension_set_mut, merge_extensions) =
        match &info.extensions {
            Some(ext) => (
                quote! {
                    for range in <Self as ::tagwire::Message>::extension_ranges() {
                        self.#ext.traverse(visitor, range.clone());
                    }
                },
                quote! {
                    fn extension_set(&self) -> ::core::option::Option<&::tagwire::ExtensionSet> {
                        ::core::option::Option::Some(&self.#ext)
                    }
                },
                quote! {
                    fn extension_set_mut(&mut self) -> ::core::option::Option<&mut ::tagwire::ExtensionSet> {
                        ::core::option::Option::Some(&mut self.#ext)
                    }
                },
                quote! { self.#ext.merge(&other.#ext); },
            ),
            None => (quote! {}, quote! {}, quote! {}, quote! {}),
        };

    Ok(quote! {
        impl #impl_generics ::tagwire::Traversable for #name #ty_generics #where_clause {
            fn traverse(&self, visitor: &mut dyn ::tagwire::Visitor) {
                #(#traverse_fields)*
                #traverse_extensions
                self.#unknown.traverse(visitor);
            }

            fn message_name(&self) -> &'static str {
                #message_name
            }

            fn name_map(&self) -> ::core::option::Option<&'static ::tagwire::NameMap> {
                static NAMES: ::tagwire::NameMap = ::tagwire::NameMap::new(&[#(#name_entries),*]);
                ::core::option::Option::Some(&NAMES)
            }

            #extension_set
        }

        impl #impl_generics ::tagwire::Message for #name #ty_generics #where_clause {
            const NAME: &'static str = #message_name;

            #[allow(unused_variables)]
            fn decode_field(
                &mut self,
                decoder: &mut ::tagwire::FieldDecoder<'_>,
                number: u32,
            ) -> ::tagwire::DecodeResult<bool> {
                match number {
                    #(#decode_arms)*
                    _ => ::core::result::Result::Ok(false),
                }
            }

            fn merge(&mut self, other: &Self) {
                #(#merge_fields)*
                #merge_extensions
                self.#unknown.merge(&other.#unknown);
            }

            fn unknown_fields(&self) -> &::tagwire::UnknownFields {
                &self.#unknown
            }

            fn unknown_fields_mut(&mut self) -> &mut ::tagwire::UnknownFields {
                &mut self.#unknown
            }

            fn extension_ranges() -> &'static [::core::ops::Range<u32>] {
                const RANGES: &[::core::ops::Range<u32>] = &[#(#ranges),*];
                RANGES
            }

            #extension_set_mut
        }
    })
}

fn traverse_field(f: &FieldInfo) -> TokenStream2 {
    let ident = &f.ident;
    let number = Literal::u32_unsuffixed(f.number);
    let marker = &f.marker;
    match f.cardinality {
        Cardinality::Optional => quote! {
            ::tagwire::visitor::visit_singular::<#marker>(visitor, #number, &self.#ident);
        },
        Cardinality::Implicit => quote! {
            if self.#ident != <<#marker as ::tagwire::field_type::FieldType>::Value as ::core::default::Default>::default() {
                visitor.visit_singular_field(
                    #number,
                    <#marker as ::tagwire::field_type::FieldType>::value_ref(&self.#ident),
                );
            }
        },
        Cardinality::Repeated { packed: false } => quote! {
            ::tagwire::visitor::visit_repeated::<#marker>(visitor, #number, &self.#ident);
        },
        Cardinality::Repeated { packed: true } => quote! {
            ::tagwire::visitor::visit_packed::<#marker>(visitor, #number, &self.#ident);
        },
    }
}

fn decode_arm(f: &FieldInfo) -> TokenStream2 {
    let ident = &f.ident;
    let number = Literal::u32_unsuffixed(f.number);
    let marker = &f.marker;
    let call = match f.cardinality {
        Cardinality::Optional => quote! { decoder.decode_singular::<#marker>(&mut self.#ident) },
        Cardinality::Implicit => quote! { decoder.decode_value::<#marker>(&mut self.#ident) },
        Cardinality::Repeated { .. } => quote! { decoder.decode_repeated::<#marker>(&mut self.#ident) },
    };
    quote! { #number => #call, }
}

fn merge_field(f: &FieldInfo) -> TokenStream2 {
    let ident = &f.ident;
    let marker = &f.marker;
    match f.cardinality {
        Cardinality::Optional => quote! {
            ::tagwire::field_type::merge_optional::<#marker>(&mut self.#ident, &other.#ident);
        },
        Cardinality::Implicit => quote! {
            if other.#ident != <<#marker as ::tagwire::field_type::FieldType>::Value as ::core::default::Default>::default() {
                <#marker as ::tagwire::field_type::FieldType>::merge_value(&mut self.#ident, &other.#ident);
            }
        },
        Cardinality::Repeated { .. } => quote! {
            ::tagwire::field_type::merge_repeated::<#marker>(&mut self.#ident, &other.#ident);
        },
    }
}

fn parse_message(input: &DeriveInput) -> syn::Result<MessageInfo> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only named fields are supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let mut name = input.ident.to_string();
    let mut ranges = Vec::new();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("message")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = meta.value()?.parse::<LitStr>()?.value();
                Ok(())
            } else if meta.path.is_ident("extensions") {
                let range: ExprRange = meta.value()?.parse()?;
                ranges.push(parse_range(&range)?);
                Ok(())
            } else {
                Err(meta.error("expected `name` or `extensions`"))
            }
        })?;
    }
    ranges.sort_unstable();
    for pair in ranges.windows(2) {
        if pair[1].0 < pair[0].1 {
            return Err(syn::Error::new_spanned(
                &input.ident,
                format!(
                    "extension ranges {}..{} and {}..{} overlap",
                    pair[0].0, pair[0].1, pair[1].0, pair[1].1
                ),
            ));
        }
    }

    let mut declared = Vec::new();
    let mut unknown = None;
    let mut extensions = None;
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let mut claimed = false;
        for attr in &field.attrs {
            if attr.path().is_ident("unknown") {
                unknown = Some(ident.clone());
            } else if attr.path().is_ident("extensions") {
                extensions = Some(ident.clone());
            } else if attr.path().is_ident("field") {
                declared.push(parse_field(ident, &field.ty, attr)?);
            } else {
                continue;
            }
            if claimed {
                return Err(syn::Error::new_spanned(
                    attr,
                    "a field takes only one of #[field], #[unknown], #[extensions]",
                ));
            }
            claimed = true;
        }
        if !claimed {
            return Err(syn::Error::new_spanned(
                ident,
                "field needs #[field(...)], #[unknown] or #[extensions]",
            ));
        }
    }

    let Some(unknown) = unknown else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "message needs an #[unknown] UnknownFields field",
        ));
    };
    if !ranges.is_empty() && extensions.is_none() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "extension ranges need an #[extensions] ExtensionSet field",
        ));
    }

    declared.sort_by_key(|f| f.number);
    for pair in declared.windows(2) {
        if pair[0].number == pair[1].number {
            return Err(syn::Error::new_spanned(
                &pair[1].ident,
                format!("field number {} is declared twice", pair[1].number),
            ));
        }
    }
    for f in &declared {
        if ranges.iter().any(|(s, e)| (*s..*e).contains(&f.number)) {
            return Err(syn::Error::new_spanned(
                &f.ident,
                format!("field number {} lies in an extension range", f.number),
            ));
        }
    }

    Ok(MessageInfo {
        name,
        ranges,
        fields: declared,
        unknown,
        extensions,
    })
}

fn parse_field(ident: &syn::Ident, ty: &Type, attr: &syn::Attribute) -> syn::Result<FieldInfo> {
    let mut number = None;
    let mut kind = None;
    let mut repeated = false;
    let mut packed = false;
    let mut proto_name = None;
    let mut json_name = None;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("number") {
            let lit: LitInt = meta.value()?.parse()?;
            number = Some(lit.base10_parse::<u32>()?);
        } else if meta.path.is_ident("repeated") {
            repeated = true;
        } else if meta.path.is_ident("packed") {
            packed = true;
        } else if meta.path.is_ident("proto") {
            proto_name = Some(meta.value()?.parse::<LitStr>()?.value());
        } else if meta.path.is_ident("json") {
            json_name = Some(meta.value()?.parse::<LitStr>()?.value());
        } else if let Some(k) = meta
            .path
            .get_ident()
            .and_then(|i| FieldKind::from_keyword(&i.to_string()))
        {
            if kind.replace(k).is_some() {
                return Err(meta.error("field type given twice"));
            }
        } else {
            return Err(meta.error("unsupported field attribute"));
        }
        Ok(())
    })?;

    let Some(number) = number else {
        return Err(syn::Error::new_spanned(attr, "missing `number = N`"));
    };
    if number == 0 || number > MAX_FIELD_NUMBER {
        return Err(syn::Error::new_spanned(
            attr,
            format!("field number must be in 1..={MAX_FIELD_NUMBER}"),
        ));
    }
    let Some(kind) = kind else {
        return Err(syn::Error::new_spanned(attr, "missing field type (e.g. `int32`)"));
    };
    if packed && !repeated {
        return Err(syn::Error::new_spanned(attr, "`packed` requires `repeated`"));
    }
    if packed && !kind.is_packable() {
        return Err(syn::Error::new_spanned(
            attr,
            "only scalar numeric fields can be packed",
        ));
    }

    let (cardinality, value_ty) = if repeated {
        let Some(inner) = wrapper_inner(ty, "Vec") else {
            return Err(syn::Error::new_spanned(ty, "repeated fields must be Vec<T>"));
        };
        (Cardinality::Repeated { packed }, inner)
    } else if let Some(inner) = wrapper_inner(ty, "Option") {
        (Cardinality::Optional, inner)
    } else if kind == FieldKind::Message {
        return Err(syn::Error::new_spanned(
            ty,
            "message fields must be Option<T>, Option<Box<T>> or Vec<T>",
        ));
    } else {
        (Cardinality::Implicit, ty)
    };

    let proto_name = proto_name.unwrap_or_else(|| ident.unraw().to_string());
    let json_name = json_name.unwrap_or_else(|| json_name_of(&proto_name));

    Ok(FieldInfo {
        ident: ident.clone(),
        number,
        cardinality,
        marker: kind.marker(value_ty),
        proto_name,
        json_name,
    })
}

/// Half-open `(start, end)` from `a..b` or `a..=b`.
fn parse_range(range: &ExprRange) -> syn::Result<(u32, u32)> {
    let bound = |expr: Option<&Expr>| -> syn::Result<u32> {
        match expr {
            Some(Expr::Lit(ExprLit {
                lit: Lit::Int(lit), ..
            })) => lit.base10_parse(),
            _ => Err(syn::Error::new_spanned(
                range,
                "extension range bounds must be integer literals",
            )),
        }
    };
    let start = bound(range.start.as_deref())?;
    let mut end = bound(range.end.as_deref())?;
    if matches!(range.limits, RangeLimits::Closed(_)) {
        end = end.saturating_add(1);
    }
    if start == 0 || start >= end || end > MAX_FIELD_NUMBER + 1 {
        return Err(syn::Error::new_spanned(
            range,
            format!("extension range must be non-empty and within 1..={MAX_FIELD_NUMBER}"),
        ));
    }
    Ok((start, end))
}

/// `T` in `Wrapper<T>`, matched on the last path segment.
fn wrapper_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// lowerCamelCase JSON name: underscores dropped, the following letter
/// upper-cased.
fn json_name_of(proto: &str) -> String {
    let mut out = String::with_capacity(proto.len());
    let mut upper_next = false;
    for c in proto.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_name_of() {
        assert_eq!(json_name_of("foo_bar"), "fooBar");
        assert_eq!(json_name_of("foo"), "foo");
        assert_eq!(json_name_of("foo_bar_baz"), "fooBarBaz");
        assert_eq!(json_name_of("a_1b"), "a1b");
        assert_eq!(json_name_of("FooBar"), "FooBar");
    }

    #[test]
    fn test_parse_range_half_open_and_closed() {
        let range: ExprRange = syn::parse_quote!(100..200);
        assert_eq!(parse_range(&range).expect("range"), (100, 200));
        let range: ExprRange = syn::parse_quote!(100..=199);
        assert_eq!(parse_range(&range).expect("range"), (100, 200));
        let range: ExprRange = syn::parse_quote!(5..5);
        assert!(parse_range(&range).is_err());
    }

    #[test]
    fn test_wrapper_inner() {
        let ty: Type = syn::parse_quote!(Option<Box<Node>>);
        let inner = wrapper_inner(&ty, "Option").expect("option");
        assert!(wrapper_inner(inner, "Box").is_some());
        let ty: Type = syn::parse_quote!(u32);
        assert!(wrapper_inner(&ty, "Vec").is_none());
    }

    #[test]
    fn test_parse_message_rejects_missing_unknown() {
        let input: DeriveInput = syn::parse_quote! {
            struct Bare {
                #[field(number = 1, int32)]
                a: Option<i32>,
            }
        };
        assert!(parse_message(&input).is_err());
    }

    #[test]
    fn test_parse_message_rejects_duplicate_numbers() {
        let input: DeriveInput = syn::parse_quote! {
            struct Dup {
                #[field(number = 1, int32)]
                a: Option<i32>,
                #[field(number = 1, string)]
                b: Option<String>,
                #[unknown]
                unknown: UnknownFields,
            }
        };
        assert!(parse_message(&input).is_err());
    }

    #[test]
    fn test_parse_message_sorts_fields_and_names() {
        let input: DeriveInput = syn::parse_quote! {
            #[message(name = "pkg.Sorted", extensions = 100..200)]
            struct Sorted {
                #[field(number = 7, string, json = "custom")]
                b_name: Option<String>,
                #[field(number = 2, sint64, repeated, packed)]
                last_seen: Vec<i64>,
                #[unknown]
                unknown: UnknownFields,
                #[extensions]
                extensions: ExtensionSet,
            }
        };
        let info = parse_message(&input).expect("valid message");
        assert_eq!(info.name, "pkg.Sorted");
        assert_eq!(info.ranges, vec![(100, 200)]);
        let numbers: Vec<u32> = info.fields.iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![2, 7]);
        assert_eq!(info.fields[0].json_name, "lastSeen");
        assert_eq!(info.fields[1].json_name, "custom");
        assert!(info.fields[0].cardinality == Cardinality::Repeated { packed: true });
    }

    #[test]
    fn test_parse_message_rejects_overlapping_extension_ranges() {
        let input: DeriveInput = syn::parse_quote! {
            #[message(extensions = 150..250, extensions = 100..200)]
            struct Overlapping {
                #[unknown]
                unknown: UnknownFields,
                #[extensions]
                extensions: ExtensionSet,
            }
        };
        let err = parse_message(&input).err().expect("overlap rejected");
        assert!(err.to_string().contains("overlap"));

        let input: DeriveInput = syn::parse_quote! {
            #[message(extensions = 200..300, extensions = 100..=199)]
            struct Adjacent {
                #[unknown]
                unknown: UnknownFields,
                #[extensions]
                extensions: ExtensionSet,
            }
        };
        let info = parse_message(&input).expect("adjacent ranges");
        assert_eq!(info.ranges, vec![(100, 200), (200, 300)]);
    }

    #[test]
    fn test_parse_message_rejects_field_in_extension_range() {
        let input: DeriveInput = syn::parse_quote! {
            #[message(extensions = 1..10)]
            struct Overlap {
                #[field(number = 5, int32)]
                a: Option<i32>,
                #[unknown]
                unknown: UnknownFields,
                #[extensions]
                extensions: ExtensionSet,
            }
        };
        assert!(parse_message(&input).is_err());
    }
}
