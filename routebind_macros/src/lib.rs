use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericArgument, PathArguments, Type};

const PATH_SOURCE: &str = "path";

struct BoundField {
    field: String,
    key: String,
    source: String,
    kind: &'static str,
}

/// Derives `routebind::binding::Bindable` for a named-field struct.
///
/// Every field must carry a `#[bind(...)]` descriptor naming its decoding
/// source, optionally with a renamed lookup key:
///
/// ```ignore
/// #[derive(serde::Deserialize, routebind::Bindable)]
/// struct EchoRequest {
///     #[bind(path)]
///     id: i64,
///     #[bind(query)]
///     message: String,
///     #[bind(header = "x-token")]
///     token: String,
/// }
/// ```
///
/// `path` is the distinguished path-parameter source; any other identifier
/// is looked up as a decoder tag in the binder registry at request time.
#[proc_macro_derive(Bindable, attributes(bind))]
pub fn derive_bindable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let type_name = ident.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "Bindable requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Bindable can only be derived for structs",
            ))
        }
    };

    let mut bound = Vec::with_capacity(fields.len());
    for field in fields {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let field_name = field_ident.to_string();

        let attr = field
            .attrs
            .iter()
            .find(|a| a.path().is_ident("bind"))
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    field_ident,
                    format!("field `{field_name}` is missing a #[bind(...)] descriptor"),
                )
            })?;

        let mut source: Option<String> = None;
        let mut key: Option<String> = None;
        attr.parse_nested_meta(|meta| {
            if source.is_some() {
                return Err(meta.error("a field declares exactly one binding source"));
            }
            let name = meta
                .path
                .get_ident()
                .ok_or_else(|| meta.error("expected a binding source name"))?
                .to_string();
            if meta.input.peek(syn::Token![=]) {
                let lit: syn::LitStr = meta.value()?.parse()?;
                key = Some(lit.value());
            }
            source = Some(name);
            Ok(())
        })?;
        let source = source.ok_or_else(|| {
            syn::Error::new_spanned(attr, "expected #[bind(<source>)] or #[bind(<source> = \"key\")]")
        })?;

        bound.push(BoundField {
            key: key.unwrap_or_else(|| field_name.clone()),
            field: field_name,
            source,
            kind: classify(&field.ty),
        });
    }

    let has_path = bound.iter().any(|b| b.source == PATH_SOURCE);
    let mut sources: Vec<&str> = Vec::new();
    for b in &bound {
        if b.source != PATH_SOURCE && !sources.iter().any(|s| *s == b.source) {
            sources.push(&b.source);
        }
    }

    let field_entries = bound.iter().map(|b| {
        let field = &b.field;
        let key = &b.key;
        let source = &b.source;
        let kind = format_ident!("{}", b.kind);
        quote! {
            ::routebind::binding::FieldBinding {
                field: #field,
                key: #key,
                source: #source,
                kind: ::routebind::binding::FieldKind::#kind,
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::routebind::binding::Bindable for #ident #ty_generics #where_clause {
            fn binding_spec() -> &'static ::routebind::binding::BindingSpec {
                static SPEC: ::routebind::binding::BindingSpec = ::routebind::binding::BindingSpec {
                    type_name: #type_name,
                    fields: &[#(#field_entries),*],
                    sources: &[#(#sources),*],
                    has_path: #has_path,
                };
                &SPEC
            }
        }
    })
}

/// Maps the declared field type to the coercion applied to raw string
/// sources. `Option<T>` is classified by its inner type; unrecognized
/// types fall back to `Any` (parsed as JSON, else kept as a string).
fn classify(ty: &Type) -> &'static str {
    let Type::Path(path) = ty else { return "Any" };
    let Some(segment) = path.path.segments.last() else {
        return "Any";
    };
    match segment.ident.to_string().as_str() {
        "Option" => {
            if let PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(GenericArgument::Type(inner)) = args.args.first() {
                    return classify(inner);
                }
            }
            "Any"
        }
        "String" | "str" => "String",
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            "Integer"
        }
        "f32" | "f64" => "Number",
        "bool" => "Boolean",
        _ => "Any",
    }
}
