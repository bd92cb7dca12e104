use syn::{punctuated::Punctuated, Attribute, Data, Fields, FieldsNamed, Ident, Meta, Token};

pub fn extract_fields(data: &Data) -> &FieldsNamed {
    match *data {
        Data::Struct(ref data) => match data.fields {
            Fields::Named(ref fields) => fields,
            _ => panic!("all fields must be named."),
        },
        _ => panic!("struct expected, but got other item."),
    }
}

/// Returns true when one of the attributes is `#[<name>(<flag>, ...)]` containing `flag`.
pub fn has_flag(attrs: &[Attribute], name: &str, flag: &str) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(name))
        .filter_map(|attr| match &attr.meta {
            Meta::List(metalist) => {
                let parser = Punctuated::<Ident, Token![,]>::parse_separated_nonempty;
                Some(
                    metalist
                        .parse_args_with(parser)
                        .expect("couldn't parse field attribute"),
                )
            }
            _ => None,
        })
        .any(|flags| flags.iter().any(|ident| ident == flag))
}
