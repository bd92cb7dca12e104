use crate::helper;
use proc_macro2::TokenStream;
use syn::DeriveInput;

pub fn impl_field_list(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse2(input).expect("failed to parse input token stream");

    let struct_name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let fields = helper::extract_fields(&ast.data)
        .named
        .iter()
        .filter(|field| !helper::has_flag(&field.attrs, "field_list", "skip"))
        .filter_map(|field| field.ident.as_ref().map(|ident| ident.to_string()))
        .collect::<Vec<String>>();
    let field_list = fields.join(",");

    quote::quote! {
        impl #impl_generics FieldList for #struct_name #ty_generics #where_clause {
            fn field_list() -> &'static str {
                #field_list
            }
        }
    }
}
