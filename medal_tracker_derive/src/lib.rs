mod field_list;
mod helper;

use field_list::impl_field_list;
use proc_macro::TokenStream;

/// Derives `FieldList`, a comma separated list of the struct's column names.
///
/// Fields marked `#[field_list(skip)]` are left out of the list.
#[proc_macro_derive(FieldList, attributes(field_list))]
pub fn derive_field_list(input: TokenStream) -> TokenStream {
    impl_field_list(input.into()).into()
}
