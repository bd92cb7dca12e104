pub mod api;
pub mod clock;
pub mod country;
pub mod scoring;

pub use api::FieldList;
pub use medal_tracker_derive::FieldList;

#[cfg(test)]
mod test {
    use crate::api::FieldList;
    use medal_tracker_derive::FieldList;

    #[allow(dead_code)]
    #[derive(FieldList)]
    struct MedalRow {
        id: i64,
        country_code: String,
        gold: i32,
        #[field_list(skip)]
        points: i64,
    }

    #[test]
    fn test_field_list() {
        assert_eq!(MedalRow::field_list(), "id,country_code,gold");
    }
}
