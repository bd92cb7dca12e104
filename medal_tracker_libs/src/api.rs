use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub trait FieldList {
    fn field_list() -> &'static str;
}

/// Envelope of every JSON response of the API.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl ToString) -> Self {
        Self {
            data: Some(data),
            message: Some(message.to_string()),
        }
    }

    /// A response carrying only a message, used for errors and for operations without a result.
    pub fn message(message: impl ToString) -> Self {
        Self {
            data: None,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn message_response_omits_data() {
        let response = ApiResponse::<Vec<i32>>::message("league not found");
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"message":"league not found"}"#
        );
    }

    #[test]
    fn ok_response_omits_message() {
        let response = ApiResponse::ok(vec![1, 2]);
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"data":[1,2]}"#);
    }
}
