use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ResponseError {
    // "error"
    #[schema(example = "error")]
    pub status: String,

    // machine readable condition, e.g. "malformed_input" or "premature_end"
    #[schema(example = "unsupported_format")]
    pub kind: String,

    // this describes the reason for the error, can be directly shown to the user
    #[schema(example = "the reason for the error")]
    pub message: String,
}
