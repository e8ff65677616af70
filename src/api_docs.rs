use crate::{calculate, handler, models};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::model::analyze_stream,
        handler::model::analyze_buffered,
    ),
    components(
        schemas(
            // analyze
            models::mdl::AnalyzeRes,
            models::mdl::Unit,
            calculate::BoundingBox,

            // generic error response
            models::error::ResponseError,
        )
    ),
    tags(
        (name = "Model Calculations", description = "Bounding box, volume and surface area of binary STL models")
    )
)]
pub struct ApiDoc;
