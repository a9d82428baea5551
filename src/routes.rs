#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::http::StatusCode;
use poem::{get, post, Endpoint, EndpointExt, Response, Route};
use poem_openapi::OpenApiService;

use crate::routes::version::VersionApi;
use crate::utils::app_state::AppState;
use crate::utils::errors::Errors;

pub mod edition;
pub mod root;
pub mod sample;
pub mod validate_config;
pub mod version;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const API_TITLE    : &str = "Edition Server";
const TEXT_PLAIN   : &str = "text/plain; charset=utf-8";
const TEXT_HTML    : &str = "text/html; charset=utf-8";

// ***************************************************************************
//                                 Routing
// ***************************************************************************
// ---------------------------------------------------------------------------
// make_app:
// ---------------------------------------------------------------------------
/** Assemble the publication routes, which keep their trailing slashes, and
 * the versioned metadata api.  The state is shared read-only by all handlers.
 */
pub fn make_app(state: AppState, api_url: &str) -> impl Endpoint {
    let api_service =
        OpenApiService::new(VersionApi, API_TITLE, env!("CARGO_PKG_VERSION")).server(api_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .at("/", get(root::root))
        .at("/sample/", get(sample::sample))
        .at("/edition/", get(edition::edition))
        .at("/validate_config/", post(validate_config::validate_config))
        .nest("/v1", api_service)
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
        .data(Arc::new(state))
}

// ***************************************************************************
//                            Response Helpers
// ***************************************************************************
pub(crate) fn make_http_200_text(body: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .content_type(TEXT_PLAIN)
        .body(body.to_string())
}

pub(crate) fn make_http_200_html(html: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .content_type(TEXT_HTML)
        .body(html)
}

pub(crate) fn make_http_400(err: Errors) -> Response {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .content_type(TEXT_PLAIN)
        .body(err.to_string())
}

pub(crate) fn make_http_500(err: Errors) -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .content_type(TEXT_PLAIN)
        .body(err.to_string())
}
