#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::web::Data;
use poem::{handler, Response};

use crate::routes::{make_http_200_html, make_http_500};
use crate::utils::app_state::AppState;
use crate::utils::errors::Errors;
use crate::utils::greetings::TimeSlot;

// The preview shown on the publication's listing page.
const SAMPLE_LANG: &str = "english";
const SAMPLE_NAME: &str = "Little Printer";

// ***************************************************************************
//                                Endpoint
// ***************************************************************************
#[handler]
pub fn sample(Data(state): Data<&Arc<AppState>>) -> Response {
    let rendered = state.greetings
        .salutation(SAMPLE_LANG, TimeSlot::Morning, SAMPLE_NAME)
        .ok_or(Errors::RenderEdition)
        .and_then(|greeting| state.render_edition(&greeting));

    match rendered {
        Ok(html) => make_http_200_html(html),
        Err(e) => make_http_500(e),
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use crate::routes::tests::{body_string, test_client};

    #[tokio::test]
    async fn sample_greets_little_printer() {
        let cli = test_client();
        let resp = cli.get("/sample/").send().await;
        resp.assert_status_is_ok();
        resp.assert_content_type("text/html; charset=utf-8");
        let body = body_string(resp).await;
        assert!(body.contains("Good morning, Little Printer"));
    }
}
