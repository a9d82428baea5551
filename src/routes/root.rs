#![forbid(unsafe_code)]

use poem::{handler, Response};

use crate::routes::make_http_200_text;

const PUBLICATION_BANNER: &str = "A Little Printer publication.";

// ***************************************************************************
//                                Endpoint
// ***************************************************************************
#[handler]
pub fn root() -> Response {
    make_http_200_text(PUBLICATION_BANNER)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use crate::routes::tests::{body_string, test_client};

    #[tokio::test]
    async fn root_identifies_publication() {
        let cli = test_client();
        let resp = cli.get("/").send().await;
        resp.assert_status_is_ok();
        resp.assert_content_type("text/plain; charset=utf-8");
        assert_eq!(body_string(resp).await, "A Little Printer publication.");
    }
}
