#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::http::{header, StatusCode};
use poem::web::{Data, Query};
use poem::{handler, Request, Response};
use log::info;

use crate::routes::{make_http_200_html, make_http_400, make_http_500};
use crate::utils::app_state::AppState;
use crate::utils::edition_utils::{self, RequestDebug};
use crate::utils::errors::Errors;
use crate::utils::greetings::{GreetingTable, TimeSlot};

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
/// Subscriber configuration re-supplied on every delivery request.
#[derive(Debug, Default)]
pub struct ReqEdition
{
    lang: Option<String>,
    name: Option<String>,
    local_delivery_time: Option<String>,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqEdition {
    type Req = ReqEdition;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request parameters:");
        s.push_str("\n    lang: ");
        s.push_str(self.lang.as_deref().unwrap_or("<none>"));
        s.push_str("\n    name: ");
        s.push_str(self.name.as_deref().unwrap_or("<none>"));
        s.push_str("\n    local_delivery_time: ");
        s.push_str(self.local_delivery_time.as_deref().unwrap_or("<none>"));
        s
    }
}

impl ReqEdition {
    /** Collect the parameters from the raw query pairs.  A repeated key
     * keeps its last value; unknown keys are ignored.
     */
    pub fn from_params(params: Vec<(String, String)>) -> Self {
        let mut req = ReqEdition::default();
        for (key, value) in params {
            match key.as_str() {
                "lang" => req.lang = Some(value),
                "name" => req.name = Some(value),
                "local_delivery_time" => req.local_delivery_time = Some(value),
                _ => (),
            }
        }
        req
    }
}

/// What a valid edition request resolves to.
#[derive(Debug, PartialEq, Eq)]
pub enum EditionOutcome {
    /// Not a delivery day where the subscriber is.
    NoDelivery,
    /// Deliver the greeting, tagged with its content hash.
    Deliver { etag: String, greeting: String },
}

// ***************************************************************************
//                                Endpoint
// ***************************************************************************
#[handler]
pub fn edition(http_req: &Request, Query(params): Query<Vec<(String, String)>>,
               Data(state): Data<&Arc<AppState>>) -> Response {
    let req = ReqEdition::from_params(params);

    // Conditional logging depending on log level.
    edition_utils::debug_request(http_req, &req);

    let (etag, greeting) = match prepare_edition(&req, &state.greetings) {
        Ok(EditionOutcome::Deliver { etag, greeting }) => (etag, greeting),
        Ok(EditionOutcome::NoDelivery) => {
            return Response::builder().status(StatusCode::NO_CONTENT).finish();
        }
        Err(e) => {
            info!("Edition request rejected: {}", e);
            return make_http_400(e);
        }
    };

    // A client that already holds today's edition gets nothing new.
    let etag_value = edition_utils::etag_header_value(&etag);
    let not_modified = http_req.headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| edition_utils::etag_matches(v, &etag));
    if not_modified {
        return Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, etag_value)
            .finish();
    }

    match state.render_edition(&greeting) {
        Ok(html) => {
            let mut resp = make_http_200_html(html);
            if let Ok(v) = etag_value.parse() {
                resp.headers_mut().insert(header::ETAG, v);
            }
            resp
        },
        Err(e) => make_http_500(e),
    }
}

// ***************************************************************************
//                          Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// prepare_edition:
// ---------------------------------------------------------------------------
/** Validate the request parameters in the order lang, name, delivery time,
 * stopping at the first failure.  Valid requests are then gated on the
 * subscriber's local weekday before a greeting and tag are produced.
 */
pub fn prepare_edition(req: &ReqEdition, table: &GreetingTable) -> Result<EditionOutcome, Errors> {
    let lang = match req.lang.as_deref() {
        Some(l) if table.contains(l) => l,
        _ => return Err(Errors::InvalidLang),
    };
    let name = match req.name.as_deref() {
        Some(n) if !n.is_empty() => n,
        _ => return Err(Errors::MissingName),
    };
    let delivery_time = req.local_delivery_time.as_deref()
        .ok_or(Errors::InvalidDeliveryTime)
        .and_then(|t| edition_utils::parse_delivery_time(t)
                        .map_err(|_| Errors::InvalidDeliveryTime))?;

    if !edition_utils::is_delivery_day(&delivery_time) {
        return Ok(EditionOutcome::NoDelivery);
    }

    let slot = TimeSlot::from_hour(edition_utils::local_hour(&delivery_time));
    let greeting = table.salutation(lang, slot, name).ok_or(Errors::InvalidLang)?;
    let etag = edition_utils::compute_etag(lang, name, &delivery_time);

    Ok(EditionOutcome::Deliver { etag, greeting })
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::http::StatusCode;

    use super::{prepare_edition, EditionOutcome, ReqEdition};
    use crate::routes::tests::{body_string, test_client};
    use crate::utils::errors::Errors;
    use crate::utils::greetings::GreetingTable;

    fn req(lang: Option<&str>, name: Option<&str>, time: Option<&str>) -> ReqEdition {
        ReqEdition {
            lang: lang.map(str::to_string),
            name: name.map(str::to_string),
            local_delivery_time: time.map(str::to_string),
        }
    }

    fn greeting_at(time: &str) -> String {
        let table = GreetingTable::new();
        match prepare_edition(&req(Some("english"), Some("Alice"), Some(time)), &table) {
            Ok(EditionOutcome::Deliver { greeting, .. }) => greeting,
            other => panic!("expected delivery, got {:?}", other),
        }
    }

    #[test]
    fn validation_order() {
        let table = GreetingTable::new();
        let all_bad = req(None, None, Some("not-a-date"));
        assert_eq!(prepare_edition(&all_bad, &table), Err(Errors::InvalidLang));
        let bad_lang = req(Some("English"), Some("Alice"), Some("2013-10-14T09:00:00-08:00"));
        assert_eq!(prepare_edition(&bad_lang, &table), Err(Errors::InvalidLang));
        let no_name = req(Some("english"), Some(""), Some("not-a-date"));
        assert_eq!(prepare_edition(&no_name, &table), Err(Errors::MissingName));
        let bad_time = req(Some("english"), Some("Alice"), Some("not-a-date"));
        assert_eq!(prepare_edition(&bad_time, &table), Err(Errors::InvalidDeliveryTime));
        let no_time = req(Some("english"), Some("Alice"), None);
        assert_eq!(prepare_edition(&no_time, &table), Err(Errors::InvalidDeliveryTime));
    }

    #[test]
    fn repeated_parameters_keep_last_value() {
        let pairs = [("lang", "french"), ("name", "Al"), ("lang", "english"), ("utm", "x")];
        let req = ReqEdition::from_params(
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect());
        assert_eq!(req.lang.as_deref(), Some("english"));
        assert_eq!(req.name.as_deref(), Some("Al"));
        assert!(req.local_delivery_time.is_none());
    }

    #[test]
    fn only_mondays_are_delivered() {
        let table = GreetingTable::new();
        // Tuesday 15th through Sunday 20th October 2013.
        for day in 15..=20 {
            let time = format!("2013-10-{}T09:00:00-08:00", day);
            let r = req(Some("english"), Some("Alice"), Some(&time));
            assert_eq!(prepare_edition(&r, &table), Ok(EditionOutcome::NoDelivery), "{}", time);
        }
    }

    #[test]
    fn greeting_follows_local_hour() {
        assert_eq!(greeting_at("2013-10-14T04:00:00-08:00"), "Good morning, Alice");
        assert_eq!(greeting_at("2013-10-14T11:59:59-08:00"), "Good morning, Alice");
        assert_eq!(greeting_at("2013-10-14T12:00:00+09:00"), "Hello, Alice");
        assert_eq!(greeting_at("2013-10-14T17:30:00+00:00"), "Hello, Alice");
        assert_eq!(greeting_at("2013-10-14T18:00:00-08:00"), "Good evening, Alice");
        assert_eq!(greeting_at("2013-10-14T23:20:30-08:00"), "Good evening, Alice");
        assert_eq!(greeting_at("2013-10-14T00:00:00-08:00"), "Good evening, Alice");
        assert_eq!(greeting_at("2013-10-14T03:59:00-08:00"), "Good evening, Alice");
    }

    #[tokio::test]
    async fn missing_lang_is_400() {
        let cli = test_client();
        let resp = cli.get("/edition/?name=Alice&local_delivery_time=2013-10-14T09:00:00-08:00")
            .send().await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "Error: Invalid or missing lang parameter");
    }

    #[tokio::test]
    async fn missing_name_is_400() {
        let cli = test_client();
        let resp = cli.get("/edition/?lang=french&name=&local_delivery_time=2013-10-14T09:00:00-08:00")
            .send().await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "Error: No name provided");
    }

    #[tokio::test]
    async fn bad_time_is_400() {
        let cli = test_client();
        let resp = cli.get("/edition/?lang=english&name=Alice&local_delivery_time=not-a-date")
            .send().await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "Error: Invalid or missing local_delivery_time");
    }

    #[tokio::test]
    async fn repeated_query_key_uses_last() {
        let cli = test_client();
        let resp = cli.get("/edition/?lang=french&lang=english&name=Al&local_delivery_time=2013-10-14T09:00:00-08:00")
            .send().await;
        resp.assert_status_is_ok();
        assert!(body_string(resp).await.contains("Good morning, Al"));

        let resp = cli.get("/edition/?lang=english&lang=klingon&name=Al&local_delivery_time=2013-10-14T09:00:00-08:00")
            .send().await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "Error: Invalid or missing lang parameter");
    }

    #[tokio::test]
    async fn non_monday_is_204() {
        let cli = test_client();
        let resp = cli.get("/edition/?lang=english&name=Alice&local_delivery_time=2013-10-16T23:20:30-08:00")
            .send().await;
        resp.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn monday_edition_is_tagged() {
        let cli = test_client();
        let uri = "/edition/?lang=german&name=Ada&local_delivery_time=2013-10-14T19:00:00%2B02:00";

        let first = cli.get(uri).send().await;
        first.assert_status_is_ok();
        first.assert_content_type("text/html; charset=utf-8");
        let etag = first.0.headers().get("etag").expect("etag header")
            .to_str().unwrap().to_string();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert!(body_string(first).await.contains("Guten abend, Ada"));

        // Same subscriber later the same day: same tag.
        let later = cli.get("/edition/?lang=german&name=Ada&local_delivery_time=2013-10-14T21:00:00%2B02:00")
            .send().await;
        later.assert_header("etag", etag.as_str());

        // Different name: new tag.
        let other = cli.get("/edition/?lang=german&name=Bea&local_delivery_time=2013-10-14T19:00:00%2B02:00")
            .send().await;
        let other_etag = other.0.headers().get("etag").expect("etag header")
            .to_str().unwrap().to_string();
        assert_ne!(etag, other_etag);
    }

    #[tokio::test]
    async fn matching_if_none_match_is_304() {
        let cli = test_client();
        let uri = "/edition/?lang=italian&name=Luca&local_delivery_time=2013-10-14T08:00:00-05:00";
        let first = cli.get(uri).send().await;
        let etag = first.0.headers().get("etag").expect("etag header")
            .to_str().unwrap().to_string();

        let resp = cli.get(uri).header("If-None-Match", etag.as_str()).send().await;
        resp.assert_status(StatusCode::NOT_MODIFIED);
        resp.assert_header("etag", etag.as_str());
        assert_eq!(body_string(resp).await, "");

        let resp = cli.get(uri).header("If-None-Match", "\"stale\"").send().await;
        resp.assert_status_is_ok();
        assert!(body_string(resp).await.contains("Buongiorno, Luca"));
    }
}
