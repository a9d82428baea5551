#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::web::{Data, Form, Json, Multipart, Query};
use poem::{handler, IntoResponse, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::info;

use crate::routes::make_http_400;
use crate::utils::app_state::AppState;
use crate::utils::edition_utils::{self, RequestDebug};
use crate::utils::errors::Errors;
use crate::utils::greetings::GreetingTable;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const MSG_CHOOSE_LANGUAGE: &str = "Please choose a language from the menu.";
const MSG_ENTER_NAME:      &str = "Please enter your name into the name box.";

// The request parameter carrying the subscriber's choices as JSON.
const CONFIG_PARAM: &str = "config";

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
/// The decoded contents of the config parameter.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SubscriberConfig
{
    name: Option<String>,
    lang: Option<String>,
}

impl RequestDebug for SubscriberConfig {
    type Req = SubscriberConfig;
    fn get_request_info(&self) -> String {
        format!("  Subscriber config:\n    name: {:?}\n    lang: {:?}", self.name, self.lang)
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RespValidateConfig
{
    valid: bool,
    errors: Vec<String>,
}

// ***************************************************************************
//                                Endpoint
// ***************************************************************************
/** The config parameter normally arrives in the request body, either form
 * urlencoded or multipart.  The query string is consulted when the body
 * doesn't have it.
 */
#[handler]
pub async fn validate_config(http_req: &Request,
                             Query(query): Query<Vec<(String, String)>>,
                             multipart: Option<Multipart>,
                             form: Option<Form<Vec<(String, String)>>>,
                             Data(state): Data<&Arc<AppState>>) -> Response {
    let body_config = match (multipart, form) {
        (Some(m), _) => multipart_config(m).await,
        (None, Some(Form(params))) => last_config(params),
        (None, None) => None,
    };
    let raw = body_config.or_else(|| last_config(query));

    let config = match raw.as_deref().map(decode_config) {
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            info!("Config validation request rejected: {}", e);
            return make_http_400(e);
        },
        None => {
            info!("Config validation request rejected: {}", Errors::MissingConfig);
            return make_http_400(Errors::MissingConfig);
        },
    };

    // Conditional logging depending on log level.
    edition_utils::debug_request(http_req, &config);

    Json(validate(&config, &state.greetings)).into_response()
}

// ***************************************************************************
//                          Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// decode_config:
// ---------------------------------------------------------------------------
/** Decode the JSON config.  Anything that isn't an object with optional
 * string fields is rejected.
 */
pub fn decode_config(raw: &str) -> Result<SubscriberConfig, Errors> {
    let malformed = |e: serde_json::Error| {
        info!("Unable to decode config {:?}: {}", raw, e);
        Errors::MalformedConfig
    };

    // Derived struct decoding also takes arrays, so check the shape first.
    let value: Value = serde_json::from_str(raw).map_err(malformed)?;
    if !value.is_object() {
        info!("Unable to decode config {:?}: not a JSON object", raw);
        return Err(Errors::MalformedConfig);
    }
    serde_json::from_value(value).map_err(malformed)
}

// ---------------------------------------------------------------------------
// validate:
// ---------------------------------------------------------------------------
/** Run every check and collect all of the problems so the subscriber can
 * fix them at once.  An empty language is reported only as a missing
 * choice; an absent one also fails the lookup.
 */
pub fn validate(config: &SubscriberConfig, table: &GreetingTable) -> RespValidateConfig {
    let mut errors = Vec::new();

    let lang = config.lang.as_deref();
    if lang.map_or(true, str::is_empty) {
        errors.push(MSG_CHOOSE_LANGUAGE.to_string());
    }

    if config.name.as_deref().map_or(true, str::is_empty) {
        errors.push(MSG_ENTER_NAME.to_string());
    }

    match lang {
        Some("") => (),
        Some(l) if table.contains(&l.to_lowercase()) => (),
        _ => errors.push(format!(
            "We couldn't find the language you selected ({}). Please choose another.",
            lang.unwrap_or_default())),
    }

    RespValidateConfig { valid: errors.is_empty(), errors }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// last_config:
// ---------------------------------------------------------------------------
/** The last config value among the request parameters. */
fn last_config(params: Vec<(String, String)>) -> Option<String> {
    params.into_iter()
        .filter(|(key, _)| key == CONFIG_PARAM)
        .map(|(_, value)| value)
        .last()
}

// ---------------------------------------------------------------------------
// multipart_config:
// ---------------------------------------------------------------------------
/** The last config field of a multipart body.  A body that can't be read
 * is treated as having no config.
 */
async fn multipart_config(mut multipart: Multipart) -> Option<String> {
    let mut config = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                info!("Unable to read multipart config body: {}", e);
                break;
            }
        };
        if field.name() == Some(CONFIG_PARAM) {
            match field.text().await {
                Ok(text) => config = Some(text),
                Err(e) => info!("Unable to read multipart config field: {}", e),
            }
        }
    }
    config
}
