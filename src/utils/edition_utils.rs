#![forbid(unsafe_code)]

use path_absolutize::Absolutize;
use std::ops::Deref;
use std::path::Path;
use chrono::{DateTime, Datelike, FixedOffset, ParseError, Timelike, Weekday};
use sha2::{Digest, Sha256};

use poem::Request;

use log::{debug, LevelFilter};

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_absolute_path:
// ---------------------------------------------------------------------------
/** Replace tilde (~) and environment variable values in a path name and
 * then construct the absolute path name.  The difference between
 * absolutize and standard canonicalize methods is that absolutize does not
 * care about whether the file exists and what the file really is.
 */
pub fn get_absolute_path(path: &str) -> String {
    // Replace ~ and environment variable values if possible.
    // On error, return the string version of the original path.
    let s = match shellexpand::full(path) {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };

    // Convert to absolute path if necessary.
    // Return original input on error.
    let p = Path::new(s.deref());
    let p1 = match p.absolutize() {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };
    let p2 = match p1.to_str() {
        Some(x) => x,
        None => return path.to_owned(),
    };

    p2.to_owned()
}

// ---------------------------------------------------------------------------
// parse_delivery_time:
// ---------------------------------------------------------------------------
/** Parse a local delivery time such as 2013-10-16T23:20:30-08:00 into a
 * DateTime that keeps the subscriber's offset.
 *
 * An unencoded '+' in a query string decodes to a space, so a value like
 * "2013-10-14T09:00:00 01:00" gets its sign restored and one more attempt.
 */
pub fn parse_delivery_time(ts: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    let ts = ts.trim_start();
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => Ok(dt),
        Err(e) => {
            match restore_offset_sign(ts) {
                Some(fixed) => DateTime::parse_from_rfc3339(&fixed),
                None => Err(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// is_delivery_day:
// ---------------------------------------------------------------------------
/** Editions only go out on Mondays in the subscriber's own timezone. */
pub fn is_delivery_day(dt: &DateTime<FixedOffset>) -> bool {
    dt.weekday() == Weekday::Mon
}

// ---------------------------------------------------------------------------
// local_hour:
// ---------------------------------------------------------------------------
pub fn local_hour(dt: &DateTime<FixedOffset>) -> u32 {
    dt.hour()
}

// ---------------------------------------------------------------------------
// delivery_date_str:
// ---------------------------------------------------------------------------
/** The local calendar date as DDMMYYYY. */
pub fn delivery_date_str(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%d%m%Y").to_string()
}

// ---------------------------------------------------------------------------
// compute_etag:
// ---------------------------------------------------------------------------
/** Hex digest of the content determining inputs: language, name and local
 * date.  The same subscriber gets the same tag all day; a change to any
 * input produces a new one.
 */
pub fn compute_etag(lang: &str, name: &str, dt: &DateTime<FixedOffset>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(lang.as_bytes());
    hasher.update(name.as_bytes());
    hasher.update(delivery_date_str(dt).as_bytes());
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// etag_header_value:
// ---------------------------------------------------------------------------
/** Strong ETag header form of a tag. */
pub fn etag_header_value(etag: &str) -> String {
    format!("\"{}\"", etag)
}

// ---------------------------------------------------------------------------
// etag_matches:
// ---------------------------------------------------------------------------
/** Check an If-None-Match header value against our tag.  The header may
 * list several tags, weak or strong, or be the wildcard.
 */
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        if candidate == "*" {
            return true;
        }
        let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
        candidate.trim_matches('"') == etag
    })
}

// ***************************************************************************
//                                  Traits
// ***************************************************************************
pub trait RequestDebug {
    type Req;
    fn get_request_info(&self) -> String;
}

// ---------------------------------------------------------------------------
// debug_request:
// ---------------------------------------------------------------------------
// Dump http request information to the log.
pub fn debug_request(http_req: &Request, req: &impl RequestDebug) {
    // Check that debug or higher logging is in effect.
    let level = log::max_level();
    if level < LevelFilter::Debug {
        return;
    }

    // Accumulate the output.
    let mut s = "\n".to_string();

    // Restate the URI.
    let uri = http_req.uri();
    s += format!("  URI: {:?}\n", uri).as_str();

    // Accumulate the headers
    let it = http_req.headers().iter();
    for v in it {
         s += format!("  Header: {} = {:?} \n", v.0, v.1).as_str();
    };

    // List query parameters.
    if let Some(q) = uri.query() {
        s += format!("  Query Parameters: {:?}\n", q).as_str();
    } else {
        s += "  * No Query Parameters\n";
    }

    // Add the request's information.
    s += req.get_request_info().as_str();

    // Write the single log record.
    debug!("{}", s);
}

// ***************************************************************************
// PRIVATE FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// restore_offset_sign:
// ---------------------------------------------------------------------------
/** Return the timestamp with a '+' put back in place of the space that
 * precedes a trailing hh:mm offset, or None if there is no such space.
 */
fn restore_offset_sign(ts: &str) -> Option<String> {
    let idx = ts.rfind(' ')?;
    let offset = &ts[idx + 1..];
    let well_formed = offset.len() == 5
        && offset.as_bytes()[2] == b':'
        && offset.bytes().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !well_formed || idx == 0 {
        return None;
    }
    Some(format!("{}+{}", &ts[..idx], offset))
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offset_time_without_converting() {
        let dt = parse_delivery_time("2013-10-16T23:20:30-08:00").unwrap();
        assert_eq!(local_hour(&dt), 23);
        assert_eq!(dt.weekday(), Weekday::Wed);
        assert_eq!(delivery_date_str(&dt), "16102013");
    }

    #[test]
    fn monday_in_local_time_only() {
        // Sunday evening in California is already Monday in UTC.
        let dt = parse_delivery_time("2013-10-13T20:00:00-08:00").unwrap();
        assert!(!is_delivery_day(&dt));
        let dt = parse_delivery_time("2013-10-14T00:30:00+02:00").unwrap();
        assert!(is_delivery_day(&dt));
    }

    #[test]
    fn restores_decoded_plus_sign() {
        let dt = parse_delivery_time("2013-10-14T09:00:00 01:00").unwrap();
        assert_eq!(local_hour(&dt), 9);
        assert_eq!(dt.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_delivery_time("not-a-date").is_err());
        assert!(parse_delivery_time("").is_err());
        assert!(parse_delivery_time("2013-10-14 09:00").is_err());
        assert!(parse_delivery_time("2013-10-14T09:00:00").is_err());
    }

    #[test]
    fn etag_is_stable_per_day() {
        let morning = parse_delivery_time("2013-10-14T08:00:00-08:00").unwrap();
        let evening = parse_delivery_time("2013-10-14T21:45:00-08:00").unwrap();
        let next = parse_delivery_time("2013-10-21T08:00:00-08:00").unwrap();

        let tag = compute_etag("english", "Alice", &morning);
        assert_eq!(tag.len(), 64);
        assert_eq!(tag, compute_etag("english", "Alice", &evening));
        assert_ne!(tag, compute_etag("english", "Alicia", &morning));
        assert_ne!(tag, compute_etag("french", "Alice", &morning));
        assert_ne!(tag, compute_etag("english", "Alice", &next));
    }

    #[test]
    fn if_none_match_forms() {
        assert!(etag_matches("\"abc\"", "abc"));
        assert!(etag_matches("W/\"abc\"", "abc"));
        assert!(etag_matches("\"xyz\", \"abc\"", "abc"));
        assert!(etag_matches("*", "abc"));
        assert!(!etag_matches("\"abcd\"", "abc"));
        assert_eq!(etag_header_value("abc"), "\"abc\"");
    }
}
