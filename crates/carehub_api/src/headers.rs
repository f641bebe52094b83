//! Alert headers attached to write responses and failures.
//!
//! Clients read `x-carehub-alert` for a human message and
//! `x-carehub-params` for the affected id (or entity name on failure).

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use log::debug;

pub const APPLICATION_NAME: &str = "carehub";

pub static ALERT_HEADER: HeaderName = HeaderName::from_static("x-carehub-alert");
pub static ERROR_HEADER: HeaderName = HeaderName::from_static("x-carehub-error");
pub static PARAMS_HEADER: HeaderName = HeaderName::from_static("x-carehub-params");
pub static TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

pub fn entity_created_alert(entity_name: &str, id: &str) -> HeaderMap {
    alert(
        &format!("A new {entity_name} is created with identifier {id}"),
        id,
    )
}

pub fn entity_updated_alert(entity_name: &str, id: &str) -> HeaderMap {
    alert(&format!("A {entity_name} is updated with identifier {id}"), id)
}

pub fn entity_deleted_alert(entity_name: &str, id: &str) -> HeaderMap {
    alert(&format!("A {entity_name} is deleted with identifier {id}"), id)
}

pub fn failure_alert(entity_name: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_lossy(&mut headers, &ERROR_HEADER, &format!("error.{error_key}"));
    insert_lossy(&mut headers, &PARAMS_HEADER, entity_name);
    headers
}

pub fn total_count(count: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER.clone(), HeaderValue::from(count));
    headers
}

fn alert(message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_lossy(&mut headers, &ALERT_HEADER, message);
    insert_lossy(&mut headers, &PARAMS_HEADER, param);
    headers
}

// Ids come from request paths and may hold bytes a header cannot carry.
fn insert_lossy(headers: &mut HeaderMap, name: &HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name.clone(), value);
        }
        Err(_) => debug!("event=alert_header module=api status=skipped header={name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{entity_created_alert, failure_alert, ALERT_HEADER, ERROR_HEADER, PARAMS_HEADER};

    #[test]
    fn created_alert_carries_message_and_id() {
        let headers = entity_created_alert("team", "t-1");
        assert_eq!(
            headers[&ALERT_HEADER],
            "A new team is created with identifier t-1"
        );
        assert_eq!(headers[&PARAMS_HEADER], "t-1");
    }

    #[test]
    fn failure_alert_uses_error_key() {
        let headers = failure_alert("address", "idnull");
        assert_eq!(headers[&ERROR_HEADER], "error.idnull");
        assert_eq!(headers[&PARAMS_HEADER], "address");
    }

    #[test]
    fn unencodable_ids_are_skipped() {
        let headers = entity_created_alert("team", "bad\nid");
        assert!(headers.get(&ALERT_HEADER).is_none());
        assert!(headers.get(&PARAMS_HEADER).is_none());
    }
}
