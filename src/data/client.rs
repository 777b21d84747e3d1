use crate::data::annotations::AnnotationMap;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::mpsc::Sender;
use std::thread;

/// HTTP client for the calendar server. Cloning shares the underlying agent,
/// so per-fetch worker threads are cheap.
#[derive(Clone)]
pub struct EventClient {
    base_url: String,
    agent: ureq::Agent,
}

impl EventClient {
    pub fn new(base_url: &str) -> Self {
        EventClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// Month is 1-based and unpadded in the path.
    pub fn events_url(&self, year: i32, month: u32) -> String {
        format!("{}/calendar/events/{}/{}", self.base_url, year, month)
    }

    /// The "add event" page for one date, zero-padded to YYYY-MM-DD. The
    /// destination is an external collaborator; we only build the URL.
    pub fn add_event_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/calendar/add?date={}",
            self.base_url,
            date.format("%Y-%m-%d")
        )
    }

    /// One GET for the month's per-day event counts. Any non-2xx status or
    /// unparsable body is a failure; the caller decides what to do with it.
    pub fn fetch_month(&self, year: i32, month: u32) -> Result<AnnotationMap> {
        let url = self.events_url(year, month);
        let response = self
            .agent
            .get(&url)
            .call()
            .with_context(|| format!("request to {} failed", url))?;
        response
            .into_json::<AnnotationMap>()
            .with_context(|| format!("malformed event counts from {}", url))
    }
}

/// Result of one background fetch, tagged with the (year, 1-based month) it
/// was issued for so stale responses can be discarded after navigation.
#[derive(Debug)]
pub struct FetchOutcome {
    pub year: i32,
    pub month: u32,
    pub result: Result<AnnotationMap>,
}

/// Runs `fetch_month` on a worker thread and delivers the tagged outcome
/// over `tx`. Never blocks the caller; a dropped receiver is ignored.
pub fn spawn_fetch(client: &EventClient, year: i32, month: u32, tx: Sender<FetchOutcome>) {
    let client = client.clone();
    thread::spawn(move || {
        let result = client.fetch_month(year, month);
        let _ = tx.send(FetchOutcome { year, month, result });
    });
}
