//! Cursor pagination.
//!
//! The incremental export endpoint hands out one page at a time, each with
//! an `after_url` pointing at the next page and an `end_of_stream` flag on
//! the last one. `build_page_list` walks that chain once at startup and
//! keeps the locators so the viewer can jump back and forth by index.

use std::collections::HashSet;
use std::future::Future;

use crate::error::ViewerError;
use crate::models::CursorPage;

/// Somewhere ticket pages can be fetched from.
///
/// `TicketApi` is the real implementation; tests use in-memory sources.
pub trait TicketSource {
    /// Locator of the first page of the paged view.
    fn first_page_locator(&self) -> String;

    /// Fetches the page behind a locator.
    fn fetch_page(
        &self,
        locator: &str,
    ) -> impl Future<Output = Result<CursorPage, ViewerError>> + Send;

    /// Fetches the unpaged ticket set used for single-ticket lookups.
    fn fetch_all(&self) -> impl Future<Output = Result<CursorPage, ViewerError>> + Send;
}

/// Ordered page locators, oldest page first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageList {
    locators: Vec<String>,
}

impl PageList {
    /// Number of pages.
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// True if there are no pages.
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Locator of page `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.locators.get(index).map(String::as_str)
    }

    /// All locators in page order.
    pub fn locators(&self) -> &[String] {
        &self.locators
    }
}

/// Walks the cursor chain from the first page to the end of the stream.
///
/// Every fetched locator is recorded in fetch order; the walk stops at the
/// first page whose `end_of_stream` is true.
///
/// # Errors
///
/// Any fetch failure aborts the walk and the partial list is dropped.
/// A page that continues the stream without an `after_url`, or an
/// `after_url` already seen, is `ViewerError::UnexpectedResponse`.
pub async fn build_page_list<S>(source: &S) -> Result<PageList, ViewerError>
where
    S: TicketSource + ?Sized,
{
    let mut locators = vec![source.first_page_locator()];
    let mut seen: HashSet<String> = locators.iter().cloned().collect();

    let mut page = source.fetch_page(&locators[0]).await?;

    loop {
        let next = match page.next_locator()? {
            Some(next) => next.to_string(),
            None => break,
        };
        if !seen.insert(next.clone()) {
            return Err(ViewerError::unexpected(format!(
                "cursor chain loops back to page {}",
                locators.iter().position(|l| *l == next).map_or(0, |i| i + 1)
            )));
        }
        page = source.fetch_page(&next).await?;
        locators.push(next);
        tracing::debug!(pages = locators.len(), "Followed cursor");
    }

    tracing::debug!(pages = locators.len(), "Page list complete");
    Ok(PageList { locators })
}

/// The page list plus the page currently shown.
///
/// The index always stays within the list; moves past either end are
/// refused rather than applied.
#[derive(Debug, Clone)]
pub struct Navigation {
    pages: PageList,
    current: usize,
}

impl Navigation {
    /// Starts on the first page.
    pub fn new(pages: PageList) -> Self {
        Self { pages, current: 0 }
    }

    /// Index of the current page (0-based).
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True if there are no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// True if there is a page before the current one.
    pub fn has_prev(&self) -> bool {
        self.current > 0
    }

    /// True if there is a page after the current one.
    pub fn has_next(&self) -> bool {
        self.current + 1 < self.pages.len()
    }

    /// Index of the previous page, if any.
    pub fn prev_index(&self) -> Option<usize> {
        self.current.checked_sub(1)
    }

    /// Index of the next page, if any.
    pub fn next_index(&self) -> Option<usize> {
        self.has_next().then_some(self.current + 1)
    }

    /// Locator of page `index`.
    pub fn locator(&self, index: usize) -> Option<&str> {
        self.pages.get(index)
    }

    /// Makes `index` the current page.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Validation` if `index` is out of range; the
    /// current page is left unchanged.
    pub fn move_to(&mut self, index: usize) -> Result<(), ViewerError> {
        if index >= self.pages.len() {
            return Err(ViewerError::validation(format!(
                "page {} does not exist (there are {} pages)",
                index + 1,
                self.pages.len()
            )));
        }
        self.current = index;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory ticket sources shared by the pager and viewer tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use serde_json::{json, Value};

    use super::*;

    /// Serves canned pages by locator; unknown locators fail with
    /// `HttpStatus 404`. Locators listed in `failing` fail once each, and
    /// the fetches numbered in `failing_fetches` (1-based) fail too.
    #[derive(Default)]
    pub struct FakeSource {
        pub pages: HashMap<String, Value>,
        pub all: Option<Value>,
        pub failing: Mutex<Vec<String>>,
        pub failing_fetches: Mutex<Vec<usize>>,
        pub fetches: AtomicUsize,
    }

    pub const FIRST: &str = "https://acme.zendesk.com/cursor.json?per_page=25&start_time=0";

    pub fn locator(n: usize) -> String {
        if n == 0 {
            FIRST.to_string()
        } else {
            format!("https://acme.zendesk.com/cursor.json?cursor=c{}", n)
        }
    }

    pub fn ticket(id: u64, subject: &str) -> Value {
        json!({
            "id": id,
            "type": null,
            "subject": subject,
            "status": "open",
            "requester_id": 1000 + id
        })
    }

    impl FakeSource {
        /// A chain of pages, each holding the given tickets.
        pub fn chain(pages: Vec<Vec<Value>>) -> Self {
            let count = pages.len();
            let mut source = FakeSource::default();
            for (n, tickets) in pages.into_iter().enumerate() {
                let last = n + 1 == count;
                let after_url = if last {
                    Value::Null
                } else {
                    Value::String(locator(n + 1))
                };
                source.pages.insert(
                    locator(n),
                    json!({
                        "tickets": tickets,
                        "end_of_stream": last,
                        "after_url": after_url
                    }),
                );
            }
            source
        }

        pub fn with_all(mut self, tickets: Vec<Value>) -> Self {
            self.all = Some(json!({"tickets": tickets, "end_of_stream": true}));
            self
        }

        pub fn fail_once(&self, locator: &str) {
            self.failing
                .lock()
                .unwrap()
                .push(locator.to_string());
        }

        pub fn fail_fetch(&self, n: usize) {
            self.failing_fetches.lock().unwrap().push(n);
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        fn lookup(&self, locator: &str) -> Result<CursorPage, ViewerError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            let fail = {
                let mut failing = self.failing.lock().unwrap();
                match failing.iter().position(|l| l == locator) {
                    Some(pos) => {
                        failing.remove(pos);
                        true
                    }
                    None => self.failing_fetches.lock().unwrap().contains(&n),
                }
            };
            if fail {
                return Err(ViewerError::HttpStatus {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    body: String::new(),
                });
            }
            let value = if locator == "all" {
                self.all.clone()
            } else {
                self.pages.get(locator).cloned()
            };
            match value {
                Some(value) => Ok(serde_json::from_value(value)?),
                None => Err(ViewerError::HttpStatus {
                    status: reqwest::StatusCode::NOT_FOUND,
                    body: String::new(),
                }),
            }
        }
    }

    impl TicketSource for FakeSource {
        fn first_page_locator(&self) -> String {
            FIRST.to_string()
        }

        async fn fetch_page(&self, locator: &str) -> Result<CursorPage, ViewerError> {
            self.lookup(locator)
        }

        async fn fetch_all(&self) -> Result<CursorPage, ViewerError> {
            self.lookup("all")
        }
    }
}
