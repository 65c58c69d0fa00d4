//! The interactive viewer loop.
//!
//! `Viewer` is a small synchronous state machine: it builds the page list
//! once, then alternates between reading a menu command and showing either
//! a page of tickets or a single ticket, until the user quits. Fetch
//! failures are reported and the menu comes back with the page unchanged.

use std::io::{BufRead, Write};
use std::time::Duration;

use crate::config::DEFAULT_RETRY_DELAY_SECS;
use crate::error::{ViewerError, NOT_FOUND_MESSAGE};
use crate::pager::{build_page_list, Navigation, PageList, TicketSource};
use crate::prompt::{Command, Prompter};
use crate::table::{render_single, TicketTable};

/// Greeting printed on start.
pub const WELCOME_MESSAGE: &str = "Welcome to the ticket viewer.";
/// Farewell printed on quit.
pub const FAREWELL_MESSAGE: &str = "Thank you for using the viewer. Bye!";
/// Printed when a response holds no tickets.
pub const NO_TICKETS_MESSAGE: &str = "There are no tickets to view at this time.";
/// Printed before another attempt at building the page list.
pub const RETRY_MESSAGE: &str = "Trying again ... Press Ctrl+C to exit the program.";

/// Interactive ticket viewer over a ticket source and a terminal.
pub struct Viewer<S, R, W> {
    source: S,
    prompter: Prompter<R, W>,
    retry_delay: Duration,
    max_page_list_attempts: Option<u32>,
}

impl<S, R, W> Viewer<S, R, W>
where
    S: TicketSource,
    R: BufRead,
    W: Write,
{
    /// Creates a viewer that retries the page list forever.
    pub fn new(source: S, prompter: Prompter<R, W>) -> Self {
        Self {
            source,
            prompter,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            max_page_list_attempts: None,
        }
    }

    /// Sets the pause between page list attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Gives up on the page list after `attempts` failures.
    pub fn with_max_page_list_attempts(mut self, attempts: u32) -> Self {
        self.max_page_list_attempts = Some(attempts);
        self
    }

    /// Gives back the prompter, e.g. to inspect output in tests.
    pub fn into_prompter(self) -> Prompter<R, W> {
        self.prompter
    }

    /// Runs the viewer until the user quits or input ends.
    ///
    /// # Errors
    ///
    /// Only terminal I/O failures end the loop with an error; every fetch
    /// or data failure is reported and the menu is shown again.
    pub async fn run(&mut self) -> Result<(), ViewerError> {
        self.prompter.say(WELCOME_MESSAGE)?;

        let Some(pages) = self.load_page_list().await? else {
            return Ok(());
        };
        let mut nav = Navigation::new(pages);

        match self.menu_loop(&mut nav).await {
            Ok(()) | Err(ViewerError::InputClosed) => {}
            Err(e) => return Err(e),
        }

        self.prompter.say(FAREWELL_MESSAGE)?;
        Ok(())
    }

    /// Reads and dispatches commands until `Quit`.
    ///
    /// The first menu offers no page moves since no page is shown yet.
    async fn menu_loop(&mut self, nav: &mut Navigation) -> Result<(), ViewerError> {
        let mut command = self.prompter.get_valid_input(false, false)?;
        loop {
            match command {
                Command::Quit => return Ok(()),
                Command::ViewSingle => self.show_single().await?,
                Command::ViewAll => {
                    let current = nav.current();
                    self.show_page(nav, Some(current)).await?;
                }
                Command::NextPage => {
                    let target = nav.next_index();
                    self.show_page(nav, target).await?;
                }
                Command::PrevPage => {
                    let target = nav.prev_index();
                    self.show_page(nav, target).await?;
                }
            }
            command = self
                .prompter
                .get_valid_input(nav.has_prev(), nav.has_next())?;
        }
    }

    /// Builds the page list, retrying after each failure.
    ///
    /// Returns `None` once the attempt limit is reached.
    async fn load_page_list(&mut self) -> Result<Option<PageList>, ViewerError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match build_page_list(&self.source).await {
                Ok(pages) => {
                    tracing::info!(pages = pages.len(), "Page list ready");
                    return Ok(Some(pages));
                }
                Err(e) => {
                    self.report(&e)?;
                    if self
                        .max_page_list_attempts
                        .is_some_and(|max| attempts >= max)
                    {
                        tracing::warn!(attempts, "Giving up on the page list");
                        return Ok(None);
                    }
                    self.prompter.say(RETRY_MESSAGE)?;
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// Fetches and shows page `target`, making it current on success.
    async fn show_page(
        &mut self,
        nav: &mut Navigation,
        target: Option<usize>,
    ) -> Result<(), ViewerError> {
        let Some((index, locator)) =
            target.and_then(|i| nav.locator(i).map(|l| (i, l.to_string())))
        else {
            return self.prompter.say("There is no such page.");
        };

        let table = match self.fetch_table(&locator).await? {
            Some(table) => table,
            None => return Ok(()),
        };

        nav.move_to(index)?;
        tracing::debug!(page = index + 1, tickets = table.len(), "Showing page");

        if table.is_empty() {
            self.prompter.say(NO_TICKETS_MESSAGE)?;
        } else {
            self.prompter.print(&table.render())?;
        }
        self.prompter.say(&format!(
            "You are viewing page {} of {}",
            nav.current() + 1,
            nav.len()
        ))
    }

    /// Fetches the full ticket set and shows the ticket the user asks for.
    ///
    /// This re-downloads every ticket on each lookup so the lookup always
    /// sees the server's current data.
    async fn show_single(&mut self) -> Result<(), ViewerError> {
        let table = match self.source.fetch_all().await {
            Ok(page) => match TicketTable::build(&page.tickets) {
                Ok(table) => table,
                Err(e) => return self.report(&e),
            },
            Err(e) => return self.report(&e),
        };

        if table.is_empty() {
            return self.prompter.say(NO_TICKETS_MESSAGE);
        }

        let id = self.prompter.read_ticket_id()?;
        match table.view_single(id) {
            Ok(ticket) => self.prompter.print(&render_single(ticket)),
            Err(e) => {
                tracing::debug!(error = %e, "Ticket lookup failed");
                self.prompter.say(NOT_FOUND_MESSAGE)
            }
        }
    }

    /// Fetches a page and builds its table, reporting any failure.
    async fn fetch_table(&mut self, locator: &str) -> Result<Option<TicketTable>, ViewerError> {
        let page = match self.source.fetch_page(locator).await {
            Ok(page) => page,
            Err(e) => {
                self.report(&e)?;
                return Ok(None);
            }
        };
        match TicketTable::build(&page.tickets) {
            Ok(table) => Ok(Some(table)),
            Err(e) => {
                self.report(&e)?;
                Ok(None)
            }
        }
    }

    /// Logs a failure and tells the user about it.
    fn report(&mut self, error: &ViewerError) -> Result<(), ViewerError> {
        if error.is_transport() {
            tracing::warn!(error = %error, "Request failed");
        } else {
            tracing::error!(error = %error, "Unusable response");
        }
        self.prompter.say(&error.user_message())
    }
}
