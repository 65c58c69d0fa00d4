//! Terminal prompts.
//!
//! `Prompter` wraps an input and an output stream so the menu loop can be
//! driven by stdin/stdout in the binary and by in-memory buffers in tests.

use std::fmt;
use std::io::{BufRead, Write};

use crate::config::Credentials;
use crate::error::ViewerError;

const MENU: &str = "Select an option:\n\
                    1. Enter 1 to view all tickets\n\
                    2. Enter 2 to view a specific ticket\n\
                    3. Enter 3 to quit\n";
const PREV_PAGE_HINT: &str = "\tEnter 'p' to go to the previous ticket page\n";
const NEXT_PAGE_HINT: &str = "\tEnter 'n' to go to the next ticket page\n";
const INVALID_COMMAND: &str = "Not a valid command. Please try again.";
const TICKET_ID_PROMPT: &str = "Enter the id of the ticket you want to view\n";
const INVALID_TICKET_ID: &str = "Not a valid ticket id. Please enter a number.";

/// A menu command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `1` - show the current page.
    ViewAll,
    /// `2` - look up a single ticket.
    ViewSingle,
    /// `3` - leave the viewer.
    Quit,
    /// `p` - show the previous page.
    PrevPage,
    /// `n` - show the next page.
    NextPage,
}

impl Command {
    /// Parses a menu answer, honoring which page moves are available.
    pub fn parse(input: &str, has_prev: bool, has_next: bool) -> Option<Self> {
        match input {
            "1" => Some(Command::ViewAll),
            "2" => Some(Command::ViewSingle),
            "3" => Some(Command::Quit),
            "p" if has_prev => Some(Command::PrevPage),
            "n" if has_next => Some(Command::NextPage),
            _ => None,
        }
    }

    /// The key that selects this command.
    pub fn key(self) -> char {
        match self {
            Command::ViewAll => '1',
            Command::ViewSingle => '2',
            Command::Quit => '3',
            Command::PrevPage => 'p',
            Command::NextPage => 'n',
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Reads answers from `input` and writes prompts and output to `output`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Creates a prompter over the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Gives back the streams.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Writes `message` followed by a newline.
    pub fn say(&mut self, message: &str) -> Result<(), ViewerError> {
        writeln!(self.output, "{}", message)?;
        self.output.flush()?;
        Ok(())
    }

    /// Writes `text` as-is.
    pub fn print(&mut self, text: &str) -> Result<(), ViewerError> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }

    /// Shows `prompt` and reads one trimmed line.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::InputClosed` at end of input.
    pub fn ask(&mut self, prompt: &str) -> Result<String, ViewerError> {
        self.print(prompt)?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ViewerError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    /// Shows the menu until a valid command is entered.
    ///
    /// `1`, `2` and `3` are always accepted; `p` only when `has_prev` and
    /// `n` only when `has_next`. Everything else is rejected with a notice
    /// and the menu is shown again.
    pub fn get_valid_input(
        &mut self,
        has_prev: bool,
        has_next: bool,
    ) -> Result<Command, ViewerError> {
        let mut menu = MENU.to_string();
        if has_prev {
            menu.push_str(PREV_PAGE_HINT);
        }
        if has_next {
            menu.push_str(NEXT_PAGE_HINT);
        }

        loop {
            let answer = self.ask(&menu)?;
            match Command::parse(&answer, has_prev, has_next) {
                Some(command) => {
                    tracing::debug!(%command, "Menu command");
                    return Ok(command);
                }
                None => self.say(INVALID_COMMAND)?,
            }
        }
    }

    /// Asks for a ticket id until a number is entered.
    pub fn read_ticket_id(&mut self) -> Result<u64, ViewerError> {
        loop {
            let answer = self.ask(TICKET_ID_PROMPT)?;
            match answer.parse::<u64>() {
                Ok(id) => return Ok(id),
                Err(_) => self.say(INVALID_TICKET_ID)?,
            }
        }
    }

    /// Asks for any credential not already known.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Config` if the combined values are malformed.
    pub fn read_credentials(
        &mut self,
        subdomain: Option<&str>,
        email: Option<&str>,
        api_token: Option<&str>,
    ) -> Result<Credentials, ViewerError> {
        let subdomain = match subdomain {
            Some(s) => s.to_string(),
            None => self.ask("Enter your Zendesk subdomain: ")?,
        };
        let email = match email {
            Some(e) => e.to_string(),
            None => self.ask("Enter your email address: ")?,
        };
        let api_token = match api_token {
            Some(t) => t.to_string(),
            None => self.ask("Enter your API token: ")?,
        };
        Credentials::new(subdomain, email, api_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(prompter: Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(prompter.into_parts().1).unwrap()
    }

    #[test]
    fn test_rejects_until_valid() {
        let mut p = prompter("a\na\n1\n");
        assert_eq!(p.get_valid_input(false, false).unwrap(), Command::ViewAll);
        let out = output(p);
        assert_eq!(out.matches(INVALID_COMMAND).count(), 2);
        assert_eq!(out.matches("Select an option:").count(), 3);
    }

    #[test]
    fn test_page_moves_need_availability() {
        let mut p = prompter("p\nn\n1\np\nn\n2\n3\n4\n1\n");
        assert_eq!(p.get_valid_input(false, false).unwrap(), Command::ViewAll);
        assert_eq!(p.get_valid_input(true, false).unwrap(), Command::PrevPage);
        assert_eq!(p.get_valid_input(false, true).unwrap(), Command::NextPage);
        assert_eq!(p.get_valid_input(false, true).unwrap(), Command::ViewSingle);
        assert_eq!(p.get_valid_input(true, true).unwrap(), Command::Quit);
        assert_eq!(p.get_valid_input(true, false).unwrap(), Command::ViewAll);
    }

    #[test]
    fn test_all_commands_accepted_with_both_pages() {
        for (answer, expected) in [
            ("1", Command::ViewAll),
            ("2", Command::ViewSingle),
            ("3", Command::Quit),
            ("p", Command::PrevPage),
            ("n", Command::NextPage),
        ] {
            let mut p = prompter(&format!("x\nN\n{}\n", answer));
            assert_eq!(p.get_valid_input(true, true).unwrap(), expected);
            assert_eq!(output(p).matches(INVALID_COMMAND).count(), 2);
        }
    }

    #[test]
    fn test_menu_lists_available_moves() {
        let mut p = prompter("1\n");
        p.get_valid_input(true, false).unwrap();
        let out = output(p);
        assert!(out.contains("previous ticket page"));
        assert!(!out.contains("next ticket page"));
    }

    #[test]
    fn test_answers_are_trimmed() {
        let mut p = prompter("  2 \r\n");
        assert_eq!(p.get_valid_input(false, false).unwrap(), Command::ViewSingle);
    }

    #[test]
    fn test_end_of_input() {
        let mut p = prompter("a\n");
        assert!(matches!(
            p.get_valid_input(false, false),
            Err(ViewerError::InputClosed)
        ));
    }

    #[test]
    fn test_read_ticket_id_reprompts_on_text() {
        let mut p = prompter("abc\n-1\n42\n");
        assert_eq!(p.read_ticket_id().unwrap(), 42);
        assert_eq!(output(p).matches(INVALID_TICKET_ID).count(), 2);
    }

    #[test]
    fn test_read_credentials_asks_only_for_missing() {
        let mut p = prompter("agent@acme.com\n");
        let creds = p
            .read_credentials(Some("acme"), None, Some("abc123"))
            .unwrap();
        assert_eq!(creds.email, "agent@acme.com");
        let out = output(p);
        assert!(out.contains("email address"));
        assert!(!out.contains("subdomain"));
    }

    #[test]
    fn test_read_credentials_invalid() {
        let mut p = prompter("a\na\na\n");
        assert!(matches!(
            p.read_credentials(None, None, None),
            Err(ViewerError::Config(_))
        ));
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::NextPage.to_string(), "n");
        assert_eq!(Command::parse("n", true, false), None);
    }
}
