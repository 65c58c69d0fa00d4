//! Application wiring: sign-in and the viewer session.

use std::future::Future;
use std::io::{BufRead, Write};

use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};

use crate::auth::{self, Session};
use crate::config::{Config, Credentials};
use crate::error::ViewerError;
use crate::prompt::Prompter;
use crate::viewer::{Viewer, FAREWELL_MESSAGE};
use crate::zendesk_client::{TicketApi, ZendeskClient};

/// How many times the user may try to sign in.
pub const MAX_SIGN_IN_ATTEMPTS: u32 = 3;

/// Printed when every sign-in attempt failed.
pub const SIGN_IN_FAILED_MESSAGE: &str = "Unable to sign in. Bye!";

/// Signs in, asking for credentials as needed.
///
/// The first attempt uses whatever the configuration provides and asks for
/// the rest; later attempts ask for everything again. Returns `None` after
/// [`MAX_SIGN_IN_ATTEMPTS`] failures.
///
/// # Errors
///
/// Only terminal I/O failures (including end of input) are returned;
/// rejected or malformed credentials count as a failed attempt.
pub async fn sign_in<R, W>(
    config: &Config,
    prompter: &mut Prompter<R, W>,
) -> Result<Option<(ZendeskClient, Session)>, ViewerError>
where
    R: BufRead,
    W: Write,
{
    for attempt in 1..=MAX_SIGN_IN_ATTEMPTS {
        let credentials = match read_credentials(config, prompter, attempt) {
            Ok(credentials) => credentials,
            Err(ViewerError::Config(message)) => {
                prompter.say(&format!("Invalid credentials: {}", message))?;
                continue;
            }
            Err(e) => return Err(e),
        };

        let client = ZendeskClient::new(&config.api_root(&credentials.subdomain))?;
        match auth::resolve(&client, &credentials).await {
            Ok(session) => return Ok(Some((client, session))),
            Err(e) => {
                tracing::warn!(
                    attempt,
                    error = %e.sanitized_display(credentials.api_token()),
                    "Sign-in failed"
                );
                prompter.say(&sign_in_failure_message(&e))?;
            }
        }
    }

    prompter.say(SIGN_IN_FAILED_MESSAGE)?;
    Ok(None)
}

fn read_credentials<R, W>(
    config: &Config,
    prompter: &mut Prompter<R, W>,
    attempt: u32,
) -> Result<Credentials, ViewerError>
where
    R: BufRead,
    W: Write,
{
    if attempt == 1 {
        if let Some(credentials) = config.credentials() {
            return Ok(credentials);
        }
        prompter.read_credentials(
            config.subdomain.as_deref(),
            config.email.as_deref(),
            config.api_token(),
        )
    } else {
        prompter.read_credentials(None, None, None)
    }
}

fn sign_in_failure_message(error: &ViewerError) -> String {
    match error {
        ViewerError::Authentication => {
            "Sign-in was rejected. Check your email address and API token.".to_string()
        }
        ViewerError::NoOAuthClient => {
            "Sign-in failed: the account has no OAuth client to issue a token for.".to_string()
        }
        other => other.user_message(),
    }
}

/// Signs in and runs the viewer until the user quits.
///
/// End of input during sign-in is treated like quitting.
pub async fn run<R, W>(config: Config, mut prompter: Prompter<R, W>) -> Result<(), ViewerError>
where
    R: BufRead,
    W: Write,
{
    let signed_in = match sign_in(&config, &mut prompter).await {
        Ok(signed_in) => signed_in,
        Err(ViewerError::InputClosed) => {
            tracing::debug!("Input closed during sign-in");
            return prompter.say(FAREWELL_MESSAGE);
        }
        Err(e) => return Err(e),
    };
    let Some((client, session)) = signed_in else {
        return Ok(());
    };

    let api = TicketApi::new(client, session);
    Viewer::new(api, prompter)
        .with_retry_delay(config.retry_delay)
        .run()
        .await
}

/// Starts [`run`] on the blocking pool.
///
/// Prompts block on their reader, so the session must not occupy a runtime
/// worker; otherwise a single-worker runtime could not observe Ctrl+C.
///
/// # Panics
///
/// Panics when called outside a tokio runtime.
pub fn spawn_session<R, W>(
    config: Config,
    prompter: Prompter<R, W>,
) -> JoinHandle<Result<(), ViewerError>>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || handle.block_on(run(config, prompter)))
}

/// Waits for the session to finish or for `interrupt` to fire.
///
/// Returns `None` when interrupted; the session is left running and the
/// caller is expected to exit.
pub async fn supervise<F>(
    session: JoinHandle<Result<(), ViewerError>>,
    interrupt: F,
) -> Option<Result<Result<(), ViewerError>, JoinError>>
where
    F: Future,
{
    tokio::select! {
        result = session => Some(result),
        _ = interrupt => None,
    }
}
