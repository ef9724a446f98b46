//! Live view over the discovery controller.
//!
//! Renders the view on every state change and reads one command per line from
//! stdin. Notifications are dismissed after the configured time.

use std::io::{IsTerminal, Write};
use std::str::FromStr;
use std::time::Duration;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use super::Session;
use crate::controller::{ControllerSettings, DiscoveryController, FilterField, ViewState};
use crate::display::format_view;
use crate::error::{DiscoveryError, Result};
use crate::gateway::{DiscoveryApi, Filters};

const HELP: &str = "\
commands:
  n | p              next / previous page
  size N             records per page
  status V           filter by status (no value clears)
  env V              filter by environment
  type V             filter by data source type
  search V           free-text search
  clear              clear all filters
  show ID | close    open / close the details of a record
  approve ID         approve a record
  reject ID          reject a record
  refresh            trigger a discovery scan
  dismiss            hide the current notification
  q                  quit";

/// One line of watch input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Next,
    Previous,
    Size(u32),
    Filter(FilterField, String),
    Clear,
    Show(i64),
    Close,
    Approve(i64),
    Reject(i64),
    Refresh,
    Dismiss,
    Help,
    Redraw,
    Quit,
}

impl FromStr for WatchCommand {
    type Err = DiscoveryError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => WatchCommand::Redraw,
            "n" | "next" => WatchCommand::Next,
            "p" | "prev" | "previous" => WatchCommand::Previous,
            "size" => match arg.parse::<u32>() {
                Ok(n) if n > 0 => WatchCommand::Size(n),
                _ => return Err(invalid(format!("invalid page size '{arg}'"))),
            },
            "status" => WatchCommand::Filter(FilterField::Status, arg.to_string()),
            "env" | "environment" => {
                WatchCommand::Filter(FilterField::Environment, arg.to_string())
            }
            "type" => WatchCommand::Filter(FilterField::DataSourceType, arg.to_string()),
            "search" | "/" => WatchCommand::Filter(FilterField::Search, arg.to_string()),
            "clear" => WatchCommand::Clear,
            "show" => WatchCommand::Show(parse_id(arg)?),
            "close" => WatchCommand::Close,
            "approve" | "a" => WatchCommand::Approve(parse_id(arg)?),
            "reject" | "r" => WatchCommand::Reject(parse_id(arg)?),
            "refresh" | "scan" => WatchCommand::Refresh,
            "dismiss" => WatchCommand::Dismiss,
            "h" | "help" | "?" => WatchCommand::Help,
            "q" | "quit" | "exit" => WatchCommand::Quit,
            other => return Err(invalid(format!("unknown command '{other}', try 'help'"))),
        };
        Ok(command)
    }
}

fn parse_id(arg: &str) -> Result<i64> {
    arg.parse()
        .map_err(|_| invalid(format!("expected a discovery id, got '{arg}'")))
}

fn invalid(message: String) -> DiscoveryError {
    DiscoveryError::InvalidInput(message)
}

/// Mount the controller and run until `q`, end of input or Ctrl-C
pub async fn cmd_watch(session: Session, size: Option<u32>, filters: Filters) -> Result<()> {
    let mut settings = ControllerSettings::from_config(&session.config);
    if let Some(size) = size {
        settings.page_size = size;
    }
    let ttl = session.config.timings.notification();

    let controller = DiscoveryController::new(session.gateway, settings).with_filters(filters);
    controller.mount().await;

    let stdout = std::io::stdout();
    let clear = stdout.is_terminal();
    let mut screen = WatchScreen::new(stdout, clear);
    let input = BufReader::new(tokio::io::stdin());
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    run_watch(&controller, input, &mut screen, ttl, ctrl_c).await
}

/// Output side of the live view
pub struct WatchScreen<W> {
    out: W,
    clear: bool,
}

impl<W: Write> WatchScreen<W> {
    /// `clear` wipes the terminal before every frame
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, state: &ViewState) -> Result<()> {
        if self.clear {
            write!(self.out, "\x1b[2J\x1b[H")?;
        }
        writeln!(self.out, "{}", format_view(state))?;
        writeln!(self.out, "{}", "type 'help' for commands".dimmed())?;
        self.out.flush()?;
        Ok(())
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Drive a mounted controller from line input until quit, end of input or
/// `shutdown`; the controller is torn down on the way out
pub async fn run_watch<A, R, W>(
    controller: &DiscoveryController<A>,
    input: R,
    screen: &mut WatchScreen<W>,
    ttl: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<()>
where
    A: DiscoveryApi + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let result = watch_loop(controller, input, screen, ttl, shutdown).await;
    controller.teardown();
    result
}

async fn watch_loop<A, R, W>(
    controller: &DiscoveryController<A>,
    input: R,
    screen: &mut WatchScreen<W>,
    ttl: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<()>
where
    A: DiscoveryApi + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut revisions = controller.subscribe();
    let mut lines = input.lines();
    let mut expiry = tokio::time::interval(Duration::from_secs(1));
    tokio::pin!(shutdown);

    screen.render(&controller.snapshot())?;

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                screen.render(&controller.snapshot())?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("input closed, leaving watch");
                    break;
                };
                match line.parse::<WatchCommand>() {
                    Ok(WatchCommand::Quit) => break,
                    Ok(command) => apply(controller, screen, command).await?,
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            _ = expiry.tick() => {
                let expired = controller
                    .snapshot()
                    .notification
                    .is_some_and(|n| n.is_expired(ttl));
                if expired {
                    controller.dismiss_notification();
                }
            }
            _ = &mut shutdown => break,
        }
    }
    Ok(())
}

async fn apply<A, W>(
    controller: &DiscoveryController<A>,
    screen: &mut WatchScreen<W>,
    command: WatchCommand,
) -> Result<()>
where
    A: DiscoveryApi + 'static,
    W: Write,
{
    match command {
        WatchCommand::Next => controller.next_page().await,
        WatchCommand::Previous => controller.previous_page().await,
        WatchCommand::Size(size) => controller.set_page_size(size).await,
        WatchCommand::Filter(field, value) => controller.set_filter(field, &value).await,
        WatchCommand::Clear => controller.clear_filters().await,
        WatchCommand::Show(id) => controller.open_details(id).await,
        WatchCommand::Close => controller.close_details(),
        WatchCommand::Approve(id) => {
            controller.approve(id).await;
        }
        WatchCommand::Reject(id) => {
            controller.reject(id).await;
        }
        WatchCommand::Refresh => {
            if !controller.snapshot().can_trigger() {
                return screen.line(&"Busy, try again in a moment".dimmed().to_string());
            }
            let controller = controller.clone();
            tokio::spawn(async move {
                let outcome = controller.trigger_scan().await;
                debug!(?outcome, "scan sequence finished");
            });
        }
        WatchCommand::Dismiss => controller.dismiss_notification(),
        WatchCommand::Help => return screen.line(HELP),
        WatchCommand::Redraw => return screen.render(&controller.snapshot()),
        WatchCommand::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paging_and_size() {
        assert_eq!("n".parse::<WatchCommand>().unwrap(), WatchCommand::Next);
        assert_eq!(" p ".parse::<WatchCommand>().unwrap(), WatchCommand::Previous);
        assert_eq!(
            "size 25".parse::<WatchCommand>().unwrap(),
            WatchCommand::Size(25)
        );
        assert!("size 0".parse::<WatchCommand>().is_err());
        assert!("size".parse::<WatchCommand>().is_err());
    }

    #[test]
    fn test_parse_filters_keep_inner_spaces() {
        assert_eq!(
            "search monthly sales".parse::<WatchCommand>().unwrap(),
            WatchCommand::Filter(FilterField::Search, "monthly sales".to_string())
        );
        assert_eq!(
            "env".parse::<WatchCommand>().unwrap(),
            WatchCommand::Filter(FilterField::Environment, String::new())
        );
        assert_eq!(
            "type azure_blob".parse::<WatchCommand>().unwrap(),
            WatchCommand::Filter(FilterField::DataSourceType, "azure_blob".to_string())
        );
    }

    #[test]
    fn test_parse_record_actions() {
        assert_eq!(
            "approve 42".parse::<WatchCommand>().unwrap(),
            WatchCommand::Approve(42)
        );
        assert_eq!(
            "REJECT 7".parse::<WatchCommand>().unwrap(),
            WatchCommand::Reject(7)
        );
        assert_eq!("show 3".parse::<WatchCommand>().unwrap(), WatchCommand::Show(3));
        assert!("approve abc".parse::<WatchCommand>().is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!("".parse::<WatchCommand>().unwrap(), WatchCommand::Redraw);
        assert_eq!("q".parse::<WatchCommand>().unwrap(), WatchCommand::Quit);
        assert_eq!(
            "refresh".parse::<WatchCommand>().unwrap(),
            WatchCommand::Refresh
        );
        let err = "launch".parse::<WatchCommand>().unwrap_err();
        assert!(err.to_string().contains("unknown command 'launch'"));
    }
}
