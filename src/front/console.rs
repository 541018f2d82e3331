use super::{
    paste, precheck, render_card, report_delivery,
    session::{Completion, Session, Ticket},
    Frontend, Notice,
};
use crate::media::{Delivery, MediaResult};
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Empty,
    Help,
    Paste,
    Download,
    Open,
    Reset,
    Quit,
    Submit(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => Command::Empty,
            "help" | "?" => Command::Help,
            "paste" => Command::Paste,
            "download" | "save" => Command::Download,
            "open" => Command::Open,
            "reset" | "clear" => Command::Reset,
            "quit" | "exit" => Command::Quit,
            _ => Command::Submit(line.to_string()),
        }
    }
}

const HELP: &str = "\
Paste a TikTok video link and press enter.
  paste     submit the link on the clipboard
  download  save the current result (or open it, for embed links)
  open      open the current result in the browser
  reset     clear the current result
  quit      leave";

/// Interactive session: one line per submission or command. A newer
/// submission supersedes one still in flight.
pub async fn run(frontend: Arc<Frontend>) -> Result<()> {
    info!("Starting interactive session");

    let session = Arc::new(Session::new());
    let (tx, mut rx) = mpsc::unbounded_channel::<(Ticket, MediaResult)>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    prompt(&session);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };

                match Command::parse(&line) {
                    Command::Empty => {}
                    Command::Help => println!("{}", HELP),
                    Command::Quit => break,
                    Command::Reset => {
                        session.reset();
                        println!("Cleared.");
                    }
                    Command::Paste => {
                        if let Ok(link) = paste().await {
                            submit(&frontend, &session, &tx, &link);
                        }
                    }
                    Command::Download => deliver(&frontend, &session, false),
                    Command::Open => deliver(&frontend, &session, true),
                    Command::Submit(input) => submit(&frontend, &session, &tx, &input),
                }
                prompt(&session);
            }
            Some((ticket, result)) = rx.recv() => {
                match session.complete(ticket, result) {
                    Completion::Current(result) => {
                        let card = render_card(&result);
                        if !card.is_empty() {
                            println!("\n{}", card);
                        }
                        Notice::for_result(&result).show();
                    }
                    Completion::Stale => debug!("Discarding result of a superseded submission"),
                }
                prompt(&session);
            }
        }
    }

    info!("Interactive session ended");
    Ok(())
}

fn submit(
    frontend: &Arc<Frontend>,
    session: &Session,
    tx: &mpsc::UnboundedSender<(Ticket, MediaResult)>,
    input: &str,
) {
    match precheck(input) {
        Ok(Some(warning)) => warning.show(),
        Ok(None) => {}
        Err(notice) => {
            notice.show();
            return;
        }
    }

    if session.is_loading() {
        info!("Superseding the pending submission");
    }
    let ticket = session.begin();

    let frontend = frontend.clone();
    let tx = tx.clone();
    let input = input.to_string();
    tokio::spawn(async move {
        let result = frontend.resolver.resolve(&input).await;
        // The receiver only goes away when the session is over.
        let _ = tx.send((ticket, result));
    });
}

/// Saves or opens the current result in the background so the session
/// keeps taking input while a large file streams.
fn deliver(frontend: &Arc<Frontend>, session: &Arc<Session>, open_only: bool) {
    let Some(result) = session.current() else {
        Notice::Error("Nothing to download yet, submit a link first".to_string()).show();
        return;
    };

    let delivery = if open_only && !result.url.is_empty() {
        Delivery::OpenExternally {
            url: result.url.clone(),
        }
    } else {
        Delivery::plan(&result)
    };

    let frontend = frontend.clone();
    let session = session.clone();
    tokio::spawn(async move {
        match delivery
            .execute(&frontend.download_client, &frontend.output_dir)
            .await
        {
            Ok(delivered) => report_delivery(&delivered),
            Err(e) => Notice::Error(format!("Download failed: {:#}", e)).show(),
        }
        prompt(&session);
    });
}

fn prompt(session: &Session) {
    if session.is_loading() {
        print!("[loading] > ");
    } else {
        print!("> ");
    }
    let _ = std::io::stdout().flush();
}
