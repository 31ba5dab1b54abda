use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::booth::app::BoothEvent;

/// Help text for the line protocol
pub const COMMANDS_HELP: &str = "commands: timer <0-10> | filter <none|grayscale|blur|sepia> | \
template <file name> | templates | capture | cancel | print | status | quit";

/// Parse one control line into an event
///
/// Returns `None` for blank or unrecognized lines.
pub fn parse_command(line: &str) -> Option<BoothEvent> {
    let line = line.trim();
    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let event = match (command.to_ascii_lowercase().as_str(), argument) {
        ("timer", arg) => BoothEvent::SetTimer(arg.parse().ok()?),
        ("filter", arg) if !arg.is_empty() => BoothEvent::SetFilter(arg.to_ascii_lowercase()),
        // Template names keep their spaces and case
        ("template", arg) if !arg.is_empty() => BoothEvent::SelectTemplate(arg.to_string()),
        ("templates", "") => BoothEvent::ListTemplates,
        ("capture", "") => BoothEvent::Capture,
        ("cancel", "") => BoothEvent::Cancel,
        ("print", "") => BoothEvent::Print,
        ("status", "") => BoothEvent::Status,
        ("quit", "") | ("exit", "") => BoothEvent::Quit,
        _ => return None,
    };

    Some(event)
}

/// Forward commands from `reader` until it ends, then send `Quit`
pub async fn forward_commands<R>(reader: R, events: mpsc::Sender<BoothEvent>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Reading controls failed: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Some(event) => {
                if events.send(event).await.is_err() {
                    debug!("Booth stopped, dropping remaining controls");
                    return;
                }
            }
            None => warn!("Unrecognized command '{}' ({})", line.trim(), COMMANDS_HELP),
        }
    }

    let _ = events.send(BoothEvent::Quit).await;
}

/// Read controls from standard input on a background task
pub fn spawn_stdin_controls(events: mpsc::Sender<BoothEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(forward_commands(tokio::io::BufReader::new(tokio::io::stdin()), events))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("timer 5"), Some(BoothEvent::SetTimer(5)));
        assert_eq!(parse_command("  FILTER Sepia "), Some(BoothEvent::SetFilter("sepia".to_string())));
        assert_eq!(
            parse_command("template Birthday Party.png"),
            Some(BoothEvent::SelectTemplate("Birthday Party.png".to_string()))
        );
        assert_eq!(parse_command("capture"), Some(BoothEvent::Capture));
        assert_eq!(parse_command("exit"), Some(BoothEvent::Quit));
        assert_eq!(parse_command("templates"), Some(BoothEvent::ListTemplates));
    }

    #[test]
    fn test_rejects_malformed_commands() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("timer soon"), None);
        assert_eq!(parse_command("timer -1"), None);
        assert_eq!(parse_command("template"), None);
        assert_eq!(parse_command("capture now"), None);
        assert_eq!(parse_command("dance"), None);
    }

    #[tokio::test]
    async fn test_forward_commands_ends_with_quit() {
        let (tx, mut rx) = mpsc::channel(16);
        let input: &[u8] = b"timer 0\n\nbogus\ntemplate Launch Program.png\ncapture\n";

        forward_commands(input, tx).await;

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }
        assert_eq!(
            received,
            vec![
                BoothEvent::SetTimer(0),
                BoothEvent::SelectTemplate("Launch Program.png".to_string()),
                BoothEvent::Capture,
                BoothEvent::Quit,
            ]
        );
    }
}
