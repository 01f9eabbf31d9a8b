//! Relay script: one client session per line
//!
//! ```text
//! # comment
//! send <slot> <channel> <message...>
//! recv <slot> <channel>
//! ```

use std::io::{BufRead, Write};

use anyhow::{bail, Context};
use msgslot::client;
use msgslot::{SlotIndex, SlotTable};

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Send {
        slot: SlotIndex,
        channel: &'a str,
        message: &'a str,
    },
    Recv {
        slot: SlotIndex,
        channel: &'a str,
    },
}

/// Split off the first whitespace-delimited token
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.split_once(char::is_whitespace) {
        Some((token, rest)) => Some((token, rest)),
        None => Some((s, "")),
    }
}

fn parse_slot(arg: &str) -> anyhow::Result<SlotIndex> {
    let index: usize = arg
        .parse()
        .with_context(|| format!("Invalid slot '{}'", arg))?;
    Ok(SlotIndex::try_from(index)?)
}

/// Parse one script line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str) -> anyhow::Result<Option<Command<'_>>> {
    let line = line.trim_end_matches('\r');
    let Some((verb, rest)) = next_token(line) else {
        return Ok(None);
    };
    if verb.starts_with('#') {
        return Ok(None);
    }

    let Some((slot, rest)) = next_token(rest) else {
        bail!("Usage: {} <slot> <channel>{}", verb, if verb == "send" { " <message>" } else { "" });
    };
    let Some((channel, rest)) = next_token(rest) else {
        bail!("Missing channel for '{}'", verb);
    };
    let slot = parse_slot(slot)?;

    match verb {
        "send" => {
            // Everything after the channel, minus the separating whitespace.
            let message = rest.trim_start();
            if message.is_empty() {
                bail!("Usage: send <slot> <channel> <message>");
            }
            Ok(Some(Command::Send {
                slot,
                channel,
                message,
            }))
        }
        "recv" => {
            if !rest.trim().is_empty() {
                bail!("Usage: recv <slot> <channel>");
            }
            Ok(Some(Command::Recv { slot, channel }))
        }
        other => bail!("Unknown command '{}'", other),
    }
}

/// Execute every line of `input` against `table`, stopping at the first failure
///
/// # Returns
/// Number of sessions executed
pub fn run<R: BufRead, W: Write>(table: &SlotTable, input: R, out: &mut W) -> anyhow::Result<usize> {
    let mut sessions = 0;

    for (number, line) in input.lines().enumerate() {
        let number = number + 1;
        let line = line.with_context(|| format!("Failed to read line {}", number))?;

        let Some(command) = parse_line(&line).with_context(|| format!("line {}", number))? else {
            continue;
        };

        match command {
            Command::Send {
                slot,
                channel,
                message,
            } => {
                let written = client::send(table, slot, channel, message.as_bytes())
                    .with_context(|| format!("line {}: send to slot {} channel {}", number, slot, channel))?;
                log::info!("line {}: wrote {} bytes to slot {} channel {}", number, written, slot, channel);
            }
            Command::Recv { slot, channel } => {
                client::receive(table, slot, channel, out)
                    .with_context(|| format!("line {}: recv from slot {} channel {}", number, slot, channel))?;
                writeln!(out).context("Failed to write output")?;
            }
        }

        sessions += 1;
    }

    out.flush().context("Failed to flush output")?;
    Ok(sessions)
}
