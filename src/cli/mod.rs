//! Line-oriented driver that sequences card operations from a script.

use std::io::{self, BufRead, Write};

use rust_decimal::Decimal;
use shell_words::split;
use thiserror::Error;

use crate::card::FareCard;

/// The session the command-line driver replays with `--demo`.
pub const DEMO_SCRIPT: &str = "\
balance
load 30
tap-on tube holborn
tap-off earls_court
tap-on bus
tap-on tube chelsea
tap-off wimbledon
tap-on tube wimbledon
";

const HELP: &str = "\
Commands:
  load <amount>              add value to the card
  tap-on <tube|bus> [station] start a trip (station required for tube)
  tap-off <station>          end the open tube journey
  balance                    show the current balance
  history                    list settled trips
  help                       show this message
  exit                       stop reading commands";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Reads commands from stdin against a fresh card until EOF or `exit`.
pub fn run_cli() -> Result<(), CliError> {
    let mut card = FareCard::default();
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_script(&mut card, stdin.lock(), &mut stdout.lock())
}

/// Replays [`DEMO_SCRIPT`] on a fresh card.
pub fn run_demo() -> Result<(), CliError> {
    let mut card = FareCard::default();
    let stdout = io::stdout();
    run_script(&mut card, DEMO_SCRIPT.as_bytes(), &mut stdout.lock())
}

/// Runs every line of `input`; card errors are reported and the script continues.
pub fn run_script<R: BufRead, W: Write>(
    card: &mut FareCard,
    input: R,
    out: &mut W,
) -> Result<(), CliError> {
    for line in input.lines() {
        let line = line?;
        if handle_line(card, &line, out)? == LoopControl::Exit {
            break;
        }
    }
    out.flush()?;
    Ok(())
}

fn handle_line<W: Write>(
    card: &mut FareCard,
    line: &str,
    out: &mut W,
) -> Result<LoopControl, CliError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let tokens = match split(trimmed) {
        Ok(tokens) => tokens,
        Err(err) => {
            writeln!(out, "Warning: {err}")?;
            return Ok(LoopControl::Continue);
        }
    };
    let Some(raw) = tokens.first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

    let outcome = match (command.as_str(), args.as_slice()) {
        ("load", [amount]) => card.load_card_str(amount).map(|_| None),
        ("tap-on", [mode]) => card.tap_on_str(mode, None).map(|_| None),
        ("tap-on", [mode, station]) => card.tap_on_str(mode, Some(*station)).map(|_| None),
        ("tap-off", [station]) => card.tap_off(station).map(Some),
        ("balance", []) => Ok(None),
        ("history", []) => {
            print_history(card, out)?;
            return Ok(LoopControl::Continue);
        }
        ("help", _) => {
            writeln!(out, "{HELP}")?;
            return Ok(LoopControl::Continue);
        }
        ("exit" | "quit", _) => return Ok(LoopControl::Exit),
        ("load" | "tap-on" | "tap-off" | "balance", _) => {
            writeln!(out, "Usage error for `{command}`. Type `help` for usage.")?;
            return Ok(LoopControl::Continue);
        }
        _ => {
            writeln!(out, "Unknown command `{raw}`. Type `help` for usage.")?;
            return Ok(LoopControl::Continue);
        }
    };

    match outcome {
        Ok(fare) => {
            if let Some(fare) = fare {
                writeln!(out, "Fare: {}", money(fare))?;
            }
            writeln!(out, "Balance: {}", money(card.balance()))?;
        }
        Err(err) => writeln!(out, "Error: {err}")?,
    }
    Ok(LoopControl::Continue)
}

fn print_history<W: Write>(card: &FareCard, out: &mut W) -> Result<(), CliError> {
    if card.history().is_empty() {
        writeln!(out, "No trips recorded.")?;
        return Ok(());
    }
    for (idx, trip) in card.history().iter().enumerate() {
        let route = match (&trip.entry, &trip.exit) {
            (Some(entry), Some(exit)) => format!(" {entry} -> {exit}"),
            _ => String::new(),
        };
        writeln!(
            out,
            "{:>3}. {}{} {}",
            idx + 1,
            trip.mode,
            route,
            money(trip.charged)
        )?;
    }
    Ok(())
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
