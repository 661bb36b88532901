use crate::application::events::{GameEvent, OperatorCommand, Signal};
use crate::domain::money::Yen;
use crate::error::{RegisterError, Result};
use std::fmt::Write as _;
use std::str::FromStr;

/// Number of ranking rows shown when `rankings` is given without a count.
pub const DEFAULT_RANKINGS_LIMIT: usize = 10;

/// One line of operator input.
///
/// Item names run to the end of the line, so they may contain spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Decrement(String),
    Remove(String),
    Coin(Yen),
    Checkout,
    Retry,
    Rankings(usize),
    Quit,
}

impl FromStr for Command {
    type Err = RegisterError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let invalid = || RegisterError::InvalidCommand(line.to_string());
        let item = || {
            if rest.is_empty() {
                Err(invalid())
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "add" => Ok(Command::Add(item()?)),
            "dec" => Ok(Command::Decrement(item()?)),
            "remove" => Ok(Command::Remove(item()?)),
            "coin" => rest.parse().map(Command::Coin).map_err(|_| invalid()),
            "checkout" if rest.is_empty() => Ok(Command::Checkout),
            "retry" if rest.is_empty() => Ok(Command::Retry),
            "rankings" if rest.is_empty() => Ok(Command::Rankings(DEFAULT_RANKINGS_LIMIT)),
            "rankings" => rest.parse().map(Command::Rankings).map_err(|_| invalid()),
            "quit" if rest.is_empty() => Ok(Command::Quit),
            _ => Err(invalid()),
        }
    }
}

impl From<Command> for GameEvent {
    fn from(command: Command) -> Self {
        match command {
            Command::Add(item) => OperatorCommand::AddItem(item).into(),
            Command::Decrement(item) => OperatorCommand::DecrementItem(item).into(),
            Command::Remove(item) => OperatorCommand::RemoveItem(item).into(),
            Command::Coin(value) => OperatorCommand::SelectCoin(value).into(),
            Command::Checkout => OperatorCommand::Checkout.into(),
            Command::Retry => OperatorCommand::Retry.into(),
            Command::Rankings(limit) => GameEvent::ShowRankings { limit },
            Command::Quit => GameEvent::Quit,
        }
    }
}

/// Renders a signal as one JSON object per line.
pub fn render_json(signal: &Signal) -> Result<String> {
    Ok(serde_json::to_string(signal)?)
}

/// Renders a signal as human-readable text. May span several lines.
pub fn render_text(signal: &Signal) -> String {
    match signal {
        Signal::RoundStarted {
            generation,
            order,
            subtotal,
            payment,
            max_payment,
            remaining,
        } => {
            let mut out = format!("== Round {generation} ({remaining}s) ==\n");
            for line in order {
                let _ = writeln!(
                    out,
                    "  {} x{} @ {}",
                    line.item_name, line.quantity, line.unit_price
                );
            }
            let _ = write!(out, "Subtotal {subtotal}, customer pays {payment}");
            if let Some(max) = max_payment {
                let _ = write!(out, " (carrying {max})");
            }
            out
        }
        Signal::Countdown { remaining } => format!("[{remaining}s]"),
        Signal::OrderChanged { lines, total } => {
            let items: Vec<String> = lines
                .iter()
                .map(|l| format!("{} x{}", l.item_name, l.quantity))
                .collect();
            format!("Register: {} | total {total}", items.join(", "))
        }
        Signal::CoinAdded {
            value,
            change,
            selections,
        } => format!("+{value} -> change {change} ({selections} coins)"),
        Signal::Timeout => "Time's up!".to_string(),
        Signal::Mismatch => "Wrong!".to_string(),
        Signal::CoinOverflow => "Too many coins!".to_string(),
        Signal::Correct { awarded, score } => format!("Correct! +{awarded} (score {score})"),
        Signal::Angry => "The customer is angry.".to_string(),
        Signal::Calm => "The customer calms down.".to_string(),
        Signal::LivesChanged { lives } => format!("Lives: {lives}"),
        Signal::GameOver { final_score } => {
            format!("GAME OVER. Final score {final_score}. Type `retry` to play again.")
        }
        Signal::RankingRecorded { score } => format!("Ranking saved ({score})"),
        Signal::Rankings { entries } => {
            if entries.is_empty() {
                return "No rankings yet.".to_string();
            }
            let rows: Vec<String> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| format!("{:>3}. {:<16} {:>8}  {}", i + 1, e.player, e.score, e.timestamp))
                .collect();
            rows.join("\n")
        }
        Signal::Rejected { reason } => format!("! {reason}"),
    }
}
