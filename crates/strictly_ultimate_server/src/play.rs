//! Hot-seat terminal front end.
//!
//! Reads one command per line and redraws the whole match after each. Boards
//! and cells are numbered 1-9, row-major, or named by label (`center`,
//! `top-left`, ...).

use crate::authority::MoveAuthority;
use crate::orchestrator::{BoardSlot, MatchOrchestrator};
use anyhow::Result;
use std::fmt::Write as _;
use strictly_ultimate::{ActiveBoard, LineCell, Outcome, Position};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

/// A parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Play `cell` on `board`.
    Play {
        /// Target mini-board.
        board: Position,
        /// Target cell.
        cell: Position,
    },
    /// Start a new match.
    New,
    /// Retry unavailable boards and pending meta updates.
    Retry,
    /// Leave.
    Quit,
}

impl Input {
    /// Parses `<board> <cell>`, `new`, `retry`, or `quit`.
    ///
    /// Board and cell accept anything [`Position::parse_human`] does.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim().to_lowercase();
        match line.as_str() {
            "new" | "n" => return Ok(Input::New),
            "retry" | "r" => return Ok(Input::Retry),
            "quit" | "q" | "exit" => return Ok(Input::Quit),
            _ => {}
        }

        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(board), Some(cell), None) => {
                let board = Position::parse_human(board)
                    .ok_or_else(|| format!("Unknown board: {}", board))?;
                let cell =
                    Position::parse_human(cell).ok_or_else(|| format!("Unknown cell: {}", cell))?;
                Ok(Input::Play { board, cell })
            }
            _ => Err(
                "Enter '<board> <cell>' (1-9 or label each), 'new', 'retry', or 'quit'"
                    .to_string(),
            ),
        }
    }
}

/// One-line match status: `X's turn`, `X wins`, or `Draw`.
pub fn status_line<A: MoveAuthority>(orch: &MatchOrchestrator<A>) -> String {
    match orch.match_result() {
        Outcome::Undecided => format!("{}'s turn", orch.current_turn()),
        decided => decided.to_string(),
    }
}

/// Where the next move may go.
pub fn active_hint<A: MoveAuthority>(orch: &MatchOrchestrator<A>) -> String {
    if orch.match_result().is_decided() {
        return "Match over. Type 'new' to play again.".to_string();
    }
    if orch.has_stale_move() {
        return "A move was interrupted. Type 'new' to start over.".to_string();
    }
    if orch.has_pending_meta() {
        return "Meta-board update pending. Type 'retry'.".to_string();
    }
    match orch.active_board() {
        ActiveBoard::Board(board) => {
            format!("Play on board {} ({})", board.to_index() + 1, board)
        }
        ActiveBoard::Any => "Play on any open board".to_string(),
    }
}

/// Renders the 9x9 board followed by each concluded or unavailable board.
///
/// Empty cells show `.`; unavailable boards show `?`.
pub fn render<A: MoveAuthority>(orch: &MatchOrchestrator<A>) -> String {
    let mut out = String::new();
    for big_row in 0..3 {
        if big_row > 0 {
            out.push_str("------+-------+------\n");
        }
        for small_row in 0..3 {
            let line = (0..3)
                .map(|big_col| {
                    let board = Position::ALL[big_row * 3 + big_col];
                    (0..3)
                        .map(|small_col| Position::ALL[small_row * 3 + small_col])
                        .map(|cell| String::from(cell_char(orch, board, cell)))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join(" | ");
            out.push_str(&line);
            out.push('\n');
        }
    }

    for board in Position::ALL {
        match orch.board(board) {
            BoardSlot::Unavailable(reason) => {
                let _ = writeln!(out, "Board {}: unavailable ({})", board.to_index() + 1, reason);
            }
            BoardSlot::Ready(_) => {
                let outcome = orch.mini_outcome(board);
                if outcome.is_decided() {
                    let _ = writeln!(out, "Board {}: {}", board.to_index() + 1, outcome);
                }
            }
        }
    }
    if let BoardSlot::Unavailable(reason) = orch.meta() {
        let _ = writeln!(out, "Meta-board: unavailable ({})", reason);
    }
    out
}

fn cell_char<A: MoveAuthority>(
    orch: &MatchOrchestrator<A>,
    board: Position,
    cell: Position,
) -> char {
    match orch.board_grid(board) {
        Some(grid) => grid.get(cell).symbol().unwrap_or('.'),
        None => '?',
    }
}

/// Meta-board summary: claimed boards show their mark, blocked ones `-`,
/// open ones their number.
pub fn meta_overview<A: MoveAuthority>(orch: &MatchOrchestrator<A>) -> Option<String> {
    orch.meta_grid().map(|grid| grid.display())
}

fn screen<A: MoveAuthority>(orch: &MatchOrchestrator<A>, message: Option<&str>) -> String {
    let mut out = render(orch);
    if let Some(overview) = meta_overview(orch) {
        let _ = writeln!(out, "\nMeta-board:\n{}", overview);
    }
    let _ = writeln!(out, "\n{}", status_line(orch));
    let _ = writeln!(out, "{}", active_hint(orch));
    if let Some(message) = message {
        let _ = writeln!(out, "! {}", message);
    }
    out.push_str("> ");
    out
}

/// Runs the command loop until `quit` or end of input.
#[instrument(skip_all)]
pub async fn run_session<A, R, W>(
    orch: &mut MatchOrchestrator<A>,
    input: R,
    mut output: W,
) -> Result<()>
where
    A: MoveAuthority,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Starting terminal session");
    output.write_all(screen(orch, None).as_bytes()).await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            output.write_all(b"> ").await?;
            output.flush().await?;
            continue;
        }

        let message = match Input::parse(&line) {
            Ok(Input::Quit) => {
                info!("Player quit");
                break;
            }
            Ok(Input::New) => {
                orch.reset_match().await;
                None
            }
            Ok(Input::Retry) => retry(orch).await,
            Ok(Input::Play { board, cell }) => {
                debug!(%board, %cell, "Play requested");
                match orch.submit_cell_play(board, cell).await {
                    Ok(accepted) if accepted.meta_pending => {
                        orch.last_rejection().map(String::from)
                    }
                    Ok(_) => None,
                    Err(e) => Some(e.to_string()),
                }
            }
            Err(e) => Some(e),
        };

        output
            .write_all(screen(orch, message.as_deref()).as_bytes())
            .await?;
        output.flush().await?;
    }

    output.write_all(b"\nGoodbye.\n").await?;
    output.flush().await?;
    Ok(())
}

async fn retry<A: MoveAuthority>(orch: &mut MatchOrchestrator<A>) -> Option<String> {
    let remaining = orch.retry_unavailable().await;
    if orch.has_pending_meta()
        && let Err(e) = orch.retry_meta_sync().await
    {
        warn!(error = %e, "Meta retry failed");
        return Some(e.to_string());
    }
    (remaining > 0).then(|| format!("{} board(s) still unavailable", remaining))
}
