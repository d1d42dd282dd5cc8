//! # Kingside Board Client
//!
//! Terminal client for the chess session server. Connects over WebSocket,
//! learns its role, mirrors the canonical position through a local
//! projection, and submits moves typed on stdin as coordinate pairs
//! ("e2e4", with an optional promotion letter: "e7e8n").

use board_client::BoardProjection;
use clap::Parser;
use futures::{SinkExt, StreamExt};
use session_protocol::{ClientEvent, MoveRequest, SeatColor, ServerEvent};
use shakmaty::{Color, File, Piece, Rank, Role, Square};
use tokio::io::AsyncBufReadExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "board-client")]
#[command(about = "Terminal client for the Kingside chess session server")]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:8080")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Connecting to {}", args.url);
    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    info!("Connected. Enter moves as coordinates, e.g. e2e4 or e7e8n");

    let mut projection = BoardProjection::new();
    let mut role: Option<SeatColor> = None;
    let mut stdin_lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin_lines.next_line() => {
                match line? {
                    Some(input) => {
                        let input = input.trim();
                        if input.is_empty() {
                            continue;
                        }
                        match parse_move(input) {
                            Some(request) => {
                                let frame = serde_json::to_string(&ClientEvent::Move(request))?;
                                ws_sender.send(Message::Text(frame.into())).await?;
                            }
                            None => warn!("Unrecognized move syntax: {}", input),
                        }
                    }
                    None => break,
                }
            }
            message = ws_receiver.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => handle_event(event, &mut projection, &mut role),
                            Err(e) => warn!("Unrecognized server frame: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Applies one server event to the local state and re-renders.
fn handle_event(
    event: ServerEvent,
    projection: &mut BoardProjection,
    role: &mut Option<SeatColor>,
) {
    match event {
        ServerEvent::PlayerRole(color) => {
            *role = Some(color);
            info!("You are: {}", seat_name(color));
            render(projection, *role);
        }
        ServerEvent::SpectatorRole => {
            *role = None;
            info!("You are: Spectator");
            render(projection, *role);
        }
        ServerEvent::Move(request) => {
            if let Err(e) = projection.apply_move(&request) {
                warn!(
                    "Could not replay broadcast move {}{}: {}",
                    request.from, request.to, e
                );
            }
            render(projection, *role);
        }
        ServerEvent::BoardState(fen) => {
            if let Err(e) = projection.apply_snapshot(&fen) {
                warn!("Could not load position snapshot: {}", e);
            }
            render(projection, *role);
        }
        ServerEvent::InvalidMove(request) => {
            warn!("Move rejected: {}{}", request.from, request.to);
        }
    }
}

/// Parses "e2e4" or "e7e8q" style input into a move request.
///
/// A missing promotion letter defaults to queen; the server ignores the
/// field unless the move actually promotes.
fn parse_move(input: &str) -> Option<MoveRequest> {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() != 4 && chars.len() != 5 {
        return None;
    }

    let from: String = chars[0..2].iter().collect();
    let to: String = chars[2..4].iter().collect();
    let promotion = chars
        .get(4)
        .map(|c| c.to_string())
        .or_else(|| Some("q".to_string()));

    Some(MoveRequest {
        from,
        to,
        promotion,
    })
}

/// Prints the projected board, captured pieces, and turn indicator.
///
/// Black sees the board from its own side; white and spectators share
/// white's view.
fn render(projection: &BoardProjection, role: Option<SeatColor>) {
    let flipped = role == Some(SeatColor::Black);

    println!();
    for row in 0..8u32 {
        let rank = if flipped {
            Rank::new(row)
        } else {
            Rank::new(7 - row)
        };
        print!("{} ", u32::from(rank) + 1);
        for col in 0..8u32 {
            let file = if flipped {
                File::new(7 - col)
            } else {
                File::new(col)
            };
            match projection.piece_on(Square::from_coords(file, rank)) {
                Some(piece) => print!(" {}", piece_unicode(piece)),
                None => print!(" ·"),
            }
        }
        println!();
    }
    print!("  ");
    for col in 0..8u32 {
        let file = if flipped {
            File::new(7 - col)
        } else {
            File::new(col)
        };
        print!(" {}", file.char());
    }
    println!();

    let captured: String = projection
        .captured()
        .iter()
        .map(|piece| piece_unicode(*piece))
        .collect();
    if !captured.is_empty() {
        println!("Captured: {}", captured);
    }
    println!("Turn: {}", seat_name(projection.side_to_move()));
}

fn seat_name(color: SeatColor) -> &'static str {
    match color {
        SeatColor::White => "White",
        SeatColor::Black => "Black",
    }
}

fn piece_unicode(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::Pawn) => '♙',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::King) => '♔',
        (Color::Black, Role::Pawn) => '♟',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::King) => '♚',
    }
}
