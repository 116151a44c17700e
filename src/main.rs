use std::io::{Error, ErrorKind};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{error, info};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::Message;

use isolation_engine::{Board, Engine, GameState, Heuristic, Move, Player};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "localhost")]
    host: String,
    #[arg(long, default_value_t = 999)]
    port: u16,
    /// Per-move time budget for the engine, in milliseconds
    #[arg(long, default_value_t = 150)]
    time_ms: u32,
    #[arg(long, value_enum, default_value = "mobility-ratio")]
    heuristic: Heuristic,
    #[arg(long, default_value_t = isolation_engine::board::DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = isolation_engine::board::DEFAULT_HEIGHT)]
    height: usize,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    simple_logger::init_with_level(log::Level::Info).unwrap();

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);

    // reject oversized boards at startup instead of panicking mid-game
    let board = Board::new(args.width, args.height)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;

    // Bind the server to a local port
    let listener = TcpListener::bind(address.clone()).await.expect("Failed to bind");
    info!("Listening on: {}", address);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, args.clone(), board.clone()));
    }

    Ok(())
}

struct Game {
    started: bool,
    engine_player: Player,
    board: Board,
    time_ms: u32,
}

impl Game {
    fn new(board: Board, time_ms: u32) -> Self {
        Self {
            started: false,
            engine_player: Player::Two,
            board,
            time_ms,
        }
    }

    fn client_player(&self) -> Player {
        self.engine_player.opponent()
    }
}

async fn accept_connection(stream: TcpStream, args: Args, board: Board) -> Result<(), Error> {
    let addr = stream.peer_addr()?;
    info!("Peer address: {}", addr);

    let ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .expect("Error during the websocket handshake occurred");
    info!("New WebSocket connection: {}", addr);

    let (mut write, mut read) = ws_stream.split();

    let game_mutex = Arc::new(Mutex::new(Game::new(board, args.time_ms)));
    let engine = Engine::new(args.heuristic);

    while let Some(raw_message) = read.next().await {
        match raw_message {
            Ok(text_message) => {
                if !text_message.is_text() && !text_message.is_binary() { continue; }
                match serde_json::from_slice::<Value>(&text_message.into_data()) {
                    Ok(data) => {
                        info!("Received: {}", data);
                        let result: Result<Value, Error> = handle_message(&game_mutex, &engine, data).await;
                        let response = match result {
                            Ok(resp) => resp,
                            Err(e) => {
                                error!("Error handling message: {:?}", e);
                                json!({"error": format!("{:?}", e)})
                            }
                        };
                        let response_str = response.to_string();
                        write.send(Message::text(response_str.clone())).await
                                    .expect(&format!("Failed to send message: {}", response_str));
                        info!("Sent: {}", response_str);
                    },
                    Err(e) => { error!("Error parsing JSON: {:?}", e); }
                }
            }
            Err(e) => { error!("Error reading websocket message: {:?}", e); }
        }
    }

    Ok(())
}

async fn handle_message(game_mutex: &Arc<Mutex<Game>>, engine: &Engine, data: Value) -> Result<Value, Error> {
    let mut game = game_mutex.lock().unwrap();

    let map = data.as_object()
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Expected a dict"))?;

    // client message protocol: "start", "move"
    // server message protocol: "move", "legal_moves", "error", "end"
    if map.contains_key("start") {
        let client_is_first = data["start"].as_bool().ok_or_else(
            || Error::new(ErrorKind::InvalidInput, "Expected boolean field: start")
        )?;
        let response = handle_start(&mut game, engine, client_is_first)?;
        Ok(response)
    } else if map.contains_key("move") {
        if !game.started {
            return Err(Error::new(ErrorKind::InvalidInput, "Game has not started yet"));
        }
        let client_move: Move = serde_json::from_value(data["move"].clone())?;
        let response = handle_move(&mut game, engine, client_move)?;
        Ok(response)
    } else {
        Err(Error::new(ErrorKind::InvalidInput, format!("Invalid message: {}", data)))
    }
}

fn handle_start(game: &mut Game, engine: &Engine, client_is_first: bool) -> Result<Value, Error> {
    if game.started {
        return Err(Error::new(ErrorKind::InvalidInput, "Game has already started"));
    }
    game.started = true;
    // the opening mover is Player::One
    game.engine_player = if client_is_first { Player::Two } else { Player::One };
    if client_is_first {
        Ok(json!({ "legal_moves": game.board.legal_moves(game.client_player()) }))
    } else {
        make_engine_move(game, engine)
    }
}

fn handle_move(game: &mut Game, engine: &Engine, client_move: Move) -> Result<Value, Error> {
    game.board = game.board.make_move(client_move)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;
    match check_game_over(game) {
        Some(game_over) => Ok(game_over),
        None => make_engine_move(game, engine)
    }
}

fn make_engine_move(game: &mut Game, engine: &Engine) -> Result<Value, Error> {
    let budget = game.time_ms as f64;
    let start = Instant::now();
    let time_left = move || budget - start.elapsed().as_secs_f64() * 1000.0;
    let selected_move = engine.best_move(&game.board, &time_left)
        .ok_or_else(|| Error::new(ErrorKind::Other, "No legal moves for the engine"))?;
    game.board = game.board.make_move(selected_move)
        .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;
    match check_game_over(game) {
        Some(game_over) => Ok(game_over),
        None => Ok(json!({
            "move": selected_move,
            "legal_moves": game.board.legal_moves(game.client_player()),
        }))
    }
}

fn check_game_over(game: &Game) -> Option<Value> {
    if game.board.is_winner(game.client_player()) {
        Some(json!({ "end": true }))
    } else if game.board.is_winner(game.engine_player) {
        Some(json!({ "end": false }))
    } else {
        None
    }
}
