#![cfg(feature = "std")]

mod common;

use std::sync::Arc;

use battleship_server::server::handle_connection;
use battleship_server::session::{Coordinator, SessionConfig};
use battleship_server::{InMemoryTransport, Transport};

fn coordinator(max_sessions: usize) -> Arc<Coordinator> {
    Arc::new(Coordinator::new(SessionConfig {
        seed: Some(2024),
        max_sessions,
    }))
}

async fn expect(client: &mut InMemoryTransport, expected: &str) -> anyhow::Result<()> {
    let line = client.recv_line().await?;
    assert_eq!(line.as_deref(), Some(expected));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_game_in_memory() -> anyhow::Result<()> {
    let coordinator = coordinator(4);
    let (server_end, mut client) = InMemoryTransport::pair();
    let server = tokio::spawn(handle_connection(server_end, Arc::clone(&coordinator), 1));

    let transcript = common::play_scripted_game(&mut client).await?;
    server.await??;

    assert_eq!(
        transcript.lines[0],
        "Welcome to Battleship! Place your ships on the board."
    );
    assert_eq!(transcript.count("Setup completed. Your board looks like this!"), 1);
    assert_eq!(transcript.count("Let the game begin!"), 1);
    assert_eq!(transcript.count("Invalid placement! Try again."), 0);
    assert!(transcript.count("AI board:") >= 1);
    assert!(transcript.count("Your board:") >= 1);
    let verdict = transcript.lines.last().map(String::as_str);
    assert_eq!(
        verdict,
        Some(if transcript.won { "You Win!" } else { "You Lose!" })
    );
    assert_eq!(coordinator.active_sessions(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_setup_board_is_shown_after_the_last_ship() -> anyhow::Result<()> {
    let coordinator = coordinator(4);
    let (server_end, mut client) = InMemoryTransport::pair();
    let server = tokio::spawn(handle_connection(server_end, Arc::clone(&coordinator), 1));

    expect(&mut client, "Welcome to Battleship! Place your ships on the board.").await?;
    expect(&mut client, "Enter ship coordinates and direction (e.g., 'A1 horizontal')").await?;
    for (placement, length) in [("A1 horizontal", 2), ("B1 h", 3), ("C1 H", 4), ("D1 horizontal", 5)] {
        expect(&mut client, &format!("Place your ship of length {}:", length)).await?;
        client.send_line(placement).await?;
    }
    expect(&mut client, "Setup completed. Your board looks like this!").await?;
    expect(&mut client, "S S - - - - - - - -").await?;
    expect(&mut client, "S S S - - - - - - -").await?;
    expect(&mut client, "S S S S - - - - - -").await?;
    expect(&mut client, "S S S S S - - - - -").await?;
    for _ in 0..6 {
        expect(&mut client, "- - - - - - - - - -").await?;
    }
    expect(&mut client, "Let the game begin!").await?;
    expect(&mut client, "Your turn! Enter target coordinates (e.g., 'A1'):").await?;

    drop(client);
    let _ = server.await?;
    assert_eq!(coordinator.active_sessions(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_input_reprompts() -> anyhow::Result<()> {
    let coordinator = coordinator(4);
    let (server_end, mut client) = InMemoryTransport::pair();
    let server = tokio::spawn(handle_connection(server_end, Arc::clone(&coordinator), 1));

    expect(&mut client, "Welcome to Battleship! Place your ships on the board.").await?;
    expect(&mut client, "Enter ship coordinates and direction (e.g., 'A1 horizontal')").await?;
    expect(&mut client, "Place your ship of length 2:").await?;

    for bad in ["nonsense", "A10 horizontal", "K1 vertical", "A1 sideways"] {
        client.send_line(bad).await?;
        expect(&mut client, "Invalid placement! Try again.").await?;
        expect(&mut client, "Place your ship of length 2:").await?;
    }
    client.send_line("A1 horizontal").await?;
    expect(&mut client, "Place your ship of length 3:").await?;
    client.send_line("A2 vertical").await?;
    expect(&mut client, "Invalid placement! Try again.").await?;
    expect(&mut client, "Place your ship of length 3:").await?;

    drop(client);
    let _ = server.await?;
    assert_eq!(coordinator.active_sessions(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_targets_keep_the_turn() -> anyhow::Result<()> {
    let coordinator = coordinator(4);
    let (server_end, mut client) = InMemoryTransport::pair();
    let server = tokio::spawn(handle_connection(server_end, Arc::clone(&coordinator), 1));

    loop {
        let line = client.recv_line().await?.unwrap();
        if let Some(length) = line
            .strip_prefix("Place your ship of length ")
            .and_then(|rest| rest.strip_suffix(':'))
        {
            let row = match length {
                "2" => 'A',
                "3" => 'B',
                "4" => 'C',
                _ => 'D',
            };
            client.send_line(&format!("{}1 horizontal", row)).await?;
        }
        if line == "Let the game begin!" {
            break;
        }
    }
    expect(&mut client, "Your turn! Enter target coordinates (e.g., 'A1'):").await?;
    for bad in ["Z99", "A11", "hello", ""] {
        client.send_line(bad).await?;
        expect(&mut client, "Invalid target! Try again.").await?;
        expect(&mut client, "Your turn! Enter target coordinates (e.g., 'A1'):").await?;
    }

    drop(client);
    let _ = server.await?;
    assert_eq!(coordinator.active_sessions(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disconnect_forfeits() -> anyhow::Result<()> {
    let coordinator = coordinator(4);
    let (server_end, mut client) = InMemoryTransport::pair();
    let server = tokio::spawn(handle_connection(server_end, Arc::clone(&coordinator), 1));

    expect(&mut client, "Welcome to Battleship! Place your ships on the board.").await?;
    assert_eq!(coordinator.active_sessions(), 1);
    drop(client);

    // The server either notices EOF or fails its next write; both forfeit.
    let _ = server.await?;
    assert_eq!(coordinator.active_sessions(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_server_turns_clients_away() -> anyhow::Result<()> {
    let coordinator = coordinator(1);
    let _taken = coordinator.open(99)?;

    let (server_end, mut client) = InMemoryTransport::pair();
    handle_connection(server_end, Arc::clone(&coordinator), 1).await?;
    expect(&mut client, "Server is full, try again later.").await?;
    assert_eq!(client.recv_line().await?, None);
    assert_eq!(coordinator.active_sessions(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_games() -> anyhow::Result<()> {
    let coordinator = coordinator(8);
    let mut games = Vec::new();
    for connection in 1..=6 {
        let (server_end, mut client) = InMemoryTransport::pair();
        let server = tokio::spawn(handle_connection(
            server_end,
            Arc::clone(&coordinator),
            connection,
        ));
        games.push(tokio::spawn(async move {
            let transcript = common::play_scripted_game(&mut client).await?;
            server.await??;
            anyhow::Ok(transcript)
        }));
    }
    for game in games {
        let transcript = game.await??;
        assert_eq!(transcript.count("Game Over!"), 1);
    }
    assert_eq!(coordinator.active_sessions(), 0);
    Ok(())
}
