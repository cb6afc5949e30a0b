use battleship_server::Transport;

/// Everything a scripted client saw, in order.
pub struct Transcript {
    pub lines: Vec<String>,
    pub won: bool,
}

impl Transcript {
    pub fn count(&self, line: &str) -> usize {
        self.lines.iter().filter(|l| *l == line).count()
    }
}

fn placement_for(prompt: &str) -> Option<&'static str> {
    let length = prompt
        .strip_prefix("Place your ship of length ")?
        .strip_suffix(':')?;
    match length {
        "2" => Some("A1 horizontal"),
        "3" => Some("B1 horizontal"),
        "4" => Some("C1 h"),
        "5" => Some("D1 HORIZONTAL"),
        _ => None,
    }
}

/// Play a whole game as a client: ships on rows A-D, targets in row-major
/// order, every unlocked bombing spent on rows from J upwards.
pub async fn play_scripted_game<T: Transport>(client: &mut T) -> anyhow::Result<Transcript> {
    let mut lines = Vec::new();
    let mut targets = (0..100).map(|i| format!("{}{}", char::from(b'A' + i / 10), i % 10 + 1));
    let mut bomb_rows = "JIHGFEDCBA".chars().cycle();

    while lines.len() < 20_000 {
        let line = client
            .recv_line()
            .await?
            .ok_or_else(|| anyhow::anyhow!("server closed the connection"))?;
        lines.push(line.clone());

        if let Some(placement) = placement_for(&line) {
            client.send_line(placement).await?;
        } else if line == "Your turn! Enter target coordinates (e.g., 'A1'):" {
            let target = targets
                .next()
                .ok_or_else(|| anyhow::anyhow!("ran out of targets"))?;
            client.send_line(&target).await?;
        } else if line == "Do you want to bomb a row or column? (row/column)" {
            client.send_line("row").await?;
        } else if line == "Enter the row (A-J) to bomb:" {
            let row = bomb_rows.next().map(String::from).unwrap_or_default();
            client.send_line(&row).await?;
        } else if line == "Game Over!" {
            let verdict = client
                .recv_line()
                .await?
                .ok_or_else(|| anyhow::anyhow!("no verdict after Game Over"))?;
            let won = verdict == "You Win!";
            lines.push(verdict);
            return Ok(Transcript { lines, won });
        }
    }
    Err(anyhow::anyhow!("game did not finish"))
}
