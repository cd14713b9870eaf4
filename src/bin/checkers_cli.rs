use std::io::{self, BufRead, Write};

use checkers::{Color, GameController, RulesConfig, SelectOutcome};

const USAGE: &str = "Usage: checkers_cli [--size <N>] [--rows <N>] [--first white|blue]";

fn parse_args() -> RulesConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RulesConfig::default();

    let mut i = 1;
    while i < args.len() {
        let Some(value) = args.get(i + 1) else {
            eprintln!("{} requires a value\n{USAGE}", args[i]);
            std::process::exit(2);
        };
        match args[i].as_str() {
            "--size" => config.board_size = parse_number("--size", value),
            "--rows" => config.rows_per_side = parse_number("--rows", value),
            "--first" => {
                config.first_turn = match value.as_str() {
                    "white" => Color::White,
                    "blue" => Color::Blue,
                    _ => {
                        eprintln!("--first requires 'white' or 'blue'");
                        std::process::exit(2);
                    }
                };
            }
            x => {
                eprintln!("Unknown option: {x}\n{USAGE}");
                std::process::exit(2);
            }
        }
        i += 2;
    }

    config
}

fn parse_number(flag: &str, value: &str) -> u8 {
    match value.parse::<u8>() {
        Ok(n) => n,
        Err(e) => {
            eprintln!("invalid {flag} {value}: {e}");
            std::process::exit(2);
        }
    }
}

fn show(game: &GameController, out: &mut impl Write) -> io::Result<()> {
    write!(out, "{}", game.board())?;
    let counts = game.board().counts();
    let kings = game.board().king_counts();
    let tally: Vec<String> = Color::ALL
        .into_iter()
        .map(|color| format!("{color}: {} ({} kings)", counts.get(color), kings.get(color)))
        .collect();
    writeln!(out, "{}", tally.join("  "))?;

    if let Some(winner) = game.winner() {
        return writeln!(out, "game over: {winner} wins");
    }
    writeln!(out, "to move: {}", game.turn())?;

    if let Some(piece) = game.selected() {
        writeln!(out, "selected: {}", piece.position())?;
        for (to, captures) in game.valid_moves() {
            let jumped: Vec<String> = captures.iter().map(|p| p.position().to_string()).collect();
            if jumped.is_empty() {
                writeln!(out, "  -> {to}")?;
            } else {
                writeln!(out, "  -> {to} capturing {}", jumped.join(" "))?;
            }
        }
    }
    Ok(())
}

fn describe(outcome: SelectOutcome) -> String {
    match outcome {
        SelectOutcome::Moved { captured, promoted } => {
            let mut text = format!("moved, captured {captured}");
            if promoted {
                text.push_str(", promoted to king");
            }
            text
        }
        SelectOutcome::Selected => "selected".to_string(),
        SelectOutcome::Deselected => "deselected".to_string(),
        SelectOutcome::Ignored => "ignored".to_string(),
    }
}

fn main() {
    let config = parse_args();
    let mut game = match GameController::new(config) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        let result = match words.as_slice() {
            [] => Ok(()),
            ["quit"] | ["exit"] => break,
            ["show"] => show(&game, &mut out),
            ["reset"] => {
                game.reset();
                writeln!(out, "reset")
            }
            ["select", row, col] => match (row.parse::<u8>(), col.parse::<u8>()) {
                (Ok(row), Ok(col)) => match game.select(row, col) {
                    Ok(outcome) => writeln!(out, "{}", describe(outcome)),
                    Err(e) => {
                        eprintln!("{e}");
                        Ok(())
                    }
                },
                _ => {
                    eprintln!("select expects two cell indices, got: {line}");
                    Ok(())
                }
            },
            _ => {
                eprintln!("unknown command: {line} (expected: select r c | reset | show | quit)");
                Ok(())
            }
        };

        if let Err(e) = result.and_then(|()| out.flush()) {
            eprintln!("Error writing output: {e}");
            break;
        }
    }
}
