//! Line-oriented text protocol for driving the engine from a UI or a script.
//!
//! The framing follows GTP: each request is one line with an optional numeric
//! id, each response starts with `=` (success) or `?` (failure) followed by the
//! id, and ends with a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `new` - Reset to the standard opening
//! - `position <placement> [r|b]` - Load a position
//! - `board` - Print the current position
//! - `legal <square>` - List destinations for the piece on a square
//! - `play <move>` - Play a move such as `b9c7` for the side to move
//! - `genmove` - Search, play and print the engine's move
//! - `rounds <n>` - Set the search rounds per `genmove`
//! - `result` - `red`, `black` or `undecided`
//!
//! ## Example
//!
//! ```no_run
//! use xiangqi_mcts::config::SearchConfig;
//! use xiangqi_mcts::protocol::ProtocolEngine;
//!
//! let mut engine = ProtocolEngine::new(SearchConfig::default()).unwrap();
//! engine.run().unwrap();
//! ```

use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::mcts::SearchEngine;
use crate::position::{parse_square, str_square, Move, Outcome, Position};

const PROTOCOL_VERSION: &str = "1";

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "board",
    "genmove",
    "known_command",
    "legal",
    "list_commands",
    "name",
    "new",
    "play",
    "position",
    "protocol_version",
    "quit",
    "result",
    "rounds",
    "version",
];

/// Protocol session state.
pub struct ProtocolEngine {
    engine: SearchEngine,
}

impl ProtocolEngine {
    pub fn new(config: SearchConfig) -> Result<Self> {
        Ok(Self {
            engine: SearchEngine::new(Position::start(), config)?,
        })
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!(command = %command, error = %message, "command failed");
            }
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional numeric command id from the front of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute one command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, PROTOCOL_VERSION.to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "new" => match self.engine.reset(Position::start()) {
                Ok(()) => {
                    info!("new game");
                    (true, String::new())
                }
                Err(e) => (false, e.to_string()),
            },

            "position" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let loaded = Position::from_fen(&args.join(" "))
                    .and_then(|position| {
                        let fen = position.to_fen();
                        self.engine.reset(position)?;
                        Ok(fen)
                    });
                match loaded {
                    Ok(fen) => {
                        info!(fen = %fen, "position loaded");
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "board" => (true, format!("\n{}", self.engine.position())),

            "legal" => {
                let Some(square) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match parse_square(square) {
                    Ok(from) => {
                        let moves: Vec<String> = self
                            .engine
                            .legal_moves_from(from)
                            .into_iter()
                            .map(str_square)
                            .collect();
                        (true, moves.join(" "))
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "play" => {
                let Some(text) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let mv: Move = match text.parse() {
                    Ok(mv) => mv,
                    Err(e) => return (false, e.to_string()),
                };
                match self.engine.commit_external_move(mv.from, mv.to) {
                    Ok(()) => {
                        debug!(mv = %mv, "external move played");
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                if self.engine.position().is_terminal() {
                    return (false, "game is over".to_string());
                }
                if let Err(e) = self.engine.search() {
                    return (false, e.to_string());
                }
                match self.engine.commit_best_move() {
                    Ok(mv) => (true, mv.to_string()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "rounds" => {
                let Some(value) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match value.parse::<u32>() {
                    Ok(rounds) => match self.engine.set_rounds(rounds) {
                        Ok(()) => (true, String::new()),
                        Err(e) => (false, e.to_string()),
                    },
                    Err(_) => (false, format!("invalid round count '{value}'")),
                }
            }

            "result" => {
                let text = match self.engine.position().result() {
                    Outcome::Win(color) => color.to_string().to_lowercase(),
                    Outcome::Undecided => "undecided".to_string(),
                };
                (true, text)
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    fn session() -> ProtocolEngine {
        ProtocolEngine::new(SearchConfig::for_testing().with_rounds(30)).unwrap()
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = ProtocolEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = ProtocolEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = session();
        let (success, response) = engine.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "xiangqi-mcts");
    }

    #[test]
    fn test_known_command() {
        let mut engine = session();

        let (success, response) = engine.execute("known_command", &["genmove"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = engine.execute("known_command", &["boardsize"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_legal_lists_destinations() {
        let mut engine = session();
        // Black horse on b9 at the start.
        let (success, response) = engine.execute("legal", &["b9"]);
        assert!(success);
        assert_eq!(response, "a7 c7");

        // Red pieces cannot move on Black's turn.
        let (success, response) = engine.execute("legal", &["b0"]);
        assert!(success);
        assert_eq!(response, "");
    }

    #[test]
    fn test_play_and_reject() {
        let mut engine = session();

        let (success, _) = engine.execute("play", &["b9c7"]);
        assert!(success);
        assert_eq!(engine.engine.position().side_to_move(), Color::Red);

        // Black horse no longer on b9, and it is Red's turn anyway.
        let (success, _) = engine.execute("play", &["b9c7"]);
        assert!(!success);

        let (success, _) = engine.execute("play", &["zz"]);
        assert!(!success);
    }

    #[test]
    fn test_genmove_plays_a_legal_move() {
        let mut engine = session();
        let before = engine.engine.position().clone();

        let (success, response) = engine.execute("genmove", &[]);
        assert!(success);
        let mv: Move = response.parse().unwrap();
        assert!(before.legal_moves_from(mv.from, Color::Black).contains(&mv.to));
        assert_eq!(engine.engine.position(), &before.apply_move(mv.from, mv.to));
    }

    #[test]
    fn test_position_and_result() {
        let mut engine = session();

        let (success, _) = engine.execute("position", &["3K5/9/9/9/9/9/9/9/9/R3k4", "r"]);
        assert!(success);
        let (_, response) = engine.execute("result", &[]);
        assert_eq!(response, "undecided");

        let (success, _) = engine.execute("play", &["a9e9"]);
        assert!(success);
        let (_, response) = engine.execute("result", &[]);
        assert_eq!(response, "red");

        let (success, _) = engine.execute("genmove", &[]);
        assert!(!success);

        let (success, _) = engine.execute("position", &["9/9/9/9/9/9/9/9/9/9"]);
        assert!(!success);
    }

    #[test]
    fn test_rounds_and_new() {
        let mut engine = session();

        let (success, _) = engine.execute("rounds", &["5"]);
        assert!(success);
        assert_eq!(engine.engine.config().rounds, 5);

        let (success, _) = engine.execute("rounds", &["0"]);
        assert!(!success);

        engine.execute("play", &["b9c7"]);
        let (success, _) = engine.execute("new", &[]);
        assert!(success);
        assert_eq!(engine.engine.position(), &Position::start());
    }

    #[test]
    fn test_serve_frames_responses() {
        let mut engine = session();
        let input = b"1 name\n# comment\n\nbogus\n2 quit\nname\n";
        let mut output = Vec::new();
        engine.serve(&input[..], &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "=1 xiangqi-mcts\n\n? unknown command: bogus\n\n=2 \n\n");
    }
}
