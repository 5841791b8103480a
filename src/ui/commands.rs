use crate::simulation::Command;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A text command typed on stdin
#[derive(Clone)]
pub struct Shortcut {
    pub words: &'static [&'static str],
    pub command: Command,
    pub description: &'static str,
}

/// Maps typed lines to playback commands
pub struct ShortcutManager {
    shortcuts: Vec<Shortcut>,
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManager {
    pub fn new() -> Self {
        let mut manager = Self {
            shortcuts: Vec::new(),
        };
        manager.register_defaults();
        manager
    }

    fn register_defaults(&mut self) {
        self.register(Shortcut {
            words: &["play", "p"],
            command: Command::Play,
            description: "Start or resume playback (replays when finished)",
        });
        self.register(Shortcut {
            words: &["pause", "s"],
            command: Command::Pause,
            description: "Pause playback",
        });
        self.register(Shortcut {
            words: &["toggle", "t", ""],
            command: Command::Toggle,
            description: "Toggle play/pause (also an empty line)",
        });
        self.register(Shortcut {
            words: &["reset", "r"],
            command: Command::Reset,
            description: "Rewind to the first waypoint",
        });
        self.register(Shortcut {
            words: &["quit", "q", "exit"],
            command: Command::Quit,
            description: "Quit",
        });
    }

    pub fn register(&mut self, shortcut: Shortcut) {
        self.shortcuts.push(shortcut);
    }

    /// Resolve one input line, ignoring case and surrounding whitespace
    pub fn parse(&self, line: &str) -> Option<Command> {
        let word = line.trim().to_lowercase();
        self.shortcuts
            .iter()
            .find(|s| s.words.contains(&word.as_str()))
            .map(|s| s.command)
    }

    /// One help line per shortcut
    pub fn help(&self) -> Vec<String> {
        self.shortcuts
            .iter()
            .map(|s| {
                let words: Vec<&str> = s.words.iter().copied().filter(|w| !w.is_empty()).collect();
                format!("  {:<16} {}", words.join(", "), s.description)
            })
            .collect()
    }
}

/// Forward commands typed on stdin until EOF or `quit`
pub fn spawn_stdin_reader(tx: mpsc::Sender<Command>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let shortcuts = ShortcutManager::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("stdin read error: {}", e);
                    break;
                }
            };

            match shortcuts.parse(&line) {
                Some(command) => {
                    if tx.send(command).await.is_err() || command == Command::Quit {
                        break;
                    }
                }
                None => warn!("Unknown command {:?}", line.trim()),
            }
        }
        debug!("stdin reader finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let shortcuts = ShortcutManager::new();
        assert_eq!(shortcuts.parse("play"), Some(Command::Play));
        assert_eq!(shortcuts.parse("  P \n"), Some(Command::Play));
        assert_eq!(shortcuts.parse("pause"), Some(Command::Pause));
        assert_eq!(shortcuts.parse(""), Some(Command::Toggle));
        assert_eq!(shortcuts.parse("RESET"), Some(Command::Reset));
        assert_eq!(shortcuts.parse("q"), Some(Command::Quit));
        assert_eq!(shortcuts.parse("rewind"), None);
    }

    #[test]
    fn test_help_lists_every_shortcut() {
        let help = ShortcutManager::new().help();
        assert_eq!(help.len(), 5);
        assert!(help[2].contains("toggle, t"));
        assert!(!help[2].contains("t, ,"));
    }
}
