/// Shell verbs, after alias resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Find,
    Cd,
    Pwd,
    Play,
    List,
    Next,
    Clear,
    Download,
    History,
    Last,
    LastNext,
    Provider,
    Toggle,
    Custom,
    Url,
    Echo,
    Help,
    Exit,
}

impl Command {
    /// Resolve a lower-cased verb
    pub fn from_verb(verb: &str) -> Option<Self> {
        let command = match verb {
            "f" | "find" => Command::Find,
            "cd" => Command::Cd,
            "pwd" => Command::Pwd,
            "p" | "play" => Command::Play,
            "ls" | "list" | "ep" => Command::List,
            "n" | "next" => Command::Next,
            "c" | "clear" => Command::Clear,
            "d" | "download" => Command::Download,
            "hs" | "hi" | "history" => Command::History,
            "l" | "last" => Command::Last,
            "ln" | "lastn" | "lastnext" | "lnext" => Command::LastNext,
            "pr" | "prov" | "provider" => Command::Provider,
            "tgl" | "toggle" => Command::Toggle,
            "cust" | "custom" => Command::Custom,
            "url" => Command::Url,
            "echo" => Command::Echo,
            "help" | "h" => Command::Help,
            "exit" => Command::Exit,
            _ => return None,
        };
        Some(command)
    }
}

/// Split a line on the first whitespace run. The verb is lower-cased, the
/// argument keeps its casing.
pub fn split_line(line: &str) -> (String, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((verb, argument)) => (verb.to_lowercase(), argument.trim()),
        None => (line.to_lowercase(), ""),
    }
}

pub const HELP: &[&str] = &[
    "Available commands:",
    "------------------",
    "f <search term>      - Find movies and TV shows",
    "cd <index|name|path> - Change directory to a media item or season",
    "cd ..                - Go up one level",
    "ls                   - List items in the current directory",
    "pwd                  - Print the current path",
    "p                    - Play the selected movie or episode",
    "p <index|path>       - Play an episode (e.g. p breaking bad/2/5)",
    "n                    - Play next episode",
    "l                    - Play last watched episode",
    "ln                   - Play next episode of last watched episode",
    "hs                   - Display watch history",
    "pr [index]           - List or choose the video provider",
    "url                  - Print the last played URL",
    "d [name]             - Download media",
    "tgl                  - Toggle the now playing panel",
    "cust                 - Customize colors, prompt symbol and title",
    "clear                - Clear the console",
    "help | h             - Display this help message",
    "exit                 - Exit the application",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(Command::from_verb("f"), Some(Command::Find));
        assert_eq!(Command::from_verb("ep"), Some(Command::List));
        assert_eq!(Command::from_verb("hi"), Some(Command::History));
        assert_eq!(Command::from_verb("lnext"), Some(Command::LastNext));
        assert_eq!(Command::from_verb("prov"), Some(Command::Provider));
        assert_eq!(Command::from_verb("ai"), None);
    }

    #[test]
    fn test_split_line() {
        assert_eq!(split_line("  F  Breaking Bad "), ("f".to_string(), "Breaking Bad"));
        assert_eq!(split_line("LS"), ("ls".to_string(), ""));
        assert_eq!(split_line("cd\tThe Office/2"), ("cd".to_string(), "The Office/2"));
    }
}
