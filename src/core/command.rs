//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Collections
    Blocks(Option<u32>),
    Pool,
    Mine,
    History(String),
    Wallet(Option<String>),

    // Tools
    Hash { item_id: String, hash: String },
    Sign(String),
    Coinbase { item_hash: String, amount: String },
    Clear,

    // Application
    Refresh,
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.to_lowercase().as_str() {
        "blocks" | "blk" => match args {
            None => Command::Blocks(None),
            Some(n) => match n.parse::<u32>() {
                Ok(n) if n > 0 => Command::Blocks(Some(n)),
                _ => Command::Unknown(input.to_string()),
            },
        },
        "pool" | "mempool" => Command::Pool,
        "mine" => Command::Mine,
        "history" | "hist" => match args {
            Some(hash) => Command::History(hash),
            None => Command::Unknown(input.to_string()),
        },
        "wallet" | "w" => Command::Wallet(args),

        "hash" | "verify" => match two_args(args.as_deref()) {
            Some((item_id, hash)) => Command::Hash { item_id, hash },
            None => Command::Unknown(input.to_string()),
        },
        "sign" => match args {
            Some(token) => Command::Sign(token),
            None => Command::Unknown(input.to_string()),
        },
        "coinbase" | "cb" => match two_args(args.as_deref()) {
            Some((item_hash, amount)) => Command::Coinbase { item_hash, amount },
            None => Command::Unknown(input.to_string()),
        },
        "clear" => Command::Clear,

        "refresh" | "r" => Command::Refresh,
        "help" | "h" => Command::Help,
        "quit" | "q" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}

fn two_args(args: Option<&str>) -> Option<(String, String)> {
    let mut words = args?.split_whitespace();
    let first = words.next()?.to_string();
    let second = words.next()?.to_string();
    if words.next().is_some() {
        return None;
    }
    Some((first, second))
}
