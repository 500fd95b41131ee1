use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::core::{Action, Command, Module, NotifyLevel};
use crate::infrastructure::runtime::{Request, Response, RuntimeEvent};
use crate::modules::{BlocksScreen, HistoryScreen, PoolScreen, ToolsScreen, WalletScreen};

/// Main tabs in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Blocks,
    Pool,
    History,
    Wallet,
    Tools,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Blocks, Tab::Pool, Tab::History, Tab::Wallet, Tab::Tools];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Blocks => "Blocks",
            Tab::Pool => "Pool",
            Tab::History => "History",
            Tab::Wallet => "Wallet",
            Tab::Tools => "Tools",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            Tab::Blocks => '1',
            Tab::Pool => '2',
            Tab::History => '3',
            Tab::Wallet => '4',
            Tab::Tools => '5',
        }
    }

    pub fn from_shortcut(c: char) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.shortcut() == c)
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|tab| tab == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    /// Typing into the current screen's form
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// Settings the app is started with, resolved from config and CLI
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub service_url: String,
    pub wallet_address: Option<String>,
    pub latest_blocks: u32,
    pub normalize_wallet_timestamps: bool,
}

pub struct App {
    pub active_tab: Tab,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub status: Option<StatusMessage>,
    /// Modal message that stays until dismissed
    pub alert: Option<String>,
    pub help_open: bool,
    pub should_quit: bool,
    pub service_url: String,

    pub blocks: BlocksScreen,
    pub pool: PoolScreen,
    pub history: HistoryScreen,
    pub wallet: WalletScreen,
    pub tools: ToolsScreen,

    outbox: Vec<Request>,
    in_flight: usize,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            active_tab: Tab::Blocks,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            status: None,
            alert: None,
            help_open: false,
            should_quit: false,
            service_url: settings.service_url,
            blocks: BlocksScreen::new(settings.latest_blocks),
            pool: PoolScreen::new(),
            history: HistoryScreen::new(),
            wallet: WalletScreen::new(
                settings.wallet_address,
                settings.normalize_wallet_timestamps,
            ),
            tools: ToolsScreen::new(),
            outbox: Vec::new(),
            in_flight: 0,
        }
    }

    /// Queue the initial loads: latest blocks, pool, wallet
    pub fn start(&mut self) {
        let mut requests = self.blocks.refresh();
        requests.extend(self.pool.refresh());
        requests.extend(self.wallet.refresh());
        self.outbox.extend(requests);
        self.set_status(format!("Connecting to {}…", self.service_url), StatusLevel::Info);
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            let ttl = match status.level {
                StatusLevel::Info => Duration::from_secs(3),
                StatusLevel::Warn | StatusLevel::Error => Duration::from_secs(8),
            };
            if status.since.elapsed() > ttl {
                self.status = None;
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn cycle_tab(&mut self, forward: bool) {
        let len = Tab::ALL.len();
        let index = self.active_tab.index();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        self.active_tab = Tab::ALL[next];
    }

    /// The screen behind the active tab
    pub fn active_module(&mut self) -> &mut dyn Module {
        match self.active_tab {
            Tab::Blocks => &mut self.blocks,
            Tab::Pool => &mut self.pool,
            Tab::History => &mut self.history,
            Tab::Wallet => &mut self.wallet,
            Tab::Tools => &mut self.tools,
        }
    }

    /// Re-issue the active screen's requests
    pub fn refresh(&mut self) {
        let requests = self.active_module().refresh();
        if requests.is_empty() {
            self.set_status("Nothing to refresh", StatusLevel::Info);
        }
        self.outbox.extend(requests);
    }

    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn enter_form(&mut self) {
        self.input_mode = InputMode::Form;
    }

    pub fn exit_form(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }
        let cmd = crate::core::parse_command(&input);
        self.exit_command();
        let action = self.execute_command(&cmd);
        self.apply_action(action);
        self.command.last = Some(input);
    }

    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Blocks(count) => {
                self.active_tab = Tab::Blocks;
                if let Some(count) = count {
                    self.blocks.set_count(*count);
                }
                Action::Dispatch(self.blocks.fetch())
            }
            Command::Pool => {
                self.active_tab = Tab::Pool;
                Action::Dispatch(self.pool.fetch())
            }
            Command::Mine => {
                self.active_tab = Tab::Pool;
                Action::Dispatch(self.pool.mine())
            }
            Command::History(item_hash) => {
                self.active_tab = Tab::History;
                self.history.lookup(item_hash)
            }
            Command::Wallet(address) => {
                self.active_tab = Tab::Wallet;
                match address {
                    Some(address) => self.wallet.show(address),
                    None => match self.wallet.fetch_info() {
                        Some(request) => Action::Dispatch(request),
                        None => Action::Dispatch(self.wallet.fetch_own_address()),
                    },
                }
            }
            Command::Hash { item_id, hash } => {
                self.active_tab = Tab::Tools;
                self.tools.verify_hash(item_id, hash)
            }
            Command::Sign(token) => {
                self.active_tab = Tab::Tools;
                self.tools.sign_token(token)
            }
            Command::Coinbase { item_hash, amount } => {
                self.active_tab = Tab::Tools;
                self.tools.create_coinbase(item_hash, amount)
            }
            Command::Clear => {
                self.active_tab = Tab::Tools;
                self.tools.clear();
                Action::Notify(
                    format!("{} cleared", self.tools.active().title()),
                    NotifyLevel::Info,
                )
            }
            Command::Refresh => {
                self.refresh();
                Action::None
            }
            Command::Help => {
                self.help_open = true;
                Action::None
            }
            Command::Quit => Action::Quit,
            Command::Unknown(s) => {
                Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn)
            }
        }
    }

    /// Apply an action returned by a command or module
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Dispatch(request) => {
                if self.input_mode == InputMode::Form {
                    self.exit_form();
                }
                self.set_status(format!("Requesting {}…", request.label()), StatusLevel::Info);
                self.outbox.push(request);
            }
            Action::Notify(msg, level) => self.set_status(msg, level.into()),
            Action::Alert(message) => {
                warn!(alert = %message, "alert raised");
                self.alert = Some(message);
            }
            Action::EditForm => self.enter_form(),
            Action::CloseOverlay => self.exit_form(),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Requests waiting to be sent to the worker
    pub fn take_requests(&mut self) -> Vec<Request> {
        let requests = std::mem::take(&mut self.outbox);
        self.in_flight += requests.len();
        requests
    }

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::Completed(response) => self.apply_response(response),
            RuntimeEvent::Error { message } => self.set_status(message, StatusLevel::Error),
        }
    }

    /// Route a response to the screen that issued the request
    pub fn apply_response(&mut self, response: Response) {
        self.in_flight = self.in_flight.saturating_sub(1);
        debug!(?response, "response");
        let action = match response {
            Response::LatestBlocks { seq, result } => self.blocks.apply(seq, result),
            Response::TransactionPool { seq, result } => self.pool.apply_pool(seq, result),
            Response::ItemHistory { seq, result } => self.history.apply(seq, result),
            Response::MyWalletAddress { seq, result } => self.wallet.apply_own_address(seq, result),
            Response::WalletInfo {
                seq,
                address,
                result,
            } => self.wallet.apply_info(seq, &address, result),
            Response::MineBlock { seq, result } => self.pool.apply_mine(seq, result),
            Response::CalculateHash { seq, result } => self.tools.apply_hash(seq, result),
            Response::SignToken { seq, result } => self.tools.apply_sign(seq, result),
            Response::CreateCoinbase { seq, result } => self.tools.apply_coinbase(seq, result),
        };
        self.apply_action(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ledger::{Block, CoinbaseReceipt, LedgerError};

    fn app() -> App {
        App::new(AppSettings {
            service_url: "http://localhost:8080".into(),
            wallet_address: Some("DuWsoUYuWYySNByFpVQge4ivB4KkfF1zw".into()),
            latest_blocks: 10,
            normalize_wallet_timestamps: false,
        })
    }

    #[test]
    fn test_start_queues_initial_loads() {
        let mut app = app();
        app.start();
        let requests = app.take_requests();
        let labels: Vec<&str> = requests.iter().map(Request::label).collect();
        assert_eq!(
            labels,
            vec!["latest blocks", "transaction pool", "wallet address", "wallet info"]
        );
        assert_eq!(app.in_flight(), 4);
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn test_tab_cycling() {
        let mut app = app();
        app.cycle_tab(false);
        assert_eq!(app.active_tab, Tab::Tools);
        app.cycle_tab(true);
        assert_eq!(app.active_tab, Tab::Blocks);
        assert_eq!(Tab::from_shortcut('4'), Some(Tab::Wallet));
        assert_eq!(Tab::from_shortcut('9'), None);
    }

    #[test]
    fn test_palette_command_dispatches() {
        let mut app = app();
        app.enter_command();
        app.command.input = "blocks 3".into();
        app.apply_command();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(
            app.take_requests(),
            vec![Request::LatestBlocks { seq: 1, count: 3 }]
        );
        assert_eq!(app.command.last.as_deref(), Some("blocks 3"));
    }

    #[test]
    fn test_unknown_command_warns() {
        let mut app = app();
        app.command.input = "fly".into();
        app.apply_command();
        assert_eq!(
            app.status_text(),
            Some(("Unknown command: fly", StatusLevel::Warn))
        );
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn test_responses_are_routed() {
        let mut app = app();
        let requests = {
            app.start();
            app.take_requests()
        };
        let Request::LatestBlocks { seq, .. } = requests[0] else {
            unreachable!()
        };
        app.apply_event(RuntimeEvent::Completed(Response::LatestBlocks {
            seq,
            result: Ok(vec![Block::default(), Block {
                height: 1,
                ..Default::default()
            }]),
        }));
        assert_eq!(app.blocks.view().len(), 2);
        assert_eq!(app.in_flight(), 3);

        let Request::TransactionPool { seq } = requests[1] else {
            unreachable!()
        };
        app.apply_response(Response::TransactionPool {
            seq,
            result: Err(LedgerError::Transport("connection refused".into())),
        });
        let (text, level) = app.status_text().unwrap();
        assert_eq!(level, StatusLevel::Warn);
        assert!(text.contains("connection refused"));
        assert!(app.alert.is_none());
        assert!(app.pool.view().is_empty());
    }

    #[test]
    fn test_failed_submission_raises_alert() {
        let mut app = app();
        app.command.input = "coinbase abcd 10".into();
        app.apply_command();
        assert_eq!(app.active_tab, Tab::Tools);
        let requests = app.take_requests();
        let Request::CreateCoinbase { seq, .. } = requests[0] else {
            unreachable!()
        };
        app.apply_response(Response::CreateCoinbase {
            seq,
            result: Err(LedgerError::Rejected("invalid item hash".into())),
        });
        assert_eq!(app.alert.as_deref(), Some("invalid item hash"));
        assert!(app.tools.coinbase.slots().is_blank());
        assert!(app.dismiss_alert());
        assert!(!app.dismiss_alert());

        app.command.input = "coinbase abcd 10".into();
        app.apply_command();
        let Request::CreateCoinbase { seq, .. } = app.take_requests()[0] else {
            unreachable!()
        };
        app.apply_response(Response::CreateCoinbase {
            seq,
            result: Ok(CoinbaseReceipt {
                tx_id: Some("T".into()),
                ..Default::default()
            }),
        });
        assert_eq!(app.alert.as_deref(), Some("Successful transaction"));
        assert_eq!(app.tools.coinbase.slots().get("TxID"), Some("T"));
    }

    #[test]
    fn test_form_dispatch_leaves_form_mode() {
        let mut app = app();
        app.set_tab(Tab::History);
        app.apply_action(Action::EditForm);
        assert_eq!(app.input_mode, InputMode::Form);
        let action = app.history.lookup("c0de");
        app.apply_action(action);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.take_requests().len(), 1);
    }
}
