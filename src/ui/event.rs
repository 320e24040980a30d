//! 事件处理
//!
//! 轮询 crossterm 键盘事件：Ctrl+L 清空、Ctrl+Q 退出、Tab/BackTab 切换视图，其余按键交给 run_app 拼 input_buffer；
//! Enter 时用 parse_input 把斜杠命令解析为 Command（用户输入的序号从 1 开始，发送前转为 0 起）。

use std::path::PathBuf;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::Command;
use crate::ui::render::View;

/// /speak 未给路径时的输出文件
pub const DEFAULT_SPEECH_FILE: &str = "narration.mp3";

pub const HELP_TEXT: &str = "/scan <image> │ /find [craving] @ <postcode|lat,lon> │ /add n │ /qty n ±k │ \
/remove n │ /fav n │ /describe │ /speak [file] │ /checkout │ /clear │ /view menu|food|basket|fav │ /quit";

/// 应用事件：来自快捷键的 Command、视图切换或原始 KeyEvent
#[derive(Debug, Clone)]
pub enum AppEvent {
    Command(Command),
    NextView,
    PrevView,
    Key(KeyEvent),
}

/// 一行输入解析后的动作
#[derive(Debug, Clone)]
pub enum InputAction {
    Send(Command),
    View(View),
    Help,
    Quit,
}

/// 事件处理器：持有 cmd_tx，poll 时读键盘并返回 AppEvent，send 发送解析后的命令
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { cmd_tx }
    }

    pub fn poll(&self) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> AppEvent {
        match key.code {
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.send(Command::Clear);
                AppEvent::Command(Command::Clear)
            }
            KeyCode::Char('q') | KeyCode::Char('c')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                AppEvent::Command(Command::Quit)
            }
            KeyCode::Tab => AppEvent::NextView,
            KeyCode::BackTab => AppEvent::PrevView,
            _ => AppEvent::Key(key),
        }
    }

    pub fn send(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::warn!("orchestrator stopped, command dropped");
        }
    }
}

/// 解析一行输入；错误时返回给用户看的提示
pub fn parse_input(input: &str) -> Result<InputAction, String> {
    let input = input.trim();
    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    };

    match head.to_lowercase().as_str() {
        "/scan" => {
            if rest.is_empty() {
                return Err("Usage: /scan <path to menu photo>".to_string());
            }
            Ok(InputAction::Send(Command::ScanMenu(PathBuf::from(rest))))
        }
        "/find" => {
            let (preferences, location) = match rest.rsplit_once('@') {
                Some((p, l)) => (p.trim(), l.trim()),
                None => (rest, ""),
            };
            Ok(InputAction::Send(Command::FindFood {
                preferences: preferences.to_string(),
                location: location.to_string(),
            }))
        }
        "/add" => Ok(InputAction::Send(Command::AddToBasket(parse_index(rest)?))),
        "/remove" => Ok(InputAction::Send(Command::RemoveFromBasket(parse_index(rest)?))),
        "/fav" => Ok(InputAction::Send(Command::ToggleFavorite(parse_index(rest)?))),
        "/qty" => {
            let mut parts = rest.split_whitespace();
            let index = parse_index(parts.next().unwrap_or(""))?;
            let delta = parts
                .next()
                .and_then(|d| d.trim_start_matches('+').parse::<i64>().ok())
                .ok_or_else(|| "Usage: /qty <n> <+k|-k>".to_string())?;
            Ok(InputAction::Send(Command::AdjustQuantity { index, delta }))
        }
        "/describe" => Ok(InputAction::Send(Command::Describe)),
        "/speak" => {
            let path = if rest.is_empty() { DEFAULT_SPEECH_FILE } else { rest };
            Ok(InputAction::Send(Command::Speak(PathBuf::from(path))))
        }
        "/checkout" => Ok(InputAction::Send(Command::Checkout)),
        "/clear" => Ok(InputAction::Send(Command::Clear)),
        "/view" => View::from_name(rest)
            .map(InputAction::View)
            .ok_or_else(|| "Usage: /view menu|food|basket|fav".to_string()),
        "/help" | "?" => Ok(InputAction::Help),
        "/quit" | "/exit" | "quit" | "exit" => Ok(InputAction::Quit),
        _ => Err(format!("Unknown command '{}'. Type /help", head)),
    }
}

/// 用户输入的 1 起序号 → 0 起下标
fn parse_index(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Expected a number from 1, got '{}'", raw.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_find_with_location() {
        match parse_input("/find cheap sushi @ SW1A 1AA").unwrap() {
            InputAction::Send(Command::FindFood {
                preferences,
                location,
            }) => {
                assert_eq!(preferences, "cheap sushi");
                assert_eq!(location, "SW1A 1AA");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_find_without_location() {
        match parse_input("/find pizza").unwrap() {
            InputAction::Send(Command::FindFood { location, .. }) => assert!(location.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_indices_are_one_based() {
        assert!(matches!(
            parse_input("/add 1").unwrap(),
            InputAction::Send(Command::AddToBasket(0))
        ));
        assert!(matches!(
            parse_input("/qty 2 -1").unwrap(),
            InputAction::Send(Command::AdjustQuantity { index: 1, delta: -1 })
        ));
        assert!(matches!(
            parse_input("/qty 3 +2").unwrap(),
            InputAction::Send(Command::AdjustQuantity { index: 2, delta: 2 })
        ));
        assert!(parse_input("/add 0").is_err());
        assert!(parse_input("/remove x").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert!(matches!(
            parse_input("/view basket").unwrap(),
            InputAction::View(View::Basket)
        ));
        assert!(matches!(parse_input("/quit").unwrap(), InputAction::Quit));
        assert!(parse_input("/scan").is_err());
        assert!(parse_input("hello").is_err());
        match parse_input("/speak").unwrap() {
            InputAction::Send(Command::Speak(path)) => {
                assert_eq!(path, PathBuf::from(DEFAULT_SPEECH_FILE))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
