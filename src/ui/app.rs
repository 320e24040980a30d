//! TUI 应用主循环
//!
//! 进入全屏/原始模式，轮询 state_rx 与键盘事件，将输入解析为 Command 发送给编排器，
//! 每帧用 draw 渲染 UiState、当前视图与输入缓冲。

use std::io::{self, Stdout};

use crossterm::event::KeyCode;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};

use crate::core::{Command, UiState};
use crate::ui::event::{parse_input, AppEvent, EventHandler, InputAction, HELP_TEXT};
use crate::ui::render::{draw, View};

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    state_rx: watch::Receiver<UiState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_handler = EventHandler::new(cmd_tx);
    let mut input_buffer = String::new();
    let mut view = View::default();
    let mut scroll = 0u16;
    let mut local_notice: Option<String> = None;
    let mut last_counts = (0usize, 0usize);

    loop {
        let state = state_rx.borrow().clone();

        // 新结果到达时切到对应视图
        let counts = (state.menu.len(), state.recommendations.len());
        if counts != last_counts {
            if counts.0 != last_counts.0 && counts.0 > 0 {
                view = View::Menu;
            } else if counts.1 != last_counts.1 && counts.1 > 0 {
                view = View::Food;
            }
            last_counts = counts;
            scroll = 0;
        }

        if let Ok(Some(ev)) = event_handler.poll() {
            match ev {
                AppEvent::Command(Command::Quit) => {
                    event_handler.send(Command::Quit);
                    break;
                }
                AppEvent::Command(_) => local_notice = None,
                AppEvent::NextView => {
                    view = view.next();
                    scroll = 0;
                }
                AppEvent::PrevView => {
                    view = view.prev();
                    scroll = 0;
                }
                AppEvent::Key(key) => match key.code {
                    KeyCode::Enter if !state.input_locked => {
                        let input = std::mem::take(&mut input_buffer);
                        if input.trim().is_empty() {
                            continue;
                        }
                        match parse_input(&input) {
                            Ok(InputAction::Send(cmd)) => {
                                local_notice = None;
                                event_handler.send(cmd);
                            }
                            Ok(InputAction::View(v)) => {
                                local_notice = None;
                                view = v;
                                scroll = 0;
                            }
                            Ok(InputAction::Help) => local_notice = Some(HELP_TEXT.to_string()),
                            Ok(InputAction::Quit) => {
                                event_handler.send(Command::Quit);
                                break;
                            }
                            Err(msg) => local_notice = Some(msg),
                        }
                    }
                    KeyCode::Backspace => {
                        input_buffer.pop();
                    }
                    KeyCode::Char(c) => input_buffer.push(c),
                    KeyCode::Up => scroll = scroll.saturating_sub(1),
                    KeyCode::Down => scroll = scroll.saturating_add(1),
                    KeyCode::PageUp => scroll = scroll.saturating_sub(10),
                    KeyCode::PageDown => scroll = scroll.saturating_add(10),
                    KeyCode::Home => scroll = 0,
                    _ => {}
                },
            }
        }

        terminal.draw(|f| {
            draw(
                f,
                &state,
                view,
                &input_buffer,
                local_notice.as_deref(),
                scroll,
            );
        })?;

        tokio::task::yield_now().await;
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
