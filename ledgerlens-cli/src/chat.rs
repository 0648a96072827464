use anyhow::{Result, bail};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ledgerlens_api::Store;
use ledgerlens_core::Report;
use ledgerlens_providers::insights::advisor_system_with_report;
use ledgerlens_providers::{ChatTurn, Provider, complete_blocking, provider_for};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};

use crate::config;

#[derive(Clone, Debug)]
struct Msg {
    role: Role,
    content: String,
}

#[derive(Clone, Debug)]
enum Role {
    User,
    Assistant,
}

struct ChatLog {
    path: PathBuf,
}

impl ChatLog {
    fn open_today() -> Result<Self> {
        let home = crate::state::ensure_ledgerlens_home()?;
        let dir = home.join("chat");
        std::fs::create_dir_all(&dir)?;
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let path = dir.join(format!("{today}.md"));
        Ok(Self { path })
    }

    fn append(&mut self, role: &str, msg: &str) -> Result<()> {
        use std::io::Write;
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            f,
            "- {} [{}] {}",
            chrono::Utc::now().to_rfc3339(),
            role,
            msg.replace('\n', " ")
        )?;
        Ok(())
    }
}

struct ChatSession {
    report: Report,
    system: String,
    provider: Option<Box<dyn Provider>>,
    max_turns_context: usize,
}

pub fn run_chat(data_dir: &Path, provider_flag: Option<&str>, model: Option<&str>) -> Result<()> {
    let store = Store::new(data_dir);
    let Some(report) = store.load_report()? else {
        bail!(
            "No report found at {}. Run: ledgerlens analyze",
            store.report_path().display()
        );
    };

    let cfg = config::load_config()?;
    let kind = config::resolve_provider(provider_flag, &cfg)?;
    let model = model.or(cfg.provider.model.as_deref());
    // Without an API key we stay usable: slash commands and report-derived
    // answers still work.
    let provider = provider_for(kind, model).ok();

    let session = ChatSession {
        system: advisor_system_with_report(&report)?,
        report,
        provider,
        max_turns_context: cfg.chat.max_turns_context,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = chat_loop(&mut terminal, &session);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn chat_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, session: &ChatSession) -> Result<()> {
    let greeting = if session.provider.is_some() {
        "Hi - ask me anything about your statement."
    } else {
        "No provider key configured; I can still answer from the report. Try /summary."
    };
    let mut messages: Vec<Msg> = vec![Msg {
        role: Role::Assistant,
        content: greeting.to_string(),
    }];

    let mut input = String::new();
    let mut show_help = true;

    let mut log = ChatLog::open_today()?;
    log.append("system", "session_start")?;

    loop {
        terminal.draw(|f| {
            let size = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5),
                    Constraint::Min(5),
                    Constraint::Length(3),
                ])
                .split(size);

            let splash = Paragraph::new(Text::from(vec![
                Line::from(Span::styled(
                    "ledgerlens",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::raw("")),
                Line::from(Span::styled(
                    ">_ ledgerlens chat",
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::styled(
                    "type /help or ? for shortcuts",
                    Style::default().fg(Color::Gray),
                )),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(splash, chunks[0]);

            let header = Block::default().borders(Borders::ALL).title("conversation");

            let mut lines: Vec<Line> = Vec::new();
            if show_help {
                lines.push(Line::from(Span::styled(
                    "Shortcuts: Enter=send, q=quit, ?=help",
                    Style::default().fg(Color::Gray),
                )));
                lines.push(Line::raw("Commands: /help /summary /categories /recurring /unusual"));
                lines.push(Line::raw(""));
            }

            for m in &messages {
                let (tag, color) = match m.role {
                    Role::User => ("you", Color::Cyan),
                    Role::Assistant => ("ledgerlens", Color::Magenta),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", tag), Style::default().fg(color)),
                    Span::raw(m.content.clone()),
                ]));
                lines.push(Line::raw(""));
            }

            let history = Paragraph::new(Text::from(lines))
                .block(header)
                .wrap(Wrap { trim: false });
            f.render_widget(history, chunks[1]);

            let input_block = Block::default().borders(Borders::ALL).title("question");
            let input_widget = Paragraph::new(input.as_str())
                .block(input_block)
                .style(Style::default().fg(Color::White));
            f.render_widget(input_widget, chunks[2]);
        })?;

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('?') => {
                        show_help = !show_help;
                    }
                    KeyCode::Enter => {
                        let trimmed = input.trim().to_string();
                        if !trimmed.is_empty() {
                            log.append("user", &trimmed)?;

                            if let Some(reply) = handle_slash(&session.report, &trimmed) {
                                messages.push(Msg { role: Role::Assistant, content: reply.clone() });
                                log.append("assistant", &reply)?;
                            } else {
                                messages.push(Msg { role: Role::User, content: trimmed.clone() });

                                let reply = answer(session, &messages, &trimmed);
                                messages.push(Msg { role: Role::Assistant, content: reply.clone() });
                                log.append("assistant", &reply)?;
                            }
                        }
                        input.clear();
                    }
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) => {
                        input.push(c);
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

/// Ask the provider when we have one, fall back to report lookups otherwise
fn answer(session: &ChatSession, messages: &[Msg], pending: &str) -> String {
    if let Some(provider) = &session.provider {
        let turns = to_llm_turns(messages, session.max_turns_context);
        match complete_blocking(provider.as_ref(), &session.system, &turns) {
            Ok(s) if !s.trim().is_empty() => return s,
            _ => {}
        }
    }
    offline_reply(&session.report, pending)
}

fn to_llm_turns(messages: &[Msg], max_turns: usize) -> Vec<ChatTurn> {
    // Recent turns only, to keep requests small
    let start = messages.len().saturating_sub(max_turns);
    messages[start..]
        .iter()
        .map(|m| match m.role {
            Role::User => ChatTurn::user(m.content.clone()),
            Role::Assistant => ChatTurn::assistant(m.content.clone()),
        })
        .collect()
}

fn handle_slash(report: &Report, input: &str) -> Option<String> {
    let s = input.trim();
    if !s.starts_with('/') {
        return None;
    }
    match s {
        "/help" => Some(
            "Commands:\n\
- /help\n\
- /summary (income, expenses, savings rate)\n\
- /categories (spending per category)\n\
- /recurring (repeated merchants)\n\
- /unusual (flagged transactions)\n\
\nShortcuts: Enter=send, q=quit, ?=toggle help"
                .to_string(),
        ),
        "/summary" => Some(summarize(report)),
        "/categories" => Some(summarize_categories(report)),
        "/recurring" => Some(summarize_recurring(report)),
        "/unusual" => Some(summarize_unusual(report)),
        _ => Some("Unknown command. Try /help".to_string()),
    }
}

fn summarize(report: &Report) -> String {
    let s = &report.summary;
    format!(
        "Income: {:.2}\nExpenses: {:.2}\nNet: {:.2}\nSavings rate: {:.1}%\nAvg daily spending: {:.2}\nTransactions: {}",
        s.total_income,
        s.total_expenses,
        s.net_change,
        s.savings_rate,
        s.avg_daily_spending,
        report.transaction_count
    )
}

fn summarize_categories(report: &Report) -> String {
    if report.spending_by_category.is_empty() {
        return "No categorized spending in this statement.".to_string();
    }
    let mut categories: Vec<(&String, &f64)> = report.spending_by_category.iter().collect();
    categories.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap());
    let mut out = String::from("Spending by category:\n");
    for (category, amount) in categories {
        out.push_str(&format!("- {category}: {amount:.2}\n"));
    }
    out.trim_end().to_string()
}

fn summarize_recurring(report: &Report) -> String {
    if report.recurring_payments.is_empty() {
        return "No recurring payments detected.".to_string();
    }
    let mut out = String::from("Recurring payments:\n");
    for p in &report.recurring_payments {
        out.push_str(&format!(
            "- {}: {:.2} total over {} payments (avg {:.2})\n",
            p.merchant, p.total_spent, p.frequency, p.avg_amount
        ));
    }
    out.trim_end().to_string()
}

fn summarize_unusual(report: &Report) -> String {
    if report.unusual_transactions.is_empty() {
        return "No unusually large transactions flagged.".to_string();
    }
    let mut out = String::from("Unusually large transactions:\n");
    for t in &report.unusual_transactions {
        out.push_str(&format!(
            "- {} | {} | {:.2}\n",
            t.date.as_deref().unwrap_or("?"),
            t.description.as_deref().unwrap_or("?"),
            t.withdrawal
        ));
    }
    out.trim_end().to_string()
}

/// Deterministic answers from the report when no provider is configured
fn offline_reply(report: &Report, user: &str) -> String {
    let u = user.to_lowercase();

    if u.contains("recurring") || u.contains("subscription") {
        return summarize_recurring(report);
    }
    if u.contains("category") || u.contains("categories") || u.contains("spend") {
        return summarize_categories(report);
    }
    if u.contains("saving") || u.contains("save") {
        return format!(
            "Your savings rate this period is {:.1}% (income {:.2}, expenses {:.2}).",
            report.summary.savings_rate,
            report.summary.total_income,
            report.summary.total_expenses
        );
    }
    if u.contains("unusual") || u.contains("suspicious") {
        return summarize_unusual(report);
    }

    "I don't have a provider key to reason freely, but I can answer from the report: try /summary, /categories, /recurring, or /unusual.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_core::{Analyzer, BankStatement, Transaction};

    fn report() -> Report {
        let statement = BankStatement {
            transactions: vec![
                Transaction {
                    date: Some("02/01/2025".to_string()),
                    description: Some("NETFLIX SUBSCRIPTION".to_string()),
                    cheque_ref_no: None,
                    value_date: None,
                    withdrawal: Some(599.0),
                    deposit: None,
                    balance: None,
                },
                Transaction {
                    date: Some("12/01/2025".to_string()),
                    description: Some("NETFLIX SUBSCRIPTION".to_string()),
                    cheque_ref_no: None,
                    value_date: None,
                    withdrawal: Some(599.0),
                    deposit: None,
                    balance: None,
                },
            ],
            ..BankStatement::default()
        };
        Analyzer::new(statement).full_report()
    }

    #[test]
    fn test_slash_commands() {
        let report = report();
        assert!(handle_slash(&report, "/help").is_some());
        assert!(handle_slash(&report, "/summary").unwrap().contains("Expenses"));
        assert!(handle_slash(&report, "/recurring").unwrap().contains("NETFLIX"));
        assert!(handle_slash(&report, "not a command").is_none());
        assert!(handle_slash(&report, "/bogus").unwrap().contains("Unknown"));
    }

    #[test]
    fn test_offline_reply_routes_by_keyword() {
        let report = report();
        assert!(offline_reply(&report, "what subscriptions do I have?").contains("NETFLIX"));
        assert!(offline_reply(&report, "where do I spend?").contains("Entertainment"));
        assert!(offline_reply(&report, "am I saving enough?").contains("savings rate"));
    }

    #[test]
    fn test_to_llm_turns_caps_context() {
        let messages: Vec<Msg> = (0..20)
            .map(|i| Msg {
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: format!("msg {i}"),
            })
            .collect();
        let turns = to_llm_turns(&messages, 12);
        assert_eq!(turns.len(), 12);
        assert_eq!(turns.last().unwrap().content, "msg 19");
    }
}
