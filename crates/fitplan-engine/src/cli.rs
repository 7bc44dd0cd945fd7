use crate::config::OutputFormat;
use crate::source::LoadedPlan;
use fitplan_common::PlanKind;
use fitplan_common::protocol::{Suggestion, SuggestionsHistory};
use fitplan_parser::{
    ClassifiedLine, FormatOptions, classify_line, format_markdown, format_plain, normalizer,
    process,
};
use std::error::Error;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

pub struct ReplOptions<'a> {
    pub banner_lines: &'a [&'a str],
    pub prompt: &'a str,
    pub exit_commands: &'a [&'a str],
}

/// Renders plan text in the requested output format.
pub fn render_plan(
    content: &str,
    kind: PlanKind,
    format: OutputFormat,
    options: FormatOptions,
) -> Result<String, serde_json::Error> {
    let view = process(content, kind);
    match format {
        OutputFormat::Text => Ok(format_plain(&view, options)),
        OutputFormat::Markdown => Ok(format_markdown(&view, options)),
        OutputFormat::Json => serde_json::to_string_pretty(&view),
    }
}

/// Picks the plan kind: an explicit choice wins, then whatever the file said.
pub fn resolve_kind(plan: &LoadedPlan, explicit: Option<PlanKind>) -> PlanKind {
    match (explicit, plan.kind) {
        (Some(kind), _) => kind,
        (None, Some(kind)) => kind,
        (None, None) => {
            warn!("Plan kind not given, assuming workout");
            PlanKind::Workout
        }
    }
}

/// One summary line per saved plan, newest first within each kind.
pub fn history_lines(history: &SuggestionsHistory, kind: Option<PlanKind>) -> Vec<String> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => vec![PlanKind::Workout, PlanKind::Nutrition],
    };

    let mut lines = Vec::new();
    for kind in kinds {
        let mut entries: Vec<&Suggestion> = history.for_kind(kind).iter().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        for s in entries {
            lines.push(format!(
                "{}  {:<9}  {}  {}",
                s.created_at.format("%Y-%m-%d %H:%M"),
                s.kind.as_str(),
                s.id,
                preview(&s.content)
            ));
        }
    }
    lines
}

fn preview(content: &str) -> String {
    let first = fitplan_parser::normalize_lines(content)
        .into_iter()
        .map(|l| l.trim().to_string())
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let mut chars = first.chars();
    let head: String = chars.by_ref().take(60).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Line-at-a-time classification with the previous entered line as context.
pub struct ClassifySession {
    kind: PlanKind,
    previous: Option<String>,
    index: usize,
}

impl ClassifySession {
    pub fn new(kind: PlanKind) -> Self {
        Self {
            kind,
            previous: None,
            index: 0,
        }
    }

    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    /// Switches variant and forgets the lookback context.
    pub fn set_kind(&mut self, kind: PlanKind) {
        self.kind = kind;
        self.previous = None;
        self.index = 0;
    }

    /// Classifies one entered line. Table rows and separators are dropped the
    /// same way whole plans drop them, so they yield `None` and leave the
    /// lookback context untouched.
    pub fn feed(&mut self, line: &str) -> Option<ClassifiedLine> {
        let normalized = normalizer::strip_emphasis(line);
        if normalizer::is_table_line(&normalized) {
            return None;
        }
        let classified =
            classify_line(&normalized, self.previous.as_deref(), self.index, self.kind);
        self.previous = Some(normalized);
        self.index += 1;
        Some(classified)
    }
}

pub fn describe(line: &ClassifiedLine) -> String {
    let mut out = format!("[{}] {}", line.index, line.tag());
    let text = line.kind.text();
    if !text.is_empty() {
        out.push_str(": ");
        out.push_str(text);
    }
    if let Some(item) = line.kind.item() {
        if !item.details.is_empty() {
            out.push_str(&format!(" ({})", item.details.join(" | ")));
        }
    }
    out
}

/// Possible outcomes from reading a single REPL line.
enum ReadLineResult {
    Input(String),
    /// Empty line, skip and re-prompt.
    Skip,
    /// EOF or exit command.
    Exit,
    Error(io::Error),
}

fn read_result(
    result: Result<Option<String>, io::Error>,
    exit_commands: &[&str],
) -> ReadLineResult {
    match result {
        Ok(Some(input)) => {
            let trimmed = input.trim().to_string();
            if trimmed.is_empty() {
                ReadLineResult::Skip
            } else if exit_commands.contains(&trimmed.as_str()) {
                ReadLineResult::Exit
            } else {
                ReadLineResult::Input(trimmed)
            }
        }
        Ok(None) => ReadLineResult::Exit,
        Err(e) => ReadLineResult::Error(e),
    }
}

/// Handles `:workout` / `:nutrition`. Returns false for ordinary input.
fn switch_kind(session: &mut ClassifySession, input: &str, output: OutputHandlers) -> bool {
    let Some(name) = input.strip_prefix(':') else {
        return false;
    };
    match name.parse::<PlanKind>() {
        Ok(kind) => {
            session.set_kind(kind);
            (output.out)(&format!("Classifying {} lines", kind));
        }
        Err(e) => (output.err)(&format!("Error: {}", e)),
    }
    true
}

pub async fn run_repl(
    kind: PlanKind,
    output: OutputHandlers,
    options: ReplOptions<'_>,
) -> Result<(), Box<dyn Error>> {
    for line in options.banner_lines {
        (output.out)(line);
    }

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = io::stdout();
    let mut session = ClassifySession::new(kind);

    loop {
        print!("{}", options.prompt);
        stdout.flush()?;

        match read_result(reader.next_line().await, options.exit_commands) {
            ReadLineResult::Input(line) => {
                if switch_kind(&mut session, &line, output) {
                    continue;
                }
                match session.feed(&line) {
                    Some(classified) => (output.out)(&describe(&classified)),
                    None => (output.out)("(table row, skipped)"),
                }
            }
            ReadLineResult::Skip => continue,
            ReadLineResult::Exit => break,
            ReadLineResult::Error(e) => return Err(e.into()),
        }
    }
    Ok(())
}
