pub mod ast;
pub mod classifier;
pub mod formatter;
pub mod normalizer;
pub mod rules;

pub use ast::*;
pub use classifier::{classify, classify_line};
pub use formatter::{FormatOptions, PlanView, format_markdown, format_plain, render};
pub use normalizer::{normalize, normalize_lines};
pub use rules::{CompiledRules, RuleTable};

use fitplan_common::PlanKind;

/// Run plan text through the full pipeline: normalize, classify, and render.
///
/// Total over all inputs; unexpected text ends up as plain paragraphs.
pub fn process(text: &str, kind: PlanKind) -> PlanView {
    let lines = classify(text, kind);
    render(&lines, kind)
}
