use crate::ast::{ClassifiedLine, Item, LineKind, LineTag};
use crate::normalizer::normalize_lines;
use crate::rules::CompiledRules;
use fitplan_common::PlanKind;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-•]").unwrap());
static BULLET_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-•]\s*\w+").unwrap());

/// Classification rules in evaluation order. The first rule that produces a
/// kind decides the line.
///
/// The shopping-list continuation sits right before the item rule: it only
/// ever applies to bulleted lines, which the item rule would otherwise claim.
const RULE_ORDER: [Rule; 12] = [
    Rule::Blank,
    Rule::UpperCaseTitle,
    Rule::SectionHeader,
    Rule::InstructionMarker,
    Rule::GuidancePhrase,
    Rule::ShoppingContinuation,
    Rule::ListItem,
    Rule::InfoVocabulary,
    Rule::BudgetVocabulary,
    Rule::TipMarker,
    Rule::ScheduleVocabulary,
    Rule::Paragraph,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Blank,
    UpperCaseTitle,
    SectionHeader,
    InstructionMarker,
    GuidancePhrase,
    ShoppingContinuation,
    ListItem,
    InfoVocabulary,
    BudgetVocabulary,
    TipMarker,
    ScheduleVocabulary,
    Paragraph,
}

/// What a rule gets to look at.
struct LineContext<'a> {
    text: &'a str,
    previous: Option<&'a str>,
}

impl Rule {
    fn apply(self, rules: &CompiledRules, ctx: &LineContext<'_>) -> Option<LineKind> {
        let table = rules.table;
        let text = ctx.text;

        match self {
            Rule::Blank => text.is_empty().then_some(LineKind::Empty),

            Rule::UpperCaseTitle => {
                let is_upper = text == text.to_uppercase();
                let long_enough = text.encode_utf16().count() > table.title_min_len;
                let digit_led = text.starts_with(|c: char| c.is_ascii_digit());
                (is_upper && long_enough && !(table.title_rejects_leading_digit && digit_led))
                    .then(|| LineKind::MainTitle {
                        text: text.to_string(),
                    })
            }

            Rule::SectionHeader => matches(&rules.section, text).then(|| LineKind::SectionHeader {
                text: text.to_string(),
                icon: table.section_icon(text),
                accent: table.accent,
            }),

            Rule::InstructionMarker => {
                let found = rules.instruction.as_ref()?.find(text)?;
                Some(LineKind::SubInstruction {
                    instruction: text[found.end()..].trim().to_string(),
                })
            }

            Rule::GuidancePhrase => matches(&rules.guidance, text).then(|| LineKind::GuidanceNote {
                text: text.to_string(),
            }),

            Rule::ShoppingContinuation => {
                let previous = ctx.previous?;
                (BULLET_WORD_RE.is_match(text) && matches(&rules.shopping_list, previous)).then(
                    || LineKind::ShoppingItem {
                        name: BULLET_RE.replace(text, "").trim().to_string(),
                    },
                )
            }

            Rule::ListItem => {
                if !(NUMBERED_RE.is_match(text) || BULLET_RE.is_match(text)) {
                    return None;
                }
                let item = split_item(rules, text);
                Some(match table.item_tag {
                    LineTag::FoodItem => LineKind::FoodItem(item),
                    _ => LineKind::ExerciseItem(item),
                })
            }

            Rule::InfoVocabulary => matches(&rules.info, text).then(|| {
                let text = text.to_string();
                match table.info_tag {
                    LineTag::MacroInfo => LineKind::MacroInfo { text },
                    _ => LineKind::SeriesInfo { text },
                }
            }),

            Rule::BudgetVocabulary => matches(&rules.budget, text).then(|| LineKind::ShoppingTip {
                text: text.to_string(),
            }),

            Rule::TipMarker => {
                let tip = rules.tip.as_ref()?;
                let first = tip.find(text)?;
                let marker = first.as_str().to_string();

                let mut rest = text[first.end()..].trim_start();
                while let Some(next) = tip.find(rest) {
                    rest = rest[next.end()..].trim_start();
                }
                let body = if rest.is_empty() { text } else { rest };
                Some(LineKind::TipNote {
                    marker,
                    text: body.to_string(),
                })
            }

            Rule::ScheduleVocabulary => {
                matches(&rules.schedule, text).then(|| LineKind::ScheduleInfo {
                    text: text.to_string(),
                })
            }

            Rule::Paragraph => Some(LineKind::Paragraph {
                text: text.to_string(),
            }),
        }
    }
}

fn matches(re: &Option<Regex>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

/// Splits a numbered or bulleted line into a name and detail fragments.
///
/// A colon always separates name from details. Without one, a spaced dash
/// does, but only when the line carries a quantity such as `150g`.
fn split_item(rules: &CompiledRules, line: &str) -> Item {
    let body = if let Some(m) = NUMBERED_RE.find(line) {
        &line[m.end()..]
    } else if let Some(m) = BULLET_RE.find(line) {
        &line[m.end()..]
    } else {
        line
    };
    let body = body.trim();

    let split = if let Some((name, details)) = body.split_once(':') {
        Some((name, details))
    } else if matches(&rules.quantity, body) {
        [" - ", " – ", " — "]
            .iter()
            .filter_map(|dash| body.split_once(dash))
            .min_by_key(|(name, _)| name.len())
    } else {
        None
    };

    match split {
        Some((name, details)) => Item {
            name: name.trim().to_string(),
            details: split_details(details),
        },
        None => Item {
            name: body.to_string(),
            details: Vec::new(),
        },
    }
}

/// Splits on semicolons and on commas, except decimal commas such as `1,5`.
fn split_details(details: &str) -> Vec<String> {
    let chars: Vec<char> = details.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let decimal_comma = c == ','
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());

        if c == ';' || (c == ',' && !decimal_comma) {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Classifies one line given the line before it and its position.
pub fn classify_line(
    line: &str,
    previous: Option<&str>,
    index: usize,
    kind: PlanKind,
) -> ClassifiedLine {
    classify_with(CompiledRules::for_kind(kind), line, previous, index)
}

fn classify_with(
    rules: &CompiledRules,
    line: &str,
    previous: Option<&str>,
    index: usize,
) -> ClassifiedLine {
    let ctx = LineContext {
        text: line.trim(),
        previous,
    };

    let (rule, kind) = RULE_ORDER
        .iter()
        .find_map(|rule| rule.apply(rules, &ctx).map(|kind| (*rule, kind)))
        .unwrap_or_else(|| {
            (
                Rule::Paragraph,
                LineKind::Paragraph {
                    text: ctx.text.to_string(),
                },
            )
        });

    trace!(index, ?rule, tag = %kind.tag(), "classified line");

    ClassifiedLine {
        index,
        raw: ctx.text.to_string(),
        kind,
    }
}

/// Normalizes a whole plan and classifies every remaining line.
pub fn classify(text: &str, kind: PlanKind) -> Vec<ClassifiedLine> {
    let rules = CompiledRules::for_kind(kind);
    let lines = normalize_lines(text);

    let classified: Vec<ClassifiedLine> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let previous = index.checked_sub(1).map(|i| lines[i].as_str());
            classify_with(rules, line, previous, index)
        })
        .collect();

    debug!(%kind, lines = classified.len(), "classified plan");
    classified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(line: &str, kind: PlanKind) -> LineTag {
        classify_line(line, None, 0, kind).tag()
    }

    #[test]
    fn test_rule_order_ends_with_paragraph() {
        assert_eq!(RULE_ORDER.last(), Some(&Rule::Paragraph));
        assert_eq!(RULE_ORDER.first(), Some(&Rule::Blank));
    }

    #[test]
    fn test_title_heuristic_length() {
        assert_eq!(tag("PLANO DE TREINO", PlanKind::Workout), LineTag::MainTitle);
        // ten characters is not enough
        assert_ne!(tag("AQUECIMENT", PlanKind::Workout), LineTag::MainTitle);
    }

    #[test]
    fn test_title_length_counts_utf16_units() {
        // ten chars, eleven UTF-16 units
        assert_eq!(tag("💪 TREINO A", PlanKind::Workout), LineTag::MainTitle);
        assert_eq!(tag("🍎 LANCHE A", PlanKind::Nutrition), LineTag::MainTitle);
        // accented letters are single units
        assert_ne!(tag("AÇÃO RÁPID", PlanKind::Workout), LineTag::MainTitle);
    }

    #[test]
    fn test_title_leading_digit_per_variant() {
        assert_eq!(
            tag("1. AGACHAMENTO LIVRE", PlanKind::Workout),
            LineTag::MainTitle
        );
        assert_eq!(
            tag("2 OVOS MEXIDOS COM PÃO", PlanKind::Nutrition),
            LineTag::Paragraph
        );
    }

    #[test]
    fn test_instruction_prefix_stripped() {
        let line = classify_line("Como fazer: desça até 90 graus", None, 3, PlanKind::Workout);
        assert_eq!(
            line.kind,
            LineKind::SubInstruction {
                instruction: "desça até 90 graus".into()
            }
        );
        assert_eq!(line.index, 3);
    }

    #[test]
    fn test_guidance_anywhere_in_line() {
        assert_eq!(
            tag("Ao final, Respire Fundo e relaxe", PlanKind::Workout),
            LineTag::GuidanceNote
        );
        assert_eq!(
            tag("Hold each position for 30 seconds", PlanKind::Workout),
            LineTag::GuidanceNote
        );
    }

    #[test]
    fn test_tip_markers_stripped() {
        let line = classify_line("💡 Dica: Descanse entre as séries", None, 0, PlanKind::Workout);
        // the info vocabulary comes earlier than tips
        assert_eq!(line.tag(), LineTag::SeriesInfo);

        let line = classify_line("💡 Dica: Beba água", None, 0, PlanKind::Workout);
        assert_eq!(
            line.kind,
            LineKind::TipNote {
                marker: "💡".into(),
                text: "Beba água".into()
            }
        );

        let line = classify_line("Observação: evite dor", None, 0, PlanKind::Workout);
        assert_eq!(line.kind.text(), "evite dor");
    }

    #[test]
    fn test_tip_marker_alone_keeps_text() {
        let line = classify_line("📌", None, 0, PlanKind::Nutrition);
        assert_eq!(line.tag(), LineTag::TipNote);
        assert_eq!(line.kind.text(), "📌");
    }

    #[test]
    fn test_quantity_dash_split() {
        let line = classify_line("- Frango grelhado - 150g", None, 0, PlanKind::Nutrition);
        let item = line.kind.item().unwrap();
        assert_eq!(item.name, "Frango grelhado");
        assert_eq!(item.details, vec!["150g".to_string()]);

        let line = classify_line("- Pão de forma - integral", None, 0, PlanKind::Nutrition);
        let item = line.kind.item().unwrap();
        assert_eq!(item.name, "Pão de forma - integral");
        assert!(item.details.is_empty());
    }

    #[test]
    fn test_decimal_comma_kept() {
        assert_eq!(
            split_details(" 1,5 litros; gelada, sem açúcar"),
            vec!["1,5 litros", "gelada", "sem açúcar"]
        );
        assert!(split_details(" , ;").is_empty());
    }

    #[test]
    fn test_schedule_and_budget() {
        assert_eq!(
            tag("Treine 3 vezes por semana", PlanKind::Workout),
            LineTag::ScheduleInfo
        );
        assert_eq!(
            tag("Prefira feiras para economizar", PlanKind::Nutrition),
            LineTag::ShoppingTip
        );
        assert_eq!(
            tag("Prefira feiras para economizar", PlanKind::Workout),
            LineTag::Paragraph
        );
    }
}
