use crate::ast::{Accent, ClassifiedLine, LineKind};
use crate::rules::{Banner, RuleTable};
use fitplan_common::PlanKind;
use serde::Serialize;

/// Display template a fragment is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    Spacer,
    Heading,
    SectionBanner,
    Card,
    Callout,
    InlineInfo,
    Bullet,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFragment {
    pub template: Template,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    pub accent: Accent,
}

/// A rendered plan: variant banner, one fragment per line, and a footer note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanView {
    pub kind: PlanKind,
    pub header: Banner,
    pub fragments: Vec<DisplayFragment>,
    pub footer: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    pub show_banner: bool,
    pub show_disclaimer: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_banner: true,
            show_disclaimer: true,
        }
    }
}

fn fragment(
    template: Template,
    icon: Option<&'static str>,
    text: &str,
    accent: Accent,
) -> DisplayFragment {
    DisplayFragment {
        template,
        icon,
        text: text.to_string(),
        details: Vec::new(),
        accent,
    }
}

/// Maps one classified line to its fragment. Pure tag lookup.
pub fn render_line(line: &ClassifiedLine, table: &RuleTable) -> DisplayFragment {
    let icons = &table.icons;
    let accent = table.accent;

    match &line.kind {
        LineKind::Empty => fragment(Template::Spacer, None, "", Accent::Muted),
        LineKind::MainTitle { text } => fragment(Template::Heading, Some(icons.title), text, accent),
        LineKind::SectionHeader { text, icon, accent } => {
            fragment(Template::SectionBanner, Some(*icon), text, *accent)
        }
        LineKind::SubInstruction { instruction } => fragment(
            Template::InlineInfo,
            Some(icons.instruction),
            instruction,
            Accent::Muted,
        ),
        LineKind::GuidanceNote { text } => {
            fragment(Template::Callout, Some(icons.guidance), text, accent)
        }
        LineKind::ExerciseItem(item) | LineKind::FoodItem(item) => DisplayFragment {
            template: Template::Card,
            icon: Some(icons.item),
            text: item.name.clone(),
            details: item.details.clone(),
            accent,
        },
        LineKind::SeriesInfo { text } => {
            fragment(Template::InlineInfo, Some(icons.info), text, Accent::Muted)
        }
        LineKind::MacroInfo { text } => fragment(Template::Callout, Some(icons.info), text, accent),
        LineKind::ShoppingTip { text } => {
            fragment(Template::InlineInfo, Some(icons.budget), text, Accent::Muted)
        }
        LineKind::TipNote { text, .. } => {
            fragment(Template::Callout, Some(icons.tip), text, Accent::Amber)
        }
        LineKind::ScheduleInfo { text } => {
            fragment(Template::InlineInfo, Some(icons.schedule), text, Accent::Muted)
        }
        LineKind::ShoppingItem { name } => {
            fragment(Template::Bullet, Some(icons.shopping_item), name, accent)
        }
        LineKind::Paragraph { text } => fragment(Template::Text, None, text, Accent::Muted),
    }
}

pub fn render(lines: &[ClassifiedLine], kind: PlanKind) -> PlanView {
    let table = RuleTable::for_kind(kind);
    PlanView {
        kind,
        header: table.banner,
        fragments: lines.iter().map(|l| render_line(l, table)).collect(),
        footer: table.disclaimer,
    }
}

fn icon_prefix(icon: Option<&str>) -> String {
    icon.map(|i| format!("{} ", i)).unwrap_or_default()
}

/// Plain terminal text.
pub fn format_plain(view: &PlanView, options: FormatOptions) -> String {
    let mut output = String::new();

    if options.show_banner {
        output.push_str(&format!(
            "{} {}\n{}\n",
            view.header.icon, view.header.title, view.header.subtitle
        ));
        output.push_str(&format!("{}\n", "=".repeat(40)));
    }

    for frag in &view.fragments {
        let icon = icon_prefix(frag.icon);
        match frag.template {
            Template::Spacer => output.push('\n'),
            Template::Heading => {
                output.push_str(&format!("\n{}{}\n", icon, frag.text));
            }
            Template::SectionBanner => {
                let title = format!("{}{}", icon, frag.text);
                let width = title.chars().count();
                output.push_str(&format!("\n{}\n{}\n", title, "-".repeat(width)));
            }
            Template::Card => {
                output.push_str(&format!("  {}{}\n", icon, frag.text));
                for detail in &frag.details {
                    output.push_str(&format!("      · {}\n", detail));
                }
            }
            Template::Callout => {
                output.push_str(&format!("  {}{}\n", icon, frag.text));
            }
            Template::InlineInfo => {
                output.push_str(&format!("    {}{}\n", icon, frag.text));
            }
            Template::Bullet => {
                output.push_str(&format!("      {}{}\n", icon, frag.text));
            }
            Template::Text => {
                output.push_str(&format!("{}\n", frag.text));
            }
        }
    }

    if options.show_disclaimer {
        output.push_str(&format!("\n{}\n", view.footer));
    }

    output
}

/// Markdown, for pasting into notes or chat.
pub fn format_markdown(view: &PlanView, options: FormatOptions) -> String {
    let mut output = String::new();

    if options.show_banner {
        output.push_str(&format!(
            "# {} {}\n\n_{}_\n\n",
            view.header.icon, view.header.title, view.header.subtitle
        ));
    }

    for frag in &view.fragments {
        let icon = icon_prefix(frag.icon);
        match frag.template {
            Template::Spacer => output.push('\n'),
            Template::Heading => output.push_str(&format!("## {}{}\n", icon, frag.text)),
            Template::SectionBanner => output.push_str(&format!("### {}{}\n", icon, frag.text)),
            Template::Card => {
                if frag.details.is_empty() {
                    output.push_str(&format!("- **{}**\n", frag.text));
                } else {
                    output.push_str(&format!(
                        "- **{}**: {}\n",
                        frag.text,
                        frag.details.join("; ")
                    ));
                }
            }
            Template::Callout => output.push_str(&format!("> {}{}\n", icon, frag.text)),
            Template::InlineInfo => output.push_str(&format!("{}{}\n", icon, frag.text)),
            Template::Bullet => output.push_str(&format!("  - {}\n", frag.text)),
            Template::Text => output.push_str(&format!("{}\n", frag.text)),
        }
    }

    if options.show_disclaimer {
        output.push_str(&format!("\n---\n_{}_\n", view.footer));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    #[test]
    fn test_render_maps_tags_to_templates() {
        let lines = classify(
            "PLANO NUTRICIONAL\nAlmoço:\n- Arroz: 4 colheres, integral\nBeba água",
            PlanKind::Nutrition,
        );
        let view = render(&lines, PlanKind::Nutrition);
        let templates: Vec<Template> = view.fragments.iter().map(|f| f.template).collect();
        assert_eq!(
            templates,
            vec![
                Template::Heading,
                Template::SectionBanner,
                Template::Card,
                Template::Text
            ]
        );
        assert_eq!(view.fragments[1].icon, Some("🍽"));
        assert_eq!(view.fragments[2].details, vec!["4 colheres", "integral"]);
        assert_eq!(view.header.title, "Seu Plano Nutricional");
    }

    #[test]
    fn test_plain_output_without_banner() {
        let lines = classify("Dia A - Peito\n1. Supino: 3x10", PlanKind::Workout);
        let view = render(&lines, PlanKind::Workout);
        let out = format_plain(
            &view,
            FormatOptions {
                show_banner: false,
                show_disclaimer: false,
            },
        );
        assert!(out.contains("📅 Dia A - Peito\n"));
        assert!(out.contains("  🎯 Supino\n      · 3x10\n"));
        assert!(!out.contains("Seu Treino Personalizado"));
    }

    #[test]
    fn test_markdown_has_disclaimer() {
        let view = render(&classify("Treino leve", PlanKind::Workout), PlanKind::Workout);
        let md = format_markdown(&view, FormatOptions::default());
        assert!(md.starts_with("# 💪 Seu Treino Personalizado"));
        assert!(md.ends_with("_Lembre-se: Consulte um profissional antes de iniciar qualquer programa de exercícios._\n"));
    }

    #[test]
    fn test_json_fragments() {
        let view = render(&classify("", PlanKind::Workout), PlanKind::Workout);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"], "workout");
        assert_eq!(json["fragments"][0]["template"], "spacer");
        assert!(json["fragments"][0].get("icon").is_none());
    }
}
