//! Vocabulary and icon tables for the plan variants.
//!
//! Both variants run through the same classifier; everything that differs
//! between a workout and a nutrition plan lives in a [`RuleTable`].

use crate::ast::{Accent, LineTag};
use fitplan_common::PlanKind;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid pattern for {rule}: {source}")]
    Pattern {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Icon chosen for a section header when its text contains `needle`.
#[derive(Debug, Clone, Copy)]
pub struct SectionIcon {
    pub needle: &'static str,
    pub icon: &'static str,
}

/// Icons the renderer puts next to each kind of line.
#[derive(Debug, Clone, Copy)]
pub struct TagIcons {
    pub title: &'static str,
    pub item: &'static str,
    pub info: &'static str,
    pub budget: &'static str,
    pub tip: &'static str,
    pub schedule: &'static str,
    pub instruction: &'static str,
    pub guidance: &'static str,
    pub shopping_item: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Banner {
    pub icon: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    pub kind: PlanKind,
    /// Upper-case lines longer than this many UTF-16 code units become
    /// titles. Emoji outside the BMP count as two.
    pub title_min_len: usize,
    pub title_rejects_leading_digit: bool,
    /// Regex fragments matched at line start, case-insensitively.
    pub section_keywords: &'static [&'static str],
    pub section_icons: &'static [SectionIcon],
    pub section_fallback_icon: &'static str,
    pub accent: Accent,
    /// Literal prefixes, colon included.
    pub instruction_prefixes: &'static [&'static str],
    pub guidance_phrases: &'static [&'static str],
    pub item_tag: LineTag,
    pub quantity_units: &'static [&'static str],
    pub info_tag: LineTag,
    pub info_terms: &'static [&'static str],
    pub budget_terms: &'static [&'static str],
    /// Ordered so that longer markers sharing a prefix come first.
    pub tip_markers: &'static [&'static str],
    pub schedule_terms: &'static [&'static str],
    pub shopping_list_terms: &'static [&'static str],
    pub icons: TagIcons,
    pub banner: Banner,
    pub disclaimer: &'static str,
}

const QUANTITY_UNITS: &[&str] = &[
    "kg",
    "g",
    "mg",
    "ml",
    "litros",
    "litro",
    "l",
    "kcal",
    "minutos",
    "minuto",
    "min",
    "segundos",
    "segundo",
    "seg",
    "s",
    "séries",
    "series",
    "repetições",
    "repeticoes",
    "reps",
    "x",
    "colheres",
    "colher",
    "fatias",
    "fatia",
    "xícaras",
    "xícara",
    "conchas",
    "concha",
    "copos",
    "copo",
    "unidades",
    "unidade",
];

const TIP_MARKERS: &[&str] = &[
    "💡",
    "⚠\u{fe0f}",
    "⚠",
    "📌",
    "Dica:",
    "Observação:",
    "Importante:",
    "Nota:",
    "Tip:",
    "Note:",
    "Important:",
];

pub static WORKOUT_RULES: RuleTable = RuleTable {
    kind: PlanKind::Workout,
    title_min_len: 10,
    title_rejects_leading_digit: false,
    section_keywords: &[
        "DIA [A-Z0-9]",
        "AQUECIMENTO",
        "TREINO",
        "ALONGAMENTO",
        "FREQUÊNCIA",
    ],
    section_icons: &[
        SectionIcon {
            needle: "AQUECIMENTO",
            icon: "🔥",
        },
        SectionIcon {
            needle: "ALONGAMENTO",
            icon: "🧘",
        },
        SectionIcon {
            needle: "TREINO",
            icon: "💪",
        },
    ],
    section_fallback_icon: "📅",
    accent: Accent::Primary,
    instruction_prefixes: &[
        "Como fazer:",
        "Como executar:",
        "Execução:",
        "How to do:",
        "How to:",
    ],
    guidance_phrases: &[
        "mantenha a posição",
        "mantenha cada posição",
        "respire fundo",
        "respire profundamente",
        "hold each position",
        "breathe deeply",
    ],
    item_tag: LineTag::ExerciseItem,
    quantity_units: QUANTITY_UNITS,
    info_tag: LineTag::SeriesInfo,
    info_terms: &["séries", "repetições", "descanso", "tempo"],
    budget_terms: &[],
    tip_markers: TIP_MARKERS,
    schedule_terms: &[
        "frequência",
        "vezes por semana",
        "dias",
        "segunda",
        "terça",
        "quarta",
    ],
    shopping_list_terms: &[],
    icons: TagIcons {
        title: "🏋",
        item: "🎯",
        info: "🔁",
        budget: "💲",
        tip: "❗",
        schedule: "🕒",
        instruction: "👉",
        guidance: "🫁",
        shopping_item: "•",
    },
    banner: Banner {
        icon: "💪",
        title: "Seu Treino Personalizado",
        subtitle: "Gerado com IA baseado no seu perfil",
    },
    disclaimer: "Lembre-se: Consulte um profissional antes de iniciar qualquer programa de exercícios.",
};

pub static NUTRITION_RULES: RuleTable = RuleTable {
    kind: PlanKind::Nutrition,
    title_min_len: 10,
    title_rejects_leading_digit: true,
    section_keywords: &["CAFÉ", "ALMOÇO", "JANTAR", "LANCHE", "CEIA"],
    section_icons: &[
        SectionIcon {
            needle: "CAFÉ",
            icon: "☕",
        },
        SectionIcon {
            needle: "ALMOÇO",
            icon: "🍽",
        },
        SectionIcon {
            needle: "JANTAR",
            icon: "🌙",
        },
        SectionIcon {
            needle: "CEIA",
            icon: "🥛",
        },
    ],
    section_fallback_icon: "🍎",
    accent: Accent::Green,
    instruction_prefixes: &["Modo de preparo:", "Preparo:", "Como preparar:"],
    guidance_phrases: &["mastigue bem", "coma devagar", "evite pular refeições"],
    item_tag: LineTag::FoodItem,
    quantity_units: QUANTITY_UNITS,
    info_tag: LineTag::MacroInfo,
    info_terms: &[
        "calorias",
        "kcal",
        "proteína",
        "carboidrato",
        "gordura",
        "meta calórica",
    ],
    budget_terms: &[
        "preço",
        "custo",
        "economizar",
        "barato",
        "acessível",
        "lista de compras",
    ],
    tip_markers: TIP_MARKERS,
    schedule_terms: &[
        "segunda", "terça", "quarta", "quinta", "sexta", "sábado", "domingo", "semana",
    ],
    shopping_list_terms: &["lista", "compras"],
    icons: TagIcons {
        title: "🍏",
        item: "🍴",
        info: "📈",
        budget: "💲",
        tip: "❗",
        schedule: "☕",
        instruction: "👉",
        guidance: "🥗",
        shopping_item: "•",
    },
    banner: Banner {
        icon: "🍎",
        title: "Seu Plano Nutricional",
        subtitle: "Alimentação acessível e balanceada",
    },
    disclaimer: "Lembre-se: Consulte um nutricionista para um plano personalizado completo.",
};

impl RuleTable {
    pub fn for_kind(kind: PlanKind) -> &'static RuleTable {
        match kind {
            PlanKind::Workout => &WORKOUT_RULES,
            PlanKind::Nutrition => &NUTRITION_RULES,
        }
    }

    /// Icon for a section header, first matching needle wins.
    pub fn section_icon(&self, header: &str) -> &'static str {
        let upper = header.to_uppercase();
        self.section_icons
            .iter()
            .find(|entry| upper.contains(entry.needle))
            .map(|entry| entry.icon)
            .unwrap_or(self.section_fallback_icon)
    }
}

/// A [`RuleTable`] with its vocabularies compiled to regexes.
///
/// Empty vocabularies compile to `None` and never match.
#[derive(Debug)]
pub struct CompiledRules {
    pub table: &'static RuleTable,
    pub section: Option<Regex>,
    pub instruction: Option<Regex>,
    pub guidance: Option<Regex>,
    pub quantity: Option<Regex>,
    pub info: Option<Regex>,
    pub budget: Option<Regex>,
    pub tip: Option<Regex>,
    pub schedule: Option<Regex>,
    pub shopping_list: Option<Regex>,
}

static WORKOUT_COMPILED: LazyLock<CompiledRules> = LazyLock::new(|| {
    CompiledRules::compile(&WORKOUT_RULES).expect("built-in workout rules compile")
});
static NUTRITION_COMPILED: LazyLock<CompiledRules> = LazyLock::new(|| {
    CompiledRules::compile(&NUTRITION_RULES).expect("built-in nutrition rules compile")
});

impl CompiledRules {
    pub fn for_kind(kind: PlanKind) -> &'static CompiledRules {
        match kind {
            PlanKind::Workout => &WORKOUT_COMPILED,
            PlanKind::Nutrition => &NUTRITION_COMPILED,
        }
    }

    pub fn compile(table: &'static RuleTable) -> Result<Self, RuleError> {
        let escaped = |terms: &[&str]| terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>();
        let units = escaped(table.quantity_units);

        Ok(Self {
            table,
            section: alternation("section", table.section_keywords.to_vec(), true)?,
            instruction: alternation("instruction", escaped(table.instruction_prefixes), true)?,
            guidance: alternation("guidance", escaped(table.guidance_phrases), false)?,
            quantity: if units.is_empty() {
                None
            } else {
                Some(build(
                    "quantity",
                    &format!(r"\d+(?:[.,]\d+)?\s*(?:{})\b", units.join("|")),
                )?)
            },
            info: alternation("info", escaped(table.info_terms), false)?,
            budget: alternation("budget", escaped(table.budget_terms), false)?,
            tip: alternation("tip", escaped(table.tip_markers), true)?,
            schedule: alternation("schedule", escaped(table.schedule_terms), false)?,
            shopping_list: alternation("shopping_list", escaped(table.shopping_list_terms), false)?,
        })
    }
}

fn alternation<S: AsRef<str>>(
    rule: &'static str,
    terms: Vec<S>,
    anchored: bool,
) -> Result<Option<Regex>, RuleError> {
    if terms.is_empty() {
        return Ok(None);
    }
    let joined = terms.iter().map(|t| t.as_ref()).collect::<Vec<_>>().join("|");
    let pattern = if anchored {
        format!("^(?:{})", joined)
    } else {
        format!("(?:{})", joined)
    };
    build(rule, &pattern).map(Some)
}

fn build(rule: &'static str, pattern: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| RuleError::Pattern { rule, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_compile() {
        for kind in [PlanKind::Workout, PlanKind::Nutrition] {
            let compiled = CompiledRules::for_kind(kind);
            assert_eq!(compiled.table.kind, kind);
            assert!(compiled.section.is_some());
            assert!(compiled.tip.is_some());
        }
    }

    #[test]
    fn test_empty_vocabulary_never_matches() {
        let compiled = CompiledRules::for_kind(PlanKind::Workout);
        assert!(compiled.budget.is_none());
        assert!(compiled.shopping_list.is_none());
    }

    #[test]
    fn test_section_icons_first_match_wins() {
        assert_eq!(WORKOUT_RULES.section_icon("AQUECIMENTO"), "🔥");
        assert_eq!(WORKOUT_RULES.section_icon("Treino principal"), "💪");
        assert_eq!(WORKOUT_RULES.section_icon("DIA A - PEITO"), "📅");
        assert_eq!(NUTRITION_RULES.section_icon("Café da Manhã:"), "☕");
        assert_eq!(NUTRITION_RULES.section_icon("Lanche da Tarde"), "🍎");
        assert_eq!(NUTRITION_RULES.section_icon("CEIA"), "🥛");
    }

    #[test]
    fn test_quantity_pattern() {
        let q = CompiledRules::for_kind(PlanKind::Nutrition)
            .quantity
            .as_ref()
            .unwrap();
        assert!(q.is_match("Frango grelhado 150g"));
        assert!(q.is_match("1,5 litros de água"));
        assert!(q.is_match("3 séries"));
        assert!(!q.is_match("2 ovos mexidos"));
    }

    #[test]
    fn test_invalid_pattern_reports_rule() {
        let err = build("section", "(").unwrap_err();
        assert!(err.to_string().starts_with("Invalid pattern for section"));
    }
}
