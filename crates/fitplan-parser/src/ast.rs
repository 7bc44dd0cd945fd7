use serde::Serialize;
use std::fmt;

/// Fieldless name of a classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTag {
    Empty,
    MainTitle,
    SectionHeader,
    SubInstruction,
    GuidanceNote,
    ExerciseItem,
    FoodItem,
    SeriesInfo,
    MacroInfo,
    ShoppingTip,
    TipNote,
    ScheduleInfo,
    ShoppingItem,
    Paragraph,
}

impl LineTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTag::Empty => "empty",
            LineTag::MainTitle => "main_title",
            LineTag::SectionHeader => "section_header",
            LineTag::SubInstruction => "sub_instruction",
            LineTag::GuidanceNote => "guidance_note",
            LineTag::ExerciseItem => "exercise_item",
            LineTag::FoodItem => "food_item",
            LineTag::SeriesInfo => "series_info",
            LineTag::MacroInfo => "macro_info",
            LineTag::ShoppingTip => "shopping_tip",
            LineTag::TipNote => "tip_note",
            LineTag::ScheduleInfo => "schedule_info",
            LineTag::ShoppingItem => "shopping_item",
            LineTag::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for LineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color family used for banners and cards of one plan variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accent {
    Primary,
    Green,
    Amber,
    Muted,
}

/// A list entry split into its name and detail fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub name: String,
    pub details: Vec<String>,
}

/// Classification result with the fields each rule extracts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum LineKind {
    Empty,
    MainTitle {
        text: String,
    },
    SectionHeader {
        text: String,
        icon: &'static str,
        accent: Accent,
    },
    SubInstruction {
        instruction: String,
    },
    GuidanceNote {
        text: String,
    },
    ExerciseItem(Item),
    FoodItem(Item),
    SeriesInfo {
        text: String,
    },
    MacroInfo {
        text: String,
    },
    ShoppingTip {
        text: String,
    },
    TipNote {
        marker: String,
        text: String,
    },
    ScheduleInfo {
        text: String,
    },
    ShoppingItem {
        name: String,
    },
    Paragraph {
        text: String,
    },
}

impl LineKind {
    pub fn tag(&self) -> LineTag {
        match self {
            LineKind::Empty => LineTag::Empty,
            LineKind::MainTitle { .. } => LineTag::MainTitle,
            LineKind::SectionHeader { .. } => LineTag::SectionHeader,
            LineKind::SubInstruction { .. } => LineTag::SubInstruction,
            LineKind::GuidanceNote { .. } => LineTag::GuidanceNote,
            LineKind::ExerciseItem(_) => LineTag::ExerciseItem,
            LineKind::FoodItem(_) => LineTag::FoodItem,
            LineKind::SeriesInfo { .. } => LineTag::SeriesInfo,
            LineKind::MacroInfo { .. } => LineTag::MacroInfo,
            LineKind::ShoppingTip { .. } => LineTag::ShoppingTip,
            LineKind::TipNote { .. } => LineTag::TipNote,
            LineKind::ScheduleInfo { .. } => LineTag::ScheduleInfo,
            LineKind::ShoppingItem { .. } => LineTag::ShoppingItem,
            LineKind::Paragraph { .. } => LineTag::Paragraph,
        }
    }

    /// The item payload of exercise and food lines.
    pub fn item(&self) -> Option<&Item> {
        match self {
            LineKind::ExerciseItem(item) | LineKind::FoodItem(item) => Some(item),
            _ => None,
        }
    }

    /// Primary text to display for this line.
    pub fn text(&self) -> &str {
        match self {
            LineKind::Empty => "",
            LineKind::MainTitle { text }
            | LineKind::SectionHeader { text, .. }
            | LineKind::GuidanceNote { text }
            | LineKind::SeriesInfo { text }
            | LineKind::MacroInfo { text }
            | LineKind::ShoppingTip { text }
            | LineKind::TipNote { text, .. }
            | LineKind::ScheduleInfo { text }
            | LineKind::Paragraph { text } => text,
            LineKind::SubInstruction { instruction } => instruction,
            LineKind::ExerciseItem(item) | LineKind::FoodItem(item) => &item.name,
            LineKind::ShoppingItem { name } => name,
        }
    }
}

/// One line of plan text after classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedLine {
    /// Position among the lines that survived table suppression.
    pub index: usize,
    /// Trimmed source line.
    pub raw: String,
    #[serde(flatten)]
    pub kind: LineKind,
}

impl ClassifiedLine {
    pub fn tag(&self) -> LineTag {
        self.kind.tag()
    }
}
