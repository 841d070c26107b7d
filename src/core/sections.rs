//! Per-section view models for the document detail page.
//!
//! Each analysis section is built independently inside its own boundary:
//! an `Err` or a panic while interpreting one section's data becomes
//! [`SectionView::Fault`] for that section only.

use std::panic::{self, AssertUnwindSafe};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::core::api::{Document, RiskRecord, Severity};

pub const NO_SUMMARY: &str = "No summary available";
pub const NO_RISKS: &str = "No risks identified";
pub const NO_ENTITIES: &str = "No entities extracted";
pub const NO_TEXT: &str = "Text content not available";
pub const NO_TEXT_REASONS: [&str; 3] = [
    "Document might still be processing",
    "Text extraction might have failed",
    "Unsupported file format",
];

/// Values shown per entity type before collapsing into "+ N more...".
pub const ENTITY_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Summary,
    Risks,
    Entities,
    FullText,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Summary,
        Section::Risks,
        Section::Entities,
        Section::FullText,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Summary => "Document Summary",
            Section::Risks => "Identified Risks",
            Section::Entities => "Entities & Clauses",
            Section::FullText => "Full Text",
        }
    }
}

/// A section's data could not be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SectionFault(pub String);

/// Aggregated bar for one risk category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskBar {
    pub category: String,
    pub count: usize,
    pub severity: Severity,
}

/// One entity type with its preview values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityGroup {
    pub label: String,
    pub shown: Vec<String>,
    pub hidden: usize,
}

impl EntityGroup {
    pub fn more_label(&self) -> Option<String> {
        (self.hidden > 0).then(|| format!("+ {} more...", self.hidden))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionView {
    Text {
        title: &'static str,
        body: String,
    },
    Placeholder {
        title: &'static str,
        message: &'static str,
        reasons: &'static [&'static str],
    },
    Risks {
        title: &'static str,
        bars: Vec<RiskBar>,
        records: Vec<RiskRecord>,
    },
    Entities {
        title: &'static str,
        groups: Vec<EntityGroup>,
    },
    Fault {
        title: &'static str,
        message: String,
    },
}

impl SectionView {
    pub fn title(&self) -> &'static str {
        match self {
            SectionView::Text { title, .. }
            | SectionView::Placeholder { title, .. }
            | SectionView::Risks { title, .. }
            | SectionView::Entities { title, .. }
            | SectionView::Fault { title, .. } => *title,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, SectionView::Fault { .. })
    }
}

/// Build one section's view from `doc`, isolating any fault.
pub fn render_section(section: Section, doc: &Document) -> SectionView {
    let title = section.title();
    guard(title, || match section {
        Section::Summary => summary_view(doc),
        Section::Risks => risks_view(doc),
        Section::Entities => entities_view(doc),
        Section::FullText => full_text_view(doc),
    })
}

/// Build every section in display order.
pub fn render_all(doc: &Document) -> Vec<SectionView> {
    Section::ALL
        .iter()
        .map(|&section| render_section(section, doc))
        .collect()
}

/// Run `build` inside a boundary that maps errors and panics to a fault view.
pub(crate) fn guard<F>(title: &'static str, build: F) -> SectionView
where
    F: FnOnce() -> Result<SectionView, SectionFault>,
{
    match panic::catch_unwind(AssertUnwindSafe(build)) {
        Ok(Ok(view)) => view,
        Ok(Err(fault)) => {
            warn!(section = title, error = %fault, "section failed to render");
            SectionView::Fault {
                title,
                message: fault.0,
            }
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unexpected error".to_string());
            warn!(section = title, panic = %message, "section panicked while rendering");
            SectionView::Fault { title, message }
        }
    }
}

fn placeholder(section: Section, message: &'static str) -> SectionView {
    SectionView::Placeholder {
        title: section.title(),
        message,
        reasons: &[],
    }
}

fn summary_view(doc: &Document) -> Result<SectionView, SectionFault> {
    Ok(match doc.summary().map_err(SectionFault)? {
        Some(summary) => SectionView::Text {
            title: Section::Summary.title(),
            body: summary.to_string(),
        },
        None => placeholder(Section::Summary, NO_SUMMARY),
    })
}

fn full_text_view(doc: &Document) -> Result<SectionView, SectionFault> {
    Ok(match doc.text().map_err(SectionFault)? {
        Some(text) => SectionView::Text {
            title: Section::FullText.title(),
            body: text.to_string(),
        },
        None => SectionView::Placeholder {
            title: Section::FullText.title(),
            message: NO_TEXT,
            reasons: &NO_TEXT_REASONS,
        },
    })
}

fn risks_view(doc: &Document) -> Result<SectionView, SectionFault> {
    let raw = match doc.risks().map_err(SectionFault)? {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(placeholder(Section::Risks, NO_RISKS)),
    };

    let records = raw
        .iter()
        .map(RiskRecord::from_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(SectionFault)?;

    Ok(SectionView::Risks {
        title: Section::Risks.title(),
        bars: aggregate_risks(&records),
        records,
    })
}

/// Group risks by category, keeping first-seen order; each bar carries the
/// count and the highest severity seen.
pub fn aggregate_risks(records: &[RiskRecord]) -> Vec<RiskBar> {
    let mut bars: Vec<RiskBar> = Vec::new();
    for record in records {
        match bars.iter_mut().find(|b| b.category == record.category) {
            Some(bar) => {
                bar.count += 1;
                bar.severity = bar.severity.max(record.severity);
            }
            None => bars.push(RiskBar {
                category: record.category.clone(),
                count: 1,
                severity: record.severity,
            }),
        }
    }
    bars
}

fn entities_view(doc: &Document) -> Result<SectionView, SectionFault> {
    let entities = match doc.entities().map_err(SectionFault)? {
        Some(map) if !map.is_empty() => map,
        _ => return Ok(placeholder(Section::Entities, NO_ENTITIES)),
    };
    let groups = entity_groups(entities)?;
    Ok(SectionView::Entities {
        title: Section::Entities.title(),
        groups,
    })
}

fn entity_groups(entities: &Map<String, Value>) -> Result<Vec<EntityGroup>, SectionFault> {
    entities
        .iter()
        .map(|(label, values)| {
            let values = values.as_array().ok_or_else(|| {
                SectionFault(format!("entity type {label:?} is not a list"))
            })?;
            let shown = values
                .iter()
                .take(ENTITY_PREVIEW_LIMIT)
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    other => Err(SectionFault(format!(
                        "unsupported value in {label:?}: {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(EntityGroup {
                label: label.clone(),
                shown,
                hidden: values.len().saturating_sub(ENTITY_PREVIEW_LIMIT),
            })
        })
        .collect()
}
