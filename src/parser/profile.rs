use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use super::{nth_child, own_text, text_of};
use crate::roster::{EducationEntry, InstructorRecord, NOT_AVAILABLE};

static CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#page-main div.inner").unwrap());
static NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("header > h2").unwrap());
static QUOTE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.quote").unwrap());
static BIOGRAPHY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p:nth-of-type(2)").unwrap());
static EDUCATION_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.table-responsive > table:nth-of-type(1)").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._]+@iba-suk\.edu\.pk").unwrap());

const EDUCATION_COLUMNS: usize = 4;

/// Name and designation carried over from the listing card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardContext {
    pub name: Option<String>,
    pub designation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Heading on the profile page, else the card's name.
    pub name: Option<String>,
    pub record: InstructorRecord,
    /// True when the page had no content region and the record is placeholders.
    pub degraded: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EducationError {
    #[error("no education table")]
    Absent,
    #[error("row {row} has {cells} cells, expected 4")]
    Malformed { row: usize, cells: usize },
}

pub fn extract(html: &str, card: &CardContext) -> Profile {
    let doc = Html::parse_document(html);

    let Some(content) = doc.select(&CONTENT).next() else {
        return Profile {
            name: card.name.clone(),
            record: InstructorRecord::degraded(card.designation.clone()),
            degraded: true,
        };
    };

    let name = content
        .select(&NAME)
        .next()
        .and_then(text_of)
        .or_else(|| card.name.clone());

    let designation = nth_child(content, "figure", 1)
        .and_then(own_text)
        .or_else(|| card.designation.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let email = content
        .select(&QUOTE)
        .next()
        .and_then(text_of)
        .and_then(|quote| find_email(&quote))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let biography = content
        .select(&BIOGRAPHY)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|bio| !bio.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let education = match education_rows(content) {
        Ok(rows) => rows,
        Err(EducationError::Absent) => {
            debug!(name = ?name, "no education table");
            Vec::new()
        }
        Err(e @ EducationError::Malformed { .. }) => {
            warn!(name = ?name, error = %e, "discarding education table");
            Vec::new()
        }
    };

    Profile {
        name,
        record: InstructorRecord {
            designation,
            email,
            biography,
            education,
        },
        degraded: false,
    }
}

/// First `…@iba-suk.edu.pk` address in `text`.
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

/// Rows of the first responsive table. A single short row voids the whole table.
pub fn education_rows(content: ElementRef) -> Result<Vec<EducationEntry>, EducationError> {
    let table = content
        .select(&EDUCATION_TABLE)
        .next()
        .ok_or(EducationError::Absent)?;

    let rows = children_named(table, "tbody").flat_map(|tbody| children_named(tbody, "tr"));

    let mut entries = Vec::new();
    for (i, row) in rows.enumerate() {
        let cells: Vec<String> = children_named(row, "td")
            .map(|td| text_of(td).unwrap_or_default())
            .collect();
        if cells.len() < EDUCATION_COLUMNS {
            return Err(EducationError::Malformed {
                row: i + 1,
                cells: cells.len(),
            });
        }
        let mut cells = cells.into_iter();
        entries.push(EducationEntry {
            degree: cells.next().unwrap_or_default(),
            institute: cells.next().unwrap_or_default(),
            major: cells.next().unwrap_or_default(),
            year: cells.next().unwrap_or_default(),
        });
    }
    Ok(entries)
}

fn children_named<'a>(el: ElementRef<'a>, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

// ── Tests ──
