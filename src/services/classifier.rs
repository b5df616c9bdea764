// src/services/classifier.rs

//! Availability classifier.
//!
//! Reads a timetable search result page and decides whether the requested
//! CRN has an open section. The checks run in a fixed order:
//!
//! 1. no results table            -> `InvalidCrn`
//! 2. campus/term error banner    -> `TimetableError`
//! 3. "no sections found" banner  -> `NoOpen`
//! 4. a results cell equal to CRN -> `OpenFound`
//! 5. anything else               -> `Unknown`

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Availability, ClassifierRules};

/// Classifies timetable pages using pre-parsed selectors.
#[derive(Debug, Clone)]
pub struct AvailabilityClassifier {
    results_table: Selector,
    timetable_error: Selector,
    timetable_error_text: String,
    no_sections: Selector,
    no_sections_text: String,
    row: Selector,
    cell: Selector,
}

impl AvailabilityClassifier {
    /// Build a classifier from configured rules.
    pub fn new(rules: &ClassifierRules) -> Result<Self> {
        Ok(Self {
            results_table: Self::parse_selector(&rules.results_table_selector)?,
            timetable_error: Self::parse_selector(&rules.timetable_error_selector)?,
            timetable_error_text: rules.timetable_error_text.trim().to_string(),
            no_sections: Self::parse_selector(&rules.no_sections_selector)?,
            no_sections_text: rules.no_sections_text.trim().to_string(),
            row: Self::parse_selector("tr")?,
            cell: Self::parse_selector("td")?,
        })
    }

    /// Classify a page body for the given CRN.
    pub fn classify(&self, html: &str, crn: &str) -> Availability {
        let document = Html::parse_document(html);
        self.classify_document(&document, crn)
    }

    /// Classify an already-parsed document.
    pub fn classify_document(&self, document: &Html, crn: &str) -> Availability {
        let Some(table) = document.select(&self.results_table).next() else {
            return Availability::InvalidCrn;
        };

        if Self::has_banner(document, &self.timetable_error, &self.timetable_error_text) {
            return Availability::TimetableError;
        }

        if Self::has_banner(document, &self.no_sections, &self.no_sections_text) {
            return Availability::NoOpen;
        }

        let crn = crn.trim();
        let matched = table
            .select(&self.row)
            .flat_map(|row| row.select(&self.cell))
            .any(|cell| text_of(&cell) == crn);

        if matched {
            Availability::OpenFound
        } else {
            Availability::Unknown
        }
    }

    fn has_banner(document: &Html, selector: &Selector, text: &str) -> bool {
        document
            .select(selector)
            .any(|element| text_of(&element) == text)
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

/// Concatenated, trimmed text content of an element.
fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
