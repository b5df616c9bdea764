// src/models/availability.rs

//! Classification outcomes for a timetable query.

use std::fmt;

/// What a timetable page says about one CRN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// The results table is present and a row carries the CRN
    OpenFound,
    /// The "no sections found" banner is present
    NoOpen,
    /// The campus/term error banner is present; the query itself was rejected
    TimetableError,
    /// No results table at all: the CRN does not exist for this campus/term
    InvalidCrn,
    /// Nothing recognised; never treated as open
    Unknown,
}

impl Availability {
    /// Short tag used in summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::OpenFound => "open_found",
            Availability::NoOpen => "no_open",
            Availability::TimetableError => "timetable_error",
            Availability::InvalidCrn => "invalid_crn",
            Availability::Unknown => "unknown",
        }
    }

    /// Human-readable status message for the status log.
    pub fn message(&self) -> &'static str {
        match self {
            Availability::OpenFound => "Availability found ***",
            Availability::NoOpen => "No availability found.",
            Availability::TimetableError => "Error from timetable. Likely bad payload.",
            Availability::InvalidCrn => "CRN not found in timetable.",
            Availability::Unknown => "Unknown error occurred",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of one upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 200 OK with the page body
    Success(String),
    /// The server answered with any other status
    HttpStatus(u16),
    /// The request never produced a usable response
    Transport(String),
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Success(body) => write!(f, "success ({} bytes)", body.len()),
            FetchOutcome::HttpStatus(code) => {
                write!(f, "Response returned status code of {code}.")
            }
            FetchOutcome::Transport(message) => write!(f, "Request failed: {message}"),
        }
    }
}
