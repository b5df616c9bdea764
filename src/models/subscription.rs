// src/models/subscription.rs

//! Course subscriptions read from the CSV subscription file.
//!
//! The file has a header row with the columns
//! `desc, campus, term_year, crn, ntfy_url`, one row per monitored section.
//! It is re-read on every poll cycle, so edits take effect without a restart.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// A monitored course section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Free-form label (e.g., "CS 3114")
    pub description: String,

    /// Campus code sent as `CAMPUS`
    pub campus: String,

    /// Term code sent as `TERMYEAR` (e.g., "202501")
    pub term_year: String,

    /// Course reference number, kept as an opaque string
    pub crn: String,

    /// Webhook that receives the opening notification
    pub notify_endpoint: String,
}

impl Subscription {
    /// Key used to suppress repeat notifications.
    pub fn key(&self) -> NotificationKey {
        NotificationKey {
            crn: self.crn.clone(),
            description: self.description.clone(),
        }
    }
}

/// Identifies a subscription for dedup purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub crn: String,
    pub description: String,
}

impl NotificationKey {
    pub fn new(crn: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            crn: crn.into(),
            description: description.into(),
        }
    }
}

/// Raw CSV row; every column may be missing or blank.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubscriptionRow {
    desc: Option<String>,
    campus: Option<String>,
    term_year: Option<String>,
    crn: Option<String>,
    ntfy_url: Option<String>,
}

impl SubscriptionRow {
    fn into_subscription(self) -> Option<Subscription> {
        Some(Subscription {
            description: required(self.desc)?,
            campus: required(self.campus)?,
            term_year: required(self.term_year)?,
            crn: required(self.crn)?,
            notify_endpoint: required(self.ntfy_url)?,
        })
    }
}

fn required(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Result of a strict parse of the subscription file.
#[derive(Debug, Default)]
pub struct SubscriptionList {
    /// Valid rows, in file order, with trimmed values
    pub subscriptions: Vec<Subscription>,

    /// 1-based data row numbers that were skipped
    pub skipped_rows: Vec<usize>,
}

/// Parse subscriptions from any CSV source.
///
/// Rows with a missing or blank required field are skipped with a warning.
/// Structural CSV errors fail the whole parse.
pub fn parse_subscriptions<R: Read>(reader: R) -> Result<SubscriptionList> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut list = SubscriptionList::default();
    for (index, row) in csv_reader.deserialize::<SubscriptionRow>().enumerate() {
        let row_number = index + 1;
        let row = row?;
        let raw = format!("{row:?}");
        match row.into_subscription() {
            Some(subscription) => list.subscriptions.push(subscription),
            None => {
                log::warn!("Invalid subscription row {row_number}, skipping: {raw}");
                list.skipped_rows.push(row_number);
            }
        }
    }
    Ok(list)
}

/// Read and strictly parse the subscription file.
pub fn read_subscriptions(path: impl AsRef<Path>) -> Result<SubscriptionList> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            AppError::config(format!("Subscription file not found: {}", path.display()))
        }
        _ => AppError::Io(e),
    })?;
    parse_subscriptions(file)
}

/// Load subscriptions for a poll cycle.
///
/// Never fails: a missing or malformed file yields an empty list and a warning.
pub fn load_subscriptions(path: impl AsRef<Path>) -> Vec<Subscription> {
    let path = path.as_ref();
    match read_subscriptions(path) {
        Ok(list) => list.subscriptions,
        Err(e) => {
            log::warn!(
                "Failed to read subscriptions from {}: {}",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "desc,campus,term_year,crn,ntfy_url\n";

    fn parse(body: &str) -> SubscriptionList {
        parse_subscriptions(format!("{HEADER}{body}").as_bytes()).unwrap()
    }

    #[test]
    fn test_complete_row_is_trimmed() {
        let list = parse(" CS101 , 0 ,202501, 12345 , https://example.test/hook \n");
        assert_eq!(
            list.subscriptions,
            vec![Subscription {
                description: "CS101".to_string(),
                campus: "0".to_string(),
                term_year: "202501".to_string(),
                crn: "12345".to_string(),
                notify_endpoint: "https://example.test/hook".to_string(),
            }]
        );
        assert!(list.skipped_rows.is_empty());
    }

    #[test]
    fn test_blank_field_is_skipped() {
        let list = parse(
            "CS101,0,202501,12345,https://example.test/a\n\
             MATH2114,0,202501,   ,https://example.test/b\n\
             PHYS2305,0,202501,54321,https://example.test/c\n",
        );
        let crns: Vec<_> = list.subscriptions.iter().map(|s| s.crn.as_str()).collect();
        assert_eq!(crns, vec!["12345", "54321"]);
        assert_eq!(list.skipped_rows, vec![2]);
    }

    #[test]
    fn test_short_row_is_skipped() {
        let list = parse("CS101,0,202501\nCS102,0,202501,22222,https://example.test/x\n");
        assert_eq!(list.subscriptions.len(), 1);
        assert_eq!(list.subscriptions[0].crn, "22222");
        assert_eq!(list.skipped_rows, vec![1]);
    }

    #[test]
    fn test_missing_column_skips_every_row() {
        let list = parse_subscriptions(
            "desc,campus,term_year,crn\nCS101,0,202501,12345\n".as_bytes(),
        )
        .unwrap();
        assert!(list.subscriptions.is_empty());
        assert_eq!(list.skipped_rows, vec![1]);
    }

    #[test]
    fn test_column_order_is_free() {
        let list = parse_subscriptions(
            "crn,ntfy_url,desc,term_year,campus\n777,https://h.test,Art,202509,1\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(list.subscriptions[0].description, "Art");
        assert_eq!(list.subscriptions[0].campus, "1");
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let subs = load_subscriptions(dir.path().join("absent.csv"));
        assert!(subs.is_empty());
        assert!(matches!(
            read_subscriptions(dir.path().join("absent.csv")),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscriptions.csv");
        let mut body = HEADER.as_bytes().to_vec();
        body.extend_from_slice(b"CS\xff101,0,202501,12345,https://example.test/hook\n");
        std::fs::write(&path, body).unwrap();

        assert!(load_subscriptions(&path).is_empty());
        assert!(matches!(read_subscriptions(&path), Err(AppError::Csv(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}CS101,0,202501,12345,https://example.test/hook").unwrap();

        let subs = load_subscriptions(file.path());
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].key(), NotificationKey::new("12345", "CS101"));
    }
}
