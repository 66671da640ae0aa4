use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use super::calendar::date_range;
use super::directory::StaffDirectory;
use super::domain::{AvailabilityDay, Period};
use super::repository::{RepositoryError, SubmissionRepository};

/// Error raised while rendering the submission export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("csv rendering failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export is not valid utf-8")]
    Encoding,
}

/// Render every committed submission of the period as delimited text:
/// one row per staff member, an availability and a comment column per
/// date, remarks last.
pub fn export_submissions_csv(
    period: &Period,
    submissions: &Arc<dyn SubmissionRepository>,
    staff: &Arc<dyn StaffDirectory>,
) -> Result<String, ExportError> {
    let dates: Vec<NaiveDate> = date_range(period.start_date, period.end_date).collect();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["name".to_string()];
    for date in &dates {
        header.push(format!("{:02}/{:02}", date.month(), date.day()));
        header.push("comment".to_string());
    }
    header.push("remarks".to_string());
    writer.write_record(&header)?;

    for submission in submissions.list_for_period(period.id)? {
        if !submission.status.is_committed() {
            continue;
        }
        let name = staff
            .profile(submission.user)
            .map(|profile| profile.display_name)
            .unwrap_or_else(|| format!("user-{}", submission.user.0));
        let days: HashMap<NaiveDate, AvailabilityDay> = submissions
            .days(submission.id)?
            .into_iter()
            .map(|day| (day.date, day))
            .collect();

        let mut row = vec![name];
        for date in &dates {
            match days.get(date) {
                Some(day) => {
                    row.push(day.availability.label().to_string());
                    row.push(day.comment.clone());
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
        }
        row.push(submission.remarks.clone());
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.into_error().into()))?;
    String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
}
