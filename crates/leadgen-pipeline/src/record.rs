//! In-place editing of an agent result before it is committed.
//!
//! [`EditableRecord`] holds the working copy behind an `Arc`. Mutation goes
//! through `Arc::make_mut`, so a [`EditableRecord::snapshot`] handed out
//! earlier keeps the value it had when it was taken.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use leadgen_core::AnalysisResult;

use crate::error::RecordError;

/// A record whose scalar fields and string lists can be edited by name.
pub trait EditableFields: Clone {
    type Field: Copy + fmt::Display + FromStr<Err = RecordError>;
    type List: Copy + fmt::Display + FromStr<Err = RecordError>;

    fn set(&mut self, field: Self::Field, value: String);

    fn list(&self, list: Self::List) -> &[String];

    fn list_mut(&mut self, list: Self::List) -> &mut Vec<String>;
}

/// One edit operation, as dispatched to the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<F = AnalysisField, L = AnalysisList> {
    SetField { field: F, value: String },
    InsertItem { list: L, value: String },
    UpdateItem { list: L, index: usize, value: String },
    RemoveItem { list: L, index: usize },
}

/// Working copy of a record with copy-on-write snapshots.
#[derive(Debug, Clone)]
pub struct EditableRecord<T> {
    current: Arc<T>,
    dirty: bool,
}

impl<T: EditableFields> EditableRecord<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: Arc::new(value),
            dirty: false,
        }
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.current
    }

    /// A shared handle to the current value. Later edits do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.current)
    }

    /// `true` if the record changed since it was loaded or last committed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_committed(&mut self) {
        self.dirty = false;
    }

    pub fn set_field(&mut self, field: T::Field, value: impl Into<String>) {
        self.value_mut().set(field, value.into());
    }

    /// Appends `value` to the end of `list`.
    pub fn insert_item(&mut self, list: T::List, value: impl Into<String>) {
        self.value_mut().list_mut(list).push(value.into());
    }

    /// Replaces the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::IndexOutOfRange`] if `index` is past the end.
    pub fn update_item(
        &mut self,
        list: T::List,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), RecordError> {
        self.check_index(list, index)?;
        self.value_mut().list_mut(list)[index] = value.into();
        Ok(())
    }

    /// Removes and returns the item at `index`, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::IndexOutOfRange`] if `index` is past the end.
    pub fn remove_item(&mut self, list: T::List, index: usize) -> Result<String, RecordError> {
        self.check_index(list, index)?;
        Ok(self.value_mut().list_mut(list).remove(index))
    }

    /// Applies one [`Edit`].
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::IndexOutOfRange`] for a bad update or removal.
    pub fn apply(&mut self, edit: Edit<T::Field, T::List>) -> Result<(), RecordError> {
        match edit {
            Edit::SetField { field, value } => self.set_field(field, value),
            Edit::InsertItem { list, value } => self.insert_item(list, value),
            Edit::UpdateItem { list, index, value } => self.update_item(list, index, value)?,
            Edit::RemoveItem { list, index } => {
                self.remove_item(list, index)?;
            }
        }
        Ok(())
    }

    fn check_index(&self, list: T::List, index: usize) -> Result<(), RecordError> {
        let len = self.current.list(list).len();
        if index >= len {
            return Err(RecordError::IndexOutOfRange {
                list: list.to_string(),
                index,
                len,
            });
        }
        Ok(())
    }

    fn value_mut(&mut self) -> &mut T {
        self.dirty = true;
        Arc::make_mut(&mut self.current)
    }
}

impl<T: EditableFields + Default> Default for EditableRecord<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// ---------------------------------------------------------------------------
// Analysis record
// ---------------------------------------------------------------------------

/// Editable scalar fields of [`AnalysisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisField {
    CompanyName,
    CompanySummary,
    Usp,
    MainAddress,
    LinkedinUrl,
    TwitterUrl,
    FacebookUrl,
    InstagramUrl,
    YoutubeUrl,
    GithubUrl,
}

impl AnalysisField {
    pub const ALL: [AnalysisField; 10] = [
        AnalysisField::CompanyName,
        AnalysisField::CompanySummary,
        AnalysisField::Usp,
        AnalysisField::MainAddress,
        AnalysisField::LinkedinUrl,
        AnalysisField::TwitterUrl,
        AnalysisField::FacebookUrl,
        AnalysisField::InstagramUrl,
        AnalysisField::YoutubeUrl,
        AnalysisField::GithubUrl,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisField::CompanyName => "company_name",
            AnalysisField::CompanySummary => "company_summary",
            AnalysisField::Usp => "usp",
            AnalysisField::MainAddress => "main_address",
            AnalysisField::LinkedinUrl => "linkedin_url",
            AnalysisField::TwitterUrl => "twitter_url",
            AnalysisField::FacebookUrl => "facebook_url",
            AnalysisField::InstagramUrl => "instagram_url",
            AnalysisField::YoutubeUrl => "youtube_url",
            AnalysisField::GithubUrl => "github_url",
        }
    }
}

impl fmt::Display for AnalysisField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisField {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| RecordError::UnknownField(s.to_string()))
    }
}

/// Editable string lists of [`AnalysisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisList {
    IcpProfile,
    TargetIndustries,
    TargetCompanies,
    PainPoints,
    Sources,
    PhoneNumbers,
    EmailAddresses,
}

impl AnalysisList {
    pub const ALL: [AnalysisList; 7] = [
        AnalysisList::IcpProfile,
        AnalysisList::TargetIndustries,
        AnalysisList::TargetCompanies,
        AnalysisList::PainPoints,
        AnalysisList::Sources,
        AnalysisList::PhoneNumbers,
        AnalysisList::EmailAddresses,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisList::IcpProfile => "icp_profile",
            AnalysisList::TargetIndustries => "target_industries",
            AnalysisList::TargetCompanies => "target_companies",
            AnalysisList::PainPoints => "pain_points",
            AnalysisList::Sources => "sources",
            AnalysisList::PhoneNumbers => "phone_numbers",
            AnalysisList::EmailAddresses => "email_addresses",
        }
    }
}

impl fmt::Display for AnalysisList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisList {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| RecordError::UnknownField(s.to_string()))
    }
}

/// Blank input clears an optional field.
fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl EditableFields for AnalysisResult {
    type Field = AnalysisField;
    type List = AnalysisList;

    fn set(&mut self, field: AnalysisField, value: String) {
        match field {
            AnalysisField::CompanyName => self.company_name = value,
            AnalysisField::CompanySummary => self.company_summary = value,
            AnalysisField::Usp => self.usp = value,
            AnalysisField::MainAddress => self.main_address = optional(value),
            AnalysisField::LinkedinUrl => self.linkedin_url = optional(value),
            AnalysisField::TwitterUrl => self.twitter_url = optional(value),
            AnalysisField::FacebookUrl => self.facebook_url = optional(value),
            AnalysisField::InstagramUrl => self.instagram_url = optional(value),
            AnalysisField::YoutubeUrl => self.youtube_url = optional(value),
            AnalysisField::GithubUrl => self.github_url = optional(value),
        }
    }

    fn list(&self, list: AnalysisList) -> &[String] {
        match list {
            AnalysisList::IcpProfile => &self.icp_profile,
            AnalysisList::TargetIndustries => &self.target_industries,
            AnalysisList::TargetCompanies => &self.target_companies,
            AnalysisList::PainPoints => &self.pain_points,
            AnalysisList::Sources => &self.sources,
            AnalysisList::PhoneNumbers => &self.phone_numbers,
            AnalysisList::EmailAddresses => &self.email_addresses,
        }
    }

    fn list_mut(&mut self, list: AnalysisList) -> &mut Vec<String> {
        match list {
            AnalysisList::IcpProfile => &mut self.icp_profile,
            AnalysisList::TargetIndustries => &mut self.target_industries,
            AnalysisList::TargetCompanies => &mut self.target_companies,
            AnalysisList::PainPoints => &mut self.pain_points,
            AnalysisList::Sources => &mut self.sources,
            AnalysisList::PhoneNumbers => &mut self.phone_numbers,
            AnalysisList::EmailAddresses => &mut self.email_addresses,
        }
    }
}
