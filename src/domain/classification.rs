use std::fmt;

use crate::error::{AppError, AppResult};

// The model-facing labels may be reworded freely; the stable ids must not change,
// they name the workflows.
const SECURITY_SUBCATEGORIES: &[(&str, &str)] = &[
    ("Phishing e-mails", "phishing_emails"),
    (
        "Resolution of ESET disabled alarms by the SPO",
        "eset_disabled_alarms",
    ),
    ("Opening .MSG files", "opening_msg_files"),
    (
        "Responding to responsible disclosure reports",
        "responding_to_responsible_disclosure_reports",
    ),
    ("Spam e-mails", "spam_emails"),
    ("Outlook rule detected", "outlook_rule_detected"),
    ("Physical break-in", "physical_break_in"),
    (
        "Lost or stolen devices, data carriers and/or papers",
        "lost_or_stolen_devices_data_carriers_papers",
    ),
    ("Malware infection", "malware_infection"),
];

const PRIVACY_SUBCATEGORIES: &[(&str, &str)] = &[
    (
        "Estimating country risk for Working Abroad requests",
        "estimating_country_risk_for_working_abroad",
    ),
    (
        "Data Breaches (e.g., incorrectly sent email)",
        "data_breaches",
    ),
    (
        "Handling a Data Subject's Request",
        "handling_a_data_subjects_request",
    ),
    ("Privacy statement review", "privacy_statement_review"),
    (
        "Filling in the databreach tab",
        "filling_in_the_databreach_tab",
    ),
    ("Is a DPIA required?", "is_a_dpia_required"),
    ("Reviewing DPA's / Verwerkersovereenkomst", "reviewing_dpas"),
    ("Controller or Processor?", "controller_or_processor"),
    (
        "Stappenplan Datalek Beoordeling",
        "stappenplan_datalek_beoordeling",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Security,
    Privacy,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Security, Category::Privacy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "Security",
            Category::Privacy => "Privacy",
        }
    }

    /// Exact, case-sensitive match on the model's label.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "Security" => Ok(Category::Security),
            "Privacy" => Ok(Category::Privacy),
            other => Err(AppError::UnexpectedCategory(other.to_string())),
        }
    }

    /// Namespace segment used in workflow paths.
    pub fn namespace(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Privacy => "privacy",
        }
    }

    pub fn subcategories(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Category::Security => SECURITY_SUBCATEGORIES,
            Category::Privacy => PRIVACY_SUBCATEGORIES,
        }
    }

    pub fn generic_label(&self) -> &'static str {
        match self {
            Category::Security => "Generic Security",
            Category::Privacy => "Generic Privacy",
        }
    }

    pub fn map_subcategory(&self, label: &str) -> MappedSubcategory {
        self.subcategories()
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, stable)| MappedSubcategory::Known(*stable))
            .unwrap_or(MappedSubcategory::Generic(*self))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedSubcategory {
    Known(&'static str),
    Generic(Category),
}

impl MappedSubcategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappedSubcategory::Known(stable) => *stable,
            MappedSubcategory::Generic(Category::Security) => "generic_security",
            MappedSubcategory::Generic(Category::Privacy) => "generic_privacy",
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, MappedSubcategory::Generic(_))
    }
}

impl fmt::Display for MappedSubcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub subcategory: String,
    pub mapped_subcategory: MappedSubcategory,
    pub confidence: String,
    pub rationale: String,
}
