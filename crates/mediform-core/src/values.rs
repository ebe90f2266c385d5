//! Form submission values
//!
//! [`FormFields`] is the raw input as it arrives (JSON body, file, or built in
//! code); every field is optional and the key names are the form's wire
//! names such as `APPLICANT_NAME`. Unknown keys are rejected.
//!
//! [`FormValues`] is the validated, immutable record the table renderer
//! consumes. Converting fills any missing or empty address with
//! [`PLACEHOLDER`] and every other missing field with an empty string.

use std::io::Read;

use serde::{Deserialize, Serialize};

use mediform_ooxml::is_xml_char;

use crate::error::{FormError, Result};

/// Blank line printed in place of an address so it can be filled by hand
pub const PLACEHOLDER: &str = "________________";

/// Which side of the dispute a block of fields describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Applicant,
    /// The opposite party
    Defendant,
}

/// The single-line contact fields of a party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Phone,
    Mobile,
    Email,
}

impl ContactKind {
    /// Row label printed on the form
    pub fn label(self) -> &'static str {
        match self {
            ContactKind::Phone => "Telephone No.",
            ContactKind::Mobile => "Mobile No.",
            ContactKind::Email => "Email ID",
        }
    }
}

/// Raw, optional form input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields, default)]
pub struct FormFields {
    pub applicant_name: Option<String>,
    /// Registered address of the applicant
    pub applicant_branch_address: Option<String>,
    pub applicant_correspondence_branch_address: Option<String>,
    pub applicant_phone: Option<String>,
    pub applicant_mobile: Option<String>,
    pub applicant_email_id: Option<String>,

    pub defendant_name: Option<String>,
    /// Registered address of the defendant
    pub defendant_branch_address: Option<String>,
    pub defendant_correspondence_branch_address: Option<String>,
    pub defendant_phone: Option<String>,
    pub defendant_mobile: Option<String>,
    pub defendant_email_id: Option<String>,
}

impl FormFields {
    /// Each field paired with its wire name
    fn entries(&self) -> [(&'static str, Option<&str>); 12] {
        [
            ("APPLICANT_NAME", self.applicant_name.as_deref()),
            ("APPLICANT_BRANCH_ADDRESS", self.applicant_branch_address.as_deref()),
            (
                "APPLICANT_CORRESPONDENCE_BRANCH_ADDRESS",
                self.applicant_correspondence_branch_address.as_deref(),
            ),
            ("APPLICANT_PHONE", self.applicant_phone.as_deref()),
            ("APPLICANT_MOBILE", self.applicant_mobile.as_deref()),
            ("APPLICANT_EMAIL_ID", self.applicant_email_id.as_deref()),
            ("DEFENDANT_NAME", self.defendant_name.as_deref()),
            ("DEFENDANT_BRANCH_ADDRESS", self.defendant_branch_address.as_deref()),
            (
                "DEFENDANT_CORRESPONDENCE_BRANCH_ADDRESS",
                self.defendant_correspondence_branch_address.as_deref(),
            ),
            ("DEFENDANT_PHONE", self.defendant_phone.as_deref()),
            ("DEFENDANT_MOBILE", self.defendant_mobile.as_deref()),
            ("DEFENDANT_EMAIL_ID", self.defendant_email_id.as_deref()),
        ]
    }

    /// Reject values holding characters a DOCX cannot carry (control
    /// characters other than tab and newline, U+FFFE, U+FFFF)
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.entries() {
            let bad = value.and_then(|v| v.chars().find(|&c| !is_xml_char(c)));
            if let Some(c) = bad {
                return Err(FormError::InvalidCharacter {
                    field,
                    codepoint: u32::from(c),
                });
            }
        }
        Ok(())
    }
}

/// One party's details after defaulting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyDetails {
    name: String,
    registered_address: String,
    correspondence_address: String,
    phone: String,
    mobile: String,
    email: String,
}

impl PartyDetails {
    fn new(
        name: Option<String>,
        registered_address: Option<String>,
        correspondence_address: Option<String>,
        phone: Option<String>,
        mobile: Option<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            name: name.unwrap_or_default(),
            registered_address: address_or_placeholder(registered_address),
            correspondence_address: address_or_placeholder(correspondence_address),
            phone: phone.unwrap_or_default(),
            mobile: mobile.unwrap_or_default(),
            email: email.unwrap_or_default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registered_address(&self) -> &str {
        &self.registered_address
    }

    pub fn correspondence_address(&self) -> &str {
        &self.correspondence_address
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn contact(&self, kind: ContactKind) -> &str {
        match kind {
            ContactKind::Phone => &self.phone,
            ContactKind::Mobile => &self.mobile,
            ContactKind::Email => &self.email,
        }
    }
}

fn address_or_placeholder(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => PLACEHOLDER.to_string(),
    }
}

/// One complete, immutable form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    applicant: PartyDetails,
    defendant: PartyDetails,
}

impl FormValues {
    /// Apply defaults without validating; the writer still rejects text it
    /// cannot encode
    pub fn new(fields: FormFields) -> Self {
        Self {
            applicant: PartyDetails::new(
                fields.applicant_name,
                fields.applicant_branch_address,
                fields.applicant_correspondence_branch_address,
                fields.applicant_phone,
                fields.applicant_mobile,
                fields.applicant_email_id,
            ),
            defendant: PartyDetails::new(
                fields.defendant_name,
                fields.defendant_branch_address,
                fields.defendant_correspondence_branch_address,
                fields.defendant_phone,
                fields.defendant_mobile,
                fields.defendant_email_id,
            ),
        }
    }

    /// Validate the fields, then apply defaults
    pub fn try_new(fields: FormFields) -> Result<Self> {
        fields.validate()?;
        Ok(Self::new(fields))
    }

    /// Parse form fields from a JSON object and apply defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Self::try_new(serde_json::from_str(json)?)
    }

    /// Like [`FormValues::from_json`], reading from any source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::try_new(serde_json::from_reader(reader)?)
    }

    pub fn applicant(&self) -> &PartyDetails {
        &self.applicant
    }

    pub fn defendant(&self) -> &PartyDetails {
        &self.defendant
    }

    pub fn party(&self, party: Party) -> &PartyDetails {
        match party {
            Party::Applicant => &self.applicant,
            Party::Defendant => &self.defendant,
        }
    }
}

impl From<FormFields> for FormValues {
    fn from(fields: FormFields) -> Self {
        Self::new(fields)
    }
}

impl Default for FormValues {
    fn default() -> Self {
        Self::new(FormFields::default())
    }
}
