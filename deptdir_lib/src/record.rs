//! Normalized output record and the closed role vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Normalized affiliation of a person.
///
/// A flat controlled vocabulary: six base roles, the alumni variant of each,
/// a bare `alumni` tag and a reserved `other`. Conceptually
/// `grad` covers `master` and `phd`, but the tags themselves are flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleTag {
    #[serde(rename = "undergrad")]
    Undergrad,
    #[serde(rename = "grad")]
    Grad,
    #[serde(rename = "master")]
    Master,
    #[serde(rename = "phd")]
    Phd,
    #[serde(rename = "postdoc")]
    Postdoc,
    #[serde(rename = "staff")]
    Staff,
    #[serde(rename = "alumni")]
    Alumni,
    #[serde(rename = "undergrad-alumni")]
    UndergradAlumni,
    #[serde(rename = "grad-alumni")]
    GradAlumni,
    #[serde(rename = "master-alumni")]
    MasterAlumni,
    #[serde(rename = "phd-alumni")]
    PhdAlumni,
    #[serde(rename = "postdoc-alumni")]
    PostdocAlumni,
    #[serde(rename = "staff-alumni")]
    StaffAlumni,
    #[serde(rename = "other")]
    Other,
}

impl RoleTag {
    pub const ALL: [RoleTag; 14] = [
        RoleTag::Undergrad,
        RoleTag::Grad,
        RoleTag::Master,
        RoleTag::Phd,
        RoleTag::Postdoc,
        RoleTag::Staff,
        RoleTag::Alumni,
        RoleTag::UndergradAlumni,
        RoleTag::GradAlumni,
        RoleTag::MasterAlumni,
        RoleTag::PhdAlumni,
        RoleTag::PostdocAlumni,
        RoleTag::StaffAlumni,
        RoleTag::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::Undergrad => "undergrad",
            RoleTag::Grad => "grad",
            RoleTag::Master => "master",
            RoleTag::Phd => "phd",
            RoleTag::Postdoc => "postdoc",
            RoleTag::Staff => "staff",
            RoleTag::Alumni => "alumni",
            RoleTag::UndergradAlumni => "undergrad-alumni",
            RoleTag::GradAlumni => "grad-alumni",
            RoleTag::MasterAlumni => "master-alumni",
            RoleTag::PhdAlumni => "phd-alumni",
            RoleTag::PostdocAlumni => "postdoc-alumni",
            RoleTag::StaffAlumni => "staff-alumni",
            RoleTag::Other => "other",
        }
    }

    /// The alumni variant of a base role. Alumni tags and `other` map to themselves.
    pub fn alumni(self) -> RoleTag {
        match self {
            RoleTag::Undergrad => RoleTag::UndergradAlumni,
            RoleTag::Grad => RoleTag::GradAlumni,
            RoleTag::Master => RoleTag::MasterAlumni,
            RoleTag::Phd => RoleTag::PhdAlumni,
            RoleTag::Postdoc => RoleTag::PostdocAlumni,
            RoleTag::Staff => RoleTag::StaffAlumni,
            other => other,
        }
    }

    pub fn is_alumni(&self) -> bool {
        matches!(
            self,
            RoleTag::Alumni
                | RoleTag::UndergradAlumni
                | RoleTag::GradAlumni
                | RoleTag::MasterAlumni
                | RoleTag::PhdAlumni
                | RoleTag::PostdocAlumni
                | RoleTag::StaffAlumni
        )
    }

    /// Strips the alumni modifier. The bare `alumni` tag and `other` have no base.
    pub fn base(self) -> Option<RoleTag> {
        match self {
            RoleTag::UndergradAlumni => Some(RoleTag::Undergrad),
            RoleTag::GradAlumni => Some(RoleTag::Grad),
            RoleTag::MasterAlumni => Some(RoleTag::Master),
            RoleTag::PhdAlumni => Some(RoleTag::Phd),
            RoleTag::PostdocAlumni => Some(RoleTag::Postdoc),
            RoleTag::StaffAlumni => Some(RoleTag::Staff),
            RoleTag::Alumni | RoleTag::Other => None,
            base => Some(base),
        }
    }

    /// Graduate students of any kind (grad, master's, doctoral), current or former.
    pub fn is_graduate(&self) -> bool {
        matches!(
            self.base(),
            Some(RoleTag::Grad) | Some(RoleTag::Master) | Some(RoleTag::Phd)
        )
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a role tag from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role tag '{0}'")]
pub struct UnknownRoleTag(pub String);

impl FromStr for RoleTag {
    type Err = UnknownRoleTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RoleTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownRoleTag(s.to_string()))
    }
}

/// One extracted person.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub title: RoleTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
