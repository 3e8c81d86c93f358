//! Virtual Trucking Companies and their memberships.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::UserId;

/// Longest accepted VTC tag.
pub const VTC_TAG_MAX: usize = 10;

/// Validation failures for VTC input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VtcValidationError {
    /// Name was blank.
    #[error("Name and tag are required.")]
    EmptyName,
    /// Tag was blank.
    #[error("Name and tag are required.")]
    EmptyTag,
    /// Tag longer than [`VTC_TAG_MAX`].
    #[error("Tag must be 10 characters or less.")]
    TagTooLong,
    /// Identifier was not positive.
    #[error("vtc id must be positive")]
    InvalidId,
    /// Stored role or status was not recognised.
    #[error("unknown membership value: {0}")]
    UnknownMembershipValue(String),
}

/// Database identifier of a VTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VtcId(i64);

impl VtcId {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, VtcValidationError> {
        if raw <= 0 {
            return Err(VtcValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Raw database key.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for VtcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short unique company tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VtcTag(String);

impl VtcTag {
    /// Validate a raw tag.
    pub fn new(raw: &str) -> Result<Self, VtcValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VtcValidationError::EmptyTag);
        }
        if trimmed.chars().count() > VTC_TAG_MAX {
            return Err(VtcValidationError::TagTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A VTC about to be founded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVtc {
    /// Company name.
    pub name: String,
    /// Unique tag.
    pub tag: VtcTag,
    /// Optional description.
    pub description: Option<String>,
    /// Founder, inserted as owner member.
    pub owner: UserId,
}

impl NewVtc {
    /// Validate the creation form.
    pub fn try_new(
        name: &str,
        tag: &str,
        description: Option<&str>,
        owner: UserId,
    ) -> Result<Self, VtcValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VtcValidationError::EmptyName);
        }
        let tag = VtcTag::new(tag)?;
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        Ok(Self {
            name: name.to_owned(),
            tag,
            description,
            owner,
        })
    }
}

/// Role of a member inside a VTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VtcRole {
    /// Founder; cannot leave while owner.
    Owner,
    /// Company administrator.
    Admin,
    /// Regular driver.
    Member,
}

impl VtcRole {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl FromStr for VtcRole {
    type Err = VtcValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(VtcValidationError::UnknownMembershipValue(other.to_owned())),
        }
    }
}

/// Whether a membership is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Current member.
    Active,
    /// Former member.
    Inactive,
}

impl MemberStatus {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = VtcValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(VtcValidationError::UnknownMembershipValue(other.to_owned())),
        }
    }
}

/// A user's membership row in one VTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    /// Role.
    pub role: VtcRole,
    /// Current or former.
    pub status: MemberStatus,
}

/// VTC list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VtcSummary {
    /// Primary key.
    pub id: VtcId,
    /// Company name.
    pub name: String,
    /// Unique tag.
    pub tag: String,
    /// Optional description.
    pub description: Option<String>,
    /// Shown name of the owner.
    pub owner_name: String,
    /// Number of active members.
    pub member_count: i64,
    /// Foundation time.
    pub created_at: DateTime<Utc>,
}

/// Active member shown on the VTC page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VtcMember {
    /// Member user.
    pub user_id: UserId,
    /// Shown name.
    pub name: String,
    /// Role.
    pub role: VtcRole,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

/// VTC page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VtcDetail {
    /// Company.
    pub vtc: VtcSummary,
    /// Active members, owner first.
    pub members: Vec<VtcMember>,
}
