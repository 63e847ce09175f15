use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// Opaque identity of an address row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(i64);

impl AddressId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AddressId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// One contact in the address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub nickname: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// True when every postal field is filled in.
    ///
    /// Incomplete records are rendered in italics and their postal block is
    /// left out of the detail view.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.zipcode]
            .iter()
            .all(|field| !field.is_empty())
    }

    /// The nickname, if one is set and non-empty.
    #[must_use]
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref().filter(|nick| !nick.is_empty())
    }

    /// Snapshot of the user-editable fields.
    #[must_use]
    pub fn fields(&self) -> AddressFields {
        AddressFields {
            name: self.name.clone(),
            nickname: self.nickname.clone(),
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zipcode: self.zipcode.clone(),
        }
    }

    /// Copy every editable field from `fields` onto this address.
    pub fn apply(&mut self, fields: &AddressFields) {
        self.name.clone_from(&fields.name);
        self.nickname.clone_from(&fields.nickname);
        self.street.clone_from(&fields.street);
        self.city.clone_from(&fields.city);
        self.state.clone_from(&fields.state);
        self.zipcode.clone_from(&fields.zipcode);
    }
}

/// The editable portion of an address, used for new entries and as the
/// working copy of an edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub name: String,
    pub nickname: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

impl AddressFields {
    /// Builder-style constructor for a complete postal record.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zipcode: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            nickname: None,
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zipcode: zipcode.into(),
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.set(EditField::Nickname, nickname);
        self
    }

    /// Current value of one field; an unset nickname reads as `""`.
    #[must_use]
    pub fn get(&self, field: EditField) -> &str {
        match field {
            EditField::Name => &self.name,
            EditField::Nickname => self.nickname.as_deref().unwrap_or(""),
            EditField::Street => &self.street,
            EditField::City => &self.city,
            EditField::State => &self.state,
            EditField::Zipcode => &self.zipcode,
        }
    }

    /// Mutable access to a text field. A missing nickname is materialized
    /// as an empty string so it can be edited in place.
    pub fn get_mut(&mut self, field: EditField) -> &mut String {
        match field {
            EditField::Name => &mut self.name,
            EditField::Nickname => self.nickname.get_or_insert_with(String::new),
            EditField::Street => &mut self.street,
            EditField::City => &mut self.city,
            EditField::State => &mut self.state,
            EditField::Zipcode => &mut self.zipcode,
        }
    }

    /// Replace one field. An empty nickname clears it.
    pub fn set(&mut self, field: EditField, value: impl Into<String>) {
        let value = value.into();
        if field == EditField::Nickname && value.is_empty() {
            self.nickname = None;
        } else {
            *self.get_mut(field) = value;
        }
    }

    /// Check the invariants enforced before anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation {
                field: EditField::Name.as_str(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Normalized copy: empty nickname collapsed to `None`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        if out.nickname.as_deref().is_some_and(str::is_empty) {
            out.nickname = None;
        }
        out
    }
}

/// The six editable fields, in dialog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditField {
    #[default]
    Name,
    Nickname,
    Street,
    City,
    State,
    Zipcode,
}

impl EditField {
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Nickname,
        Self::Street,
        Self::City,
        Self::State,
        Self::Zipcode,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Nickname => "nickname",
            Self::Street => "street",
            Self::City => "city",
            Self::State => "state",
            Self::Zipcode => "zipcode",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Name => Self::Nickname,
            Self::Nickname => Self::Street,
            Self::Street => Self::City,
            Self::City => Self::State,
            Self::State => Self::Zipcode,
            Self::Zipcode => Self::Name,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Name => Self::Zipcode,
            Self::Nickname => Self::Name,
            Self::Street => Self::Nickname,
            Self::City => Self::Street,
            Self::State => Self::City,
            Self::Zipcode => Self::State,
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
