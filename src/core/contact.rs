use std::str::FromStr;

/// A contact row loaded from the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Physical 1-based row in the sheet. Row 1 holds the headers, so the
    /// first contact sits at row 2.
    pub row_index: u32,
    pub name: String,
    pub email: String,
    pub notes: String,
}

impl Contact {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Notes => &self.notes,
        }
    }

    pub fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Field values for a contact that has not been written yet, or the form
/// buffer of one being edited. Carries no row: the sheet assigns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub notes: String,
}

impl ContactDraft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            notes: notes.into(),
        }
    }

    /// A draft needs at least a name or an email to be submitted.
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }

    pub fn set(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::Name => self.name = value,
            ContactField::Email => self.email = value,
            ContactField::Notes => self.notes = value,
        }
    }

    /// Cell values in column order A, B, C.
    pub fn to_row(&self) -> [String; 3] {
        [self.name.clone(), self.email.clone(), self.notes.clone()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Notes,
}

impl FromStr for ContactField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "notes" => Ok(Self::Notes),
            other => Err(format!("unknown contact field `{}`", other)),
        }
    }
}

/// Which fields a search term is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterField {
    #[default]
    All,
    Name,
    Email,
    Notes,
}

impl FilterField {
    pub fn fields(self) -> &'static [ContactField] {
        match self {
            Self::All => &[ContactField::Name, ContactField::Email, ContactField::Notes],
            Self::Name => &[ContactField::Name],
            Self::Email => &[ContactField::Email],
            Self::Notes => &[ContactField::Notes],
        }
    }
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
            Self::Notes => write!(f, "notes"),
        }
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "notes" => Ok(Self::Notes),
            other => Err(format!("unknown filter field `{}` (all, name, email, notes)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Name,
    Email,
}

impl SortField {
    pub fn as_field(self) -> ContactField {
        match self {
            Self::Name => ContactField::Name,
            Self::Email => ContactField::Email,
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            other => Err(format!("unknown sort field `{}` (name, email)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}
