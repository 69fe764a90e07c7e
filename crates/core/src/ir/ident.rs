#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub value: String,
    pub quoted: bool,
}

impl Ident {
    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }

    pub fn unquoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    /// Pairing key: case-folds iff unquoted, so `"Name"` and `name` stay
    /// distinguishable while `NAME` and `name` pair up.
    #[must_use]
    pub fn key(&self) -> IdentKey {
        IdentKey::from(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub schema: Option<Ident>,
    pub name: Ident,
}

impl QualifiedName {
    pub fn new(schema: Option<Ident>, name: Ident) -> Self {
        Self { schema, name }
    }

    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: Ident::unquoted(name),
        }
    }

    #[must_use]
    pub fn key(&self) -> QualifiedNameKey {
        QualifiedNameKey::from(self)
    }

    /// Key with a fallback schema applied when the name carries none.
    #[must_use]
    pub fn key_in(&self, default_schema: &str) -> QualifiedNameKey {
        QualifiedNameKey {
            schema: Some(match &self.schema {
                Some(schema) => IdentKey::from(schema),
                None => IdentKey::from(&Ident::unquoted(default_schema)),
            }),
            name: IdentKey::from(&self.name),
        }
    }
}

/// The identifier a spelling resolves to: unquoted names case-fold (the
/// server folds them), quoted names stay verbatim. `"Name"` and `name`
/// differ; `"name"`, `name`, and `NAME` are all the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IdentKey {
    value: String,
}

impl From<&Ident> for IdentKey {
    fn from(ident: &Ident) -> Self {
        if ident.quoted {
            Self {
                value: ident.value.clone(),
            }
        } else {
            Self {
                value: ident.value.to_ascii_lowercase(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct QualifiedNameKey {
    pub schema: Option<IdentKey>,
    pub name: IdentKey,
}

impl From<&QualifiedName> for QualifiedNameKey {
    fn from(name: &QualifiedName) -> Self {
        Self {
            schema: name.schema.as_ref().map(IdentKey::from),
            name: IdentKey::from(&name.name),
        }
    }
}

pub fn display_ident(ident: &Ident) -> String {
    if ident.quoted {
        format!("\"{}\"", ident.value)
    } else {
        ident.value.clone()
    }
}

pub fn display_qualified_name(name: &QualifiedName) -> String {
    match &name.schema {
        Some(schema) => format!("{}.{}", display_ident(schema), display_ident(&name.name)),
        None => display_ident(&name.name),
    }
}
