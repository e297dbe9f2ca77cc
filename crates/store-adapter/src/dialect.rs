//! SQL dialect enumeration.
//!
//! Provides the `StoreDialect` enum for the two supported engine families.
//! The dialect only covers what statement generation needs: placeholder
//! syntax, NULL and literal rendering, and the session probe statement.

/// Engine family of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreDialect {
    /// Oracle-family engine
    ///
    /// Uses numbered `:n` bind placeholders.
    Oracle,
    /// MySQL-family engine
    ///
    /// Uses `?` bind placeholders and treats backslash as an escape
    /// character inside string literals.
    MySql,
}

impl StoreDialect {
    /// Bind placeholder for the 1-based parameter `position`.
    pub fn placeholder(&self, position: usize) -> String {
        match self {
            Self::Oracle => format!(":{position}"),
            Self::MySql => "?".to_string(),
        }
    }

    /// The NULL literal.
    pub fn null_literal(&self) -> &'static str {
        "NULL"
    }

    /// Render text as a quoted string literal, escaping characters that
    /// would otherwise terminate the literal.
    pub fn quote_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('\'');
        for ch in text.chars() {
            match (self, ch) {
                (_, '\'') => out.push_str("''"),
                (Self::MySql, '\\') => out.push_str("\\\\"),
                _ => out.push(ch),
            }
        }
        out.push('\'');
        out
    }

    /// Render a binary literal from its hex form.
    pub fn binary_literal(&self, hex: &str) -> String {
        match self {
            Self::Oracle => format!("HEXTORAW('{hex}')"),
            Self::MySql => format!("X'{hex}'"),
        }
    }

    /// Cheap statement used to verify a session can be established.
    pub fn probe_statement(&self) -> &'static str {
        // DUAL exists in both engine families
        "SELECT 1 FROM DUAL"
    }
}

impl std::fmt::Display for StoreDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oracle => write!(f, "oracle"),
            Self::MySql => write!(f, "mysql"),
        }
    }
}

impl std::str::FromStr for StoreDialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oracle" => Ok(Self::Oracle),
            "mysql" | "mariadb" => Ok(Self::MySql),
            _ => Err(anyhow::anyhow!(
                "Invalid dialect: '{s}'. Expected 'oracle' or 'mysql'"
            )),
        }
    }
}
