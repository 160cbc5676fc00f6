//! Protected CRM records and the table layouts the bulk filter targets.

use serde::{Deserialize, Serialize};

/// The two attributes of a CRM record that drive visibility.
///
/// An empty owner or territory string is treated the same as an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub owner: Option<String>,
    pub territory: Option<String>,
}

impl Record {
    pub fn new(owner: Option<&str>, territory: Option<&str>) -> Self {
        Self {
            owner: owner.map(str::to_string),
            territory: territory.map(str::to_string),
        }
    }

    pub fn owned_by(owner: &str) -> Self {
        Self::new(Some(owner), None)
    }

    pub fn unassigned_in(territory: &str) -> Self {
        Self::new(None, Some(territory))
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref().filter(|o| !o.is_empty())
    }

    pub fn territory(&self) -> Option<&str> {
        self.territory.as_deref().filter(|t| !t.is_empty())
    }
}

/// Table and column names of a record type that carries an owner and a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub territory_column: &'static str,
}

impl RecordSchema {
    pub const LEAD: RecordSchema = RecordSchema {
        table: "leads",
        owner_column: "lead_owner",
        territory_column: "territory",
    };

    pub const OPPORTUNITY: RecordSchema = RecordSchema {
        table: "opportunities",
        owner_column: "opportunity_owner",
        territory_column: "territory",
    };

    pub const QUOTATION: RecordSchema = RecordSchema {
        table: "quotations",
        owner_column: "quotation_owner",
        territory_column: "territory",
    };

    pub const CUSTOMER: RecordSchema = RecordSchema {
        table: "customers",
        owner_column: "account_manager",
        territory_column: "territory",
    };

    /// Quoted `"table"."owner"` reference.
    pub fn owner_ref(&self) -> String {
        format!("\"{}\".\"{}\"", self.table, self.owner_column)
    }

    /// Quoted `"table"."territory"` reference.
    pub fn territory_ref(&self) -> String {
        format!("\"{}\".\"{}\"", self.table, self.territory_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_count_as_absent() {
        let record = Record::new(Some(""), Some(""));
        assert_eq!(record.owner(), None);
        assert_eq!(record.territory(), None);
    }

    #[test]
    fn schema_references_are_quoted() {
        assert_eq!(RecordSchema::LEAD.owner_ref(), "\"leads\".\"lead_owner\"");
        assert_eq!(
            RecordSchema::OPPORTUNITY.territory_ref(),
            "\"opportunities\".\"territory\""
        );
    }
}
