//! Canonical field to accepted header spellings.
//!
//! Alias order is priority: the resolver takes the first alias present in a
//! row, so specific spellings come before generic ones ("Nomenclature"
//! before "Description"). The first alias of each field doubles as its
//! display header on export, which keeps exported sheets re-importable.
//!
//! The table is data. New spellings come in through [`AliasTable::extend_from`]
//! (driven by the `aliases` config section), never through code branches.

use std::collections::BTreeMap;

use tally_core::enums::Field;

use crate::error::AliasError;

const BUILTIN: &[(Field, &[&str])] = &[
    (
        Field::Nomenclature,
        &["Nomenclature", "Item Name", "Item Description", "Name", "Item", "Description"],
    ),
    (
        Field::LineItemNumber,
        &["LIN", "Line Item Number", "LineItemNumber", "Line Item", "LIN Number"],
    ),
    (
        Field::StockNumber,
        &["NSN", "Stock Number", "StockNumber", "National Stock Number", "NIIN", "Part Number"],
    ),
    (
        Field::UnitOfIssue,
        &["UI", "Unit of Issue", "UnitOfIssue", "U/I", "Unit"],
    ),
    (
        Field::QuantityAuthorized,
        &["Qty Authorized", "Quantity Authorized", "QuantityAuthorized", "Auth Qty", "Authorized", "Auth"],
    ),
    (
        Field::QuantityOnHand,
        &["Qty On Hand", "Quantity On Hand", "QuantityOnHand", "OH Qty", "On Hand", "OH", "Quantity", "Qty"],
    ),
    (
        Field::QuantityShort,
        &["Qty Short", "Quantity Short", "QuantityShort", "Shortage", "Short"],
    ),
    (
        Field::IsFlagged,
        &["Flag", "Flagged", "IsFlagged", "Highlight", "Marked"],
    ),
    (Field::Notes, &["Notes", "Remarks", "Comments", "Note"]),
    (
        Field::LastVerifiedAt,
        &["Last Verified", "Last Verified At", "LastVerifiedAt", "Date Verified", "Verified", "Inventory Date"],
    ),
    (
        Field::SerialNumber,
        &["Serial Number", "SerialNumber", "Serial", "Serial No", "S/N", "SN"],
    ),
    (
        Field::Location,
        &["Location", "Storage Location", "Loc", "Bin"],
    ),
    (
        Field::ConditionCode,
        &["Condition Code", "ConditionCode", "CC", "Condition"],
    ),
];

/// Aliases of one field, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    pub field: Field,
    pub aliases: Vec<String>,
}

/// Ordered alias lists for every importable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<FieldAliases>,
}

impl AliasTable {
    /// The built-in spellings.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(field, aliases)| FieldAliases {
                    field: *field,
                    aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Append extra spellings, keyed by snake_case field name, after the
    /// existing aliases of each field. Spellings already present
    /// (case-insensitively) are skipped.
    pub fn extend_from(&mut self, extra: &BTreeMap<String, Vec<String>>) -> Result<(), AliasError> {
        for (name, spellings) in extra {
            let field =
                Field::from_name(name).ok_or_else(|| AliasError::UnknownField(name.clone()))?;
            let entry = self
                .entries
                .iter_mut()
                .find(|e| e.field == field)
                .ok_or_else(|| AliasError::NotImportable(name.clone()))?;
            for spelling in spellings {
                let spelling = spelling.trim();
                if spelling.is_empty()
                    || entry.aliases.iter().any(|a| a.eq_ignore_ascii_case(spelling))
                {
                    continue;
                }
                entry.aliases.push(spelling.to_string());
            }
        }
        Ok(())
    }

    /// Builder-style [`AliasTable::extend_from`].
    pub fn with_extra(mut self, extra: &BTreeMap<String, Vec<String>>) -> Result<Self, AliasError> {
        self.extend_from(extra)?;
        Ok(self)
    }

    /// Aliases of `field` in priority order. Empty for fields that are never
    /// read from a sheet (photos).
    #[must_use]
    pub fn aliases(&self, field: Field) -> &[String] {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.aliases.as_slice())
            .unwrap_or_default()
    }

    /// The header an exporter should write for `field`.
    #[must_use]
    pub fn display_header(&self, field: Field) -> Option<&str> {
        self.aliases(field).first().map(String::as_str)
    }

    /// Canonical field to display header, for every importable field in
    /// canonical order.
    #[must_use]
    pub fn display_headers(&self) -> Vec<(Field, &str)> {
        Field::ALL
            .into_iter()
            .filter_map(|f| self.display_header(f).map(|h| (f, h)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldAliases> {
        self.entries.iter()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_field_but_photos_is_importable() {
        let table = AliasTable::builtin();
        for field in Field::ALL {
            assert_eq!(
                table.aliases(field).is_empty(),
                field == Field::Photos,
                "{field}"
            );
        }
    }

    #[test]
    fn no_alias_is_shared_between_fields() {
        let table = AliasTable::builtin();
        let mut seen = BTreeMap::new();
        for entry in table.iter() {
            for alias in &entry.aliases {
                let previous = seen.insert(alias.to_lowercase(), entry.field);
                assert_eq!(previous, None, "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn display_header_is_first_alias() {
        let table = AliasTable::builtin();
        assert_eq!(table.display_header(Field::LineItemNumber), Some("LIN"));
        assert_eq!(table.display_header(Field::Photos), None);
        assert_eq!(table.display_headers()[0], (Field::Nomenclature, "Nomenclature"));
    }

    #[test]
    fn extra_aliases_append_at_lowest_priority() {
        let extra = BTreeMap::from([(
            "line_item_number".to_string(),
            vec!["Ln Itm".to_string(), "lin".to_string()],
        )]);
        let table = AliasTable::builtin().with_extra(&extra).unwrap();
        let aliases = table.aliases(Field::LineItemNumber);
        assert_eq!(aliases.first().map(String::as_str), Some("LIN"));
        assert_eq!(aliases.last().map(String::as_str), Some("Ln Itm"));
        assert_eq!(
            aliases.iter().filter(|a| a.eq_ignore_ascii_case("lin")).count(),
            1
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let extra = BTreeMap::from([("colour".to_string(), vec!["Color".to_string()])]);
        assert_eq!(
            AliasTable::builtin().extend_from(&extra),
            Err(AliasError::UnknownField("colour".to_string()))
        );

        let photos = BTreeMap::from([("photos".to_string(), vec!["Pics".to_string()])]);
        assert_eq!(
            AliasTable::builtin().extend_from(&photos),
            Err(AliasError::NotImportable("photos".to_string()))
        );
    }
}
