//! The fixed category table.
//!
//! Every owner has exactly one entry per [`CategoryKey`]; entries are never
//! added or removed, only their amounts change. `remaining` is not stored, it
//! is always `allocated - spent`.

use std::fmt;

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

/// Band a category belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Essential,
    Lifestyle,
    Other,
}

impl CategoryGroup {
    pub const ALL: [CategoryGroup; 3] = [Self::Essential, Self::Lifestyle, Self::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Essential => "essential",
            Self::Lifestyle => "lifestyle",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the 13 spending categories.
///
/// The discriminant is the position in [`CategoryTable`], so the declaration
/// order is part of the storage contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryKey {
    #[serde(rename = "food")]
    Food,
    #[serde(rename = "water/gallon")]
    WaterGallon,
    #[serde(rename = "electricity/token")]
    ElectricityToken,
    #[serde(rename = "laundry")]
    Laundry,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "supplies")]
    Supplies,
    #[serde(rename = "skincare")]
    Skincare,
    #[serde(rename = "fashion")]
    Fashion,
    #[serde(rename = "snacks/hangouts")]
    SnacksHangouts,
    #[serde(rename = "self-reward")]
    SelfReward,
    #[serde(rename = "medicine/vitamins")]
    MedicineVitamins,
    #[serde(rename = "college-assignments")]
    CollegeAssignments,
    #[serde(rename = "emergency-fund")]
    EmergencyFund,
}

impl CategoryKey {
    pub const COUNT: usize = 13;

    pub const ALL: [CategoryKey; Self::COUNT] = [
        Self::Food,
        Self::WaterGallon,
        Self::ElectricityToken,
        Self::Laundry,
        Self::Transport,
        Self::Supplies,
        Self::Skincare,
        Self::Fashion,
        Self::SnacksHangouts,
        Self::SelfReward,
        Self::MedicineVitamins,
        Self::CollegeAssignments,
        Self::EmergencyFund,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire/storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::WaterGallon => "water/gallon",
            Self::ElectricityToken => "electricity/token",
            Self::Laundry => "laundry",
            Self::Transport => "transport",
            Self::Supplies => "supplies",
            Self::Skincare => "skincare",
            Self::Fashion => "fashion",
            Self::SnacksHangouts => "snacks/hangouts",
            Self::SelfReward => "self-reward",
            Self::MedicineVitamins => "medicine/vitamins",
            Self::CollegeAssignments => "college-assignments",
            Self::EmergencyFund => "emergency-fund",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::WaterGallon => "Water/Gallon",
            Self::ElectricityToken => "Electricity/Token",
            Self::Laundry => "Laundry",
            Self::Transport => "Transport",
            Self::Supplies => "Supplies",
            Self::Skincare => "Skincare",
            Self::Fashion => "Fashion",
            Self::SnacksHangouts => "Snacks/Hangouts",
            Self::SelfReward => "Self Reward",
            Self::MedicineVitamins => "Medicine/Vitamins",
            Self::CollegeAssignments => "College Assignments",
            Self::EmergencyFund => "Emergency Fund",
        }
    }

    pub fn group(self) -> CategoryGroup {
        match self {
            Self::Food
            | Self::WaterGallon
            | Self::ElectricityToken
            | Self::Laundry
            | Self::Transport
            | Self::Supplies => CategoryGroup::Essential,
            Self::Skincare | Self::Fashion | Self::SnacksHangouts | Self::SelfReward => {
                CategoryGroup::Lifestyle
            }
            Self::MedicineVitamins | Self::CollegeAssignments | Self::EmergencyFund => {
                CategoryGroup::Other
            }
        }
    }

    /// Exact-match lookup on the key (`emergency-fund`) or on the label
    /// (`Emergency Fund`). Clients send either form.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == name || key.label() == name)
    }
}

impl TryFrom<&str> for CategoryKey {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_name(value).ok_or_else(|| EngineError::UnknownCategory(value.to_string()))
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category named by a request or stored on a ledger entry.
///
/// Names that are not part of the table are kept verbatim so the ledger can
/// still record them; reconciliation decides what to do with them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CategoryRef {
    Known(CategoryKey),
    Unknown(String),
}

impl CategoryRef {
    pub fn parse(raw: &str) -> Self {
        match CategoryKey::from_name(raw) {
            Some(key) => Self::Known(key),
            None => Self::Unknown(raw.to_string()),
        }
    }

    pub fn key(&self) -> Option<CategoryKey> {
        match self {
            Self::Known(key) => Some(*key),
            Self::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(key) => key.as_str(),
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<CategoryKey> for CategoryRef {
    fn from(key: CategoryKey) -> Self {
        Self::Known(key)
    }
}

impl From<String> for CategoryRef {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<CategoryRef> for String {
    fn from(category: CategoryRef) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allocation and running spend of one category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub key: CategoryKey,
    pub allocated: i64,
    pub spent: i64,
}

impl CategoryEntry {
    pub fn new(key: CategoryKey) -> Self {
        Self {
            key,
            allocated: 0,
            spent: 0,
        }
    }

    pub fn group(&self) -> CategoryGroup {
        self.key.group()
    }

    pub fn remaining(&self) -> i64 {
        self.allocated - self.spent
    }
}

/// Ordered, fixed-size table holding one [`CategoryEntry`] per key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    entries: [CategoryEntry; CategoryKey::COUNT],
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryTable {
    /// All 13 categories with zero allocation and zero spend.
    pub fn new() -> Self {
        Self {
            entries: CategoryKey::ALL.map(CategoryEntry::new),
        }
    }

    pub fn get(&self, key: CategoryKey) -> &CategoryEntry {
        &self.entries[key.index()]
    }

    fn get_mut(&mut self, key: CategoryKey) -> &mut CategoryEntry {
        &mut self.entries[key.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    pub fn group(&self, group: CategoryGroup) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter().filter(move |entry| entry.group() == group)
    }

    /// Adds `amount_minor` to the category's `spent`.
    ///
    /// Fails without touching the table when the category or the table total
    /// would leave the `i64` range.
    pub fn record_spend(&mut self, key: CategoryKey, amount_minor: i64) -> ResultEngine<()> {
        let amount = Money::new(amount_minor);
        let spent = Money::new(self.get(key).spent)
            .checked_add(amount)
            .ok_or_else(EngineError::amount_out_of_range)?;
        Money::new(self.total_spent())
            .checked_add(amount)
            .ok_or_else(EngineError::amount_out_of_range)?;
        self.get_mut(key).spent = spent.minor();
        Ok(())
    }

    /// Gives `amount_minor` back to the category.
    ///
    /// `spent` never goes below zero. When the restore would overshoot, the
    /// clamped-away part is returned so the caller can report the drift.
    pub fn restore_spend(
        &mut self,
        key: CategoryKey,
        amount_minor: i64,
    ) -> ResultEngine<Option<i64>> {
        let entry = self.get_mut(key);
        let next = Money::new(entry.spent)
            .checked_sub(Money::new(amount_minor))
            .ok_or_else(EngineError::amount_out_of_range)?
            .minor();
        if next < 0 {
            let excess = next
                .checked_neg()
                .ok_or_else(EngineError::amount_out_of_range)?;
            entry.spent = 0;
            Ok(Some(excess))
        } else {
            entry.spent = next;
            Ok(None)
        }
    }

    pub fn set_allocation(&mut self, key: CategoryKey, amount_minor: i64) {
        self.get_mut(key).allocated = amount_minor;
    }

    pub fn set_spent(&mut self, key: CategoryKey, amount_minor: i64) {
        self.get_mut(key).spent = amount_minor;
    }

    /// Sum of `spent` over the table, saturating at the `i64` bounds.
    pub fn total_spent(&self) -> i64 {
        self.entries
            .iter()
            .fold(0i64, |total, entry| total.saturating_add(entry.spent))
    }
}

/// One persisted row per owner and category key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub category: String,
    pub allocated: i64,
    pub spent: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget::Entity",
        from = "Column::OwnerId",
        to = "super::budget::Column::OwnerId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budget,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_entry(owner_id: &str, entry: &CategoryEntry) -> Self {
        Self {
            owner_id: ActiveValue::Set(owner_id.to_string()),
            category: ActiveValue::Set(entry.key.as_str().to_string()),
            allocated: ActiveValue::Set(entry.allocated),
            spent: ActiveValue::Set(entry.spent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_thirteen_entries_in_three_groups() {
        let table = CategoryTable::new();
        assert_eq!(table.iter().count(), 13);
        assert_eq!(table.group(CategoryGroup::Essential).count(), 6);
        assert_eq!(table.group(CategoryGroup::Lifestyle).count(), 4);
        assert_eq!(table.group(CategoryGroup::Other).count(), 3);
    }

    #[test]
    fn positions_follow_declaration_order() {
        for (i, key) in CategoryKey::ALL.into_iter().enumerate() {
            assert_eq!(key.index(), i);
            assert_eq!(CategoryTable::new().get(key).key, key);
        }
    }

    #[test]
    fn lookup_is_exact_match() {
        assert_eq!(CategoryKey::from_name("food"), Some(CategoryKey::Food));
        assert_eq!(
            CategoryKey::from_name("water/gallon"),
            Some(CategoryKey::WaterGallon)
        );
        assert_eq!(
            CategoryKey::from_name("Emergency Fund"),
            Some(CategoryKey::EmergencyFund)
        );
        assert_eq!(CategoryKey::from_name("Food "), None);
        assert_eq!(CategoryKey::from_name("FOOD"), None);
        assert_eq!(
            CategoryKey::try_from("groceries"),
            Err(EngineError::UnknownCategory("groceries".to_string()))
        );
    }

    #[test]
    fn remaining_is_derived() {
        let mut table = CategoryTable::new();
        table.set_allocation(CategoryKey::Food, 200_000);
        table.record_spend(CategoryKey::Food, 150_000).unwrap();
        assert_eq!(table.get(CategoryKey::Food).remaining(), 50_000);

        table.set_allocation(CategoryKey::Food, 100_000);
        assert_eq!(table.get(CategoryKey::Food).remaining(), -50_000);
    }

    #[test]
    fn restore_clamps_at_zero() {
        let mut table = CategoryTable::new();
        table.record_spend(CategoryKey::Fashion, 10_000).unwrap();
        assert_eq!(table.restore_spend(CategoryKey::Fashion, 4_000), Ok(None));
        assert_eq!(table.get(CategoryKey::Fashion).spent, 6_000);
        assert_eq!(
            table.restore_spend(CategoryKey::Fashion, 9_000),
            Ok(Some(3_000))
        );
        assert_eq!(table.get(CategoryKey::Fashion).spent, 0);
    }

    #[test]
    fn category_ref_keeps_unknown_names() {
        assert_eq!(
            CategoryRef::parse("laundry"),
            CategoryRef::Known(CategoryKey::Laundry)
        );
        let unknown = CategoryRef::parse("wishlist");
        assert_eq!(unknown.key(), None);
        assert_eq!(unknown.as_str(), "wishlist");
    }

    #[test]
    fn category_key_serializes_as_wire_key() {
        let json = serde_json::to_string(&CategoryKey::SnacksHangouts).unwrap();
        assert_eq!(json, "\"snacks/hangouts\"");
        let back: CategoryKey = serde_json::from_str("\"self-reward\"").unwrap();
        assert_eq!(back, CategoryKey::SelfReward);
    }
}
