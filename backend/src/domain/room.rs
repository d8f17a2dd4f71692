//! Bookable rooms.

use chrono::{DateTime, Utc};

pub use super::ids::RoomId;

/// Maximum number of characters in a room name.
pub const ROOM_NAME_MAX: usize = 100;

/// Validation errors for room fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomValidationError {
    #[error("Le nom de la salle est obligatoire")]
    EmptyName,
    #[error("Le nom de la salle ne doit pas dépasser {max} caractères")]
    NameTooLong { max: usize },
    #[error("La capacité de la salle doit être un entier positif")]
    NonPositiveCapacity,
    #[error("Les équipements de la salle ne peuvent pas être vides")]
    EmptyEquipment { index: usize },
}

impl RoomValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::NonPositiveCapacity => "capacity",
            Self::EmptyEquipment { .. } => "equipment",
        }
    }

    /// Machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::NameTooLong { .. } => "name_too_long",
            Self::NonPositiveCapacity => "non_positive_capacity",
            Self::EmptyEquipment { .. } => "empty_equipment",
        }
    }
}

/// Trimmed, non-empty room name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomName(String);

impl RoomName {
    /// Validate and construct a room name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RoomValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RoomValidationError::EmptyName);
        }
        if trimmed.chars().count() > ROOM_NAME_MAX {
            return Err(RoomValidationError::NameTooLong { max: ROOM_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RoomName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Number of seats in a room. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Capacity(i32);

impl Capacity {
    /// Validate a capacity coming from an untrusted signed source.
    ///
    /// # Examples
    /// ```
    /// use roombook::domain::Capacity;
    ///
    /// assert_eq!(Capacity::new(12).map(|c| c.get()), Ok(12));
    /// assert!(Capacity::new(0).is_err());
    /// assert!(Capacity::new(-3).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self, RoomValidationError> {
        i32::try_from(value)
            .ok()
            .filter(|seats| *seats > 0)
            .map(Self)
            .ok_or(RoomValidationError::NonPositiveCapacity)
    }

    /// Number of seats.
    pub const fn get(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Number of seats as stored in an `INTEGER` column.
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

/// Ordered list of equipment tags. Order is preserved as given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Equipment(Vec<String>);

impl Equipment {
    /// Trim every tag and reject blank ones.
    pub fn new<I, S>(items: I) -> Result<Self, RoomValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let trimmed = item.as_ref().trim();
                if trimmed.is_empty() {
                    Err(RoomValidationError::EmptyEquipment { index })
                } else {
                    Ok(trimmed.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Borrow the tags.
    pub fn as_slice(&self) -> &[String] {
        self.0.as_slice()
    }
}

/// Validated room attributes, used for both creation and full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDraft {
    pub name: RoomName,
    pub capacity: Capacity,
    pub equipment: Equipment,
}

impl RoomDraft {
    /// Validate raw room attributes in one go.
    pub fn try_from_parts<S: AsRef<str>>(
        name: &str,
        capacity: i64,
        equipment: &[S],
    ) -> Result<Self, RoomValidationError> {
        Ok(Self {
            name: RoomName::new(name)?,
            capacity: Capacity::new(capacity)?,
            equipment: Equipment::new(equipment)?,
        })
    }
}

/// Persisted room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub capacity: Capacity,
    pub equipment: Equipment,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Build a new room from a draft, stamping both timestamps with `now`.
    pub fn create(id: RoomId, draft: RoomDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            capacity: draft.capacity,
            equipment: draft.equipment,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the mutable attributes and refresh `updated_at`.
    #[must_use]
    pub fn apply(self, draft: RoomDraft, now: DateTime<Utc>) -> Self {
        Self {
            name: draft.name,
            capacity: draft.capacity,
            equipment: draft.equipment,
            updated_at: now,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(i64::from(u32::MAX) + 1)]
    fn capacity_rejects_out_of_range(#[case] value: i64) {
        assert_eq!(
            Capacity::new(value),
            Err(RoomValidationError::NonPositiveCapacity)
        );
    }

    #[rstest]
    fn equipment_keeps_order_and_trims() {
        let equipment = Equipment::new([" projecteur", "tableau blanc ", "visio"]).expect("valid");
        assert_eq!(
            equipment.as_slice(),
            ["projecteur", "tableau blanc", "visio"]
        );
    }

    #[rstest]
    fn equipment_reports_blank_index() {
        assert_eq!(
            Equipment::new(["projecteur", "  "]),
            Err(RoomValidationError::EmptyEquipment { index: 1 })
        );
    }

    #[rstest]
    fn apply_refreshes_updated_at_only() {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).single().expect("ts");
        let later = Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).single().expect("ts");
        let draft = RoomDraft::try_from_parts("Salle A", 10, &["visio"]).expect("draft");
        let room = Room::create(RoomId::random(), draft, created);

        let changed = RoomDraft::try_from_parts("Salle B", 4, &[] as &[&str]).expect("draft");
        let updated = room.clone().apply(changed, later);

        assert_eq!(updated.id, room.id);
        assert_eq!(updated.name.as_ref(), "Salle B");
        assert_eq!(updated.capacity.get(), 4);
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.updated_at, later);
    }
}
