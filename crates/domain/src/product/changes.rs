/// Persistable fields of the product aggregate.
///
/// A closed set known at compile time; the change tracker and the partial
/// update builder are both indexed by it, so there are no stringly-typed
/// field keys anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProductField {
    Name,
    Description,
    Category,
    BasePrice,
    Discount,
    Status,
    ArchivedAt,
    UpdatedAt,
}

impl ProductField {
    /// All tracked fields, in persistence column order.
    pub const ALL: [ProductField; 8] = [
        ProductField::Name,
        ProductField::Description,
        ProductField::Category,
        ProductField::BasePrice,
        ProductField::Discount,
        ProductField::Status,
        ProductField::ArchivedAt,
        ProductField::UpdatedAt,
    ];

    const fn bit(self) -> u16 {
        1 << self as u8
    }
}

/// Set of dirty fields for one in-memory aggregate instance.
///
/// Fields are only ever added: there is no mark-clean operation. A tracker
/// starts empty at reconstruction and lives exactly as long as the instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    dirty: u16,
}

impl ChangeTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a field dirty. Idempotent.
    pub fn mark_dirty(&mut self, field: ProductField) {
        self.dirty |= field.bit();
    }

    /// Returns true if the field has been marked dirty.
    pub fn dirty(&self, field: ProductField) -> bool {
        self.dirty & field.bit() != 0
    }

    /// Returns true if no field is dirty.
    pub fn is_empty(&self) -> bool {
        self.dirty == 0
    }
}
