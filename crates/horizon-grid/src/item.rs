//! Display payloads painted into menu cells.
//!
//! Building the cosmetic side of an item (translated names, colour codes,
//! textures) is left to the host. The engine only needs a material key, a
//! quantity it can increment or decrement, and some text to show.

/// The content painted into one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayItem {
    material: String,
    amount: u32,
    name: Option<String>,
    lore: Vec<String>,
}

impl DisplayItem {
    /// Largest stack size a cell can show.
    pub const MAX_AMOUNT: u32 = 64;

    /// Create a single item of `material`.
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            amount: 1,
            name: None,
            lore: Vec::new(),
        }
    }

    /// Set the quantity, clamped to `1..=MAX_AMOUNT`.
    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount.clamp(1, Self::MAX_AMOUNT);
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a lore line.
    pub fn with_lore_line(mut self, line: impl Into<String>) -> Self {
        self.lore.push(line.into());
        self
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn lore(&self) -> &[String] {
        &self.lore
    }

    /// One more of the same item, saturating at [`Self::MAX_AMOUNT`].
    pub fn incremented(&self) -> Self {
        let mut next = self.clone();
        next.amount = (self.amount + 1).min(Self::MAX_AMOUNT);
        next
    }

    /// One fewer of the same item, or `None` when the stack would be empty.
    pub fn decremented(&self) -> Option<Self> {
        if self.amount <= 1 {
            return None;
        }
        let mut next = self.clone();
        next.amount -= 1;
        Some(next)
    }
}
