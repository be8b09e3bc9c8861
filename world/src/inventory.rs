//! Shared resource counters.

use rescue_grid_core::{InventoryConfig, ResourceCost, ResourceKind};

/// Named resource counters shared by the whole squad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    tool: u32,
    water: u32,
    explosive: u32,
    medical_supply: u32,
    food: u32,
}

impl Inventory {
    pub(crate) fn from_config(config: &InventoryConfig) -> Self {
        Self {
            tool: config.tool,
            water: config.water,
            explosive: config.explosive,
            medical_supply: config.medical_supply,
            food: config.food,
        }
    }

    /// Units held of the provided resource.
    #[must_use]
    pub const fn count(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Tool => self.tool,
            ResourceKind::Water => self.water,
            ResourceKind::Explosive => self.explosive,
            ResourceKind::MedicalSupply => self.medical_supply,
            ResourceKind::Food => self.food,
        }
    }

    /// Reports whether the inventory covers the cost.
    #[must_use]
    pub fn can_afford(&self, cost: Option<ResourceCost>) -> bool {
        cost.map_or(true, |cost| self.count(cost.kind) >= cost.amount)
    }

    /// Deducts a cost previously checked with [`Inventory::can_afford`].
    pub(crate) fn spend(&mut self, cost: Option<ResourceCost>) {
        if let Some(cost) = cost {
            let slot = self.slot_mut(cost.kind);
            *slot = slot.saturating_sub(cost.amount);
        }
    }

    pub(crate) fn add(&mut self, kind: ResourceKind, amount: u32) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Tool => &mut self.tool,
            ResourceKind::Water => &mut self.water,
            ResourceKind::Explosive => &mut self.explosive,
            ResourceKind::MedicalSupply => &mut self.medical_supply,
            ResourceKind::Food => &mut self.food,
        }
    }
}
