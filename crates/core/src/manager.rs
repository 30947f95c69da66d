//! BOS slot-chain manager for one (project, system) pair.
//!
//! Every mutation follows the same path: read the authoritative document,
//! decode the chain, apply a pure operation, diff the re-encoded chain
//! against the document and write the difference in one partial update.
//! Local state is refreshed from the written result only after the write
//! succeeds, so a failed write leaves the cache untouched.

use std::sync::Arc;

use serde::Serialize;

use crate::block_name::block_name;
use crate::chain::{Chain, ChainKind, PositionedSlot};
use crate::compaction;
use crate::document;
use crate::error::CoreError;
use crate::operations::{Direction, InsertOrigin};
use crate::slot::{EquipmentSlot, SlotPatch};
use crate::sms::{self, SmsEquipment, SmsPlacement};
use crate::store::DocumentStore;
use crate::system::SystemNumber;
use crate::types::{Document, ProjectId};

/// Serializable view of one chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainView {
    pub chain: ChainKind,
    pub capacity: usize,
    pub occupied: usize,
    pub full: bool,
    pub visible: bool,
    pub slots: Vec<PositionedSlot>,
}

/// Serializable view of all chains of one system.
#[derive(Debug, Clone, Serialize)]
pub struct SystemChains {
    pub project_id: ProjectId,
    pub system: SystemNumber,
    pub chains: Vec<ChainView>,
    pub sms: SmsPlacement,
    pub visible_chains: Vec<ChainKind>,
}

fn chain_index(kind: ChainKind) -> usize {
    match kind {
        ChainKind::Main => 0,
        ChainKind::Battery1 => 1,
        ChainKind::Battery2 => 2,
        ChainKind::Backup => 3,
    }
}

pub struct ChainManager {
    store: Arc<dyn DocumentStore>,
    project_id: ProjectId,
    system: SystemNumber,
    chains: [Chain; 4],
    visible: Vec<ChainKind>,
    hydrated: bool,
}

impl ChainManager {
    /// A manager with empty chains. Call [`ChainManager::hydrate`] before
    /// reading state.
    pub fn new(store: Arc<dyn DocumentStore>, project_id: ProjectId, system: SystemNumber) -> Self {
        Self {
            store,
            project_id,
            system,
            chains: ChainKind::ALL.map(Chain::new),
            visible: Vec::new(),
            hydrated: false,
        }
    }

    /// Build and hydrate in one step.
    pub async fn load(
        store: Arc<dyn DocumentStore>,
        project_id: ProjectId,
        system: SystemNumber,
    ) -> Result<Self, CoreError> {
        let mut manager = Self::new(store, project_id, system);
        manager.hydrate().await?;
        Ok(manager)
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn system(&self) -> SystemNumber {
        self.system
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Populate every chain from the remote document.
    pub async fn hydrate(&mut self) -> Result<(), CoreError> {
        let doc = self.fetch().await?;
        self.refresh(&doc);
        self.hydrated = true;
        tracing::debug!(
            project_id = self.project_id,
            system = %self.system,
            visible = ?self.visible,
            "Hydrated BOS chains"
        );
        Ok(())
    }

    // -- Slot accessor ------------------------------------------------------

    pub fn chain(&self, kind: ChainKind) -> &Chain {
        &self.chains[chain_index(kind)]
    }

    pub fn slot(&self, kind: ChainKind, position: usize) -> Result<&EquipmentSlot, CoreError> {
        self.chain(kind).slot(position)
    }

    /// Merge `patch` into local state only. Callers persist explicitly,
    /// typically through [`ChainManager::update_slot`].
    pub fn set_slot(
        &mut self,
        kind: ChainKind,
        position: usize,
        patch: &SlotPatch,
    ) -> Result<bool, CoreError> {
        self.chains[chain_index(kind)].set_slot(position, patch)
    }

    pub fn visible_chains(&self) -> &[ChainKind] {
        &self.visible
    }

    pub fn sms_placement(&self) -> SmsPlacement {
        sms::resolve(self.chain(ChainKind::Main))
    }

    pub fn snapshot(&self) -> SystemChains {
        let chains = ChainKind::ALL
            .into_iter()
            .map(|kind| {
                let chain = self.chain(kind);
                ChainView {
                    chain: kind,
                    capacity: chain.capacity(),
                    occupied: chain.occupied_count(),
                    full: chain.is_full(),
                    visible: self.visible.contains(&kind),
                    slots: chain.positioned(),
                }
            })
            .collect();
        SystemChains {
            project_id: self.project_id,
            system: self.system,
            chains,
            sms: self.sms_placement(),
            visible_chains: self.visible.clone(),
        }
    }

    // -- Mutations ----------------------------------------------------------

    /// Open a new slot. Returns its position.
    pub async fn insert(&mut self, kind: ChainKind, origin: InsertOrigin) -> Result<usize, CoreError> {
        let system = self.system;
        let position = self
            .mutate(kind, |chain| chain.insert(system, origin))
            .await
            .inspect_err(|e| {
                if matches!(e, CoreError::ChainFull { .. }) {
                    tracing::warn!(
                        project_id = self.project_id,
                        system = %system,
                        chain = %kind,
                        "Insert rejected, chain full"
                    );
                }
            })?;
        tracing::info!(
            project_id = self.project_id,
            system = %system,
            chain = %kind,
            position,
            ?origin,
            "BOS slot opened"
        );
        Ok(position)
    }

    /// Clear a slot and compact the chain. Returns what the slot held.
    pub async fn remove(&mut self, kind: ChainKind, position: usize) -> Result<EquipmentSlot, CoreError> {
        let removed = self.mutate(kind, |chain| chain.remove(position)).await?;
        tracing::info!(
            project_id = self.project_id,
            system = %self.system,
            chain = %kind,
            position,
            equipment_type = %removed.equipment_type,
            "BOS slot removed"
        );
        Ok(removed)
    }

    /// Set the order of the occupied non-SMS slots.
    pub async fn reorder(&mut self, kind: ChainKind, order: &[usize]) -> Result<(), CoreError> {
        self.mutate(kind, |chain| chain.reorder(order)).await?;
        tracing::info!(
            project_id = self.project_id,
            system = %self.system,
            chain = %kind,
            count = order.len(),
            "BOS chain reordered"
        );
        Ok(())
    }

    /// Swap a slot with its neighbour. Returns the new position.
    pub async fn move_slot(
        &mut self,
        kind: ChainKind,
        position: usize,
        direction: Direction,
    ) -> Result<usize, CoreError> {
        let moved_to = self
            .mutate(kind, |chain| chain.move_slot(position, direction))
            .await?;
        tracing::info!(
            project_id = self.project_id,
            system = %self.system,
            chain = %kind,
            from = position,
            to = moved_to,
            "BOS slot moved"
        );
        Ok(moved_to)
    }

    /// Edit an occupied slot's picker fields.
    ///
    /// A type change recomputes the block name. Completing the slot compacts
    /// the chain into canonical order.
    pub async fn update_slot(
        &mut self,
        kind: ChainKind,
        position: usize,
        patch: &SlotPatch,
    ) -> Result<(), CoreError> {
        if patch.is_empty() {
            return Err(CoreError::Validation("No slot fields to update".to_string()));
        }
        self.mutate(kind, |chain| apply_update(chain, position, patch))
            .await?;
        tracing::info!(
            project_id = self.project_id,
            system = %self.system,
            chain = %kind,
            position,
            "BOS slot updated"
        );
        Ok(())
    }

    /// Write the SMS into the main chain. Returns its position.
    pub async fn place_sms(&mut self, equipment: &SmsEquipment) -> Result<usize, CoreError> {
        let system = self.system;
        let position = self
            .mutate(ChainKind::Main, |chain| sms::place(chain, system, equipment))
            .await?;
        tracing::info!(
            project_id = self.project_id,
            system = %system,
            position,
            make = %equipment.make,
            model = %equipment.model,
            "SMS placed"
        );
        Ok(position)
    }

    /// Remove the SMS from the main chain. Returns the position it held.
    pub async fn clear_sms(&mut self) -> Result<Option<usize>, CoreError> {
        let cleared = self.mutate(ChainKind::Main, sms::clear).await?;
        tracing::info!(
            project_id = self.project_id,
            system = %self.system,
            position = ?cleared,
            "SMS cleared"
        );
        Ok(cleared)
    }

    // -- Internals ----------------------------------------------------------

    async fn fetch(&self) -> Result<Document, CoreError> {
        self.store
            .fetch_system_details(self.project_id)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    project_id = self.project_id,
                    system = %self.system,
                    error = %e,
                    "Failed to fetch system details"
                );
            })
    }

    fn refresh(&mut self, doc: &Document) {
        self.chains = ChainKind::ALL.map(|kind| document::decode_chain(doc, self.system, kind));
        self.visible = crate::visibility::visible_chains(doc, self.system);
    }

    /// Read, apply `op` to a fresh copy of the chain, write the difference,
    /// then refresh local state from the written result.
    async fn mutate<T, F>(&mut self, kind: ChainKind, op: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Chain) -> Result<T, CoreError>,
    {
        let mut doc = self.fetch().await?;
        let mut chain = document::decode_chain(&doc, self.system, kind);
        let output = op(&mut chain)?;

        let patch = document::diff_patch(&doc, &document::encode_chain(&chain, self.system));
        if patch.is_empty() {
            tracing::debug!(
                project_id = self.project_id,
                system = %self.system,
                chain = %kind,
                "No field changes to persist"
            );
        } else {
            self.store
                .save_system_details_partial_exact(self.project_id, &patch)
                .await
                .inspect_err(|e| {
                    tracing::error!(
                        project_id = self.project_id,
                        system = %self.system,
                        chain = %kind,
                        error = %e,
                        "Failed to persist BOS chain"
                    );
                })?;
            tracing::debug!(
                project_id = self.project_id,
                system = %self.system,
                chain = %kind,
                count = patch.len(),
                "Persisted BOS fields"
            );
        }

        document::merge_patch(&mut doc, &patch);
        self.refresh(&doc);
        self.hydrated = true;
        Ok(output)
    }
}

fn apply_update(chain: &mut Chain, position: usize, patch: &SlotPatch) -> Result<(), CoreError> {
    let mut slot = chain.slot(position)?.clone();
    if slot.is_vacant() {
        return Err(CoreError::Validation(format!(
            "Position {position} of the {} chain is empty; add a slot first",
            chain.kind()
        )));
    }

    let type_changed = patch.apply_to(&mut slot);
    if chain.holds_sms(&slot) {
        if let Some(existing) = chain.sms_position().filter(|&p| p != position) {
            return Err(CoreError::Conflict(format!(
                "The {} chain already holds the SMS at position {existing}",
                chain.kind()
            )));
        }
    }
    if type_changed {
        if let Some(trigger) = slot.trigger.as_deref() {
            slot.block_name = Some(block_name(Some(trigger), &slot.equipment_type).to_string());
        }
    }

    let complete = slot.is_complete();
    chain.put_slot(position, slot)?;
    if complete {
        compaction::compact(chain);
    } else {
        sms::pin_to_end(chain);
    }
    Ok(())
}
