use slotmap::new_key_type;

new_key_type! {
    /// Stable identity of a molecule inside a [`MoleculeSet`](super::set::MoleculeSet).
    pub struct MoleculeId;
}
