use pixelplace_shared::Pubkey;

/// What the replica knows about one shard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShardRecord {
    owner: Option<Pubkey>,
    pixel_count: u32,
}

impl ShardRecord {
    pub fn new(owner: Option<Pubkey>) -> Self {
        Self {
            owner,
            pixel_count: 0,
        }
    }

    /// Who initialized the shard, once known
    pub fn owner(&self) -> Option<Pubkey> {
        self.owner
    }

    /// Painted pixels currently displayed in the shard
    pub fn pixel_count(&self) -> u32 {
        self.pixel_count
    }

    pub(crate) fn set_owner(&mut self, owner: Option<Pubkey>) {
        self.owner = owner;
    }

    pub(crate) fn add_painted(&mut self) {
        self.pixel_count += 1;
    }

    pub(crate) fn remove_painted(&mut self) {
        self.pixel_count = self.pixel_count.saturating_sub(1);
    }
}
