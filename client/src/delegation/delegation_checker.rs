use async_trait::async_trait;

use pixelplace_shared::{
    constants::DELEGATION_PROGRAM_ID, shard_address, LedgerError, Pubkey, ShardAddressError,
    ShardKey,
};

use crate::client_config::ClientConfig;

/// The authoritative round-trip behind a delegation check
#[async_trait]
pub trait DelegationChecker: Send + Sync {
    /// True when the shard is bound to the ephemeral overlay
    async fn is_delegated(&self, shard: &ShardKey) -> Result<bool, LedgerError>;
}

/// Reads the owner of a ledger account
#[async_trait]
pub trait AccountOwnerSource: Send + Sync {
    /// `None` when the account does not exist
    async fn account_owner(&self, address: &Pubkey) -> Result<Option<Pubkey>, LedgerError>;
}

/// Decides delegation from the owner of the shard's account: a delegated
/// shard account is owned by the delegation program.
pub struct OwnerDelegationChecker<S: AccountOwnerSource> {
    source: S,
    program_id: Pubkey,
}

impl<S: AccountOwnerSource> OwnerDelegationChecker<S> {
    pub fn new(source: S, program_id: Pubkey) -> Self {
        Self { source, program_id }
    }

    /// Derives shard accounts from the configured canvas program
    pub fn from_config(source: S, config: &ClientConfig) -> Self {
        Self::new(source, config.program_id)
    }
}

#[async_trait]
impl<S: AccountOwnerSource> DelegationChecker for OwnerDelegationChecker<S> {
    async fn is_delegated(&self, shard: &ShardKey) -> Result<bool, LedgerError> {
        let account = shard_address(shard, &self.program_id).map_err(|err| match err {
            ShardAddressError::InvalidCoordinate(err) => LedgerError::InvalidCoordinate(err),
            other => LedgerError::Rejected {
                message: other.to_string(),
            },
        })?;
        let owner = self.source.account_owner(&account.address).await?;
        Ok(owner == Some(Pubkey::new(DELEGATION_PROGRAM_ID)))
    }
}
