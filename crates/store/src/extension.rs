//! Extension records.

use coinstash_log::{log_debug, log_info, log_warn};
use coinstash_wallet::{Wallet, WalletProtectExtension};

use crate::error::WalletStoreError;
use crate::proto;

pub(crate) fn write_extensions(wallet: &Wallet) -> Vec<proto::Extension> {
    wallet
        .extensions()
        .map(|extension| proto::Extension {
            id: extension.id().to_string(),
            data: extension.serialize(),
            mandatory: extension.is_mandatory(),
        })
        .collect()
}

/// Hands each stored payload to the registered extension with the same id.
///
/// A registered extension that rejects its payload is left as registered.
/// An unregistered mandatory extension makes the wallet unreadable, except
/// for the wallet-protect markers, which are re-registered with their stored
/// flag so they survive a later save.
pub(crate) fn read_extensions(
    wallet: &mut Wallet,
    records: &[proto::Extension],
) -> Result<(), WalletStoreError> {
    for record in records {
        let id = record.id.as_str();
        if let Some(extension) = wallet.extension_mut(id) {
            log_info!("Loading wallet extension {id}");
            if let Err(err) = extension.deserialize(&record.data) {
                log_warn!("failed to load wallet extension {id}: {err}");
            }
            continue;
        }
        if let Some(marker) = WalletProtectExtension::with_legacy_id(id) {
            log_info!("wallet carries protection marker {id}");
            wallet.add_extension(Box::new(marker.with_mandatory(record.mandatory)));
            continue;
        }
        if record.mandatory {
            return Err(WalletStoreError::UnknownMandatoryExtension(record.id.clone()));
        }
        log_debug!("ignoring unknown optional wallet extension {id}");
    }
    Ok(())
}
