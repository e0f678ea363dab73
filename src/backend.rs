//! Accelerated backends for the raw RSA exponentiations.
//!
//! A backend imports the mathematical material of a key once and hands back an
//! opaque [`BackendKey`]. Keys import lazily, on their first operation, and
//! keep the result in a per-key slot shared by every thread using that key.
//! Creating a handle never blocks other callers: racing creators each build
//! one, exactly one is installed and the rest are released immediately.
//!
//! Backend failures are never surfaced by the padding schemes. A failed
//! import, a failed operation or a private-key result that does not
//! re-encrypt to its input all fall back to the portable implementation, so
//! every operation produces the same bytes with or without a backend.
//!
//! A handle is released when the [`BackendKey`] is dropped. That happens once
//! per handle: after the key that owns it is dropped or
//! [cleared](crate::RsaPrivateKey::clear_backend_handle), as soon as the last
//! operation still using it returns.
//!
//! # Selecting a backend
//!
//! Keys use, in order of preference, the backend given to
//! [`RsaPublicKey::with_backend`](crate::RsaPublicKey::with_backend) or
//! [`RsaPrivateKey::with_backend`](crate::RsaPrivateKey::with_backend), then
//! the process-wide backend registered with [`install`]. Without either
//! every operation takes the portable path.

mod cache;

pub(crate) use self::cache::HandleCache;

use std::sync::{Arc, OnceLock};

use num_bigint::BigUint;

use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};

/// Provider of accelerated RSA key objects.
pub trait RsaBackend: Send + Sync {
    /// Short name used in log records.
    fn name(&self) -> &str;

    /// Import a public key. The returned object only needs to support
    /// [`BackendKey::public_op`].
    fn new_public_key(&self, key: &RsaPublicKey) -> Result<Box<dyn BackendKey>>;

    /// Import a private key.
    fn new_private_key(&self, key: &RsaPrivateKey) -> Result<Box<dyn BackendKey>>;
}

/// Backend-side key state. Dropping it releases the backend resources.
pub trait BackendKey: Send + Sync {
    /// Compute `m^e mod n`.
    fn public_op(&self, m: &BigUint) -> Result<BigUint>;

    /// Compute `c^d mod n`.
    fn private_op(&self, c: &BigUint) -> Result<BigUint>;
}

static INSTALLED: OnceLock<Arc<dyn RsaBackend>> = OnceLock::new();

/// Register the process-wide backend.
///
/// Only one backend can be installed per process; later calls fail with
/// [`Error::BackendAlreadyInstalled`]. Keys that already hold a handle keep
/// using it.
pub fn install(backend: Arc<dyn RsaBackend>) -> Result<()> {
    let name = backend.name().to_owned();
    INSTALLED
        .set(backend)
        .map_err(|_| Error::BackendAlreadyInstalled)?;
    log::debug!("installed process-wide RSA backend `{name}`");
    Ok(())
}

/// The process-wide backend, if one was installed.
pub fn installed() -> Option<Arc<dyn RsaBackend>> {
    INSTALLED.get().cloned()
}
