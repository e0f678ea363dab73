use super::{decrypt, decrypt_session_key, EncryptingKey};
use crate::{
    dummy_rng::DummyRng,
    traits::{Decryptor, EncryptingKeypair, RandomizedDecryptor},
    Result, RsaPrivateKey,
};
use rand_core::CryptoRngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

/// Decryption key for PKCS#1 v1.5 decryption as described in [RFC8017 § 7.2].
///
/// [RFC8017 § 7.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.2
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecryptingKey {
    inner: RsaPrivateKey,
}

impl DecryptingKey {
    /// Create a new decrypting key from an RSA private key.
    pub fn new(key: RsaPrivateKey) -> Self {
        Self { inner: key }
    }

    /// Recover a session key of `session_key.len()` bytes.
    ///
    /// Never fails; see [`decrypt_session_key`](super::decrypt_session_key)
    /// for what `session_key` holds when the ciphertext is invalid.
    pub fn decrypt_session_key(&self, ciphertext: &[u8], session_key: &mut [u8]) {
        decrypt_session_key::<DummyRng>(None, &self.inner, ciphertext, session_key)
    }

    /// Like [`DecryptingKey::decrypt_session_key`], blinding the private
    /// key operation with `rng`.
    pub fn decrypt_session_key_with_rng<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        ciphertext: &[u8],
        session_key: &mut [u8],
    ) {
        decrypt_session_key(Some(rng), &self.inner, ciphertext, session_key)
    }
}

impl Decryptor for DecryptingKey {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        decrypt::<DummyRng>(None, &self.inner, ciphertext)
    }
}

impl RandomizedDecryptor for DecryptingKey {
    fn decrypt_with_rng<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        decrypt(Some(rng), &self.inner, ciphertext)
    }
}

impl EncryptingKeypair for DecryptingKey {
    type EncryptingKey = EncryptingKey;
    fn encrypting_key(&self) -> EncryptingKey {
        EncryptingKey {
            inner: self.inner.to_public_key(),
        }
    }
}

impl ZeroizeOnDrop for DecryptingKey {}
