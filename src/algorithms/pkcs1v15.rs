//! PKCS#1 v1.5 block formatting, shared by the encryption and signature
//! operations in [`crate::pkcs1v15`].
//!
//! Every parser here scans the whole block and reports a single outcome, so
//! callers never learn which part of a malformed block was wrong.

use const_oid::AssociatedOid;
use digest::Digest;
use rand_core::CryptoRngCore;
use subtle::{
    Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater, ConstantTimeLess,
};
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Fills the provided slice with random values, which are guaranteed
/// to not be zero.
#[inline]
fn non_zero_random_bytes<R: CryptoRngCore + ?Sized>(rng: &mut R, data: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(data).map_err(|_| Error::Rng)?;

    for el in data {
        while *el == 0u8 {
            rng.try_fill_bytes(core::slice::from_mut(el))
                .map_err(|_| Error::Rng)?;
        }
    }

    Ok(())
}

/// Applied the padding scheme from PKCS#1 v1.5 for encryption.  The message must be no longer than
/// the length of the public modulus minus 11 bytes.
pub(crate) fn pkcs1v15_encrypt_pad<R>(
    rng: &mut R,
    msg: &[u8],
    k: usize,
) -> Result<Zeroizing<Vec<u8>>>
where
    R: CryptoRngCore + ?Sized,
{
    if msg.len() + 11 > k {
        return Err(Error::MessageTooLong);
    }

    // EM = 0x00 || 0x02 || PS || 0x00 || M
    let mut em = Zeroizing::new(vec![0u8; k]);
    em[1] = 2;
    non_zero_random_bytes(rng, &mut em[2..k - msg.len() - 1])?;
    em[k - msg.len() - 1] = 0;
    em[k - msg.len()..].copy_from_slice(msg);
    Ok(em)
}

/// Removes the encryption padding scheme from PKCS#1 v1.5.
///
/// Note that whether this function returns an error or not discloses secret
/// information. If an attacker can cause this function to run repeatedly and
/// learn whether each instance returned an error then they can decrypt and
/// forge signatures as if they had the private key. See
/// `decrypt_session_key` for a way of solving this problem.
#[inline]
pub(crate) fn pkcs1v15_encrypt_unpad(em: &[u8], k: usize) -> Result<Vec<u8>> {
    let (valid, index) = decrypt_inner(em, k)?;
    if valid.unwrap_u8() == 0 {
        return Err(Error::Decryption);
    }

    Ok(em[index as usize..].to_vec())
}

/// Writes the payload of `em` into `key` if it is a valid encryption block
/// carrying exactly `key.len()` bytes, and `filler` otherwise.
///
/// The choice is made in constant time and is not reported.
pub(crate) fn pkcs1v15_session_key_select(
    em: &[u8],
    k: usize,
    filler: &[u8],
    key: &mut [u8],
) -> Result<()> {
    if filler.len() != key.len() || key.len() > k {
        return Err(Error::InvalidArguments);
    }

    let (valid, index) = decrypt_inner(em, k)?;
    let valid = valid & (k as u32 - index).ct_eq(&(key.len() as u32));

    let payload = &em[k - key.len()..];
    for ((out, fill), byte) in key.iter_mut().zip(filler).zip(payload) {
        *out = u8::conditional_select(fill, byte, valid);
    }

    Ok(())
}

/// Removes the PKCS1v15 padding. It returns a choice that indicates whether
/// the plaintext was correctly structured: block type 2, at least 8 bytes of
/// non-zero padding and a non-empty message. If it was, the index points at
/// the first byte of the message; otherwise it is zero. The whole block is
/// scanned either way to keep memory access patterns independent of validity.
#[inline]
fn decrypt_inner(em: &[u8], k: usize) -> Result<(Choice, u32)> {
    if k < 11 || em.len() != k {
        return Err(Error::Decryption);
    }

    let first_byte_is_zero = em[0].ct_eq(&0u8);
    let second_byte_is_two = em[1].ct_eq(&2u8);

    // The remainder of the plaintext must be a string of non-zero random
    // octets, followed by a 0, followed by the message.
    //   looking_for_index: 1 iff we are still looking for the zero.
    //   index: the offset of the first zero byte.
    let mut looking_for_index = 1u8;
    let mut index = 0u32;

    for (i, el) in em.iter().enumerate().skip(2) {
        let equals0 = el.ct_eq(&0u8);
        index.conditional_assign(&(i as u32), Choice::from(looking_for_index) & equals0);
        looking_for_index.conditional_assign(&0u8, equals0);
    }

    // The PS padding must be at least 8 bytes long, and it starts two
    // bytes into em.
    let valid_ps = index.ct_gt(&9);
    // The separator may not be the last byte.
    let has_message = index.ct_lt(&(k as u32 - 1));

    let valid = first_byte_is_zero
        & second_byte_is_two
        & Choice::from(!looking_for_index & 1)
        & valid_ps
        & has_message;
    index = u32::conditional_select(&0, &(index + 1), valid);

    Ok((valid, index))
}

#[inline]
pub(crate) fn pkcs1v15_sign_pad(prefix: &[u8], hashed: &[u8], k: usize) -> Result<Vec<u8>> {
    let hash_len = hashed.len();
    let t_len = prefix.len() + hashed.len();
    if k < t_len + 11 {
        return Err(Error::MessageTooLong);
    }

    // EM = 0x00 || 0x01 || PS || 0x00 || T
    let mut em = vec![0xff; k];
    em[0] = 0;
    em[1] = 1;
    em[k - t_len - 1] = 0;
    em[k - t_len..k - hash_len].copy_from_slice(prefix);
    em[k - hash_len..k].copy_from_slice(hashed);

    Ok(em)
}

/// Checks `em` against the block [`pkcs1v15_sign_pad`] builds, in constant
/// time. Every mismatch is the same [`Error::Verification`].
#[inline]
pub(crate) fn pkcs1v15_sign_unpad(prefix: &[u8], hashed: &[u8], em: &[u8], k: usize) -> Result<()> {
    let hash_len = hashed.len();
    let t_len = prefix.len() + hashed.len();
    if k < t_len + 11 || em.len() != k {
        return Err(Error::Verification);
    }

    // EM = 0x00 || 0x01 || PS || 0x00 || T
    let mut ok = em[0].ct_eq(&0u8);
    ok &= em[1].ct_eq(&1u8);
    ok &= em[k - hash_len..k].ct_eq(hashed);
    ok &= em[k - t_len..k - hash_len].ct_eq(prefix);
    ok &= em[k - t_len - 1].ct_eq(&0u8);

    for el in em.iter().skip(2).take(k - t_len - 3) {
        ok &= el.ct_eq(&0xff)
    }

    if ok.unwrap_u8() != 1 {
        return Err(Error::Verification);
    }

    Ok(())
}

/// prefix = 0x30 <oid_len + 8 + digest_len> 0x30 <oid_len + 4> 0x06 <oid_len> oid 0x05 0x00 0x04 <digest_len>
#[inline]
pub(crate) fn pkcs1v15_generate_prefix<D>() -> Vec<u8>
where
    D: Digest + AssociatedOid,
{
    let oid = D::OID.as_bytes();
    let oid_len = oid.len() as u8;
    let digest_len = <D as Digest>::output_size() as u8;
    let mut v = vec![
        0x30,
        oid_len + 8 + digest_len,
        0x30,
        oid_len + 4,
        0x6,
        oid_len,
    ];
    v.extend_from_slice(oid);
    v.extend_from_slice(&[0x05, 0x00, 0x04, digest_len]);
    v
}
