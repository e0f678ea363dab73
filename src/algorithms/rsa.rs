//! Generic RSA implementation

use std::borrow::Cow;

use num_bigint::Sign::Plus;
use num_bigint::{BigInt, BigUint, IntoBigUint, ModInverse};
use num_traits::{One, Signed, Zero};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// ⚠️ Raw RSA encryption of m with the public key. No padding is performed.
///
/// Always runs the portable implementation, never an accelerated backend.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_encrypt<K: PublicKeyParts>(key: &K, m: &BigUint) -> Result<BigUint> {
    Ok(m.modpow(key.e(), key.n()))
}

/// ⚠️ Performs raw RSA decryption with no padding or error checking.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_decrypt<R: CryptoRngCore + ?Sized>(
    mut rng: Option<&mut R>,
    priv_key: &impl PrivateKeyParts,
    c: &BigUint,
) -> Result<BigUint> {
    if c >= priv_key.n() {
        return Err(Error::Decryption);
    }

    if priv_key.n().is_zero() {
        return Err(Error::Decryption);
    }

    let mut ir = None;

    let c = if let Some(ref mut rng) = rng {
        let (blinded, unblinder) = blind(rng, priv_key, c)?;
        ir = Some(unblinder);
        Cow::Owned(blinded)
    } else {
        Cow::Borrowed(c)
    };

    let dp = priv_key.dp();
    let dq = priv_key.dq();
    let qinv = priv_key.qinv();
    let crt_values = priv_key.crt_values();

    let m = match (dp, dq, qinv, crt_values) {
        (Some(dp), Some(dq), Some(qinv), Some(crt_values)) => {
            // We have the precalculated values needed for the CRT.

            let p = &priv_key.primes()[0];
            let q = &priv_key.primes()[1];

            let mut m = BigInt::from_biguint(Plus, c.modpow(dp, p));
            let mut m2 = BigInt::from_biguint(Plus, c.modpow(dq, q));

            m -= &m2;

            let mut primes: Vec<BigInt> = priv_key
                .primes()
                .iter()
                .map(|prime| BigInt::from_biguint(Plus, prime.clone()))
                .collect();

            while m.is_negative() {
                m += &primes[0];
            }
            m *= qinv;
            m %= &primes[0];
            m *= &primes[1];
            m += &m2;

            let mut c = BigInt::from_biguint(Plus, c.into_owned());
            for (value, prime) in crt_values.iter().zip(&primes[2..]) {
                m2 = c.modpow(&value.exp, prime);
                m2 -= &m;
                m2 *= &value.coeff;
                m2 %= prime;
                while m2.is_negative() {
                    m2 += prime;
                }
                m2 *= &value.r;
                m += &m2;
            }

            // clear tmp values
            for prime in primes.iter_mut() {
                prime.zeroize();
            }
            primes.clear();
            c.zeroize();
            m2.zeroize();

            m.into_biguint().ok_or(Error::Internal)?
        }
        _ => c.modpow(priv_key.d(), priv_key.n()),
    };

    match ir {
        Some(ref ir) => {
            // unblind
            Ok(unblind(priv_key, &m, ir))
        }
        None => Ok(m),
    }
}

/// ⚠️ Performs raw RSA decryption with no padding.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.  This will also
/// check for errors in the CRT computation.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_decrypt_and_check<R: CryptoRngCore + ?Sized>(
    priv_key: &impl PrivateKeyParts,
    rng: Option<&mut R>,
    c: &BigUint,
) -> Result<BigUint> {
    let m = rsa_decrypt(rng, priv_key, c)?;

    // In order to defend against errors in the CRT computation, m^e is
    // calculated, which should match the original ciphertext.
    let check = rsa_encrypt(priv_key, &m)?;

    if c != &check {
        return Err(Error::Internal);
    }

    Ok(m)
}

/// Returns the blinded c, along with the unblinding factor.
fn blind<R: CryptoRngCore + ?Sized, K: PublicKeyParts>(
    rng: &mut R,
    key: &K,
    c: &BigUint,
) -> Result<(BigUint, BigUint)> {
    // Blinding involves multiplying c by r^e.
    // Then the decryption operation performs (m^e * r^e)^d mod n
    // which equals mr mod n. The factor of r can then be removed
    // by multiplying by the multiplicative inverse of r.

    let mut r: Zeroizing<BigUint>;
    let unblinder;
    loop {
        r = Zeroizing::new(random_below(rng, key.n())?);
        if r.is_zero() {
            *r = BigUint::one();
        }
        let ir = (*r).clone().mod_inverse(key.n());
        if let Some(ub) = ir.and_then(IntoBigUint::into_biguint) {
            unblinder = ub;
            break;
        }
    }

    let c = {
        let mut rpowe = r.modpow(key.e(), key.n()); // N != 0
        let mut c = c * &rpowe;
        c %= key.n();

        rpowe.zeroize();

        c
    };

    Ok((c, unblinder))
}

/// Given an m and and unblinding factor, unblind the m.
fn unblind(key: &impl PublicKeyParts, m: &BigUint, unblinder: &BigUint) -> BigUint {
    (m * unblinder) % key.n()
}

/// Uniformly random integer in `[0, bound)`, by rejection sampling.
///
/// Fails with [`Error::Rng`] if the random source does.
pub(crate) fn random_below<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bound: &BigUint,
) -> Result<BigUint> {
    let bits = bound.bits();
    if bits == 0 {
        return Err(Error::InvalidArguments);
    }

    let mut buf = Zeroizing::new(vec![0u8; (bits + 7) / 8]);
    let excess = buf.len() * 8 - bits;
    loop {
        rng.try_fill_bytes(&mut buf).map_err(|_| Error::Rng)?;
        buf[0] &= 0xff >> excess;
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

/// Compute the modulus of a key from its primes.
pub(crate) fn compute_modulus(primes: &[BigUint]) -> BigUint {
    primes.iter().fold(BigUint::one(), |n, prime| n * prime)
}

/// Compute the private exponent from its primes (p and q) and public exponent
/// This uses Euler's totient function
#[inline]
pub(crate) fn compute_private_exponent_euler_totient(
    primes: &[BigUint],
    exp: &BigUint,
) -> Result<BigUint> {
    if primes.len() < 2 {
        return Err(Error::InvalidPrime);
    }

    let mut totient = BigUint::one();

    for prime in primes {
        totient *= prime - BigUint::one();
    }

    // NOTE: `mod_inverse` checks if `exp` evenly divides `totient` and returns `None` if so.
    // This ensures that `exp` is not a factor of any `(prime - 1)`.
    exp.clone()
        .mod_inverse(&totient)
        .and_then(IntoBigUint::into_biguint)
        .ok_or(Error::InvalidPrime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RsaPrivateKey;
    use core::num::NonZeroU32;
    use num_traits::FromPrimitive;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
    use rand_core::{CryptoRng, RngCore};

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            unimplemented!()
        }

        fn next_u64(&mut self) -> u64 {
            unimplemented!()
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            unimplemented!()
        }

        fn try_fill_bytes(
            &mut self,
            _dest: &mut [u8],
        ) -> core::result::Result<(), rand_core::Error> {
            Err(NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap().into())
        }
    }

    impl CryptoRng for FailingRng {}

    #[test]
    fn test_random_below() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let bound = BigUint::from_u64(1000).unwrap();
        for _ in 0..200 {
            assert!(random_below(&mut rng, &bound).unwrap() < bound);
        }
        assert_eq!(
            random_below(&mut rng, &BigUint::zero()),
            Err(Error::InvalidArguments)
        );
        assert_eq!(random_below(&mut FailingRng, &bound), Err(Error::Rng));
    }

    #[test]
    fn test_blinded_decrypt_matches_unblinded() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let key = RsaPrivateKey::new(&mut rng, 512).unwrap();
        let m = BigUint::from_u64(0x1234_5678_9abc).unwrap();
        let c = rsa_encrypt(&key, &m).unwrap();

        let plain = rsa_decrypt_and_check::<ChaCha8Rng>(&key, None, &c).unwrap();
        let blinded = rsa_decrypt_and_check(&key, Some(&mut rng), &c).unwrap();
        assert_eq!(plain, m);
        assert_eq!(blinded, m);
    }

    #[test]
    fn test_blinding_reports_rng_failure() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let key = RsaPrivateKey::new(&mut rng, 512).unwrap();
        let c = BigUint::from_u64(42).unwrap();
        assert_eq!(
            rsa_decrypt(Some(&mut FailingRng), &key, &c),
            Err(Error::Rng)
        );
    }

    #[test]
    fn test_decrypt_rejects_out_of_range() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let key = RsaPrivateKey::new(&mut rng, 512).unwrap();
        let c = key.n().clone();
        assert_eq!(
            rsa_decrypt::<ChaCha8Rng>(None, &key, &c),
            Err(Error::Decryption)
        );
    }
}
