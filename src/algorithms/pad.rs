//! Fixed-width big-endian encoding of the integers produced by RSA.
//!
//! Signatures, ciphertexts and decoded blocks are always exactly as long as
//! the modulus, so every integer is left padded with zero bytes.

use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Returns a new vector of the given length, with 0s left padded.
#[inline]
fn left_pad(input: &[u8], padded_len: usize) -> Result<Vec<u8>> {
    if input.len() > padded_len {
        return Err(Error::InvalidPadLen);
    }

    let mut out = vec![0u8; padded_len];
    out[padded_len - input.len()..].copy_from_slice(input);
    Ok(out)
}

/// Encode `input` as exactly `padded_len` big-endian bytes.
#[inline]
pub(crate) fn uint_to_be_pad(input: BigUint, padded_len: usize) -> Result<Vec<u8>> {
    left_pad(&input.to_bytes_be(), padded_len)
}

/// Like [`uint_to_be_pad`], for secret values: the integer and every
/// intermediate buffer are wiped.
#[inline]
pub(crate) fn uint_to_zeroizing_be_pad(
    input: BigUint,
    padded_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let m = Zeroizing::new(input);
    let m = Zeroizing::new(m.to_bytes_be());
    left_pad(&m, padded_len).map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn test_left_pad() {
        const INPUT_LEN: usize = 3;
        let input = vec![0u8; INPUT_LEN];

        // input len < padded len
        let padded = left_pad(&input, INPUT_LEN + 1).unwrap();
        assert_eq!(padded.len(), INPUT_LEN + 1);

        // input len == padded len
        let padded = left_pad(&input, INPUT_LEN).unwrap();
        assert_eq!(padded.len(), INPUT_LEN);

        // input len > padded len
        let padded = left_pad(&input, INPUT_LEN - 1);
        assert!(padded.is_err());
    }

    #[test]
    fn test_small_values_keep_width() {
        let one = BigUint::from_u8(1).unwrap();
        assert_eq!(uint_to_be_pad(one.clone(), 4).unwrap(), [0, 0, 0, 1]);
        assert_eq!(*uint_to_zeroizing_be_pad(one, 2).unwrap(), [0, 1]);
        assert_eq!(uint_to_be_pad(BigUint::from_u8(0).unwrap(), 3).unwrap(), [0, 0, 0]);
    }
}
