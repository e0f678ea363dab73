//! Error types.

/// Alias for [`core::result::Result`] with the `rsa-accel` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Decryption error.
    ///
    /// Every structural problem with a ciphertext maps to this one value.
    #[error("decryption error")]
    Decryption,

    /// Verification error.
    ///
    /// Every structural problem with a signature maps to this one value.
    #[error("verification error")]
    Verification,

    /// Message too long.
    #[error("message too long")]
    MessageTooLong,

    /// Input must be hashed.
    #[error("input must be hashed")]
    InputNotHashed,

    /// Number of primes must be 2 or greater.
    #[error("nprimes must be >= 2")]
    NprimesTooSmall,

    /// Too few primes of a given length to generate an RSA key.
    #[error("too few primes of given length to generate an RSA key")]
    TooFewPrimes,

    /// Invalid prime value.
    #[error("invalid prime value")]
    InvalidPrime,

    /// Invalid modulus.
    #[error("invalid modulus")]
    InvalidModulus,

    /// Invalid exponent.
    #[error("invalid exponent")]
    InvalidExponent,

    /// Invalid coefficient.
    #[error("invalid coefficient")]
    InvalidCoefficient,

    /// Modulus too large.
    #[error("modulus too large")]
    ModulusTooLarge,

    /// Public exponent too small.
    #[error("public exponent too small")]
    PublicExponentTooSmall,

    /// Public exponent too large.
    #[error("public exponent too large")]
    PublicExponentTooLarge,

    /// PKCS#1 error.
    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] pkcs1::Error),

    /// PKCS#8 error.
    #[error("PKCS#8 error: {0}")]
    Pkcs8(#[from] pkcs8::Error),

    /// Internal error.
    #[error("internal error")]
    Internal,

    /// Invalid padding length.
    #[error("invalid padding length")]
    InvalidPadLen,

    /// Invalid arguments.
    #[error("invalid arguments")]
    InvalidArguments,

    /// The random source failed to produce bytes.
    #[error("random source failure")]
    Rng,

    /// An accelerated backend could not import a key or run an operation.
    ///
    /// Returned by [`RsaBackend`][crate::backend::RsaBackend] and
    /// [`BackendKey`][crate::backend::BackendKey] implementations. The crate's
    /// own operations never return it; they fall back to the portable path.
    #[error("accelerated backend failure")]
    Backend,

    /// A process-wide backend has already been installed.
    #[error("accelerated backend already installed")]
    BackendAlreadyInstalled,
}

impl From<Error> for signature::Error {
    fn from(err: Error) -> Self {
        Self::from_source(err)
    }
}
