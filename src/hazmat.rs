//! ⚠️ Low-level "hazmat" RSA functions.
//!
//! # ☢️️ WARNING: HAZARDOUS API ☢️
//!
//! This module holds functions that apply RSA's core encryption and decryption
//! primitives to raw integers without adding or removing any padding. There
//! are very few valid uses for them outside of implementing a well-reviewed
//! higher-level construction.
//!
//! These functions always run the portable implementation. They never touch
//! the accelerated backend or a key's backend handle, which makes them
//! useful as a reference when checking a backend.

pub use crate::algorithms::rsa::{rsa_decrypt, rsa_decrypt_and_check, rsa_encrypt};
