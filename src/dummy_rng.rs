use rand_core::{CryptoRng, RngCore};

/// Stand-in RNG type for the `Option<&mut R>` parameters of the unblinded
/// operations. It is never called.
#[derive(Copy, Clone)]
pub(crate) struct DummyRng;

impl RngCore for DummyRng {
    fn next_u32(&mut self) -> u32 {
        unimplemented!();
    }

    fn next_u64(&mut self) -> u64 {
        unimplemented!();
    }

    fn fill_bytes(&mut self, _: &mut [u8]) {
        unimplemented!();
    }

    fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand_core::Error> {
        unimplemented!();
    }
}

impl CryptoRng for DummyRng {}
