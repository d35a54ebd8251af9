/// Transaction parameter generator; one instance per worker thread.
pub trait Generator {
    type Profile;

    /// Generate the next transaction request.
    fn generate(&mut self) -> Self::Profile;

    /// Get number of transactions generated.
    fn get_generated(&self) -> u64;
}
