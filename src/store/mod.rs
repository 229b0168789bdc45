//! Storage layer for samples and tests.
//!
//! This module handles:
//! - The [`LabStore`] trait handlers are written against
//! - The MongoDB-backed implementation
//! - An in-memory implementation for testing

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{LabTest, LabTestUpdate, Sample, SampleUpdate};

/// Persistence operations for the two entity collections.
///
/// Lookups return `None` when nothing matches; handlers turn that into a
/// NOT_FOUND response. Updates merge only the fields present in the update
/// payload and return the post-update record.
#[async_trait]
pub trait LabStore: Send + Sync {
    /// Round-trip connectivity check against the backing database.
    async fn ping(&self) -> Result<()>;

    /// Insert a sample and return it with its storage identifier set.
    async fn insert_sample(&self, sample: Sample) -> Result<Sample>;

    /// All stored samples, unfiltered.
    async fn list_samples(&self) -> Result<Vec<Sample>>;

    /// Exact-match lookup on the business identifier.
    async fn find_sample(&self, sample_id: &str) -> Result<Option<Sample>>;

    /// Merge present fields into the matching sample.
    async fn update_sample(
        &self,
        sample_id: &str,
        update: &SampleUpdate,
    ) -> Result<Option<Sample>>;

    /// Remove exactly one matching sample. Returns whether one was removed.
    async fn delete_sample(&self, sample_id: &str) -> Result<bool>;

    /// Insert a test and return it with its storage identifier set.
    async fn insert_test(&self, test: LabTest) -> Result<LabTest>;

    /// All stored tests, unfiltered.
    async fn list_tests(&self) -> Result<Vec<LabTest>>;

    /// Tests whose `sample_id` matches.
    async fn list_tests_for_sample(&self, sample_id: &str) -> Result<Vec<LabTest>>;

    /// Merge present fields into the first test matching the compound key.
    async fn update_test(
        &self,
        sample_id: &str,
        test_type: &str,
        update: &LabTestUpdate,
    ) -> Result<Option<LabTest>>;
}

pub use memory::{MemoryConfig, MemoryStore};
pub use mongo::MongoStore;
