//! MongoDB-backed store implementation.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::model::{LabTest, LabTestUpdate, Sample, SampleUpdate};

use super::LabStore;

/// MongoDB store over typed `samples` and `tests` collections.
///
/// Holds a single shared [`Client`], created once at startup. The driver
/// connects lazily, so constructing the store succeeds even when the
/// server is unreachable; only [`LabStore::ping`] verifies connectivity.
#[derive(Debug, Clone)]
pub struct MongoStore {
    /// Database handle, kept for admin commands.
    db: Database,
    /// Typed handle on the samples collection.
    samples: Collection<Sample>,
    /// Typed handle on the tests collection.
    tests: Collection<LabTest>,
}

impl MongoStore {
    /// Create a store from config. Fails only on an unparseable URI.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Client::with_uri_str(&config.mongo_uri).await?;
        let db = client.database(&config.mongo_db);

        Ok(Self {
            samples: db.collection(&config.samples_collection),
            tests: db.collection(&config.tests_collection),
            db,
        })
    }
}

#[async_trait]
impl LabStore for MongoStore {
    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    #[instrument(skip(self, sample))]
    async fn insert_sample(&self, mut sample: Sample) -> Result<Sample> {
        let result = self.samples.insert_one(&sample).await?;
        sample.id = result.inserted_id.as_object_id();
        debug!(sample_id = %sample.sample_id, "inserted sample");
        Ok(sample)
    }

    async fn list_samples(&self) -> Result<Vec<Sample>> {
        let cursor = self.samples.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_sample(&self, sample_id: &str) -> Result<Option<Sample>> {
        Ok(self
            .samples
            .find_one(doc! { "sample_id": sample_id })
            .await?)
    }

    #[instrument(skip(self, update))]
    async fn update_sample(
        &self,
        sample_id: &str,
        update: &SampleUpdate,
    ) -> Result<Option<Sample>> {
        let set = update.set_document();
        // Mongo rejects an empty $set; merging nothing is a plain lookup.
        if set.is_empty() {
            return self.find_sample(sample_id).await;
        }

        Ok(self
            .samples
            .find_one_and_update(doc! { "sample_id": sample_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete_sample(&self, sample_id: &str) -> Result<bool> {
        let result = self
            .samples
            .delete_one(doc! { "sample_id": sample_id })
            .await?;
        Ok(result.deleted_count == 1)
    }

    #[instrument(skip(self, test))]
    async fn insert_test(&self, mut test: LabTest) -> Result<LabTest> {
        let result = self.tests.insert_one(&test).await?;
        test.id = result.inserted_id.as_object_id();
        debug!(sample_id = %test.sample_id, test_type = %test.test_type, "inserted test");
        Ok(test)
    }

    async fn list_tests(&self) -> Result<Vec<LabTest>> {
        let cursor = self.tests.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_tests_for_sample(&self, sample_id: &str) -> Result<Vec<LabTest>> {
        let cursor = self.tests.find(doc! { "sample_id": sample_id }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, update))]
    async fn update_test(
        &self,
        sample_id: &str,
        test_type: &str,
        update: &LabTestUpdate,
    ) -> Result<Option<LabTest>> {
        let filter = doc! { "sample_id": sample_id, "test_type": test_type };

        let set = update.set_document();
        if set.is_empty() {
            return Ok(self.tests.find_one(filter).await?);
        }

        Ok(self
            .tests
            .find_one_and_update(filter, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }
}
