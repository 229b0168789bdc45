//! In-memory store for unit testing.
//!
//! This module provides a store that can be used in tests without a
//! running MongoDB server. Behavior mirrors the real store: storage
//! identifiers are assigned on insert, updates merge only present fields,
//! and test updates hit the first record matching the compound key.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::{ApiError, Result};
use crate::model::{LabTest, LabTestUpdate, Sample, SampleUpdate};

use super::LabStore;

/// Configuration for in-memory store behavior.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    /// Whether to fail connectivity checks.
    pub fail_ping: bool,
    /// Whether to fail every data operation.
    pub fail_ops: bool,
}

/// In-memory store backed by plain vectors.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Behavior configuration.
    config: MemoryConfig,
    /// Stored samples, in insertion order.
    samples: Arc<Mutex<Vec<Sample>>>,
    /// Stored tests, in insertion order.
    tests: Arc<Mutex<Vec<LabTest>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with custom failure behavior.
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.samples.lock().unwrap().clear();
        self.tests.lock().unwrap().clear();
    }

    fn check_ops(&self) -> Result<()> {
        if self.config.fail_ops {
            return Err(ApiError::Database(mongodb::error::Error::custom(
                "simulated store failure".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LabStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        if self.config.fail_ping {
            return Err(ApiError::Database(mongodb::error::Error::custom(
                "simulated ping failure".to_string(),
            )));
        }
        Ok(())
    }

    async fn insert_sample(&self, mut sample: Sample) -> Result<Sample> {
        self.check_ops()?;

        sample.id = Some(ObjectId::new());
        self.samples.lock().unwrap().push(sample.clone());
        Ok(sample)
    }

    async fn list_samples(&self) -> Result<Vec<Sample>> {
        self.check_ops()?;

        Ok(self.samples.lock().unwrap().clone())
    }

    async fn find_sample(&self, sample_id: &str) -> Result<Option<Sample>> {
        self.check_ops()?;

        let samples = self.samples.lock().unwrap();
        Ok(samples.iter().find(|s| s.sample_id == sample_id).cloned())
    }

    async fn update_sample(
        &self,
        sample_id: &str,
        update: &SampleUpdate,
    ) -> Result<Option<Sample>> {
        self.check_ops()?;

        let mut samples = self.samples.lock().unwrap();
        let Some(sample) = samples.iter_mut().find(|s| s.sample_id == sample_id) else {
            return Ok(None);
        };

        if let Some(patient_name) = &update.patient_name {
            sample.patient_name = patient_name.clone();
        }
        if let Some(lab_info) = &update.lab_info {
            sample.lab_info = lab_info.clone();
        }
        if let Some(description) = &update.description {
            sample.description = Some(description.clone());
        }

        Ok(Some(sample.clone()))
    }

    async fn delete_sample(&self, sample_id: &str) -> Result<bool> {
        self.check_ops()?;

        let mut samples = self.samples.lock().unwrap();
        let Some(pos) = samples.iter().position(|s| s.sample_id == sample_id) else {
            return Ok(false);
        };

        samples.remove(pos);
        Ok(true)
    }

    async fn insert_test(&self, mut test: LabTest) -> Result<LabTest> {
        self.check_ops()?;

        test.id = Some(ObjectId::new());
        self.tests.lock().unwrap().push(test.clone());
        Ok(test)
    }

    async fn list_tests(&self) -> Result<Vec<LabTest>> {
        self.check_ops()?;

        Ok(self.tests.lock().unwrap().clone())
    }

    async fn list_tests_for_sample(&self, sample_id: &str) -> Result<Vec<LabTest>> {
        self.check_ops()?;

        let tests = self.tests.lock().unwrap();
        Ok(tests
            .iter()
            .filter(|t| t.sample_id == sample_id)
            .cloned()
            .collect())
    }

    async fn update_test(
        &self,
        sample_id: &str,
        test_type: &str,
        update: &LabTestUpdate,
    ) -> Result<Option<LabTest>> {
        self.check_ops()?;

        let mut tests = self.tests.lock().unwrap();
        let Some(test) = tests
            .iter_mut()
            .find(|t| t.sample_id == sample_id && t.test_type == test_type)
        else {
            return Ok(None);
        };

        if let Some(sample_id) = &update.sample_id {
            test.sample_id = sample_id.clone();
        }
        if let Some(test_type) = &update.test_type {
            test.test_type = test_type.clone();
        }
        if let Some(result) = &update.result {
            test.result = Some(result.clone());
        }
        if let Some(units) = &update.units {
            test.units = Some(units.clone());
        }

        Ok(Some(test.clone()))
    }
}
