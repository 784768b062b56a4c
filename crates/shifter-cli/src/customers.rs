//! Demo migration: copy legacy customer rows into a normalized table.
//!
//! The "transaction" is a staging buffer: `start` opens it, `apply` writes
//! into it, `commit` merges it into the target table and `rollback` drops it.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use shifter_core::{BoxError, Migration};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct LegacyCustomer {
    pub id: u32,
    pub name: String,
    pub email: String,
}

impl LegacyCustomer {
    pub fn sample(id: u32) -> Self {
        Self {
            id,
            name: format!("  customer   {id} "),
            email: format!("Customer{id}@Example.COM"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: u32,
    pub display_name: String,
    pub email: String,
}

impl TryFrom<&LegacyCustomer> for Customer {
    type Error = BoxError;

    fn try_from(row: &LegacyCustomer) -> Result<Self, Self::Error> {
        let email = row.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(format!("customer {} has an invalid email {:?}", row.id, row.email).into());
        }
        let display_name = row.name.split_whitespace().collect::<Vec<_>>().join(" ");
        if display_name.is_empty() {
            return Err(format!("customer {} has an empty name", row.id).into());
        }
        Ok(Self {
            id: row.id,
            display_name,
            email,
        })
    }
}

pub struct CopyCustomers {
    target: Mutex<BTreeMap<u32, Customer>>,
    staging: Mutex<Option<Vec<Customer>>>,
    fail_on: Option<u32>,
    max_latency_ms: u64,
}

impl CopyCustomers {
    pub fn new(fail_on: Option<u32>, max_latency_ms: u64) -> Self {
        Self {
            target: Mutex::new(BTreeMap::new()),
            staging: Mutex::new(None),
            fail_on,
            max_latency_ms,
        }
    }

    /// Rows committed to the target table.
    pub async fn migrated(&self) -> usize {
        self.target.lock().await.len()
    }

    pub async fn customer(&self, id: u32) -> Option<Customer> {
        self.target.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl Migration for CopyCustomers {
    type Payload = LegacyCustomer;

    async fn apply(&self, row: &LegacyCustomer) -> Result<(), BoxError> {
        if self.max_latency_ms > 0 {
            let latency = rand::thread_rng().gen_range(0..=self.max_latency_ms);
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.fail_on == Some(row.id) {
            return Err(format!("customer {} rejected by target", row.id).into());
        }

        let customer = Customer::try_from(row)?;
        match self.staging.lock().await.as_mut() {
            Some(staged) => {
                staged.push(customer);
                Ok(())
            }
            None => Err("apply called outside a transaction".into()),
        }
    }

    async fn start_transaction(&self) -> Result<(), BoxError> {
        let mut staging = self.staging.lock().await;
        if staging.is_some() {
            return Err("transaction already open".into());
        }
        *staging = Some(Vec::new());
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<(), BoxError> {
        let staged = self
            .staging
            .lock()
            .await
            .take()
            .ok_or("commit without an open transaction")?;
        let mut target = self.target.lock().await;
        for customer in staged {
            target.insert(customer.id, customer);
        }
        Ok(())
    }

    async fn rollback_transaction(&self) -> Result<(), BoxError> {
        self.staging.lock().await.take();
        Ok(())
    }
}
