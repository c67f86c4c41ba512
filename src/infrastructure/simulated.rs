use crate::domain::client::{ClientCreationRequest, CreateClientResponse};
use crate::domain::ports::ClientProvisioner;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Stand-in for the core banking API when none is configured.
///
/// Every call waits a fixed delay, then fails once in `failure_one_in` draws
/// (never when it is 0) and otherwise returns a fabricated account number.
pub struct SimulatedProvisioner {
    delay: Duration,
    failure_one_in: u32,
    rng: Mutex<StdRng>,
}

impl SimulatedProvisioner {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);
    pub const DEFAULT_FAILURE_ONE_IN: u32 = 6;

    pub fn new(delay: Duration, failure_one_in: u32) -> Self {
        Self {
            delay,
            failure_one_in,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Uses a seeded generator so the sequence of outcomes is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Draws the next outcome: `Some(account number)` on success.
    fn draw(&self) -> Option<String> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if self.failure_one_in > 0 && rng.gen_ratio(1, self.failure_one_in) {
            return None;
        }
        Some(format!("{:09}", rng.gen_range(1..1_000_000_000u32)))
    }
}

impl Default for SimulatedProvisioner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY, Self::DEFAULT_FAILURE_ONE_IN)
    }
}

#[async_trait]
impl ClientProvisioner for SimulatedProvisioner {
    async fn create_client(&self, request: &ClientCreationRequest) -> Result<CreateClientResponse> {
        tokio::time::sleep(self.delay).await;

        match self.draw() {
            Some(account_no) => {
                debug!(account_no = %account_no, "simulated client creation succeeded");
                Ok(CreateClientResponse {
                    account_no,
                    ..CreateClientResponse::default()
                })
            }
            None => Err(GatewayError::remote(
                Some(500),
                format!(
                    "simulated failure creating client {} {}",
                    request.client_bio.firstname, request.client_bio.lastname
                ),
            )),
        }
    }
}
