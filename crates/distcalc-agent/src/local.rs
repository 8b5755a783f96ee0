//! In-process compute client.

use std::sync::Arc;

use distcalc_core::{CalcError, ComputeClient, ComputeRequest};

use crate::service::ComputeService;

/// Calls a `ComputeService` living in the same process.
#[derive(Debug, Clone)]
pub struct LocalComputeClient {
    service: Arc<ComputeService>,
}

impl LocalComputeClient {
    #[must_use]
    pub fn new(service: Arc<ComputeService>) -> Self {
        Self { service }
    }

    #[must_use]
    pub fn service(&self) -> &Arc<ComputeService> {
        &self.service
    }
}

impl ComputeClient for LocalComputeClient {
    fn compute(&self, request: &ComputeRequest) -> Result<f32, CalcError> {
        let symbol = request.operator_symbol().map_err(CalcError::Compute)?;
        self.service.compute(request.left, request.right, symbol)
    }

    fn endpoint(&self) -> String {
        "in-process".to_string()
    }
}
