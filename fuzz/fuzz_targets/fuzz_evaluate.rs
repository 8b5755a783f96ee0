#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use distcalc_agent::{ComputeConfig, ComputeService, LocalComputeClient};
use distcalc_core::{OperationTimes, Owner, Status};
use distcalc_orchestration::{Evaluator, StatusStore};

fuzz_target!(|data: &[u8]| {
    let Ok(expr) = std::str::from_utf8(data) else {
        return;
    };
    // Every operator costs a thread race; keep inputs short.
    if expr.len() > 64 {
        return;
    }

    let config = ComputeConfig::new(2, OperationTimes::default()).unwrap();
    let client = LocalComputeClient::new(Arc::new(ComputeService::new(config)));
    let evaluator = Evaluator::new(Arc::new(StatusStore::new()), Arc::new(client));
    let owner = Owner::from("fuzz");

    let report = evaluator.evaluate_tracked(expr, &owner);
    let stored = evaluator.store().get(&report.expression_id, &owner).unwrap();

    // The stored state always matches the returned outcome.
    match &report.outcome {
        Ok(value) => {
            assert_eq!(stored.status, Status::Completed);
            assert_eq!(stored.result.map(f64::to_bits), Some(value.to_bits()));
        }
        Err(err) => {
            assert_eq!(stored.status, Status::Failed);
            assert_eq!(stored.error, Some(err.to_string()));
        }
    }
});
