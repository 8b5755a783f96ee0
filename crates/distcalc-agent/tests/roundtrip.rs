//! Agent server and TCP client exercised together.

use std::sync::Arc;
use std::time::{Duration, Instant};

use distcalc_agent::{AgentServer, ComputeConfig, ComputeService, TcpComputeClient};
use distcalc_core::{CalcError, ComputeClient, ComputeRequest, FaultKind, OperationTimes};

fn start(workers: usize, times: OperationTimes) -> (TcpComputeClient, Arc<ComputeService>) {
    let service = Arc::new(ComputeService::new(ComputeConfig::new(workers, times).unwrap()));
    let server = AgentServer::bind("127.0.0.1:0", Arc::clone(&service)).unwrap();
    let addr = server.local_addr().unwrap();
    drop(server.spawn());
    let client = TcpComputeClient::new(addr.to_string()).with_timeout(Duration::from_secs(5));
    (client, service)
}

#[test]
fn remote_arithmetic() {
    let (client, service) = start(2, OperationTimes::default());
    assert_eq!(client.compute(&ComputeRequest::new(2.0, 3.0, '+')), Ok(5.0));
    assert_eq!(client.compute(&ComputeRequest::new(2.0, 5.0, '-')), Ok(-3.0));
    assert_eq!(client.compute(&ComputeRequest::new(4.0, 2.5, '*')), Ok(10.0));
    assert_eq!(client.compute(&ComputeRequest::new(1.0, 4.0, '/')), Ok(0.25));
    assert_eq!(service.calls(), 4);
}

#[test]
fn remote_faults() {
    let (client, _) = start(3, OperationTimes::default());
    assert_eq!(
        client.compute(&ComputeRequest::new(1.0, 0.0, '/')),
        Err(CalcError::Compute(FaultKind::DivisionByZero))
    );
    assert_eq!(
        client.compute(&ComputeRequest::new(1.0, 2.0, '%')),
        Err(CalcError::Compute(FaultKind::UnexpectedSymbol))
    );
}

#[test]
fn remote_overflow_matches_local() {
    let (client, service) = start(2, OperationTimes::default());
    for (left, right, symbol) in [
        (f32::MAX, 2.0, '*'),
        (-f32::MAX, f32::MAX, '-'),
        (f32::INFINITY, 1.0, '+'),
        (f32::INFINITY, f32::INFINITY, '-'),
    ] {
        let local = service.compute(left, right, symbol).unwrap();
        let remote = client
            .compute(&ComputeRequest::new(left, right, symbol))
            .unwrap();
        if local.is_nan() {
            assert!(remote.is_nan(), "{left} {symbol} {right}");
        } else {
            assert_eq!(remote, local, "{left} {symbol} {right}");
        }
    }
}

#[test]
fn redundant_workers_are_stable() {
    let (client, _) = start(8, OperationTimes::default());
    for i in 0..200u16 {
        let left = f32::from(i);
        assert_eq!(
            client.compute(&ComputeRequest::new(left, 1.0, '+')),
            Ok(left + 1.0)
        );
    }
}

#[test]
fn latency_is_paid_once_per_call() {
    let times = OperationTimes::uniform(Duration::from_millis(50));
    let (client, _) = start(4, times);
    let start = Instant::now();
    assert_eq!(client.compute(&ComputeRequest::new(6.0, 7.0, '*')), Ok(42.0));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(2));
}

#[test]
fn concurrent_callers() {
    let (client, service) = start(2, OperationTimes::default());
    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let client = client.clone();
            std::thread::spawn(move || {
                let n = f32::from(i);
                client.compute(&ComputeRequest::new(n, n, '*'))
            })
        })
        .collect();
    for (i, handle) in (0..8u8).zip(handles) {
        let n = f32::from(i);
        assert_eq!(handle.join().unwrap(), Ok(n * n));
    }
    assert_eq!(service.calls(), 8);
}
