//! The concurrent **port scanner**.
//!
//! The scanner reads the host inventory collected by earlier stages, probes
//! every (host, port) pair through a [`Prober`] and writes each result back into
//! the [`ReportModel`] as soon as the probe resolves.
//!
//! **Concurrency:**
//! A single coordinator keeps at most `workers` probes in flight on a
//! [`JoinSet`]. Probe tasks share nothing; they hand their outcome back to the
//! coordinator, which is the only writer into the model. When the overall
//! deadline elapses the in-flight probes are aborted and every unresolved pair
//! is recorded as filtered.

use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use aridi_common::config::ScanConfig;
use aridi_common::error::ScanError;
use aridi_common::log::EventLog;
use aridi_common::report::{PortResult, PortState, ReportModel};
use tokio::task::{self, JoinSet};
use tokio::time;

use crate::services::PortNameResolver;

mod prober;

pub use prober::{ProbeOutcome, Prober, TcpConnectProber, classify_io_error};

/// Called with `(completed, total)` after every resolved probe.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

type Completion = (SocketAddr, ProbeOutcome, Duration);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub hosts: usize,
    pub probed: usize,
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
    pub errors: usize,
    /// Pairs still pending when the deadline elapsed.
    pub timed_out: usize,
}

impl ScanSummary {
    fn record(&mut self, state: PortState) {
        self.probed += 1;
        match state {
            PortState::Open => self.open += 1,
            PortState::Closed => self.closed += 1,
            PortState::Filtered => self.filtered += 1,
            PortState::Error => self.errors += 1,
        }
    }
}

pub struct NetworkScanner<P: Prober = TcpConnectProber> {
    prober: Arc<P>,
    cfg: ScanConfig,
    on_progress: Option<ProgressCallback>,
}

impl NetworkScanner<TcpConnectProber> {
    pub fn new(cfg: ScanConfig) -> Self {
        let prober = TcpConnectProber::new(cfg.probe_timeout);
        Self::with_prober(cfg, prober)
    }
}

impl<P: Prober> NetworkScanner<P> {
    pub fn with_prober(cfg: ScanConfig, prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            cfg,
            on_progress: None,
        }
    }

    pub fn on_progress(mut self, callback: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Probes every host of the inventory, starting each host at `start_port`.
    ///
    /// Individual probe failures never abort the scan. The only errors are an
    /// empty port selection and a result for a host missing from the inventory,
    /// which means the inventory and the scan went out of sync.
    pub async fn scan(
        &self,
        model: &mut ReportModel,
        resolver: &PortNameResolver,
        log: &EventLog,
        start_port: u16,
    ) -> Result<ScanSummary, ScanError> {
        let ports: Vec<u16> = self.cfg.ports(start_port);
        if ports.is_empty() {
            return Err(ScanError::NoPorts);
        }

        let targets: Vec<IpAddr> = model.inventory().addresses().collect();
        let mut summary = ScanSummary {
            hosts: targets.len(),
            ..ScanSummary::default()
        };
        if targets.is_empty() {
            log.warning("The inventory has no hosts, nothing to scan");
            return Ok(summary);
        }

        let pairs: Vec<SocketAddr> = targets
            .iter()
            .flat_map(|ip| ports.iter().map(move |port| SocketAddr::new(*ip, *port)))
            .collect();
        let total: usize = pairs.len();
        log.info(format!(
            "Probing {} ports on {} hosts with up to {} workers",
            ports.len(),
            targets.len(),
            self.cfg.workers
        ));
        if resolver.is_empty() {
            log.debug("No port names loaded, open ports will have no service name");
        }

        let mut queue: VecDeque<SocketAddr> = pairs.iter().copied().collect();
        // Unresolved pairs with their dispatch time, `None` while still queued.
        let mut pending: HashMap<SocketAddr, Option<Instant>> =
            pairs.iter().map(|addr| (*addr, None)).collect();
        let mut workers: JoinSet<Completion> = JoinSet::new();
        // Which pair each running task probes, so a task that dies is still attributed.
        let mut in_flight: HashMap<task::Id, SocketAddr> = HashMap::new();
        let deadline = time::Instant::now() + self.cfg.deadline;
        let mut deadline_hit = false;

        loop {
            while workers.len() < self.cfg.workers {
                let Some(addr) = queue.pop_front() else { break };
                let started: Instant = Instant::now();
                pending.insert(addr, Some(started));
                let prober: Arc<P> = Arc::clone(&self.prober);
                let handle = workers.spawn(async move {
                    let outcome: ProbeOutcome = prober.probe(addr).await;
                    (addr, outcome, started.elapsed())
                });
                in_flight.insert(handle.id(), addr);
            }

            if workers.is_empty() {
                break;
            }

            match time::timeout_at(deadline, workers.join_next_with_id()).await {
                Ok(Some(Ok((id, (addr, outcome, elapsed))))) => {
                    in_flight.remove(&id);
                    pending.remove(&addr);
                    let result: PortResult = to_port_result(addr, outcome, elapsed, resolver, log);
                    summary.record(result.state);
                    model.add_port_result(addr.ip(), result)?;
                    self.report_progress(total - pending.len(), total);
                }
                Ok(Some(Err(e))) => {
                    let Some(addr) = in_flight.remove(&e.id()) else {
                        log.warning(format!("A probe worker stopped unexpectedly: {e}"));
                        continue;
                    };
                    let elapsed: Duration = pending
                        .remove(&addr)
                        .flatten()
                        .map(|t| t.elapsed())
                        .unwrap_or_default();
                    log.warning(format!("Probe worker for {addr} stopped unexpectedly: {e}"));
                    let result: PortResult = aborted(addr, elapsed, log);
                    summary.record(result.state);
                    model.add_port_result(addr.ip(), result)?;
                    self.report_progress(total - pending.len(), total);
                }
                Ok(None) => break,
                Err(_elapsed) => {
                    deadline_hit = true;
                    break;
                }
            }
        }

        // Dropping the futures closes any socket still connecting.
        workers.abort_all();

        for addr in pairs.iter().filter(|addr| pending.contains_key(*addr)) {
            let elapsed: Duration = pending[addr].map(|t| t.elapsed()).unwrap_or_default();
            let result: PortResult = if deadline_hit {
                log.warning(format!(
                    "Scan deadline reached before {addr} answered, marked as filtered"
                ));
                summary.timed_out += 1;
                PortResult::new(addr.port(), PortState::Filtered, elapsed)
            } else {
                aborted(*addr, elapsed, log)
            };
            summary.record(result.state);
            model.add_port_result(addr.ip(), result)?;
        }
        self.report_progress(total, total);

        log.info(format!(
            "Scan finished: {} open, {} closed, {} filtered, {} errors",
            summary.open, summary.closed, summary.filtered, summary.errors
        ));
        Ok(summary)
    }

    fn report_progress(&self, completed: usize, total: usize) {
        if let Some(callback) = &self.on_progress {
            callback(completed, total);
        }
    }
}

fn aborted(addr: SocketAddr, elapsed: Duration, log: &EventLog) -> PortResult {
    log.warning(format!("No outcome for {addr}, marked as error"));
    PortResult::new(addr.port(), PortState::Error, elapsed).with_error("probe aborted")
}

fn to_port_result(
    addr: SocketAddr,
    outcome: ProbeOutcome,
    elapsed: Duration,
    resolver: &PortNameResolver,
    log: &EventLog,
) -> PortResult {
    let port: u16 = addr.port();
    match outcome {
        ProbeOutcome::Open => {
            let service: Option<String> = resolver.resolve(port).map(str::to_string);
            log.debug(format!(
                "{addr} is open ({})",
                service.as_deref().unwrap_or("unknown service")
            ));
            PortResult::new(port, PortState::Open, elapsed).with_service(service)
        }
        ProbeOutcome::Closed => PortResult::new(port, PortState::Closed, elapsed),
        ProbeOutcome::Filtered => PortResult::new(port, PortState::Filtered, elapsed),
        ProbeOutcome::Error(reason) => {
            log.warning(format!("Probe to {addr} failed: {reason}"));
            PortResult::new(port, PortState::Error, elapsed).with_error(reason)
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use aridi_common::error::ReportError;
    use aridi_common::log::Severity;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers from a fixed table, sleeping first when a delay is set.
    struct ScriptedProber {
        outcomes: HashMap<u16, (ProbeOutcome, Duration)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedProber {
        fn new(outcomes: &[(u16, ProbeOutcome, Duration)]) -> Self {
            Self {
                outcomes: outcomes
                    .iter()
                    .map(|(port, outcome, delay)| (*port, (outcome.clone(), *delay)))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let (outcome, delay) = self
                .outcomes
                .get(&addr.port())
                .cloned()
                .unwrap_or((ProbeOutcome::Closed, Duration::ZERO));
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn config(ports: &[u16]) -> ScanConfig {
        ScanConfig {
            well_known: ports.to_vec(),
            deadline: Duration::from_secs(5),
            ..ScanConfig::default()
        }
    }

    fn model_with(hosts: &[IpAddr]) -> ReportModel {
        let mut model = ReportModel::new();
        for host in hosts {
            model.add_host(*host);
        }
        model
    }

    const HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));

    #[tokio::test]
    async fn states_follow_probe_outcomes() {
        let prober = ScriptedProber::new(&[
            (22, ProbeOutcome::Open, Duration::ZERO),
            (80, ProbeOutcome::Closed, Duration::ZERO),
            (443, ProbeOutcome::Filtered, Duration::ZERO),
            (8080, ProbeOutcome::Error("network unreachable".into()), Duration::ZERO),
        ]);
        let scanner = NetworkScanner::with_prober(config(&[80, 443, 8080]), prober);
        let mut model = model_with(&[HOST]);
        let mut resolver = PortNameResolver::new();
        resolver.insert(22, "ssh");
        resolver.insert(80, "http");
        let log = EventLog::new();

        let summary = scanner.scan(&mut model, &resolver, &log, 22).await.unwrap();

        assert_eq!(summary.probed, 4);
        assert_eq!((summary.open, summary.closed, summary.filtered, summary.errors), (1, 1, 1, 1));

        let host = model.inventory().get(&HOST).unwrap();
        let by_port = |port: u16| host.ports().iter().find(|r| r.port == port).unwrap().clone();
        assert_eq!(by_port(22).service.as_deref(), Some("ssh"));
        assert_eq!(by_port(80).state, PortState::Closed);
        assert_eq!(by_port(80).service, None);
        assert_eq!(by_port(8080).error.as_deref(), Some("network unreachable"));

        let warnings = log.view(Severity::Warning);
        assert!(warnings.iter().any(|e| e.message.contains("network unreachable")));
    }

    #[tokio::test]
    async fn deadline_marks_pending_pairs_filtered() {
        let prober = ScriptedProber::new(&[
            (22, ProbeOutcome::Open, Duration::ZERO),
            (443, ProbeOutcome::Open, Duration::from_secs(30)),
        ]);
        let cfg = ScanConfig {
            deadline: Duration::from_millis(200),
            ..config(&[443])
        };
        let scanner = NetworkScanner::with_prober(cfg, prober);
        let mut model = model_with(&[HOST]);
        let log = EventLog::new();

        let summary = scanner
            .scan(&mut model, &PortNameResolver::new(), &log, 22)
            .await
            .unwrap();

        assert_eq!(summary.timed_out, 1);
        let host = model.inventory().get(&HOST).unwrap();
        let late = host.ports().iter().find(|r| r.port == 443).unwrap();
        assert_eq!(late.state, PortState::Filtered);
        assert!(
            log.view(Severity::Warning)
                .iter()
                .any(|e| e.message.contains(":443") && e.message.contains("deadline"))
        );
    }

    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
            match addr.port() {
                80 => panic!("prober bug"),
                443 => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    ProbeOutcome::Open
                }
                _ => ProbeOutcome::Closed,
            }
        }
    }

    #[tokio::test]
    async fn dead_worker_is_an_error_even_when_the_deadline_fires() {
        let cfg = ScanConfig {
            deadline: Duration::from_millis(200),
            ..config(&[80, 443])
        };
        let scanner = NetworkScanner::with_prober(cfg, PanickingProber);
        let mut model = model_with(&[HOST]);
        let log = EventLog::new();

        let summary = scanner
            .scan(&mut model, &PortNameResolver::new(), &log, 22)
            .await
            .unwrap();

        assert_eq!(summary.timed_out, 1);
        assert_eq!((summary.closed, summary.filtered, summary.errors), (1, 1, 1));
        let host = model.inventory().get(&HOST).unwrap();
        let dead = host.ports().iter().find(|r| r.port == 80).unwrap();
        assert_eq!(dead.state, PortState::Error);
        assert_eq!(dead.error.as_deref(), Some("probe aborted"));
        assert_eq!(host.ports().len(), 3);
        assert!(
            !log.view(Severity::Warning)
                .iter()
                .any(|e| e.message.contains(":80 ") && e.message.contains("deadline"))
        );
    }

    #[tokio::test]
    async fn worker_pool_is_bounded() {
        let ports: Vec<u16> = (1000..1040).collect();
        let outcomes: Vec<(u16, ProbeOutcome, Duration)> = ports
            .iter()
            .map(|p| (*p, ProbeOutcome::Closed, Duration::from_millis(10)))
            .collect();
        let prober = ScriptedProber::new(&outcomes);
        let cfg = ScanConfig {
            workers: 4,
            ..config(&ports)
        };
        let scanner = NetworkScanner::with_prober(cfg, prober);
        let mut model = model_with(&[HOST]);

        let summary = scanner
            .scan(&mut model, &PortNameResolver::new(), &EventLog::new(), 1000)
            .await
            .unwrap();

        assert_eq!(summary.probed, 40);
        assert!(scanner.prober.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn every_pair_is_recorded_once_per_host() {
        let other: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 6));
        let scanner = NetworkScanner::with_prober(config(&[80, 443]), ScriptedProber::new(&[]));
        let mut model = model_with(&[HOST, other]);

        scanner
            .scan(&mut model, &PortNameResolver::new(), &EventLog::new(), 22)
            .await
            .unwrap();

        for host in model.inventory().hosts() {
            let mut ports: Vec<u16> = host.ports().iter().map(|r| r.port).collect();
            ports.sort_unstable();
            assert_eq!(ports, vec![22, 80, 443]);
        }
    }

    #[tokio::test]
    async fn progress_reaches_total() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_ref = Arc::clone(&seen);
        let scanner = NetworkScanner::with_prober(config(&[80]), ScriptedProber::new(&[]))
            .on_progress(move |completed, total| {
                assert!(completed <= total);
                seen_ref.store(completed, Ordering::SeqCst);
            });
        let mut model = model_with(&[HOST]);

        scanner
            .scan(&mut model, &PortNameResolver::new(), &EventLog::new(), 22)
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_inventory_is_a_warning_not_an_error() {
        let scanner = NetworkScanner::with_prober(config(&[80]), ScriptedProber::new(&[]));
        let log = EventLog::new();

        let summary = scanner
            .scan(&mut ReportModel::new(), &PortNameResolver::new(), &log, 22)
            .await
            .unwrap();

        assert_eq!(summary, ScanSummary::default());
        assert_eq!(log.view(Severity::Warning).len(), 1);
    }

    #[tokio::test]
    async fn unknown_host_surfaces_as_scan_error() {
        let scanner = NetworkScanner::with_prober(config(&[]), ScriptedProber::new(&[]));
        let mut model = ReportModel::new();
        let result = model.add_port_result(HOST, PortResult::new(22, PortState::Open, Duration::ZERO));
        let err: ScanError = result.unwrap_err().into();
        assert!(matches!(err, ScanError::Report(ReportError::UnknownHost(_))));

        // A scan over a consistent inventory never hits it.
        model.add_host(HOST);
        assert!(scanner.scan(&mut model, &PortNameResolver::new(), &EventLog::new(), 22).await.is_ok());
    }
}
