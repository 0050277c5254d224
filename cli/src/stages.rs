//! Stage boundary: every collector, the scan and the graph export run through
//! here so a failure is logged and the run moves on.

use std::future::Future;

use aridi_common::log::EventLog;

#[derive(Debug, thiserror::Error)]
#[error("{stage} failed")]
pub struct StageError {
    pub stage: &'static str,
    #[source]
    pub source: anyhow::Error,
}

pub fn run<T>(
    log: &EventLog,
    stage: &'static str,
    body: impl FnOnce() -> anyhow::Result<T>,
) -> Result<T, StageError> {
    log.info(format!("Starting {}", stage.to_lowercase()));
    finish(log, stage, body())
}

pub async fn run_async<T>(
    log: &EventLog,
    stage: &'static str,
    body: impl Future<Output = anyhow::Result<T>>,
) -> Result<T, StageError> {
    log.info(format!("Starting {}", stage.to_lowercase()));
    finish(log, stage, body.await)
}

fn finish<T>(
    log: &EventLog,
    stage: &'static str,
    result: anyhow::Result<T>,
) -> Result<T, StageError> {
    match result {
        Ok(value) => {
            log.info(format!("{stage} finished"));
            Ok(value)
        }
        Err(source) => {
            let err = StageError { stage, source };
            log.error(err.to_string());
            log.debug(format!("{:#}", err.source));
            log.debug(format!("{:?}", err.source));
            Err(err)
        }
    }
}
