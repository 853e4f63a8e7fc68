use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use log::info;
use serde_json::Value;
use std::time::Instant;

use super::client::{ApiCase, ApiClient, CaseError};
use super::console;
use super::state::{RunSummary, TestResult};
use crate::utils::Config;

/// Future returned by a test function
pub type CaseFuture<'a> = BoxFuture<'a, Result<Value, CaseError>>;

/// Runs named test cases one after another and keeps their results.
///
/// Session state lives in the owned [`ApiClient`], so a fresh `ApiTester`
/// starts with no session and no results.
pub struct ApiTester {
    client: ApiClient,
    results: Vec<TestResult>,
}

impl ApiTester {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            results: Vec::new(),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Runs one test function and appends exactly one result for it.
    ///
    /// Any error from `test` is recorded as a failure; nothing propagates.
    pub async fn run_test<F>(&mut self, name: &str, test: F) -> &TestResult
    where
        F: for<'a> FnOnce(&'a mut ApiClient) -> CaseFuture<'a>,
    {
        console::test_started(name);
        let spinner = console::request_spinner(name);
        let started = Instant::now();

        let outcome = test(&mut self.client).await;

        spinner.finish_and_clear();
        let duration_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(payload) => {
                console::test_passed(&payload);
                TestResult::passed(name, payload, duration_ms)
            }
            Err(e) => {
                let error = e.to_string();
                console::test_failed(&error);
                TestResult::failed(name, error, duration_ms)
            }
        };
        info!("{}: {} ({}ms)", name, result.status.as_str(), duration_ms);

        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    /// Runs every case in [`ApiCase::ALL`] order, then prints the summary.
    pub async fn run_all_tests(&mut self) -> RunSummary {
        console::suite_started();

        for case in ApiCase::ALL {
            self.run_test(case.name(), move |client| client.execute(case).boxed())
                .await;
        }

        self.print_summary()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results)
    }

    pub fn print_summary(&self) -> RunSummary {
        let summary = self.summary();
        console::summary(&summary, &self.results);
        summary
    }
}
