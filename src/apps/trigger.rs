//! Trigger application: the module level trigger fed by HSI events and
//! tokens from the network, emitting trigger decisions back onto it.

use crate::apps::AppGenerator;
use crate::apps::network::{NetworkEndpoints, validate_endpoints};
use crate::apps::payload::{network_to_queue, queue_to_network, start_params};
use crate::command::{AddressedPair, CommandSpec};
use crate::error::{BuildResult, ConfgenError};
use crate::spec::{Inclusion, ModuleKind, QueueSpec};
use serde::{Deserialize, Serialize};
use serde_json::json;

const REQUIRED_ENDPOINTS: [&str; 3] = ["hsievent", "triginh", "trigdec"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerApp {
    pub run_number: u64,
    pub number_of_data_producers: u32,
    pub trigger_rate_hz: f64,
    pub token_count: u32,
    pub clock_speed_hz: u64,
    pub network_endpoints: NetworkEndpoints,
}

impl Default for TriggerApp {
    fn default() -> Self {
        Self {
            run_number: 333,
            number_of_data_producers: 2,
            trigger_rate_hz: 1.0,
            token_count: 10,
            clock_speed_hz: 50_000_000,
            network_endpoints: NetworkEndpoints::from([
                ("hsievent".to_string(), "tcp://localhost:12344".to_string()),
                ("triginh".to_string(), "tcp://localhost:12345".to_string()),
                ("trigdec".to_string(), "tcp://localhost:12346".to_string()),
            ]),
        }
    }
}

impl TriggerApp {
    fn endpoint(&self, name: &str) -> &str {
        self.network_endpoints
            .get(name)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Clock ticks between triggers at the configured rate. The interval must
    /// be at least one tick and fit in a u64.
    pub fn trigger_interval_ticks(&self) -> BuildResult<u64> {
        if !self.trigger_rate_hz.is_finite() || self.trigger_rate_hz <= 0.0 {
            return Err(ConfgenError::invalid(format!(
                "trigger_rate_hz must be positive and finite, got {}",
                self.trigger_rate_hz
            )));
        }
        let ticks = (self.clock_speed_hz as f64 / self.trigger_rate_hz).floor();
        if !ticks.is_finite() || ticks < 1.0 || ticks >= u64::MAX as f64 {
            return Err(ConfgenError::invalid(format!(
                "trigger_rate_hz {} gives an interval of {} ticks at {} Hz",
                self.trigger_rate_hz, ticks, self.clock_speed_hz
            )));
        }
        Ok(ticks as u64)
    }
}

impl AppGenerator for TriggerApp {
    fn name(&self) -> &'static str {
        "trigger"
    }

    fn validate(&self) -> BuildResult<()> {
        self.trigger_interval_ticks()?;
        validate_endpoints(&self.network_endpoints, &REQUIRED_ENDPOINTS)
    }

    fn queues(&self) -> Vec<QueueSpec> {
        vec![
            QueueSpec::new("hsievent_from_netq", "FollyMPMCQueue", 1000),
            QueueSpec::new("token_from_netq", "FollySPSCQueue", 2000),
            QueueSpec::new("trigger_decision_to_netq", "FollySPSCQueue", 2000),
            QueueSpec::new("trigger_candidate_q", "FollySPSCQueue", 2000),
        ]
    }

    fn module_kinds(&self) -> Vec<ModuleKind> {
        vec![
            ModuleKind::new("ntoq_hsievent", "NetworkToQueue", Inclusion::Always)
                .output("output", "hsievent_from_netq"),
            ModuleKind::new("ntoq_token", "NetworkToQueue", Inclusion::Always)
                .output("output", "token_from_netq"),
            ModuleKind::new("qton_trigdec", "QueueToNetwork", Inclusion::Always)
                .input("input", "trigger_decision_to_netq"),
            ModuleKind::new("mlt", "ModuleLevelTrigger", Inclusion::Always)
                .input("token_source", "token_from_netq")
                .output("trigger_decision_sink", "trigger_decision_to_netq")
                .output("trigger_candidate_source", "trigger_candidate_q"),
            ModuleKind::new("ttcm", "TimingTriggerCandidateMaker", Inclusion::Always)
                .input("input", "hsievent_from_netq")
                .output("output", "trigger_candidate_q"),
        ]
    }

    fn commands(&self) -> Vec<CommandSpec> {
        let links: Vec<u32> = (0..self.number_of_data_producers).collect();
        let start = start_params(self.run_number);
        // Checked in validate, which runs before the catalogue is built.
        let ticks = self.trigger_interval_ticks().unwrap_or_default();

        vec![
            CommandSpec::conf(vec![
                AddressedPair::with(
                    "mlt",
                    json!({ "links": links, "initial_token_count": self.token_count }),
                ),
                AddressedPair::with("ttcm", json!({})),
                AddressedPair::with(
                    "ntoq_hsievent",
                    network_to_queue(
                        "dunedaq::dfmessages::HSIEvent",
                        "HSIEventNQ",
                        self.endpoint("hsievent"),
                    ),
                ),
                AddressedPair::with(
                    "ntoq_token",
                    network_to_queue(
                        "dunedaq::dfmessages::TriggerDecisionToken",
                        "TriggerDecisionTokenNQ",
                        self.endpoint("triginh"),
                    ),
                ),
                AddressedPair::with(
                    "qton_trigdec",
                    queue_to_network(
                        "dunedaq::dfmessages::TriggerDecision",
                        "TriggerDecisionNQ",
                        self.endpoint("trigdec"),
                    ),
                ),
            ]),
            CommandSpec::start(
                ["mlt", "ttcm", "ntoq_hsievent", "ntoq_token", "qton_trigdec"]
                    .into_iter()
                    .map(|m| AddressedPair::with(m, start.clone()))
                    .collect(),
            ),
            // fdf (fake dataflow) lives in another process; it matches nothing here.
            CommandSpec::stop(
                ["fdf", "mlt", "ttcm", "ntoq_hsievent", "ntoq_token", "qton_trigdec"]
                    .into_iter()
                    .map(|m| AddressedPair::bare(m))
                    .collect(),
            ),
            CommandSpec::scrap(vec![AddressedPair::bare("")]),
            CommandSpec::plain("pause", vec![AddressedPair::bare("")]),
            CommandSpec::plain(
                "resume",
                vec![AddressedPair::with(
                    "mlt",
                    json!({ "trigger_interval_ticks": ticks }),
                )],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::generate;
    use pretty_assertions::assert_eq;

    #[test]
    fn stop_skips_modules_from_other_processes() {
        let docs = generate(&TriggerApp::default()).unwrap();
        let stop = docs.iter().find(|d| d.id == "stop").unwrap();
        assert_eq!(
            stop.targets(),
            vec!["mlt", "ttcm", "ntoq_hsievent", "ntoq_token", "qton_trigdec"]
        );
    }

    #[test]
    fn links_follow_producer_count() {
        let app = TriggerApp {
            number_of_data_producers: 3,
            ..Default::default()
        };
        let docs = generate(&app).unwrap();
        let conf = docs.iter().find(|d| d.id == "conf").unwrap();
        assert_eq!(
            conf.entries()[0].data,
            Some(json!({"links": [0, 1, 2], "initial_token_count": 10}))
        );
    }

    #[test]
    fn resume_interval_derives_from_rate() {
        let app = TriggerApp {
            trigger_rate_hz: 2.0,
            ..Default::default()
        };
        assert_eq!(app.trigger_interval_ticks(), Ok(25_000_000));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let app = TriggerApp {
            trigger_rate_hz: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            generate(&app),
            Err(ConfgenError::InvalidParameterCombination(_))
        ));
    }

    #[test]
    fn tiny_rate_overflowing_the_interval_is_rejected() {
        let app = TriggerApp {
            trigger_rate_hz: 1e-320,
            ..Default::default()
        };
        assert!(matches!(
            generate(&app),
            Err(ConfgenError::InvalidParameterCombination(_))
        ));
    }

    #[test]
    fn rate_above_clock_speed_is_rejected() {
        let app = TriggerApp {
            trigger_rate_hz: 100_000_000.0,
            ..Default::default()
        };
        assert!(matches!(
            generate(&app),
            Err(ConfgenError::InvalidParameterCombination(_))
        ));
    }

    #[test]
    fn resume_carries_the_checked_interval() {
        let docs = generate(&TriggerApp::default()).unwrap();
        let resume = docs.iter().find(|d| d.id == "resume").unwrap();
        assert_eq!(
            resume.entries()[0].data,
            Some(json!({ "trigger_interval_ticks": 50_000_000 }))
        );
    }

    #[test]
    fn missing_decision_endpoint_is_rejected() {
        let mut app = TriggerApp::default();
        app.network_endpoints.remove("trigdec");
        let err = generate(&app).unwrap_err();
        assert!(err.to_string().contains("trigdec"));
    }
}
