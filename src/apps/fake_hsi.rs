//! Fake HSI event generator application.
//!
//! Time sync messages arrive over the network, the generator emits emulated
//! HSI events. When an `hsievent` endpoint is configured the events are also
//! forwarded back onto the network.

use crate::apps::AppGenerator;
use crate::apps::network::{NetworkEndpoints, validate_endpoints};
use crate::apps::payload::{network_to_queue, queue_to_network, start_params};
use crate::command::{AddressedPair, CommandSpec};
use crate::error::BuildResult;
use crate::spec::{Inclusion, ModuleKind, QueueSpec};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeHsiApp {
    pub run_number: u64,
    pub clock_speed_hz: u64,
    pub hsi_event_period_ns: u64,
    pub hsi_timestamp_offset: u64,
    pub mean_signal_multiplicity: u32,
    pub signal_emulation_mode: u32,
    pub enabled_signals: u32,
    pub network_endpoints: NetworkEndpoints,
}

impl Default for FakeHsiApp {
    fn default() -> Self {
        Self {
            run_number: 333,
            clock_speed_hz: 50_000_000,
            hsi_event_period_ns: 20,
            hsi_timestamp_offset: 0,
            mean_signal_multiplicity: 0,
            signal_emulation_mode: 0,
            enabled_signals: 0b0000_0001,
            network_endpoints: NetworkEndpoints::from([(
                "timesync".to_string(),
                "tcp://localhost:12347".to_string(),
            )]),
        }
    }
}

impl FakeHsiApp {
    fn endpoint(&self, name: &str) -> &str {
        self.network_endpoints
            .get(name)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl AppGenerator for FakeHsiApp {
    fn name(&self) -> &'static str {
        "fake_hsi"
    }

    fn validate(&self) -> BuildResult<()> {
        validate_endpoints(&self.network_endpoints, &["timesync"])
    }

    fn queues(&self) -> Vec<QueueSpec> {
        vec![
            QueueSpec::new("time_sync_from_netq", "FollySPSCQueue", 100),
            QueueSpec::new("hsievent_q_to_net", "FollySPSCQueue", 100_000_000),
        ]
    }

    fn module_kinds(&self) -> Vec<ModuleKind> {
        vec![
            ModuleKind::new("ntoq_timesync", "NetworkToQueue", Inclusion::Always)
                .output("output", "time_sync_from_netq"),
            ModuleKind::new("fhsig", "FakeHSIEventGenerator", Inclusion::Always)
                .input("time_sync_source", "time_sync_from_netq")
                .output("hsievent_sink", "hsievent_q_to_net"),
            ModuleKind::new(
                "qton_hsievent",
                "QueueToNetwork",
                Inclusion::IfNonEmpty(self.endpoint("hsievent").to_string()),
            )
            .input("input", "hsievent_q_to_net"),
        ]
    }

    fn commands(&self) -> Vec<CommandSpec> {
        let start = start_params(self.run_number);
        vec![
            CommandSpec::conf(vec![
                AddressedPair::with(
                    "ntoq_timesync",
                    network_to_queue(
                        "dunedaq::dfmessages::TimeSync",
                        "TimeSyncNQ",
                        self.endpoint("timesync"),
                    ),
                ),
                AddressedPair::with(
                    "fhsig",
                    json!({
                        "clock_frequency": self.clock_speed_hz,
                        "event_period": self.hsi_event_period_ns,
                        "timestamp_offset": self.hsi_timestamp_offset,
                        "mean_signal_multiplicity": self.mean_signal_multiplicity,
                        "signal_emulation_mode": self.signal_emulation_mode,
                        "enabled_signals": self.enabled_signals,
                    }),
                ),
                AddressedPair::with(
                    "qton_hsievent",
                    queue_to_network(
                        "dunedaq::dfmessages::HSIEvent",
                        "HSIEventNQ",
                        self.endpoint("hsievent"),
                    ),
                ),
            ]),
            CommandSpec::start(vec![AddressedPair::with("", start)]),
            CommandSpec::stop(vec![AddressedPair::bare("")]),
            CommandSpec::scrap(vec![AddressedPair::bare("")]),
            CommandSpec::plain("pause", vec![AddressedPair::bare("")]),
            CommandSpec::plain("resume", vec![AddressedPair::bare("")]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{build_topology, generate};
    use crate::error::ConfgenError;
    use pretty_assertions::assert_eq;

    #[test]
    fn forwarder_only_with_hsievent_endpoint() {
        let t = build_topology(&FakeHsiApp::default()).unwrap();
        assert_eq!(t.instance_names().collect::<Vec<_>>(), vec!["ntoq_timesync", "fhsig"]);

        let mut app = FakeHsiApp::default();
        app.network_endpoints
            .insert("hsievent".into(), "tcp://localhost:12344".into());
        let docs = generate(&app).unwrap();
        let conf = docs.iter().find(|d| d.id == "conf").unwrap();
        assert_eq!(conf.targets(), vec!["ntoq_timesync", "fhsig", "qton_hsievent"]);
        assert_eq!(
            conf.entries()[2].data.as_ref().unwrap()["sender_config"]["address"],
            json!("tcp://localhost:12344")
        );
    }

    #[test]
    fn timesync_endpoint_is_required() {
        let app = FakeHsiApp {
            network_endpoints: NetworkEndpoints::new(),
            ..Default::default()
        };
        assert!(matches!(
            generate(&app),
            Err(ConfgenError::InvalidParameterCombination(_))
        ));
    }

    #[test]
    fn run_control_includes_pause_and_resume() {
        let docs = generate(&FakeHsiApp::default()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["init", "conf", "start", "stop", "scrap", "pause", "resume"]);
        assert_eq!(docs[2].entries().len(), 2);
    }
}
