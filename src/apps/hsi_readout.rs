//! HSI readout application: reads hardware signal interface events and turns
//! them into trigger candidates.

use crate::apps::AppGenerator;
use crate::apps::payload::start_params;
use crate::command::{AddressedPair, CommandSpec};
use crate::spec::{Inclusion, ModuleKind, QueueSpec};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HsiReadoutApp {
    pub run_number: u64,
    pub gather_interval: u64,
    pub gather_interval_debug: u64,
    pub connections_file: String,
    pub hsi_device_name: String,
    pub uhal_log_level: String,
}

impl Default for HsiReadoutApp {
    fn default() -> Self {
        Self {
            run_number: 333,
            gather_interval: 1_000_000,
            gather_interval_debug: 10_000_000,
            connections_file: "${TIMING_SHARE}/config/etc/connections.xml".to_string(),
            hsi_device_name: "BOREAS_FMC".to_string(),
            uhal_log_level: "notice".to_string(),
        }
    }
}

impl AppGenerator for HsiReadoutApp {
    fn name(&self) -> &'static str {
        "hsi_readout"
    }

    fn queues(&self) -> Vec<QueueSpec> {
        vec![
            QueueSpec::new("hsievent_q", "FollySPSCQueue", 2000),
            QueueSpec::new("trigger_candidate_q", "FollySPSCQueue", 2000),
        ]
    }

    fn module_kinds(&self) -> Vec<ModuleKind> {
        vec![
            ModuleKind::new("hsi", "HSIReadout", Inclusion::Always)
                .output("hsievent_sink", "hsievent_q"),
            ModuleKind::new("ttcm", "TimingTriggerCandidateMaker", Inclusion::Always)
                .input("input", "hsievent_q")
                .output("output", "trigger_candidate_q"),
        ]
    }

    fn commands(&self) -> Vec<CommandSpec> {
        let hsi_conf = json!({
            "connections_file": self.connections_file,
            "gather_interval": self.gather_interval,
            "gather_interval_debug": self.gather_interval_debug,
            "hsi_device_name": self.hsi_device_name,
            "uhal_log_level": self.uhal_log_level,
        });

        vec![
            CommandSpec::conf(vec![
                AddressedPair::with("hsi", hsi_conf),
                AddressedPair::with("ttcm", json!({})),
            ]),
            CommandSpec::start(vec![
                AddressedPair::bare("hsi"),
                AddressedPair::with("ttcm", start_params(self.run_number)),
            ]),
            CommandSpec::stop(vec![AddressedPair::bare("hsi"), AddressedPair::bare("ttcm")]),
            CommandSpec::scrap(vec![AddressedPair::bare("")]),
        ]
    }
}
