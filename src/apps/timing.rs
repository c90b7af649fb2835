//! Timing system control application.
//!
//! One hardware interface manager (`thi`) receives hardware commands from a
//! set of controllers over a single queue. Controllers exist only for the
//! devices that are configured:
//!
//! | instance  | plugin                      | present when                    |
//! |-----------|-----------------------------|---------------------------------|
//! | thi       | TimingHardwareManagerPDI    | always                          |
//! | tmc0      | TimingMasterController      | master device set               |
//! | tpc{id}   | TimingPartitionController   | master device set, one per id   |
//! | tfc{i}    | TimingFanoutController      | one per fanout device           |
//! | tec0      | TimingEndpointController    | endpoint device set             |
//! | hsi0      | HSIController               | hsi device set                  |

use crate::apps::AppGenerator;
use crate::apps::payload::{endpoint_configure, io_reset};
use crate::command::{AddressedPair, CommandSpec, Gate};
use crate::spec::{Inclusion, Member, ModuleKind, QueueSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const HW_QUEUE: &str = "hardware_commands";
const HW_IN: &str = "hardware_commands_in";
const HW_OUT: &str = "hardware_commands_out";

/// Every module that takes part in the generic lifecycle commands.
const ALL_TIMING_MODULES: [&str; 6] = ["thi", "tmc.*", "tpc.*", "tfc.*", "tec.*", "hsi.*"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingApp {
    pub run_number: u64,
    /// Microseconds.
    pub gather_interval: u64,
    pub gather_interval_debug: u64,
    pub connections_file: String,

    pub master_device_name: String,
    pub master_clock_file: String,
    pub partition_ids: Vec<u32>,

    pub fanout_devices_names: Vec<String>,
    pub fanout_clock_file: String,

    pub endpoint_device_name: String,
    pub endpoint_clock_file: String,
    pub endpoint_address: u32,
    pub endpoint_partition: u32,

    pub hsi_device_name: String,
    pub hsi_clock_file: String,
    pub hsi_endpoint_address: u32,
    pub hsi_endpoint_partition: u32,
    pub hsi_re_mask: u32,
    pub hsi_fe_mask: u32,
    pub hsi_inv_mask: u32,
    pub hsi_source: u32,

    pub part_trigger_mask: u32,
    pub part_spill_gate_enabled: bool,
    pub part_rate_control_enabled: bool,

    pub uhal_log_level: String,
    /// Emit a `get_info` command after the lifecycle commands.
    pub get_info: bool,
}

impl Default for TimingApp {
    fn default() -> Self {
        Self {
            run_number: 333,
            gather_interval: 1_000_000,
            gather_interval_debug: 10_000_000,
            connections_file: "${TIMING_SHARE}/config/etc/connections.xml".to_string(),
            master_device_name: "PROD_MASTER".to_string(),
            master_clock_file: String::new(),
            partition_ids: vec![0],
            fanout_devices_names: Vec::new(),
            fanout_clock_file: String::new(),
            endpoint_device_name: String::new(),
            endpoint_clock_file: String::new(),
            endpoint_address: 0,
            endpoint_partition: 0,
            hsi_device_name: String::new(),
            hsi_clock_file: String::new(),
            hsi_endpoint_address: 0,
            hsi_endpoint_partition: 0,
            hsi_re_mask: 0,
            hsi_fe_mask: 0,
            hsi_inv_mask: 0,
            hsi_source: 0,
            part_trigger_mask: 0xff,
            part_spill_gate_enabled: true,
            part_rate_control_enabled: true,
            uhal_log_level: "notice".to_string(),
            get_info: false,
        }
    }
}

impl TimingApp {
    fn partition_conf(&self) -> Value {
        json!({
            "trigger_mask": self.part_trigger_mask,
            "spill_gate_enabled": self.part_spill_gate_enabled,
            "rate_control_enabled": self.part_rate_control_enabled,
        })
    }

    fn hsi_masks(&self) -> Value {
        json!({
            "rising_edge_mask": self.hsi_re_mask,
            "falling_edge_mask": self.hsi_fe_mask,
            "invert_edge_mask": self.hsi_inv_mask,
            "data_source": self.hsi_source,
        })
    }

    fn hsi_conf(&self) -> Value {
        let mut conf = endpoint_configure(self.hsi_endpoint_address, self.hsi_endpoint_partition);
        if let (Some(conf), Value::Object(masks)) = (conf.as_object_mut(), self.hsi_masks()) {
            conf.extend(masks);
        }
        conf
    }

    fn thi_init(&self) -> Value {
        json!({
            "connections_file": self.connections_file,
            "gather_interval": self.gather_interval,
            "gather_interval_debug": self.gather_interval_debug,
            "monitored_device_name_master": self.master_device_name,
            "monitored_device_names_fanout": self.fanout_devices_names,
            "monitored_device_name_endpoint": self.endpoint_device_name,
            "monitored_device_name_hsi": self.hsi_device_name,
            "uhal_log_level": self.uhal_log_level,
        })
    }
}

fn device_init(device: String) -> impl Fn(Member<'_>) -> Value + 'static {
    move |_| json!({ "device": device })
}

fn lifecycle(targets: &[&str]) -> Vec<AddressedPair> {
    targets.iter().map(|t| AddressedPair::bare(*t)).collect()
}

fn bare(id: &str, target: &str, gate: &str) -> CommandSpec {
    CommandSpec::plain(id, vec![AddressedPair::bare(target)]).requires(gate)
}

fn with(id: &str, target: &str, payload: Value, gate: &str) -> CommandSpec {
    CommandSpec::plain(id, vec![AddressedPair::with(target, payload)]).requires(gate)
}

impl AppGenerator for TimingApp {
    fn name(&self) -> &'static str {
        "timing"
    }

    fn queues(&self) -> Vec<QueueSpec> {
        vec![QueueSpec::new(HW_QUEUE, "StdDeQueue", 100)]
    }

    fn module_kinds(&self) -> Vec<ModuleKind> {
        let thi_init = self.thi_init();
        let master = self.master_device_name.clone();

        vec![
            ModuleKind::new("thi", "TimingHardwareManagerPDI", Inclusion::Always)
                .input(HW_IN, HW_QUEUE)
                .init_with(move |_| thi_init.clone()),
            ModuleKind::new(
                "tmc0",
                "TimingMasterController",
                Inclusion::IfNonEmpty(master.clone()),
            )
            .output(HW_OUT, HW_QUEUE)
            .init_with(device_init(master.clone())),
            ModuleKind::new(
                "tpc",
                "TimingPartitionController",
                Inclusion::PerId(self.partition_ids.clone()),
            )
            .requires(master.clone())
            .output(HW_OUT, HW_QUEUE)
            .init_with(move |member| match member {
                Member::Id(id) => json!({ "device": master, "partition_id": id }),
                _ => json!({ "device": master }),
            }),
            ModuleKind::new(
                "tfc",
                "TimingFanoutController",
                Inclusion::PerIndex(self.fanout_devices_names.clone()),
            )
            .output(HW_OUT, HW_QUEUE)
            .init_with(|member| match member {
                Member::Indexed { value, .. } => json!({ "device": value }),
                _ => Value::Null,
            }),
            ModuleKind::new(
                "tec0",
                "TimingEndpointController",
                Inclusion::IfNonEmpty(self.endpoint_device_name.clone()),
            )
            .output(HW_OUT, HW_QUEUE)
            .init_with(device_init(self.endpoint_device_name.clone())),
            ModuleKind::new(
                "hsi0",
                "HSIController",
                Inclusion::IfNonEmpty(self.hsi_device_name.clone()),
            )
            .output(HW_OUT, HW_QUEUE)
            .init_with(device_init(self.hsi_device_name.clone())),
        ]
    }

    fn commands(&self) -> Vec<CommandSpec> {
        let partition = self.partition_conf();
        let endpoint = endpoint_configure(self.endpoint_address, self.endpoint_partition);
        let hsi_endpoint =
            endpoint_configure(self.hsi_endpoint_address, self.hsi_endpoint_partition);

        let mut cmds = vec![
            CommandSpec::conf(vec![
                AddressedPair::with("tpc.*", partition.clone()),
                AddressedPair::with("tec0", endpoint.clone()),
                AddressedPair::with("hsi0", self.hsi_conf()),
            ]),
            CommandSpec::start(lifecycle(&ALL_TIMING_MODULES)),
            CommandSpec::stop(lifecycle(&ALL_TIMING_MODULES)),
            CommandSpec::scrap(lifecycle(&ALL_TIMING_MODULES)),
            CommandSpec::plain("get_info", lifecycle(&ALL_TIMING_MODULES))
                .gated(Gate::Flag(self.get_info)),
        ];

        // master
        cmds.extend([
            with("master_io_reset", "tmc.*", io_reset(&self.master_clock_file), "tmc.*"),
            bare("master_set_timestamp", "tmc.*", "tmc.*"),
            bare("master_print_status", "tmc.*", "tmc.*"),
        ]);

        // partitions hang off the master
        cmds.push(with("partition_configure", "tpc.*", partition, "tmc.*"));
        for id in [
            "partition_enable",
            "partition_disable",
            "partition_start",
            "partition_stop",
            "partition_enable_triggers",
            "partition_disable_triggers",
            "partition_print_status",
        ] {
            cmds.push(bare(id, "tpc.*", "tmc.*"));
        }

        // fanout
        cmds.extend([
            with("fanout_io_reset", "tfc.*", io_reset(&self.fanout_clock_file), "tfc.*"),
            bare("fanout_print_status", "tfc.*", "tfc.*"),
        ]);

        // endpoint
        cmds.extend([
            with("endpoint_io_reset", "tec.*", io_reset(&self.endpoint_clock_file), "tec.*"),
            with("endpoint_enable", "tec.*", endpoint.clone(), "tec.*"),
            bare("endpoint_disable", "tec.*", "tec.*"),
            with("endpoint_reset", "tec.*", endpoint, "tec.*"),
            bare("endpoint_print_status", "tec.*", "tec.*"),
        ]);

        // hsi
        cmds.extend([
            with("hsi_io_reset", "hsi.*", io_reset(&self.hsi_clock_file), "hsi.*"),
            with("hsi_endpoint_enable", "hsi.*", hsi_endpoint.clone(), "hsi.*"),
            bare("hsi_endpoint_disable", "hsi.*", "hsi.*"),
            with("hsi_endpoint_reset", "hsi.*", hsi_endpoint, "hsi.*"),
            bare("hsi_reset", "hsi.*", "hsi.*"),
            with("hsi_configure", "hsi.*", self.hsi_masks(), "hsi.*"),
            bare("hsi_start", "hsi.*", "hsi.*"),
            bare("hsi_stop", "hsi.*", "hsi.*"),
            bare("hsi_print_status", "hsi.*", "hsi.*"),
        ]);

        cmds
    }
}
