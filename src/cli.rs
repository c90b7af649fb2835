//! Command line arguments.
//!
//! Every parameter flag is optional; only the flags actually given are
//! serialized and layered over the defaults, config file and environment.

use clap::{Args, Parser, Subcommand};
use daq_confgen::apps::network::parse_endpoint_arg;
use daq_confgen::logging::LogFormat;
use serde::{Serialize, Serializer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daq-confgen")]
#[command(about = "Run control configuration generator", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, default_value = "info")]
    pub log_level: tracing::Level,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Timing system control (hardware interface plus device controllers).
    Timing {
        #[command(flatten)]
        out: OutputArgs,
        #[command(flatten)]
        params: TimingArgs,
    },
    /// HSI readout and trigger candidate maker.
    HsiReadout {
        #[command(flatten)]
        out: OutputArgs,
        #[command(flatten)]
        params: HsiReadoutArgs,
    },
    /// Fake HSI event generator.
    FakeHsi {
        #[command(flatten)]
        out: OutputArgs,
        #[command(flatten)]
        params: FakeHsiArgs,
    },
    /// Module level trigger.
    Trigger {
        #[command(flatten)]
        out: OutputArgs,
        #[command(flatten)]
        params: TriggerArgs,
    },
}

#[derive(Args)]
pub struct OutputArgs {
    /// TOML parameter file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    #[arg(short = 'o', long, default_value = ".")]
    pub output_path: PathBuf,

    /// Output file name [default: <app>_app.json]
    pub json_file: Option<PathBuf>,
}

impl OutputArgs {
    pub fn target(&self, app: &str) -> PathBuf {
        let file = self
            .json_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{app}_app.json")));
        self.output_path.join(file)
    }
}

/// Accepts `255` or `0xff`.
fn parse_mask(s: &str) -> Result<u32, String> {
    let res = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    res.map_err(|e| format!("invalid mask '{s}': {e}"))
}

fn as_map<S: Serializer>(pairs: &[(String, String)], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(pairs.iter().map(|(k, v)| (k, v)))
}

#[derive(Args, Serialize)]
pub struct TimingArgs {
    #[arg(short = 'r', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_number: Option<u64>,

    /// Gather interval for monitoring data (us).
    #[arg(short = 'g', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gather_interval: Option<u64>,

    #[arg(short = 'd', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gather_interval_debug: Option<u64>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections_file: Option<String>,

    /// Empty string disables the master and its partitions.
    #[arg(short = 'm', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_device_name: Option<String>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_clock_file: Option<String>,

    #[arg(short = 'p', long, value_delimiter = ',')]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_ids: Option<Vec<u32>>,

    #[arg(short = 'f', long = "fanout-devices-names", value_delimiter = ',')]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fanout_devices_names: Option<Vec<String>>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fanout_clock_file: Option<String>,

    #[arg(short = 'e', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_device_name: Option<String>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_clock_file: Option<String>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_address: Option<u32>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_partition: Option<u32>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_device_name: Option<String>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_clock_file: Option<String>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_endpoint_address: Option<u32>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_endpoint_partition: Option<u32>,

    #[arg(long, value_parser = parse_mask)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_re_mask: Option<u32>,

    #[arg(long, value_parser = parse_mask)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_fe_mask: Option<u32>,

    #[arg(long, value_parser = parse_mask)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_inv_mask: Option<u32>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_source: Option<u32>,

    #[arg(long = "part-trig-mask", value_parser = parse_mask)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_trigger_mask: Option<u32>,

    #[arg(long = "part-spill-gate")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_spill_gate_enabled: Option<bool>,

    #[arg(long = "part-rate-control")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_rate_control_enabled: Option<bool>,

    #[arg(short = 'u', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uhal_log_level: Option<String>,

    /// Append a get_info command (true/false).
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_info: Option<bool>,
}

#[derive(Args, Serialize)]
pub struct HsiReadoutArgs {
    #[arg(short = 'r', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_number: Option<u64>,

    #[arg(short = 'g', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gather_interval: Option<u64>,

    #[arg(short = 'd', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gather_interval_debug: Option<u64>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections_file: Option<String>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_device_name: Option<String>,

    #[arg(short = 'u', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uhal_log_level: Option<String>,
}

#[derive(Args, Serialize)]
pub struct FakeHsiArgs {
    #[arg(short = 'r', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_number: Option<u64>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_speed_hz: Option<u64>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_event_period_ns: Option<u64>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsi_timestamp_offset: Option<u64>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_signal_multiplicity: Option<u32>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_emulation_mode: Option<u32>,

    #[arg(long, value_parser = parse_mask)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_signals: Option<u32>,

    /// Network endpoint as name=address, repeatable.
    #[arg(long = "endpoint", value_parser = parse_endpoint_arg)]
    #[serde(
        rename = "network_endpoints",
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "as_map"
    )]
    pub endpoints: Vec<(String, String)>,
}

#[derive(Args, Serialize)]
pub struct TriggerArgs {
    #[arg(short = 'r', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_number: Option<u64>,

    #[arg(short = 's', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_data_producers: Option<u32>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_rate_hz: Option<f64>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u32>,

    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_speed_hz: Option<u64>,

    /// Network endpoint as name=address, repeatable.
    #[arg(long = "endpoint", value_parser = parse_endpoint_arg)]
    #[serde(
        rename = "network_endpoints",
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "as_map"
    )]
    pub endpoints: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn masks_take_hex_or_decimal() {
        assert_eq!(parse_mask("0xff"), Ok(255));
        assert_eq!(parse_mask("17"), Ok(17));
        assert!(parse_mask("0xzz").is_err());
    }

    #[test]
    fn only_given_flags_are_overrides() {
        let cli = Cli::parse_from([
            "daq-confgen",
            "timing",
            "-m",
            "",
            "-p",
            "0,1",
            "--part-trig-mask",
            "0x0f",
        ]);
        let Commands::Timing { out, params } = cli.cmd else {
            panic!("expected timing");
        };
        assert_eq!(out.target("timing"), PathBuf::from("./timing_app.json"));
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "master_device_name": "",
                "partition_ids": [0, 1],
                "part_trigger_mask": 15,
            })
        );
    }

    #[test]
    fn get_info_can_be_switched_off() {
        let cli = Cli::parse_from(["daq-confgen", "timing", "--get-info", "false"]);
        let Commands::Timing { params, .. } = cli.cmd else {
            panic!("expected timing");
        };
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({ "get_info": false }));
    }

    #[test]
    fn endpoints_become_a_table() {
        let cli = Cli::parse_from([
            "daq-confgen",
            "--log-format",
            "json",
            "fake-hsi",
            "--endpoint",
            "hsievent=tcp://localhost:12344",
            "-o",
            "out",
            "fhsi.json",
        ]);
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::FakeHsi { out, params } = cli.cmd else {
            panic!("expected fake-hsi");
        };
        assert_eq!(out.target("fake_hsi"), PathBuf::from("out/fhsi.json"));
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "network_endpoints": { "hsievent": "tcp://localhost:12344" } })
        );
    }
}
