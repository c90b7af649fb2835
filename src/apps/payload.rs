//! Payload shapes shared by several applications.

use serde_json::{Value, json};

pub fn start_params(run: u64) -> Value {
    json!({ "run": run, "disable_data_storage": false })
}

pub fn io_reset(clock_config: &str) -> Value {
    json!({ "clock_config": clock_config, "soft": false })
}

pub fn endpoint_configure(address: u32, partition: u32) -> Value {
    json!({ "address": address, "partition": partition })
}

/// NetworkToQueue conf for a ZMQ receiver.
pub fn network_to_queue(msg_type: &str, msg_module_name: &str, address: &str) -> Value {
    json!({
        "msg_type": msg_type,
        "msg_module_name": msg_module_name,
        "receiver_config": {
            "ipm_plugin_type": "ZmqReceiver",
            "address": address,
        },
    })
}

/// QueueToNetwork conf for a msgpack ZMQ sender.
pub fn queue_to_network(msg_type: &str, msg_module_name: &str, address: &str) -> Value {
    json!({
        "msg_type": msg_type,
        "msg_module_name": msg_module_name,
        "sender_config": {
            "ipm_plugin_type": "ZmqSender",
            "address": address,
            "stype": "msgpack",
        },
    })
}
